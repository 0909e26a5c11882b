use crate::io::BufMut;
use crate::protocol::{AuthPlugin, Capabilities, Encode};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_connection_phase_packets_protocol_auth_switch_request.html
//
// Instructs the client to continue authentication under a different
// plugin, with fresh plugin data (for native password: a new 20-byte
// nonce followed by a NUL).
#[derive(Debug)]
pub struct AuthSwitchRequest<'a> {
    pub plugin: AuthPlugin,
    pub data: &'a [u8],
}

impl Encode for AuthSwitchRequest<'_> {
    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        buf.put_u8(0xFE);
        buf.put_str_nul(self.plugin.as_str());
        buf.put_bytes(self.data);
    }
}

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_connection_phase_packets_protocol_auth_more_data.html
//
// A mid-exchange server message: one round of a multi-round plugin
// conversation.
#[derive(Debug)]
pub struct AuthMoreData<'a> {
    pub data: &'a [u8],
}

impl Encode for AuthMoreData<'_> {
    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        buf.put_u8(0x01);
        buf.put_bytes(self.data);
    }
}
