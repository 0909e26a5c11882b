use byteorder::LittleEndian;

use crate::io::BufMut;
use crate::protocol::{AuthPlugin, Capabilities, Encode, Status};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_connection_phase_packets_protocol_handshake_v10.html
// https://mariadb.com/kb/en/connection/#initial-handshake-packet
//
// The capability set passed to `encode` is the set the server advertises;
// nothing has been negotiated yet when this packet goes out.
#[derive(Debug)]
pub struct Handshake<'a> {
    pub server_version: &'a str,
    pub connection_id: u32,
    pub collation: u8,
    pub status: Status,
    pub auth_plugin: AuthPlugin,
    /// 20-byte scramble; the greeting splits it 8 + 12.
    pub nonce: &'a [u8],
}

impl Encode for Handshake<'_> {
    fn encode(&self, buf: &mut Vec<u8>, capabilities: Capabilities) {
        // protocol version : int<1>
        buf.put_u8(10);

        // server version : string<NUL>
        buf.put_str_nul(self.server_version);

        // connection id : int<4>
        buf.put_u32::<LittleEndian>(self.connection_id);

        // scramble first part : string<8>
        buf.put_bytes(&self.nonce[..8]);

        // reserved : string<1>
        buf.put_u8(0);

        // capability_flags_1 : int<2>
        buf.put_u16::<LittleEndian>(capabilities.bits() as u16);

        // character_set : int<1>
        buf.put_u8(self.collation);

        // status_flags : int<2>
        buf.put_u16::<LittleEndian>(self.status.bits());

        // capability_flags_2 : int<2>
        buf.put_u16::<LittleEndian>((capabilities.bits() >> 16) as u16);

        if capabilities.contains(Capabilities::PLUGIN_AUTH) {
            // scramble length + the terminating NUL : int<1>
            buf.put_u8(self.nonce.len() as u8 + 1);
        } else {
            buf.put_u8(0);
        }

        // reserved : string<10>
        buf.advance(10);

        if capabilities.contains(Capabilities::SECURE_CONNECTION) {
            // scramble second part : string<12> + NUL
            buf.put_bytes(&self.nonce[8..]);
            buf.put_u8(0);
        }

        if capabilities.contains(Capabilities::PLUGIN_AUTH) {
            // default auth plugin : string<NUL>
            buf.put_str_nul(self.auth_plugin.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthPlugin, Capabilities, Encode, Handshake, Status};

    const NONCE: &[u8] = b"abcdefgh0123456789jk";

    #[test]
    fn it_encodes_handshake() {
        let mut buf = Vec::new();

        Handshake {
            server_version: "8.0.35-shim",
            connection_id: 3,
            collation: 45,
            status: Status::SERVER_STATUS_AUTOCOMMIT,
            auth_plugin: AuthPlugin::MySqlNativePassword,
            nonce: NONCE,
        }
        .encode(&mut buf, Capabilities::server_default());

        let mut expected = Vec::new();
        expected.extend_from_slice(b"\x0a8.0.35-shim\x00");
        expected.extend_from_slice(b"\x03\x00\x00\x00");
        expected.extend_from_slice(b"abcdefgh\x00");
        // low bits of the default capability set
        expected.extend_from_slice(&[0x0f, 0xa2]);
        // utf8mb4_general_ci, autocommit
        expected.extend_from_slice(&[0x2d, 0x02, 0x00]);
        // high bits of the default capability set
        expected.extend_from_slice(&[0xba, 0x09]);
        // 20-byte scramble + NUL
        expected.push(21);
        expected.extend_from_slice(&[0; 10]);
        expected.extend_from_slice(b"0123456789jk\x00");
        expected.extend_from_slice(b"mysql_native_password\x00");

        assert_eq!(buf, expected);
    }
}
