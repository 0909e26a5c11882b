use byteorder::LittleEndian;

use crate::io::{Buf, BufExt};
use crate::protocol::Capabilities;

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_change_user.html
//
// Re-runs the whole authentication sequence on a live connection. The
// packet carries no capability flags, so the negotiated set stays as it
// was; everything else about the session starts over.
#[derive(Debug)]
pub struct ComChangeUser {
    pub username: String,
    pub auth_response: Vec<u8>,
    pub database: Option<String>,
    pub collation: Option<u16>,
    pub auth_plugin: Option<String>,
    pub connect_attrs: Vec<(String, String)>,
}

impl ComChangeUser {
    pub(crate) fn decode(mut buf: &[u8], capabilities: Capabilities) -> crate::Result<Self> {
        // username : string<NUL>
        let username = buf.get_str_nul()?.to_owned();

        let auth_response = if capabilities.contains(Capabilities::SECURE_CONNECTION) {
            // auth response length : int<1>, auth response : string<n>
            let len = buf.get_u8()?;
            buf.get_bytes(len as usize)?.to_vec()
        } else {
            buf.get_str_nul()?.as_bytes().to_vec()
        };

        // database : string<NUL>
        let database = match buf.get_str_nul()? {
            "" => None,
            db => Some(db.to_owned()),
        };

        // everything below appeared in 4.1 and is optional on the wire
        let collation = if buf.is_empty() {
            None
        } else {
            Some(buf.get_u16::<LittleEndian>()?)
        };

        let auth_plugin = if capabilities.contains(Capabilities::PLUGIN_AUTH) && !buf.is_empty() {
            Some(buf.get_str_nul()?.to_owned())
        } else {
            None
        };

        let mut connect_attrs = Vec::new();

        if capabilities.contains(Capabilities::CONNECT_ATTRS) && !buf.is_empty() {
            let total = buf.get_uint_lenenc::<LittleEndian>()?.unwrap_or(0) as usize;
            let mut attrs = buf.get_bytes(total.min(buf.len()))?;

            while !attrs.is_empty() {
                let key = attrs.get_str_lenenc::<LittleEndian>()?.unwrap_or_default();
                let value = attrs.get_str_lenenc::<LittleEndian>()?.unwrap_or_default();

                connect_attrs.push((key.to_owned(), value.to_owned()));
            }
        }

        Ok(Self {
            username,
            auth_response,
            database,
            collation,
            auth_plugin,
            connect_attrs,
        })
    }
}

#[cfg(test)]
mod tests {
    use byteorder::LittleEndian;

    use super::{Capabilities, ComChangeUser};
    use crate::io::BufMut;

    #[test]
    fn it_decodes_com_change_user() {
        let mut buf = Vec::new();

        buf.put_str_nul("reporting");
        buf.put_u8(4);
        buf.put_bytes(b"\x01\x02\x03\x04");
        buf.put_str_nul("metrics");
        buf.put_u16::<LittleEndian>(45);
        buf.put_str_nul("mysql_native_password");

        let caps = Capabilities::PROTOCOL_41
            | Capabilities::SECURE_CONNECTION
            | Capabilities::PLUGIN_AUTH;

        let p = ComChangeUser::decode(&buf, caps).unwrap();

        assert_eq!(p.username, "reporting");
        assert_eq!(p.auth_response, b"\x01\x02\x03\x04");
        assert_eq!(p.database.as_deref(), Some("metrics"));
        assert_eq!(p.collation, Some(45));
        assert_eq!(p.auth_plugin.as_deref(), Some("mysql_native_password"));
    }
}
