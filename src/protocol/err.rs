use byteorder::LittleEndian;

use crate::error::SqlError;
use crate::io::BufMut;
use crate::protocol::{Capabilities, Encode};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_basic_err_packet.html
// https://mariadb.com/kb/en/err_packet/
#[derive(Debug)]
pub struct ErrPacket<'a> {
    pub error_code: u16,
    pub sql_state: &'a str,
    pub error_message: &'a str,
}

impl<'a> From<&'a SqlError> for ErrPacket<'a> {
    fn from(err: &'a SqlError) -> Self {
        Self {
            error_code: err.code,
            sql_state: &err.sqlstate,
            error_message: &err.message,
        }
    }
}

impl Encode for ErrPacket<'_> {
    fn encode(&self, buf: &mut Vec<u8>, capabilities: Capabilities) {
        buf.put_u8(0xFF);

        // error code : int<2>
        buf.put_u16::<LittleEndian>(self.error_code);

        if capabilities.contains(Capabilities::PROTOCOL_41) {
            // '#' marker and 5-byte SQLSTATE
            buf.put_u8(b'#');

            let state = self.sql_state.as_bytes();
            buf.put_bytes(if state.len() == 5 { state } else { b"HY000" });
        }

        // error message : string<EOF>
        buf.put_str(self.error_message);
    }
}

#[cfg(test)]
mod tests {
    use super::{Capabilities, Encode, ErrPacket, SqlError};

    #[test]
    fn it_encodes_err() {
        let err = SqlError::unknown_database("unknown");
        let mut buf = Vec::new();

        ErrPacket::from(&err).encode(&mut buf, Capabilities::PROTOCOL_41);

        assert_eq!(
            buf,
            b"\xff\x19\x04#42000Unknown database 'unknown'".as_slice()
        );
    }

    #[test]
    fn it_drops_sqlstate_for_old_clients() {
        let err = SqlError::unknown_database("unknown");
        let mut buf = Vec::new();

        ErrPacket::from(&err).encode(&mut buf, Capabilities::empty());

        assert!(buf.starts_with(b"\xff\x19\x04U"));
    }
}
