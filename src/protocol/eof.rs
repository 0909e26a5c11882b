use byteorder::LittleEndian;

use crate::io::BufMut;
use crate::protocol::{Capabilities, Encode, Status};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_basic_eof_packet.html
// https://mariadb.com/kb/en/eof_packet/
//
// Only sent when DEPRECATE_EOF was not negotiated; otherwise the
// 0xFE-headed OK packet takes its place.
#[derive(Debug)]
pub struct EofPacket {
    pub warnings: u16,
    pub status: Status,
}

impl Encode for EofPacket {
    fn encode(&self, buf: &mut Vec<u8>, capabilities: Capabilities) {
        buf.put_u8(0xFE);

        if capabilities.contains(Capabilities::PROTOCOL_41) {
            buf.put_u16::<LittleEndian>(self.warnings);
            buf.put_u16::<LittleEndian>(self.status.bits());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Capabilities, Encode, EofPacket, Status};

    #[test]
    fn it_encodes_eof() {
        let mut buf = Vec::new();

        EofPacket {
            warnings: 0,
            status: Status::SERVER_STATUS_AUTOCOMMIT,
        }
        .encode(&mut buf, Capabilities::PROTOCOL_41);

        assert_eq!(buf, b"\xfe\x00\x00\x02\x00");
    }
}
