use byteorder::LittleEndian;

use crate::io::{BufMut, BufMutExt};
use crate::protocol::{Capabilities, Encode, Status};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_basic_ok_packet.html
// https://mariadb.com/kb/en/ok_packet/
#[derive(Debug, Clone)]
pub struct OkPacket {
    /// 0x00, or 0xFE when standing in for EOF as a result-set terminator
    /// under DEPRECATE_EOF.
    pub header: u8,
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub status: Status,
    pub warnings: u16,
    pub info: String,
    /// Raw session-state entries; present only when the status carries
    /// SERVER_SESSION_STATE_CHANGED and SESSION_TRACK was negotiated.
    pub session_state: Vec<u8>,
}

impl OkPacket {
    pub fn new(status: Status) -> Self {
        Self {
            header: 0x00,
            affected_rows: 0,
            last_insert_id: 0,
            status,
            warnings: 0,
            info: String::new(),
            session_state: Vec::new(),
        }
    }

    /// The 0xFE-headed form that terminates a result set when
    /// DEPRECATE_EOF is negotiated.
    pub fn eof(status: Status, warnings: u16) -> Self {
        Self {
            header: 0xFE,
            warnings,
            ..Self::new(status)
        }
    }
}

impl Encode for OkPacket {
    fn encode(&self, buf: &mut Vec<u8>, capabilities: Capabilities) {
        buf.put_u8(self.header);

        // affected rows : int<lenenc>
        buf.put_uint_lenenc::<LittleEndian>(self.affected_rows);

        // last insert id : int<lenenc>
        buf.put_uint_lenenc::<LittleEndian>(self.last_insert_id);

        if capabilities.contains(Capabilities::PROTOCOL_41) {
            buf.put_u16::<LittleEndian>(self.status.bits());
            buf.put_u16::<LittleEndian>(self.warnings);
        } else if capabilities.contains(Capabilities::TRANSACTIONS) {
            buf.put_u16::<LittleEndian>(self.status.bits());
        }

        if capabilities.contains(Capabilities::SESSION_TRACK) {
            // info : string<lenenc>
            buf.put_str_lenenc::<LittleEndian>(&self.info);

            // session state : string<lenenc>, after info (matches the
            // byte layout captured from a reference server)
            if self.status.contains(Status::SERVER_SESSION_STATE_CHANGED) {
                buf.put_bytes_lenenc::<LittleEndian>(&self.session_state);
            }
        } else {
            // info : string<EOF>
            buf.put_str(&self.info);
        }
    }
}

/// A session-state entry announcing the current schema changed.
pub(crate) fn session_track_schema(schema: &str) -> Vec<u8> {
    let mut data = Vec::new();
    data.put_str_lenenc::<LittleEndian>(schema);

    let mut entry = Vec::new();

    // SESSION_TRACK_SCHEMA : int<1>
    entry.put_u8(0x01);
    entry.put_bytes_lenenc::<LittleEndian>(&data);

    entry
}

#[cfg(test)]
mod tests {
    use super::{session_track_schema, Capabilities, Encode, OkPacket, Status};

    #[test]
    fn it_encodes_ok() {
        let mut buf = Vec::new();

        OkPacket::new(Status::SERVER_STATUS_AUTOCOMMIT).encode(
            &mut buf,
            Capabilities::PROTOCOL_41 | Capabilities::TRANSACTIONS,
        );

        assert_eq!(buf, b"\x00\x00\x00\x02\x00\x00\x00");
    }

    #[test]
    fn it_encodes_session_track_schema() {
        let mut p = OkPacket::new(
            Status::SERVER_STATUS_AUTOCOMMIT | Status::SERVER_SESSION_STATE_CHANGED,
        );
        p.session_state = session_track_schema("shop");

        let mut buf = Vec::new();
        p.encode(
            &mut buf,
            Capabilities::PROTOCOL_41 | Capabilities::SESSION_TRACK,
        );

        assert_eq!(buf, b"\x00\x00\x00\x02\x40\x00\x00\x00\x07\x01\x05\x04shop");
    }
}
