use byteorder::LittleEndian;

use crate::io::Buf;

/// First byte of every command-phase client packet.
// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/my__command_8h.html
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandCode {
    Sleep,
    Quit,
    InitDb,
    Query,
    FieldList,
    Statistics,
    ProcessInfo,
    Ping,
    ChangeUser,
    StmtPrepare,
    StmtExecute,
    StmtSendLongData,
    StmtClose,
    StmtReset,
    ResetConnection,
    Unknown(u8),
}

impl CommandCode {
    pub fn from_u8(opcode: u8) -> CommandCode {
        match opcode {
            0x00 => CommandCode::Sleep,
            0x01 => CommandCode::Quit,
            0x02 => CommandCode::InitDb,
            0x03 => CommandCode::Query,
            0x04 => CommandCode::FieldList,
            0x07 => CommandCode::Statistics,
            0x0A => CommandCode::ProcessInfo,
            0x0E => CommandCode::Ping,
            0x11 => CommandCode::ChangeUser,
            0x16 => CommandCode::StmtPrepare,
            0x17 => CommandCode::StmtExecute,
            0x18 => CommandCode::StmtSendLongData,
            0x19 => CommandCode::StmtClose,
            0x1A => CommandCode::StmtReset,
            0x1F => CommandCode::ResetConnection,

            _ => CommandCode::Unknown(opcode),
        }
    }
}

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_init_db.html
#[derive(Debug, PartialEq)]
pub struct ComInitDb {
    pub schema: String,
}

impl ComInitDb {
    pub(crate) fn decode(mut buf: &[u8]) -> crate::Result<Self> {
        Ok(Self {
            schema: buf.get_str_eof()?.to_owned(),
        })
    }
}

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_field_list.html
#[derive(Debug, PartialEq)]
pub struct ComFieldList {
    pub table: String,
    pub wildcard: String,
}

impl ComFieldList {
    pub(crate) fn decode(mut buf: &[u8]) -> crate::Result<Self> {
        Ok(Self {
            table: buf.get_str_nul()?.to_owned(),
            wildcard: buf.get_str_eof()?.to_owned(),
        })
    }
}

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_stmt_close.html
#[derive(Debug, PartialEq)]
pub struct ComStmtClose {
    pub statement_id: u32,
}

impl ComStmtClose {
    pub(crate) fn decode(mut buf: &[u8]) -> crate::Result<Self> {
        Ok(Self {
            statement_id: buf.get_u32::<LittleEndian>()?,
        })
    }
}

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_stmt_reset.html
#[derive(Debug, PartialEq)]
pub struct ComStmtReset {
    pub statement_id: u32,
}

impl ComStmtReset {
    pub(crate) fn decode(mut buf: &[u8]) -> crate::Result<Self> {
        Ok(Self {
            statement_id: buf.get_u32::<LittleEndian>()?,
        })
    }
}

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_stmt_send_long_data.html
//
// Streams a chunk of one parameter's value ahead of execution. Never
// answered, not even on error.
#[derive(Debug, PartialEq)]
pub struct ComStmtSendLongData {
    pub statement_id: u32,
    pub param_index: u16,
    pub data: Vec<u8>,
}

impl ComStmtSendLongData {
    pub(crate) fn decode(mut buf: &[u8]) -> crate::Result<Self> {
        Ok(Self {
            statement_id: buf.get_u32::<LittleEndian>()?,
            param_index: buf.get_u16::<LittleEndian>()?,
            data: buf.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ComFieldList, ComInitDb, ComStmtSendLongData, CommandCode};

    #[test]
    fn it_decodes_command_codes() {
        assert_eq!(CommandCode::from_u8(0x03), CommandCode::Query);
        assert_eq!(CommandCode::from_u8(0x2A), CommandCode::Unknown(0x2A));
    }

    #[test]
    fn it_decodes_com_init_db() {
        // payload from the protocol documentation, opcode stripped
        let p = ComInitDb::decode(b"test").unwrap();

        assert_eq!(p.schema, "test");
    }

    #[test]
    fn it_decodes_com_field_list() {
        let p = ComFieldList::decode(b"orders\0%").unwrap();

        assert_eq!(p.table, "orders");
        assert_eq!(p.wildcard, "%");
    }

    #[test]
    fn it_decodes_com_stmt_send_long_data() {
        let p = ComStmtSendLongData::decode(b"\x02\x00\x00\x00\x01\x00abc").unwrap();

        assert_eq!(p.statement_id, 2);
        assert_eq!(p.param_index, 1);
        assert_eq!(p.data, b"abc");
    }
}
