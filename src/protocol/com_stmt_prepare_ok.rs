use byteorder::LittleEndian;

use crate::io::BufMut;
use crate::protocol::{Capabilities, Encode};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_stmt_prepare.html#sect_protocol_com_stmt_prepare_response_ok
//
// Followed by `params` parameter definitions and `columns` column
// definitions, each group terminated by EOF unless DEPRECATE_EOF was
// negotiated.
#[derive(Debug)]
pub struct ComStmtPrepareOk {
    pub statement_id: u32,
    pub columns: u16,
    pub params: u16,
    pub warnings: u16,
}

impl Encode for ComStmtPrepareOk {
    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        // status : int<1>, always 0x00
        buf.put_u8(0x00);

        buf.put_u32::<LittleEndian>(self.statement_id);
        buf.put_u16::<LittleEndian>(self.columns);
        buf.put_u16::<LittleEndian>(self.params);

        // reserved : string<1>
        buf.put_u8(0x00);

        buf.put_u16::<LittleEndian>(self.warnings);
    }
}
