use byteorder::LittleEndian;

use crate::io::{BufMut, BufMutExt};
use crate::protocol::{Capabilities, Encode, FieldFlags, TypeId};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_query_response_text_resultset_column_definition.html
// https://mariadb.com/kb/en/resultset/#column-definition-packet
//
// Also the type the embedding uses to describe its result columns; the
// defaults from [ColumnDefinition::new] are sensible for ad-hoc results.
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    pub schema: String,

    /// Table name as exposed to the client (after AS).
    pub table: String,
    pub original_table: String,

    /// Column name as exposed to the client (after AS).
    pub name: String,
    pub original_name: String,

    pub charset: u16,

    /// Maximum display width.
    pub max_size: u32,

    pub type_id: TypeId,

    pub flags: FieldFlags,

    /// Digits after the decimal point, 0x1F for non-numeric types.
    pub decimals: u8,
}

// utf8mb4_general_ci and the "binary" pseudo-collation
const COLLATION_UTF8MB4: u16 = 45;
const COLLATION_BINARY: u16 = 63;

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, type_id: TypeId) -> Self {
        let (charset, max_size, decimals) = match type_id {
            TypeId::TINY_INT => (COLLATION_BINARY, 4, 0),
            TypeId::SMALL_INT => (COLLATION_BINARY, 6, 0),
            TypeId::MEDIUM_INT | TypeId::INT => (COLLATION_BINARY, 11, 0),
            TypeId::BIG_INT => (COLLATION_BINARY, 21, 0),
            TypeId::FLOAT => (COLLATION_BINARY, 12, 0x1F),
            TypeId::DOUBLE => (COLLATION_BINARY, 22, 0x1F),
            TypeId::YEAR => (COLLATION_BINARY, 4, 0),
            TypeId::DATE => (COLLATION_BINARY, 10, 0),
            TypeId::TIME => (COLLATION_BINARY, 10, 0),
            TypeId::DATETIME | TypeId::TIMESTAMP => (COLLATION_BINARY, 26, 0),
            TypeId::TINY_BLOB | TypeId::MEDIUM_BLOB | TypeId::LONG_BLOB | TypeId::TEXT
            | TypeId::GEOMETRY | TypeId::BIT => (COLLATION_BINARY, 0xFFFF, 0x1F),
            _ => (COLLATION_UTF8MB4, 0xFFFF, 0x1F),
        };

        let mut flags = FieldFlags::empty();

        if charset == COLLATION_BINARY {
            flags |= FieldFlags::BINARY;
        }

        if matches!(
            type_id,
            TypeId::TINY_INT
                | TypeId::SMALL_INT
                | TypeId::MEDIUM_INT
                | TypeId::INT
                | TypeId::BIG_INT
                | TypeId::FLOAT
                | TypeId::DOUBLE
        ) {
            flags |= FieldFlags::NUM;
        }

        Self {
            schema: String::new(),
            table: String::new(),
            original_table: String::new(),
            name: name.into(),
            original_name: String::new(),
            charset,
            max_size,
            type_id,
            flags,
            decimals,
        }
    }

    /// A placeholder definition for a statement parameter, the shape the
    /// reference server reports when it knows nothing about the parameter.
    pub fn parameter() -> Self {
        Self::new("?", TypeId::VAR_CHAR)
    }

    pub fn unsigned(mut self) -> Self {
        self.flags |= FieldFlags::UNSIGNED;
        self
    }

    pub fn in_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }
}

impl Encode for &'_ ColumnDefinition {
    fn encode(&self, buf: &mut Vec<u8>, capabilities: Capabilities) {
        (**self).encode(buf, capabilities);
    }
}

impl Encode for ColumnDefinition {
    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        // catalog : string<lenenc>, always "def"
        buf.put_str_lenenc::<LittleEndian>("def");

        buf.put_str_lenenc::<LittleEndian>(&self.schema);
        buf.put_str_lenenc::<LittleEndian>(&self.table);
        buf.put_str_lenenc::<LittleEndian>(if self.original_table.is_empty() {
            &self.table
        } else {
            &self.original_table
        });
        buf.put_str_lenenc::<LittleEndian>(&self.name);
        buf.put_str_lenenc::<LittleEndian>(if self.original_name.is_empty() {
            &self.name
        } else {
            &self.original_name
        });

        // length of the fixed-length fields : int<lenenc>, always 0x0C
        buf.put_u8(0x0C);

        buf.put_u16::<LittleEndian>(self.charset);
        buf.put_u32::<LittleEndian>(self.max_size);
        buf.put_u8(self.type_id.0);
        buf.put_u16::<LittleEndian>(self.flags.bits());
        buf.put_u8(self.decimals);

        // reserved : string<2>
        buf.advance(2);
    }
}

#[cfg(test)]
mod tests {
    use super::{Capabilities, ColumnDefinition, Encode, FieldFlags, TypeId};

    #[test]
    fn it_encodes_a_column_definition() {
        let mut buf = Vec::new();

        ColumnDefinition::new("1", TypeId::BIG_INT).encode(&mut buf, Capabilities::PROTOCOL_41);

        let expected: &[u8] = &[
            3, b'd', b'e', b'f', // catalog
            0, 0, 0, // schema, table, original table
            1, b'1', // name
            1, b'1', // original name
            0x0C, // fixed-length prefix
            63, 0, // binary collation
            21, 0, 0, 0, // display width
            8,  // LONGLONG
            0x80, 0x80, // BINARY | NUM
            0, // decimals
            0, 0, // reserved
        ];

        assert_eq!(buf, expected);
    }

    #[test]
    fn string_columns_default_to_utf8() {
        let col = ColumnDefinition::new("name", TypeId::VAR_CHAR);

        assert_eq!(col.charset, 45);
        assert!(!col.flags.contains(FieldFlags::BINARY));
    }
}
