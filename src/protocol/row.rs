use crate::io::BufMut;
use crate::protocol::{Capabilities, Encode, TypeId};
use crate::value::Value;

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_query_response_text_resultset_row.html
//
// COM_QUERY results travel as text rows: every value a length-encoded
// string, NULL a bare 0xFB.
#[derive(Debug)]
pub struct TextRow<'a>(pub &'a [Value]);

impl Encode for TextRow<'_> {
    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        for value in self.0 {
            value.encode_text(buf);
        }
    }
}

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_binary_resultset.html#sect_protocol_binary_resultset_row
//
// COM_STMT_EXECUTE results travel as binary rows: a 0x00 header, a NULL
// bitmap with a 2-bit offset, then each non-NULL value in the layout its
// column's type dictates.
#[derive(Debug)]
pub struct BinaryRow<'a> {
    pub values: &'a [Value],
    pub types: &'a [TypeId],
}

impl Encode for BinaryRow<'_> {
    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        debug_assert_eq!(self.values.len(), self.types.len());

        buf.put_u8(0x00);

        // NULL bitmap : byte<(column_count + 7 + 2) / 8>
        let offset = buf.len();
        buf.advance((self.values.len() + 7 + 2) / 8);

        for (i, value) in self.values.iter().enumerate() {
            if value.is_null() {
                let bit = i + 2;
                buf[offset + bit / 8] |= 1 << (bit % 8);
            }
        }

        for (value, type_id) in self.values.iter().zip(self.types) {
            if !value.is_null() {
                value.encode_binary(buf, *type_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BinaryRow, Capabilities, Encode, TextRow, TypeId};
    use crate::value::Value;

    #[test]
    fn it_encodes_a_text_row() {
        let values = [Value::Int(1), Value::Null, Value::Text("a b".into())];
        let mut buf = Vec::new();

        TextRow(&values).encode(&mut buf, Capabilities::PROTOCOL_41);

        assert_eq!(buf, b"\x011\xfb\x03a b");
    }

    // NULL in the first column sets bit 2 of the bitmap
    #[test]
    fn it_encodes_a_binary_row_with_null() {
        let values = [Value::Null, Value::Int(42)];
        let types = [TypeId::INT, TypeId::INT];
        let mut buf = Vec::new();

        BinaryRow {
            values: &values,
            types: &types,
        }
        .encode(&mut buf, Capabilities::PROTOCOL_41);

        assert_eq!(buf, b"\x00\x04\x2a\x00\x00\x00");
    }

    #[test]
    fn wide_rows_grow_the_bitmap() {
        let values = vec![Value::Null; 7];
        let types = vec![TypeId::VAR_CHAR; 7];
        let mut buf = Vec::new();

        BinaryRow {
            values: &values,
            types: &types,
        }
        .encode(&mut buf, Capabilities::PROTOCOL_41);

        // header + 2 bitmap bytes, bits 2..=8 set
        assert_eq!(buf, b"\x00\xfc\x01");
    }
}
