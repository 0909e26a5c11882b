use byteorder::LittleEndian;

use crate::io::{Buf, BufExt};
use crate::protocol::{Capabilities, TypeId};
use crate::value::Value;

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_query.html
//
// When QUERY_ATTRIBUTES was negotiated the SQL text is preceded by an
// attribute block; parsing it is gated strictly on the negotiated bit
// because a non-attribute client's SQL could otherwise start with bytes
// that look like a parameter count.
#[derive(Debug, PartialEq)]
pub struct ComQuery {
    pub sql: String,
    pub attrs: Vec<(String, Value)>,
}

impl ComQuery {
    pub(crate) fn decode(mut buf: &[u8], capabilities: Capabilities) -> crate::Result<Self> {
        let mut attrs = Vec::new();

        if capabilities.contains(Capabilities::QUERY_ATTRIBUTES) {
            // parameter count : int<lenenc>
            let count = buf.get_uint_lenenc::<LittleEndian>()?.unwrap_or(0) as usize;

            // parameter set count : int<lenenc>, always 1
            let _parameter_sets = buf.get_uint_lenenc::<LittleEndian>()?;

            if count > 0 {
                // NULL bitmap : binary<(count + 7) / 8>
                let null_bitmap = buf.get_bytes((count + 7) / 8)?.to_vec();

                // new params bind flag : int<1>, always 1 for COM_QUERY
                let bound = buf.get_u8()?;

                if bound != 1 {
                    return Err(protocol_err!(
                        "COM_QUERY attributes sent without parameter types"
                    ));
                }

                let mut types = Vec::with_capacity(count);

                for _ in 0..count {
                    // parameter type : int<2>
                    let type_id = TypeId(buf.get_u8()?);
                    let flags = buf.get_u8()?;

                    // parameter name : string<lenenc>
                    let name = buf.get_str_lenenc::<LittleEndian>()?.unwrap_or_default();

                    types.push((type_id, flags & 0x80 != 0, name.to_owned()));
                }

                for (i, (type_id, unsigned, name)) in types.into_iter().enumerate() {
                    let value = if null_bitmap[i / 8] & (1 << (i % 8)) != 0 {
                        Value::Null
                    } else {
                        Value::decode_binary(&mut buf, type_id, unsigned)?
                    };

                    attrs.push((name, value));
                }
            }
        }

        Ok(Self {
            sql: buf.get_str_eof()?.to_owned(),
            attrs,
        })
    }
}
