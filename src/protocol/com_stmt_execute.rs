use byteorder::LittleEndian;

use crate::io::{Buf, BufExt};
use crate::protocol::{Capabilities, TypeId};
use crate::value::Value;

// COM_STMT_EXECUTE flag bits
// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_stmt_execute.html
const CURSOR_TYPE_READ_ONLY: u8 = 1;
const PARAMETER_COUNT_AVAILABLE: u8 = 8;

/// The decoded body of COM_STMT_EXECUTE (after the statement id, which the
/// dispatcher reads first to locate the statement).
#[derive(Debug)]
pub struct ComStmtExecute {
    pub flags: u8,
    /// Statement parameters, in declaration order. Parameters whose value
    /// arrived via COM_STMT_SEND_LONG_DATA decode as NULL here and are
    /// merged from the registry afterwards.
    pub params: Vec<Value>,
    /// Named query attributes, when QUERY_ATTRIBUTES was negotiated.
    pub attrs: Vec<(String, Value)>,
    /// Parameter types as (re)bound by this execution, for the registry to
    /// cache; `None` when the client reused the previous binding.
    pub types: Option<Vec<(TypeId, bool)>>,
}

impl ComStmtExecute {
    pub fn wants_cursor(&self) -> bool {
        self.flags & CURSOR_TYPE_READ_ONLY != 0
    }

    /// `param_count` comes from the statement record, `cached_types` from
    /// its previous execution, and `long_data[i]` says whether parameter
    /// `i` already has streamed data.
    pub(crate) fn decode(
        mut buf: &[u8],
        capabilities: Capabilities,
        param_count: usize,
        cached_types: Option<&[(TypeId, bool)]>,
        long_data: &[bool],
    ) -> crate::Result<Self> {
        // flags : int<1>
        let flags = buf.get_u8()?;

        // iteration count : int<4>, always 1
        let _iterations = buf.get_u32::<LittleEndian>()?;

        let query_attributes = capabilities.contains(Capabilities::QUERY_ATTRIBUTES);

        let total = if query_attributes && flags & PARAMETER_COUNT_AVAILABLE != 0 {
            // parameter count : int<lenenc>, covers params and attributes
            buf.get_uint_lenenc::<LittleEndian>()?.unwrap_or(0) as usize
        } else {
            param_count
        };

        if total < param_count {
            return Err(protocol_err!(
                "COM_STMT_EXECUTE carried {} parameters; statement declares {}",
                total,
                param_count
            ));
        }

        let mut params = Vec::with_capacity(param_count);
        let mut attrs = Vec::new();
        let mut bound_types = None;

        if total > 0 {
            // NULL bitmap : binary<(total + 7) / 8>
            let null_bitmap = buf.get_bytes((total + 7) / 8)?.to_vec();

            // new params bind flag : int<1>
            let rebound = buf.get_u8()? == 1;

            let types: Vec<(TypeId, bool, String)> = if rebound {
                let mut types = Vec::with_capacity(total);

                for _ in 0..total {
                    // parameter type : int<2>
                    let type_id = TypeId(buf.get_u8()?);
                    let flag = buf.get_u8()?;

                    // parameter name : string<lenenc>, attributes only
                    let name = if query_attributes {
                        buf.get_str_lenenc::<LittleEndian>()?.unwrap_or_default().to_owned()
                    } else {
                        String::new()
                    };

                    types.push((type_id, flag & 0x80 != 0, name));
                }

                bound_types = Some(
                    types[..param_count]
                        .iter()
                        .map(|(t, unsigned, _)| (*t, *unsigned))
                        .collect(),
                );

                types
            } else {
                let cached = cached_types.ok_or_else(|| {
                    protocol_err!("COM_STMT_EXECUTE reused parameter types that were never bound")
                })?;

                cached
                    .iter()
                    .map(|(t, unsigned)| (*t, *unsigned, String::new()))
                    .collect()
            };

            if types.len() != total {
                return Err(protocol_err!(
                    "COM_STMT_EXECUTE bound {} parameter types; expected {}",
                    types.len(),
                    total
                ));
            }

            for (i, (type_id, unsigned, name)) in types.into_iter().enumerate() {
                let is_null = null_bitmap[i / 8] & (1 << (i % 8)) != 0;
                let streamed = i < param_count && long_data[i];

                let value = if is_null || streamed {
                    Value::Null
                } else {
                    Value::decode_binary(&mut buf, type_id, unsigned)?
                };

                if i < param_count {
                    params.push(value);
                } else {
                    attrs.push((name, value));
                }
            }
        }

        Ok(Self {
            flags,
            params,
            attrs,
            types: bound_types,
        })
    }
}

#[cfg(test)]
mod tests {
    use byteorder::LittleEndian;

    use super::{Capabilities, ComStmtExecute, TypeId, Value};
    use crate::io::BufMut;

    // scenario: execute `SELECT ?, ?` with [NULL, 42]
    #[test]
    fn it_decodes_params_with_null() {
        let mut buf = Vec::new();

        buf.put_u8(0); // flags
        buf.put_u32::<LittleEndian>(1); // iterations
        buf.put_u8(0b0000_0001); // NULL bitmap: first param
        buf.put_u8(1); // new params bound
        buf.put_u8(6); // NULL type
        buf.put_u8(0);
        buf.put_u8(3); // LONG
        buf.put_u8(0);
        buf.put_u32::<LittleEndian>(42);

        let p = ComStmtExecute::decode(&buf, Capabilities::PROTOCOL_41, 2, None, &[false, false])
            .unwrap();

        assert_eq!(p.params, vec![Value::Null, Value::Int(42)]);
        assert_eq!(
            p.types.as_deref(),
            Some(&[(TypeId::NULL, false), (TypeId::INT, false)][..])
        );
        assert!(p.attrs.is_empty());
    }

    #[test]
    fn it_reuses_cached_types() {
        let mut buf = Vec::new();

        buf.put_u8(0);
        buf.put_u32::<LittleEndian>(1);
        buf.put_u8(0); // NULL bitmap
        buf.put_u8(0); // types not resent
        buf.put_u32::<LittleEndian>(7);

        let cached = [(TypeId::INT, false)];
        let p = ComStmtExecute::decode(&buf, Capabilities::PROTOCOL_41, 1, Some(&cached), &[false])
            .unwrap();

        assert_eq!(p.params, vec![Value::Int(7)]);
        assert!(p.types.is_none());
    }

    #[test]
    fn it_skips_values_for_streamed_params() {
        let mut buf = Vec::new();

        buf.put_u8(0);
        buf.put_u32::<LittleEndian>(1);
        buf.put_u8(0); // NULL bitmap: nothing null on the wire
        buf.put_u8(1);
        buf.put_u8(252); // BLOB
        buf.put_u8(0);
        // no value bytes follow: the data was streamed

        let p = ComStmtExecute::decode(&buf, Capabilities::PROTOCOL_41, 1, None, &[true]).unwrap();

        assert_eq!(p.params, vec![Value::Null]);
    }

    #[test]
    fn it_decodes_attributes_past_the_declared_params() {
        let caps = Capabilities::PROTOCOL_41 | Capabilities::QUERY_ATTRIBUTES;
        let mut buf = Vec::new();

        buf.put_u8(8); // PARAMETER_COUNT_AVAILABLE
        buf.put_u32::<LittleEndian>(1);
        buf.put_u8(2); // parameter count: 1 param + 1 attribute
        buf.put_u8(0); // NULL bitmap
        buf.put_u8(1); // new params bound
        buf.put_u8(3); // LONG, positional parameter
        buf.put_u8(0);
        buf.put_u8(0); // empty name
        buf.put_u8(8); // LONGLONG attribute
        buf.put_u8(0);
        buf.put_u8(4);
        buf.put_str("mesh");
        buf.put_u32::<LittleEndian>(1);
        buf.put_u64::<LittleEndian>(17);

        let p = ComStmtExecute::decode(&buf, caps, 1, None, &[false]).unwrap();

        assert_eq!(p.params, vec![Value::Int(1)]);
        assert_eq!(p.attrs, vec![("mesh".to_owned(), Value::Int(17))]);
    }
}
