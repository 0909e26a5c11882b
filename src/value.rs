use std::fmt::Write as _;
use std::io;

use byteorder::LittleEndian;

use crate::io::{Buf, BufExt, BufMut, BufMutExt};
use crate::protocol::TypeId;

/// A single cell of a row, or a bound statement parameter.
///
/// On the way out, values are rendered according to the *column's* type
/// code: the text protocol always carries the canonical textual form, the
/// binary protocol the per-type layout. Numeric variants coerce to
/// whatever width the column declares.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    Text(String),
    Date {
        year: u16,
        month: u8,
        day: u8,
    },
    DateTime {
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        micros: u32,
    },
    Time {
        negative: bool,
        days: u32,
        hours: u8,
        minutes: u8,
        seconds: u8,
        micros: u32,
    },
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn as_i64(&self) -> i64 {
        match self {
            Value::Int(v) => *v,
            Value::UInt(v) => *v as i64,
            Value::Float(v) => *v as i64,
            Value::Double(v) => *v as i64,
            _ => 0,
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Value::Int(v) => *v as f64,
            Value::UInt(v) => *v as f64,
            Value::Float(v) => f64::from(*v),
            Value::Double(v) => *v,
            _ => 0.0,
        }
    }

    /// The canonical textual rendering, as carried by the text protocol.
    pub fn to_text(&self) -> Vec<u8> {
        match self {
            Value::Null => Vec::new(),

            Value::Int(v) => v.to_string().into_bytes(),
            Value::UInt(v) => v.to_string().into_bytes(),
            Value::Float(v) => v.to_string().into_bytes(),
            Value::Double(v) => v.to_string().into_bytes(),

            Value::Bytes(v) => v.clone(),
            Value::Text(v) => v.clone().into_bytes(),

            Value::Date { year, month, day } => {
                format!("{:04}-{:02}-{:02}", year, month, day).into_bytes()
            }

            Value::DateTime {
                year,
                month,
                day,
                hour,
                minute,
                second,
                micros,
            } => {
                let mut s = format!(
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    year, month, day, hour, minute, second
                );

                if *micros > 0 {
                    let _ = write!(s, ".{:06}", micros);
                }

                s.into_bytes()
            }

            Value::Time {
                negative,
                days,
                hours,
                minutes,
                seconds,
                micros,
            } => {
                let mut s = String::new();

                if *negative {
                    s.push('-');
                }

                let _ = write!(
                    s,
                    "{:02}:{:02}:{:02}",
                    u32::from(*hours) + days * 24,
                    minutes,
                    seconds
                );

                if *micros > 0 {
                    let _ = write!(s, ".{:06}", micros);
                }

                s.into_bytes()
            }
        }
    }

    /// Append this value in text-row form: a length-encoded string, or the
    /// single 0xFB NULL marker.
    pub(crate) fn encode_text(&self, buf: &mut Vec<u8>) {
        if self.is_null() {
            buf.put_u8(0xFB);
        } else {
            buf.put_bytes_lenenc::<LittleEndian>(&self.to_text());
        }
    }

    /// Append this value in binary-row form for a column of `type_id`.
    ///
    /// NULL never reaches here; the row encoder records it in the NULL
    /// bitmap instead.
    pub(crate) fn encode_binary(&self, buf: &mut Vec<u8>, type_id: TypeId) {
        match type_id {
            TypeId::TINY_INT => buf.put_u8(self.as_i64() as u8),

            TypeId::SMALL_INT | TypeId::YEAR => buf.put_i16::<LittleEndian>(self.as_i64() as i16),

            TypeId::INT | TypeId::MEDIUM_INT => buf.put_i32::<LittleEndian>(self.as_i64() as i32),

            TypeId::BIG_INT => match self {
                Value::UInt(v) => buf.put_u64::<LittleEndian>(*v),
                _ => buf.put_i64::<LittleEndian>(self.as_i64()),
            },

            TypeId::FLOAT => buf.put_f32::<LittleEndian>(self.as_f64() as f32),

            TypeId::DOUBLE => buf.put_f64::<LittleEndian>(self.as_f64()),

            TypeId::DATE | TypeId::DATETIME | TypeId::TIMESTAMP => {
                self.encode_binary_datetime(buf)
            }

            TypeId::TIME => self.encode_binary_time(buf),

            // DECIMAL, NEWDECIMAL, CHAR/VARCHAR/TEXT, the BLOB family,
            // BIT, ENUM, SET, JSON, GEOMETRY: all length-encoded strings
            _ => buf.put_bytes_lenenc::<LittleEndian>(&self.to_text()),
        }
    }

    // length ∈ {0, 4, 7, 11}; trailing all-zero groups are dropped
    fn encode_binary_datetime(&self, buf: &mut Vec<u8>) {
        let (year, month, day, hour, minute, second, micros) = match *self {
            Value::Date { year, month, day } => (year, month, day, 0, 0, 0, 0),

            Value::DateTime {
                year,
                month,
                day,
                hour,
                minute,
                second,
                micros,
            } => (year, month, day, hour, minute, second, micros),

            _ => (0, 0, 0, 0, 0, 0, 0),
        };

        let len = if micros != 0 {
            11
        } else if hour != 0 || minute != 0 || second != 0 {
            7
        } else if year != 0 || month != 0 || day != 0 {
            4
        } else {
            0
        };

        buf.put_u8(len);

        if len >= 4 {
            buf.put_u16::<LittleEndian>(year);
            buf.put_u8(month);
            buf.put_u8(day);
        }

        if len >= 7 {
            buf.put_u8(hour);
            buf.put_u8(minute);
            buf.put_u8(second);
        }

        if len == 11 {
            buf.put_u32::<LittleEndian>(micros);
        }
    }

    // length ∈ {0, 8, 12}
    fn encode_binary_time(&self, buf: &mut Vec<u8>) {
        let (negative, days, hours, minutes, seconds, micros) = match *self {
            Value::Time {
                negative,
                days,
                hours,
                minutes,
                seconds,
                micros,
            } => (negative, days, hours, minutes, seconds, micros),

            _ => (false, 0, 0, 0, 0, 0),
        };

        let len = if micros != 0 {
            12
        } else if days != 0 || hours != 0 || minutes != 0 || seconds != 0 {
            8
        } else {
            0
        };

        buf.put_u8(len);

        if len >= 8 {
            buf.put_u8(negative as u8);
            buf.put_u32::<LittleEndian>(days);
            buf.put_u8(hours);
            buf.put_u8(minutes);
            buf.put_u8(seconds);
        }

        if len == 12 {
            buf.put_u32::<LittleEndian>(micros);
        }
    }

    /// Decode one binary-protocol value (a bound parameter) of `type_id`.
    pub(crate) fn decode_binary(
        buf: &mut &[u8],
        type_id: TypeId,
        unsigned: bool,
    ) -> io::Result<Value> {
        Ok(match type_id {
            TypeId::NULL => Value::Null,

            TypeId::TINY_INT => {
                if unsigned {
                    Value::UInt(u64::from(buf.get_u8()?))
                } else {
                    Value::Int(i64::from(buf.get_i8()?))
                }
            }

            TypeId::SMALL_INT | TypeId::YEAR => {
                if unsigned {
                    Value::UInt(u64::from(buf.get_u16::<LittleEndian>()?))
                } else {
                    Value::Int(i64::from(buf.get_i16::<LittleEndian>()?))
                }
            }

            TypeId::INT | TypeId::MEDIUM_INT => {
                if unsigned {
                    Value::UInt(u64::from(buf.get_u32::<LittleEndian>()?))
                } else {
                    Value::Int(i64::from(buf.get_i32::<LittleEndian>()?))
                }
            }

            TypeId::BIG_INT => {
                if unsigned {
                    Value::UInt(buf.get_u64::<LittleEndian>()?)
                } else {
                    Value::Int(buf.get_i64::<LittleEndian>()?)
                }
            }

            TypeId::FLOAT => Value::Float(buf.get_f32::<LittleEndian>()?),

            TypeId::DOUBLE => Value::Double(buf.get_f64::<LittleEndian>()?),

            TypeId::DATE => {
                let (year, month, day, ..) = decode_binary_datetime(buf)?;

                Value::Date { year, month, day }
            }

            TypeId::DATETIME | TypeId::TIMESTAMP => {
                let (year, month, day, hour, minute, second, micros) =
                    decode_binary_datetime(buf)?;

                Value::DateTime {
                    year,
                    month,
                    day,
                    hour,
                    minute,
                    second,
                    micros,
                }
            }

            TypeId::TIME => {
                let len = buf.get_u8()?;

                let (negative, days, hours, minutes, seconds) = if len >= 8 {
                    (
                        buf.get_u8()? != 0,
                        buf.get_u32::<LittleEndian>()?,
                        buf.get_u8()?,
                        buf.get_u8()?,
                        buf.get_u8()?,
                    )
                } else {
                    (false, 0, 0, 0, 0)
                };

                let micros = if len >= 12 {
                    buf.get_u32::<LittleEndian>()?
                } else {
                    0
                };

                Value::Time {
                    negative,
                    days,
                    hours,
                    minutes,
                    seconds,
                    micros,
                }
            }

            TypeId::TINY_BLOB | TypeId::MEDIUM_BLOB | TypeId::LONG_BLOB | TypeId::GEOMETRY
            | TypeId::BIT => {
                Value::Bytes(buf.get_bytes_lenenc::<LittleEndian>()?.unwrap_or_default().to_vec())
            }

            // VARCHAR/CHAR/TEXT, DECIMAL, ENUM, SET, JSON and anything
            // else length-encoded: text when it is valid UTF-8
            _ => {
                let bytes = buf
                    .get_bytes_lenenc::<LittleEndian>()?
                    .unwrap_or_default()
                    .to_vec();

                match String::from_utf8(bytes) {
                    Ok(s) => Value::Text(s),
                    Err(err) => Value::Bytes(err.into_bytes()),
                }
            }
        })
    }
}

fn decode_binary_datetime(buf: &mut &[u8]) -> io::Result<(u16, u8, u8, u8, u8, u8, u32)> {
    let len = buf.get_u8()?;

    let (year, month, day) = if len >= 4 {
        (buf.get_u16::<LittleEndian>()?, buf.get_u8()?, buf.get_u8()?)
    } else {
        (0, 0, 0)
    };

    let (hour, minute, second) = if len >= 7 {
        (buf.get_u8()?, buf.get_u8()?, buf.get_u8()?)
    } else {
        (0, 0, 0)
    };

    let micros = if len >= 11 {
        buf.get_u32::<LittleEndian>()?
    } else {
        0
    };

    Ok((year, month, day, hour, minute, second, micros))
}
