use std::{io, str};

use byteorder::ByteOrder;
use memchr::memchr;

/// Reads primitive values off the front of a byte slice, advancing it.
///
/// Every accessor is bounds-checked: client packets are untrusted input and
/// a short buffer must surface as an error, never a panic.
pub trait Buf<'a> {
    fn advance(&mut self, cnt: usize) -> io::Result<()>;

    /// An unsigned integer of `n` bytes, 1 through 8 (the protocol uses
    /// 1, 2, 3, 4, 6, and 8).
    fn get_uint<T: ByteOrder>(&mut self, n: usize) -> io::Result<u64>;

    fn get_u8(&mut self) -> io::Result<u8>;

    fn get_i8(&mut self) -> io::Result<i8>;

    fn get_u16<T: ByteOrder>(&mut self) -> io::Result<u16>;

    fn get_i16<T: ByteOrder>(&mut self) -> io::Result<i16>;

    fn get_u24<T: ByteOrder>(&mut self) -> io::Result<u32>;

    fn get_u32<T: ByteOrder>(&mut self) -> io::Result<u32>;

    fn get_i32<T: ByteOrder>(&mut self) -> io::Result<i32>;

    fn get_u64<T: ByteOrder>(&mut self) -> io::Result<u64>;

    fn get_i64<T: ByteOrder>(&mut self) -> io::Result<i64>;

    fn get_f32<T: ByteOrder>(&mut self) -> io::Result<f32>;

    fn get_f64<T: ByteOrder>(&mut self) -> io::Result<f64>;

    fn get_bytes(&mut self, len: usize) -> io::Result<&'a [u8]>;

    fn get_str(&mut self, len: usize) -> io::Result<&'a str>;

    /// Bytes up to (and consuming, but not returning) the next `0x00`.
    fn get_str_nul(&mut self) -> io::Result<&'a str>;

    /// The remainder of the buffer as a string.
    fn get_str_eof(&mut self) -> io::Result<&'a str>;
}

fn eof() -> io::Error {
    io::ErrorKind::UnexpectedEof.into()
}

impl<'a> Buf<'a> for &'a [u8] {
    fn advance(&mut self, cnt: usize) -> io::Result<()> {
        if self.len() < cnt {
            return Err(eof());
        }

        *self = &self[cnt..];
        Ok(())
    }

    fn get_uint<T: ByteOrder>(&mut self, n: usize) -> io::Result<u64> {
        Ok(T::read_uint(self.get_bytes(n)?, n))
    }

    fn get_u8(&mut self) -> io::Result<u8> {
        let val = *self.first().ok_or_else(eof)?;
        *self = &self[1..];

        Ok(val)
    }

    fn get_i8(&mut self) -> io::Result<i8> {
        Ok(self.get_u8()? as i8)
    }

    fn get_u16<T: ByteOrder>(&mut self) -> io::Result<u16> {
        Ok(T::read_u16(self.get_bytes(2)?))
    }

    fn get_i16<T: ByteOrder>(&mut self) -> io::Result<i16> {
        Ok(T::read_i16(self.get_bytes(2)?))
    }

    fn get_u24<T: ByteOrder>(&mut self) -> io::Result<u32> {
        Ok(T::read_u24(self.get_bytes(3)?))
    }

    fn get_u32<T: ByteOrder>(&mut self) -> io::Result<u32> {
        Ok(T::read_u32(self.get_bytes(4)?))
    }

    fn get_i32<T: ByteOrder>(&mut self) -> io::Result<i32> {
        Ok(T::read_i32(self.get_bytes(4)?))
    }

    fn get_u64<T: ByteOrder>(&mut self) -> io::Result<u64> {
        Ok(T::read_u64(self.get_bytes(8)?))
    }

    fn get_i64<T: ByteOrder>(&mut self) -> io::Result<i64> {
        Ok(T::read_i64(self.get_bytes(8)?))
    }

    fn get_f32<T: ByteOrder>(&mut self) -> io::Result<f32> {
        Ok(T::read_f32(self.get_bytes(4)?))
    }

    fn get_f64<T: ByteOrder>(&mut self) -> io::Result<f64> {
        Ok(T::read_f64(self.get_bytes(8)?))
    }

    fn get_bytes(&mut self, len: usize) -> io::Result<&'a [u8]> {
        if self.len() < len {
            return Err(eof());
        }

        let buf = &self[..len];
        *self = &self[len..];

        Ok(buf)
    }

    fn get_str(&mut self, len: usize) -> io::Result<&'a str> {
        str::from_utf8(self.get_bytes(len)?)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    fn get_str_nul(&mut self) -> io::Result<&'a str> {
        let len = memchr(b'\0', self).ok_or_else(eof)?;
        let s = &self.get_str(len + 1)?[..len];

        Ok(s)
    }

    fn get_str_eof(&mut self) -> io::Result<&'a str> {
        self.get_str(self.len())
    }
}
