use byteorder::ByteOrder;

use crate::io::BufMut;

/// MySQL length-encoded writes. Integers always take the shortest legal
/// form; 0xFB is reserved for NULL and written only by the row encoders.
pub trait BufMutExt: BufMut {
    fn put_uint_lenenc<T: ByteOrder>(&mut self, val: u64);

    fn put_str_lenenc<T: ByteOrder>(&mut self, val: &str);

    fn put_bytes_lenenc<T: ByteOrder>(&mut self, val: &[u8]);
}

impl BufMutExt for Vec<u8> {
    fn put_uint_lenenc<T: ByteOrder>(&mut self, val: u64) {
        if val < 251 {
            self.put_u8(val as u8);
        } else if val < 0x1_0000 {
            self.put_u8(0xFC);
            self.put_u16::<T>(val as u16);
        } else if val < 0x100_0000 {
            self.put_u8(0xFD);
            self.put_u24::<T>(val as u32);
        } else {
            self.put_u8(0xFE);
            self.put_u64::<T>(val);
        }
    }

    fn put_str_lenenc<T: ByteOrder>(&mut self, val: &str) {
        self.put_bytes_lenenc::<T>(val.as_bytes());
    }

    fn put_bytes_lenenc<T: ByteOrder>(&mut self, val: &[u8]) {
        self.put_uint_lenenc::<T>(val.len() as u64);
        self.put_bytes(val);
    }
}
