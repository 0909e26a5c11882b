use crate::io::BufMut;
use crate::protocol::Capabilities;

/// A packet the server sends. The shape of almost every packet depends on
/// the capability set negotiated in the handshake, so it is threaded
/// through every encode.
pub trait Encode {
    fn encode(&self, buf: &mut Vec<u8>, capabilities: Capabilities);
}

impl Encode for &'_ [u8] {
    fn encode(&self, buf: &mut Vec<u8>, _: Capabilities) {
        buf.put_bytes(self);
    }
}
