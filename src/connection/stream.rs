use byteorder::LittleEndian;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::io::{BufMut, BufStream};
use crate::protocol::{Capabilities, Encode};

// A frame of exactly this payload length promises a continuation frame.
const MAX_FRAME_SIZE: usize = 0xFF_FFFF;

/// Packet-level view of the session's byte stream.
///
/// Frames are 3-byte little-endian length, 1-byte sequence id, payload.
/// Logical packets split across frames at 2^24−1 bytes on the way out and
/// are joined on the way in. The sequence counter lives here but is reset
/// by the connection state machine at phase boundaries; every frame in
/// either direction must continue the chain or the connection dies.
pub(crate) struct PacketStream<IO> {
    stream: BufStream<IO>,

    /// Negotiated capability set; the server-advertised set until the
    /// handshake response arrives.
    pub(crate) capabilities: Capabilities,

    seq_id: u8,

    // scratch for encoding a packet before framing
    ebuf: Vec<u8>,

    // most recently received logical packet
    packet_buf: Vec<u8>,
}

impl<IO> PacketStream<IO>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(io: IO, capabilities: Capabilities) -> Self {
        Self {
            stream: BufStream::new(io),
            capabilities,
            seq_id: 0,
            ebuf: Vec::with_capacity(1024),
            packet_buf: Vec::with_capacity(1024),
        }
    }

    /// A new phase begins: the next packet in either direction carries
    /// sequence id 0.
    pub(crate) fn reset_seq(&mut self) {
        self.seq_id = 0;
    }

    /// Frame a packet into the write buffer without sending it.
    pub(crate) fn write<T>(&mut self, packet: T)
    where
        T: Encode,
    {
        self.ebuf.clear();
        packet.encode(&mut self.ebuf, self.capabilities);

        let mut seq_id = self.seq_id;
        let buf = self.stream.buffer_mut();
        let mut payload = self.ebuf.as_slice();

        // Frames of exactly MAX_FRAME_SIZE must be followed by another
        // frame, so a payload landing on the boundary gets an empty tail.
        loop {
            let frame_len = payload.len().min(MAX_FRAME_SIZE);

            buf.put_u24::<LittleEndian>(frame_len as u32);
            buf.put_u8(seq_id);
            buf.put_bytes(&payload[..frame_len]);

            seq_id = seq_id.wrapping_add(1);
            payload = &payload[frame_len..];

            if frame_len < MAX_FRAME_SIZE {
                break;
            }
        }

        self.seq_id = seq_id;
    }

    pub(crate) async fn send<T>(&mut self, packet: T) -> crate::Result<()>
    where
        T: Encode,
    {
        self.write(packet);
        self.flush().await
    }

    pub(crate) async fn flush(&mut self) -> crate::Result<()> {
        Ok(self.stream.flush().await?)
    }

    /// Receive one logical packet, joining continuation frames.
    pub(crate) async fn receive(&mut self) -> crate::Result<&[u8]> {
        match self.try_receive().await? {
            Some(_) => Ok(&self.packet_buf),
            None => Err(protocol_err!("connection closed mid-conversation")),
        }
    }

    /// Like [`receive`], but a clean end-of-stream before the first frame
    /// is `None`: the peer hung up between commands, which is not an
    /// error.
    pub(crate) async fn try_receive(&mut self) -> crate::Result<Option<&[u8]>> {
        self.packet_buf.clear();

        loop {
            let mut header = match self.stream.peek(4).await? {
                Some(header) => header,

                None if self.packet_buf.is_empty() => return Ok(None),

                None => {
                    return Err(protocol_err!("stream ended awaiting a continuation frame"));
                }
            };

            let frame_len = {
                use crate::io::Buf;

                let len = header.get_u24::<LittleEndian>()? as usize;
                let seq_id = header.get_u8()?;

                if seq_id != self.seq_id {
                    return Err(protocol_err!(
                        "packets out of order: expected sequence id {}, received {}",
                        self.seq_id,
                        seq_id
                    ));
                }

                self.seq_id = seq_id.wrapping_add(1);
                len
            };

            self.stream.consume(4);

            let payload = self
                .stream
                .peek(frame_len)
                .await?
                .ok_or_else(|| protocol_err!("stream ended mid-frame"))?;

            self.packet_buf.extend_from_slice(payload);
            self.stream.consume(frame_len);

            if frame_len < MAX_FRAME_SIZE {
                break;
            }
        }

        Ok(Some(&self.packet_buf))
    }
}
