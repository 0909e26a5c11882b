use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// A buffered wrapper over the session's byte stream.
///
/// Writes accumulate in `wbuf` until [`flush`]; reads fill `rbuf` from the
/// stream and are handed out with a peek/consume pair so the packet layer
/// can inspect a frame header before committing to the payload length.
pub struct BufStream<S> {
    stream: S,

    // writes with `buffer_mut` are buffered and sent on `flush`
    wbuf: Vec<u8>,

    rbuf: BytesMut,
}

impl<S> BufStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            wbuf: Vec::with_capacity(1024),
            rbuf: BytesMut::with_capacity(8192),
        }
    }

    pub fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.wbuf
    }

    pub async fn flush(&mut self) -> io::Result<()> {
        if !self.wbuf.is_empty() {
            self.stream.write_all(&self.wbuf).await?;
            self.wbuf.clear();
        }

        self.stream.flush().await
    }

    /// Make at least `cnt` bytes available without consuming them.
    ///
    /// Returns `None` on a clean end-of-stream at a read boundary; an
    /// end-of-stream part way into `cnt` bytes is an `UnexpectedEof` error
    /// because it means the peer died mid-frame.
    pub async fn peek(&mut self, cnt: usize) -> io::Result<Option<&[u8]>> {
        while self.rbuf.len() < cnt {
            let read = self.stream.read_buf(&mut self.rbuf).await?;

            if read == 0 {
                if self.rbuf.is_empty() {
                    return Ok(None);
                }

                return Err(io::ErrorKind::UnexpectedEof.into());
            }
        }

        Ok(Some(&self.rbuf[..cnt]))
    }

    pub fn consume(&mut self, cnt: usize) {
        debug_assert!(cnt <= self.rbuf.len());

        let _ = self.rbuf.split_to(cnt);
    }
}

#[cfg(test)]
mod tests {
    use super::BufStream;

    #[tokio::test]
    async fn it_peeks_across_partial_reads() {
        let (client, server) = tokio::io::duplex(4);
        let mut stream = BufStream::new(server);

        let writer = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;

            let mut client = client;
            client.write_all(b"0123456789").await.unwrap();
        });

        let peeked = stream.peek(10).await.unwrap().unwrap();
        assert_eq!(peeked, b"0123456789");

        stream.consume(10);
        writer.await.unwrap();

        // stream closed; a boundary read reports a clean end
        assert!(stream.peek(1).await.unwrap().is_none());
    }
}
