use futures::SinkExt;
use std::net::SocketAddr;
use tokio::io::AsyncReadExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::FramedWrite;
use uuid::Uuid;

use crate::buffer::ReadBuffer;
use crate::codec::FrameCodec;
use crate::frame::Frame;
use crate::Error;

pub struct Connection {
    pub id: Uuid,
    pub client_address: SocketAddr,
    reader: OwnedReadHalf,
    // Each read fills the buffer from the start; whatever the previous read left unparsed is
    // discarded.
    buffer: ReadBuffer,
    writer: FramedWrite<OwnedWriteHalf, FrameCodec>,
}

impl Connection {
    pub fn new(stream: TcpStream, client_address: SocketAddr) -> Connection {
        let (reader, writer) = stream.into_split();

        Connection {
            id: Uuid::new_v4(),
            client_address,
            reader,
            buffer: ReadBuffer::new(),
            writer: FramedWrite::new(writer, FrameCodec),
        }
    }

    /// Performs a single read from the socket and decodes one frame from it.
    ///
    /// Returns `None` once the peer closed the connection. A frame that does not fit in one
    /// read, or a read that holds more than one frame, is not reassembled: only the first frame
    /// of each read is decoded, possibly truncated.
    pub async fn read_frame(&mut self) -> Result<Option<Frame>, Error> {
        let read = self.reader.read(self.buffer.write_into()).await?;
        if read == 0 {
            return Ok(None);
        }

        let frame = Frame::parse(&mut self.buffer)?;

        Ok(Some(frame))
    }

    pub async fn write_frame(&mut self, frame: Frame) -> Result<(), Error> {
        self.writer.send(frame).await
    }
}
