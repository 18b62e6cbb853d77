use bytes::BytesMut;
use tokio_util::codec::Encoder;

use crate::frame::Frame;
use crate::Error;

/// Writes frames onto the connection. Inbound data does not go through a codec: it is read one
/// chunk at a time into a [`ReadBuffer`](crate::buffer::ReadBuffer).
pub struct FrameCodec;

impl Encoder<Frame> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let bytes = frame.serialize();
        dst.reserve(bytes.len());
        dst.extend_from_slice(&bytes);

        Ok(())
    }
}
