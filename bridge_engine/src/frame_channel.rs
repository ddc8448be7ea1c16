use bytes::{Buf, BufMut, BytesMut};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Decoder, Encoder, FramedRead, FramedWrite};
use tracing::{debug, warn};

use crate::bridge_config::BROWSER_MAX_OUTBOUND_SIZE;
use crate::errors::FrameError;
use crate::types::{InboundMessage, OutboundMessage};

/// Size of the little-endian length prefix.
pub const HEADER_LEN: usize = 4;

/// Frame format: [length: u32 LE][data: bytes]
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<(), FrameError> {
    let length = u32::try_from(payload.len()).map_err(|_| FrameError::TooLarge {
        size: payload.len(),
        max: u32::MAX as usize,
    })?;
    dst.reserve(HEADER_LEN + payload.len());
    dst.put_u32_le(length);
    dst.extend_from_slice(payload);
    Ok(())
}

/// One decoded unit of the input stream.
#[derive(Debug)]
pub enum Frame {
    Payload(BytesMut),
    /// A frame over the size limit whose payload has been dropped.
    Oversized { size: usize, max: usize },
}

#[derive(Debug)]
struct Discard {
    size: usize,
    remaining: usize,
}

/// Length-prefixed codec for the native messaging channel.
///
/// Oversized frames are consumed without being buffered, so the next length
/// prefix still lines up.
#[derive(Debug)]
pub struct MessageCodec {
    max_frame_size: usize,
    discarding: Option<Discard>,
}

impl MessageCodec {
    pub fn new(max_frame_size: usize) -> Self {
        Self {
            max_frame_size,
            discarding: None,
        }
    }
}

impl Decoder for MessageCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(discard) = &mut self.discarding {
            let dropped = discard.remaining.min(src.len());
            src.advance(dropped);
            discard.remaining -= dropped;
            if discard.remaining > 0 {
                return Ok(None);
            }
            let size = discard.size;
            self.discarding = None;
            return Ok(Some(Frame::Oversized {
                size,
                max: self.max_frame_size,
            }));
        }

        if src.len() < HEADER_LEN {
            return Ok(None);
        }

        let length = u32::from_le_bytes([src[0], src[1], src[2], src[3]]) as usize;

        if length > self.max_frame_size {
            src.advance(HEADER_LEN);
            self.discarding = Some(Discard {
                size: length,
                remaining: length,
            });
            return self.decode(src);
        }

        if src.len() < HEADER_LEN + length {
            return Ok(None);
        }

        src.advance(HEADER_LEN);
        Ok(Some(Frame::Payload(src.split_to(length))))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }

        if let Some(discard) = self.discarding.take() {
            return Err(FrameError::Truncated {
                read: discard.size - discard.remaining,
                expected: discard.size,
            });
        }
        if src.is_empty() {
            return Ok(None);
        }

        let err = if src.len() < HEADER_LEN {
            FrameError::Truncated {
                read: src.len(),
                expected: HEADER_LEN,
            }
        } else {
            FrameError::Truncated {
                read: src.len() - HEADER_LEN,
                expected: u32::from_le_bytes([src[0], src[1], src[2], src[3]]) as usize,
            }
        };
        src.clear();
        Err(err)
    }
}

impl Encoder<Vec<u8>> for MessageCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Vec<u8>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame(&item, dst)
    }
}

/// Reads length-prefixed frames from the extension.
pub struct FrameReader<R> {
    frames: FramedRead<R, MessageCodec>,
    recovering: bool,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R, max_frame_size: usize) -> Self {
        Self {
            frames: FramedRead::new(inner, MessageCodec::new(max_frame_size)),
            recovering: false,
        }
    }

    /// Reads the next raw payload.
    ///
    /// Returns `Ok(None)` when the stream ends cleanly before a new frame starts.
    /// A stream that ends inside a frame is reported as [`FrameError::Truncated`].
    pub async fn read_frame(&mut self) -> Result<Option<BytesMut>, FrameError> {
        loop {
            match self.frames.next().await {
                Some(Ok(Frame::Payload(payload))) => {
                    self.recovering = false;
                    debug!("Read frame of {} bytes", payload.len());
                    return Ok(Some(payload));
                }
                Some(Ok(Frame::Oversized { size, max })) => {
                    return Err(FrameError::TooLarge { size, max });
                }
                Some(Err(err)) => {
                    self.recovering = true;
                    return Err(err);
                }
                // FramedRead yields one `None` after an error before reading resumes
                None if self.recovering => self.recovering = false,
                None => return Ok(None),
            }
        }
    }

    /// Reads the next frame and decodes it as an [`InboundMessage`].
    pub async fn read_message(&mut self) -> Result<Option<InboundMessage>, FrameError> {
        match self.read_frame().await? {
            Some(payload) => serde_json::from_slice(&payload)
                .map(Some)
                .map_err(FrameError::Decode),
            None => Ok(None),
        }
    }
}

/// Writes length-prefixed frames back to the extension.
pub struct FrameWriter<W> {
    frames: FramedWrite<W, MessageCodec>,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            frames: FramedWrite::new(inner, MessageCodec::new(usize::MAX)),
        }
    }

    /// Writes prefix and payload in one buffer and flushes.
    pub async fn write_frame(&mut self, payload: Vec<u8>) -> Result<(), FrameError> {
        self.frames.send(payload).await
    }

    pub async fn write_message(&mut self, message: &OutboundMessage) -> Result<(), FrameError> {
        let payload = serde_json::to_vec(message).map_err(FrameError::Encode)?;
        if payload.len() > BROWSER_MAX_OUTBOUND_SIZE {
            warn!(
                "Outbound message is {} bytes, browsers drop messages over {} bytes",
                payload.len(),
                BROWSER_MAX_OUTBOUND_SIZE
            );
        }
        self.write_frame(payload).await
    }

    pub fn into_inner(self) -> W {
        self.frames.into_inner()
    }
}
