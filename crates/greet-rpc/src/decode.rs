use std::{
    error::Error as StdError,
    fmt::{self, Display, Formatter},
    marker::PhantomData,
    pin::Pin,
    task::{Context, Poll},
};

use bytes::{Buf, Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use prost::Message as PbMsg;

use crate::{
    body::Body,
    encode::FRAME_HEADER_LEN,
    status::{Code, Status},
    BoxError,
};

/// Splits buffered body data into gRPC frames.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: BytesMut,
}

impl FrameDecoder {
    /// Create a new decoder with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a chunk of body data.
    pub fn put(&mut self, data: impl AsRef<[u8]>) {
        self.buf.extend_from_slice(data.as_ref());
    }

    /// Take the next complete frame out of the buffer, if there is one.
    pub fn next_frame(&mut self) -> Result<Option<Bytes>, DecodeBodyError> {
        if self.buf.len() < FRAME_HEADER_LEN {
            return Ok(None);
        }

        match self.buf[0] {
            0 => {}
            flag => return Err(DecodeBodyError::Compressed(flag)),
        }

        let len = u32::from_be_bytes([self.buf[1], self.buf[2], self.buf[3], self.buf[4]]) as usize;
        if self.buf.len() < FRAME_HEADER_LEN + len {
            return Ok(None);
        }

        self.buf.advance(FRAME_HEADER_LEN);
        Ok(Some(self.buf.split_to(len).freeze()))
    }

    /// Make sure no partial frame is left in the buffer.
    pub fn finish(&self) -> Result<(), DecodeBodyError> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(DecodeBodyError::Incomplete)
        }
    }
}

/// A stream of messages decoded from a [`Body`].
#[must_use = "streams do nothing unless polled"]
pub struct MessageStream<T> {
    body: Body,
    decoder: FrameDecoder,
    done: bool,
    msg: PhantomData<fn() -> T>,
}

impl<T> MessageStream<T> {
    pub(crate) fn new(body: Body) -> Self {
        Self {
            body,
            decoder: FrameDecoder::new(),
            done: false,
            msg: PhantomData,
        }
    }
}

impl<T: PbMsg + Default> Stream for MessageStream<T> {
    type Item = Result<T, DecodeBodyError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.done {
                return Poll::Ready(None);
            }

            match this.decoder.next_frame() {
                Ok(Some(frame)) => {
                    let decoded = T::decode(frame).map_err(DecodeBodyError::InvalidProtoMessage);
                    return Poll::Ready(Some(decoded));
                }
                Ok(None) => {}
                Err(err) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(err)));
                }
            }

            match futures_util::ready!(this.body.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => this.decoder.put(chunk),
                Some(Err(err)) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(DecodeBodyError::from_body_error(err))));
                }
                None => {
                    this.done = true;
                    if let Err(err) = this.decoder.finish() {
                        return Poll::Ready(Some(Err(err)));
                    }
                }
            }
        }
    }
}

/// Errors that can occur while decoding the messages of a [`Body`].
#[derive(Debug)]
pub enum DecodeBodyError {
    /// The body contained an invalid protobuf message.
    InvalidProtoMessage(prost::DecodeError),
    /// A frame had a compression flag set. Compression is not supported.
    Compressed(u8),
    /// The body ended in the middle of a frame.
    Incomplete,
    /// The body ended without any message.
    MissingMessage,
    /// The remote end reported a non-OK status.
    Status(Status),
    /// An error occured while reading the body.
    InvalidBody(BoxError),
}

impl DecodeBodyError {
    fn from_body_error(err: BoxError) -> Self {
        match err.downcast::<Status>() {
            Ok(status) => Self::Status(*status),
            Err(err) => Self::InvalidBody(err),
        }
    }
}

impl Display for DecodeBodyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidProtoMessage(err) => {
                write!(f, "body contains invalid protobuf message: {}", err)
            }
            Self::Compressed(flag) => write!(f, "unsupported compressed flag: {}", flag),
            Self::Incomplete => f.write_str("body ended in the middle of a message"),
            Self::MissingMessage => f.write_str("body did not contain a message"),
            Self::Status(status) => write!(f, "remote returned {}", status),
            Self::InvalidBody(err) => write!(f, "error occured while reading body: {}", err),
        }
    }
}

impl StdError for DecodeBodyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::InvalidProtoMessage(err) => Some(err),
            Self::Status(status) => Some(status),
            Self::InvalidBody(err) => err.source(),
            _ => None,
        }
    }
}

impl From<DecodeBodyError> for Status {
    fn from(err: DecodeBodyError) -> Self {
        match err {
            DecodeBodyError::Status(status) => status,
            DecodeBodyError::Compressed(_) => {
                Status::new(Code::Unimplemented).with_message(err.to_string())
            }
            _ => Status::new(Code::Internal).with_message(err.to_string()),
        }
    }
}
