use std::{
    fmt::{self, Debug, Formatter},
    pin::Pin,
    task::{Context, Poll},
};

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use prost::Message as PbMsg;

use super::BoxError;
use crate::{
    decode::{DecodeBodyError, MessageStream},
    encode::encode_grpc_frame,
    status::Status,
};

/// Type of the item that a [`Body`] produces.
pub type BodyResult = Result<Bytes, BoxError>;

/// A request or response body.
///
/// Bodies carry gRPC framed bytes. A fault reported by the remote end shows
/// up as a [`Status`] error item, after which the body yields nothing more.
pub struct Body {
    stream: Pin<Box<dyn Stream<Item = BodyResult> + Send + 'static>>,
}

impl Body {
    /// Create a new body by wrapping a stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = BodyResult> + Send + 'static,
    {
        Self {
            stream: Box::pin(stream),
        }
    }

    /// Create a new, empty body.
    pub fn empty() -> Self {
        Self::new(futures_util::stream::empty())
    }

    /// Create a body using a single chunk of data.
    pub fn full<Data>(data: Data) -> Self
    where
        Data: Into<Bytes>,
    {
        Self::new(futures_util::stream::once(futures_util::future::ready(Ok(
            data.into(),
        ))))
    }

    /// Create a body that yields the given status as an error.
    pub fn status(status: Status) -> Self {
        Self::new(futures_util::stream::once(futures_util::future::ready(Err(
            status.into(),
        ))))
    }

    /// Create a body holding a single framed message.
    pub fn message<T: PbMsg>(msg: &T) -> Self {
        Self::full(encode_grpc_frame(msg).freeze())
    }

    /// Create a body framing every message of the stream.
    pub fn from_messages<T, S>(messages: S) -> Self
    where
        T: PbMsg,
        S: Stream<Item = T> + Send + 'static,
    {
        Self::new(messages.map(|msg| Ok(encode_grpc_frame(&msg).freeze())))
    }

    /// Append the items of another body after the items of this one.
    pub fn chain(self, other: Body) -> Self {
        Self::new(StreamExt::chain(self, other))
    }

    /// Decode the framed messages in this body.
    pub fn into_messages<T: PbMsg + Default>(self) -> MessageStream<T> {
        MessageStream::new(self)
    }

    /// Decode exactly one message from this body.
    ///
    /// Extra messages after the first one are ignored.
    pub async fn into_message<T: PbMsg + Default>(self) -> Result<T, DecodeBodyError> {
        self.into_messages()
            .next()
            .await
            .unwrap_or(Err(DecodeBodyError::MissingMessage))
    }
}

impl Stream for Body {
    type Item = BodyResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.poll_next_unpin(cx)
    }
}

impl Debug for Body {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body").field("stream", &"<hidden>").finish()
    }
}
