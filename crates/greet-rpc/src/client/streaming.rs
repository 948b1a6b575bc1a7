use std::{
    borrow::Cow,
    error::Error as StdError,
    fmt::{self, Debug, Formatter},
    future::Future,
    marker::PhantomData,
    pin::Pin,
    task::{Context, Poll},
};

use futures_util::{Stream, StreamExt, TryStreamExt};
use prost::Message as PbMsg;
use tokio::time::Sleep;

use super::error::{ClientError, ClientResult};
use crate::{
    decode::MessageStream,
    status::{Code, Status},
};

/// A stream of response messages of a streaming call.
///
/// The stream ends after the first error. A fault reported by the service
/// at the end of the call is yielded as a [`ClientError::RemoteCall`].
#[must_use = "streams do nothing unless polled"]
pub struct Streaming<T, TransportError> {
    messages: MessageStream<T>,
    endpoint: Cow<'static, str>,
    deadline: Option<Pin<Box<Sleep>>>,
    done: bool,
    err: PhantomData<fn() -> TransportError>,
}

impl<T, TransportError> Streaming<T, TransportError> {
    pub(crate) fn new(
        messages: MessageStream<T>,
        endpoint: Cow<'static, str>,
        deadline: Option<Pin<Box<Sleep>>>,
    ) -> Self {
        Self {
            messages,
            endpoint,
            deadline,
            done: false,
            err: PhantomData,
        }
    }

    /// The endpoint this stream belongs to.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_ref()
    }
}

impl<T, TransportError> Streaming<T, TransportError>
where
    T: PbMsg + Default,
    TransportError: StdError,
{
    /// Receive the next message. Returns `None` once the call is finished.
    pub async fn message(&mut self) -> Option<ClientResult<T, TransportError>> {
        self.next().await
    }

    /// Receive every remaining message.
    pub async fn collect_messages(self) -> ClientResult<Vec<T>, TransportError> {
        self.try_collect().await
    }
}

impl<T, TransportError> Stream for Streaming<T, TransportError>
where
    T: PbMsg + Default,
    TransportError: StdError,
{
    type Item = ClientResult<T, TransportError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.done {
            return Poll::Ready(None);
        }

        if let Some(deadline) = this.deadline.as_mut() {
            if deadline.as_mut().poll(cx).is_ready() {
                this.done = true;
                return Poll::Ready(Some(Err(deadline_exceeded(this.endpoint.clone()))));
            }
        }

        match futures_util::ready!(this.messages.poll_next_unpin(cx)) {
            Some(Ok(message)) => Poll::Ready(Some(Ok(message))),
            Some(Err(err)) => {
                this.done = true;
                Poll::Ready(Some(Err(ClientError::from_decode(
                    err,
                    this.endpoint.clone(),
                ))))
            }
            None => {
                this.done = true;
                Poll::Ready(None)
            }
        }
    }
}

impl<T, TransportError> Debug for Streaming<T, TransportError> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Streaming")
            .field("endpoint", &self.endpoint)
            .field("done", &self.done)
            .finish()
    }
}

pub(crate) fn deadline_exceeded<TransportError: StdError>(
    endpoint: Cow<'static, str>,
) -> ClientError<TransportError> {
    ClientError::remote_call(
        Status::new(Code::DeadlineExceeded).with_message("deadline exceeded"),
        endpoint,
    )
}
