use std::{
    borrow::Cow,
    error::Error as StdError,
    fmt::{self, Display, Formatter},
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures_channel::mpsc::{self, UnboundedReceiver as MpscReceiver, UnboundedSender as MpscSender};
use futures_util::{FutureExt, StreamExt};
use tokio::sync::oneshot::{self, Receiver as OneshotReceiver, Sender as OneshotSender};
use tower::Service;

use super::{TransportRequest, TransportResponse};
use crate::{
    box_error,
    client::error::{ClientError, ClientResult},
    status::Status,
};

type MockCall = (
    TransportRequest,
    OneshotSender<Result<TransportResponse, Status>>,
);

/// A mock sender, used by [`Mock`] to send requests.
#[derive(Clone)]
pub struct MockSender {
    inner: MpscSender<MockCall>,
}

/// A mock receiver, used to answer the requests sent by a [`Mock`].
pub struct MockReceiver {
    inner: MpscReceiver<MockCall>,
}

/// Create a new pair of mock channels.
pub fn new_mock_channels() -> (MockSender, MockReceiver) {
    let (tx, rx) = mpsc::unbounded();
    (MockSender { inner: tx }, MockReceiver { inner: rx })
}

impl MockReceiver {
    /// Answer every request with the given handler, until all senders are
    /// dropped.
    ///
    /// An `Err` returned by the handler is reported to the client as a fault
    /// of the remote service.
    pub async fn serve<F, Fut>(mut self, mut handler: F)
    where
        F: FnMut(TransportRequest) -> Fut,
        Fut: Future<Output = Result<TransportResponse, Status>>,
    {
        while let Some((req, resp_tx)) = self.inner.next().await {
            tracing::debug!(endpoint = %req.endpoint, "mock transport received request");
            let resp = handler(req).await;
            // the client may have stopped waiting
            let _ = resp_tx.send(resp);
        }
    }
}

/// A client transport that uses a channel to send requests to a (possibly)
/// mock server.
#[derive(Clone)]
pub struct Mock {
    tx: MockSender,
}

impl Mock {
    /// Create a new mock client.
    pub fn new(tx: MockSender) -> Self {
        Self { tx }
    }
}

impl Service<TransportRequest> for Mock {
    type Response = TransportResponse;

    type Error = ClientError<MockError>;

    type Future = MockCallFuture;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Ok(()).into()
    }

    fn call(&mut self, req: TransportRequest) -> Self::Future {
        let endpoint = req.endpoint.clone();
        let (resp_tx, resp_rx) = oneshot::channel();

        let inner = match self.tx.inner.unbounded_send((req, resp_tx)) {
            Ok(()) => MockCallFutureInner::Recv(resp_rx),
            Err(_) => MockCallFutureInner::Err(Some(ClientError::Connection(box_error(
                MockError::Send,
            )))),
        };

        MockCallFuture { inner, endpoint }
    }
}

enum MockCallFutureInner {
    Recv(OneshotReceiver<Result<TransportResponse, Status>>),
    Err(Option<ClientError<MockError>>),
}

/// Future used by [`Mock`].
pub struct MockCallFuture {
    inner: MockCallFutureInner,
    endpoint: Cow<'static, str>,
}

impl Future for MockCallFuture {
    type Output = ClientResult<TransportResponse, MockError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.inner {
            MockCallFutureInner::Err(err) => {
                Poll::Ready(Err(err.take().expect("future polled after completion")))
            }
            MockCallFutureInner::Recv(rx) => rx.poll_unpin(cx).map(|res| match res {
                Ok(Ok(resp)) => Ok(resp),
                Ok(Err(status)) => Err(ClientError::remote_call(status, this.endpoint.clone())),
                Err(_) => Err(ClientError::Transport(MockError::Receive)),
            }),
        }
    }
}

/// Errors this client can return.
#[derive(Debug)]
pub enum MockError {
    /// Occurs if receiving a response fails. Only happens if the receiver
    /// drops a request without answering it.
    Receive,
    /// Occurs if sending a request fails. Only happens if receiver end of the
    /// channel is dropped.
    Send,
}

impl Display for MockError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MockError::Receive => f.write_str("failed to receive response"),
            MockError::Send => f.write_str("failed to send request"),
        }
    }
}

impl StdError for MockError {}
