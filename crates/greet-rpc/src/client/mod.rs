use std::{
    borrow::Cow,
    error::Error as StdError,
    fmt::{self, Debug, Formatter},
    future::Future,
    time::Duration,
};

use futures_util::{Stream, StreamExt};
use http::HeaderMap;
use prost::Message as PbMsg;
use tokio::time::Instant;
use tower::{Layer, Service, ServiceExt};
use tracing::Instrument;

use crate::{
    body::Body,
    status::{Code, Status},
    Request, Response,
};

use self::{
    streaming::deadline_exceeded,
    transport::{TransportRequest, TransportResponse},
};
use error::*;

pub use streaming::Streaming;

/// The blocking greeting client.
pub mod blocking;
/// Client configuration.
pub mod config;
/// Error types.
pub mod error;
/// Streams of response messages.
pub mod streaming;
/// Client transports.
pub mod transport;

/// Generic client implementation with common methods.
///
/// The client is generic over its transport, which can be any
/// [`tower::Service`] taking [`TransportRequest`]s.
pub struct Client<Inner> {
    transport: Inner,
    timeout: Option<Duration>,
}

impl<Inner: Debug> Debug for Client<Inner> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("inner", &self.transport)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl<Inner: Clone> Clone for Client<Inner> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            timeout: self.timeout,
        }
    }
}

impl<Inner> Client<Inner> {
    /// Create a new client using the provided transport.
    pub fn new(transport: Inner) -> Self {
        Self {
            transport,
            timeout: None,
        }
    }

    /// Set the timeout applied to calls whose request doesn't set one.
    pub fn with_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.timeout = timeout.into();
        self
    }

    /// Layer this client with a new layer.
    pub fn layer<L>(self, layer: L) -> Client<L::Service>
    where
        L: Layer<Inner>,
    {
        Client {
            transport: layer.layer(self.transport),
            timeout: self.timeout,
        }
    }

    /// Get an immutable reference to the transport.
    pub fn transport(&self) -> &Inner {
        &self.transport
    }
}

impl<Inner, InnerErr> Client<Inner>
where
    Inner: Service<TransportRequest, Response = TransportResponse, Error = ClientError<InnerErr>>,
    InnerErr: StdError,
{
    /// Executes a unary request and returns the decoded response.
    pub async fn execute_request<Req, Resp>(
        &mut self,
        endpoint: impl Into<Cow<'static, str>>,
        req: Request<Req>,
    ) -> ClientResult<Response<Resp>, InnerErr>
    where
        Req: PbMsg,
        Resp: PbMsg + Default,
    {
        let endpoint = endpoint.into();
        let (message, metadata, timeout) = req.into_parts();
        let body = Body::message(&message);
        let span = tracing::info_span!("unary", %endpoint);

        self.single_response(endpoint, metadata, timeout, body)
            .instrument(span)
            .await
    }

    /// Sends a stream of request messages and returns the single decoded
    /// response.
    pub async fn execute_client_streaming<S, Resp>(
        &mut self,
        endpoint: impl Into<Cow<'static, str>>,
        req: Request<S>,
    ) -> ClientResult<Response<Resp>, InnerErr>
    where
        S: Stream + Send + 'static,
        S::Item: PbMsg,
        Resp: PbMsg + Default,
    {
        let endpoint = endpoint.into();
        let (messages, metadata, timeout) = req.into_parts();
        let body = Body::from_messages(messages);
        let span = tracing::info_span!("client_streaming", %endpoint);

        self.single_response(endpoint, metadata, timeout, body)
            .instrument(span)
            .await
    }

    /// Sends one request message and returns the stream of response messages.
    pub async fn execute_server_streaming<Req, Resp>(
        &mut self,
        endpoint: impl Into<Cow<'static, str>>,
        req: Request<Req>,
    ) -> ClientResult<Response<Streaming<Resp, InnerErr>>, InnerErr>
    where
        Req: PbMsg,
        Resp: PbMsg + Default,
    {
        let endpoint = endpoint.into();
        let (message, metadata, timeout) = req.into_parts();
        let body = Body::message(&message);
        let span = tracing::info_span!("server_streaming", %endpoint);

        self.streaming_response(endpoint, metadata, timeout, body)
            .instrument(span)
            .await
    }

    /// Sends a stream of request messages and returns the stream of response
    /// messages.
    pub async fn execute_streaming<S, Resp>(
        &mut self,
        endpoint: impl Into<Cow<'static, str>>,
        req: Request<S>,
    ) -> ClientResult<Response<Streaming<Resp, InnerErr>>, InnerErr>
    where
        S: Stream + Send + 'static,
        S::Item: PbMsg,
        Resp: PbMsg + Default,
    {
        let endpoint = endpoint.into();
        let (messages, metadata, timeout) = req.into_parts();
        let body = Body::from_messages(messages);
        let span = tracing::info_span!("streaming", %endpoint);

        self.streaming_response(endpoint, metadata, timeout, body)
            .instrument(span)
            .await
    }

    async fn single_response<Resp>(
        &mut self,
        endpoint: Cow<'static, str>,
        metadata: HeaderMap,
        timeout: Option<Duration>,
        body: Body,
    ) -> ClientResult<Response<Resp>, InnerErr>
    where
        Resp: PbMsg + Default,
    {
        let timeout = timeout.or(self.timeout);
        let call = async {
            let resp = self
                .send(endpoint.clone(), metadata, timeout, body)
                .await?;
            read_single_message(resp, endpoint.clone()).await
        };

        let result = match timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .unwrap_or_else(|_| Err(deadline_exceeded(endpoint.clone()))),
            None => call.await,
        };

        log_result(&result);
        result
    }

    async fn streaming_response<Resp>(
        &mut self,
        endpoint: Cow<'static, str>,
        metadata: HeaderMap,
        timeout: Option<Duration>,
        body: Body,
    ) -> ClientResult<Response<Streaming<Resp, InnerErr>>, InnerErr>
    where
        Resp: PbMsg + Default,
    {
        let timeout = timeout.or(self.timeout);
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let call = self.send(endpoint.clone(), metadata, timeout, body);

        let resp = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, call)
                .await
                .unwrap_or_else(|_| Err(deadline_exceeded(endpoint.clone()))),
            None => call.await,
        };

        let resp = resp.map(|resp| {
            let messages = resp.body.into_messages();
            let deadline = deadline.map(|deadline| Box::pin(tokio::time::sleep_until(deadline)));
            Response::new(Streaming::new(messages, endpoint, deadline), resp.metadata)
        });

        log_result(&resp);
        resp
    }

    fn send(
        &mut self,
        endpoint: Cow<'static, str>,
        metadata: HeaderMap,
        timeout: Option<Duration>,
        body: Body,
    ) -> impl Future<Output = ClientResult<TransportResponse, InnerErr>> + '_ {
        let mut req = TransportRequest::new(endpoint, body);
        req.metadata = metadata;
        req.timeout = timeout;

        async move {
            let transport = self.transport.ready().await?;
            transport.call(req).await
        }
    }
}

async fn read_single_message<Resp, InnerErr>(
    resp: TransportResponse,
    endpoint: Cow<'static, str>,
) -> ClientResult<Response<Resp>, InnerErr>
where
    Resp: PbMsg + Default,
    InnerErr: StdError,
{
    let TransportResponse { metadata, body } = resp;
    let mut messages = body.into_messages::<Resp>();

    let message = match messages.next().await {
        Some(Ok(message)) => message,
        Some(Err(err)) => return Err(ClientError::from_decode(err, endpoint)),
        None => {
            let status = Status::new(Code::Internal).with_message("missing response message");
            return Err(ClientError::remote_call(status, endpoint));
        }
    };

    // drain the body to observe the final status of the call
    match messages.next().await {
        None => Ok(Response::new(message, metadata)),
        Some(Ok(_)) => {
            let status = Status::new(Code::Internal)
                .with_message("expected a single response message, got more");
            Err(ClientError::remote_call(status, endpoint))
        }
        Some(Err(err)) => Err(ClientError::from_decode(err, endpoint)),
    }
}

fn log_result<T, InnerErr: StdError>(result: &ClientResult<T, InnerErr>) {
    match result {
        Ok(_) => tracing::debug!("call succeeded"),
        Err(err) => tracing::warn!(error = %err, "call failed"),
    }
}
