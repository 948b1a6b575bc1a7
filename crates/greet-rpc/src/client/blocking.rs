use std::{
    error::Error as StdError,
    fmt::{self, Debug, Formatter},
    io,
    time::Duration,
};

use futures_util::stream;
use tokio::runtime::{Builder as RuntimeBuilder, Runtime};
use tower::Service;

use super::{
    config::ClientConfig,
    error::ClientError,
    transport::{TransportRequest, TransportResponse},
    Client,
};
use crate::{proto::*, service::GreetService, service::GreetServiceClient, Request};

/// A greeting client that blocks the calling thread on every call.
///
/// The client owns its connection handle (the transport) and a
/// single-threaded runtime driving it.
pub struct GreetClient<Inner> {
    runtime: Runtime,
    client: GreetServiceClient<Inner>,
}

impl<Inner: Debug> Debug for GreetClient<Inner> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreetClient")
            .field("client", &self.client)
            .finish()
    }
}

#[cfg(feature = "http_client")]
impl GreetClient<super::transport::http::Hyper> {
    /// Create a client talking plaintext HTTP/2 to the configured endpoint.
    ///
    /// The connection is established by the first call, so an unreachable
    /// endpoint is reported by that call as [`ClientError::Connection`].
    pub fn connect(
        config: ClientConfig,
    ) -> super::error::ClientResult<Self, super::transport::http::HyperError> {
        let transport = super::transport::http::Hyper::from_config(&config)?;
        tracing::debug!(endpoint = %config.endpoint(), "created client");
        Ok(Self::with_transport(&config, transport)?)
    }
}

impl<Inner> GreetClient<Inner> {
    /// Create a client using the provided transport.
    ///
    /// Only the timeout of the config is used; the endpoint is up to the
    /// transport.
    pub fn with_transport(config: &ClientConfig, transport: Inner) -> io::Result<Self> {
        let runtime = RuntimeBuilder::new_current_thread().enable_all().build()?;
        let client = GreetServiceClient::new_inner(
            Client::new(transport).with_timeout(config.timeout()),
        );

        Ok(Self { runtime, client })
    }

    /// Get an immutable reference to the async client used by this client.
    pub fn service_client(&self) -> &GreetServiceClient<Inner> {
        &self.client
    }
}

impl<Inner, InnerErr> GreetService for GreetClient<Inner>
where
    Inner: Service<TransportRequest, Response = TransportResponse, Error = ClientError<InnerErr>>,
    InnerErr: StdError + 'static,
{
    type Error = ClientError<InnerErr>;

    fn greet(&mut self, greeting: Greeting) -> Result<GreetResponse, Self::Error> {
        let Self { runtime, client } = self;
        runtime
            .block_on(client.greet(GreetRequest::from(greeting)))
            .map(|resp| resp.into_message())
    }

    fn greet_many_times(
        &mut self,
        greeting: Greeting,
    ) -> Result<Vec<GreetManyTimesResponse>, Self::Error> {
        let Self { runtime, client } = self;
        runtime.block_on(async {
            client
                .greet_many_times(GreetManyTimesRequest::from(greeting))
                .await?
                .into_message()
                .collect_messages()
                .await
        })
    }

    fn long_greet(&mut self, greetings: Vec<Greeting>) -> Result<LongGreetResponse, Self::Error> {
        let Self { runtime, client } = self;
        let requests = stream::iter(greetings.into_iter().map(LongGreetRequest::from));
        runtime
            .block_on(client.long_greet(Request::new(requests)))
            .map(|resp| resp.into_message())
    }

    fn greet_everyone(
        &mut self,
        greetings: Vec<Greeting>,
    ) -> Result<Vec<GreetEveryoneResponse>, Self::Error> {
        let Self { runtime, client } = self;
        let requests = stream::iter(greetings.into_iter().map(GreetEveryoneRequest::from));
        runtime.block_on(async {
            client
                .greet_everyone(Request::new(requests))
                .await?
                .into_message()
                .collect_messages()
                .await
        })
    }

    fn greet_with_deadline(
        &mut self,
        greeting: Greeting,
        deadline: Duration,
    ) -> Result<GreetWithDeadlineResponse, Self::Error> {
        let Self { runtime, client } = self;
        let req = Request::new(GreetWithDeadlineRequest::from(greeting)).with_timeout(deadline);
        runtime
            .block_on(client.greet_with_deadline(req))
            .map(|resp| resp.into_message())
    }
}
