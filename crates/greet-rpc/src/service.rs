//! The `greet.GreetService` interface.
//!
//! [`GreetService`] is the blocking contract of the service, implemented by
//! [`crate::GreetClient`]. [`GreetServiceClient`] is the async typed client
//! it is built on.

use std::{error::Error as StdError, time::Duration};

use futures_util::Stream;
use tower::Service;

use crate::{
    client::{
        error::{ClientError, ClientResult},
        transport::{TransportRequest, TransportResponse},
        Client, Streaming,
    },
    proto::*,
    request::IntoRequest,
    Request, Response,
};

/// Fully qualified name of the service.
pub const SERVICE_NAME: &str = "greet.GreetService";
/// Path of the `Greet` method.
pub const GREET_PATH: &str = "/greet.GreetService/Greet";
/// Path of the `GreetManyTimes` method.
pub const GREET_MANY_TIMES_PATH: &str = "/greet.GreetService/GreetManyTimes";
/// Path of the `LongGreet` method.
pub const LONG_GREET_PATH: &str = "/greet.GreetService/LongGreet";
/// Path of the `GreetEveryone` method.
pub const GREET_EVERYONE_PATH: &str = "/greet.GreetService/GreetEveryone";
/// Path of the `GreetWithDeadline` method.
pub const GREET_WITH_DEADLINE_PATH: &str = "/greet.GreetService/GreetWithDeadline";

/// The greeting service, as seen by a caller.
///
/// Every method blocks the calling thread until the service answers or the
/// call fails. Names are passed to the service as they are; validating them
/// is up to the service.
pub trait GreetService {
    /// The error a call can fail with.
    type Error: StdError;

    /// Greet one person.
    fn greet(&mut self, greeting: Greeting) -> Result<GreetResponse, Self::Error>;

    /// Greet one person, receiving every greeting the service streams back.
    fn greet_many_times(
        &mut self,
        greeting: Greeting,
    ) -> Result<Vec<GreetManyTimesResponse>, Self::Error>;

    /// Greet several people, receiving a single combined greeting.
    fn long_greet(&mut self, greetings: Vec<Greeting>) -> Result<LongGreetResponse, Self::Error>;

    /// Greet several people, receiving one greeting per person.
    fn greet_everyone(
        &mut self,
        greetings: Vec<Greeting>,
    ) -> Result<Vec<GreetEveryoneResponse>, Self::Error>;

    /// Greet one person, giving up once `deadline` has passed.
    fn greet_with_deadline(
        &mut self,
        greeting: Greeting,
        deadline: Duration,
    ) -> Result<GreetWithDeadlineResponse, Self::Error>;
}

/// Async client for `greet.GreetService`.
#[derive(Debug, Clone)]
pub struct GreetServiceClient<Inner> {
    inner: Client<Inner>,
}

impl<Inner> GreetServiceClient<Inner> {
    /// Create a new client using the provided transport.
    pub fn new_transport(transport: Inner) -> Self {
        Self {
            inner: Client::new(transport),
        }
    }

    /// Create a new client using the provided generic client.
    pub fn new_inner(client: Client<Inner>) -> Self {
        Self { inner: client }
    }

    /// Get an immutable reference to the generic client.
    pub fn inner(&self) -> &Client<Inner> {
        &self.inner
    }
}

#[cfg(feature = "http_client")]
impl GreetServiceClient<crate::client::transport::http::Hyper> {
    /// Create a new client using the HTTP/2 transport, configured from the
    /// given config.
    pub fn new(
        config: &crate::ClientConfig,
    ) -> ClientResult<Self, crate::client::transport::http::HyperError> {
        let transport = crate::client::transport::http::Hyper::from_config(config)?;
        Ok(Self::new_inner(
            Client::new(transport).with_timeout(config.timeout()),
        ))
    }
}

impl<Inner, InnerErr> GreetServiceClient<Inner>
where
    Inner: Service<TransportRequest, Response = TransportResponse, Error = ClientError<InnerErr>>,
    InnerErr: StdError,
{
    /// Call `Greet`.
    pub async fn greet<Req>(&mut self, req: Req) -> ClientResult<Response<GreetResponse>, InnerErr>
    where
        Req: IntoRequest<GreetRequest>,
    {
        self.inner
            .execute_request(GREET_PATH, req.into_request())
            .await
    }

    /// Call `GreetManyTimes`.
    pub async fn greet_many_times<Req>(
        &mut self,
        req: Req,
    ) -> ClientResult<Response<Streaming<GreetManyTimesResponse, InnerErr>>, InnerErr>
    where
        Req: IntoRequest<GreetManyTimesRequest>,
    {
        self.inner
            .execute_server_streaming(GREET_MANY_TIMES_PATH, req.into_request())
            .await
    }

    /// Call `LongGreet`.
    pub async fn long_greet<S>(
        &mut self,
        req: Request<S>,
    ) -> ClientResult<Response<LongGreetResponse>, InnerErr>
    where
        S: Stream<Item = LongGreetRequest> + Send + 'static,
    {
        self.inner
            .execute_client_streaming(LONG_GREET_PATH, req)
            .await
    }

    /// Call `GreetEveryone`.
    pub async fn greet_everyone<S>(
        &mut self,
        req: Request<S>,
    ) -> ClientResult<Response<Streaming<GreetEveryoneResponse, InnerErr>>, InnerErr>
    where
        S: Stream<Item = GreetEveryoneRequest> + Send + 'static,
    {
        self.inner
            .execute_streaming(GREET_EVERYONE_PATH, req)
            .await
    }

    /// Call `GreetWithDeadline`.
    pub async fn greet_with_deadline<Req>(
        &mut self,
        req: Req,
    ) -> ClientResult<Response<GreetWithDeadlineResponse>, InnerErr>
    where
        Req: IntoRequest<GreetWithDeadlineRequest>,
    {
        self.inner
            .execute_request(GREET_WITH_DEADLINE_PATH, req.into_request())
            .await
    }
}
