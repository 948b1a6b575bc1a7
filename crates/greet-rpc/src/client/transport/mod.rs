use std::{borrow::Cow, time::Duration};

use ::http::HeaderMap;

use crate::body::Body;

/// Client HTTP transport.
#[cfg(feature = "http_client")]
pub mod http;
/// Client mock transport.
pub mod mock;

/// A request that a transport sends to the remote endpoint.
///
/// Transports are [`tower::Service`]s taking this request and yielding a
/// [`TransportResponse`].
#[derive(Debug)]
#[non_exhaustive]
pub struct TransportRequest {
    /// Path of the method, eg. `/greet.GreetService/Greet`.
    pub endpoint: Cow<'static, str>,
    /// Extra headers to send.
    pub metadata: HeaderMap,
    /// Time the remote end has to answer the call.
    pub timeout: Option<Duration>,
    /// gRPC framed request messages.
    pub body: Body,
}

impl TransportRequest {
    /// Create a new transport request.
    pub fn new(endpoint: impl Into<Cow<'static, str>>, body: Body) -> Self {
        Self {
            endpoint: endpoint.into(),
            metadata: HeaderMap::new(),
            timeout: None,
            body,
        }
    }
}

/// A response returned by a transport.
#[derive(Debug)]
#[non_exhaustive]
pub struct TransportResponse {
    /// Response headers.
    pub metadata: HeaderMap,
    /// gRPC framed response messages. A non-OK final status is the last
    /// item of the body, as a [`crate::Status`] error.
    pub body: Body,
}

impl TransportResponse {
    /// Create a new transport response with no metadata.
    pub fn new(body: Body) -> Self {
        Self {
            metadata: HeaderMap::new(),
            body,
        }
    }
}
