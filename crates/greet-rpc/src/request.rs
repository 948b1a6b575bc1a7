use std::time::Duration;

use http::HeaderMap;
use prost::Message as PbMsg;

/// A client request: a message plus the metadata sent along with it.
///
/// For streaming calls the message is a stream of protobuf messages.
#[derive(Debug, Clone)]
pub struct Request<T> {
    message: T,
    metadata: HeaderMap,
    timeout: Option<Duration>,
}

impl<T> Request<T> {
    /// Create a new request with the specified message and no metadata.
    pub fn new(message: T) -> Self {
        Self {
            message,
            metadata: HeaderMap::new(),
            timeout: None,
        }
    }

    /// Set a timeout for the call made with this request.
    ///
    /// Overrides the default timeout of the client.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get an immutable reference to the message.
    #[inline]
    pub fn message(&self) -> &T {
        &self.message
    }

    /// Get a mutable reference to the metadata (extra HTTP headers) of this request.
    #[inline]
    pub fn metadata_mut(&mut self) -> &mut HeaderMap {
        &mut self.metadata
    }

    /// Get an immutable reference to the metadata of this request.
    #[inline]
    pub fn metadata(&self) -> &HeaderMap {
        &self.metadata
    }

    /// The timeout set on this request, if any.
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Split this request into its message, metadata and timeout.
    pub fn into_parts(self) -> (T, HeaderMap, Option<Duration>) {
        (self.message, self.metadata, self.timeout)
    }

    /// Extract the message from the request.
    #[inline]
    pub fn into_message(self) -> T {
        self.message
    }
}

/// Trait used for blanket impls on protobuf message types.
pub trait IntoRequest<T> {
    /// Convert this to a request.
    fn into_request(self) -> Request<T>;
}

impl<T: PbMsg> IntoRequest<T> for T {
    fn into_request(self) -> Request<Self> {
        Request::new(self)
    }
}

impl<T> IntoRequest<T> for Request<T> {
    fn into_request(self) -> Request<T> {
        self
    }
}
