use http::HeaderMap;

/// A client response: a decoded message plus the response metadata.
///
/// For server streaming calls the message is a [`crate::client::Streaming`].
#[derive(Debug)]
pub struct Response<T> {
    message: T,
    metadata: HeaderMap,
}

impl<T> Response<T> {
    /// Create a new response with the specified message and metadata.
    pub fn new(message: T, metadata: HeaderMap) -> Self {
        Self { message, metadata }
    }

    /// Get an immutable reference to the message.
    #[inline]
    pub fn message(&self) -> &T {
        &self.message
    }

    /// Get a mutable reference to the message.
    #[inline]
    pub fn message_mut(&mut self) -> &mut T {
        &mut self.message
    }

    /// Get an immutable reference to the metadata (HTTP headers) of this response.
    #[inline]
    pub fn metadata(&self) -> &HeaderMap {
        &self.metadata
    }

    /// Extract the message from the response.
    #[inline]
    pub fn into_message(self) -> T {
        self.message
    }
}
