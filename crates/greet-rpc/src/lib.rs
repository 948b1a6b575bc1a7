//! Typed gRPC client for the `greet.GreetService` service.
#![deny(missing_docs)]

/// Some re-exported crates that might be useful while writing software with `greet-rpc`.
pub mod exports {
    pub use bytes;
    pub use futures_util;
    pub use http;
    pub use prost;
    pub use tower;
    pub use tracing;
}

/// Client types, transports and the blocking greeting client.
pub mod client;
/// The `greet.GreetService` interface and its typed client.
pub mod service;

/// Body utitilies and types.
pub mod body;
/// Decoding utilities.
pub mod decode;
/// Encoding utilities.
pub mod encode;
/// The `greet` package protobuf messages.
pub mod proto;
/// The `Request` type used by the client.
pub mod request;
/// The `Response` type used by the client.
pub mod response;
/// gRPC status codes and statuses.
pub mod status;

#[doc(inline)]
pub use client::{blocking::GreetClient, config::ClientConfig, error::ClientError};
#[doc(inline)]
pub use request::Request;
#[doc(inline)]
pub use response::Response;
#[doc(inline)]
pub use service::GreetService;
#[doc(inline)]
pub use status::{Code, Status};

/// Alias for a type-erased error type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Convert any error to a [`BoxError`].
pub fn box_error<Err>(err: Err) -> BoxError
where
    Err: std::error::Error + Send + Sync + 'static,
{
    Box::new(err)
}

/// The gRPC content type.
pub const GRPC_CONTENT_TYPE: &str = "application/grpc";
/// Endpoint the greeting service listens on unless configured otherwise.
pub const DEFAULT_ENDPOINT: &str = "localhost:50051";
