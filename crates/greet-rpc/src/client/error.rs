use std::{
    borrow::Cow,
    error::Error as StdError,
    fmt::{self, Display, Formatter},
};

pub use crate::{
    decode::DecodeBodyError,
    status::{Code, Status},
};
pub use std::io::Error as IoError;

use crate::BoxError;

/// Convenience type for `Client` operation result.
pub type ClientResult<T, TransportError> = Result<T, ClientError<TransportError>>;

/// Errors that can occur within `Client` operation.
#[derive(Debug)]
pub enum ClientError<TransportError: StdError> {
    /// Occurs if the remote endpoint could not be reached or refused the
    /// connection.
    Connection(BoxError),
    /// Occurs if the remote service returned a fault.
    RemoteCall {
        /// The status returned by the service.
        status: Status,
        /// The endpoint for which this error happened.
        endpoint: Cow<'static, str>,
    },
    /// Occurs if the data server responded with could not be decoded.
    MessageDecode(DecodeBodyError),
    /// Occurs if the data server responded with is not a gRPC response.
    ContentNotSupported,
    /// Occurs if an IO error is returned.
    Io(IoError),
    /// Occures if the underlying transport yields an error.
    Transport(TransportError),
}

impl<TransportError: StdError> ClientError<TransportError> {
    /// Create a remote call error for the given endpoint.
    pub fn remote_call(status: Status, endpoint: impl Into<Cow<'static, str>>) -> Self {
        ClientError::RemoteCall {
            status,
            endpoint: endpoint.into(),
        }
    }

    /// Convert a decode error that happened while reading a response of the
    /// given endpoint. Statuses sent by the service become
    /// [`ClientError::RemoteCall`] errors.
    pub fn from_decode(err: DecodeBodyError, endpoint: impl Into<Cow<'static, str>>) -> Self {
        match err {
            DecodeBodyError::Status(status) => Self::remote_call(status, endpoint),
            err => ClientError::MessageDecode(err),
        }
    }

    /// Whether this error means the endpoint could not be reached.
    pub fn is_connection(&self) -> bool {
        matches!(self, ClientError::Connection(_))
    }

    /// Whether this error is a fault or protocol-level error returned by the
    /// remote service.
    pub fn is_remote_call(&self) -> bool {
        matches!(
            self,
            ClientError::RemoteCall { .. }
                | ClientError::MessageDecode(_)
                | ClientError::ContentNotSupported
        )
    }

    /// The status returned by the service, if this is a remote call error.
    pub fn status(&self) -> Option<&Status> {
        match self {
            ClientError::RemoteCall { status, .. } => Some(status),
            _ => None,
        }
    }
}

impl<TransportError: StdError> Display for ClientError<TransportError> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ClientError::Connection(err) => write!(f, "could not connect: {}", err),
            ClientError::RemoteCall { status, endpoint } => {
                write!(f, "endpoint {} returned an error: {}", endpoint, status)
            }
            ClientError::ContentNotSupported => {
                write!(f, "server responded with a non gRPC response")
            }
            ClientError::MessageDecode(err) => write!(
                f,
                "failed to decode response data as protobuf response: {}",
                err
            ),
            ClientError::Io(err) => write!(f, "io error: {}", err),
            ClientError::Transport(err) => write!(f, "transport error: {}", err),
        }
    }
}

impl<TransportError: StdError> From<IoError> for ClientError<TransportError> {
    fn from(err: IoError) -> Self {
        ClientError::Io(err)
    }
}

impl<TransportError: StdError + 'static> StdError for ClientError<TransportError> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ClientError::Connection(err) => Some(err.as_ref()),
            ClientError::RemoteCall { status, .. } => Some(status),
            ClientError::MessageDecode(err) => Some(err),
            ClientError::Io(err) => Some(err),
            ClientError::Transport(err) => Some(err),
            ClientError::ContentNotSupported => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;

    #[derive(Debug)]
    struct Never;

    impl Display for Never {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str("never")
        }
    }

    impl StdError for Never {}

    #[test]
    fn decode_status_becomes_remote_call() {
        let status = Status::new(Code::NotFound).with_message("no such person");
        let err = ClientError::<Never>::from_decode(
            DecodeBodyError::Status(status.clone()),
            "/greet.GreetService/Greet",
        );

        assert!(err.is_remote_call());
        assert_eq!(err.status(), Some(&status));
        assert_eq!(
            err.to_string(),
            "endpoint /greet.GreetService/Greet returned an error: \
             grpc status: code=NotFound (5), message=no such person"
        );
    }

    #[test]
    fn protocol_errors_count_as_remote_call() {
        let err = ClientError::<Never>::from_decode(DecodeBodyError::Incomplete, "/x");
        assert!(err.is_remote_call());
        assert!(!err.is_connection());
        assert!(err.status().is_none());
    }
}
