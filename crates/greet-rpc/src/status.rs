use std::{
    error::Error as StdError,
    fmt::{self, Display, Formatter},
};

use http::{header::HeaderValue, HeaderMap, StatusCode};
use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, CONTROLS};

/// Header (or trailer) carrying the numeric gRPC status code.
pub const GRPC_STATUS_HEADER: &str = "grpc-status";
/// Header (or trailer) carrying the percent-encoded status message.
pub const GRPC_MESSAGE_HEADER: &str = "grpc-message";

const ENCODING_SET: &AsciiSet = &CONTROLS.add(b'%');

/// gRPC status code.
///
/// Reference: <https://github.com/grpc/grpc/blob/master/doc/statuscodes.md>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    /// Not an error.
    Ok,
    /// The operation was cancelled, typically by the caller.
    Cancelled,
    /// Unknown error.
    Unknown,
    /// The client specified an invalid argument.
    InvalidArgument,
    /// The deadline expired before the operation could complete.
    DeadlineExceeded,
    /// Some requested entity was not found.
    NotFound,
    /// The entity that a client attempted to create already exists.
    AlreadyExists,
    /// The caller does not have permission to execute the specified operation.
    PermissionDenied,
    /// Some resource has been exhausted.
    ResourceExhausted,
    /// The system is not in a state required for the operation's execution.
    FailedPrecondition,
    /// The operation was aborted.
    Aborted,
    /// The operation was attempted past the valid range.
    OutOfRange,
    /// The operation is not implemented or is not supported by the service.
    Unimplemented,
    /// Internal errors.
    Internal,
    /// The service is currently unavailable.
    Unavailable,
    /// Unrecoverable data loss or corruption.
    DataLoss,
    /// The request does not have valid authentication credentials.
    Unauthenticated,
    /// Other codes.
    Other(u16),
}

impl From<u16> for Code {
    fn from(value: u16) -> Self {
        match value {
            0 => Code::Ok,
            1 => Code::Cancelled,
            2 => Code::Unknown,
            3 => Code::InvalidArgument,
            4 => Code::DeadlineExceeded,
            5 => Code::NotFound,
            6 => Code::AlreadyExists,
            7 => Code::PermissionDenied,
            8 => Code::ResourceExhausted,
            9 => Code::FailedPrecondition,
            10 => Code::Aborted,
            11 => Code::OutOfRange,
            12 => Code::Unimplemented,
            13 => Code::Internal,
            14 => Code::Unavailable,
            15 => Code::DataLoss,
            16 => Code::Unauthenticated,
            _ => Code::Other(value),
        }
    }
}

impl Code {
    /// Returns the numeric value of this code.
    pub const fn as_u16(&self) -> u16 {
        match self {
            Code::Ok => 0,
            Code::Cancelled => 1,
            Code::Unknown => 2,
            Code::InvalidArgument => 3,
            Code::DeadlineExceeded => 4,
            Code::NotFound => 5,
            Code::AlreadyExists => 6,
            Code::PermissionDenied => 7,
            Code::ResourceExhausted => 8,
            Code::FailedPrecondition => 9,
            Code::Aborted => 10,
            Code::OutOfRange => 11,
            Code::Unimplemented => 12,
            Code::Internal => 13,
            Code::Unavailable => 14,
            Code::DataLoss => 15,
            Code::Unauthenticated => 16,
            Code::Other(value) => *value,
        }
    }

    /// Map a non-200 HTTP status to the gRPC code a client should report.
    ///
    /// Reference: <https://github.com/grpc/grpc/blob/master/doc/http-grpc-status-mapping.md>
    pub fn from_http_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Code::Internal,
            StatusCode::UNAUTHORIZED => Code::Unauthenticated,
            StatusCode::FORBIDDEN => Code::PermissionDenied,
            StatusCode::NOT_FOUND => Code::Unimplemented,
            StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => Code::Unavailable,
            _ => Code::Unknown,
        }
    }
}

/// A gRPC status describing the result of an RPC call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    code: Code,
    message: Option<String>,
}

impl Status {
    /// Create a status with the given code and no message.
    pub fn new(code: Code) -> Self {
        Self {
            code,
            message: None,
        }
    }

    /// Set the message of this status.
    pub fn with_message(mut self, message: impl Display) -> Self {
        self.message = Some(message.to_string());
        self
    }

    /// The code of this status.
    #[inline]
    pub fn code(&self) -> Code {
        self.code
    }

    /// The message of this status, if there is one.
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Whether this status reports success.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.code == Code::Ok
    }

    /// Read a status from response headers or trailers.
    ///
    /// Returns `Ok(None)` if there is no `grpc-status` entry, and an
    /// `Internal` status if the entry can't be parsed.
    pub fn from_headers(headers: &HeaderMap) -> Result<Option<Status>, Status> {
        let value = match headers.get(GRPC_STATUS_HEADER) {
            Some(value) => value,
            None => return Ok(None),
        };

        let code = value
            .to_str()
            .ok()
            .and_then(|value| value.trim().parse::<u16>().ok())
            .map(Code::from)
            .ok_or_else(|| {
                Status::new(Code::Internal).with_message(format!(
                    "invalid grpc-status: {}",
                    String::from_utf8_lossy(value.as_bytes())
                ))
            })?;

        let message = headers
            .get(GRPC_MESSAGE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| percent_decode_str(value).decode_utf8_lossy().into_owned())
            .filter(|value| !value.is_empty());

        Ok(Some(Status { code, message }))
    }

    /// Write this status as `grpc-status` and `grpc-message` entries.
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(GRPC_STATUS_HEADER, HeaderValue::from(self.code.as_u16()));
        if let Some(message) = &self.message {
            let encoded = percent_encode(message.as_bytes(), ENCODING_SET).to_string();
            if let Ok(value) = HeaderValue::from_str(&encoded) {
                headers.insert(GRPC_MESSAGE_HEADER, value);
            }
        }
        headers
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(
                f,
                "grpc status: code={:?} ({}), message={}",
                self.code,
                self.code.as_u16(),
                message
            ),
            None => write!(
                f,
                "grpc status: code={:?} ({})",
                self.code,
                self.code.as_u16()
            ),
        }
    }
}

impl StdError for Status {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_status_header() {
        assert_eq!(Status::from_headers(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn headers_round_trip_message() {
        let status = Status::new(Code::InvalidArgument).with_message("first name 100% empty");
        let parsed = Status::from_headers(&status.to_headers())
            .expect("valid status")
            .expect("status present");

        assert_eq!(parsed, status);
    }

    #[test]
    fn unknown_codes_are_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(GRPC_STATUS_HEADER, HeaderValue::from_static("42"));

        let parsed = Status::from_headers(&headers).unwrap().unwrap();
        assert_eq!(parsed.code(), Code::Other(42));
        assert_eq!(parsed.message(), None);
    }

    #[test]
    fn garbage_status_is_internal() {
        let mut headers = HeaderMap::new();
        headers.insert(GRPC_STATUS_HEADER, HeaderValue::from_static("ok"));

        let err = Status::from_headers(&headers).unwrap_err();
        assert_eq!(err.code(), Code::Internal);
    }

    #[test]
    fn http_status_mapping() {
        assert_eq!(Code::from_http_status(StatusCode::NOT_FOUND), Code::Unimplemented);
        assert_eq!(
            Code::from_http_status(StatusCode::SERVICE_UNAVAILABLE),
            Code::Unavailable
        );
        assert_eq!(Code::from_http_status(StatusCode::IM_A_TEAPOT), Code::Unknown);
    }
}
