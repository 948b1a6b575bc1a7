//! A plaintext HTTP/2 client transport implementation using [`hyper`].

use std::{
    error::Error as StdError,
    fmt::{self, Display, Formatter},
    str::FromStr,
    task::{Context, Poll},
    time::Duration,
};

use futures_util::future::BoxFuture;
use http::{header, uri::PathAndQuery, HeaderMap, HeaderValue, Method, StatusCode, Uri};
use http_body::Body as HttpBody;
use tower::Service;

use super::{TransportRequest, TransportResponse};
use crate::{
    body::Body,
    box_error,
    client::{
        config::{check_uri, ClientConfig, InvalidServerUrl},
        error::{ClientError, ClientResult},
    },
    status::{Code, Status},
    GRPC_CONTENT_TYPE,
};

/// Header telling the server how long the client will wait for the call.
pub const GRPC_TIMEOUT_HEADER: &str = "grpc-timeout";

/// A `hyper` HTTP client speaking plaintext HTTP/2.
pub type HttpClient = hyper::Client<hyper::client::HttpConnector>;

/// Creates a new [`HttpClient`] that you can use.
///
/// The builder is switched to HTTP/2 only, since gRPC requires it.
pub fn http_client(builder: &mut hyper::client::Builder) -> HttpClient {
    builder.http2_only(true).build_http()
}

/// HTTP/2 transport implemented using [`hyper`].
///
/// This transport will:
/// - Send every request as a `POST` to the method path with
/// `content-type: application/grpc` and `te: trailers`. Headers found in the
/// request metadata are sent too.
/// - Add the response headers as the metadata of the [`TransportResponse`].
/// - Turn the `grpc-status` trailer into a terminal [`Status`] error of the
/// response body when it is not OK.
#[derive(Debug, Clone)]
pub struct Hyper {
    client: HttpClient,
    server: Uri,
}

impl Hyper {
    /// Create a new HTTP transport using the provided URI as server URI.
    pub fn new(server: Uri) -> Result<Self, HyperError> {
        Self::new_with_hyper(
            server,
            http_client(
                hyper::Client::builder().http2_keep_alive_interval(Some(Duration::from_secs(10))),
            ),
        )
    }

    /// Create a new HTTP transport from a [`ClientConfig`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, HyperError> {
        let server = config.server_uri().map_err(HyperError::InvalidUrl)?;
        let client = http_client(
            hyper::Client::builder().http2_keep_alive_interval(config.http2_keep_alive_interval()),
        );
        Self::new_with_hyper(server, client)
    }

    /// Create a new HTTP transport using the provided URI as server URI, and
    /// the provided [`HttpClient`] as the underlying client.
    ///
    /// You can create a [`HttpClient`] using [`http_client`].
    pub fn new_with_hyper(server: Uri, hyper_client: HttpClient) -> Result<Self, HyperError> {
        Ok(Self {
            client: hyper_client,
            server: check_uri(server).map_err(HyperError::InvalidUrl)?,
        })
    }

    /// The server URI requests are sent to.
    pub fn server(&self) -> &Uri {
        &self.server
    }

    fn make_endpoint(&self, path: &str) -> Result<Uri, HyperError> {
        let path = PathAndQuery::from_str(path)
            .map_err(http::Error::from)
            .map_err(HyperError::FailedRequestBuilder)?;

        let mut parts = self.server.clone().into_parts();
        parts.path_and_query = Some(path);

        let endpoint = Uri::from_parts(parts)
            .map_err(http::Error::from)
            .map_err(HyperError::FailedRequestBuilder)?;

        Ok(endpoint)
    }
}

impl Service<TransportRequest> for Hyper {
    type Response = TransportResponse;

    type Error = ClientError<HyperError>;

    type Future = BoxFuture<'static, ClientResult<TransportResponse, HyperError>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Ok(()).into()
    }

    fn call(&mut self, req: TransportRequest) -> Self::Future {
        let maybe_req_url = self.make_endpoint(&req.endpoint);
        let client = self.client.clone();

        Box::pin(async move {
            let req_url = maybe_req_url?;

            let TransportRequest {
                endpoint,
                mut metadata,
                timeout,
                body,
            } = req;

            let request = {
                metadata.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(GRPC_CONTENT_TYPE),
                );
                metadata.insert(header::TE, HeaderValue::from_static("trailers"));
                if let Some(value) = timeout.and_then(grpc_timeout_value) {
                    metadata.insert(GRPC_TIMEOUT_HEADER, value);
                }

                let mut request = http::Request::builder()
                    .uri(req_url)
                    .method(Method::POST)
                    .body(hyper::Body::wrap_stream(body))
                    .map_err(HyperError::FailedRequestBuilder)?;
                *request.headers_mut() = metadata;

                request
            };

            tracing::debug!(%endpoint, "sending request");

            let resp = client.request(request).await.map_err(|err| {
                if err.is_connect() {
                    ClientError::Connection(box_error(err))
                } else {
                    ClientError::Transport(HyperError::Http(err))
                }
            })?;

            let (parts, body) = resp.into_parts();

            if parts.status != StatusCode::OK {
                let status = Status::new(Code::from_http_status(parts.status)).with_message(
                    format!("invalid http status code: {}", parts.status.as_u16()),
                );
                return Err(ClientError::remote_call(status, endpoint));
            }

            // Handle trailers-only responses
            match Status::from_headers(&parts.headers) {
                Ok(Some(status)) if status.is_ok() => {
                    return Ok(TransportResponse {
                        metadata: parts.headers,
                        body: Body::empty(),
                    });
                }
                Ok(Some(status)) | Err(status) => {
                    return Err(ClientError::remote_call(status, endpoint));
                }
                Ok(None) => {}
            }

            if !is_grpc_content(&parts.headers) {
                return Err(ClientError::ContentNotSupported);
            }

            Ok(TransportResponse {
                metadata: parts.headers,
                body: response_body(body),
            })
        })
    }
}

fn is_grpc_content(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| {
            let value = value.to_ascii_lowercase();
            value == GRPC_CONTENT_TYPE
                || value.starts_with("application/grpc+")
                || value.starts_with("application/grpc;")
        })
}

/// Encode a timeout as a `grpc-timeout` header value. The value may have at
/// most eight digits, so long timeouts lose precision.
fn grpc_timeout_value(timeout: Duration) -> Option<HeaderValue> {
    const MAX_DIGITS: u128 = 99_999_999;

    let millis = timeout.as_millis();
    let value = if millis <= MAX_DIGITS {
        format!("{}m", millis)
    } else if u128::from(timeout.as_secs()) <= MAX_DIGITS {
        format!("{}S", timeout.as_secs())
    } else {
        format!("{}H", (timeout.as_secs() / 3600).min(MAX_DIGITS as u64))
    };

    HeaderValue::from_str(&value).ok()
}

/// Turn a HTTP/2 response body into a [`Body`] whose last item reports the
/// `grpc-status` trailer, if it isn't OK.
fn response_body(body: hyper::Body) -> Body {
    let missing_status = || Status::new(Code::Internal).with_message("missing grpc-status");

    Body::new(futures_util::stream::try_unfold(
        Some(body),
        move |state| async move {
            let mut body = match state {
                Some(body) => body,
                None => return Ok(None),
            };

            if let Some(chunk) = body.data().await {
                let chunk = chunk.map_err(box_error)?;
                return Ok(Some((chunk, Some(body))));
            }

            let trailers = body.trailers().await.map_err(box_error)?;
            let status = match trailers {
                Some(trailers) => {
                    Status::from_headers(&trailers).and_then(|status| status.ok_or_else(missing_status))
                }
                None => Err(missing_status()),
            };

            match status {
                Ok(status) if status.is_ok() => Ok(None),
                Ok(status) | Err(status) => Err(box_error(status)),
            }
        },
    ))
}

/// Errors that [`Hyper`] transport might produce.
#[derive(Debug)]
pub enum HyperError {
    /// Occurs if request creation fails.
    FailedRequestBuilder(http::Error),
    /// Occurs if hyper, the HTTP client, returns an error.
    Http(hyper::Error),
    /// Occurs if the given URL is invalid.
    InvalidUrl(InvalidServerUrl),
}

impl Display for HyperError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailedRequestBuilder(err) => write!(f, "failed to build request: {}", err),
            Self::Http(err) => write!(f, "HTTP error: {}", err),
            Self::InvalidUrl(err) => write!(f, "invalid URL: {}", err),
        }
    }
}

impl StdError for HyperError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::FailedRequestBuilder(err) => Some(err),
            Self::Http(err) => Some(err),
            Self::InvalidUrl(err) => Some(err),
        }
    }
}

impl From<hyper::Error> for HyperError {
    fn from(err: hyper::Error) -> Self {
        HyperError::Http(err)
    }
}

impl From<HyperError> for ClientError<HyperError> {
    fn from(err: HyperError) -> Self {
        ClientError::Transport(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_header_values() {
        assert_eq!(
            grpc_timeout_value(Duration::from_millis(1500)).unwrap(),
            "1500m"
        );
        assert_eq!(
            grpc_timeout_value(Duration::from_secs(200_000)).unwrap(),
            "200000S"
        );
    }

    #[test]
    fn grpc_content_types() {
        let mut headers = HeaderMap::new();
        assert!(!is_grpc_content(&headers));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/grpc"));
        assert!(is_grpc_content(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/grpc+proto"),
        );
        assert!(is_grpc_content(&headers));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
        assert!(!is_grpc_content(&headers));
    }

    #[test]
    fn endpoint_is_joined_to_server() {
        let transport = Hyper::new("http://localhost:50051".parse().unwrap()).unwrap();
        let endpoint = transport
            .make_endpoint("/greet.GreetService/Greet")
            .unwrap();
        assert_eq!(
            endpoint.to_string(),
            "http://localhost:50051/greet.GreetService/Greet"
        );
    }

    #[test]
    fn https_server_is_rejected() {
        let err = Hyper::new("https://localhost:50051".parse().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            HyperError::InvalidUrl(InvalidServerUrl::InvalidScheme)
        ));
    }
}
