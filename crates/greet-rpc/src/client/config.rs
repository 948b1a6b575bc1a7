use std::{
    error::Error as StdError,
    fmt::{self, Display, Formatter},
    time::Duration,
};

use http::Uri;

use crate::DEFAULT_ENDPOINT;

/// Configuration used to create a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    endpoint: String,
    timeout: Option<Duration>,
    http2_keep_alive_interval: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
            http2_keep_alive_interval: Some(Duration::from_secs(10)),
        }
    }
}

impl ClientConfig {
    /// Create a config targeting the given endpoint.
    ///
    /// The endpoint is either `host:port` or `http://host:port`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::default().with_endpoint(endpoint)
    }

    /// Set the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the default timeout applied to every call. Calls have no timeout
    /// unless one is set here or on the request.
    pub fn with_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.timeout = timeout.into();
        self
    }

    /// Set the interval of HTTP/2 keep-alive pings. `None` disables them.
    pub fn with_http2_keep_alive_interval(mut self, interval: impl Into<Option<Duration>>) -> Self {
        self.http2_keep_alive_interval = interval.into();
        self
    }

    /// The endpoint as it was configured.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The default call timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The HTTP/2 keep-alive interval.
    pub fn http2_keep_alive_interval(&self) -> Option<Duration> {
        self.http2_keep_alive_interval
    }

    /// Parse the endpoint into a server URI.
    ///
    /// A missing scheme defaults to `http`. Only plaintext `http` is accepted.
    pub fn server_uri(&self) -> Result<Uri, InvalidServerUrl> {
        let endpoint = self.endpoint.trim();
        let uri: Uri = if endpoint.contains("://") {
            endpoint.parse()
        } else {
            format!("http://{}", endpoint).parse()
        }
        .map_err(InvalidServerUrl::Invalid)?;

        check_uri(uri)
    }
}

/// Check if a URI is a valid server URI or not.
pub(crate) fn check_uri(uri: Uri) -> Result<Uri, InvalidServerUrl> {
    if uri.scheme_str() != Some("http") {
        return Err(InvalidServerUrl::InvalidScheme);
    }
    if uri.host().is_none() {
        return Err(InvalidServerUrl::MissingHost);
    }
    Ok(uri)
}

#[derive(Debug)]
/// Errors that can occur while parsing a URL when creating a client.
pub enum InvalidServerUrl {
    /// Occurs if the URL could not be parsed.
    Invalid(http::uri::InvalidUri),
    /// Occurs if URL scheme isn't `http`.
    InvalidScheme,
    /// Occurs if the URL has no host.
    MissingHost,
}

impl Display for InvalidServerUrl {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            InvalidServerUrl::Invalid(err) => write!(f, "invalid URL: {}", err),
            InvalidServerUrl::InvalidScheme => {
                write!(f, "invalid scheme, expected `http`")
            }
            InvalidServerUrl::MissingHost => write!(f, "URL has no host"),
        }
    }
}

impl StdError for InvalidServerUrl {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            InvalidServerUrl::Invalid(err) => Some(err),
            _ => None,
        }
    }
}
