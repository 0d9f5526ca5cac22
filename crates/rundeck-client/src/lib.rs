//! Synchronous HTTP client for the Rundeck job-orchestration API
//!
//! Issues authenticated requests, checks transport status, and hands
//! non-empty XML bodies to [`rundeck_parse`] for schema evaluation. The
//! client is deliberately blocking: the parse engine has no suspension
//! points and neither did the workflows this crate serves.
//!
//! ```no_run
//! use rundeck_client::RundeckClient;
//!
//! # fn main() -> Result<(), rundeck_client::ClientError> {
//! let client = RundeckClient::new("https://rundeck.example.org", "token")?;
//! let info = client.system_info()?;
//! println!("{:?}", info.get("result"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Certificate, Method, StatusCode};
use thiserror::Error;
use tracing::debug;

use rundeck_parse::{parse_response, Value};

pub mod endpoints;

const AUTH_HEADER: &str = "X-Rundeck-Auth-Token";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors surfaced by the client
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a usable response
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body did not match any known shape
    #[error("response rejected by parser: {0}")]
    Parse(#[from] rundeck_parse::Error),
    /// The API token was not accepted as a header value
    #[error("API token is not a valid header value")]
    InvalidToken,
    /// A CA certificate could not be read or decoded
    #[error("failed to load certificate {path}: {message}")]
    Certificate { path: String, message: String },
    /// The server answered with a status the endpoint does not expect
    #[error("unexpected status {status} from {endpoint}")]
    UnexpectedStatus {
        endpoint: String,
        status: StatusCode,
    },
    /// The endpoint requires a body but the server sent none
    #[error("empty response body from {endpoint}")]
    EmptyBody { endpoint: String },
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Configures and builds a [`RundeckClient`].
pub struct ClientBuilder {
    root_url: String,
    token: String,
    ca_certificate: Option<String>,
    timeout: Duration,
}

impl ClientBuilder {
    /// Trust an additional CA certificate from a PEM file, for deployments
    /// serving a self-signed or privately issued certificate.
    pub fn ca_certificate(mut self, path: impl AsRef<Path>) -> Self {
        self.ca_certificate = Some(path.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<RundeckClient> {
        let mut headers = HeaderMap::new();
        let token =
            HeaderValue::from_str(&self.token).map_err(|_| ClientError::InvalidToken)?;
        headers.insert(AUTH_HEADER, token);

        let mut builder = Client::builder()
            .user_agent(concat!("rundeck-client/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .default_headers(headers);

        if let Some(path) = &self.ca_certificate {
            let pem = std::fs::read(path).map_err(|err| ClientError::Certificate {
                path: path.clone(),
                message: err.to_string(),
            })?;
            let certificate =
                Certificate::from_pem(&pem).map_err(|err| ClientError::Certificate {
                    path: path.clone(),
                    message: err.to_string(),
                })?;
            builder = builder.add_root_certificate(certificate);
        }

        Ok(RundeckClient {
            http: builder.build()?,
            root_url: self.root_url.trim_end_matches('/').to_string(),
        })
    }
}

/// A connection to one Rundeck server.
///
/// Holds no per-request state; one client may serve many threads.
pub struct RundeckClient {
    http: Client,
    root_url: String,
}

impl RundeckClient {
    /// A client with default settings. Use [`RundeckClient::builder`] to
    /// attach a CA certificate or change the timeout.
    pub fn new(root_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::builder(root_url, token).build()
    }

    pub fn builder(root_url: impl Into<String>, token: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            root_url: root_url.into(),
            token: token.into(),
            ca_certificate: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// GET with query parameters
    pub fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<(StatusCode, Option<Value>)> {
        self.perform(Method::GET, path, params)
    }

    /// POST with form parameters
    pub fn post(&self, path: &str, params: &[(&str, &str)]) -> Result<(StatusCode, Option<Value>)> {
        self.perform(Method::POST, path, params)
    }

    /// DELETE with query parameters
    pub fn delete(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<(StatusCode, Option<Value>)> {
        self.perform(Method::DELETE, path, params)
    }

    /// Issue one request and evaluate the body.
    ///
    /// An empty body is a legitimate answer for some operations and is
    /// reported as `None` rather than handed to the parser.
    fn perform(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<(StatusCode, Option<Value>)> {
        let url = self.endpoint_url(path);
        debug!(%method, %url, "issuing request");

        let request = self.shape_request(method, &url, params);
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        debug!(%status, bytes = body.len(), "response received");

        if body.trim().is_empty() {
            Ok((status, None))
        } else {
            Ok((status, Some(parse_response(&body)?)))
        }
    }

    fn shape_request(&self, method: Method, url: &str, params: &[(&str, &str)]) -> RequestBuilder {
        if method == Method::POST {
            self.http.post(url).form(params)
        } else {
            self.http.request(method, url).query(params)
        }
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.root_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_joins_cleanly() {
        let client = RundeckClient::new("https://rundeck.example.org/", "secret")
            .expect("client");
        assert_eq!(
            client.endpoint_url("/api/1/jobs"),
            "https://rundeck.example.org/api/1/jobs"
        );
        assert_eq!(
            client.endpoint_url("api/1/jobs"),
            "https://rundeck.example.org/api/1/jobs"
        );
    }

    #[test]
    fn test_root_url_is_normalized() {
        let client = RundeckClient::new("https://rundeck.example.org//", "secret")
            .expect("client");
        assert_eq!(client.root_url(), "https://rundeck.example.org");
    }

    #[test]
    fn test_rejects_unprintable_token() {
        let err = RundeckClient::new("https://rundeck.example.org", "bad\ntoken")
            .err()
            .expect("invalid token");
        assert!(matches!(err, ClientError::InvalidToken));
    }

    #[test]
    fn test_missing_certificate_file_is_reported() {
        let err = RundeckClient::builder("https://rundeck.example.org", "secret")
            .ca_certificate("/does/not/exist.pem")
            .build()
            .err()
            .expect("missing file");
        assert!(matches!(err, ClientError::Certificate { .. }));
    }
}
