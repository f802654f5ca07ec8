use std::error::Error as StdError;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;

use crate::{FailureKind, FetchError, RawResponse, TlsVerification};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 10,
            max_bytes: 10 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Performs one GET request. Implementations must not retry.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, tls: TlsVerification) -> Result<RawResponse, FetchError>;
}

/// HTTP transport backed by reqwest. Builds a fresh client per request so
/// no connection pool is shared between concurrent fetches.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    settings: FetchSettings,
}

impl ReqwestTransport {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self, tls: TlsVerification) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .user_agent(self.settings.user_agent.as_str())
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(self.settings.redirect_limit))
            .danger_accept_invalid_certs(tls == TlsVerification::Disabled)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, tls: TlsVerification) -> Result<RawResponse, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let client = self.build_client(tls)?;

        let response = client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let body = self.read_body(response).await?;

        Ok(RawResponse {
            status,
            final_url,
            content_type,
            body,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    let message = error_chain(&err);
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, message);
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, message);
    }
    if is_certificate_error(&err) {
        return FetchError::new(FailureKind::Certificate, message);
    }
    if err.is_builder() {
        return FetchError::new(FailureKind::InvalidUrl, message);
    }
    FetchError::new(FailureKind::Network, message)
}

/// True when a cause of `err` reports a certificate problem.
///
/// The top-level reqwest message embeds the request URL, so only the causes
/// beneath it are inspected.
fn is_certificate_error(err: &reqwest::Error) -> bool {
    err.source().is_some_and(cause_mentions_certificate)
}

/// True when `err` or anything in its source chain names a certificate problem.
pub(crate) fn cause_mentions_certificate(err: &(dyn StdError + 'static)) -> bool {
    const MARKERS: &[&str] = &["certificate", "self signed", "self-signed", "unknownissuer"];
    let mut current = Some(err);
    while let Some(err) = current {
        let text = err.to_string().to_ascii_lowercase();
        if MARKERS.iter().any(|marker| text.contains(marker)) {
            return true;
        }
        current = err.source();
    }
    false
}

/// Flattens the source chain; reqwest's top-level message rarely names the cause.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(err) = current {
        parts.push(err.to_string());
        current = err.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Layer {
        message: &'static str,
        source: Option<Box<Layer>>,
    }

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.source.as_deref().map(|s| s as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn certificate_cause_is_found_deep_in_chain() {
        let err = Layer {
            message: "error sending request",
            source: Some(Box::new(Layer {
                message: "client error (Connect)",
                source: Some(Box::new(Layer {
                    message: "invalid peer certificate: UnknownIssuer",
                    source: None,
                })),
            })),
        };
        assert!(cause_mentions_certificate(&err));
        assert_eq!(
            error_chain(&err),
            "error sending request: client error (Connect): invalid peer certificate: UnknownIssuer"
        );
    }

    #[test]
    fn connection_refused_is_not_a_certificate_error() {
        let err = Layer {
            message: "error sending request",
            source: Some(Box::new(Layer {
                message: "Connection refused (os error 111)",
                source: None,
            })),
        };
        assert!(!cause_mentions_certificate(&err));
    }

    #[tokio::test]
    async fn certificate_named_host_is_not_a_certificate_error() {
        let transport = ReqwestTransport::new(FetchSettings {
            connect_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
            ..FetchSettings::default()
        });
        let err = transport
            .get("https://self-signed-certificate.invalid/story", TlsVerification::Enabled)
            .await
            .unwrap_err();
        assert_ne!(err.kind, FailureKind::Certificate, "{err}");
    }
}
