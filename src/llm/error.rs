//! Oracle failures.
//!
//! Anything that keeps the oracle from producing a turn ends the agent run,
//! so there is no retry bookkeeping here: just enough structure to tell the
//! operator what broke.

use std::fmt;
use std::time::Duration;

/// A failed oracle call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LLMError {
    /// What went wrong
    pub kind: LLMErrorKind,
}

/// Ways an oracle call can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LLMErrorKind {
    /// The endpoint could not be reached
    Network {
        /// Transport message
        message: String,
    },
    /// HTTP 429 from the provider
    RateLimited {
        /// Wait suggested by the provider, or 60s when it gave none
        retry_after: Duration,
    },
    /// Any other non-success status
    ApiError {
        /// HTTP status
        status_code: u16,
        /// Body or provider message
        message: String,
        /// Provider error code, when the body carried one
        error_type: Option<String>,
    },
    /// HTTP 401/403, or a provider auth error code
    AuthenticationFailed {
        /// Provider message
        reason: String,
    },
    /// The provider rejected the request shape
    InvalidRequest {
        /// Provider message
        reason: String,
    },
    /// The response body was not what the client expected
    ParseError {
        /// Decoder message
        message: String,
    },
    /// The client could not be built from its settings
    InvalidConfig {
        /// Offending setting
        field: String,
        /// Problem with it
        reason: String,
    },
    /// No response within the configured per-request limit
    Timeout {
        /// The limit that elapsed
        duration: Duration,
    },
}

impl LLMError {
    /// Wraps a kind.
    #[must_use]
    pub fn new(kind: LLMErrorKind) -> Self {
        Self { kind }
    }

    /// Unreachable endpoint.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LLMErrorKind::Network {
            message: message.into(),
        })
    }

    /// Provider asked us to back off.
    #[must_use]
    pub fn rate_limited(retry_after: Duration) -> Self {
        Self::new(LLMErrorKind::RateLimited { retry_after })
    }

    /// Non-success status with a body.
    #[must_use]
    pub fn api_error(
        status_code: u16,
        message: impl Into<String>,
        error_type: Option<String>,
    ) -> Self {
        Self::new(LLMErrorKind::ApiError {
            status_code,
            message: message.into(),
            error_type,
        })
    }

    /// Rejected credentials.
    #[must_use]
    pub fn authentication_failed(reason: impl Into<String>) -> Self {
        Self::new(LLMErrorKind::AuthenticationFailed {
            reason: reason.into(),
        })
    }

    /// Rejected request.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(LLMErrorKind::InvalidRequest {
            reason: reason.into(),
        })
    }

    /// Undecodable response.
    #[must_use]
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(LLMErrorKind::ParseError {
            message: message.into(),
        })
    }

    /// Unusable client setting.
    #[must_use]
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(LLMErrorKind::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Per-request limit elapsed.
    #[must_use]
    pub fn timeout(duration: Duration) -> Self {
        Self::new(LLMErrorKind::Timeout { duration })
    }

    /// Classifies a failed `reqwest` send or body read.
    ///
    /// `limit` is the timeout the client was built with; reqwest does not
    /// report which limit fired.
    #[must_use]
    pub fn transport(e: reqwest::Error, limit: Duration) -> Self {
        if e.is_timeout() {
            Self::timeout(limit)
        } else if e.is_decode() {
            Self::parse_error(e.to_string())
        } else {
            Self::network(e.to_string())
        }
    }

    /// Builds the error for a non-success HTTP response.
    ///
    /// 401/403 map to authentication failures, 429 to rate limiting and
    /// everything else to an API error carrying the body.
    #[must_use]
    pub fn from_status(
        status_code: u16,
        body: &str,
        retry_after: Option<Duration>,
        error_type: Option<String>,
    ) -> Self {
        match status_code {
            401 | 403 => Self::authentication_failed(body),
            429 => Self::rate_limited(retry_after.unwrap_or(Duration::from_secs(60))),
            _ => Self::api_error(status_code, body, error_type),
        }
    }
}

impl fmt::Display for LLMError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LLMErrorKind::Network { message } => {
                write!(f, "could not reach the model endpoint: {}", message)
            }
            LLMErrorKind::RateLimited { retry_after } => write!(
                f,
                "the provider is rate limiting requests; wait {:?} and run again",
                retry_after
            ),
            LLMErrorKind::ApiError {
                status_code,
                message,
                error_type: Some(code),
            } => write!(f, "provider returned HTTP {} [{}]: {}", status_code, code, message),
            LLMErrorKind::ApiError {
                status_code,
                message,
                error_type: None,
            } => write!(f, "provider returned HTTP {}: {}", status_code, message),
            LLMErrorKind::AuthenticationFailed { reason } => write!(
                f,
                "the provider rejected the API key: {}; check the key in the config or environment",
                reason
            ),
            LLMErrorKind::InvalidRequest { reason } => {
                write!(f, "the provider rejected the request: {}", reason)
            }
            LLMErrorKind::ParseError { message } => {
                write!(f, "unexpected response from the provider: {}", message)
            }
            LLMErrorKind::InvalidConfig { field, reason } => {
                write!(f, "bad provider setting '{}': {}", field, reason)
            }
            LLMErrorKind::Timeout { duration } => {
                write!(f, "the model did not answer within {:?}", duration)
            }
        }
    }
}

impl std::error::Error for LLMError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_shows_code_when_present() {
        let with_code =
            LLMError::api_error(400, "bad model", Some("INVALID_ARGUMENT".to_string()));
        assert_eq!(
            with_code.to_string(),
            "provider returned HTTP 400 [INVALID_ARGUMENT]: bad model"
        );

        let without = LLMError::api_error(500, "boom", None);
        assert_eq!(without.to_string(), "provider returned HTTP 500: boom");
    }

    #[test]
    fn from_status_maps_auth() {
        assert!(matches!(
            LLMError::from_status(401, "bad key", None, None).kind,
            LLMErrorKind::AuthenticationFailed { .. }
        ));
        assert!(matches!(
            LLMError::from_status(403, "forbidden", None, None).kind,
            LLMErrorKind::AuthenticationFailed { .. }
        ));
    }

    #[test]
    fn from_status_maps_rate_limit() {
        let error = LLMError::from_status(429, "slow down", Some(Duration::from_secs(7)), None);
        assert_eq!(
            error.kind,
            LLMErrorKind::RateLimited {
                retry_after: Duration::from_secs(7)
            }
        );

        let error = LLMError::from_status(429, "slow down", None, None);
        assert_eq!(
            error.kind,
            LLMErrorKind::RateLimited {
                retry_after: Duration::from_secs(60)
            }
        );
        assert!(error.to_string().contains("60s"));
    }

    #[test]
    fn from_status_keeps_other_codes() {
        assert_eq!(
            LLMError::from_status(503, "unavailable", None, Some("overloaded".into())).kind,
            LLMErrorKind::ApiError {
                status_code: 503,
                message: "unavailable".into(),
                error_type: Some("overloaded".into()),
            }
        );
    }

    #[test]
    fn timeout_display_keeps_sub_second_limits() {
        let message = LLMError::timeout(Duration::from_millis(1500)).to_string();
        assert_eq!(message, "the model did not answer within 1.5s");
    }

    #[tokio::test]
    async fn transport_maps_elapsed_requests_to_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without ever answering.
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let limit = Duration::from_millis(100);
        let client = reqwest::Client::builder().timeout(limit).build().unwrap();
        let err = client
            .get(format!("http://{addr}/"))
            .send()
            .await
            .unwrap_err();

        assert_eq!(LLMError::transport(err, limit), LLMError::timeout(limit));
        server.abort();
    }

    #[tokio::test]
    async fn transport_maps_refused_connections_to_network() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let limit = Duration::from_secs(5);
        let client = reqwest::Client::builder().timeout(limit).build().unwrap();
        let err = client
            .get(format!("http://{addr}/"))
            .send()
            .await
            .unwrap_err();

        assert!(matches!(
            LLMError::transport(err, limit).kind,
            LLMErrorKind::Network { .. }
        ));
    }
}
