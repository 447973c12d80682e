/// Embedding service HTTP client implementation.
///
/// This module provides `HttpEmbedder` for making synchronous HTTP
/// requests to the embedding service, along with error types and a
/// builder for configuration.
use std::thread;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when requesting embeddings.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Embedding service timed out")]
    Timeout(#[source] reqwest::Error),

    /// HTTP errors with status code
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// Embedding service responses that cannot be interpreted
    #[error("Embedding service error: {message}")]
    Api { message: String },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Produces fixed-length embedding vectors for text.
///
/// This trait is the seam between the engine and the external embedding
/// service: production code uses `HttpEmbedder`, tests substitute mocks.
pub trait Embedder: Send + Sync {
    /// Embeds a single text into a fixed-length vector.
    ///
    /// The dimension is fixed per deployment; callers enforce that query
    /// and corpus vectors agree.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

/// Builder for constructing `HttpEmbedder` instances.
///
/// # Examples
///
/// ```
/// use docq::embed::HttpEmbedderBuilder;
///
/// let embedder = HttpEmbedderBuilder::new()
///     .base_url("http://localhost:8001")
///     .build()
///     .expect("Failed to create embedder");
/// ```
#[derive(Debug, Default)]
pub struct HttpEmbedderBuilder {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl HttpEmbedderBuilder {
    /// Creates a new `HttpEmbedderBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL for the embedding service.
    ///
    /// # Arguments
    ///
    /// * `url` - The base URL (e.g., "http://localhost:8001")
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the request timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Builds the `HttpEmbedder` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// If `base_url()` was not called, this method checks the
    /// `DOCQ_EMBED_URL` environment variable and falls back to
    /// `http://localhost:8001`. If `timeout_secs()` was not called, it
    /// checks `DOCQ_EMBED_TIMEOUT_SECS` and falls back to 30.
    pub fn build(self) -> Result<HttpEmbedder, EmbedError> {
        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            std::env::var("DOCQ_EMBED_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string())
        };

        let timeout_secs = if let Some(secs) = self.timeout_secs {
            secs
        } else {
            std::env::var("DOCQ_EMBED_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30)
        };

        reqwest::Url::parse(&base_url)
            .map_err(|e| EmbedError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(EmbedError::Network)?;

        Ok(HttpEmbedder { client, base_url })
    }
}

/// Synchronous HTTP client for the embedding service.
///
/// Should be constructed using `HttpEmbedderBuilder`.
pub struct HttpEmbedder {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpEmbedder {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn embed_internal(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let url = format!("{}/embed", self.base_url);
        let request_body = serde_json::json!({ "text": text });

        retry_with_backoff(|| {
            let response = self
                .client
                .post(&url)
                .json(&request_body)
                .send()
                .map_err(|e| {
                    if e.is_timeout() {
                        EmbedError::Timeout(e)
                    } else {
                        EmbedError::Network(e)
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(EmbedError::Http {
                    status: status.as_u16(),
                });
            }

            let json: serde_json::Value = response.json().map_err(EmbedError::Network)?;

            let embedding = json
                .get("embedding")
                .and_then(|v| v.as_array())
                .ok_or_else(|| EmbedError::Api {
                    message: "Missing 'embedding' field in service response".to_string(),
                })?;

            embedding
                .iter()
                .map(|v| {
                    v.as_f64().map(|f| f as f32).ok_or_else(|| EmbedError::Api {
                        message: "Non-numeric value in embedding".to_string(),
                    })
                })
                .collect()
        })
    }
}

impl Embedder for HttpEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.embed_internal(text)
    }
}

/// Retries an operation with exponential backoff.
///
/// Retries up to 3 times with delays of 1s, 2s, and 4s, but only on
/// transient errors (HTTP 5xx, network errors, timeouts), never on client
/// errors (HTTP 4xx).
pub fn retry_with_backoff<F, T>(mut f: F) -> Result<T, EmbedError>
where
    F: FnMut() -> Result<T, EmbedError>,
{
    const MAX_RETRIES: usize = 3;
    const DELAYS: [u64; MAX_RETRIES] = [1, 2, 4]; // seconds

    let mut last_error = match f() {
        Ok(result) => return Ok(result),
        Err(e) => {
            if !should_retry(&e) {
                return Err(e);
            }
            e
        }
    };

    for &delay_secs in &DELAYS {
        thread::sleep(Duration::from_secs(delay_secs));

        match f() {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !should_retry(&e) {
                    return Err(e);
                }
                last_error = e;
            }
        }
    }

    Err(last_error)
}

/// Determines if an error should be retried.
///
/// Returns `true` for transient errors (HTTP 5xx, network errors,
/// timeouts), `false` for client errors (HTTP 4xx) and configuration
/// errors.
fn should_retry(error: &EmbedError) -> bool {
    match error {
        EmbedError::Network(_) => true,
        EmbedError::Timeout(_) => true,
        EmbedError::Http { status } => *status >= 500 && *status < 600,
        EmbedError::Api { .. } => false,
        EmbedError::InvalidUrl(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_variant_with_status_code() {
        let error = EmbedError::Http { status: 404 };

        let message = format!("{}", error);
        assert!(message.contains("HTTP error"));
        assert!(message.contains("404"));
    }

    #[test]
    fn api_error_carries_message() {
        let error = EmbedError::Api {
            message: "Missing 'embedding' field in service response".to_string(),
        };
        assert!(format!("{}", error).contains("Missing 'embedding' field"));
    }

    #[test]
    fn invalid_url_fails_at_build_time() {
        let result = HttpEmbedderBuilder::new().base_url("not a url").build();
        assert!(matches!(result, Err(EmbedError::InvalidUrl(_))));
    }

    #[test]
    fn builder_accepts_explicit_configuration() {
        let embedder = HttpEmbedderBuilder::new()
            .base_url("http://localhost:9999")
            .timeout_secs(5)
            .build()
            .unwrap();

        assert_eq!(embedder.base_url(), "http://localhost:9999");
    }

    #[test]
    fn client_errors_are_not_retried() {
        assert!(!should_retry(&EmbedError::Http { status: 400 }));
        assert!(!should_retry(&EmbedError::Http { status: 404 }));
        assert!(!should_retry(&EmbedError::Api {
            message: "bad".to_string()
        }));
        assert!(!should_retry(&EmbedError::InvalidUrl("x".to_string())));
    }

    #[test]
    fn server_errors_are_retried() {
        assert!(should_retry(&EmbedError::Http { status: 500 }));
        assert!(should_retry(&EmbedError::Http { status: 503 }));
    }

    #[test]
    fn retry_stops_immediately_on_client_error() {
        let mut calls = 0;
        let result: Result<(), _> = retry_with_backoff(|| {
            calls += 1;
            Err(EmbedError::Http { status: 404 })
        });

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn retry_returns_first_success() {
        let mut calls = 0;
        let result = retry_with_backoff(|| {
            calls += 1;
            Ok::<_, EmbedError>(42)
        });

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }
}
