//! Transports: the only place the crate touches the network
//!
//! `HttpTransport` issues real GETs through reqwest. `RetryingTransport`
//! wraps any transport with exponential backoff; the discovery engine itself
//! never retries.

use super::error::GraphError;
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and return the decoded JSON body, whatever the HTTP status.
    async fn get(&self, url: &str) -> Result<Value, GraphError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &str) -> Result<Value, GraphError> {
        (**self).get(url).await
    }
}

/// Strip the credential from a URL so it can appear in errors and logs.
pub fn redact(url: &str) -> String {
    let mut parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return url.to_string(),
    };

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "access_token" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();

    if pairs.is_empty() {
        return parsed.to_string();
    }

    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.to_string()
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, GraphError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GraphError::Transport {
                request: "client setup".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Value, GraphError> {
        let transport_err = |e: reqwest::Error| GraphError::Transport {
            request: redact(url),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport_err)?;
        let status = response.status();

        // Error payloads arrive with 4xx statuses; the body decides, not the status.
        let body: Value = response.json().await.map_err(|e| GraphError::Transport {
            request: redact(url),
            message: format!("non-JSON body (HTTP {}): {}", status, e),
        })?;

        log::debug!("GET {} -> {}", redact(url), status);
        Ok(body)
    }
}

/// Exponential backoff between retries
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    max_retries: u32,
    current_attempt: u32,
}

#[derive(Debug)]
pub struct MaxRetriesExceeded;

impl std::fmt::Display for MaxRetriesExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Maximum retry attempts exceeded")
    }
}

impl std::error::Error for MaxRetriesExceeded {}

impl ExponentialBackoff {
    pub fn new(initial: Duration, max: Duration, retries: u32) -> Self {
        Self {
            initial_delay: initial,
            max_delay: max,
            max_retries: retries,
            current_attempt: 0,
        }
    }

    pub fn next_delay(&self) -> Duration {
        let factor = 2_u32.saturating_pow(self.current_attempt);
        std::cmp::min(self.initial_delay.saturating_mul(factor), self.max_delay)
    }

    pub async fn sleep(&mut self) -> Result<(), MaxRetriesExceeded> {
        if self.current_attempt >= self.max_retries {
            return Err(MaxRetriesExceeded);
        }

        let delay = self.next_delay();

        log::warn!(
            "⏳ Retry attempt {} of {} in {}ms",
            self.current_attempt + 1,
            self.max_retries,
            delay.as_millis()
        );

        sleep(delay).await;
        self.current_attempt += 1;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.current_attempt = 0;
    }
}

/// Retries transient failures (transport errors, throttling) of an inner transport.
pub struct RetryingTransport<T> {
    inner: T,
    backoff: ExponentialBackoff,
}

impl<T: Transport> RetryingTransport<T> {
    pub fn new(inner: T, backoff: ExponentialBackoff) -> Self {
        Self { inner, backoff }
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryingTransport<T> {
    async fn get(&self, url: &str) -> Result<Value, GraphError> {
        let mut backoff = self.backoff.clone();
        backoff.reset();

        loop {
            let (err, throttled_body) = match self.inner.get(url).await {
                Ok(body) => match super::envelope::check_error(&body, &redact(url)) {
                    Err(e) if e.is_rate_limited() => (e, Some(body)),
                    // Non-transient error payloads are the caller's business
                    _ => return Ok(body),
                },
                Err(e) if e.is_transient() => (e, None),
                Err(e) => return Err(e),
            };

            log::warn!("⚠️  {}", err);
            if backoff.sleep().await.is_err() {
                // Hand the last throttled body back so the envelope parser reports it
                return match throttled_body {
                    Some(body) => Ok(body),
                    None => Err(err),
                };
            }
        }
    }
}
