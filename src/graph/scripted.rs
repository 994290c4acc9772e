//! In-memory transport serving queued responses per resource path
//!
//! A test double for the unit and integration suites; hidden from the public
//! docs and not used by the binaries. Responses are keyed by the resource path (`{id}/likes`, `search`, ...), ignoring the
//! API version and query string, and served in the order they were queued.

use super::error::GraphError;
use super::transport::{redact, Transport};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

const SCRIPTED_BASE: &str = "https://scripted.local/v0";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Value>>>,
    calls: Mutex<Vec<String>>,
    urls: Mutex<Vec<String>>,
    latency: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Resource path of a URL with the version segment dropped.
pub fn route_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .map(|segments| segments.skip(1).collect::<Vec<_>>().join("/"))
            .unwrap_or_default(),
        Err(_) => url.to_string(),
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one raw response body for `path`.
    pub fn push(&self, path: &str, body: Value) {
        let mut routes = lock(&self.routes);
        routes.entry(path.to_string()).or_default().push_back(body);
    }

    /// Queue a paginated collection: every page but the last links to the next.
    pub fn pages(&self, path: &str, pages: Vec<Vec<Value>>) {
        let total = pages.len();
        for (i, data) in pages.into_iter().enumerate() {
            let body = if i + 1 < total {
                json!({
                    "data": data,
                    "paging": {"next": format!("{}/{}?after=cursor{}", SCRIPTED_BASE, path, i + 1)}
                })
            } else {
                json!({"data": data})
            };
            self.push(path, body);
        }
    }

    /// Queue an error payload for `path`.
    pub fn fail(&self, path: &str, message: &str) {
        self.push(path, json!({"error": {"message": message, "type": "GraphMethodException", "code": 100}}));
    }

    /// Delay every response, so concurrent callers overlap.
    pub fn set_latency(&self, latency: Duration) {
        *lock(&self.latency) = Some(latency);
    }

    /// Route keys of every request served so far, in order.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Full URLs requested for `path`, credential redacted.
    pub fn urls_to(&self, path: &str) -> Vec<String> {
        lock(&self.urls)
            .iter()
            .filter(|url| route_key(url) == path)
            .cloned()
            .collect()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        lock(&self.calls).iter().filter(|c| c.as_str() == path).count()
    }

    /// Highest number of requests that were in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<Value, GraphError> {
        let key = route_key(url);
        lock(&self.calls).push(key.clone());
        lock(&self.urls).push(redact(url));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let latency = *lock(&self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let response = lock(&self.routes).get_mut(&key).and_then(VecDeque::pop_front);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        response.ok_or_else(|| GraphError::Transport {
            request: key,
            message: "no scripted response".to_string(),
        })
    }
}
