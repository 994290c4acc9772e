//! Errors raised while talking to the remote collection API

use thiserror::Error;

/// Error codes the Graph API uses for throttling (app, user, page and
/// per-method limits).
const RATE_LIMIT_CODES: [i64; 4] = [4, 17, 32, 613];

#[derive(Debug, Error)]
pub enum GraphError {
    /// The response carried an explicit `error` payload, whatever the HTTP status.
    #[error("remote API error for {request}: {message}")]
    RemoteApi {
        request: String,
        message: String,
        code: Option<i64>,
    },

    /// The response is JSON but lacks the fields a collection page must have.
    #[error("malformed response for {request}: {detail}")]
    MalformedResponse { request: String, detail: String },

    /// The request never produced a JSON body.
    #[error("transport error for {request}: {message}")]
    Transport { request: String, message: String },
}

impl GraphError {
    pub fn request(&self) -> &str {
        match self {
            GraphError::RemoteApi { request, .. }
            | GraphError::MalformedResponse { request, .. }
            | GraphError::Transport { request, .. } => request,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            GraphError::RemoteApi { code: Some(code), .. } if RATE_LIMIT_CODES.contains(code)
        )
    }

    /// Whether re-issuing the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, GraphError::Transport { .. }) || self.is_rate_limited()
    }
}
