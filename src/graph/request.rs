//! Request descriptors and credentials

use std::fmt;

/// Credential sent as the `access_token` query parameter.
#[derive(Clone)]
pub enum Credential {
    /// Pre-obtained user or page session token
    AccessToken(String),
    /// App credentials, sent as the `app_id|app_secret` composite
    App { app_id: String, app_secret: String },
}

impl Credential {
    /// Pick the session token when present, otherwise fall back to app credentials.
    pub fn resolve(
        access_token: Option<String>,
        app_id: Option<String>,
        app_secret: Option<String>,
    ) -> Option<Self> {
        match (access_token, app_id, app_secret) {
            (Some(token), _, _) if !token.is_empty() => Some(Credential::AccessToken(token)),
            (_, Some(app_id), Some(app_secret)) => Some(Credential::App { app_id, app_secret }),
            _ => None,
        }
    }

    pub fn as_param(&self) -> String {
        match self {
            Credential::AccessToken(token) => token.clone(),
            Credential::App { app_id, app_secret } => format!("{}|{}", app_id, app_secret),
        }
    }
}

// Never print secrets in logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::AccessToken(_) => write!(f, "Credential::AccessToken(***)"),
            Credential::App { app_id, .. } => write!(f, "Credential::App({}|***)", app_id),
        }
    }
}

/// Resource path plus query parameters, without the credential.
///
/// Its `Display` form is what appears in errors and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)?;
        for (i, (key, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}
