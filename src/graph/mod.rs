//! Remote collection API access
//!
//! ```text
//! GraphClient ──builds──▶ RequestDescriptor + Credential ──▶ URL
//!      │
//!      └──▶ Transport (HttpTransport | RetryingTransport | ScriptedTransport)
//!                 │
//!                 ▼
//!          envelope::parse_envelope ──▶ typed records (PageRecord, PostRecord, EdgeRecord)
//! ```

pub mod client;
pub mod envelope;
pub mod error;
pub mod request;
#[doc(hidden)]
pub mod scripted;
pub mod transport;
pub mod types;

pub use client::GraphClient;
pub use error::GraphError;
pub use request::{Credential, RequestDescriptor};
#[doc(hidden)]
pub use scripted::ScriptedTransport;
pub use transport::{ExponentialBackoff, HttpTransport, RetryingTransport, Transport};
pub use types::{EdgeRecord, Identified, PageRecord, PostRecord, ProfileType};
