//! Remote plugin hints
//!
//! Plugins may serve value hints from an HTTP endpoint. Requests are
//! debounced, superseded by newer input, and their results cached as a
//! [`HintSession`] keyed by the exact protocol/value pair.
//!
//! ```text
//! classify → schedule (debounce) → HintTransport::fetch_hints
//!                                        ↓
//!                  HintEvent ← channel ← task
//!                      ↓
//!                 apply (generation check) → HintSession
//! ```

mod fetcher;
#[cfg(feature = "http")]
mod http;
mod payload;
mod session;

pub use fetcher::{HintEvent, RemoteHintFetcher};
#[cfg(feature = "http")]
pub use http::HttpHintTransport;
pub use payload::{parse_payload, HintPayload, RawHint};
pub use session::{HintKey, HintSession};

use crate::types::*;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// One hint request to a plugin endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HintRequest {
    /// Normalized endpoint path, e.g. `plugin.inspect/cgi-bin/hints`
    #[serde(skip)]
    pub endpoint: String,
    pub protocol: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sep: Option<VarSeparator>,
}

/// Transport for plugin hint requests
#[async_trait]
pub trait HintTransport: Send + Sync {
    /// Fetch the raw JSON hint payload
    async fn fetch_hints(&self, request: &HintRequest) -> AssistResult<Value>;
}
