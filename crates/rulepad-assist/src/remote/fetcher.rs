use super::payload::parse_payload;
use super::session::{HintKey, HintSession};
use super::{HintRequest, HintTransport};
use crate::candidates::{HintSet, PluginHintRenderer};
use crate::config::{AssistConfig, HintLimits};
use crate::plugins::PluginMeta;
use crate::types::*;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Outcome of one remote fetch, delivered back to the owning engine
#[derive(Debug)]
pub struct HintEvent {
    pub generation: u64,
    pub result: AssistResult<Value>,
}

struct PendingFetch {
    generation: u64,
    key: HintKey,
    plugin: PluginMeta,
    for_vars: bool,
    cancel: CancellationToken,
}

/// Debounced, cancellable plugin hint fetcher
///
/// Every [`RemoteHintFetcher::schedule`] bumps a generation counter and
/// cancels the previous task. Results come back as [`HintEvent`]s on the
/// channel and are applied with [`RemoteHintFetcher::apply`], which drops
/// anything that is not from the latest generation.
pub struct RemoteHintFetcher {
    transport: Option<Arc<dyn HintTransport>>,
    debounce: Duration,
    limits: HintLimits,
    plugins_index: String,
    generation: u64,
    pending: Option<PendingFetch>,
    session: HintSession,
    events: mpsc::UnboundedSender<HintEvent>,
}

impl RemoteHintFetcher {
    /// Fetcher plus the receiving end of its event channel
    pub fn channel(
        transport: Option<Arc<dyn HintTransport>>,
        config: &AssistConfig,
    ) -> (Self, mpsc::UnboundedReceiver<HintEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let fetcher = Self {
            transport,
            debounce: config.debounce(),
            limits: config.limits(),
            plugins_index: config.plugins_index_url.clone(),
            generation: 0,
            pending: None,
            session: HintSession::new(),
            events: tx,
        };
        (fetcher, rx)
    }

    pub fn session(&self) -> &HintSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut HintSession {
        &mut self.session
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    /// Cached hints for exactly this key
    pub fn cached(&self, key: &HintKey) -> Option<&HintSet> {
        self.session.cached(key)
    }

    /// Install a locally built list (static plugin hint lists)
    pub fn install(&mut self, key: HintKey, hints: HintSet) {
        self.session.replace(key, hints);
    }

    /// Start (or restart) the debounce timer for a remote fetch
    ///
    /// Returns the generation of the new request, or `None` when there is
    /// nothing to fetch from or no tokio runtime to run the fetch on.
    pub fn schedule(&mut self, plugin: &PluginMeta, key: HintKey, for_vars: bool) -> Option<u64> {
        let transport = self.transport.clone()?;
        let endpoint = plugin.hint_endpoint(for_vars)?;

        self.cancel();
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime, skipping remote hints for {}", key.protocol);
            return None;
        };
        self.generation += 1;
        let generation = self.generation;
        let cancel = CancellationToken::new();

        let request = HintRequest {
            endpoint,
            protocol: key.protocol.clone(),
            value: key.value.clone(),
            sep: key.sep,
        };
        debug!(
            "Scheduling hint fetch #{} for {} ({:?})",
            generation, request.endpoint, request.value
        );

        let token = cancel.clone();
        let events = self.events.clone();
        let debounce = self.debounce;
        runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(debounce) => {}
            }
            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = transport.fetch_hints(&request) => result,
            };
            // Receiver gone means the engine was dropped
            let _ = events.send(HintEvent { generation, result });
        });

        self.pending = Some(PendingFetch {
            generation,
            key,
            plugin: plugin.clone(),
            for_vars,
            cancel,
        });
        Some(generation)
    }

    /// Drop the pending request, if any; its result will never be applied
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!("Cancelling hint fetch #{}", pending.generation);
            pending.cancel.cancel();
        }
    }

    /// Cancel pending work and forget the session
    pub fn reset(&mut self) {
        self.cancel();
        self.session.clear();
    }

    /// Apply a fetch result; returns true when a non-empty list was installed
    pub fn apply(&mut self, event: HintEvent) -> bool {
        let current = matches!(&self.pending, Some(p) if p.generation == event.generation);
        if !current {
            debug!(
                "Dropping stale hint result #{} (current #{})",
                event.generation, self.generation
            );
            return false;
        }
        let Some(pending) = self.pending.take() else {
            return false;
        };

        let data = match event.result {
            Ok(data) => data,
            Err(e) => {
                warn!("Hint fetch for {} failed: {}", pending.key.protocol, e);
                self.session.clear();
                return false;
            }
        };
        let payload = match parse_payload(&data) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Ignoring hints for {}: {}", pending.key.protocol, e);
                self.session.clear();
                return false;
            }
        };

        let mut renderer = PluginHintRenderer::new(
            &pending.plugin,
            &pending.key.protocol,
            pending.for_vars,
            self.limits,
            &self.plugins_index,
        );
        for item in &payload.items {
            if renderer.is_full() {
                break;
            }
            renderer.push(&item.text, item.label.as_deref(), item.is_key, item.help.as_deref());
        }
        let hints = renderer.finish_with(payload.position, payload.offset);
        let found = !hints.is_empty();
        info!("Received {} hints for {}", hints.candidates.len(), pending.key.protocol);
        self.session.replace(pending.key, hints);
        found
    }
}

impl Drop for RemoteHintFetcher {
    fn drop(&mut self) {
        self.cancel();
    }
}
