//! Editor adapter
//!
//! [`RulesAssist`] is the per-editor-instance entry point. It receives
//! editor callbacks (completion requests, hint arrivals, blur, hover) and
//! routes them through classification, candidate building, remote hints and
//! help resolution, then hands the results to a [`HostEditor`].

use crate::candidates::{protocol_replace_range, CandidateBuilder, HintSet};
use crate::config::AssistConfig;
use crate::context::{hover_target, word_end, ContextClassifier};
use crate::docs::DocCorpus;
use crate::host::{AtValueProvider, HostEditor, LanguageRegistration};
use crate::hover::{tooltip_markup, HelpResolution, HoverResolver};
use crate::plugins::PluginDirectory;
use crate::registry::ProtocolRegistry;
use crate::remote::{HintEvent, HintKey, HintSession, HintTransport, RemoteHintFetcher};
use crate::types::*;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Result of one completion request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionOutcome {
    /// Popup handed to the host, if any
    pub popup: Option<CompletionPopup>,
    /// Generation of a scheduled remote fetch, if one was started
    pub pending: Option<u64>,
}

impl CompletionOutcome {
    fn shown(popup: CompletionPopup) -> Self {
        Self {
            popup: Some(popup),
            pending: None,
        }
    }
}

enum PluginLookup {
    Shown(CompletionPopup),
    Pending(Option<u64>),
    /// A static list exists but nothing in it matches
    Empty,
}

/// Completion and hover assistance for one rules editor
pub struct RulesAssist {
    config: AssistConfig,
    registry: Arc<ProtocolRegistry>,
    plugins: Arc<PluginDirectory>,
    docs: Arc<DocCorpus>,
    at_values: Option<Arc<dyn AtValueProvider>>,
    fetcher: RemoteHintFetcher,
    hint_events: mpsc::UnboundedReceiver<HintEvent>,
    initialized: bool,
    enabled: bool,
    waiting_remote: bool,
    last_request: Option<(String, usize)>,
}

impl RulesAssist {
    /// Engine over the configured protocols plus one `name://` per plugin
    pub fn new(config: AssistConfig, plugins: PluginDirectory) -> Self {
        let builtin = ProtocolRegistry::from_config(&config);
        let docs = DocCorpus::from_registry(&builtin, &config.rules_help_base);
        let registry = builtin.with_plugin_protocols(plugins.plugin_names());
        let (fetcher, hint_events) = RemoteHintFetcher::channel(None, &config);

        Self {
            enabled: config.enabled,
            config,
            registry: Arc::new(registry),
            plugins: Arc::new(plugins),
            docs: Arc::new(docs),
            at_values: None,
            fetcher,
            hint_events,
            initialized: false,
            waiting_remote: false,
            last_request: None,
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn HintTransport>) -> Self {
        let (fetcher, hint_events) = RemoteHintFetcher::channel(Some(transport), &self.config);
        self.fetcher = fetcher;
        self.hint_events = hint_events;
        self
    }

    /// Use the HTTP transport against `base_url`
    #[cfg(feature = "http")]
    pub fn with_http_transport(self, base_url: &str) -> AssistResult<Self> {
        let transport = crate::remote::HttpHintTransport::new(base_url)?;
        Ok(self.with_transport(Arc::new(transport)))
    }

    pub fn with_at_values(mut self, provider: Arc<dyn AtValueProvider>) -> Self {
        self.at_values = Some(provider);
        self
    }

    /// Replace the documentation corpus (e.g. one loaded from markdown)
    pub fn with_docs(mut self, docs: DocCorpus) -> Self {
        self.docs = Arc::new(docs);
        self
    }

    pub fn config(&self) -> &AssistConfig {
        &self.config
    }

    pub fn registry(&self) -> &ProtocolRegistry {
        &self.registry
    }

    pub fn session(&self) -> &HintSession {
        self.fetcher.session()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling empties protocol hints; other modes keep working
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Register the rules language with the host, once per instance
    pub fn attach<H: HostEditor + ?Sized>(&mut self, host: &mut H) {
        if self.initialized {
            return;
        }
        let registration = LanguageRegistration::rules(self.registry.keywords());
        host.register_language(&registration);
        self.initialized = true;
        info!("Registered language {}", registration.id);
    }

    /// Handle a completion request at `cursor` (a char column of `line`)
    ///
    /// Shows a popup on the host when candidates are available right away;
    /// otherwise a remote fetch may be scheduled and the popup follows from
    /// [`RulesAssist::on_hint_event`].
    pub fn on_completion_request<H: HostEditor + ?Sized>(
        &mut self,
        host: &mut H,
        line: &str,
        cursor: usize,
        trigger: TriggerKind,
    ) -> CompletionOutcome {
        self.last_request = Some((line.to_string(), cursor));
        self.waiting_remote = false;
        // Only a plugin hint popup re-serves the session list
        self.fetcher.session_mut().clear_served();

        let outcome = self.complete(line, cursor, trigger);
        if let Some(popup) = &outcome.popup {
            debug!("Showing {} candidates ({:?})", popup.candidates.len(), popup.mode);
            host.show_completions(popup.clone());
        }
        outcome
    }

    fn complete(&mut self, line: &str, cursor: usize, trigger: TriggerKind) -> CompletionOutcome {
        let limits = self.config.limits();
        let registry = Arc::clone(&self.registry);
        let plugins = Arc::clone(&self.plugins);
        let at_values = self.at_values.clone();

        let Some(token) = ContextClassifier::new(&plugins, limits).classify(line, cursor, trigger) else {
            return CompletionOutcome::default();
        };
        let builder = CandidateBuilder::new(&registry, &plugins, limits)
            .with_at_values(at_values.as_deref())
            .with_protocols_enabled(self.enabled);

        let popup = |candidates: Vec<Candidate>, mode: PopupMode| {
            (!candidates.is_empty()).then(|| CompletionPopup {
                candidates,
                replace_from: token.start,
                replace_to: token.end,
                mode,
            })
        };

        match &token.kind {
            TokenKind::AtValue { .. } => CompletionOutcome {
                popup: popup(builder.build(&token), PopupMode::AtValue),
                pending: None,
            },
            TokenKind::PluginVar { separator: None, .. } => CompletionOutcome {
                popup: popup(builder.build(&token), PopupMode::PluginVar),
                pending: None,
            },
            TokenKind::PluginSpec { .. } => CompletionOutcome {
                popup: popup(builder.build(&token), PopupMode::PluginSpec),
                pending: None,
            },
            TokenKind::PluginVar {
                plugin,
                separator: Some(sep),
                value,
            } => {
                let protocol = format!("%{}", plugin);
                let key = HintKey::new(protocol, value.as_str()).with_sep(Some(*sep));
                match self.plugin_hints(&builder, line, cursor, &token, plugin, key, true) {
                    PluginLookup::Shown(popup) => CompletionOutcome::shown(popup),
                    PluginLookup::Pending(pending) => CompletionOutcome {
                        popup: None,
                        pending,
                    },
                    PluginLookup::Empty => CompletionOutcome::default(),
                }
            }
            TokenKind::Plain {
                plugin,
                protocol,
                value,
            } => {
                let key = HintKey::new(protocol.as_str(), value.as_str());
                let pending = match self.plugin_hints(&builder, line, cursor, &token, plugin, key, false) {
                    PluginLookup::Shown(popup) => return CompletionOutcome::shown(popup),
                    PluginLookup::Empty => return CompletionOutcome::default(),
                    PluginLookup::Pending(pending) => pending,
                };
                // `name:` with nothing after it may still be a protocol being typed
                if !value.is_empty() || token.text.contains("//") {
                    return CompletionOutcome {
                        popup: None,
                        pending,
                    };
                }
                CompletionOutcome {
                    popup: self.protocol_popup(&builder, line, &token),
                    pending,
                }
            }
            TokenKind::Protocol => CompletionOutcome {
                popup: self.protocol_popup(&builder, line, &token),
                pending: None,
            },
        }
    }

    fn protocol_popup(&self, builder: &CandidateBuilder<'_>, line: &str, token: &RuleToken) -> Option<CompletionPopup> {
        let candidates = builder.protocol_candidates(&token.text);
        if candidates.is_empty() {
            return None;
        }
        let (replace_from, replace_to) = protocol_replace_range(line, token, &candidates);
        Some(CompletionPopup {
            candidates,
            replace_from,
            replace_to,
            mode: PopupMode::Protocol,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn plugin_hints(
        &mut self,
        builder: &CandidateBuilder<'_>,
        line: &str,
        cursor: usize,
        token: &RuleToken,
        plugin_name: &str,
        key: HintKey,
        for_vars: bool,
    ) -> PluginLookup {
        let Some(plugin) = self.plugins.get_plugin(plugin_name).cloned() else {
            return PluginLookup::Empty;
        };
        self.fetcher.cancel();

        if let Some(hints) =
            builder.plugin_hints(&plugin, &key.protocol, &key.value, for_vars, &self.config.plugins_index_url)
        {
            if hints.is_empty() {
                return PluginLookup::Empty;
            }
            self.fetcher.install(key.clone(), hints);
        }

        if let Some(hints) = self.fetcher.cached(&key).cloned() {
            self.fetcher.session_mut().mark_served();
            return PluginLookup::Shown(hint_popup(line, cursor, token, hints));
        }

        self.waiting_remote = true;
        PluginLookup::Pending(self.fetcher.schedule(&plugin, key, for_vars))
    }

    /// Wait for the next remote hint result
    pub async fn recv_hint_event(&mut self) -> Option<HintEvent> {
        self.hint_events.recv().await
    }

    pub fn try_recv_hint_event(&mut self) -> Option<HintEvent> {
        self.hint_events.try_recv().ok()
    }

    /// Apply a remote hint result; re-opens the popup when it is still wanted
    ///
    /// Returns true when a popup was shown.
    pub fn on_hint_event<H: HostEditor + ?Sized>(&mut self, host: &mut H, event: HintEvent) -> bool {
        let found = self.fetcher.apply(event);
        if !found || !self.waiting_remote {
            return false;
        }
        let Some((line, cursor)) = self.last_request.clone() else {
            return false;
        };
        self.on_completion_request(host, &line, cursor, TriggerKind::Plugin)
            .popup
            .is_some()
    }

    /// Wait for one hint result and apply it
    pub async fn process_next_hint<H: HostEditor + ?Sized>(&mut self, host: &mut H) -> Option<bool> {
        let event = self.recv_hint_event().await?;
        Some(self.on_hint_event(host, event))
    }

    /// Editor lost focus: stop waiting, drop pending work and the session
    pub fn on_blur(&mut self) {
        self.waiting_remote = false;
        self.fetcher.reset();
    }

    fn resolver(&self) -> HoverResolver<'_> {
        HoverResolver::new(
            &self.plugins,
            &self.docs,
            self.config.at_help_url(),
            &self.config.plugins_index_url,
        )
        .with_at_values(self.at_values.as_deref())
    }

    /// Show a tooltip for the rule name under `cursor`, when it has docs
    pub fn on_hover<H: HostEditor + ?Sized>(&self, host: &mut H, line: &str, cursor: usize) -> Option<HoverTooltip> {
        let target = hover_target(line, cursor)?;
        let help = self.resolver().resolve_help(&target.name, None);
        let url = help.url.as_url()?;
        let doc = help.doc.as_deref().filter(|doc| !doc.is_empty())?;

        let tooltip = HoverTooltip {
            content_markup: tooltip_markup(&target.name, url, doc),
            replace_from: target.start,
            replace_to: target.end,
        };
        host.show_tooltip(tooltip.clone());
        Some(tooltip)
    }

    /// Help for the highlighted popup entry, or for the word at `cursor`
    ///
    /// A selected candidate resolves through its help key; plugin hints use
    /// the URLs that came with the list on screen.
    pub fn help_url(&self, line: &str, cursor: usize, selected: Option<&Candidate>) -> Option<HelpResolution> {
        let resolver = self.resolver();
        match selected {
            Some(candidate) => Some(resolver.resolve_help(candidate.help_ref.as_str(), Some(self.fetcher.session()))),
            None => {
                let target = hover_target(line, cursor)?;
                Some(resolver.resolve_help(&target.name, None))
            }
        }
    }
}

/// Popup for plugin hints, honoring the list's insert position and offset
fn hint_popup(line: &str, cursor: usize, token: &RuleToken, hints: HintSet) -> CompletionPopup {
    let chars: Vec<char> = line.chars().collect();
    let start = token.start;
    let end = word_end(&chars, start);

    let (mut from, to) = match hints.position {
        InsertPosition::Word => (start, end),
        InsertPosition::Cursor => (cursor.clamp(start, end), end),
        InsertPosition::Tail => (end, end),
    };
    if hints.offset > 0 {
        from = start.max(from + hints.offset).min(end);
    }

    CompletionPopup {
        candidates: hints.candidates,
        replace_from: from,
        replace_to: to,
        mode: PopupMode::PluginHint,
    }
}
