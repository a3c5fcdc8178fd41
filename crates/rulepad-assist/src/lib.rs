/// Rulepad Assist
///
/// Completion and hover assistance for the line-oriented rules language
/// (`pattern protocol://value`), embedded in a host text editor.
///
/// # Architecture
///
/// 1. **Context Layer**: classify the word before the cursor into a [`RuleToken`]
///    (protocol, `@value`, `%plugin` variable, `pipe:`/`sniCallback:` spec, or
///    plugin value)
/// 2. **Candidate Layer**: filter and rank the protocol registry or plugin
///    directory, apply the shorthand table, cap the list
/// 3. **Remote Layer**: debounced, cancellable plugin hint fetches with a
///    generation check before any result is applied
/// 4. **Help Layer**: resolve rule names to help URLs and documentation bodies
/// 5. **Adapter Layer**: [`RulesAssist`] wires the layers to a [`HostEditor`]
///
/// Nothing here fails loudly: bad input, unreachable endpoints and stale
/// results all end as fewer (or no) suggestions.
///
/// # Example
///
/// ```ignore
/// use rulepad_assist::*;
///
/// let plugins = PluginDirectory::from_json(&plugins_json)?;
/// let mut assist = RulesAssist::new(AssistConfig::default(), plugins)
///     .with_http_transport("http://127.0.0.1:8899")?;
/// assist.attach(&mut editor);
///
/// let outcome = assist.on_completion_request(&mut editor, line, cursor, TriggerKind::Character);
/// if outcome.pending.is_some() {
///     assist.process_next_hint(&mut editor).await;
/// }
/// ```
pub mod candidates;
pub mod config;
pub mod context;
pub mod docs;
pub mod engine;
pub mod host;
pub mod hover;
pub mod plugins;
pub mod registry;
pub mod remote;
pub mod types;

pub use candidates::{protocol_replace_range, render_hint_text, CandidateBuilder, HintSet};
pub use config::{init_logging, AssistConfig, ConfigFormat, ConfigLoader, HintLimits, LoggingConfig};
pub use context::{hover_target, ContextClassifier, HoverTarget};
pub use docs::{normalize_rule_name, DocCorpus, DocEntry};
pub use engine::{CompletionOutcome, RulesAssist};
pub use host::{AtHelp, AtValueProvider, HostEditor, KeyStroke, LanguageRegistration};
pub use hover::{tooltip_markup, HelpResolution, HelpUrl, HoverResolver};
pub use plugins::{HintItem, PluginDirectory, PluginMeta, PluginVars};
pub use registry::ProtocolRegistry;
#[cfg(feature = "http")]
pub use remote::HttpHintTransport;
pub use remote::{HintEvent, HintKey, HintRequest, HintSession, HintTransport, RemoteHintFetcher};
pub use types::*;
