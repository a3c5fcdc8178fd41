//! Seams to the embedding editor
//!
//! The engine never renders anything itself. It talks to the host through
//! [`HostEditor`] and, optionally, asks it about `@` values through
//! [`AtValueProvider`].

use crate::types::*;
use serde_json::Value;

/// Language id registered with the host
pub const LANGUAGE_ID: &str = "rules";

/// Host answer for an `@` value help lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtHelp {
    /// Use this URL
    Url(String),
    /// The host explicitly declined; no help is shown
    Hidden,
    /// The host has no opinion; the default `@` help page is used
    Unknown,
}

/// Host-provided `@value` source
pub trait AtValueProvider: Send + Sync {
    /// Values for `@keyword`: strings or `{ "value": .., "label": .. }` objects
    fn at_values(&self, keyword: &str) -> Option<Vec<Value>>;

    /// Help URL for `@name`
    fn at_help_url(&self, _name: &str) -> AtHelp {
        AtHelp::Unknown
    }
}

/// Language definition handed to the host on first attach
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRegistration {
    pub id: String,
    pub aliases: Vec<String>,
    pub line_comment: String,
    /// Protocol names for keyword highlighting
    pub keywords: Vec<String>,
}

impl LanguageRegistration {
    pub fn rules(keywords: Vec<String>) -> Self {
        Self {
            id: LANGUAGE_ID.to_string(),
            aliases: vec!["whistle".to_string()],
            line_comment: "#".to_string(),
            keywords,
        }
    }
}

/// Rendering surface of the host editor
pub trait HostEditor {
    fn register_language(&mut self, registration: &LanguageRegistration);

    fn show_completions(&mut self, popup: CompletionPopup);

    fn show_tooltip(&mut self, tooltip: HoverTooltip);
}

/// A key the host reports before deciding whether to ask for completions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStroke {
    Char(char),
    Backspace,
    Delete,
    Enter,
    Other,
}

impl KeyStroke {
    /// Whether this key should auto-open the completion popup
    pub fn triggers_completion(self) -> bool {
        match self {
            KeyStroke::Char(ch) => ch.is_ascii_alphanumeric() || "-_@.,<>:/?!$%^&*=+'\";\\|~[]{}()".contains(ch),
            KeyStroke::Backspace | KeyStroke::Delete | KeyStroke::Enter => true,
            KeyStroke::Other => false,
        }
    }

    /// Trigger class passed on to classification
    pub fn trigger_kind(self) -> TriggerKind {
        match self {
            KeyStroke::Backspace | KeyStroke::Delete => TriggerKind::Delete,
            KeyStroke::Enter => TriggerKind::Enter,
            _ => TriggerKind::Character,
        }
    }
}
