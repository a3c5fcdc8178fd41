//! Core types shared by the assistance engine
//!
//! Tokens, candidates, popup/tooltip payloads and the crate error type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for fallible assistance operations
pub type AssistResult<T> = Result<T, AssistError>;

/// Errors raised while loading data or talking to a hint endpoint
///
/// None of these reach the host editor: the assistance surfaces swallow them
/// and offer fewer suggestions instead.
#[derive(Debug, thiserror::Error)]
pub enum AssistError {
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Hint endpoint could not be reached or answered with an error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Hint endpoint answered with an unexpected shape
    #[error("Invalid hint response: {0}")]
    InvalidResponse(String),

    /// Request was superseded before it completed
    #[error("Request cancelled")]
    Cancelled,
}

/// What the user did right before completion was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerKind {
    /// A printable character was typed
    #[default]
    Character,
    /// Backspace/delete
    Delete,
    /// Enter/newline
    Enter,
    /// Explicit request (e.g. `Alt-/`)
    Manual,
    /// Re-invocation after remote plugin hints arrived
    Plugin,
}

impl TriggerKind {
    /// Whether an empty word should stay silent for this trigger
    pub fn suppresses_empty_word(self) -> bool {
        matches!(self, TriggerKind::Delete | TriggerKind::Plugin)
    }
}

/// Separator following `%plugin` in a plugin-variable token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarSeparator {
    /// `%name=value`: value position
    #[serde(rename = "=")]
    Value,
    /// `%name.key`: key position
    #[serde(rename = ".")]
    Key,
}

impl VarSeparator {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '=' => Some(VarSeparator::Value),
            '.' => Some(VarSeparator::Key),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VarSeparator::Value => "=",
            VarSeparator::Key => ".",
        }
    }
}

impl fmt::Display for VarSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of the word under the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare word used as a filter over the protocol registry
    Protocol,
    /// `@keyword`, resolved by the host
    AtValue { keyword: String },
    /// `%plugin` with optional `=`/`.` separator and the text after it
    PluginVar {
        plugin: String,
        separator: Option<VarSeparator>,
        value: String,
    },
    /// `pipe:...` or `sniCallback:...`
    PluginSpec { spec: String, value: String },
    /// `name:`, `name://value` or `whistle.name://value` for a known plugin
    Plain {
        plugin: String,
        protocol: String,
        value: String,
    },
}

/// A classified span of the edited line
///
/// Offsets are char columns into the line; `end` is the cursor column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleToken {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl RuleToken {
    pub fn new(kind: TokenKind, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
            end,
        }
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self.kind, TokenKind::Protocol)
    }
}

/// Opaque key into the help-resolution map
///
/// URLs are resolved lazily from this key when help is requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HelpRef(pub String);

impl HelpRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A single completion suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub insert_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    pub help_ref: HelpRef,
}

impl Candidate {
    /// Candidate whose display text is its insert text and whose help key is the text itself
    pub fn new(insert_text: impl Into<String>) -> Self {
        let insert_text = insert_text.into();
        Self {
            help_ref: HelpRef::new(insert_text.clone()),
            insert_text,
            display_text: None,
        }
    }

    pub fn with_display(mut self, display_text: impl Into<String>) -> Self {
        let display_text = display_text.into();
        if display_text != self.insert_text {
            self.display_text = Some(display_text);
        }
        self
    }

    pub fn with_help_ref(mut self, help_ref: HelpRef) -> Self {
        self.help_ref = help_ref;
        self
    }

    /// Text shown in the popup
    pub fn display(&self) -> &str {
        self.display_text.as_deref().unwrap_or(&self.insert_text)
    }
}

/// Where an accepted plugin hint is inserted relative to the matched word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    /// Replace from word start (default)
    #[default]
    Word,
    /// Insert at the live cursor
    Cursor,
    /// Insert at the end of the matched word
    Tail,
}

/// Which kind of list a popup shows, used to rebuild help names from entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopupMode {
    #[default]
    Protocol,
    AtValue,
    PluginVar,
    PluginSpec,
    PluginHint,
}

/// Payload for the host's completion popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionPopup {
    pub candidates: Vec<Candidate>,
    pub replace_from: usize,
    pub replace_to: usize,
    pub mode: PopupMode,
}

/// Payload for the host's hover tooltip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverTooltip {
    pub content_markup: String,
    pub replace_from: usize,
    pub replace_to: usize,
}
