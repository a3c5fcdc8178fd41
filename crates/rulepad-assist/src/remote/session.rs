use crate::candidates::HintSet;
use crate::types::*;

/// Identity of a hint list: rendered protocol (`inspect`, `whistle.inspect`
/// or `%name`), the value typed after it and the plugin-var separator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HintKey {
    pub protocol: String,
    pub value: String,
    pub sep: Option<VarSeparator>,
}

impl HintKey {
    pub fn new(protocol: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            value: value.into(),
            sep: None,
        }
    }

    pub fn with_sep(mut self, sep: Option<VarSeparator>) -> Self {
        self.sep = sep;
        self
    }
}

/// Last plugin hint list and its help map
///
/// The list and the help map always belong to `key`; both are swapped in
/// one assignment and cleared together.
#[derive(Debug, Clone, Default)]
pub struct HintSession {
    key: Option<HintKey>,
    hints: HintSet,
    served: bool,
}

impl HintSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<&HintKey> {
        self.key.as_ref()
    }

    pub fn hints(&self) -> &HintSet {
        &self.hints
    }

    /// Cached hints for exactly this key
    pub fn cached(&self, key: &HintKey) -> Option<&HintSet> {
        match &self.key {
            Some(active) if active == key && !self.hints.is_empty() => Some(&self.hints),
            _ => None,
        }
    }

    pub fn replace(&mut self, key: HintKey, hints: HintSet) {
        *self = Self {
            key: Some(key),
            hints,
            served: false,
        };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Record that the current list is what the popup shows
    pub fn mark_served(&mut self) {
        self.served = self.key.is_some();
    }

    /// The popup on screen no longer shows this list
    pub fn clear_served(&mut self) {
        self.served = false;
    }

    pub fn is_served(&self) -> bool {
        self.served
    }

    /// Help URL for an entry of the list on screen, by its help key
    pub fn help_for(&self, help_key: &str) -> Option<&str> {
        if !self.served {
            return None;
        }
        self.hints.help_map.get(help_key).map(String::as_str)
    }
}
