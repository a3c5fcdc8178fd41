//! Plugin directory
//!
//! Read-only metadata about installed plugins: module name, homepage,
//! static hint lists, remote hint endpoints and plugin variables. The host
//! supplies it once (usually as JSON) and the engine never mutates it.

use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const MODULE_PREFIX: &str = "whistle.";

/// One entry of a plugin-supplied static hint list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HintItem {
    Text(String),
    #[serde(rename_all = "camelCase")]
    Entry {
        text: String,
        #[serde(default)]
        display_text: Option<String>,
        #[serde(default)]
        is_key: bool,
        #[serde(default)]
        help: Option<String>,
    },
}

impl HintItem {
    pub fn text(&self) -> &str {
        match self {
            HintItem::Text(text) => text,
            HintItem::Entry { text, .. } => text,
        }
    }

    pub fn display_text(&self) -> Option<&str> {
        match self {
            HintItem::Text(_) => None,
            HintItem::Entry { display_text, .. } => display_text.as_deref(),
        }
    }

    pub fn is_key(&self) -> bool {
        matches!(self, HintItem::Entry { is_key: true, .. })
    }

    pub fn help(&self) -> Option<&str> {
        match self {
            HintItem::Text(_) => None,
            HintItem::Entry { help, .. } => help.as_deref(),
        }
    }

    /// Case-insensitive substring match on text or display text
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.text().to_lowercase().contains(needle_lower)
            || self
                .display_text()
                .is_some_and(|d| d.to_lowercase().contains(needle_lower))
    }
}

/// Hint sources for `%plugin=value` / `%plugin.key` positions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginVars {
    /// Declared variable keys
    pub keys: Vec<String>,
    pub hint_url: Option<String>,
    pub hint_list: Option<Vec<HintItem>>,
}

impl PluginVars {
    pub fn has_hints(&self) -> bool {
        self.hint_url.is_some() || self.hint_list.is_some()
    }
}

/// Metadata for one plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginMeta {
    /// Full module name, e.g. `whistle.inspect`
    pub module_name: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub hint_url: Option<String>,
    #[serde(default)]
    pub hint_list: Option<Vec<HintItem>>,
    #[serde(default)]
    pub plugin_vars: Option<PluginVars>,
}

impl PluginMeta {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            homepage: None,
            hint_url: None,
            hint_list: None,
            plugin_vars: None,
        }
    }

    pub fn with_homepage(mut self, homepage: impl Into<String>) -> Self {
        self.homepage = Some(homepage.into());
        self
    }

    pub fn with_hint_url(mut self, hint_url: impl Into<String>) -> Self {
        self.hint_url = Some(hint_url.into());
        self
    }

    pub fn with_hint_list(mut self, hint_list: Vec<HintItem>) -> Self {
        self.hint_list = Some(hint_list);
        self
    }

    pub fn with_plugin_vars(mut self, plugin_vars: PluginVars) -> Self {
        self.plugin_vars = Some(plugin_vars);
        self
    }

    /// Name without the `whistle.` module prefix
    pub fn short_name(&self) -> &str {
        self.module_name
            .strip_prefix(MODULE_PREFIX)
            .unwrap_or(&self.module_name)
    }

    pub fn has_hints(&self) -> bool {
        self.hint_url.is_some() || self.hint_list.is_some()
    }

    /// Static list and remote URL for the requested position
    pub fn hint_sources(&self, for_vars: bool) -> (Option<&[HintItem]>, Option<&str>) {
        if for_vars {
            match &self.plugin_vars {
                Some(vars) => (vars.hint_list.as_deref(), vars.hint_url.as_deref()),
                None => (None, None),
            }
        } else {
            (self.hint_list.as_deref(), self.hint_url.as_deref())
        }
    }

    /// Hint endpoint path, prefixed with `plugin.<name>/` unless already scoped
    pub fn hint_endpoint(&self, for_vars: bool) -> Option<String> {
        let (_, url) = self.hint_sources(for_vars);
        let url = url?;
        let scope = format!("plugin.{}", self.short_name());
        if url.starts_with(&self.module_name) || url.starts_with(&scope) {
            Some(url.to_string())
        } else {
            Some(format!("{}/{}", scope, url))
        }
    }

    /// Item help, else homepage, else the plugins index
    pub fn rule_help(&self, item_help: Option<&str>, plugins_index: &str) -> String {
        item_help
            .filter(|h| !h.is_empty())
            .or(self.homepage.as_deref())
            .unwrap_or(plugins_index)
            .to_string()
    }
}

/// Lookup of plugins by short name
#[derive(Debug, Clone, Default)]
pub struct PluginDirectory {
    plugins: BTreeMap<String, PluginMeta>,
}

impl PluginDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_plugins(plugins: impl IntoIterator<Item = PluginMeta>) -> Self {
        let mut directory = Self::new();
        for plugin in plugins {
            directory.register(plugin);
        }
        directory
    }

    /// Parse a JSON array of plugin metadata
    pub fn from_json(content: &str) -> AssistResult<Self> {
        let plugins: Vec<PluginMeta> = serde_json::from_str(content)?;
        Ok(Self::from_plugins(plugins))
    }

    pub fn from_yaml(content: &str) -> AssistResult<Self> {
        let plugins: Vec<PluginMeta> = serde_yaml::from_str(content)?;
        Ok(Self::from_plugins(plugins))
    }

    pub fn load(path: &Path) -> AssistResult<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }

    pub fn register(&mut self, plugin: PluginMeta) {
        self.plugins
            .insert(plugin.short_name().to_string(), plugin);
    }

    /// Accepts `name`, `name:` or `whistle.name`
    pub fn get_plugin(&self, id: &str) -> Option<&PluginMeta> {
        self.plugins.get(normalize_plugin_id(id))
    }

    /// Short names in sorted order
    pub fn plugin_names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    /// `%name=` for every plugin with plugin vars, then `%name.key` per declared key
    pub fn list_plugin_vars(&self) -> Vec<String> {
        let mut list = Vec::new();
        for (name, plugin) in &self.plugins {
            if let Some(vars) = &plugin.plugin_vars {
                list.push(format!("%{}=", name));
                list.extend(vars.keys.iter().map(|key| format!("%{}.{}", name, key)));
            }
        }
        list
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

fn normalize_plugin_id(id: &str) -> &str {
    let id = id.strip_suffix(':').unwrap_or(id);
    id.strip_prefix(MODULE_PREFIX).unwrap_or(id)
}
