//! Candidate list construction
//!
//! Builds ranked, capped candidate lists for each completion mode from the
//! protocol registry, the plugin directory and the host's `@` provider.
//! Everything here is synchronous and deterministic.

use crate::config::HintLimits;
use crate::docs::normalize_rule_name;
use crate::host::AtValueProvider;
use crate::plugins::{HintItem, PluginDirectory, PluginMeta};
use crate::registry::ProtocolRegistry;
use crate::types::*;
use serde_json::Value;
use std::collections::HashMap;

/// Fixed shorthand table: keyword → extra suggestions
///
/// Checked in order; the first matching row wins. `exact` rows need the
/// keyword to equal the key, the others accept any keyword contained in it.
const SYNONYMS: &[(&str, bool, &[&str])] = &[
    ("csp", true, &["disable://csp"]),
    ("upstream", false, &["proxy://", "xproxy://"]),
    ("xupstream", false, &["xproxy://"]),
    ("extend", false, &["reqMerge://", "resMerge://"]),
];

fn synonyms_for(keyword: &str) -> &'static [&'static str] {
    SYNONYMS
        .iter()
        .find(|(key, exact, _)| {
            if *exact {
                *key == keyword
            } else {
                key.contains(keyword)
            }
        })
        .map(|(_, _, extra)| *extra)
        .unwrap_or(&[])
}

/// Render a plugin hint as `proto://text`, `%name=text` or `%name.text`
pub fn render_hint_text(protocol: &str, text: &str, for_vars: bool, is_key: bool) -> String {
    if !for_vars {
        return format!("{}://{}", protocol, text);
    }
    let separator = if is_key { '.' } else { '=' };
    format!("{}{}{}", protocol, separator, text)
}

/// Rendered plugin hints plus their help URLs, keyed by display text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintSet {
    pub candidates: Vec<Candidate>,
    pub help_map: HashMap<String, String>,
    pub position: InsertPosition,
    pub offset: usize,
}

impl HintSet {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Accumulates plugin hints with length limits, the list cap and
/// first-wins de-duplication by display key
pub struct PluginHintRenderer<'a> {
    plugin: &'a PluginMeta,
    protocol: &'a str,
    for_vars: bool,
    limits: HintLimits,
    plugins_index: &'a str,
    set: HintSet,
}

impl<'a> PluginHintRenderer<'a> {
    pub fn new(
        plugin: &'a PluginMeta,
        protocol: &'a str,
        for_vars: bool,
        limits: HintLimits,
        plugins_index: &'a str,
    ) -> Self {
        Self {
            plugin,
            protocol,
            for_vars,
            limits,
            plugins_index,
            set: HintSet::default(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.set.candidates.len() >= self.limits.max_candidates
    }

    /// Add one hint; returns false when it was filtered out
    pub fn push(&mut self, text: &str, label: Option<&str>, is_key: bool, help: Option<&str>) -> bool {
        if self.is_full() {
            return false;
        }
        let max_len = if self.for_vars {
            self.limits.max_var_len
        } else {
            self.limits.max_hint_len
        };
        let insert_text = render_hint_text(self.protocol, text.trim(), self.for_vars, is_key);
        if insert_text.chars().count() >= max_len {
            return false;
        }
        let label = label.map(str::trim).filter(|l| !l.is_empty());
        let key = label.unwrap_or(&insert_text).to_string();
        if self.set.help_map.contains_key(&key) {
            return false;
        }

        let help_url = self.plugin.rule_help(help, self.plugins_index);
        let mut candidate = Candidate::new(insert_text).with_help_ref(HelpRef::new(key.clone()));
        if let Some(label) = label {
            candidate = candidate.with_display(label);
        }
        self.set.help_map.insert(key, help_url);
        self.set.candidates.push(candidate);
        true
    }

    pub fn push_item(&mut self, item: &HintItem) -> bool {
        self.push(item.text(), item.display_text(), item.is_key(), item.help())
    }

    pub fn finish(self) -> HintSet {
        self.set
    }

    pub fn finish_with(mut self, position: InsertPosition, offset: usize) -> HintSet {
        self.set.position = position;
        self.set.offset = offset;
        self.set
    }
}

/// Builds candidate lists for classified tokens
pub struct CandidateBuilder<'a> {
    registry: &'a ProtocolRegistry,
    plugins: &'a PluginDirectory,
    at_values: Option<&'a dyn AtValueProvider>,
    limits: HintLimits,
    protocols_enabled: bool,
}

impl<'a> CandidateBuilder<'a> {
    pub fn new(
        registry: &'a ProtocolRegistry,
        plugins: &'a PluginDirectory,
        limits: HintLimits,
    ) -> Self {
        Self {
            registry,
            plugins,
            at_values: None,
            limits,
            protocols_enabled: true,
        }
    }

    pub fn with_at_values(mut self, provider: Option<&'a dyn AtValueProvider>) -> Self {
        self.at_values = provider;
        self
    }

    pub fn with_protocols_enabled(mut self, enabled: bool) -> Self {
        self.protocols_enabled = enabled;
        self
    }

    /// Candidates available without a remote round-trip
    ///
    /// Plugin value positions (`Plain`, `%name=`) come from static hint lists
    /// via [`CandidateBuilder::plugin_hints`]; they yield nothing here.
    pub fn build(&self, token: &RuleToken) -> Vec<Candidate> {
        match &token.kind {
            TokenKind::Protocol => self.protocol_candidates(&token.text),
            TokenKind::AtValue { keyword } => self.at_value_candidates(keyword),
            TokenKind::PluginVar {
                separator: None,
                value,
                ..
            } => self.plugin_var_candidates(value),
            TokenKind::PluginSpec { spec, value } => self.plugin_spec_candidates(spec, value),
            TokenKind::PluginVar { .. } | TokenKind::Plain { .. } => Vec::new(),
        }
    }

    /// Substring filter over the registry, earliest match first, then synonyms
    pub fn protocol_candidates(&self, keyword: &str) -> Vec<Candidate> {
        if !self.protocols_enabled {
            return Vec::new();
        }
        let cap = self.limits.max_candidates;
        let protocol_candidate = |name: &str| {
            Candidate::new(name).with_help_ref(HelpRef::new(normalize_rule_name(name)))
        };

        if keyword.is_empty() {
            return self
                .registry
                .list_protocols()
                .iter()
                .take(cap)
                .map(|name| protocol_candidate(name))
                .collect();
        }

        let keyword = keyword.to_lowercase();
        let proxy_alias = "proxy".contains(keyword.as_str());
        let mut matched: Vec<(usize, &String)> = self
            .registry
            .list_protocols()
            .iter()
            .filter_map(|name| match name.to_lowercase().find(&keyword) {
                Some(index) => Some((index, name)),
                None if proxy_alias && name == "socks://" => Some((usize::MAX, name)),
                None => None,
            })
            .collect();
        matched.sort_by_key(|(index, _)| *index);

        let extra: Vec<&str> = synonyms_for(&keyword)
            .iter()
            .copied()
            .filter(|alias| !matched.iter().any(|(_, name)| name.as_str() == *alias))
            .collect();
        matched.truncate(cap.saturating_sub(extra.len()));

        matched
            .into_iter()
            .map(|(_, name)| protocol_candidate(name))
            .chain(extra.into_iter().map(protocol_candidate))
            .take(cap)
            .collect()
    }

    /// Host-provided `@` values; non-string values are dropped
    pub fn at_value_candidates(&self, keyword: &str) -> Vec<Candidate> {
        let Some(provider) = self.at_values else {
            return Vec::new();
        };
        let Some(items) = provider.at_values(keyword) else {
            return Vec::new();
        };

        items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) if !text.is_empty() => Some(Candidate::new(text.clone())),
                Value::Object(map) => {
                    let value = map.get("value").and_then(Value::as_str).filter(|v| !v.is_empty())?;
                    let candidate = Candidate::new(value);
                    match map.get("label").and_then(Value::as_str).filter(|l| !l.is_empty()) {
                        Some(label) => Some(candidate.with_display(label)),
                        None => Some(candidate),
                    }
                }
                _ => None,
            })
            .take(self.limits.max_candidates)
            .map(|candidate| {
                let help = format!("@{}", candidate.insert_text);
                candidate.with_help_ref(HelpRef::new(help))
            })
            .collect()
    }

    /// `%name=` / `%name.key` entries, displayed without the `%`
    pub fn plugin_var_candidates(&self, value: &str) -> Vec<Candidate> {
        let needle = value.to_lowercase();
        self.plugins
            .list_plugin_vars()
            .into_iter()
            .filter(|name| needle.is_empty() || name[1..].to_lowercase().contains(&needle))
            .take(self.limits.max_candidates)
            .map(|name| {
                let display = name[1..].to_string();
                Candidate::new(name).with_display(display)
            })
            .collect()
    }

    /// `spec://<plugin>` for every plugin name
    pub fn plugin_spec_candidates(&self, spec: &str, value: &str) -> Vec<Candidate> {
        let needle = format!("{}://{}", spec, value.to_lowercase());
        self.plugins
            .plugin_names()
            .map(|name| format!("{}://{}", spec, name))
            .filter(|entry| value.is_empty() || entry.contains(&needle))
            .take(self.limits.max_candidates)
            .map(|entry| Candidate::new(entry).with_help_ref(HelpRef::new(spec)))
            .collect()
    }

    /// Filter a plugin's static hint list for the given value
    ///
    /// Returns `None` when the plugin has no static list for this position.
    pub fn plugin_hints(
        &self,
        plugin: &PluginMeta,
        protocol: &str,
        value: &str,
        for_vars: bool,
        plugins_index: &str,
    ) -> Option<HintSet> {
        let (list, _) = plugin.hint_sources(for_vars);
        let list = list?;
        let needle = value.to_lowercase();
        let mut renderer = PluginHintRenderer::new(plugin, protocol, for_vars, self.limits, plugins_index);
        for item in list.iter().filter(|item| needle.is_empty() || item.matches(&needle)) {
            if renderer.is_full() {
                break;
            }
            renderer.push_item(item);
        }
        Some(renderer.finish())
    }
}

fn find_seq(chars: &[char], from: usize, pattern: &str) -> Option<usize> {
    let pattern: Vec<char> = pattern.chars().collect();
    if from > chars.len() {
        return None;
    }
    chars[from..]
        .windows(pattern.len())
        .position(|window| window == pattern.as_slice())
        .map(|index| index + from)
}

/// Replace range for a protocol popup
///
/// Extends over an existing `://` after the word (so accepting `proxy://`
/// over `prox://` does not duplicate it), except for `redirect`-style words
/// directly followed by an `http(s)://` target. Without `://`, extends over
/// `name:` and up to two slashes when `name://` is a listed candidate.
pub fn protocol_replace_range(line: &str, token: &RuleToken, candidates: &[Candidate]) -> (usize, usize) {
    let chars: Vec<char> = line.chars().collect();
    let start = token.start;
    let mut end = token.end;

    if let Some(index) = find_seq(&chars, start, "://") {
        let index = index + 3;
        let protocol: String = chars[start..index].iter().collect();
        let redirect_target = token.text.starts_with("red")
            && (protocol == format!("{}http://", token.text)
                || protocol == format!("{}https://", token.text));
        if !protocol.chars().any(char::is_whitespace) && !redirect_target {
            end = index;
        }
    } else if let Some(index) = find_seq(&chars, start, ":") {
        let index = index + 1;
        let protocol = format!("{}//", chars[start..index].iter().collect::<String>());
        if candidates.iter().any(|c| c.insert_text == protocol) {
            end = index;
            for _ in 0..2 {
                if chars.get(end) == Some(&'/') {
                    end += 1;
                } else {
                    break;
                }
            }
        }
    }

    (start, end.max(token.end))
}
