//! Static documentation corpus
//!
//! Maps a normalized rule name to its help page URL and markdown body.
//! Loaded once at startup; entries never change afterwards.

use crate::registry::ProtocolRegistry;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Rule protocols documented under the `rule/` section
const RULE_SECTION: &[&str] = &[
    "file", "xfile", "tpl", "xtpl", "rawfile", "xrawfile", "redirect", "custom",
];

/// Help page and body for one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocEntry {
    pub url: String,
    pub body: String,
}

/// Normalize a protocol-ish token to its rule name
///
/// `proxy://x` → `proxy`, `whistle.inspect:` → `inspect`, `host` → `host`.
pub fn normalize_rule_name(name: &str) -> &str {
    let name = name.trim();
    let name = name.strip_prefix("whistle.").unwrap_or(name);
    match name.find(':') {
        Some(index) => &name[..index],
        None => name,
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocCorpus {
    entries: HashMap<String, DocEntry>,
    /// Lowercased name → canonical name
    folded: HashMap<String, String>,
}

impl DocCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL-only entries for every registered protocol
    pub fn from_registry(registry: &ProtocolRegistry, base_url: &str) -> Self {
        let mut corpus = Self::new();
        for name in registry.keywords() {
            let section = if RULE_SECTION.contains(&name.as_str()) {
                "rule/"
            } else {
                ""
            };
            let url = format!("{}{}{}.html", base_url, section, name);
            corpus.insert(
                name,
                DocEntry {
                    url,
                    body: String::new(),
                },
            );
        }
        corpus
    }

    /// Load `*.md` files below `dir`; `rule/redirect.md` becomes `redirect`
    /// with URL `<base_url>rule/redirect.html`
    ///
    /// Top-level pages win over `rule/` pages of the same name.
    pub fn load_from_dir(dir: &Path, base_url: &str) -> AssistResult<Self> {
        let mut corpus = Self::new();
        corpus.merge_dir(dir, base_url)?;
        Ok(corpus)
    }

    /// Fill bodies (and add entries) from a markdown tree
    pub fn merge_dir(&mut self, dir: &Path, base_url: &str) -> AssistResult<()> {
        if !dir.is_dir() {
            return Err(AssistError::ConfigError(format!(
                "Documentation directory not found: {}",
                dir.display()
            )));
        }

        let mut nested = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| AssistError::Io(e.into()))?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("md")
            {
                continue;
            }
            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if name == "README" {
                continue;
            }
            let page = relative
                .with_extension("html")
                .to_string_lossy()
                .replace('\\', "/");
            let doc = DocEntry {
                url: format!("{}{}", base_url, page),
                body: std::fs::read_to_string(path)?,
            };
            if relative.components().count() > 1 {
                nested.push((name.to_string(), doc));
            } else {
                self.insert(name.to_string(), doc);
            }
        }

        for (name, doc) in nested {
            match self.entries.get(&name) {
                Some(existing) if !existing.body.is_empty() => {}
                _ => self.insert(name, doc),
            }
        }

        debug!("Documentation corpus holds {} entries", self.entries.len());
        Ok(())
    }

    pub fn insert(&mut self, name: String, entry: DocEntry) {
        self.folded.insert(name.to_lowercase(), name.clone());
        self.entries.insert(name, entry);
    }

    /// Exact lookup, then case-insensitive
    pub fn lookup(&self, name: &str) -> Option<&DocEntry> {
        let name = normalize_rule_name(name);
        self.entries.get(name).or_else(|| {
            self.folded
                .get(&name.to_lowercase())
                .and_then(|canonical| self.entries.get(canonical))
        })
    }

    /// Body for a help URL, if the URL belongs to this corpus
    pub fn body_for_url(&self, url: &str) -> Option<&str> {
        self.entries
            .values()
            .find(|entry| entry.url == url && !entry.body.is_empty())
            .map(|entry| entry.body.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
