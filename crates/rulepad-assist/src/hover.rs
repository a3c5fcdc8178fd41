//! Help URL and documentation lookup for rule names
//!
//! Resolution order for a name:
//! 1. `@name`: the host decides (URL, hidden, or the default `@` page)
//! 2. a popup entry of the plugin hint list on screen: the plugin-supplied URL
//! 3. `%plugin...`: plugin homepage, else the plugins index for that plugin
//! 4. anything else: corpus page, plugin homepage, then the plugins index

use crate::docs::{normalize_rule_name, DocCorpus};
use crate::host::{AtHelp, AtValueProvider};
use crate::plugins::PluginDirectory;
use crate::remote::HintSession;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

fn plugin_var_name_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^%([a-z\d_\-]+)").expect("Invalid regex"))
}

/// Where help for a name lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpUrl {
    Url(String),
    /// Explicitly suppressed by the host
    Hidden,
}

impl HelpUrl {
    pub fn as_url(&self) -> Option<&str> {
        match self {
            HelpUrl::Url(url) => Some(url),
            HelpUrl::Hidden => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpResolution {
    pub url: HelpUrl,
    /// Markdown body, when the URL is a corpus page with content
    pub doc: Option<String>,
}

impl HelpResolution {
    fn hidden() -> Self {
        Self {
            url: HelpUrl::Hidden,
            doc: None,
        }
    }
}

/// Tooltip body: title, link, then the doc
pub fn tooltip_markup(word: &str, url: &str, doc: &str) -> String {
    format!("# {} \n [{}]({})\n\n{}", word, url, url, doc)
}

pub struct HoverResolver<'a> {
    plugins: &'a PluginDirectory,
    docs: &'a DocCorpus,
    at_values: Option<&'a dyn AtValueProvider>,
    at_help_url: String,
    plugins_index: &'a str,
}

impl<'a> HoverResolver<'a> {
    pub fn new(
        plugins: &'a PluginDirectory,
        docs: &'a DocCorpus,
        at_help_url: String,
        plugins_index: &'a str,
    ) -> Self {
        Self {
            plugins,
            docs,
            at_values: None,
            at_help_url,
            plugins_index,
        }
    }

    pub fn with_at_values(mut self, provider: Option<&'a dyn AtValueProvider>) -> Self {
        self.at_values = provider;
        self
    }

    /// Resolve help for `name`
    ///
    /// For a highlighted popup entry, `name` is its help key and `session`
    /// supplies plugin-provided URLs for the hint list on screen.
    pub fn resolve_help(&self, name: &str, session: Option<&HintSession>) -> HelpResolution {
        if let Some(at_name) = name.strip_prefix('@') {
            let answer = self
                .at_values
                .map_or(AtHelp::Unknown, |provider| provider.at_help_url(at_name));
            match answer {
                AtHelp::Url(url) if !url.is_empty() => return self.with_doc(url),
                AtHelp::Hidden => {
                    debug!("Help hidden by host for @{}", at_name);
                    return HelpResolution::hidden();
                }
                _ => return self.with_doc(self.at_help_url.clone()),
            }
        }

        if let Some(url) = session.and_then(|session| session.help_for(name)) {
            return self.with_doc(url.to_string());
        }

        if let Some(caps) = plugin_var_name_regex().captures(name) {
            let plugin_name = &caps[1];
            let url = match self.plugins.get_plugin(plugin_name).and_then(|p| p.homepage.clone()) {
                Some(homepage) => homepage,
                None => format!("{}?plugin={}", self.plugins_index, plugin_name),
            };
            return self.with_doc(url);
        }

        let rule = normalize_rule_name(name);
        if let Some(entry) = self.docs.lookup(rule) {
            return self.with_doc(entry.url.clone());
        }
        let url = self
            .plugins
            .get_plugin(rule)
            .and_then(|plugin| plugin.homepage.clone())
            .unwrap_or_else(|| self.plugins_index.to_string());
        self.with_doc(url)
    }

    fn with_doc(&self, url: String) -> HelpResolution {
        let doc = self.docs.body_for_url(&url).map(str::to_string);
        HelpResolution {
            url: HelpUrl::Url(url),
            doc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::DocEntry;
    use crate::plugins::PluginMeta;

    const INDEX: &str = "https://docs.test/plugins.html";

    fn corpus() -> DocCorpus {
        let mut docs = DocCorpus::new();
        docs.insert(
            "proxy".to_string(),
            DocEntry {
                url: "https://docs.test/rules/proxy.html".to_string(),
                body: "Proxy requests upstream.".to_string(),
            },
        );
        docs
    }

    #[test]
    fn test_corpus_lookup_with_doc() {
        let plugins = PluginDirectory::new();
        let docs = corpus();
        let resolver = HoverResolver::new(&plugins, &docs, "at".into(), INDEX);
        let help = resolver.resolve_help("proxy", None);
        assert_eq!(help.url.as_url(), Some("https://docs.test/rules/proxy.html"));
        assert_eq!(help.doc.as_deref(), Some("Proxy requests upstream."));
    }

    #[test]
    fn test_unknown_name_falls_back_to_index() {
        let plugins = PluginDirectory::new();
        let docs = corpus();
        let resolver = HoverResolver::new(&plugins, &docs, "at".into(), INDEX);
        let help = resolver.resolve_help("foo123", None);
        assert_eq!(help.url, HelpUrl::Url(INDEX.to_string()));
        assert!(help.doc.is_none());
    }

    #[test]
    fn test_plugin_var_help() {
        let plugins = PluginDirectory::from_plugins([PluginMeta::new("whistle.mock").with_homepage("https://mock.test")]);
        let docs = corpus();
        let resolver = HoverResolver::new(&plugins, &docs, "at".into(), INDEX);
        assert_eq!(
            resolver.resolve_help("%mock.port", None).url.as_url(),
            Some("https://mock.test")
        );
        assert_eq!(
            resolver.resolve_help("%other=1", None).url.as_url(),
            Some("https://docs.test/plugins.html?plugin=other")
        );
    }

    #[test]
    fn test_at_without_provider_uses_default() {
        let plugins = PluginDirectory::new();
        let docs = corpus();
        let resolver = HoverResolver::new(&plugins, &docs, "https://docs.test/rules/@.html".into(), INDEX);
        let help = resolver.resolve_help("@env", None);
        assert_eq!(help.url.as_url(), Some("https://docs.test/rules/@.html"));
    }

    #[test]
    fn test_plugin_url_wins_for_list_on_screen() {
        use crate::candidates::HintSet;
        use crate::remote::HintKey;
        use std::collections::HashMap;

        let plugins = PluginDirectory::new();
        let docs = corpus();
        let resolver = HoverResolver::new(&plugins, &docs, "at".into(), INDEX);
        let mut session = HintSession::new();
        session.replace(
            HintKey::new("mock", ""),
            HintSet {
                help_map: HashMap::from([("proxy".to_string(), "https://mock.test/proxy".to_string())]),
                ..Default::default()
            },
        );
        assert_eq!(
            resolver.resolve_help("proxy", Some(&session)).url.as_url(),
            Some("https://docs.test/rules/proxy.html")
        );

        session.mark_served();
        assert_eq!(
            resolver.resolve_help("proxy", Some(&session)).url.as_url(),
            Some("https://mock.test/proxy")
        );
        assert_eq!(
            resolver.resolve_help("proxy", None).url.as_url(),
            Some("https://docs.test/rules/proxy.html")
        );
    }

    #[test]
    fn test_tooltip_markup() {
        assert_eq!(
            tooltip_markup("proxy", "u", "doc"),
            "# proxy \n [u](u)\n\ndoc"
        );
    }
}
