/// Completion-mode classification for the word before the cursor
use super::utils::{comment_start, slice, word_start};
use crate::config::HintLimits;
use crate::plugins::PluginDirectory;
use crate::types::*;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

fn plugin_spec_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^(pipe|sniCallback):").expect("Invalid regex"))
}

fn plugin_var_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^%([a-z\d_-]+)([=.])").expect("Invalid regex"))
}

fn plugin_name_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        // $1: protocol (`name` or `whistle.name`), $2: short name, $3: "", "/" or "//"
        Regex::new(r"^((?:whistle\.)?([a-z\d_\-]+)):(/?$|//)").expect("Invalid regex")
    })
}

fn exact_spec_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^(?:pipe|sniCallback)://$").expect("Invalid regex"))
}

/// Classifies the word before the cursor into a [`RuleToken`]
///
/// Classification only reads its inputs and the plugin directory, so the
/// same line, cursor and trigger always produce the same token.
pub struct ContextClassifier<'a> {
    plugins: &'a PluginDirectory,
    limits: HintLimits,
}

impl<'a> ContextClassifier<'a> {
    pub fn new(plugins: &'a PluginDirectory, limits: HintLimits) -> Self {
        Self { plugins, limits }
    }

    /// Classify the word ending at `cursor` (a char column)
    ///
    /// Returns `None` when no hint should be offered: inside a comment, for
    /// oversized words, after a delete on an empty word, or for words that are
    /// already past their protocol (`name://...` with no hint source).
    pub fn classify(&self, line: &str, cursor: usize, trigger: TriggerKind) -> Option<RuleToken> {
        let chars: Vec<char> = line.chars().collect();
        let cursor = cursor.min(chars.len());

        if comment_start(&chars).is_some_and(|index| index < cursor) {
            return None;
        }

        let start = word_start(&chars, cursor);
        if start == cursor {
            if trigger.suppresses_empty_word() {
                return None;
            }
            return Some(RuleToken::new(TokenKind::Protocol, "", start, cursor));
        }

        let word = slice(&chars, start, cursor);
        if cursor - start > self.limits.max_hint_len {
            debug!("Word of {} chars exceeds hint limit", cursor - start);
            return None;
        }

        let kind = self.classify_word(&word, trigger)?;
        Some(RuleToken::new(kind, word, start, cursor))
    }

    fn classify_word(&self, word: &str, trigger: TriggerKind) -> Option<TokenKind> {
        let by_enter = trigger == TriggerKind::Enter;

        if let Some(keyword) = word.strip_prefix('@') {
            if by_enter {
                return None;
            }
            return Some(TokenKind::AtValue {
                keyword: keyword.to_string(),
            });
        }

        if let Some(caps) = plugin_spec_regex().captures(word) {
            if by_enter && !exact_spec_regex().is_match(word) {
                return None;
            }
            let spec = caps[1].to_string();
            let value = word.get(spec.len() + 3..).unwrap_or_default().to_string();
            return Some(TokenKind::PluginSpec { spec, value });
        }

        if let Some(rest) = word.strip_prefix('%') {
            return self.classify_plugin_var(word, rest, by_enter);
        }

        if let Some(caps) = plugin_name_regex().captures(word) {
            let name = &caps[2];
            if let Some(plugin) = self.plugins.get_plugin(name).filter(|p| p.has_hints()) {
                let value = if &caps[3] == "//" {
                    word.find("//")
                        .map(|index| word[index + 2..].to_string())
                        .unwrap_or_default()
                } else {
                    String::new()
                };
                if !value.is_empty()
                    && (value.chars().count() > self.limits.max_hint_len || by_enter)
                {
                    return None;
                }
                return Some(TokenKind::Plain {
                    plugin: plugin.short_name().to_string(),
                    protocol: caps[1].to_string(),
                    value,
                });
            }
        }

        // Past the protocol already, or nothing but `:`/`/` typed
        if word.contains("//") || word.chars().all(|ch| ch == ':' || ch == '/') {
            return None;
        }

        Some(TokenKind::Protocol)
    }

    fn classify_plugin_var(&self, word: &str, rest: &str, by_enter: bool) -> Option<TokenKind> {
        let Some(caps) = plugin_var_regex().captures(word) else {
            if by_enter {
                return None;
            }
            return Some(TokenKind::PluginVar {
                plugin: String::new(),
                separator: None,
                value: rest.to_string(),
            });
        };

        let name = &caps[1];
        let separator = caps[2].chars().next().and_then(VarSeparator::from_char);
        self.plugins.get_plugin(name)?.plugin_vars.as_ref()?;

        let value = word[name.len() + 2..].to_string();
        if !value.is_empty() && (by_enter || value.chars().count() > self.limits.max_var_len) {
            debug!("Plugin var value rejected for %{}", name);
            return None;
        }

        Some(TokenKind::PluginVar {
            plugin: name.to_string(),
            separator,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{PluginMeta, PluginVars};

    fn plugins() -> PluginDirectory {
        PluginDirectory::from_plugins([
            PluginMeta::new("whistle.inspect").with_hint_url("hints"),
            PluginMeta::new("whistle.myplugin").with_plugin_vars(PluginVars::default()),
            PluginMeta::new("whistle.quiet"),
        ])
    }

    fn classify(line: &str, cursor: usize) -> Option<RuleToken> {
        let plugins = plugins();
        ContextClassifier::new(&plugins, HintLimits::default()).classify(
            line,
            cursor,
            TriggerKind::Character,
        )
    }

    #[test]
    fn test_protocol_word() {
        let token = classify("host example.com proxy://", 23).unwrap();
        assert_eq!(token.kind, TokenKind::Protocol);
        assert_eq!(token.text, "proxy:");
        assert_eq!((token.start, token.end), (17, 23));
    }

    #[test]
    fn test_empty_word_lists_everything_unless_deleting() {
        let token = classify("host ", 5).unwrap();
        assert_eq!(token.kind, TokenKind::Protocol);
        assert!(token.text.is_empty());

        let plugins = plugins();
        let classifier = ContextClassifier::new(&plugins, HintLimits::default());
        assert!(classifier.classify("host ", 5, TriggerKind::Delete).is_none());
    }

    #[test]
    fn test_comment_blocks_classification() {
        assert!(classify("# proxy", 7).is_none());
        assert!(classify("a proxy #x", 7).is_some());
    }

    #[test]
    fn test_at_value() {
        let token = classify("a @env", 6).unwrap();
        assert_eq!(
            token.kind,
            TokenKind::AtValue {
                keyword: "env".to_string()
            }
        );
    }

    #[test]
    fn test_plugin_var_with_separator() {
        let token = classify("%myplugin=abc", 13).unwrap();
        assert_eq!(
            token.kind,
            TokenKind::PluginVar {
                plugin: "myplugin".to_string(),
                separator: Some(VarSeparator::Value),
                value: "abc".to_string(),
            }
        );
    }

    #[test]
    fn test_plugin_var_unknown_plugin_is_silent() {
        assert!(classify("%nope=abc", 9).is_none());
    }

    #[test]
    fn test_plugin_var_listing() {
        let token = classify("%my", 3).unwrap();
        assert!(matches!(
            token.kind,
            TokenKind::PluginVar { separator: None, ref value, .. } if value == "my"
        ));
    }

    #[test]
    fn test_plugin_spec() {
        let token = classify("pipe://ins", 10).unwrap();
        assert_eq!(
            token.kind,
            TokenKind::PluginSpec {
                spec: "pipe".to_string(),
                value: "ins".to_string()
            }
        );
        let token = classify("sniCallback:", 12).unwrap();
        assert!(matches!(token.kind, TokenKind::PluginSpec { ref value, .. } if value.is_empty()));
    }

    #[test]
    fn test_plain_plugin_value() {
        let token = classify("x whistle.inspect://abc", 23).unwrap();
        assert_eq!(
            token.kind,
            TokenKind::Plain {
                plugin: "inspect".to_string(),
                protocol: "whistle.inspect".to_string(),
                value: "abc".to_string(),
            }
        );
        let token = classify("inspect:", 8).unwrap();
        assert!(matches!(token.kind, TokenKind::Plain { ref value, .. } if value.is_empty()));
    }

    #[test]
    fn test_past_protocol_without_hints_is_silent() {
        assert!(classify("proxy://", 8).is_none());
        assert!(classify("quiet://x", 9).is_none());
        assert!(classify("://", 3).is_none());
    }

    #[test]
    fn test_enter_suppresses_value_hints() {
        let plugins = plugins();
        let classifier = ContextClassifier::new(&plugins, HintLimits::default());
        assert!(classifier.classify("@a", 2, TriggerKind::Enter).is_none());
        assert!(classifier.classify("inspect://a", 11, TriggerKind::Enter).is_none());
        assert!(classifier.classify("pipe://", 7, TriggerKind::Enter).is_some());
        assert!(classifier.classify("pipe://a", 8, TriggerKind::Enter).is_none());
    }

    #[test]
    fn test_oversized_words_are_rejected() {
        let long = "a".repeat(513);
        assert!(classify(&long, 513).is_none());

        let value = format!("%myplugin={}", "v".repeat(101));
        let len = value.chars().count();
        assert!(classify(&value, len).is_none());
    }

    #[test]
    fn test_classification_is_repeatable() {
        let first = classify("host a.com pac", 14);
        let second = classify("host a.com pac", 14);
        assert_eq!(first, second);
    }
}
