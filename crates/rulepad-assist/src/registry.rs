/// Static registry of rule protocol names
use crate::config::AssistConfig;

/// Built-in protocols in declaration order
const BUILTIN_PROTOCOLS: &[&str] = &[
    "host://",
    "xhost://",
    "proxy://",
    "xproxy://",
    "http-proxy://",
    "xhttp-proxy://",
    "https-proxy://",
    "xhttps-proxy://",
    "socks://",
    "xsocks://",
    "pac://",
    "weinre://",
    "log://",
    "filter://",
    "ignore://",
    "enable://",
    "disable://",
    "delete://",
    "plugin://",
    "pipe://",
    "sniCallback://",
    "rulesFile://",
    "resScript://",
    "reqScript://",
    "file://",
    "xfile://",
    "tpl://",
    "xtpl://",
    "rawfile://",
    "xrawfile://",
    "redirect://",
    "statusCode://",
    "replaceStatus://",
    "custom://",
    "dispatch://",
    "urlParams://",
    "params://",
    "pathReplace://",
    "method://",
    "auth://",
    "ua://",
    "referer://",
    "forwardedFor://",
    "responseFor://",
    "cache://",
    "attachment://",
    "location://",
    "etag://",
    "headerReplace://",
    "reqHeaders://",
    "resHeaders://",
    "trailers://",
    "reqDelay://",
    "resDelay://",
    "reqSpeed://",
    "resSpeed://",
    "reqType://",
    "resType://",
    "reqCharset://",
    "resCharset://",
    "reqCookies://",
    "resCookies://",
    "reqCors://",
    "resCors://",
    "reqBody://",
    "resBody://",
    "reqPrepend://",
    "resPrepend://",
    "reqAppend://",
    "resAppend://",
    "reqReplace://",
    "resReplace://",
    "reqMerge://",
    "resMerge://",
    "reqWrite://",
    "resWrite://",
    "reqWriteRaw://",
    "resWriteRaw://",
    "htmlAppend://",
    "htmlPrepend://",
    "htmlBody://",
    "jsAppend://",
    "jsPrepend://",
    "jsBody://",
    "cssAppend://",
    "cssPrepend://",
    "cssBody://",
    "html://",
    "js://",
    "css://",
    "style://",
    "cipher://",
    "lineProps://",
];

/// Ordered, read-only list of protocol names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolRegistry {
    protocols: Vec<String>,
}

impl ProtocolRegistry {
    pub fn new(protocols: Vec<String>) -> Self {
        Self { protocols }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_PROTOCOLS.iter().map(|p| p.to_string()).collect())
    }

    /// Built-in list unless the config overrides it
    pub fn from_config(config: &AssistConfig) -> Self {
        match &config.protocols {
            Some(list) => Self::new(list.clone()),
            None => Self::builtin(),
        }
    }

    /// Append plugin protocols (`name://`) after the built-ins, skipping duplicates
    pub fn with_plugin_protocols<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let protocol = format!("{}://", name.as_ref());
            if !self.contains(&protocol) {
                self.protocols.push(protocol);
            }
        }
        self
    }

    pub fn list_protocols(&self) -> &[String] {
        &self.protocols
    }

    pub fn contains(&self, protocol: &str) -> bool {
        self.protocols.iter().any(|p| p == protocol)
    }

    /// Protocol names without the `://` suffix, for keyword highlighting
    pub fn keywords(&self) -> Vec<String> {
        self.protocols
            .iter()
            .map(|p| p.trim_end_matches("://").to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.protocols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
