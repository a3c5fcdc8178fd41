//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use rulepad_assist::*;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Host that records everything the engine hands it
#[derive(Default)]
pub struct RecordingHost {
    pub registrations: Vec<LanguageRegistration>,
    pub popups: Vec<CompletionPopup>,
    pub tooltips: Vec<HoverTooltip>,
}

impl HostEditor for RecordingHost {
    fn register_language(&mut self, registration: &LanguageRegistration) {
        self.registrations.push(registration.clone());
    }

    fn show_completions(&mut self, popup: CompletionPopup) {
        self.popups.push(popup);
    }

    fn show_tooltip(&mut self, tooltip: HoverTooltip) {
        self.tooltips.push(tooltip);
    }
}

impl RecordingHost {
    pub fn last_texts(&self) -> Vec<String> {
        self.popups
            .last()
            .map(|popup| popup.candidates.iter().map(|c| c.insert_text.clone()).collect())
            .unwrap_or_default()
    }
}

/// How a [`CountingTransport`] answers
pub enum Reply {
    /// `["<value>-1", "<value>-2"]`
    Echo,
    Fixed(Value),
    Fail,
}

/// Transport that counts calls and remembers requests
pub struct CountingTransport {
    calls: AtomicUsize,
    requests: Mutex<Vec<HintRequest>>,
    reply: Reply,
}

impl CountingTransport {
    pub fn new(reply: Reply) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            reply,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HintRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HintTransport for CountingTransport {
    async fn fetch_hints(&self, request: &HintRequest) -> AssistResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Echo => Ok(json!([
                format!("{}-1", request.value),
                format!("{}-2", request.value)
            ])),
            Reply::Fixed(value) => Ok(value.clone()),
            Reply::Fail => Err(AssistError::Transport("connection refused".to_string())),
        }
    }
}

/// Plugins used across tests
///
/// - `inspect`: remote hints, homepage
/// - `mock`: static hint list, plugin vars with remote hints
/// - `quiet`: no hints at all
pub fn plugins() -> PluginDirectory {
    PluginDirectory::from_json(
        r#"[
            {"moduleName": "whistle.inspect", "homepage": "https://inspect.test", "hintUrl": "cgi-bin/hints"},
            {"moduleName": "whistle.mock", "hintList": ["alpha", "beta", {"text": "gamma", "displayText": "Gamma", "help": "https://mock.test/gamma"}],
             "pluginVars": {"keys": ["port", "host"], "hintUrl": "cgi-bin/var-hints"}},
            {"moduleName": "whistle.quiet"}
        ]"#,
    )
    .unwrap()
}
