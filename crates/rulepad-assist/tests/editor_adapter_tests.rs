mod common;

use common::{CountingTransport, RecordingHost, Reply};
use rulepad_assist::*;
use serde_json::{json, Value};
use std::sync::Arc;

struct Values;

impl AtValueProvider for Values {
    fn at_values(&self, keyword: &str) -> Option<Vec<Value>> {
        if keyword.is_empty() {
            return None;
        }
        Some(vec![
            json!("env"),
            json!({"value": "endpoint", "label": "Endpoint URL"}),
            json!(7),
        ])
    }

    fn at_help_url(&self, name: &str) -> AtHelp {
        match name {
            "endpoint" => AtHelp::Url("https://host.test/endpoint".to_string()),
            _ => AtHelp::Unknown,
        }
    }
}

fn assist() -> RulesAssist {
    RulesAssist::new(AssistConfig::default(), common::plugins()).with_at_values(Arc::new(Values))
}

#[test]
fn test_attach_registers_language_once() {
    let mut assist = assist();
    let mut host = RecordingHost::default();
    assist.attach(&mut host);
    assist.attach(&mut host);

    assert_eq!(host.registrations.len(), 1);
    let registration = &host.registrations[0];
    assert_eq!(registration.id, "rules");
    assert!(registration.keywords.contains(&"proxy".to_string()));
    assert!(registration.keywords.contains(&"inspect".to_string()));
}

#[test]
fn test_csp_shorthand_through_adapter() {
    let mut assist = assist();
    let mut host = RecordingHost::default();
    let outcome = assist.on_completion_request(&mut host, "a.com csp", 9, TriggerKind::Character);
    let popup = outcome.popup.unwrap();
    assert_eq!(popup.mode, PopupMode::Protocol);
    assert_eq!(popup.candidates.last().unwrap().insert_text, "disable://csp");
}

#[test]
fn test_empty_word_lists_registry() {
    let mut assist = assist();
    let mut host = RecordingHost::default();
    let popup = assist
        .on_completion_request(&mut host, "a.com ", 6, TriggerKind::Manual)
        .popup
        .unwrap();
    assert_eq!(popup.candidates.len(), 60);
    assert_eq!((popup.replace_from, popup.replace_to), (6, 6));

    assert!(assist
        .on_completion_request(&mut host, "a.com ", 6, TriggerKind::Delete)
        .popup
        .is_none());
}

#[test]
fn test_at_values_popup() {
    let mut assist = assist();
    let mut host = RecordingHost::default();
    let popup = assist
        .on_completion_request(&mut host, "a.com @en", 9, TriggerKind::Character)
        .popup
        .unwrap();
    assert_eq!(popup.mode, PopupMode::AtValue);
    assert_eq!(host.last_texts(), vec!["env", "endpoint"]);
    assert_eq!(popup.candidates[1].display(), "Endpoint URL");
    assert_eq!((popup.replace_from, popup.replace_to), (6, 9));

    // Help goes by the value, not the label shown for it
    let help = assist.help_url("a.com @en", 9, Some(&popup.candidates[1])).unwrap();
    assert_eq!(help.url.as_url(), Some("https://host.test/endpoint"));
    let help = assist.help_url("a.com @en", 9, Some(&popup.candidates[0])).unwrap();
    assert_eq!(
        help.url.as_url(),
        Some("https://avwo.github.io/whistle/rules/@.html")
    );

    assert!(assist
        .on_completion_request(&mut host, "a.com @", 7, TriggerKind::Character)
        .popup
        .is_none());
}

#[test]
fn test_plugin_var_listing_popup() {
    let mut assist = assist();
    let mut host = RecordingHost::default();
    let popup = assist
        .on_completion_request(&mut host, "a.com %mo", 9, TriggerKind::Character)
        .popup
        .unwrap();
    assert_eq!(popup.mode, PopupMode::PluginVar);
    assert_eq!(host.last_texts(), vec!["%mock=", "%mock.port", "%mock.host"]);
    assert_eq!(popup.candidates[0].display(), "mock=");

    let help = assist.help_url("a.com %mo", 9, Some(&popup.candidates[0])).unwrap();
    assert_eq!(
        help.url.as_url(),
        Some("https://avwo.github.io/whistle/plugins.html?plugin=mock")
    );
}

#[test]
fn test_plugin_spec_popup() {
    let mut assist = assist();
    let mut host = RecordingHost::default();
    let popup = assist
        .on_completion_request(&mut host, "a.com pipe://in", 15, TriggerKind::Character)
        .popup
        .unwrap();
    assert_eq!(popup.mode, PopupMode::PluginSpec);
    assert_eq!(host.last_texts(), vec!["pipe://inspect"]);

    assert!(assist
        .on_completion_request(&mut host, "a.com pipe://in", 15, TriggerKind::Enter)
        .popup
        .is_none());
    assert!(assist
        .on_completion_request(&mut host, "a.com pipe://", 13, TriggerKind::Enter)
        .popup
        .is_some());
}

#[test]
fn test_static_hint_list_with_display_text() {
    let mut assist = assist();
    let mut host = RecordingHost::default();
    let popup = assist
        .on_completion_request(&mut host, "a.com mock://gam", 16, TriggerKind::Character)
        .popup
        .unwrap();
    assert_eq!(popup.mode, PopupMode::PluginHint);
    assert_eq!(popup.candidates[0].insert_text, "mock://gamma");
    assert_eq!(popup.candidates[0].display(), "Gamma");

    let gamma = popup.candidates[0].clone();
    let help = assist.help_url("", 0, Some(&gamma)).unwrap();
    assert_eq!(help.url.as_url(), Some("https://mock.test/gamma"));

    assert!(assist
        .on_completion_request(&mut host, "a.com mock://zzz", 16, TriggerKind::Character)
        .popup
        .is_none());
}

#[test]
fn test_plugin_name_also_offers_protocols() {
    let mut assist = assist();
    let mut host = RecordingHost::default();
    let popup = assist
        .on_completion_request(&mut host, "a.com inspect:", 14, TriggerKind::Character)
        .popup
        .unwrap();
    assert_eq!(popup.mode, PopupMode::Protocol);
    assert_eq!(popup.candidates[0].insert_text, "inspect://");
    assert_eq!((popup.replace_from, popup.replace_to), (6, 14));
}

#[test]
fn test_disable_switch_only_affects_protocols() {
    let mut assist = assist();
    let mut host = RecordingHost::default();
    assist.set_enabled(false);
    assert!(!assist.is_enabled());
    assert!(assist
        .on_completion_request(&mut host, "a.com prox", 10, TriggerKind::Character)
        .popup
        .is_none());
    assert!(assist
        .on_completion_request(&mut host, "a.com @en", 9, TriggerKind::Character)
        .popup
        .is_some());

    assist.set_enabled(true);
    assert!(assist
        .on_completion_request(&mut host, "a.com prox", 10, TriggerKind::Character)
        .popup
        .is_some());
}

#[test]
fn test_redirect_keeps_target_scheme() {
    let mut assist = assist();
    let mut host = RecordingHost::default();
    let popup = assist
        .on_completion_request(&mut host, "a.com redhttps://b.com", 9, TriggerKind::Character)
        .popup
        .unwrap();
    assert_eq!(popup.candidates[0].insert_text, "redirect://");
    assert_eq!((popup.replace_from, popup.replace_to), (6, 9));
}

#[test]
fn test_keystroke_gating() {
    assert!(KeyStroke::Char('@').triggers_completion());
    assert!(KeyStroke::Enter.triggers_completion());
    assert!(!KeyStroke::Char('\t').triggers_completion());
}

#[test]
fn test_config_driven_engine() {
    let config = ConfigLoader::load_from_string(
        "protocols: ['host://', 'proxy://']\nmax_candidates: 1\n",
        ConfigFormat::Yaml,
    )
    .unwrap();
    let mut assist = RulesAssist::new(config, PluginDirectory::new());
    let mut host = RecordingHost::default();
    assert_eq!(assist.registry().len(), 2);
    let popup = assist
        .on_completion_request(&mut host, "a.com ", 6, TriggerKind::Character)
        .popup
        .unwrap();
    assert_eq!(host.last_texts(), vec!["host://"]);
    assert_eq!(popup.candidates.len(), 1);
}

#[test]
fn test_plugin_help_map_is_dropped_once_another_popup_shows() {
    let mut assist = assist();
    let mut host = RecordingHost::default();
    let popup = assist
        .on_completion_request(&mut host, "a.com mock://gam", 16, TriggerKind::Character)
        .popup
        .unwrap();
    let gamma = popup.candidates[0].clone();
    assert!(assist.session().is_served());

    let popup = assist
        .on_completion_request(&mut host, "a.com prox", 10, TriggerKind::Character)
        .popup
        .unwrap();
    assert_eq!(popup.mode, PopupMode::Protocol);
    assert!(!assist.session().is_served());

    let help = assist.help_url("", 0, Some(&gamma)).unwrap();
    assert_eq!(
        help.url.as_url(),
        Some("https://avwo.github.io/whistle/plugins.html")
    );
    let help = assist.help_url("", 0, Some(&popup.candidates[0])).unwrap();
    assert_eq!(
        help.url.as_url(),
        Some("https://avwo.github.io/whistle/rules/proxy.html")
    );
}

#[test]
fn test_remote_hints_without_runtime_degrade_quietly() {
    let transport = Arc::new(CountingTransport::new(Reply::Echo));
    let mut assist = RulesAssist::new(AssistConfig::default(), common::plugins()).with_transport(transport.clone());
    let mut host = RecordingHost::default();

    let outcome = assist.on_completion_request(&mut host, "a.com inspect://al", 18, TriggerKind::Character);
    assert!(outcome.popup.is_none());
    assert!(outcome.pending.is_none());
    assert!(host.popups.is_empty());
    assert_eq!(transport.calls(), 0);

    // Static lists need no runtime
    assert!(assist
        .on_completion_request(&mut host, "a.com mock://al", 15, TriggerKind::Character)
        .popup
        .is_some());
}
