//! Cross-module flows: wizard to payload, theme and layout persistence
//! across sessions, and the realtime feed against a stub gateway.

use std::time::Duration;

use serde_json::Value;

use smbgw_console::api::{
    AlertsPayload, GatewayApi, LogsPayload, MetricsSnapshot, ShareRecord, ShareTotals,
};
use smbgw_console::bus::{EventBus, Notification};
use smbgw_console::dashboard::DashboardSummary;
use smbgw_console::error::ConsoleError;
use smbgw_console::form::{FieldValue, FormEngine, ShareMode};
use smbgw_console::form::rules::TriggerField;
use smbgw_console::layout::{
    LayoutConfig, LayoutStore, Position, WidgetKind, WidgetLayoutEntry,
};
use smbgw_console::realtime::{self, RealtimeMessage};
use smbgw_console::store::{KeyValueStore, MemoryStore, THEME_PREF_KEY};
use smbgw_console::theme::{
    RecordingTarget, SharedSignals, ThemeEngine, THEME_DARK,
};

#[test]
fn wizard_flow_produces_a_pruned_payload() {
    let mut form = FormEngine::new();
    form.set_value("sharename", FieldValue::text("projects"));
    form.set_value("quota", FieldValue::text("50G"));
    form.on_trigger_change(TriggerField::Mode, FieldValue::text("vm"));
    form.set_value("vm_memory", FieldValue::Number(4096));
    form.on_trigger_change(TriggerField::AdDomain, FieldValue::text("corp.local"));
    form.on_trigger_change(TriggerField::AdJoin, FieldValue::Flag(true));
    form.set_value("ad_password", FieldValue::text("hunter2"));

    // The user changes their mind: back to LXC, domain cleared.
    form.on_trigger_change(TriggerField::Mode, FieldValue::text("lxc"));
    form.on_trigger_change(TriggerField::AdDomain, FieldValue::text(""));

    let request = form.finalize().unwrap();
    assert_eq!(request.sharename, "projects");
    assert_eq!(request.mode, ShareMode::Lxc);
    assert_eq!(request.path, "/srv/smb/projects");
    assert_eq!(request.quota.as_deref(), Some("50G"));

    let json: Value = serde_json::to_value(&request).unwrap();
    let body = json.as_object().unwrap();
    assert!(!body.contains_key("vm_memory"));
    assert!(!body.contains_key("ad_password"));
    assert!(!body.contains_key("ad_join"));
}

#[test]
fn theme_choice_survives_a_session_restart() {
    let store = MemoryStore::new();

    let mut first = ThemeEngine::new(
        Box::new(store.clone()),
        Box::new(SharedSignals::default()),
        EventBus::new(),
    );
    first.initialize();
    first.apply_theme(THEME_DARK).unwrap();
    first.dispose();
    drop(first);

    let mut second = ThemeEngine::new(
        Box::new(store),
        Box::new(SharedSignals::default()),
        EventBus::new(),
    );
    second.initialize();
    let target = RecordingTarget::new();
    second.register_target(Box::new(target.clone()));

    assert_eq!(second.preference().active_theme, "dark");
    assert_eq!(target.last_tag().as_deref(), Some("dark-theme"));
    assert_eq!(target.variable("--dashboard-bg").as_deref(), Some("#1a1a1a"));
}

#[test]
fn theme_change_notifies_every_subscriber() {
    let bus = EventBus::new();
    let mut sub_a = bus.subscribe();
    let mut sub_b = bus.subscribe();

    let mut engine = ThemeEngine::new(
        Box::new(MemoryStore::new()),
        Box::new(SharedSignals::default()),
        bus,
    );
    engine.initialize();
    engine.apply_theme(THEME_DARK).unwrap();
    engine.dispose();

    for sub in [&mut sub_a, &mut sub_b] {
        match sub.recv_timeout(Duration::from_secs(1)).unwrap() {
            Notification::ThemeChanged { theme, .. } => assert_eq!(theme, "dark"),
            other => panic!("unexpected notification: {other:?}"),
        }
    }
}

#[test]
fn persisted_preference_is_one_whole_document() {
    let store = MemoryStore::new();
    let mut engine = ThemeEngine::new(
        Box::new(store.clone()),
        Box::new(SharedSignals::default()),
        EventBus::new(),
    );
    engine.initialize();
    engine.set_animations_enabled(false);
    engine.apply_theme(THEME_DARK).unwrap();
    engine.dispose();

    let text = store.get(THEME_PREF_KEY).unwrap().unwrap();
    let doc: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["active_theme"], "dark");
    assert_eq!(doc["animations_enabled"], false);
    assert_eq!(doc["transition_duration_ms"], 300);
}

#[test]
fn layout_edits_survive_reload_and_respect_the_cap() {
    let store = MemoryStore::new();
    let config = LayoutConfig {
        max_widgets: 3,
        ..LayoutConfig::default()
    };

    let mut layout = LayoutStore::load(Box::new(store.clone()), config);
    for (id, kind) in [
        ("w1", WidgetKind::Metric),
        ("w2", WidgetKind::Chart),
        ("w3", WidgetKind::SystemStatus),
    ] {
        layout
            .save_layout(
                id,
                WidgetLayoutEntry {
                    widget_kind: kind,
                    config: serde_json::json!({"metric": "cpu"}),
                    position: Position { x: 15, y: 20 },
                    size: kind.default_size(),
                },
            )
            .unwrap();
    }
    let err = layout
        .save_layout(
            "w4",
            WidgetLayoutEntry {
                widget_kind: WidgetKind::Logs,
                config: Value::Null,
                position: Position::default(),
                size: WidgetKind::Logs.default_size(),
            },
        )
        .unwrap_err();
    assert_eq!(err, ConsoleError::LayoutFull { max: 3 });
    layout.remove_layout("w2").unwrap();

    let reloaded = LayoutStore::load(Box::new(store), config);
    assert_eq!(reloaded.len(), 2);
    let entry = reloaded.get("w1").unwrap();
    assert_eq!(entry.position, Position { x: 20, y: 20 });
    assert_eq!(entry.config["metric"], "cpu");
    assert!(reloaded.get("w2").is_none());
}

struct CannedApi;

impl GatewayApi for CannedApi {
    fn submit_share_request(
        &self,
        _: &smbgw_console::form::ShareCreationRequest,
    ) -> Result<(), ConsoleError> {
        Ok(())
    }

    fn fetch_metrics(&self) -> Result<MetricsSnapshot, ConsoleError> {
        Ok(MetricsSnapshot {
            shares: ShareTotals {
                total: 2,
                active: 1,
                storage: 4096,
            },
            ..MetricsSnapshot::default()
        })
    }

    fn fetch_alerts(&self) -> Result<AlertsPayload, ConsoleError> {
        Ok(AlertsPayload::default())
    }

    fn fetch_logs(&self) -> Result<LogsPayload, ConsoleError> {
        Ok(LogsPayload {
            logs: vec!["smbd started".to_string()],
        })
    }

    fn list_shares(&self) -> Result<Vec<ShareRecord>, ConsoleError> {
        Ok(vec![
            ShareRecord {
                sharename: "acct".to_string(),
                active: true,
                mode: "lxc".to_string(),
                ha_enabled: true,
                used: 1024,
                quota: Some("10G".to_string()),
                connections: 3,
            },
            ShareRecord {
                sharename: "scratch".to_string(),
                active: false,
                mode: "native".to_string(),
                ha_enabled: false,
                used: 0,
                quota: None,
                connections: 0,
            },
        ])
    }

    fn save_settings(&self, _: &str, _: &Value) -> Result<(), ConsoleError> {
        Ok(())
    }

    fn start_backup(&self, _: Option<&str>) -> Result<(), ConsoleError> {
        Ok(())
    }
}

#[test]
fn realtime_feed_delivers_a_full_polling_round() {
    let (handle, rx) = realtime::start(Box::new(CannedApi), None, Duration::from_secs(60));

    let mut seen_metrics = false;
    let mut seen_logs = false;
    for _ in 0..3 {
        match rx.recv_timeout(Duration::from_secs(2)).unwrap() {
            RealtimeMessage::Metrics(m) => {
                assert_eq!(m.shares.total, 2);
                seen_metrics = true;
            }
            RealtimeMessage::Logs(l) => {
                assert_eq!(l.logs, ["smbd started"]);
                seen_logs = true;
            }
            RealtimeMessage::Alerts(_) => {}
        }
    }
    handle.stop();
    assert!(seen_metrics && seen_logs);
}

#[test]
fn dashboard_summary_aggregates_the_share_list() {
    let summary = DashboardSummary::from_shares(&CannedApi.list_shares().unwrap());
    assert_eq!(summary.total_shares, 2);
    assert_eq!(summary.active_shares, 1);
    assert_eq!(summary.ha_shares, 1);
    assert_eq!(summary.rows[0].storage, "1.0K / 10G");
    assert_eq!(summary.rows[1].storage, "0B / \u{221e}");
}
