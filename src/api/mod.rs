//! Gateway API client.
//!
//! Wire types for the gateway's JSON endpoints plus the [`GatewayApi`] trait
//! the rest of the console talks through. The HTTP implementation uses the
//! synchronous `ureq` client; tests substitute in-memory stubs.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConsoleError;
use crate::form::ShareCreationRequest;

/// Share population counters on the metrics endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareTotals {
    pub total: u64,
    pub active: u64,
    /// Bytes currently consumed across all shares.
    pub storage: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub throughput: f64,
    pub latency: f64,
    pub connections: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
}

/// One poll of the gateway's metrics endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub shares: ShareTotals,
    pub performance: PerformanceStats,
    pub system: SystemStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertsPayload {
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogsPayload {
    pub logs: Vec<String>,
}

/// One share as the gateway reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub sharename: String,
    pub active: bool,
    pub mode: String,
    #[serde(default)]
    pub ha_enabled: bool,
    /// Bytes used.
    #[serde(default)]
    pub used: u64,
    /// Quota string (`10G`, `1T`); `None` means unlimited.
    #[serde(default)]
    pub quota: Option<String>,
    #[serde(default)]
    pub connections: u64,
}

/// Everything the console asks of the gateway.
pub trait GatewayApi: Send {
    fn submit_share_request(&self, request: &ShareCreationRequest) -> Result<(), ConsoleError>;
    fn fetch_metrics(&self) -> Result<MetricsSnapshot, ConsoleError>;
    fn fetch_alerts(&self) -> Result<AlertsPayload, ConsoleError>;
    fn fetch_logs(&self) -> Result<LogsPayload, ConsoleError>;
    fn list_shares(&self) -> Result<Vec<ShareRecord>, ConsoleError>;
    fn save_settings(&self, category: &str, payload: &Value) -> Result<(), ConsoleError>;
    fn start_backup(&self, sharename: Option<&str>) -> Result<(), ConsoleError>;
}

/// HTTP client against a running gateway.
#[derive(Debug, Clone)]
pub struct HttpGatewayApi {
    base_url: String,
    timeout: Duration,
}

impl HttpGatewayApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ConsoleError> {
        let response = ureq::get(&self.url(path))
            .timeout(self.timeout)
            .call()
            .map_err(|err| transport_error(path, err))?;
        response
            .into_json()
            .map_err(|err| ConsoleError::Transport {
                status: None,
                message: format!("decode {path}: {err}"),
            })
    }

    fn post_json(&self, path: &str, body: &Value) -> Result<(), ConsoleError> {
        ureq::post(&self.url(path))
            .timeout(self.timeout)
            .send_json(body)
            .map_err(|err| transport_error(path, err))?;
        Ok(())
    }
}

fn transport_error(path: &str, err: ureq::Error) -> ConsoleError {
    match err {
        ureq::Error::Status(code, _) => ConsoleError::Transport {
            status: Some(code),
            message: format!("{path} returned HTTP {code}"),
        },
        other => ConsoleError::Transport {
            status: None,
            message: format!("{path}: {other}"),
        },
    }
}

impl GatewayApi for HttpGatewayApi {
    fn submit_share_request(&self, request: &ShareCreationRequest) -> Result<(), ConsoleError> {
        let body = serde_json::to_value(request).map_err(|err| ConsoleError::Transport {
            status: None,
            message: format!("encode share request: {err}"),
        })?;
        self.post_json("/api/shares", &body)
    }

    fn fetch_metrics(&self) -> Result<MetricsSnapshot, ConsoleError> {
        self.get_json("/api/metrics")
    }

    fn fetch_alerts(&self) -> Result<AlertsPayload, ConsoleError> {
        self.get_json("/api/alerts")
    }

    fn fetch_logs(&self) -> Result<LogsPayload, ConsoleError> {
        self.get_json("/api/logs")
    }

    fn list_shares(&self) -> Result<Vec<ShareRecord>, ConsoleError> {
        self.get_json("/api/shares")
    }

    fn save_settings(&self, category: &str, payload: &Value) -> Result<(), ConsoleError> {
        self.post_json(&format!("/api/settings/{category}"), payload)
    }

    fn start_backup(&self, sharename: Option<&str>) -> Result<(), ConsoleError> {
        let body = match sharename {
            Some(name) => serde_json::json!({ "sharename": name }),
            None => serde_json::json!({}),
        };
        self.post_json("/api/backup", &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_snapshot_deserializes_gateway_shape() {
        let snapshot: MetricsSnapshot = serde_json::from_str(
            r#"{
                "shares": {"total": 12, "active": 9, "storage": 1073741824},
                "performance": {"throughput": 125.5, "latency": 2.1, "connections": 40},
                "system": {"cpu": 35.0, "memory": 61.2, "disk": 48.9}
            }"#,
        )
        .unwrap();
        assert_eq!(snapshot.shares.total, 12);
        assert_eq!(snapshot.performance.connections, 40);
    }

    #[test]
    fn share_record_defaults_optional_fields() {
        let record: ShareRecord = serde_json::from_str(
            r#"{"sharename": "acct", "active": true, "mode": "lxc"}"#,
        )
        .unwrap();
        assert!(!record.ha_enabled);
        assert_eq!(record.quota, None);
        assert_eq!(record.connections, 0);
    }

    #[test]
    fn alert_severity_is_lowercase_on_the_wire() {
        let alert: Alert = serde_json::from_str(
            r#"{"severity": "critical", "message": "quota exceeded", "timestamp": "t"}"#,
        )
        .unwrap();
        assert_eq!(alert.severity, AlertSeverity::Critical);
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let api = HttpGatewayApi::new("http://gateway:8080/");
        assert_eq!(api.url("/api/metrics"), "http://gateway:8080/api/metrics");
    }
}
