//! Share overview aggregation for the dashboard's summary panel.

use serde::Serialize;
use strum::Display;

use crate::api::{GatewayApi, ShareRecord};
use crate::error::ConsoleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShareStatus {
    Running,
    Stopped,
}

/// One row of the share table, formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRow {
    pub sharename: String,
    pub status: ShareStatus,
    pub mode: String,
    pub ha_enabled: bool,
    /// `used / quota`, with the quota shown as `∞` when unlimited.
    pub storage: String,
    pub connections: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_shares: usize,
    pub active_shares: usize,
    pub ha_shares: usize,
    pub rows: Vec<ShareRow>,
}

impl DashboardSummary {
    pub fn from_shares(shares: &[ShareRecord]) -> Self {
        let rows = shares.iter().map(share_row).collect();
        Self {
            total_shares: shares.len(),
            active_shares: shares.iter().filter(|s| s.active).count(),
            ha_shares: shares.iter().filter(|s| s.ha_enabled).count(),
            rows,
        }
    }
}

/// Fetch the share list and aggregate it.
pub fn refresh(api: &dyn GatewayApi) -> Result<DashboardSummary, ConsoleError> {
    Ok(DashboardSummary::from_shares(&api.list_shares()?))
}

fn share_row(share: &ShareRecord) -> ShareRow {
    ShareRow {
        sharename: share.sharename.clone(),
        status: if share.active {
            ShareStatus::Running
        } else {
            ShareStatus::Stopped
        },
        mode: share.mode.clone(),
        ha_enabled: share.ha_enabled,
        storage: format!(
            "{} / {}",
            format_bytes(share.used),
            share.quota.as_deref().unwrap_or("\u{221e}")
        ),
        connections: share.connections,
    }
}

/// Human-readable byte count, binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "K", "M", "G", "T"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes}{}", UNITS[0])
    } else {
        format!("{value:.1}{}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share(name: &str, active: bool, ha: bool, used: u64, quota: Option<&str>) -> ShareRecord {
        ShareRecord {
            sharename: name.to_string(),
            active,
            mode: "lxc".to_string(),
            ha_enabled: ha,
            used,
            quota: quota.map(str::to_string),
            connections: 4,
        }
    }

    #[test]
    fn counts_and_rows_aggregate() {
        let shares = vec![
            share("a", true, true, 5 * 1024 * 1024 * 1024, Some("10G")),
            share("b", true, false, 0, None),
            share("c", false, false, 1024, Some("1T")),
        ];
        let summary = DashboardSummary::from_shares(&shares);
        assert_eq!(summary.total_shares, 3);
        assert_eq!(summary.active_shares, 2);
        assert_eq!(summary.ha_shares, 1);
        assert_eq!(summary.rows[0].storage, "5.0G / 10G");
        assert_eq!(summary.rows[0].status, ShareStatus::Running);
        assert_eq!(summary.rows[2].status, ShareStatus::Stopped);
    }

    #[test]
    fn unlimited_quota_renders_as_infinity() {
        let summary = DashboardSummary::from_shares(&[share("x", true, false, 0, None)]);
        assert_eq!(summary.rows[0].storage, "0B / \u{221e}");
    }

    #[test]
    fn byte_formatting_picks_the_right_unit() {
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(2048), "2.0K");
        assert_eq!(format_bytes(1536 * 1024 * 1024), "1.5G");
    }
}
