//! Gateway settings bundles.
//!
//! One struct per settings category, carrying the gateway's documented
//! defaults and numeric bounds. Bundles validate locally before submission
//! so an out-of-range value never reaches the wire.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::api::GatewayApi;
use crate::error::ConsoleError;
use crate::form::ShareMode;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SettingsCategory {
    General,
    Security,
    Performance,
    Backup,
    Monitoring,
    Ha,
    Ad,
    Logging,
}

/// A submittable settings category: serializable payload plus local bounds
/// validation.
pub trait SettingsBundle: Serialize {
    const CATEGORY: SettingsCategory;

    fn validate(&self) -> Result<(), ConsoleError>;
}

/// Validate and send one bundle to the gateway.
pub fn submit<B: SettingsBundle>(api: &dyn GatewayApi, bundle: &B) -> Result<(), ConsoleError> {
    bundle.validate()?;
    let payload = serde_json::to_value(bundle).map_err(|err| {
        ConsoleError::invalid_format(&B::CATEGORY.to_string(), format!("serialize: {err}"))
    })?;
    api.save_settings(&B::CATEGORY.to_string(), &payload)
}

fn check_range<T: PartialOrd + std::fmt::Display + Copy>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<(), ConsoleError> {
    if value < min || value > max {
        return Err(ConsoleError::invalid_format(
            field,
            format!("{value} is outside {min}..={max}"),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    pub default_quota: Option<String>,
    pub default_path: String,
    pub default_mode: ShareMode,
    pub auto_start_shares: bool,
    pub enable_quotas: bool,
    pub enable_audit: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            default_quota: None,
            default_path: "/srv/smb".to_string(),
            default_mode: ShareMode::Lxc,
            auto_start_shares: true,
            enable_quotas: true,
            enable_audit: true,
        }
    }
}

impl SettingsBundle for GeneralSettings {
    const CATEGORY: SettingsCategory = SettingsCategory::General;

    fn validate(&self) -> Result<(), ConsoleError> {
        if self.default_path.trim().is_empty() {
            return Err(ConsoleError::missing_field("default_path"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecuritySettings {
    pub smb_version: String,
    pub encryption_required: bool,
    pub signing_required: bool,
    pub guest_access: bool,
    pub allowed_hosts: Option<String>,
    pub max_connections: u32,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            smb_version: "3.1.1".to_string(),
            encryption_required: true,
            signing_required: true,
            guest_access: false,
            allowed_hosts: None,
            max_connections: 100,
        }
    }
}

impl SettingsBundle for SecuritySettings {
    const CATEGORY: SettingsCategory = SettingsCategory::Security;

    fn validate(&self) -> Result<(), ConsoleError> {
        check_range("max_connections", self.max_connections, 1, 1000)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSettings {
    pub max_memory: u32,
    pub max_cpu: u32,
    pub io_priority: i32,
    pub enable_cache: bool,
    pub cache_size: u32,
    pub cache_ttl: u32,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            max_memory: 2048,
            max_cpu: 2,
            io_priority: 0,
            enable_cache: true,
            cache_size: 512,
            cache_ttl: 300,
        }
    }
}

impl SettingsBundle for PerformanceSettings {
    const CATEGORY: SettingsCategory = SettingsCategory::Performance;

    fn validate(&self) -> Result<(), ConsoleError> {
        check_range("max_memory", self.max_memory, 512, 32768)?;
        check_range("max_cpu", self.max_cpu, 1, 32)?;
        check_range("io_priority", self.io_priority, -20, 19)?;
        check_range("cache_size", self.cache_size, 64, 8192)?;
        check_range("cache_ttl", self.cache_ttl, 60, 3600)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BackupSchedule {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupSettings {
    pub auto_backup: bool,
    pub backup_schedule: BackupSchedule,
    pub backup_retention: u32,
    pub backup_path: String,
    pub compress_backups: bool,
    pub encrypt_backups: bool,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            auto_backup: true,
            backup_schedule: BackupSchedule::Daily,
            backup_retention: 30,
            backup_path: "/var/lib/pve/smbgateway/backups".to_string(),
            compress_backups: true,
            encrypt_backups: false,
        }
    }
}

impl SettingsBundle for BackupSettings {
    const CATEGORY: SettingsCategory = SettingsCategory::Backup;

    fn validate(&self) -> Result<(), ConsoleError> {
        check_range("backup_retention", self.backup_retention, 1, 365)?;
        if self.backup_path.trim().is_empty() {
            return Err(ConsoleError::missing_field("backup_path"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringSettings {
    pub enable_metrics: bool,
    pub metrics_interval: u32,
    pub metrics_retention: u32,
    pub enable_alerts: bool,
    pub quota_alert_threshold: u32,
    pub alert_email: Option<String>,
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            enable_metrics: true,
            metrics_interval: 60,
            metrics_retention: 90,
            enable_alerts: true,
            quota_alert_threshold: 80,
            alert_email: None,
        }
    }
}

impl SettingsBundle for MonitoringSettings {
    const CATEGORY: SettingsCategory = SettingsCategory::Monitoring;

    fn validate(&self) -> Result<(), ConsoleError> {
        check_range("metrics_interval", self.metrics_interval, 30, 300)?;
        check_range("metrics_retention", self.metrics_retention, 1, 365)?;
        check_range("quota_alert_threshold", self.quota_alert_threshold, 50, 95)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HaSettings {
    pub ha_enabled: bool,
    pub ctdb_vip: Option<String>,
    pub ha_nodes: Option<String>,
    pub failover_timeout: u32,
    pub auto_failback: bool,
}

impl Default for HaSettings {
    fn default() -> Self {
        Self {
            ha_enabled: false,
            ctdb_vip: None,
            ha_nodes: None,
            failover_timeout: 30,
            auto_failback: true,
        }
    }
}

impl SettingsBundle for HaSettings {
    const CATEGORY: SettingsCategory = SettingsCategory::Ha;

    fn validate(&self) -> Result<(), ConsoleError> {
        check_range("failover_timeout", self.failover_timeout, 10, 300)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdSettings {
    pub ad_domain: Option<String>,
    pub ad_servers: Option<String>,
    pub ad_kerberos: bool,
    pub ad_fallback: bool,
    pub ad_timeout: u32,
}

impl Default for AdSettings {
    fn default() -> Self {
        Self {
            ad_domain: None,
            ad_servers: None,
            ad_kerberos: true,
            ad_fallback: true,
            ad_timeout: 30,
        }
    }
}

impl SettingsBundle for AdSettings {
    const CATEGORY: SettingsCategory = SettingsCategory::Ad;

    fn validate(&self) -> Result<(), ConsoleError> {
        check_range("ad_timeout", self.ad_timeout, 5, 300)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub log_level: LogLevel,
    pub log_smb: bool,
    pub log_audit: bool,
    pub log_max_size: u32,
    pub log_keep_days: u32,
    pub log_compress: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_smb: true,
            log_audit: true,
            log_max_size: 100,
            log_keep_days: 30,
            log_compress: true,
        }
    }
}

impl SettingsBundle for LoggingSettings {
    const CATEGORY: SettingsCategory = SettingsCategory::Logging;

    fn validate(&self) -> Result<(), ConsoleError> {
        check_range("log_max_size", self.log_max_size, 10, 1000)?;
        check_range("log_keep_days", self.log_keep_days, 1, 365)
    }
}

/// Default payload for one category, e.g. for a reset-to-defaults action.
pub fn defaults_for(category: SettingsCategory) -> serde_json::Value {
    // Defaults are plain data; serialization cannot fail.
    let value = match category {
        SettingsCategory::General => serde_json::to_value(GeneralSettings::default()),
        SettingsCategory::Security => serde_json::to_value(SecuritySettings::default()),
        SettingsCategory::Performance => serde_json::to_value(PerformanceSettings::default()),
        SettingsCategory::Backup => serde_json::to_value(BackupSettings::default()),
        SettingsCategory::Monitoring => serde_json::to_value(MonitoringSettings::default()),
        SettingsCategory::Ha => serde_json::to_value(HaSettings::default()),
        SettingsCategory::Ad => serde_json::to_value(AdSettings::default()),
        SettingsCategory::Logging => serde_json::to_value(LoggingSettings::default()),
    };
    value.unwrap_or(serde_json::Value::Null)
}
