//! Field-level types for the share-creation form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Provisioning mode for a share.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShareMode {
    #[default]
    Lxc,
    Native,
    Vm,
}

/// Raw value of one form field before normalization.
///
/// Untagged so that `{"ha_enabled": true, "quota": "10G", "vm_memory": 1024}`
/// deserializes directly into a value map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(i64),
    Text(String),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Textual content, if any. Numbers are not coerced.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Boolean interpretation. Checkbox widgets submit either a real boolean
    /// or a string form ("on", "true", "1").
    pub fn as_bool(&self) -> bool {
        match self {
            FieldValue::Flag(b) => *b,
            FieldValue::Number(n) => *n != 0,
            FieldValue::Text(s) => matches!(s.trim(), "on" | "true" | "1"),
        }
    }

    /// Numeric interpretation; text is parsed, anything else is `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
            FieldValue::Flag(_) => None,
        }
    }

    /// Empty means "the user left it blank": empty/whitespace text.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// The full raw value set handed to `finalize`.
pub type RawValues = BTreeMap<String, FieldValue>;

/// Convenience for building a [`RawValues`] map in tests and callers.
pub fn raw_values<I, K>(pairs: I) -> RawValues
where
    I: IntoIterator<Item = (K, FieldValue)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Live state of one dependent field, mutated only by the dependency engine.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldState {
    pub visible: bool,
    pub enabled: bool,
    pub required: bool,
    pub value: FieldValue,
}

impl Default for FieldState {
    fn default() -> Self {
        Self {
            visible: true,
            enabled: true,
            required: false,
            value: FieldValue::default(),
        }
    }
}

/// Normalized, pruned submission payload. Fields irrelevant to the selected
/// mode are `None` and absent from the serialized body, never merely empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareCreationRequest {
    pub sharename: String,
    pub mode: ShareMode,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_join: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_ou: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_fallback: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ha_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctdb_vip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ha_nodes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_memory: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_cores: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_template: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_value_deserializes_untagged() {
        let raw: RawValues =
            serde_json::from_str(r#"{"ha_enabled": true, "quota": "10G", "vm_memory": 1024}"#)
                .unwrap();
        assert!(raw["ha_enabled"].as_bool());
        assert_eq!(raw["quota"].as_str(), Some("10G"));
        assert_eq!(raw["vm_memory"].as_i64(), Some(1024));
    }

    #[test]
    fn checkbox_strings_count_as_true() {
        assert!(FieldValue::text("on").as_bool());
        assert!(FieldValue::text("1").as_bool());
        assert!(!FieldValue::text("off").as_bool());
        assert!(!FieldValue::text("").as_bool());
    }

    #[test]
    fn share_mode_parses_lowercase() {
        use std::str::FromStr;
        assert_eq!(ShareMode::from_str("vm").unwrap(), ShareMode::Vm);
        assert_eq!(ShareMode::from_str("lxc").unwrap(), ShareMode::Lxc);
        assert!(ShareMode::from_str("docker").is_err());
    }
}
