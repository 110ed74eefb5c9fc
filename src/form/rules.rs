//! Declarative dependency table for the share-creation form.
//!
//! Each trigger field maps to a fixed set of dependent fields and the effect a
//! new trigger value has on them. Evaluation is a pure function of the trigger
//! value, so applying the same value twice yields the same state.

use super::types::FieldValue;

/// Form fields whose value change drives recomputation of other fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerField {
    Mode,
    AdDomain,
    AdJoin,
    HaEnabled,
}

impl TriggerField {
    pub fn name(self) -> &'static str {
        match self {
            TriggerField::Mode => "mode",
            TriggerField::AdDomain => "ad_domain",
            TriggerField::AdJoin => "ad_join",
            TriggerField::HaEnabled => "ha_enabled",
        }
    }

    /// Startup value for each trigger field.
    pub fn default_value(self) -> FieldValue {
        match self {
            TriggerField::Mode => FieldValue::text("lxc"),
            TriggerField::AdDomain => FieldValue::text(""),
            TriggerField::AdJoin => FieldValue::Flag(false),
            TriggerField::HaEnabled => FieldValue::Flag(false),
        }
    }

    pub const ALL: [TriggerField; 4] = [
        TriggerField::Mode,
        TriggerField::AdDomain,
        TriggerField::AdJoin,
        TriggerField::HaEnabled,
    ];
}

/// VM resource fields, shown and enabled only for `mode = vm`.
pub const VM_FIELDS: &[&str] = &["vm_memory", "vm_cores", "vm_template"];
/// Join credential fields, enabled only while `ad_join` is checked.
pub const AD_JOIN_FIELDS: &[&str] = &["ad_username", "ad_password", "ad_ou", "ad_fallback"];
/// High-availability fields, enabled only while `ha_enabled` is checked.
pub const HA_FIELDS: &[&str] = &["ctdb_vip", "ha_nodes"];

/// One recomputed state for a dependent field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEffect {
    pub field: &'static str,
    /// `None` leaves visibility untouched (AD/HA fields stay visible while
    /// disabled; only the VM block is hidden outright).
    pub visible: Option<bool>,
    pub enabled: bool,
    pub required: bool,
    /// Value forced onto the field, e.g. unchecking `ad_join` when the domain
    /// is cleared. Forced trigger fields cascade their own effects.
    pub force_value: Option<FieldValue>,
}

/// Evaluate the dependency table for one trigger change.
pub fn effects_for(trigger: TriggerField, value: &FieldValue) -> Vec<FieldEffect> {
    match trigger {
        TriggerField::Mode => {
            let vm = value.as_str() == Some("vm");
            VM_FIELDS
                .iter()
                .map(|field| FieldEffect {
                    field,
                    visible: Some(vm),
                    enabled: vm,
                    required: false,
                    force_value: None,
                })
                .collect()
        }
        TriggerField::AdDomain => {
            let has_domain = !value.is_empty();
            vec![FieldEffect {
                field: "ad_join",
                visible: None,
                enabled: has_domain,
                required: false,
                force_value: (!has_domain).then_some(FieldValue::Flag(false)),
            }]
        }
        TriggerField::AdJoin => {
            let joining = value.as_bool();
            AD_JOIN_FIELDS
                .iter()
                .map(|field| FieldEffect {
                    field,
                    visible: None,
                    enabled: joining,
                    // The join password is the only credential the gateway
                    // cannot proceed without.
                    required: joining && *field == "ad_password",
                    force_value: None,
                })
                .collect()
        }
        TriggerField::HaEnabled => {
            let ha = value.as_bool();
            HA_FIELDS
                .iter()
                .map(|field| FieldEffect {
                    field,
                    visible: None,
                    enabled: ha,
                    required: false,
                    force_value: None,
                })
                .collect()
        }
    }
}
