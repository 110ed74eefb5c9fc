//! Form dependency engine for the share-creation wizard.
//!
//! Keeps the form's fields internally consistent as the user edits them
//! (visibility, enablement, requiredness) and normalizes the final value set
//! before submission. Pure in-memory state: no I/O happens anywhere in this
//! module, which is what makes the wizard fully unit-testable without the
//! gateway API.

mod finalize;
pub mod rules;
mod types;

pub use finalize::finalize;
pub use types::{raw_values, FieldState, FieldValue, RawValues, ShareCreationRequest, ShareMode};

use std::collections::BTreeMap;

use rules::{effects_for, TriggerField};

/// Static (non-dependent) fields the form always carries.
const BASE_FIELDS: &[&str] = &["sharename", "path", "quota"];

/// Live form state: one [`FieldState`] per known field, recomputed on every
/// trigger change. Created at form initialization, discarded with the form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormEngine {
    fields: BTreeMap<String, FieldState>,
}

impl Default for FormEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FormEngine {
    /// Initialize all fields with the wizard's defaults, then run the
    /// dependency table once so dependent fields start in the correct state
    /// (VM block hidden, AD/HA dependents disabled).
    pub fn new() -> Self {
        let mut engine = Self {
            fields: BTreeMap::new(),
        };

        for field in BASE_FIELDS {
            engine.fields.insert((*field).to_string(), FieldState {
                required: *field == "sharename",
                ..FieldState::default()
            });
        }
        for trigger in TriggerField::ALL {
            engine
                .fields
                .insert(trigger.name().to_string(), FieldState {
                    value: trigger.default_value(),
                    ..FieldState::default()
                });
        }
        for trigger in TriggerField::ALL {
            engine.on_trigger_change(trigger, trigger.default_value());
        }
        engine
    }

    /// Recompute dependent-field state for one trigger change. Synchronous
    /// and idempotent: state is fully updated when this returns, and applying
    /// the same value twice yields the same state as applying it once.
    pub fn on_trigger_change(&mut self, trigger: TriggerField, value: FieldValue) {
        self.fields
            .entry(trigger.name().to_string())
            .or_default()
            .value = value.clone();

        let mut cascades: Vec<(TriggerField, FieldValue)> = Vec::new();
        for effect in effects_for(trigger, &value) {
            let state = self.fields.entry(effect.field.to_string()).or_default();
            if let Some(visible) = effect.visible {
                state.visible = visible;
            }
            state.enabled = effect.enabled;
            state.required = effect.required;
            if let Some(forced) = effect.force_value {
                state.value = forced.clone();
                // A forced trigger field propagates its own dependency row,
                // e.g. clearing ad_domain unchecks ad_join which in turn
                // disables the credential fields.
                if let Some(t) = trigger_by_name(effect.field) {
                    cascades.push((t, forced));
                }
            }
        }
        for (t, v) in cascades {
            self.on_trigger_change(t, v);
        }
    }

    /// Set a non-trigger field's value without recomputation.
    pub fn set_value(&mut self, field: &str, value: FieldValue) {
        self.fields.entry(field.to_string()).or_default().value = value;
    }

    pub fn field(&self, name: &str) -> Option<&FieldState> {
        self.fields.get(name)
    }

    /// Snapshot of every field's state, for assertions and rendering.
    pub fn snapshot(&self) -> &BTreeMap<String, FieldState> {
        &self.fields
    }

    /// Values of currently enabled fields, i.e. what the form would submit.
    /// Disabled fields never leak into the payload.
    pub fn raw_values(&self) -> RawValues {
        self.fields
            .iter()
            .filter(|(_, state)| state.enabled)
            .map(|(name, state)| (name.clone(), state.value.clone()))
            .collect()
    }

    /// Normalize and validate the current enabled-field values into a
    /// submission payload.
    pub fn finalize(&self) -> Result<ShareCreationRequest, crate::error::ConsoleError> {
        finalize(&self.raw_values())
    }
}

fn trigger_by_name(name: &str) -> Option<TriggerField> {
    TriggerField::ALL.into_iter().find(|t| t.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_hides_vm_and_disables_dependents() {
        let engine = FormEngine::new();
        for field in rules::VM_FIELDS {
            let state = engine.field(field).unwrap();
            assert!(!state.visible && !state.enabled, "{field} should start hidden");
        }
        assert!(!engine.field("ad_join").unwrap().enabled);
        for field in rules::AD_JOIN_FIELDS {
            assert!(!engine.field(field).unwrap().enabled);
        }
        for field in rules::HA_FIELDS {
            assert!(!engine.field(field).unwrap().enabled);
        }
        assert!(engine.field("sharename").unwrap().required);
    }

    #[test]
    fn trigger_change_is_idempotent() {
        let mut once = FormEngine::new();
        once.on_trigger_change(TriggerField::Mode, FieldValue::text("vm"));

        let mut twice = FormEngine::new();
        twice.on_trigger_change(TriggerField::Mode, FieldValue::text("vm"));
        twice.on_trigger_change(TriggerField::Mode, FieldValue::text("vm"));

        assert_eq!(once.snapshot(), twice.snapshot());
    }

    #[test]
    fn clearing_domain_cascades_to_credentials() {
        let mut engine = FormEngine::new();
        engine.on_trigger_change(TriggerField::AdDomain, FieldValue::text("corp.local"));
        engine.on_trigger_change(TriggerField::AdJoin, FieldValue::Flag(true));
        assert!(engine.field("ad_password").unwrap().enabled);
        assert!(engine.field("ad_password").unwrap().required);

        engine.on_trigger_change(TriggerField::AdDomain, FieldValue::text(""));
        assert!(!engine.field("ad_join").unwrap().value.as_bool());
        assert!(!engine.field("ad_password").unwrap().enabled);
        assert!(!engine.field("ad_password").unwrap().required);
    }

    #[test]
    fn disabled_fields_do_not_leak_into_raw_values() {
        let mut engine = FormEngine::new();
        engine.set_value("sharename", FieldValue::text("acct"));
        engine.on_trigger_change(TriggerField::HaEnabled, FieldValue::Flag(false));

        let values = engine.raw_values();
        assert!(values.contains_key("sharename"));
        assert!(!values.contains_key("ctdb_vip"));
        assert!(!values.contains_key("vm_memory"));
    }

    #[test]
    fn reading_state_after_change_sees_post_update_state() {
        let mut engine = FormEngine::new();
        engine.on_trigger_change(TriggerField::HaEnabled, FieldValue::Flag(true));
        // Same-handler read: recomputation completed before the call returned.
        assert!(engine.field("ctdb_vip").unwrap().enabled);
    }
}
