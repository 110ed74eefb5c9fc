//! Theme engine: resolution, application, persistence and notification.
//!
//! One instance owns the persisted preference and pushes variable bundles to
//! any number of registered presentation targets. Application is all-or-
//! nothing per theme change: the id is validated before the first write, so a
//! bad id leaves targets, storage and subscribers untouched.

pub mod definitions;
pub mod preference;
mod target;

pub use definitions::{
    builtin_themes, ThemeDefinition, ThemeSummary, FALLBACK_COLORS, THEME_AUTO, THEME_DARK,
    THEME_LIGHT,
};
pub use preference::{
    EnvVarSignals, EnvironmentSignals, NoSignals, SharedSignals, ThemePreference,
    DEFAULT_TRANSITION_MS,
};
pub use target::{LogTarget, PresentationTarget, RecordingTarget};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::bus::{timestamp_now, EventBus, Notification};
use crate::error::ConsoleError;
use crate::store::{KeyValueStore, THEME_PREF_KEY};

struct TargetSlot {
    id: u64,
    target: Box<dyn PresentationTarget>,
}

/// Owns theme state for one console session.
pub struct ThemeEngine {
    themes: Vec<ThemeDefinition>,
    preference: ThemePreference,
    store: Box<dyn KeyValueStore>,
    signals: Box<dyn EnvironmentSignals>,
    bus: EventBus,
    targets: Arc<Mutex<Vec<TargetSlot>>>,
    next_target_id: u64,
    // Bumped on every scheduled transition clear; a timer thread only fires
    // if its captured epoch is still current, so a rapid second theme change
    // supersedes the first timer instead of racing it.
    transition_epoch: Arc<AtomicU64>,
    timer: Option<thread::JoinHandle<()>>,
}

impl ThemeEngine {
    /// Engine with the built-in themes and an unloaded default preference.
    /// Call [`ThemeEngine::initialize`] to load persisted state and apply it.
    pub fn new(
        store: Box<dyn KeyValueStore>,
        signals: Box<dyn EnvironmentSignals>,
        bus: EventBus,
    ) -> Self {
        Self {
            themes: builtin_themes(),
            preference: ThemePreference::default(),
            store,
            signals,
            bus,
            targets: Arc::new(Mutex::new(Vec::new())),
            next_target_id: 0,
            transition_epoch: Arc::new(AtomicU64::new(0)),
            timer: None,
        }
    }

    /// Load the persisted preference, fold in the environment's accessibility
    /// signals and apply the resolved theme. Storage failures are logged and
    /// fall back to defaults; they never abort startup.
    pub fn initialize(&mut self) {
        match self.store.get(THEME_PREF_KEY) {
            Ok(Some(text)) => match serde_json::from_str::<ThemePreference>(&text) {
                Ok(pref) => self.preference = pref,
                Err(err) => {
                    log::warn!("stored theme preference unreadable, using defaults: {err}");
                    self.preference = ThemePreference::default();
                }
            },
            Ok(None) => {}
            Err(err) => {
                log::warn!("theme preference load failed, using defaults: {err}");
                self.preference = ThemePreference::default();
            }
        }

        let active = self.preference.active_theme.clone();
        if active != THEME_AUTO && self.definition(&active).is_none() {
            log::warn!("persisted theme `{active}` is not registered, reverting to light");
            self.preference.active_theme = THEME_LIGHT.to_string();
        }

        if self.signals.prefers_reduced_motion() {
            self.preference.reduced_motion = true;
            self.preference.transition_duration_ms = 0;
        }
        if self.signals.prefers_high_contrast() {
            self.preference.high_contrast = true;
        }

        let resolved = self.resolved_theme_id();
        if let Err(err) = self.apply_bundle(&resolved, false) {
            log::warn!("initial theme application failed: {err}");
        }
    }

    /// The theme actually displayed: the preference, or for `auto` the
    /// built-in matching the environment's dark-mode signal.
    pub fn resolved_theme_id(&self) -> String {
        if self.preference.active_theme == THEME_AUTO {
            if self.signals.prefers_dark() {
                THEME_DARK.to_string()
            } else {
                THEME_LIGHT.to_string()
            }
        } else {
            self.preference.active_theme.clone()
        }
    }

    pub fn preference(&self) -> &ThemePreference {
        &self.preference
    }

    /// Switch to a registered theme (or `auto`): writes every variable of the
    /// bundle to every target, updates the theme tag, persists the preference
    /// wholesale and notifies subscribers. An unknown id fails before any of
    /// that happens.
    pub fn apply_theme(&mut self, id: &str) -> Result<(), ConsoleError> {
        let resolved = if id == THEME_AUTO {
            self.preference.active_theme = THEME_AUTO.to_string();
            self.resolved_theme_id()
        } else {
            if self.definition(id).is_none() {
                return Err(ConsoleError::UnknownTheme(id.to_string()));
            }
            self.preference.active_theme = id.to_string();
            id.to_string()
        };
        self.persist_preference();
        self.apply_bundle(&resolved, true)
    }

    /// Flip between light and dark. From `auto`, the resolved theme is the
    /// base: a user on auto-dark toggles to explicit light.
    pub fn toggle_theme(&mut self) -> Result<(), ConsoleError> {
        let next = if self.resolved_theme_id() == THEME_LIGHT {
            THEME_DARK
        } else {
            THEME_LIGHT
        };
        self.apply_theme(next)
    }

    /// Re-resolve after the environment's dark-mode signal flipped. Only
    /// meaningful while the preference is `auto`; the persisted preference is
    /// left untouched so the next flip re-resolves again.
    pub fn on_system_scheme_change(&mut self) -> Result<(), ConsoleError> {
        if self.preference.active_theme != THEME_AUTO {
            return Ok(());
        }
        let resolved = self.resolved_theme_id();
        self.apply_bundle(&resolved, true)
    }

    pub fn on_reduced_motion_change(&mut self, reduced: bool) {
        self.preference.reduced_motion = reduced;
        self.preference.transition_duration_ms =
            if reduced { 0 } else { DEFAULT_TRANSITION_MS };
        self.persist_preference();
    }

    pub fn on_high_contrast_change(&mut self, high: bool) -> Result<(), ConsoleError> {
        self.preference.high_contrast = high;
        self.persist_preference();
        let resolved = self.resolved_theme_id();
        self.apply_bundle(&resolved, true)
    }

    pub fn set_animations_enabled(&mut self, enabled: bool) {
        self.preference.animations_enabled = enabled;
        self.persist_preference();
    }

    pub fn set_transition_duration(&mut self, duration_ms: u64) {
        self.preference.transition_duration_ms = duration_ms;
        self.persist_preference();
    }

    /// Attach a target and immediately bring it up to date with the current
    /// theme (no transition). Returns a handle for [`ThemeEngine::deregister_target`].
    pub fn register_target(&mut self, mut target: Box<dyn PresentationTarget>) -> u64 {
        let resolved = self.resolved_theme_id();
        if let Some(theme) = self.definition(&resolved) {
            for (name, value) in &theme.variables {
                target.set_variable(name, value);
            }
            target.set_theme_tag(&theme_tag(&resolved));
        }
        self.next_target_id += 1;
        let id = self.next_target_id;
        self.targets.lock().push(TargetSlot { id, target });
        id
    }

    pub fn deregister_target(&mut self, id: u64) {
        self.targets.lock().retain(|slot| slot.id != id);
    }

    /// Register an additional theme definition. Built-ins and previously
    /// registered ids cannot be replaced.
    pub fn register_theme(&mut self, theme: ThemeDefinition) -> Result<(), ConsoleError> {
        if self.definition(&theme.id).is_some() {
            return Err(ConsoleError::invalid_format(
                "theme",
                format!("theme `{}` is already registered", theme.id),
            ));
        }
        self.themes.push(theme);
        Ok(())
    }

    /// Catalog of registered themes, in registration order.
    pub fn available_themes(&self) -> Vec<ThemeSummary> {
        self.themes
            .iter()
            .map(|t| ThemeSummary {
                id: t.id.clone(),
                display_name: t.display_name.clone(),
                icon_ref: t.icon_ref.clone(),
            })
            .collect()
    }

    /// Semantic color (e.g. `accent`, `danger`) from the resolved bundle,
    /// falling back to the fixed palette for names no bundle defines.
    pub fn theme_color(&self, name: &str) -> String {
        let resolved = self.resolved_theme_id();
        if let Some(theme) = self.definition(&resolved) {
            if let Some(value) = theme.variables.get(&format!("--{name}-color")) {
                return value.clone();
            }
        }
        FALLBACK_COLORS
            .get(name)
            .map(|c| (*c).to_string())
            .unwrap_or_else(|| "#000000".to_string())
    }

    /// Cancel any pending transition timer and wait for it. Targets keep
    /// whatever state was last written.
    pub fn dispose(&mut self) {
        self.transition_epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.timer.take() {
            let _ = handle.join();
        }
    }

    fn definition(&self, id: &str) -> Option<&ThemeDefinition> {
        self.themes.iter().find(|t| t.id == id)
    }

    fn apply_bundle(&mut self, id: &str, notify: bool) -> Result<(), ConsoleError> {
        let theme = self
            .definition(id)
            .ok_or_else(|| ConsoleError::UnknownTheme(id.to_string()))?
            .clone();

        let animate = self.preference.animations_enabled
            && !self.preference.reduced_motion
            && self.preference.transition_duration_ms > 0;
        let duration = self.preference.transition_duration_ms;

        {
            let mut targets = self.targets.lock();
            for slot in targets.iter_mut() {
                if animate {
                    slot.target.set_transition(duration);
                }
                for (name, value) in &theme.variables {
                    slot.target.set_variable(name, value);
                }
                slot.target.set_theme_tag(&theme_tag(id));
            }
        }

        if notify {
            self.bus.publish(Notification::ThemeChanged {
                theme: id.to_string(),
                timestamp: timestamp_now(),
            });
        }
        if animate {
            self.schedule_transition_clear(duration);
        }
        Ok(())
    }

    fn schedule_transition_clear(&mut self, duration_ms: u64) {
        let epoch = self.transition_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let epoch_handle = Arc::clone(&self.transition_epoch);
        let targets = Arc::clone(&self.targets);
        self.timer = Some(thread::spawn(move || {
            thread::sleep(Duration::from_millis(duration_ms));
            if epoch_handle.load(Ordering::SeqCst) != epoch {
                // Superseded by a newer theme change (or dispose).
                return;
            }
            for slot in targets.lock().iter_mut() {
                slot.target.clear_transition();
            }
        }));
    }

    fn persist_preference(&mut self) {
        match serde_json::to_string(&self.preference) {
            Ok(text) => {
                if let Err(err) = self.store.put(THEME_PREF_KEY, &text) {
                    log::warn!("theme preference persist failed: {err}");
                }
            }
            Err(err) => log::warn!("theme preference serialize failed: {err}"),
        }
    }
}

impl Drop for ThemeEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn theme_tag(id: &str) -> String {
    format!("{id}-theme")
}
