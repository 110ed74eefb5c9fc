//! Persisted theme preference and environment accessibility signals.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::definitions::THEME_LIGHT;

/// Default cross-fade duration in milliseconds.
pub const DEFAULT_TRANSITION_MS: u64 = 300;

/// Everything the engine persists between sessions, written wholesale on
/// every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemePreference {
    pub active_theme: String,
    pub transition_duration_ms: u64,
    pub animations_enabled: bool,
    pub high_contrast: bool,
    pub reduced_motion: bool,
}

impl Default for ThemePreference {
    fn default() -> Self {
        Self {
            active_theme: THEME_LIGHT.to_string(),
            transition_duration_ms: DEFAULT_TRANSITION_MS,
            animations_enabled: true,
            high_contrast: false,
            reduced_motion: false,
        }
    }
}

/// Host-environment signals the engine folds into its behavior: dark-mode
/// resolution for the `auto` preference and the two accessibility hints.
pub trait EnvironmentSignals: Send {
    fn prefers_dark(&self) -> bool;
    fn prefers_reduced_motion(&self) -> bool;
    fn prefers_high_contrast(&self) -> bool;
}

/// Signals for hosts with nothing to report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSignals;

impl EnvironmentSignals for NoSignals {
    fn prefers_dark(&self) -> bool {
        false
    }
    fn prefers_reduced_motion(&self) -> bool {
        false
    }
    fn prefers_high_contrast(&self) -> bool {
        false
    }
}

#[derive(Debug, Default)]
struct SignalState {
    dark: bool,
    reduced_motion: bool,
    high_contrast: bool,
}

/// Mutable signals, shared between the engine and the host loop that feeds
/// environment changes into it. Also the test double for signal changes.
#[derive(Debug, Clone, Default)]
pub struct SharedSignals(Arc<Mutex<SignalState>>);

impl SharedSignals {
    pub fn new(dark: bool, reduced_motion: bool, high_contrast: bool) -> Self {
        Self(Arc::new(Mutex::new(SignalState {
            dark,
            reduced_motion,
            high_contrast,
        })))
    }

    pub fn set_dark(&self, dark: bool) {
        self.0.lock().dark = dark;
    }

    pub fn set_reduced_motion(&self, reduced: bool) {
        self.0.lock().reduced_motion = reduced;
    }

    pub fn set_high_contrast(&self, high: bool) {
        self.0.lock().high_contrast = high;
    }
}

impl EnvironmentSignals for SharedSignals {
    fn prefers_dark(&self) -> bool {
        self.0.lock().dark
    }
    fn prefers_reduced_motion(&self) -> bool {
        self.0.lock().reduced_motion
    }
    fn prefers_high_contrast(&self) -> bool {
        self.0.lock().high_contrast
    }
}

/// Signals sourced from environment variables, for headless CLI runs.
/// `SMBGW_DARK_MODE`, `SMBGW_REDUCED_MOTION` and `SMBGW_HIGH_CONTRAST` are
/// read once at construction; any of `1`, `true` or `on` enables the signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvVarSignals {
    dark: bool,
    reduced_motion: bool,
    high_contrast: bool,
}

impl EnvVarSignals {
    pub fn from_env() -> Self {
        Self {
            dark: env_flag("SMBGW_DARK_MODE"),
            reduced_motion: env_flag("SMBGW_REDUCED_MOTION"),
            high_contrast: env_flag("SMBGW_HIGH_CONTRAST"),
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim(), "1" | "true" | "on"))
        .unwrap_or(false)
}

impl EnvironmentSignals for EnvVarSignals {
    fn prefers_dark(&self) -> bool {
        self.dark
    }
    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }
    fn prefers_high_contrast(&self) -> bool {
        self.high_contrast
    }
}
