//! Presentation target seam.
//!
//! The engine never touches a rendering surface directly; it writes variable
//! bundles through this trait so the same state logic drives a real surface,
//! a log, or a recording double in tests.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// A surface that receives theme output: named variables, the active-theme
/// tag, and the cross-fade transition window.
pub trait PresentationTarget: Send {
    fn set_variable(&mut self, name: &str, value: &str);
    fn set_theme_tag(&mut self, tag: &str);
    /// Enable a cross-fade of the given duration for subsequent writes.
    fn set_transition(&mut self, duration_ms: u64);
    /// Remove the cross-fade once the transition window has elapsed.
    fn clear_transition(&mut self);
}

/// Target that logs every write at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTarget;

impl PresentationTarget for LogTarget {
    fn set_variable(&mut self, name: &str, value: &str) {
        log::debug!("theme var {name} = {value}");
    }

    fn set_theme_tag(&mut self, tag: &str) {
        log::debug!("theme tag -> {tag}");
    }

    fn set_transition(&mut self, duration_ms: u64) {
        log::debug!("theme transition on ({duration_ms}ms)");
    }

    fn clear_transition(&mut self) {
        log::debug!("theme transition off");
    }
}

#[derive(Debug, Default)]
struct Recorded {
    variables: Vec<(String, String)>,
    tags: Vec<String>,
    transitions: Vec<u64>,
    clears: usize,
}

/// Target that records every write for assertions. Clones share state, so a
/// test can keep a handle while the engine owns the boxed target.
#[derive(Clone, Default)]
pub struct RecordingTarget(Arc<Mutex<Recorded>>);

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(name, value)` written, in order.
    pub fn variables(&self) -> Vec<(String, String)> {
        self.0.lock().variables.clone()
    }

    /// Last value written for one variable.
    pub fn variable(&self, name: &str) -> Option<String> {
        self.0
            .lock()
            .variables
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn last_tag(&self) -> Option<String> {
        self.0.lock().tags.last().cloned()
    }

    pub fn transitions(&self) -> Vec<u64> {
        self.0.lock().transitions.clone()
    }

    pub fn clear_count(&self) -> usize {
        self.0.lock().clears
    }

    pub fn write_count(&self) -> usize {
        let state = self.0.lock();
        state.variables.len() + state.tags.len() + state.transitions.len() + state.clears
    }
}

impl fmt::Debug for RecordingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0.lock();
        f.debug_struct("RecordingTarget")
            .field("variables", &state.variables.len())
            .field("tags", &state.tags)
            .finish()
    }
}

impl PresentationTarget for RecordingTarget {
    fn set_variable(&mut self, name: &str, value: &str) {
        self.0
            .lock()
            .variables
            .push((name.to_string(), value.to_string()));
    }

    fn set_theme_tag(&mut self, tag: &str) {
        self.0.lock().tags.push(tag.to_string());
    }

    fn set_transition(&mut self, duration_ms: u64) {
        self.0.lock().transitions.push(duration_ms);
    }

    fn clear_transition(&mut self) {
        self.0.lock().clears += 1;
    }
}
