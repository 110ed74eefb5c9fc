//! Built-in theme definitions.
//!
//! A theme is an immutable bundle of presentation variables plus catalog
//! metadata. The `light` and `dark` bundles are fixed at engine construction;
//! additional definitions can be registered but never replace an existing id.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Identifier of the light built-in.
pub const THEME_LIGHT: &str = "light";
/// Identifier of the dark built-in.
pub const THEME_DARK: &str = "dark";
/// Sentinel preference value: resolve via the environment's dark-mode signal.
pub const THEME_AUTO: &str = "auto";

/// One registered theme: identifier, catalog metadata and the full variable
/// bundle applied to presentation targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeDefinition {
    pub id: String,
    pub display_name: String,
    pub icon_ref: String,
    pub variables: BTreeMap<String, String>,
}

/// Catalog listing entry (id + display metadata, without the bundle).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeSummary {
    pub id: String,
    pub display_name: String,
    pub icon_ref: String,
}

fn bundle(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// The two built-in bundles, in catalog order.
pub fn builtin_themes() -> Vec<ThemeDefinition> {
    vec![
        ThemeDefinition {
            id: THEME_LIGHT.to_string(),
            display_name: "Light".to_string(),
            icon_ref: "fa fa-sun-o".to_string(),
            variables: bundle(&[
                ("--dashboard-bg", "#f5f5f5"),
                ("--sidebar-bg", "#ffffff"),
                ("--sidebar-header-bg", "#f8f9fa"),
                ("--sidebar-header-color", "#333333"),
                ("--panel-bg", "#ffffff"),
                ("--panel-border", "#e0e0e0"),
                ("--panel-shadow", "0 1px 3px rgba(0, 0, 0, 0.1)"),
                ("--metric-panel-bg", "#ffffff"),
                ("--metric-header-bg", "#f8f9fa"),
                ("--metric-header-color", "#333333"),
                ("--metric-value-color", "#2c3e50"),
                ("--chart-panel-bg", "#ffffff"),
                ("--chart-bg", "#fafafa"),
                ("--chart-border", "#e0e0e0"),
                ("--alerts-panel-bg", "#ffffff"),
                ("--alerts-sidebar-bg", "#ffffff"),
                ("--alert-bg", "#f8f9fa"),
                ("--alert-critical-bg", "rgba(231, 76, 60, 0.1)"),
                ("--alert-warning-bg", "rgba(243, 156, 18, 0.1)"),
                ("--alert-info-bg", "rgba(52, 152, 219, 0.1)"),
                ("--logs-panel-bg", "#ffffff"),
                ("--log-bg", "#1e1e1e"),
                ("--log-text", "#d4d4d4"),
                ("--monitoring-panel-bg", "#ffffff"),
                ("--border-color", "#e0e0e0"),
                ("--text-primary", "#333333"),
                ("--text-secondary", "#666666"),
                ("--text-muted", "#6c757d"),
                ("--accent-color", "#667eea"),
                ("--accent-hover-color", "#5a6fd8"),
                ("--success-color", "#28a745"),
                ("--warning-color", "#ffc107"),
                ("--danger-color", "#dc3545"),
                ("--info-color", "#17a2b8"),
            ]),
        },
        ThemeDefinition {
            id: THEME_DARK.to_string(),
            display_name: "Dark".to_string(),
            icon_ref: "fa fa-moon-o".to_string(),
            variables: bundle(&[
                ("--dashboard-bg", "#1a1a1a"),
                ("--sidebar-bg", "#2d2d2d"),
                ("--sidebar-header-bg", "#3d3d3d"),
                ("--sidebar-header-color", "#ffffff"),
                ("--panel-bg", "#2d2d2d"),
                ("--panel-border", "#404040"),
                ("--panel-shadow", "0 1px 3px rgba(0, 0, 0, 0.3)"),
                ("--metric-panel-bg", "#2d2d2d"),
                ("--metric-header-bg", "#3d3d3d"),
                ("--metric-header-color", "#ffffff"),
                ("--metric-value-color", "#ffffff"),
                ("--chart-panel-bg", "#2d2d2d"),
                ("--chart-bg", "#1a1a1a"),
                ("--chart-border", "#404040"),
                ("--alerts-panel-bg", "#2d2d2d"),
                ("--alerts-sidebar-bg", "#2d2d2d"),
                ("--alert-bg", "#3d3d3d"),
                ("--alert-critical-bg", "rgba(231, 76, 60, 0.2)"),
                ("--alert-warning-bg", "rgba(243, 156, 18, 0.2)"),
                ("--alert-info-bg", "rgba(52, 152, 219, 0.2)"),
                ("--logs-panel-bg", "#2d2d2d"),
                ("--log-bg", "#0d1117"),
                ("--log-text", "#c9d1d9"),
                ("--monitoring-panel-bg", "#2d2d2d"),
                ("--border-color", "#404040"),
                ("--text-primary", "#ffffff"),
                ("--text-secondary", "#cccccc"),
                ("--text-muted", "#888888"),
                ("--accent-color", "#667eea"),
                ("--accent-hover-color", "#5a6fd8"),
                ("--success-color", "#28a745"),
                ("--warning-color", "#ffc107"),
                ("--danger-color", "#dc3545"),
                ("--info-color", "#17a2b8"),
            ]),
        },
    ]
}

/// Semantic colors used when the active bundle has no matching variable.
pub static FALLBACK_COLORS: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("accent", "#667eea"),
        ("success", "#28a745"),
        ("warning", "#ffc107"),
        ("danger", "#dc3545"),
        ("info", "#17a2b8"),
        ("primary", "#007bff"),
        ("secondary", "#6c757d"),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_cover_light_and_dark() {
        let themes = builtin_themes();
        assert_eq!(themes.len(), 2);
        assert_eq!(themes[0].id, THEME_LIGHT);
        assert_eq!(themes[1].id, THEME_DARK);
        // Both bundles define the same variable set.
        let light: Vec<&String> = themes[0].variables.keys().collect();
        let dark: Vec<&String> = themes[1].variables.keys().collect();
        assert_eq!(light, dark);
    }
}
