//! Dashboard widget layout: catalog, geometry and persistence.
//!
//! The layout store keeps one entry per placed widget and writes the whole
//! map back to storage on every change, so a reload always sees the last
//! complete layout. A corrupt stored document degrades to an empty layout
//! instead of failing startup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::bus::{timestamp_now, EventBus, Notification};
use crate::error::ConsoleError;
use crate::store::{KeyValueStore, WIDGET_LAYOUT_KEY};

/// Widget kinds the dashboard can place.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    Metric,
    Chart,
    Alerts,
    Logs,
    QuickActions,
    SystemStatus,
}

/// Catalog metadata for one widget kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetInfo {
    pub kind: WidgetKind,
    pub name: &'static str,
    pub description: &'static str,
    pub icon_ref: &'static str,
    pub category: &'static str,
}

impl WidgetKind {
    pub fn info(self) -> WidgetInfo {
        let (name, description, icon_ref, category) = match self {
            WidgetKind::Metric => (
                "Metric Widget",
                "Display a single metric with trend",
                "fa fa-tachometer",
                "monitoring",
            ),
            WidgetKind::Chart => (
                "Chart Widget",
                "Display charts and graphs",
                "fa fa-bar-chart",
                "monitoring",
            ),
            WidgetKind::Alerts => (
                "Alerts Widget",
                "Display recent alerts",
                "fa fa-exclamation-triangle",
                "monitoring",
            ),
            WidgetKind::Logs => (
                "Logs Widget",
                "Display recent log entries",
                "fa fa-file-text-o",
                "monitoring",
            ),
            WidgetKind::QuickActions => (
                "Quick Actions",
                "Quick action buttons",
                "fa fa-bolt",
                "actions",
            ),
            WidgetKind::SystemStatus => (
                "System Status",
                "Display system status overview",
                "fa fa-server",
                "monitoring",
            ),
        };
        WidgetInfo {
            kind: self,
            name,
            description,
            icon_ref,
            category,
        }
    }

    /// Initial size when the widget is first placed.
    pub fn default_size(self) -> Size {
        Size {
            width: 300,
            height: 200,
        }
    }
}

/// The full widget catalog, in display order.
pub fn widget_catalog() -> Vec<WidgetInfo> {
    WidgetKind::iter().map(WidgetKind::info).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// Everything persisted for one placed widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetLayoutEntry {
    pub widget_kind: WidgetKind,
    #[serde(default)]
    pub config: serde_json::Value,
    pub position: Position,
    pub size: Size,
}

/// Placement limits for the dashboard grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub max_widgets: usize,
    pub snap_grid: i32,
    pub widget_spacing: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_widgets: 20,
            snap_grid: 10,
            widget_spacing: 10,
        }
    }
}

impl LayoutConfig {
    /// Snap a coordinate to the grid (nearest multiple of `snap_grid`).
    pub fn snap(&self, value: i32) -> i32 {
        if self.snap_grid <= 0 {
            return value;
        }
        let grid = self.snap_grid;
        ((value + grid / 2).div_euclid(grid)) * grid
    }
}

/// Persistent widget layout map, keyed by widget instance id.
pub struct LayoutStore {
    entries: BTreeMap<String, WidgetLayoutEntry>,
    store: Box<dyn KeyValueStore>,
    config: LayoutConfig,
}

impl LayoutStore {
    /// Load the persisted layout map. An unreadable or corrupt document is
    /// logged and replaced with an empty layout.
    pub fn load(store: Box<dyn KeyValueStore>, config: LayoutConfig) -> Self {
        let entries = match store.get(WIDGET_LAYOUT_KEY) {
            Ok(Some(text)) => match serde_json::from_str(&text) {
                Ok(map) => map,
                Err(err) => {
                    log::warn!("stored widget layout unreadable, starting empty: {err}");
                    BTreeMap::new()
                }
            },
            Ok(None) => BTreeMap::new(),
            Err(err) => {
                log::warn!("widget layout load failed, starting empty: {err}");
                BTreeMap::new()
            }
        };
        Self {
            entries,
            store,
            config,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn get(&self, widget_id: &str) -> Option<&WidgetLayoutEntry> {
        self.entries.get(widget_id)
    }

    pub fn entries(&self) -> &BTreeMap<String, WidgetLayoutEntry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or update one widget's layout and write the whole map through
    /// to storage. Placing a new widget beyond the configured maximum fails
    /// without touching memory or storage; updates to already-placed widgets
    /// always go through.
    pub fn save_layout(
        &mut self,
        widget_id: &str,
        mut entry: WidgetLayoutEntry,
    ) -> Result<(), ConsoleError> {
        if !self.entries.contains_key(widget_id) && self.entries.len() >= self.config.max_widgets {
            return Err(ConsoleError::LayoutFull {
                max: self.config.max_widgets,
            });
        }
        entry.position.x = self.config.snap(entry.position.x);
        entry.position.y = self.config.snap(entry.position.y);
        self.entries.insert(widget_id.to_string(), entry);
        self.persist()
    }

    /// Remove one widget's layout; removing an unknown id is a no-op.
    pub fn remove_layout(&mut self, widget_id: &str) -> Result<(), ConsoleError> {
        if self.entries.remove(widget_id).is_none() {
            return Ok(());
        }
        self.persist()
    }

    /// Drop every placed widget and clear the stored document.
    pub fn clear(&mut self) -> Result<(), ConsoleError> {
        self.entries.clear();
        self.store.remove(WIDGET_LAYOUT_KEY)
    }

    fn persist(&mut self) -> Result<(), ConsoleError> {
        let text = serde_json::to_string(&self.entries).map_err(|err| {
            ConsoleError::storage(WIDGET_LAYOUT_KEY, format!("serialize layout: {err}"))
        })?;
        self.store.put(WIDGET_LAYOUT_KEY, &text)
    }
}

/// Broadcast a widget-initiated action (refresh, share creation shortcut,
/// backup trigger) to the rest of the console.
pub fn trigger_action(bus: &EventBus, action: &str) {
    bus.publish(Notification::WidgetAction {
        action: action.to_string(),
        timestamp: timestamp_now(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn entry(kind: WidgetKind, x: i32, y: i32) -> WidgetLayoutEntry {
        WidgetLayoutEntry {
            widget_kind: kind,
            config: serde_json::json!({}),
            position: Position { x, y },
            size: kind.default_size(),
        }
    }

    #[test]
    fn save_and_reload_round_trips() {
        let store = MemoryStore::new();
        let mut layout = LayoutStore::load(Box::new(store.clone()), LayoutConfig::default());
        layout
            .save_layout("widget-1", entry(WidgetKind::Metric, 40, 80))
            .unwrap();
        layout
            .save_layout("widget-2", entry(WidgetKind::Chart, 400, 80))
            .unwrap();

        let reloaded = LayoutStore::load(Box::new(store), LayoutConfig::default());
        assert_eq!(reloaded.len(), 2);
        assert_eq!(
            reloaded.get("widget-1").unwrap().widget_kind,
            WidgetKind::Metric
        );
        assert_eq!(reloaded.get("widget-2").unwrap().position, Position { x: 400, y: 80 });
    }

    #[test]
    fn positions_snap_to_the_grid() {
        let mut layout =
            LayoutStore::load(Box::new(MemoryStore::new()), LayoutConfig::default());
        layout
            .save_layout("w", entry(WidgetKind::Logs, 43, 87))
            .unwrap();
        assert_eq!(layout.get("w").unwrap().position, Position { x: 40, y: 90 });
    }

    #[test]
    fn layout_full_rejects_new_but_allows_updates() {
        let config = LayoutConfig {
            max_widgets: 2,
            ..LayoutConfig::default()
        };
        let mut layout = LayoutStore::load(Box::new(MemoryStore::new()), config);
        layout.save_layout("a", entry(WidgetKind::Metric, 0, 0)).unwrap();
        layout.save_layout("b", entry(WidgetKind::Chart, 0, 0)).unwrap();

        let err = layout
            .save_layout("c", entry(WidgetKind::Alerts, 0, 0))
            .unwrap_err();
        assert_eq!(err, ConsoleError::LayoutFull { max: 2 });

        // Moving an existing widget is still allowed at the cap.
        layout.save_layout("a", entry(WidgetKind::Metric, 100, 0)).unwrap();
        assert_eq!(layout.get("a").unwrap().position.x, 100);
    }

    #[test]
    fn corrupt_document_degrades_to_empty() {
        let store = MemoryStore::with_entry(WIDGET_LAYOUT_KEY, "[[[ not json");
        let layout = LayoutStore::load(Box::new(store), LayoutConfig::default());
        assert!(layout.is_empty());
    }

    #[test]
    fn remove_unknown_id_is_a_no_op() {
        let store = MemoryStore::new();
        let mut layout = LayoutStore::load(Box::new(store.clone()), LayoutConfig::default());
        layout.save_layout("a", entry(WidgetKind::Metric, 0, 0)).unwrap();
        layout.remove_layout("missing").unwrap();
        layout.remove_layout("a").unwrap();
        assert!(layout.is_empty());

        let reloaded = LayoutStore::load(Box::new(store), LayoutConfig::default());
        assert!(reloaded.is_empty());
    }

    #[test]
    fn catalog_covers_every_kind() {
        let catalog = widget_catalog();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog[0].kind, WidgetKind::Metric);
        assert_eq!(WidgetKind::QuickActions.to_string(), "quick-actions");
        assert_eq!(
            WidgetKind::SystemStatus.default_size(),
            Size { width: 300, height: 200 }
        );
    }

    #[test]
    fn widget_actions_reach_subscribers() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();
        trigger_action(&bus, "refresh-metrics");
        match sub.try_recv().unwrap() {
            Notification::WidgetAction { action, .. } => assert_eq!(action, "refresh-metrics"),
            other => panic!("unexpected notification: {other:?}"),
        }
    }
}
