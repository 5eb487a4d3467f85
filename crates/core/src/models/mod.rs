//! Shared domain models for the launcher.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Icon shown next to a monitor profile in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorIcon {
    /// Desktop monitor.
    #[default]
    Monitor,
    /// Television.
    Tv,
    /// Projector.
    Projector,
    /// Generic secondary display.
    Display,
}

impl MonitorIcon {
    /// All icon kinds, in picker order.
    pub const ALL: [MonitorIcon; 4] = [
        MonitorIcon::Monitor,
        MonitorIcon::Tv,
        MonitorIcon::Projector,
        MonitorIcon::Display,
    ];

    /// Human readable icon name.
    pub fn label(self) -> &'static str {
        match self {
            MonitorIcon::Monitor => "Monitor",
            MonitorIcon::Tv => "TV",
            MonitorIcon::Projector => "Projector",
            MonitorIcon::Display => "Display",
        }
    }
}

/// A named display target games can be launched on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorProfile {
    /// Stable identifier, generated at creation time.
    pub id: String,
    /// User-facing name, e.g. `TV 4K`.
    pub name: String,
    /// Resolution string, e.g. `3840x2160`.
    pub resolution: String,
    /// Icon kind shown in the sidebar.
    pub icon: MonitorIcon,
}

/// Mechanism used to enforce a frame-rate cap on a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FpsMethod {
    /// The game's built-in limiter.
    #[default]
    Auto,
    /// Nvidia control panel limiter.
    Nvidia,
    /// RivaTuner Statistics Server.
    Rtss,
}

impl FpsMethod {
    /// All methods, in toggle order.
    pub const ALL: [FpsMethod; 3] = [FpsMethod::Auto, FpsMethod::Nvidia, FpsMethod::Rtss];

    /// Display label matching the settings toggle.
    pub fn label(self) -> &'static str {
        match self {
            FpsMethod::Auto => "Auto",
            FpsMethod::Nvidia => "Nvidia",
            FpsMethod::Rtss => "RTSS",
        }
    }
}

/// Whether a config entry maps a single file or a whole folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Single configuration file.
    #[default]
    File,
    /// Directory of configuration files.
    Folder,
}

impl EntryKind {
    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Folder => "folder",
        }
    }
}

/// A config file/folder swapped into the game tree before launch.
///
/// Owned by exactly one [`Game`]; entries are never shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Stable identifier within the owning game.
    pub id: String,
    /// File or folder.
    pub kind: EntryKind,
    /// Display name, e.g. `graphics.ini`.
    pub name: String,
    /// Key = monitor profile id, value = source path for that monitor.
    /// An empty string means "not configured".
    #[serde(default)]
    pub source_paths: HashMap<String, String>,
    /// Destination inside the game's own tree.
    pub target_path: String,
}

impl ConfigEntry {
    /// Create an empty entry of the given kind with one blank source slot
    /// per current monitor.
    pub fn new(kind: EntryKind, monitors: &[MonitorProfile]) -> Self {
        let source_paths = monitors
            .iter()
            .map(|monitor| (monitor.id.clone(), String::new()))
            .collect();
        Self {
            id: fresh_id("cfg"),
            kind,
            name: match kind {
                EntryKind::File => "new_config.ini".to_string(),
                EntryKind::Folder => "new_folder".to_string(),
            },
            source_paths,
            target_path: String::new(),
        }
    }

    /// Source path configured for a monitor, empty when unset.
    pub fn source_for(&self, monitor_id: &str) -> &str {
        self.source_paths
            .get(monitor_id)
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// A game in the library with its per-monitor launch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Stable identifier, generated at creation time.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Path to the executable that would be started.
    pub executable_path: String,
    /// Cover image path or URL.
    pub cover_image: String,
    /// Key = monitor profile id, value = FPS cap (`None` = unlimited).
    #[serde(default)]
    pub fps_locks: HashMap<String, Option<i64>>,
    /// Key = monitor profile id, value = cap enforcement method.
    #[serde(default)]
    pub fps_methods: HashMap<String, FpsMethod>,
    /// Config files/folders swapped in before launch, in display order.
    #[serde(default)]
    pub config_entries: Vec<ConfigEntry>,
    /// Date the game was last launched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_played: Option<NaiveDate>,
    /// Total hours played.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_playtime: Option<f64>,
}

impl Game {
    /// A blank game with all per-monitor maps backfilled.
    pub fn new(monitors: &[MonitorProfile]) -> Self {
        let mut game = Self {
            id: fresh_id("game"),
            name: "New Game".to_string(),
            executable_path: String::new(),
            cover_image: "/images/game-1.jpg".to_string(),
            fps_locks: HashMap::new(),
            fps_methods: HashMap::new(),
            config_entries: Vec::new(),
            last_played: None,
            total_playtime: None,
        };
        game.normalize_for(monitors);
        game
    }

    /// FPS cap for a monitor, `None` meaning unlimited.
    pub fn fps_lock_for(&self, monitor_id: &str) -> Option<i64> {
        self.fps_locks.get(monitor_id).copied().flatten()
    }

    /// Cap method for a monitor, defaulting to [`FpsMethod::Auto`].
    pub fn fps_method_for(&self, monitor_id: &str) -> FpsMethod {
        self.fps_methods.get(monitor_id).copied().unwrap_or_default()
    }

    /// Make every per-monitor map exactly keyed by the given monitor set.
    ///
    /// Missing keys are filled with unlimited/auto/blank defaults and keys
    /// for monitors outside the set are dropped; existing values are left
    /// untouched. Dropping matters for working copies taken before a
    /// monitor was removed: saving one must not resurrect its keys.
    pub fn normalize_for(&mut self, monitors: &[MonitorProfile]) {
        let known = |id: &String| monitors.iter().any(|monitor| monitor.id == *id);
        self.fps_locks.retain(|id, _| known(id));
        self.fps_methods.retain(|id, _| known(id));
        for entry in &mut self.config_entries {
            entry.source_paths.retain(|id, _| known(id));
        }
        for monitor in monitors {
            self.fps_locks.entry(monitor.id.clone()).or_insert(None);
            self.fps_methods.entry(monitor.id.clone()).or_default();
            for entry in &mut self.config_entries {
                entry.source_paths.entry(monitor.id.clone()).or_default();
            }
        }
    }

    /// Drop per-monitor map keys for a monitor that no longer exists.
    pub fn prune_monitor(&mut self, monitor_id: &str) {
        self.fps_locks.remove(monitor_id);
        self.fps_methods.remove(monitor_id);
        for entry in &mut self.config_entries {
            entry.source_paths.remove(monitor_id);
        }
    }
}

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique id with the given prefix.
///
/// Combines a millisecond timestamp with a process-wide counter so ids
/// minted within the same millisecond stay distinct.
pub fn fresh_id(prefix: &str) -> String {
    let serial = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{serial}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(id: &str) -> MonitorProfile {
        MonitorProfile {
            id: id.to_string(),
            name: id.to_uppercase(),
            resolution: "1920x1080".to_string(),
            icon: MonitorIcon::Monitor,
        }
    }

    #[test]
    fn missing_method_defaults_to_auto() {
        let mut game = Game::new(&[]);
        game.fps_locks.insert("m1".to_string(), Some(60));
        assert_eq!(game.fps_method_for("m1"), FpsMethod::Auto);
        assert_eq!(game.fps_lock_for("m1"), Some(60));
        assert_eq!(game.fps_lock_for("m2"), None);
    }

    #[test]
    fn normalize_backfills_every_map() {
        let monitors = [monitor("m1"), monitor("m2")];
        let mut game = Game::new(&monitors[..1]);
        game.config_entries
            .push(ConfigEntry::new(EntryKind::File, &monitors[..1]));
        game.normalize_for(&monitors);

        assert_eq!(game.fps_locks.get("m2"), Some(&None));
        assert_eq!(game.fps_methods.get("m2"), Some(&FpsMethod::Auto));
        assert_eq!(game.config_entries[0].source_for("m2"), "");
    }

    #[test]
    fn normalize_preserves_existing_values() {
        let monitors = [monitor("m1")];
        let mut game = Game::new(&monitors);
        game.fps_locks.insert("m1".to_string(), Some(144));
        game.fps_methods.insert("m1".to_string(), FpsMethod::Rtss);
        game.normalize_for(&monitors);
        assert_eq!(game.fps_lock_for("m1"), Some(144));
        assert_eq!(game.fps_method_for("m1"), FpsMethod::Rtss);
    }

    #[test]
    fn normalize_drops_keys_for_unknown_monitors() {
        let monitors = [monitor("m1")];
        let mut game = Game::new(&monitors);
        game.config_entries
            .push(ConfigEntry::new(EntryKind::File, &monitors));
        game.fps_locks.insert("gone".to_string(), Some(30));
        game.fps_methods.insert("gone".to_string(), FpsMethod::Nvidia);
        game.config_entries[0]
            .source_paths
            .insert("gone".to_string(), "C:\\Configs\\old.ini".to_string());

        game.normalize_for(&monitors);

        assert!(!game.fps_locks.contains_key("gone"));
        assert!(!game.fps_methods.contains_key("gone"));
        assert!(!game.config_entries[0].source_paths.contains_key("gone"));
        assert_eq!(game.fps_locks.len(), 1);
    }

    #[test]
    fn prune_removes_orphaned_keys() {
        let monitors = [monitor("m1"), monitor("m2")];
        let mut game = Game::new(&monitors);
        game.config_entries
            .push(ConfigEntry::new(EntryKind::Folder, &monitors));
        game.prune_monitor("m2");
        assert!(!game.fps_locks.contains_key("m2"));
        assert!(!game.fps_methods.contains_key("m2"));
        assert!(!game.config_entries[0].source_paths.contains_key("m2"));
    }

    #[test]
    fn fresh_ids_are_unique() {
        let a = fresh_id("cfg");
        let b = fresh_id("cfg");
        assert_ne!(a, b);
        assert!(a.starts_with("cfg-"));
    }

    #[test]
    fn game_serializes_with_lowercase_tags() {
        let monitors = [monitor("m1")];
        let mut game = Game::new(&monitors);
        game.fps_methods.insert("m1".to_string(), FpsMethod::Rtss);
        let json = serde_json::to_value(&game).expect("serialize");
        assert_eq!(json["fps_methods"]["m1"], "rtss");
        assert_eq!(json["fps_locks"]["m1"], serde_json::Value::Null);

        let back: Game = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, game);
    }
}
