//! Shared root state: monitor registry, game catalog, and selection.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{fresh_id, Game, MonitorIcon, MonitorProfile};

/// Fallback resolution applied when a new monitor is added without one.
pub const DEFAULT_RESOLUTION: &str = "1920x1080";

/// Lookup failure when resolving a launch request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The requested game id is not in the catalog.
    #[error("unknown game id {0}")]
    UnknownGame(String),
    /// The requested monitor id is not in the registry.
    #[error("unknown monitor id {0}")]
    UnknownMonitor(String),
}

/// Thread-safe owner of the launcher's root state.
///
/// Constructed once at startup and handed by reference to every consumer.
/// All mutation goes through explicit operations; per-monitor maps are kept
/// total over the registry on every write.
#[derive(Clone)]
pub struct LauncherStore {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    monitors: Vec<MonitorProfile>,
    games: Vec<Game>,
    selected: Option<String>,
}

impl LauncherStore {
    /// Build a store from seed data, normalising every game up front.
    pub fn new(monitors: Vec<MonitorProfile>, mut games: Vec<Game>) -> Self {
        for game in &mut games {
            game.normalize_for(&monitors);
        }
        Self {
            inner: Arc::new(RwLock::new(Inner {
                monitors,
                games,
                selected: None,
            })),
        }
    }

    /// Snapshot of the monitor registry, in display order.
    pub fn monitors(&self) -> Vec<MonitorProfile> {
        self.inner.read().monitors.clone()
    }

    /// Snapshot of the game catalog, in catalog order.
    pub fn games(&self) -> Vec<Game> {
        self.inner.read().games.clone()
    }

    /// Fetch one game by id.
    pub fn game(&self, game_id: &str) -> Option<Game> {
        self.inner
            .read()
            .games
            .iter()
            .find(|game| game.id == game_id)
            .cloned()
    }

    /// Fetch one monitor by id.
    pub fn monitor(&self, monitor_id: &str) -> Option<MonitorProfile> {
        self.inner
            .read()
            .monitors
            .iter()
            .find(|monitor| monitor.id == monitor_id)
            .cloned()
    }

    /// Currently selected game id, if any.
    pub fn selected_game_id(&self) -> Option<String> {
        self.inner.read().selected.clone()
    }

    /// Change or clear the selection.
    pub fn select_game(&self, game_id: Option<String>) {
        self.inner.write().selected = game_id;
    }

    /// Append a blank game, select it, and return it.
    pub fn add_game(&self) -> Game {
        let mut inner = self.inner.write();
        let game = Game::new(&inner.monitors);
        info!(game_id = %game.id, "Game added");
        inner.selected = Some(game.id.clone());
        inner.games.push(game.clone());
        game
    }

    /// Commit an edited game back into the catalog, matched by id.
    pub fn save_game(&self, mut game: Game) {
        let mut inner = self.inner.write();
        game.normalize_for(&inner.monitors);
        if let Some(slot) = inner.games.iter_mut().find(|existing| existing.id == game.id) {
            debug!(game_id = %game.id, "Game saved");
            *slot = game;
        }
    }

    /// Remove a game outright; clears the selection if it pointed there.
    pub fn delete_game(&self, game_id: &str) {
        let mut inner = self.inner.write();
        inner.games.retain(|game| game.id != game_id);
        if inner.selected.as_deref() == Some(game_id) {
            inner.selected = None;
        }
        info!(game_id, "Game deleted");
    }

    /// Add a monitor profile; `None` when the trimmed name is blank.
    ///
    /// Resolution falls back to [`DEFAULT_RESOLUTION`]; every game is
    /// backfilled for the new monitor id.
    pub fn add_monitor(
        &self,
        name: &str,
        resolution: &str,
        icon: MonitorIcon,
    ) -> Option<MonitorProfile> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let resolution = resolution.trim();
        let profile = MonitorProfile {
            id: fresh_id("monitor"),
            name: name.to_string(),
            resolution: if resolution.is_empty() {
                DEFAULT_RESOLUTION.to_string()
            } else {
                resolution.to_string()
            },
            icon,
        };

        let mut inner = self.inner.write();
        inner.monitors.push(profile.clone());
        let monitors = inner.monitors.clone();
        for game in &mut inner.games {
            game.normalize_for(&monitors);
        }
        info!(monitor_id = %profile.id, name = %profile.name, "Monitor added");
        Some(profile)
    }

    /// Replace a monitor profile wholesale, matched by id.
    pub fn update_monitor(&self, profile: MonitorProfile) {
        let mut inner = self.inner.write();
        if let Some(slot) = inner
            .monitors
            .iter_mut()
            .find(|existing| existing.id == profile.id)
        {
            debug!(monitor_id = %profile.id, "Monitor updated");
            *slot = profile;
        }
    }

    /// Remove a monitor by id.
    ///
    /// Refused when it is the last remaining profile. On success the
    /// monitor's key is pruned from every game's per-monitor maps so the
    /// maps stay total over the registry.
    pub fn remove_monitor(&self, monitor_id: &str) -> bool {
        let mut inner = self.inner.write();
        if inner.monitors.len() <= 1 {
            debug!(monitor_id, "Refusing to remove the last monitor");
            return false;
        }
        let before = inner.monitors.len();
        inner.monitors.retain(|monitor| monitor.id != monitor_id);
        if inner.monitors.len() == before {
            return false;
        }
        for game in &mut inner.games {
            game.prune_monitor(monitor_id);
        }
        info!(monitor_id, "Monitor removed");
        true
    }

    /// Resolve a launch request to concrete game and monitor records.
    pub fn resolve_launch(
        &self,
        game_id: &str,
        monitor_id: &str,
    ) -> Result<(Game, MonitorProfile), StoreError> {
        let game = self
            .game(game_id)
            .ok_or_else(|| StoreError::UnknownGame(game_id.to_string()))?;
        let monitor = self
            .monitor(monitor_id)
            .ok_or_else(|| StoreError::UnknownMonitor(monitor_id.to_string()))?;
        Ok((game, monitor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfigEntry, EntryKind, FpsMethod};

    fn seeded_store() -> LauncherStore {
        let monitors = vec![MonitorProfile {
            id: "m1".to_string(),
            name: "Primary".to_string(),
            resolution: "2560x1440".to_string(),
            icon: MonitorIcon::Monitor,
        }];
        let games = vec![Game::new(&monitors)];
        LauncherStore::new(monitors, games)
    }

    #[test]
    fn add_monitor_trims_and_defaults_resolution() {
        let store = seeded_store();
        let profile = store
            .add_monitor("  Projector  ", "  ", MonitorIcon::Projector)
            .expect("monitor should be added");
        assert_eq!(profile.name, "Projector");
        assert_eq!(profile.resolution, DEFAULT_RESOLUTION);
        assert_eq!(store.monitors().len(), 2);
    }

    #[test]
    fn blank_name_monitor_is_rejected() {
        let store = seeded_store();
        assert!(store.add_monitor("   ", "1920x1080", MonitorIcon::Tv).is_none());
        assert_eq!(store.monitors().len(), 1);
    }

    #[test]
    fn last_monitor_cannot_be_removed() {
        let store = seeded_store();
        let id = store.monitors()[0].id.clone();
        assert!(!store.remove_monitor(&id));
        assert_eq!(store.monitors().len(), 1);
    }

    #[test]
    fn removing_a_monitor_prunes_game_maps() {
        let store = seeded_store();
        let added = store
            .add_monitor("TV", "3840x2160", MonitorIcon::Tv)
            .expect("monitor should be added");

        let mut game = store.games()[0].clone();
        game.fps_locks.insert(added.id.clone(), Some(30));
        game.config_entries
            .push(ConfigEntry::new(EntryKind::File, &store.monitors()));
        store.save_game(game);

        assert!(store.remove_monitor(&added.id));
        let game = store.games()[0].clone();
        assert!(!game.fps_locks.contains_key(&added.id));
        assert!(!game.config_entries[0].source_paths.contains_key(&added.id));
    }

    #[test]
    fn saving_a_stale_copy_does_not_resurrect_pruned_keys() {
        let store = seeded_store();
        let added = store
            .add_monitor("TV", "3840x2160", MonitorIcon::Tv)
            .expect("monitor should be added");

        // Working copy taken while the monitor still existed.
        let stale = store.games()[0].clone();
        assert!(stale.fps_locks.contains_key(&added.id));

        assert!(store.remove_monitor(&added.id));
        store.save_game(stale);

        let saved = store.games()[0].clone();
        assert!(!saved.fps_locks.contains_key(&added.id));
        assert!(!saved.fps_methods.contains_key(&added.id));
    }

    #[test]
    fn add_monitor_backfills_existing_games() {
        let store = seeded_store();
        let added = store
            .add_monitor("TV", "3840x2160", MonitorIcon::Tv)
            .expect("monitor should be added");
        let game = store.games()[0].clone();
        assert_eq!(game.fps_locks.get(&added.id), Some(&None));
        assert_eq!(game.fps_method_for(&added.id), FpsMethod::Auto);
    }

    #[test]
    fn update_monitor_replaces_wholesale() {
        let store = seeded_store();
        let mut profile = store.monitors()[0].clone();
        profile.name = "Renamed".to_string();
        profile.icon = MonitorIcon::Display;
        store.update_monitor(profile.clone());
        assert_eq!(store.monitors()[0], profile);
    }

    #[test]
    fn deleting_selected_game_clears_selection() {
        let store = seeded_store();
        let game = store.add_game();
        assert_eq!(store.selected_game_id(), Some(game.id.clone()));
        store.delete_game(&game.id);
        assert_eq!(store.selected_game_id(), None);
        assert!(store.game(&game.id).is_none());
    }

    #[test]
    fn save_game_normalizes_for_all_monitors() {
        let store = seeded_store();
        store
            .add_monitor("TV", "3840x2160", MonitorIcon::Tv)
            .expect("monitor should be added");
        let mut game = store.games()[0].clone();
        game.fps_locks.clear();
        game.fps_methods.clear();
        store.save_game(game.clone());

        let saved = store.game(&game.id).expect("game still present");
        for monitor in store.monitors() {
            assert!(saved.fps_locks.contains_key(&monitor.id));
            assert!(saved.fps_methods.contains_key(&monitor.id));
        }
    }

    #[test]
    fn resolve_launch_reports_missing_ids() {
        let store = seeded_store();
        let game_id = store.games()[0].id.clone();
        let monitor_id = store.monitors()[0].id.clone();

        assert!(store.resolve_launch(&game_id, &monitor_id).is_ok());
        assert_eq!(
            store.resolve_launch("nope", &monitor_id),
            Err(StoreError::UnknownGame("nope".to_string()))
        );
        assert_eq!(
            store.resolve_launch(&game_id, "nope"),
            Err(StoreError::UnknownMonitor("nope".to_string()))
        );
    }
}
