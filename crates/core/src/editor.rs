//! Staged game editor: a working copy committed explicitly.

use crate::models::{ConfigEntry, EntryKind, FpsMethod, Game, MonitorProfile};

/// Parse an FPS cap from raw user input.
///
/// Trimmed empty input and anything that is not a base-10 integer coerce to
/// `None` (unlimited) instead of raising a validation error.
pub fn parse_fps(input: &str) -> Option<i64> {
    input.trim().parse().ok()
}

/// Working copy of one game plus a dirty flag.
///
/// Every mutation lands on the copy only; [`GameEditor::working`] is handed
/// to the store on save. Building a fresh editor for another game discards
/// unsaved changes, so callers that care should check [`GameEditor::is_dirty`]
/// first.
#[derive(Debug, Clone)]
pub struct GameEditor {
    working: Game,
    dirty: bool,
}

impl GameEditor {
    /// Start editing from the committed state of a game.
    pub fn new(committed: &Game) -> Self {
        Self {
            working: committed.clone(),
            dirty: false,
        }
    }

    /// Id of the game being edited.
    pub fn game_id(&self) -> &str {
        &self.working.id
    }

    /// The working copy.
    pub fn working(&self) -> &Game {
        &self.working
    }

    /// Whether the working copy differs from its committed baseline.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag after the working copy has been committed.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Rename the game.
    pub fn set_name(&mut self, name: String) {
        self.working.name = name;
        self.dirty = true;
    }

    /// Change the executable path.
    pub fn set_executable_path(&mut self, path: String) {
        self.working.executable_path = path;
        self.dirty = true;
    }

    /// Change the cover image path/URL.
    pub fn set_cover_image(&mut self, path: String) {
        self.working.cover_image = path;
        self.dirty = true;
    }

    /// Set the FPS cap for a monitor from raw input (see [`parse_fps`]).
    pub fn set_fps_lock(&mut self, monitor_id: &str, input: &str) {
        self.working
            .fps_locks
            .insert(monitor_id.to_string(), parse_fps(input));
        self.dirty = true;
    }

    /// Set the cap method for a monitor.
    pub fn set_fps_method(&mut self, monitor_id: &str, method: FpsMethod) {
        self.working
            .fps_methods
            .insert(monitor_id.to_string(), method);
        self.dirty = true;
    }

    /// Append a blank config entry and return its id.
    ///
    /// The entry carries an empty source slot for every current monitor and
    /// an empty target path; the presentation layer auto-expands it.
    pub fn add_entry(&mut self, kind: EntryKind, monitors: &[MonitorProfile]) -> String {
        let entry = ConfigEntry::new(kind, monitors);
        let id = entry.id.clone();
        self.working.config_entries.push(entry);
        self.dirty = true;
        id
    }

    /// Remove a config entry by id. An unknown id leaves the copy clean.
    pub fn remove_entry(&mut self, entry_id: &str) {
        let before = self.working.config_entries.len();
        self.working.config_entries.retain(|entry| entry.id != entry_id);
        if self.working.config_entries.len() != before {
            self.dirty = true;
        }
    }

    /// Rename a config entry.
    pub fn set_entry_name(&mut self, entry_id: &str, name: String) {
        if let Some(entry) = self.entry_mut(entry_id) {
            entry.name = name;
            self.dirty = true;
        }
    }

    /// Switch a config entry between file and folder.
    pub fn set_entry_kind(&mut self, entry_id: &str, kind: EntryKind) {
        if let Some(entry) = self.entry_mut(entry_id) {
            entry.kind = kind;
            self.dirty = true;
        }
    }

    /// Change a config entry's destination path.
    pub fn set_entry_target(&mut self, entry_id: &str, target: String) {
        if let Some(entry) = self.entry_mut(entry_id) {
            entry.target_path = target;
            self.dirty = true;
        }
    }

    /// Change one monitor's source path on a config entry.
    pub fn set_entry_source(&mut self, entry_id: &str, monitor_id: &str, value: String) {
        if let Some(entry) = self.entry_mut(entry_id) {
            entry.source_paths.insert(monitor_id.to_string(), value);
            self.dirty = true;
        }
    }

    fn entry_mut(&mut self, entry_id: &str) -> Option<&mut ConfigEntry> {
        self.working
            .config_entries
            .iter_mut()
            .find(|entry| entry.id == entry_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MonitorIcon, MonitorProfile};

    fn monitors() -> Vec<MonitorProfile> {
        vec![
            MonitorProfile {
                id: "m1".to_string(),
                name: "Primary".to_string(),
                resolution: "2560x1440".to_string(),
                icon: MonitorIcon::Monitor,
            },
            MonitorProfile {
                id: "m2".to_string(),
                name: "TV".to_string(),
                resolution: "3840x2160".to_string(),
                icon: MonitorIcon::Tv,
            },
        ]
    }

    #[test]
    fn parse_fps_coerces_invalid_input() {
        assert_eq!(parse_fps(""), None);
        assert_eq!(parse_fps("   "), None);
        assert_eq!(parse_fps("abc"), None);
        assert_eq!(parse_fps("12.5"), None);
        assert_eq!(parse_fps("60fps"), None);
        assert_eq!(parse_fps(" 60 "), Some(60));
        assert_eq!(parse_fps("144"), Some(144));
        assert_eq!(parse_fps("-1"), Some(-1));
    }

    #[test]
    fn mutations_set_the_dirty_flag() {
        let monitors = monitors();
        let game = Game::new(&monitors);
        let mut editor = GameEditor::new(&game);
        assert!(!editor.is_dirty());

        editor.set_name("Renamed".to_string());
        assert!(editor.is_dirty());
        assert_eq!(editor.working().name, "Renamed");

        editor.mark_saved();
        assert!(!editor.is_dirty());
    }

    #[test]
    fn removing_an_unknown_entry_stays_clean() {
        let monitors = monitors();
        let game = Game::new(&monitors);
        let mut editor = GameEditor::new(&game);

        editor.remove_entry("no-such-entry");
        assert!(!editor.is_dirty());

        let id = editor.add_entry(EntryKind::File, &monitors);
        editor.mark_saved();
        editor.remove_entry(&id);
        assert!(editor.is_dirty());
        assert!(editor.working().config_entries.is_empty());
    }

    #[test]
    fn fps_input_is_parsed_per_monitor() {
        let monitors = monitors();
        let game = Game::new(&monitors);
        let mut editor = GameEditor::new(&game);

        editor.set_fps_lock("m1", "120");
        editor.set_fps_lock("m2", "unlimited please");
        assert_eq!(editor.working().fps_lock_for("m1"), Some(120));
        assert_eq!(editor.working().fps_lock_for("m2"), None);

        editor.set_fps_method("m2", FpsMethod::Nvidia);
        assert_eq!(editor.working().fps_method_for("m2"), FpsMethod::Nvidia);
    }

    #[test]
    fn new_entry_starts_blank_for_every_monitor() {
        let monitors = monitors();
        let game = Game::new(&monitors);
        let mut editor = GameEditor::new(&game);

        let id = editor.add_entry(EntryKind::File, &monitors);
        let entry = editor
            .working()
            .config_entries
            .iter()
            .find(|entry| entry.id == id)
            .expect("entry present");
        assert_eq!(entry.name, "new_config.ini");
        assert_eq!(entry.target_path, "");
        for monitor in &monitors {
            assert_eq!(entry.source_for(&monitor.id), "");
        }

        let folder_id = editor.add_entry(EntryKind::Folder, &monitors);
        let folder = editor
            .working()
            .config_entries
            .iter()
            .find(|entry| entry.id == folder_id)
            .expect("entry present");
        assert_eq!(folder.name, "new_folder");
    }

    #[test]
    fn entry_fields_update_in_place() {
        let monitors = monitors();
        let game = Game::new(&monitors);
        let mut editor = GameEditor::new(&game);
        let id = editor.add_entry(EntryKind::File, &monitors);

        editor.set_entry_name(&id, "video.ini".to_string());
        editor.set_entry_kind(&id, EntryKind::Folder);
        editor.set_entry_target(&id, "C:\\Games\\X\\video.ini".to_string());
        editor.set_entry_source(&id, "m2", "C:\\Configs\\X\\TV\\video.ini".to_string());

        let entry = &editor.working().config_entries[0];
        assert_eq!(entry.name, "video.ini");
        assert_eq!(entry.kind, EntryKind::Folder);
        assert_eq!(entry.target_path, "C:\\Games\\X\\video.ini");
        assert_eq!(entry.source_for("m2"), "C:\\Configs\\X\\TV\\video.ini");

        editor.remove_entry(&id);
        assert!(editor.working().config_entries.is_empty());
    }

    #[test]
    fn fresh_editor_discards_previous_working_copy() {
        let monitors = monitors();
        let game = Game::new(&monitors);
        let mut editor = GameEditor::new(&game);
        editor.set_name("Unsaved".to_string());

        // Re-selecting starts over from the committed state.
        let editor = GameEditor::new(&game);
        assert_eq!(editor.working().name, game.name);
        assert!(!editor.is_dirty());
    }
}
