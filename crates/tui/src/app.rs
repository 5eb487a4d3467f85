use std::{collections::HashSet, io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use gamevault_core::{
    catalog,
    config::AppConfig,
    editor::GameEditor,
    launch::{LaunchSequence, LaunchStage},
    models::{ConfigEntry, EntryKind, FpsMethod, Game, MonitorIcon, MonitorProfile},
    LauncherStore, SortKey,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_INPUT_LEN: usize = 256;

#[derive(Debug, Clone)]
struct Theme {
    background: Color,
    foreground: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    selection_fg: Color,
    success: Color,
    danger: Color,
    on_accent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::Black,
            foreground: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,
            success: Color::Green,
            danger: Color::Red,
            on_accent: Color::Black,
        }
    }
}

fn theme_from_config(config: &AppConfig) -> Theme {
    let mut theme = Theme::default();
    let overrides = &config.theme;
    if let Some(color) = overrides.accent.as_deref().and_then(parse_hex_color) {
        theme.accent = color;
    }
    if let Some(color) = overrides.background.as_deref().and_then(parse_hex_color) {
        theme.background = color;
    }
    if let Some(color) = overrides.foreground.as_deref().and_then(parse_hex_color) {
        theme.foreground = color;
    }
    if let Some(color) = overrides.muted.as_deref().and_then(parse_hex_color) {
        theme.muted = color;
    }
    if let Some(color) = overrides.success.as_deref().and_then(parse_hex_color) {
        theme.success = color;
    }
    if let Some(color) = overrides.danger.as_deref().and_then(parse_hex_color) {
        theme.danger = color;
    }
    theme.on_accent = contrast_color(&theme.accent, Color::Black);
    theme
}

fn parse_hex_color(input: &str) -> Option<Color> {
    let trimmed = input.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

fn contrast_color(color: &Color, fallback: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            let luminance = 0.299 * f64::from(*r) + 0.587 * f64::from(*g) + 0.114 * f64::from(*b);
            if luminance > 186.0 {
                Color::Black
            } else {
                Color::White
            }
        }
        _ => fallback,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Library,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Main,
    Monitors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Filter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsPane {
    Games,
    Editor,
}

enum AppEvent {
    Input(Event),
    Tick,
    LaunchAdvance { generation: u64 },
}

/// Field edit requested through the input prompt.
#[derive(Debug, Clone)]
enum PromptTarget {
    GameName,
    ExecutablePath,
    CoverImage,
    FpsLock { monitor_id: String },
    EntryName { entry_id: String },
    EntryTarget { entry_id: String },
    EntrySource { entry_id: String, monitor_id: String },
}

#[derive(Debug, Clone)]
struct InputPrompt {
    title: String,
    input: String,
    cursor: usize,
    target: PromptTarget,
}

impl InputPrompt {
    fn new(title: impl Into<String>, value: String, target: PromptTarget) -> Self {
        let cursor = value.len();
        Self {
            title: title.into(),
            input: value,
            cursor,
            target,
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.input.len() as isize;
        let mut next = self.cursor as isize + delta;
        if next < 0 {
            next = 0;
        } else if next > len {
            next = len;
        }
        self.cursor = next as usize;
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.input.len();
    }

    fn insert(&mut self, ch: char) {
        if self.input.len() >= MAX_INPUT_LEN {
            return;
        }
        if ch.is_ascii() && !ch.is_ascii_control() {
            self.input.insert(self.cursor, ch);
            self.cursor += ch.len_utf8();
        }
    }

    fn backspace(&mut self) {
        if self.cursor > 0 && self.cursor <= self.input.len() {
            self.cursor -= 1;
            self.input.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.input.len() {
            self.input.remove(self.cursor);
        }
    }
}

/// Sidebar form for adding or editing a monitor profile.
///
/// Only one form may be open at a time; opening it cancels any other
/// in-progress monitor edit.
#[derive(Debug, Clone)]
struct MonitorForm {
    editing: Option<String>,
    name: String,
    resolution: String,
    icon: MonitorIcon,
    field: usize,
}

impl MonitorForm {
    const FIELDS: usize = 3;

    fn add() -> Self {
        Self {
            editing: None,
            name: String::new(),
            resolution: String::new(),
            icon: MonitorIcon::Monitor,
            field: 0,
        }
    }

    fn edit(profile: &MonitorProfile) -> Self {
        Self {
            editing: Some(profile.id.clone()),
            name: profile.name.clone(),
            resolution: profile.resolution.clone(),
            icon: profile.icon,
            field: 0,
        }
    }

    fn move_field(&mut self, delta: isize) {
        let fields = Self::FIELDS as isize;
        self.field = ((self.field as isize + delta).rem_euclid(fields)) as usize;
    }

    fn cycle_icon(&mut self, delta: isize) {
        let all = MonitorIcon::ALL;
        let current = all
            .iter()
            .position(|icon| *icon == self.icon)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(all.len() as isize) as usize;
        self.icon = all[next];
    }

    fn text_field_mut(&mut self) -> Option<&mut String> {
        match self.field {
            0 => Some(&mut self.name),
            1 => Some(&mut self.resolution),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct MonitorPicker {
    game_id: String,
    cursor: usize,
}

struct LaunchModal {
    sequence: LaunchSequence,
    generation: u64,
}

/// Action deferred behind the unsaved-changes confirmation.
#[derive(Debug, Clone)]
enum PendingAction {
    SelectGame(String),
    AddGame,
}

struct LibraryState {
    query: String,
    sort: SortKey,
    cursor: usize,
    mode: Mode,
}

struct SettingsState {
    game_cursor: usize,
    pane: SettingsPane,
    row_cursor: usize,
    expanded: HashSet<String>,
}

/// One navigable row of the game editor form.
#[derive(Debug, Clone, PartialEq, Eq)]
enum EditorRow {
    Name,
    ExecutablePath,
    CoverImage,
    FpsLock { monitor_id: String },
    FpsMethod { monitor_id: String },
    AddFileEntry,
    AddFolderEntry,
    EntryHeader { entry_id: String },
    EntryKindToggle { entry_id: String },
    EntryName { entry_id: String },
    EntrySource { entry_id: String, monitor_id: String },
    EntryTarget { entry_id: String },
    EntryRemove { entry_id: String },
    DeleteGame,
}

fn editor_rows(
    game: &Game,
    monitors: &[MonitorProfile],
    expanded: &HashSet<String>,
) -> Vec<EditorRow> {
    let mut rows = vec![
        EditorRow::Name,
        EditorRow::ExecutablePath,
        EditorRow::CoverImage,
    ];
    for monitor in monitors {
        rows.push(EditorRow::FpsLock {
            monitor_id: monitor.id.clone(),
        });
        rows.push(EditorRow::FpsMethod {
            monitor_id: monitor.id.clone(),
        });
    }
    rows.push(EditorRow::AddFileEntry);
    rows.push(EditorRow::AddFolderEntry);
    for entry in &game.config_entries {
        rows.push(EditorRow::EntryHeader {
            entry_id: entry.id.clone(),
        });
        if expanded.contains(&entry.id) {
            rows.push(EditorRow::EntryKindToggle {
                entry_id: entry.id.clone(),
            });
            rows.push(EditorRow::EntryName {
                entry_id: entry.id.clone(),
            });
            for monitor in monitors {
                rows.push(EditorRow::EntrySource {
                    entry_id: entry.id.clone(),
                    monitor_id: monitor.id.clone(),
                });
            }
            rows.push(EditorRow::EntryTarget {
                entry_id: entry.id.clone(),
            });
            rows.push(EditorRow::EntryRemove {
                entry_id: entry.id.clone(),
            });
        }
    }
    rows.push(EditorRow::DeleteGame);
    rows
}

fn find_entry<'a>(game: &'a Game, entry_id: &str) -> Option<&'a ConfigEntry> {
    game.config_entries.iter().find(|entry| entry.id == entry_id)
}

fn next_method(current: FpsMethod) -> FpsMethod {
    let all = FpsMethod::ALL;
    let index = all.iter().position(|m| *m == current).unwrap_or(0);
    all[(index + 1) % all.len()]
}

fn icon_tag(icon: MonitorIcon) -> &'static str {
    match icon {
        MonitorIcon::Monitor => "[M]",
        MonitorIcon::Tv => "[TV]",
        MonitorIcon::Projector => "[PJ]",
        MonitorIcon::Display => "[D]",
    }
}

/// High-level application state for the launcher TUI.
pub struct GameVaultApp {
    store: LauncherStore,
    theme: Theme,
    tab: Tab,
    focus: Focus,
    library: LibraryState,
    settings: SettingsState,
    editor: Option<GameEditor>,
    monitor_cursor: usize,
    monitor_form: Option<MonitorForm>,
    picker: Option<MonitorPicker>,
    launch: Option<LaunchModal>,
    launch_generation: u64,
    prompt: Option<InputPrompt>,
    pending: Option<PendingAction>,
    status: String,
    should_quit: bool,
    event_tx: Option<mpsc::Sender<AppEvent>>,
}

impl GameVaultApp {
    pub fn new(store: LauncherStore, config: AppConfig) -> Self {
        let theme = theme_from_config(&config);
        let sort = config.default_sort();
        Self {
            store,
            theme,
            tab: Tab::Library,
            focus: Focus::Main,
            library: LibraryState {
                query: String::new(),
                sort,
                cursor: 0,
                mode: Mode::Browse,
            },
            settings: SettingsState {
                game_cursor: 0,
                pane: SettingsPane::Games,
                row_cursor: 0,
                expanded: HashSet::new(),
            },
            editor: None,
            monitor_cursor: 0,
            monitor_form: None,
            picker: None,
            launch: None,
            launch_generation: 0,
            prompt: None,
            pending: None,
            status: String::new(),
            should_quit: false,
            event_tx: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.status = format!(
            "{} games on {} displays",
            self.store.games().len(),
            self.store.monitors().len()
        );

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }

            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }

            if self.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Event::Key(key) = event {
                    self.handle_key(key);
                }
                true
            }
            Some(AppEvent::Tick) => {
                self.handle_tick();
                true
            }
            Some(AppEvent::LaunchAdvance { generation }) => {
                self.handle_launch_advance(generation);
                true
            }
            None => false,
        }
    }

    fn handle_tick(&mut self) {
        if self.tab == Tab::Library && self.library.mode == Mode::Filter {
            self.status = format!("Search: {}", self.library.query);
        }
    }

    // Timer callbacks carry the generation of the sequence that scheduled
    // them; a mismatch means the launch view was closed (or reopened) in the
    // meantime and the event must not mutate anything.
    fn handle_launch_advance(&mut self, generation: u64) {
        let next = match self.launch.as_mut() {
            Some(modal) if modal.generation == generation => {
                let next = modal.sequence.advance();
                if modal.sequence.is_done() {
                    self.status = format!(
                        "{} launched on {}",
                        modal.sequence.game().name,
                        modal.sequence.monitor().name
                    );
                }
                next
            }
            _ => {
                debug!(generation, "Stale launch timer ignored");
                None
            }
        };
        if let Some(delay) = next {
            self.schedule_advance(delay, generation);
        }
    }

    fn schedule_advance(&self, delay: Duration, generation: u64) {
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(AppEvent::LaunchAdvance { generation }).await;
        });
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
        } else if self.pending.is_some() {
            self.handle_confirm_key(key);
        } else if self.monitor_form.is_some() {
            self.handle_monitor_form_key(key);
        } else if self.launch.is_some() {
            self.handle_launch_key(key);
        } else if self.picker.is_some() {
            self.handle_picker_key(key);
        } else {
            match self.focus {
                Focus::Monitors => self.handle_monitor_key(key),
                Focus::Main => match self.tab {
                    Tab::Library if self.library.mode == Mode::Filter => {
                        self.handle_filter_key(key)
                    }
                    Tab::Library => self.handle_library_key(key),
                    Tab::Settings => self.handle_settings_key(key),
                },
            }
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.prompt = None;
            }
            KeyCode::Enter => {
                if let Some(prompt) = self.prompt.take() {
                    self.apply_prompt(prompt.target, prompt.input);
                }
            }
            KeyCode::Left => prompt.move_cursor(-1),
            KeyCode::Right => prompt.move_cursor(1),
            KeyCode::Home => prompt.move_home(),
            KeyCode::End => prompt.move_end(),
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Delete => prompt.delete(),
            KeyCode::Char(ch) => prompt.insert(ch),
            _ => {}
        }
    }

    fn apply_prompt(&mut self, target: PromptTarget, value: String) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        match target {
            PromptTarget::GameName => editor.set_name(value),
            PromptTarget::ExecutablePath => editor.set_executable_path(value),
            PromptTarget::CoverImage => editor.set_cover_image(value),
            PromptTarget::FpsLock { monitor_id } => editor.set_fps_lock(&monitor_id, &value),
            PromptTarget::EntryName { entry_id } => editor.set_entry_name(&entry_id, value),
            PromptTarget::EntryTarget { entry_id } => editor.set_entry_target(&entry_id, value),
            PromptTarget::EntrySource {
                entry_id,
                monitor_id,
            } => editor.set_entry_source(&entry_id, &monitor_id, value),
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(action) = self.pending.take() {
                    match action {
                        PendingAction::SelectGame(game_id) => self.open_editor(game_id),
                        PendingAction::AddGame => self.add_game(),
                    }
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.pending = None;
                self.status = "Kept unsaved changes".to_string();
            }
            _ => {}
        }
    }

    fn handle_monitor_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.monitor_form.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.monitor_form = None;
            }
            KeyCode::Enter => self.commit_monitor_form(),
            KeyCode::Up => form.move_field(-1),
            KeyCode::Down | KeyCode::Tab => form.move_field(1),
            KeyCode::Left if form.field == 2 => form.cycle_icon(-1),
            KeyCode::Right if form.field == 2 => form.cycle_icon(1),
            KeyCode::Backspace => {
                if let Some(text) = form.text_field_mut() {
                    text.pop();
                }
            }
            KeyCode::Char(ch) => {
                if let Some(text) = form.text_field_mut() {
                    if text.len() < MAX_INPUT_LEN && ch.is_ascii() && !ch.is_ascii_control() {
                        text.push(ch);
                    }
                }
            }
            _ => {}
        }
    }

    fn commit_monitor_form(&mut self) {
        let Some(form) = self.monitor_form.clone() else {
            return;
        };
        match form.editing {
            Some(monitor_id) => {
                self.store.update_monitor(MonitorProfile {
                    id: monitor_id,
                    name: form.name,
                    resolution: form.resolution,
                    icon: form.icon,
                });
                self.status = "Display updated".to_string();
                self.monitor_form = None;
            }
            None => match self.store.add_monitor(&form.name, &form.resolution, form.icon) {
                Some(profile) => {
                    self.status = format!("Added display {}", profile.name);
                    self.monitor_form = None;
                }
                None => {
                    self.status = "Display name required".to_string();
                }
            },
        }
    }

    fn handle_launch_key(&mut self, key: KeyEvent) {
        let Some(modal) = self.launch.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.close_launch(),
            KeyCode::Enter => match modal.sequence.stage() {
                LaunchStage::Preview => {
                    if let Some(delay) = modal.sequence.start() {
                        let generation = modal.generation;
                        info!(game = %modal.sequence.game().name, "Launch started");
                        self.schedule_advance(delay, generation);
                    }
                }
                LaunchStage::Done => self.close_launch(),
                // Mid-sequence there is nothing to confirm.
                LaunchStage::Swapping | LaunchStage::Launching => {}
            },
            _ => {}
        }
    }

    fn close_launch(&mut self) {
        // Any pending timer still carries the old generation and will be
        // dropped by handle_launch_advance.
        self.launch = None;
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let monitors = self.store.monitors();
        let Some(picker) = self.picker.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                self.picker = None;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                picker.cursor = picker.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if picker.cursor + 1 < monitors.len() {
                    picker.cursor += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(monitor) = monitors.get(picker.cursor) {
                    let game_id = picker.game_id.clone();
                    let monitor_id = monitor.id.clone();
                    self.start_launch(&game_id, &monitor_id);
                }
            }
            _ => {}
        }
    }

    fn start_launch(&mut self, game_id: &str, monitor_id: &str) {
        self.picker = None;
        match self.store.resolve_launch(game_id, monitor_id) {
            Ok((game, monitor)) => {
                info!(game = %game.name, monitor = %monitor.name, "Launch view opened");
                self.launch_generation += 1;
                self.launch = Some(LaunchModal {
                    sequence: LaunchSequence::new(game, monitor),
                    generation: self.launch_generation,
                });
            }
            Err(err) => {
                warn!(%err, "Launch request ignored");
                self.status = format!("Cannot launch: {err}");
            }
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.library.mode = Mode::Browse;
                self.status = format!("Search: {}", self.library.query);
            }
            KeyCode::Esc => {
                self.library.mode = Mode::Browse;
                self.library.query.clear();
                self.library.cursor = 0;
                self.status = "Search cleared".to_string();
            }
            KeyCode::Backspace => {
                self.library.query.pop();
                self.library.cursor = 0;
            }
            KeyCode::Char(ch) => {
                if ch.is_ascii() && !ch.is_ascii_control() {
                    self.library.query.push(ch);
                    self.library.cursor = 0;
                }
            }
            _ => {}
        }
    }

    fn handle_library_key(&mut self, key: KeyEvent) {
        let games = self.library_games();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('m') => self.focus = Focus::Monitors,
            KeyCode::Char('2') => self.tab = Tab::Settings,
            KeyCode::Char('/') => {
                self.library.mode = Mode::Filter;
                self.status = format!("Search: {}", self.library.query);
            }
            KeyCode::Char('s') => {
                self.library.sort = self.library.sort.next();
                self.library.cursor = 0;
                self.status = format!("Sorted by {}", self.library.sort.label());
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.library.cursor = self.library.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.library.cursor + 1 < games.len() {
                    self.library.cursor += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(game) = games.get(self.library.cursor) {
                    self.picker = Some(MonitorPicker {
                        game_id: game.id.clone(),
                        cursor: 0,
                    });
                }
            }
            KeyCode::Char('e') => {
                if let Some(game) = games.get(self.library.cursor) {
                    let game_id = game.id.clone();
                    self.tab = Tab::Settings;
                    self.request_select_game(game_id);
                }
            }
            KeyCode::Char('a') => self.request_add_game(),
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        match self.settings.pane {
            SettingsPane::Games => self.handle_settings_list_key(key),
            SettingsPane::Editor => self.handle_editor_key(key),
        }
    }

    fn handle_settings_list_key(&mut self, key: KeyEvent) {
        let games = self.store.games();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('m') => self.focus = Focus::Monitors,
            KeyCode::Char('1') => self.tab = Tab::Library,
            KeyCode::Up | KeyCode::Char('k') => {
                self.settings.game_cursor = self.settings.game_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.settings.game_cursor + 1 < games.len() {
                    self.settings.game_cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Right => {
                if let Some(game) = games.get(self.settings.game_cursor) {
                    self.request_select_game(game.id.clone());
                }
            }
            KeyCode::Char('a') => self.request_add_game(),
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let rows = self.current_editor_rows();
        match key.code {
            KeyCode::Esc | KeyCode::Left => {
                self.settings.pane = SettingsPane::Games;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.settings.row_cursor = self.settings.row_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.settings.row_cursor + 1 < rows.len() {
                    self.settings.row_cursor += 1;
                }
            }
            KeyCode::Char('s') => self.save_editor(),
            KeyCode::Enter => {
                if let Some(row) = rows.get(self.settings.row_cursor).cloned() {
                    self.activate_editor_row(row);
                }
            }
            KeyCode::Char(' ') => {
                if let Some(row) = rows.get(self.settings.row_cursor).cloned() {
                    self.cycle_editor_row(row);
                }
            }
            _ => {}
        }
    }

    fn handle_monitor_key(&mut self, key: KeyEvent) {
        let monitors = self.store.monitors();
        match key.code {
            KeyCode::Esc | KeyCode::Char('m') | KeyCode::Tab => self.focus = Focus::Main,
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.monitor_cursor = self.monitor_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.monitor_cursor + 1 < monitors.len() {
                    self.monitor_cursor += 1;
                }
            }
            KeyCode::Char('a') => {
                self.monitor_form = Some(MonitorForm::add());
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(profile) = monitors.get(self.monitor_cursor) {
                    self.monitor_form = Some(MonitorForm::edit(profile));
                }
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(profile) = monitors.get(self.monitor_cursor) {
                    if self.store.remove_monitor(&profile.id) {
                        self.status = format!("Removed display {}", profile.name);
                        let remaining = self.store.monitors().len();
                        self.monitor_cursor = self.monitor_cursor.min(remaining.saturating_sub(1));
                    } else {
                        self.status = "At least one display must remain".to_string();
                    }
                }
            }
            _ => {}
        }
    }

    fn request_select_game(&mut self, game_id: String) {
        if let Some(editor) = &self.editor {
            if editor.is_dirty() && editor.game_id() != game_id {
                self.pending = Some(PendingAction::SelectGame(game_id));
                return;
            }
        }
        self.open_editor(game_id);
    }

    fn open_editor(&mut self, game_id: String) {
        match self.store.game(&game_id) {
            Some(game) => {
                let games = self.store.games();
                if let Some(position) = games.iter().position(|g| g.id == game_id) {
                    self.settings.game_cursor = position;
                }
                self.store.select_game(Some(game_id));
                self.editor = Some(GameEditor::new(&game));
                self.settings.pane = SettingsPane::Editor;
                self.settings.row_cursor = 0;
                self.settings.expanded.clear();
            }
            None => {
                self.status = "Game no longer exists".to_string();
            }
        }
    }

    fn request_add_game(&mut self) {
        if let Some(editor) = &self.editor {
            if editor.is_dirty() {
                self.pending = Some(PendingAction::AddGame);
                return;
            }
        }
        self.add_game();
    }

    fn add_game(&mut self) {
        let game = self.store.add_game();
        self.tab = Tab::Settings;
        self.status = format!("Added {}", game.name);
        self.open_editor(game.id);
    }

    fn save_editor(&mut self) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        self.store.save_game(editor.working().clone());
        editor.mark_saved();
        self.status = format!("Saved {}", editor.working().name);
    }

    fn delete_current_game(&mut self) {
        let Some(editor) = &self.editor else {
            return;
        };
        let game_id = editor.game_id().to_string();
        let name = editor.working().name.clone();
        self.store.delete_game(&game_id);
        self.editor = None;
        self.settings.pane = SettingsPane::Games;
        let remaining = self.store.games().len();
        self.settings.game_cursor = self.settings.game_cursor.min(remaining.saturating_sub(1));
        self.status = format!("Deleted {name}");
    }

    fn add_entry(&mut self, kind: EntryKind) {
        let monitors = self.store.monitors();
        if let Some(editor) = self.editor.as_mut() {
            let entry_id = editor.add_entry(kind, &monitors);
            // A fresh entry opens expanded so its paths can be filled in.
            self.settings.expanded.insert(entry_id);
        }
    }

    fn activate_editor_row(&mut self, row: EditorRow) {
        match row {
            EditorRow::Name => {
                if let Some(value) = self.editor.as_ref().map(|e| e.working().name.clone()) {
                    self.prompt = Some(InputPrompt::new("Game name", value, PromptTarget::GameName));
                }
            }
            EditorRow::ExecutablePath => {
                if let Some(value) = self
                    .editor
                    .as_ref()
                    .map(|e| e.working().executable_path.clone())
                {
                    self.prompt = Some(InputPrompt::new(
                        "Executable path",
                        value,
                        PromptTarget::ExecutablePath,
                    ));
                }
            }
            EditorRow::CoverImage => {
                if let Some(value) = self.editor.as_ref().map(|e| e.working().cover_image.clone()) {
                    self.prompt = Some(InputPrompt::new(
                        "Cover image",
                        value,
                        PromptTarget::CoverImage,
                    ));
                }
            }
            EditorRow::FpsLock { monitor_id } => {
                if let Some(value) = self.editor.as_ref().map(|e| {
                    e.working()
                        .fps_lock_for(&monitor_id)
                        .map(|fps| fps.to_string())
                        .unwrap_or_default()
                }) {
                    self.prompt = Some(InputPrompt::new(
                        "FPS lock (empty = unlimited)",
                        value,
                        PromptTarget::FpsLock { monitor_id },
                    ));
                }
            }
            EditorRow::FpsMethod { monitor_id } => {
                self.cycle_editor_row(EditorRow::FpsMethod { monitor_id });
            }
            EditorRow::AddFileEntry => self.add_entry(EntryKind::File),
            EditorRow::AddFolderEntry => self.add_entry(EntryKind::Folder),
            EditorRow::EntryHeader { entry_id } => {
                if !self.settings.expanded.remove(&entry_id) {
                    self.settings.expanded.insert(entry_id);
                }
            }
            EditorRow::EntryKindToggle { entry_id } => {
                self.cycle_editor_row(EditorRow::EntryKindToggle { entry_id });
            }
            EditorRow::EntryName { entry_id } => {
                if let Some(value) = self.entry_field(&entry_id, |entry| entry.name.clone()) {
                    self.prompt = Some(InputPrompt::new(
                        "Entry name",
                        value,
                        PromptTarget::EntryName { entry_id },
                    ));
                }
            }
            EditorRow::EntrySource {
                entry_id,
                monitor_id,
            } => {
                if let Some(value) =
                    self.entry_field(&entry_id, |entry| entry.source_for(&monitor_id).to_string())
                {
                    self.prompt = Some(InputPrompt::new(
                        "Source path for this display",
                        value,
                        PromptTarget::EntrySource {
                            entry_id,
                            monitor_id,
                        },
                    ));
                }
            }
            EditorRow::EntryTarget { entry_id } => {
                if let Some(value) = self.entry_field(&entry_id, |entry| entry.target_path.clone())
                {
                    self.prompt = Some(InputPrompt::new(
                        "Target path in the game tree",
                        value,
                        PromptTarget::EntryTarget { entry_id },
                    ));
                }
            }
            EditorRow::EntryRemove { entry_id } => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.remove_entry(&entry_id);
                    self.settings.expanded.remove(&entry_id);
                    self.status = "Config entry removed".to_string();
                }
            }
            EditorRow::DeleteGame => self.delete_current_game(),
        }
    }

    fn cycle_editor_row(&mut self, row: EditorRow) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        match row {
            EditorRow::FpsMethod { monitor_id } => {
                let next = next_method(editor.working().fps_method_for(&monitor_id));
                editor.set_fps_method(&monitor_id, next);
            }
            EditorRow::EntryKindToggle { entry_id } => {
                let current = editor
                    .working()
                    .config_entries
                    .iter()
                    .find(|entry| entry.id == entry_id)
                    .map(|entry| entry.kind);
                if let Some(kind) = current {
                    let next = match kind {
                        EntryKind::File => EntryKind::Folder,
                        EntryKind::Folder => EntryKind::File,
                    };
                    editor.set_entry_kind(&entry_id, next);
                }
            }
            _ => {}
        }
    }

    fn entry_field<F>(&self, entry_id: &str, extract: F) -> Option<String>
    where
        F: Fn(&ConfigEntry) -> String,
    {
        self.editor.as_ref().and_then(|editor| {
            editor
                .working()
                .config_entries
                .iter()
                .find(|entry| entry.id == entry_id)
                .map(extract)
        })
    }

    fn library_games(&self) -> Vec<Game> {
        catalog::filter_and_sort(&self.store.games(), &self.library.query, self.library.sort)
    }

    fn current_editor_rows(&self) -> Vec<EditorRow> {
        match &self.editor {
            Some(editor) => editor_rows(
                editor.working(),
                &self.store.monitors(),
                &self.settings.expanded,
            ),
            None => Vec::new(),
        }
    }

    // ---------------------------------------------------------------- draw

    fn draw(&mut self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(frame.size());
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(1)])
            .split(rows[0]);

        self.draw_sidebar(frame, cols[0]);
        match self.tab {
            Tab::Library => self.draw_library(frame, cols[1]),
            Tab::Settings => self.draw_settings(frame, cols[1]),
        }
        self.render_status(frame, rows[1]);

        if let Some(picker) = &self.picker {
            self.render_monitor_picker(frame, picker);
        }
        if let Some(form) = &self.monitor_form {
            self.render_monitor_form(frame, form);
        }
        if let Some(prompt) = &self.prompt {
            self.render_input_prompt(frame, prompt);
        }
        if self.pending.is_some() {
            self.render_confirm_discard(frame);
        }
        if let Some(modal) = &self.launch {
            self.render_launch_modal(frame, modal);
        }
    }

    fn draw_sidebar(&self, frame: &mut Frame, area: Rect) {
        let theme = &self.theme;
        let monitors = self.store.monitors();

        let mut lines: Vec<Line> = Vec::new();
        let nav = [(Tab::Library, "1  Library"), (Tab::Settings, "2  Game Settings")];
        for (tab, label) in nav {
            let style = if self.tab == tab {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.muted)
            };
            lines.push(Line::from(Span::styled(label.to_string(), style)));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("DISPLAYS ({})", monitors.len()),
            Style::default().fg(theme.muted),
        )));

        for (index, monitor) in monitors.iter().enumerate() {
            let selected = self.focus == Focus::Monitors && index == self.monitor_cursor;
            let style = if selected {
                Style::default()
                    .fg(theme.selection_fg)
                    .bg(theme.selection_bg)
            } else {
                Style::default().fg(theme.foreground)
            };
            lines.push(Line::from(Span::styled(
                format!(
                    "{} {}  {}",
                    icon_tag(monitor.icon),
                    monitor.name,
                    monitor.resolution
                ),
                style,
            )));
        }

        lines.push(Line::default());
        let hint = match self.focus {
            Focus::Monitors => "a add · e edit · x delete · Esc back",
            Focus::Main => "m manage displays",
        };
        lines.push(Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(theme.muted),
        )));

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" GameVault ")
            .border_style(if self.focus == Focus::Monitors {
                Style::default().fg(theme.accent)
            } else {
                Style::default().fg(theme.muted)
            });
        frame.render_widget(
            Paragraph::new(lines)
                .style(Style::default().bg(theme.background).fg(theme.foreground))
                .block(block),
            area,
        );
    }

    fn draw_library(&mut self, frame: &mut Frame, area: Rect) {
        let theme = self.theme.clone();
        let games = self.library_games();
        if !games.is_empty() && self.library.cursor >= games.len() {
            self.library.cursor = games.len() - 1;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(1)])
            .split(area);

        let search = if self.library.mode == Mode::Filter {
            format!("/{}_", self.library.query)
        } else if self.library.query.is_empty() {
            "/ search".to_string()
        } else {
            format!("/{}", self.library.query)
        };
        let header = Line::from(vec![
            Span::styled(
                format!("Game Library ({}) ", games.len()),
                Style::default()
                    .fg(theme.foreground)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(search, Style::default().fg(theme.muted)),
            Span::styled(
                format!("  sort: {}", self.library.sort.label()),
                Style::default().fg(theme.accent),
            ),
        ]);
        frame.render_widget(Paragraph::new(header), rows[0]);

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(44)])
            .split(rows[1]);

        let items: Vec<ListItem> = games
            .iter()
            .map(|game| {
                let playtime = game
                    .total_playtime
                    .map(|hours| format!("{hours:.0}h"))
                    .unwrap_or_else(|| "--".to_string());
                let line = Line::from(vec![
                    Span::styled(game.name.clone(), Style::default().fg(theme.foreground)),
                    Span::styled(
                        format!(
                            "  {playtime} · {} config{}",
                            game.config_entries.len(),
                            if game.config_entries.len() == 1 { "" } else { "s" }
                        ),
                        Style::default().fg(theme.muted),
                    ),
                ]);
                ListItem::new(line)
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Games ")
                    .border_style(Style::default().fg(theme.muted)),
            )
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg)
                    .fg(theme.selection_fg)
                    .add_modifier(Modifier::BOLD),
            );
        let mut state = ListState::default();
        if !games.is_empty() {
            state.select(Some(self.library.cursor));
        }
        frame.render_stateful_widget(list, cols[0], &mut state);

        self.render_game_info(frame, cols[1], games.get(self.library.cursor));
    }

    fn render_game_info(&self, frame: &mut Frame, area: Rect, game: Option<&Game>) {
        let theme = &self.theme;
        let mut lines: Vec<Line> = Vec::new();
        match game {
            Some(game) => {
                lines.push(Line::from(Span::styled(
                    game.name.clone(),
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(
                    if game.executable_path.is_empty() {
                        "<no executable set>".to_string()
                    } else {
                        game.executable_path.clone()
                    },
                    Style::default().fg(theme.muted),
                )));
                if let Some(played) = game.last_played {
                    lines.push(Line::from(Span::styled(
                        format!("Last played {played}"),
                        Style::default().fg(theme.muted),
                    )));
                }
                if let Some(hours) = game.total_playtime {
                    lines.push(Line::from(Span::styled(
                        format!("{hours:.0}h played"),
                        Style::default().fg(theme.muted),
                    )));
                }
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    "FPS per display",
                    Style::default().fg(theme.foreground),
                )));
                for monitor in self.store.monitors() {
                    let fps = match game.fps_lock_for(&monitor.id) {
                        Some(fps) => {
                            format!("{fps} FPS ({})", game.fps_method_for(&monitor.id).label())
                        }
                        None => "Unlimited".to_string(),
                    };
                    lines.push(Line::from(Span::styled(
                        format!("  {} — {fps}", monitor.name),
                        Style::default().fg(theme.muted),
                    )));
                }
                if !game.config_entries.is_empty() {
                    lines.push(Line::default());
                    lines.push(Line::from(Span::styled(
                        format!("Config entries ({})", game.config_entries.len()),
                        Style::default().fg(theme.foreground),
                    )));
                    for entry in &game.config_entries {
                        lines.push(Line::from(Span::styled(
                            format!("  [{}] {}", entry.kind.label(), entry.name),
                            Style::default().fg(theme.muted),
                        )));
                    }
                }
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    "Enter launch · e edit · s sort · / search",
                    Style::default().fg(theme.muted),
                )));
            }
            None => {
                lines.push(Line::from(Span::styled(
                    "No games found",
                    Style::default().fg(theme.muted),
                )));
                lines.push(Line::from(Span::styled(
                    "Try adjusting the search or add a new game",
                    Style::default().fg(theme.muted),
                )));
            }
        }

        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(" Details ")
                        .border_style(Style::default().fg(theme.muted)),
                ),
            area,
        );
    }

    fn draw_settings(&mut self, frame: &mut Frame, area: Rect) {
        let theme = self.theme.clone();
        let games = self.store.games();
        if !games.is_empty() && self.settings.game_cursor >= games.len() {
            self.settings.game_cursor = games.len() - 1;
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(1)])
            .split(area);

        let items: Vec<ListItem> = games
            .iter()
            .map(|game| {
                ListItem::new(Line::from(vec![
                    Span::styled(game.name.clone(), Style::default().fg(theme.foreground)),
                    Span::styled(
                        format!("  {} cfg", game.config_entries.len()),
                        Style::default().fg(theme.muted),
                    ),
                ]))
            })
            .collect();
        let games_border = if self.settings.pane == SettingsPane::Games {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.muted)
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Games ({}) — a add ", games.len()))
                    .border_style(games_border),
            )
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg)
                    .fg(theme.selection_fg),
            );
        let mut state = ListState::default();
        if !games.is_empty() {
            state.select(Some(self.settings.game_cursor));
        }
        frame.render_stateful_widget(list, cols[0], &mut state);

        self.render_editor(frame, cols[1]);
    }

    fn render_editor(&mut self, frame: &mut Frame, area: Rect) {
        let theme = self.theme.clone();
        let editor_border = if self.settings.pane == SettingsPane::Editor {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.muted)
        };

        let Some(editor) = &self.editor else {
            frame.render_widget(
                Paragraph::new(vec![
                    Line::default(),
                    Line::from(Span::styled(
                        "Select a game to edit",
                        Style::default().fg(theme.muted),
                    )),
                    Line::from(Span::styled(
                        "Or press a to add a new game",
                        Style::default().fg(theme.muted),
                    )),
                ])
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(" Editor ")
                        .border_style(editor_border),
                ),
                area,
            );
            return;
        };

        let game = editor.working().clone();
        let dirty = editor.is_dirty();
        let monitors = self.store.monitors();
        let rows = editor_rows(&game, &monitors, &self.settings.expanded);
        if !rows.is_empty() && self.settings.row_cursor >= rows.len() {
            self.settings.row_cursor = rows.len() - 1;
        }

        let title = if dirty {
            format!(" {} — unsaved changes, s save ", game.name)
        } else {
            format!(" {} ", game.name)
        };

        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| self.editor_row_item(row, &game, &monitors))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(if dirty {
                        Style::default().fg(theme.accent)
                    } else {
                        editor_border
                    }),
            )
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg)
                    .fg(theme.selection_fg),
            );
        let mut state = ListState::default();
        if !rows.is_empty() {
            state.select(Some(self.settings.row_cursor));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn editor_row_item(
        &self,
        row: &EditorRow,
        game: &Game,
        monitors: &[MonitorProfile],
    ) -> ListItem<'static> {
        let theme = &self.theme;
        let muted = Style::default().fg(theme.muted);
        let plain = Style::default().fg(theme.foreground);
        let monitor_name = |monitor_id: &str| {
            monitors
                .iter()
                .find(|monitor| monitor.id == monitor_id)
                .map(|monitor| monitor.name.clone())
                .unwrap_or_else(|| monitor_id.to_string())
        };
        let line = match row {
            EditorRow::Name => Line::from(vec![
                Span::styled("Name            ", muted),
                Span::styled(game.name.clone(), plain),
            ]),
            EditorRow::ExecutablePath => Line::from(vec![
                Span::styled("Executable      ", muted),
                Span::styled(
                    if game.executable_path.is_empty() {
                        "<not set>".to_string()
                    } else {
                        game.executable_path.clone()
                    },
                    plain,
                ),
            ]),
            EditorRow::CoverImage => Line::from(vec![
                Span::styled("Cover image     ", muted),
                Span::styled(game.cover_image.clone(), plain),
            ]),
            EditorRow::FpsLock { monitor_id } => {
                let value = game
                    .fps_lock_for(monitor_id)
                    .map(|fps| format!("{fps} FPS"))
                    .unwrap_or_else(|| "Unlimited".to_string());
                Line::from(vec![
                    Span::styled(format!("FPS {:<12}", monitor_name(monitor_id)), muted),
                    Span::styled(value, plain),
                ])
            }
            EditorRow::FpsMethod { monitor_id } => Line::from(vec![
                Span::styled(format!("  method {:<9}", monitor_name(monitor_id)), muted),
                Span::styled(game.fps_method_for(monitor_id).label().to_string(), plain),
            ]),
            EditorRow::AddFileEntry => Line::from(Span::styled(
                "[+] Add config file".to_string(),
                Style::default().fg(theme.accent),
            )),
            EditorRow::AddFolderEntry => Line::from(Span::styled(
                "[+] Add config folder".to_string(),
                Style::default().fg(theme.accent),
            )),
            EditorRow::EntryHeader { entry_id } => match find_entry(game, entry_id) {
                Some(entry_ref) => {
                    let marker = if self.settings.expanded.contains(entry_id) {
                        "v"
                    } else {
                        ">"
                    };
                    let configured = if entry_ref.target_path.is_empty() {
                        "not configured"
                    } else {
                        "configured"
                    };
                    Line::from(vec![
                        Span::styled(
                            format!("{marker} [{}] {} ", entry_ref.kind.label(), entry_ref.name),
                            plain,
                        ),
                        Span::styled(format!("({configured})"), muted),
                    ])
                }
                None => Line::default(),
            },
            EditorRow::EntryKindToggle { entry_id } => match find_entry(game, entry_id) {
                Some(entry_ref) => Line::from(vec![
                    Span::styled("    type        ", muted),
                    Span::styled(entry_ref.kind.label().to_string(), plain),
                    Span::styled("  (space toggles)", muted),
                ]),
                None => Line::default(),
            },
            EditorRow::EntryName { entry_id } => match find_entry(game, entry_id) {
                Some(entry_ref) => Line::from(vec![
                    Span::styled("    name        ", muted),
                    Span::styled(entry_ref.name.clone(), plain),
                ]),
                None => Line::default(),
            },
            EditorRow::EntrySource {
                entry_id,
                monitor_id,
            } => match find_entry(game, entry_id) {
                Some(entry_ref) => {
                    let source = entry_ref.source_for(monitor_id);
                    Line::from(vec![
                        Span::styled(format!("    {:<12}", monitor_name(monitor_id)), muted),
                        Span::styled(
                            if source.is_empty() {
                                "Not configured".to_string()
                            } else {
                                source.to_string()
                            },
                            if source.is_empty() { muted } else { plain },
                        ),
                    ])
                }
                None => Line::default(),
            },
            EditorRow::EntryTarget { entry_id } => match find_entry(game, entry_id) {
                Some(entry_ref) => Line::from(vec![
                    Span::styled("    target      ", muted),
                    Span::styled(
                        if entry_ref.target_path.is_empty() {
                            "<not set>".to_string()
                        } else {
                            entry_ref.target_path.clone()
                        },
                        plain,
                    ),
                ]),
                None => Line::default(),
            },
            EditorRow::EntryRemove { .. } => Line::from(Span::styled(
                "    Remove entry".to_string(),
                Style::default().fg(theme.danger),
            )),
            EditorRow::DeleteGame => Line::from(Span::styled(
                "Delete game".to_string(),
                Style::default()
                    .fg(theme.danger)
                    .add_modifier(Modifier::BOLD),
            )),
        };
        ListItem::new(line)
    }

    fn render_monitor_picker(&self, frame: &mut Frame, picker: &MonitorPicker) {
        let theme = &self.theme;
        let monitors = self.store.monitors();
        let game = self.store.game(&picker.game_id);
        let area = centered_rect(46, monitors.len() as u16 + 4, frame.size());
        frame.render_widget(Clear, area);

        let mut lines: Vec<Line> = Vec::new();
        for (index, monitor) in monitors.iter().enumerate() {
            let fps = game
                .as_ref()
                .and_then(|game| game.fps_lock_for(&monitor.id))
                .map(|fps| format!("{fps} FPS"))
                .unwrap_or_else(|| "Unlimited".to_string());
            let label = format!(
                "{} {} ({}) — {fps}",
                icon_tag(monitor.icon),
                monitor.name,
                monitor.resolution
            );
            let style = if index == picker.cursor {
                Style::default()
                    .bg(theme.selection_bg)
                    .fg(theme.selection_fg)
            } else {
                Style::default().fg(theme.foreground)
            };
            lines.push(Line::from(Span::styled(label, style)));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Enter launch · Esc cancel",
            Style::default().fg(theme.muted),
        )));

        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Launch on ")
                    .border_style(Style::default().fg(theme.accent)),
            ),
            area,
        );
    }

    fn render_monitor_form(&self, frame: &mut Frame, form: &MonitorForm) {
        let theme = &self.theme;
        let area = centered_rect(50, 9, frame.size());
        frame.render_widget(Clear, area);

        let title = if form.editing.is_some() {
            " Edit display "
        } else {
            " Add display "
        };
        let field_line = |index: usize, label: &str, value: String| {
            let marker = if form.field == index { "> " } else { "  " };
            Line::from(vec![
                Span::styled(
                    format!("{marker}{label:<12}"),
                    if form.field == index {
                        Style::default().fg(theme.accent)
                    } else {
                        Style::default().fg(theme.muted)
                    },
                ),
                Span::styled(value, Style::default().fg(theme.foreground)),
            ])
        };

        let icons = MonitorIcon::ALL
            .iter()
            .map(|icon| {
                if *icon == form.icon {
                    format!("[{}]", icon.label())
                } else {
                    format!(" {} ", icon.label())
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        let lines = vec![
            field_line(0, "Name", form.name.clone()),
            field_line(
                1,
                "Resolution",
                if form.resolution.is_empty() {
                    "(default 1920x1080)".to_string()
                } else {
                    form.resolution.clone()
                },
            ),
            field_line(2, "Icon", icons),
            Line::default(),
            Line::from(Span::styled(
                "Enter save · Esc cancel · Tab next field",
                Style::default().fg(theme.muted),
            )),
        ];

        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(theme.accent)),
            ),
            area,
        );
    }

    fn render_input_prompt(&self, frame: &mut Frame, prompt: &InputPrompt) {
        let theme = &self.theme;
        let area = centered_rect(64, 7, frame.size());
        frame.render_widget(Clear, area);

        let before = &prompt.input[..prompt.cursor];
        let cursor_char = prompt.input[prompt.cursor..].chars().next();
        let after: String = prompt.input[prompt.cursor..]
            .chars()
            .skip(1)
            .collect();

        let input_line = Line::from(vec![
            Span::styled(before.to_string(), Style::default().fg(theme.foreground)),
            Span::styled(
                cursor_char.map(|ch| ch.to_string()).unwrap_or_else(|| " ".to_string()),
                Style::default().bg(theme.accent).fg(theme.on_accent),
            ),
            Span::styled(after, Style::default().fg(theme.foreground)),
        ]);

        let lines = vec![
            Line::default(),
            input_line,
            Line::default(),
            Line::from(Span::styled(
                "Enter apply · Esc cancel",
                Style::default().fg(theme.muted),
            )),
        ];

        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", prompt.title))
                    .border_style(Style::default().fg(theme.accent)),
            ),
            area,
        );
    }

    fn render_confirm_discard(&self, frame: &mut Frame) {
        let theme = &self.theme;
        let area = centered_rect(46, 6, frame.size());
        frame.render_widget(Clear, area);
        let lines = vec![
            Line::from(Span::styled(
                "Discard unsaved changes?",
                Style::default().fg(theme.foreground),
            )),
            Line::default(),
            Line::from(Span::styled(
                "y discard · n keep editing",
                Style::default().fg(theme.muted),
            )),
        ];
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Unsaved changes ")
                    .border_style(Style::default().fg(theme.danger)),
            ),
            area,
        );
    }

    fn render_launch_modal(&self, frame: &mut Frame, modal: &LaunchModal) {
        let theme = &self.theme;
        let sequence = &modal.sequence;
        let jobs = sequence.swap_jobs();
        let height = (jobs.len() as u16) + 10;
        let area = centered_rect(68, height, frame.size());
        frame.render_widget(Clear, area);

        let stage = sequence.stage();
        let monitor = sequence.monitor();

        let mut lines: Vec<Line> = vec![
            Line::from(Span::styled(
                sequence.game().name.clone(),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(
                    "Launching on {} — {} / {}",
                    monitor.name,
                    monitor.resolution,
                    match sequence.fps_lock() {
                        Some(fps) =>
                            format!("{fps} FPS lock ({})", sequence.fps_method().label()),
                        None => "Unlimited FPS".to_string(),
                    }
                ),
                Style::default().fg(theme.muted),
            )),
            Line::default(),
        ];

        if !jobs.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("CONFIGS TO REPLACE ({})", jobs.len()),
                Style::default().fg(theme.muted),
            )));
            for job in &jobs {
                let marker = match stage {
                    LaunchStage::Done => Span::styled("✓ ", Style::default().fg(theme.success)),
                    LaunchStage::Swapping => {
                        Span::styled("~ ", Style::default().fg(theme.accent))
                    }
                    _ => Span::styled("· ", Style::default().fg(theme.muted)),
                };
                lines.push(Line::from(vec![
                    marker,
                    Span::styled(
                        format!("[{}] {}: ", job.kind.label(), job.name),
                        Style::default().fg(theme.foreground),
                    ),
                    Span::styled(
                        format!("{} -> {}", job.source_display(), job.target),
                        Style::default().fg(theme.muted),
                    ),
                ]));
            }
            lines.push(Line::default());
        }

        let (status_style, action_hint) = match stage {
            LaunchStage::Preview => (
                Style::default().fg(theme.foreground),
                "Enter launch · Esc close",
            ),
            LaunchStage::Swapping | LaunchStage::Launching => {
                (Style::default().fg(theme.accent), "Esc abort view")
            }
            LaunchStage::Done => (
                Style::default().fg(theme.success).add_modifier(Modifier::BOLD),
                "Enter close",
            ),
        };
        let status_text = match stage {
            LaunchStage::Launching => format!("Starting {}...", sequence.game().name),
            LaunchStage::Done => format!(
                "{} Config files swapped for {}.",
                stage.label(),
                monitor.name
            ),
            _ => stage.label().to_string(),
        };
        lines.push(Line::from(Span::styled(status_text, status_style)));
        lines.push(Line::from(Span::styled(
            action_hint.to_string(),
            Style::default().fg(theme.muted),
        )));

        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: true }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Launch ")
                    .border_style(Style::default().fg(theme.accent)),
            ),
            area,
        );
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let theme = &self.theme;
        let hint = match (self.tab, self.focus) {
            (_, Focus::Monitors) => "a add · e edit · x delete · Esc back",
            (Tab::Library, _) => "Enter launch · e edit · a add · / search · s sort · q quit",
            (Tab::Settings, _) => "Enter edit field · Space cycle · s save · 1 library · q quit",
        };
        let line = Line::from(vec![
            Span::styled(self.status.clone(), Style::default().fg(theme.foreground)),
            Span::styled(format!("  |  {hint}"), Style::default().fg(theme.muted)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamevault_core::demo;

    // An app with an open launch view already in Swapping, as if the user
    // confirmed and the first timer is in flight. event_tx stays None, so
    // no timer is actually scheduled.
    fn app_mid_launch() -> GameVaultApp {
        let store = LauncherStore::new(demo::default_monitors(), demo::demo_games());
        let mut app = GameVaultApp::new(store.clone(), AppConfig::default());
        let (game, monitor) = store
            .resolve_launch("1", "monitor-2k")
            .expect("seed catalog ids");
        let mut sequence = LaunchSequence::new(game, monitor);
        sequence.start();
        app.launch_generation += 1;
        app.launch = Some(LaunchModal {
            sequence,
            generation: app.launch_generation,
        });
        app
    }

    fn stage_of(app: &GameVaultApp) -> Option<LaunchStage> {
        app.launch.as_ref().map(|modal| modal.sequence.stage())
    }

    #[test]
    fn stale_generation_timer_is_ignored() {
        let mut app = app_mid_launch();
        app.handle_launch_advance(app.launch_generation - 1);
        assert_eq!(stage_of(&app), Some(LaunchStage::Swapping));
    }

    #[test]
    fn matching_generation_advances_to_done() {
        let mut app = app_mid_launch();
        let generation = app.launch_generation;

        app.handle_launch_advance(generation);
        assert_eq!(stage_of(&app), Some(LaunchStage::Launching));

        app.handle_launch_advance(generation);
        assert_eq!(stage_of(&app), Some(LaunchStage::Done));
    }

    #[test]
    fn timer_firing_after_close_mutates_nothing() {
        let mut app = app_mid_launch();
        let generation = app.launch_generation;
        app.close_launch();
        app.handle_launch_advance(generation);
        assert!(app.launch.is_none());
    }

    #[test]
    fn reopened_launch_ignores_the_previous_generation() {
        let mut app = app_mid_launch();
        let old_generation = app.launch_generation;
        app.close_launch();
        app.start_launch("1", "tv-4k");

        app.handle_launch_advance(old_generation);
        assert_eq!(stage_of(&app), Some(LaunchStage::Preview));
    }
}
