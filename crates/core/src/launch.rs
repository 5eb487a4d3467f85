//! Simulated launch sequence for a chosen game and monitor.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::{EntryKind, FpsMethod, Game, MonitorProfile};

/// Simulated time spent copying config files into the game tree.
pub const SWAP_DELAY: Duration = Duration::from_millis(1500);
/// Simulated time spent starting the executable.
pub const LAUNCH_DELAY: Duration = Duration::from_millis(1200);

/// Stage of the launch flow. Strictly linear, no error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchStage {
    /// Showing what would happen; waiting for the user to confirm.
    Preview,
    /// Config files are being copied to their targets.
    Swapping,
    /// The executable is being started.
    Launching,
    /// Terminal; the only remaining action is closing the view.
    Done,
}

impl LaunchStage {
    /// Status line shown for the stage.
    pub fn label(self) -> &'static str {
        match self {
            LaunchStage::Preview => "Ready to launch",
            LaunchStage::Swapping => "Swapping config files...",
            LaunchStage::Launching => "Starting game...",
            LaunchStage::Done => "Game launched successfully!",
        }
    }
}

/// One config entry resolved against the chosen monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapJob {
    /// File or folder.
    pub kind: EntryKind,
    /// Entry display name.
    pub name: String,
    /// Source path for the chosen monitor; empty when not configured.
    pub source: String,
    /// Destination inside the game tree.
    pub target: String,
}

impl SwapJob {
    /// Source path for display, substituting a placeholder when unset.
    pub fn source_display(&self) -> &str {
        if self.source.is_empty() {
            "Not configured"
        } else {
            &self.source
        }
    }
}

/// One invocation of the launch flow.
///
/// Reads the game and monitor, never writes them. The sequence only moves
/// forward: [`LaunchSequence::start`] leaves `Preview`, after which each
/// returned delay is the wait before the caller should call
/// [`LaunchSequence::advance`]. Dropping the sequence abandons it; no side
/// effect needs rolling back because none is real.
#[derive(Debug, Clone)]
pub struct LaunchSequence {
    game: Game,
    monitor: MonitorProfile,
    stage: LaunchStage,
}

impl LaunchSequence {
    /// Open the launch view for a game on a monitor.
    pub fn new(game: Game, monitor: MonitorProfile) -> Self {
        Self {
            game,
            monitor,
            stage: LaunchStage::Preview,
        }
    }

    /// The game being launched.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// The monitor being launched on.
    pub fn monitor(&self) -> &MonitorProfile {
        &self.monitor
    }

    /// Current stage.
    pub fn stage(&self) -> LaunchStage {
        self.stage
    }

    /// Whether the sequence has reached its terminal stage.
    pub fn is_done(&self) -> bool {
        self.stage == LaunchStage::Done
    }

    /// User-initiated start. Moves `Preview → Swapping` and returns the
    /// delay before the first automatic transition; `None` if not in
    /// `Preview`.
    pub fn start(&mut self) -> Option<Duration> {
        if self.stage != LaunchStage::Preview {
            return None;
        }
        self.stage = LaunchStage::Swapping;
        Some(SWAP_DELAY)
    }

    /// Timer-driven transition. `Swapping → Launching` returns the next
    /// delay; `Launching → Done` returns `None`; a no-op elsewhere.
    pub fn advance(&mut self) -> Option<Duration> {
        match self.stage {
            LaunchStage::Swapping => {
                self.stage = LaunchStage::Launching;
                Some(LAUNCH_DELAY)
            }
            LaunchStage::Launching => {
                self.stage = LaunchStage::Done;
                None
            }
            LaunchStage::Preview | LaunchStage::Done => None,
        }
    }

    /// FPS cap for the chosen monitor.
    pub fn fps_lock(&self) -> Option<i64> {
        self.game.fps_lock_for(&self.monitor.id)
    }

    /// Cap method for the chosen monitor, defaulting to auto.
    pub fn fps_method(&self) -> FpsMethod {
        self.game.fps_method_for(&self.monitor.id)
    }

    /// Header line, e.g. `60 FPS via Nvidia` or `Unlimited`.
    pub fn fps_summary(&self) -> String {
        match self.fps_lock() {
            Some(fps) => format!("{fps} FPS via {}", self.fps_method().label()),
            None => "Unlimited".to_string(),
        }
    }

    /// Config entries resolved against the chosen monitor, in entry order.
    pub fn swap_jobs(&self) -> Vec<SwapJob> {
        self.game
            .config_entries
            .iter()
            .map(|entry| SwapJob {
                kind: entry.kind,
                name: entry.name.clone(),
                source: entry.source_for(&self.monitor.id).to_string(),
                target: entry.target_path.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfigEntry, MonitorIcon};

    fn fixture() -> (Game, MonitorProfile) {
        let monitor = MonitorProfile {
            id: "m1".to_string(),
            name: "Primary".to_string(),
            resolution: "2560x1440".to_string(),
            icon: MonitorIcon::Monitor,
        };
        let mut game = Game::new(std::slice::from_ref(&monitor));
        game.name = "Neon Drift".to_string();
        game.fps_locks.insert("m1".to_string(), Some(120));
        game.fps_methods.insert("m1".to_string(), FpsMethod::Rtss);
        let mut entry = ConfigEntry::new(EntryKind::File, std::slice::from_ref(&monitor));
        entry.name = "video.ini".to_string();
        entry.target_path = "C:\\Games\\NeonDrift\\config\\video.ini".to_string();
        entry
            .source_paths
            .insert("m1".to_string(), "C:\\Configs\\NeonDrift\\2K\\video.ini".to_string());
        game.config_entries.push(entry);
        (game, monitor)
    }

    #[test]
    fn walks_the_four_stages_in_order() {
        let (game, monitor) = fixture();
        let mut sequence = LaunchSequence::new(game, monitor);
        assert_eq!(sequence.stage(), LaunchStage::Preview);

        assert_eq!(sequence.start(), Some(SWAP_DELAY));
        assert_eq!(sequence.stage(), LaunchStage::Swapping);

        assert_eq!(sequence.advance(), Some(LAUNCH_DELAY));
        assert_eq!(sequence.stage(), LaunchStage::Launching);

        assert_eq!(sequence.advance(), None);
        assert_eq!(sequence.stage(), LaunchStage::Done);
        assert!(sequence.is_done());

        // Terminal: further ticks change nothing.
        assert_eq!(sequence.advance(), None);
        assert_eq!(sequence.stage(), LaunchStage::Done);
    }

    #[test]
    fn advance_before_start_is_a_no_op() {
        let (game, monitor) = fixture();
        let mut sequence = LaunchSequence::new(game, monitor);
        assert_eq!(sequence.advance(), None);
        assert_eq!(sequence.stage(), LaunchStage::Preview);
    }

    #[test]
    fn start_is_only_honoured_once() {
        let (game, monitor) = fixture();
        let mut sequence = LaunchSequence::new(game, monitor);
        assert!(sequence.start().is_some());
        assert_eq!(sequence.start(), None);
        assert_eq!(sequence.stage(), LaunchStage::Swapping);
    }

    #[test]
    fn derives_fps_and_swap_display_values() {
        let (game, monitor) = fixture();
        let sequence = LaunchSequence::new(game, monitor);
        assert_eq!(sequence.fps_lock(), Some(120));
        assert_eq!(sequence.fps_summary(), "120 FPS via RTSS");

        let jobs = sequence.swap_jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "video.ini");
        assert_eq!(jobs[0].source_display(), "C:\\Configs\\NeonDrift\\2K\\video.ini");
    }

    #[test]
    fn unconfigured_source_paths_show_a_placeholder() {
        let (mut game, monitor) = fixture();
        game.config_entries[0].source_paths.insert("m1".to_string(), String::new());
        game.fps_locks.insert("m1".to_string(), None);
        game.fps_methods.remove("m1");

        let sequence = LaunchSequence::new(game, monitor);
        assert_eq!(sequence.fps_summary(), "Unlimited");
        assert_eq!(sequence.fps_method(), FpsMethod::Auto);
        assert_eq!(sequence.swap_jobs()[0].source_display(), "Not configured");
    }
}
