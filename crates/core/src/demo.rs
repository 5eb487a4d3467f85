//! Built-in demo catalog seeded on every start (nothing is persisted).

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{ConfigEntry, EntryKind, FpsMethod, Game, MonitorIcon, MonitorProfile};

/// The two seed monitor profiles.
pub fn default_monitors() -> Vec<MonitorProfile> {
    vec![
        MonitorProfile {
            id: "monitor-2k".to_string(),
            name: "Monitor 2K".to_string(),
            resolution: "2560x1440".to_string(),
            icon: MonitorIcon::Monitor,
        },
        MonitorProfile {
            id: "tv-4k".to_string(),
            name: "TV 4K".to_string(),
            resolution: "3840x2160".to_string(),
            icon: MonitorIcon::Tv,
        },
    ]
}

/// The four seed games with their per-monitor settings and config entries.
pub fn demo_games() -> Vec<Game> {
    vec![
        Game {
            id: "1".to_string(),
            name: "Stellar Odyssey".to_string(),
            executable_path: "C:\\Games\\StellarOdyssey\\game.exe".to_string(),
            cover_image: "/images/game-1.jpg".to_string(),
            fps_locks: locks(&[("monitor-2k", Some(60)), ("tv-4k", Some(30))]),
            fps_methods: methods(&[
                ("monitor-2k", FpsMethod::Nvidia),
                ("tv-4k", FpsMethod::Rtss),
            ]),
            config_entries: vec![
                entry(
                    "cfg-1",
                    EntryKind::File,
                    "graphics.ini",
                    &[
                        ("monitor-2k", "C:\\Configs\\StellarOdyssey\\2K\\graphics.ini"),
                        ("tv-4k", "C:\\Configs\\StellarOdyssey\\TV\\graphics.ini"),
                    ],
                    "C:\\Games\\StellarOdyssey\\config\\graphics.ini",
                ),
                entry(
                    "cfg-2",
                    EntryKind::Folder,
                    "settings folder",
                    &[
                        ("monitor-2k", "C:\\Configs\\StellarOdyssey\\2K\\settings"),
                        ("tv-4k", "C:\\Configs\\StellarOdyssey\\TV\\settings"),
                    ],
                    "C:\\Games\\StellarOdyssey\\config\\settings",
                ),
            ],
            last_played: date(2026, 2, 14),
            total_playtime: Some(124.0),
        },
        Game {
            id: "2".to_string(),
            name: "Dragon's Siege".to_string(),
            executable_path: "C:\\Games\\DragonsSiege\\launcher.exe".to_string(),
            cover_image: "/images/game-2.jpg".to_string(),
            fps_locks: locks(&[("monitor-2k", None), ("tv-4k", Some(60))]),
            fps_methods: methods(&[
                ("monitor-2k", FpsMethod::Auto),
                ("tv-4k", FpsMethod::Nvidia),
            ]),
            config_entries: vec![entry(
                "cfg-3",
                EntryKind::File,
                "settings.xml",
                &[
                    ("monitor-2k", "C:\\Configs\\DragonsSiege\\2K\\settings.xml"),
                    ("tv-4k", "C:\\Configs\\DragonsSiege\\TV\\settings.xml"),
                ],
                "C:\\Games\\DragonsSiege\\data\\settings.xml",
            )],
            last_played: date(2026, 2, 13),
            total_playtime: Some(87.0),
        },
        Game {
            id: "3".to_string(),
            name: "Neon Drift".to_string(),
            executable_path: "C:\\Games\\NeonDrift\\NeonDrift.exe".to_string(),
            cover_image: "/images/game-3.jpg".to_string(),
            fps_locks: locks(&[("monitor-2k", Some(120)), ("tv-4k", Some(60))]),
            fps_methods: methods(&[
                ("monitor-2k", FpsMethod::Rtss),
                ("tv-4k", FpsMethod::Auto),
            ]),
            config_entries: vec![entry(
                "cfg-4",
                EntryKind::File,
                "video.ini",
                &[
                    ("monitor-2k", "C:\\Configs\\NeonDrift\\2K\\video.ini"),
                    ("tv-4k", "C:\\Configs\\NeonDrift\\TV\\video.ini"),
                ],
                "C:\\Games\\NeonDrift\\config\\video.ini",
            )],
            last_played: date(2026, 2, 12),
            total_playtime: Some(56.0),
        },
        Game {
            id: "4".to_string(),
            name: "Wasteland Echo".to_string(),
            executable_path: "C:\\Games\\WastelandEcho\\game.exe".to_string(),
            cover_image: "/images/game-4.jpg".to_string(),
            fps_locks: locks(&[("monitor-2k", Some(60)), ("tv-4k", Some(30))]),
            fps_methods: methods(&[
                ("monitor-2k", FpsMethod::Nvidia),
                ("tv-4k", FpsMethod::Rtss),
            ]),
            config_entries: vec![
                entry(
                    "cfg-5",
                    EntryKind::File,
                    "renderer.cfg",
                    &[
                        ("monitor-2k", "C:\\Configs\\WastelandEcho\\2K\\renderer.cfg"),
                        ("tv-4k", "C:\\Configs\\WastelandEcho\\TV\\renderer.cfg"),
                    ],
                    "C:\\Games\\WastelandEcho\\settings\\renderer.cfg",
                ),
                entry(
                    "cfg-6",
                    EntryKind::Folder,
                    "user_settings",
                    &[
                        (
                            "monitor-2k",
                            "C:\\Configs\\WastelandEcho\\2K\\user_settings.ini",
                        ),
                        ("tv-4k", "C:\\Configs\\WastelandEcho\\TV\\user_settings.ini"),
                    ],
                    "C:\\Games\\WastelandEcho\\settings\\user_settings.ini",
                ),
            ],
            last_played: date(2026, 2, 10),
            total_playtime: Some(203.0),
        },
    ]
}

fn locks(pairs: &[(&str, Option<i64>)]) -> HashMap<String, Option<i64>> {
    pairs
        .iter()
        .map(|(id, value)| (id.to_string(), *value))
        .collect()
}

fn methods(pairs: &[(&str, FpsMethod)]) -> HashMap<String, FpsMethod> {
    pairs
        .iter()
        .map(|(id, value)| (id.to_string(), *value))
        .collect()
}

fn entry(
    id: &str,
    kind: EntryKind,
    name: &str,
    sources: &[(&str, &str)],
    target: &str,
) -> ConfigEntry {
    ConfigEntry {
        id: id.to_string(),
        kind,
        name: name.to_string(),
        source_paths: sources
            .iter()
            .map(|(monitor, path)| (monitor.to_string(), path.to_string()))
            .collect(),
        target_path: target.to_string(),
    }
}

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_catalog_has_expected_shape() {
        let monitors = default_monitors();
        let games = demo_games();
        assert_eq!(monitors.len(), 2);
        assert_eq!(games.len(), 4);

        for game in &games {
            for monitor in &monitors {
                assert!(game.fps_locks.contains_key(&monitor.id));
                assert!(game.fps_methods.contains_key(&monitor.id));
                for entry in &game.config_entries {
                    assert!(
                        entry.source_paths.contains_key(&monitor.id),
                        "{} missing source for {}",
                        entry.name,
                        monitor.id
                    );
                }
            }
        }
    }

    #[test]
    fn dragons_siege_is_unlimited_on_the_monitor() {
        let games = demo_games();
        let siege = games.iter().find(|g| g.name == "Dragon's Siege").expect("seeded");
        assert_eq!(siege.fps_lock_for("monitor-2k"), None);
        assert_eq!(siege.fps_lock_for("tv-4k"), Some(60));
    }
}
