//! Library filtering and sorting.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::Game;

/// Sort key for the library view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Most recently played first.
    #[default]
    Recent,
    /// Alphabetical by name.
    Name,
    /// Most hours played first.
    Playtime,
}

impl SortKey {
    /// Display label for the toolbar.
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Recent => "recent",
            SortKey::Name => "name",
            SortKey::Playtime => "playtime",
        }
    }

    /// Next key in toolbar order (recent → name → playtime → recent).
    pub fn next(self) -> Self {
        match self {
            SortKey::Recent => SortKey::Name,
            SortKey::Name => SortKey::Playtime,
            SortKey::Playtime => SortKey::Recent,
        }
    }

    /// Parse a configured sort key, falling back to the default.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "name" => SortKey::Name,
            "playtime" => SortKey::Playtime,
            _ => SortKey::Recent,
        }
    }
}

/// Filter by case-insensitive name substring, then sort by the given key.
///
/// The input order is never mutated; the sort is stable, so equal keys keep
/// their catalog order.
pub fn filter_and_sort(games: &[Game], query: &str, sort: SortKey) -> Vec<Game> {
    let needle = query.trim().to_lowercase();
    let mut result: Vec<Game> = games
        .iter()
        .filter(|game| needle.is_empty() || game.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    result.sort_by(|a, b| compare(a, b, sort));
    result
}

fn compare(a: &Game, b: &Game, sort: SortKey) -> Ordering {
    match sort {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Playtime => {
            let left = b.total_playtime.unwrap_or(0.0);
            let right = a.total_playtime.unwrap_or(0.0);
            left.total_cmp(&right)
        }
        // Descending by date; games never played sort last.
        SortKey::Recent => b.last_played.cmp(&a.last_played),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn game(name: &str, playtime: Option<f64>, played: Option<&str>) -> Game {
        let mut game = Game::new(&[]);
        game.name = name.to_string();
        game.total_playtime = playtime;
        game.last_played = played.map(|value| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date literal")
        });
        game
    }

    #[test]
    fn filters_by_case_insensitive_substring() {
        let games = [
            game("Neon Drift", None, None),
            game("Stellar Odyssey", None, None),
        ];
        let hits = filter_and_sort(&games, "NEON", SortKey::Name);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Neon Drift");
    }

    #[test]
    fn sorts_by_playtime_descending() {
        let games = [
            game("Neon Drift", Some(56.0), None),
            game("Stellar Odyssey", Some(124.0), None),
        ];
        let sorted = filter_and_sort(&games, "", SortKey::Playtime);
        let names: Vec<&str> = sorted.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Stellar Odyssey", "Neon Drift"]);
    }

    #[test]
    fn missing_playtime_counts_as_zero() {
        let games = [
            game("Unplayed", None, None),
            game("Played", Some(1.0), None),
        ];
        let sorted = filter_and_sort(&games, "", SortKey::Playtime);
        assert_eq!(sorted[0].name, "Played");
    }

    #[test]
    fn recent_sorts_unplayed_last() {
        let games = [
            game("Never", None, None),
            game("Old", None, Some("2026-02-10")),
            game("Fresh", None, Some("2026-02-14")),
        ];
        let sorted = filter_and_sort(&games, "", SortKey::Recent);
        let names: Vec<&str> = sorted.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Fresh", "Old", "Never"]);
    }

    #[test]
    fn name_sort_is_idempotent() {
        let games = [
            game("delta", None, None),
            game("Alpha", None, None),
            game("charlie", None, None),
        ];
        let once = filter_and_sort(&games, "", SortKey::Name);
        let twice = filter_and_sort(&once, "", SortKey::Name);
        assert_eq!(once, twice);
        assert_eq!(once[0].name, "Alpha");
    }

    #[test]
    fn input_slice_is_untouched() {
        let games = [
            game("b", None, None),
            game("a", None, None),
        ];
        let _ = filter_and_sort(&games, "", SortKey::Name);
        assert_eq!(games[0].name, "b");
    }

    #[test]
    fn sort_key_cycle_covers_all_keys() {
        let start = SortKey::Recent;
        assert_eq!(start.next(), SortKey::Name);
        assert_eq!(start.next().next(), SortKey::Playtime);
        assert_eq!(start.next().next().next(), start);
        assert_eq!(SortKey::parse("PlayTime"), SortKey::Playtime);
        assert_eq!(SortKey::parse("bogus"), SortKey::Recent);
    }
}
