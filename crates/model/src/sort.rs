//! Ordering policies applied to the merged game list.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::game::Game;
use crate::platform::Platform;

/// How the merged list is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// By title, case-insensitively.
    #[default]
    Alphabetical,
    /// Most recently played first; titles without activity keep discovery order.
    LastPlayed,
    /// By platform priority; unknown labels last.
    Platform,
    /// As discovered, no reordering.
    Discovered,
}

/// Sorts games in place. Every policy is stable and idempotent.
pub fn sort_games(games: &mut [Game], order: SortOrder) {
    match order {
        SortOrder::Alphabetical => games.sort_by(compare_titles),
        SortOrder::LastPlayed => games.sort_by(|a, b| {
            match (a.details.last_activity, b.details.last_activity) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }),
        SortOrder::Platform => games.sort_by_key(|g| Platform::rank(&g.platform)),
        SortOrder::Discovered => {}
    }
}

fn compare_titles(a: &Game, b: &Game) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
}
