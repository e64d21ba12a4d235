//! Statistics calculation engine.
//!
//! Computes derived metrics from the normalized league tables:
//! - Cube card availability per draft
//! - Swiss standings and tie-breakers
//! - Card, archetype and deck type win rates
//! - Player, head-to-head and most-picked-card summaries

mod availability;
mod cards;
mod deck_index;
mod labels;
mod players;
mod standings;

pub use availability::*;
pub use cards::*;
pub use deck_index::*;
pub use labels::*;
pub use players::*;
pub use standings::*;

use crate::models::{DraftId, MatchRecord, Outcome, PlayerId, SeasonId, Seat};

/// Round to 4 decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Express a fraction as a percentage rounded to 4 decimal places.
pub fn to_percent(fraction: f64) -> f64 {
    round4(fraction * 100.0)
}

/// One seat's view of a played (non-bye) match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatResult<'a> {
    pub season_id: &'a SeasonId,
    pub draft_id: &'a DraftId,
    pub seat: Seat,
    pub player: &'a PlayerId,
    pub opponent: &'a PlayerId,
    pub outcome: Outcome,
    pub games_played: u32,
    pub games_won: u32,
}

/// Fold every played match into one result per seat. Byes are skipped.
pub fn seat_results(matches: &[MatchRecord]) -> impl Iterator<Item = SeatResult<'_>> {
    matches
        .iter()
        .filter(|m| !m.is_bye())
        .flat_map(|m| {
            [Seat::Player1, Seat::Player2].map(move |seat| SeatResult {
                season_id: &m.season_id,
                draft_id: &m.draft_id,
                seat,
                player: m.player(seat),
                opponent: m.player(seat.other()),
                outcome: m.outcome(seat),
                games_played: m.total_games(),
                games_won: m.wins(seat),
            })
        })
}
