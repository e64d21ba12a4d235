//! Derived statistics rows.

use serde::{Deserialize, Serialize};

use super::{CardId, DraftId, Outcome, PlayerId, SeasonId};

/// Played/won counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub played: u32,
    pub won: u32,
}

impl Tally {
    pub fn new(played: u32, won: u32) -> Self {
        Self { played, won }
    }

    /// Record one observation.
    pub fn record(&mut self, won: bool) {
        self.add(1, u32::from(won));
    }

    /// Record several observations at once.
    pub fn add(&mut self, played: u32, won: u32) {
        self.played += played;
        self.won += won;
    }

    /// Win rate as a fraction (0.0 to 1.0), `None` when nothing was played.
    pub fn rate(&self) -> Option<f64> {
        (self.played > 0).then(|| self.won as f64 / self.played as f64)
    }
}

/// Match and game tallies for one aggregation key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WinRecord {
    pub matches: Tally,
    pub games: Tally,
    pub matches_drawn: u32,
}

impl WinRecord {
    /// Record one match from a seat's perspective. Drawn matches and games
    /// count as played but never as won.
    pub fn record(&mut self, outcome: Outcome, games_played: u32, games_won: u32) {
        self.matches.record(outcome == Outcome::Win);
        if outcome == Outcome::Draw {
            self.matches_drawn += 1;
        }
        self.games.add(games_played, games_won);
    }
}

/// Final standing of a player at a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub season_id: SeasonId,
    pub draft_id: DraftId,
    pub player: PlayerId,
    pub match_points: u32,
    pub standing: u32,
    pub game_points: u32,
    pub matches_played: u32,
    pub games_played: u32,
    pub byes: u32,

    /// Match-win percentage (0 to 100)
    #[serde(rename = "MWP")]
    pub mwp: f64,

    /// Opponents' match-win percentage, floored per opponent
    #[serde(rename = "OMP")]
    pub omp: f64,

    /// Game-win percentage (0 to 100)
    #[serde(rename = "GWP")]
    pub gwp: f64,

    /// Opponents' game-win percentage, floored per opponent
    #[serde(rename = "OGP")]
    pub ogp: f64,
}

/// How often a card made a deck while it was in the cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardMainboardRate {
    pub season_id: SeasonId,
    #[serde(rename = "scryfallId")]
    pub card_id: CardId,
    pub drafts_with_card: u32,
    pub total_drafts_in_season: u32,
    pub mainboard_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardMatchWinRate {
    pub season_id: SeasonId,
    #[serde(rename = "scryfallId")]
    pub card_id: CardId,
    pub matches_played: u32,
    pub matches_won: u32,
    pub match_win_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardGameWinRate {
    pub season_id: SeasonId,
    #[serde(rename = "scryfallId")]
    pub card_id: CardId,
    pub games_played: u32,
    pub games_won: u32,
    pub game_win_rate: Option<f64>,
}

/// Match win rate of an archetype or deck type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMatchWinRate {
    pub season_id: SeasonId,
    pub label: String,
    pub matches_played: u32,
    pub matches_won: u32,
    pub match_win_rate: Option<f64>,
}

/// Game win rate of an archetype or deck type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelGameWinRate {
    pub season_id: SeasonId,
    pub label: String,
    pub games_played: u32,
    pub games_won: u32,
    pub game_win_rate: Option<f64>,
}

/// A player's results while piloting one archetype or deck type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerLabelWinRate {
    pub season_id: SeasonId,
    pub player: PlayerId,
    pub label: String,
    pub matches_played: u32,
    pub matches_won: u32,
    pub match_win_rate: Option<f64>,
    pub games_played: u32,
    pub games_won: u32,
    pub game_win_rate: Option<f64>,
}

/// A player's results in the drafts where they played a given card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCardWinRate {
    pub season_id: SeasonId,
    pub player: PlayerId,
    #[serde(rename = "scryfallId")]
    pub card_id: CardId,
    pub num_drafts_with_card: u32,
    pub matches_played: u32,
    pub matches_won: u32,
    pub match_win_rate: Option<f64>,
    pub games_played: u32,
    pub games_won: u32,
    pub game_win_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MostPickedCard {
    pub player: PlayerId,
    #[serde(rename = "scryfallId")]
    pub card_id: CardId,
    pub pick_count: u32,
}

/// Overall results of a player in a season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerWinRate {
    pub season_id: SeasonId,
    pub player: PlayerId,
    pub matches_played: u32,
    pub matches_won: u32,
    pub matches_drawn: u32,
    pub match_win_rate: Option<f64>,
    pub games_played: u32,
    pub games_won: u32,
    pub game_win_rate: Option<f64>,
}

/// Head-to-head results of a player against one opponent in a season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VsPlayerWinRate {
    pub season_id: SeasonId,
    pub player: PlayerId,
    pub opponent: PlayerId,
    pub matches_played: u32,
    pub matches_won: u32,
    pub matches_drawn: u32,
    pub match_win_rate: Option<f64>,
    pub games_played: u32,
    pub games_won: u32,
    pub game_win_rate: Option<f64>,
}

/// One card available at one draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRow {
    pub season_id: SeasonId,
    pub draft_id: DraftId,
    #[serde(rename = "scryfallId")]
    pub card_id: CardId,
}
