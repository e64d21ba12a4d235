//! Match results between two players at a draft.

use serde::{Deserialize, Serialize};

use super::fields::deserialize_flag;
use super::{DraftId, PlayerId, SeasonId};

/// Pseudo-player name used by the pairing software for an empty seat.
pub const BYE_PLAYER: &str = "BYE";

/// Which side of a match a player sat on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Seat {
    Player1,
    Player2,
}

impl Seat {
    pub fn other(self) -> Self {
        match self {
            Seat::Player1 => Seat::Player2,
            Seat::Player2 => Seat::Player1,
        }
    }
}

/// How a match row should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// A regular match between two players
    Played,
    /// The given seat received a bye; the other seat did not participate
    Bye(Seat),
}

/// Match-level outcome from one seat's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

/// A single match row from `matches.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(default)]
    pub season_id: SeasonId,

    pub draft_id: DraftId,

    #[serde(default)]
    pub match_id: String,

    pub player1: PlayerId,
    pub player2: PlayerId,

    #[serde(rename = "player1Wins")]
    pub player1_wins: u32,

    #[serde(rename = "player2Wins")]
    pub player2_wins: u32,

    #[serde(default)]
    pub draws: u32,

    #[serde(
        rename = "player1Bye",
        default,
        deserialize_with = "deserialize_flag"
    )]
    pub player1_bye: bool,

    #[serde(
        rename = "player2Bye",
        default,
        deserialize_with = "deserialize_flag"
    )]
    pub player2_bye: bool,

    #[serde(default)]
    pub round: Option<u32>,
}

impl MatchRecord {
    /// Create a regular match with a generated match ID.
    pub fn new(
        season_id: impl Into<SeasonId>,
        draft_id: impl Into<DraftId>,
        player1: impl Into<PlayerId>,
        player2: impl Into<PlayerId>,
        player1_wins: u32,
        player2_wins: u32,
        draws: u32,
    ) -> Self {
        let mut record = Self {
            season_id: season_id.into(),
            draft_id: draft_id.into(),
            match_id: String::new(),
            player1: player1.into(),
            player2: player2.into(),
            player1_wins,
            player2_wins,
            draws,
            player1_bye: false,
            player2_bye: false,
            round: None,
        };
        record.match_id = record.generated_match_id();
        record
    }

    /// Mark a seat as having received a bye.
    pub fn with_bye(mut self, seat: Seat) -> Self {
        match seat {
            Seat::Player1 => self.player1_bye = true,
            Seat::Player2 => self.player2_bye = true,
        }
        self
    }

    /// Set the round number.
    pub fn with_round(mut self, round: u32) -> Self {
        self.round = Some(round);
        self.match_id = self.generated_match_id();
        self
    }

    /// `season_draft_round_player1_player2`, the export's match ID scheme.
    pub fn generated_match_id(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.season_id,
            self.draft_id,
            self.round.map(|r| r.to_string()).unwrap_or_default(),
            self.player1,
            self.player2
        )
    }

    /// Classify the row. Player 1's bye takes precedence if both flags are set.
    pub fn kind(&self) -> MatchKind {
        if self.player1_bye || is_bye_player(&self.player2) {
            MatchKind::Bye(Seat::Player1)
        } else if self.player2_bye || is_bye_player(&self.player1) {
            MatchKind::Bye(Seat::Player2)
        } else {
            MatchKind::Played
        }
    }

    pub fn is_bye(&self) -> bool {
        !matches!(self.kind(), MatchKind::Played)
    }

    pub fn player(&self, seat: Seat) -> &PlayerId {
        match seat {
            Seat::Player1 => &self.player1,
            Seat::Player2 => &self.player2,
        }
    }

    /// Games won by a seat.
    pub fn wins(&self, seat: Seat) -> u32 {
        match seat {
            Seat::Player1 => self.player1_wins,
            Seat::Player2 => self.player2_wins,
        }
    }

    /// Total games in the match, drawn games included.
    pub fn total_games(&self) -> u32 {
        self.player1_wins + self.player2_wins + self.draws
    }

    /// Match outcome for a seat, decided by games won.
    pub fn outcome(&self, seat: Seat) -> Outcome {
        let mine = self.wins(seat);
        let theirs = self.wins(seat.other());
        if mine > theirs {
            Outcome::Win
        } else if mine == theirs {
            Outcome::Draw
        } else {
            Outcome::Loss
        }
    }

    /// The seat that won the match, if any.
    pub fn winner(&self) -> Option<Seat> {
        [Seat::Player1, Seat::Player2]
            .into_iter()
            .find(|&seat| self.outcome(seat) == Outcome::Win)
    }
}

fn is_bye_player(player: &PlayerId) -> bool {
    player.as_str().eq_ignore_ascii_case(BYE_PLAYER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_creation() {
        let m = MatchRecord::new("S1", "20210510", "Alice", "Bob", 2, 1, 0).with_round(1);

        assert_eq!(m.player1.as_str(), "Alice");
        assert_eq!(m.total_games(), 3);
        assert_eq!(m.match_id, "S1_20210510_1_Alice_Bob");
        assert_eq!(m.kind(), MatchKind::Played);
    }

    #[test]
    fn test_outcomes() {
        let m = MatchRecord::new("S1", "1", "Alice", "Bob", 2, 1, 0);
        assert_eq!(m.outcome(Seat::Player1), Outcome::Win);
        assert_eq!(m.outcome(Seat::Player2), Outcome::Loss);
        assert_eq!(m.winner(), Some(Seat::Player1));

        let drawn = MatchRecord::new("S1", "1", "Alice", "Bob", 1, 1, 1);
        assert_eq!(drawn.outcome(Seat::Player1), Outcome::Draw);
        assert_eq!(drawn.winner(), None);
    }

    #[test]
    fn test_bye_flags() {
        let m = MatchRecord::new("S1", "1", "Alice", "Bob", 0, 0, 0).with_bye(Seat::Player2);
        assert_eq!(m.kind(), MatchKind::Bye(Seat::Player2));
        assert!(m.is_bye());

        let both = MatchRecord::new("S1", "1", "Alice", "Bob", 0, 0, 0)
            .with_bye(Seat::Player1)
            .with_bye(Seat::Player2);
        assert_eq!(both.kind(), MatchKind::Bye(Seat::Player1));
    }

    #[test]
    fn test_bye_pseudo_player() {
        let m = MatchRecord::new("S1", "1", "Alice", "BYE", 0, 0, 0);
        assert_eq!(m.kind(), MatchKind::Bye(Seat::Player1));

        let m = MatchRecord::new("S1", "1", "bye", "Bob", 0, 0, 0);
        assert_eq!(m.kind(), MatchKind::Bye(Seat::Player2));
    }

    #[test]
    fn test_deserialize_csv_row_without_bye_columns() {
        let data = "\
season_id,draft_id,match_id,player1,player2,player1Wins,player2Wins,draws,round
Season-1,20210510,m1,Alice,Bob,2,0,0,1
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<MatchRecord> = reader.deserialize().collect::<Result<_, _>>().unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player1_wins, 2);
        assert!(!rows[0].player1_bye);
        assert_eq!(rows[0].round, Some(1));
    }

    #[test]
    fn test_deserialize_csv_row_with_bye_columns() {
        let data = "\
season_id,draft_id,match_id,player1,player2,player1Wins,player2Wins,draws,player1Bye,player2Bye,round
Season-1,20210510,m1,Alice,Bob,0,0,0,True,False,1
Season-1,20210510,m2,Carol,Dave,2,1,0,,,1
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<MatchRecord> = reader.deserialize().collect::<Result<_, _>>().unwrap();

        assert_eq!(rows[0].kind(), MatchKind::Bye(Seat::Player1));
        assert_eq!(rows[1].kind(), MatchKind::Played);
    }
}
