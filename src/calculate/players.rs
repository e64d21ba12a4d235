//! Player summaries: overall and head-to-head win rates, favourite cards.

use std::collections::BTreeMap;

use tracing::info;

use super::{seat_results, DeckIndex};
use crate::models::{
    CardId, MatchRecord, MostPickedCard, PlayerId, PlayerWinRate, SeasonId, VsPlayerWinRate,
    WinRecord,
};

/// Overall results per (season, player). Byes are excluded.
pub fn player_win_rates(matches: &[MatchRecord]) -> Vec<PlayerWinRate> {
    let mut records: BTreeMap<(&SeasonId, &PlayerId), WinRecord> = BTreeMap::new();
    for result in seat_results(matches) {
        records
            .entry((result.season_id, result.player))
            .or_default()
            .record(result.outcome, result.games_played, result.games_won);
    }

    let rows: Vec<PlayerWinRate> = records
        .into_iter()
        .map(|((season, player), record)| PlayerWinRate {
            season_id: season.clone(),
            player: player.clone(),
            matches_played: record.matches.played,
            matches_won: record.matches.won,
            matches_drawn: record.matches_drawn,
            match_win_rate: record.matches.rate(),
            games_played: record.games.played,
            games_won: record.games.won,
            game_win_rate: record.games.rate(),
        })
        .collect();

    info!("Calculated win rates for {} player seasons", rows.len());
    rows
}

/// Head-to-head results per (season, player, opponent). Byes are excluded.
pub fn vs_player_win_rates(matches: &[MatchRecord]) -> Vec<VsPlayerWinRate> {
    let mut records: BTreeMap<(&SeasonId, &PlayerId, &PlayerId), WinRecord> = BTreeMap::new();
    for result in seat_results(matches) {
        records
            .entry((result.season_id, result.player, result.opponent))
            .or_default()
            .record(result.outcome, result.games_played, result.games_won);
    }

    let rows: Vec<VsPlayerWinRate> = records
        .into_iter()
        .map(|((season, player, opponent), record)| VsPlayerWinRate {
            season_id: season.clone(),
            player: player.clone(),
            opponent: opponent.clone(),
            matches_played: record.matches.played,
            matches_won: record.matches.won,
            matches_drawn: record.matches_drawn,
            match_win_rate: record.matches.rate(),
            games_played: record.games.played,
            games_won: record.games.won,
            game_win_rate: record.games.rate(),
        })
        .collect();

    info!("Calculated {} head-to-head records", rows.len());
    rows
}

/// The card each player put in the most decks, across all seasons.
/// Ties go to the lowest card ID.
pub fn most_picked_cards(decks: &DeckIndex) -> Vec<MostPickedCard> {
    let mut picks: BTreeMap<&PlayerId, BTreeMap<&CardId, u32>> = BTreeMap::new();
    for (_, _, player, deck) in decks.iter() {
        let counts = picks.entry(player).or_default();
        for card in &deck.cards {
            *counts.entry(card).or_default() += 1;
        }
    }

    picks
        .into_iter()
        .filter_map(|(player, counts)| {
            let mut best: Option<(&CardId, u32)> = None;
            for (card, count) in counts {
                if best.map_or(true, |(_, top)| count > top) {
                    best = Some((card, count));
                }
            }
            best.map(|(card, count)| MostPickedCard {
                player: player.clone(),
                card_id: card.clone(),
                pick_count: count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeckEntry;
    use pretty_assertions::assert_eq;

    fn played(p1: &str, p2: &str, w1: u32, w2: u32, draws: u32) -> MatchRecord {
        MatchRecord::new("S1", "d1", p1, p2, w1, w2, draws)
    }

    #[test]
    fn test_player_win_rates_fold_seats() {
        let matches = vec![
            played("Alice", "Bob", 2, 0, 0),
            played("Bob", "Alice", 2, 1, 0),
            played("Alice", "Carol", 1, 1, 0),
            played("Alice", "BYE", 0, 0, 0),
        ];
        let rows = player_win_rates(&matches);

        let alice = rows.iter().find(|r| r.player.as_str() == "Alice").unwrap();
        assert_eq!(alice.matches_played, 3);
        assert_eq!(alice.matches_won, 1);
        assert_eq!(alice.matches_drawn, 1);
        assert_eq!(alice.games_played, 7);
        assert_eq!(alice.games_won, 4);
        assert!(rows.iter().all(|r| !r.player.as_str().eq_ignore_ascii_case("bye")));
    }

    #[test]
    fn test_vs_player_win_rates() {
        let matches = vec![
            played("Alice", "Bob", 2, 0, 0),
            played("Bob", "Alice", 2, 1, 0),
        ];
        let rows = vs_player_win_rates(&matches);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].player.as_str(), "Alice");
        assert_eq!(rows[0].opponent.as_str(), "Bob");
        assert_eq!((rows[0].matches_played, rows[0].matches_won), (2, 1));
        assert_eq!(rows[0].match_win_rate, Some(0.5));
        assert_eq!((rows[1].games_played, rows[1].games_won), (5, 2));
    }

    #[test]
    fn test_most_picked_card_counts_distinct_drafts() {
        let decks = DeckIndex::new(&[
            DeckEntry::new("S1", "d1", "Alice", "B"),
            DeckEntry::new("S1", "d1", "Alice", "B"),
            DeckEntry::new("S1", "d1", "Alice", "C"),
            DeckEntry::new("S1", "d2", "Alice", "C"),
            DeckEntry::new("S2", "d3", "Alice", "C"),
            DeckEntry::new("S1", "d1", "Bob", "Z"),
            DeckEntry::new("S1", "d1", "Bob", "Y"),
        ]);
        let rows = most_picked_cards(&decks);

        assert_eq!(
            rows,
            vec![
                MostPickedCard {
                    player: "Alice".into(),
                    card_id: "C".into(),
                    pick_count: 3,
                },
                MostPickedCard {
                    player: "Bob".into(),
                    card_id: "Y".into(),
                    pick_count: 1,
                },
            ]
        );
    }
}
