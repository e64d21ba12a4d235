//! Archetype and deck type statistics.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use super::{seat_results, DeckIndex};
use crate::models::{
    DeckLabel, LabelGameWinRate, LabelMatchWinRate, MatchRecord, PlayerId,
    PlayerLabelWinRate, SeasonId, Seat, WinRecord,
};

/// Match and game win rates per (season, label).
///
/// Aggregates like cards: a match counts once for each distinct label on
/// either seat, is won if a seat with that label won, and credits the games
/// won by every seat with that label. Byes and seats without a label are
/// skipped.
pub fn label_win_rates(
    matches: &[MatchRecord],
    decks: &DeckIndex,
    label: DeckLabel,
) -> (Vec<LabelMatchWinRate>, Vec<LabelGameWinRate>) {
    let mut records: BTreeMap<(&SeasonId, &str), WinRecord> = BTreeMap::new();

    for m in matches.iter().filter(|m| !m.is_bye()) {
        let seat_label = |seat: Seat| decks.label(&m.season_id, &m.draft_id, m.player(seat), label);
        let labels = [
            (Seat::Player1, seat_label(Seat::Player1)),
            (Seat::Player2, seat_label(Seat::Player2)),
        ];

        let distinct: BTreeSet<&str> = labels.iter().filter_map(|(_, l)| *l).collect();
        for value in distinct {
            let holders = || {
                labels
                    .iter()
                    .filter(move |(_, l)| *l == Some(value))
                    .map(|(seat, _)| *seat)
            };

            let record = records.entry((&m.season_id, value)).or_default();
            let won = m.winner().is_some_and(|winner| holders().any(|s| s == winner));
            record.matches.record(won);
            record
                .games
                .add(m.total_games(), holders().map(|s| m.wins(s)).sum());
        }
    }

    let match_rows = records
        .iter()
        .map(|((season, value), record)| LabelMatchWinRate {
            season_id: (*season).clone(),
            label: value.to_string(),
            matches_played: record.matches.played,
            matches_won: record.matches.won,
            match_win_rate: record.matches.rate(),
        })
        .collect();

    let game_rows = records
        .iter()
        .map(|((season, value), record)| LabelGameWinRate {
            season_id: (*season).clone(),
            label: value.to_string(),
            games_played: record.games.played,
            games_won: record.games.won,
            game_win_rate: record.games.rate(),
        })
        .collect();

    info!("Calculated {} win rates for {} values", label, records.len());
    (match_rows, game_rows)
}

/// A player's results per (season, label) of the decks they piloted.
pub fn player_label_win_rates(
    matches: &[MatchRecord],
    decks: &DeckIndex,
    label: DeckLabel,
) -> Vec<PlayerLabelWinRate> {
    let mut records: BTreeMap<(&SeasonId, &PlayerId, &str), WinRecord> = BTreeMap::new();

    for result in seat_results(matches) {
        let Some(value) = decks.label(result.season_id, result.draft_id, result.player, label)
        else {
            continue;
        };
        records
            .entry((result.season_id, result.player, value))
            .or_default()
            .record(result.outcome, result.games_played, result.games_won);
    }

    let rows: Vec<PlayerLabelWinRate> = records
        .into_iter()
        .map(|((season, player, value), record)| PlayerLabelWinRate {
            season_id: season.clone(),
            player: player.clone(),
            label: value.to_string(),
            matches_played: record.matches.played,
            matches_won: record.matches.won,
            match_win_rate: record.matches.rate(),
            games_played: record.games.played,
            games_won: record.games.won,
            game_win_rate: record.games.rate(),
        })
        .collect();

    info!("Calculated {} player {} win rates", rows.len(), label);
    rows
}
