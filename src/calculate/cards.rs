//! Per-card statistics: mainboard rate and win rates.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use super::{seat_results, AvailabilityMap, Deck, DeckIndex};
use crate::models::{
    CardGameWinRate, CardId, CardMainboardRate, CardMatchWinRate, DraftId, DraftRecord,
    MatchRecord, PlayerCardWinRate, PlayerId, SeasonId, Seat, Tally, WinRecord,
};

/// Distinct drafts per season in the drafts table.
fn drafts_per_season(drafts: &[DraftRecord]) -> BTreeMap<&SeasonId, BTreeSet<&DraftId>> {
    let mut per_season: BTreeMap<&SeasonId, BTreeSet<&DraftId>> = BTreeMap::new();
    for draft in drafts {
        per_season
            .entry(&draft.season_id)
            .or_default()
            .insert(&draft.draft_id);
    }
    per_season
}

/// Share of a season's drafts in which a card was available and made at
/// least one deck.
///
/// Only cards drafted at least once while available get a row.
pub fn card_mainboard_rates(
    drafts: &[DraftRecord],
    decks: &DeckIndex,
    availability: &AvailabilityMap,
) -> Vec<CardMainboardRate> {
    let season_drafts = drafts_per_season(drafts);

    let mut drafted: BTreeMap<(&SeasonId, &CardId), BTreeSet<&DraftId>> = BTreeMap::new();
    for (season, draft, _, deck) in decks.iter() {
        for card in &deck.cards {
            if availability.is_available(season, draft, card) {
                drafted.entry((season, card)).or_default().insert(draft);
            }
        }
    }

    let rows: Vec<CardMainboardRate> = drafted
        .into_iter()
        .map(|((season, card), card_drafts)| {
            let total = season_drafts.get(season).map_or(0, BTreeSet::len) as u32;
            let with_card = card_drafts.len() as u32;
            CardMainboardRate {
                season_id: season.clone(),
                card_id: card.clone(),
                drafts_with_card: with_card,
                total_drafts_in_season: total,
                mainboard_rate: Tally::new(total, with_card).rate(),
            }
        })
        .collect();

    info!("Calculated mainboard rates for {} cards", rows.len());
    rows
}

/// Cards held by either seat of a match that were available at its draft.
fn contested_cards<'a>(
    available: &BTreeSet<CardId>,
    deck1: Option<&'a Deck>,
    deck2: Option<&'a Deck>,
) -> BTreeSet<&'a CardId> {
    deck1
        .into_iter()
        .chain(deck2)
        .flat_map(|deck| deck.cards.iter())
        .filter(|card| available.contains(*card))
        .collect()
}

/// Match and game win rates per (season, card).
///
/// A non-bye match counts once for every available card held by either seat,
/// even when both seats hold it. The match is won if a holder won it; games
/// won are the games won by holder seats. Every card of `mainboard_rates`
/// gets a row, with zero counts when it never saw a qualifying match.
pub fn card_win_rates(
    matches: &[MatchRecord],
    decks: &DeckIndex,
    availability: &AvailabilityMap,
    mainboard_rates: &[CardMainboardRate],
) -> (Vec<CardMatchWinRate>, Vec<CardGameWinRate>) {
    let mut records: BTreeMap<(SeasonId, CardId), WinRecord> = mainboard_rates
        .iter()
        .map(|r| ((r.season_id.clone(), r.card_id.clone()), WinRecord::default()))
        .collect();

    for m in matches.iter().filter(|m| !m.is_bye()) {
        let Some(available) = availability.get(&m.season_id, &m.draft_id) else {
            continue;
        };
        let deck = |seat: Seat| decks.deck(&m.season_id, &m.draft_id, m.player(seat));
        let (deck1, deck2) = (deck(Seat::Player1), deck(Seat::Player2));
        let holds = |seat: Seat, card: &CardId| {
            decks.has_card(&m.season_id, &m.draft_id, m.player(seat), card)
        };

        for card in contested_cards(available, deck1, deck2) {
            let record = records
                .entry((m.season_id.clone(), card.clone()))
                .or_default();

            let won = m.winner().is_some_and(|seat| holds(seat, card));
            record.matches.record(won);

            let games_won = [Seat::Player1, Seat::Player2]
                .into_iter()
                .filter(|&seat| holds(seat, card))
                .map(|seat| m.wins(seat))
                .sum();
            record.games.add(m.total_games(), games_won);
        }
    }

    let match_rows = records
        .iter()
        .map(|((season, card), record)| CardMatchWinRate {
            season_id: season.clone(),
            card_id: card.clone(),
            matches_played: record.matches.played,
            matches_won: record.matches.won,
            match_win_rate: record.matches.rate(),
        })
        .collect();

    let game_rows = records
        .iter()
        .map(|((season, card), record)| CardGameWinRate {
            season_id: season.clone(),
            card_id: card.clone(),
            games_played: record.games.played,
            games_won: record.games.won,
            game_win_rate: record.games.rate(),
        })
        .collect();

    info!("Calculated card win rates for {} cards", records.len());
    (match_rows, game_rows)
}

/// A player's results in the drafts where they played each card.
///
/// Rows exist only for (season, player, card) combinations with at least one
/// non-bye match. `num_drafts_with_card` counts the player's drafts in the
/// season whose deck held the card.
pub fn player_card_win_rates(matches: &[MatchRecord], decks: &DeckIndex) -> Vec<PlayerCardWinRate> {
    let mut drafts_with_card: BTreeMap<(&SeasonId, &PlayerId, &CardId), u32> = BTreeMap::new();
    for (season, _, player, deck) in decks.iter() {
        for card in &deck.cards {
            *drafts_with_card.entry((season, player, card)).or_default() += 1;
        }
    }

    let mut records: BTreeMap<(&SeasonId, &PlayerId, &CardId), WinRecord> = BTreeMap::new();
    for result in seat_results(matches) {
        let Some(deck) = decks.deck(result.season_id, result.draft_id, result.player) else {
            continue;
        };
        for card in &deck.cards {
            records
                .entry((result.season_id, result.player, card))
                .or_default()
                .record(result.outcome, result.games_played, result.games_won);
        }
    }

    let rows: Vec<PlayerCardWinRate> = records
        .into_iter()
        .map(|((season, player, card), record)| PlayerCardWinRate {
            season_id: season.clone(),
            player: player.clone(),
            card_id: card.clone(),
            num_drafts_with_card: drafts_with_card
                .get(&(season, player, card))
                .copied()
                .unwrap_or_default(),
            matches_played: record.matches.played,
            matches_won: record.matches.won,
            match_win_rate: record.matches.rate(),
            games_played: record.games.played,
            games_won: record.games.won,
            game_win_rate: record.games.rate(),
        })
        .collect();

    info!("Calculated {} player-card win rates", rows.len());
    rows
}
