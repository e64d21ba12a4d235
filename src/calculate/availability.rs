//! Cube card availability per draft.
//!
//! The mainboard snapshot is the only ground truth about cube contents. The
//! change log is replayed from that anchor: forward for drafts after the
//! snapshot, backward (with every change inverted) for drafts before it.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{
    AvailabilityRow, CardChange, CardId, ChangeType, DraftId, DraftRecord, MainboardCard, SeasonId,
};

/// Replay order of change events that share a timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SameTimestampOrder {
    /// Keep the order of the change log file
    #[default]
    Input,
    AddsFirst,
    RemovesFirst,
}

impl SameTimestampOrder {
    /// Secondary sort key for a change within its timestamp.
    fn rank(self, change_type: ChangeType) -> u8 {
        match (self, change_type) {
            (SameTimestampOrder::Input, _) => 0,
            (SameTimestampOrder::AddsFirst, ChangeType::Adds) => 0,
            (SameTimestampOrder::RemovesFirst, ChangeType::Removes) => 0,
            _ => 1,
        }
    }
}

/// Cards available at every draft, keyed by season then draft.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityMap {
    seasons: BTreeMap<SeasonId, BTreeMap<DraftId, BTreeSet<CardId>>>,
}

impl AvailabilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cards available at a draft, if the draft is known.
    pub fn get(&self, season: &SeasonId, draft: &DraftId) -> Option<&BTreeSet<CardId>> {
        self.seasons.get(season)?.get(draft)
    }

    /// Whether a card was in the cube at a draft. Unknown seasons, drafts and
    /// cards are unavailable.
    pub fn is_available(&self, season: &SeasonId, draft: &DraftId, card: &CardId) -> bool {
        self.get(season, draft)
            .is_some_and(|cards| cards.contains(card))
    }

    /// Drafts of a season with their available cards.
    pub fn drafts(&self, season: &SeasonId) -> Option<&BTreeMap<DraftId, BTreeSet<CardId>>> {
        self.seasons.get(season)
    }

    pub fn seasons(&self) -> impl Iterator<Item = &SeasonId> {
        self.seasons.keys()
    }

    /// Number of (season, draft) entries.
    pub fn len(&self) -> usize {
        self.seasons.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into one row per available card, sorted by season, draft and card.
    pub fn rows(&self) -> Vec<AvailabilityRow> {
        let mut rows = Vec::new();
        for (season, drafts) in &self.seasons {
            for (draft, cards) in drafts {
                rows.extend(cards.iter().map(|card| AvailabilityRow {
                    season_id: season.clone(),
                    draft_id: draft.clone(),
                    card_id: card.clone(),
                }));
            }
        }
        rows
    }

    fn insert(&mut self, season: SeasonId, draft: DraftId, cards: BTreeSet<CardId>) {
        self.seasons.entry(season).or_default().insert(draft, cards);
    }
}

/// Latest snapshot of a season's mainboard.
struct Anchor {
    timestamp: NaiveDateTime,
    cards: BTreeSet<CardId>,
}

fn apply(cards: &mut BTreeSet<CardId>, change: &CardChange) {
    match change.change_type {
        ChangeType::Adds => {
            cards.insert(change.card_id.clone());
        }
        ChangeType::Removes => {
            cards.remove(&change.card_id);
        }
    }
}

fn revert(cards: &mut BTreeSet<CardId>, change: &CardChange) {
    match change.change_type {
        ChangeType::Adds => {
            cards.remove(&change.card_id);
        }
        ChangeType::Removes => {
            cards.insert(change.card_id.clone());
        }
    }
}

/// Group mainboard rows by season, keeping only each season's latest snapshot.
fn anchors(mainboard: &[MainboardCard]) -> BTreeMap<&SeasonId, Anchor> {
    let mut latest: BTreeMap<&SeasonId, NaiveDateTime> = BTreeMap::new();
    for row in mainboard {
        latest
            .entry(&row.season_id)
            .and_modify(|ts| *ts = (*ts).max(row.timestamp))
            .or_insert(row.timestamp);
    }

    let mut anchors: BTreeMap<&SeasonId, Anchor> = latest
        .into_iter()
        .map(|(season, timestamp)| {
            (
                season,
                Anchor {
                    timestamp,
                    cards: BTreeSet::new(),
                },
            )
        })
        .collect();

    for row in mainboard {
        if let Some(anchor) = anchors.get_mut(&row.season_id) {
            if anchor.timestamp == row.timestamp {
                anchor.cards.insert(row.card_id.clone());
            }
        }
    }

    anchors
}

/// Cards available at one draft, given the season's ordered change log.
///
/// Changes stamped at the snapshot instant are treated as happening just
/// after it: they replay forward for later drafts and are never reverted.
fn reconstruct(
    anchor: Option<&Anchor>,
    changes: &[&CardChange],
    draft_time: NaiveDateTime,
) -> BTreeSet<CardId> {
    let Some(anchor) = anchor else {
        let mut cards = BTreeSet::new();
        for change in changes.iter().take_while(|c| c.timestamp <= draft_time) {
            apply(&mut cards, change);
        }
        return cards;
    };

    let mut cards = anchor.cards.clone();
    if draft_time >= anchor.timestamp {
        for change in changes
            .iter()
            .filter(|c| c.timestamp >= anchor.timestamp && c.timestamp <= draft_time)
        {
            apply(&mut cards, change);
        }
    } else {
        for change in changes
            .iter()
            .rev()
            .filter(|c| c.timestamp > draft_time && c.timestamp < anchor.timestamp)
        {
            revert(&mut cards, change);
        }
    }
    cards
}

/// Reconstruct the available cards of every draft.
///
/// Every (season, draft) pair of `drafts` gets exactly one entry, possibly
/// empty. A season without a mainboard snapshot is replayed forward from an
/// empty cube.
pub fn build_availability_map(
    changes: &[CardChange],
    drafts: &[DraftRecord],
    mainboard: &[MainboardCard],
    order: SameTimestampOrder,
) -> AvailabilityMap {
    let anchors = anchors(mainboard);

    let mut changes_by_season: BTreeMap<&SeasonId, Vec<&CardChange>> = BTreeMap::new();
    for change in changes {
        changes_by_season
            .entry(&change.season_id)
            .or_default()
            .push(change);
    }
    for season_changes in changes_by_season.values_mut() {
        season_changes.sort_by_key(|c| (c.timestamp, order.rank(c.change_type)));
    }

    let mut drafts_by_season: BTreeMap<&SeasonId, BTreeMap<&DraftId, NaiveDateTime>> =
        BTreeMap::new();
    for draft in drafts {
        let season_drafts = drafts_by_season.entry(&draft.season_id).or_default();
        if let Some(existing) = season_drafts.get(&draft.draft_id) {
            if *existing != draft.timestamp {
                warn!(
                    "Draft {} in {} listed with conflicting timestamps, keeping {}",
                    draft.draft_id, draft.season_id, existing
                );
            }
            continue;
        }
        season_drafts.insert(&draft.draft_id, draft.timestamp);
    }

    let mut map = AvailabilityMap::new();
    let no_changes = Vec::new();

    for (season, season_drafts) in drafts_by_season {
        let anchor = anchors.get(season);
        if anchor.is_none() {
            warn!(
                "No mainboard snapshot for {}, replaying change log from an empty cube",
                season
            );
        }
        let season_changes = changes_by_season.get(season).unwrap_or(&no_changes);

        for (draft, draft_time) in season_drafts {
            let cards = reconstruct(anchor, season_changes, draft_time);
            debug!("{} {}: {} cards available", season, draft, cards.len());
            map.insert(season.clone(), draft.clone(), cards);
        }
    }

    info!("Reconstructed availability for {} drafts", map.len());
    map
}
