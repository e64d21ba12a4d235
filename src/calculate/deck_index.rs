//! De-duplicated view of the drafted decks table.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::models::{CardId, DeckEntry, DeckLabel, DraftId, PlayerId, SeasonId};

/// One player's deck at one draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    pub cards: BTreeSet<CardId>,
    pub archetype: Option<String>,
    pub decktype: Option<String>,
}

impl Deck {
    pub fn label(&self, label: DeckLabel) -> Option<&str> {
        match label {
            DeckLabel::Archetype => self.archetype.as_deref(),
            DeckLabel::Decktype => self.decktype.as_deref(),
        }
    }

    pub fn has_card(&self, card: &CardId) -> bool {
        self.cards.contains(card)
    }

    /// Record a label unless one is already set. Returns the kept label when
    /// it conflicts with `value`.
    fn set_label(&mut self, label: DeckLabel, value: &str) -> Option<String> {
        let slot = match label {
            DeckLabel::Archetype => &mut self.archetype,
            DeckLabel::Decktype => &mut self.decktype,
        };
        match slot.as_deref() {
            None => {
                *slot = Some(value.to_string());
                None
            }
            Some(existing) if existing != value => Some(existing.to_string()),
            Some(_) => None,
        }
    }
}

type DeckMap = BTreeMap<SeasonId, BTreeMap<DraftId, BTreeMap<PlayerId, Deck>>>;

/// Decks keyed by season, draft and player. Each card appears at most once
/// per deck, and the first non-blank label recorded for a deck wins.
#[derive(Debug, Clone, Default)]
pub struct DeckIndex {
    decks: DeckMap,
}

impl DeckIndex {
    pub fn new(entries: &[DeckEntry]) -> Self {
        let mut decks = DeckMap::new();
        let mut duplicates = 0usize;

        for entry in entries {
            let deck = decks
                .entry(entry.season_id.clone())
                .or_default()
                .entry(entry.draft_id.clone())
                .or_default()
                .entry(entry.player.clone())
                .or_default();

            if !deck.cards.insert(entry.card_id.clone()) {
                duplicates += 1;
            }

            for label in [DeckLabel::Archetype, DeckLabel::Decktype] {
                if let Some(value) = entry.label(label) {
                    if let Some(kept) = deck.set_label(label, value) {
                        warn!(
                            "Inconsistent {} for {} at {} {}: keeping {:?}, ignoring {:?}",
                            label, entry.player, entry.season_id, entry.draft_id, kept, value
                        );
                    }
                }
            }
        }

        if duplicates > 0 {
            debug!("Dropped {} duplicate deck rows", duplicates);
        }

        Self { decks }
    }

    pub fn deck(&self, season: &SeasonId, draft: &DraftId, player: &PlayerId) -> Option<&Deck> {
        self.decks.get(season)?.get(draft)?.get(player)
    }

    /// Whether a player's deck at a draft contained a card.
    pub fn has_card(
        &self,
        season: &SeasonId,
        draft: &DraftId,
        player: &PlayerId,
        card: &CardId,
    ) -> bool {
        self.deck(season, draft, player)
            .is_some_and(|deck| deck.has_card(card))
    }

    /// Label of a player's deck at a draft.
    pub fn label(
        &self,
        season: &SeasonId,
        draft: &DraftId,
        player: &PlayerId,
        label: DeckLabel,
    ) -> Option<&str> {
        self.deck(season, draft, player)?.label(label)
    }

    /// Iterate over every deck in (season, draft, player) order.
    pub fn iter(&self) -> impl Iterator<Item = (&SeasonId, &DraftId, &PlayerId, &Deck)> {
        self.decks.iter().flat_map(|(season, drafts)| {
            drafts.iter().flat_map(move |(draft, players)| {
                players
                    .iter()
                    .map(move |(player, deck)| (season, draft, player, deck))
            })
        })
    }

    /// Number of decks.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }
}
