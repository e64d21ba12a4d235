//! Drafted deck rows.

use serde::{Deserialize, Serialize};

use super::{CardId, DraftId, PlayerId, SeasonId};

/// Which categorical deck label to aggregate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeckLabel {
    /// Strategic archetype (e.g. "Aggro", "Reanimator")
    Archetype,
    /// Deck type (usually the colour pair)
    Decktype,
}

impl DeckLabel {
    /// Column name used for this label in exports.
    pub fn column(&self) -> &'static str {
        match self {
            DeckLabel::Archetype => "archetype",
            DeckLabel::Decktype => "decktype",
        }
    }
}

impl std::fmt::Display for DeckLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// One card in one player's deck at one draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    #[serde(default)]
    pub season_id: SeasonId,

    pub draft_id: DraftId,

    pub player: PlayerId,

    #[serde(default)]
    pub archetype: String,

    #[serde(default)]
    pub decktype: String,

    #[serde(rename = "scryfallId")]
    pub card_id: CardId,
}

impl DeckEntry {
    pub fn new(
        season_id: impl Into<SeasonId>,
        draft_id: impl Into<DraftId>,
        player: impl Into<PlayerId>,
        card_id: impl Into<CardId>,
    ) -> Self {
        Self {
            season_id: season_id.into(),
            draft_id: draft_id.into(),
            player: player.into(),
            archetype: String::new(),
            decktype: String::new(),
            card_id: card_id.into(),
        }
    }

    /// Set archetype and deck type labels.
    pub fn with_labels(mut self, archetype: &str, decktype: &str) -> Self {
        self.archetype = archetype.to_string();
        self.decktype = decktype.to_string();
        self
    }

    /// The requested label, or `None` when the export left it blank.
    pub fn label(&self, label: DeckLabel) -> Option<&str> {
        let value = match label {
            DeckLabel::Archetype => self.archetype.trim(),
            DeckLabel::Decktype => self.decktype.trim(),
        };
        (!value.is_empty()).then_some(value)
    }
}
