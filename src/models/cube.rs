//! Cube contents over time: change log, mainboard snapshots and draft times.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::fields::deserialize_timestamp;
use super::{CardId, DraftId, SeasonId};

/// Kind of change applied to the cube mainboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    #[serde(alias = "add")]
    Adds,
    #[serde(alias = "remove")]
    Removes,
}

/// One add/remove entry of a season's cube change log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardChange {
    #[serde(default)]
    pub change_id: Option<u64>,

    pub season_id: SeasonId,

    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,

    pub change_type: ChangeType,

    #[serde(rename = "scryfallId")]
    pub card_id: CardId,
}

impl CardChange {
    pub fn new(
        season_id: impl Into<SeasonId>,
        timestamp: NaiveDateTime,
        change_type: ChangeType,
        card_id: impl Into<CardId>,
    ) -> Self {
        Self {
            change_id: None,
            season_id: season_id.into(),
            timestamp,
            change_type,
            card_id: card_id.into(),
        }
    }
}

/// One card of a season's mainboard snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainboardCard {
    pub season_id: SeasonId,

    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,

    #[serde(rename = "scryfallId")]
    pub card_id: CardId,

    #[serde(default)]
    pub tags: String,
}

impl MainboardCard {
    pub fn new(
        season_id: impl Into<SeasonId>,
        timestamp: NaiveDateTime,
        card_id: impl Into<CardId>,
    ) -> Self {
        Self {
            season_id: season_id.into(),
            timestamp,
            card_id: card_id.into(),
            tags: String::new(),
        }
    }
}

/// A draft and when it took place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRecord {
    #[serde(default)]
    pub season_id: SeasonId,

    pub draft_id: DraftId,

    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,
}

impl DraftRecord {
    pub fn new(
        season_id: impl Into<SeasonId>,
        draft_id: impl Into<DraftId>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            season_id: season_id.into(),
            draft_id: draft_id.into(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_deserialize_change_log() {
        let data = "\
change_id,season_id,timestamp,change_type,scryfallId
1,Season-1,2021-05-05,adds,card-a
2,Season-1,2021-05-17,removes,card-b
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<CardChange> = reader.deserialize().collect::<Result<_, _>>().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].change_type, ChangeType::Adds);
        assert_eq!(rows[1].change_type, ChangeType::Removes);
        assert_eq!(
            rows[1].timestamp.date(),
            NaiveDate::from_ymd_opt(2021, 5, 17).unwrap()
        );
    }

    #[test]
    fn test_deserialize_change_log_without_change_id() {
        let data = "\
season_id,timestamp,change_type,scryfallId
Season-1,2021-05-05 00:00:00,add,card-a
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<CardChange> = reader.deserialize().collect::<Result<_, _>>().unwrap();

        assert_eq!(rows[0].change_id, None);
        assert_eq!(rows[0].change_type, ChangeType::Adds);
    }

    #[test]
    fn test_deserialize_unknown_change_type_fails() {
        let data = "\
season_id,timestamp,change_type,scryfallId
Season-1,2021-05-05,swaps,card-a
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Result<Vec<CardChange>, _> = reader.deserialize().collect();
        assert!(rows.is_err());
    }

    #[test]
    fn test_deserialize_mainboard_and_drafts() {
        let data = "\
season_id,timestamp,scryfallId,tags
Season-1,2021-05-01,card-a,\"['Aggro', 'Red']\"
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<MainboardCard> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows[0].tags, "['Aggro', 'Red']");

        let data = "\
season_id,draft_id,timestamp
Season-1,20210510,2021-05-10
";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<DraftRecord> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows[0].draft_id.as_str(), "20210510");
    }
}
