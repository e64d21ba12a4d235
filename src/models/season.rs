//! League seasons and date-to-season resolution.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{DraftId, SeasonId};

/// Season ID used for dates outside every configured season.
pub const UNKNOWN_SEASON_ID: &str = "Unknown Season";

/// Date format of draft IDs and season range bounds.
const COMPACT_DATE_FORMAT: &str = "%Y%m%d";

/// Errors raised while loading or validating seasons.
#[derive(Debug, Error)]
pub enum SeasonError {
    #[error("Failed to read season file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse season file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid date range for season {season}: {reason}")]
    InvalidRange { season: String, reason: String },

    #[error("Seasons {first} and {second} overlap")]
    Overlap { first: String, second: String },
}

/// A season - an inclusive date window of drafts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: SeasonId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// Cube the season was drafted from, if known
    #[serde(default)]
    pub cube_id: Option<String>,
}

impl Season {
    pub fn new(id: impl Into<SeasonId>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            start_date,
            end_date,
            cube_id: None,
        }
    }

    /// Check if a date falls within this season (both ends inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Raw season entry as stored in the league's season file.
#[derive(Debug, Clone, Deserialize)]
struct SeasonFileEntry {
    date_range: String,
    #[serde(default)]
    cube_id: Option<String>,
}

/// Parse a `YYYYMMDD` draft ID into a date.
pub fn parse_draft_date(draft_id: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(draft_id.trim(), COMPACT_DATE_FORMAT).ok()
}

/// Parse a `YYYYMMDD-YYYYMMDD` range.
fn parse_date_range(season: &str, range: &str) -> Result<(NaiveDate, NaiveDate), SeasonError> {
    let invalid = |reason: &str| SeasonError::InvalidRange {
        season: season.to_string(),
        reason: reason.to_string(),
    };

    let (start, end) = range
        .split_once('-')
        .ok_or_else(|| invalid("expected YYYYMMDD-YYYYMMDD"))?;
    let start = parse_draft_date(start).ok_or_else(|| invalid("bad start date"))?;
    let end = parse_draft_date(end).ok_or_else(|| invalid("bad end date"))?;

    if end < start {
        return Err(invalid("end date before start date"));
    }
    Ok((start, end))
}

/// Ordered, non-overlapping set of seasons.
#[derive(Debug, Clone, Default)]
pub struct SeasonCalendar {
    seasons: Vec<Season>,
}

impl SeasonCalendar {
    /// Create an empty calendar. Every date resolves to the unknown season.
    pub fn new() -> Self {
        Self {
            seasons: Vec::new(),
        }
    }

    /// Build a calendar, rejecting overlapping ranges.
    pub fn from_seasons(mut seasons: Vec<Season>) -> Result<Self, SeasonError> {
        seasons.sort_by_key(|s| s.start_date);

        for pair in seasons.windows(2) {
            if pair[1].start_date <= pair[0].end_date {
                return Err(SeasonError::Overlap {
                    first: pair[0].id.to_string(),
                    second: pair[1].id.to_string(),
                });
            }
        }

        Ok(Self { seasons })
    }

    /// Parse the JSON season file format:
    /// `{"Season-1": {"date_range": "20210501-20210731", "cube_id": "..."}}`.
    pub fn from_json_str(json: &str) -> Result<Self, SeasonError> {
        let raw: BTreeMap<String, SeasonFileEntry> = serde_json::from_str(json)?;

        let seasons = raw
            .into_iter()
            .map(|(name, entry)| {
                let (start, end) = parse_date_range(&name, &entry.date_range)?;
                let mut season = Season::new(name, start, end);
                season.cube_id = entry.cube_id;
                Ok(season)
            })
            .collect::<Result<Vec<_>, SeasonError>>()?;

        Self::from_seasons(seasons)
    }

    /// Load the JSON season file from disk.
    pub fn from_json_file(path: &Path) -> Result<Self, SeasonError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Get the season containing a date.
    pub fn season_for_date(&self, date: NaiveDate) -> Option<&Season> {
        self.seasons.iter().find(|s| s.contains_date(date))
    }

    /// Get the season ID for a date, falling back to the unknown season.
    pub fn season_id_for_date(&self, date: NaiveDate) -> SeasonId {
        self.season_for_date(date)
            .map(|s| s.id.clone())
            .unwrap_or_else(|| SeasonId::from(UNKNOWN_SEASON_ID))
    }

    /// Resolve the season of a draft from its `YYYYMMDD` ID.
    /// Returns `None` when the ID is not a date.
    pub fn resolve_draft(&self, draft_id: &DraftId) -> Option<SeasonId> {
        parse_draft_date(draft_id.as_str()).map(|date| self.season_id_for_date(date))
    }

    /// All seasons in chronological order.
    pub fn all_seasons(&self) -> &[Season] {
        &self.seasons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn two_season_calendar() -> SeasonCalendar {
        SeasonCalendar::from_seasons(vec![
            Season::new("Season-2", date(2021, 8, 1), date(2021, 12, 31)),
            Season::new("Season-1", date(2021, 5, 1), date(2021, 7, 31)),
        ])
        .unwrap()
    }

    #[test]
    fn test_season_contains_date_inclusive() {
        let season = Season::new("Season-1", date(2021, 5, 1), date(2021, 7, 31));

        assert!(!season.contains_date(date(2021, 4, 30)));
        assert!(season.contains_date(date(2021, 5, 1)));
        assert!(season.contains_date(date(2021, 7, 31)));
        assert!(!season.contains_date(date(2021, 8, 1)));
    }

    #[test]
    fn test_calendar_sorted_by_start() {
        let calendar = two_season_calendar();
        let ids: Vec<&str> = calendar.all_seasons().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["Season-1", "Season-2"]);
    }

    #[test]
    fn test_calendar_rejects_overlap() {
        let result = SeasonCalendar::from_seasons(vec![
            Season::new("Season-1", date(2021, 5, 1), date(2021, 8, 1)),
            Season::new("Season-2", date(2021, 8, 1), date(2021, 12, 31)),
        ]);
        assert!(matches!(result, Err(SeasonError::Overlap { .. })));
    }

    #[test]
    fn test_date_lookup() {
        let calendar = two_season_calendar();

        assert_eq!(
            calendar.season_id_for_date(date(2021, 6, 15)).as_str(),
            "Season-1"
        );
        assert_eq!(
            calendar.season_id_for_date(date(2021, 9, 1)).as_str(),
            "Season-2"
        );
        assert_eq!(
            calendar.season_id_for_date(date(2022, 1, 1)).as_str(),
            UNKNOWN_SEASON_ID
        );
    }

    #[test]
    fn test_resolve_draft() {
        let calendar = two_season_calendar();

        assert_eq!(
            calendar.resolve_draft(&DraftId::from("20210510")),
            Some(SeasonId::from("Season-1"))
        );
        assert_eq!(calendar.resolve_draft(&DraftId::from("not-a-date")), None);
    }

    #[test]
    fn test_parse_draft_date() {
        assert_eq!(parse_draft_date("20210518"), Some(date(2021, 5, 18)));
        assert_eq!(parse_draft_date("2021-05-18"), None);
        assert_eq!(parse_draft_date("20211340"), None);
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "Season-1": {"date_range": "20210501-20210731", "cube_id": "abc"},
            "Season-2": {"date_range": "20210801-20211231"}
        }"#;

        let calendar = SeasonCalendar::from_json_str(json).unwrap();

        assert_eq!(calendar.all_seasons().len(), 2);
        let first = &calendar.all_seasons()[0];
        assert_eq!(first.id.as_str(), "Season-1");
        assert_eq!(first.start_date, date(2021, 5, 1));
        assert_eq!(first.cube_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_from_json_str_bad_range() {
        let json = r#"{"Season-1": {"date_range": "20210731-20210501"}}"#;
        let result = SeasonCalendar::from_json_str(json);
        assert!(matches!(result, Err(SeasonError::InvalidRange { .. })));

        let json = r#"{"Season-1": {"date_range": "sometime"}}"#;
        assert!(SeasonCalendar::from_json_str(json).is_err());
    }

    #[test]
    fn test_empty_calendar_is_unknown() {
        let calendar = SeasonCalendar::new();
        assert_eq!(
            calendar.season_id_for_date(date(2021, 6, 1)).as_str(),
            UNKNOWN_SEASON_ID
        );
    }
}
