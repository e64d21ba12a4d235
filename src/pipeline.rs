//! Batch pipeline.
//!
//! Loads the normalized tables, fills in missing seasons, computes standings
//! and statistics, and writes every output table:
//! 1. Load inputs from the processed directory
//! 2. Annotate seasons from draft dates
//! 3. Build the availability map once
//! 4. Run the aggregations and write CSVs
//!
//! Standings only need the matches table, see [`standings`].

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::calculate::{
    build_availability_map, calculate_standings, card_mainboard_rates, card_win_rates,
    label_win_rates, most_picked_cards, player_card_win_rates, player_label_win_rates,
    player_win_rates, vs_player_win_rates, AvailabilityMap, DeckIndex, SameTimestampOrder,
};
use crate::models::{
    CardChange, CardGameWinRate, CardMainboardRate, CardMatchWinRate, DeckEntry, DeckLabel,
    DraftRecord, LabelGameWinRate, LabelMatchWinRate, MainboardCard, MatchRecord, MostPickedCard,
    PlayerCardWinRate, PlayerLabelWinRate, PlayerWinRate, SeasonCalendar, SeasonError, SeasonId,
    StandingsRow, VsPlayerWinRate,
};
use crate::storage::{StorageConfig, StorageError, TableReader, TableType, TableWriter};

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Season error: {0}")]
    Season(#[from] SeasonError),
}

/// All input tables of a league.
#[derive(Debug, Clone, Default)]
pub struct LeagueData {
    pub matches: Vec<MatchRecord>,
    pub decks: Vec<DeckEntry>,
    pub drafts: Vec<DraftRecord>,
    pub changes: Vec<CardChange>,
    pub mainboard: Vec<MainboardCard>,
}

impl LeagueData {
    /// Read every input table. Each one is required.
    pub fn load(storage: &StorageConfig) -> Result<Self, PipelineError> {
        let data = Self {
            matches: load_matches(storage)?,
            decks: TableReader::for_table(storage, TableType::DraftedDecks).read_all()?,
            drafts: TableReader::for_table(storage, TableType::Drafts).read_all()?,
            changes: TableReader::for_table(storage, TableType::CubeHistory).read_all()?,
            mainboard: TableReader::for_table(storage, TableType::CubeMainboard).read_all()?,
        };

        info!(
            "Loaded {} matches, {} deck rows, {} drafts, {} cube changes, {} mainboard cards",
            data.matches.len(),
            data.decks.len(),
            data.drafts.len(),
            data.changes.len(),
            data.mainboard.len()
        );
        Ok(data)
    }

    /// Fill empty season IDs of matches, decks and drafts from their draft
    /// dates. Returns the number of rows updated.
    pub fn annotate_seasons(&mut self, calendar: &SeasonCalendar) -> usize {
        let mut updated = annotate_match_seasons(&mut self.matches, calendar);
        for deck in &mut self.decks {
            if deck.season_id.is_empty() {
                updated += fill_season(&mut deck.season_id, calendar.resolve_draft(&deck.draft_id));
            }
        }
        for draft in &mut self.drafts {
            if draft.season_id.is_empty() {
                let resolved = calendar
                    .resolve_draft(&draft.draft_id)
                    .unwrap_or_else(|| calendar.season_id_for_date(draft.timestamp.date()));
                updated += fill_season(&mut draft.season_id, Some(resolved));
            }
        }

        if updated > 0 {
            info!("Annotated {} rows with seasons", updated);
        }
        updated
    }
}

fn fill_season(season: &mut SeasonId, resolved: Option<SeasonId>) -> usize {
    match resolved {
        Some(id) => {
            *season = id;
            1
        }
        None => 0,
    }
}

/// Read the matches table on its own.
pub fn load_matches(storage: &StorageConfig) -> Result<Vec<MatchRecord>, PipelineError> {
    let matches: Vec<MatchRecord> =
        TableReader::for_table(storage, TableType::Matches).read_all()?;
    debug!("Loaded {} matches", matches.len());
    Ok(matches)
}

/// Fill empty match season IDs from their draft dates.
pub fn annotate_match_seasons(matches: &mut [MatchRecord], calendar: &SeasonCalendar) -> usize {
    let mut updated = 0;
    for m in matches.iter_mut() {
        if m.season_id.is_empty() {
            updated += fill_season(&mut m.season_id, calendar.resolve_draft(&m.draft_id));
        }
    }
    updated
}

/// Every derived statistics table.
#[derive(Debug, Clone, Default)]
pub struct StatisticsReport {
    pub availability: AvailabilityMap,
    pub card_mainboard_rates: Vec<CardMainboardRate>,
    pub card_match_win_rates: Vec<CardMatchWinRate>,
    pub card_game_win_rates: Vec<CardGameWinRate>,
    pub archetype_match_win_rates: Vec<LabelMatchWinRate>,
    pub archetype_game_win_rates: Vec<LabelGameWinRate>,
    pub decktype_match_win_rates: Vec<LabelMatchWinRate>,
    pub decktype_game_win_rates: Vec<LabelGameWinRate>,
    pub player_archetype_win_rates: Vec<PlayerLabelWinRate>,
    pub player_decktype_win_rates: Vec<PlayerLabelWinRate>,
    pub player_card_win_rates: Vec<PlayerCardWinRate>,
    pub most_picked_cards: Vec<MostPickedCard>,
    pub player_win_rates: Vec<PlayerWinRate>,
    pub vs_player_win_rates: Vec<VsPlayerWinRate>,
}

impl StatisticsReport {
    /// Write every statistics table. The availability map is only written
    /// on request, see [`write_availability`].
    pub fn write_all(&self, storage: &StorageConfig) -> Result<usize, PipelineError> {
        let mut written = 0;
        written += write_table(storage, TableType::CardMainboardRate, &self.card_mainboard_rates)?;
        written += write_table(storage, TableType::CardMatchWinRate, &self.card_match_win_rates)?;
        written += write_table(storage, TableType::CardGameWinRate, &self.card_game_win_rates)?;
        written += write_table(
            storage,
            TableType::ArchetypeMatchWinRate,
            &self.archetype_match_win_rates,
        )?;
        written += write_table(
            storage,
            TableType::ArchetypeGameWinRate,
            &self.archetype_game_win_rates,
        )?;
        written += write_table(
            storage,
            TableType::DecktypeMatchWinRate,
            &self.decktype_match_win_rates,
        )?;
        written += write_table(
            storage,
            TableType::DecktypeGameWinRate,
            &self.decktype_game_win_rates,
        )?;
        written += write_table(
            storage,
            TableType::PlayerArchetypeWinRates,
            &self.player_archetype_win_rates,
        )?;
        written += write_table(
            storage,
            TableType::PlayerDecktypeWinRates,
            &self.player_decktype_win_rates,
        )?;
        written += write_table(storage, TableType::PlayerCardWinRates, &self.player_card_win_rates)?;
        written += write_table(storage, TableType::MostPickedCard, &self.most_picked_cards)?;
        written += write_table(storage, TableType::PlayerWinRates, &self.player_win_rates)?;
        written += write_table(storage, TableType::VsPlayerWinRates, &self.vs_player_win_rates)?;
        Ok(written)
    }
}

fn write_table<T: Serialize>(
    storage: &StorageConfig,
    table: TableType,
    rows: &[T],
) -> Result<usize, PipelineError> {
    Ok(TableWriter::for_table(storage, table).write_all(rows)?)
}

/// Load the season calendar from its JSON file.
pub fn load_calendar(path: &Path) -> Result<SeasonCalendar, PipelineError> {
    let calendar = SeasonCalendar::from_json_file(path)?;
    info!(
        "Loaded {} seasons from {:?}",
        calendar.all_seasons().len(),
        path
    );
    Ok(calendar)
}

/// Build the availability map once and run every aggregation.
pub fn calculate_statistics(data: &LeagueData, order: SameTimestampOrder) -> StatisticsReport {
    let availability = build_availability_map(&data.changes, &data.drafts, &data.mainboard, order);
    let decks = DeckIndex::new(&data.decks);
    debug!("Indexed {} decks", decks.len());

    let card_mainboard_rates = card_mainboard_rates(&data.drafts, &decks, &availability);
    let (card_match_win_rates, card_game_win_rates) =
        card_win_rates(&data.matches, &decks, &availability, &card_mainboard_rates);
    let (archetype_match_win_rates, archetype_game_win_rates) =
        label_win_rates(&data.matches, &decks, DeckLabel::Archetype);
    let (decktype_match_win_rates, decktype_game_win_rates) =
        label_win_rates(&data.matches, &decks, DeckLabel::Decktype);

    StatisticsReport {
        card_mainboard_rates,
        card_match_win_rates,
        card_game_win_rates,
        archetype_match_win_rates,
        archetype_game_win_rates,
        decktype_match_win_rates,
        decktype_game_win_rates,
        player_archetype_win_rates: player_label_win_rates(
            &data.matches,
            &decks,
            DeckLabel::Archetype,
        ),
        player_decktype_win_rates: player_label_win_rates(
            &data.matches,
            &decks,
            DeckLabel::Decktype,
        ),
        player_card_win_rates: player_card_win_rates(&data.matches, &decks),
        most_picked_cards: most_picked_cards(&decks),
        player_win_rates: player_win_rates(&data.matches),
        vs_player_win_rates: vs_player_win_rates(&data.matches),
        availability,
    }
}

/// Load matches, compute standings and write them. No other table is read.
pub fn standings(
    storage: &StorageConfig,
    calendar: &SeasonCalendar,
) -> Result<Vec<StandingsRow>, PipelineError> {
    let mut matches = load_matches(storage)?;
    annotate_match_seasons(&mut matches, calendar);

    let rows = calculate_standings(&matches, calendar);
    write_standings(storage, &rows)?;
    Ok(rows)
}

pub fn write_standings(
    storage: &StorageConfig,
    standings: &[StandingsRow],
) -> Result<usize, PipelineError> {
    write_table(storage, TableType::Standings, standings)
}

/// Write the per-draft availability table.
pub fn write_availability(
    storage: &StorageConfig,
    availability: &AvailabilityMap,
) -> Result<usize, PipelineError> {
    write_table(storage, TableType::CardAvailability, &availability.rows())
}

/// Load, annotate, compute and write standings plus statistics.
pub fn run(
    storage: &StorageConfig,
    calendar: &SeasonCalendar,
    order: SameTimestampOrder,
) -> Result<StatisticsReport, PipelineError> {
    let mut data = LeagueData::load(storage)?;
    data.annotate_seasons(calendar);

    let standings = calculate_standings(&data.matches, calendar);
    write_standings(storage, &standings)?;

    let report = calculate_statistics(&data, order);
    let written = report.write_all(storage)?;
    info!("Wrote {} statistics rows", written);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Season;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const MATCHES: &str = "\
season_id,draft_id,match_id,player1,player2,player1Wins,player2Wins,draws,player1Bye,player2Bye,round
Season-1,20210510,m1,Alice,Bob,2,0,0,False,False,1
Season-1,20210510,m2,Carol,BYE,0,0,0,,,1
,20210517,m3,Bob,Carol,2,1,0,False,False,1
Season-1,20210517,m4,Alice,Dave,1,1,1,False,False,1
";

    const DECKS: &str = "\
season_id,draft_id,player,archetype,decktype,scryfallId
Season-1,20210510,Alice,Aggro,RW,card-a
Season-1,20210510,Alice,Aggro,RW,card-b
Season-1,20210510,Bob,Control,UB,card-c
Season-1,20210517,Bob,Control,UB,card-a
Season-1,20210517,Carol,Midrange,BG,card-d
Season-1,20210517,Alice,Aggro,RW,card-a
";

    const DRAFTS: &str = "\
season_id,draft_id,timestamp
Season-1,20210510,2021-05-10
,20210517,2021-05-17 19:00:00
";

    const CUBE_HISTORY: &str = "\
season_id,timestamp,change_type,scryfallId
Season-1,2021-05-12,adds,card-d
Season-1,2021-05-12,removes,card-b
";

    const CUBE_MAINBOARD: &str = "\
season_id,timestamp,scryfallId,tags
Season-1,2021-05-01,card-a,
Season-1,2021-05-01,card-b,
Season-1,2021-05-01,card-c,
";

    fn seed(dir: &TempDir) -> StorageConfig {
        let storage = StorageConfig::new(dir.path().to_path_buf());
        fs::create_dir_all(storage.processed_dir()).unwrap();
        for (table, contents) in [
            (TableType::Matches, MATCHES),
            (TableType::DraftedDecks, DECKS),
            (TableType::Drafts, DRAFTS),
            (TableType::CubeHistory, CUBE_HISTORY),
            (TableType::CubeMainboard, CUBE_MAINBOARD),
        ] {
            fs::write(storage.table_path(table), contents).unwrap();
        }
        storage
    }

    fn calendar() -> SeasonCalendar {
        SeasonCalendar::from_seasons(vec![Season::new(
            "Season-1",
            NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 7, 31).unwrap(),
        )])
        .unwrap()
    }

    #[test]
    fn test_load_and_annotate() {
        let dir = TempDir::new().unwrap();
        let storage = seed(&dir);

        let mut data = LeagueData::load(&storage).unwrap();
        assert_eq!(data.matches.len(), 4);
        assert_eq!(data.decks.len(), 6);

        assert_eq!(data.annotate_seasons(&calendar()), 2);
        assert_eq!(data.matches[2].season_id.as_str(), "Season-1");
        assert_eq!(data.drafts[1].season_id.as_str(), "Season-1");
    }

    #[test]
    fn test_load_calendar() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seasons.json");
        fs::write(&path, r#"{"Season-1": {"date_range": "20210501-20210731"}}"#).unwrap();

        let calendar = load_calendar(&path).unwrap();
        assert_eq!(calendar.all_seasons().len(), 1);

        let missing = load_calendar(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(PipelineError::Season(SeasonError::Io(_)))));
    }

    #[test]
    fn test_missing_table_is_fatal() {
        let dir = TempDir::new().unwrap();
        let storage = seed(&dir);
        fs::remove_file(storage.table_path(TableType::Drafts)).unwrap();

        let result = LeagueData::load(&storage);
        assert!(matches!(
            result,
            Err(PipelineError::Storage(StorageError::NotFound(_)))
        ));
    }

    #[test]
    fn test_standings_read_only_matches() {
        let dir = TempDir::new().unwrap();
        let storage = StorageConfig::new(dir.path().to_path_buf());
        fs::create_dir_all(storage.processed_dir()).unwrap();
        fs::write(storage.table_path(TableType::Matches), MATCHES).unwrap();

        let rows = standings(&storage, &calendar()).unwrap();

        assert!(storage.table_path(TableType::Standings).exists());
        let alice = rows
            .iter()
            .find(|r| r.player.as_str() == "Alice" && r.draft_id.as_str() == "20210510")
            .unwrap();
        assert_eq!((alice.match_points, alice.game_points), (3, 6));
        assert!(rows.iter().all(|r| r.season_id.as_str() == "Season-1"));
    }

    #[test]
    fn test_standings_without_matches_is_fatal() {
        let dir = TempDir::new().unwrap();
        let storage = seed(&dir);
        fs::remove_file(storage.table_path(TableType::Matches)).unwrap();

        let result = standings(&storage, &calendar());
        assert!(matches!(
            result,
            Err(PipelineError::Storage(StorageError::NotFound(_)))
        ));
    }

    #[test]
    fn test_malformed_match_row_is_skipped() {
        let dir = TempDir::new().unwrap();
        let storage = seed(&dir);
        let clean = standings(&storage, &calendar()).unwrap();

        let dirty = format!(
            "{}Season-1,20210517,m5,Eve,Frank,two,0,0,False,False,1\n",
            MATCHES
        );
        fs::write(storage.table_path(TableType::Matches), dirty).unwrap();

        assert_eq!(load_matches(&storage).unwrap().len(), 4);
        let rows = standings(&storage, &calendar()).unwrap();
        assert_eq!(rows, clean);
        assert!(rows
            .iter()
            .all(|r| r.player.as_str() != "Eve" && r.player.as_str() != "Frank"));
    }

    #[test]
    fn test_statistics_use_availability() {
        let dir = TempDir::new().unwrap();
        let storage = seed(&dir);
        let mut data = LeagueData::load(&storage).unwrap();
        data.annotate_seasons(&calendar());

        let report = calculate_statistics(&data, SameTimestampOrder::Input);

        let season = SeasonId::from("Season-1");
        let late = crate::models::DraftId::from("20210517");
        assert!(report
            .availability
            .is_available(&season, &late, &"card-d".into()));
        assert!(!report
            .availability
            .is_available(&season, &late, &"card-b".into()));

        let rate = |card: &str| {
            report
                .card_mainboard_rates
                .iter()
                .find(|r| r.card_id.as_str() == card)
                .map(|r| r.drafts_with_card)
        };
        assert_eq!(rate("card-a"), Some(2));
        assert_eq!(rate("card-b"), Some(1));
        assert_eq!(rate("card-d"), Some(1));

        // Byes never reach the statistics tables.
        assert!(report
            .player_win_rates
            .iter()
            .all(|r| r.player.as_str() != "BYE"));
        assert_eq!(report.most_picked_cards.len(), 3);
    }

    #[test]
    fn test_run_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let storage = seed(&dir);

        let read_outputs = || -> Vec<(String, Vec<u8>)> {
            let mut outputs: Vec<(String, Vec<u8>)> = fs::read_dir(storage.processed_dir())
                .unwrap()
                .map(|entry| {
                    let path = entry.unwrap().path();
                    let name = path.file_name().unwrap().to_string_lossy().to_string();
                    (name, fs::read(&path).unwrap())
                })
                .collect();
            outputs.sort();
            outputs
        };

        run(&storage, &calendar(), SameTimestampOrder::Input).unwrap();
        let first = read_outputs();
        run(&storage, &calendar(), SameTimestampOrder::Input).unwrap();
        let second = read_outputs();

        assert_eq!(first, second);
        assert!(first.iter().any(|(name, _)| name == "standings.csv"));
        assert!(first
            .iter()
            .any(|(name, _)| name == "vs_player_game_and_match_winrate.csv"));
    }

    #[test]
    fn test_write_availability() {
        let dir = TempDir::new().unwrap();
        let storage = seed(&dir);
        let data = LeagueData::load(&storage).unwrap();
        let report = calculate_statistics(&data, SameTimestampOrder::Input);

        let written = write_availability(&storage, &report.availability).unwrap();
        assert_eq!(written, report.availability.rows().len());
        assert!(storage.table_path(TableType::CardAvailability).exists());
    }
}
