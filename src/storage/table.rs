//! CSV table storage.
//!
//! Every table is a headered CSV file; each record deserializes into one row
//! type. Rows that fail to parse are logged and skipped.

use std::fs::{self, File};
use std::io::BufWriter;
use std::marker::PhantomData;
use std::path::PathBuf;

use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{StorageConfig, StorageError};

/// Table types in the processed directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableType {
    // Inputs
    Matches,
    DraftedDecks,
    Drafts,
    CubeHistory,
    CubeMainboard,

    // Outputs
    Standings,
    CardAvailability,
    CardMainboardRate,
    CardMatchWinRate,
    CardGameWinRate,
    ArchetypeMatchWinRate,
    ArchetypeGameWinRate,
    DecktypeMatchWinRate,
    DecktypeGameWinRate,
    PlayerArchetypeWinRates,
    PlayerDecktypeWinRates,
    PlayerCardWinRates,
    MostPickedCard,
    PlayerWinRates,
    VsPlayerWinRates,
}

impl TableType {
    /// Get the filename for this table.
    pub fn filename(&self) -> &'static str {
        match self {
            TableType::Matches => "matches.csv",
            TableType::DraftedDecks => "drafted_decks.csv",
            TableType::Drafts => "drafts.csv",
            TableType::CubeHistory => "cube_history.csv",
            TableType::CubeMainboard => "cube_mainboard.csv",
            TableType::Standings => "standings.csv",
            TableType::CardAvailability => "card_availability.csv",
            TableType::CardMainboardRate => "card_mainboard_rate_per_season.csv",
            TableType::CardMatchWinRate => "card_match_winrate_per_season.csv",
            TableType::CardGameWinRate => "card_game_winrate_per_season.csv",
            TableType::ArchetypeMatchWinRate => "archetype_match_winrate.csv",
            TableType::ArchetypeGameWinRate => "archetype_game_winrate.csv",
            TableType::DecktypeMatchWinRate => "decktype_match_winrate.csv",
            TableType::DecktypeGameWinRate => "decktype_game_winrate.csv",
            TableType::PlayerArchetypeWinRates => "player_archetype_winrates.csv",
            TableType::PlayerDecktypeWinRates => "player_decktype_winrates.csv",
            TableType::PlayerCardWinRates => "combined_winrates_per_season.csv",
            TableType::MostPickedCard => "most_picked_card_by_player.csv",
            TableType::PlayerWinRates => "player_game_and_match_winrate.csv",
            TableType::VsPlayerWinRates => "vs_player_game_and_match_winrate.csv",
        }
    }
}

/// CSV table reader.
pub struct TableReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> TableReader<T> {
    /// Create a new reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a reader for a table in the processed directory.
    pub fn for_table(config: &StorageConfig, table: TableType) -> Self {
        Self::new(config.table_path(table))
    }

    /// Read all rows. A missing file is an error: every table this crate
    /// reads is required input.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Err(StorageError::NotFound(self.path.clone()));
        }

        let file = File::open(&self.path)?;
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(file);
        let mut rows = Vec::new();
        let mut skipped = 0usize;

        for result in reader.deserialize() {
            match result {
                Ok(row) => rows.push(row),
                Err(e) => {
                    if e.is_io_error() {
                        return Err(StorageError::Csv(e));
                    }
                    let line = e.position().map(|p| p.line()).unwrap_or_default();
                    warn!("Skipping line {} in {:?}: {}", line, self.path, e);
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            warn!("Skipped {} malformed rows in {:?}", skipped, self.path);
        }
        debug!("Read {} rows from {:?}", rows.len(), self.path);
        Ok(rows)
    }
}

/// CSV table writer.
pub struct TableWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> TableWriter<T> {
    /// Create a new writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a writer for a table in the processed directory.
    pub fn for_table(config: &StorageConfig, table: TableType) -> Self {
        Self::new(config.table_path(table))
    }

    /// Ensure the parent directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Write rows, replacing the entire file.
    pub fn write_all(&self, rows: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let mut writer = WriterBuilder::new().from_writer(BufWriter::new(file));

        for row in rows {
            writer.serialize(row)?;
        }

        writer.flush()?;
        info!("Wrote {} rows to {:?}", rows.len(), self.path);

        Ok(rows.len())
    }
}
