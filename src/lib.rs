//! # Manacore
//!
//! Standings and availability-aware card statistics for a cube draft league.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (seasons, matches, decks, cube history, output rows)
//! - **storage**: CSV table reading and writing
//! - **calculate**: Availability reconstruction, standings and statistics
//! - **pipeline**: Batch orchestration from input tables to output tables
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod storage;

pub use models::*;
