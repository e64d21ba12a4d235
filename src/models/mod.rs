//! Core data models for the league engine.

mod cube;
mod deck;
pub mod fields;
mod ids;
mod match_result;
mod season;
mod stats;

pub use cube::*;
pub use deck::*;
pub use ids::*;
pub use match_result::*;
pub use season::*;
pub use stats::*;
