//! Data ingestion and storage
//!
//! Page fetching, stat table normalization, player backfill and SQLite
//! storage.

pub mod category;
pub mod database;
pub mod fetcher;
pub mod normalizer;
pub mod pipeline;
pub mod players;
pub mod records;

pub use category::Category;
pub use database::{Database, DatabaseStats};
pub use fetcher::{EntityReference, HttpSource, MemorySource, PageResult, PageSource, Table};
pub use normalizer::CategoryNormalizer;
pub use pipeline::Pipeline;
pub use players::PlayerResolver;
pub use records::{
    ActiveStats, DefensePassingStats, FieldGoalStats, PassingStats, Persist, PlayerInfo,
    ReceivingStats, RushingStats, StatRecord,
};
