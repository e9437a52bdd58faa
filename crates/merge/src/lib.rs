//! `sheetmerge-merge`: match rows of a primary table against a reference
//! table and merge the reference's extra columns in.
//!
//! Pure engine crate: receives loaded tables, returns a merged table.
//! No CLI or IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod key;
pub mod matcher;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod summary;

pub use config::MergeConfig;
pub use engine::run;
pub use error::MergeError;
pub use events::{EventCollector, LogReporter, NullReporter, Reporter};
pub use matcher::{match_rows, Matcher};
pub use merge::merge;
pub use model::{MatchOutcome, MatchPair, MergeOutput, MergeSummary, Side};
pub use normalize::normalize;
