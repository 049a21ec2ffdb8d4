//! Magpie Core - retrieval core for a personal content-recall tool
//!
//! Keeps a deduplicated, time-ordered history of short text items (clipboard
//! captures and curated "master" snippets) and retrieves them with a greedy
//! left-to-right fuzzy matcher blended with exponential recency decay.
//!
//! The platform shims (clipboard polling, paste simulation, hotkeys, the
//! popup UI, spreadsheet parsing) live outside this crate and talk to
//! [`MagpieStore`].

pub mod config;
pub mod database;
pub mod history;
pub mod master;
pub mod models;
pub mod ranking;
pub mod recorder;
pub mod search;
mod store;

pub use config::SearchConfig;
pub use database::{StoreError, StoreResult};
pub use history::ContentStore;
pub use master::MasterIndex;
pub use models::{HistoryItem, MasterItem, MasterSource, RecordOutcome, SearchCandidate};
pub use recorder::{Recorder, RecorderHandle};
pub use store::MagpieStore;
