//! cd-results: snapshot and diagnostics storage for cluster runs.
//!
//! Layout of one run: `<save_path>/<run_number>/` holding `manifest.json`,
//! one `N{n}_t{t_myr:.3}.json` file per snapshot and an append-only
//! `energy.jsonl` with per-step diagnostics.

pub mod sink;
pub mod store;
pub mod types;

pub use sink::{MemorySink, SnapshotSink};
pub use store::{SnapshotStore, timestamp_now};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No snapshots in {dir}")]
    NoSnapshots { dir: String },

    #[error("Not a snapshot file name: {name}")]
    BadFileName { name: String },
}
