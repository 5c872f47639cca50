//! Application service layer for cluster runs.
//!
//! Turns a [`cd_config::RunConfig`] into a running [`cd_sim::Cluster`]: loads
//! the mass-loss table, draws or restores the initial stars, builds the disk
//! pool and the gravity and stellar codes, and drives the run into a
//! [`cd_results::SnapshotStore`]. The CLI is a thin shell over this crate.

pub mod error;
pub mod initial;
pub mod progress;
pub mod query;
pub mod run_service;

pub use error::{AppError, AppResult};
pub use initial::{InitialState, fresh_state, restored_state};
pub use progress::{ClusterProgress, RunProgressEvent, RunStage};
pub use query::{SnapshotSummary, list_snapshots, summarize_snapshot};
pub use run_service::{RunReport, RunTiming, run, run_with_progress};
