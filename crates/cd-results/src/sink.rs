//! Output interface of the cluster loop.

use crate::types::{DiagnosticsRecord, Snapshot};
use crate::ResultsResult;

/// Where snapshots and diagnostics go.
pub trait SnapshotSink {
    fn write_snapshot(&mut self, snapshot: &Snapshot) -> ResultsResult<()>;

    fn append_diagnostics(&mut self, record: &DiagnosticsRecord) -> ResultsResult<()>;
}

/// Keeps everything in memory. Useful for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub snapshots: Vec<Snapshot>,
    pub diagnostics: Vec<DiagnosticsRecord>,
}

impl SnapshotSink for MemorySink {
    fn write_snapshot(&mut self, snapshot: &Snapshot) -> ResultsResult<()> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }

    fn append_diagnostics(&mut self, record: &DiagnosticsRecord) -> ResultsResult<()> {
        self.diagnostics.push(*record);
        Ok(())
    }
}
