//! On-disk run storage.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::sink::SnapshotSink;
use crate::types::{DiagnosticsRecord, RunManifest, Snapshot};
use crate::{ResultsError, ResultsResult};

const MANIFEST_FILE: &str = "manifest.json";
const DIAGNOSTICS_FILE: &str = "energy.jsonl";

#[derive(Clone, Debug)]
pub struct SnapshotStore {
    run_dir: PathBuf,
}

impl SnapshotStore {
    /// Open (creating if needed) `<save_path>/<run_number>/`.
    pub fn new(save_path: impl AsRef<Path>, run_number: u32) -> ResultsResult<Self> {
        let run_dir = save_path.as_ref().join(run_number.to_string());
        if !run_dir.exists() {
            fs::create_dir_all(&run_dir)?;
        }
        Ok(Self { run_dir })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// `N{n}_t{t_myr:.3}.json`
    pub fn snapshot_file_name(n_stars: usize, time_yr: f64) -> String {
        format!("N{n_stars}_t{:.3}.json", time_yr * 1e-6)
    }

    /// Time in Myr encoded in a snapshot file name.
    pub fn parse_snapshot_time(name: &str) -> ResultsResult<f64> {
        let bad = || ResultsError::BadFileName {
            name: name.to_string(),
        };
        let stem = name.strip_suffix(".json").ok_or_else(bad)?;
        let (prefix, time) = stem.split_once("_t").ok_or_else(bad)?;
        if !prefix.starts_with('N') {
            return Err(bad());
        }
        time.parse::<f64>().map_err(|_| bad())
    }

    pub fn save_snapshot(&self, snapshot: &Snapshot) -> ResultsResult<PathBuf> {
        let path = self
            .run_dir
            .join(Self::snapshot_file_name(snapshot.n_stars, snapshot.time_yr));
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    pub fn load_snapshot(&self, path: &Path) -> ResultsResult<Snapshot> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Snapshot files with their time in Myr, oldest first.
    pub fn list_snapshots(&self) -> ResultsResult<Vec<(f64, PathBuf)>> {
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.run_dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name == MANIFEST_FILE {
                continue;
            }
            if let Ok(t_myr) = Self::parse_snapshot_time(name) {
                found.push((t_myr, path));
            }
        }
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(found)
    }

    /// Most recent snapshot, for restarts.
    pub fn latest_snapshot(&self) -> ResultsResult<Snapshot> {
        let snapshots = self.list_snapshots()?;
        let (_, path) = snapshots.last().ok_or_else(|| ResultsError::NoSnapshots {
            dir: self.run_dir.display().to_string(),
        })?;
        self.load_snapshot(path)
    }

    pub fn write_manifest(&self, manifest: &RunManifest) -> ResultsResult<()> {
        let json = serde_json::to_string_pretty(manifest)?;
        fs::write(self.run_dir.join(MANIFEST_FILE), json)?;
        Ok(())
    }

    pub fn load_manifest(&self) -> ResultsResult<RunManifest> {
        let content = fs::read_to_string(self.run_dir.join(MANIFEST_FILE))?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_diagnostics(&self) -> ResultsResult<Vec<DiagnosticsRecord>> {
        let path = self.run_dir.join(DIAGNOSTICS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)?;
        let mut records = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                records.push(serde_json::from_str(line)?);
            }
        }
        Ok(records)
    }
}

/// Current time as RFC 3339, for manifests.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl SnapshotSink for SnapshotStore {
    fn write_snapshot(&mut self, snapshot: &Snapshot) -> ResultsResult<()> {
        self.save_snapshot(snapshot).map(|_| ())
    }

    fn append_diagnostics(&mut self, record: &DiagnosticsRecord) -> ResultsResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.run_dir.join(DIAGNOSTICS_FILE))?;
        let line = serde_json::to_string(record)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_encode_time_in_myr() {
        assert_eq!(SnapshotStore::snapshot_file_name(100, 0.0), "N100_t0.000.json");
        assert_eq!(SnapshotStore::snapshot_file_name(100, 5000.0), "N100_t0.005.json");
        assert_eq!(SnapshotStore::snapshot_file_name(7, 2.0e6), "N7_t2.000.json");
        let t = SnapshotStore::parse_snapshot_time("N100_t1.250.json").unwrap();
        assert!((t - 1.25).abs() < 1e-12);
    }

    #[test]
    fn rejects_foreign_names() {
        for name in ["energy.jsonl", "manifest.json", "N100_t.json", "X_t1.0.json"] {
            assert!(SnapshotStore::parse_snapshot_time(name).is_err(), "{name}");
        }
    }
}
