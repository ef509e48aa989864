//! Per-run records, batch summaries and the result-file format.
//!
//! The result file holds one `density,discovered` line per run, with
//! CRLF line endings:
//!
//! ```text
//! 100,37
//! 100,41
//! 400,112
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::SimConfig;

/// Outcome of one simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunRecord {
    /// Prey density the run used.
    pub density: u64,
    /// Index of the run within its density, in `0..n_sims`.
    pub sim_index: u32,
    /// Sites the walker discovered.
    pub discovered: u64,
    /// Lattice capacity when the run ended.
    pub capacity: u64,
}

/// All records of a completed batch, sorted by `(density, sim_index)`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchSummary {
    records: Vec<RunRecord>,
}

impl BatchSummary {
    /// Sort `records` into canonical order.
    pub fn new(mut records: Vec<RunRecord>) -> Self {
        records.sort_unstable_by_key(|r| (r.density, r.sim_index));
        Self { records }
    }

    /// Records in `(density, sim_index)` order.
    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch recorded no runs.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records for one density.
    pub fn for_density(&self, density: u64) -> impl Iterator<Item = &RunRecord> + '_ {
        self.records.iter().filter(move |r| r.density == density)
    }

    /// Mean discovered sites per density, in ascending density order.
    pub fn mean_discovered(&self) -> BTreeMap<u64, f64> {
        let mut sums: BTreeMap<u64, (u64, u64)> = BTreeMap::new();
        for r in &self.records {
            let entry = sums.entry(r.density).or_default();
            entry.0 += r.discovered;
            entry.1 += 1;
        }
        sums.into_iter()
            .map(|(density, (sum, n))| (density, sum as f64 / n as f64))
            .collect()
    }

    /// Largest final capacity over all runs.
    pub fn peak_capacity(&self) -> Option<u64> {
        self.records.iter().map(|r| r.capacity).max()
    }

    /// Write every record as a `density,discovered\r\n` line.
    pub fn write_to<W: Write>(&self, writer: W) -> io::Result<()> {
        write_records(writer, &self.records)
    }

    /// Write the result file into `dir` under [`result_file_name`].
    ///
    /// `dir` must already exist; it is not created. Returns the path
    /// written.
    pub fn save(&self, dir: &Path, config: &SimConfig) -> io::Result<PathBuf> {
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("results directory {} does not exist", dir.display()),
            ));
        }
        let path = dir.join(result_file_name(config));
        let file = File::create(&path)?;
        self.write_to(BufWriter::new(file))?;
        tracing::info!(path = %path.display(), runs = self.len(), "results written");
        Ok(path)
    }
}

/// Write `records` as `density,discovered\r\n` lines and flush.
pub fn write_records<W: Write>(mut writer: W, records: &[RunRecord]) -> io::Result<()> {
    for r in records {
        write!(writer, "{},{}\r\n", r.density, r.discovered)?;
    }
    writer.flush()
}

/// File name encoding the batch parameters, e.g.
/// `res_dim=2_sizeL=1000.00_t=1000.00_th=0.00.txt`.
pub fn result_file_name(config: &SimConfig) -> String {
    format!(
        "res_dim={}_sizeL={:.2}_t={:.2}_th={:.2}.txt",
        config.dimension, config.lattice_size, config.end_time, config.handling_time
    )
}
