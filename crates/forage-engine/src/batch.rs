//! Parallel batch runner.
//!
//! One task per `(density, sim_index)` pair is queued on a crossbeam
//! channel and drained by a fixed pool of scoped worker threads. Each
//! task owns its lattice, walker and RNG; the only shared mutable state
//! is the record list, appended under a mutex.
//!
//! The first fatal error raises a stop flag. Workers finish the run they
//! are on, skip everything still queued, and [`BatchRunner::run`] returns
//! that error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use crossbeam_channel::Receiver;
use forage_core::LatticeError;
use forage_lattice::{Lattice, LatticeConfig};
use forage_walk::{PowerLaw, WalkError, WalkPolicy, Walker};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::config::{ConfigError, Perturbation, SimConfig};
use crate::results::{BatchSummary, RunRecord};

/// Errors that abort a batch.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RunError {
    /// A lattice operation failed fatally during one run.
    #[error("run {sim_index} at density {density}: {source}")]
    Lattice {
        /// Density of the failing run.
        density: u64,
        /// Index of the failing run within its density.
        sim_index: u32,
        /// Underlying lattice error.
        #[source]
        source: LatticeError,
    },
    /// The walker for one run could not be created.
    #[error("walker for run {sim_index} at density {density}: {source}")]
    Walk {
        /// Density of the failing run.
        density: u64,
        /// Index of the failing run within its density.
        sim_index: u32,
        /// Underlying walk error.
        #[source]
        source: WalkError,
    },
    /// A worker thread could not be spawned.
    #[error("thread spawn failed: {reason}")]
    ThreadSpawn {
        /// Which thread and why.
        reason: String,
    },
    /// One or more worker threads panicked.
    #[error("{count} worker thread(s) panicked")]
    WorkerPanicked {
        /// Number of panicked workers.
        count: usize,
    },
}

/// One queued simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Task {
    /// Position in the batch; the run's RNG is seeded with `seed ^ index`.
    pub index: u64,
    /// Prey density.
    pub density: u64,
    /// Index within the density, in `0..n_sims`.
    pub sim_index: u32,
}

#[derive(Debug)]
enum Mode {
    Unit(WalkPolicy<'static>),
    Jumps(PowerLaw),
}

/// Validated batch, ready to run.
///
/// # Examples
///
/// ```
/// use forage_engine::{BatchRunner, SimConfig};
///
/// let config = SimConfig {
///     n_sims: 3,
///     workers: Some(2),
///     end_time: 50.0,
///     densities: vec![100, 400],
///     ..SimConfig::default()
/// };
/// let summary = BatchRunner::new(config).unwrap().run().unwrap();
/// assert_eq!(summary.len(), 6);
/// ```
#[derive(Debug)]
pub struct BatchRunner {
    config: SimConfig,
    mode: Mode,
}

impl BatchRunner {
    /// Validate `config` and tabulate the jump-length law if needed.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from [`SimConfig::validate()`], or
    /// [`ConfigError::PowerLaw`] for a jump walk whose bounds cannot be
    /// tabulated (for example `power_law_xmin == 0`).
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mode = match config.perturbation {
            Perturbation::Plain => Mode::Unit(WalkPolicy::Plain),
            Perturbation::Drift => Mode::Unit(WalkPolicy::Drift {
                p_drift: config.p_drift,
            }),
            Perturbation::Memory => Mode::Unit(WalkPolicy::Memory),
            Perturbation::Percolation => Mode::Unit(WalkPolicy::Percolation),
            Perturbation::Jumps => Mode::Jumps(PowerLaw::new(
                config.power_law_xmin as u64,
                config.power_law_xmax as u64,
                config.power_law_gamma,
            )?),
        };
        Ok(Self { config, mode })
    }

    /// The validated configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Walk policy shared by every run.
    pub fn policy(&self) -> WalkPolicy<'_> {
        match &self.mode {
            Mode::Unit(policy) => *policy,
            Mode::Jumps(sampler) => WalkPolicy::Jumps { sampler },
        }
    }

    /// Every task, density-major.
    pub fn tasks(&self) -> impl Iterator<Item = Task> + '_ {
        let n_sims = self.config.n_sims;
        self.config
            .densities
            .iter()
            .enumerate()
            .flat_map(move |(d, &density)| {
                (0..n_sims).map(move |sim_index| Task {
                    index: d as u64 * u64::from(n_sims) + u64::from(sim_index),
                    density,
                    sim_index,
                })
            })
    }

    /// Execute a single task on the calling thread.
    ///
    /// Produces the same record as the task does inside [`run()`](Self::run).
    pub fn run_task(&self, task: Task) -> Result<RunRecord, RunError> {
        self.run_task_with(task, &LatticeConfig::build)
    }

    fn run_task_with<F>(&self, task: Task, build: &F) -> Result<RunRecord, RunError>
    where
        F: Fn(&LatticeConfig) -> Result<Box<dyn Lattice>, LatticeError>,
    {
        let Task {
            index,
            density,
            sim_index,
        } = task;
        tracing::trace!(index, density, sim_index, "run starting");

        let lattice_err = |source| RunError::Lattice {
            density,
            sim_index,
            source,
        };
        let mut lattice = build(&self.config.lattice_config(density)).map_err(lattice_err)?;
        let mut walker = Walker::new(
            lattice.center(),
            self.config.walk_speed,
            self.config.handling_time,
        )
        .map_err(|source| RunError::Walk {
            density,
            sim_index,
            source,
        })?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed ^ index);

        let outcome = walker
            .walk(lattice.as_mut(), &self.policy(), self.config.end_time, &mut rng)
            .map_err(lattice_err)?;

        Ok(RunRecord {
            density,
            sim_index,
            discovered: outcome.discovered,
            capacity: lattice.capacity(),
        })
    }

    /// Run the whole batch on [`SimConfig::resolved_workers()`] threads.
    ///
    /// # Errors
    ///
    /// The first [`RunError`] raised by any run, or a thread failure.
    pub fn run(&self) -> Result<BatchSummary, RunError> {
        self.run_with(LatticeConfig::build)
    }

    /// Like [`run()`](Self::run), building each lattice with `build`.
    pub fn run_with<F>(&self, build: F) -> Result<BatchSummary, RunError>
    where
        F: Fn(&LatticeConfig) -> Result<Box<dyn Lattice>, LatticeError> + Sync,
    {
        let workers = self.config.resolved_workers();
        let total = self.config.total_runs();
        tracing::info!(
            runs = total,
            workers,
            policy = %self.policy(),
            dimension = self.config.dimension,
            "batch starting"
        );
        let started = Instant::now();

        let (task_tx, task_rx) = crossbeam_channel::unbounded();
        for task in self.tasks() {
            if task_tx.send(task).is_err() {
                break;
            }
        }
        drop(task_tx);

        let records = Mutex::new(Vec::with_capacity(usize::try_from(total).unwrap_or(0)));
        let stop = AtomicBool::new(false);
        let failure: Mutex<Option<RunError>> = Mutex::new(None);

        let joined = thread::scope(|scope| {
            let (records, stop, failure, build) = (&records, &stop, &failure, &build);
            let mut handles = Vec::with_capacity(workers);
            for w in 0..workers {
                let rx = task_rx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("forage-worker-{w}"))
                    .spawn_scoped(scope, move || {
                        self.worker_loop(rx, build, records, stop, failure)
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        stop.store(true, Ordering::Relaxed);
                        return Err(RunError::ThreadSpawn {
                            reason: format!("forage-worker-{w}: {e}"),
                        });
                    }
                }
            }
            let panicked = handles
                .into_iter()
                .map(|h| h.join())
                .filter(Result::is_err)
                .count();
            Ok(panicked)
        });

        let panicked = joined.inspect_err(|err| tracing::error!(error = %err, "batch aborted"))?;
        if panicked > 0 {
            let err = RunError::WorkerPanicked { count: panicked };
            tracing::error!(error = %err, "batch aborted");
            return Err(err);
        }
        if let Some(err) = failure.into_inner().unwrap_or_else(PoisonError::into_inner) {
            tracing::error!(error = %err, "batch aborted");
            return Err(err);
        }

        let records = records.into_inner().unwrap_or_else(PoisonError::into_inner);
        let summary = BatchSummary::new(records);
        tracing::info!(
            runs = summary.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch finished"
        );
        Ok(summary)
    }

    fn worker_loop<F>(
        &self,
        rx: Receiver<Task>,
        build: &F,
        records: &Mutex<Vec<RunRecord>>,
        stop: &AtomicBool,
        failure: &Mutex<Option<RunError>>,
    ) where
        F: Fn(&LatticeConfig) -> Result<Box<dyn Lattice>, LatticeError>,
    {
        while let Ok(task) = rx.recv() {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            match self.run_task_with(task, build) {
                Ok(record) => records
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(record),
                Err(err) => {
                    stop.store(true, Ordering::Relaxed);
                    tracing::warn!(
                        density = task.density,
                        sim_index = task.sim_index,
                        error = %err,
                        "run failed, stopping batch"
                    );
                    failure
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .get_or_insert(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn small(perturbation: Perturbation) -> SimConfig {
        SimConfig {
            n_sims: 3,
            workers: Some(2),
            end_time: 40.0,
            densities: vec![100, 2500],
            perturbation,
            seed: 11,
            ..SimConfig::default()
        }
    }

    #[test]
    fn tasks_are_density_major() {
        let runner = BatchRunner::new(small(Perturbation::Plain)).unwrap();
        let tasks: Vec<_> = runner.tasks().collect();
        assert_eq!(tasks.len(), 6);
        assert_eq!(
            tasks[3],
            Task {
                index: 3,
                density: 2500,
                sim_index: 0
            }
        );
        assert!(tasks.windows(2).all(|w| w[0].index + 1 == w[1].index));
    }

    proptest! {
        #[test]
        fn tasks_cover_every_pair_once(n_sims in 1u32..20, densities in prop::collection::btree_set(2u64..50_000, 1..6)) {
            let config = SimConfig {
                n_sims,
                densities: densities.iter().copied().collect(),
                ..small(Perturbation::Plain)
            };
            let runner = BatchRunner::new(config).unwrap();
            let tasks: Vec<_> = runner.tasks().collect();
            prop_assert_eq!(tasks.len() as u64, runner.config().total_runs());
            for (i, t) in tasks.iter().enumerate() {
                prop_assert_eq!(t.index, i as u64);
            }
            let pairs: std::collections::HashSet<_> =
                tasks.iter().map(|t| (t.density, t.sim_index)).collect();
            prop_assert_eq!(pairs.len(), tasks.len());
        }
    }

    #[test]
    fn policy_follows_perturbation() {
        for p in Perturbation::ALL {
            let runner = BatchRunner::new(small(p)).unwrap();
            assert_eq!(runner.policy().name(), p.name());
        }
    }

    #[test]
    fn jumps_need_a_positive_lower_bound() {
        let config = SimConfig {
            power_law_xmin: 0.0,
            ..small(Perturbation::Jumps)
        };
        assert!(matches!(
            BatchRunner::new(config),
            Err(ConfigError::PowerLaw(WalkError::InvalidRange { min: 0, .. }))
        ));
        // Other walks never tabulate the law.
        let config = SimConfig {
            power_law_xmin: 0.0,
            ..small(Perturbation::Plain)
        };
        assert!(BatchRunner::new(config).is_ok());
    }

    #[test]
    fn run_task_is_reproducible() {
        let runner = BatchRunner::new(small(Perturbation::Memory)).unwrap();
        let task = runner.tasks().nth(4).unwrap();
        let a = runner.run_task(task).unwrap();
        let b = runner.run_task(task).unwrap();
        assert_eq!(a, b);
        assert_eq!((a.density, a.sim_index), (2500, 1));
        assert!(a.discovered >= 1);
    }

    #[test]
    fn run_matches_sequential_replay() {
        let runner = BatchRunner::new(small(Perturbation::Drift)).unwrap();
        let summary = runner.run().unwrap();
        let replayed: Vec<_> = runner.tasks().map(|t| runner.run_task(t).unwrap()).collect();
        assert_eq!(summary.records(), replayed.as_slice());
    }

    #[test]
    fn build_failure_aborts_batch() {
        let runner = BatchRunner::new(small(Perturbation::Plain)).unwrap();
        let err = runner
            .run_with(|_| {
                Err(LatticeError::AllocationFailed {
                    requested: u64::MAX,
                })
            })
            .unwrap_err();
        assert!(matches!(
            err,
            RunError::Lattice {
                source: LatticeError::AllocationFailed { .. },
                ..
            }
        ));
    }
}
