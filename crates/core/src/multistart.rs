//! Multi-start scatter/gather framework.
//!
//! A non-convex solve is restarted from independently drawn random
//! initializations; restarts share no mutable state and run on a rayon
//! worker pool. The runner joins synchronously and reduces the collected
//! outcomes to the feasible one with the smallest objective.
//!
//! Determinism: each restart derives its own `StdRng` from the master seed
//! and its restart index, so the selected outcome depends only on the
//! inputs and the seed, never on scheduling order or thread count.

use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a multi-start batch.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MultiStartConfig {
    /// Number of independent restarts.
    pub restarts: usize,
    /// Master random seed (None = drawn from entropy).
    pub seed: Option<u64>,
    /// Worker threads for the batch (0 = rayon default pool).
    pub threads: usize,
    /// Wall-clock limit in milliseconds (0 = unlimited). Restarts that have
    /// not started when the limit passes are skipped; in-flight restarts run
    /// to completion.
    pub time_limit_ms: u64,
}

impl Default for MultiStartConfig {
    fn default() -> Self {
        Self {
            restarts: 8,
            seed: None,
            threads: 0,
            time_limit_ms: 0,
        }
    }
}

impl MultiStartConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the restart count.
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Sets the master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the worker thread count (0 = rayon default pool).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the wall-clock limit in milliseconds (0 = unlimited).
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }
}

/// Outcome of one restart.
#[derive(Debug, Clone)]
pub struct Restart<S> {
    /// Restart index within the batch.
    pub index: usize,
    /// Objective value achieved by this restart.
    pub objective: f64,
    /// Whether the outcome satisfies all constraints within tolerance.
    pub feasible: bool,
    /// The restart's solution payload.
    pub solution: S,
}

/// A problem that can be attacked by independent randomized restarts.
///
/// Implementations must contain their own numerical failures: a failed
/// restart is reported as an infeasible outcome (objective `+inf`), never
/// as a panic or error, so one bad restart cannot abort the batch.
pub trait MultiStartProblem: Send + Sync {
    /// The per-restart solution payload.
    type Solution: Send;

    /// Runs one independent restart with its own RNG.
    fn run_restart(&self, index: usize, rng: &mut StdRng) -> Restart<Self::Solution>;
}

/// Result of a multi-start batch.
#[derive(Debug, Clone)]
pub struct MultiStartResult<S> {
    /// Feasible outcome with the smallest objective, if any restart was
    /// feasible. Ties go to the lowest restart index.
    pub best: Option<Restart<S>>,
    /// Restarts actually executed (skipped restarts excluded).
    pub restarts_run: usize,
    /// Number of feasible outcomes.
    pub feasible_count: usize,
    /// Whether the batch was cut short by cancellation or the time limit.
    pub cancelled: bool,
    /// Total batch wall-clock time.
    pub elapsed: Duration,
}

/// Multi-start batch runner.
pub struct MultiStartRunner<P: MultiStartProblem> {
    config: MultiStartConfig,
    problem: P,
    cancelled: Arc<AtomicBool>,
}

impl<P: MultiStartProblem> MultiStartRunner<P> {
    /// Creates a new runner.
    pub fn new(config: MultiStartConfig, problem: P) -> Self {
        Self {
            config,
            problem,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a runner with a pre-existing cancellation handle.
    pub fn with_cancellation(
        config: MultiStartConfig,
        problem: P,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            problem,
            cancelled,
        }
    }

    /// Returns a handle that cancels not-yet-started restarts.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Runs the batch and reduces the outcomes.
    pub fn run(&self) -> Result<MultiStartResult<P::Solution>> {
        if self.config.restarts == 0 {
            return Err(Error::ConfigError(
                "multi-start batch needs at least one restart".to_string(),
            ));
        }

        let master_seed = self.config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let start = Instant::now();
        let deadline = (self.config.time_limit_ms > 0)
            .then(|| start + Duration::from_millis(self.config.time_limit_ms));

        let run_one = |index: usize| -> Option<Restart<P::Solution>> {
            if self.cancelled.load(Ordering::Relaxed) {
                return None;
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    self.cancelled.store(true, Ordering::Relaxed);
                    log::warn!(
                        "multi-start batch hit the {}ms time limit; skipping remaining restarts",
                        self.config.time_limit_ms
                    );
                    return None;
                }
            }
            let mut rng = StdRng::seed_from_u64(restart_seed(master_seed, index));
            Some(self.problem.run_restart(index, &mut rng))
        };

        let outcomes: Vec<Option<Restart<P::Solution>>> = if self.config.threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.threads)
                .build()
                .map_err(|e| Error::ConfigError(e.to_string()))?;
            pool.install(|| (0..self.config.restarts).into_par_iter().map(run_one).collect())
        } else {
            (0..self.config.restarts).into_par_iter().map(run_one).collect()
        };

        // Pure fold over the collected outcomes. `collect` preserves restart
        // order, so strict less-than keeps the lowest index on ties.
        let mut best: Option<Restart<P::Solution>> = None;
        let mut restarts_run = 0;
        let mut feasible_count = 0;
        for outcome in outcomes.into_iter().flatten() {
            restarts_run += 1;
            if !outcome.feasible {
                continue;
            }
            feasible_count += 1;
            best = match best {
                Some(incumbent) if incumbent.objective <= outcome.objective => Some(incumbent),
                _ => Some(outcome),
            };
        }

        Ok(MultiStartResult {
            best,
            restarts_run,
            feasible_count,
            cancelled: self.cancelled.load(Ordering::Relaxed),
            elapsed: start.elapsed(),
        })
    }
}

/// Derives a decorrelated per-restart seed from the master seed
/// (SplitMix64 finalizer).
fn restart_seed(master: u64, index: usize) -> u64 {
    let mut z = master.wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
