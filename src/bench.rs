//! Thread-scaling and workload-scaling sweep drivers.
//!
//! Thread scaling holds the workload fixed and varies the worker count;
//! workload scaling holds the worker count fixed and replicates the corpus.
//! Both report speedup against a measured sequential baseline.

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::{CountConfig, IngestConfig};
use crate::corpus::{self, DocumentCorpus, FlatCorpus};
use crate::counter::{CountOutcome, Counter};
use crate::error::{NhistError, Result};
use crate::strategy::Strategy;
use crate::tokenize::tokenize;

/// One measured counting pass within a sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkRecord {
    /// Strategy under measurement.
    pub strategy: Strategy,
    /// Worker threads used for the pass.
    pub threads: usize,
    /// Workload multiplier applied to the corpus.
    pub multiplier: usize,
    /// Wall-clock seconds for the pass.
    pub seconds: f64,
    /// Sequential baseline seconds divided by `seconds`.
    pub speedup: f64,
    /// Speedup divided by the thread count.
    pub efficiency: f64,
}

/// The corpus views a sweep may need, loaded once per run.
#[derive(Debug, Clone)]
pub struct BenchCorpus {
    /// Flat view with document boundaries elided.
    pub flat: FlatCorpus,
    /// Per-document view.
    pub documents: DocumentCorpus,
    /// Discovered corpus files for the I/O-coupled strategies.
    pub files: Vec<PathBuf>,
}

impl BenchCorpus {
    /// Loads all corpus views from the given inputs with a single read of
    /// each file.
    pub fn load<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<Self> {
        let files = corpus::collect_paths(inputs, cfg)?;
        let mut flat = Vec::new();
        let mut documents = Vec::new();
        for path in &files {
            let words = tokenize(&corpus::read_text(path)?);
            flat.extend(words.iter().cloned());
            if !words.is_empty() {
                documents.push(words);
            }
        }
        Ok(Self {
            flat,
            documents,
            files,
        })
    }

    /// Runs one counting pass, handing the strategy the corpus view it
    /// consumes.
    pub fn run_pass(&self, cfg: &CountConfig) -> Result<CountOutcome> {
        let counter = Counter::new(cfg.clone());
        match cfg.strategy {
            Strategy::Sequential
            | Strategy::ChunkTls
            | Strategy::CoarseLock
            | Strategy::ShardedLock => counter.count_flat(&self.flat),
            Strategy::DocumentTls => counter.count_documents(&self.documents),
            Strategy::SingleReader | Strategy::OnTheFly | Strategy::HybridPreload => {
                counter.count_files(&self.files)
            }
        }
    }
}

/// Measures the sequential baseline time for the given multiplier.
pub fn sequential_seconds(
    corpus: &BenchCorpus,
    base: &CountConfig,
    multiplier: usize,
) -> Result<f64> {
    let cfg = CountConfig {
        strategy: Strategy::Sequential,
        threads: 1,
        multiplier,
        ..base.clone()
    };
    let outcome = corpus.run_pass(&cfg)?;
    let seconds = outcome.elapsed.as_secs_f64();
    info!(
        "sequential baseline multiplier {multiplier} took {seconds:.3}s ({} occurrences)",
        crate::ngram::total_occurrences(&outcome.histogram)
    );
    Ok(seconds)
}

/// Fixed workload, worker counts `1..=max_threads`.
pub fn thread_scaling(
    corpus: &BenchCorpus,
    base: &CountConfig,
    strategy: Strategy,
    max_threads: usize,
    baseline_seconds: f64,
) -> Result<Vec<BenchmarkRecord>> {
    let mut records = Vec::with_capacity(max_threads);
    for threads in 1..=max_threads {
        let cfg = CountConfig {
            strategy,
            threads,
            ..base.clone()
        };
        let outcome = corpus.run_pass(&cfg)?;
        let record = record_for(&cfg, &outcome, baseline_seconds);
        info!(
            "strategy {strategy} threads {threads} took {:.3}s (speedup {:.2})",
            record.seconds, record.speedup
        );
        records.push(record);
    }
    Ok(records)
}

/// Fixed thread count, multiplier sweep. `baseline_seconds[i]` must hold
/// the sequential time measured for `multipliers[i]`.
pub fn workload_scaling(
    corpus: &BenchCorpus,
    base: &CountConfig,
    strategy: Strategy,
    multipliers: &[usize],
    baseline_seconds: &[f64],
) -> Result<Vec<BenchmarkRecord>> {
    if multipliers.len() != baseline_seconds.len() {
        return Err(NhistError::InvalidConfig(
            "one sequential baseline is required per multiplier step".into(),
        ));
    }
    let mut records = Vec::with_capacity(multipliers.len());
    for (&multiplier, &baseline) in multipliers.iter().zip(baseline_seconds) {
        let cfg = CountConfig {
            strategy,
            multiplier,
            ..base.clone()
        };
        let outcome = corpus.run_pass(&cfg)?;
        let record = record_for(&cfg, &outcome, baseline);
        info!(
            "strategy {strategy} multiplier {multiplier} took {:.3}s (speedup {:.2})",
            record.seconds, record.speedup
        );
        records.push(record);
    }
    Ok(records)
}

fn record_for(cfg: &CountConfig, outcome: &CountOutcome, baseline_seconds: f64) -> BenchmarkRecord {
    let seconds = outcome.elapsed.as_secs_f64();
    let speedup = if seconds > 0.0 {
        baseline_seconds / seconds
    } else {
        0.0
    };
    BenchmarkRecord {
        strategy: cfg.strategy,
        threads: cfg.threads,
        multiplier: cfg.multiplier,
        seconds,
        speedup,
        efficiency: speedup / cfg.threads as f64,
    }
}
