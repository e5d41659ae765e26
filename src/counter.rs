//! The concurrent histogram-counting engine and its partitioning strategies.
//!
//! Every strategy turns the same corpus into the same histogram; they differ
//! only in how the work is divided among workers and where partial counts
//! live until the merge. All state is pass-scoped: accumulators, shard
//! tables, and worker pools are created at the start of a counting
//! invocation and fully consumed before it returns.

use std::ops::Range;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::CountConfig;
use crate::error::{NhistError, Result};
use crate::ngram::{add, bump, merge_partials, window_count, write_key, Histogram};
use crate::pipeline;
use crate::shard::ShardTable;
use crate::strategy::Strategy;
use crate::tokenize::Token;

/// Result of one counting pass.
#[must_use]
#[derive(Debug, Clone)]
pub struct CountOutcome {
    /// Merged n-gram frequency histogram.
    pub histogram: Histogram,
    /// Elapsed wall-clock time for the pass. Corpus loading and pool
    /// construction are excluded; the I/O-coupled strategies include their
    /// file reads, which is what those variants exist to measure.
    pub elapsed: Duration,
}

/// High-level façade configuring and executing counting passes.
#[derive(Debug, Clone)]
pub struct Counter {
    cfg: CountConfig,
}

impl Counter {
    /// Creates a new counter for the supplied configuration.
    #[must_use]
    pub fn new(cfg: CountConfig) -> Self {
        Self { cfg }
    }

    /// Returns an immutable reference to the underlying configuration.
    #[must_use]
    pub fn config(&self) -> &CountConfig {
        &self.cfg
    }

    /// Counts n-grams over a flat token sequence.
    ///
    /// Valid strategies: `sequential`, `chunk-tls`, `coarse-lock`, and
    /// `sharded-lock`. A corpus shorter than the arity yields an empty
    /// histogram, not an error.
    pub fn count_flat(&self, tokens: &[Token]) -> Result<CountOutcome> {
        self.cfg.validate()?;
        let pool = self.build_pool()?;
        let n = self.cfg.ngram;
        let multiplier = self.cfg.multiplier;
        let started = Instant::now();
        let histogram = match self.cfg.strategy {
            Strategy::Sequential => seq_flat(tokens, n, multiplier),
            Strategy::ChunkTls => chunk_tls(&pool, tokens, n, multiplier),
            Strategy::CoarseLock => {
                coarse_lock(&pool, tokens, n, multiplier, self.cfg.batch_size)
            }
            Strategy::ShardedLock => sharded_lock(
                &pool,
                tokens,
                n,
                multiplier,
                self.cfg.shard_count,
                self.cfg.batch_size,
            ),
            other => return Err(view_mismatch(other, "a flat token sequence")),
        };
        Ok(CountOutcome {
            histogram,
            elapsed: started.elapsed(),
        })
    }

    /// Counts n-grams over a document corpus; windows never cross document
    /// boundaries. Valid strategies: `sequential` and `document-tls`.
    pub fn count_documents(&self, documents: &[Vec<Token>]) -> Result<CountOutcome> {
        self.cfg.validate()?;
        let pool = self.build_pool()?;
        let n = self.cfg.ngram;
        let multiplier = self.cfg.multiplier;
        let started = Instant::now();
        let histogram = match self.cfg.strategy {
            Strategy::Sequential => seq_documents(documents, n, multiplier),
            Strategy::DocumentTls => document_tls(&pool, documents, n, multiplier),
            other => return Err(view_mismatch(other, "a document corpus")),
        };
        Ok(CountOutcome {
            histogram,
            elapsed: started.elapsed(),
        })
    }

    /// Counts n-grams over a list of corpus files, coupling reads with
    /// counting. Valid strategies: `single-reader`, `on-the-fly`, and
    /// `hybrid-preload`. Windows never cross file boundaries.
    pub fn count_files(&self, paths: &[PathBuf]) -> Result<CountOutcome> {
        self.cfg.validate()?;
        let pool = self.build_pool()?;
        let n = self.cfg.ngram;
        let multiplier = self.cfg.multiplier;
        let started = Instant::now();
        let histogram = match self.cfg.strategy {
            Strategy::SingleReader => pipeline::single_reader(&pool, paths, n, multiplier)?,
            Strategy::OnTheFly => pipeline::on_the_fly(&pool, paths, n, multiplier)?,
            Strategy::HybridPreload => pipeline::hybrid_preload(&pool, paths, n, multiplier)?,
            other => return Err(view_mismatch(other, "a corpus file list")),
        };
        Ok(CountOutcome {
            histogram,
            elapsed: started.elapsed(),
        })
    }

    fn build_pool(&self) -> Result<ThreadPool> {
        ThreadPoolBuilder::new()
            .num_threads(self.cfg.threads)
            .build()
            .map_err(Into::into)
    }
}

fn view_mismatch(strategy: Strategy, view: &str) -> NhistError {
    NhistError::InvalidConfig(format!("strategy {strategy} cannot run over {view}"))
}

/// Single sequential pass over one contiguous token run, accumulating into
/// `hist`. The correctness oracle for every parallel strategy.
pub(crate) fn count_seq_into(hist: &mut Histogram, tokens: &[Token], n: usize) {
    let windows = window_count(tokens.len(), n);
    let mut key = String::new();
    for start in 0..windows {
        write_key(&mut key, tokens, start, n);
        bump(hist, &key);
    }
}

fn seq_flat(tokens: &[Token], n: usize, multiplier: usize) -> Histogram {
    let mut hist = Histogram::default();
    for _ in 0..multiplier {
        count_seq_into(&mut hist, tokens, n);
    }
    hist
}

fn seq_documents(documents: &[Vec<Token>], n: usize, multiplier: usize) -> Histogram {
    let mut hist = Histogram::default();
    for _ in 0..multiplier {
        for document in documents {
            count_seq_into(&mut hist, document, n);
        }
    }
    hist
}

/// Contiguous, statically assigned chunks of `[0, total)`, one per worker,
/// remainder absorbed by the final chunk. Chunks are defined over
/// window-start indices, never raw token positions, so every window is
/// owned by exactly one chunk.
fn chunk_ranges(total: usize, workers: usize) -> Vec<Range<usize>> {
    if total == 0 {
        return Vec::new();
    }
    let size = total.div_ceil(workers.max(1));
    (0..workers.max(1))
        .map(|worker| (worker * size).min(total)..((worker + 1) * size).min(total))
        .filter(|range| !range.is_empty())
        .collect()
}

/// Replication never bridges copies: the virtual window index space is
/// `multiplier * windows` and a virtual index maps back onto its window
/// start within one copy.
fn virtual_windows(tokens_len: usize, n: usize, multiplier: usize) -> (usize, usize) {
    let windows = window_count(tokens_len, n);
    (windows, windows * multiplier)
}

fn chunk_tls(pool: &ThreadPool, tokens: &[Token], n: usize, multiplier: usize) -> Histogram {
    let (windows, total) = virtual_windows(tokens.len(), n, multiplier);
    let ranges = chunk_ranges(total, pool.current_num_threads());
    let partials = pool.install(|| {
        ranges
            .into_par_iter()
            .map(|range| {
                let mut local = Histogram::default();
                let mut key = String::new();
                for virtual_start in range {
                    write_key(&mut key, tokens, virtual_start % windows, n);
                    bump(&mut local, &key);
                }
                local
            })
            .collect::<Vec<_>>()
    });
    merge_partials(partials)
}

fn coarse_lock(
    pool: &ThreadPool,
    tokens: &[Token],
    n: usize,
    multiplier: usize,
    batch_size: usize,
) -> Histogram {
    let (windows, total) = virtual_windows(tokens.len(), n, multiplier);
    let ranges = chunk_ranges(total, pool.current_num_threads());
    let shared = Mutex::new(Histogram::default());
    pool.install(|| {
        ranges.into_par_iter().for_each(|range| {
            let mut buffer = Histogram::default();
            let mut key = String::new();
            for virtual_start in range {
                write_key(&mut key, tokens, virtual_start % windows, n);
                bump(&mut buffer, &key);
                if buffer.len() >= batch_size {
                    flush_into(&shared, &mut buffer);
                }
            }
            if !buffer.is_empty() {
                flush_into(&shared, &mut buffer);
            }
        });
    });
    shared.into_inner().expect("histogram lock poisoned")
}

fn flush_into(shared: &Mutex<Histogram>, buffer: &mut Histogram) {
    let mut hist = shared.lock().expect("histogram lock poisoned");
    for (key, count) in buffer.drain() {
        add(&mut hist, key, count);
    }
}

fn sharded_lock(
    pool: &ThreadPool,
    tokens: &[Token],
    n: usize,
    multiplier: usize,
    shard_count: usize,
    batch_size: usize,
) -> Histogram {
    let (windows, total) = virtual_windows(tokens.len(), n, multiplier);
    let ranges = chunk_ranges(total, pool.current_num_threads());
    let table = ShardTable::new(shard_count);
    pool.install(|| {
        ranges.into_par_iter().for_each(|range| {
            let mut buffer = Histogram::default();
            let mut key = String::new();
            for virtual_start in range {
                write_key(&mut key, tokens, virtual_start % windows, n);
                bump(&mut buffer, &key);
                if buffer.len() >= batch_size {
                    for (buffered, count) in buffer.drain() {
                        table.add(buffered, count);
                    }
                }
            }
            for (buffered, count) in buffer.drain() {
                table.add(buffered, count);
            }
        });
    });
    table.into_histogram()
}

fn document_tls(
    pool: &ThreadPool,
    documents: &[Vec<Token>],
    n: usize,
    multiplier: usize,
) -> Histogram {
    let replicated: Vec<&[Token]> = (0..multiplier)
        .flat_map(|_| documents.iter().map(Vec::as_slice))
        .collect();
    let partials = pool.install(|| {
        replicated
            .par_iter()
            .with_min_len(1)
            .fold(Histogram::default, |mut local, document| {
                count_seq_into(&mut local, document, n);
                local
            })
            .collect::<Vec<_>>()
    });
    merge_partials(partials)
}
