//! The closed set of work-partitioning strategies understood by the engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NhistError;

/// Work-partitioning strategy executed by a counting pass.
///
/// The variant is resolved once per invocation; the engine dispatches on it
/// with a single `match`, never on a strategy name string per work unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Single-threaded reference implementation and speedup denominator.
    Sequential,
    /// Static equal chunks of window-start indices, one private accumulator
    /// per chunk.
    ChunkTls,
    /// Dynamically claimed whole documents, one private accumulator per
    /// worker task.
    DocumentTls,
    /// One shared histogram behind a single mutex, updated in batches.
    CoarseLock,
    /// Hash-sharded histograms behind per-shard mutexes, updated in batches.
    ShardedLock,
    /// One designated worker reads every file into memory, then all workers
    /// dynamically claim buffered texts for counting.
    SingleReader,
    /// Every worker reads and counts its own dynamically claimed files.
    OnTheFly,
    /// Workers claim files into private buffers first, then count their own
    /// buffer without further synchronization.
    HybridPreload,
}

impl Strategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Strategy; 8] = [
        Strategy::Sequential,
        Strategy::ChunkTls,
        Strategy::DocumentTls,
        Strategy::CoarseLock,
        Strategy::ShardedLock,
        Strategy::SingleReader,
        Strategy::OnTheFly,
        Strategy::HybridPreload,
    ];

    /// Stable kebab-case name used in CSV output and CLI arguments.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::ChunkTls => "chunk-tls",
            Strategy::DocumentTls => "document-tls",
            Strategy::CoarseLock => "coarse-lock",
            Strategy::ShardedLock => "sharded-lock",
            Strategy::SingleReader => "single-reader",
            Strategy::OnTheFly => "on-the-fly",
            Strategy::HybridPreload => "hybrid-preload",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = NhistError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == value)
            .ok_or_else(|| NhistError::InvalidConfig(format!("unknown strategy {value:?}")))
    }
}
