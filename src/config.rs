//! Configuration builders controlling counting passes and corpus ingestion.

use serde::{Deserialize, Serialize};

use crate::error::{NhistError, Result};
use crate::strategy::Strategy;

/// Configuration for one counting pass.
///
/// A pass is a pure computation: the configuration and the corpus go in, a
/// merged histogram comes out. No state survives between passes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountConfig {
    /// N-gram arity; windows of this many consecutive tokens are counted.
    pub ngram: usize,
    /// Worker threads in the pass's pool.
    pub threads: usize,
    /// Logical corpus replication factor. Replication never bridges copies,
    /// so counts scale by exactly this factor, key for key.
    pub multiplier: usize,
    /// Partitioning strategy executed by the pass.
    pub strategy: Strategy,
    /// Shard count for the sharded-lock strategy. A tuning knob, not a
    /// correctness parameter.
    pub shard_count: usize,
    /// Distinct buffered keys a worker accumulates before flushing to a
    /// shared histogram in the lock-based strategies.
    pub batch_size: usize,
}

impl CountConfig {
    /// Returns a builder initialised with [`CountConfig::default`].
    #[must_use]
    pub fn builder() -> CountBuilder {
        CountBuilder::default()
    }

    /// Validates the invariants required before any worker starts.
    pub fn validate(&self) -> Result<()> {
        if self.ngram == 0 {
            return Err(NhistError::InvalidConfig(
                "ngram arity must be greater than zero".into(),
            ));
        }
        if self.threads == 0 {
            return Err(NhistError::InvalidConfig(
                "thread count must be greater than zero".into(),
            ));
        }
        if self.multiplier == 0 {
            return Err(NhistError::InvalidConfig(
                "workload multiplier must be greater than zero".into(),
            ));
        }
        if self.shard_count == 0 {
            return Err(NhistError::InvalidConfig(
                "shard count must be greater than zero".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(NhistError::InvalidConfig(
                "batch size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for CountConfig {
    fn default() -> Self {
        Self {
            ngram: 2,
            threads: 1,
            multiplier: 1,
            strategy: Strategy::ChunkTls,
            shard_count: 1024,
            batch_size: 10_000,
        }
    }
}

/// Builder for [`CountConfig`].
#[derive(Debug, Default, Clone)]
pub struct CountBuilder {
    cfg: CountConfig,
}

impl CountBuilder {
    /// Creates a builder with [`CountConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the n-gram arity.
    #[must_use]
    pub fn ngram(mut self, value: usize) -> Self {
        self.cfg.ngram = value;
        self
    }

    /// Sets the worker thread count.
    #[must_use]
    pub fn threads(mut self, value: usize) -> Self {
        self.cfg.threads = value;
        self
    }

    /// Sets the workload multiplier.
    #[must_use]
    pub fn multiplier(mut self, value: usize) -> Self {
        self.cfg.multiplier = value;
        self
    }

    /// Sets the partitioning strategy.
    #[must_use]
    pub fn strategy(mut self, value: Strategy) -> Self {
        self.cfg.strategy = value;
        self
    }

    /// Sets the shard count for the sharded-lock strategy.
    #[must_use]
    pub fn shard_count(mut self, value: usize) -> Self {
        self.cfg.shard_count = value;
        self
    }

    /// Sets the per-worker flush threshold for the lock-based strategies.
    #[must_use]
    pub fn batch_size(mut self, value: usize) -> Self {
        self.cfg.batch_size = value;
        self
    }

    /// Finalises the builder, returning a validated [`CountConfig`].
    pub fn build(self) -> Result<CountConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

/// Configuration controlling how corpus files are discovered and read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestConfig {
    /// Only files with this extension are loaded from directories; `None`
    /// loads every regular file. Explicit file arguments bypass the filter.
    pub extension: Option<String>,
    /// Enables recursive directory traversal.
    pub recursive: bool,
    /// Follows symlinks encountered during traversal.
    pub follow_symlinks: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            extension: Some("txt".into()),
            recursive: true,
            follow_symlinks: false,
        }
    }
}

impl IngestConfig {
    /// Returns a builder initialised with [`IngestConfig::default`].
    #[must_use]
    pub fn builder() -> IngestBuilder {
        IngestBuilder::default()
    }
}

/// Builder for [`IngestConfig`].
#[derive(Debug, Default, Clone)]
pub struct IngestBuilder {
    cfg: IngestConfig,
}

impl IngestBuilder {
    /// Creates a new builder with [`IngestConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the extension filter (`None` disables filtering).
    #[must_use]
    pub fn extension(mut self, value: Option<String>) -> Self {
        self.cfg.extension = value;
        self
    }

    /// Enables or disables recursive directory traversal.
    #[must_use]
    pub fn recursive(mut self, enabled: bool) -> Self {
        self.cfg.recursive = enabled;
        self
    }

    /// Enables or disables following of symlinks when traversing directories.
    #[must_use]
    pub fn follow_symlinks(mut self, enabled: bool) -> Self {
        self.cfg.follow_symlinks = enabled;
        self
    }

    /// Finalises the builder, returning the [`IngestConfig`].
    #[must_use]
    pub fn build(self) -> IngestConfig {
        self.cfg
    }
}
