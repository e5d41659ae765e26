//! N-gram histogram engine and concurrency benchmark toolkit.
//!
//! The crate counts contiguous token sequences ("n-grams") over a text
//! corpus and exists to compare how work-partitioning strategies behave
//! under thread scaling (fixed workload, varying worker count) and workload
//! scaling (fixed worker count, replicated corpus).  Typical usage loads or
//! synthesizes a corpus, runs a [`Counter`] pass with a chosen [`Strategy`],
//! and inspects the resulting histogram:
//!
//! ```
//! use nhist::{CountConfig, Counter, Strategy};
//!
//! # fn main() -> nhist::Result<()> {
//! let tokens: Vec<String> = ["a", "b", "a", "b", "a"]
//!     .iter()
//!     .map(|token| (*token).to_owned())
//!     .collect();
//! let cfg = CountConfig::builder()
//!     .ngram(2)
//!     .threads(2)
//!     .strategy(Strategy::ChunkTls)
//!     .build()?;
//! let outcome = Counter::new(cfg).count_flat(&tokens)?;
//! assert_eq!(outcome.histogram.get("a b"), Some(&2));
//! # Ok(())
//! # }
//! ```
//!
//! Every strategy produces a histogram identical to the sequential
//! baseline's, key for key, independent of thread count; only the time to
//! get there differs.  The CLI is enabled by default through the `cli`
//! feature.  Users targeting the library portion only can disable default
//! features to avoid the CLI dependencies:
//! `nhist = { version = "...", default-features = false }`.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    clippy::all,
    rust_2018_idioms,
    future_incompatible,
    unused_lifetimes,
    unreachable_pub
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::doc_markdown,
    clippy::multiple_crate_versions
)]

pub mod bench;
pub mod config;
pub mod corpus;
pub mod counter;
pub mod error;
pub mod export;
pub mod ngram;
mod pipeline;
pub mod shard;
pub mod strategy;
pub mod tokenize;

pub use bench::{BenchCorpus, BenchmarkRecord};
pub use config::{CountBuilder, CountConfig, IngestBuilder, IngestConfig};
pub use counter::{CountOutcome, Counter};
pub use error::{NhistError, Result};
pub use ngram::Histogram;
pub use strategy::Strategy;
pub use tokenize::Token;
