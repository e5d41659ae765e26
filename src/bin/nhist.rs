use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use nhist::bench::{self, BenchCorpus};
use nhist::corpus;
use nhist::export::ResultsExporter;
use nhist::ngram::{top_k, total_occurrences};
use nhist::{CountConfig, CountOutcome, Counter, IngestConfig, Strategy};
use serde_json::json;

const DEFAULT_SWEEP_STRATEGIES: [Strategy; 3] = [
    Strategy::ChunkTls,
    Strategy::DocumentTls,
    Strategy::ShardedLock,
];

#[derive(Parser, Debug)]
#[command(author, version, about = "N-gram concurrency benchmark toolkit", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, global = true, action = ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count n-grams once with a chosen strategy
    Count(CountArgs),
    /// Sweep worker counts over a fixed workload
    ThreadScaling(ThreadScalingArgs),
    /// Sweep workload multipliers at a fixed worker count
    WorkloadScaling(WorkloadScalingArgs),
}

#[derive(Args, Debug)]
struct CorpusArgs {
    /// Files or directories holding the corpus
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Only load directory files with this extension ("" disables the filter)
    #[arg(long, value_name = "EXT", default_value = "txt")]
    extension: String,

    /// Disable recursive directory traversal
    #[arg(long)]
    no_recursive: bool,

    /// Follow symlinks during traversal
    #[arg(long)]
    follow_symlinks: bool,
}

impl CorpusArgs {
    fn ingest(&self) -> IngestConfig {
        let extension = if self.extension.is_empty() {
            None
        } else {
            Some(self.extension.clone())
        };
        IngestConfig::builder()
            .extension(extension)
            .recursive(!self.no_recursive)
            .follow_symlinks(self.follow_symlinks)
            .build()
    }
}

#[derive(Args, Debug)]
struct TuningArgs {
    /// N-gram arity
    #[arg(short = 'n', long, value_name = "N", default_value_t = 2)]
    ngram: usize,

    /// Shard count for the sharded-lock strategy
    #[arg(long, value_name = "COUNT", default_value_t = 1024)]
    shards: usize,

    /// Distinct buffered keys per worker before a lock-strategy flush
    #[arg(long, value_name = "KEYS", default_value_t = 10_000)]
    batch_size: usize,
}

#[derive(Args, Debug)]
struct CountArgs {
    #[command(flatten)]
    corpus: CorpusArgs,

    #[command(flatten)]
    tuning: TuningArgs,

    /// Partitioning strategy to run
    #[arg(short, long, value_enum, default_value_t = Strategy::ChunkTls)]
    strategy: Strategy,

    /// Worker threads
    #[arg(short, long, value_name = "N", default_value_t = 1)]
    threads: usize,

    /// Workload multiplier (logical corpus replication)
    #[arg(short, long, value_name = "M", default_value_t = 1)]
    multiplier: usize,

    /// Number of most frequent n-grams to report
    #[arg(long, value_name = "K", default_value_t = 10)]
    top: usize,

    /// Emit a machine-readable JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct ThreadScalingArgs {
    #[command(flatten)]
    corpus: CorpusArgs,

    #[command(flatten)]
    tuning: TuningArgs,

    /// Largest worker count to sweep (1..=N)
    #[arg(long, value_name = "N", default_value_t = 8)]
    max_threads: usize,

    /// Strategies to sweep (repeat flag; defaults to the TLS and sharded set)
    #[arg(short, long, value_enum, value_name = "STRATEGY")]
    strategies: Vec<Strategy>,

    /// Directory for CSV and summary output
    #[arg(short, long, value_name = "DIR", default_value = "results")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct WorkloadScalingArgs {
    #[command(flatten)]
    corpus: CorpusArgs,

    #[command(flatten)]
    tuning: TuningArgs,

    /// Fixed worker count for every pass
    #[arg(short, long, value_name = "N", default_value_t = 8)]
    threads: usize,

    /// Largest multiplier to sweep (steps 1..=M)
    #[arg(long, value_name = "M", default_value_t = 10)]
    max_multiplier: usize,

    /// Strategies to sweep (repeat flag; defaults to the TLS and sharded set)
    #[arg(short, long, value_enum, value_name = "STRATEGY")]
    strategies: Vec<Strategy>,

    /// Directory for CSV and summary output
    #[arg(short, long, value_name = "DIR", default_value = "results")]
    out: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Count(args) => run_count(args),
        Commands::ThreadScaling(args) => run_thread_scaling(args),
        Commands::WorkloadScaling(args) => run_workload_scaling(args),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    use log::LevelFilter;

    let level = if quiet > 0 {
        match quiet {
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}

fn count_config(tuning: &TuningArgs, strategy: Strategy, threads: usize, multiplier: usize) -> Result<CountConfig> {
    CountConfig::builder()
        .ngram(tuning.ngram)
        .threads(threads)
        .multiplier(multiplier)
        .strategy(strategy)
        .shard_count(tuning.shards)
        .batch_size(tuning.batch_size)
        .build()
        .context("invalid counting parameters")
}

fn run_count(args: CountArgs) -> Result<()> {
    let ingest = args.corpus.ingest();
    let cfg = count_config(&args.tuning, args.strategy, args.threads, args.multiplier)?;
    let counter = Counter::new(cfg);

    let outcome = match args.strategy {
        Strategy::DocumentTls => {
            let documents = corpus::load_document_corpus(&args.corpus.inputs, &ingest)?;
            info!("loaded {} documents", documents.len());
            counter.count_documents(&documents)?
        }
        Strategy::SingleReader | Strategy::OnTheFly | Strategy::HybridPreload => {
            let paths = corpus::collect_paths(&args.corpus.inputs, &ingest)?;
            info!("discovered {} corpus files", paths.len());
            counter.count_files(&paths)?
        }
        _ => {
            let tokens = corpus::load_flat_corpus(&args.corpus.inputs, &ingest)?;
            info!("loaded flat corpus with {} tokens", tokens.len());
            counter.count_flat(&tokens)?
        }
    };

    if args.json {
        print_json_report(&args, &outcome)?;
    } else {
        print_text_report(&args, &outcome);
    }
    Ok(())
}

fn print_json_report(args: &CountArgs, outcome: &CountOutcome) -> Result<()> {
    let top: Vec<_> = top_k(&outcome.histogram, args.top)
        .into_iter()
        .map(|(ngram, count)| json!({ "ngram": ngram, "count": count }))
        .collect();
    let report = json!({
        "strategy": args.strategy.name(),
        "ngram": args.tuning.ngram,
        "threads": args.threads,
        "multiplier": args.multiplier,
        "elapsed_seconds": outcome.elapsed.as_secs_f64(),
        "total_occurrences": total_occurrences(&outcome.histogram),
        "unique_ngrams": outcome.histogram.len(),
        "top": top,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_text_report(args: &CountArgs, outcome: &CountOutcome) {
    let total = total_occurrences(&outcome.histogram);
    let unique = outcome.histogram.len();
    println!("==============================================");
    println!("Statistics for {}-grams ({})", args.tuning.ngram, args.strategy);
    println!("==============================================");
    println!("Elapsed: {:.4}s", outcome.elapsed.as_secs_f64());
    println!("Total n-grams (occurrences): {total}");
    println!("Unique n-grams (vocabulary): {unique}");
    if total > 0 {
        println!(
            "Unique/total ratio: {:.2}%",
            unique as f64 / total as f64 * 100.0
        );
    }
    let top = top_k(&outcome.histogram, args.top);
    if !top.is_empty() {
        println!("\nTop {} {}-grams:", top.len(), args.tuning.ngram);
        for (rank, (ngram, count)) in top.iter().enumerate() {
            println!("{}. '{}' -> {}", rank + 1, ngram, count);
        }
    }
    println!("==============================================");
}

fn sweep_strategies(requested: &[Strategy]) -> Vec<Strategy> {
    if requested.is_empty() {
        DEFAULT_SWEEP_STRATEGIES.to_vec()
    } else {
        requested.to_vec()
    }
}

fn sweep_bar(steps: usize) -> Result<ProgressBar> {
    let bar = ProgressBar::new(steps as u64);
    let style = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
        .context("progress template")?
        .progress_chars("=> ");
    bar.set_style(style);
    Ok(bar)
}

fn run_thread_scaling(args: ThreadScalingArgs) -> Result<()> {
    let ingest = args.corpus.ingest();
    let base = count_config(&args.tuning, Strategy::Sequential, 1, 1)?;
    let strategies = sweep_strategies(&args.strategies);

    let corpus = BenchCorpus::load(&args.corpus.inputs, &ingest)?;
    info!(
        "thread scaling over {} tokens in {} documents, threads 1..={}",
        corpus.flat.len(),
        corpus.documents.len(),
        args.max_threads
    );

    let baseline = bench::sequential_seconds(&corpus, &base, 1)?;
    println!("Sequential baseline: {baseline:.4}s");

    let bar = sweep_bar(strategies.len())?;
    let mut records = Vec::new();
    for strategy in strategies {
        bar.set_message(strategy.to_string());
        records.extend(bench::thread_scaling(
            &corpus,
            &base,
            strategy,
            args.max_threads,
            baseline,
        )?);
        bar.inc(1);
    }
    bar.finish_and_clear();

    let exporter = ResultsExporter::new(&args.out)?;
    let csv = exporter.save_thread_scaling(
        &format!("thread_scaling_{}gram_t{}.csv", args.tuning.ngram, args.max_threads),
        &records,
    )?;
    let summary = exporter.save_summary(
        &format!(
            "thread_scaling_{}gram_t{}_summary.txt",
            args.tuning.ngram, args.max_threads
        ),
        args.tuning.ngram,
        &records,
    )?;
    println!("Results saved to {}", csv.display());
    println!("Summary saved to {}", summary.display());
    Ok(())
}

fn run_workload_scaling(args: WorkloadScalingArgs) -> Result<()> {
    let ingest = args.corpus.ingest();
    let base = count_config(&args.tuning, Strategy::Sequential, args.threads, 1)?;
    let strategies = sweep_strategies(&args.strategies);
    let multipliers: Vec<usize> = (1..=args.max_multiplier).collect();

    let corpus = BenchCorpus::load(&args.corpus.inputs, &ingest)?;
    info!(
        "workload scaling over {} tokens at {} threads, multipliers 1..={}",
        corpus.flat.len(),
        args.threads,
        args.max_multiplier
    );

    let bar = sweep_bar(multipliers.len())?;
    bar.set_message("sequential baselines");
    let mut baselines = Vec::with_capacity(multipliers.len());
    for &multiplier in &multipliers {
        baselines.push(bench::sequential_seconds(&corpus, &base, multiplier)?);
        bar.inc(1);
    }
    bar.finish_and_clear();

    let bar = sweep_bar(strategies.len())?;
    let mut records = Vec::new();
    for strategy in strategies {
        bar.set_message(strategy.to_string());
        records.extend(bench::workload_scaling(
            &corpus,
            &base,
            strategy,
            &multipliers,
            &baselines,
        )?);
        bar.inc(1);
    }
    bar.finish_and_clear();

    let exporter = ResultsExporter::new(&args.out)?;
    let csv = exporter.save_workload_scaling(
        &format!(
            "workload_{}gram_t{}.csv",
            args.tuning.ngram, args.threads
        ),
        &records,
    )?;
    let summary = exporter.save_summary(
        &format!(
            "workload_{}gram_t{}_summary.txt",
            args.tuning.ngram, args.threads
        ),
        args.tuning.ngram,
        &records,
    )?;
    println!("Results saved to {}", csv.display());
    println!("Summary saved to {}", summary.display());
    Ok(())
}
