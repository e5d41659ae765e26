//! CSV and summary export of sweep results.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::bench::BenchmarkRecord;
use crate::error::{NhistError, Result};
use crate::strategy::Strategy;

/// Writes benchmark results into an output directory created on demand.
#[derive(Debug, Clone)]
pub struct ResultsExporter {
    out_dir: PathBuf,
}

impl ResultsExporter {
    /// Creates the exporter, creating `out_dir` and its parents if needed.
    pub fn new<P: AsRef<Path>>(out_dir: P) -> Result<Self> {
        let out_dir = out_dir.as_ref().to_path_buf();
        fs::create_dir_all(&out_dir).map_err(|err| NhistError::io(err, Some(out_dir.clone())))?;
        Ok(Self { out_dir })
    }

    /// Path a file named `name` will be written to.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.out_dir.join(name)
    }

    /// Writes a thread-scaling CSV.
    pub fn save_thread_scaling(
        &self,
        name: &str,
        records: &[BenchmarkRecord],
    ) -> Result<PathBuf> {
        let path = self.path_for(name);
        let mut file = self.create(&path)?;
        self.line(
            &path,
            &mut file,
            "Strategy,Threads,Time_seconds,Speedup,Efficiency_percent",
        )?;
        for record in records {
            self.line(
                &path,
                &mut file,
                &format!(
                    "{},{},{:.6},{:.6},{:.6}",
                    record.strategy,
                    record.threads,
                    record.seconds,
                    record.speedup,
                    record.efficiency * 100.0
                ),
            )?;
        }
        Ok(path)
    }

    /// Writes a workload-scaling CSV.
    pub fn save_workload_scaling(
        &self,
        name: &str,
        records: &[BenchmarkRecord],
    ) -> Result<PathBuf> {
        let path = self.path_for(name);
        let mut file = self.create(&path)?;
        self.line(
            &path,
            &mut file,
            "Strategy,Multiplier,Threads,Time_seconds,Speedup,Efficiency_percent",
        )?;
        for record in records {
            self.line(
                &path,
                &mut file,
                &format!(
                    "{},{},{},{:.6},{:.6},{:.6}",
                    record.strategy,
                    record.multiplier,
                    record.threads,
                    record.seconds,
                    record.speedup,
                    record.efficiency * 100.0
                ),
            )?;
        }
        Ok(path)
    }

    /// Writes a plain-text summary grouping records by strategy and naming
    /// each strategy's best pass by speedup.
    pub fn save_summary(
        &self,
        name: &str,
        ngram: usize,
        records: &[BenchmarkRecord],
    ) -> Result<PathBuf> {
        let path = self.path_for(name);
        let mut file = self.create(&path)?;
        self.line(&path, &mut file, "===============================================")?;
        self.line(&path, &mut file, &format!("SUMMARY REPORT - {ngram}-grams"))?;
        self.line(&path, &mut file, "===============================================")?;

        let mut strategies: Vec<Strategy> = Vec::new();
        for record in records {
            if !strategies.contains(&record.strategy) {
                strategies.push(record.strategy);
            }
        }

        for strategy in strategies {
            self.line(&path, &mut file, &format!("\n--- {strategy} ---"))?;
            let mut best: Option<&BenchmarkRecord> = None;
            for record in records.iter().filter(|r| r.strategy == strategy) {
                self.line(
                    &path,
                    &mut file,
                    &format!(
                        "  Threads: {:>2} | Multiplier: {:>2} | Time: {:.4}s | Speedup: {:.2} | Efficiency: {:.1}%",
                        record.threads,
                        record.multiplier,
                        record.seconds,
                        record.speedup,
                        record.efficiency * 100.0
                    ),
                )?;
                if best.map_or(true, |current| record.speedup > current.speedup) {
                    best = Some(record);
                }
            }
            if let Some(best) = best {
                self.line(
                    &path,
                    &mut file,
                    &format!(
                        "  Best: {} threads, multiplier {} (speedup {:.2}x)",
                        best.threads, best.multiplier, best.speedup
                    ),
                )?;
            }
        }
        Ok(path)
    }

    fn create(&self, path: &Path) -> Result<BufWriter<File>> {
        let file =
            File::create(path).map_err(|err| NhistError::io(err, Some(path.to_path_buf())))?;
        Ok(BufWriter::new(file))
    }

    fn line(&self, path: &Path, file: &mut BufWriter<File>, contents: &str) -> Result<()> {
        writeln!(file, "{contents}").map_err(|err| NhistError::io(err, Some(path.to_path_buf())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn records() -> Vec<BenchmarkRecord> {
        vec![
            BenchmarkRecord {
                strategy: Strategy::ChunkTls,
                threads: 1,
                multiplier: 1,
                seconds: 2.0,
                speedup: 1.0,
                efficiency: 1.0,
            },
            BenchmarkRecord {
                strategy: Strategy::ChunkTls,
                threads: 2,
                multiplier: 1,
                seconds: 1.0,
                speedup: 2.0,
                efficiency: 1.0,
            },
        ]
    }

    #[test]
    fn thread_scaling_csv_has_header_and_rows() {
        let dir = tempdir().expect("tempdir");
        let exporter = ResultsExporter::new(dir.path().join("results")).expect("exporter");
        let path = exporter
            .save_thread_scaling("scaling.csv", &records())
            .expect("save csv");
        let contents = std::fs::read_to_string(path).expect("read csv");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines[0],
            "Strategy,Threads,Time_seconds,Speedup,Efficiency_percent"
        );
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("chunk-tls,1,"));
    }

    #[test]
    fn summary_names_the_best_pass() {
        let dir = tempdir().expect("tempdir");
        let exporter = ResultsExporter::new(dir.path()).expect("exporter");
        let path = exporter
            .save_summary("summary.txt", 2, &records())
            .expect("save summary");
        let contents = std::fs::read_to_string(path).expect("read summary");
        assert!(contents.contains("SUMMARY REPORT - 2-grams"));
        assert!(contents.contains("--- chunk-tls ---"));
        assert!(contents.contains("Best: 2 threads, multiplier 1 (speedup 2.00x)"));
    }
}
