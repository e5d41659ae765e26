//! I/O-coupled counting strategies over corpus file lists.
//!
//! The three variants differ only in how file reads interleave with
//! counting; the counting itself is the same per-document scan the
//! in-memory strategies use, and the per-worker partials merge identically.
//! A multiplier repeats the file list, so each copy is an independent run
//! and counts scale exactly.

use std::path::PathBuf;

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::corpus::read_text;
use crate::counter::count_seq_into;
use crate::error::Result;
use crate::ngram::{merge_partials, Histogram};
use crate::tokenize::tokenize;

fn count_text_into(hist: &mut Histogram, text: &[u8], n: usize) {
    let tokens = tokenize(text);
    count_seq_into(hist, &tokens, n);
}

fn replicated(paths: &[PathBuf], multiplier: usize) -> Vec<&PathBuf> {
    (0..multiplier).flat_map(|_| paths.iter()).collect()
}

/// One designated reader loads every file into memory; all workers then
/// dynamically claim buffered texts for counting.
pub(crate) fn single_reader(
    pool: &ThreadPool,
    paths: &[PathBuf],
    n: usize,
    multiplier: usize,
) -> Result<Histogram> {
    let runs = replicated(paths, multiplier);
    let mut texts = Vec::with_capacity(runs.len());
    for path in runs {
        texts.push(read_text(path)?);
    }
    let partials = pool.install(|| {
        texts
            .par_iter()
            .with_min_len(1)
            .fold(Histogram::default, |mut local, text| {
                count_text_into(&mut local, text, n);
                local
            })
            .collect::<Vec<_>>()
    });
    Ok(merge_partials(partials))
}

/// Every worker reads and counts its own dynamically claimed files,
/// overlapping I/O and compute across workers.
pub(crate) fn on_the_fly(
    pool: &ThreadPool,
    paths: &[PathBuf],
    n: usize,
    multiplier: usize,
) -> Result<Histogram> {
    let runs = replicated(paths, multiplier);
    let partials = pool.install(|| {
        runs.par_iter()
            .with_min_len(1)
            .try_fold(Histogram::default, |mut local, path| -> Result<Histogram> {
                let text = read_text(path)?;
                count_text_into(&mut local, &text, n);
                Ok(local)
            })
            .collect::<Result<Vec<_>>>()
    })?;
    Ok(merge_partials(partials))
}

/// Workers dynamically claim files into a private buffer first (parallel
/// I/O phase), then count everything in their own buffer without further
/// synchronization (parallel compute phase).
pub(crate) fn hybrid_preload(
    pool: &ThreadPool,
    paths: &[PathBuf],
    n: usize,
    multiplier: usize,
) -> Result<Histogram> {
    let runs = replicated(paths, multiplier);
    let partials = pool.install(|| {
        runs.par_iter()
            .with_min_len(1)
            .try_fold(Vec::new, |mut buffered, path| -> Result<Vec<Vec<u8>>> {
                buffered.push(read_text(path)?);
                Ok(buffered)
            })
            .map(|buffered| -> Result<Histogram> {
                let texts = buffered?;
                let mut local = Histogram::default();
                for text in &texts {
                    count_text_into(&mut local, text, n);
                }
                Ok(local)
            })
            .collect::<Result<Vec<_>>>()
    })?;
    Ok(merge_partials(partials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::ThreadPoolBuilder;
    use std::fs;
    use tempfile::tempdir;

    fn pool(threads: usize) -> ThreadPool {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .expect("pool")
    }

    fn corpus_files(texts: &[&str]) -> (tempfile::TempDir, Vec<PathBuf>) {
        let dir = tempdir().expect("tempdir");
        let mut paths = Vec::new();
        for (index, text) in texts.iter().enumerate() {
            let path = dir.path().join(format!("{index}.txt"));
            fs::write(&path, text).expect("write corpus file");
            paths.push(path);
        }
        (dir, paths)
    }

    #[test]
    fn variants_agree_on_the_same_files() {
        let (_dir, paths) = corpus_files(&["the cat sat", "the cat ran", "a dog sat"]);
        let pool = pool(3);
        let reference = single_reader(&pool, &paths, 2, 1).expect("single reader");
        assert_eq!(reference.get("the cat"), Some(&2));
        assert_eq!(
            on_the_fly(&pool, &paths, 2, 1).expect("on the fly"),
            reference
        );
        assert_eq!(
            hybrid_preload(&pool, &paths, 2, 1).expect("hybrid preload"),
            reference
        );
    }

    #[test]
    fn missing_file_surfaces_an_io_error() {
        let (_dir, mut paths) = corpus_files(&["the cat sat"]);
        paths.push(PathBuf::from("/nonexistent/corpus/file.txt"));
        let pool = pool(2);
        assert!(on_the_fly(&pool, &paths, 2, 1).is_err());
        assert!(hybrid_preload(&pool, &paths, 2, 1).is_err());
        assert!(single_reader(&pool, &paths, 2, 1).is_err());
    }

    #[test]
    fn multiplier_repeats_the_file_set() {
        let (_dir, paths) = corpus_files(&["a b a"]);
        let pool = pool(2);
        let once = single_reader(&pool, &paths, 2, 1).expect("single pass");
        let thrice = single_reader(&pool, &paths, 2, 3).expect("triple pass");
        assert_eq!(thrice.len(), once.len());
        for (key, count) in &once {
            assert_eq!(thrice.get(key), Some(&(count * 3)));
        }
    }
}
