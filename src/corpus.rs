//! Facilities for discovering corpus files and loading token corpora.

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use walkdir::WalkDir;

use crate::config::IngestConfig;
use crate::error::{NhistError, Result};
use crate::tokenize::{tokenize, Token};

/// An ordered flat token sequence with document boundaries elided.
pub type FlatCorpus = Vec<Token>;

/// An ordered sequence of per-document token sequences.
pub type DocumentCorpus = Vec<Vec<Token>>;

/// Discovers corpus files rooted at the provided input paths.
///
/// Directories are traversed recursively by default; set
/// [`IngestConfig::recursive`] to `false` to limit discovery to the first
/// level. Directory entries are filtered by [`IngestConfig::extension`],
/// while explicitly named files always pass. The result is sorted so every
/// pass over the same corpus is deterministic regardless of directory
/// iteration order.
pub fn collect_paths<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = input.as_ref();
        if !path.exists() {
            return Err(NhistError::InvalidConfig(format!(
                "input path {path:?} does not exist"
            )));
        }
        let metadata = path
            .symlink_metadata()
            .map_err(|err| NhistError::io(err, Some(path.to_path_buf())))?;
        if metadata.is_dir() {
            let depth = if cfg.recursive { usize::MAX } else { 1 };
            let walker = WalkDir::new(path)
                .max_depth(depth)
                .follow_links(cfg.follow_symlinks);
            for entry in walker {
                let entry = entry.map_err(|err| NhistError::Internal(err.to_string()))?;
                if entry.file_type().is_file() && matches_extension(entry.path(), cfg) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else if metadata.is_file() {
            files.push(path.to_path_buf());
        }
    }
    if files.is_empty() {
        return Err(NhistError::InvalidConfig(
            "no files discovered in provided inputs".into(),
        ));
    }
    files.sort();
    Ok(files)
}

fn matches_extension(path: &Path, cfg: &IngestConfig) -> bool {
    match &cfg.extension {
        Some(extension) => path
            .extension()
            .is_some_and(|found| found.eq_ignore_ascii_case(extension.as_str())),
        None => true,
    }
}

/// Reads one corpus file's raw bytes.
pub fn read_text(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|err| NhistError::io(err, Some(path.to_path_buf())))
}

/// Loads a flat corpus: every file tokenized and concatenated in path order.
///
/// Boundaries between files are intentionally elided, so n-grams may span
/// what were separate documents. Use [`load_document_corpus`] when windows
/// must stay within one document.
pub fn load_flat_corpus<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<FlatCorpus> {
    let mut tokens = Vec::new();
    for path in collect_paths(inputs, cfg)? {
        tokens.extend(tokenize(&read_text(&path)?));
    }
    Ok(tokens)
}

/// Loads a document corpus: one token sequence per file, in path order.
/// Files that tokenize to nothing are skipped.
pub fn load_document_corpus<P: AsRef<Path>>(
    inputs: &[P],
    cfg: &IngestConfig,
) -> Result<DocumentCorpus> {
    let mut documents = Vec::new();
    for path in collect_paths(inputs, cfg)? {
        let words = tokenize(&read_text(&path)?);
        if !words.is_empty() {
            documents.push(words);
        }
    }
    Ok(documents)
}

/// Generates a deterministic synthetic flat corpus of `len` tokens drawn
/// uniformly from a vocabulary of `vocab` words.
#[must_use]
pub fn synthetic_flat(len: usize, vocab: usize, seed: u64) -> FlatCorpus {
    let mut rng = StdRng::seed_from_u64(seed);
    let vocab = vocab.max(1);
    (0..len)
        .map(|_| format!("w{}", rng.gen_range(0..vocab)))
        .collect()
}

/// Generates a deterministic synthetic document corpus of `docs` documents,
/// each `doc_len` tokens long.
#[must_use]
pub fn synthetic_documents(docs: usize, doc_len: usize, vocab: usize, seed: u64) -> DocumentCorpus {
    let mut rng = StdRng::seed_from_u64(seed);
    let vocab = vocab.max(1);
    (0..docs)
        .map(|_| {
            (0..doc_len)
                .map(|_| format!("w{}", rng.gen_range(0..vocab)))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn collect_paths_discovers_files_recursively_and_sorted() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).expect("create nested directory");
        let file_b = nested.join("b.txt");
        let file_a = dir.path().join("a.txt");
        fs::write(&file_b, "two").expect("write b");
        fs::write(&file_a, "one").expect("write a");

        let paths = collect_paths(&[dir.path()], &IngestConfig::default()).expect("collect paths");
        assert_eq!(paths, vec![file_a, file_b]);
    }

    #[test]
    fn extension_filter_skips_other_files() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("keep.txt"), "kept").expect("write keep");
        fs::write(dir.path().join("skip.csv"), "skipped").expect("write skip");

        let paths = collect_paths(&[dir.path()], &IngestConfig::default()).expect("collect paths");
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("keep.txt"));
    }

    #[test]
    fn empty_directory_is_an_ingest_error() {
        let dir = tempdir().expect("tempdir");
        let err = collect_paths(&[dir.path()], &IngestConfig::default())
            .expect_err("discovery should fail");
        assert!(matches!(err, NhistError::InvalidConfig(_)));
    }

    #[test]
    fn flat_corpus_elides_document_boundaries() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("0.txt"), "a b").expect("write 0");
        fs::write(dir.path().join("1.txt"), "c d").expect("write 1");

        let flat = load_flat_corpus(&[dir.path()], &IngestConfig::default()).expect("load flat");
        assert_eq!(flat, vec!["a", "b", "c", "d"]);

        let documents =
            load_document_corpus(&[dir.path()], &IngestConfig::default()).expect("load documents");
        assert_eq!(documents, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn synthetic_corpora_are_seed_deterministic() {
        assert_eq!(synthetic_flat(32, 8, 7), synthetic_flat(32, 8, 7));
        assert_ne!(synthetic_flat(32, 8, 7), synthetic_flat(32, 8, 8));
        assert_eq!(
            synthetic_documents(4, 16, 8, 7),
            synthetic_documents(4, 16, 8, 7)
        );
    }
}
