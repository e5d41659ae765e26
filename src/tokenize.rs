//! Text normalization and whitespace tokenization.
//!
//! Corpus text is normalized before counting: ASCII letters are lowercased
//! and ASCII punctuation or control bytes become spaces, after which tokens
//! are the maximal whitespace-delimited runs. Bytes outside the ASCII range
//! pass through untouched so multi-byte sequences survive intact.

use bstr::ByteSlice;

/// A normalized, whitespace-delimited word. Immutable once produced.
pub type Token = String;

/// Normalizes raw text bytes and splits them into tokens.
#[must_use]
pub fn tokenize(text: &[u8]) -> Vec<Token> {
    let normalized: Vec<u8> = text.iter().map(|&byte| normalize_byte(byte)).collect();
    normalized
        .fields()
        .map(|word| word.to_str_lossy().into_owned())
        .collect()
}

fn normalize_byte(byte: u8) -> u8 {
    if byte.is_ascii_alphanumeric() {
        byte.to_ascii_lowercase()
    } else if byte.is_ascii() {
        b' '
    } else {
        byte
    }
}
