//! N-gram keys, histograms, and the partial-histogram reducer.

use rustc_hash::FxHashMap;

use crate::tokenize::Token;

/// Frequency histogram mapping a space-joined n-gram key to its occurrence
/// count. Keys are unique; iteration order is unspecified.
pub type Histogram = FxHashMap<String, u64>;

/// Number of valid n-gram windows in a sequence of `len` tokens.
#[must_use]
pub fn window_count(len: usize, n: usize) -> usize {
    if len < n {
        0
    } else {
        len - n + 1
    }
}

/// Writes the space-joined key for the window starting at `start` into `buf`.
///
/// The caller guarantees `n >= 1` and `start + n <= tokens.len()`. The buffer
/// is cleared first so one scratch `String` can serve an entire hot loop
/// without reallocating.
pub fn write_key(buf: &mut String, tokens: &[Token], start: usize, n: usize) {
    buf.clear();
    buf.push_str(&tokens[start]);
    for token in &tokens[start + 1..start + n] {
        buf.push(' ');
        buf.push_str(token);
    }
}

/// Increments `key` in `hist`, cloning the key string only on first sight.
pub fn bump(hist: &mut Histogram, key: &str) {
    if let Some(count) = hist.get_mut(key) {
        *count += 1;
    } else {
        hist.insert(key.to_owned(), 1);
    }
}

/// Adds `amount` occurrences of `key`, taking ownership of the key string.
pub fn add(hist: &mut Histogram, key: String, amount: u64) {
    *hist.entry(key).or_insert(0) += amount;
}

/// Folds a set of partial histograms into one.
///
/// The largest partial is adopted as the destination and the summed size of
/// the rest is reserved up front, so the merge never rehashes mid-fold. The
/// operation is commutative and associative; callers must not rely on merge
/// order.
#[must_use]
pub fn merge_partials(mut partials: Vec<Histogram>) -> Histogram {
    let Some(largest) = partials
        .iter()
        .enumerate()
        .max_by_key(|(_, partial)| partial.len())
        .map(|(index, _)| index)
    else {
        return Histogram::default();
    };
    let mut merged = partials.swap_remove(largest);
    let extra: usize = partials.iter().map(FxHashMap::len).sum();
    merged.reserve(extra);
    for partial in partials {
        for (key, count) in partial {
            add(&mut merged, key, count);
        }
    }
    merged
}

/// Sum of all occurrence counts in the histogram.
#[must_use]
pub fn total_occurrences(hist: &Histogram) -> u64 {
    hist.values().sum()
}

/// The `k` most frequent n-grams, most frequent first, ties broken by key.
#[must_use]
pub fn top_k(hist: &Histogram, k: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = hist
        .iter()
        .map(|(key, &count)| (key.clone(), count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(k);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<Token> {
        words.iter().map(|word| (*word).to_owned()).collect()
    }

    #[test]
    fn window_count_handles_short_sequences() {
        assert_eq!(window_count(0, 2), 0);
        assert_eq!(window_count(1, 2), 0);
        assert_eq!(window_count(2, 2), 1);
        assert_eq!(window_count(5, 2), 4);
        assert_eq!(window_count(5, 1), 5);
    }

    #[test]
    fn write_key_joins_with_single_spaces() {
        let words = tokens(&["a", "b", "c", "d"]);
        let mut buf = String::from("stale contents");
        write_key(&mut buf, &words, 1, 3);
        assert_eq!(buf, "b c d");
    }

    #[test]
    fn write_key_is_idempotent() {
        let words = tokens(&["x", "y", "z"]);
        let mut first = String::new();
        let mut second = String::new();
        write_key(&mut first, &words, 0, 2);
        write_key(&mut second, &words, 0, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn bump_counts_repeated_keys() {
        let mut hist = Histogram::default();
        bump(&mut hist, "a b");
        bump(&mut hist, "a b");
        bump(&mut hist, "b a");
        assert_eq!(hist.get("a b"), Some(&2));
        assert_eq!(hist.get("b a"), Some(&1));
    }

    #[test]
    fn merge_sums_counts_across_partials() {
        let mut left = Histogram::default();
        add(&mut left, "a b".into(), 2);
        add(&mut left, "b c".into(), 1);
        let mut right = Histogram::default();
        add(&mut right, "a b".into(), 3);
        let merged = merge_partials(vec![left, right]);
        assert_eq!(merged.get("a b"), Some(&5));
        assert_eq!(merged.get("b c"), Some(&1));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        assert!(merge_partials(Vec::new()).is_empty());
    }

    #[test]
    fn top_k_orders_by_count_then_key() {
        let mut hist = Histogram::default();
        add(&mut hist, "b".into(), 3);
        add(&mut hist, "a".into(), 3);
        add(&mut hist, "c".into(), 7);
        let top = top_k(&hist, 2);
        assert_eq!(top, vec![("c".into(), 7), ("a".into(), 3)]);
    }
}
