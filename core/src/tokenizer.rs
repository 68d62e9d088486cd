use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[\p{L}\p{N}_]+").expect("valid regex");
}

/// Upper bound on folding passes; real text settles after one or two.
const MAX_FOLD_PASSES: usize = 4;

fn fold_once(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Compatibility-decompose, drop diacritics and lowercase, repeated until the
/// text stops changing so that folding folded text is a no-op.
fn fold(text: &str) -> String {
    if text.is_ascii() {
        return text.to_ascii_lowercase();
    }
    let mut current = fold_once(text);
    for _ in 1..MAX_FOLD_PASSES {
        let next = fold_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Tokenize text into (term, position). Terms are maximal runs of letters,
/// digits and underscores after folding; everything else separates words.
///
/// The indexer and the query path both go through this function, which is
/// what keeps stored keys and query terms comparable.
pub fn tokenize(text: &str) -> Vec<(String, usize)> {
    let folded = fold(text);
    WORD.find_iter(&folded)
        .enumerate()
        .map(|(pos, m)| (m.as_str().to_string(), pos))
        .collect()
}

/// Distinct terms of `text`.
pub fn terms(text: &str) -> BTreeSet<String> {
    tokenize(text).into_iter().map(|(t, _)| t).collect()
}

/// Canonical string form: the normalized terms joined by single spaces.
pub fn normalize(text: &str) -> String {
    let words: Vec<String> = tokenize(text).into_iter().map(|(t, _)| t).collect();
    words.join(" ")
}
