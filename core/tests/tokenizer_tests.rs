use docsearch_core::tokenizer::{normalize, tokenize};
use proptest::prelude::*;

#[test]
fn it_lowercases_and_strips_diacritics() {
    let toks = tokenize("Running RUNNERS! The café's menu.");
    let words: Vec<String> = toks.into_iter().map(|(w, _)| w).collect();
    assert!(words.contains(&"running".to_string()));
    assert!(words.contains(&"runners".to_string()));
    // Unicode normalization: café -> cafe
    assert!(words.contains(&"cafe".to_string()));
}

#[test]
fn it_keeps_every_word() {
    // No stopword removal and no stemming.
    assert_eq!(normalize("The quick brown fox and the lazy dog"), "the quick brown fox and the lazy dog");
    assert_eq!(normalize("abilities"), "abilities");
}

#[test]
fn it_splits_on_punctuation() {
    assert_eq!(normalize("IBM z/OS CICS: 16T10"), "ibm z os cics 16t10");
    assert_eq!(normalize("don't -- stop"), "don t stop");
}

#[test]
fn compatibility_forms_fold() {
    assert_eq!(normalize("ＣＩＣＳ ﬁle"), "cics file");
}

proptest! {
    #[test]
    fn normalize_is_idempotent(s in "[a-zA-Z0-9àéîõüÇÑßØ _.,:;/'()\\-]{0,64}") {
        let once = normalize(&s);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalized_text_tokenizes_to_itself(s in "[a-zA-Z0-9éÑ _./\\-]{0,48}") {
        let once = normalize(&s);
        let words: Vec<String> = tokenize(&once).into_iter().map(|(w, _)| w).collect();
        prop_assert_eq!(words.join(" "), once);
    }
}
