use docsearch_core::persist::{load_index, save_index};
use docsearch_core::{IndexBuilder, IndexError, SearchIndex};
use proptest::prelude::*;
use tempfile::tempdir;

fn scenario() -> SearchIndex {
    let mut b = IndexBuilder::new();
    b.add_document("installation", "Installation", "installation.rst", "Install CICS with Python").unwrap();
    b.add_document("modules/cics_cmci", "cics_cmci", "modules/cics_cmci.rst", "CICS resources").unwrap();
    SearchIndex::from_artifact(b.build()).unwrap()
}

#[test]
fn scenario_queries() {
    let idx = scenario();
    assert_eq!(idx.lookup("cics").into_iter().collect::<Vec<_>>(), vec!["installation", "modules/cics_cmci"]);
    assert_eq!(idx.lookup("python").into_iter().collect::<Vec<_>>(), vec!["installation"]);

    assert_eq!(idx.search("cics python"), vec!["installation"]);
    assert_eq!(idx.search("cics"), vec!["installation", "modules/cics_cmci"]);
    assert!(idx.search("golang").is_empty());
}

#[test]
fn query_is_normalized_like_the_index() {
    let idx = scenario();
    assert_eq!(idx.search("CICS, Python!"), vec!["installation"]);
    assert_eq!(idx.search("cics cics"), vec!["installation", "modules/cics_cmci"]);
}

#[test]
fn missing_terms_are_empty_not_errors() {
    let idx = scenario();
    assert!(idx.lookup("nonexistent-term-xyz").is_empty());
    assert!(idx.search("nonexistent-term-xyz").is_empty());
    assert!(idx.search("cics nonexistent").is_empty());
}

#[test]
fn hits_carry_titles() {
    let idx = scenario();
    let hits = idx.hits("python");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].doc, "installation");
    assert_eq!(hits[0].title, "Installation");
    assert_eq!(hits[0].matched_terms, 1);
}

#[test]
fn every_referenced_document_has_a_title() {
    let idx = scenario();
    for postings in idx.artifact().terms.values() {
        for ix in postings {
            let name = &idx.docnames()[*ix as usize];
            assert!(idx.title_of(name).is_ok());
        }
    }
}

#[test]
fn artifact_survives_disk_in_every_format() {
    let dir = tempdir().unwrap();
    let original = scenario().artifact().clone();
    for file in ["searchindex.js", "searchindex.json", "searchindex.bin"] {
        let path = dir.path().join(file);
        save_index(&path, &original).unwrap();
        let idx = SearchIndex::open(&path).unwrap();
        assert_eq!(idx.search("cics python"), vec!["installation"], "{file}");
    }
}

#[test]
fn incompatible_schema_is_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("searchindex.json");
    let mut artifact = scenario().artifact().clone();
    artifact.envversion.insert("docsearch.terms".into(), 9);
    save_index(&path, &artifact).unwrap();
    assert!(matches!(load_index(&path), Err(IndexError::IncompatibleSchema { .. })));
    assert!(matches!(SearchIndex::open(&path), Err(IndexError::IncompatibleSchema { .. })));
}

const VOCAB: &[&str] = &["cics", "cmci", "zos", "ansible", "python", "csd", "region", "playbook"];

fn corpus() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0..VOCAB.len(), 1..6), 1..8)
}

fn build(docs: &[Vec<usize>]) -> SearchIndex {
    let mut b = IndexBuilder::new();
    for (i, words) in docs.iter().enumerate() {
        let body: Vec<&str> = words.iter().map(|w| VOCAB[*w]).collect();
        let name = format!("doc{i:02}");
        b.add_document(&name, &name, &format!("{name}.rst"), &body.join(" ")).unwrap();
    }
    SearchIndex::from_artifact(b.build()).unwrap()
}

proptest! {
    #[test]
    fn multi_term_results_are_subsets(docs in corpus(), a in 0..VOCAB.len(), b in 0..VOCAB.len()) {
        let idx = build(&docs);
        let query = format!("{} {}", VOCAB[a], VOCAB[b]);
        let results = idx.search(&query);
        for term in [VOCAB[a], VOCAB[b]] {
            let single = idx.lookup(term);
            for doc in &results {
                prop_assert!(single.contains(doc));
            }
        }
    }

    #[test]
    fn results_are_sorted_by_identifier(docs in corpus(), a in 0..VOCAB.len()) {
        let idx = build(&docs);
        let results = idx.search(VOCAB[a]);
        let mut sorted = results.clone();
        sorted.sort();
        prop_assert_eq!(results, sorted);
    }

    #[test]
    fn postings_reference_known_documents(docs in corpus()) {
        let idx = build(&docs);
        prop_assert!(idx.artifact().validate().is_ok());
        for postings in idx.artifact().terms.values() {
            for ix in postings {
                prop_assert!(idx.title_of(&idx.docnames()[*ix as usize]).is_ok());
            }
        }
    }
}
