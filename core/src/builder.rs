use crate::error::{IndexError, Result};
use crate::index::{DocIx, IndexArtifact};
use crate::tokenizer::terms;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Accumulates documents in navigation order and produces an [`IndexArtifact`].
#[derive(Debug, Default)]
pub struct IndexBuilder {
    docnames: Vec<String>,
    filenames: Vec<String>,
    titles: Vec<String>,
    seen: HashSet<String>,
    terms: BTreeMap<String, BTreeSet<DocIx>>,
    titleterms: BTreeMap<String, BTreeSet<DocIx>>,
}

impl IndexBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.docnames.len() }

    pub fn is_empty(&self) -> bool { self.docnames.is_empty() }

    /// Register one document. Each term of `body` and `title` is recorded
    /// once for this document regardless of how often it occurs.
    pub fn add_document(&mut self, name: &str, title: &str, filename: &str, body: &str) -> Result<DocIx> {
        if !self.seen.insert(name.to_string()) {
            return Err(IndexError::DuplicateDocument(name.to_string()));
        }
        let doc_ix = self.docnames.len() as DocIx;
        self.docnames.push(name.to_string());
        self.filenames.push(filename.to_string());
        self.titles.push(title.to_string());

        let body_terms = terms(body);
        let num_terms = body_terms.len();
        for term in body_terms {
            self.terms.entry(term).or_default().insert(doc_ix);
        }
        for term in terms(title) {
            self.titleterms.entry(term).or_default().insert(doc_ix);
        }
        tracing::debug!(doc = name, doc_ix, num_terms, "indexed document");
        Ok(doc_ix)
    }

    pub fn build(self) -> IndexArtifact {
        let flatten = |table: BTreeMap<String, BTreeSet<DocIx>>| {
            table
                .into_iter()
                .map(|(term, docs)| (term, docs.into_iter().collect::<Vec<_>>()))
                .collect::<BTreeMap<_, _>>()
        };
        IndexArtifact {
            docnames: self.docnames,
            filenames: self.filenames,
            titles: self.titles,
            terms: flatten(self.terms),
            titleterms: flatten(self.titleterms),
            ..IndexArtifact::default()
        }
    }
}
