use crate::error::{IndexError, Result};
use crate::index::{DocIx, IndexArtifact};
use crate::persist::load_index;
use crate::tokenizer::terms;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;
use std::path::Path;

/// A matching document with its display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hit<'a> {
    pub doc: &'a str,
    pub title: &'a str,
    pub matched_terms: usize,
}

/// Read-only query surface over a validated artifact. Never mutated after
/// construction, so it can be shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct SearchIndex {
    artifact: IndexArtifact,
    positions: HashMap<String, DocIx>,
}

impl SearchIndex {
    pub fn from_artifact(artifact: IndexArtifact) -> Result<Self> {
        artifact.validate()?;
        let positions = artifact
            .docnames
            .iter()
            .enumerate()
            .map(|(ix, name)| (name.clone(), ix as DocIx))
            .collect();
        Ok(Self { artifact, positions })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let artifact = load_index(path)?;
        let index = Self::from_artifact(artifact)?;
        tracing::info!(num_docs = index.len(), num_terms = index.term_count(), "search index loaded");
        Ok(index)
    }

    pub fn artifact(&self) -> &IndexArtifact { &self.artifact }

    pub fn docnames(&self) -> &[String] { &self.artifact.docnames }

    pub fn len(&self) -> usize { self.artifact.docnames.len() }

    pub fn is_empty(&self) -> bool { self.artifact.docnames.is_empty() }

    pub fn term_count(&self) -> usize { self.artifact.terms.len() }

    fn name(&self, ix: DocIx) -> &str { &self.artifact.docnames[ix as usize] }

    fn resolve<'a>(&'a self, table: &'a BTreeMap<String, Vec<DocIx>>, term: &str) -> BTreeSet<&'a str> {
        table
            .get(term)
            .map(|postings| postings.iter().map(|ix| self.name(*ix)).collect())
            .unwrap_or_default()
    }

    /// Documents containing `term`, which must already be normalized.
    /// An absent term yields an empty set.
    pub fn lookup(&self, term: &str) -> BTreeSet<&str> {
        self.resolve(&self.artifact.terms, term)
    }

    /// Documents whose title contains `term`.
    pub fn lookup_title(&self, term: &str) -> BTreeSet<&str> {
        self.resolve(&self.artifact.titleterms, term)
    }

    pub fn title_of(&self, doc: &str) -> Result<&str> {
        self.positions
            .get(doc)
            .map(|ix| self.artifact.titles[*ix as usize].as_str())
            .ok_or_else(|| IndexError::UnknownDocument(doc.to_string()))
    }

    /// Indexed terms starting with `prefix`, in lexicographic order.
    pub fn prefix(&self, prefix: &str, limit: usize) -> Vec<&str> {
        self.artifact
            .terms
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(term, _)| term.starts_with(prefix))
            .take(limit)
            .map(|(term, _)| term.as_str())
            .collect()
    }

    /// AND query: documents containing every distinct term of `query`,
    /// ordered by matched-term count (descending) then identifier.
    pub fn search(&self, query: &str) -> Vec<&str> {
        self.matches(query).into_iter().map(|(ix, _)| self.name(ix)).collect()
    }

    /// [`search`](Self::search) with titles attached.
    pub fn hits(&self, query: &str) -> Vec<Hit<'_>> {
        self.matches(query)
            .into_iter()
            .map(|(ix, matched_terms)| Hit {
                doc: self.name(ix),
                title: &self.artifact.titles[ix as usize],
                matched_terms,
            })
            .collect()
    }

    fn matches(&self, query: &str) -> Vec<(DocIx, usize)> {
        let wanted = terms(query);
        if wanted.is_empty() {
            return Vec::new();
        }
        let mut counts: HashMap<DocIx, usize> = HashMap::new();
        for term in &wanted {
            // One missing term empties the intersection.
            let Some(postings) = self.artifact.terms.get(term) else { return Vec::new() };
            for ix in postings {
                *counts.entry(*ix).or_insert(0) += 1;
            }
        }
        let mut found: Vec<(DocIx, usize)> = counts.into_iter().filter(|(_, n)| *n == wanted.len()).collect();
        found.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| self.name(a.0).cmp(self.name(b.0))));
        tracing::debug!(query, terms = wanted.len(), hits = found.len(), "search");
        found
    }
}
