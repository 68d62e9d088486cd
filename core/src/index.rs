use crate::error::{IndexError, Result};
use crate::tokenizer::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Position of a document in `docnames`.
pub type DocIx = u32;

pub const SCHEMA_NAME: &str = "docsearch";
pub const SCHEMA_VERSION: u32 = 1;

pub const ENV_DOCS: &str = "docsearch.docs";
pub const ENV_TERMS: &str = "docsearch.terms";
pub const ENV_TITLETERMS: &str = "docsearch.titleterms";

/// Content categories this build reads, with the newest version it understands.
pub fn supported_envversion() -> BTreeMap<String, u32> {
    [(ENV_DOCS, 1), (ENV_TERMS, 1), (ENV_TITLETERMS, 1)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaTag {
    pub name: String,
    pub version: u32,
}

impl SchemaTag {
    pub fn current() -> Self {
        Self { name: SCHEMA_NAME.to_string(), version: SCHEMA_VERSION }
    }

    pub fn check(&self) -> Result<()> {
        if self.name != SCHEMA_NAME || self.version != SCHEMA_VERSION {
            return Err(IndexError::IncompatibleSchema {
                found: format!("{}/{}", self.name, self.version),
                supported: format!("{SCHEMA_NAME}/{SCHEMA_VERSION}"),
            });
        }
        Ok(())
    }
}

/// Check the per-category versions. Missing or newer categories are rejected;
/// categories this build does not know about are ignored.
pub fn check_envversion(envversion: &BTreeMap<String, u32>) -> Result<()> {
    for (category, supported) in supported_envversion() {
        match envversion.get(&category) {
            Some(found) if *found <= supported => {}
            found => {
                return Err(IndexError::IncompatibleSchema {
                    found: match found {
                        Some(v) => format!("{category}={v}"),
                        None => format!("{category} missing"),
                    },
                    supported: format!("{category}={supported}"),
                })
            }
        }
    }
    Ok(())
}

/// The single serialized artifact shipped with a documentation build.
///
/// `docnames`, `filenames` and `titles` are parallel vectors in navigation
/// order. Postings in `terms` and `titleterms` hold indices into them,
/// sorted ascending without duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexArtifact {
    pub schema: SchemaTag,
    pub envversion: BTreeMap<String, u32>,
    pub docnames: Vec<String>,
    pub filenames: Vec<String>,
    pub titles: Vec<String>,
    pub terms: BTreeMap<String, Vec<DocIx>>,
    pub titleterms: BTreeMap<String, Vec<DocIx>>,
}

impl Default for IndexArtifact {
    fn default() -> Self {
        Self {
            schema: SchemaTag::current(),
            envversion: supported_envversion(),
            docnames: Vec::new(),
            filenames: Vec::new(),
            titles: Vec::new(),
            terms: BTreeMap::new(),
            titleterms: BTreeMap::new(),
        }
    }
}

impl IndexArtifact {
    pub fn new() -> Self { Self::default() }

    pub fn num_docs(&self) -> usize { self.docnames.len() }

    /// Full load-time validation: schema envelope first, then the
    /// structural invariants the query side relies on.
    pub fn validate(&self) -> Result<()> {
        self.schema.check()?;
        check_envversion(&self.envversion)?;
        self.check_integrity()
    }

    fn check_integrity(&self) -> Result<()> {
        let n = self.docnames.len();
        if self.titles.len() != n {
            return Err(IndexError::Malformed(format!("{} titles for {n} documents", self.titles.len())));
        }
        if self.filenames.len() != n {
            return Err(IndexError::Malformed(format!("{} filenames for {n} documents", self.filenames.len())));
        }
        let mut names: Vec<&str> = self.docnames.iter().map(String::as_str).collect();
        names.sort_unstable();
        if let Some(w) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(IndexError::Malformed(format!("document {} listed twice", w[0])));
        }
        for (kind, table) in [("terms", &self.terms), ("titleterms", &self.titleterms)] {
            for (term, postings) in table {
                // Keys must be single terms in query-time form, or lookups miss silently.
                if term.is_empty() || term.contains(' ') || normalize(term) != *term {
                    return Err(IndexError::Malformed(format!("{kind} key {term:?} is not a normalized term")));
                }
                if postings.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(IndexError::Malformed(format!("{kind}[{term:?}] postings not strictly ascending")));
                }
                if let Some(ix) = postings.iter().find(|ix| **ix as usize >= n) {
                    return Err(IndexError::Malformed(format!("{kind}[{term:?}] references document #{ix} of {n}")));
                }
            }
        }
        Ok(())
    }
}
