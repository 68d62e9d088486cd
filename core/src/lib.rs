pub mod builder;
pub mod error;
pub mod index;
pub mod persist;
pub mod search;
pub mod tokenizer;

pub use builder::IndexBuilder;
pub use error::{IndexError, Result};
pub use index::{DocIx, IndexArtifact, SchemaTag};
pub use search::{Hit, SearchIndex};
