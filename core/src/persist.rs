use crate::error::{IndexError, Result};
use crate::index::{check_envversion, IndexArtifact, SchemaTag};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::Path;

const SCRIPT_PREFIX: &str = "Search.setIndex(";
const SCRIPT_SUFFIX: &str = ")";

/// On-disk encoding of an index artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// Plain JSON.
    Json,
    /// JSON wrapped in `Search.setIndex(...)`, loadable with a `<script>` tag.
    Script,
    /// bincode, schema tag first.
    Bincode,
}

impl ArtifactFormat {
    /// `.json` and `.js` select the text encodings; anything else is bincode.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|s| s.to_str()) {
            Some("json") => ArtifactFormat::Json,
            Some("js") => ArtifactFormat::Script,
            _ => ArtifactFormat::Bincode,
        }
    }
}

pub fn encode(artifact: &IndexArtifact, format: ArtifactFormat) -> Result<Vec<u8>> {
    let bytes = match format {
        ArtifactFormat::Json => serde_json::to_vec(artifact)?,
        ArtifactFormat::Script => {
            let json = serde_json::to_string(artifact)?;
            format!("{SCRIPT_PREFIX}{json}{SCRIPT_SUFFIX}").into_bytes()
        }
        ArtifactFormat::Bincode => bincode::serialize(artifact)?,
    };
    Ok(bytes)
}

/// Decode and validate. The schema envelope is checked before the body is
/// interpreted, so a future format is reported as incompatible rather than
/// as a parse failure.
pub fn decode(bytes: &[u8], format: ArtifactFormat) -> Result<IndexArtifact> {
    let artifact = match format {
        ArtifactFormat::Bincode => {
            // Leading fields of `IndexArtifact`: schema tag, then envversion.
            let (tag, env): (SchemaTag, BTreeMap<String, u32>) = bincode::deserialize(bytes)?;
            tag.check()?;
            check_envversion(&env)?;
            bincode::deserialize::<IndexArtifact>(bytes)?
        }
        ArtifactFormat::Json => decode_json(bytes)?,
        ArtifactFormat::Script => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| IndexError::Malformed(format!("index script is not UTF-8: {e}")))?
                .trim();
            let json = text
                .strip_prefix(SCRIPT_PREFIX)
                .and_then(|rest| rest.trim_end_matches(';').strip_suffix(SCRIPT_SUFFIX))
                .ok_or_else(|| IndexError::Malformed(format!("expected {SCRIPT_PREFIX}...{SCRIPT_SUFFIX}")))?;
            decode_json(json.as_bytes())?
        }
    };
    artifact.validate()?;
    Ok(artifact)
}

fn decode_json(bytes: &[u8]) -> Result<IndexArtifact> {
    let value: Value = serde_json::from_slice(bytes)?;
    let schema = value
        .get("schema")
        .cloned()
        .ok_or_else(|| IndexError::IncompatibleSchema { found: "no schema tag".into(), supported: SchemaTag::current().name })?;
    let tag: SchemaTag = serde_json::from_value(schema)?;
    tag.check()?;
    let env: BTreeMap<String, u32> = match value.get("envversion") {
        Some(env) => serde_json::from_value(env.clone())?,
        None => BTreeMap::new(),
    };
    check_envversion(&env)?;
    Ok(serde_json::from_value(value)?)
}

pub fn save_index<P: AsRef<Path>>(path: P, artifact: &IndexArtifact) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir)?;
    }
    let bytes = encode(artifact, ArtifactFormat::from_path(path))?;
    let mut f = File::create(path)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_index<P: AsRef<Path>>(path: P) -> Result<IndexArtifact> {
    let path = path.as_ref();
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    decode(&buf, ArtifactFormat::from_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IndexBuilder;

    fn sample() -> IndexArtifact {
        let mut b = IndexBuilder::new();
        b.add_document("installation", "Installation", "installation.rst", "Install the CICS collection").unwrap();
        b.build()
    }

    #[test]
    fn script_wrapper_is_accepted() {
        let bytes = encode(&sample(), ArtifactFormat::Script).unwrap();
        assert!(bytes.starts_with(b"Search.setIndex({"));
        let back = decode(&bytes, ArtifactFormat::Script).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn future_bincode_schema_is_incompatible() {
        let mut a = sample();
        a.schema.version = 2;
        let bytes = bincode::serialize(&a).unwrap();
        let err = decode(&bytes, ArtifactFormat::Bincode).unwrap_err();
        assert!(matches!(err, IndexError::IncompatibleSchema { .. }));
    }

    #[test]
    fn newer_bincode_category_is_incompatible_before_body_decode() {
        let mut env = crate::index::supported_envversion();
        env.insert(crate::index::ENV_TERMS.to_string(), 2);
        // A body laid out differently from the current one.
        let future = (SchemaTag::current(), env, 7u8);
        let bytes = bincode::serialize(&future).unwrap();
        let err = decode(&bytes, ArtifactFormat::Bincode).unwrap_err();
        assert!(matches!(err, IndexError::IncompatibleSchema { .. }), "{err:?}");
    }

    #[test]
    fn json_without_schema_is_incompatible() {
        let err = decode(br#"{"docnames":[],"terms":{}}"#, ArtifactFormat::Json).unwrap_err();
        assert!(matches!(err, IndexError::IncompatibleSchema { .. }));
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ArtifactFormat::from_path("out/searchindex.js"), ArtifactFormat::Script);
        assert_eq!(ArtifactFormat::from_path("out/index.json"), ArtifactFormat::Json);
        assert_eq!(ArtifactFormat::from_path("out/index.bin"), ArtifactFormat::Bincode);
    }
}
