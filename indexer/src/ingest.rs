use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const DEFAULT_CONTENT_SELECTOR: &str = "div[itemprop='articleBody']";

/// Generated pages that are not documents of their own.
const GENERATED_PAGES: &[&str] = &["genindex", "search", "py-modindex"];

/// One document to index, read from a JSON record or extracted from a page.
#[derive(Debug, Deserialize)]
pub struct InputDoc {
    #[serde(alias = "id")]
    pub name: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub filename: Option<String>,
}

pub struct SourceReader {
    content: Selector,
    heading: Selector,
    title: Selector,
    body: Selector,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e:?}"))
}

impl SourceReader {
    pub fn new(content_selector: &str) -> Result<Self> {
        Ok(Self {
            content: selector(content_selector)?,
            heading: selector("h1")?,
            title: selector("title")?,
            body: selector("body")?,
        })
    }

    /// Read every document under `input` in a stable order: directories are
    /// walked sorted by file name, records keep their order within a file.
    pub fn read(&self, input: &str) -> Result<Vec<InputDoc>> {
        let root = Path::new(input);
        let mut docs = Vec::new();
        if root.is_dir() {
            for entry in WalkDir::new(root)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden_or_private(e.file_name().to_str()))
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() {
                    self.read_file(root, p, &mut docs)?;
                }
            }
        } else if root.is_file() {
            let base = root.parent().unwrap_or(Path::new(""));
            self.read_file(base, root, &mut docs)?;
        } else {
            return Err(anyhow!("input {input} does not exist"));
        }
        Ok(docs)
    }

    fn read_file(&self, root: &Path, file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
        match file.extension().and_then(|s| s.to_str()) {
            Some("jsonl") => read_jsonl(file, docs),
            Some("json") => read_json(file, docs),
            Some("html") | Some("htm") => {
                let name = doc_name(root, file);
                if GENERATED_PAGES.contains(&name.as_str()) {
                    tracing::debug!(file = %file.display(), "skipping generated page");
                    return Ok(());
                }
                let source = fs::read_to_string(file)?;
                let filename = file.strip_prefix(root).unwrap_or(file).to_string_lossy().replace('\\', "/");
                docs.push(self.page(name, filename, &source));
                Ok(())
            }
            _ => {
                tracing::debug!(file = %file.display(), "skipping unsupported input");
                Ok(())
            }
        }
    }

    /// Extract title and text from a rendered page. Text comes from the
    /// content container when present, otherwise from `<body>`.
    pub fn page(&self, name: String, filename: String, source: &str) -> InputDoc {
        let html = Html::parse_document(source);
        let content = html.select(&self.content).next();
        if content.is_none() {
            tracing::warn!(doc = %name, "content container missing, indexing <body>");
        }
        let scope = content.or_else(|| html.select(&self.body).next());

        let heading = scope
            .and_then(|el| el.select(&self.heading).next())
            .map(|h| text_of(h).replace('\u{b6}', "").trim().to_string())
            .filter(|t| !t.is_empty());
        let title = heading
            .or_else(|| html.select(&self.title).next().map(|t| text_of(t).trim().to_string()))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| name.clone());
        let body = scope.map(text_of).unwrap_or_default();

        InputDoc { name, title, body, filename: Some(filename) }
    }
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

fn is_hidden_or_private(name: Option<&str>) -> bool {
    name.map_or(false, |n| n.starts_with('.') || n.starts_with('_'))
}

/// Document identifier: path relative to the input root, extension dropped,
/// `/`-separated on every platform.
fn doc_name(root: &Path, file: &Path) -> String {
    let rel = file.strip_prefix(root).unwrap_or(file).with_extension("");
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn read_jsonl(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        docs.push(serde_json::from_str(&line)?);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let f = File::open(file)?;
    let reader = BufReader::new(f);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => docs.push(serde_json::from_value(json)?),
        _ => tracing::warn!(file = %file.display(), "ignoring JSON that is neither object nor array"),
    }
    Ok(())
}
