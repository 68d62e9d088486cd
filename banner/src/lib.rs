//! Pre-release warning banner for rendered documentation pages.
//!
//! The banner is an admonition prepended to the page's main content
//! container. Callers decide when to run [`inject`]; it runs once per call
//! and is not idempotent.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};
use thiserror::Error;

pub const DEFAULT_STABLE_URL: &str = "https://ibm.github.io/z_ansible_collections_doc/";
pub const DEFAULT_CONTAINER_SELECTOR: &str = "div[itemprop='articleBody']";
pub const DEFAULT_COLLECTION: &str = "IBM Z CICS Collection";

lazy_static! {
    static ref VERSION_RE: Regex = Regex::new(r#"\bVERSION\s*:\s*(?:'([^']*)'|"([^"]*)")"#).expect("valid regex");
}

#[derive(Debug, Error)]
pub enum BannerError {
    #[error("invalid container selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Everything the banner needs, passed explicitly by the caller.
#[derive(Debug, Clone)]
pub struct BannerConfig {
    pub version: String,
    pub collection: String,
    pub stable_url: String,
    container: Selector,
}

impl BannerConfig {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            collection: DEFAULT_COLLECTION.to_string(),
            stable_url: DEFAULT_STABLE_URL.to_string(),
            container: Selector::parse(DEFAULT_CONTAINER_SELECTOR).expect("valid selector"),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_stable_url(mut self, url: impl Into<String>) -> Self {
        self.stable_url = url.into();
        self
    }

    pub fn with_container(mut self, css: &str) -> Result<Self, BannerError> {
        self.container = Selector::parse(css).map_err(|e| BannerError::InvalidSelector {
            selector: css.to_string(),
            reason: format!("{e:?}"),
        })?;
        Ok(self)
    }

    /// Markup of the admonition. Version and collection name are escaped so
    /// they show up verbatim in the rendered text.
    pub fn render(&self) -> String {
        format!(
            "<div class=\"admonition warning\">\
             <p class=\"admonition-title\">Warning</p>\
             <p>This is the documentation for pre-release version {} of the {}.</p>\
             <p>Alternatively, see the <a href=\"{}\">latest stable version documentation</a>.</p>\
             </div>",
            escape(&self.version),
            escape(&self.collection),
            escape(&self.stable_url),
        )
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injection {
    Inserted,
    /// No content container on the page; the page was left untouched.
    Skipped,
}

/// Prepend the banner to the first element matching the container selector.
pub fn inject(page: &mut Html, config: &BannerConfig) -> Injection {
    let Some(container) = page.select(&config.container).next().map(|el| el.id()) else {
        tracing::debug!("content container not found, banner skipped");
        return Injection::Skipped;
    };

    // Copy the parsed fragment into the page tree node by node.
    let fragment = Html::parse_fragment(&config.render());
    let mut pending = Vec::new();
    for top in fragment.root_element().children().rev() {
        let Some(mut parent) = page.tree.get_mut(container) else { return Injection::Skipped };
        let id = parent.prepend(top.value().clone()).id();
        pending.push((top.id(), id));
    }
    while let Some((from, to)) = pending.pop() {
        let Some(node) = fragment.tree.get(from) else { continue };
        for child in node.children() {
            if let Some(mut parent) = page.tree.get_mut(to) {
                let id = parent.append(child.value().clone()).id();
                pending.push((child.id(), id));
            }
        }
    }
    Injection::Inserted
}

/// [`inject`] on a serialized page. A skipped page is returned unchanged.
pub fn inject_html(source: &str, config: &BannerConfig) -> (String, Injection) {
    let mut page = Html::parse_document(source);
    match inject(&mut page, config) {
        Injection::Inserted => (page.html(), Injection::Inserted),
        Injection::Skipped => (source.to_string(), Injection::Skipped),
    }
}

/// Version published by the page template's options script
/// (`VERSION: '1.1.0'`).
pub fn discover_version(script: &str) -> Option<String> {
    let caps = VERSION_RE.captures(script)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_interpolates_version() {
        let html = BannerConfig::new("2.5.0-beta").render();
        assert!(html.starts_with("<div class=\"admonition warning\">"));
        assert!(html.contains("pre-release version 2.5.0-beta of the IBM Z CICS Collection."));
        assert!(html.contains("href=\"https://ibm.github.io/z_ansible_collections_doc/\""));
    }

    #[test]
    fn render_escapes_markup() {
        let html = BannerConfig::new("<b>1.0</b>").render();
        assert!(html.contains("&lt;b&gt;1.0&lt;/b&gt;"));
    }

    #[test]
    fn discovers_sphinx_version() {
        let script = "var DOCUMENTATION_OPTIONS = {\n    URL_ROOT: document.getElementById(\"documentation_options\").getAttribute('data-url_root'),\n    VERSION: '1.1.0-beta.4',\n    LANGUAGE: 'None',\n};";
        assert_eq!(discover_version(script).as_deref(), Some("1.1.0-beta.4"));
        assert_eq!(discover_version("{ VERSION: \"2.0\" }").as_deref(), Some("2.0"));
        assert_eq!(discover_version("var x = 1;"), None);
    }

    #[test]
    fn invalid_selector_is_rejected() {
        assert!(matches!(BannerConfig::new("1").with_container("div["), Err(BannerError::InvalidSelector { .. })));
    }
}
