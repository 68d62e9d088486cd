use anyhow::{anyhow, Result};
use clap::Parser;
use docsearch_banner::{discover_version, inject_html, BannerConfig, Injection};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "banner")]
#[command(about = "Insert a pre-release warning into built documentation pages")]
struct Cli {
    /// Root of the built HTML site
    #[arg(long)]
    site: String,
    /// Version shown in the banner; read from the options script when omitted
    #[arg(long)]
    doc_version: Option<String>,
    /// Options script, relative to the site root, that publishes VERSION
    #[arg(long, default_value = "_static/documentation_options.js")]
    options_script: String,
    /// Link target for the stable documentation
    #[arg(long, default_value = docsearch_banner::DEFAULT_STABLE_URL)]
    stable_url: String,
    /// Collection name shown in the banner
    #[arg(long, default_value = docsearch_banner::DEFAULT_COLLECTION)]
    collection: String,
    /// CSS selector of the main content container
    #[arg(long, default_value = docsearch_banner::DEFAULT_CONTAINER_SELECTOR)]
    selector: String,
    /// Report what would change without writing pages
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();
    let site = PathBuf::from(&args.site);

    let version = match args.doc_version.clone() {
        Some(v) => v,
        None => {
            let script_path = site.join(&args.options_script);
            let script = fs::read_to_string(&script_path)?;
            discover_version(&script).ok_or_else(|| anyhow!("no VERSION found in {}", script_path.display()))?
        }
    };
    let config = BannerConfig::new(version)
        .with_collection(args.collection.clone())
        .with_stable_url(args.stable_url.clone())
        .with_container(&args.selector)?;

    let (inserted, skipped) = apply(&site, &config, args.dry_run)?;
    tracing::info!(version = %config.version, inserted, skipped, dry_run = args.dry_run, "banner pass complete");
    Ok(())
}

fn apply(site: &Path, config: &BannerConfig, dry_run: bool) -> Result<(usize, usize)> {
    let mut inserted = 0usize;
    let mut skipped = 0usize;
    for entry in WalkDir::new(site)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with(['.', '_']))
        .filter_map(|e| e.ok())
    {
        let p = entry.path();
        if !p.is_file() || p.extension().and_then(|s| s.to_str()) != Some("html") {
            continue;
        }
        let source = fs::read_to_string(p)?;
        match inject_html(&source, config) {
            (page, Injection::Inserted) => {
                inserted += 1;
                tracing::debug!(page = %p.display(), "banner inserted");
                if !dry_run {
                    fs::write(p, page)?;
                }
            }
            (_, Injection::Skipped) => {
                skipped += 1;
                tracing::debug!(page = %p.display(), "no content container");
            }
        }
    }
    Ok((inserted, skipped))
}
