use anyhow::Result;
use clap::{Parser, Subcommand};
use docsearch_core::persist::save_index;
use docsearch_core::{IndexBuilder, SearchIndex};
use tracing_subscriber::{fmt, EnvFilter};

mod ingest;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and inspect documentation search indexes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from rendered HTML pages or JSON/JSONL records
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output artifact; .js, .json or any other extension for bincode
        #[arg(long, default_value = "./searchindex.js")]
        output: String,
        /// CSS selector of the main content container in HTML pages
        #[arg(long, default_value = ingest::DEFAULT_CONTENT_SELECTOR)]
        content_selector: String,
    },
    /// Print document and term counts of an artifact
    Inspect {
        #[arg(long)]
        index: String,
    },
    /// Run a query against an artifact
    Query {
        #[arg(long)]
        index: String,
        /// Maximum number of results to print
        #[arg(long, default_value_t = 10)]
        k: usize,
        query: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, content_selector } => build_index(&input, &output, &content_selector),
        Commands::Inspect { index } => inspect(&index),
        Commands::Query { index, k, query } => query_index(&index, &query, k),
    }
}

fn build_index(input: &str, output: &str, content_selector: &str) -> Result<()> {
    let reader = ingest::SourceReader::new(content_selector)?;
    let docs = reader.read(input)?;

    let mut builder = IndexBuilder::new();
    for doc in docs {
        let filename = doc.filename.as_deref().unwrap_or(&doc.name);
        builder.add_document(&doc.name, &doc.title, filename, &doc.body)?;
    }
    let artifact = builder.build();
    tracing::info!(num_docs = artifact.num_docs(), num_terms = artifact.terms.len(), "ingested documents");

    save_index(output, &artifact)?;
    tracing::info!(output, "index build complete");
    Ok(())
}

fn inspect(path: &str) -> Result<()> {
    let index = SearchIndex::open(path)?;
    let artifact = index.artifact();
    println!("schema: {}/{}", artifact.schema.name, artifact.schema.version);
    for (category, version) in &artifact.envversion {
        println!("  {category}: {version}");
    }
    println!("documents: {}", index.len());
    println!("terms: {}", index.term_count());
    println!("title terms: {}", artifact.titleterms.len());
    for (name, title) in artifact.docnames.iter().zip(&artifact.titles) {
        println!("  {name}\t{title}");
    }
    Ok(())
}

fn query_index(path: &str, query: &str, k: usize) -> Result<()> {
    let index = SearchIndex::open(path)?;
    let hits = index.hits(query);
    println!("{} hit(s) for {query:?}", hits.len());
    for hit in hits.iter().take(k) {
        println!("  {}\t{}", hit.doc, hit.title);
    }
    Ok(())
}
