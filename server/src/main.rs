use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

/// Serve search queries over a documentation index artifact.
#[derive(Parser, Debug)]
#[command(name = "docsearch-server")]
struct Args {
    /// Index artifact path (.js, .json or bincode)
    #[arg(long, default_value = "./searchindex.js")]
    index: String,
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl Args {
    fn addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let addr = args.addr()?;
    let app = docsearch_server::build_app(&args.index)?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, index = %args.index, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
