use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dirindex::config::{ServerConfig, parse_config_file};
use dirindex::handlers::{DirectoryIndex, NotFound};

#[derive(Parser, Debug)]
#[command(name = "dirindex", version, about = "Serve sortable HTML indexes of a directory tree")]
struct Cli {
    /// Config file with `listen`, `root` and `error_path` settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to index (overrides the config file)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Address to listen on, repeatable (overrides the config file)
    #[arg(short, long)]
    listen: Vec<String>,
}

#[cfg(target_os = "linux")]
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => parse_config_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(root) = cli.root {
        config.root = root;
    }
    if !cli.listen.is_empty() {
        config.listen_addresses = cli.listen;
    }

    info!(root = %config.root.display(), "indexing");

    let chain = DirectoryIndex::new(config.root, Box::new(NotFound::new(config.error_path)));
    dirindex::network::Server::new(config.listen_addresses, Box::new(chain))
        .run()
        .context("server stopped")
}

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("dirindex needs epoll and only runs on Linux");
}
