use anyhow::Result;
use clap::{Parser, Subcommand};
use indexer::build_index;
use polysearch_core::engine::Resources;
use polysearch_core::persist::IndexPaths;
use polysearch_core::SearchConfig;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build the multilingual BM25 inverted index", long_about = None)]
struct Cli {
    /// TOML config file (POLYSEARCH_* env vars override it)
    #[arg(long, global = true, default_value = "polysearch.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a directory of crawled JSON documents
    Build {
        /// Directory with one JSON document per file
        #[arg(long)]
        input: PathBuf,
        /// Output index directory (defaults to index.dir from the config)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Document store path (defaults to index.documents, then <output>/documents.json)
        #[arg(long)]
        documents: Option<PathBuf>,
        /// Hide the progress bar
        #[arg(long, default_value_t = false)]
        quiet: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let config = SearchConfig::load(Some(&cli.config))?;

    match cli.command {
        Commands::Build { input, output, documents, quiet } => {
            let root = output.unwrap_or_else(|| config.index.dir.clone());
            let paths = match documents.or_else(|| config.index.documents.clone()) {
                Some(docs) => IndexPaths::with_documents(&root, docs),
                None => IndexPaths::new(&root),
            };
            let resources = Resources::load(&config)?;
            let report = build_index(&input, &paths, resources.tokenizer, !quiet)?;
            println!(
                "indexed {} of {} documents ({} empty, {} failed), {} terms -> {}",
                report.indexed,
                report.files,
                report.empty,
                report.failed,
                report.terms,
                paths.root.display()
            );
            Ok(())
        }
    }
}
