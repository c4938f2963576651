use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use trec_core::builder::{build, BuildStats};
use trec_core::corpus::open_corpus;
use trec_core::persist::{create_index_dir, load_index, save_index, IndexPaths, MetaFile};
use trec_core::Tokenizer;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and inspect a BM25 / Boolean inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a gzip-compressed TREC corpus
    Build {
        /// Corpus path (.gz of concatenated <DOC> records)
        #[arg(long)]
        input: PathBuf,
        /// Output index directory; must not exist yet
        #[arg(long)]
        output: PathBuf,
        /// Stem tokens with the English Porter stemmer
        #[arg(long, default_value_t = false)]
        stem: bool,
    },
    /// Print the manifest and table sizes of an existing index
    Stats {
        /// Index directory
        #[arg(long)]
        index: PathBuf,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, stem } => build_index(&input, &output, stem),
        Commands::Stats { index } => print_stats(&index),
    }
}

fn build_index(input: &Path, output: &Path, stem: bool) -> Result<()> {
    let out_paths = IndexPaths::new(output);
    // Check the destination before spending time on the corpus.
    create_index_dir(&out_paths)?;

    let stats = match write_index(input, &out_paths, stem) {
        Ok(stats) => stats,
        Err(e) => {
            // Remove the partial index so the build can be rerun.
            if let Err(cleanup) = fs::remove_dir_all(&out_paths.root) {
                tracing::warn!(error = %cleanup, "could not remove partial index");
            }
            return Err(e);
        }
    };

    tracing::info!(
        output = %output.display(),
        documents = stats.documents,
        skipped = stats.skipped,
        terms = stats.terms,
        "index build complete"
    );
    if stats.skipped > 0 {
        eprintln!("warning: {} malformed record(s) skipped", stats.skipped);
    }
    Ok(())
}

fn write_index(input: &Path, out_paths: &IndexPaths, stem: bool) -> Result<BuildStats> {
    let records = open_corpus(input)?;
    let (index, stats) = build(records, Tokenizer::new(stem))
        .with_context(|| format!("indexing {}", input.display()))?;
    let meta = MetaFile::describe(&index, stem);
    save_index(out_paths, &index, &meta)
        .with_context(|| format!("writing index to {}", out_paths.root.display()))?;
    Ok(stats)
}

fn print_stats(dir: &Path) -> Result<()> {
    let (index, meta) = load_index(&IndexPaths::new(dir))?;
    println!("documents:      {}", meta.num_docs);
    println!("terms:          {}", meta.num_terms);
    println!("postings:       {}", index.inverted.num_postings());
    println!("avg doc length: {:.2}", index.avg_doc_len());
    println!("stemmed:        {}", meta.stemmed);
    println!("created at:     {}", meta.created_at);
    Ok(())
}
