use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use searcher::{run_bm25, run_boolean, RunSummary, SearchOptions};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use trec_core::bm25::{Bm25Params, BM25_B, BM25_K1, DEFAULT_TOP_K};
use trec_core::boolean::MissingTerms;
use trec_core::run::{AND_RUN_TAG, BM25_RUN_TAG};

#[derive(Parser)]
#[command(name = "searcher")]
#[command(about = "Run a query file against an index and write a TREC run file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Common {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: PathBuf,
    /// Query file: topic id and query text on alternating lines
    #[arg(long)]
    queries: PathBuf,
    /// Run file to write
    #[arg(long)]
    output: PathBuf,
    /// Run tag printed in the last column
    #[arg(long)]
    run_tag: Option<String>,
}

impl Common {
    fn into_options(self, default_tag: &str) -> SearchOptions {
        SearchOptions {
            index: self.index,
            queries: self.queries,
            output: self.output,
            run_tag: self.run_tag.unwrap_or_else(|| default_tag.to_string()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rank documents with BM25
    Bm25 {
        #[command(flatten)]
        common: Common,
        #[arg(long, default_value_t = BM25_K1)]
        k1: f64,
        #[arg(long, default_value_t = BM25_B)]
        b: f64,
        /// Maximum documents written per topic
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
    /// Return documents containing every query term
    And {
        #[command(flatten)]
        common: Common,
        /// Treat a query term missing from the index as unsatisfiable instead of ignoring it
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let summary = match cli.command {
        Commands::Bm25 { common, k1, b, top_k } => {
            run_bm25(&common.into_options(BM25_RUN_TAG), Bm25Params { k1, b }, top_k)?
        }
        Commands::And { common, strict } => {
            let policy = if strict { MissingTerms::Unsatisfiable } else { MissingTerms::Ignore };
            run_boolean(&common.into_options(AND_RUN_TAG), policy)?
        }
    };
    report(&summary);
    Ok(())
}

fn report(summary: &RunSummary) {
    println!("{} topics, {} run lines", summary.topics, summary.lines);
    if summary.skipped_queries > 0 {
        eprintln!("warning: {} malformed query line(s) skipped", summary.skipped_queries);
    }
    if summary.unknown_terms > 0 {
        eprintln!("note: {} query term(s) not in the index were ignored", summary.unknown_terms);
    }
}
