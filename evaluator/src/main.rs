use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use trec_core::eval::{evaluate, mean, parse_qrels, parse_run, write_csv};
use trec_core::Error;

#[derive(Parser, Debug)]
#[command(name = "evaluator")]
#[command(about = "Score a run file against qrels: AP, NDCG@10, NDCG@1000, P@10")]
struct Cli {
    /// Relevance judgments: topic iteration docno judgment
    #[arg(long)]
    qrels: PathBuf,
    /// Run file produced by the searcher
    #[arg(long)]
    run: PathBuf,
    /// Also write per-topic scores as CSV
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| Error::from_open(e, path))?;
    Ok(BufReader::new(file))
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();

    let qrels = parse_qrels(open(&args.qrels)?).with_context(|| format!("reading qrels {}", args.qrels.display()))?;
    if qrels.skipped > 0 {
        eprintln!("warning: {} malformed qrels line(s) skipped", qrels.skipped);
    }
    let run = parse_run(open(&args.run)?).with_context(|| format!("reading run {}", args.run.display()))?;
    tracing::info!(judged_topics = qrels.relevant.len(), run_topics = run.len(), "loaded inputs");

    let scores = evaluate(&qrels, &run);
    println!("{:>6}  {:>6}  {:>8}  {:>10}  {:>6}", "topic", "AP", "NDCG@10", "NDCG@1000", "P@10");
    for s in &scores {
        println!(
            "{:>6}  {:>6.3}  {:>8.3}  {:>10.3}  {:>6.3}",
            s.topic, s.average_precision, s.ndcg_10, s.ndcg_1000, s.precision_10
        );
    }
    if let Some(m) = mean(&scores) {
        println!(
            "{:>6}  {:>6.3}  {:>8.3}  {:>10.3}  {:>6.3}",
            "mean", m.average_precision, m.ndcg_10, m.ndcg_1000, m.precision_10
        );
    }

    if let Some(csv) = &args.csv {
        let file = File::create(csv).with_context(|| format!("creating {}", csv.display()))?;
        write_csv(BufWriter::new(file), &scores)?;
        tracing::info!(path = %csv.display(), topics = scores.len(), "wrote csv");
    }
    Ok(())
}
