//! `rankeval` CLI: compare two ranking functions on a judged query set.
//!
//! ```text
//! rankeval config.toml
//! ```
//!
//! Builds the index from the configured line corpus, runs every query under both rankers,
//! writes per-query AP files plus `significance.txt`, and prints both MAPs.

use clap::Parser;
use rankeval::config::Config;
use rankeval::query::load_queries;
use rankeval::{report, Comparator, InvertedIndex, Qrels, Registry};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Compare two ranking functions by MAP and a paired t-test",
    long_about = None
)]
struct Args {
    /// Path to the TOML configuration file.
    config: PathBuf,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(config_path: &Path) -> Result<(), rankeval::Error> {
    let start = Instant::now();
    let cfg = Config::load(config_path)?;

    let (spec_a, spec_b) = cfg.rankers()?;
    let registry = Registry::default();
    let ranker_a = registry.build(&spec_a.params)?;
    let ranker_b = registry.build(&spec_b.params)?;

    println!("Building or loading index...");
    let index = InvertedIndex::from_line_corpus(&cfg.corpus_path())?;
    let qrels = Qrels::from_path(&cfg.query_judgements)?;
    let runner = &cfg.query_runner;
    let queries = load_queries(&runner.query_path, runner.query_id_start)?;

    println!("Running queries");
    let cmp = Comparator::new(&index, &qrels, runner.top_k).compare(
        ranker_a.as_ref(),
        ranker_b.as_ref(),
        &queries,
    )?;

    report::write_artifacts(&cfg.comparison.output_dir, &spec_a.name, &spec_b.name, &cmp)?;

    println!("p: {}", cmp.test);
    println!("Mean average precision {}: {}", spec_a.name, cmp.map_a);
    println!("Mean average precision {}: {}", spec_b.name, cmp.map_b);
    println!("Elapsed: {:.4} seconds", start.elapsed().as_secs_f64());
    Ok(())
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // --help / --version are not failures.
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing();
    match run(&args.config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}
