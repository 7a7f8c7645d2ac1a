//! Cluster paraphrase candidates into senses and evaluate them against gold annotations.
//!
//! ```bash
//! sensecluster -p candidates.tsv -s gold.tsv --ppdb ppdb.json --entailment ent.json \
//!     -m hgfc -b -o results.csv
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use sensecluster::eval::{write_csv, write_summary_json};
use sensecluster::io::{
    read_candidate_sets, read_gold, read_scores, read_vectors, write_clusterings_json,
};
use sensecluster::{Config, Inputs, Method, PairedScorer};

#[derive(Parser, Debug)]
#[command(name = "sensecluster")]
#[command(about = "Cluster paraphrase candidates into word senses and score them against gold")]
struct Args {
    /// Candidate paraphrase sets (TSV: word, POS, candidates...).
    #[arg(short = 'p', long)]
    ppfile: PathBuf,

    /// Gold sense clusters (TSV: word, POS, sense id, members...).
    #[arg(short = 's', long)]
    goldfile: PathBuf,

    /// Per-word results CSV.
    #[arg(short = 'o', long, default_value = "results.csv")]
    outfile: PathBuf,

    /// Also score the random, most-frequent-sense and one-cluster-per-item baselines.
    #[arg(short = 'b', long)]
    baselines: bool,

    /// Restrict candidates to the gold vocabulary before clustering.
    #[arg(short = 'f', long)]
    filter: bool,

    /// Clustering method: spectral, semclust or hgfc (default hgfc).
    #[arg(short = 'm', long)]
    method: Option<String>,

    /// Distributional vectors (JSON: word -> [f32]).
    #[arg(long)]
    vectors: Option<PathBuf>,

    /// Paraphrase scores (JSON: word -> word -> score).
    #[arg(long)]
    ppdb: Option<PathBuf>,

    /// Non-entailment scores (JSON: word -> word -> probability).
    #[arg(long)]
    entailment: Option<PathBuf>,

    /// YAML run configuration; flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the corpus summary as JSON.
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Write every predicted clustering as JSON.
    #[arg(long)]
    clusters: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_yaml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(name) = &args.method {
        config.method = name.parse::<Method>()?;
    }
    config.baselines |= args.baselines;
    config.filter_by_gold |= args.filter;
    config.validate()?;
    Ok(config)
}

fn load_inputs(args: &Args) -> Result<Inputs> {
    let candidate_sets = read_candidate_sets(&args.ppfile)
        .with_context(|| format!("failed to read {}", args.ppfile.display()))?;
    let gold = read_gold(&args.goldfile)
        .with_context(|| format!("failed to read {}", args.goldfile.display()))?;
    let vectors = args
        .vectors
        .as_ref()
        .map(|p| read_vectors(p).with_context(|| format!("failed to read {}", p.display())))
        .transpose()?;
    let paraphrase = args
        .ppdb
        .as_ref()
        .map(|p| read_scores(p).with_context(|| format!("failed to read {}", p.display())))
        .transpose()?;
    let entailment = args
        .entailment
        .as_ref()
        .map(|p| read_scores(p).with_context(|| format!("failed to read {}", p.display())))
        .transpose()?;
    info!(
        words = candidate_sets.len(),
        gold_words = gold.len(),
        "inputs loaded"
    );
    Ok(Inputs {
        candidate_sets,
        gold,
        vectors,
        paraphrase,
        entailment,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let config = load_config(&args)?;
    let inputs = load_inputs(&args)?;
    let report = sensecluster::run(&config, inputs, &PairedScorer::new())?;

    let out = File::create(&args.outfile)
        .with_context(|| format!("failed to create {}", args.outfile.display()))?;
    write_csv(&report.records, BufWriter::new(out))?;
    info!(path = %args.outfile.display(), "results written");

    if let Some(path) = &args.summary {
        let out = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        write_summary_json(&report.summary, BufWriter::new(out))?;
    }
    if let Some(path) = &args.clusters {
        let out = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        write_clusterings_json(&report.clusterings, BufWriter::new(out))?;
    }

    println!("Results for {}:", config.method);
    for (key, value) in report.summary.lines() {
        println!("\t{key}: {value:.2}");
    }
    if !report.summary.failures.is_empty() {
        println!("Failed words:");
        for f in &report.summary.failures {
            println!("\t{} ({}): {}", f.target, f.stage, f.reason);
        }
    }
    Ok(())
}
