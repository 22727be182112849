//! CLI Argument Structures
//!
//! Command and flag definitions for the docalign binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use docalign_rs::{EmbeddingSource, StrategyKind};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Match documentation comments to the code expressions they describe
#[derive(Parser)]
#[command(name = "docalign")]
#[command(version = VERSION)]
#[command(about = "Rank candidate code expressions against documentation tag comments")]
#[command(long_about = "
Rank candidate code expressions against the comments of @return and @throws
documentation tags, using word embeddings.

Common Usage:

  # Cosine matching with a GloVe table, keep distances up to 0.5
  docalign match --class-name java.util.ArrayList \\
      --methods methods.json --candidates candidates.json \\
      --embeddings glove.6B.300d.txt --threshold 0.5

  # Word mover's distance, fresh results file, with ground truth
  docalign match --strategy word-transport --fresh \\
      --ground-truth truth.json --methods methods.json --candidates candidates.json

  # Precision figures for a results file
  docalign summary semantic_ArrayList_results.json
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match documentation tags against candidate expressions
    Match(Box<MatchArgs>),

    /// Summarize a results file
    Summary(SummaryArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Validate a docalign configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

/// Arguments for the match command
#[derive(Args)]
pub struct MatchArgs {
    /// Documented methods (JSON list)
    #[arg(long, value_name = "FILE")]
    pub methods: PathBuf,

    /// Candidate expressions (JSON list)
    #[arg(long, value_name = "FILE")]
    pub candidates: PathBuf,

    /// Expected expressions per tag (JSON list)
    #[arg(long, value_name = "FILE")]
    pub ground_truth: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Class under analysis (its simple name becomes a stopword)
    #[arg(long, env = "DOCALIGN_CLASS")]
    pub class_name: Option<String>,

    /// Distance strategy
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Maximum accepted distance (-1 disables filtering)
    #[arg(long, allow_hyphen_values = true)]
    pub threshold: Option<f64>,

    /// Keep stopwords in comments and identifiers
    #[arg(long)]
    pub no_stopwords: bool,

    /// Match only the subject/predicate of each comment
    #[arg(long)]
    pub pos_select: bool,

    /// Exclude identifier words found in at least half of the candidates
    #[arg(long)]
    pub tfidf: bool,

    /// Use each tag's condition as ground truth when none is given
    #[arg(long)]
    pub condition_as_ground_truth: bool,

    /// Word-vector table in GloVe text format
    #[arg(long, value_name = "FILE", env = "DOCALIGN_EMBEDDINGS")]
    pub embeddings: Option<PathBuf>,

    /// Word-vector source
    #[arg(long, value_enum)]
    pub embedding_source: Option<EmbeddingSourceArg>,

    /// Largest word-transport problem solved exactly
    #[arg(long)]
    pub max_exact_units: Option<usize>,

    /// Output directory for the results file
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Remove an existing results file before writing
    #[arg(long)]
    pub fresh: bool,

    /// Write one compact JSON record per line
    #[arg(long)]
    pub compact: bool,
}

/// Arguments for the summary command
#[derive(Args)]
pub struct SummaryArgs {
    /// Results file to summarize
    pub results: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the validate-config command
#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Configuration file to validate
    #[arg(short, long)]
    pub config: PathBuf,
}

/// Distance strategy selection
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StrategyArg {
    /// Cosine distance, smallest first
    Cosine,
    /// Cosine distance, largest first
    Conceptual,
    /// Word mover's distance
    WordTransport,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Cosine => StrategyKind::Cosine,
            StrategyArg::Conceptual => StrategyKind::Conceptual,
            StrategyArg::WordTransport => StrategyKind::WordTransport,
        }
    }
}

/// Word-vector source selection
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EmbeddingSourceArg {
    /// Static GloVe text table
    Table,
    /// Local embedding model (requires the `model` feature)
    Model,
}

impl From<EmbeddingSourceArg> for EmbeddingSource {
    fn from(arg: EmbeddingSourceArg) -> Self {
        match arg {
            EmbeddingSourceArg::Table => EmbeddingSource::Table,
            EmbeddingSourceArg::Model => EmbeddingSource::Model,
        }
    }
}
