//! Configuration types for a matching run.
//!
//! A [`MatchConfig`] is built once (defaults, then an optional YAML file, then
//! CLI overrides) and passed by reference to every stage. Nothing in the
//! pipeline mutates it.

pub mod validation;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{DocAlignError, Result, ResultExt};

pub use validation::{
    is_threshold_disabled, validate_non_empty, validate_positive_usize, validate_threshold,
    THRESHOLD_DISABLED,
};

/// Distance strategy used to score (comment, candidate) pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Cosine distance between aggregated vectors, smallest first
    Cosine,
    /// Same cosine distance ranked largest first
    Conceptual,
    /// Word mover's distance over the normalized word strings
    WordTransport,
}

impl StrategyKind {
    /// Name used in logs and file output.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Cosine => "cosine",
            StrategyKind::Conceptual => "conceptual",
            StrategyKind::WordTransport => "word_transport",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main configuration for a matching run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Class under analysis; its simple name is treated as an extra stopword
    #[serde(default)]
    pub class_name: String,

    /// Remove stopwords (and the class simple name) from comments and identifiers
    #[serde(default = "MatchConfig::default_stopwords_removal")]
    pub stopwords_removal: bool,

    /// Replace comments with their subject/predicate before normalization
    #[serde(default)]
    pub pos_select: bool,

    /// Exclude identifier words occurring in at least half of the candidates
    #[serde(default)]
    pub tfidf: bool,

    /// Maximum accepted distance; -1 disables filtering
    #[serde(default = "MatchConfig::default_distance_threshold")]
    pub distance_threshold: f64,

    /// Distance strategy
    #[serde(default = "MatchConfig::default_strategy")]
    pub strategy: StrategyKind,

    /// Use a tag's extracted condition as ground truth when none is supplied
    #[serde(default)]
    pub condition_as_ground_truth: bool,

    /// Embedding backend configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Word-transport solver configuration
    #[serde(default)]
    pub transport: TransportConfig,

    /// Result output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            class_name: String::new(),
            stopwords_removal: Self::default_stopwords_removal(),
            pos_select: false,
            tfidf: false,
            distance_threshold: Self::default_distance_threshold(),
            strategy: Self::default_strategy(),
            condition_as_ground_truth: false,
            embedding: EmbeddingConfig::default(),
            transport: TransportConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Default value providers and I/O methods for [`MatchConfig`].
impl MatchConfig {
    const fn default_stopwords_removal() -> bool {
        true
    }

    const fn default_distance_threshold() -> f64 {
        THRESHOLD_DISABLED
    }

    const fn default_strategy() -> StrategyKind {
        StrategyKind::Cosine
    }

    /// Configuration for `class_name` with every other field at its default.
    pub fn for_class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Self::default()
        }
    }

    /// Builder-style strategy override.
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Builder-style threshold override.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.distance_threshold = threshold;
        self
    }

    /// Builder-style stopword toggle.
    pub fn with_stopwords_removal(mut self, enabled: bool) -> Self {
        self.stopwords_removal = enabled;
        self
    }

    /// Builder-style TF exclusion toggle.
    pub fn with_tfidf(mut self, enabled: bool) -> Self {
        self.tfidf = enabled;
        self
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DocAlignError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|e| {
            DocAlignError::io(
                format!("Failed to write config file: {}", path.display()),
                e,
            )
        })
    }

    /// Simple name of the configured class (`java.util.ArrayList` -> `ArrayList`).
    pub fn class_simple_name(&self) -> &str {
        let name = self.class_name.trim();
        name.rsplit(['.', '$']).next().unwrap_or(name)
    }

    /// Whether distance filtering is active.
    pub fn threshold_enabled(&self) -> bool {
        !is_threshold_disabled(self.distance_threshold)
    }

    /// Results file name; encodes the stopword setting so runs do not collide.
    pub fn results_file_name(&self) -> String {
        if self.stopwords_removal {
            format!("semantic_{}_results.json", self.class_simple_name())
        } else {
            format!("semantic_noSW_{}_results.json", self.class_simple_name())
        }
    }

    /// Full path of the results file.
    pub fn results_path(&self) -> PathBuf {
        self.output.directory.join(self.results_file_name())
    }

    /// Validate the configuration before a run.
    pub fn validate(&self) -> Result<()> {
        validate_non_empty(&self.class_name, "class_name")?;
        validate_threshold(self.distance_threshold, "distance_threshold")?;
        self.embedding.validate()?;
        self.transport.validate()?;
        Ok(())
    }
}

/// Where word vectors come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingSource {
    /// Static table in GloVe text format
    Table,
    /// Embedding model run locally through fastembed
    Model,
}

/// Configuration for the embedding backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Backend kind
    pub source: EmbeddingSource,
    /// Path of the word-vector table (required for the table source)
    pub table_path: Option<PathBuf>,
    /// Embedding model to use for the model source
    pub model: EmbeddingModel,
    /// Cache directory for model files
    pub cache_dir: Option<String>,
    /// Whether to show download progress for model files
    pub show_download_progress: bool,
    /// Maximum cached word vectors for the model source
    pub cache_entries: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            source: EmbeddingSource::Table,
            table_path: None,
            model: EmbeddingModel::AllMiniLML6V2,
            cache_dir: None,
            show_download_progress: false,
            cache_entries: 50_000,
        }
    }
}

impl EmbeddingConfig {
    fn validate(&self) -> Result<()> {
        if self.source == EmbeddingSource::Table && self.table_path.is_none() {
            return Err(DocAlignError::config_field(
                "a word-vector table path is required for the table embedding source",
                "embedding.table_path",
            ));
        }
        validate_positive_usize(self.cache_entries, "embedding.cache_entries")
    }
}

/// Available embedding models (subset of fastembed models)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbeddingModel {
    /// All-MiniLM-L6-v2 - 384 dim, fast and lightweight (default)
    AllMiniLML6V2,
    /// All-MiniLM-L6-v2 Quantized - 384 dim, very fast
    AllMiniLML6V2Q,
    /// BGE Small EN v1.5 - 384 dim
    BGESmallENV15,
    /// Nomic Embed Text v1.5 - 768 dim
    NomicEmbedTextV15,
}

impl EmbeddingModel {
    /// Get the embedding dimension for this model
    pub fn dimension(&self) -> usize {
        match self {
            EmbeddingModel::AllMiniLML6V2 | EmbeddingModel::AllMiniLML6V2Q => 384,
            EmbeddingModel::BGESmallENV15 => 384,
            EmbeddingModel::NomicEmbedTextV15 => 768,
        }
    }

    /// Get a human-readable name for this model
    pub fn display_name(&self) -> &'static str {
        match self {
            EmbeddingModel::AllMiniLML6V2 => "all-MiniLM-L6-v2",
            EmbeddingModel::AllMiniLML6V2Q => "all-MiniLM-L6-v2 (quantized)",
            EmbeddingModel::BGESmallENV15 => "BGE-small-en-v1.5",
            EmbeddingModel::NomicEmbedTextV15 => "nomic-embed-text-v1.5",
        }
    }
}

/// Configuration for the word-transport solver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Largest number of unit masses solved exactly; larger problems use the
    /// relaxed lower bound
    pub max_exact_units: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_exact_units: 256,
        }
    }
}

impl TransportConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_usize(self.max_exact_units, "transport.max_exact_units")
    }
}

/// Configuration for result output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the results file is written to
    pub directory: PathBuf,
    /// Pretty-print each record
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            pretty: true,
        }
    }
}
