//! Configuration Layer Management
//!
//! Defaults, then an optional YAML file (explicit `--config` or a local
//! `.docalign.yml`), then CLI flags.

use std::path::PathBuf;

use docalign_rs::MatchConfig;

use crate::cli::args::MatchArgs;

/// Apply CLI arguments on top of an existing configuration
pub trait ApplyCliArgs<T> {
    /// Override fields set on the command line
    fn apply_cli_args(&mut self, args: &T);
}

impl ApplyCliArgs<MatchArgs> for MatchConfig {
    fn apply_cli_args(&mut self, args: &MatchArgs) {
        if let Some(class_name) = &args.class_name {
            self.class_name = class_name.clone();
        }
        if let Some(strategy) = args.strategy {
            self.strategy = strategy.into();
        }
        if let Some(threshold) = args.threshold {
            self.distance_threshold = threshold;
        }
        if args.no_stopwords {
            self.stopwords_removal = false;
        }
        if args.pos_select {
            self.pos_select = true;
        }
        if args.tfidf {
            self.tfidf = true;
        }
        if args.condition_as_ground_truth {
            self.condition_as_ground_truth = true;
        }
        if let Some(table) = &args.embeddings {
            self.embedding.table_path = Some(table.clone());
        }
        if let Some(source) = args.embedding_source {
            self.embedding.source = source.into();
        }
        if let Some(units) = args.max_exact_units {
            self.transport.max_exact_units = units;
        }
        if let Some(out) = &args.out {
            self.output.directory = out.clone();
        }
        if args.compact {
            self.output.pretty = false;
        }
    }
}

/// Local configuration file picked up when `--config` is absent.
fn implicit_config_path() -> Option<PathBuf> {
    [".docalign.yml", ".docalign.yaml"]
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Build the effective configuration for a match run
pub fn build_layered_match_config(args: &MatchArgs) -> anyhow::Result<MatchConfig> {
    let config_path = args.config.clone().or_else(implicit_config_path);

    let mut config = match &config_path {
        Some(path) => MatchConfig::from_yaml_file(path).map_err(|e| {
            anyhow::anyhow!("Failed to load configuration from {}: {}", path.display(), e)
        })?,
        None => MatchConfig::default(),
    };

    config.apply_cli_args(args);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}
