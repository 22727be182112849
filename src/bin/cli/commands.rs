//! Command execution for the docalign binary.

use std::sync::Arc;

use anyhow::Context;
use owo_colors::OwoColorize;
use tabled::{settings::Style as TableStyle, Table, Tabled};
use tracing::info;

use docalign_rs::{
    open_lookup, summarize_results, MatchConfig, MatchInputs, RuleLemmatizer, RunSummary,
    SemanticMatcher,
};

use crate::cli::args::{MatchArgs, SummaryArgs, ValidateConfigArgs};
use crate::cli::config_layer::build_layered_match_config;

/// Run matching and append the results file
pub fn match_command(args: Box<MatchArgs>) -> anyhow::Result<()> {
    let config = build_layered_match_config(&args)?;
    let destination = config.results_path();
    info!(
        class = %config.class_name,
        strategy = %config.strategy,
        threshold = config.distance_threshold,
        "Starting match run"
    );

    let inputs = MatchInputs::load(&args.methods, &args.candidates, args.ground_truth.as_deref())
        .context("Failed to load inputs")?;
    let lookup = open_lookup(&config.embedding).context("Failed to open word vectors")?;

    let matcher = SemanticMatcher::new(config, Arc::new(RuleLemmatizer::new()), lookup);
    let summary = matcher
        .run_to_file(
            &inputs.methods,
            &inputs.candidates,
            &inputs.ground_truth,
            args.fresh,
        )
        .with_context(|| format!("Failed to write results to {}", destination.display()))?;

    println!(
        "{} {}",
        "Results written to:".bright_green().bold(),
        destination.display().to_string().cyan()
    );
    print_summary(&summary);
    Ok(())
}

/// Print a summary of an existing results file
pub fn summary_command(args: SummaryArgs) -> anyhow::Result<()> {
    let summary = summarize_results(&args.results)
        .with_context(|| format!("Failed to read {}", args.results.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Print default configuration in YAML format
pub fn print_default_config() -> anyhow::Result<()> {
    println!("{}", "# Default docalign configuration".dimmed());
    println!("{}", "# Save this to .docalign.yml or pass it with --config".dimmed());
    println!();

    let yaml_output = serde_yaml::to_string(&MatchConfig::default())?;
    println!("{}", yaml_output);
    Ok(())
}

/// Validate a configuration file
pub fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    let config = MatchConfig::from_yaml_file(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", args.config.display()))?;

    println!("{}", "Configuration file is valid".bright_green().bold());
    println!("  class:     {}", config.class_name);
    println!("  strategy:  {}", config.strategy);
    println!("  threshold: {}", config.distance_threshold);
    println!("  results:   {}", config.results_path().display());
    Ok(())
}

#[derive(Tabled)]
struct SummaryRow {
    metric: String,
    value: String,
}

fn print_summary(summary: &RunSummary) {
    let rows = vec![
        SummaryRow {
            metric: "tags analyzed".to_string(),
            value: summary.tags_analyzed.to_string(),
        },
        SummaryRow {
            metric: "matches".to_string(),
            value: summary.matches.to_string(),
        },
        SummaryRow {
            metric: "with ground truth".to_string(),
            value: summary.with_ground_truth.to_string(),
        },
        SummaryRow {
            metric: "correct".to_string(),
            value: summary.correct.to_string(),
        },
        SummaryRow {
            metric: "partially correct".to_string(),
            value: summary.partially_correct.to_string(),
        },
        SummaryRow {
            metric: "precision".to_string(),
            value: format!("{:.3}", summary.precision()),
        },
        SummaryRow {
            metric: "partial precision".to_string(),
            value: format!("{:.3}", summary.partial_precision()),
        },
    ];

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{table}");
}
