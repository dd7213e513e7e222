//! Recommend command - suggest deductions for a user profile.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;
use tracing::info;

use taxbot_core::{
    DeductionRecommender, FileModelStore, RecommendationReport, ScorerCell, ScorerKind,
    UserProfile,
};

use super::{load_config, OutputFormat};

/// Arguments for the recommend command.
#[derive(Args)]
pub struct RecommendArgs {
    /// User profile JSON file
    #[arg(required = true)]
    profile: PathBuf,

    /// Trained model file (default: from configuration)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Confidence threshold override
    #[arg(long)]
    threshold: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub async fn run(args: RecommendArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let content = fs::read_to_string(&args.profile).map_err(|e| {
        anyhow::anyhow!("Failed to read profile {}: {}", args.profile.display(), e)
    })?;
    let profile: UserProfile = serde_json::from_str(&content)?;

    let model_path = args.model.unwrap_or_else(|| config.model.model_path());
    info!("Using model at {}", model_path.display());

    let threshold = args
        .threshold
        .unwrap_or(config.recommendation.confidence_threshold);
    let recommender =
        DeductionRecommender::new(ScorerCell::new(Arc::new(FileModelStore::new(model_path))))
            .with_threshold(threshold);

    let report = recommender.analyze(&profile)?;

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Csv => format_csv(&report)?,
        OutputFormat::Text => format_text(&report),
    };
    println!("{}", output);

    if report.scorer == ScorerKind::Default {
        eprintln!(
            "{} No trained model found, showing default recommendations.",
            style("ℹ").blue()
        );
    }

    Ok(())
}

fn format_csv(report: &RecommendationReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["category", "confidence", "estimated_amount"])?;
    for candidate in &report.recommendations {
        wtr.write_record([
            candidate.category.as_str(),
            &format!("{:.2}", candidate.confidence),
            &format!("{:.2}", candidate.estimated_amount),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &RecommendationReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Tax year: {}\n", report.tax_year));
    output.push('\n');

    if report.recommendations.is_empty() {
        output.push_str("No deductions recommended\n");
    }
    for candidate in &report.recommendations {
        output.push_str(&format!(
            "  {:<26} {:>5.1}%  ${:.2}\n",
            candidate.category.as_str(),
            candidate.confidence * 100.0,
            candidate.estimated_amount
        ));
    }

    output.push('\n');
    output.push_str(&format!(
        "Total estimated savings: ${:.2}\n",
        report.total_estimated_savings
    ));

    output
}
