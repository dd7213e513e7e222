//! Extract command - pull fields out of a single OCR text file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use taxbot_core::{DocumentType, ExtractionResult, FieldExtractor, FileTextSource};

use super::{load_config, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// OCR text file
    #[arg(required = true)]
    input: PathBuf,

    /// Document type (w2, receipt)
    #[arg(short = 't', long = "type")]
    document_type: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show extraction confidence scores
    #[arg(long)]
    show_confidence: bool,

    /// Fail on document types without extraction rules
    #[arg(long)]
    strict: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let document_type = DocumentType::parse(&args.document_type);
    info!("Extracting {} fields from {}", document_type, args.input.display());

    let extractor = FieldExtractor::from_config(&config.extraction)
        .with_unsupported_rejection(config.extraction.reject_unsupported_types || args.strict);

    let source = FileTextSource::new(&args.input);
    let result = extractor.extract_from_source(&document_type, &source)?;

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        for (field, confidence) in &result.field_confidence {
            println!(
                "{} {}: {:.1}%",
                style("ℹ").blue(),
                field,
                confidence * 100.0
            );
        }
        for warning in &result.warnings {
            println!("{} {}", style("!").yellow(), warning);
        }
        println!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            result.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&result.fields)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["document_type", "field", "value", "confidence"])?;

    for (field, value) in result.fields.iter() {
        let confidence = result
            .field_confidence
            .get(field)
            .map(|c| format!("{:.2}", c))
            .unwrap_or_default();
        wtr.write_record([
            result.document_type.as_str(),
            field,
            &value.to_string(),
            &confidence,
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Document: {}\n", result.document_type));

    if result.fields.is_empty() {
        output.push_str("No fields extracted\n");
    }
    for (field, value) in result.fields.iter() {
        output.push_str(&format!("  {}: {}\n", field, value));
    }

    output
}
