//! Extract command - show the line items of a single document.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use nfex_core::invoice::{Classifier, NfeExtractor};
use nfex_core::models::invoice::LineItem;
use nfex_core::report::REPORT_HEADER;

use super::config::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input NF-e XML file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output with the report header
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    config.validate()?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let extractor = NfeExtractor::new()
        .with_classifier(Classifier::new(&config.classification.asset_keywords));
    let items = extractor.extract_file(&args.input)?;

    if items.is_empty() {
        eprintln!(
            "{} No line items found in {}",
            style("⚠").yellow(),
            args.input.display()
        );
    }

    let output = format_items(&items, args.format)?;

    // Write output
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

    Ok(())
}

fn format_items(items: &[LineItem], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
        OutputFormat::Csv => format_csv(items),
        OutputFormat::Text => Ok(format_text(items)),
    }
}

fn format_csv(items: &[LineItem]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(REPORT_HEADER)?;
    for item in items {
        wtr.write_record(item.to_row())?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(items: &[LineItem]) -> String {
    let mut output = String::new();

    let Some(first) = items.first() else {
        output.push_str("No line items\n");
        return output;
    };

    output.push_str(&format!("Invoice: {}\n", first.invoice_number));
    output.push_str(&format!("Issuer:  {}\n", first.issuer_name));
    output.push_str(&format!("Emitted: {}\n", first.emission_date));
    output.push('\n');

    for (i, item) in items.iter().enumerate() {
        output.push_str(&format!(
            "{:>3}. [{}] {} ({})\n",
            i + 1,
            item.kind,
            item.description,
            item.category
        ));
        output.push_str(&format!(
            "     {} {} x {} = {}\n",
            item.quantity, item.unit, item.unit_value, item.total_value
        ));
    }

    output
}
