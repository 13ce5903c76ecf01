//! # sensorclean-cli
//!
//! Command-line interface for cleaning sensor-logger workbooks.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use sensorclean_core::{
    load_configured_sheet, normalize_headers, CleanConfig, CleanOutput, TablePipeline,
    DEFAULT_SENSOR_PATTERN,
};
use sensorclean_sheet::{Book, CellValue, Sheet};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const MIN_PREVIEW_ROWS: usize = 5;
const MAX_PREVIEW_ROWS: usize = 100;

/// sensorclean - detect and normalize sensor logger columns
#[derive(Parser, Debug)]
#[command(name = "sensorclean")]
#[command(author, version, about = "Clean sensor-logger spreadsheets", long_about = None)]
struct Cli {
    /// Workbook to clean (.xlsx)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// List the workbook's sheets and exit
    #[arg(short = 'l', long = "list-sheets")]
    list_sheets: bool,

    /// Sheet to clean (default: first sheet)
    #[arg(short = 's', long = "sheet")]
    sheet: Option<String>,

    /// Regex for sensor headers (case-insensitive)
    #[arg(short = 'p', long = "pattern", default_value = DEFAULT_SENSOR_PATTERN)]
    pattern: String,

    /// Keep rows where every cell is empty
    #[arg(long = "keep-blank-rows")]
    keep_blank_rows: bool,

    /// Insert Days after this column instead of the datetime column
    #[arg(long = "insert-days-after", value_name = "COLUMN")]
    insert_days_after: Option<String>,

    /// Output workbook (default: cleaned_<sheet>.xlsx next to FILE)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Rows to show in previews (5-100)
    #[arg(short = 'n', long = "preview", default_value_t = 25)]
    preview: usize,

    /// Output format (table, json)
    #[arg(short = 'f', long = "format", default_value = "table")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output format for reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Pretty table output (default)
    #[default]
    Table,
}

impl Cli {
    fn config(&self) -> CleanConfig {
        let mut config = CleanConfig::default()
            .with_sensor_pattern(self.pattern.as_str())
            .with_keep_blank_rows(self.keep_blank_rows);
        if let Some(sheet) = &self.sheet {
            config = config.with_sheet(sheet.as_str());
        }
        if let Some(column) = &self.insert_days_after {
            config = config.with_insert_days_after(column.as_str());
        }
        config
    }

    fn preview_rows(&self) -> usize {
        self.preview.clamp(MIN_PREVIEW_ROWS, MAX_PREVIEW_ROWS)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    if cli.list_sheets {
        list_sheets(&cli.file, cli.format)
    } else {
        clean(&cli).map(|_| ())
    }
}

/// Print the workbook's sheet names in order.
fn list_sheets(file: &Path, format: OutputFormat) -> Result<()> {
    let names = Book::xlsx_sheet_names(file)
        .with_context(|| format!("Failed to read the Excel file: {}", file.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Table => {
            for name in names {
                println!("{name}");
            }
        }
    }
    Ok(())
}

/// Load, clean and write one sheet. Returns the path written.
fn clean(cli: &Cli) -> Result<PathBuf> {
    let config = cli.config();
    let pipeline = TablePipeline::new(&config).context("Invalid sensor pattern")?;

    let raw = load_configured_sheet(&cli.file, &config).with_context(|| {
        format!(
            "Failed to read sheet '{}' from {}",
            config.sheet.as_deref().unwrap_or("<first>"),
            cli.file.display()
        )
    })?;

    let out = pipeline.run(&raw);
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.file, out.metadata.sheet()));

    out.save_xlsx(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!(path = %output.display(), "wrote cleaned workbook");

    match cli.format {
        OutputFormat::Json => print_json_report(&raw, &out, &output)?,
        OutputFormat::Table => print_table_report(&raw, &out, &output, cli.preview_rows()),
    }
    Ok(output)
}

/// `cleaned_<sheet>.xlsx` in the input file's directory.
fn default_output_path(input: &Path, sheet: &str) -> PathBuf {
    input.with_file_name(format!("cleaned_{sheet}.xlsx"))
}

fn print_json_report(raw: &Sheet, out: &CleanOutput, output: &Path) -> Result<()> {
    let meta = &out.metadata;
    let report = serde_json::json!({
        "detected": {
            "datetime": meta.datetime_column_label(),
            "sensor_count": meta.sensor_count(),
            "sensors": meta.sensor_columns(),
        },
        "total_rows": raw.row_count(),
        "total_columns": raw.col_count(),
        "cleaned_rows": out.table.row_count(),
        "metadata": meta,
        "output": output.display().to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_table_report(raw: &Sheet, out: &CleanOutput, output: &Path, preview_rows: usize) {
    let meta = &out.metadata;

    println!("{}", "Detected columns".cyan().bold());
    println!("  Datetime:      {}", meta.datetime_column_label());
    println!("  # Sensors:     {}", meta.sensor_count());
    println!("  Sensors:       {}", meta.sensor_columns().join(", "));
    println!("  Total rows:    {}", raw.row_count());
    println!("  Total columns: {}", raw.col_count());

    if meta.datetime_column().is_none() {
        eprintln!(
            "{} No obvious datetime column detected. Proceeding without 'Days'.",
            "Warning:".yellow().bold()
        );
    }

    println!("\n{}", "Preview - Original".cyan().bold());
    println!("{}", preview_table(&normalize_headers(raw.header()), raw, preview_rows));

    println!("\n{}", "Preview - Cleaned".cyan().bold());
    println!(
        "{}",
        preview_table(&out.table.column_names(), &out.table, preview_rows)
    );

    println!("\n{} {}", "Wrote".green().bold(), output.display());
}

/// Render the first `rows` rows of a sheet under the given headers.
fn preview_table(headers: &[String], sheet: &Sheet, rows: usize) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
        );
    for row in sheet.rows().take(rows) {
        table.add_row(row.iter().map(format_cell));
    }
    table
}

/// Format a cell for display.
fn format_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        CellValue::Float(f) => format!("{f:.4}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string(),
        other => other.as_str(),
    }
}
