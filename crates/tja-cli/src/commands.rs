use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span};

use tja_cli::pipeline::{InputFormat, analyze_file, load_config};
use tja_output::{OutputFormat, output_stem, write_outputs};

use crate::cli::{AnalyzeArgs, InputFormatArg, OutputFormatArg, SectionsArgs};
use crate::summary::apply_table_style;
use crate::types::{AnalyzeResult, TableSummary};

pub fn run_sections(args: &SectionsArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut table = Table::new();
    table.set_header(vec!["Element", "Table", "Layout"]);
    apply_table_style(&mut table);
    for section in &config.sections {
        let layout = serde_json::to_value(section.kind)
            .ok()
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default();
        table.add_row(vec![section.element.clone(), section.table.clone(), layout]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_analyze(args: &AnalyzeArgs) -> Result<AnalyzeResult> {
    let input = &args.input;
    let span = info_span!("analyze", input = %input.display());
    let _guard = span.enter();
    let start = Instant::now();

    let config = load_config(args.config.as_deref())?;
    let input_format = match args.input_format {
        InputFormatArg::Auto => InputFormat::detect(input),
        InputFormatArg::Json => InputFormat::Json,
        InputFormatArg::Xml => InputFormat::Xml,
    };
    let tables = analyze_file(input, input_format, &config)?;

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(input));
    let formats = format_outputs(args.format);
    let written = if args.dry_run {
        info!("dry run, no outputs written");
        Vec::new()
    } else {
        let stem = output_stem(input);
        write_outputs(&tables, &output_dir, &stem, &formats)
            .with_context(|| format!("write outputs to {}", output_dir.display()))?
    };

    let summaries = tables
        .iter()
        .map(|table| TableSummary {
            name: table.name().to_string(),
            rows: table.row_count(),
            columns: table.column_count(),
        })
        .collect();
    info!(
        table_count = tables.len(),
        file_count = written.len(),
        duration_ms = start.elapsed().as_millis(),
        "analysis complete"
    );
    Ok(AnalyzeResult {
        input: input.clone(),
        output_dir,
        formats,
        tables: summaries,
        written,
        dry_run: args.dry_run,
    })
}

fn default_output_dir(input: &Path) -> std::path::PathBuf {
    input
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| Path::new(".").to_path_buf(), Path::to_path_buf)
}

fn format_outputs(format: OutputFormatArg) -> Vec<OutputFormat> {
    match format {
        OutputFormatArg::Csv => vec![OutputFormat::Csv],
        OutputFormatArg::Spreadsheet => vec![OutputFormat::Spreadsheet],
        OutputFormatArg::Sqlite => vec![OutputFormat::Sqlite],
        OutputFormatArg::All => OutputFormat::ALL.to_vec(),
    }
}
