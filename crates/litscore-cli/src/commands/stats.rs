//! The `litscore stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use litscore_core::error::AnalyticsError;
use litscore_core::report::{CohortReport, ReportOptions};
use litscore_core::store::{JsonFileStore, RecordStore};

pub fn execute(
    group_by: Vec<String>,
    score: Option<f64>,
    store_path: Option<PathBuf>,
    format: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, bank) = super::load_context(config_path.as_deref(), None)?;
    let store = JsonFileStore::new(store_path.unwrap_or(config.store_path), bank);
    let records = store.load_all()?;

    let options = ReportOptions {
        group_fields: if group_by.is_empty() {
            config.group_fields
        } else {
            group_by
        },
        current_score: score,
        histogram_bins: config.histogram_bins,
    };

    let report = match CohortReport::build(&records, &options) {
        Ok(report) => report,
        Err(AnalyticsError::EmptyPopulation) => {
            println!("No data: no records in {}", store.path().display());
            return Ok(());
        }
    };

    if let Some(path) = &output {
        report.save_json(path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    print_report(&report, &format)
}

/// Render a report saved earlier with `--output`.
pub fn render_saved(input: PathBuf, format: String) -> Result<()> {
    let report = CohortReport::load_json(&input)?;
    tracing::debug!(created_at = %report.created_at, "loaded saved report");
    print_report(&report, &format)
}

fn print_report(report: &CohortReport, format: &str) -> Result<()> {
    match format {
        "markdown" | "md" => println!("{}", report.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(report)?),
        _ => print_text(report),
    }
    Ok(())
}

fn print_text(report: &CohortReport) {
    let s = &report.summary;
    println!("Respondents: {}", s.population);
    println!(
        "Total score: mean {:.2}, max {:.2}, min {:.2}",
        s.mean_total, s.max_total, s.min_total
    );

    let mut table = Table::new();
    table.set_header(vec!["Dimension", "Mean rate", "Q1", "Median", "Q3"]);
    for d in &report.dimensions {
        table.add_row(vec![
            Cell::new(&d.dimension),
            Cell::new(format!("{:.1}%", d.rates.mean)),
            Cell::new(format!("{:.1}%", d.rates.q1)),
            Cell::new(format!("{:.1}%", d.rates.median)),
            Cell::new(format!("{:.1}%", d.rates.q3)),
        ]);
    }
    println!("\n{table}");

    for g in &report.groups {
        let mut table = Table::new();
        table.set_header(vec![g.field.as_str(), "N", "Median", "Mean", "Min", "Max"]);
        for (name, d) in &g.groups {
            table.add_row(vec![
                Cell::new(name),
                Cell::new(d.count),
                Cell::new(format!("{:.2}", d.median)),
                Cell::new(format!("{:.2}", d.mean)),
                Cell::new(format!("{:.2}", d.min)),
                Cell::new(format!("{:.2}", d.max)),
            ]);
        }
        println!("\nBy {}:\n{table}", g.field);
    }

    if let Some(pos) = &report.position {
        println!(
            "\nScore {:.2} is at the {:.1} percentile",
            pos.score, pos.percentile
        );
        let peak = pos.histogram.iter().map(|b| b.count).max().unwrap_or(0).max(1);
        let last = pos.histogram.len().saturating_sub(1);
        for (i, bin) in pos.histogram.iter().enumerate() {
            let in_bin = pos.score >= bin.lower
                && (pos.score < bin.upper || (i == last && pos.score <= bin.upper));
            let marker = if in_bin { " <" } else { "" };
            println!(
                "  {:>8.2} - {:<8.2} {:<30} {}{marker}",
                bin.lower,
                bin.upper,
                "#".repeat(bin.count * 30 / peak),
                bin.count
            );
        }
    }
}
