//! The `litscore submit` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use serde::Serialize;

use litscore_core::model::QuestionBank;
use litscore_core::parser::parse_answer_sheet;
use litscore_core::scoring::{Scorecard, Scorer};
use litscore_core::statistics::percentile_rank;
use litscore_core::store::{JsonFileStore, RecordStore, ScoredRecord};

#[derive(Serialize)]
struct SubmitOutput<'a> {
    scorecard: &'a Scorecard,
    record: Option<&'a ScoredRecord>,
    population: usize,
    percentile: Option<f64>,
}

pub fn execute(
    answers_path: PathBuf,
    info: Vec<(String, String)>,
    bank_path: Option<PathBuf>,
    store_path: Option<PathBuf>,
    dry_run: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, bank) = super::load_context(config_path.as_deref(), bank_path)?;

    let sheet = parse_answer_sheet(&answers_path)?;
    let mut respondent = sheet.respondent.clone();
    respondent.extend(info);

    // Validation happens before anything touches the store.
    let answers = sheet.answer_set(&bank)?;
    let card = Scorer::new(bank.clone()).score(&answers)?;

    let store = JsonFileStore::new(store_path.unwrap_or(config.store_path), bank.clone());
    let record = if dry_run {
        None
    } else {
        Some(store.append_scorecard(respondent, &card)?)
    };

    let cohort = store.load_all()?;
    let percentile = percentile_rank(&cohort, card.total_score).ok();

    match format.as_str() {
        "json" => {
            let output = SubmitOutput {
                scorecard: &card,
                record: record.as_ref(),
                population: cohort.len(),
                percentile,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            print_scorecard(&bank, &card);
            match percentile {
                Some(p) => println!(
                    "\nCohort position: {p:.1}% of {} respondents score at or below you",
                    cohort.len()
                ),
                None => println!("\nCohort position: no data yet"),
            }
            if let Some(r) = &record {
                println!("Saved at {} to {}", r.timestamp, store.path().display());
            } else {
                println!("Dry run: nothing saved.");
            }
        }
    }

    Ok(())
}

fn print_scorecard(bank: &QuestionBank, card: &Scorecard) {
    println!(
        "Total score: {:.2} / {:.2} ({:.2}%)",
        card.total_score,
        card.max_total,
        card.total_rate()
    );

    let mut table = Table::new();
    table.set_header(vec!["Dimension", "Score", "Rate"]);
    for ((dim, score), rate) in bank
        .dimensions()
        .iter()
        .zip(&card.dimension_scores)
        .zip(&card.dimension_rates)
    {
        table.add_row(vec![
            Cell::new(&dim.name),
            Cell::new(format!("{score:.2}")),
            Cell::new(format!("{rate:.2}%")),
        ]);
    }
    println!("{table}");

    let mut details = Table::new();
    details.set_header(vec!["Dimension", "Question", "Rating", "Points", "Max"]);
    for row in &card.details {
        details.add_row(vec![
            Cell::new(&row.dimension),
            Cell::new(&row.question),
            Cell::new(row.rating),
            Cell::new(format!("{:.2}", row.points)),
            Cell::new(row.max_score),
        ]);
    }
    println!("{details}");
}
