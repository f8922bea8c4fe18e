//! The `litscore weights` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn execute(bank_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let (_, bank) = super::load_context(config_path.as_deref(), bank_path)?;

    let mut table = Table::new();
    table.set_header(vec![
        "Code",
        "Dimension",
        "Questions",
        "Raw weight",
        "Weight",
        "Max points",
        "Weighted max",
    ]);

    for d in bank.dimensions() {
        table.add_row(vec![
            Cell::new(&d.code),
            Cell::new(&d.name),
            Cell::new(d.questions.len()),
            Cell::new(format!("{:.4}", d.raw_weight)),
            Cell::new(format!("{:.4}", d.weight)),
            Cell::new(format!("{:.2}", d.max_score())),
            Cell::new(format!("{:.2}", d.max_score() * d.weight)),
        ]);
    }

    println!("{}", bank.name());
    println!("{table}");
    println!("Maximum total score: {:.2}", bank.max_total());

    Ok(())
}
