//! The `litscore init` command.

use std::path::Path;

use anyhow::Result;

use litscore_core::parser::BUILTIN_BANK_TOML;

pub fn execute() -> Result<()> {
    if Path::new("litscore.toml").exists() {
        println!("litscore.toml already exists, skipping.");
    } else {
        std::fs::write("litscore.toml", SAMPLE_CONFIG)?;
        println!("Created litscore.toml");
    }

    std::fs::create_dir_all("question-banks")?;
    let bank_path = Path::new("question-banks/data-literacy.toml");
    if bank_path.exists() {
        println!("question-banks/data-literacy.toml already exists, skipping.");
    } else {
        std::fs::write(bank_path, BUILTIN_BANK_TOML)?;
        println!("Created question-banks/data-literacy.toml");
    }

    let answers_path = Path::new("answers.toml");
    if answers_path.exists() {
        println!("answers.toml already exists, skipping.");
    } else {
        std::fs::write(answers_path, EXAMPLE_ANSWERS)?;
        println!("Created answers.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: litscore validate --bank question-banks/data-literacy.toml");
    println!("  2. Edit answers.toml with your ratings (1-6)");
    println!("  3. Run: litscore submit --answers answers.toml");
    println!("  4. Run: litscore stats");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# litscore configuration

bank = "question-banks/data-literacy.toml"
store_path = "./litscore-data/records.json"
histogram_bins = 20
group_fields = ["major", "grade", "data_exp"]
"#;

const EXAMPLE_ANSWERS: &str = r#"# One rating per question, 1 (lowest) to 6 (highest), in question order.

[respondent]
grade = "Year 2"
major = "Science & Engineering"
data_exp = "Some coursework"

[answers]
C1 = [3, 3, 3, 3, 3, 3, 3]
C2 = [3, 3, 3, 3, 3, 3, 3]
C3 = [3, 3, 3, 3, 3]
C4 = [3, 3, 3, 3]
C5 = [3, 3, 3, 3]
C6 = [3, 3, 3]
"#;
