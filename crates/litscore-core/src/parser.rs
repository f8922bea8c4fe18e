//! TOML question bank and answer sheet parser.
//!
//! Loads question banks from TOML files and directories, validates them, and
//! reads respondent answer sheets.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{AnswerSet, DimensionSpec, QuestionBank, RespondentInfo};

/// The data-literacy bank bundled with litscore.
pub const BUILTIN_BANK_TOML: &str = include_str!("../banks/data-literacy.toml");

/// Weight sums further than this from 1.0 are reported by `validate_bank`.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Intermediate TOML structure for parsing question bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    dimensions: Vec<DimensionSpec>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank file: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank` (useful for testing).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let bank = QuestionBank::new(
        parsed.bank.id,
        parsed.bank.name,
        parsed.bank.description,
        parsed.dimensions,
    )
    .with_context(|| format!("invalid question bank: {}", source_path.display()))?;

    Ok(bank)
}

/// The bundled data-literacy bank.
pub fn builtin_bank() -> Result<QuestionBank> {
    parse_bank_str(BUILTIN_BANK_TOML, Path::new("<builtin>"))
}

/// Load the bank at `path`, or the bundled bank when no path is given.
pub fn load_bank(path: Option<&Path>) -> Result<QuestionBank> {
    match path {
        Some(p) => parse_bank(p),
        None => builtin_bank(),
    }
}

/// Recursively load all `.toml` question banks from a directory.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// A non-fatal finding from question bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The dimension code (if applicable).
    pub dimension: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a loaded bank for issues that do not prevent scoring.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let raw_sum = bank.raw_weight_sum();
    if (raw_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        warnings.push(ValidationWarning {
            dimension: None,
            message: format!("weights sum to {raw_sum:.4}, normalized to 1.0"),
        });
    }

    for dim in bank.dimensions() {
        let mut seen = HashSet::new();
        for (i, q) in dim.questions.iter().enumerate() {
            if q.text.trim().is_empty() {
                warnings.push(ValidationWarning {
                    dimension: Some(dim.code.clone()),
                    message: format!("question {} has empty text", i + 1),
                });
            } else if !seen.insert(q.text.trim()) {
                warnings.push(ValidationWarning {
                    dimension: Some(dim.code.clone()),
                    message: format!("duplicate question text: {}", q.text.trim()),
                });
            }
        }
    }

    warnings
}

/// A respondent's submission: metadata plus ratings keyed by dimension code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerSheet {
    #[serde(default)]
    pub respondent: RespondentInfo,
    #[serde(default)]
    pub answers: BTreeMap<String, Vec<u8>>,
}

impl AnswerSheet {
    /// Ratings in bank order.
    pub fn answer_set(&self, bank: &QuestionBank) -> Result<AnswerSet> {
        Ok(AnswerSet::from_codes(bank, &self.answers)?)
    }
}

/// Parse an answer sheet TOML file.
pub fn parse_answer_sheet(path: &Path) -> Result<AnswerSheet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer sheet: {}", path.display()))?;
    let sheet: AnswerSheet = toml::from_str(&content)
        .with_context(|| format!("failed to parse answer sheet: {}", path.display()))?;
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SMALL_BANK: &str = r#"
[bank]
id = "small"
name = "Small Bank"

[[dimensions]]
code = "A"
name = "A: First"
weight = 2.0

[[dimensions.questions]]
text = "first question"
max_score = 10.0

[[dimensions.questions]]
text = "second question"
max_score = 20.0

[[dimensions]]
code = "B"
name = "B: Second"
weight = 2.0

[[dimensions.questions]]
text = "third question"
max_score = 6.0
"#;

    #[test]
    fn parse_valid_bank() {
        let bank = parse_bank_str(SMALL_BANK, &PathBuf::from("small.toml")).unwrap();
        assert_eq!(bank.id(), "small");
        assert_eq!(bank.dimensions().len(), 2);
        assert_eq!(bank.dimensions()[0].questions.len(), 2);
        assert!((bank.dimensions()[1].weight - 0.5).abs() < 1e-12);
        assert_eq!(bank.description(), "");
    }

    #[test]
    fn builtin_bank_matches_catalog() {
        let bank = builtin_bank().unwrap();
        let counts: Vec<usize> = bank.dimensions().iter().map(|d| d.questions.len()).collect();
        assert_eq!(counts, vec![7, 7, 5, 4, 4, 3]);
        assert_eq!(bank.question_count(), 30);
        let sum: f64 = bank.dimensions().iter().map(|d| d.weight).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!((bank.dimensions()[0].max_score() - 33.5).abs() < 1e-9);
        assert!(validate_bank(&bank).is_empty());
    }

    #[test]
    fn validate_reports_unnormalized_weights() {
        let bank = parse_bank_str(SMALL_BANK, &PathBuf::from("small.toml")).unwrap();
        let warnings = validate_bank(&bank);
        assert!(warnings.iter().any(|w| w.message.contains("sum to 4.0000")));
    }

    #[test]
    fn validate_reports_duplicate_question() {
        let toml = r#"
[bank]
id = "dupes"
name = "Dupes"

[[dimensions]]
code = "A"
name = "A"
weight = 1.0

[[dimensions.questions]]
text = "same"
max_score = 1.0

[[dimensions.questions]]
text = "same"
max_score = 1.0
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("dupes.toml")).unwrap();
        let warnings = validate_bank(&bank);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].dimension.as_deref(), Some("A"));
    }

    #[test]
    fn parse_rejects_invalid_structure() {
        let toml = r#"
[bank]
id = "bad"
name = "Bad"

[[dimensions]]
code = "A"
name = "A"
weight = -1.0

[[dimensions.questions]]
text = "q"
max_score = 1.0
"#;
        let err = parse_bank_str(toml, &PathBuf::from("bad.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("non-positive weight"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_bank_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn load_directory_skips_invalid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("small.toml"), SMALL_BANK).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "nope = [").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let banks = load_bank_directory(dir.path()).unwrap();
        assert_eq!(banks.len(), 1);
        assert_eq!(banks[0].id(), "small");
    }

    #[test]
    fn answer_sheet_roundtrip_into_bank_order() {
        let bank = parse_bank_str(SMALL_BANK, &PathBuf::from("small.toml")).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.toml");
        std::fs::write(
            &path,
            r#"
[respondent]
major = "Engineering"
grade = "Year 2"

[answers]
B = [4]
A = [6, 1]
"#,
        )
        .unwrap();

        let sheet = parse_answer_sheet(&path).unwrap();
        assert_eq!(sheet.respondent.get("major").unwrap(), "Engineering");
        let set = sheet.answer_set(&bank).unwrap();
        assert_eq!(set.ratings, vec![vec![6, 1], vec![4]]);
    }
}
