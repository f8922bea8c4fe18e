//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BUILTIN_BANK: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../litscore-core/banks/data-literacy.toml"
);

/// A command isolated from the caller's config files and environment.
fn litscore(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("litscore").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("RUST_LOG", "off")
        .env_remove("LITSCORE_STORE")
        .env_remove("LITSCORE_BANK");
    cmd
}

fn write_answers(dir: &Path, name: &str, major: &str, rating: u8) -> PathBuf {
    let row = |n: usize| vec![rating.to_string(); n].join(", ");
    let content = format!(
        r#"[respondent]
major = "{major}"
grade = "Year 1"

[answers]
C1 = [{}]
C2 = [{}]
C3 = [{}]
C4 = [{}]
C5 = [{}]
C6 = [{}]
"#,
        row(7),
        row(7),
        row(5),
        row(4),
        row(4),
        row(3)
    );
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    litscore(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Questionnaire scoring and cohort analytics",
        ));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    litscore(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("litscore"));
}

#[test]
fn validate_builtin_bank() {
    let dir = TempDir::new().unwrap();
    litscore(dir.path())
        .args(["validate", "--bank", BUILTIN_BANK])
        .assert()
        .success()
        .stdout(predicate::str::contains("6 dimensions, 30 questions"))
        .stdout(predicate::str::contains("All question banks valid"));
}

#[test]
fn validate_warns_on_unnormalized_weights() {
    let dir = TempDir::new().unwrap();
    let bank = dir.path().join("bank.toml");
    std::fs::write(
        &bank,
        r#"
[bank]
id = "raw"
name = "Raw Weights"

[[dimensions]]
code = "A"
name = "A"
weight = 3.0

[[dimensions.questions]]
text = "q"
max_score = 1.0
"#,
    )
    .unwrap();

    litscore(dir.path())
        .arg("validate")
        .arg("--bank")
        .arg(&bank)
        .assert()
        .success()
        .stdout(predicate::str::contains("weights sum to 3.0000"));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();
    litscore(dir.path())
        .args(["validate", "--bank", "nonexistent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    litscore(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created litscore.toml"))
        .stdout(predicate::str::contains(
            "Created question-banks/data-literacy.toml",
        ));

    assert!(dir.path().join("litscore.toml").exists());
    assert!(dir.path().join("question-banks/data-literacy.toml").exists());
    assert!(dir.path().join("answers.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();
    litscore(dir.path()).arg("init").assert().success();
    litscore(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_then_submit_uses_generated_files() {
    let dir = TempDir::new().unwrap();
    litscore(dir.path()).arg("init").assert().success();

    litscore(dir.path())
        .args(["submit", "--answers", "answers.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved at"));

    assert!(dir.path().join("litscore-data/records.json").exists());
}

#[test]
fn weights_table() {
    let dir = TempDir::new().unwrap();
    litscore(dir.path())
        .arg("weights")
        .assert()
        .success()
        .stdout(predicate::str::contains("C6: Data Ethics"))
        .stdout(predicate::str::contains("0.3339"))
        .stdout(predicate::str::contains("Maximum total score"));
}

#[test]
fn submit_scores_and_stores() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(dir.path(), "a.toml", "Arts", 6);
    let store = dir.path().join("records.json");

    litscore(dir.path())
        .arg("submit")
        .arg("--answers")
        .arg(&answers)
        .arg("--store")
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("(100.00%)"))
        .stdout(predicate::str::contains("100.0% of 1 respondents"));

    let records: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store).unwrap()).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["user_info"]["major"], "Arts");
    assert_eq!(records[0]["scores"].as_array().unwrap().len(), 6);
}

#[test]
fn submit_info_overrides_sheet() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(dir.path(), "a.toml", "Arts", 4);
    let store = dir.path().join("records.json");

    let json = stdout_json(
        litscore(dir.path())
            .arg("submit")
            .arg("--answers")
            .arg(&answers)
            .arg("--store")
            .arg(&store)
            .args(["--info", "major=Medicine", "--info", "data_exp=None"])
            .args(["--format", "json"]),
    );

    assert_eq!(json["record"]["user_info"]["major"], "Medicine");
    assert_eq!(json["record"]["user_info"]["data_exp"], "None");
    assert_eq!(json["population"], 1);
    assert_eq!(json["percentile"], 100.0);
}

#[test]
fn submit_incomplete_dimension_is_rejected() {
    let dir = TempDir::new().unwrap();
    let answers = dir.path().join("partial.toml");
    std::fs::write(
        &answers,
        r#"
[answers]
C1 = [3, 3, 3, 3, 3, 3, 3]
C2 = [3, 3, 3, 3, 3, 3, 3]
C3 = [3, 3]
C4 = [3, 3, 3, 3]
C5 = [3, 3, 3, 3]
C6 = [3, 3, 3]
"#,
    )
    .unwrap();
    let store = dir.path().join("records.json");

    litscore(dir.path())
        .arg("submit")
        .arg("--answers")
        .arg(&answers)
        .arg("--store")
        .arg(&store)
        .assert()
        .failure()
        .stderr(predicate::str::contains("dimension C3 is incomplete"));

    assert!(!store.exists());
}

#[test]
fn submit_dry_run_does_not_store() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(dir.path(), "a.toml", "Arts", 1);
    let store = dir.path().join("records.json");

    litscore(dir.path())
        .arg("submit")
        .arg("--answers")
        .arg(&answers)
        .arg("--store")
        .arg(&store)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("(16.67%)"))
        .stdout(predicate::str::contains("no data yet"))
        .stdout(predicate::str::contains("Dry run"));

    assert!(!store.exists());
}

#[test]
fn single_dimension_bank_end_to_end() {
    let dir = TempDir::new().unwrap();
    let bank = dir.path().join("bank.toml");
    std::fs::write(
        &bank,
        r#"
[bank]
id = "tiny"
name = "Tiny"

[[dimensions]]
code = "D"
name = "D: Only"
weight = 1.0

[[dimensions.questions]]
text = "first"
max_score = 10.0

[[dimensions.questions]]
text = "second"
max_score = 20.0
"#,
    )
    .unwrap();
    let store = dir.path().join("records.json");

    for (name, ratings, expected_total) in [("hi.toml", "[6, 6]", 30.0), ("lo.toml", "[1, 1]", 5.0)] {
        let answers = dir.path().join(name);
        std::fs::write(&answers, format!("[answers]\nD = {ratings}\n")).unwrap();

        let json = stdout_json(
            litscore(dir.path())
                .arg("submit")
                .arg("--bank")
                .arg(&bank)
                .arg("--answers")
                .arg(&answers)
                .arg("--store")
                .arg(&store)
                .args(["--format", "json"]),
        );
        let total = json["scorecard"]["total_score"].as_f64().unwrap();
        assert!((total - expected_total).abs() < 1e-9);
        assert_eq!(json["record"]["dimension_names"][0], "D: Only");
    }
}

#[test]
fn stats_on_empty_store() {
    let dir = TempDir::new().unwrap();
    litscore(dir.path())
        .arg("stats")
        .arg("--store")
        .arg(dir.path().join("records.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No data"));
}

#[test]
fn stats_on_corrupt_store_fails() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("records.json");
    std::fs::write(&store, "{not json").unwrap();
    litscore(dir.path())
        .arg("stats")
        .arg("--store")
        .arg(&store)
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt"));
}

#[test]
fn stats_percentile_over_stored_totals() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("records.json");
    let record = |total: f64, major: &str| {
        format!(
            r#"{{"timestamp": "2025-01-01 10:00:00", "user_info": {{"major": "{major}"}},
                "scores": [{total}], "score_rates": [50.0], "total_score": {total},
                "dimension_names": ["C1"]}}"#
        )
    };
    std::fs::write(
        &store,
        format!(
            "[{}, {}, {}]",
            record(10.0, "Arts"),
            record(20.0, "Arts"),
            record(30.0, "Science")
        ),
    )
    .unwrap();

    let percentile_for = |score: &str| -> f64 {
        let json = stdout_json(
            litscore(dir.path())
                .arg("stats")
                .arg("--store")
                .arg(&store)
                .args(["--score", score, "--format", "json"]),
        );
        json["position"]["percentile"].as_f64().unwrap()
    };

    assert!((percentile_for("20") - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(percentile_for("30"), 100.0);
    assert_eq!(percentile_for("5"), 0.0);
}

#[test]
fn stats_groups_and_markdown() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("records.json");

    for (i, (major, rating)) in [("Arts", 2u8), ("Arts", 4), ("Science", 6)].iter().enumerate() {
        let answers = write_answers(dir.path(), &format!("a{i}.toml"), major, *rating);
        litscore(dir.path())
            .arg("submit")
            .arg("--answers")
            .arg(&answers)
            .arg("--store")
            .arg(&store)
            .assert()
            .success();
    }

    litscore(dir.path())
        .arg("stats")
        .arg("--store")
        .arg(&store)
        .args(["--group-by", "major", "--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 respondents"))
        .stdout(predicate::str::contains("Total score by major"))
        .stdout(predicate::str::contains("| Arts | 2 |"))
        .stdout(predicate::str::contains("C3: Data Storage & Verification"));

    let report = dir.path().join("out").join("report.json");
    litscore(dir.path())
        .arg("stats")
        .arg("--store")
        .arg(&store)
        .arg("--output")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Respondents: 3"));
    assert!(report.exists());

    // The saved report renders without the store.
    std::fs::remove_file(&store).unwrap();
    litscore(dir.path())
        .arg("stats")
        .arg("--input")
        .arg(&report)
        .args(["--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 respondents"))
        .stdout(predicate::str::contains("Total score by major"));
}

#[test]
fn stats_input_rejects_store_options() {
    let dir = TempDir::new().unwrap();
    litscore(dir.path())
        .args(["stats", "--input", "report.json", "--score", "10"])
        .assert()
        .failure();
}

#[test]
fn stats_input_missing_report_fails() {
    let dir = TempDir::new().unwrap();
    litscore(dir.path())
        .args(["stats", "--input", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read report"));
}
