//! Append-only persistence of scored records.
//!
//! `JsonFileStore` keeps every record in one pretty-printed JSON array. Each
//! append reads the whole array, adds one record, and replaces the file
//! atomically (temp file in the same directory, then rename), so a reader
//! never sees a partially written store.
//!
//! Appends are serialized by an in-process mutex keyed on the absolute store
//! path, so every `JsonFileStore` handle on the same file within one process
//! shares it. Separate processes appending to the same file are not
//! coordinated: two concurrent read-modify-write cycles can each write a valid
//! array, and the later rename drops the other's record.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{QuestionBank, RespondentInfo};
use crate::scoring::Scorecard;

/// Format of `ScoredRecord::timestamp` (local time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One respondent's persisted submission. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub timestamp: String,
    #[serde(rename = "user_info", default)]
    pub respondent: RespondentInfo,
    #[serde(rename = "scores")]
    pub dimension_scores: Vec<f64>,
    #[serde(rename = "score_rates")]
    pub dimension_rates: Vec<f64>,
    pub total_score: f64,
    /// Dimension names as they were when the record was written.
    #[serde(default)]
    pub dimension_names: Vec<String>,
}

/// Durable, append-only collection of scored records.
pub trait RecordStore {
    /// Persist a new record stamped with the current time and the live
    /// dimension names, and return it.
    fn append(
        &self,
        respondent: RespondentInfo,
        dimension_scores: Vec<f64>,
        dimension_rates: Vec<f64>,
        total_score: f64,
    ) -> Result<ScoredRecord, StoreError>;

    /// Every record appended so far, oldest first.
    fn load_all(&self) -> Result<Vec<ScoredRecord>, StoreError>;

    /// Append the parts of a scorecard.
    fn append_scorecard(
        &self,
        respondent: RespondentInfo,
        card: &Scorecard,
    ) -> Result<ScoredRecord, StoreError> {
        self.append(
            respondent,
            card.dimension_scores.clone(),
            card.dimension_rates.clone(),
            card.total_score,
        )
    }
}

fn build_record(
    bank: &QuestionBank,
    respondent: RespondentInfo,
    dimension_scores: Vec<f64>,
    dimension_rates: Vec<f64>,
    total_score: f64,
) -> Result<ScoredRecord, StoreError> {
    let expected = bank.dimensions().len();
    for actual in [dimension_scores.len(), dimension_rates.len()] {
        if actual != expected {
            return Err(StoreError::ShapeMismatch { expected, actual });
        }
    }
    for (field, values) in [
        ("scores", dimension_scores.as_slice()),
        ("score_rates", dimension_rates.as_slice()),
        ("total_score", std::slice::from_ref(&total_score)),
    ] {
        if !values.iter().all(|v| v.is_finite()) {
            return Err(StoreError::NonFinite { field });
        }
    }

    Ok(ScoredRecord {
        timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        respondent,
        dimension_scores,
        dimension_rates,
        total_score,
        dimension_names: bank.dimension_names(),
    })
}

/// The append lock shared by every handle on `path` in this process.
fn path_lock(path: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();
    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    // The map only ever grows, so a poisoned guard is still consistent.
    let mut locks = LOCKS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(key).or_default())
}

/// Record store backed by a single JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    bank: Arc<QuestionBank>,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, bank: Arc<QuestionBank>) -> Self {
        let path = path.into();
        Self {
            write_lock: path_lock(&path),
            path,
            bank,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_records(&self) -> Result<Vec<ScoredRecord>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("record store {} absent", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_err(e)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write_records(&self, records: &[ScoredRecord]) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;

        let json = serde_json::to_string_pretty(records)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.io_err(e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| self.io_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn append(
        &self,
        respondent: RespondentInfo,
        dimension_scores: Vec<f64>,
        dimension_rates: Vec<f64>,
        total_score: f64,
    ) -> Result<ScoredRecord, StoreError> {
        let record = build_record(
            &self.bank,
            respondent,
            dimension_scores,
            dimension_rates,
            total_score,
        )?;

        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut records = self.read_records()?;
        records.push(record.clone());
        self.write_records(&records)?;

        tracing::info!(
            total_score = record.total_score,
            population = records.len(),
            "appended record to {}",
            self.path.display()
        );
        Ok(record)
    }

    fn load_all(&self) -> Result<Vec<ScoredRecord>, StoreError> {
        let records = self.read_records()?;
        tracing::debug!(count = records.len(), "loaded records");
        Ok(records)
    }
}

/// Record store held in memory, for tests and embedding.
#[derive(Debug)]
pub struct MemoryStore {
    bank: Arc<QuestionBank>,
    records: Mutex<Vec<ScoredRecord>>,
}

impl MemoryStore {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self {
            bank,
            records: Mutex::new(Vec::new()),
        }
    }
}

impl RecordStore for MemoryStore {
    fn append(
        &self,
        respondent: RespondentInfo,
        dimension_scores: Vec<f64>,
        dimension_rates: Vec<f64>,
        total_score: f64,
    ) -> Result<ScoredRecord, StoreError> {
        let record = build_record(
            &self.bank,
            respondent,
            dimension_scores,
            dimension_rates,
            total_score,
        )?;
        self.records
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .push(record.clone());
        Ok(record)
    }

    fn load_all(&self) -> Result<Vec<ScoredRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .clone())
    }
}
