//! Core data model types for litscore.
//!
//! The question bank is built once, validated, and shared immutably (usually
//! behind an `Arc`) by the scoring engine and the record store.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{BankError, ValidationError};

/// Lowest rating on the answer scale.
pub const MIN_RATING: u8 = 1;
/// Highest rating on the answer scale; earns a question's full `max_score`.
pub const MAX_RATING: u8 = 6;

/// Free-form respondent metadata (grade, major, experience, ...).
pub type RespondentInfo = BTreeMap<String, String>;

/// One question within a dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Question text shown to the respondent.
    pub text: String,
    /// Points awarded for the highest rating.
    pub max_score: f64,
}

/// A dimension as written in configuration, before weight normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSpec {
    pub code: String,
    pub name: String,
    pub weight: f64,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// A validated dimension with its normalized weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Short code (e.g. "C1").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Weight as configured.
    pub raw_weight: f64,
    /// Weight divided by the sum of all raw weights.
    pub weight: f64,
    /// Questions in presentation order.
    pub questions: Vec<Question>,
}

impl Dimension {
    /// Sum of `max_score` over the dimension's questions.
    pub fn max_score(&self) -> f64 {
        self.questions.iter().map(|q| q.max_score).sum()
    }
}

/// The fixed, ordered catalog of dimensions and questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionBank {
    id: String,
    name: String,
    description: String,
    dimensions: Vec<Dimension>,
}

impl QuestionBank {
    /// Validate the dimension specs and normalize their weights to sum to 1.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        specs: Vec<DimensionSpec>,
    ) -> Result<Self, BankError> {
        if specs.is_empty() {
            return Err(BankError::Empty);
        }

        let mut seen = HashSet::new();
        for spec in &specs {
            if !seen.insert(spec.code.as_str()) {
                return Err(BankError::DuplicateDimension(spec.code.clone()));
            }
            if !(spec.weight.is_finite() && spec.weight > 0.0) {
                return Err(BankError::NonPositiveWeight {
                    code: spec.code.clone(),
                    weight: spec.weight,
                });
            }
            if spec.questions.is_empty() {
                return Err(BankError::NoQuestions(spec.code.clone()));
            }
            for (index, q) in spec.questions.iter().enumerate() {
                if !(q.max_score.is_finite() && q.max_score > 0.0) {
                    return Err(BankError::NonPositiveMaxScore {
                        code: spec.code.clone(),
                        index,
                        max_score: q.max_score,
                    });
                }
            }
        }

        let raw_sum: f64 = specs.iter().map(|s| s.weight).sum();
        let dimensions = specs
            .into_iter()
            .map(|s| Dimension {
                weight: s.weight / raw_sum,
                raw_weight: s.weight,
                code: s.code,
                name: s.name,
                questions: s.questions,
            })
            .collect();

        Ok(Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            dimensions,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension(&self, code: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.code == code)
    }

    /// Dimension names in bank order, as copied into every stored record.
    pub fn dimension_names(&self) -> Vec<String> {
        self.dimensions.iter().map(|d| d.name.clone()).collect()
    }

    pub fn question_count(&self) -> usize {
        self.dimensions.iter().map(|d| d.questions.len()).sum()
    }

    /// Sum of the raw weights before normalization.
    pub fn raw_weight_sum(&self) -> f64 {
        self.dimensions.iter().map(|d| d.raw_weight).sum()
    }

    /// Theoretical maximum total score: Σ weight × dimension max.
    pub fn max_total(&self) -> f64 {
        self.dimensions
            .iter()
            .map(|d| d.max_score() * d.weight)
            .sum()
    }
}

/// One respondent's ratings, grouped by dimension in bank order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerSet {
    pub ratings: Vec<Vec<u8>>,
}

impl AnswerSet {
    pub fn new(ratings: Vec<Vec<u8>>) -> Self {
        Self { ratings }
    }

    /// Order answers keyed by dimension code into bank order.
    ///
    /// A dimension missing from `by_code` is reported as answered with zero
    /// ratings; codes the bank does not know are rejected.
    pub fn from_codes(
        bank: &QuestionBank,
        by_code: &BTreeMap<String, Vec<u8>>,
    ) -> Result<Self, ValidationError> {
        if let Some(unknown) = by_code.keys().find(|c| bank.dimension(c).is_none()) {
            return Err(ValidationError::UnknownDimension(unknown.clone()));
        }

        let mut ratings = Vec::with_capacity(bank.dimensions().len());
        for dim in bank.dimensions() {
            match by_code.get(&dim.code) {
                Some(r) => ratings.push(r.clone()),
                None => {
                    return Err(ValidationError::CountMismatch {
                        dimension: dim.code.clone(),
                        expected: dim.questions.len(),
                        actual: 0,
                    })
                }
            }
        }
        Ok(Self { ratings })
    }
}
