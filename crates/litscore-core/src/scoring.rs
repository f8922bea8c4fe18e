//! The scoring engine: answer set in, weighted scorecard out.
//!
//! A rating `r` on the 1..=6 scale earns `r × max_score / 6` points, so the
//! lowest rating still earns one sixth of a question's value. Dimension rates
//! are percentages of the dimension maximum; the total is the weighted sum of
//! dimension points and stays on the point scale.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{AnswerSet, QuestionBank, MAX_RATING, MIN_RATING};

/// One row of the per-question reporting view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub dimension: String,
    pub question: String,
    pub rating: u8,
    /// Earned points rounded to two decimals.
    pub points: f64,
    pub max_score: f64,
}

/// The scored outcome of one answer set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    /// Weighted sum of dimension scores.
    pub total_score: f64,
    /// Theoretical ceiling of `total_score` for the bank used.
    pub max_total: f64,
    /// Earned points per dimension, in bank order.
    pub dimension_scores: Vec<f64>,
    /// Earned points as a percentage of each dimension's maximum.
    pub dimension_rates: Vec<f64>,
    pub details: Vec<DetailRow>,
}

impl Scorecard {
    /// Total score as a percentage of the theoretical maximum.
    pub fn total_rate(&self) -> f64 {
        if self.max_total > 0.0 {
            self.total_score / self.max_total * 100.0
        } else {
            0.0
        }
    }
}

/// Pure scoring over a shared question bank.
#[derive(Debug, Clone)]
pub struct Scorer {
    bank: Arc<QuestionBank>,
}

impl Scorer {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self { bank }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Score one answer set. Fails before computing anything if any
    /// dimension's ratings do not match the bank.
    pub fn score(&self, answers: &AnswerSet) -> Result<Scorecard, ValidationError> {
        validate(&self.bank, answers)?;

        let dims = self.bank.dimensions();
        let mut dimension_scores = Vec::with_capacity(dims.len());
        let mut dimension_rates = Vec::with_capacity(dims.len());
        let mut details = Vec::with_capacity(self.bank.question_count());

        for (dim, ratings) in dims.iter().zip(&answers.ratings) {
            let mut earned = 0.0;
            for (q, &rating) in dim.questions.iter().zip(ratings) {
                let points = earned_points(rating, q.max_score);
                earned += points;
                details.push(DetailRow {
                    dimension: dim.name.clone(),
                    question: q.text.clone(),
                    rating,
                    points: round2(points),
                    max_score: q.max_score,
                });
            }
            dimension_scores.push(earned);
            dimension_rates.push(earned / dim.max_score() * 100.0);
        }

        let total_score = dims
            .iter()
            .zip(&dimension_scores)
            .map(|(d, s)| s * d.weight)
            .sum();

        Ok(Scorecard {
            total_score,
            max_total: self.bank.max_total(),
            dimension_scores,
            dimension_rates,
            details,
        })
    }
}

/// Check shape and range of an answer set against the bank.
pub fn validate(bank: &QuestionBank, answers: &AnswerSet) -> Result<(), ValidationError> {
    let dims = bank.dimensions();
    if answers.ratings.len() != dims.len() {
        return Err(ValidationError::DimensionCount {
            expected: dims.len(),
            actual: answers.ratings.len(),
        });
    }

    for (dim, ratings) in dims.iter().zip(&answers.ratings) {
        if ratings.len() != dim.questions.len() {
            return Err(ValidationError::CountMismatch {
                dimension: dim.code.clone(),
                expected: dim.questions.len(),
                actual: ratings.len(),
            });
        }
        if let Some((index, &rating)) = ratings
            .iter()
            .enumerate()
            .find(|(_, r)| !(MIN_RATING..=MAX_RATING).contains(*r))
        {
            return Err(ValidationError::RatingOutOfRange {
                dimension: dim.code.clone(),
                index,
                rating,
            });
        }
    }

    Ok(())
}

fn earned_points(rating: u8, max_score: f64) -> f64 {
    f64::from(rating) * max_score / f64::from(MAX_RATING)
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
