//! Cohort statistics over stored records.
//!
//! Everything here reduces over the output of `RecordStore::load_all`. An
//! empty cohort is reported as `AnalyticsError::EmptyPopulation` rather than
//! a zero default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::store::ScoredRecord;

/// Population-level summary of total scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortSummary {
    /// Number of stored records.
    pub population: usize,
    pub mean_total: f64,
    pub min_total: f64,
    pub max_total: f64,
    /// Dimension names taken from the first record.
    pub dimension_names: Vec<String>,
    /// Mean score rate per dimension over records sharing the first
    /// record's dimension layout.
    pub mean_rates: Vec<f64>,
}

/// Compute count, mean, min and max of total scores plus mean rates.
pub fn summarize(records: &[ScoredRecord]) -> Result<CohortSummary, AnalyticsError> {
    let first = records.first().ok_or(AnalyticsError::EmptyPopulation)?;
    let totals: Vec<f64> = records.iter().map(|r| r.total_score).collect();

    let width = first.dimension_rates.len();
    let mut rate_sums = vec![0.0; width];
    let mut matching = 0usize;
    for r in records {
        if r.dimension_rates.len() != width {
            tracing::warn!(
                timestamp = %r.timestamp,
                "record has {} dimensions, expected {width}; excluded from mean rates",
                r.dimension_rates.len()
            );
            continue;
        }
        for (sum, rate) in rate_sums.iter_mut().zip(&r.dimension_rates) {
            *sum += rate;
        }
        matching += 1;
    }

    Ok(CohortSummary {
        population: records.len(),
        mean_total: mean(&totals),
        min_total: totals.iter().copied().fold(f64::INFINITY, f64::min),
        max_total: totals.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        dimension_names: first.dimension_names.clone(),
        mean_rates: rate_sums.into_iter().map(|s| s / matching as f64).collect(),
    })
}

/// Percentage of `totals` at or below `score`. Ties count toward the rank,
/// so the top scorer is always at 100.
pub fn percentile_of(totals: &[f64], score: f64) -> Result<f64, AnalyticsError> {
    if totals.is_empty() {
        return Err(AnalyticsError::EmptyPopulation);
    }
    let at_or_below = totals.iter().filter(|&&t| t <= score).count();
    Ok(at_or_below as f64 / totals.len() as f64 * 100.0)
}

/// Percentile rank of `score` among the cohort's total scores.
pub fn percentile_rank(records: &[ScoredRecord], score: f64) -> Result<f64, AnalyticsError> {
    let totals: Vec<f64> = records.iter().map(|r| r.total_score).collect();
    percentile_of(&totals, score)
}

/// One (dimension, score, rate) observation from the long-form table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionObservation {
    pub dimension: String,
    pub score: f64,
    pub rate: f64,
}

/// Flatten every record into one row per dimension, using each record's own
/// stored dimension names.
pub fn flatten_dimensions(records: &[ScoredRecord]) -> Vec<DimensionObservation> {
    records
        .iter()
        .flat_map(|r| {
            r.dimension_scores
                .iter()
                .zip(&r.dimension_rates)
                .enumerate()
                .map(|(i, (&score, &rate))| DimensionObservation {
                    dimension: r
                        .dimension_names
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| format!("#{}", i + 1)),
                    score,
                    rate,
                })
        })
        .collect()
}

/// Five-number summary plus mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

impl DistributionSummary {
    /// Summarize `values`; `None` when there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            count: sorted.len(),
            min: sorted[0],
            q1: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            q3: quantile_sorted(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
            mean: mean(&sorted),
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Quantile of pre-sorted, non-empty data with linear interpolation between
/// the closest ranks.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let pos = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Score and rate distributions for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionDistribution {
    pub dimension: String,
    pub scores: DistributionSummary,
    pub rates: DistributionSummary,
}

/// Per-dimension distributions from the long-form table, in first-seen order.
pub fn dimension_distributions(
    observations: &[DimensionObservation],
) -> Vec<DimensionDistribution> {
    let mut order: Vec<&str> = Vec::new();
    let mut columns: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for obs in observations {
        let entry = columns.entry(obs.dimension.as_str()).or_insert_with(|| {
            order.push(obs.dimension.as_str());
            (Vec::new(), Vec::new())
        });
        entry.0.push(obs.score);
        entry.1.push(obs.rate);
    }

    order
        .into_iter()
        .filter_map(|name| {
            let (scores, rates) = columns.get(name)?;
            Some(DimensionDistribution {
                dimension: name.to_string(),
                scores: DistributionSummary::from_values(scores)?,
                rates: DistributionSummary::from_values(rates)?,
            })
        })
        .collect()
}

/// Total scores grouped by the exact value of one respondent field. Records
/// without the field are left out.
pub fn group_totals(records: &[ScoredRecord], field: &str) -> BTreeMap<String, Vec<f64>> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for r in records {
        if let Some(value) = r.respondent.get(field) {
            groups.entry(value.clone()).or_default().push(r.total_score);
        }
    }
    groups
}

/// Distribution of total scores per group of `field`.
pub fn grouped_distributions(
    records: &[ScoredRecord],
    field: &str,
) -> BTreeMap<String, DistributionSummary> {
    group_totals(records, field)
        .into_iter()
        .filter_map(|(group, totals)| {
            DistributionSummary::from_values(&totals).map(|summary| (group, summary))
        })
        .collect()
}

/// One equal-width histogram bin; `upper` is exclusive except for the last bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram over the range of `values`. A degenerate range is
/// widened to ±0.5 around the single value.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins {
                hi
            } else {
                lo + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
