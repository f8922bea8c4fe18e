//! Cohort report types with JSON persistence and markdown rendering.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::statistics::{
    dimension_distributions, flatten_dimensions, grouped_distributions, histogram, percentile_rank,
    summarize, CohortSummary, DimensionDistribution, DistributionSummary, HistogramBin,
};
use crate::store::ScoredRecord;

/// What to include when building a `CohortReport`.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Respondent fields to break total scores down by.
    pub group_fields: Vec<String>,
    /// A total score to place within the cohort.
    pub current_score: Option<f64>,
    /// Bins for the population histogram shown with the current score.
    pub histogram_bins: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            group_fields: Vec::new(),
            current_score: None,
            histogram_bins: 20,
        }
    }
}

/// Total-score distributions for each value of one respondent field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupBreakdown {
    pub field: String,
    pub groups: BTreeMap<String, DistributionSummary>,
}

/// Where one score sits within the cohort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortPosition {
    pub score: f64,
    /// Percentage of the cohort at or below `score`.
    pub percentile: f64,
    pub histogram: Vec<HistogramBin>,
}

/// A complete cohort report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortReport {
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub summary: CohortSummary,
    pub dimensions: Vec<DimensionDistribution>,
    pub groups: Vec<GroupBreakdown>,
    #[serde(default)]
    pub position: Option<CohortPosition>,
}

impl CohortReport {
    /// Reduce the stored records into a report.
    pub fn build(
        records: &[ScoredRecord],
        options: &ReportOptions,
    ) -> Result<Self, AnalyticsError> {
        let summary = summarize(records)?;
        let dimensions = dimension_distributions(&flatten_dimensions(records));

        let groups = options
            .group_fields
            .iter()
            .map(|field| GroupBreakdown {
                field: field.clone(),
                groups: grouped_distributions(records, field),
            })
            .filter(|g| !g.groups.is_empty())
            .collect();

        let position = match options.current_score {
            Some(score) => {
                let totals: Vec<f64> = records.iter().map(|r| r.total_score).collect();
                Some(CohortPosition {
                    score,
                    percentile: percentile_rank(records, score)?,
                    histogram: histogram(&totals, options.histogram_bins),
                })
            }
            None => None,
        };

        Ok(Self {
            created_at: Utc::now(),
            summary,
            dimensions,
            groups,
            position,
        })
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: CohortReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let s = &self.summary;
        let mut md = String::new();

        md.push_str(&format!(
            "**Cohort:** {} respondents, mean {:.2}, max {:.2}, min {:.2}\n\n",
            s.population, s.mean_total, s.max_total, s.min_total
        ));

        if let Some(pos) = &self.position {
            md.push_str(&format!(
                "**Your score:** {:.2} (at or above {:.1}% of respondents)\n\n",
                pos.score, pos.percentile
            ));
        }

        if !self.dimensions.is_empty() {
            md.push_str("### Score rate by dimension\n\n");
            md.push_str("| Dimension | Min | Q1 | Median | Q3 | Max | Mean |\n");
            md.push_str("|-----------|-----|----|--------|----|-----|------|\n");
            for d in &self.dimensions {
                let r = &d.rates;
                md.push_str(&format!(
                    "| {} | {:.1}% | {:.1}% | {:.1}% | {:.1}% | {:.1}% | {:.1}% |\n",
                    d.dimension, r.min, r.q1, r.median, r.q3, r.max, r.mean
                ));
            }
            md.push('\n');
        }

        for g in &self.groups {
            md.push_str(&format!("### Total score by {}\n\n", g.field));
            md.push_str("| Group | N | Median | Mean | Min | Max |\n");
            md.push_str("|-------|---|--------|------|-----|-----|\n");
            for (name, d) in &g.groups {
                md.push_str(&format!(
                    "| {} | {} | {:.2} | {:.2} | {:.2} | {:.2} |\n",
                    name, d.count, d.median, d.mean, d.min, d.max
                ));
            }
            md.push('\n');
        }

        md
    }
}
