//! litscore-core — question bank, scoring engine, record store and cohort
//! analytics.
//!
//! Raw answers flow through the [`scoring::Scorer`] into a
//! [`scoring::Scorecard`], are appended to a [`store::RecordStore`], and are
//! later reduced by [`statistics`] into cohort-level summaries.

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod statistics;
pub mod store;
