#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for analytics-pull
//!
//! This library pulls daily reports from a web-analytics reporting API on a schedule
//! and turns every report row into flat records for downstream ingestion.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`report`]: Queries, responses, the HTTP client, and page-at-a-time fetching
//! - [`transform`]: Value normalization, row classification, and fan-out into records
//! - [`emit`]: Mapping records to the host shape and pushing them to an output queue
//! - [`scheduler`]: The per-report loop over dates, pages, and intervals

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

pub mod emit;
pub mod report;
pub mod scheduler;
pub mod transform;

pub use crate::commands::{Host, run};
