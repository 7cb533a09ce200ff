//! Report retrieval from the remote reporting API
//!
//! This module owns everything between a configured query and a parsed response:
//! the query model and its wire parameters, the response model, the HTTP client,
//! the credential seam, and the page-at-a-time [`Fetcher`].
//!
//! # Implementation Model
//!
//! Clients are obtained from a [`CredentialProvider`] at the start of each pass.
//! The [`Fetcher`] issues one request per call and hands back an explicit
//! [`PageToken`] when more pages remain; following the token is the caller's job.
//! All failures are expressed as [`ReportError`] so the scheduler can decide whether
//! to skip a date or abort the pass.

pub mod client;
mod credentials;
mod error;
mod fetcher;
mod query;
mod response;

pub use client::{HttpReportClient, ReportApiClient};
pub use credentials::{CredentialProvider, StaticTokenProvider};
pub use error::ReportError;
pub use fetcher::Fetcher;
pub use query::{MAX_DIMENSIONS, MAX_METRICS, MAX_PAGE_SIZE, PageToken, ReportQuery, ReportRequest, SamplingLevel};
pub use response::{ColumnHeader, ReportResponse};
