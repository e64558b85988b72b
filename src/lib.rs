//! Climate risk scoring engine ("ClimaScore") for agricultural lending.
//!
//! Fetches daily climate observations from independent providers, reduces
//! them to drought/flood/heat risk, derives a 0–100 score with recommended
//! loan terms, reconciles providers against each other and caches results.
//!
//! Module layout follows the Explicit Module Boundary Pattern (EMBP): each
//! module exposes a small surface through this gateway and siblings reach
//! each other through `crate::` re-exports.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod providers;
pub mod risk;
pub mod routes;
pub mod scoring;

pub use cache::{MemoryCache, ResultCache};
pub use config::Config;
pub use engine::ClimateEngine;
pub use error::{ApiError, ProviderError};
pub use models::{ClimaRequest, ClimaScoreResult, ComparisonResult, SourceOutcome};
pub use providers::{Adapter, DateWindow, Source};
