//! ClimaScore engine: wires adapters, summarizer, deriver and cache.
//!
//! Two entrypoints live in sibling modules:
//! - `orchestrator`: one source, fail-open ([`ClimateEngine::compute_clima_score`])
//! - `comparator`: every source side by side ([`ClimateEngine::compare_clima_scores`])

use std::sync::Arc;

use crate::cache::{MemoryCache, ResultCache};
use crate::error::ProviderError;
use crate::models::{ClimaRequest, DailySeries, LoanTerms, RiskBreakdown, ScoreDebug};
use crate::providers::{self, Adapter, DateWindow, Source};
use crate::risk;
use crate::scoring::{self, LoanPolicy};
use crate::Config;

mod comparator;
mod orchestrator;

#[cfg(test)]
mod testing;

pub use comparator::{suggest_pair, PairBasis, SuggestedPair};

// ---

/// Output of one provider's fetch → summarize → derive pipeline.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SourceAssessment {
    // ---
    pub climascore: u8,
    pub risk_breakdown: RiskBreakdown,
    pub loan_terms: LoanTerms,
    pub debug: ScoreDebug,
}

pub struct ClimateEngine {
    adapters: Vec<Arc<dyn Adapter>>,
    cache: Arc<dyn ResultCache>,
    loan_policy: LoanPolicy,
}

impl ClimateEngine {
    // ---
    pub fn new(adapters: Vec<Arc<dyn Adapter>>, cache: Arc<dyn ResultCache>) -> Self {
        Self {
            adapters,
            cache,
            loan_policy: LoanPolicy::default(),
        }
    }

    pub fn with_loan_policy(mut self, loan_policy: LoanPolicy) -> Self {
        self.loan_policy = loan_policy;
        self
    }

    /// Engine with every known provider and an in-memory cache, as configured.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        // ---
        let adapters = providers::default_adapters(config)?;
        let cache = Arc::new(MemoryCache::new(config.cache_ttl));
        let loan_policy = LoanPolicy {
            base_amount: config.loan_base_amount,
            ..LoanPolicy::default()
        };

        Ok(Self::new(adapters, cache).with_loan_policy(loan_policy))
    }

    pub fn sources(&self) -> Vec<Source> {
        self.adapters.iter().map(|a| a.source()).collect()
    }

    fn adapter(&self, source: Source) -> Result<&Arc<dyn Adapter>, ProviderError> {
        // ---
        self.adapters
            .iter()
            .find(|a| a.source() == source)
            .ok_or(ProviderError::Unavailable { provider: source })
    }

    /// Summarize and derive an already fetched series.
    fn assess_series(
        &self,
        source: Source,
        series: &DailySeries,
        request: &ClimaRequest,
    ) -> Result<SourceAssessment, ProviderError> {
        // ---
        let summary = risk::summarize(source, series)?;
        let assessment = scoring::assess(&summary.scores, &request.crop, &self.loan_policy);

        Ok(SourceAssessment {
            climascore: assessment.climascore,
            risk_breakdown: summary.scores.breakdown(),
            loan_terms: assessment.loan_terms,
            debug: ScoreDebug::from(summary.stats),
        })
    }

    /// Full pipeline for one adapter over an optional explicit window.
    async fn assess_source(
        &self,
        adapter: &dyn Adapter,
        request: &ClimaRequest,
        window: Option<DateWindow>,
    ) -> Result<SourceAssessment, ProviderError> {
        // ---
        let series = adapter.fetch(request.coordinates(), window).await?;
        self.assess_series(adapter.source(), &series, request)
    }
}
