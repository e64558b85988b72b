//! Single-source scoring with a fail-open fallback.
//!
//! `compute_clima_score` never fails: provider errors, empty series and
//! timeouts all produce the degraded default result with `debug.error` set.

use tracing::{debug, info, warn};

use super::ClimateEngine;
use crate::cache::{single_key, CachedValue};
use crate::error::ProviderError;
use crate::models::{
    ClimaRequest, ClimaScoreResult, LoanTerms, RiskBand, RiskBreakdown, ScoreDebug,
};
use crate::providers::Source;

// ---

const FALLBACK_CLIMASCORE: u8 = 50;

const FALLBACK_LOAN_TERMS: LoanTerms = LoanTerms {
    amount: 500,
    interest_rate: 12.0,
    confidence: 0.5,
};

/// Degraded result returned whenever the single-source pipeline fails.
pub(crate) fn fallback_result(
    data_sources_used: Vec<String>,
    error: &ProviderError,
) -> ClimaScoreResult {
    // ---
    ClimaScoreResult {
        climascore: FALLBACK_CLIMASCORE,
        risk_breakdown: RiskBreakdown::uniform(RiskBand::Medium),
        recommended_loan_terms: FALLBACK_LOAN_TERMS,
        data_sources_used,
        debug: ScoreDebug {
            error: Some(error.to_string()),
            ..ScoreDebug::default()
        },
    }
}

impl ClimateEngine {
    // ---
    /// Score one location/crop from the requested source (default Open-Meteo).
    ///
    /// Cache hits are returned with `debug.cache_hit = true`. Only complete
    /// results are cached; fallbacks are not.
    pub async fn compute_clima_score(&self, request: &ClimaRequest) -> ClimaScoreResult {
        // ---
        let key = single_key(
            request.source.as_deref(),
            request.latitude,
            request.longitude,
            &request.crop,
        );

        if let Some(CachedValue::Single(mut cached)) = self.cache.get(&key) {
            debug!("Cache hit for {}", key);
            cached.debug.cache_hit = Some(true);
            return cached;
        }

        let source = Source::resolve(request.source.as_deref());
        info!("Scoring {} for {} via {}", request.crop, key, source);

        let mut data_sources_used = Vec::new();
        match self.score_single(source, request, &mut data_sources_used).await {
            Ok(result) => {
                self.cache.set(&key, CachedValue::Single(result.clone()));
                info!("ClimaScore {} from {}", result.climascore, source);
                result
            }
            Err(e) => {
                warn!("Falling back to default ClimaScore: {}", e);
                fallback_result(data_sources_used, &e)
            }
        }
    }

    async fn score_single(
        &self,
        source: Source,
        request: &ClimaRequest,
        data_sources_used: &mut Vec<String>,
    ) -> Result<ClimaScoreResult, ProviderError> {
        // ---
        let adapter = self.adapter(source)?;
        let series = adapter.fetch(request.coordinates(), None).await?;
        data_sources_used.push(source.id().to_string());

        let assessment = self.assess_series(source, &series, request)?;

        Ok(ClimaScoreResult {
            climascore: assessment.climascore,
            risk_breakdown: assessment.risk_breakdown,
            recommended_loan_terms: assessment.loan_terms,
            data_sources_used: data_sources_used.clone(),
            debug: assessment.debug,
        })
    }
}
