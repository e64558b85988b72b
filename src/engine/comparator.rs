//! Multi-source comparison and most-consistent-pair reconciliation.
//!
//! Every provider is scored over the same 30-day window ending yesterday.
//! Providers regularly disagree on rainfall for the same place and month;
//! the pair whose 30-day totals agree best is surfaced as the suggested basis
//! for trusting a score.

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

use super::ClimateEngine;
use crate::cache::{compare_key, CachedValue};
use crate::models::{ClimaRequest, ComparisonResult, Period, SourceOutcome, SourceScore};
use crate::providers::{Adapter, DateWindow, HISTORY_WINDOW_DAYS};

// ---

/// What the winning pair's difference was measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairBasis {
    /// Absolute difference of 30-day precipitation totals, mm.
    Precipitation,
    /// Absolute ClimaScore difference, used when a total is unavailable.
    ClimaScore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedPair {
    // ---
    pub sources: [String; 2],
    pub difference: f64,
    pub basis: PairBasis,
}

impl SuggestedPair {
    // ---
    pub fn rationale(&self) -> String {
        match self.basis {
            PairBasis::Precipitation => format!(
                "Closest by 30-day precipitation difference ({:.2} mm)",
                self.difference
            ),
            PairBasis::ClimaScore => format!(
                "Closest by ClimaScore difference ({:.2} points)",
                self.difference
            ),
        }
    }
}

/// Pick the two successful sources that agree best.
///
/// Returns `None` with fewer than two successes. Ties keep the earliest pair
/// in report order.
pub fn suggest_pair(outcomes: &[SourceOutcome]) -> Option<SuggestedPair> {
    // ---
    let scored: Vec<&SourceScore> = outcomes
        .iter()
        .filter_map(|o| match o {
            SourceOutcome::Scored(score) => Some(score),
            SourceOutcome::Failed { .. } => None,
        })
        .collect();

    let mut best: Option<SuggestedPair> = None;
    for (i, a) in scored.iter().enumerate() {
        for b in &scored[i + 1..] {
            let candidate = pair_difference(a, b);
            let closer = best
                .as_ref()
                .map_or(true, |current| candidate.difference < current.difference);
            if closer {
                best = Some(candidate);
            }
        }
    }
    best
}

fn pair_difference(a: &SourceScore, b: &SourceScore) -> SuggestedPair {
    // ---
    let total = |s: &SourceScore| s.debug.total30_precip_mm.filter(|v| v.is_finite());

    let (difference, basis) = match (total(a), total(b)) {
        (Some(pa), Some(pb)) => ((pa - pb).abs(), PairBasis::Precipitation),
        _ => (
            (f64::from(a.climascore) - f64::from(b.climascore)).abs(),
            PairBasis::ClimaScore,
        ),
    };

    SuggestedPair {
        sources: [a.source.clone(), b.source.clone()],
        difference,
        basis,
    }
}

impl ClimateEngine {
    // ---
    /// Score every configured provider over the shared window ending yesterday.
    pub async fn compare_clima_scores(&self, request: &ClimaRequest) -> ComparisonResult {
        self.compare_clima_scores_on(request, Utc::now().date_naive()).await
    }

    /// Same as [`ClimateEngine::compare_clima_scores`] with an explicit "today".
    ///
    /// Never fails: per-provider errors are reported inline and leave the
    /// suggestion empty when fewer than two providers succeed.
    pub async fn compare_clima_scores_on(
        &self,
        request: &ClimaRequest,
        today: NaiveDate,
    ) -> ComparisonResult {
        // ---
        let window = DateWindow::ending_yesterday(today, HISTORY_WINDOW_DAYS);
        let period = Period {
            start: window.start,
            end: window.end,
        };

        let key = compare_key(request.latitude, request.longitude, &request.crop, &period);
        if let Some(CachedValue::Comparison(mut cached)) = self.cache.get(&key) {
            debug!("Cache hit for {}", key);
            cached.cache_hit = Some(true);
            return cached;
        }

        info!(
            "Comparing {} sources for {} ({} to {})",
            self.adapters.len(),
            key,
            period.start,
            period.end
        );

        let sources = join_all(
            self.adapters
                .iter()
                .map(|adapter| self.score_outcome(adapter.as_ref(), request, window)),
        )
        .await;

        let (suggested_sources, rationale) = match suggest_pair(&sources) {
            Some(pair) => {
                let rationale = pair.rationale();
                (pair.sources.to_vec(), rationale)
            }
            None => (Vec::new(), String::new()),
        };

        let result = ComparisonResult {
            compare: true,
            coordinates: request.coordinates(),
            window_days: HISTORY_WINDOW_DAYS as u32,
            period,
            sources,
            suggested_sources,
            rationale,
            cache_hit: None,
        };

        // Only comparisons with at least one scored source are cached
        if result.sources.iter().any(|s| matches!(s, SourceOutcome::Scored(_))) {
            self.cache.set(&key, CachedValue::Comparison(result.clone()));
        } else {
            warn!("No source succeeded for {}, result not cached", key);
        }
        result
    }

    async fn score_outcome(
        &self,
        adapter: &dyn Adapter,
        request: &ClimaRequest,
        window: DateWindow,
    ) -> SourceOutcome {
        // ---
        let source = adapter.source();
        match self.assess_source(adapter, request, Some(window)).await {
            Ok(assessment) => SourceOutcome::Scored(SourceScore {
                source: source.id().to_string(),
                climascore: assessment.climascore,
                risk_breakdown: assessment.risk_breakdown,
                recommended_loan_terms: assessment.loan_terms,
                debug: assessment.debug,
            }),
            Err(e) => {
                warn!("{} excluded from comparison: {}", source, e);
                SourceOutcome::Failed {
                    source: source.id().to_string(),
                    error: e.to_string(),
                }
            }
        }
    }
}
