//! Drought, flood and heat-stress heuristics over a daily series.
//!
//! Pure functions only. The thresholds below are part of the scoring
//! contract: changing any of them changes every ClimaScore.

use crate::error::ProviderError;
use crate::models::{DailySeries, RiskScores};
use crate::providers::Source;

// ---

/// Trailing days considered by every heuristic.
pub const ANALYSIS_WINDOW_DAYS: usize = 30;

const DRY_DAY_MAX_MM: f64 = 1.0;
const DRY_STREAK_GRACE_DAYS: u32 = 5;
const DRY_STREAK_PENALTY_PER_DAY: f64 = 0.03;

const HEAVY_RAIN_MIN_MM: f64 = 30.0;
const HEAVY_RAIN_PENALTY_PER_DAY: f64 = 0.15;

const HEAT_STRESS_MIN_C: f64 = 34.0;
const HEAT_STRESS_PENALTY_PER_DAY: f64 = 0.07;

/// Descriptive statistics behind a [`RiskSummary`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    // ---
    pub total_precip_mm: f64,
    pub max_dry_streak_days: u32,
    pub heavy_rain_days: u32,
    pub heat_stress_days: u32,
    pub days_count: u32,
    pub days_analyzed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskSummary {
    // ---
    pub scores: RiskScores,
    pub stats: SeriesStats,
}

/// Reduce a daily series to three risk scores.
///
/// Refuses an empty series: there is nothing to score, and the caller is
/// expected to fall back instead of reporting a fabricated "wet" result.
pub fn summarize(source: Source, series: &DailySeries) -> Result<RiskSummary, ProviderError> {
    // ---
    if series.is_empty() {
        return Err(ProviderError::EmptySeries { provider: source });
    }

    let window = series.trailing(ANALYSIS_WINDOW_DAYS);

    let total_precip_mm: f64 = window.iter().map(|d| d.precipitation_mm).sum();
    let max_dry_streak_days = longest_dry_streak(window.iter().map(|d| d.precipitation_mm));
    let heavy_rain_days = window
        .iter()
        .filter(|d| d.precipitation_mm >= HEAVY_RAIN_MIN_MM)
        .count() as u32;
    let heat_stress_days = window
        .iter()
        .filter(|d| d.temperature_max_c >= HEAT_STRESS_MIN_C)
        .count() as u32;

    let scores = RiskScores {
        drought: drought_score(total_precip_mm, max_dry_streak_days),
        flood: (heavy_rain_days as f64 * HEAVY_RAIN_PENALTY_PER_DAY).min(1.0),
        heat: (heat_stress_days as f64 * HEAT_STRESS_PENALTY_PER_DAY).min(1.0),
    };

    Ok(RiskSummary {
        scores,
        stats: SeriesStats {
            total_precip_mm,
            max_dry_streak_days,
            heavy_rain_days,
            heat_stress_days,
            days_count: series.len() as u32,
            days_analyzed: window.len() as u32,
        },
    })
}

/// Base score by 30-day rainfall, plus a penalty for long dry streaks.
fn drought_score(total_precip_mm: f64, max_dry_streak_days: u32) -> f64 {
    // ---
    let base = if total_precip_mm >= 150.0 {
        0.1
    } else if total_precip_mm >= 100.0 {
        0.3
    } else if total_precip_mm >= 60.0 {
        0.6
    } else {
        0.85
    };

    let excess_days = max_dry_streak_days.saturating_sub(DRY_STREAK_GRACE_DAYS);
    (base + excess_days as f64 * DRY_STREAK_PENALTY_PER_DAY).min(1.0)
}

fn longest_dry_streak(precipitation: impl Iterator<Item = f64>) -> u32 {
    // ---
    let mut longest = 0;
    let mut current = 0;
    for p in precipitation {
        if p < DRY_DAY_MAX_MM {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
