//! Data models shared by the adapters, the summarizer and the engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::risk::SeriesStats;

// ---

/// Sentinel floor used by providers for "no data" temperatures (e.g. `-999`).
const MISSING_TEMPERATURE_FLOOR_C: f64 = -900.0;

/// One normalized day of observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    // ---
    pub date: NaiveDate,
    pub precipitation_mm: f64,
    pub temperature_max_c: f64,
}

impl DailyObservation {
    // ---
    /// Build an observation from raw provider values.
    ///
    /// Missing, non-finite and negative precipitation become `0`. Missing,
    /// non-finite and sentinel temperatures become `0`, which never counts as
    /// a heat-stress day.
    pub fn normalized(
        date: NaiveDate,
        precipitation: Option<f64>,
        temperature_max: Option<f64>,
    ) -> Self {
        // ---
        let precipitation_mm = match precipitation {
            Some(p) if p.is_finite() && p > 0.0 => p,
            _ => 0.0,
        };
        let temperature_max_c = match temperature_max {
            Some(t) if t.is_finite() && t > MISSING_TEMPERATURE_FLOOR_C => t,
            _ => 0.0,
        };

        DailyObservation {
            date,
            precipitation_mm,
            temperature_max_c,
        }
    }
}

/// Canonical daily time series every provider adapter produces.
///
/// Dates are strictly increasing. When a provider repeats a date the last
/// observation for it wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySeries {
    days: Vec<DailyObservation>,
}

impl DailySeries {
    // ---
    pub fn new(mut days: Vec<DailyObservation>) -> Self {
        // ---
        days.sort_by_key(|d| d.date);

        let mut ordered: Vec<DailyObservation> = Vec::with_capacity(days.len());
        for day in days {
            match ordered.last_mut() {
                Some(last) if last.date == day.date => *last = day,
                _ => ordered.push(day),
            }
        }

        DailySeries { days: ordered }
    }

    pub fn days(&self) -> &[DailyObservation] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// The last `count` days (or the whole series when shorter).
    pub fn trailing(&self, count: usize) -> &[DailyObservation] {
        // ---
        let start = self.days.len().saturating_sub(count);
        &self.days[start..]
    }
}

/// Categorical view of a continuous risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    // ---
    pub fn from_score(score: f64) -> Self {
        // ---
        if score < 0.33 {
            RiskBand::Low
        } else if score < 0.66 {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }
}

/// Continuous drought/flood/heat risk scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskScores {
    // ---
    pub drought: f64,
    pub flood: f64,
    pub heat: f64,
}

impl RiskScores {
    // ---
    /// Bands are always derived from the scores, never stored beside them.
    pub fn breakdown(&self) -> RiskBreakdown {
        // ---
        RiskBreakdown {
            drought_risk: RiskBand::from_score(self.drought),
            flood_risk: RiskBand::from_score(self.flood),
            heat_stress_risk: RiskBand::from_score(self.heat),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskBreakdown {
    // ---
    pub drought_risk: RiskBand,
    pub flood_risk: RiskBand,
    pub heat_stress_risk: RiskBand,
}

impl RiskBreakdown {
    // ---
    pub fn uniform(band: RiskBand) -> Self {
        RiskBreakdown {
            drought_risk: band,
            flood_risk: band,
            heat_stress_risk: band,
        }
    }
}

/// Recommended loan terms derived from a ClimaScore.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    // ---
    pub amount: u64,
    /// Annual rate in percent, within `[5, 30]`.
    pub interest_rate: f64,
    /// Within `[0, 1]`.
    pub confidence: f64,
}

/// Transparency block attached to every result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreDebug {
    // ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total30_precip_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_dry_streak_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heavy_rain_days_30mm: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_stress_days_gt34c: Option<u32>,
    /// Length of the series the provider returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_count: Option<u32>,
    /// Days that actually went into the heuristics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_analyzed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_hit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<SeriesStats> for ScoreDebug {
    fn from(stats: SeriesStats) -> Self {
        // ---
        ScoreDebug {
            total30_precip_mm: Some(stats.total_precip_mm),
            max_dry_streak_days: Some(stats.max_dry_streak_days),
            heavy_rain_days_30mm: Some(stats.heavy_rain_days),
            heat_stress_days_gt34c: Some(stats.heat_stress_days),
            days_count: Some(stats.days_count),
            days_analyzed: Some(stats.days_analyzed),
            cache_hit: None,
            error: None,
        }
    }
}

/// The unit returned to callers and stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimaScoreResult {
    // ---
    pub climascore: u8,
    pub risk_breakdown: RiskBreakdown,
    pub recommended_loan_terms: LoanTerms,
    pub data_sources_used: Vec<String>,
    pub debug: ScoreDebug,
}

/// Per-provider entry of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceOutcome {
    Scored(SourceScore),
    Failed { source: String, error: String },
}

impl SourceOutcome {
    // ---
    pub fn source(&self) -> &str {
        match self {
            SourceOutcome::Scored(score) => &score.source,
            SourceOutcome::Failed { source, .. } => source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceScore {
    // ---
    pub source: String,
    pub climascore: u8,
    pub risk_breakdown: RiskBreakdown,
    pub recommended_loan_terms: LoanTerms,
    pub debug: ScoreDebug,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    // ---
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    // ---
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Side-by-side scoring of every known provider over one shared window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    // ---
    pub compare: bool,
    pub coordinates: Coordinates,
    pub window_days: u32,
    pub period: Period,
    pub sources: Vec<SourceOutcome>,
    pub suggested_sources: Vec<String>,
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_hit: Option<bool>,
}

/// Input to both engine entrypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimaRequest {
    // ---
    pub latitude: f64,
    pub longitude: f64,
    /// Lowercased crop identifier.
    pub crop: String,
    /// Accepted for crop-stage-aware scoring; not consumed by the heuristics.
    pub planting_date: Option<NaiveDate>,
    pub source: Option<String>,
}

impl ClimaRequest {
    // ---
    pub fn new(latitude: f64, longitude: f64, crop: &str) -> Self {
        // ---
        ClimaRequest {
            latitude,
            longitude,
            crop: crop.to_lowercase(),
            planting_date: None,
            source: None,
        }
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_lowercase());
        self
    }

    pub fn with_planting_date(mut self, planting_date: Option<NaiveDate>) -> Self {
        self.planting_date = planting_date;
        self
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.latitude,
            lon: self.longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn day(d: u32, precip: f64) -> DailyObservation {
        // ---
        DailyObservation::normalized(
            NaiveDate::from_ymd_opt(2025, 6, d).unwrap(),
            Some(precip),
            Some(25.0),
        )
    }

    #[test]
    fn test_band_thresholds() {
        // ---
        assert_eq!(RiskBand::from_score(0.0), RiskBand::Low);
        assert_eq!(RiskBand::from_score(0.329), RiskBand::Low);
        assert_eq!(RiskBand::from_score(0.33), RiskBand::Medium);
        assert_eq!(RiskBand::from_score(0.659), RiskBand::Medium);
        assert_eq!(RiskBand::from_score(0.66), RiskBand::High);
        assert_eq!(RiskBand::from_score(1.0), RiskBand::High);
    }

    #[test]
    fn test_sentinels_normalized_to_zero() {
        // ---
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        let missing = DailyObservation::normalized(date, Some(-999.0), Some(-999.0));
        assert_eq!(missing.precipitation_mm, 0.0);
        assert_eq!(missing.temperature_max_c, 0.0);

        let absent = DailyObservation::normalized(date, None, None);
        assert_eq!(absent.precipitation_mm, 0.0);
        assert_eq!(absent.temperature_max_c, 0.0);

        let nan = DailyObservation::normalized(date, Some(f64::NAN), Some(f64::INFINITY));
        assert_eq!(nan.precipitation_mm, 0.0);
        assert_eq!(nan.temperature_max_c, 0.0);

        // Sub-zero temperatures are real weather, not sentinels
        let cold = DailyObservation::normalized(date, Some(2.5), Some(-12.0));
        assert_eq!(cold.precipitation_mm, 2.5);
        assert_eq!(cold.temperature_max_c, -12.0);
    }

    #[test]
    fn test_series_sorted_and_deduplicated() {
        // ---
        let series = DailySeries::new(vec![day(3, 1.0), day(1, 2.0), day(3, 9.0), day(2, 4.0)]);

        let dates: Vec<u32> = series.days().iter().map(|d| chrono::Datelike::day(&d.date)).collect();
        assert_eq!(dates, vec![1, 2, 3]);
        assert_eq!(series.days()[2].precipitation_mm, 9.0);
    }

    #[test]
    fn test_trailing_window() {
        // ---
        let series = DailySeries::new((1..=5).map(|d| day(d, d as f64)).collect());

        assert_eq!(series.trailing(2).len(), 2);
        assert_eq!(series.trailing(2)[0].precipitation_mm, 4.0);
        assert_eq!(series.trailing(30).len(), 5);
        assert!(DailySeries::default().trailing(30).is_empty());
    }

    #[test]
    fn test_request_lowercases_inputs() {
        // ---
        let request = ClimaRequest::new(-1.28, 36.82, "Maize").with_source("NASA");
        assert_eq!(request.crop, "maize");
        assert_eq!(request.source.as_deref(), Some("nasa"));
        assert_eq!(request.planting_date, None);
    }

    #[test]
    fn test_failed_outcome_serializes_inline() {
        // ---
        let outcome = SourceOutcome::Failed {
            source: "era5".to_string(),
            error: "ERA5 fetch failed: 500".to_string(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["source"], "era5");
        assert_eq!(value["error"], "ERA5 fetch failed: 500");
        assert_eq!(outcome.source(), "era5");
    }
}
