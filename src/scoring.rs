//! ClimaScore and loan-term derivation.
//!
//! Deterministic and monotonic: a higher risk never yields a higher score,
//! and a higher score never yields a worse rate.

use crate::models::{LoanTerms, RiskScores};

// ---

/// Relative importance of each hazard for a crop. Weights sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropWeights {
    // ---
    pub drought: f64,
    pub flood: f64,
    pub heat: f64,
}

impl CropWeights {
    // ---
    pub fn for_crop(crop: &str) -> Self {
        // ---
        match crop {
            "maize" => CropWeights {
                drought: 0.5,
                flood: 0.3,
                heat: 0.2,
            },
            _ => CropWeights {
                drought: 0.45,
                flood: 0.3,
                heat: 0.25,
            },
        }
    }
}

/// Base figures the loan heuristic scales from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanPolicy {
    // ---
    /// Amount offered at a ClimaScore of 80 (scaled 60%..110% over 0..100).
    pub base_amount: f64,
    /// Fractional base rate, e.g. `0.11` for 11%.
    pub base_rate: f64,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        LoanPolicy {
            base_amount: 500.0,
            base_rate: 0.11,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    // ---
    pub climascore: u8,
    pub loan_terms: LoanTerms,
}

/// Combine risk scores into a 0–100 ClimaScore and recommended terms.
pub fn assess(scores: &RiskScores, crop: &str, policy: &LoanPolicy) -> Assessment {
    // ---
    let climascore = climascore(scores, crop);
    Assessment {
        climascore,
        loan_terms: loan_terms(climascore, policy),
    }
}

pub fn climascore(scores: &RiskScores, crop: &str) -> u8 {
    // ---
    let w = CropWeights::for_crop(crop);
    let risk_sum = w.drought * scores.drought + w.flood * scores.flood + w.heat * scores.heat;

    (100.0 - risk_sum * 100.0).round().clamp(0.0, 100.0) as u8
}

pub fn loan_terms(climascore: u8, policy: &LoanPolicy) -> LoanTerms {
    // ---
    let score = f64::from(climascore);

    let amount = (policy.base_amount * (0.6 + score / 200.0)).round().max(0.0) as u64;

    let interest_rate = (((policy.base_rate + (0.2 - score / 1000.0)) * 1000.0).round() / 10.0)
        .clamp(5.0, 30.0);

    let confidence = ((0.7 + (score / 100.0) * 0.3) * 100.0).round() / 100.0;

    LoanTerms {
        amount,
        interest_rate,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn scores(drought: f64, flood: f64, heat: f64) -> RiskScores {
        RiskScores { drought, flood, heat }
    }

    #[test]
    fn test_crop_weights() {
        // ---
        assert_eq!(CropWeights::for_crop("maize").drought, 0.5);
        assert_eq!(CropWeights::for_crop("beans"), CropWeights::for_crop("sorghum"));
        assert_eq!(CropWeights::for_crop("beans").heat, 0.25);
    }

    #[test]
    fn test_climascore_examples() {
        // ---
        assert_eq!(climascore(&scores(0.0, 0.0, 0.0), "maize"), 100);
        assert_eq!(climascore(&scores(1.0, 1.0, 1.0), "maize"), 0);
        // 100 - 0.5*0.6*100 = 70
        assert_eq!(climascore(&scores(0.6, 0.0, 0.0), "maize"), 70);
        // 100 - (0.45*0.1 + 0.3*0.15 + 0.25*0.07) * 100 = 89.25 -> 89
        assert_eq!(climascore(&scores(0.1, 0.15, 0.07), "cassava"), 89);
    }

    #[test]
    fn test_drought_monotonicity() {
        // ---
        for crop in ["maize", "wheat"] {
            let mut previous = u8::MAX;
            for step in 0..=20 {
                let drought = step as f64 / 20.0;
                let score = climascore(&scores(drought, 0.3, 0.14), crop);
                assert!(score <= previous, "score rose as drought grew to {}", drought);
                previous = score;
            }
        }
    }

    #[test]
    fn test_loan_terms_bounds() {
        // ---
        let policy = LoanPolicy::default();
        for score in 0..=100u8 {
            let terms = loan_terms(score, &policy);
            assert!((5.0..=30.0).contains(&terms.interest_rate));
            assert!((0.0..=1.0).contains(&terms.confidence));
            assert!(terms.amount >= 300 && terms.amount <= 550);
        }
    }

    #[test]
    fn test_loan_terms_examples() {
        // ---
        let policy = LoanPolicy::default();

        let best = loan_terms(100, &policy);
        assert_eq!(best.amount, 550);
        assert_eq!(best.interest_rate, 21.0);
        assert_eq!(best.confidence, 1.0);

        let worst = loan_terms(0, &policy);
        assert_eq!(worst.amount, 300);
        assert_eq!(worst.interest_rate, 30.0);
        assert_eq!(worst.confidence, 0.7);

        let middle = loan_terms(58, &policy);
        assert_eq!(middle.amount, 445);
        assert_eq!(middle.interest_rate, 25.2);
        assert_eq!(middle.confidence, 0.87);
    }

    #[test]
    fn test_rate_never_worsens_with_score() {
        // ---
        let policy = LoanPolicy::default();
        let rates: Vec<f64> = (0..=100u8).map(|s| loan_terms(s, &policy).interest_rate).collect();
        assert!(rates.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_assess_is_deterministic() {
        // ---
        let policy = LoanPolicy::default();
        let s = scores(0.6, 0.15, 0.21);
        assert_eq!(assess(&s, "maize", &policy), assess(&s, "maize", &policy));
    }
}
