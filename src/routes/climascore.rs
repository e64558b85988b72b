//! `GET /climascore` – single-source score or multi-source comparison.
//!
//! Query parameters: `lat`, `lon` (required), `crop` (default `maize`),
//! `planting_date` (`YYYY-MM-DD`, accepted but unused by the heuristics),
//! `source` (`open-meteo` | `nasa` | `nasa-power` | `power` | `era5` |
//! `compare`) and `compare=true`.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{ApiError, ClimaRequest, ClimateEngine};

// ---

const DEFAULT_CROP: &str = "maize";

pub fn router() -> Router<Arc<ClimateEngine>> {
    // ---
    Router::new().route("/climascore", get(handler))
}

async fn handler(
    Query(params): Query<ClimaQuery>,
    State(engine): State<Arc<ClimateEngine>>,
) -> Result<Response, ApiError> {
    // ---
    info!("GET /climascore - {:?}", params);

    let request = params.to_request()?;

    if params.wants_comparison() {
        let result = engine.compare_clima_scores(&request).await;
        return Ok(Json(result).into_response());
    }

    let result = engine.compute_clima_score(&request).await;
    Ok(Json(result).into_response())
}

/// Raw query parameters; everything is parsed by hand so bad input yields a
/// JSON error body instead of axum's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ClimaQuery {
    lat: Option<String>,
    lon: Option<String>,
    crop: Option<String>,
    planting_date: Option<String>,
    source: Option<String>,
    compare: Option<String>,
}

impl ClimaQuery {
    // ---
    fn to_request(&self) -> Result<ClimaRequest, ApiError> {
        // ---
        let (lat, lon) = match (non_empty(&self.lat), non_empty(&self.lon)) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(ApiError::BadRequest(
                    "lat and lon are required query parameters".to_string(),
                ))
            }
        };
        let latitude = parse_coordinate("lat", lat, 90.0)?;
        let longitude = parse_coordinate("lon", lon, 180.0)?;

        let crop = non_empty(&self.crop).unwrap_or(DEFAULT_CROP);

        let mut request = ClimaRequest::new(latitude, longitude, crop)
            .with_planting_date(self.planting_date());
        if let Some(source) = non_empty(&self.source) {
            request = request.with_source(source);
        }
        Ok(request)
    }

    fn wants_comparison(&self) -> bool {
        // ---
        let flag = |v: &Option<String>, expected: &str| {
            v.as_deref()
                .map_or(false, |s| s.trim().eq_ignore_ascii_case(expected))
        };
        flag(&self.compare, "true") || flag(&self.source, "compare")
    }

    /// Unparseable dates are ignored, matching how the field is consumed.
    fn planting_date(&self) -> Option<NaiveDate> {
        // ---
        let raw = non_empty(&self.planting_date)?;
        match raw.parse::<NaiveDate>() {
            Ok(date) => Some(date),
            Err(e) => {
                debug!("Ignoring planting_date '{}': {}", raw, e);
                None
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_coordinate(name: &str, raw: &str, limit: f64) -> Result<f64, ApiError> {
    // ---
    let value: f64 = raw
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{} must be a number, got '{}'", name, raw)))?;

    if !value.is_finite() || value.abs() > limit {
        return Err(ApiError::BadRequest(format!(
            "{} must be within [-{}, {}]",
            name, limit, limit
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> ClimaQuery {
        // ---
        let mut q = ClimaQuery::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "lat" => q.lat = value,
                "lon" => q.lon = value,
                "crop" => q.crop = value,
                "planting_date" => q.planting_date = value,
                "source" => q.source = value,
                "compare" => q.compare = value,
                other => panic!("unexpected key {}", other),
            }
        }
        q
    }

    #[test]
    fn test_defaults_and_normalization() {
        // ---
        let request = query(&[("lat", "-1.2921"), ("lon", " 36.8219 "), ("source", "NASA")])
            .to_request()
            .unwrap();

        assert_eq!(request.latitude, -1.2921);
        assert_eq!(request.longitude, 36.8219);
        assert_eq!(request.crop, "maize");
        assert_eq!(request.source.as_deref(), Some("nasa"));
        assert_eq!(request.planting_date, None);
    }

    #[test]
    fn test_crop_lowercased_and_planting_date_parsed() {
        // ---
        let request = query(&[
            ("lat", "9.1"),
            ("lon", "7.4"),
            ("crop", "Sorghum"),
            ("planting_date", "2025-03-15"),
        ])
        .to_request()
        .unwrap();

        assert_eq!(request.crop, "sorghum");
        assert_eq!(request.planting_date, NaiveDate::from_ymd_opt(2025, 3, 15));
        assert_eq!(request.source, None);
    }

    #[test]
    fn test_bad_planting_date_is_ignored() {
        // ---
        let request = query(&[("lat", "1"), ("lon", "2"), ("planting_date", "spring")])
            .to_request()
            .unwrap();
        assert_eq!(request.planting_date, None);
    }

    #[test]
    fn test_missing_coordinates_rejected() {
        // ---
        for q in [query(&[]), query(&[("lat", "1.0")]), query(&[("lat", ""), ("lon", "2")])] {
            let err = q.to_request().unwrap_err();
            assert_eq!(err.to_string(), "lat and lon are required query parameters");
        }
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        // ---
        let err = query(&[("lat", "north"), ("lon", "2")]).to_request().unwrap_err();
        assert_eq!(err.to_string(), "lat must be a number, got 'north'");

        let err = query(&[("lat", "1"), ("lon", "181")]).to_request().unwrap_err();
        assert_eq!(err.to_string(), "lon must be within [-180, 180]");

        assert!(query(&[("lat", "NaN"), ("lon", "2")]).to_request().is_err());
    }

    #[test]
    fn test_comparison_selection() {
        // ---
        assert!(query(&[("compare", "true")]).wants_comparison());
        assert!(query(&[("compare", "TRUE")]).wants_comparison());
        assert!(query(&[("source", "compare")]).wants_comparison());
        assert!(!query(&[("compare", "false")]).wants_comparison());
        assert!(!query(&[("source", "era5")]).wants_comparison());
    }
}
