//! NASA POWER adapter: historical daily point data only, no forecast.
//!
//! POWER publishes daily values up to yesterday and marks missing data with
//! `-999`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{get_json, Adapter, DateWindow, Source};
use crate::error::ProviderError;
use crate::models::{Coordinates, DailyObservation, DailySeries};

// ---

pub const NASA_POWER_URL: &str = "https://power.larc.nasa.gov";

const POWER_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Clone)]
pub struct NasaPowerAdapter {
    client: Client,
    base_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct PowerResponse {
    #[serde(default)]
    properties: PowerProperties,
}

#[derive(Debug, Default, Deserialize)]
struct PowerProperties {
    #[serde(default)]
    parameter: PowerParameters,
}

/// Date-keyed (`YYYYMMDD`) parameter maps.
#[derive(Debug, Default, Deserialize)]
struct PowerParameters {
    // ---
    /// Bias-corrected precipitation, mm/day.
    #[serde(rename = "PRECTOTCORR")]
    precipitation_corrected: Option<BTreeMap<String, Option<f64>>>,
    /// Older uncorrected precipitation parameter.
    #[serde(rename = "PRECTOT")]
    precipitation: Option<BTreeMap<String, Option<f64>>>,
    /// Daily maximum 2 m temperature, °C.
    #[serde(rename = "T2M_MAX")]
    temperature_max: Option<BTreeMap<String, Option<f64>>>,
}

impl PowerResponse {
    // ---
    fn into_series(self) -> Result<DailySeries, ProviderError> {
        // ---
        let params = self.properties.parameter;
        let precipitation = params
            .precipitation_corrected
            .or(params.precipitation)
            .unwrap_or_default();

        if precipitation.is_empty() {
            return Err(ProviderError::EmptySeries {
                provider: Source::NasaPower,
            });
        }

        let temperature_max = params.temperature_max.ok_or_else(|| ProviderError::Malformed {
            provider: Source::NasaPower,
            message: "missing parameter 'T2M_MAX'".to_string(),
        })?;

        let mut days = Vec::with_capacity(precipitation.len());
        for (raw_date, precip) in &precipitation {
            let date = NaiveDate::parse_from_str(raw_date, POWER_DATE_FORMAT).map_err(|e| {
                ProviderError::Malformed {
                    provider: Source::NasaPower,
                    message: format!("invalid date '{}': {}", raw_date, e),
                }
            })?;
            // POWER reports every requested day, using -999 for gaps
            let tmax = temperature_max.get(raw_date).ok_or_else(|| ProviderError::Malformed {
                provider: Source::NasaPower,
                message: format!("T2M_MAX has no value for {}", raw_date),
            })?;
            days.push(DailyObservation::normalized(date, *precip, *tmax));
        }

        Ok(DailySeries::new(days))
    }
}

impl NasaPowerAdapter {
    // ---
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Adapter for NasaPowerAdapter {
    // ---
    fn source(&self) -> Source {
        Source::NasaPower
    }

    async fn fetch(
        &self,
        coords: Coordinates,
        window: Option<DateWindow>,
    ) -> Result<DailySeries, ProviderError> {
        // ---
        let window = window.unwrap_or_else(DateWindow::trailing_history);
        let url = format!("{}/api/temporal/daily/point", self.base_url);

        let params = [
            ("parameters", "PRECTOTCORR,T2M_MAX".to_string()),
            ("start", window.start.format(POWER_DATE_FORMAT).to_string()),
            ("end", window.end.format(POWER_DATE_FORMAT).to_string()),
            ("latitude", coords.lat.to_string()),
            ("longitude", coords.lon.to_string()),
            ("community", "AG".to_string()),
            ("format", "JSON".to_string()),
        ];

        debug!("Fetching {} daily series from {} ({:?})", Source::NasaPower, url, window);

        let response: PowerResponse =
            get_json(Source::NasaPower, self.client.get(&url).query(&params)).await?;
        response.into_series()
    }
}
