//! Open-Meteo forecast adapter (default provider).
//!
//! Without an explicit window the adapter asks for 30 past days plus a
//! 7-day outlook, so the trailing analysis window includes forecast days.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{get_json, Adapter, DateWindow, Source, HISTORY_WINDOW_DAYS};
use crate::error::ProviderError;
use crate::models::{Coordinates, DailyObservation, DailySeries};

// ---

pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com";

const FORECAST_DAYS: u32 = 7;

#[derive(Clone)]
pub struct OpenMeteoAdapter {
    client: Client,
    base_url: String,
}

/// Envelope shared by the Open-Meteo forecast and archive APIs.
#[derive(Debug, Deserialize)]
pub(super) struct DailyEnvelope {
    daily: Option<OpenMeteoDaily>,
}

/// Column-oriented daily block as returned by Open-Meteo.
#[derive(Debug, Default, Deserialize)]
pub(super) struct OpenMeteoDaily {
    // ---
    #[serde(default)]
    time: Vec<String>,
    precipitation_sum: Option<Vec<Option<f64>>>,
    temperature_2m_max: Option<Vec<Option<f64>>>,
}

/// A data column must be present and aligned with `time`; individual `null`
/// entries are still allowed.
fn aligned_column(
    source: Source,
    name: &str,
    column: Option<Vec<Option<f64>>>,
    expected: usize,
) -> Result<Vec<Option<f64>>, ProviderError> {
    // ---
    let column = column.ok_or_else(|| ProviderError::Malformed {
        provider: source,
        message: format!("missing daily column '{}'", name),
    })?;
    if column.len() != expected {
        return Err(ProviderError::Malformed {
            provider: source,
            message: format!(
                "daily column '{}' has {} values for {} days",
                name,
                column.len(),
                expected
            ),
        });
    }
    Ok(column)
}

impl DailyEnvelope {
    // ---
    /// Zip the daily columns into a series. `null` entries count as missing
    /// values; an absent or misaligned column is malformed.
    pub(super) fn into_series(self, source: Source) -> Result<DailySeries, ProviderError> {
        // ---
        let daily = self.daily.unwrap_or_default();
        if daily.time.is_empty() {
            return Err(ProviderError::EmptySeries { provider: source });
        }

        let len = daily.time.len();
        let precipitation =
            aligned_column(source, "precipitation_sum", daily.precipitation_sum, len)?;
        let temperature_max =
            aligned_column(source, "temperature_2m_max", daily.temperature_2m_max, len)?;

        let mut days = Vec::with_capacity(len);
        let columns = precipitation.into_iter().zip(temperature_max);
        for (raw_date, (precip, tmax)) in daily.time.iter().zip(columns) {
            let date = raw_date
                .parse::<NaiveDate>()
                .map_err(|e| ProviderError::Malformed {
                    provider: source,
                    message: format!("invalid date '{}': {}", raw_date, e),
                })?;
            days.push(DailyObservation::normalized(date, precip, tmax));
        }

        Ok(DailySeries::new(days))
    }
}

impl OpenMeteoAdapter {
    // ---
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Adapter for OpenMeteoAdapter {
    // ---
    fn source(&self) -> Source {
        Source::OpenMeteo
    }

    async fn fetch(
        &self,
        coords: Coordinates,
        window: Option<DateWindow>,
    ) -> Result<DailySeries, ProviderError> {
        // ---
        let url = format!("{}/v1/forecast", self.base_url);

        let mut params = vec![
            ("latitude", coords.lat.to_string()),
            ("longitude", coords.lon.to_string()),
            (
                "daily",
                "precipitation_sum,temperature_2m_max,temperature_2m_min".to_string(),
            ),
            ("timezone", "auto".to_string()),
        ];
        match window {
            Some(w) => {
                params.push(("start_date", w.start.to_string()));
                params.push(("end_date", w.end.to_string()));
            }
            None => {
                params.push(("past_days", HISTORY_WINDOW_DAYS.to_string()));
                params.push(("forecast_days", FORECAST_DAYS.to_string()));
            }
        }

        debug!("Fetching {} daily series from {} ({:?})", Source::OpenMeteo, url, window);

        let envelope: DailyEnvelope =
            get_json(Source::OpenMeteo, self.client.get(&url).query(&params)).await?;
        envelope.into_series(Source::OpenMeteo)
    }
}
