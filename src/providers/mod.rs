//! Climate data provider adapters.
//!
//! Each adapter owns one provider's query shape and payload format and
//! converges on the canonical [`DailySeries`]. Everything downstream of
//! [`Adapter::fetch`] is source-agnostic.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use reqwest::Client;

use crate::error::ProviderError;
use crate::models::{Coordinates, DailySeries};
use crate::Config;

mod era5;
mod nasa_power;
mod open_meteo;

pub use era5::{Era5Adapter, ERA5_URL};
pub use nasa_power::{NasaPowerAdapter, NASA_POWER_URL};
pub use open_meteo::{OpenMeteoAdapter, OPEN_METEO_URL};

// ---

/// Days covered by the historical window shared by the adapters.
pub const HISTORY_WINDOW_DAYS: u64 = 30;

/// Known climate data providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    NasaPower,
    OpenMeteo,
    Era5,
}

impl Source {
    // ---
    /// Every provider, in the order comparisons report them.
    pub const ALL: [Source; 3] = [Source::NasaPower, Source::OpenMeteo, Source::Era5];

    /// Identifier used in API payloads and cache keys.
    pub fn id(&self) -> &'static str {
        match self {
            Source::NasaPower => "nasa-power",
            Source::OpenMeteo => "open-meteo",
            Source::Era5 => "era5",
        }
    }

    /// Resolve a caller-supplied source name; anything unknown maps to the
    /// default forecast provider.
    pub fn resolve(name: Option<&str>) -> Source {
        // ---
        match name {
            Some("nasa") | Some("power") | Some("nasa-power") => Source::NasaPower,
            Some("era5") => Source::Era5,
            _ => Source::OpenMeteo,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Source::NasaPower => "NASA POWER",
            Source::OpenMeteo => "Open-Meteo",
            Source::Era5 => "ERA5",
        };
        f.write_str(label)
    }
}

/// Inclusive date range requested from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    // ---
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    // ---
    /// `days` days ending the day before `today`.
    pub fn ending_yesterday(today: NaiveDate, days: u64) -> Self {
        // ---
        let end = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        let start = end
            .checked_sub_days(Days::new(days.saturating_sub(1)))
            .unwrap_or(end);
        DateWindow { start, end }
    }

    /// Default history window relative to the current UTC date.
    pub fn trailing_history() -> Self {
        Self::ending_yesterday(chrono::Utc::now().date_naive(), HISTORY_WINDOW_DAYS)
    }
}

/// One external climate data source.
#[async_trait]
pub trait Adapter: Send + Sync {
    // ---
    fn source(&self) -> Source;

    /// Fetch the daily series around `coords`.
    ///
    /// With `window == None` the adapter uses its native window. Fails on
    /// non-2xx status, transport errors, timeouts, malformed payloads and
    /// payloads without any daily values.
    async fn fetch(
        &self,
        coords: Coordinates,
        window: Option<DateWindow>,
    ) -> Result<DailySeries, ProviderError>;
}

/// Shared HTTP client with the per-provider request timeout applied.
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    // ---
    Client::builder().timeout(timeout).build()
}

/// Build one adapter per known provider, in [`Source::ALL`] order.
pub fn default_adapters(config: &Config) -> Result<Vec<Arc<dyn Adapter>>, reqwest::Error> {
    // ---
    let client = http_client(config.provider_timeout)?;

    let adapters: Vec<Arc<dyn Adapter>> = vec![
        Arc::new(NasaPowerAdapter::new(client.clone(), &config.nasa_power_url)),
        Arc::new(OpenMeteoAdapter::new(client.clone(), &config.open_meteo_url)),
        Arc::new(Era5Adapter::new(client, &config.era5_url)),
    ];
    Ok(adapters)
}

/// Send a prepared request and decode the JSON body, mapping every failure
/// onto [`ProviderError`].
pub(crate) async fn get_json<T>(
    source: Source,
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError>
where
    T: serde::de::DeserializeOwned,
{
    // ---
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::from_reqwest(source, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status {
            provider: source,
            status: status.as_u16(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::from_reqwest(source, e))
}
