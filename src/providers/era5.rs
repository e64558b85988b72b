//! ERA5 reanalysis adapter, served by the Open-Meteo archive API.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::open_meteo::DailyEnvelope;
use super::{get_json, Adapter, DateWindow, Source};
use crate::error::ProviderError;
use crate::models::{Coordinates, DailySeries};

// ---

pub const ERA5_URL: &str = "https://archive-api.open-meteo.com";

#[derive(Clone)]
pub struct Era5Adapter {
    client: Client,
    base_url: String,
}

impl Era5Adapter {
    // ---
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Adapter for Era5Adapter {
    // ---
    fn source(&self) -> Source {
        Source::Era5
    }

    /// The archive has no native window; without one the trailing history
    /// window is requested.
    async fn fetch(
        &self,
        coords: Coordinates,
        window: Option<DateWindow>,
    ) -> Result<DailySeries, ProviderError> {
        // ---
        let window = window.unwrap_or_else(DateWindow::trailing_history);
        let url = format!("{}/v1/era5", self.base_url);

        let params = [
            ("latitude", coords.lat.to_string()),
            ("longitude", coords.lon.to_string()),
            ("start_date", window.start.to_string()),
            ("end_date", window.end.to_string()),
            ("daily", "precipitation_sum,temperature_2m_max".to_string()),
            ("timezone", "auto".to_string()),
        ];

        debug!("Fetching {} daily series from {} ({:?})", Source::Era5, url, window);

        let envelope: DailyEnvelope =
            get_json(Source::Era5, self.client.get(&url).query(&params)).await?;
        envelope.into_series(Source::Era5)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn window() -> DateWindow {
        DateWindow {
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 1, 30).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_archive_query_and_parse() {
        // ---
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/era5"))
            .and(query_param("start_date", "2025-01-01"))
            .and(query_param("end_date", "2025-01-30"))
            .and(query_param("daily", "precipitation_sum,temperature_2m_max"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {
                    "time": ["2025-01-02", "2025-01-01"],
                    "precipitation_sum": [31.0, -0.1],
                    "temperature_2m_max": [29.5, 34.0]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let adapter = Era5Adapter::new(Client::new(), &format!("{}/", server.uri()));
        let series = adapter
            .fetch(Coordinates { lat: 0.5, lon: 35.0 }, Some(window()))
            .await
            .unwrap();

        let days = series.days();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(days[0].precipitation_mm, 0.0);
        assert_eq!(days[0].temperature_max_c, 34.0);
        assert_eq!(days[1].precipitation_mm, 31.0);
    }

    #[tokio::test]
    async fn test_empty_time_column() {
        // ---
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/era5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": { "time": [], "precipitation_sum": [] }
            })))
            .mount(&server)
            .await;

        let adapter = Era5Adapter::new(Client::new(), &server.uri());
        let err = adapter
            .fetch(Coordinates { lat: 0.5, lon: 35.0 }, Some(window()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No daily data available from ERA5");
    }

    #[tokio::test]
    async fn test_misaligned_columns_are_malformed() {
        // ---
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/era5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "daily": {
                    "time": ["2025-01-01", "2025-01-02"],
                    "precipitation_sum": [3.0],
                    "temperature_2m_max": [29.0, 30.0]
                }
            })))
            .mount(&server)
            .await;

        let adapter = Era5Adapter::new(Client::new(), &server.uri());
        let err = adapter
            .fetch(Coordinates { lat: 0.5, lon: 35.0 }, Some(window()))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Malformed { provider: Source::Era5, .. }));
    }
}
