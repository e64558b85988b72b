//! Canned adapters for engine tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

use crate::error::ProviderError;
use crate::models::{Coordinates, DailyObservation, DailySeries};
use crate::providers::{Adapter, DateWindow, Source};

// ---

enum Behavior {
    Series(DailySeries),
    Delayed(DailySeries, StdDuration),
    Status(u16),
    Empty,
    Hang,
}

pub(crate) struct StubAdapter {
    source: Source,
    behavior: Behavior,
    calls: AtomicUsize,
    windows: parking_lot::Mutex<Vec<Option<DateWindow>>>,
}

impl StubAdapter {
    // ---
    fn build(source: Source, behavior: Behavior) -> Arc<Self> {
        Arc::new(StubAdapter {
            source,
            behavior,
            calls: AtomicUsize::new(0),
            windows: parking_lot::Mutex::new(Vec::new()),
        })
    }

    /// 30 identical days.
    pub fn uniform(source: Source, precipitation_mm: f64, temperature_max_c: f64) -> Arc<Self> {
        Self::build(source, Behavior::Series(uniform_series(precipitation_mm, temperature_max_c)))
    }

    /// Same as [`StubAdapter::uniform`], answering only after `delay`.
    pub fn delayed(
        source: Source,
        precipitation_mm: f64,
        temperature_max_c: f64,
        delay: StdDuration,
    ) -> Arc<Self> {
        let series = uniform_series(precipitation_mm, temperature_max_c);
        Self::build(source, Behavior::Delayed(series, delay))
    }

    pub fn failing(source: Source, status: u16) -> Arc<Self> {
        Self::build(source, Behavior::Status(status))
    }

    /// Fetch succeeds with zero days.
    pub fn empty(source: Source) -> Arc<Self> {
        Self::build(source, Behavior::Empty)
    }

    /// Fetch never completes.
    pub fn hanging(source: Source) -> Arc<Self> {
        Self::build(source, Behavior::Hang)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn windows(&self) -> Vec<Option<DateWindow>> {
        self.windows.lock().clone()
    }
}

fn uniform_series(precipitation_mm: f64, temperature_max_c: f64) -> DailySeries {
    // ---
    let start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
    let days = (0..30)
        .map(|i| {
            DailyObservation::normalized(
                start + Duration::days(i),
                Some(precipitation_mm),
                Some(temperature_max_c),
            )
        })
        .collect();
    DailySeries::new(days)
}

#[async_trait]
impl Adapter for StubAdapter {
    // ---
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch(
        &self,
        _coords: Coordinates,
        window: Option<DateWindow>,
    ) -> Result<DailySeries, ProviderError> {
        // ---
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.windows.lock().push(window);

        match &self.behavior {
            Behavior::Series(series) => Ok(series.clone()),
            Behavior::Delayed(series, delay) => {
                tokio::time::sleep(*delay).await;
                Ok(series.clone())
            }
            Behavior::Status(status) => Err(ProviderError::Status {
                provider: self.source,
                status: *status,
            }),
            Behavior::Empty => Ok(DailySeries::default()),
            Behavior::Hang => futures::future::pending().await,
        }
    }
}
