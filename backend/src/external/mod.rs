//! External API integrations

pub mod nws;
pub mod openweather;
pub mod sunrise;

pub use nws::NwsClient;
pub use openweather::OwmClient;
pub use sunrise::SunriseClient;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::AppResult;
use shared::models::WeatherSample;

/// One weather provider in the fallback chain
///
/// Adapters are tried in order until one succeeds. An unconfigured adapter
/// reports `configured() == false` and is skipped without an attempt, so a
/// preceding adapter's failure propagates unchanged.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this adapter has the credentials it needs to be called at all
    fn configured(&self) -> bool {
        true
    }

    /// Fetch the hourly forecast series, ascending by timestamp
    async fn fetch_hourly(
        &self,
        latitude: Decimal,
        longitude: Decimal,
    ) -> AppResult<Vec<WeatherSample>>;

    /// Fetch current conditions as a single sample
    async fn fetch_current(
        &self,
        latitude: Decimal,
        longitude: Decimal,
    ) -> AppResult<WeatherSample>;
}
