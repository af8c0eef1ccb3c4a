//! Data source clients.
//!
//! Each operation performs exactly one fetch for one logical resource and
//! either returns the parsed value or fails. Sources never retry, never
//! cache and never touch dashboard state; the resource slots own all of that.

mod client;
mod convert;
mod error;
mod scripted;
mod types;

use std::future::Future;

use crate::domain::{AirQuality, Departure, Station, StationId, Weather};

pub use client::{ApiClient, ApiConfig, DEFAULT_BASE_URL};
pub use convert::ConversionError;
pub use error::SourceError;
pub use scripted::{Gate, ScriptedSource};
pub use types::{
    AirQualityDto, DepartureDto, DeparturesResponse, PollutantsDto, StationDto, StationsResponse,
    WeatherDto,
};

/// Trait for fetching dashboard resources.
///
/// This abstraction lets the runtime be driven by the HTTP client in
/// production and by a scripted source in tests.
pub trait DataSource: Send + Sync + 'static {
    /// Fetch the full station list.
    fn stations(&self) -> impl Future<Output = Result<Vec<Station>, SourceError>> + Send;

    /// Fetch live departures for one station.
    fn departures(
        &self,
        station: &StationId,
    ) -> impl Future<Output = Result<Vec<Departure>, SourceError>> + Send;

    /// Fetch current weather.
    fn weather(&self) -> impl Future<Output = Result<Weather, SourceError>> + Send;

    /// Fetch current air quality.
    fn air_quality(&self) -> impl Future<Output = Result<AirQuality, SourceError>> + Send;
}
