//! Scripted data source for tests and offline runs.
//!
//! Responses are queued per resource and handed out in order. A queued
//! response can be gated behind a oneshot so the caller decides when (and in
//! what order) fetches settle.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::domain::{AirQuality, Departure, Station, StationId, Weather};
use crate::slot::Resource;

use super::DataSource;
use super::error::SourceError;

/// Status reported for scripted failures.
const SCRIPTED_FAILURE_STATUS: u16 = 503;

type Outcome<T> = Result<T, String>;

enum Response<T> {
    Ready(Outcome<T>),
    Gated(oneshot::Receiver<Outcome<T>>),
}

/// Handle used to settle a gated response.
#[must_use = "a gated fetch stays pending until the gate is opened or dropped"]
pub struct Gate<T> {
    tx: oneshot::Sender<Outcome<T>>,
}

impl<T> Gate<T> {
    /// Let the fetch succeed with `value`.
    pub fn succeed(self, value: T) {
        let _ = self.tx.send(Ok(value));
    }

    /// Let the fetch fail with `message`.
    pub fn fail(self, message: impl Into<String>) {
        let _ = self.tx.send(Err(message.into()));
    }
}

#[derive(Default)]
struct Script {
    stations: VecDeque<Response<Vec<Station>>>,
    departures: HashMap<StationId, VecDeque<Response<Vec<Departure>>>>,
    weather: VecDeque<Response<Weather>>,
    air_quality: VecDeque<Response<AirQuality>>,
    calls: HashMap<Resource, usize>,
    departure_calls: Vec<StationId>,
}

/// In-memory `DataSource` that replays queued responses.
///
/// A fetch with nothing queued fails, which keeps unexpected calls visible.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    script: Arc<Mutex<Script>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_script<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
        let mut guard = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn push_stations(&self, outcome: Outcome<Vec<Station>>) -> &Self {
        self.with_script(|s| s.stations.push_back(Response::Ready(outcome)));
        self
    }

    pub fn push_departures(&self, station: &StationId, outcome: Outcome<Vec<Departure>>) -> &Self {
        self.with_script(|s| {
            s.departures
                .entry(station.clone())
                .or_default()
                .push_back(Response::Ready(outcome))
        });
        self
    }

    pub fn push_weather(&self, outcome: Outcome<Weather>) -> &Self {
        self.with_script(|s| s.weather.push_back(Response::Ready(outcome)));
        self
    }

    pub fn push_air_quality(&self, outcome: Outcome<AirQuality>) -> &Self {
        self.with_script(|s| s.air_quality.push_back(Response::Ready(outcome)));
        self
    }

    /// Queue a stations response that settles when the gate is opened.
    pub fn gate_stations(&self) -> Gate<Vec<Station>> {
        let (tx, rx) = oneshot::channel();
        self.with_script(|s| s.stations.push_back(Response::Gated(rx)));
        Gate { tx }
    }

    /// Queue a departures response for `station` that settles when the gate is opened.
    pub fn gate_departures(&self, station: &StationId) -> Gate<Vec<Departure>> {
        let (tx, rx) = oneshot::channel();
        self.with_script(|s| {
            s.departures
                .entry(station.clone())
                .or_default()
                .push_back(Response::Gated(rx))
        });
        Gate { tx }
    }

    pub fn gate_weather(&self) -> Gate<Weather> {
        let (tx, rx) = oneshot::channel();
        self.with_script(|s| s.weather.push_back(Response::Gated(rx)));
        Gate { tx }
    }

    /// Number of fetches issued for a resource.
    pub fn calls(&self, resource: Resource) -> usize {
        self.with_script(|s| s.calls.get(&resource).copied().unwrap_or(0))
    }

    /// Stations that departures were requested for, in call order.
    pub fn departure_calls(&self) -> Vec<StationId> {
        self.with_script(|s| s.departure_calls.clone())
    }
}

async fn settle<T>(response: Option<Response<T>>, resource: Resource) -> Result<T, SourceError> {
    let outcome = match response {
        Some(Response::Ready(outcome)) => outcome,
        Some(Response::Gated(rx)) => rx
            .await
            .unwrap_or_else(|_| Err("gate dropped".to_string())),
        None => Err(format!("no scripted {resource} response")),
    };

    outcome.map_err(|message| SourceError::Api {
        status: SCRIPTED_FAILURE_STATUS,
        message,
    })
}

impl DataSource for ScriptedSource {
    async fn stations(&self) -> Result<Vec<Station>, SourceError> {
        let next = self.with_script(|s| {
            *s.calls.entry(Resource::Stations).or_default() += 1;
            s.stations.pop_front()
        });
        settle(next, Resource::Stations).await
    }

    async fn departures(&self, station: &StationId) -> Result<Vec<Departure>, SourceError> {
        let next = self.with_script(|s| {
            *s.calls.entry(Resource::Departures).or_default() += 1;
            s.departure_calls.push(station.clone());
            s.departures.get_mut(station).and_then(VecDeque::pop_front)
        });
        settle(next, Resource::Departures).await
    }

    async fn weather(&self) -> Result<Weather, SourceError> {
        let next = self.with_script(|s| {
            *s.calls.entry(Resource::Weather).or_default() += 1;
            s.weather.pop_front()
        });
        settle(next, Resource::Weather).await
    }

    async fn air_quality(&self) -> Result<AirQuality, SourceError> {
        let next = self.with_script(|s| {
            *s.calls.entry(Resource::AirQuality).or_default() += 1;
            s.air_quality.pop_front()
        });
        settle(next, Resource::AirQuality).await
    }
}
