//! The dashboard: single owner of all client-side state.
//!
//! [`Dashboard`] is sans-IO. It consumes discrete [`Event`]s (user intents,
//! marker clicks, fetch settlements, refresh ticks) and queues the fetches
//! they imply as [`Command`]s. [`Runtime`] performs those fetches on tokio and
//! feeds the results back in.

mod runtime;


use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{AirQuality, Departure, Station, StationId, StationSet, Weather};
use crate::map::{MapBackend, MapConfig, MapPhase, MapScene, MapSync};
use crate::selection::{DeparturesRequest, Rebind, SelectionController};
use crate::slot::{Resource, ResourceState, Settle, Slot, Ticket};
use crate::source::SourceError;

pub use runtime::{DashboardHandle, Runtime, RuntimeStopped};

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Select a station from the list.
    Select(StationId),
    /// Reload departures for the current selection.
    Refresh,
    /// Reload one resource.
    Reload(Resource),
    /// Stop the runtime.
    Shutdown,
}

/// The result of one fetch, addressed to the slot that issued it.
#[derive(Debug)]
pub enum Settlement {
    Stations {
        ticket: Ticket,
        result: Result<Vec<Station>, SourceError>,
    },
    Departures {
        ticket: Ticket,
        station: StationId,
        result: Result<Vec<Departure>, SourceError>,
    },
    Weather {
        ticket: Ticket,
        result: Result<Weather, SourceError>,
    },
    AirQuality {
        ticket: Ticket,
        result: Result<AirQuality, SourceError>,
    },
}

/// One discrete input to the dashboard.
#[derive(Debug)]
pub enum Event {
    Intent(Intent),
    /// A map marker was clicked.
    MarkerClicked(StationId),
    Settled(Settlement),
    /// Periodic departures refresh.
    RefreshTick,
}

/// A fetch the dashboard wants performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Stations(Ticket),
    Departures(DeparturesRequest),
    Weather(Ticket),
    AirQuality(Ticket),
}

impl FetchRequest {
    pub fn resource(&self) -> Resource {
        match self {
            FetchRequest::Stations(_) => Resource::Stations,
            FetchRequest::Departures(_) => Resource::Departures,
            FetchRequest::Weather(_) => Resource::Weather,
            FetchRequest::AirQuality(_) => Resource::AirQuality,
        }
    }
}

/// Work queued by [`Dashboard::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fetch(FetchRequest),
    /// Any in-flight fetch for this resource is no longer wanted.
    Cancel(Resource),
}

/// Whether the event loop should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Everything a view needs, detached from the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub stations: ResourceState<StationSet>,
    pub selected: Option<Station>,
    pub departures: ResourceState<Vec<Departure>>,
    pub weather: ResourceState<Weather>,
    pub air_quality: ResourceState<AirQuality>,
    pub map_phase: MapPhase,
    /// Stations with a marker on the map, in list order.
    pub markers: Vec<StationId>,
    pub map: Option<MapScene>,
}

impl DashboardSnapshot {
    /// Whether `id` is in the loaded station set.
    pub fn has_station(&self, id: &StationId) -> bool {
        self.stations.value.as_ref().is_some_and(|s| s.contains(id))
    }

    /// Whether `id` has a marker that could have been clicked.
    pub fn has_marker(&self, id: &StationId) -> bool {
        self.markers.contains(id)
    }
}

/// Resource slots, selection and map, updated one event at a time.
pub struct Dashboard<M: MapBackend> {
    stations: Slot<StationSet>,
    weather: Slot<Weather>,
    air_quality: Slot<AirQuality>,
    selection: SelectionController,
    map: MapSync<M>,
    commands: Vec<Command>,
}

impl<M: MapBackend> Dashboard<M> {
    /// Create a dashboard and queue the stations, weather and air quality loads.
    pub fn new(backend: M, config: MapConfig) -> Self {
        let mut map = MapSync::new(backend, config);
        map.initialize();

        let mut dashboard = Self {
            stations: Slot::keep_stale(Resource::Stations),
            weather: Slot::keep_stale(Resource::Weather),
            air_quality: Slot::keep_stale(Resource::AirQuality),
            selection: SelectionController::new(),
            map,
            commands: Vec::new(),
        };
        dashboard.reload(Resource::Stations);
        dashboard.reload(Resource::Weather);
        dashboard.reload(Resource::AirQuality);
        dashboard
    }

    /// Process one event. Never blocks; fetches are queued.
    pub fn handle(&mut self, event: Event) -> Flow {
        match event {
            Event::Intent(Intent::Select(id)) => self.select(&id),
            Event::MarkerClicked(id) => {
                if self.map.has_marker(&id) {
                    debug!(station = %id, "Marker clicked");
                    self.select(&id);
                } else {
                    warn!(station = %id, "Ignoring click on missing marker");
                }
            }
            Event::Intent(Intent::Refresh) | Event::RefreshTick => self.refresh(),
            Event::Intent(Intent::Reload(resource)) => self.reload(resource),
            Event::Intent(Intent::Shutdown) => return Flow::Stop,
            Event::Settled(settlement) => self.settle(settlement),
        }
        Flow::Continue
    }

    /// Drain the commands queued so far.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    fn select(&mut self, id: &StationId) {
        let Some(station) = self.stations.value().and_then(|s| s.get(id)).cloned() else {
            warn!(station = %id, "Ignoring selection of unknown station");
            return;
        };

        self.map.select(Some(&station));
        let request = self.selection.select(station);
        self.fetch(FetchRequest::Departures(request));
    }

    fn refresh(&mut self) {
        if let Some(request) = self.selection.refresh() {
            self.fetch(FetchRequest::Departures(request));
        }
    }

    fn reload(&mut self, resource: Resource) {
        let request = match resource {
            Resource::Stations => FetchRequest::Stations(self.stations.begin()),
            Resource::Weather => FetchRequest::Weather(self.weather.begin()),
            Resource::AirQuality => FetchRequest::AirQuality(self.air_quality.begin()),
            Resource::Departures => {
                self.refresh();
                return;
            }
        };
        self.fetch(request);
    }

    fn fetch(&mut self, request: FetchRequest) {
        self.commands.push(Command::Fetch(request));
    }

    fn settle(&mut self, settlement: Settlement) {
        match settlement {
            Settlement::Stations { ticket, result } => {
                let result = result.map(StationSet::from);
                let changed = matches!(&result, Ok(set) if self.stations.value() != Some(set));
                if self.stations.settle(ticket, result) == Settle::Applied && changed {
                    self.stations_replaced();
                }
            }
            Settlement::Departures {
                ticket,
                station,
                result,
            } => {
                self.selection.settle(ticket, &station, result);
            }
            Settlement::Weather { ticket, result } => {
                self.weather.settle(ticket, result);
            }
            Settlement::AirQuality { ticket, result } => {
                self.air_quality.settle(ticket, result);
            }
        }
    }

    fn stations_replaced(&mut self) {
        let Some(stations) = self.stations.value() else {
            return;
        };
        info!(
            count = stations.len(),
            positioned = stations.positioned().count(),
            "Station set replaced"
        );

        let rebind = self.selection.rebind(stations);
        self.map.replace_stations(stations);
        if rebind == Rebind::Cleared {
            self.map.set_highlight(None);
            self.commands.push(Command::Cancel(Resource::Departures));
        }
    }

    /// Take a detached copy of the current state.
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            stations: self.stations.state().clone(),
            selected: self.selection.current().cloned(),
            departures: self.selection.departures().clone(),
            weather: self.weather.state().clone(),
            air_quality: self.air_quality.state().clone(),
            map_phase: self.map.phase(),
            markers: self
                .stations
                .value()
                .map(|set| {
                    set.iter()
                        .filter(|s| self.map.has_marker(&s.id))
                        .map(|s| s.id.clone())
                        .collect()
                })
                .unwrap_or_default(),
            map: self.map.backend().scene(),
        }
    }

    pub fn stations(&self) -> &ResourceState<StationSet> {
        self.stations.state()
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn weather(&self) -> &ResourceState<Weather> {
        self.weather.state()
    }

    pub fn air_quality(&self) -> &ResourceState<AirQuality> {
        self.air_quality.state()
    }

    pub fn map(&self) -> &MapSync<M> {
        &self.map
    }
}
