//! Map sync engine.
//!
//! Keeps one marker per positioned station and the selection highlight in
//! step with the dashboard. A replaced station set is reconciled with a keyed
//! diff; a selection change only restyles markers and moves the camera.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{Coordinate, Station, StationId, StationSet};

use super::backend::{MapBackend, MarkerLabel, MarkerSpec, MarkerStyle};
use super::diff::{MarkerDiff, Placement};

/// Camera defaults for the dashboard map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Where the map opens before anything is selected.
    pub home: Coordinate,
    pub home_zoom: f64,
    /// Zoom used when flying to a selected station.
    pub focus_zoom: f64,
    pub fly_duration: Duration,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            home: Coordinate {
                lat: 37.7749,
                lon: -122.4194,
            },
            home_zoom: 12.0,
            focus_zoom: 14.0,
            fly_duration: Duration::from_millis(800),
        }
    }
}

/// Coarse engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MapPhase {
    Uninitialized,
    /// View set, no station set received yet (or an empty one).
    NoStations,
    Stations,
    Selected,
}

struct Placed<M> {
    marker: M,
    placement: Placement,
    style: MarkerStyle,
}

/// Drives a [`MapBackend`] from station set and selection changes.
pub struct MapSync<B: MapBackend> {
    backend: B,
    config: MapConfig,
    markers: HashMap<StationId, Placed<B::Marker>>,
    selected: Option<StationId>,
    station_count: usize,
    initialized: bool,
}

impl<B: MapBackend> MapSync<B> {
    pub fn new(backend: B, config: MapConfig) -> Self {
        Self {
            backend,
            config,
            markers: HashMap::new(),
            selected: None,
            station_count: 0,
            initialized: false,
        }
    }

    /// Put the camera at the home position. Only the first call has an effect.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.backend
            .set_view(self.config.home, self.config.home_zoom);
        self.initialized = true;
    }

    /// Reconcile markers with a replaced station set.
    ///
    /// Markers whose station vanished or whose position or label changed are
    /// removed; new and changed stations get fresh markers. Unchanged markers
    /// are left alone. Stations without a position get no marker.
    pub fn replace_stations(&mut self, stations: &StationSet) -> MarkerDiff {
        let desired: HashMap<StationId, Placement> = stations
            .positioned()
            .map(|(station, position)| {
                (
                    station.id.clone(),
                    Placement {
                        position,
                        label: MarkerLabel::for_station(station),
                    },
                )
            })
            .collect();

        let diff = MarkerDiff::compute(
            self.markers.iter().map(|(id, placed)| (id, &placed.placement)),
            &desired,
        );

        for id in diff.remove.iter().chain(&diff.replace) {
            if let Some(placed) = self.markers.remove(id) {
                self.backend.remove_marker(placed.marker);
            }
        }

        for id in diff.add.iter().chain(&diff.replace) {
            let Some(placement) = desired.get(id) else {
                continue;
            };
            let style = MarkerStyle::for_selected(self.selected.as_ref() == Some(id));
            let marker = self.backend.add_marker(MarkerSpec {
                station: id,
                position: placement.position,
                label: &placement.label,
                style,
            });
            self.markers.insert(
                id.clone(),
                Placed {
                    marker,
                    placement: placement.clone(),
                    style,
                },
            );
        }

        self.station_count = stations.len();
        info!(
            stations = stations.len(),
            markers = self.markers.len(),
            added = diff.add.len(),
            removed = diff.remove.len(),
            replaced = diff.replace.len(),
            kept = diff.keep.len(),
            "Map markers reconciled"
        );
        diff
    }

    /// Apply a selection change.
    ///
    /// Every marker is restyled to match; the camera flies to the selected
    /// station and opens its label only when that station has a marker.
    pub fn select(&mut self, station: Option<&Station>) {
        self.set_highlight(station.map(|s| &s.id));

        let Some(station) = station else {
            return;
        };
        let Some(placed) = self.markers.get(&station.id) else {
            debug!(station = %station.id, "Selected station has no marker; camera unchanged");
            return;
        };

        self.backend.fly_to(
            placed.placement.position,
            self.config.focus_zoom,
            self.config.fly_duration,
        );
        self.backend.open_label(&placed.marker);
    }

    /// Move the highlight without touching the camera.
    pub fn set_highlight(&mut self, station: Option<&StationId>) {
        self.selected = station.cloned();

        let mut restyled = 0usize;
        for (id, placed) in &mut self.markers {
            let style = MarkerStyle::for_selected(self.selected.as_ref() == Some(id));
            if placed.style != style {
                self.backend.set_marker_style(&mut placed.marker, style);
                placed.style = style;
                restyled += 1;
            }
        }
        debug!(restyled, "Marker highlight updated");
    }

    pub fn phase(&self) -> MapPhase {
        if !self.initialized {
            MapPhase::Uninitialized
        } else if self.station_count == 0 {
            MapPhase::NoStations
        } else if self.selected.is_some() {
            MapPhase::Selected
        } else {
            MapPhase::Stations
        }
    }

    pub fn has_marker(&self, station: &StationId) -> bool {
        self.markers.contains_key(station)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn highlighted(&self) -> Option<&StationId> {
        self.selected.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
