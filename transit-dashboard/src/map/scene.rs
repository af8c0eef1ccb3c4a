//! In-memory map backend.
//!
//! Keeps an inspectable scene instead of drawing anything: markers with their
//! style, the camera and the open label. The web surface serialises the scene
//! for a browser-side map to mirror, and tests use it to observe churn.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use crate::domain::{Coordinate, StationId};

use super::backend::{MapBackend, MarkerLabel, MarkerSpec, MarkerStyle};

/// Handle to a marker in a [`SceneMap`]. Ids are never reused.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneMarker(u64);

impl SceneMarker {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// One marker as it appears in the scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub marker_id: u64,
    pub station: StationId,
    pub position: Coordinate,
    pub label: MarkerLabel,
    pub style: MarkerStyle,
}

/// Camera position, with the animation used to get there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraView {
    pub center: Coordinate,
    pub zoom: f64,
    pub animation_ms: u64,
}

/// Serialisable description of the map.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MapScene {
    pub markers: Vec<MarkerView>,
    pub camera: Option<CameraView>,
    pub open_label: Option<StationId>,
}

/// Operation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SceneStats {
    pub added: usize,
    pub removed: usize,
    pub restyled: usize,
    pub flights: usize,
}

/// Map backend that records state instead of rendering.
#[derive(Debug, Default)]
pub struct SceneMap {
    next_id: u64,
    markers: BTreeMap<u64, MarkerView>,
    camera: Option<CameraView>,
    open_label: Option<u64>,
    stats: SceneStats,
}

impl SceneMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    pub fn camera(&self) -> Option<CameraView> {
        self.camera
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// The live marker for a station, if one is placed.
    pub fn marker_for(&self, station: &StationId) -> Option<&MarkerView> {
        self.markers.values().find(|m| &m.station == station)
    }

    /// Station whose label is open.
    pub fn labelled_station(&self) -> Option<&StationId> {
        self.open_label
            .and_then(|id| self.markers.get(&id))
            .map(|m| &m.station)
    }

    pub fn snapshot(&self) -> MapScene {
        MapScene {
            markers: self.markers.values().cloned().collect(),
            camera: self.camera,
            open_label: self.labelled_station().cloned(),
        }
    }
}

impl MapBackend for SceneMap {
    type Marker = SceneMarker;

    fn set_view(&mut self, center: Coordinate, zoom: f64) {
        self.camera = Some(CameraView {
            center,
            zoom,
            animation_ms: 0,
        });
    }

    fn add_marker(&mut self, spec: MarkerSpec<'_>) -> SceneMarker {
        self.next_id += 1;
        self.markers.insert(
            self.next_id,
            MarkerView {
                marker_id: self.next_id,
                station: spec.station.clone(),
                position: spec.position,
                label: spec.label.clone(),
                style: spec.style,
            },
        );
        self.stats.added += 1;
        SceneMarker(self.next_id)
    }

    fn remove_marker(&mut self, marker: SceneMarker) {
        if self.markers.remove(&marker.0).is_some() {
            self.stats.removed += 1;
        }
        if self.open_label == Some(marker.0) {
            self.open_label = None;
        }
    }

    fn set_marker_style(&mut self, marker: &mut SceneMarker, style: MarkerStyle) {
        if let Some(view) = self.markers.get_mut(&marker.0) {
            view.style = style;
            self.stats.restyled += 1;
        }
    }

    fn fly_to(&mut self, center: Coordinate, zoom: f64, duration: Duration) {
        self.camera = Some(CameraView {
            center,
            zoom,
            animation_ms: duration.as_millis() as u64,
        });
        self.stats.flights += 1;
    }

    fn open_label(&mut self, marker: &SceneMarker) {
        if self.markers.contains_key(&marker.0) {
            self.open_label = Some(marker.0);
        }
    }

    fn scene(&self) -> Option<MapScene> {
        Some(self.snapshot())
    }
}
