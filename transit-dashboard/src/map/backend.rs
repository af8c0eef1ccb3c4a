//! Capabilities the map sync engine needs from a rendering library.

use std::time::Duration;

use serde::Serialize;

use crate::domain::{Coordinate, Station, StationId};

/// Visual variant of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStyle {
    Normal,
    Selected,
}

impl MarkerStyle {
    pub fn for_selected(selected: bool) -> Self {
        if selected {
            MarkerStyle::Selected
        } else {
            MarkerStyle::Normal
        }
    }
}

/// Label payload shown when a marker is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerLabel {
    pub name: String,
    pub city: Option<String>,
}

impl MarkerLabel {
    pub fn for_station(station: &Station) -> Self {
        Self {
            name: station.name.clone(),
            city: station.city.clone(),
        }
    }
}

/// Everything needed to create one marker.
#[derive(Debug, Clone, Copy)]
pub struct MarkerSpec<'a> {
    /// Station the marker represents; clicks are reported with this id.
    pub station: &'a StationId,
    pub position: Coordinate,
    pub label: &'a MarkerLabel,
    pub style: MarkerStyle,
}

/// A rendering library as seen by the map sync engine.
///
/// Click delivery is the backend's job: a click on a marker must be reported
/// to the dashboard as a marker click carrying the marker's station id.
pub trait MapBackend {
    /// Owned handle to a created marker.
    type Marker;

    /// Set the camera without animation.
    fn set_view(&mut self, center: Coordinate, zoom: f64);

    /// Create a marker and place it on the map.
    fn add_marker(&mut self, spec: MarkerSpec<'_>) -> Self::Marker;

    /// Remove a marker from the map.
    fn remove_marker(&mut self, marker: Self::Marker);

    /// Swap a marker's visual variant in place.
    fn set_marker_style(&mut self, marker: &mut Self::Marker, style: MarkerStyle);

    /// Animate the camera to a new center and zoom.
    fn fly_to(&mut self, center: Coordinate, zoom: f64, duration: Duration);

    /// Surface a marker's label.
    fn open_label(&mut self, marker: &Self::Marker);

    /// A serialisable description of what is on screen, for backends that keep one.
    fn scene(&self) -> Option<super::MapScene> {
        None
    }
}
