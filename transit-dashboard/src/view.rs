//! View model for the dashboard UI.
//!
//! Turns a [`DashboardSnapshot`] and the current search text into the data a
//! renderer needs. Rendering itself lives outside this crate.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dashboard::DashboardSnapshot;
use crate::domain::{AirQuality, Departure, Station, StationId, Weather};
use crate::map::MapScene;
use crate::slot::ResourceState;

/// Stations whose name or city contains `query`, ignoring case.
///
/// Surrounding whitespace in `query` is ignored; an empty query keeps every
/// station. Order is preserved.
pub fn filter_stations<'a>(stations: &'a [Station], query: &str) -> Vec<&'a Station> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return stations.iter().collect();
    }

    stations
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle)
                || s
                    .city
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&needle))
        })
        .collect()
}

/// One row of the station list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRow {
    pub id: StationId,
    pub name: String,
    pub city: Option<String>,
    /// Whether the station appears on the map.
    pub on_map: bool,
    pub selected: bool,
}

/// One departure, with its time formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartureRow {
    #[serde(flatten)]
    pub departure: Departure,
    pub eta_label: String,
}

/// Loading and error indicator for one section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionStatus {
    pub loading: bool,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> From<&ResourceState<T>> for SectionStatus {
    fn from(state: &ResourceState<T>) -> Self {
        Self {
            loading: state.is_loading,
            error: state.error.clone(),
            updated_at: state.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sections {
    pub stations: SectionStatus,
    pub departures: SectionStatus,
    pub weather: SectionStatus,
    pub air_quality: SectionStatus,
}

/// Everything the UI renders.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub query: String,
    pub stations: Vec<StationRow>,
    /// Number of stations matching the query.
    pub station_count: usize,
    pub total_stations: usize,
    pub selected: Option<Station>,
    pub departures: Vec<DepartureRow>,
    pub weather: Option<Weather>,
    pub air_quality: Option<AirQuality>,
    pub status: Sections,
    pub map: Option<MapScene>,
}

impl DashboardView {
    pub fn compose(snapshot: &DashboardSnapshot, query: &str) -> Self {
        let all = snapshot
            .stations
            .value
            .as_ref()
            .map(|set| set.as_slice())
            .unwrap_or_default();
        let selected_id = snapshot.selected.as_ref().map(|s| &s.id);

        let stations: Vec<StationRow> = filter_stations(all, query)
            .into_iter()
            .map(|s| StationRow {
                id: s.id.clone(),
                name: s.name.clone(),
                city: s.city.clone(),
                on_map: snapshot.has_marker(&s.id),
                selected: selected_id == Some(&s.id),
            })
            .collect();

        let departures = snapshot
            .departures
            .value
            .iter()
            .flatten()
            .map(|d| DepartureRow {
                eta_label: d.eta.to_string(),
                departure: d.clone(),
            })
            .collect();

        Self {
            query: query.trim().to_string(),
            station_count: stations.len(),
            total_stations: all.len(),
            stations,
            selected: snapshot.selected.clone(),
            departures,
            weather: snapshot.weather.value.clone(),
            air_quality: snapshot.air_quality.value.clone(),
            status: Sections {
                stations: (&snapshot.stations).into(),
                departures: (&snapshot.departures).into(),
                weather: (&snapshot.weather).into(),
                air_quality: (&snapshot.air_quality).into(),
            },
            map: snapshot.map.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Eta, LineColor, StationSet};
    use crate::map::MapPhase;

    fn station(code: &str, name: &str, city: Option<&str>) -> Station {
        let s = Station::new(StationId::parse(code).unwrap(), name);
        match city {
            Some(c) => s.with_city(c),
            None => s,
        }
    }

    fn sample() -> Vec<Station> {
        vec![
            station("EMBR", "Embarcadero", Some("San Francisco"))
                .with_position(37.792976, -122.396742),
            station("GLEN", "Glen Park", Some("San Francisco")),
            station("FRMT", "Fremont", Some("Fremont")),
            station("OAKL", "Oakland International Airport", None),
        ]
    }

    fn names<'a>(stations: &[&'a Station]) -> Vec<&'a str> {
        stations.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn query_matches_name_only_where_it_appears() {
        let stations = &sample()[..2];
        assert_eq!(names(&filter_stations(stations, "glen")), vec!["Glen Park"]);
    }

    #[test]
    fn query_is_case_insensitive_and_trimmed() {
        let stations = sample();
        assert_eq!(names(&filter_stations(&stations, "  GLEN ")), vec!["Glen Park"]);
    }

    #[test]
    fn query_matches_city() {
        let stations = sample();
        assert_eq!(
            names(&filter_stations(&stations, "san fran")),
            vec!["Embarcadero", "Glen Park"]
        );
    }

    #[test]
    fn empty_query_keeps_everything() {
        let stations = sample();
        assert_eq!(filter_stations(&stations, "").len(), 4);
        assert_eq!(filter_stations(&stations, "   ").len(), 4);
    }

    #[test]
    fn station_without_city_only_matches_name() {
        let stations = sample();
        assert_eq!(
            names(&filter_stations(&stations, "airport")),
            vec!["Oakland International Airport"]
        );
        assert!(filter_stations(&stations, "oakland city").is_empty());
    }

    fn snapshot(selected: Option<Station>) -> DashboardSnapshot {
        let set: StationSet = sample().into();
        let markers = set.positioned().map(|(s, _)| s.id.clone()).collect();
        DashboardSnapshot {
            stations: ResourceState {
                value: Some(set),
                ..ResourceState::default()
            },
            selected,
            departures: ResourceState {
                value: Some(vec![Departure {
                    destination: "Richmond".to_string(),
                    eta: Eta::Now,
                    cars: 10,
                    platform: "1".to_string(),
                    line: LineColor::new("RED", None),
                    direction: None,
                    delay_secs: 0,
                }]),
                ..ResourceState::default()
            },
            weather: ResourceState {
                is_loading: true,
                ..ResourceState::default()
            },
            air_quality: ResourceState {
                error: Some("failed to load aqi: API error 503: down".to_string()),
                ..ResourceState::default()
            },
            map_phase: MapPhase::Stations,
            markers,
            map: None,
        }
    }

    #[test]
    fn compose_marks_selection_and_filters() {
        let selected = sample().into_iter().nth(1);
        let view = DashboardView::compose(&snapshot(selected), "san");

        assert_eq!(view.station_count, 2);
        assert_eq!(view.total_stations, 4);
        let flags: Vec<(&str, bool, bool)> = view
            .stations
            .iter()
            .map(|r| (r.id.as_str(), r.on_map, r.selected))
            .collect();
        assert_eq!(flags, vec![("EMBR", true, false), ("GLEN", false, true)]);
    }

    #[test]
    fn compose_reports_section_status() {
        let view = DashboardView::compose(&snapshot(None), "");

        assert!(view.status.weather.loading);
        assert!(view.weather.is_none());
        assert!(view.status.air_quality.error.is_some());
        assert!(view.status.departures.error.is_none());
        assert_eq!(view.departures[0].eta_label, "NOW");
    }

    #[test]
    fn compose_serialises_flat_departures() {
        let view = DashboardView::compose(&snapshot(None), "");
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["departures"][0]["destination"], "Richmond");
        assert_eq!(json["departures"][0]["eta_label"], "NOW");
        assert_eq!(json["stations"][0]["id"], "EMBR");
    }
}
