//! Station identity, coordinates and the deduplicated station set.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length of a station code.
const MAX_ID_LEN: usize = 8;

/// Error returned when parsing an invalid station code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station code: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// A valid short station code (e.g. `EMBR`, `12TH`).
///
/// Codes are 1 to 8 uppercase ASCII letters or digits. This type guarantees
/// that any `StationId` value is valid by construction.
///
/// # Examples
///
/// ```
/// use transit_dashboard::domain::StationId;
///
/// let embr = StationId::parse("EMBR").unwrap();
/// assert_eq!(embr.as_str(), "EMBR");
///
/// // Lowercase is rejected by the strict parser...
/// assert!(StationId::parse("embr").is_err());
///
/// // ...but accepted once normalized
/// assert_eq!(StationId::parse_normalized(" embr ").unwrap(), embr);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    /// Parse a station code from a string.
    ///
    /// The input must be 1 to 8 uppercase ASCII letters or digits.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        if s.is_empty() {
            return Err(InvalidStationId {
                reason: "must not be empty",
            });
        }

        if s.len() > MAX_ID_LEN {
            return Err(InvalidStationId {
                reason: "must be at most 8 characters",
            });
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(InvalidStationId {
                reason: "must be uppercase ASCII letters or digits",
            });
        }

        Ok(StationId(s.to_string()))
    }

    /// Parse a station code after trimming whitespace and uppercasing.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidStationId> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the station code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StationId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        StationId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Build a coordinate from optional wire values.
    ///
    /// Returns `None` when either half is missing, non-finite, out of range,
    /// or exactly zero (feeds use 0 as a "no position" placeholder).
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        let (lat, lon) = (lat?, lon?);

        let usable = |v: f64, bound: f64| v.is_finite() && v != 0.0 && v.abs() <= bound;
        if !usable(lat, 90.0) || !usable(lon, 180.0) {
            return None;
        }

        Some(Coordinate { lat, lon })
    }
}

/// A transit station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub city: Option<String>,
    /// Stations without a position are listed but never placed on the map.
    pub position: Option<Coordinate>,
    pub address: Option<String>,
    pub zipcode: Option<String>,
}

impl Station {
    /// Create a station with just an identifier and name.
    pub fn new(id: StationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            city: None,
            position: None,
            address: None,
            zipcode: None,
        }
    }

    /// Set the city.
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Set the position.
    pub fn with_position(mut self, lat: f64, lon: f64) -> Self {
        self.position = Coordinate::from_parts(Some(lat), Some(lon));
        self
    }
}

/// The working set of stations from one stations load.
///
/// Identifiers are unique: a later duplicate overwrites the content of the
/// earlier entry but keeps its position in the ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StationSet {
    stations: Vec<Station>,
    #[serde(skip)]
    index: HashMap<StationId, usize>,
}

impl StationSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a station by identifier.
    pub fn get(&self, id: &StationId) -> Option<&Station> {
        self.index.get(id).map(|&i| &self.stations[i])
    }

    /// Check whether a station is present.
    pub fn contains(&self, id: &StationId) -> bool {
        self.index.contains_key(id)
    }

    /// Iterate stations in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, Station> {
        self.stations.iter()
    }

    /// Stations as a slice, in load order.
    pub fn as_slice(&self) -> &[Station] {
        &self.stations
    }

    /// Stations that can be placed on a map.
    pub fn positioned(&self) -> impl Iterator<Item = (&Station, Coordinate)> {
        self.stations
            .iter()
            .filter_map(|s| s.position.map(|p| (s, p)))
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

impl FromIterator<Station> for StationSet {
    fn from_iter<I: IntoIterator<Item = Station>>(iter: I) -> Self {
        let mut set = StationSet::new();
        for station in iter {
            match set.index.get(&station.id) {
                Some(&i) => set.stations[i] = station,
                None => {
                    set.index.insert(station.id.clone(), set.stations.len());
                    set.stations.push(station);
                }
            }
        }
        set
    }
}

impl From<Vec<Station>> for StationSet {
    fn from(stations: Vec<Station>) -> Self {
        stations.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a StationSet {
    type Item = &'a Station;
    type IntoIter = std::slice::Iter<'a, Station>;

    fn into_iter(self) -> Self::IntoIter {
        self.stations.iter()
    }
}
