//! Domain types for the transit dashboard.
//!
//! These are the validated shapes the rest of the crate works with. Wire
//! payloads are converted into them at the source boundary, so code that
//! receives these types can trust their invariants.

mod departure;
mod station;
mod weather;

pub use departure::{DEFAULT_LINE_HEX, Departure, Eta, LineColor};
pub use station::{Coordinate, InvalidStationId, Station, StationId, StationSet};
pub use weather::{AirQuality, Pollutants, Weather};
