//! Async resource slots.
//!
//! A slot wraps one fetchable resource with loading/error/value state. Each
//! reload is issued a [`Ticket`]; only the most recently issued ticket may
//! change the slot when it settles, so the visible state always reflects the
//! last request issued regardless of the order responses arrive in.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

/// The independently loaded dashboard resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Stations,
    Departures,
    Weather,
    AirQuality,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Stations => "stations",
            Resource::Departures => "departures",
            Resource::Weather => "weather",
            Resource::AirQuality => "aqi",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown resource name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource: {0}")]
pub struct UnknownResource(String);

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stations" => Ok(Resource::Stations),
            "departures" => Ok(Resource::Departures),
            "weather" => Ok(Resource::Weather),
            "aqi" | "air_quality" => Ok(Resource::AirQuality),
            _ => Err(UnknownResource(s.to_string())),
        }
    }
}

/// Identifies one issued reload of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// What happens to the value when a reload fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// Keep the last good value alongside the error.
    KeepStale,
    /// Replace the value with the slot's empty value.
    Reset,
}

/// Outcome of offering a settlement to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// The result was stored.
    Applied,
    /// A newer reload has been issued; the result was discarded.
    Superseded,
}

/// Visible state of one resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceState<T> {
    pub is_loading: bool,
    pub error: Option<String>,
    pub value: Option<T>,
    /// When the value was last replaced by a successful load.
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            is_loading: false,
            error: None,
            value: None,
            updated_at: None,
        }
    }
}

/// Loading/error/value cell for one resource.
#[derive(Debug, Clone)]
pub struct Slot<T> {
    resource: Resource,
    state: ResourceState<T>,
    issued: u64,
    on_failure: OnFailure,
    empty: Option<T>,
}

impl<T: Clone> Slot<T> {
    /// A slot that keeps its last good value when a reload fails.
    pub fn keep_stale(resource: Resource) -> Self {
        Self {
            resource,
            state: ResourceState::default(),
            issued: 0,
            on_failure: OnFailure::KeepStale,
            empty: None,
        }
    }

    /// A slot that replaces its value with `empty` when a reload fails.
    pub fn reset_on_failure(resource: Resource, empty: T) -> Self {
        Self {
            resource,
            state: ResourceState {
                value: Some(empty.clone()),
                ..ResourceState::default()
            },
            issued: 0,
            on_failure: OnFailure::Reset,
            empty: Some(empty),
        }
    }

    /// Start a reload: marks the slot loading and clears the error.
    ///
    /// Any ticket issued before this one is superseded.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.state.is_loading = true;
        self.state.error = None;
        debug!(resource = %self.resource, ticket = self.issued, "Reload issued");
        Ticket(self.issued)
    }

    /// Whether `ticket` is the most recently issued one.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.issued != 0 && ticket.0 == self.issued
    }

    /// Offer the result of a reload to the slot.
    pub fn settle<E: fmt::Display>(&mut self, ticket: Ticket, result: Result<T, E>) -> Settle {
        if !self.is_current(ticket) {
            debug!(
                resource = %self.resource,
                ticket = ticket.0,
                latest = self.issued,
                "Discarding superseded result"
            );
            return Settle::Superseded;
        }

        self.state.is_loading = false;
        match result {
            Ok(value) => {
                self.state.value = Some(value);
                self.state.error = None;
                self.state.updated_at = Some(Utc::now());
            }
            Err(e) => {
                warn!(resource = %self.resource, error = %e, "Load failed");
                self.state.error = Some(format!("failed to load {}: {}", self.resource, e));
                if self.on_failure == OnFailure::Reset {
                    self.state.value = self.empty.clone();
                }
            }
        }
        Settle::Applied
    }

    /// Return to idle: discard any outstanding reload and reset the value.
    ///
    /// For a keep-stale slot the value is dropped entirely.
    pub fn clear(&mut self) {
        self.issued += 1;
        self.state = ResourceState {
            value: self.empty.clone(),
            ..ResourceState::default()
        };
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn state(&self) -> &ResourceState<T> {
        &self.state
    }

    pub fn value(&self) -> Option<&T> {
        self.state.value.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_slot() -> Slot<u32> {
        Slot::keep_stale(Resource::Weather)
    }

    #[test]
    fn idle_until_begun() {
        let slot = weather_slot();
        assert!(!slot.is_loading());
        assert!(slot.value().is_none());
        assert!(slot.error().is_none());
    }

    #[test]
    fn begin_sets_loading_and_clears_error() {
        let mut slot = weather_slot();
        let t = slot.begin();
        slot.settle(t, Err::<u32, _>("boom"));
        assert!(slot.error().is_some());

        slot.begin();
        assert!(slot.is_loading());
        assert!(slot.error().is_none());
    }

    #[test]
    fn success_stores_value() {
        let mut slot = weather_slot();
        let t = slot.begin();
        assert_eq!(slot.settle(t, Ok::<_, String>(62)), Settle::Applied);
        assert_eq!(slot.value(), Some(&62));
        assert!(!slot.is_loading());
        assert!(slot.state().updated_at.is_some());
    }

    #[test]
    fn failure_keeps_stale_value() {
        let mut slot = weather_slot();
        let t = slot.begin();
        slot.settle(t, Ok::<_, String>(62));

        let t = slot.begin();
        slot.settle(t, Err::<u32, _>("API error 502: upstream"));

        assert_eq!(slot.value(), Some(&62));
        assert_eq!(
            slot.error(),
            Some("failed to load weather: API error 502: upstream")
        );
        assert!(!slot.is_loading());
    }

    #[test]
    fn failure_resets_when_configured() {
        let mut slot: Slot<Vec<u32>> = Slot::reset_on_failure(Resource::Departures, Vec::new());
        assert_eq!(slot.value(), Some(&vec![]));

        let t = slot.begin();
        slot.settle(t, Ok::<_, String>(vec![1, 2, 3]));

        let t = slot.begin();
        slot.settle(t, Err::<Vec<u32>, _>("timeout"));

        assert_eq!(slot.value(), Some(&vec![]));
        assert!(slot.error().is_some());
    }

    #[test]
    fn superseded_result_is_discarded() {
        let mut slot = weather_slot();
        let first = slot.begin();
        let second = slot.begin();

        assert_eq!(slot.settle(second, Ok::<_, String>(2)), Settle::Applied);
        assert_eq!(slot.settle(first, Ok::<_, String>(1)), Settle::Superseded);
        assert_eq!(slot.value(), Some(&2));
    }

    #[test]
    fn loading_until_latest_settles() {
        let mut slot = weather_slot();
        let first = slot.begin();
        let _second = slot.begin();

        slot.settle(first, Ok::<_, String>(1));
        assert!(slot.is_loading());
        assert!(slot.value().is_none());
    }

    #[test]
    fn superseded_failure_does_not_touch_state() {
        let mut slot = weather_slot();
        let first = slot.begin();
        let second = slot.begin();
        slot.settle(second, Ok::<_, String>(7));
        slot.settle(first, Err::<u32, _>("late failure"));
        assert!(slot.error().is_none());
        assert_eq!(slot.value(), Some(&7));
    }

    #[test]
    fn clear_discards_outstanding() {
        let mut slot: Slot<Vec<u32>> = Slot::reset_on_failure(Resource::Departures, Vec::new());
        let t = slot.begin();
        slot.clear();

        assert!(!slot.is_loading());
        assert_eq!(slot.settle(t, Ok::<_, String>(vec![9])), Settle::Superseded);
        assert_eq!(slot.value(), Some(&vec![]));
    }

    #[test]
    fn fresh_ticket_is_never_current_before_begin() {
        let slot = weather_slot();
        assert!(!slot.is_current(Ticket(0)));
    }

    #[test]
    fn resource_names_roundtrip() {
        for r in [
            Resource::Stations,
            Resource::Departures,
            Resource::Weather,
            Resource::AirQuality,
        ] {
            assert_eq!(r.as_str().parse::<Resource>().unwrap(), r);
        }
        assert_eq!("AIR_QUALITY".parse::<Resource>().unwrap(), Resource::AirQuality);
        assert!("traffic".parse::<Resource>().is_err());
    }
}
