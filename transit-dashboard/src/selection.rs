//! Selection controller.
//!
//! Holds the station the user is inspecting and owns the departures slot,
//! which is only ever reloaded from here. Every departures request is tagged
//! with the station it was issued for; a result whose tag no longer matches
//! the selection is discarded on arrival.

use std::fmt::Display;

use tracing::{debug, info};

use crate::domain::{Departure, Station, StationId, StationSet};
use crate::slot::{Resource, ResourceState, Settle, Slot, Ticket};

/// A departures fetch to perform, tagged with its station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeparturesRequest {
    pub ticket: Ticket,
    pub station: StationId,
}

/// What a station set replacement did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebind {
    /// Nothing was selected, or the record is identical.
    Unchanged,
    /// The selected station is still present; its record was refreshed.
    Rebound,
    /// The selected station disappeared; selection is now empty.
    Cleared,
}

/// Current selection plus the departures it drives.
#[derive(Debug, Clone)]
pub struct SelectionController {
    current: Option<Station>,
    departures: Slot<Vec<Departure>>,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionController {
    pub fn new() -> Self {
        Self {
            current: None,
            departures: Slot::reset_on_failure(Resource::Departures, Vec::new()),
        }
    }

    /// The selected station, if any.
    pub fn current(&self) -> Option<&Station> {
        self.current.as_ref()
    }

    /// Whether `station` is the current selection.
    pub fn is_selected(&self, station: &StationId) -> bool {
        self.current.as_ref().is_some_and(|s| &s.id == station)
    }

    /// Select a station and issue a departures reload for it.
    pub fn select(&mut self, station: Station) -> DeparturesRequest {
        info!(station = %station.id, name = %station.name, "Station selected");
        let request = DeparturesRequest {
            ticket: self.departures.begin(),
            station: station.id.clone(),
        };
        self.current = Some(station);
        request
    }

    /// Reload departures for the current selection; `None` when nothing is selected.
    pub fn refresh(&mut self) -> Option<DeparturesRequest> {
        let station = self.current.as_ref()?.id.clone();
        debug!(station = %station, "Refreshing departures");
        Some(DeparturesRequest {
            ticket: self.departures.begin(),
            station,
        })
    }

    /// Offer a departures result issued for `station`.
    pub fn settle<E: Display>(
        &mut self,
        ticket: Ticket,
        station: &StationId,
        result: Result<Vec<Departure>, E>,
    ) -> Settle {
        if !self.is_selected(station) {
            debug!(station = %station, "Discarding departures for deselected station");
            return Settle::Superseded;
        }
        self.departures.settle(ticket, result)
    }

    /// Reconcile the selection with a replaced station set.
    ///
    /// A selection whose identifier vanished is cleared along with its
    /// departures; otherwise it is rebound to the new record.
    pub fn rebind(&mut self, stations: &StationSet) -> Rebind {
        let Some(current) = &self.current else {
            return Rebind::Unchanged;
        };

        match stations.get(&current.id) {
            Some(fresh) if fresh == current => Rebind::Unchanged,
            Some(fresh) => {
                self.current = Some(fresh.clone());
                Rebind::Rebound
            }
            None => {
                info!(
                    station = %current.id,
                    "Selected station no longer listed; clearing selection"
                );
                self.current = None;
                self.departures.clear();
                Rebind::Cleared
            }
        }
    }

    /// Visible departures state.
    pub fn departures(&self) -> &ResourceState<Vec<Departure>> {
        self.departures.state()
    }
}
