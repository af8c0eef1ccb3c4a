//! Tokio event loop around a [`Dashboard`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::OptionFuture;
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::domain::StationId;
use crate::map::MapBackend;
use crate::selection::DeparturesRequest;
use crate::slot::Resource;
use crate::source::DataSource;

use super::{Command, Dashboard, DashboardSnapshot, Event, FetchRequest, Flow, Intent, Settlement};

/// Capacity of the intent queue shared by all handles.
const INTENT_QUEUE: usize = 64;

/// Returned when talking to a runtime that has shut down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("dashboard runtime has stopped")]
pub struct RuntimeStopped;

/// Cloneable access to a running dashboard.
#[derive(Clone)]
pub struct DashboardHandle {
    intents: mpsc::Sender<Event>,
    snapshot: watch::Receiver<DashboardSnapshot>,
}

impl DashboardHandle {
    /// Queue a user intent.
    pub async fn send(&self, intent: Intent) -> Result<(), RuntimeStopped> {
        self.intents
            .send(Event::Intent(intent))
            .await
            .map_err(|_| RuntimeStopped)
    }

    /// Report a click on the marker for `station`.
    pub async fn click_marker(&self, station: StationId) -> Result<(), RuntimeStopped> {
        self.intents
            .send(Event::MarkerClicked(station))
            .await
            .map_err(|_| RuntimeStopped)
    }

    /// Ask the runtime to stop after the events already queued.
    pub async fn shutdown(&self) -> Result<(), RuntimeStopped> {
        self.send(Intent::Shutdown).await
    }

    /// The latest published state.
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Wait until the published state satisfies `ready`, and return it.
    pub async fn wait_until(
        &mut self,
        ready: impl FnMut(&DashboardSnapshot) -> bool,
    ) -> Result<DashboardSnapshot, RuntimeStopped> {
        self.snapshot
            .wait_for(ready)
            .await
            .map(|snapshot| snapshot.clone())
            .map_err(|_| RuntimeStopped)
    }
}

/// Owns a dashboard and performs its fetches.
///
/// Events are processed one at a time on the task running [`Runtime::run`].
/// Each fetch runs on its own task; starting a fetch for a resource aborts the
/// one still in flight for it. A snapshot is published after every event.
pub struct Runtime<S, M: MapBackend> {
    source: Arc<S>,
    dashboard: Dashboard<M>,
    intents: mpsc::Receiver<Event>,
    settled_tx: mpsc::UnboundedSender<Settlement>,
    settled_rx: mpsc::UnboundedReceiver<Settlement>,
    snapshot: watch::Sender<DashboardSnapshot>,
    in_flight: HashMap<Resource, AbortHandle>,
    refresh_every: Option<Duration>,
}

impl<S, M> Runtime<S, M>
where
    S: DataSource,
    M: MapBackend + Send + 'static,
    M::Marker: Send,
{
    pub fn new(source: S, dashboard: Dashboard<M>) -> (Self, DashboardHandle) {
        let (intents_tx, intents) = mpsc::channel(INTENT_QUEUE);
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let (snapshot, snapshot_rx) = watch::channel(dashboard.snapshot());

        let runtime = Self {
            source: Arc::new(source),
            dashboard,
            intents,
            settled_tx,
            settled_rx,
            snapshot,
            in_flight: HashMap::new(),
            refresh_every: None,
        };
        let handle = DashboardHandle {
            intents: intents_tx,
            snapshot: snapshot_rx,
        };
        (runtime, handle)
    }

    /// Refresh departures for the current selection every `every`.
    pub fn with_refresh_interval(mut self, every: Duration) -> Self {
        self.refresh_every = Some(every);
        self
    }

    /// Run until a shutdown intent arrives or every handle is dropped.
    pub async fn run(mut self) {
        info!(refresh = ?self.refresh_every, "Dashboard runtime started");
        self.dispatch();
        self.publish();

        let mut ticker = self.refresh_every.map(refresh_interval);
        loop {
            let tick: OptionFuture<_> = ticker.as_mut().map(Interval::tick).into();
            let event = tokio::select! {
                event = self.intents.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
                Some(settlement) = self.settled_rx.recv() => Event::Settled(settlement),
                Some(_) = tick => Event::RefreshTick,
            };

            let flow = self.dashboard.handle(event);
            self.dispatch();
            self.publish();
            if flow == Flow::Stop {
                break;
            }
        }

        for (_, task) in self.in_flight.drain() {
            task.abort();
        }
        info!("Dashboard runtime stopped");
    }

    fn dispatch(&mut self) {
        for command in self.dashboard.take_commands() {
            match command {
                Command::Fetch(request) => {
                    let resource = request.resource();
                    let task = tokio::spawn(fetch(
                        Arc::clone(&self.source),
                        request,
                        self.settled_tx.clone(),
                    ));
                    if let Some(previous) = self.in_flight.insert(resource, task.abort_handle()) {
                        previous.abort();
                    }
                }
                Command::Cancel(resource) => {
                    if let Some(task) = self.in_flight.remove(&resource) {
                        debug!(%resource, "Cancelling in-flight fetch");
                        task.abort();
                    }
                }
            }
        }
    }

    fn publish(&self) {
        self.snapshot.send_replace(self.dashboard.snapshot());
    }
}

fn refresh_interval(every: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + every, every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn fetch<S: DataSource>(
    source: Arc<S>,
    request: FetchRequest,
    settled: mpsc::UnboundedSender<Settlement>,
) {
    let settlement = match request {
        FetchRequest::Stations(ticket) => Settlement::Stations {
            ticket,
            result: source.stations().await,
        },
        FetchRequest::Departures(DeparturesRequest { ticket, station }) => {
            let result = source.departures(&station).await;
            Settlement::Departures {
                ticket,
                station,
                result,
            }
        }
        FetchRequest::Weather(ticket) => Settlement::Weather {
            ticket,
            result: source.weather().await,
        },
        FetchRequest::AirQuality(ticket) => Settlement::AirQuality {
            ticket,
            result: source.air_quality().await,
        },
    };

    // The runtime may already be gone.
    let _ = settled.send(settlement);
}
