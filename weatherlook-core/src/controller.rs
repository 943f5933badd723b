//! Lookup lifecycle: one owned [`LookupState`], published as snapshots.
//!
//! Every dispatched lookup gets the next sequence number. A result is applied
//! only while its number is still the latest dispatched one, and dispatching a
//! new lookup cancels the previous one's token so its request is dropped.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    LocationQuery, LookupError, WeatherObservation,
    geolocation::{GeolocationError, Geolocator},
    provider::WeatherProvider,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LookupState {
    #[default]
    Idle,
    Loading,
    Success(WeatherObservation),
    Failed(LookupError),
}

impl LookupState {
    pub fn error(&self) -> Option<&LookupError> {
        match self {
            LookupState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupSnapshot {
    pub state: LookupState,
    /// Last successfully shown observation. Survives `Loading` and `Failed`.
    pub displayed: Option<WeatherObservation>,
    /// Place name heading; changes only when an observation is shown.
    pub place_label: Option<String>,
    /// Sequence number of the lookup that produced this snapshot.
    pub generation: u64,
    pub updated_at: DateTime<Utc>,
}

impl LookupSnapshot {
    fn initial() -> Self {
        Self {
            state: LookupState::Idle,
            displayed: None,
            place_label: None,
            generation: 0,
            updated_at: Utc::now(),
        }
    }
}

/// What happened to one trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// The lookup resolved and its terminal state was published.
    Completed(LookupState),
    /// A newer lookup was dispatched first; nothing was published.
    Superseded,
    /// The host could not provide a position; state left untouched.
    NoPosition(GeolocationError),
    /// The geolocation trigger already fired for this controller.
    AlreadyLocated,
}

#[derive(Debug)]
struct Dispatch {
    latest: u64,
    cancel: CancellationToken,
    /// Set once any place-name lookup has been dispatched.
    searched: bool,
}

#[derive(Debug)]
pub struct LookupController {
    provider: Arc<dyn WeatherProvider>,
    snapshot: watch::Sender<LookupSnapshot>,
    dispatch: Mutex<Dispatch>,
    located: AtomicBool,
}

impl LookupController {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        let (snapshot, _) = watch::channel(LookupSnapshot::initial());
        Self {
            provider,
            snapshot,
            dispatch: Mutex::new(Dispatch {
                latest: 0,
                cancel: CancellationToken::new(),
                searched: false,
            }),
            located: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> LookupSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn state(&self) -> LookupState {
        self.snapshot.borrow().state.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LookupSnapshot> {
        self.snapshot.subscribe()
    }

    /// Show `observation` without asking the provider, e.g. a demo placeholder.
    pub fn seed(&self, observation: WeatherObservation) {
        let dispatch = self.dispatch.lock();
        self.publish_success(dispatch.latest, observation);
    }

    /// Geolocation trigger. Fires at most once; failures are logged only.
    ///
    /// Once a search has been dispatched, whether before or while the position
    /// is pending, the coordinates lookup is skipped.
    pub async fn locate(&self, geolocator: &dyn Geolocator) -> LookupOutcome {
        if self.located.swap(true, Ordering::SeqCst) {
            return LookupOutcome::AlreadyLocated;
        }

        let coords = match geolocator.current_position().await {
            Ok(coords) => coords,
            Err(err) => {
                tracing::warn!("Error fetching geolocation: {err}");
                return LookupOutcome::NoPosition(err);
            }
        };
        tracing::info!(lat = coords.latitude, lon = coords.longitude, "got position");

        let query = LocationQuery::Coordinates(coords);
        let started = {
            let mut dispatch = self.dispatch.lock();
            if dispatch.searched {
                None
            } else {
                Some(self.dispatch_locked(&mut dispatch, &query))
            }
        };
        let Some((seq, cancel)) = started else {
            tracing::debug!("search already dispatched, skipping coordinates lookup");
            return LookupOutcome::Superseded;
        };

        self.await_lookup(seq, cancel, query).await
    }

    /// Search trigger for raw user input.
    pub async fn search(&self, text: &str) -> LookupOutcome {
        match LocationQuery::place_name(text) {
            Ok(query) => self.run_lookup(query).await,
            Err(err) => {
                let dispatch = self.dispatch.lock();
                self.publish_failure(dispatch.latest, err.clone());
                LookupOutcome::Completed(LookupState::Failed(err))
            }
        }
    }

    /// Start a lookup for an already-built query.
    pub async fn run_lookup(&self, query: LocationQuery) -> LookupOutcome {
        let (seq, cancel) = self.begin(&query);
        self.await_lookup(seq, cancel, query).await
    }

    async fn await_lookup(
        &self,
        seq: u64,
        cancel: CancellationToken,
        query: LocationQuery,
    ) -> LookupOutcome {
        let result = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(seq, "lookup superseded before completion");
                return LookupOutcome::Superseded;
            }
            result = self.provider.fetch_weather(&query) => result,
        };

        self.resolve(seq, result)
    }

    fn begin(&self, query: &LocationQuery) -> (u64, CancellationToken) {
        let mut dispatch = self.dispatch.lock();
        self.dispatch_locked(&mut dispatch, query)
    }

    fn dispatch_locked(
        &self,
        dispatch: &mut Dispatch,
        query: &LocationQuery,
    ) -> (u64, CancellationToken) {
        if matches!(query, LocationQuery::PlaceName(_)) {
            dispatch.searched = true;
        }
        dispatch.latest += 1;
        let seq = dispatch.latest;

        let cancel = CancellationToken::new();
        let previous = std::mem::replace(&mut dispatch.cancel, cancel.clone());
        previous.cancel();

        self.snapshot.send_modify(|snap| {
            snap.state = LookupState::Loading;
            snap.generation = seq;
            snap.updated_at = Utc::now();
        });
        tracing::debug!(seq, "lookup dispatched");

        (seq, cancel)
    }

    fn resolve(&self, seq: u64, result: Result<WeatherObservation, LookupError>) -> LookupOutcome {
        let dispatch = self.dispatch.lock();
        if seq != dispatch.latest {
            tracing::debug!(seq, latest = dispatch.latest, "dropping stale lookup result");
            return LookupOutcome::Superseded;
        }

        match result {
            Ok(observation) => {
                self.publish_success(seq, observation.clone());
                LookupOutcome::Completed(LookupState::Success(observation))
            }
            Err(err) => {
                self.publish_failure(seq, err.clone());
                LookupOutcome::Completed(LookupState::Failed(err))
            }
        }
    }

    fn publish_success(&self, seq: u64, observation: WeatherObservation) {
        self.snapshot.send_modify(|snap| {
            snap.place_label = Some(observation.place_name.clone());
            snap.displayed = Some(observation.clone());
            snap.state = LookupState::Success(observation);
            snap.generation = seq;
            snap.updated_at = Utc::now();
        });
    }

    fn publish_failure(&self, seq: u64, err: LookupError) {
        self.snapshot.send_modify(|snap| {
            snap.state = LookupState::Failed(err);
            snap.generation = seq;
            snap.updated_at = Utc::now();
        });
    }
}
