//! Trip planning session.
//!
//! A session owns everything that outlives a single search: the loaded
//! directory and its readiness, the memo of expanded segments, and the one
//! "current" itinerary.
//!
//! Every plan request takes a generation number. A finished search only
//! replaces the current itinerary if no later request has been issued in the
//! meantime; otherwise its result is returned flagged as superseded and the
//! current itinerary is left alone. In-flight searches are never aborted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use moka::future::Cache as MokaCache;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::directory::IngestReport;
use crate::domain::{Directory, Endpoint, Itinerary, LegDrawing, ModeFilter, Segment};
use crate::geo::{Geocoder, GeometryProvider, Place};
use crate::planner::{
    Planner, SearchConfig, SearchError, SearchRequest, compose, direct_drive, expand,
};

/// Expanded segment sets kept across searches.
const SEGMENT_MEMO_CAPACITY: u64 = 64;

/// Error from planning a trip.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// No directory has been loaded yet
    #[error("transit directory not loaded yet")]
    NotReady,

    /// Origin or destination could not be resolved to a coordinate
    #[error("locations not found: {}", .missing.join(", "))]
    LocationsNotFound { missing: Vec<String> },

    /// No trip fits the walking, transfer and mode constraints. `direct`
    /// is a road route from origin to destination to show instead.
    #[error("no suitable route found")]
    NoRoute {
        generation: u64,
        superseded: bool,
        direct: LegDrawing,
    },
}

/// A location as the user gave it: free text, optionally pinned on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInput {
    pub text: String,
    #[serde(default)]
    pub pinned: Option<Place>,
}

impl LocationInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pinned: None,
        }
    }

    /// A location pinned on the map, named after the pinned place.
    pub fn pinned(place: Place) -> Self {
        Self {
            text: place.name.clone(),
            pinned: Some(place),
        }
    }

    /// The pin, if it still matches the text. Editing the text after pinning
    /// discards the pin.
    fn usable_pin(&self) -> Option<&Place> {
        self.pinned
            .as_ref()
            .filter(|p| p.name.trim() == self.text.trim())
    }
}

/// A request to plan a trip.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub origin: LocationInput,
    pub destination: LocationInput,
    pub config: SearchConfig,
}

/// A composed trip and the generation that produced it.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub generation: u64,
    /// A later request was issued before this one finished, so the result
    /// was not made current.
    pub superseded: bool,
    pub itinerary: Arc<Itinerary>,
}

/// The itinerary currently on display.
#[derive(Debug, Clone)]
pub struct CurrentTrip {
    pub generation: u64,
    pub itinerary: Arc<Itinerary>,
}

/// A successfully loaded directory.
#[derive(Debug)]
pub struct LoadedDirectory {
    pub directory: Directory,
    /// Increases with every install.
    pub version: u64,
    pub fetched_at: DateTime<Utc>,
    pub report: IngestReport,
}

#[derive(Debug)]
enum DirectoryState {
    NotReady { last_error: Option<String> },
    Ready(Arc<LoadedDirectory>),
}

/// Session readiness and counts, for status reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub ready: bool,
    pub directory_version: Option<u64>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub terminals: usize,
    pub routes: usize,
    pub routes_skipped: usize,
    pub last_error: Option<String>,
    pub generation: u64,
    pub has_current_trip: bool,
}

/// Segment memo key: (directory version, mode filter).
type MemoKey = (u64, String);

/// Trip planning session over a geocoder and a geometry provider.
pub struct TripSession<G, P> {
    geocoder: G,
    geometry: P,
    directory: RwLock<DirectoryState>,
    generation: AtomicU64,
    current: RwLock<Option<CurrentTrip>>,
    segments: MokaCache<MemoKey, Arc<Vec<Segment>>>,
}

impl<G: Geocoder, P: GeometryProvider> TripSession<G, P> {
    /// Create a session with no directory. Plans are refused until one is
    /// installed.
    pub fn new(geocoder: G, geometry: P) -> Self {
        Self {
            geocoder,
            geometry,
            directory: RwLock::new(DirectoryState::NotReady { last_error: None }),
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
            segments: MokaCache::builder()
                .max_capacity(SEGMENT_MEMO_CAPACITY)
                .build(),
        }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Install a freshly loaded directory, replacing any previous one.
    ///
    /// Returns the new directory version.
    pub async fn install_directory(&self, directory: Directory, report: IngestReport) -> u64 {
        let mut state = self.directory.write().await;
        let version = match &*state {
            DirectoryState::Ready(loaded) => loaded.version + 1,
            DirectoryState::NotReady { .. } => 1,
        };

        *state = DirectoryState::Ready(Arc::new(LoadedDirectory {
            directory,
            version,
            fetched_at: Utc::now(),
            report,
        }));
        drop(state);

        // Entries for older versions can never be hit again
        self.segments.invalidate_all();
        info!(version, "directory installed");
        version
    }

    /// Record a failed directory fetch.
    ///
    /// Before the first successful fetch this keeps the session not ready.
    /// Afterwards the last good directory stays in service.
    pub async fn mark_not_ready(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let mut state = self.directory.write().await;
        match &mut *state {
            DirectoryState::NotReady { last_error } => {
                warn!(%reason, "directory unavailable, planning disabled");
                *last_error = Some(reason);
            }
            DirectoryState::Ready(loaded) => {
                warn!(%reason, version = loaded.version, "directory refresh failed, keeping last good copy");
            }
        }
    }

    /// The installed directory, if any.
    pub async fn directory(&self) -> Option<Arc<LoadedDirectory>> {
        match &*self.directory.read().await {
            DirectoryState::Ready(loaded) => Some(loaded.clone()),
            DirectoryState::NotReady { .. } => None,
        }
    }

    pub async fn status(&self) -> SessionStatus {
        let has_current_trip = self.current.read().await.is_some();
        let generation = self.generation.load(Ordering::SeqCst);

        match &*self.directory.read().await {
            DirectoryState::Ready(loaded) => SessionStatus {
                ready: true,
                directory_version: Some(loaded.version),
                fetched_at: Some(loaded.fetched_at),
                terminals: loaded.directory.terminals().len(),
                routes: loaded.directory.route_count(),
                routes_skipped: loaded.report.routes_skipped,
                last_error: None,
                generation,
                has_current_trip,
            },
            DirectoryState::NotReady { last_error } => SessionStatus {
                ready: false,
                directory_version: None,
                fetched_at: None,
                terminals: 0,
                routes: 0,
                routes_skipped: 0,
                last_error: last_error.clone(),
                generation,
                has_current_trip,
            },
        }
    }

    /// The itinerary currently on display.
    pub async fn current(&self) -> Option<CurrentTrip> {
        self.current.read().await.clone()
    }

    /// Discard the current itinerary. Searches still in flight will finish
    /// as superseded.
    pub async fn clear(&self) -> u64 {
        let generation = self.next_generation();
        *self.current.write().await = None;
        generation
    }

    /// Plan a trip and, if it is still the latest request, make it current.
    pub async fn plan(&self, request: &PlanRequest) -> Result<PlanOutcome, PlanError> {
        let loaded = self.directory().await.ok_or(PlanError::NotReady)?;
        let generation = self.next_generation();

        let origin = self.resolve(&request.origin).await;
        let destination = self.resolve(&request.destination).await;
        let (origin, destination) = match (origin, destination) {
            (Some(origin), Some(destination)) => (origin, destination),
            (origin, destination) => {
                let mut missing = Vec::new();
                if origin.is_none() {
                    missing.push(request.origin.text.clone());
                }
                if destination.is_none() {
                    missing.push(request.destination.text.clone());
                }
                self.commit(generation, None).await;
                return Err(PlanError::LocationsNotFound { missing });
            }
        };

        let segments = self
            .segments_for(&loaded, &request.config.active_modes)
            .await;
        let search = SearchRequest::new(origin.coord, destination.coord);

        let candidate = match Planner::new(&segments, &request.config).search(&search) {
            Ok(candidate) => candidate,
            Err(SearchError::NoRoute) => {
                let direct = direct_drive(&origin, &destination, &self.geometry).await;
                let superseded = !self.commit(generation, None).await;
                return Err(PlanError::NoRoute {
                    generation,
                    superseded,
                    direct,
                });
            }
        };

        let itinerary = Arc::new(compose(&candidate, &origin, &destination, &self.geometry).await);
        let superseded = !self.commit(generation, Some(itinerary.clone())).await;

        Ok(PlanOutcome {
            generation,
            superseded,
            itinerary,
        })
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replace the current trip if `generation` is still the latest issued.
    /// Returns whether it was.
    async fn commit(&self, generation: u64, itinerary: Option<Arc<Itinerary>>) -> bool {
        let mut current = self.current.write().await;

        let latest = self.generation.load(Ordering::SeqCst);
        if generation != latest {
            info!(generation, latest, "discarding superseded trip");
            return false;
        }

        *current = itinerary.map(|itinerary| CurrentTrip {
            generation,
            itinerary,
        });
        true
    }

    /// Resolve a location to a named endpoint. Geocoder failures count as
    /// no match.
    async fn resolve(&self, input: &LocationInput) -> Option<Endpoint> {
        let text = input.text.trim();

        if let Some(pin) = input.usable_pin() {
            return Some(Endpoint {
                name: text.to_string(),
                coord: pin.coord,
            });
        }
        if text.is_empty() {
            return None;
        }

        match self.geocoder.search(text).await {
            Ok(Some(place)) => Some(Endpoint {
                name: text.to_string(),
                coord: place.coord,
            }),
            Ok(None) => None,
            Err(e) => {
                warn!(query = text, error = %e, "geocoding failed");
                None
            }
        }
    }

    /// Expanded segments for the directory and mode set, memoized.
    async fn segments_for(
        &self,
        loaded: &LoadedDirectory,
        modes: &ModeFilter,
    ) -> Arc<Vec<Segment>> {
        let key = (loaded.version, modes.cache_key());
        self.segments
            .get_with(key, async { Arc::new(expand(&loaded.directory, modes)) })
            .await
    }
}
