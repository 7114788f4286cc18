//! Application state for the web layer.

use std::sync::Arc;

use crate::session::TripSession;

/// Shared application state.
pub struct AppState<G, P> {
    /// The planning session all requests share
    pub session: Arc<TripSession<G, P>>,
}

impl<G, P> AppState<G, P> {
    pub fn new(session: Arc<TripSession<G, P>>) -> Self {
        Self { session }
    }
}

// Derived Clone would require `G: Clone` and `P: Clone`.
impl<G, P> Clone for AppState<G, P> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}
