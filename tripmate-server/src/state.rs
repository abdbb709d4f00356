//! Shared state handed to every request handler.

use std::sync::Arc;

use tripmate_store::{ItineraryLog, ProfileStore, SessionStore};

use crate::runtime::RuntimeClient;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub profiles: ProfileStore,
    pub itineraries: ItineraryLog,
    pub runtime: RuntimeClient,
}
