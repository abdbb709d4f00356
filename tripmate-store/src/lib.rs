//! File-backed persistence for user profiles and itinerary snapshots, plus
//! the in-memory session registry used by the REST facade.
//!
//! Layout under the data directory:
//! - `profiles/{user_id}.json`: one document per user, overwritten whole
//! - `itinerary/{user_id}.json`: append-only array of trip-plan snapshots

pub mod error;
pub mod itinerary;
pub mod profile;
pub mod session;

pub use error::StoreError;
pub use itinerary::{ItineraryLog, ItineraryRecord};
pub use profile::{ProfileDocument, ProfileStore, UserProfile};
pub use session::{ChatMessage, InMemorySessionStore, SessionData, SessionStore};
