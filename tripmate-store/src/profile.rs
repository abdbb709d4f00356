//! Per-user profile documents: one JSON file per user, overwritten whole.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

fn default_country() -> String {
    "India".to_string()
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_languages() -> Vec<String> {
    vec!["English".to_string()]
}

/// User profile information. The first language is the preferred one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "default_country")]
    pub country_of_residence: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_currency")]
    pub preferred_currency: String,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

impl UserProfile {
    /// The fallback profile: the assistant always has something to work
    /// with, even for a user it has never seen.
    pub fn default_for(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            first_name: "User".to_string(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            country_of_residence: default_country(),
            timezone: default_timezone(),
            preferred_currency: default_currency(),
            languages: default_languages(),
        }
    }
}

/// On-disk wrapper: `{"user_profile": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDocument {
    pub user_profile: UserProfile,
}

pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join("profiles"),
        }
    }

    fn path_for(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{user_id}.json"))
    }

    /// Load a user's profile, falling back to defaults on absence or
    /// corruption. Never fails; corruption is logged, not raised.
    pub fn load(&self, user_id: &str) -> UserProfile {
        let path = self.path_for(user_id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return UserProfile::default_for(user_id);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable profile, using defaults");
                return UserProfile::default_for(user_id);
            }
        };

        match serde_json::from_str::<ProfileDocument>(&raw) {
            Ok(doc) => doc.user_profile,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt profile, using defaults");
                UserProfile::default_for(user_id)
            }
        }
    }

    /// Persist a profile, fully overwriting any previous document.
    pub fn save(&self, profile: &UserProfile) -> Result<(), StoreError> {
        if profile.user_id.is_empty() {
            return Err(StoreError::MissingUserId);
        }
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io("create", &self.dir, e))?;

        let path = self.path_for(&profile.user_id);
        let doc = ProfileDocument {
            user_profile: profile.clone(),
        };
        let body = serde_json::to_string_pretty(&doc)?;
        fs::write(&path, body).map_err(|e| StoreError::io("write", &path, e))?;
        tracing::info!(user_id = %profile.user_id, "saved profile");
        Ok(())
    }
}
