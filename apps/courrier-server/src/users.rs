//! User profiles loaded from a JSON fixture file

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use intake_engine::{ProviderError, UserDataProvider};
use serde::Deserialize;
use serde_json::Value;

use crate::sessions::Session;

#[derive(Deserialize)]
struct UsersFile {
    users: Vec<UserEntry>,
}

#[derive(Deserialize)]
struct UserEntry {
    id: String,
    /// Fixed bearer token for this user
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    profile: Value,
}

/// In-memory user directory
#[derive(Debug, Clone, Default)]
pub struct JsonUserDirectory {
    profiles: HashMap<String, Value>,
    tokens: Vec<(String, String)>,
}

impl JsonUserDirectory {
    /// Load `{ "users": [{ "id", "token"?, "profile" }] }` from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ProviderError::Unavailable(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ProviderError> {
        let file: UsersFile =
            serde_json::from_str(raw).map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let mut directory = Self::default();
        for user in file.users {
            if let Some(token) = user.token {
                directory.tokens.push((token, user.id.clone()));
            }
            directory.profiles.insert(user.id, user.profile);
        }
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Non-expiring sessions for the fixed tokens in the file
    pub fn seed_sessions(&self) -> Vec<Session> {
        let now = Utc::now();
        self.tokens
            .iter()
            .map(|(token, user_id)| Session {
                token: token.clone(),
                user_id: user_id.clone(),
                created_at: now,
                expires_at: None,
            })
            .collect()
    }
}

#[async_trait]
impl UserDataProvider for JsonUserDirectory {
    async fn get_user_record(&self, user_id: &str) -> Result<Option<Value>, ProviderError> {
        Ok(self.profiles.get(user_id).cloned())
    }
}
