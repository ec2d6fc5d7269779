//! Startup registration of well-known configuration keys.

use serde::{Deserialize, Serialize};

use crate::store::{Store, StoreResult};

/// A key that must exist in the store before the service starts resolving.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeySpec {
    pub key: String,
    #[serde(default)]
    pub description: String,
}

impl KeySpec {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }
}

/// Keys registered when the configuration file names none.
pub fn default_keys() -> Vec<KeySpec> {
    vec![
        KeySpec::new("bot.token", "Telegram bot token"),
        KeySpec::new("bot.username", "Telegram bot username"),
        KeySpec::new("whisper.api.url", "Speech-to-text service URL"),
        KeySpec::new("external.api.url", "Text processing service URL"),
    ]
}

/// Create an empty entry for every key that does not exist yet.
///
/// Existing entries are never touched, so running this on every start is
/// safe. Returns the number of entries created.
pub fn register_keys(store: &dyn Store, keys: &[KeySpec]) -> StoreResult<usize> {
    let mut created = 0;
    for spec in keys {
        if store.exists(&spec.key)? {
            continue;
        }
        store.put(&spec.key, "", &spec.description)?;
        tracing::info!(key = %spec.key, "Registered configuration entry");
        created += 1;
    }
    Ok(created)
}
