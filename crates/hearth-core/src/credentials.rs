// ── Saved network credential cache ──
//
// Bounded, recency-ordered store of Wi-Fi credentials used during
// provisioning, persisted as one JSON array (newest first) under a
// single well-known key in the platform KvStore.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;
use crate::storage::{KvStore, StorageError};

/// Storage key the credential array lives under.
pub const WIFI_CREDENTIALS_KEY: &str = "hearth.wifi_credentials";

/// Upper bound on saved networks. The oldest entry is evicted first.
pub const MAX_SAVED_NETWORKS: usize = 10;

/// One saved network.
#[derive(Debug, Clone)]
pub struct NetworkCredential {
    pub ssid: String,
    pub passphrase: SecretString,
    pub last_used: DateTime<Utc>,
}

/// Persisted wire shape. The passphrase crosses into the platform
/// store in the clear -- the store itself is the trust boundary, same
/// as the original preference-store layout.
#[derive(Serialize, Deserialize)]
struct StoredCredential {
    ssid: String,
    passphrase: String,
    last_used: DateTime<Utc>,
}

/// Recency-ordered credential cache over a [`KvStore`].
#[derive(Clone)]
pub struct CredentialCache {
    store: Arc<dyn KvStore>,
}

impl CredentialCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Save (or refresh) a network credential.
    ///
    /// An existing SSID is replaced in place and moved to the
    /// most-recent position; the cache never exceeds
    /// [`MAX_SAVED_NETWORKS`] entries.
    pub fn save_network(&self, ssid: &str, passphrase: SecretString) -> Result<(), CoreError> {
        let mut entries = self.load()?;
        entries.retain(|e| e.ssid != ssid);
        entries.insert(
            0,
            StoredCredential {
                ssid: ssid.to_owned(),
                passphrase: passphrase.expose_secret().to_owned(),
                last_used: Utc::now(),
            },
        );
        entries.truncate(MAX_SAVED_NETWORKS);
        self.persist(&entries)?;
        debug!(ssid, count = entries.len(), "network credential saved");
        Ok(())
    }

    /// Look up the saved passphrase for an SSID, if any.
    pub fn network_password(&self, ssid: &str) -> Result<Option<SecretString>, CoreError> {
        Ok(self
            .load()?
            .into_iter()
            .find(|e| e.ssid == ssid)
            .map(|e| SecretString::from(e.passphrase)))
    }

    /// All saved networks, most recently used first.
    pub fn saved_networks(&self) -> Result<Vec<NetworkCredential>, CoreError> {
        Ok(self
            .load()?
            .into_iter()
            .map(|e| NetworkCredential {
                ssid: e.ssid,
                passphrase: SecretString::from(e.passphrase),
                last_used: e.last_used,
            })
            .collect())
    }

    /// Drop one saved network. Returns `true` if it existed.
    pub fn forget_network(&self, ssid: &str) -> Result<bool, CoreError> {
        let mut entries = self.load()?;
        let before = entries.len();
        entries.retain(|e| e.ssid != ssid);
        let removed = entries.len() != before;
        if removed {
            self.persist(&entries)?;
        }
        Ok(removed)
    }

    /// Drop every saved network.
    pub fn clear(&self) -> Result<(), CoreError> {
        self.store.remove(WIFI_CREDENTIALS_KEY)?;
        Ok(())
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Load and recency-sort the persisted array. Sorting on load keeps
    /// the ordering invariant even if an older writer left the array
    /// unsorted.
    fn load(&self) -> Result<Vec<StoredCredential>, CoreError> {
        let Some(raw) = self.store.get(WIFI_CREDENTIALS_KEY)? else {
            return Ok(Vec::new());
        };
        let mut entries: Vec<StoredCredential> = serde_json::from_str(&raw)
            .map_err(|e| StorageError::new(format!("corrupt credential cache: {e}")))?;
        entries.sort_by(|a, b| b.last_used.cmp(&a.last_used));
        Ok(entries)
    }

    fn persist(&self, entries: &[StoredCredential]) -> Result<(), CoreError> {
        let raw = serde_json::to_string(entries)
            .map_err(|e| StorageError::new(format!("credential serialization failed: {e}")))?;
        self.store.set(WIFI_CREDENTIALS_KEY, &raw)?;
        Ok(())
    }
}
