// ── Cached auth tokens ──
//
// Access/refresh tokens from the account login, persisted under
// well-known keys in the same KvStore as the credential cache.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::error::CoreError;
use crate::storage::KvStore;

pub const ACCESS_TOKEN_KEY: &str = "hearth.access_token";
pub const REFRESH_TOKEN_KEY: &str = "hearth.refresh_token";

/// Thin typed wrapper over the token storage keys.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KvStore>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn set_tokens(
        &self,
        access: &SecretString,
        refresh: &SecretString,
    ) -> Result<(), CoreError> {
        self.store.set(ACCESS_TOKEN_KEY, access.expose_secret())?;
        self.store.set(REFRESH_TOKEN_KEY, refresh.expose_secret())?;
        Ok(())
    }

    pub fn access_token(&self) -> Result<Option<SecretString>, CoreError> {
        Ok(self.store.get(ACCESS_TOKEN_KEY)?.map(SecretString::from))
    }

    pub fn refresh_token(&self) -> Result<Option<SecretString>, CoreError> {
        Ok(self.store.get(REFRESH_TOKEN_KEY)?.map(SecretString::from))
    }

    /// Drop both tokens (logout).
    pub fn clear(&self) -> Result<(), CoreError> {
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)?;
        Ok(())
    }
}
