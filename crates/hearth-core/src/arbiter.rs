// ── Transport-mode arbitration ──
//
// Per-operation choice between local and cloud communication with a
// provisioned device. Attempts follow the process-wide preference
// order strictly -- never concurrently, because the two paths have
// different consistency and latency characteristics and racing them
// would mean reconciling divergent results. Nothing is cached: a
// device that becomes locally reachable mid-session wins on the very
// next call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, warn};

use crate::error::CoreError;

// ── TransportMode ───────────────────────────────────────────────────

/// How runtime communication with a provisioned device travels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransportMode {
    /// Direct on the user's network.
    Local,
    /// Via the cloud relay.
    Cloud,
}

// ── TransportModePreference ─────────────────────────────────────────

/// Ordered transport-mode preference, set once at startup and shared
/// process-wide behind an `Arc`. Never mutated after construction, so
/// it is always consistent with any in-flight arbitration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportModePreference {
    order: Vec<TransportMode>,
}

impl TransportModePreference {
    /// Build a preference from an ordered mode list.
    ///
    /// Duplicates collapse to their first occurrence; an empty list is
    /// rejected with [`CoreError::InvalidPreference`].
    pub fn new(order: impl IntoIterator<Item = TransportMode>) -> Result<Self, CoreError> {
        let mut seen = Vec::new();
        for mode in order {
            if !seen.contains(&mode) {
                seen.push(mode);
            }
        }
        if seen.is_empty() {
            return Err(CoreError::InvalidPreference {
                message: "at least one transport mode is required".into(),
            });
        }
        Ok(Self { order: seen })
    }

    /// Local first, cloud as fallback (the default).
    pub fn local_first() -> Arc<Self> {
        Arc::new(Self {
            order: vec![TransportMode::Local, TransportMode::Cloud],
        })
    }

    /// Cloud first, local as fallback.
    pub fn cloud_first() -> Arc<Self> {
        Arc::new(Self {
            order: vec![TransportMode::Cloud, TransportMode::Local],
        })
    }

    pub fn order(&self) -> &[TransportMode] {
        &self.order
    }
}

// ── ModeFailure ─────────────────────────────────────────────────────

/// One failed attempt recorded during arbitration.
#[derive(Debug, Clone)]
pub struct ModeFailure {
    pub mode: TransportMode,
    pub reason: String,
}

// ── Arbitrator ──────────────────────────────────────────────────────

/// Per-operation transport-mode dispatcher.
#[derive(Clone)]
pub struct Arbitrator {
    preference: Arc<TransportModePreference>,
}

impl Arbitrator {
    pub fn new(preference: Arc<TransportModePreference>) -> Self {
        Self { preference }
    }

    /// Run one logical operation, trying each preferred mode in order.
    ///
    /// The closure is invoked once per mode, strictly sequentially; the
    /// first success wins. If every mode fails the accumulated failures
    /// surface as [`CoreError::AllTransportsExhausted`].
    pub async fn dispatch<T, F, Fut>(&self, mut attempt: F) -> Result<T, CoreError>
    where
        F: FnMut(TransportMode) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut attempts: Vec<ModeFailure> = Vec::new();

        for &mode in self.preference.order() {
            match attempt(mode).await {
                Ok(value) => {
                    if !attempts.is_empty() {
                        debug!(%mode, fallbacks = attempts.len(), "operation succeeded after fallback");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    warn!(%mode, error = %e, "transport mode failed -- falling through");
                    attempts.push(ModeFailure {
                        mode,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(CoreError::AllTransportsExhausted { attempts })
    }
}
