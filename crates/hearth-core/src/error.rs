// ── Core error types ──
//
// User-facing errors from hearth-core. These are NOT transport-specific --
// consumers never see radio error codes or wire details directly. The
// `From<hearth_link::Error>` impl translates transport-layer errors into
// domain-appropriate variants.
//
// Propagation policy: foreground operations (device selection, the
// handshake, first-page inventory fetches) surface these to the caller;
// background continuation failures are logged and recovered locally and
// never reach this type's consumers. Nothing in this crate panics the
// host process.

use thiserror::Error;

use crate::arbiter::ModeFailure;
use crate::inventory::EntityKind;
use crate::storage::StorageError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Discovery / transport ────────────────────────────────────────
    #[error("Transport permission unavailable: {reason}")]
    PermissionUnavailable { reason: String },

    #[error("Could not connect to device: {reason}")]
    TransportConnectFailed { reason: String },

    // ── Handshake ────────────────────────────────────────────────────
    #[error("Handshake rejected: {reason}")]
    HandshakeRejected { reason: String },

    #[error("Handshake timed out after {timeout_secs}s")]
    HandshakeTimeout { timeout_secs: u64 },

    // ── Session lifecycle ────────────────────────────────────────────
    #[error("A session is already active for device {device}")]
    SessionAlreadyActive { device: String },

    #[error("Session cancelled for device {device}")]
    SessionCancelled { device: String },

    // ── Transport-mode arbitration ───────────────────────────────────
    #[error("All transport modes exhausted after {} attempt(s)", attempts.len())]
    AllTransportsExhausted { attempts: Vec<ModeFailure> },

    #[error("Invalid transport-mode preference: {message}")]
    InvalidPreference { message: String },

    // ── Inventory pagination ─────────────────────────────────────────
    #[error("No further {kind} pages to fetch")]
    NoMoreIdle { kind: EntityKind },

    // ── Persistence ──────────────────────────────────────────────────
    #[error(transparent)]
    Storage(#[from] StorageError),

    // ── Input validation ─────────────────────────────────────────────
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` if the failure came out of the
    /// proof-of-possession handshake and a fresh secret plus a restart
    /// from `Connecting` could resolve it.
    pub fn is_handshake_failure(&self) -> bool {
        matches!(
            self,
            Self::HandshakeRejected { .. } | Self::HandshakeTimeout { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hearth_link::Error> for CoreError {
    fn from(err: hearth_link::Error) -> Self {
        match err {
            hearth_link::Error::PermissionDenied { reason } => {
                CoreError::PermissionUnavailable { reason }
            }
            hearth_link::Error::ConnectFailed { reason }
            | hearth_link::Error::ConnectionLost { reason } => {
                CoreError::TransportConnectFailed { reason }
            }
            hearth_link::Error::HandshakeRejected => CoreError::HandshakeRejected {
                reason: "proof-of-possession secret rejected by device".into(),
            },
            hearth_link::Error::ProtocolMismatch(detail) => CoreError::HandshakeRejected {
                reason: format!("protocol mismatch: {detail}"),
            },
            hearth_link::Error::HandshakeTimeout { timeout_secs } => {
                CoreError::HandshakeTimeout { timeout_secs }
            }
            hearth_link::Error::ProbeFailed { reason } => {
                CoreError::TransportConnectFailed { reason }
            }
            hearth_link::Error::OpticalPayload { reason } => CoreError::InvalidInput {
                message: format!("invalid optical code: {reason}"),
            },
        }
    }
}
