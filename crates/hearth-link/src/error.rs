use thiserror::Error;

/// Top-level error type for the `hearth-link` crate.
///
/// Covers every failure mode across the transport surface: radio
/// availability, connection setup, the proof-of-possession handshake,
/// capability probing, and optical-code parsing. `hearth-core` maps
/// these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Availability ────────────────────────────────────────────────
    /// The platform radio or its permission is unavailable
    /// (radio off, permission denied, unsupported hardware).
    #[error("Transport permission unavailable: {reason}")]
    PermissionDenied { reason: String },

    // ── Connection ──────────────────────────────────────────────────
    /// Transport-level connection to the device failed.
    #[error("Connection to device failed: {reason}")]
    ConnectFailed { reason: String },

    /// The connection dropped mid-operation.
    #[error("Connection lost: {reason}")]
    ConnectionLost { reason: String },

    // ── Handshake ───────────────────────────────────────────────────
    /// The device rejected the proof-of-possession secret.
    #[error("Handshake rejected by device")]
    HandshakeRejected,

    /// The handshake did not complete in time.
    #[error("Handshake timed out after {timeout_secs}s")]
    HandshakeTimeout { timeout_secs: u64 },

    /// The device and client disagree on the handshake protocol
    /// (unsupported security level, version skew).
    #[error("Handshake protocol mismatch: {0}")]
    ProtocolMismatch(String),

    // ── Probing ─────────────────────────────────────────────────────
    /// The capability probe failed or returned garbage.
    #[error("Capability probe failed: {reason}")]
    ProbeFailed { reason: String },

    // ── Optical codes ───────────────────────────────────────────────
    /// A scanned optical payload could not be decoded.
    #[error("Invalid optical payload: {reason}")]
    OpticalPayload { reason: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying
    /// over another transport mode.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectFailed { .. }
                | Self::ConnectionLost { .. }
                | Self::HandshakeTimeout { .. }
                | Self::ProbeFailed { .. }
        )
    }

    /// Returns `true` if the failure happened inside the
    /// proof-of-possession handshake itself.
    pub fn is_handshake_failure(&self) -> bool {
        matches!(
            self,
            Self::HandshakeRejected | Self::HandshakeTimeout { .. } | Self::ProtocolMismatch(_)
        )
    }
}
