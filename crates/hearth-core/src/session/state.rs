// ── Session establishment state machine ──
//
// Pure state definitions and transition validation; timing, transport
// I/O, and cancellation live in the SessionManager. Transitions within
// one session are strictly sequential -- observers never see them out
// of order.
//
// ```text
//   Idle
//    │ device selected
//    ▼
//   Connecting ───────────────── transport failure ──► Failed
//    │ transport up
//    ▼
//   HandshakeInProgress ──── rejection / timeout ────► Failed
//    │ secret accepted + session init complete
//    ▼
//   SecureSessionEstablished   (consumed exactly once by provisioning)
//
//   any non-terminal state + caller abort ───────────► Cancelled
// ```
//
// A rejected proof-of-possession secret is never retried from Failed;
// the caller resupplies a new secret and restarts from Connecting.

use serde::{Deserialize, Serialize};

/// State of one session establishment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No attempt in progress.
    #[default]
    Idle,
    /// Opening the transport-level connection.
    Connecting,
    /// Connection up, proof-of-possession handshake running.
    HandshakeInProgress,
    /// Handshake accepted and session initialization complete.
    SecureSessionEstablished,
    /// Terminal: connection or handshake failed.
    Failed,
    /// Terminal: caller aborted the attempt.
    Cancelled,
}

impl SessionState {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled)
    }

    /// A live session blocks a second `establish` for the same device.
    /// Established counts as live until provisioning consumes it.
    pub fn is_live(self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::HandshakeInProgress | Self::SecureSessionEstablished
        )
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Idle, Self::Connecting) => true,
            (Self::Connecting, Self::HandshakeInProgress | Self::Failed) => true,
            (Self::HandshakeInProgress, Self::SecureSessionEstablished | Self::Failed) => true,
            // Cancellation is legal from any non-terminal, pre-established state.
            (from, Self::Cancelled) => !from.is_terminal() && from != Self::SecureSessionEstablished,
            _ => false,
        }
    }
}
