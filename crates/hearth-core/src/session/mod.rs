// ── Session establishment ──
//
// Drives a discovered candidate through connect and the
// proof-of-possession handshake, exposing progress through watch
// channels and honoring cooperative cancellation at every suspension
// point. The transport connection is released on every exit path.

mod state;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use hearth_link::{Connection, DeviceCandidate, SecurityLevel, SessionToken, TransportBridge, TransportKind};
use secrecy::SecretString;
use tokio::sync::watch;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::OnboardingConfig;
use crate::error::CoreError;

pub use state::SessionState;

// ── DeviceIndex ─────────────────────────────────────────────────────

/// Unique key for a discovered device: name plus transport kind.
///
/// Discovery guarantees this pair is unique within a scan; the session
/// table uses it to enforce at most one live session per device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceIndex {
    pub name: String,
    pub kind: TransportKind,
}

impl DeviceIndex {
    pub fn of(candidate: &DeviceCandidate) -> Self {
        Self {
            name: candidate.name.clone(),
            kind: candidate.kind,
        }
    }
}

impl fmt::Display for DeviceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.kind)
    }
}

// ── SessionManager ──────────────────────────────────────────────────

struct SessionSlot {
    state: watch::Sender<SessionState>,
    cancel: CancellationToken,
}

/// Owns all session establishment attempts for one transport bridge.
///
/// Cheaply cloneable; the live-session table is shared. At most one
/// live session exists per [`DeviceIndex`] at a time.
#[derive(Clone)]
pub struct SessionManager {
    bridge: Arc<dyn TransportBridge>,
    config: OnboardingConfig,
    sessions: Arc<DashMap<DeviceIndex, SessionSlot>>,
    cancel_root: CancellationToken,
}

impl SessionManager {
    pub fn new(bridge: Arc<dyn TransportBridge>, config: OnboardingConfig) -> Self {
        Self {
            bridge,
            config,
            sessions: Arc::new(DashMap::new()),
            cancel_root: CancellationToken::new(),
        }
    }

    /// Observe a device's session state, if an attempt exists.
    pub fn session_state(&self, device: &DeviceIndex) -> Option<watch::Receiver<SessionState>> {
        self.sessions.get(device).map(|slot| slot.state.subscribe())
    }

    /// Request cancellation of a device's in-flight attempt.
    ///
    /// Takes effect at the attempt's next suspension point. Returns
    /// `false` if no attempt is tracked for the device.
    pub fn cancel(&self, device: &DeviceIndex) -> bool {
        match self.sessions.get(device) {
            Some(slot) => {
                slot.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every in-flight attempt (caller leaves the flow).
    pub fn shutdown(&self) {
        self.cancel_root.cancel();
    }

    /// Establish a secure session with a discovered candidate.
    ///
    /// One shot: a rejected secret leaves the attempt terminally
    /// `Failed` and is never retried internally -- the caller restarts
    /// with a fresh secret. Selecting a device that already has a live
    /// session fails with [`CoreError::SessionAlreadyActive`] and
    /// leaves that session untouched.
    pub async fn establish(
        &self,
        candidate: &DeviceCandidate,
        secret: SecretString,
        level: SecurityLevel,
    ) -> Result<EstablishedSession, CoreError> {
        let index = DeviceIndex::of(candidate);

        // Reject duplicates while a session is live. Terminal slots are
        // leftovers from finished attempts and may be replaced.
        if let Some(slot) = self.sessions.get(&index) {
            if slot.state.borrow().is_live() {
                return Err(CoreError::SessionAlreadyActive {
                    device: index.to_string(),
                });
            }
        }

        let (state_tx, _) = watch::channel(SessionState::Idle);
        let cancel = self.cancel_root.child_token();
        self.sessions.insert(
            index.clone(),
            SessionSlot {
                state: state_tx.clone(),
                cancel: cancel.clone(),
            },
        );

        let created_at = Utc::now();
        let _ = state_tx.send(SessionState::Connecting);
        debug!(device = %index, %level, "connecting to device");

        // ── Connect ──────────────────────────────────────────────────
        let mut conn = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                let _ = state_tx.send(SessionState::Cancelled);
                debug!(device = %index, "session cancelled while connecting");
                return Err(CoreError::SessionCancelled { device: index.to_string() });
            }
            res = timeout(self.config.connect_timeout, self.bridge.connect(candidate)) => {
                match res {
                    Ok(Ok(conn)) => conn,
                    Ok(Err(e)) => {
                        let _ = state_tx.send(SessionState::Failed);
                        warn!(device = %index, error = %e, "transport connect failed");
                        return Err(e.into());
                    }
                    Err(_) => {
                        let _ = state_tx.send(SessionState::Failed);
                        return Err(CoreError::TransportConnectFailed {
                            reason: format!(
                                "connect timed out after {}s",
                                self.config.connect_timeout.as_secs()
                            ),
                        });
                    }
                }
            }
        };

        // ── Handshake ────────────────────────────────────────────────
        let _ = state_tx.send(SessionState::HandshakeInProgress);
        debug!(device = %index, "handshake in progress");

        let handshake_secs = self.config.handshake_timeout.as_secs();
        let token = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                conn.close().await;
                let _ = state_tx.send(SessionState::Cancelled);
                debug!(device = %index, "session cancelled during handshake");
                return Err(CoreError::SessionCancelled { device: index.to_string() });
            }
            res = timeout(self.config.handshake_timeout, conn.perform_handshake(&secret, level)) => {
                match res {
                    Ok(Ok(token)) => token,
                    Ok(Err(e)) => {
                        conn.close().await;
                        let _ = state_tx.send(SessionState::Failed);
                        warn!(device = %index, error = %e, "handshake failed");
                        return Err(e.into());
                    }
                    Err(_) => {
                        conn.close().await;
                        let _ = state_tx.send(SessionState::Failed);
                        warn!(device = %index, timeout_secs = handshake_secs, "handshake timed out");
                        return Err(CoreError::HandshakeTimeout { timeout_secs: handshake_secs });
                    }
                }
            }
        };

        let _ = state_tx.send(SessionState::SecureSessionEstablished);
        info!(device = %index, %level, "secure session established");

        Ok(EstablishedSession {
            device: index.clone(),
            conn,
            token,
            security: level,
            created_at,
            _guard: SlotGuard {
                sessions: Arc::clone(&self.sessions),
                index,
            },
        })
    }
}

// ── EstablishedSession ──────────────────────────────────────────────

/// Clears the live-session slot once the session is consumed or
/// dropped, allowing a fresh attempt for the same device.
struct SlotGuard {
    sessions: Arc<DashMap<DeviceIndex, SessionSlot>>,
    index: DeviceIndex,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.sessions.remove(&self.index);
    }
}

/// A secure session ready for provisioning.
///
/// Consumed exactly once by [`Provisioner::provision`]; never reused.
/// Dropping it without provisioning closes nothing by itself -- call
/// [`close`](Self::close) if abandoning the session.
///
/// [`Provisioner::provision`]: crate::provision::Provisioner::provision
pub struct EstablishedSession {
    device: DeviceIndex,
    pub(crate) conn: Box<dyn Connection>,
    token: SessionToken,
    security: SecurityLevel,
    created_at: DateTime<Utc>,
    _guard: SlotGuard,
}

impl fmt::Debug for EstablishedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EstablishedSession")
            .field("device", &self.device)
            .field("security", &self.security)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl EstablishedSession {
    pub fn device(&self) -> &DeviceIndex {
        &self.device
    }

    pub fn security(&self) -> SecurityLevel {
        self.security
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Abandon the session, releasing the transport connection.
    pub async fn close(mut self) {
        self.conn.close().await;
    }
}
