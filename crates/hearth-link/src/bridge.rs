// ── Transport bridge contract ──
//
// The platform side of onboarding: scanning, capability probing,
// connecting, and the proof-of-possession handshake. Implementations
// wrap the vendor SDK / platform radio APIs; `hearth-core` consumes
// them as trait objects and never sees transport internals.

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::device::{DeviceCandidate, DeviceSighting, TransportKind};
use crate::error::Error;

// ── SecurityLevel ───────────────────────────────────────────────────

/// Handshake security tier, negotiated per session.
///
/// Ordered weakest to strongest; `PartialOrd` follows that ordering so
/// callers can enforce a floor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SecurityLevel {
    /// No proof of possession; plaintext session. Only for devices
    /// that declare the `no_pop` capability.
    Insecure,
    /// Key exchange authenticated with the proof-of-possession secret.
    Pop,
    /// Password-authenticated key exchange with the secret as the
    /// password (strongest tier).
    PopSrp,
}

// ── SessionToken ────────────────────────────────────────────────────

/// Opaque token proving a completed handshake.
///
/// The byte content is device/protocol specific and never inspected by
/// Hearth. `Debug` redacts it -- the token is derived from secret
/// material and must not reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(Vec<u8>);

impl SessionToken {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken([{} bytes redacted])", self.0.len())
    }
}

// ── TransportBridge ─────────────────────────────────────────────────

/// Platform transport operations consumed by discovery and session
/// establishment.
///
/// Implementations must be idempotent under re-invocation: a scan
/// cancelled midway may be restarted without residual state.
#[async_trait]
pub trait TransportBridge: Send + Sync {
    /// Enumerate devices currently visible on the given transport.
    ///
    /// Fails with [`Error::PermissionDenied`] when the radio or its
    /// permission is unavailable.
    async fn scan(&self, kind: TransportKind) -> Result<Vec<DeviceSighting>, Error>;

    /// Query a sighted device's self-reported capability set.
    async fn probe(&self, sighting: &DeviceSighting) -> Result<BTreeSet<String>, Error>;

    /// Open a transport-level connection to a candidate.
    async fn connect(&self, candidate: &DeviceCandidate) -> Result<Box<dyn Connection>, Error>;
}

// ── Connection ──────────────────────────────────────────────────────

/// A live transport connection to one device.
///
/// Callers own the handle exclusively and must call [`close`] on every
/// exit path -- success, failure, or cancellation. `close` is
/// infallible and idempotent so teardown never masks the real error.
///
/// [`close`]: Connection::close
#[async_trait]
pub trait Connection: Send {
    /// Run the proof-of-possession handshake at the given tier.
    ///
    /// A wrong secret fails with [`Error::HandshakeRejected`]; an
    /// unsupported tier with [`Error::ProtocolMismatch`].
    async fn perform_handshake(
        &mut self,
        secret: &SecretString,
        level: SecurityLevel,
    ) -> Result<SessionToken, Error>;

    /// Send the target network's credentials over the secure session
    /// and wait for the device to confirm it joined. Returns the node
    /// id the device will register under.
    async fn apply_network(
        &mut self,
        ssid: &str,
        passphrase: &SecretString,
    ) -> Result<String, Error>;

    /// Release the underlying transport connection.
    async fn close(&mut self);
}
