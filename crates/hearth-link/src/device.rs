// ── Discovery-side device types ──
//
// TransportKind and the sighting/candidate pair form the foundation of
// the onboarding flow: a sighting is a raw scan hit, a candidate is a
// sighting that survived the capability probe.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ── TransportKind ───────────────────────────────────────────────────

/// The local transport an unprovisioned device is reachable over.
///
/// Both exist only during onboarding; once the device is on the user's
/// network it is addressed through a `TransportMode` chosen per call by
/// the arbitrator in `hearth-core`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TransportKind {
    /// Short-range radio broadcast (advertised service, no network yet).
    ShortRangeRadio,
    /// Device-hosted local access point the phone joins temporarily.
    LocalAccessPoint,
}

// ── DeviceSighting ──────────────────────────────────────────────────

/// A raw scan hit: a device name seen on one transport, before the
/// capability probe has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSighting {
    pub name: String,
    pub kind: TransportKind,
}

impl fmt::Display for DeviceSighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.kind)
    }
}

// ── DeviceCandidate ─────────────────────────────────────────────────

/// A device eligible for session establishment.
///
/// Carries the capability set the device self-reported during the
/// probe (e.g. `"wifi_scan"`, `"wifi_prov"`, `"no_pop"`). Capabilities
/// are an ordered set so candidates compare and display stably.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCandidate {
    pub name: String,
    pub kind: TransportKind,
    pub capabilities: BTreeSet<String>,
}

impl DeviceCandidate {
    pub fn new(name: impl Into<String>, kind: TransportKind) -> Self {
        Self {
            name: name.into(),
            kind,
            capabilities: BTreeSet::new(),
        }
    }

    pub fn with_capabilities<I, S>(mut self, caps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = caps.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the device declared a given capability.
    pub fn has_capability(&self, cap: &str) -> bool {
        self.capabilities.contains(cap)
    }

    /// Devices that declare `no_pop` skip the proof-of-possession
    /// secret and negotiate at the insecure tier.
    pub fn requires_pop(&self) -> bool {
        !self.has_capability("no_pop")
    }
}

impl fmt::Display for DeviceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.kind)
    }
}
