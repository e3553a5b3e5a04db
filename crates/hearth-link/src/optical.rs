// ── Optical onboarding codes ──
//
// The third discovery input: a QR-style JSON payload printed on the
// device or its packaging. Resolves directly to a candidate, skipping
// the scan, and may carry the proof-of-possession secret inline.

use secrecy::SecretString;
use serde::Deserialize;

use crate::bridge::SecurityLevel;
use crate::device::{DeviceCandidate, TransportKind};
use crate::error::Error;

/// A decoded optical onboarding code.
#[derive(Debug)]
pub struct OpticalCode {
    pub candidate: DeviceCandidate,
    /// Proof-of-possession secret embedded in the code, if any.
    pub pop: Option<SecretString>,
    /// Security tier the code asks for; defaults to [`SecurityLevel::Pop`]
    /// when a secret is present, [`SecurityLevel::Insecure`] otherwise.
    pub security: SecurityLevel,
}

/// Wire shape of the payload. `transport` uses the vendor's short
/// names (`ble` / `softap`), not our kebab-case kinds.
#[derive(Deserialize)]
struct RawPayload {
    #[serde(default)]
    ver: Option<String>,
    name: String,
    transport: String,
    #[serde(default)]
    pop: Option<String>,
    #[serde(default)]
    security: Option<u8>,
}

/// Parse a scanned optical payload into a candidate.
///
/// Accepts the `v1` JSON shape. Unknown versions, transports, or
/// security tiers fail with [`Error::OpticalPayload`].
pub fn parse_optical_code(payload: &str) -> Result<OpticalCode, Error> {
    let raw: RawPayload = serde_json::from_str(payload).map_err(|e| Error::OpticalPayload {
        reason: format!("not valid JSON: {e}"),
    })?;

    if let Some(ver) = &raw.ver {
        if ver != "v1" {
            return Err(Error::OpticalPayload {
                reason: format!("unsupported version {ver:?}"),
            });
        }
    }

    let kind = match raw.transport.as_str() {
        "ble" => TransportKind::ShortRangeRadio,
        "softap" => TransportKind::LocalAccessPoint,
        other => {
            return Err(Error::OpticalPayload {
                reason: format!("unknown transport {other:?}"),
            });
        }
    };

    let pop = raw.pop.map(SecretString::from);

    let security = match raw.security {
        Some(0) => SecurityLevel::Insecure,
        Some(1) => SecurityLevel::Pop,
        Some(2) => SecurityLevel::PopSrp,
        Some(other) => {
            return Err(Error::OpticalPayload {
                reason: format!("unknown security tier {other}"),
            });
        }
        None if pop.is_some() => SecurityLevel::Pop,
        None => SecurityLevel::Insecure,
    };

    Ok(OpticalCode {
        candidate: DeviceCandidate::new(raw.name, kind),
        pop,
        security,
    })
}
