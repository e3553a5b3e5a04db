// ── Transport discovery ──
//
// Lazy candidate streams over a TransportBridge. One scan per call,
// finite, restartable; a probe that times out or errors drops that
// candidate and the scan continues.

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures_core::Stream;
use tokio::time::timeout;
use tracing::debug;

use crate::bridge::TransportBridge;
use crate::device::{DeviceCandidate, TransportKind};
use crate::error::Error;

/// Discovery tuning.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Per-device budget for the capability probe. A probe that takes
    /// longer omits the candidate rather than stalling the scan.
    pub probe_timeout: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(2),
        }
    }
}

/// Scan one transport and yield probed candidates lazily.
///
/// The stream is finite (one pass over the scan results) and owns no
/// platform state, so dropping it mid-scan and calling `discover`
/// again is always safe. Radio/permission unavailability surfaces as a
/// single [`Error::PermissionDenied`] item, after which the stream
/// ends.
pub fn discover(
    bridge: Arc<dyn TransportBridge>,
    kind: TransportKind,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<DeviceCandidate, Error>> {
    stream! {
        let sightings = match bridge.scan(kind).await {
            Ok(sightings) => sightings,
            Err(e) => {
                yield Err(e);
                return;
            }
        };
        debug!(%kind, count = sightings.len(), "transport scan complete");

        for sighting in sightings {
            match timeout(config.probe_timeout, bridge.probe(&sighting)).await {
                Ok(Ok(capabilities)) => {
                    yield Ok(DeviceCandidate {
                        name: sighting.name,
                        kind,
                        capabilities,
                    });
                }
                Ok(Err(e)) => {
                    debug!(device = %sighting, error = %e, "capability probe failed -- candidate omitted");
                }
                Err(_) => {
                    debug!(device = %sighting, "capability probe timed out -- candidate omitted");
                }
            }
        }
    }
}
