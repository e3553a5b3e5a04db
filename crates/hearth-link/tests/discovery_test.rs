// Integration tests for `discover` using a scripted in-memory bridge.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use hearth_link::{
    Connection, DeviceCandidate, DeviceSighting, DiscoveryConfig, Error, TransportBridge,
    TransportKind, discover,
};

// ── Scripted bridge ─────────────────────────────────────────────────

/// What the bridge should do when a given device is probed.
#[derive(Clone)]
enum ProbeScript {
    Caps(&'static [&'static str]),
    Fail,
    Hang,
}

struct ScriptedBridge {
    sightings: Vec<DeviceSighting>,
    probes: HashMap<String, ProbeScript>,
    scan_error: Option<fn() -> Error>,
}

impl ScriptedBridge {
    fn new(devices: &[(&str, ProbeScript)]) -> Self {
        let sightings = devices
            .iter()
            .map(|(name, _)| DeviceSighting {
                name: (*name).to_owned(),
                kind: TransportKind::ShortRangeRadio,
            })
            .collect();
        let probes = devices
            .iter()
            .map(|(name, script)| ((*name).to_owned(), script.clone()))
            .collect();
        Self {
            sightings,
            probes,
            scan_error: None,
        }
    }

    fn failing_scan(err: fn() -> Error) -> Self {
        Self {
            sightings: Vec::new(),
            probes: HashMap::new(),
            scan_error: Some(err),
        }
    }
}

#[async_trait]
impl TransportBridge for ScriptedBridge {
    async fn scan(&self, _kind: TransportKind) -> Result<Vec<DeviceSighting>, Error> {
        match self.scan_error {
            Some(err) => Err(err()),
            None => Ok(self.sightings.clone()),
        }
    }

    async fn probe(&self, sighting: &DeviceSighting) -> Result<BTreeSet<String>, Error> {
        match self.probes.get(&sighting.name) {
            Some(ProbeScript::Caps(caps)) => {
                Ok(caps.iter().map(|c| (*c).to_owned()).collect())
            }
            Some(ProbeScript::Fail) => Err(Error::ProbeFailed {
                reason: "device returned garbage".into(),
            }),
            Some(ProbeScript::Hang) | None => {
                // Longer than any probe_timeout used in these tests.
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(BTreeSet::new())
            }
        }
    }

    async fn connect(&self, _candidate: &DeviceCandidate) -> Result<Box<dyn Connection>, Error> {
        Err(Error::ConnectFailed {
            reason: "not under test".into(),
        })
    }
}

async fn collect(
    bridge: Arc<dyn TransportBridge>,
) -> Vec<Result<DeviceCandidate, Error>> {
    discover(
        bridge,
        TransportKind::ShortRangeRadio,
        DiscoveryConfig::default(),
    )
    .collect()
    .await
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn yields_probed_candidates_in_scan_order() {
    let bridge = Arc::new(ScriptedBridge::new(&[
        ("PROV_aa11", ProbeScript::Caps(&["wifi_prov", "wifi_scan"])),
        ("PROV_bb22", ProbeScript::Caps(&["wifi_prov", "no_pop"])),
    ]));

    let items = collect(bridge).await;
    assert_eq!(items.len(), 2);

    let first = items[0].as_ref().unwrap();
    assert_eq!(first.name, "PROV_aa11");
    assert!(first.has_capability("wifi_scan"));
    assert!(first.requires_pop());

    let second = items[1].as_ref().unwrap();
    assert_eq!(second.name, "PROV_bb22");
    assert!(!second.requires_pop());
}

#[tokio::test]
async fn permission_unavailable_surfaces_once_and_ends_stream() {
    let bridge = Arc::new(ScriptedBridge::failing_scan(|| Error::PermissionDenied {
        reason: "radio disabled".into(),
    }));

    let items = collect(bridge).await;
    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(Error::PermissionDenied { .. })));
}

#[tokio::test]
async fn failing_probe_omits_candidate_and_scan_continues() {
    let bridge = Arc::new(ScriptedBridge::new(&[
        ("PROV_bad0", ProbeScript::Fail),
        ("PROV_good", ProbeScript::Caps(&["wifi_prov"])),
    ]));

    let items = collect(bridge).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_ref().unwrap().name, "PROV_good");
}

#[tokio::test(start_paused = true)]
async fn hanging_probe_times_out_and_is_omitted() {
    let bridge = Arc::new(ScriptedBridge::new(&[
        ("PROV_hang", ProbeScript::Hang),
        ("PROV_fast", ProbeScript::Caps(&["wifi_prov"])),
    ]));

    let items = collect(bridge).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_ref().unwrap().name, "PROV_fast");
}

#[tokio::test]
async fn rediscovery_after_drop_is_idempotent() {
    let bridge: Arc<dyn TransportBridge> = Arc::new(ScriptedBridge::new(&[
        ("PROV_aa11", ProbeScript::Caps(&["wifi_prov"])),
        ("PROV_bb22", ProbeScript::Caps(&["wifi_prov"])),
    ]));

    // First scan abandoned after one item.
    {
        let mut stream = Box::pin(discover(
            Arc::clone(&bridge),
            TransportKind::ShortRangeRadio,
            DiscoveryConfig::default(),
        ));
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.name, "PROV_aa11");
    }

    // A fresh scan sees the full set again.
    let items = collect(bridge).await;
    assert_eq!(items.len(), 2);
}
