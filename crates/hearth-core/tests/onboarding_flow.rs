// Full onboarding pass: discover a device, establish a secure session
// with the proof-of-possession secret, provision it onto a network,
// then find it in the synced cloud inventory.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;

use futures_util::StreamExt;
use hearth_core::inventory::EntityKind;
use hearth_core::{
    CredentialCache, MemoryStore, NetworkSelection, OnboardingConfig, Provisioner, SessionManager,
    SyncEngine,
};
use hearth_link::{SecurityLevel, TransportKind};
use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};

use common::{group_page, node_page, FakeBridge, PageScript, ScriptedPager};

const POP: &str = "ABCDEFGH";

#[tokio::test]
async fn discover_establish_provision_and_sync() {
    let config = OnboardingConfig::default();
    let bridge: Arc<FakeBridge> = Arc::new(FakeBridge::new(POP));

    // ── Discover ─────────────────────────────────────────────────────
    let stream = hearth_link::discover(
        Arc::clone(&bridge) as Arc<dyn hearth_link::TransportBridge>,
        TransportKind::ShortRangeRadio,
        config.discovery(),
    );
    tokio::pin!(stream);

    let mut candidates = Vec::new();
    while let Some(item) = stream.next().await {
        candidates.push(item.unwrap());
    }
    assert_eq!(candidates.len(), 1);
    let candidate = candidates.remove(0);
    assert!(candidate.requires_pop());
    assert!(candidate.has_capability("wifi_prov"));

    // ── Establish ────────────────────────────────────────────────────
    let manager = SessionManager::new(
        Arc::clone(&bridge) as Arc<dyn hearth_link::TransportBridge>,
        config.clone(),
    );
    let session = manager
        .establish(&candidate, SecretString::from(POP), SecurityLevel::Pop)
        .await
        .unwrap();
    assert_eq!(session.security(), SecurityLevel::Pop);

    // ── Provision ────────────────────────────────────────────────────
    let credentials = CredentialCache::new(MemoryStore::shared());
    let provisioner = Provisioner::new(credentials.clone());

    let provisioned = provisioner
        .provision(
            session,
            NetworkSelection::with_passphrase("HomeNet", SecretString::from("hunter2")),
        )
        .await
        .unwrap();

    assert_eq!(provisioned.ssid, "HomeNet");
    assert_eq!(provisioned.name, "PROV_58f2");
    // The transport connection is released once provisioning ends.
    assert_eq!(bridge.connections_closed(), [true]);

    // The credential was cached for the next onboarding run.
    let saved = credentials.network_password("HomeNet").unwrap().unwrap();
    assert_eq!(saved.expose_secret(), "hunter2");

    // ── Sync ─────────────────────────────────────────────────────────
    let node_id = provisioned.node_id.to_string();
    let pager = ScriptedPager::new()
        .script(
            EntityKind::Node,
            vec![PageScript::Page(node_page(&[node_id.as_str()], None))],
        )
        .script(
            EntityKind::Group,
            vec![PageScript::Page(group_page(&["home-1"], None))],
        );
    let engine = SyncEngine::new(
        Arc::new(pager) as Arc<dyn hearth_core::InventoryPager>,
        config,
    );

    let (nodes, groups) = engine.fetch_nodes_and_groups(true).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(nodes.len(), 1);
    assert!(
        nodes.iter().any(|n| n.id == provisioned.node_id),
        "the provisioned device must appear in the synced inventory"
    );
}
