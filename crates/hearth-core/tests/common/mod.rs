// Shared fixtures for hearth-core integration tests: a scriptable
// transport bridge and a scriptable inventory pager.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hearth_core::inventory::{Cursor, EntityKind, InventoryPage, InventoryPager};
use hearth_core::CoreError;
use hearth_link::{
    Connection, DeviceCandidate, DeviceSighting, Error, SecurityLevel, SessionToken,
    TransportBridge, TransportKind,
};
use secrecy::{ExposeSecret, SecretString};

// ── FakeBridge ──────────────────────────────────────────────────────

/// What a fake connection's handshake does.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum HandshakeMode {
    /// Check the secret against the accepted one.
    Verify,
    /// Never complete (exercises timeouts and cancellation).
    Hang,
}

/// Scriptable [`TransportBridge`] whose connections verify a fixed
/// proof-of-possession secret. Every opened connection's close flag is
/// recorded so tests can assert release on all exit paths.
pub struct FakeBridge {
    accepted_secret: String,
    devices: Vec<DeviceSighting>,
    capabilities: BTreeSet<String>,
    handshake_mode: HandshakeMode,
    connect_fails: AtomicBool,
    node_id: String,
    closed_flags: Mutex<Vec<Arc<AtomicBool>>>,
}

impl FakeBridge {
    pub fn new(accepted_secret: &str) -> Self {
        Self {
            accepted_secret: accepted_secret.to_owned(),
            devices: vec![DeviceSighting {
                name: "PROV_58f2".into(),
                kind: TransportKind::ShortRangeRadio,
            }],
            capabilities: ["wifi_scan", "wifi_prov"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            handshake_mode: HandshakeMode::Verify,
            connect_fails: AtomicBool::new(false),
            node_id: "node-58f2aabbccdd".into(),
            closed_flags: Mutex::new(Vec::new()),
        }
    }

    pub fn hanging_handshake(mut self) -> Self {
        self.handshake_mode = HandshakeMode::Hang;
        self
    }

    pub fn failing_connect(self) -> Self {
        self.connect_fails.store(true, Ordering::SeqCst);
        self
    }

    /// The single scripted device as a probe-complete candidate.
    pub fn candidate(&self) -> DeviceCandidate {
        DeviceCandidate::new(self.devices[0].name.clone(), self.devices[0].kind)
            .with_capabilities(self.capabilities.iter().cloned())
    }

    /// Close flags of every connection opened so far, in open order.
    pub fn connections_closed(&self) -> Vec<bool> {
        self.closed_flags
            .lock()
            .unwrap()
            .iter()
            .map(|f| f.load(Ordering::SeqCst))
            .collect()
    }
}

#[async_trait]
impl TransportBridge for FakeBridge {
    async fn scan(&self, kind: TransportKind) -> Result<Vec<DeviceSighting>, Error> {
        Ok(self
            .devices
            .iter()
            .filter(|d| d.kind == kind)
            .cloned()
            .collect())
    }

    async fn probe(&self, _sighting: &DeviceSighting) -> Result<BTreeSet<String>, Error> {
        Ok(self.capabilities.clone())
    }

    async fn connect(&self, candidate: &DeviceCandidate) -> Result<Box<dyn Connection>, Error> {
        if self.connect_fails.load(Ordering::SeqCst) {
            return Err(Error::ConnectFailed {
                reason: format!("{candidate} unreachable"),
            });
        }
        let closed = Arc::new(AtomicBool::new(false));
        self.closed_flags.lock().unwrap().push(Arc::clone(&closed));
        Ok(Box::new(FakeConnection {
            accepted_secret: self.accepted_secret.clone(),
            handshake_mode: self.handshake_mode,
            node_id: self.node_id.clone(),
            closed,
        }))
    }
}

struct FakeConnection {
    accepted_secret: String,
    handshake_mode: HandshakeMode,
    node_id: String,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl Connection for FakeConnection {
    async fn perform_handshake(
        &mut self,
        secret: &SecretString,
        _level: SecurityLevel,
    ) -> Result<SessionToken, Error> {
        match self.handshake_mode {
            HandshakeMode::Hang => futures_util::future::pending().await,
            HandshakeMode::Verify => {
                if secret.expose_secret() == self.accepted_secret {
                    Ok(SessionToken::new(b"fake-session".to_vec()))
                } else {
                    Err(Error::HandshakeRejected)
                }
            }
        }
    }

    async fn apply_network(
        &mut self,
        _ssid: &str,
        _passphrase: &SecretString,
    ) -> Result<String, Error> {
        Ok(self.node_id.clone())
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

// ── ScriptedPager ───────────────────────────────────────────────────

/// One scripted pager response.
pub enum PageScript {
    Page(InventoryPage),
    Fail(&'static str),
}

/// [`InventoryPager`] that serves a fixed per-kind response sequence.
pub struct ScriptedPager {
    scripts: Mutex<HashMap<EntityKind, VecDeque<PageScript>>>,
    fetches: AtomicUsize,
}

impl ScriptedPager {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn script(self, kind: EntityKind, responses: Vec<PageScript>) -> Self {
        self.scripts.lock().unwrap().insert(kind, responses.into());
        self
    }

    /// Total page fetches served (first and next alike).
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn serve(&self, kind: EntityKind) -> Result<InventoryPage, CoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(&kind).and_then(VecDeque::pop_front) {
            Some(PageScript::Page(page)) => Ok(page),
            Some(PageScript::Fail(reason)) => Err(CoreError::Internal(reason.to_owned())),
            None => Ok(InventoryPage::default()),
        }
    }
}

#[async_trait]
impl InventoryPager for ScriptedPager {
    async fn first_page(&self, kind: EntityKind) -> Result<InventoryPage, CoreError> {
        self.serve(kind)
    }

    async fn next_page(&self, kind: EntityKind, _cursor: &Cursor) -> Result<InventoryPage, CoreError> {
        self.serve(kind)
    }
}

// ── Page builders ───────────────────────────────────────────────────

pub fn node_page(ids: &[&str], cursor: Option<&str>) -> InventoryPage {
    use hearth_core::inventory::InventoryEntry;
    use hearth_core::Node;

    InventoryPage {
        entries: ids
            .iter()
            .map(|id| InventoryEntry::Node(Node::new(*id, format!("Node {id}"))))
            .collect(),
        cursor: cursor.map(Cursor::new),
    }
}

pub fn group_page(ids: &[&str], cursor: Option<&str>) -> InventoryPage {
    use hearth_core::inventory::InventoryEntry;
    use hearth_core::Group;

    InventoryPage {
        entries: ids
            .iter()
            .map(|id| InventoryEntry::Group(Group::new(*id, format!("Group {id}"))))
            .collect(),
        cursor: cursor.map(Cursor::new),
    }
}
