// ── Device provisioning ──
//
// Final onboarding step: push the selected network onto the device
// over an established secure session. The session is consumed either
// way, and the transport connection is released on every path.

use chrono::{DateTime, Utc};
use hearth_link::TransportKind;
use secrecy::SecretString;
use tracing::{info, warn};

use crate::credentials::CredentialCache;
use crate::error::CoreError;
use crate::model::EntityId;
use crate::notify::{NotificationBridge, NotificationEvent};
use crate::session::EstablishedSession;

// ── NetworkSelection ────────────────────────────────────────────────

/// The network the user chose for the device.
///
/// With no explicit passphrase the saved-credential cache is consulted
/// for the SSID; an open network uses [`open`](Self::open).
#[derive(Clone)]
pub struct NetworkSelection {
    pub ssid: String,
    passphrase: Option<SecretString>,
    open: bool,
}

impl NetworkSelection {
    /// A protected network with an explicit passphrase.
    pub fn with_passphrase(ssid: impl Into<String>, passphrase: SecretString) -> Self {
        Self {
            ssid: ssid.into(),
            passphrase: Some(passphrase),
            open: false,
        }
    }

    /// A protected network whose passphrase should come from the
    /// credential cache.
    pub fn from_saved(ssid: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            passphrase: None,
            open: false,
        }
    }

    /// An open network; no passphrase is sent or saved.
    pub fn open(ssid: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            passphrase: None,
            open: true,
        }
    }
}

// ── ProvisionedDevice ───────────────────────────────────────────────

/// Outcome of a successful provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionedDevice {
    /// Identity the device reported after joining the network. Matches
    /// the node id the cloud inventory will list it under.
    pub node_id: EntityId,
    pub name: String,
    pub kind: TransportKind,
    pub ssid: String,
    pub provisioned_at: DateTime<Utc>,
}

// ── Provisioner ─────────────────────────────────────────────────────

/// Applies network configuration to devices over secure sessions.
#[derive(Clone)]
pub struct Provisioner {
    credentials: CredentialCache,
    notifications: Option<NotificationBridge>,
}

impl Provisioner {
    pub fn new(credentials: CredentialCache) -> Self {
        Self {
            credentials,
            notifications: None,
        }
    }

    /// Announce successful provisioning runs on a notification bridge,
    /// so subscribed views refresh their inventory.
    pub fn with_notifications(mut self, bridge: NotificationBridge) -> Self {
        self.notifications = Some(bridge);
        self
    }

    /// Provision a device onto the selected network.
    ///
    /// Consumes the session; it cannot be reused afterwards. On success
    /// the credential is saved to the cache (best effort; a cache write
    /// failure never fails an already-provisioned device).
    pub async fn provision(
        &self,
        mut session: EstablishedSession,
        selection: NetworkSelection,
    ) -> Result<ProvisionedDevice, CoreError> {
        let passphrase = match self.resolve_passphrase(&selection) {
            Ok(passphrase) => passphrase,
            Err(e) => {
                session.conn.close().await;
                return Err(e);
            }
        };

        let device = session.device().clone();
        let result = session.conn.apply_network(&selection.ssid, &passphrase).await;
        session.conn.close().await;

        let node_id = match result {
            Ok(id) => EntityId::from(id),
            Err(e) => {
                warn!(device = %device, ssid = %selection.ssid, error = %e, "network apply failed");
                return Err(e.into());
            }
        };

        if !selection.open {
            if let Err(e) = self.credentials.save_network(&selection.ssid, passphrase) {
                warn!(ssid = %selection.ssid, error = %e, "failed to cache network credential");
            }
        }

        info!(device = %device, node_id = %node_id, ssid = %selection.ssid, "device provisioned");
        if let Some(bridge) = &self.notifications {
            bridge.publish(&NotificationEvent::InventoryChanged);
        }
        Ok(ProvisionedDevice {
            node_id,
            name: device.name,
            kind: device.kind,
            ssid: selection.ssid,
            provisioned_at: Utc::now(),
        })
    }

    fn resolve_passphrase(&self, selection: &NetworkSelection) -> Result<SecretString, CoreError> {
        if selection.open {
            return Ok(SecretString::from(String::new()));
        }
        if let Some(passphrase) = &selection.passphrase {
            return Ok(passphrase.clone());
        }
        self.credentials
            .network_password(&selection.ssid)?
            .ok_or_else(|| CoreError::InvalidInput {
                message: format!("no saved passphrase for network '{}'", selection.ssid),
            })
    }
}
