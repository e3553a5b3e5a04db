// hearth-core: domain layer between hearth-link and embedders (mobile
// shells, CLIs). Owns session establishment, transport-mode
// arbitration, the credential cache, and inventory synchronization.

pub mod arbiter;
pub mod config;
pub mod credentials;
pub mod error;
pub mod inventory;
pub mod model;
pub mod notify;
pub mod provision;
pub mod session;
pub mod storage;
pub mod stream;
pub mod tokens;

// ── Primary re-exports ──────────────────────────────────────────────
pub use arbiter::{Arbitrator, ModeFailure, TransportMode, TransportModePreference};
pub use config::{BackgroundRetry, OnboardingConfig};
pub use credentials::{CredentialCache, NetworkCredential};
pub use error::CoreError;
pub use inventory::{
    Cursor, EntityKind, InventoryEntry, InventoryPage, InventoryPager, InventoryState, SyncEngine,
};
pub use notify::{NotificationBridge, NotificationEvent, PushPlatform, Subscription};
pub use provision::{NetworkSelection, ProvisionedDevice, Provisioner};
pub use session::{DeviceIndex, EstablishedSession, SessionManager, SessionState};
pub use storage::{KvStore, MemoryStore, StorageError};
pub use stream::EntityStream;
pub use tokens::TokenStore;

// Re-export model types at the crate root for ergonomics.
pub use model::{EntityId, Group, Identified, Node, Param, ParamValue};
