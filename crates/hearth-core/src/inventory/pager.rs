// ── Cloud inventory paging contract ──
//
// The only thing this core needs from the vendor cloud API: pages of
// entity summaries with an opaque continuation cursor. The adapter
// over the actual SDK lives with the embedder.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::CoreError;
use crate::model::{EntityId, Group, Node};

/// Which inventory collection a page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Node,
    Group,
}

/// Opaque continuation cursor. Never inspected, only echoed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One entity summary from a page.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryEntry {
    Node(Node),
    Group(Group),
}

impl InventoryEntry {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Node(_) => EntityKind::Node,
            Self::Group(_) => EntityKind::Group,
        }
    }

    pub fn id(&self) -> &EntityId {
        match self {
            Self::Node(n) => &n.id,
            Self::Group(g) => &g.id,
        }
    }
}

/// One page of inventory results.
///
/// `cursor: None` signals there are no further pages.
#[derive(Debug, Clone, Default)]
pub struct InventoryPage {
    pub entries: Vec<InventoryEntry>,
    pub cursor: Option<Cursor>,
}

/// Paged access to the user's cloud inventory.
#[async_trait]
pub trait InventoryPager: Send + Sync {
    async fn first_page(&self, kind: EntityKind) -> Result<InventoryPage, CoreError>;

    async fn next_page(&self, kind: EntityKind, cursor: &Cursor) -> Result<InventoryPage, CoreError>;
}
