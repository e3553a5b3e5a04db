// ── Group: a home or room grouping nodes ──

use serde::{Deserialize, Serialize};

use super::{EntityId, Identified};

/// A user-defined grouping of nodes (home, room).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub node_ids: Vec<EntityId>,
}

impl Group {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_ids: Vec::new(),
        }
    }

    pub fn contains(&self, node: &EntityId) -> bool {
        self.node_ids.contains(node)
    }
}

impl Identified for Group {
    fn id(&self) -> &EntityId {
        &self.id
    }
}
