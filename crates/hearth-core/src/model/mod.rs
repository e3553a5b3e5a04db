// ── Domain model ──
//
// Typed, closed representations of the entities the vendor SDK hands
// over as loose duck-typed objects. Everything crossing the boundary
// is matched exhaustively into these shapes.

mod entity_id;
mod group;
mod node;

pub use entity_id::EntityId;
pub use group::Group;
pub use node::{Node, Param, ParamValue};

/// Anything stored in an inventory collection, keyed by id.
pub trait Identified {
    fn id(&self) -> &EntityId;
}
