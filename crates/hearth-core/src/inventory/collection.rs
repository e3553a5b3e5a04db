// ── Reactive entity collection ──
//
// Concurrent id-keyed storage with snapshot subscriptions. Every
// mutation rebuilds the snapshot that `watch` subscribers receive.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::{EntityId, Identified};
use crate::stream::EntityStream;

/// Id-keyed collection for a single entity type.
pub(crate) struct EntityCollection<T: Identified + Clone + Send + Sync + 'static> {
    by_id: DashMap<EntityId, Arc<T>>,
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Identified + Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_id: DashMap::new(),
            snapshot,
        }
    }

    /// Insert or update an entity, keyed by its id. Returns `true` if
    /// the id was new.
    pub(crate) fn upsert(&self, entity: T) -> bool {
        let id = entity.id().clone();
        let is_new = self.by_id.insert(id, Arc::new(entity)).is_none();
        self.rebuild_snapshot();
        is_new
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    pub(crate) fn clear(&self) {
        self.by_id.clear();
        self.rebuild_snapshot();
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> EntityStream<T> {
        EntityStream::new(self.snapshot.subscribe())
    }

    /// Rebuild and broadcast the snapshot vec.
    fn rebuild_snapshot(&self) {
        let values: Vec<Arc<T>> = self.by_id.iter().map(|r| Arc::clone(r.value())).collect();
        // send_modify updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}
