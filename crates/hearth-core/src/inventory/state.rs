// ── Inventory state ──
//
// Process-wide aggregate of synchronized nodes and groups, plus the
// per-kind paging progress and the fetch generation counter that lets
// stale background continuations detect they were superseded.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::model::{EntityId, Group, Node};
use crate::stream::EntityStream;

use super::collection::EntityCollection;
use super::pager::{Cursor, EntityKind, InventoryEntry, InventoryPage};

/// Paging position for one entity kind.
#[derive(Debug, Clone, Default)]
struct PageProgress {
    cursor: Option<Cursor>,
    has_next: bool,
}

/// Result of applying a fetched page against a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ApplyOutcome {
    Applied { added: usize },
    /// A newer sync was triggered after this page was requested; the
    /// result was discarded untouched.
    Stale,
}

/// Synchronized inventory of the user's nodes and groups.
pub struct InventoryState {
    nodes: EntityCollection<Node>,
    groups: EntityCollection<Group>,
    node_progress: Mutex<PageProgress>,
    group_progress: Mutex<PageProgress>,
    generation: AtomicU64,
}

impl InventoryState {
    pub fn new() -> Self {
        Self {
            nodes: EntityCollection::new(),
            groups: EntityCollection::new(),
            node_progress: Mutex::new(PageProgress::default()),
            group_progress: Mutex::new(PageProgress::default()),
            generation: AtomicU64::new(0),
        }
    }

    // ── Generation ───────────────────────────────────────────────────

    /// Current fetch generation. Bumped by every full sync trigger.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Start a new sync generation, superseding any running
    /// continuation loops from prior generations.
    pub(crate) fn begin_sync(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    // ── Paging progress ──────────────────────────────────────────────

    /// Whether more pages remain for a kind.
    pub fn has_next(&self, kind: EntityKind) -> bool {
        self.with_progress(kind, |p| p.has_next)
    }

    /// The continuation cursor, but only while more pages remain.
    pub(crate) fn cursor_if_pending(&self, kind: EntityKind) -> Option<Cursor> {
        self.with_progress(kind, |p| {
            if p.has_next { p.cursor.clone() } else { None }
        })
    }

    /// Apply a fetched page, guarded by the generation it was fetched
    /// under. `first` pages replace the kind's collection; later pages
    /// upsert into it.
    pub(crate) fn apply_page(
        &self,
        kind: EntityKind,
        page: InventoryPage,
        generation: u64,
        first: bool,
    ) -> ApplyOutcome {
        if self.generation() != generation {
            return ApplyOutcome::Stale;
        }

        if first {
            match kind {
                EntityKind::Node => self.nodes.clear(),
                EntityKind::Group => self.groups.clear(),
            }
        }

        let mut added = 0;
        for entry in page.entries {
            let is_new = match entry {
                InventoryEntry::Node(node) => self.nodes.upsert(node),
                InventoryEntry::Group(group) => self.groups.upsert(group),
            };
            if is_new {
                added += 1;
            }
        }

        self.with_progress(kind, |p| {
            p.has_next = page.cursor.is_some();
            p.cursor = page.cursor.clone();
        });

        ApplyOutcome::Applied { added }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn nodes_snapshot(&self) -> Arc<Vec<Arc<Node>>> {
        self.nodes.snapshot()
    }

    pub fn groups_snapshot(&self) -> Arc<Vec<Arc<Group>>> {
        self.groups.snapshot()
    }

    pub fn node(&self, id: &EntityId) -> Option<Arc<Node>> {
        self.nodes.get(id)
    }

    pub fn group(&self, id: &EntityId) -> Option<Arc<Group>> {
        self.groups.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_nodes(&self) -> EntityStream<Node> {
        self.nodes.subscribe()
    }

    pub fn subscribe_groups(&self) -> EntityStream<Group> {
        self.groups.subscribe()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Run a closure against one kind's progress. Lock poisoning is
    /// recovered: the progress struct stays valid even if a holder
    /// panicked mid-update.
    fn with_progress<R>(&self, kind: EntityKind, f: impl FnOnce(&mut PageProgress) -> R) -> R {
        let lock = match kind {
            EntityKind::Node => &self.node_progress,
            EntityKind::Group => &self.group_progress,
        };
        let mut guard = match lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

impl Default for InventoryState {
    fn default() -> Self {
        Self::new()
    }
}
