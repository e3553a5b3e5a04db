// ── Inventory synchronization ──
//
// Paginated sync of nodes and groups from the vendor cloud. The first
// page returns immediately to the caller; remaining pages stream in on
// detached background tasks, throttled by the configured delay and
// guarded by a generation counter so a newer sync supersedes them.

mod collection;
mod pager;
mod state;

pub use pager::{Cursor, EntityKind, InventoryEntry, InventoryPage, InventoryPager};
pub use state::InventoryState;

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{BackgroundRetry, OnboardingConfig};
use crate::error::CoreError;
use crate::model::{Group, Node};

use state::ApplyOutcome;

/// Drives paginated inventory fetches and applies them to a shared
/// [`InventoryState`].
#[derive(Clone)]
pub struct SyncEngine {
    pager: Arc<dyn InventoryPager>,
    state: Arc<InventoryState>,
    config: OnboardingConfig,
}

impl SyncEngine {
    pub fn new(pager: Arc<dyn InventoryPager>, config: OnboardingConfig) -> Self {
        Self {
            pager,
            state: Arc::new(InventoryState::new()),
            config,
        }
    }

    /// The shared state this engine writes into.
    pub fn state(&self) -> Arc<InventoryState> {
        Arc::clone(&self.state)
    }

    /// Fetch and apply the first page for one kind under the current
    /// generation, without spawning background continuation.
    pub async fn sync_first_page(&self, kind: EntityKind) -> Result<InventoryPage, CoreError> {
        let generation = self.state.generation();
        self.first_page_at(kind, generation).await
    }

    /// Explicitly fetch and apply the next page for one kind.
    ///
    /// Fails with [`CoreError::NoMoreIdle`] when no further pages
    /// remain; the state is left untouched in that case.
    pub async fn fetch_next(&self, kind: EntityKind) -> Result<InventoryPage, CoreError> {
        let generation = self.state.generation();
        let Some(cursor) = self.state.cursor_if_pending(kind) else {
            return Err(CoreError::NoMoreIdle { kind });
        };

        let page = self.pager.next_page(kind, &cursor).await?;
        match self.state.apply_page(kind, page.clone(), generation, false) {
            ApplyOutcome::Applied { added } => debug!(%kind, added, "applied next page"),
            ApplyOutcome::Stale => debug!(%kind, "discarded stale next page"),
        }
        Ok(page)
    }

    /// Full inventory sync: bump the generation, optionally fetch both
    /// first pages, spawn background continuation for the rest, and
    /// return the snapshots as of the first pages.
    ///
    /// With `fetch_first_page = false` only the background continuation
    /// is (re)started from whatever paging progress already exists.
    pub async fn fetch_nodes_and_groups(
        &self,
        fetch_first_page: bool,
    ) -> Result<(Arc<Vec<Arc<Node>>>, Arc<Vec<Arc<Group>>>), CoreError> {
        let generation = self.state.begin_sync();

        if fetch_first_page {
            // Both kinds in parallel; either failure aborts the sync
            // before any background work starts.
            let (nodes, groups) = tokio::join!(
                self.first_page_at(EntityKind::Node, generation),
                self.first_page_at(EntityKind::Group, generation),
            );
            nodes?;
            groups?;
        }

        for kind in [EntityKind::Node, EntityKind::Group] {
            tokio::spawn(continuation_loop(
                Arc::clone(&self.pager),
                Arc::clone(&self.state),
                self.config.clone(),
                kind,
                generation,
            ));
        }

        info!(
            nodes = self.state.node_count(),
            groups = self.state.group_count(),
            "inventory sync started"
        );
        Ok((self.state.nodes_snapshot(), self.state.groups_snapshot()))
    }

    async fn first_page_at(
        &self,
        kind: EntityKind,
        generation: u64,
    ) -> Result<InventoryPage, CoreError> {
        let page = self.pager.first_page(kind).await?;
        match self.state.apply_page(kind, page.clone(), generation, true) {
            ApplyOutcome::Applied { added } => {
                debug!(%kind, added, has_next = page.cursor.is_some(), "applied first page");
            }
            ApplyOutcome::Stale => debug!(%kind, "discarded stale first page"),
        }
        Ok(page)
    }
}

/// Background task that drains remaining pages for one kind.
///
/// Stops when paging completes, when the generation is superseded, or
/// per the configured failure policy.
async fn continuation_loop(
    pager: Arc<dyn InventoryPager>,
    state: Arc<InventoryState>,
    config: OnboardingConfig,
    kind: EntityKind,
    generation: u64,
) {
    let mut failures: u32 = 0;
    loop {
        if state.generation() != generation {
            debug!(%kind, "continuation superseded by newer sync");
            return;
        }
        let Some(cursor) = state.cursor_if_pending(kind) else {
            debug!(%kind, "continuation complete");
            return;
        };

        sleep(config.page_delay).await;

        // A newer sync may have started during the throttle pause.
        if state.generation() != generation {
            debug!(%kind, "continuation superseded by newer sync");
            return;
        }

        match pager.next_page(kind, &cursor).await {
            Ok(page) => {
                failures = 0;
                match state.apply_page(kind, page, generation, false) {
                    ApplyOutcome::Applied { added } => {
                        debug!(%kind, added, "background page applied");
                    }
                    ApplyOutcome::Stale => {
                        debug!(%kind, "background page discarded as stale");
                        return;
                    }
                }
            }
            Err(e) => match config.background_retry {
                BackgroundRetry::Stop => {
                    warn!(%kind, error = %e, "background page fetch failed, stopping continuation");
                    return;
                }
                BackgroundRetry::Retry { max_attempts } => {
                    failures += 1;
                    if failures >= max_attempts {
                        warn!(%kind, error = %e, failures, "background page fetch failed, giving up");
                        return;
                    }
                    warn!(%kind, error = %e, attempt = failures, "background page fetch failed, retrying");
                }
            },
        }
    }
}
