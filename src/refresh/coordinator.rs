//! Replace-all refresh of the persisted book set
//!
//! The coordinator runs CLEAR, SAVE and INVALIDATE_CACHE strictly in that
//! order. In transactional mode CLEAR and SAVE share one store transaction,
//! so a failed SAVE rolls the store back to its previous contents. In
//! independent mode a failed SAVE leaves the store empty.

use crate::cache::{CacheFlush, CacheStore};
use crate::config::StorageConfig;
use crate::records::CanonicalBookRecord;
use crate::refresh::state::RefreshStage;
use crate::storage::{BookStore, StorageError};
use crate::CatalogError;

/// Whether CLEAR and SAVE share a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    Transactional,
    Independent,
}

impl RefreshMode {
    pub fn from_config(config: &StorageConfig) -> Self {
        if config.transactional {
            Self::Transactional
        } else {
            Self::Independent
        }
    }
}

/// Result of a completed refresh
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub deleted_count: u64,
    pub saved_count: u64,
    pub cache_invalidated: bool,

    /// Every stage entered, in order
    pub stages: Vec<RefreshStage>,
}

/// Drives one refresh over a borrowed store and optional cache
pub struct RefreshCoordinator<'a> {
    store: &'a mut dyn BookStore,
    cache: Option<&'a mut dyn CacheStore>,
    mode: RefreshMode,
    stage: RefreshStage,
    trail: Vec<RefreshStage>,
}

impl<'a> RefreshCoordinator<'a> {
    pub fn new(
        store: &'a mut dyn BookStore,
        cache: Option<&'a mut dyn CacheStore>,
        mode: RefreshMode,
    ) -> Self {
        Self {
            store,
            cache,
            mode,
            stage: RefreshStage::Clear,
            trail: vec![RefreshStage::Clear],
        }
    }

    /// Replaces the stored books with `books`
    ///
    /// # Returns
    ///
    /// * `Ok(RefreshReport)` - The store holds exactly `books`
    /// * `Err(CatalogError::EmptyRefresh)` - `books` is empty; the store is untouched
    /// * `Err(CatalogError::RefreshAborted)` - CLEAR or SAVE failed; carries the
    ///   deleted count when CLEAR had already succeeded
    pub async fn refresh(
        mut self,
        books: &[CanonicalBookRecord],
    ) -> Result<RefreshReport, CatalogError> {
        if books.is_empty() {
            tracing::error!("No books to save, leaving the store untouched");
            return Err(CatalogError::EmptyRefresh);
        }

        tracing::info!(
            "Refreshing store with {} books ({:?} mode)",
            books.len(),
            self.mode
        );

        if self.mode == RefreshMode::Transactional {
            if let Err(e) = self.store.begin() {
                return Err(self.abort(None, e));
            }
        }

        let deleted_count = match self.store.delete_all() {
            Ok(count) => count,
            Err(e) => {
                self.rollback_if_transactional();
                return Err(self.abort(None, e));
            }
        };
        tracing::info!("Cleared {} existing books", deleted_count);

        self.advance(RefreshStage::Save)?;

        let saved_count = match self.store.insert_many(books) {
            Ok(count) => count,
            Err(e) => {
                self.report_save_failure();
                return Err(self.abort(Some(deleted_count), e));
            }
        };

        if self.mode == RefreshMode::Transactional {
            if let Err(e) = self.store.commit() {
                self.report_save_failure();
                return Err(self.abort(Some(deleted_count), e));
            }
        }
        tracing::info!("Saved {} books", saved_count);

        self.advance(RefreshStage::InvalidateCache)?;
        let cache_invalidated = self.invalidate_cache().await;

        self.advance(RefreshStage::Done)?;

        Ok(RefreshReport {
            deleted_count,
            saved_count,
            cache_invalidated,
            stages: self.trail,
        })
    }

    fn advance(&mut self, next: RefreshStage) -> Result<(), CatalogError> {
        if !self.stage.can_transition_to(next) {
            return Err(CatalogError::InvalidTransition {
                from: self.stage,
                to: next,
            });
        }
        tracing::debug!("Refresh stage {} -> {}", self.stage, next);
        self.stage = next;
        self.trail.push(next);
        Ok(())
    }

    /// Moves to `Failed` and builds the error for the stage that failed
    fn abort(&mut self, deleted_count: Option<u64>, source: StorageError) -> CatalogError {
        let stage = self.stage;
        tracing::error!("Refresh failed at stage {}: {}", stage, source);

        if self.stage.can_transition_to(RefreshStage::Failed) {
            self.stage = RefreshStage::Failed;
            self.trail.push(RefreshStage::Failed);
        }

        CatalogError::RefreshAborted {
            stage,
            deleted_count,
            source,
        }
    }

    fn rollback_if_transactional(&mut self) {
        if self.mode == RefreshMode::Transactional {
            if let Err(e) = self.store.rollback() {
                tracing::error!("Rollback failed: {}", e);
            }
        }
    }

    fn report_save_failure(&mut self) {
        match self.mode {
            RefreshMode::Transactional => {
                self.rollback_if_transactional();
                tracing::warn!("Save failed, previous books restored by rollback");
            }
            RefreshMode::Independent => {
                tracing::error!("Save failed after clear, the store is now empty");
            }
        }
    }

    /// Best-effort flush; never fails the refresh
    async fn invalidate_cache(&mut self) -> bool {
        let Some(cache) = self.cache.as_mut() else {
            tracing::info!("No cache connected, skipping invalidation");
            return false;
        };

        match cache.flush_all().await {
            CacheFlush::Flushed => {
                tracing::info!("Cache invalidated");
                true
            }
            CacheFlush::Unavailable(reason) => {
                tracing::warn!("Cache invalidation failed: {}", reason);
                false
            }
        }
    }
}
