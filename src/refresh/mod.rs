//! Refresh coordination: CLEAR, SAVE, then INVALIDATE_CACHE

mod coordinator;
mod state;

pub use coordinator::{RefreshCoordinator, RefreshMode, RefreshReport};
pub use state::RefreshStage;
