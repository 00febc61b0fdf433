//! Refresh stages and their transitions

use std::fmt;

/// Stage of a replace-all refresh
///
/// ```text
/// Clear ──> Save ──> InvalidateCache ──> Done
///   │         │             │
///   └─────────┴─────────────┴──> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshStage {
    Clear,
    Save,
    InvalidateCache,
    Done,
    Failed,
}

impl RefreshStage {
    /// Returns true for `Done` and `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether the refresh may move from `self` to `next`
    pub fn can_transition_to(&self, next: RefreshStage) -> bool {
        match (self, next) {
            (Self::Clear, Self::Save) => true,
            (Self::Save, Self::InvalidateCache) => true,
            (Self::InvalidateCache, Self::Done) => true,
            (current, Self::Failed) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for RefreshStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Clear => "CLEAR",
            Self::Save => "SAVE",
            Self::InvalidateCache => "INVALIDATE_CACHE",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(RefreshStage::Clear.can_transition_to(RefreshStage::Save));
        assert!(RefreshStage::Save.can_transition_to(RefreshStage::InvalidateCache));
        assert!(RefreshStage::InvalidateCache.can_transition_to(RefreshStage::Done));
    }

    #[test]
    fn test_stages_cannot_be_skipped() {
        assert!(!RefreshStage::Clear.can_transition_to(RefreshStage::InvalidateCache));
        assert!(!RefreshStage::Clear.can_transition_to(RefreshStage::Done));
        assert!(!RefreshStage::Save.can_transition_to(RefreshStage::Done));
        assert!(!RefreshStage::Save.can_transition_to(RefreshStage::Clear));
    }

    #[test]
    fn test_failed_reachable_from_non_terminal_only() {
        for stage in [
            RefreshStage::Clear,
            RefreshStage::Save,
            RefreshStage::InvalidateCache,
        ] {
            assert!(stage.can_transition_to(RefreshStage::Failed));
        }
        assert!(!RefreshStage::Done.can_transition_to(RefreshStage::Failed));
        assert!(!RefreshStage::Failed.can_transition_to(RefreshStage::Failed));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(RefreshStage::Clear.to_string(), "CLEAR");
        assert_eq!(RefreshStage::InvalidateCache.to_string(), "INVALIDATE_CACHE");
        assert_eq!(RefreshStage::Failed.to_string(), "FAILED");
    }
}
