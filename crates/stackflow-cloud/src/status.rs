//! Stack status vocabulary.
//!
//! The backend reports status as strings; the engine branches on a tagged
//! enumeration with explicit terminal/non-terminal classification instead
//! of matching strings at call sites.

use std::fmt;

/// Status of a stack as reported by the provisioning backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackStatus {
    CreateInProgress,
    CreateComplete,
    CreateFailed,
    RollbackInProgress,
    RollbackComplete,
    RollbackFailed,
    UpdateInProgress,
    UpdateCompleteCleanupInProgress,
    UpdateComplete,
    UpdateFailed,
    UpdateRollbackInProgress,
    UpdateRollbackCompleteCleanupInProgress,
    UpdateRollbackComplete,
    UpdateRollbackFailed,
    DeleteInProgress,
    DeleteComplete,
    DeleteFailed,
    ReviewInProgress,
    /// Status string this version does not know. Treated as non-terminal,
    /// so polling keeps observing it until the wait ceiling trips.
    Other(String),
}

impl StackStatus {
    /// No further automatic backend transition occurs from this status.
    pub fn is_terminal(&self) -> bool {
        use StackStatus::*;
        matches!(
            self,
            CreateComplete
                | CreateFailed
                | RollbackComplete
                | RollbackFailed
                | UpdateComplete
                | UpdateFailed
                | UpdateRollbackComplete
                | UpdateRollbackFailed
                | DeleteComplete
                | DeleteFailed
        )
    }

    /// Terminal status meaning the dispatched operation did not succeed.
    /// A completed rollback counts: the stack is stable again, but the
    /// operation that was awaited has been undone.
    pub fn is_failure(&self) -> bool {
        use StackStatus::*;
        matches!(
            self,
            CreateFailed
                | RollbackComplete
                | RollbackFailed
                | UpdateFailed
                | UpdateRollbackComplete
                | UpdateRollbackFailed
                | DeleteFailed
        )
    }

    /// Stable complete status from which an update may be issued.
    pub fn is_stable_complete(&self) -> bool {
        use StackStatus::*;
        matches!(
            self,
            CreateComplete | UpdateComplete | UpdateRollbackComplete
        )
    }

    pub fn as_str(&self) -> &str {
        use StackStatus::*;
        match self {
            CreateInProgress => "CREATE_IN_PROGRESS",
            CreateComplete => "CREATE_COMPLETE",
            CreateFailed => "CREATE_FAILED",
            RollbackInProgress => "ROLLBACK_IN_PROGRESS",
            RollbackComplete => "ROLLBACK_COMPLETE",
            RollbackFailed => "ROLLBACK_FAILED",
            UpdateInProgress => "UPDATE_IN_PROGRESS",
            UpdateCompleteCleanupInProgress => "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS",
            UpdateComplete => "UPDATE_COMPLETE",
            UpdateFailed => "UPDATE_FAILED",
            UpdateRollbackInProgress => "UPDATE_ROLLBACK_IN_PROGRESS",
            UpdateRollbackCompleteCleanupInProgress => {
                "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS"
            }
            UpdateRollbackComplete => "UPDATE_ROLLBACK_COMPLETE",
            UpdateRollbackFailed => "UPDATE_ROLLBACK_FAILED",
            DeleteInProgress => "DELETE_IN_PROGRESS",
            DeleteComplete => "DELETE_COMPLETE",
            DeleteFailed => "DELETE_FAILED",
            ReviewInProgress => "REVIEW_IN_PROGRESS",
            Other(s) => s,
        }
    }
}

impl From<&str> for StackStatus {
    fn from(s: &str) -> Self {
        use StackStatus::*;
        match s {
            "CREATE_IN_PROGRESS" => CreateInProgress,
            "CREATE_COMPLETE" => CreateComplete,
            "CREATE_FAILED" => CreateFailed,
            "ROLLBACK_IN_PROGRESS" => RollbackInProgress,
            "ROLLBACK_COMPLETE" => RollbackComplete,
            "ROLLBACK_FAILED" => RollbackFailed,
            "UPDATE_IN_PROGRESS" => UpdateInProgress,
            "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS" => UpdateCompleteCleanupInProgress,
            "UPDATE_COMPLETE" => UpdateComplete,
            "UPDATE_FAILED" => UpdateFailed,
            "UPDATE_ROLLBACK_IN_PROGRESS" => UpdateRollbackInProgress,
            "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS" => {
                UpdateRollbackCompleteCleanupInProgress
            }
            "UPDATE_ROLLBACK_COMPLETE" => UpdateRollbackComplete,
            "UPDATE_ROLLBACK_FAILED" => UpdateRollbackFailed,
            "DELETE_IN_PROGRESS" => DeleteInProgress,
            "DELETE_COMPLETE" => DeleteComplete,
            "DELETE_FAILED" => DeleteFailed,
            "REVIEW_IN_PROGRESS" => ReviewInProgress,
            other => Other(other.to_string()),
        }
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_roundtrip() {
        for s in [
            "CREATE_IN_PROGRESS",
            "CREATE_COMPLETE",
            "UPDATE_ROLLBACK_COMPLETE",
            "DELETE_COMPLETE",
        ] {
            assert_eq!(StackStatus::from(s).as_str(), s);
        }
    }

    #[test]
    fn unknown_status_is_preserved_and_non_terminal() {
        let status = StackStatus::from("IMPORT_IN_PROGRESS");
        assert_eq!(status, StackStatus::Other("IMPORT_IN_PROGRESS".into()));
        assert!(!status.is_terminal());
    }

    #[test]
    fn in_progress_statuses_are_not_terminal() {
        assert!(!StackStatus::CreateInProgress.is_terminal());
        assert!(!StackStatus::UpdateCompleteCleanupInProgress.is_terminal());
        assert!(!StackStatus::RollbackInProgress.is_terminal());
    }

    #[test]
    fn rollback_complete_is_terminal_failure() {
        assert!(StackStatus::RollbackComplete.is_terminal());
        assert!(StackStatus::RollbackComplete.is_failure());
        assert!(StackStatus::UpdateRollbackComplete.is_failure());
    }

    #[test]
    fn update_can_start_from_stable_complete() {
        assert!(StackStatus::CreateComplete.is_stable_complete());
        assert!(StackStatus::UpdateComplete.is_stable_complete());
        assert!(StackStatus::UpdateRollbackComplete.is_stable_complete());
        assert!(!StackStatus::CreateInProgress.is_stable_complete());
        assert!(!StackStatus::DeleteComplete.is_stable_complete());
    }
}
