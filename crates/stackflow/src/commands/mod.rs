pub mod down;
pub mod status;
pub mod up;
pub mod validate;

use stackflow_engine::{HaltedNode, WalkOutcome};

/// Shared exit-code decision for a finished walk: configuration errors
/// that preceded every backend call report 2, everything else 1.
pub(crate) fn walk_exit_code(outcome: &WalkOutcome, halted: &HaltedNode) -> u8 {
    if halted.error.is_configuration() && outcome.completed.is_empty() {
        2
    } else {
        1
    }
}
