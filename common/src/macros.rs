//! Logging wrappers shared by the workspace members.
//!
//! These route through `tracing` so the CLI's formatter decides how a
//! message is decorated; library crates never print directly.

/// Reports a completed step, rendered with a success symbol by the CLI.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: "edgerank::success", $($arg)*)
    };
}

/// Reports a recoverable failure worth showing the operator.
#[macro_export]
macro_rules! failure {
    ($($arg:tt)*) => {
        $crate::tracing::error!(target: "edgerank::failure", $($arg)*)
    };
}
