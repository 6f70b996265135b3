//! Types shared by every workspace member: the run [`config`], the probe
//! and benchmark records flowing through the pipeline in [`record`], and
//! the status-line logging [`macros`] built on `tracing`.

pub mod config;
pub mod macros;
pub mod record;

// Re-exported for the wrapper macros in [`macros`].
pub use tracing;
