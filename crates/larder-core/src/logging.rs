//! Logging facilities for Larder.
//!
//! Larder uses the `tracing` crate for instrumentation and never installs a
//! subscriber itself. To see logs, install one in the host application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("larder::guard=debug,larder::selection=trace")
//!     .init();
//! ```
//!
//! Every event is emitted under one of the [`targets`] so a single subsystem
//! can be enabled without the others.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core primitives target.
    pub const CORE: &str = "larder_core";
    /// Timer queue target.
    pub const TIMER: &str = "larder_core::timer";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "larder_core::signal";
    /// Debounced search scheduling.
    pub const SEARCH: &str = "larder::search";
    /// Epoch guard: issue, apply, stale drops, failures.
    pub const GUARD: &str = "larder::guard";
    /// Selection state machine transitions.
    pub const SELECTION: &str = "larder::selection";
    /// Pagination recomputes.
    pub const PAGINATION: &str = "larder::pagination";
    /// Configuration loading.
    pub const CONFIG: &str = "larder::config";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of synchronous recomputes.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "larder::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}
