//! Core primitives for Larder.
//!
//! This crate provides the foundational pieces the search-and-select engine
//! is built from:
//!
//! - **Signals**: Type-safe observer lists used for engine outputs
//! - **Timers**: One-shot timers polled with a caller-supplied clock, plus the
//!   restartable [`SingleShot`] used for debounce and grace periods
//! - **Logging**: `tracing` target constants and [`PerfSpan`]
//! - **Errors**: [`Error`] and its per-subsystem variants
//!
//! # Debounce Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use larder_core::SingleShot;
//!
//! let t0 = Instant::now();
//! let mut debounce = SingleShot::new(Duration::from_millis(300));
//!
//! // Every keystroke restarts the quiet period.
//! debounce.restart(t0);
//! debounce.restart(t0 + Duration::from_millis(120));
//!
//! assert!(!debounce.poll(t0 + Duration::from_millis(300)));
//! assert!(debounce.poll(t0 + Duration::from_millis(420)));
//! ```

mod error;
pub mod logging;
pub mod signal;
pub mod timer;

pub use error::{Error, Result, SignalError, TimerError};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, QueuedEmission, Signal};
pub use timer::{SingleShot, TimerId, TimerManager};
