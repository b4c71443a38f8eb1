//! Debounced, epoch-guarded searching.
//!
//! - [`SearchScheduler`] collapses keystrokes into one query per quiet period
//! - [`AsyncResultGuard`] issues fetches and applies only the latest result
//! - [`SearchSession`] is the state the guard owns per combobox

mod guard;
mod scheduler;
mod session;

pub use guard::{AsyncResultGuard, FetchTicket, GuardOutcome, SearchTask};
pub use scheduler::{DEFAULT_QUIET_PERIOD, SearchScheduler};
pub use session::SearchSession;
