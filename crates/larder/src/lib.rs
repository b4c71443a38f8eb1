//! Larder: search-and-select and pagination for the operations dashboard.
//!
//! Every lookup on the dashboard (items, recipes, branches, suppliers) is a
//! searchable combobox, and every table is paginated on the client. This
//! crate implements both interactions independently of any UI framework:
//!
//! - [`Combobox`]: debounced search, stale-response suppression and keyboard
//!   and pointer selection, driven by discrete [`SelectionEvent`]s
//! - [`pagination::Paginator`]: a filtered page window over in-memory rows
//!
//! The network and user notifications are reached through the
//! [`CandidateFetcher`] and [`Notifier`] traits.
//!
//! # Modules
//!
//! - [`candidate`] / [`domain`]: search results and the records they come from
//! - [`fetch`] / [`notify`]: collaborator seams
//! - [`search`]: [`SearchScheduler`](search::SearchScheduler) and
//!   [`AsyncResultGuard`](search::AsyncResultGuard)
//! - [`selection`]: the pure selection state machine
//! - [`pagination`]: client-side table pagination
//! - [`config`]: TOML configuration
//! - `driver` (feature `tokio`): runs a combobox on the tokio runtime

pub mod candidate;
pub mod combobox;
pub mod config;
pub mod domain;
mod error;
pub mod fetch;
pub mod notify;
pub mod pagination;
pub mod search;
pub mod selection;

#[cfg(feature = "tokio")]
pub mod driver;

pub use candidate::{Candidate, CandidateKind, CandidateList, IntoCandidate};
pub use combobox::{Combobox, ComboboxView, Deferred, DropdownBody};
pub use config::{ComboboxConfig, EngineConfig, PaginationConfig};
pub use error::{ConfigError, ConfigResult, FetchError};
pub use fetch::{CandidateFetcher, FetchRequest, FetchResponse, ServiceResponse};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use search::{GuardOutcome, SearchTask};
pub use selection::{Key, SelectionEvent};

#[cfg(feature = "tokio")]
pub use driver::ComboboxDriver;
