//! Engine configuration.
//!
//! Every field has a default, so an empty document (or no file at all) gives
//! the dashboard's standard behaviour:
//!
//! ```toml
//! [combobox]
//! kind = "items"
//! quiet_period_ms = 300
//! close_grace_ms = 200
//! fetch_page = 1
//! fetch_page_size = 100
//!
//! [pagination]
//! items_per_page = 10
//! sibling_count = 2
//! page_size_options = [5, 10, 25, 50, 100]
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::candidate::CandidateKind;
use crate::error::{ConfigError, ConfigResult};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, DEFAULT_SIBLING_COUNT, PAGE_SIZE_OPTIONS};

// ============================================================================
// Engine
// ============================================================================

/// Configuration for every engine component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub combobox: ComboboxConfig,
    pub pagination: PaginationConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        tracing::debug!(target: "larder::config", ?config, "configuration loaded");
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Render as a TOML document.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        self.combobox.validate()?;
        self.pagination.validate()
    }
}

// ============================================================================
// Combobox
// ============================================================================

/// Configuration for one combobox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComboboxConfig {
    /// What the combobox looks up; drives user-facing wording.
    pub kind: CandidateKind,
    /// Debounce quiet period in milliseconds.
    pub quiet_period_ms: u64,
    /// Delay between blur and close in milliseconds.
    pub close_grace_ms: u64,
    /// Page requested from the fetcher.
    pub fetch_page: u32,
    /// Page size requested from the fetcher.
    pub fetch_page_size: u32,
}

impl Default for ComboboxConfig {
    fn default() -> Self {
        Self {
            kind: CandidateKind::Items,
            quiet_period_ms: 300,
            close_grace_ms: 200,
            fetch_page: 1,
            fetch_page_size: 100,
        }
    }
}

impl ComboboxConfig {
    /// Default configuration for `kind`.
    pub fn for_kind(kind: CandidateKind) -> Self {
        Self::default().with_kind(kind)
    }

    /// Set the candidate kind using builder pattern.
    pub fn with_kind(mut self, kind: CandidateKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the debounce quiet period using builder pattern.
    pub fn with_quiet_period(mut self, period: Duration) -> Self {
        self.quiet_period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the close grace period using builder pattern.
    pub fn with_close_grace(mut self, grace: Duration) -> Self {
        self.close_grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the requested page and page size using builder pattern.
    pub fn with_fetch_page(mut self, page: u32, page_size: u32) -> Self {
        self.fetch_page = page;
        self.fetch_page_size = page_size;
        self
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    pub fn close_grace(&self) -> Duration {
        Duration::from_millis(self.close_grace_ms)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.fetch_page == 0 {
            return Err(ConfigError::invalid("combobox.fetch_page", "pages start at 1"));
        }
        if self.fetch_page_size == 0 {
            return Err(ConfigError::invalid(
                "combobox.fetch_page_size",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Configuration for paginated tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    /// Initial page size.
    pub items_per_page: usize,
    /// Pages shown on each side of the current page.
    pub sibling_count: usize,
    /// Page sizes offered to the user.
    pub page_size_options: Vec<usize>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            sibling_count: DEFAULT_SIBLING_COUNT,
            page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
        }
    }
}

impl PaginationConfig {
    /// Set the initial page size using builder pattern.
    pub fn with_items_per_page(mut self, items_per_page: usize) -> Self {
        self.items_per_page = items_per_page;
        self
    }

    /// Set the sibling window using builder pattern.
    pub fn with_sibling_count(mut self, sibling_count: usize) -> Self {
        self.sibling_count = sibling_count;
        self
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.items_per_page == 0 {
            return Err(ConfigError::invalid(
                "pagination.items_per_page",
                "must be greater than zero",
            ));
        }
        if self.page_size_options.is_empty() {
            return Err(ConfigError::invalid(
                "pagination.page_size_options",
                "at least one page size is required",
            ));
        }
        if self.page_size_options.contains(&0) {
            return Err(ConfigError::invalid(
                "pagination.page_size_options",
                "page sizes must be greater than zero",
            ));
        }
        Ok(())
    }
}
