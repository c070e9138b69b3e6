//! Engine-wide settings

use std::time::Duration;

/// Date display format for date cells.
///
/// Dates are stored as ISO `YYYY-MM-DD`; this only affects what users see
/// and what free-text entry accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateDisplay {
    /// `DD<sep>MM<sep>YYYY`, e.g. `31.12.2024`.
    DayMonthYear { separator: char },
    /// Show the ISO form unchanged.
    Iso,
}

impl Default for DateDisplay {
    fn default() -> Self {
        Self::DayMonthYear { separator: '.' }
    }
}

/// What happens when page responses arrive out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchOrdering {
    /// Only the response to the most recent request is applied.
    #[default]
    LastRequestWins,
    /// Whichever response arrives last is applied.
    LastResponseWins,
}

/// Engine settings.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use gridkit_lib::config::{EngineConfig, FetchOrdering};
///
/// let config = EngineConfig::default()
///     .with_default_page_size(25)
///     .with_search_debounce(Duration::from_millis(500))
///     .with_fetch_ordering(FetchOrdering::LastRequestWins);
///
/// assert_eq!(config.default_page_size, 25);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub default_page_size: usize,
    pub search_debounce: Duration,
    /// Upper bound for one page load. The HTTP client has its own timeout.
    pub request_timeout: Option<Duration>,
    pub date_display: DateDisplay,
    pub fetch_ordering: FetchOrdering,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            search_debounce: Duration::from_millis(300),
            request_timeout: None,
            date_display: DateDisplay::default(),
            fetch_ordering: FetchOrdering::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size;
        self
    }

    pub fn with_search_debounce(mut self, window: Duration) -> Self {
        self.search_debounce = window;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_date_display(mut self, display: DateDisplay) -> Self {
        self.date_display = display;
        self
    }

    pub fn with_fetch_ordering(mut self, ordering: FetchOrdering) -> Self {
        self.fetch_ordering = ordering;
        self
    }
}
