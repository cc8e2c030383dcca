use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Fatal faults of a scrape run.
///
/// Per-field extraction failures are not represented here; they are
/// swallowed locally by substituting the field's fallback literal.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("page not ready after {timeout:?}: no element matched '{selector}'")]
    PageReadyTimeout { selector: String, timeout: Duration },

    #[error("failed to write spreadsheet: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),
}
