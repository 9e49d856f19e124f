//! Error types for wa-browser

use thiserror::Error;

/// wa-browser error type
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Browser initialization failed: {0}")]
    Initialization(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Interaction failed: {0}")]
    Interaction(String),

    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Tab error: {0}")]
    TabError(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BrowserError> for wa_core::Error {
    fn from(err: BrowserError) -> Self {
        wa_core::Error::Browser(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, BrowserError>;
