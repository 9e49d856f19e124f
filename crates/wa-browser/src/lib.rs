//! wa-browser: browser automation for webagent
//!
//! Wraps headless Chrome behind a managed session and exposes the
//! narrow [`Automation`] capability surface the command runner works
//! against: run a task, then read the artifact directly from the
//! session.

pub mod console;
pub mod engine;
pub mod error;
pub mod session;
pub mod store;
pub mod tools;

pub use console::LogEntry;
pub use engine::{AgentConfig, Automation, ChromeAutomation};
pub use error::{BrowserError, Result};
pub use session::{BrowserConfig, BrowserConfigBuilder, BrowserSession};
pub use store::{SavedScreenshot, ScreenshotStore};
