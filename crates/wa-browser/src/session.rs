//! Browser session management
//!
//! One managed Chrome instance per command run. The session owns the
//! single tab the agent acts on and the adapter later extracts from.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptionsBuilder, Tab, protocol::cdp::Page};
use tracing::{debug, info, warn};

use crate::console;
use crate::error::{BrowserError, Result};

/// Pinned user agent, matching the desktop Chrome profile the original
/// automation stack presented.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/85.0.4183.102 Safari/537.36";

/// Browser session configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Whether to run in headless mode
    pub headless: bool,
    /// Explicit browser executable; `None` uses the default lookup
    pub executable: Option<PathBuf>,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Accept-Language presented to pages
    pub locale: String,
    /// Element wait timeout in seconds
    pub element_timeout: u64,
    /// Settle time after a navigation, approximating a network-idle wait
    pub settle_secs: u64,
    /// How long the browser may sit idle between CDP calls before the
    /// driver gives up on it; model calls happen in between, so this
    /// must comfortably exceed one model round trip
    pub idle_timeout: u64,
    /// Install the console-capture shim on the tab and after each
    /// navigation
    pub capture_console: bool,
    /// Cookie jar written best-effort at session close
    pub cookies_file: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            width: 1280,
            height: 1100,
            locale: "en-US".to_string(),
            element_timeout: 10,
            settle_secs: 3,
            idle_timeout: 300,
            capture_console: false,
            cookies_file: None,
        }
    }
}

impl BrowserConfig {
    /// Create a new configuration builder
    pub fn builder() -> BrowserConfigBuilder {
        BrowserConfigBuilder::default()
    }
}

/// Builder for BrowserConfig
#[derive(Default)]
pub struct BrowserConfigBuilder {
    config: BrowserConfig,
}

impl BrowserConfigBuilder {
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn executable(mut self, path: Option<PathBuf>) -> Self {
        self.config.executable = path;
        self
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn element_timeout(mut self, seconds: u64) -> Self {
        self.config.element_timeout = seconds;
        self
    }

    pub fn settle_secs(mut self, seconds: u64) -> Self {
        self.config.settle_secs = seconds;
        self
    }

    pub fn capture_console(mut self, capture: bool) -> Self {
        self.config.capture_console = capture;
        self
    }

    pub fn cookies_file(mut self, path: Option<PathBuf>) -> Self {
        self.config.cookies_file = path;
        self
    }

    pub fn build(self) -> BrowserConfig {
        self.config
    }
}

/// Managed browser session
pub struct BrowserSession {
    browser: Browser,
    config: BrowserConfig,
}

impl BrowserSession {
    /// Launch a browser and prepare its initial tab.
    pub fn with_config(config: BrowserConfig) -> Result<Self> {
        use std::ffi::OsStr;

        info!(
            "Creating browser session (headless: {}, executable: {:?})",
            config.headless, config.executable
        );

        let args: Vec<String> = vec![
            format!("--window-size={},{}", config.width, config.height),
            format!("--lang={}", config.locale),
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
        ];
        let os_args: Vec<&OsStr> = args.iter().map(OsStr::new).collect();

        let launch_options = LaunchOptionsBuilder::default()
            .headless(config.headless)
            .path(config.executable.clone())
            .idle_browser_timeout(Duration::from_secs(config.idle_timeout))
            .args(os_args)
            .build()
            .map_err(|e| {
                BrowserError::Initialization(format!("Failed to build launch options: {}", e))
            })?;

        let browser = Browser::new(launch_options).map_err(|e| {
            BrowserError::Initialization(format!("Failed to launch browser: {}", e))
        })?;

        let session = Self { browser, config };

        let tab = session.active_tab()?;
        tab.set_user_agent(USER_AGENT, Some(session.config.locale.as_str()), None)
            .map_err(|e| BrowserError::Initialization(format!("Failed to set user agent: {}", e)))?;
        if session.config.capture_console {
            session.install_console_capture()?;
        }

        info!("Browser session created successfully");

        Ok(session)
    }

    /// Get the tab the session acts on
    pub fn active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.browser.get_tabs();
        let tabs_guard = tabs
            .lock()
            .map_err(|e| BrowserError::TabError(format!("Failed to lock tabs: {}", e)))?;

        tabs_guard
            .first()
            .cloned()
            .ok_or_else(|| BrowserError::TabError("No active tab available".to_string()))
    }

    /// Navigate to a URL and wait for the page to settle
    pub fn navigate(&self, url: &str) -> Result<String> {
        let tab = self.active_tab()?;

        info!("Navigating to: {}", url);

        tab.navigate_to(url).map_err(|e| {
            BrowserError::Navigation(format!("Failed to navigate to {}: {}", url, e))
        })?;
        tab.wait_until_navigated()
            .map_err(|e| BrowserError::Navigation(format!("Navigation timeout: {}", e)))?;

        // Approximate the network-idle wait of the original stack.
        std::thread::sleep(Duration::from_secs(self.config.settle_secs));

        // A fresh document lost the shim.
        if self.config.capture_console {
            self.install_console_capture()?;
        }

        let title = tab.get_title().unwrap_or_else(|_| "Unknown".to_string());
        debug!("Navigated to: {} (title: {})", url, title);

        Ok(title)
    }

    /// Take a PNG screenshot of the viewport or the full page
    pub fn screenshot(&self, full_page: bool) -> Result<Vec<u8>> {
        let tab = self.active_tab()?;

        debug!("Taking screenshot (full_page: {})", full_page);

        let clip = if full_page {
            let (width, height) = self.page_dimensions()?;
            Some(Page::Viewport {
                x: 0.0,
                y: 0.0,
                width,
                height,
                scale: 1.0,
            })
        } else {
            None
        };

        let screenshot = tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, clip, true)
            .map_err(|e| BrowserError::Screenshot(format!("Failed to capture screenshot: {}", e)))?;

        info!("Screenshot captured: {} bytes", screenshot.len());

        Ok(screenshot)
    }

    /// Scrollable document extent, for full-page capture clipping.
    fn page_dimensions(&self) -> Result<(f64, f64)> {
        let value = self.evaluate(
            "JSON.stringify({w: Math.max(document.documentElement.scrollWidth, \
             document.body ? document.body.scrollWidth : 0), \
             h: Math.max(document.documentElement.scrollHeight, \
             document.body ? document.body.scrollHeight : 0)})",
        )?;
        let raw = value
            .as_str()
            .ok_or_else(|| BrowserError::Screenshot("Failed to measure page".to_string()))?;
        let dims: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| BrowserError::Screenshot(format!("Failed to measure page: {}", e)))?;

        let width = dims["w"].as_f64().unwrap_or(self.config.width as f64);
        let height = dims["h"].as_f64().unwrap_or(self.config.height as f64);
        Ok((width.max(1.0), height.max(1.0)))
    }

    /// Get page HTML source
    pub fn page_source(&self) -> Result<String> {
        let tab = self.active_tab()?;
        tab.get_content()
            .map_err(|e| BrowserError::Extraction(format!("Failed to get page source: {}", e)))
    }

    /// Execute JavaScript in the page, returning its value
    pub fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let tab = self.active_tab()?;

        debug!(
            "Executing JavaScript: {}...",
            script.chars().take(50).collect::<String>()
        );

        let result = tab
            .evaluate(script, false)
            .map_err(|e| BrowserError::Interaction(format!("JavaScript execution failed: {}", e)))?;

        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    /// Click an element
    pub fn click(&self, selector: &str) -> Result<()> {
        let tab = self.active_tab()?;

        info!("Clicking element: {}", selector);

        tab.wait_for_element_with_custom_timeout(
            selector,
            Duration::from_secs(self.config.element_timeout),
        )
        .map_err(|e| {
            BrowserError::ElementNotFound(format!("Element '{}' not found: {}", selector, e))
        })?
        .click()
        .map_err(|e| BrowserError::Interaction(format!("Failed to click '{}': {}", selector, e)))?;

        Ok(())
    }

    /// Type text into an element
    pub fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        let tab = self.active_tab()?;

        info!("Typing into element: {} ({} chars)", selector, text.len());

        tab.wait_for_element_with_custom_timeout(
            selector,
            Duration::from_secs(self.config.element_timeout),
        )
        .map_err(|e| {
            BrowserError::ElementNotFound(format!("Element '{}' not found: {}", selector, e))
        })?
        .click()
        .map_err(|e| BrowserError::Interaction(format!("Failed to focus '{}': {}", selector, e)))?;

        tab.type_str(text)
            .map_err(|e| BrowserError::Interaction(format!("Failed to type text: {}", e)))?;

        Ok(())
    }

    /// Extract visible text from an element
    pub fn extract_text(&self, selector: &str) -> Result<String> {
        let tab = self.active_tab()?;

        debug!("Extracting text from: {}", selector);

        let element = tab
            .wait_for_element_with_custom_timeout(
                selector,
                Duration::from_secs(self.config.element_timeout),
            )
            .map_err(|e| {
                BrowserError::ElementNotFound(format!("Element '{}' not found: {}", selector, e))
            })?;

        element
            .get_inner_text()
            .map_err(|e| BrowserError::Extraction(format!("Failed to extract text: {}", e)))
    }

    /// Scroll the page by a pixel delta
    pub fn scroll_by(&self, delta: i64) -> Result<()> {
        self.evaluate(&format!("window.scrollBy(0, {})", delta))?;
        Ok(())
    }

    /// Install the console-capture shim into the current document
    pub fn install_console_capture(&self) -> Result<()> {
        debug!("Installing console capture shim");
        self.evaluate(console::CONSOLE_CAPTURE_JS)?;
        Ok(())
    }

    /// Read back the buffered console entries
    pub fn console_logs(&self) -> Result<Vec<console::LogEntry>> {
        let value = self.evaluate(console::CONSOLE_READ_JS)?;
        let raw = value.as_str().unwrap_or("[]");
        Ok(console::parse_buffer(raw))
    }

    /// Persist the session's cookies to the configured jar
    pub fn save_cookies(&self) -> Result<()> {
        let Some(path) = &self.config.cookies_file else {
            return Ok(());
        };

        let tab = self.active_tab()?;
        let cookies = tab
            .get_cookies()
            .map_err(|e| BrowserError::Cookie(format!("Failed to read cookies: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&cookies)
            .map_err(|e| BrowserError::Cookie(format!("Failed to encode cookies: {}", e)))?;
        std::fs::write(path, json)?;

        debug!("Saved {} cookies to {}", cookies.len(), path.display());
        Ok(())
    }

    /// Release the session: persist cookies best-effort, then drop the
    /// browser process.
    pub fn close(self) {
        if let Err(e) = self.save_cookies() {
            warn!("Failed to persist cookies: {}", e);
        }
        info!("Closing browser session");
        drop(self.browser);
    }

    /// Get the browser configuration
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_config_default() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.width, 1280);
        assert_eq!(config.height, 1100);
        assert_eq!(config.locale, "en-US");
        assert!(!config.capture_console);
        assert!(config.cookies_file.is_none());
    }

    #[test]
    fn test_browser_config_builder() {
        let config = BrowserConfig::builder()
            .headless(false)
            .executable(Some(PathBuf::from("/usr/bin/google-chrome")))
            .window_size(1920, 1080)
            .element_timeout(20)
            .capture_console(true)
            .cookies_file(Some(PathBuf::from("generated/cookies.json")))
            .build();

        assert!(!config.headless);
        assert_eq!(
            config.executable,
            Some(PathBuf::from("/usr/bin/google-chrome"))
        );
        assert_eq!(config.width, 1920);
        assert_eq!(config.element_timeout, 20);
        assert!(config.capture_console);
        assert!(config.cookies_file.is_some());
    }
}
