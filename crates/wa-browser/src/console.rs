//! In-page console capture
//!
//! The driver offers no buffered console API, so a shim is evaluated
//! in the page that wraps `window.console` and accumulates entries in
//! `window.__consoleLogs`. The buffer is read back as JSON after the
//! agent run.

use serde::{Deserialize, Serialize};

/// One captured console entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    /// Console level: log, info, warn or error.
    #[serde(rename = "type")]
    pub level: String,
    pub text: String,
}

/// Shim installed into the page. Idempotent: a document already
/// carrying the buffer is left alone.
pub const CONSOLE_CAPTURE_JS: &str = r#"
(() => {
    if (window.__consoleLogs) { return; }
    window.__consoleLogs = [];
    const original = window.console;
    ['log', 'info', 'warn', 'error'].forEach((level) => {
        window.console[level] = (...args) => {
            window.__consoleLogs.push({ type: level, text: args.map(String).join(' ') });
            original[level](...args);
        };
    });
})();
"#;

/// Expression that serializes the buffer for readback.
pub const CONSOLE_READ_JS: &str = "JSON.stringify(window.__consoleLogs || [])";

/// Parse the serialized buffer. Malformed or missing data yields an
/// empty list rather than an error; a page can clobber the buffer.
pub fn parse_buffer(raw: &str) -> Vec<LogEntry> {
    serde_json::from_str(raw).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_buffer_entries() {
        let raw = r#"[{"type":"log","text":"hello"},{"type":"error","text":"boom"}]"#;
        let entries = parse_buffer(raw);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, "log");
        assert_eq!(entries[1].text, "boom");
    }

    #[test]
    fn test_parse_buffer_empty() {
        assert!(parse_buffer("[]").is_empty());
    }

    #[test]
    fn test_parse_buffer_tolerates_junk() {
        assert!(parse_buffer("not json").is_empty());
        assert!(parse_buffer("{\"type\":\"log\"}").is_empty());
    }

    #[test]
    fn test_log_entry_serializes_with_type_key() {
        let entry = LogEntry {
            level: "warn".into(),
            text: "careful".into(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""type":"warn""#));
    }
}
