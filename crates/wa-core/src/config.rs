//! Environment snapshot and run settings
//!
//! The process environment is read exactly once, at startup, into an
//! [`Env`] value that everything downstream borrows. Tests build
//! snapshots from literal pairs instead of mutating the real
//! environment.

use std::collections::HashMap;
use std::path::PathBuf;

/// One-shot snapshot of the process environment.
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    /// Snapshot the current process environment.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from literal pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a variable, treating empty values as unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Interpret a variable as a boolean flag ("true", case-insensitive).
    pub fn flag(&self, name: &str) -> bool {
        self.get(name)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Chrome executable used when running under a virtual display.
const XVFB_CHROME_PATH: &str = "/usr/bin/google-chrome";

/// Run settings derived from the environment snapshot.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Attach viewport screenshots to each agent observation round.
    pub use_vision: bool,
    /// Running under xvfb: disable headless mode and pin the Chrome binary.
    pub under_xvfb: bool,
    /// Explicit Chrome executable, only set in xvfb mode.
    pub chrome_path: Option<PathBuf>,
    /// Directory screenshots are persisted to.
    pub screenshot_dir: PathBuf,
    /// Cookie jar written best-effort at session close.
    pub cookies_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_vision: false,
            under_xvfb: false,
            chrome_path: None,
            screenshot_dir: PathBuf::from("screenshots"),
            cookies_file: PathBuf::from("generated/cookies.json"),
        }
    }
}

impl Settings {
    /// Derive settings from an environment snapshot.
    pub fn from_env(env: &Env) -> Self {
        let under_xvfb = env.flag("RUNNING_UNDER_XVFB");
        Self {
            use_vision: env.flag("USE_VISION"),
            under_xvfb,
            chrome_path: under_xvfb.then(|| PathBuf::from(XVFB_CHROME_PATH)),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_get_ignores_empty() {
        let env = Env::from_pairs([("A", "1"), ("B", "")]);
        assert_eq!(env.get("A"), Some("1"));
        assert_eq!(env.get("B"), None);
        assert_eq!(env.get("C"), None);
    }

    #[test]
    fn test_env_flag() {
        let env = Env::from_pairs([("X", "true"), ("Y", "TRUE"), ("Z", "1")]);
        assert!(env.flag("X"));
        assert!(env.flag("Y"));
        assert!(!env.flag("Z"));
        assert!(!env.flag("MISSING"));
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert!(!settings.use_vision);
        assert!(!settings.under_xvfb);
        assert!(settings.chrome_path.is_none());
        assert_eq!(settings.screenshot_dir, PathBuf::from("screenshots"));
    }

    #[test]
    fn test_settings_vision_flag() {
        let env = Env::from_pairs([("USE_VISION", "true")]);
        let settings = Settings::from_env(&env);
        assert!(settings.use_vision);
        assert!(!settings.under_xvfb);
    }

    #[test]
    fn test_settings_xvfb_pins_chrome() {
        let env = Env::from_pairs([("RUNNING_UNDER_XVFB", "true")]);
        let settings = Settings::from_env(&env);
        assert!(settings.under_xvfb);
        assert_eq!(
            settings.chrome_path,
            Some(PathBuf::from("/usr/bin/google-chrome"))
        );
    }
}
