//! Screenshot persistence
//!
//! Successful screenshot commands land one PNG per run in the target
//! directory, named by capture time in unix seconds.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;

use crate::error::{BrowserError, Result};

/// A persisted screenshot
#[derive(Debug, Clone)]
pub struct SavedScreenshot {
    /// Absolute path of the written file
    pub filepath: PathBuf,
    /// Base64-encoded PNG payload
    pub encoded: String,
}

/// Writes screenshots into one directory, creating it on demand
#[derive(Debug, Clone)]
pub struct ScreenshotStore {
    dir: PathBuf,
}

impl ScreenshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Persist PNG bytes and return the absolute path plus the base64
    /// payload for the result envelope.
    pub fn save(&self, png: &[u8]) -> Result<SavedScreenshot> {
        std::fs::create_dir_all(&self.dir)?;

        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| BrowserError::Screenshot(format!("System clock error: {}", e)))?
            .as_secs();
        let path = self.dir.join(format!("screenshot_{}.png", seconds));

        std::fs::write(&path, png)?;
        let filepath = path.canonicalize()?;

        info!("Saved screenshot to {}", filepath.display());

        Ok(SavedScreenshot {
            filepath,
            encoded: base64::Engine::encode(&base64::engine::general_purpose::STANDARD, png),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_writes_timestamped_png() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::new(tmp.path().join("shots"));

        let saved = store.save(b"not really a png").unwrap();

        assert!(saved.filepath.is_absolute());
        assert!(saved.filepath.exists());

        let name = saved.filepath.file_name().unwrap().to_str().unwrap();
        let digits = name
            .strip_prefix("screenshot_")
            .and_then(|rest| rest.strip_suffix(".png"))
            .unwrap();
        assert!(!digits.is_empty());
        assert!(digits.chars().all(|c| c.is_ascii_digit()));

        assert_eq!(std::fs::read(&saved.filepath).unwrap(), b"not really a png");
    }

    #[test]
    fn test_save_encodes_payload() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ScreenshotStore::new(tmp.path());

        let saved = store.save(b"abc").unwrap();
        let decoded = base64::Engine::decode(
            &base64::engine::general_purpose::STANDARD,
            saved.encoded.as_bytes(),
        )
        .unwrap();
        assert_eq!(decoded, b"abc");
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        let store = ScreenshotStore::new(&nested);

        store.save(b"x").unwrap();
        assert!(nested.exists());
    }
}
