//! API credential loading and rotation.
//!
//! The generation endpoint rate-limits per key, so a run can carry several
//! keys and rotate to the next one whenever a request fails. Keys live in a
//! newline-delimited file; anything that does not look like a real key
//! (wrong prefix, too short) is dropped at load time.

use anyhow::Result;
use std::{fs, path::Path};

/// Expected key prefix. Google AI Studio keys all start with this.
const KEY_PREFIX: &str = "AIza";

/// Minimum plausible key length.
const MIN_KEY_LEN: usize = 30;

/// An ordered set of API keys with a rotating cursor.
#[derive(Debug, Clone, Default)]
pub struct KeyRing {
    keys: Vec<String>,
    current: usize,
}

impl KeyRing {
    /// Build a key ring from an explicit list, applying the validity filter.
    pub fn new(keys: impl IntoIterator<Item = String>) -> Self {
        let keys = keys.into_iter().filter(|k| is_valid_key(k)).collect();
        Self { keys, current: 0 }
    }

    /// Load keys from a newline-delimited file.
    ///
    /// A missing file yields an empty ring; the caller decides whether that
    /// is fatal for the current command.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let keys = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from);
        Ok(Self::new(keys))
    }

    /// The key requests should currently use.
    pub fn current_key(&self) -> Option<&str> {
        self.keys.get(self.current).map(String::as_str)
    }

    /// Advance to the next key. A single-key ring stays put.
    pub fn rotate(&mut self) {
        if self.keys.len() > 1 {
            self.current = (self.current + 1) % self.keys.len();
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Fixed prefix/length validity check.
fn is_valid_key(key: &str) -> bool {
    key.starts_with(KEY_PREFIX) && key.len() > MIN_KEY_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn key(suffix: char) -> String {
        format!("AIza{}", suffix.to_string().repeat(30))
    }

    #[test]
    fn test_filters_invalid_keys() {
        let ring = KeyRing::new([
            key('a'),
            "AIzaTooShort".to_string(),
            "sk-wrong-prefix-00000000000000000000000000".to_string(),
            key('b'),
        ]);
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn test_rotate_cycles() {
        let mut ring = KeyRing::new([key('a'), key('b'), key('c')]);
        let first = ring.current_key().unwrap().to_owned();
        ring.rotate();
        ring.rotate();
        ring.rotate();
        assert_eq!(ring.current_key().unwrap(), first);
    }

    #[test]
    fn test_single_key_never_rotates() {
        let mut ring = KeyRing::new([key('a')]);
        let first = ring.current_key().unwrap().to_owned();
        ring.rotate();
        assert_eq!(ring.current_key().unwrap(), first);
    }

    #[test]
    fn test_empty_ring() {
        let ring = KeyRing::new([]);
        assert!(ring.is_empty());
        assert_eq!(ring.current_key(), None);
    }

    #[test]
    fn test_from_path_skips_comments_and_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# primary").unwrap();
        writeln!(file, "{}", key('a')).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "{}", key('b')).unwrap();

        let ring = KeyRing::from_path(file.path()).unwrap();
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn test_from_path_missing_file_is_empty() {
        let ring = KeyRing::from_path(Path::new("/nonexistent/apikey.txt")).unwrap();
        assert!(ring.is_empty());
    }
}
