//! The user's own streaming subscriptions.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use crate::persist::{read_json_lenient, write_json_atomic};

/// Reads and writes the services file, a JSON array of service identifiers.
///
/// The file is read on every call; the last write wins.
#[derive(Debug, Clone)]
pub struct UserServices {
    path: PathBuf,
}

impl UserServices {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configured services in file order. Missing or malformed files are empty.
    pub fn list(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        read_json_lenient::<Vec<String>>(&self.path)
            .unwrap_or_default()
            .into_iter()
            .filter(|s| seen.insert(s.clone()))
            .collect()
    }

    pub fn set(&self) -> HashSet<String> {
        self.list().into_iter().collect()
    }

    /// Replace the configured services.
    pub fn save(&self, services: &[String]) -> io::Result<()> {
        write_json_atomic(&self.path, services)
    }
}
