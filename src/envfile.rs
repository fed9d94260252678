// Environment file writer. Produces the two variables the frontend reads and
// never replaces an existing file without the operator saying so.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_ENV_FILE: &str = ".env.local";

pub const URL_VAR: &str = "VITE_SUPABASE_URL";
pub const KEY_VAR: &str = "VITE_SUPABASE_ANON_KEY";

/// What happened when saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    /// The file already existed and the operator declined to overwrite it.
    Kept,
}

/// Renders the file body: one `NAME=value` line per variable.
pub fn render(url: &str, anon_key: &str) -> String {
    format!("{}={}\n{}={}\n", URL_VAR, url, KEY_VAR, anon_key)
}

#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
}

impl EnvFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        EnvFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Writes the credentials. When the file exists, `confirm_overwrite` is
    /// asked first and a `false` answer leaves it untouched.
    pub fn save<F>(&self, url: &str, anon_key: &str, confirm_overwrite: F) -> Result<SaveOutcome>
    where
        F: FnOnce(&Path) -> Result<bool>,
    {
        if self.exists() && !confirm_overwrite(&self.path)? {
            return Ok(SaveOutcome::Kept);
        }
        std::fs::write(&self.path, render(url, anon_key))
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        info!(path = %self.path.display(), "environment file written");
        Ok(SaveOutcome::Written)
    }
}
