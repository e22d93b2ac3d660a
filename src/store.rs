//! Single-slot template storage.
//!
//! The store holds at most one template file. Every upload replaces it, and
//! readers always see either the previous or the new file in full: writes go
//! to a temporary file in the same directory which is then renamed over the
//! template, and a read-write lock orders writers against readers.

use crate::error::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tempfile::NamedTempFile;

/// Name under which the uploaded template is stored.
pub const DEFAULT_TEMPLATE_NAME: &str = "TEMPLATE_SALES.pptx";

/// Accepted upload extension.
pub const TEMPLATE_EXTENSION: &str = "pptx";

/// Check whether a client-supplied file name has the `.pptx` extension.
///
/// The comparison is case-insensitive. A bare `.pptx` is accepted.
pub fn has_template_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(TEMPLATE_EXTENSION))
}

/// The directory and file name holding the current template.
#[derive(Debug)]
pub struct TemplateStore {
    dir: PathBuf,
    path: PathBuf,
    file_name: String,
    lock: RwLock<()>,
}

impl TemplateStore {
    /// Open a store in `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        let file_name = file_name.into();

        if file_name.is_empty()
            || file_name.contains(['/', '\\'])
            || file_name == "."
            || file_name == ".."
        {
            return Err(Error::Storage(format!(
                "invalid template file name: '{}'",
                file_name
            )));
        }

        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::Storage(format!("cannot create {}: {}", dir.display(), e))
        })?;

        let path = dir.join(&file_name);
        tracing::debug!(path = %path.display(), "opened template store");
        Ok(Self {
            dir,
            path,
            file_name,
            lock: RwLock::new(()),
        })
    }

    /// Full path of the stored template.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the stored template.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Check whether a template has been stored.
    pub fn exists(&self) -> bool {
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        self.path.is_file()
    }

    /// Replace the stored template with `data`.
    pub fn write(&self, data: &[u8]) -> Result<()> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);

        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(data)?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| {
            Error::Storage(format!("cannot replace {}: {}", self.path.display(), e.error))
        })?;

        tracing::info!(path = %self.path.display(), bytes = data.len(), "stored template");
        Ok(())
    }

    /// Read the stored template, or `None` if nothing has been uploaded.
    pub fn read(&self) -> Result<Option<Vec<u8>>> {
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        match std::fs::read(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
