//! Upload directory for eforice.
//!
//! Uploaded content lives in a single directory under the working
//! directory, each file under a generated `UUID.extension` name.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use crate::{EforiceError, Result};

/// The upload directory.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    /// Resolve `folder` against `base` and create it if it does not exist.
    ///
    /// An existing directory is left as it is. An absolute `folder` is
    /// used unchanged.
    pub fn ensure(base: &Path, folder: &str) -> Result<Self> {
        let root = base.join(folder);

        if root.is_dir() {
            debug!("Upload directory exists at {:?}", root);
        } else {
            fs::create_dir_all(&root)?;
            info!("Created upload directory at {:?}", root);
        }

        Ok(Self { root })
    }

    /// Directory holding the uploads.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store `content` under a new name derived from `original_name`.
    ///
    /// Returns the stored name.
    pub fn save(&self, content: &[u8], original_name: &str) -> Result<String> {
        let stored_name = Self::generate_stored_name(original_name);
        fs::write(self.path_for(&stored_name)?, content)?;
        Ok(stored_name)
    }

    /// Read a stored file.
    pub fn open(&self, stored_name: &str) -> Result<Vec<u8>> {
        match fs::read(self.path_for(stored_name)?) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(EforiceError::NotFound(format!("file {stored_name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a stored file. Returns `false` if it did not exist.
    pub fn remove(&self, stored_name: &str) -> Result<bool> {
        match fs::remove_file(self.path_for(stored_name)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Path of a stored file. Names that could leave the directory are rejected.
    pub fn path_for(&self, stored_name: &str) -> Result<PathBuf> {
        if stored_name.is_empty()
            || stored_name == "."
            || stored_name.contains("..")
            || stored_name.contains(['/', '\\', '\0'])
        {
            return Err(EforiceError::Validation(format!(
                "invalid stored name: {stored_name:?}"
            )));
        }
        Ok(self.root.join(stored_name))
    }

    /// New `UUID.extension` name; the extension defaults to `bin`.
    pub fn generate_stored_name(original_name: &str) -> String {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|s| s.to_str())
            .filter(|s| s.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "bin".to_string());
        format!("{}.{ext}", Uuid::new_v4())
    }
}
