use crate::core::Storage;
use crate::utils::error::{ExportError, Result};
use std::path::{Component, Path, PathBuf};

/// Storage rooted at one directory. Every path must stay inside it.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Joins `path` onto the base, rejecting anything but plain components.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let confined = !path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !confined {
            return Err(ExportError::PathEscapeError {
                path: relative.to_path_buf(),
            });
        }
        Ok(self.base_path.join(relative))
    }
}

impl Storage for LocalStorage {
    async fn create_dir(&self, path: &str) -> Result<()> {
        let full_path = self.resolve(path)?;
        tokio::fs::create_dir_all(full_path).await?;
        Ok(())
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path)?;

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}
