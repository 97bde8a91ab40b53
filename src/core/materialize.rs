use crate::adapters::storage::LocalStorage;
use crate::core::{ConfigProvider, ExportJob, RenderedProject, Storage};
use crate::utils::error::Result;
use std::path::Path;

/// Fresh, uniquely named directory for one export.
pub fn create_job_root(temp_root: Option<&Path>, prefix: &str) -> Result<ExportJob> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(prefix);

    let dir = match temp_root {
        Some(base) => builder.tempdir_in(base)?,
        None => builder.tempdir()?,
    };

    tracing::debug!("Created export root {}", dir.path().display());
    Ok(ExportJob::new(dir))
}

/// Writes every file of `project` through `storage`, directories first.
pub async fn write_project<S: Storage>(project: &RenderedProject, storage: &S) -> Result<()> {
    for dir in project.directories() {
        storage.create_dir(&dir).await?;
    }

    for (path, content) in project.iter() {
        let data = content.to_bytes()?;
        tracing::debug!("Writing {} ({} bytes)", path, data.len());
        storage.write_file(path, &data).await?;
    }

    Ok(())
}

/// Materializes `project` under a new temporary root. On failure the partial
/// root is removed before the error is returned.
pub async fn materialize<C: ConfigProvider>(project: &RenderedProject, config: &C) -> Result<ExportJob> {
    let job = create_job_root(config.temp_root(), config.temp_prefix())?;
    let storage = LocalStorage::new(job.root());

    if let Err(e) = write_project(project, &storage).await {
        job.cleanup();
        return Err(e);
    }

    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ExportError;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        dirs: Arc<Mutex<Vec<String>>>,
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        fail_after: Option<usize>,
    }

    impl Storage for MockStorage {
        async fn create_dir(&self, path: &str) -> Result<()> {
            self.dirs.lock().await.push(path.to_string());
            Ok(())
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            if self.fail_after.is_some_and(|limit| files.len() >= limit) {
                return Err(ExportError::IoError(std::io::Error::other(
                    "no space left on device",
                )));
            }
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        temp_root: PathBuf,
    }

    impl ConfigProvider for MockConfig {
        fn project_name(&self) -> &str {
            "test-project"
        }

        fn page_title(&self) -> &str {
            "Test"
        }

        fn temp_root(&self) -> Option<&Path> {
            Some(&self.temp_root)
        }

        fn temp_prefix(&self) -> &str {
            "export-test-"
        }
    }

    fn sample_project() -> RenderedProject {
        let mut project = RenderedProject::new();
        project.insert_text("index.html", "<html></html>");
        project.insert_text("src/App.tsx", "export const App = () => null;");
        project.insert_json("package.json", serde_json::json!({"name": "demo"}));
        project
    }

    #[tokio::test]
    async fn test_write_project_through_storage() {
        let storage = MockStorage::default();
        write_project(&sample_project(), &storage).await.unwrap();

        assert_eq!(*storage.dirs.lock().await, vec!["src".to_string()]);
        let files = storage.files.lock().await;
        assert_eq!(files.len(), 3);
        assert_eq!(files["package.json"], b"{\n  \"name\": \"demo\"\n}\n".to_vec());
    }

    #[tokio::test]
    async fn test_write_failure_is_propagated() {
        let storage = MockStorage {
            fail_after: Some(1),
            ..Default::default()
        };
        let err = write_project(&sample_project(), &storage).await.unwrap_err();
        assert!(matches!(err, ExportError::IoError(_)));
        assert_eq!(storage.files.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_materialize_writes_under_unique_root() {
        let temp_dir = TempDir::new().unwrap();
        let config = MockConfig {
            temp_root: temp_dir.path().to_path_buf(),
        };

        let first = materialize(&sample_project(), &config).await.unwrap();
        let second = materialize(&sample_project(), &config).await.unwrap();

        assert_ne!(first.root(), second.root());
        assert!(first.root().starts_with(temp_dir.path()));
        assert!(first
            .root()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("export-test-"));
        assert_eq!(
            std::fs::read_to_string(first.root().join("src/App.tsx")).unwrap(),
            "export const App = () => null;"
        );
    }

    #[tokio::test]
    async fn test_failed_materialize_leaves_nothing_behind() {
        let temp_dir = TempDir::new().unwrap();
        let config = MockConfig {
            temp_root: temp_dir.path().to_path_buf(),
        };

        // A file and a directory cannot both be named "src".
        let mut project = sample_project();
        project.insert_text("src", "not a directory");

        let err = materialize(&project, &config).await.unwrap_err();
        assert!(matches!(err, ExportError::IoError(_)));
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_temp_root_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = MockConfig {
            temp_root: temp_dir.path().join("does-not-exist"),
        };
        let err = materialize(&sample_project(), &config).await.unwrap_err();
        assert!(matches!(err, ExportError::IoError(_)));
    }
}
