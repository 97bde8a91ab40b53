use crate::core::materialize;
use crate::core::render::ProjectRenderer;
use crate::core::{ConfigProvider, ExportJob, Layout, Pipeline, RenderedProject};
use crate::utils::error::Result;

/// Renders layouts as a Vite + React + Tailwind project and materializes it
/// under the configured temporary directory.
pub struct ReactTailwindPipeline<C: ConfigProvider> {
    renderer: ProjectRenderer,
    config: C,
}

impl<C: ConfigProvider> ReactTailwindPipeline<C> {
    pub fn new(config: C) -> Self {
        Self {
            renderer: ProjectRenderer::from_config(&config),
            config,
        }
    }
}

#[async_trait::async_trait]
impl<C: ConfigProvider> Pipeline for ReactTailwindPipeline<C> {
    async fn render(&self, layout: &Layout) -> Result<RenderedProject> {
        self.renderer.render(layout)
    }

    async fn materialize(&self, project: &RenderedProject) -> Result<ExportJob> {
        materialize::materialize(project, &self.config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LayoutElement;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    struct MockConfig {
        temp_root: PathBuf,
    }

    impl ConfigProvider for MockConfig {
        fn project_name(&self) -> &str {
            "pipeline-test"
        }

        fn page_title(&self) -> &str {
            "Pipeline Test"
        }

        fn temp_root(&self) -> Option<&Path> {
            Some(&self.temp_root)
        }

        fn temp_prefix(&self) -> &str {
            "pipeline-"
        }
    }

    #[tokio::test]
    async fn test_render_then_materialize_matches_project() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = ReactTailwindPipeline::new(MockConfig {
            temp_root: temp_dir.path().to_path_buf(),
        });
        let layout = Layout::new(vec![LayoutElement::text("t", 1.0, 2.0, 3.0, 4.0, Some("Hi"))]);

        let project = pipeline.render(&layout).await.unwrap();
        let job = pipeline.materialize(&project).await.unwrap();

        for (path, content) in project.iter() {
            let on_disk = std::fs::read(job.root().join(path)).unwrap();
            assert_eq!(on_disk, content.to_bytes().unwrap(), "{path}");
        }
        assert!(std::fs::read_to_string(job.root().join("package.json"))
            .unwrap()
            .contains("\"name\": \"pipeline-test\""));
    }
}
