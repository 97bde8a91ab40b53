use crate::domain::model::{ExportJob, Layout, RenderedProject};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Filesystem writes scoped to one project root. Paths are `/`-separated and
/// relative to that root.
pub trait Storage: Send + Sync {
    fn create_dir(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn project_name(&self) -> &str;
    fn page_title(&self) -> &str;
    fn temp_root(&self) -> Option<&Path>;
    fn temp_prefix(&self) -> &str;
}

/// The two steps of an export that run before archiving.
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn render(&self, layout: &Layout) -> Result<RenderedProject>;
    async fn materialize(&self, project: &RenderedProject) -> Result<ExportJob>;
}
