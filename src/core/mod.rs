pub mod archive;
pub mod engine;
pub mod materialize;
pub mod pipeline;
pub mod render;
pub mod stage;

pub use crate::domain::model::{
    ElementKind, ExportJob, ExportRequest, FileContent, Layout, LayoutElement, RenderedProject,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
