use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tempfile::TempDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Box,
    Text,
    /// Any `type` value the renderer does not know; skipped on render.
    #[serde(other)]
    Unsupported,
}

/// One positioned item on the builder canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl LayoutElement {
    pub fn boxed(id: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            kind: ElementKind::Box,
            x,
            y,
            width,
            height,
            text: None,
        }
    }

    pub fn text(
        id: impl Into<String>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        label: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ElementKind::Text,
            x,
            y,
            width,
            height,
            text: label.map(str::to_string),
        }
    }
}

/// Ordered layout; order is stacking order in the generated markup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    elements: Vec<LayoutElement>,
}

impl Layout {
    pub fn new(elements: Vec<LayoutElement>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[LayoutElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Parses either an export request object or a bare array of elements.
    pub fn from_json_document(bytes: &[u8]) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        if value.is_array() {
            serde_json::from_value(value)
        } else {
            Ok(serde_json::from_value::<ExportRequest>(value)?.into_layout())
        }
    }

    /// Ids that occur more than once, in first-repeat order.
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for element in &self.elements {
            if !seen.insert(element.id.as_str()) && !duplicates.contains(&element.id.as_str()) {
                duplicates.push(element.id.as_str());
            }
        }
        duplicates
    }
}

/// Body of `POST /export/zip`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default)]
    pub components: Option<Vec<LayoutElement>>,
}

impl ExportRequest {
    pub fn into_layout(self) -> Layout {
        Layout::new(self.components.unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileContent {
    Text(String),
    Json(serde_json::Value),
}

impl FileContent {
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            FileContent::Text(text) => Ok(text.as_bytes().to_vec()),
            FileContent::Json(value) => {
                let mut bytes = serde_json::to_vec_pretty(value)?;
                bytes.push(b'\n');
                Ok(bytes)
            }
        }
    }
}

/// Every output file of one export, keyed by `/`-separated relative path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedProject {
    files: BTreeMap<String, FileContent>,
}

impl RenderedProject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_text(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), FileContent::Text(content.into()));
    }

    pub fn insert_json(&mut self, path: impl Into<String>, value: serde_json::Value) {
        self.files.insert(path.into(), FileContent::Json(value));
    }

    pub fn get(&self, path: &str) -> Option<&FileContent> {
        self.files.get(path)
    }

    pub fn text(&self, path: &str) -> Option<&str> {
        match self.files.get(path) {
            Some(FileContent::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileContent)> {
        self.files.iter().map(|(path, content)| (path.as_str(), content))
    }

    /// Parent directories of every file, shallowest first.
    pub fn directories(&self) -> Vec<String> {
        let mut dirs = Vec::new();
        for path in self.files.keys() {
            let mut current = path.as_str();
            while let Some((parent, _)) = current.rsplit_once('/') {
                if !dirs.iter().any(|d: &String| d == parent) {
                    dirs.push(parent.to_string());
                }
                current = parent;
            }
        }
        dirs.sort_by_key(|d| (d.matches('/').count(), d.clone()));
        dirs
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Temporary root holding one materialized project. Dropping the job removes
/// the directory; `cleanup` does the same but reports removal failures.
#[derive(Debug)]
pub struct ExportJob {
    dir: TempDir,
}

impl ExportJob {
    pub fn new(dir: TempDir) -> Self {
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Best-effort removal. Never fails: a leftover directory is logged and
    /// must not override whatever outcome the export already has.
    pub fn cleanup(self) {
        let root = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => tracing::debug!("Removed export root {}", root.display()),
            Err(e) => tracing::warn!("Failed to remove export root {}: {}", root.display(), e),
        }
    }
}
