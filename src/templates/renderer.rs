//! Handlebars wrapper used for every templated project file.
//!
//! Strict mode is on: a `{{variable}}` missing from the data context is an
//! error instead of an empty string, since the output is source code that
//! would otherwise fail much later inside the user's build.

use handlebars::Handlebars;
use serde_json::Value;

use crate::utils::error::{ExportError, Result};

pub struct TemplateRenderer {
    hbs: Handlebars<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        Self { hbs }
    }

    /// Render a template string with the given data context.
    pub fn render(&self, template: &str, data: &Value) -> Result<String> {
        self.hbs
            .render_template(template, data)
            .map_err(|e| ExportError::RenderError(e.to_string()))
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}
