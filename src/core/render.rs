use crate::core::{ConfigProvider, ElementKind, Layout, LayoutElement, RenderedProject};
use crate::templates::{embedded, renderer::TemplateRenderer};
use crate::utils::error::Result;
use serde_json::{json, Value};

pub const PACKAGE_MANIFEST: &str = "package.json";
pub const APP_MODULE: &str = "src/App.tsx";

/// Emitted in place of the canvas children when nothing renders.
pub const EMPTY_CANVAS_PLACEHOLDER: &str = "{/* No components yet */}";

pub const BOX_CLASSES: &str = "absolute bg-blue-500 rounded-md shadow";
pub const TEXT_CLASSES: &str =
    "absolute text-white font-medium flex items-center justify-center text-center";
pub const DEFAULT_TEXT_LABEL: &str = "Text";

// Depth of the canvas children inside App.tsx.
const CHILD_INDENT: &str = "        ";

/// Turns a layout into the complete file set of a Vite + React + Tailwind
/// project. Pure: the same layout always yields byte-identical files.
pub struct ProjectRenderer {
    templates: TemplateRenderer,
    project_name: String,
    page_title: String,
}

impl ProjectRenderer {
    pub fn new(project_name: impl Into<String>, page_title: impl Into<String>) -> Self {
        Self {
            templates: TemplateRenderer::new(),
            project_name: project_name.into(),
            page_title: page_title.into(),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(config.project_name(), config.page_title())
    }

    pub fn render(&self, layout: &Layout) -> Result<RenderedProject> {
        let data = json!({
            "title": self.page_title,
            "children": render_children(layout),
        });

        let mut project = RenderedProject::new();
        project.insert_json(PACKAGE_MANIFEST, package_manifest(&self.project_name));
        for (path, template) in embedded::PROJECT_TEMPLATES {
            project.insert_text(*path, self.templates.render(template, &data)?);
        }

        Ok(project)
    }
}

pub fn package_manifest(name: &str) -> Value {
    json!({
        "name": name,
        "version": "1.0.0",
        "private": true,
        "scripts": {
            "dev": "vite",
            "build": "vite build",
            "preview": "vite preview"
        },
        "dependencies": {
            "react": "^18.0.0",
            "react-dom": "^18.0.0"
        },
        "devDependencies": {
            "vite": "^5.0.0",
            "typescript": "^5.0.0",
            "tailwindcss": "^3.4.0",
            "autoprefixer": "^10.0.0",
            "postcss": "^8.0.0"
        }
    })
}

/// JSX for everything inside the canvas container, already indented.
pub fn render_children(layout: &Layout) -> String {
    let blocks: Vec<String> = layout.elements().iter().filter_map(render_element).collect();

    if blocks.is_empty() {
        return format!("{CHILD_INDENT}{EMPTY_CANVAS_PLACEHOLDER}");
    }

    blocks
        .iter()
        .flat_map(|block| block.lines())
        .map(|line| format!("{CHILD_INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `None` for kinds the renderer does not know.
pub fn render_element(element: &LayoutElement) -> Option<String> {
    let style = format!(
        "style={{{{ left: {}, top: {}, width: {}, height: {} }}}}",
        format_number(element.x),
        format_number(element.y),
        format_number(element.width),
        format_number(element.height),
    );
    let key = escape_attribute(&element.id);

    match element.kind {
        ElementKind::Box => Some(format!(
            "<div key=\"{key}\" className=\"{BOX_CLASSES}\" {style} />"
        )),
        ElementKind::Text => {
            let label = element
                .text
                .as_deref()
                .filter(|text| !text.is_empty())
                .unwrap_or(DEFAULT_TEXT_LABEL);
            Some(format!(
                "<div key=\"{key}\" className=\"{TEXT_CLASSES}\" {style}>\n  {}\n</div>",
                escape_jsx_text(label)
            ))
        }
        ElementKind::Unsupported => None,
    }
}

/// Prints a coordinate the way a JS template literal would: integral values
/// without a fraction, and exponent notation (`1e+21`, `1e-7`) outside
/// `[1e-6, 1e21)`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        // also folds -0
        return "0".to_string();
    }

    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let exponential = format!("{value:e}");
        return match exponential.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => exponential,
        };
    }

    value.to_string()
}

fn escape_jsx_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '{' => escaped.push_str("&#123;"),
            '}' => escaped.push_str("&#125;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FileContent;

    fn renderer() -> ProjectRenderer {
        ProjectRenderer::new("exported-react-tailwind-project", "Exported Layout")
    }

    fn app_module(layout: &Layout) -> String {
        renderer().render(layout).unwrap().text(APP_MODULE).unwrap().to_string()
    }

    #[test]
    fn test_render_is_deterministic() {
        let layout = Layout::new(vec![
            LayoutElement::boxed("box-1", 40.0, 80.0, 180.0, 120.0),
            LayoutElement::text("text-1", 60.0, 110.0, 140.0, 60.0, Some("Hello")),
        ]);

        let first = renderer().render(&layout).unwrap();
        let second = renderer().render(&layout).unwrap();
        assert_eq!(first, second);

        for (path, content) in first.iter() {
            let again = second.get(path).unwrap();
            assert_eq!(content.to_bytes().unwrap(), again.to_bytes().unwrap());
        }
    }

    #[test]
    fn test_boilerplate_is_always_emitted() {
        let project = renderer().render(&Layout::default()).unwrap();
        let paths: Vec<&str> = project.paths().collect();
        assert_eq!(
            paths,
            vec![
                "index.html",
                "package.json",
                "postcss.config.js",
                "src/App.tsx",
                "src/index.css",
                "src/main.tsx",
                "tailwind.config.js",
            ]
        );
        assert!(project.text("src/index.css").unwrap().contains("@tailwind utilities;"));
        assert!(project.text("index.html").unwrap().contains("/src/main.tsx"));
    }

    #[test]
    fn test_empty_layout_renders_placeholder() {
        let app = app_module(&Layout::default());
        assert!(app.contains(EMPTY_CANVAS_PLACEHOLDER));
        assert!(!app.contains("key="));
        assert!(!app.contains("left:"));
    }

    #[test]
    fn test_box_geometry_and_styling() {
        let layout = Layout::new(vec![LayoutElement::boxed("b1", 10.0, 20.0, 30.0, 40.0)]);
        let app = app_module(&layout);
        assert!(app.contains(
            "<div key=\"b1\" className=\"absolute bg-blue-500 rounded-md shadow\" style={{ left: 10, top: 20, width: 30, height: 40 }} />"
        ));
        assert!(!app.contains(EMPTY_CANVAS_PLACEHOLDER));
    }

    #[test]
    fn test_text_label_defaults() {
        let absent = render_element(&LayoutElement::text("t", 0.0, 0.0, 1.0, 1.0, None)).unwrap();
        assert!(absent.contains("\n  Text\n"));

        let empty = render_element(&LayoutElement::text("t", 0.0, 0.0, 1.0, 1.0, Some(""))).unwrap();
        assert!(empty.contains("\n  Text\n"));

        let hi = render_element(&LayoutElement::text("t", 0.0, 0.0, 1.0, 1.0, Some("Hi"))).unwrap();
        assert!(hi.contains("\n  Hi\n"));
        assert!(hi.contains(TEXT_CLASSES));
    }

    #[test]
    fn test_unsupported_elements_are_skipped() {
        let mut image = LayoutElement::boxed("img", 1.0, 1.0, 1.0, 1.0);
        image.kind = ElementKind::Unsupported;

        assert_eq!(render_element(&image), None);
        let app = app_module(&Layout::new(vec![image]));
        assert!(app.contains(EMPTY_CANVAS_PLACEHOLDER));
    }

    #[test]
    fn test_elements_keep_input_order() {
        let layout = Layout::new(vec![
            LayoutElement::text("z-top", 0.0, 0.0, 1.0, 1.0, Some("first")),
            LayoutElement::boxed("a-bottom", 0.0, 0.0, 1.0, 1.0),
        ]);
        let app = app_module(&layout);
        let first = app.find("z-top").unwrap();
        let second = app.find("a-bottom").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_fractional_and_negative_numbers() {
        let layout = Layout::new(vec![LayoutElement::boxed("b", -12.5, 0.25, 100.0, -0.0)]);
        let app = app_module(&layout);
        assert!(app.contains("left: -12.5, top: 0.25, width: 100, height: 0 }}"));
    }

    #[test]
    fn test_extreme_magnitudes_use_exponent_notation() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(f64::NAN), "0");
    }

    #[test]
    fn test_user_text_cannot_break_markup() {
        let element = LayoutElement::text("t\"1", 0.0, 0.0, 1.0, 1.0, Some("a {b} <c> & d"));
        let jsx = render_element(&element).unwrap();
        assert!(jsx.contains("key=\"t&quot;1\""));
        assert!(jsx.contains("a &#123;b&#125; &lt;c&gt; &amp; d"));
    }

    #[test]
    fn test_package_manifest() {
        let project = renderer().render(&Layout::default()).unwrap();
        let Some(FileContent::Json(manifest)) = project.get(PACKAGE_MANIFEST) else {
            panic!("package.json should be structured content");
        };
        assert_eq!(manifest["name"], "exported-react-tailwind-project");
        assert_eq!(manifest["scripts"]["build"], "vite build");
        assert_eq!(manifest["dependencies"]["react"], "^18.0.0");
        assert_eq!(manifest["devDependencies"]["tailwindcss"], "^3.4.0");

        let text = String::from_utf8(project.get(PACKAGE_MANIFEST).unwrap().to_bytes().unwrap()).unwrap();
        assert!(text.starts_with("{\n  \"name\": \"exported-react-tailwind-project\",\n  \"version\": \"1.0.0\""));
    }

    #[test]
    fn test_page_title_comes_from_renderer() {
        let project = ProjectRenderer::new("demo", "My Layout").render(&Layout::default()).unwrap();
        assert!(project.text("index.html").unwrap().contains("<title>My Layout</title>"));
    }
}
