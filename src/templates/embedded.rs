//! Compile-time embedded project templates. Paths are relative to this file
//! (`src/templates/embedded.rs`); a wrong path fails the build.

pub const INDEX_HTML: &str = include_str!("../../templates/index.html.tmpl");
pub const MAIN_TSX: &str = include_str!("../../templates/src/main.tsx.tmpl");
pub const INDEX_CSS: &str = include_str!("../../templates/src/index.css.tmpl");
pub const APP_TSX: &str = include_str!("../../templates/src/App.tsx.tmpl");
pub const TAILWIND_CONFIG: &str = include_str!("../../templates/tailwind.config.js.tmpl");
pub const POSTCSS_CONFIG: &str = include_str!("../../templates/postcss.config.js.tmpl");

/// Output path of each template inside the generated project.
pub const PROJECT_TEMPLATES: &[(&str, &str)] = &[
    ("index.html", INDEX_HTML),
    ("postcss.config.js", POSTCSS_CONFIG),
    ("src/App.tsx", APP_TSX),
    ("src/index.css", INDEX_CSS),
    ("src/main.tsx", MAIN_TSX),
    ("tailwind.config.js", TAILWIND_CONFIG),
];
