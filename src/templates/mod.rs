//! Templates for the generated React + Tailwind project.
//!
//! The fixed project files live under `templates/` at the crate root and are
//! embedded at compile time in [`embedded`]. They are rendered with the strict
//! Handlebars engine in [`renderer`].
//!
//! ## Template variables
//!
//! - `{{title}}`: page title of `index.html` (HTML-escaped)
//! - `{{{children}}}`: pre-rendered JSX for the canvas of `src/App.tsx` (raw)
//!
//! Adding a template means adding the file under `templates/`, a constant in
//! [`embedded`] and an entry in [`embedded::PROJECT_TEMPLATES`].

pub mod embedded;
pub mod renderer;
