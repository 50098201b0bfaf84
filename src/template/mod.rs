//! Template resolution bridge between themes and the host template engine.
//!
//! This module is split into:
//! - `source`: name lookup (`TemplateSource`) over application directories and theme folders
//! - `environment`: `TemplateEnvironment` with theme-then-application fallback, and the
//!   per-render `ThemeRenderContext` handed to the engine's `TemplateRenderer`
//!
//! # Example
//!
//! ```ignore
//! // `page.html` from the theme if it has one, otherwise the application's own
//! let template = env.resolve(&theme, "page.html", true)?;
//!
//! // Inside a renderer, `ctx.resolve_with(name, fallback)` backs `{% extends theme("layout.html") %}`
//! let html = env.render_theme_template(&theme, "page.html", true, &engine)?;
//! ```

mod environment;
mod source;

pub use environment::*;
pub use source::*;
