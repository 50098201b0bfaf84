//! livery - swappable themes for server-rendered web applications
//!
//! A theme is a folder holding templates, static assets and a metadata file.
//! This crate discovers theme folders, keeps them in a registry, resolves
//! template names with fallback to the application's own templates, and maps
//! static asset URLs to files.
//!
//! # Modules
//!
//! - [`theme`] - Theme data and filesystem discovery (loaders)
//! - [`manager`] - Registry of discovered themes
//! - [`template`] - Theme-aware template lookup and render context
//! - [`static_files`] - Static asset URLs and the reverse route
//! - [`setup`] - Wiring all of the above into an application
//!
//! # Example
//!
//! ```ignore
//! use livery::{setup_themes, Application, SetupOptions};
//!
//! let app = Application::new("blog", "/srv/blog");
//! let themes = setup_themes(&app, SetupOptions::default())?;
//!
//! let theme = themes.get_theme("plain")?;
//! let html = themes.render_theme_template(&theme, "index.html", true, &engine)?;
//! let css = themes.static_file_url(&theme, "style.css"); // "/_themes/plain/style.css"
//! ```

pub mod app;
pub mod assets;
pub mod config;
pub mod error;
pub mod manager;
pub mod path_utils;
pub mod setup;
pub mod static_files;
pub mod template;
pub mod theme;

// Re-export commonly used types
pub use app::Application;
pub use assets::AssetBundle;
pub use config::{ThemeConfig, ThemePaths, DEFAULT_URL_PREFIX};
pub use error::{Result, ThemeError};
pub use manager::{DuplicatePolicy, RefreshReport, ThemeManager, ThemeProvider};
pub use setup::{setup_themes, SetupOptions, Themes};
pub use static_files::{static_file_url, StaticRoute};
pub use template::{
    Template, TemplateEnvironment, TemplateOrigin, TemplateRenderer, TemplateSource,
    ThemeRenderContext,
};
pub use theme::{
    PackagedThemesLoader, Theme, ThemeLoader, ThemeMetadata, ThemePathsLoader,
};
