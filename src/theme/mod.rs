//! Theme module with separated pure types and I/O operations.
//!
//! This module is split into:
//! - `types`: Pure data types (no filesystem access)
//! - `loader`: `ThemeLoader` implementations that discover themes on disk
//!
//! # Example
//!
//! ```ignore
//! use livery::theme::{load_themes_from, LocalThemeFs};
//! use std::path::Path;
//!
//! // Every subdirectory with a valid info.json / info.yaml becomes a theme
//! let themes = load_themes_from(&LocalThemeFs, Path::new("/srv/site/themes"));
//! for theme in &themes {
//!     println!("{} -> {:?}", theme.identifier(), theme.templates_path());
//! }
//! ```

mod loader;
mod types;

pub use loader::*;
pub use types::*;

#[cfg(test)]
pub(crate) use loader::tests::{info_json, MockThemeFs};
