//! Error types shared by every layer of the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by theme lookup, template resolution and asset routing.
///
/// Discovery problems (missing or malformed metadata, unreadable search
/// directories) never reach callers as errors; loaders log and skip them.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// No theme is registered under the identifier.
    #[error("theme '{identifier}' is not registered")]
    ThemeNotFound { identifier: String },

    /// Neither the theme nor (when allowed) the application provides the template.
    #[error("template '{name}' not found")]
    TemplateNotFound { name: String },

    /// Template names are relative `/`-separated paths without `..` segments.
    #[error("invalid template name '{name}'")]
    InvalidTemplateName { name: String },

    /// A static asset request that does not map into a theme's static directory.
    #[error("invalid static asset path '{path}'")]
    InvalidAssetPath { path: String },

    /// Two loaders produced the same identifier under [`DuplicatePolicy::Reject`].
    ///
    /// [`DuplicatePolicy::Reject`]: crate::manager::DuplicatePolicy::Reject
    #[error("theme '{identifier}' found in both {first:?} and {second:?}")]
    DuplicateTheme {
        identifier: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A theme directory whose metadata could not be used.
    #[error("invalid theme metadata in {path:?}: {reason}")]
    Metadata { path: PathBuf, reason: String },

    /// The configuration document could not be parsed.
    #[error("invalid theme configuration: {reason}")]
    Config { reason: String },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The host template renderer failed.
    #[error("failed to render template '{template}': {source}")]
    Render {
        template: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ThemeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn metadata(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether this is a "not found" condition (theme or template).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ThemeNotFound { .. } | Self::TemplateNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ThemeError>;
