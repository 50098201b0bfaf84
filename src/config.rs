//! Theme configuration consumed from the host application.
//!
//! Configuration is a JSON document (usually a section of the application's
//! own config file) that deserializes into [`ThemeConfig`]:
//!
//! ```json
//! {
//!   "theme_paths": ["/srv/site/themes", "/usr/share/site/themes"],
//!   "url_prefix": "/_themes",
//!   "duplicate_policy": "first_wins"
//! }
//! ```
//!
//! `theme_paths` may also be a single `;`-separated string.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, ThemeError};
use crate::manager::DuplicatePolicy;

/// URL segment under which theme static assets are mounted when nothing else is configured.
pub const DEFAULT_URL_PREFIX: &str = "/_themes";

/// Environment variable that replaces `theme_paths` (`;`-separated).
pub const THEME_PATHS_ENV: &str = "LIVERY_THEME_PATHS";
/// Environment variable that replaces `url_prefix`.
pub const URL_PREFIX_ENV: &str = "LIVERY_URL_PREFIX";

/// Theme settings read from the application's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Extra directories scanned by the theme-paths loader, in order.
    pub theme_paths: ThemePaths,
    /// Mount point for theme static assets.
    pub url_prefix: Option<String>,
    /// Application identifier themes must declare; defaults to the application's own id.
    pub app_id: Option<String>,
    pub duplicate_policy: DuplicatePolicy,
    /// Log the per-theme asset manifest after each refresh.
    pub log_assets: bool,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            theme_paths: ThemePaths::default(),
            url_prefix: None,
            app_id: None,
            duplicate_policy: DuplicatePolicy::default(),
            log_assets: true,
        }
    }
}

impl ThemeConfig {
    /// Parse a configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ThemeError::Config {
            reason: e.to_string(),
        })
    }

    /// Read and parse a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ThemeError::io(path, e))?;
        Self::from_json_str(&content)
    }

    /// Apply `LIVERY_THEME_PATHS` / `LIVERY_URL_PREFIX` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (the environment, in production).
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(paths) = lookup(THEME_PATHS_ENV) {
            tracing::debug!("{} overrides configured theme paths", THEME_PATHS_ENV);
            self.theme_paths = ThemePaths::parse(&paths);
        }
        if let Some(prefix) = lookup(URL_PREFIX_ENV) {
            self.url_prefix = Some(prefix);
        }
        self
    }

    /// The configured URL prefix, or [`DEFAULT_URL_PREFIX`].
    pub fn url_prefix_or_default(&self) -> &str {
        self.url_prefix.as_deref().unwrap_or(DEFAULT_URL_PREFIX)
    }
}

/// Ordered list of theme search directories.
///
/// Deserializes from either a list of paths or one `;`-separated string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawThemePaths")]
pub struct ThemePaths(Vec<PathBuf>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawThemePaths {
    List(Vec<PathBuf>),
    Joined(String),
}

impl From<RawThemePaths> for ThemePaths {
    fn from(raw: RawThemePaths) -> Self {
        match raw {
            RawThemePaths::List(paths) => Self(paths),
            RawThemePaths::Joined(joined) => Self::parse(&joined),
        }
    }
}

impl ThemePaths {
    /// Split a `;`-separated list, trimming entries and dropping empty ones.
    pub fn parse(joined: &str) -> Self {
        Self(
            joined
                .split(';')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for ThemePaths {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
