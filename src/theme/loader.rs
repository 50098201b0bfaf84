//! Theme discovery with I/O abstraction.
//!
//! This module provides:
//! - `ThemeFs`: the filesystem operations discovery needs, so tests can use mocks
//! - `ThemeLoader`: anything that turns an [`Application`] into a sequence of themes
//! - `PackagedThemesLoader` / `ThemePathsLoader`: the two standard loaders

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::types::{is_valid_identifier, MetadataFormat, Theme, ThemeMetadata, LICENSE_FILE};
use crate::app::Application;
use crate::error::{Result, ThemeError};

/// Name of the directory, relative to the application root, holding packaged themes.
pub const PACKAGED_THEMES_DIR: &str = "themes";

/// Filesystem operations used by theme discovery.
///
/// This abstraction allows:
/// - Testing with mock implementations
/// - Themes served from embedded or virtual filesystems
pub trait ThemeFs: Send + Sync {
    /// Read file contents as string.
    fn read_file(&self, path: &Path) -> io::Result<String>;

    /// List entries in a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is itself a symbolic link (without following it).
    fn is_symlink(&self, _path: &Path) -> bool {
        false
    }
}

/// Default implementation using local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalThemeFs;

impl ThemeFs for LocalThemeFs {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            entries.push(entry?.path());
        }
        Ok(entries)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.is_symlink()
    }
}

impl Theme {
    /// Load the theme rooted at `dir` from its metadata file.
    ///
    /// Looks for `info.json`, then `info.yaml` / `info.yml`. Does not check
    /// that the identifier matches the directory name; loaders do that.
    pub fn from_dir(fs: &dyn ThemeFs, dir: &Path) -> Result<Self> {
        let (metadata_path, format) = MetadataFormat::CANDIDATES
            .iter()
            .map(|(file, format)| (dir.join(file), *format))
            .find(|(path, _)| fs.exists(path))
            .ok_or_else(|| ThemeError::metadata(dir, "no metadata file"))?;

        let content = fs
            .read_file(&metadata_path)
            .map_err(|e| ThemeError::io(&metadata_path, e))?;
        let metadata = ThemeMetadata::parse(&content, format)
            .map_err(|reason| ThemeError::metadata(&metadata_path, reason))?;

        let license_path = dir.join(LICENSE_FILE);
        let license_text = if fs.exists(&license_path) {
            fs.read_file(&license_path).ok()
        } else {
            None
        };

        Ok(Theme::from_metadata(dir, metadata).with_license_text(license_text))
    }
}

/// Scan the immediate subdirectories of `path` for themes.
///
/// Candidates are visited in name order. A directory becomes a theme only when
/// its name is a valid identifier, its metadata loads, and the metadata's
/// identifier equals the directory name. Everything else is skipped, and a
/// missing or unreadable `path` yields no themes.
pub fn load_themes_from(fs: &dyn ThemeFs, path: &Path) -> Vec<Theme> {
    let mut entries = match fs.read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Failed to read themes directory {:?}: {}", path, e);
            return Vec::new();
        }
    };
    entries.sort();

    let mut themes = Vec::new();
    for dir in entries {
        if !fs.is_dir(&dir) {
            continue;
        }

        let Some(basename) = dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !is_valid_identifier(basename) {
            tracing::debug!("Skipping {:?}: not a valid theme identifier", dir);
            continue;
        }

        match Theme::from_dir(fs, &dir) {
            Ok(theme) if theme.identifier() == basename => {
                tracing::debug!("Found theme '{}' in {:?}", basename, dir);
                themes.push(theme);
            }
            Ok(theme) => {
                tracing::debug!(
                    "Skipping {:?}: metadata identifier '{}' does not match folder name",
                    dir,
                    theme.identifier()
                );
            }
            Err(e) => {
                tracing::debug!("Skipping {:?}: {}", dir, e);
            }
        }
    }

    themes
}

/// Discovers themes for an application.
///
/// Any `Fn(&Application) -> Vec<Theme>` closure is a loader, so applications
/// with their own storage do not need a dedicated type.
pub trait ThemeLoader: Send + Sync {
    /// Produce every theme this loader can find.
    fn load(&self, app: &Application) -> Vec<Theme>;

    /// Short label used in logs.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> ThemeLoader for F
where
    F: Fn(&Application) -> Vec<Theme> + Send + Sync,
{
    fn load(&self, app: &Application) -> Vec<Theme> {
        self(app)
    }
}

/// Finds themes shipped with the application in `<root>/themes`.
#[derive(Clone)]
pub struct PackagedThemesLoader {
    fs: Arc<dyn ThemeFs>,
}

impl PackagedThemesLoader {
    pub fn new() -> Self {
        Self::with_fs(Arc::new(LocalThemeFs))
    }

    pub fn with_fs(fs: Arc<dyn ThemeFs>) -> Self {
        Self { fs }
    }

    /// Directory scanned for `app`.
    pub fn themes_dir(app: &Application) -> PathBuf {
        app.root_path.join(PACKAGED_THEMES_DIR)
    }
}

impl Default for PackagedThemesLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeLoader for PackagedThemesLoader {
    fn load(&self, app: &Application) -> Vec<Theme> {
        let themes_dir = Self::themes_dir(app);
        if !self.fs.exists(&themes_dir) {
            return Vec::new();
        }
        load_themes_from(self.fs.as_ref(), &themes_dir)
    }

    fn name(&self) -> &str {
        "packaged"
    }
}

/// Scans every directory listed in the `theme_paths` setting, in order.
///
/// Relative entries are resolved against the application root.
#[derive(Clone)]
pub struct ThemePathsLoader {
    fs: Arc<dyn ThemeFs>,
}

impl ThemePathsLoader {
    pub fn new() -> Self {
        Self::with_fs(Arc::new(LocalThemeFs))
    }

    pub fn with_fs(fs: Arc<dyn ThemeFs>) -> Self {
        Self { fs }
    }
}

impl Default for ThemePathsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeLoader for ThemePathsLoader {
    fn load(&self, app: &Application) -> Vec<Theme> {
        let mut themes = Vec::new();
        for path in app.config.theme_paths.iter() {
            let dir = app.root_path.join(path);
            if !self.fs.is_dir(&dir) {
                tracing::debug!("Configured theme path {:?} is not a directory", dir);
                continue;
            }
            themes.extend(load_themes_from(self.fs.as_ref(), &dir));
        }
        themes
    }

    fn name(&self) -> &str {
        "theme_paths"
    }
}

/// The loaders used when the application does not pick its own: packaged, then configured paths.
pub fn default_loaders() -> Vec<Box<dyn ThemeLoader>> {
    vec![
        Box::new(PackagedThemesLoader::new()),
        Box::new(ThemePathsLoader::new()),
    ]
}
