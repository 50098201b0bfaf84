//! Template name lookup: the part of the host template engine this crate extends.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Result, ThemeError};
use crate::manager::ThemeProvider;
use crate::path_utils::safe_relative_path;
use crate::theme::{is_valid_identifier, LocalThemeFs, ThemeFs};

/// Where a resolved template came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOrigin {
    Application,
    /// A theme's templates directory, by theme identifier
    Theme(String),
}

/// A resolved template, ready to be handed to the engine's extends/include/import machinery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Name the template was requested under, e.g. `plain/layout.html`
    pub name: String,
    pub path: PathBuf,
    pub source: String,
    pub origin: TemplateOrigin,
}

impl Template {
    pub fn is_from_theme(&self) -> bool {
        matches!(self.origin, TemplateOrigin::Theme(_))
    }
}

/// Looks templates up by name.
pub trait TemplateSource: Send + Sync {
    /// `Ok(None)` when this source has no template by that name.
    fn get_template(&self, name: &str) -> Result<Option<Template>>;
}

fn checked_name(name: &str) -> Result<PathBuf> {
    safe_relative_path(name).ok_or_else(|| ThemeError::InvalidTemplateName {
        name: name.to_string(),
    })
}

fn read_template(
    fs: &dyn ThemeFs,
    dir: &Path,
    relative: &Path,
    name: &str,
    origin: TemplateOrigin,
) -> Result<Option<Template>> {
    let path = dir.join(relative);
    if !fs.exists(&path) || fs.is_dir(&path) {
        return Ok(None);
    }
    let source = fs.read_file(&path).map_err(|e| ThemeError::io(&path, e))?;
    Ok(Some(Template {
        name: name.to_string(),
        path,
        source,
        origin,
    }))
}

/// Templates from an ordered list of directories; the first directory holding the name wins.
#[derive(Clone)]
pub struct DirectorySource {
    dirs: Vec<PathBuf>,
    fs: Arc<dyn ThemeFs>,
}

impl DirectorySource {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::with_fs(dirs, Arc::new(LocalThemeFs))
    }

    pub fn with_fs<I, P>(dirs: I, fs: Arc<dyn ThemeFs>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
            fs,
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl TemplateSource for DirectorySource {
    fn get_template(&self, name: &str) -> Result<Option<Template>> {
        let relative = checked_name(name)?;
        for dir in &self.dirs {
            if let Some(template) = read_template(
                self.fs.as_ref(),
                dir,
                &relative,
                name,
                TemplateOrigin::Application,
            )? {
                return Ok(Some(template));
            }
        }
        Ok(None)
    }
}

/// Resolves `<identifier>/<name>` against the templates directory of a registered theme.
#[derive(Clone)]
pub struct ThemeTemplateSource {
    provider: Arc<dyn ThemeProvider>,
    fs: Arc<dyn ThemeFs>,
}

impl ThemeTemplateSource {
    pub fn new(provider: Arc<dyn ThemeProvider>) -> Self {
        Self::with_fs(provider, Arc::new(LocalThemeFs))
    }

    pub fn with_fs(provider: Arc<dyn ThemeProvider>, fs: Arc<dyn ThemeFs>) -> Self {
        Self { provider, fs }
    }
}

impl TemplateSource for ThemeTemplateSource {
    fn get_template(&self, name: &str) -> Result<Option<Template>> {
        checked_name(name)?;
        let Some((identifier, rest)) = name.split_once('/') else {
            return Ok(None);
        };
        if !is_valid_identifier(identifier) {
            return Ok(None);
        }

        let theme = match self.provider.get_theme(identifier) {
            Ok(theme) => theme,
            Err(ThemeError::ThemeNotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        read_template(
            self.fs.as_ref(),
            &theme.templates_path(),
            &checked_name(rest)?,
            name,
            TemplateOrigin::Theme(identifier.to_string()),
        )
    }
}
