//! Theme manager: runs loaders and owns the registry of discovered themes.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::app::Application;
use crate::assets::{collect_bundles, AssetBundle};
use crate::error::{Result, ThemeError};
use crate::theme::{LocalThemeFs, Theme, ThemeFs, ThemeLoader};

/// What happens when two loaders find themes with the same identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the theme found first (earlier loader, or earlier directory), log the rest.
    #[default]
    FirstWins,
    /// Fail the refresh.
    Reject,
}

/// Read access to a set of registered themes.
///
/// Template resolution and static routing only depend on this trait, so an
/// application can substitute its own manager.
pub trait ThemeProvider: Send + Sync {
    /// Look up a theme, failing with [`ThemeError::ThemeNotFound`].
    fn get_theme(&self, identifier: &str) -> Result<Arc<Theme>>;

    /// All themes, in registration order.
    fn list_themes(&self) -> Vec<Arc<Theme>>;

    /// Asset bundles of one theme. Scans its static directory on disk unless overridden.
    fn theme_assets(&self, theme: &Theme) -> Vec<AssetBundle> {
        collect_bundles(&LocalThemeFs, theme)
    }
}

/// A theme dropped under [`DuplicatePolicy::FirstWins`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowedTheme {
    pub identifier: String,
    /// Root of the theme that stayed registered
    pub kept: PathBuf,
    /// Root of the theme that was dropped
    pub dropped: PathBuf,
}

/// Outcome of [`ThemeManager::refresh`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Registered identifiers, in registry order
    pub loaded: Vec<String>,
    pub shadowed: Vec<ShadowedTheme>,
    /// Identifiers of themes written for another application
    pub rejected_application: Vec<String>,
}

type AppIdCheck = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Loads and stores all the themes for an application.
///
/// A manager is built once at setup, refreshed, and then only read. Lookups
/// hand out the same `Arc<Theme>` for the life of the registry.
pub struct ThemeManager {
    app_id: String,
    loaders: Vec<Box<dyn ThemeLoader>>,
    fs: Arc<dyn ThemeFs>,
    duplicate_policy: DuplicatePolicy,
    app_id_check: Option<AppIdCheck>,
    log_assets: bool,
    themes: IndexMap<String, Arc<Theme>>,
    bundles: Vec<AssetBundle>,
}

impl ThemeManager {
    /// Create an empty manager; call [`refresh`](Self::refresh) to populate it.
    ///
    /// Loaders run in the given order.
    pub fn new(app_id: impl Into<String>, loaders: Vec<Box<dyn ThemeLoader>>) -> Self {
        Self {
            app_id: app_id.into(),
            loaders,
            fs: Arc::new(LocalThemeFs),
            duplicate_policy: DuplicatePolicy::default(),
            app_id_check: None,
            log_assets: true,
            themes: IndexMap::new(),
            bundles: Vec::new(),
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Replace the default check (`application == app_id`) with a custom predicate.
    pub fn with_app_id_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.app_id_check = Some(Box::new(check));
        self
    }

    pub fn with_asset_logging(mut self, enabled: bool) -> Self {
        self.log_assets = enabled;
        self
    }

    /// Filesystem used to scan theme static directories for the asset manifest.
    pub fn with_fs(mut self, fs: Arc<dyn ThemeFs>) -> Self {
        self.fs = fs;
        self
    }

    pub(crate) fn set_loaders(&mut self, loaders: Vec<Box<dyn ThemeLoader>>) {
        self.loaders = loaders;
    }

    pub(crate) fn set_app_id(&mut self, app_id: String) {
        self.app_id = app_id;
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    /// Whether a theme declaring `application` belongs to this application.
    pub fn valid_app_id(&self, application: &str) -> bool {
        match &self.app_id_check {
            Some(check) => check(application),
            None => application == self.app_id,
        }
    }

    /// Rebuild the registry by invoking every loader in order.
    ///
    /// Themes written for another application are skipped. Identifier
    /// collisions follow the manager's [`DuplicatePolicy`]; under `Reject` the
    /// previous registry is left untouched.
    pub fn refresh(&mut self, app: &Application) -> Result<RefreshReport> {
        let mut themes: IndexMap<String, Arc<Theme>> = IndexMap::new();
        let mut report = RefreshReport::default();

        for loader in &self.loaders {
            let found = loader.load(app);
            tracing::debug!("Loader '{}' found {} themes", loader.name(), found.len());

            for theme in found {
                if !self.valid_app_id(theme.application()) {
                    tracing::debug!(
                        "Skipping theme '{}': written for application '{}', not '{}'",
                        theme.identifier(),
                        theme.application(),
                        self.app_id
                    );
                    report
                        .rejected_application
                        .push(theme.identifier().to_string());
                    continue;
                }

                match themes.entry(theme.identifier().to_string()) {
                    Entry::Occupied(existing) => {
                        let kept = existing.get().path().to_path_buf();
                        let dropped = theme.path().to_path_buf();
                        match self.duplicate_policy {
                            DuplicatePolicy::FirstWins => {
                                tracing::warn!(
                                    "Theme '{}' in {:?} is shadowed by {:?}",
                                    existing.key(),
                                    dropped,
                                    kept
                                );
                                report.shadowed.push(ShadowedTheme {
                                    identifier: existing.key().clone(),
                                    kept,
                                    dropped,
                                });
                            }
                            DuplicatePolicy::Reject => {
                                return Err(ThemeError::DuplicateTheme {
                                    identifier: existing.key().clone(),
                                    first: kept,
                                    second: dropped,
                                });
                            }
                        }
                    }
                    Entry::Vacant(slot) => {
                        report.loaded.push(slot.key().clone());
                        slot.insert(Arc::new(theme));
                    }
                }
            }
        }

        let mut bundles = Vec::new();
        for theme in themes.values() {
            for bundle in collect_bundles(self.fs.as_ref(), theme) {
                if self.log_assets {
                    tracing::info!(
                        "Asset bundle '{}': {} file(s) from {:?}",
                        bundle.name,
                        bundle.files.len(),
                        theme.static_path()
                    );
                }
                bundles.push(bundle);
            }
        }

        tracing::info!(
            "Loaded {} themes for application '{}' ({} shadowed, {} for other applications)",
            themes.len(),
            self.app_id,
            report.shadowed.len(),
            report.rejected_application.len()
        );

        self.themes = themes;
        self.bundles = bundles;
        Ok(report)
    }

    /// Get a theme by identifier, if registered.
    pub fn theme(&self, identifier: &str) -> Option<&Arc<Theme>> {
        self.themes.get(identifier)
    }

    /// Iterate over registered themes in registry order.
    pub fn themes(&self) -> impl Iterator<Item = &Arc<Theme>> {
        self.themes.values()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.themes.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// Asset bundles for every theme, in registry order.
    pub fn asset_bundles(&self) -> &[AssetBundle] {
        &self.bundles
    }

    /// Look up one bundle by name (`<identifier>_<ext>`).
    pub fn bundle(&self, name: &str) -> Option<&AssetBundle> {
        self.bundles.iter().find(|b| b.name == name)
    }
}

impl ThemeProvider for ThemeManager {
    fn get_theme(&self, identifier: &str) -> Result<Arc<Theme>> {
        self.themes
            .get(identifier)
            .cloned()
            .ok_or_else(|| ThemeError::ThemeNotFound {
                identifier: identifier.to_string(),
            })
    }

    fn list_themes(&self) -> Vec<Arc<Theme>> {
        self.themes.values().cloned().collect()
    }

    fn theme_assets(&self, theme: &Theme) -> Vec<AssetBundle> {
        self.bundles
            .iter()
            .filter(|bundle| bundle.theme == theme.identifier())
            .cloned()
            .collect()
    }
}

impl fmt::Debug for ThemeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeManager")
            .field("app_id", &self.app_id)
            .field(
                "loaders",
                &self.loaders.iter().map(|l| l.name()).collect::<Vec<_>>(),
            )
            .field("duplicate_policy", &self.duplicate_policy)
            .field("themes", &self.themes.keys().collect::<Vec<_>>())
            .finish()
    }
}
