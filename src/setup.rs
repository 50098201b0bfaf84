//! One-call wiring of themes into an application.

use std::sync::Arc;

use crate::app::Application;
use crate::config::DEFAULT_URL_PREFIX;
use crate::error::{Result, ThemeError};
use crate::manager::{ThemeManager, ThemeProvider};
use crate::static_files::StaticRoute;
use crate::template::{
    DirectorySource, TemplateEnvironment, TemplateRenderer, ThemeTemplateSource,
};
use crate::theme::{default_loaders, Theme, ThemeLoader};

/// Options for [`setup_themes`]. Anything left `None` comes from the
/// application's configuration or the defaults.
#[derive(Default)]
pub struct SetupOptions {
    /// Loaders to run; defaults to packaged themes, then configured theme paths.
    pub loaders: Option<Vec<Box<dyn ThemeLoader>>>,
    /// Application identifier themes must declare.
    pub app_id: Option<String>,
    /// A pre-configured manager to use instead of the default one.
    pub manager: Option<ThemeManager>,
    /// Mount point for theme static assets.
    pub url_prefix: Option<String>,
    /// An already-populated registry used as is. No manager is built or
    /// refreshed, so `loaders`, `app_id` and `manager` must be left unset.
    pub provider: Option<Arc<dyn ThemeProvider>>,
}

/// Everything an application needs at request time, built once by [`setup_themes`].
///
/// Pass it to handlers explicitly (usually behind an `Arc`); there is no global registry.
pub struct Themes {
    provider: Arc<dyn ThemeProvider>,
    manager: Option<Arc<ThemeManager>>,
    templates: TemplateEnvironment,
    static_route: StaticRoute,
}

/// Discover themes for `app` and wire up template resolution and static URLs.
///
/// Resolution order for each setting: explicit option, then `app.config`, then
/// the default. A supplied manager keeps its own loaders and app id unless the
/// options name them.
pub fn setup_themes(app: &Application, options: SetupOptions) -> Result<Themes> {
    let SetupOptions {
        loaders,
        app_id,
        manager,
        url_prefix,
        provider,
    } = options;

    let prefix = url_prefix
        .or_else(|| app.config.url_prefix.clone())
        .unwrap_or_else(|| DEFAULT_URL_PREFIX.to_string());
    let static_route = StaticRoute::new(&prefix);

    if let Some(provider) = provider {
        if loaders.is_some() || app_id.is_some() || manager.is_some() {
            return Err(ThemeError::Config {
                reason: "a theme provider cannot be combined with loaders, app_id or manager"
                    .to_string(),
            });
        }
        tracing::debug!(
            "Themes ready from an external provider: {} themes, static assets under '{}'",
            provider.list_themes().len(),
            static_route.prefix()
        );
        return Ok(Themes::from_provider(app, provider, None, static_route));
    }

    let app_id = app_id.or_else(|| app.config.app_id.clone());

    let mut manager = match manager {
        Some(mut manager) => {
            if let Some(loaders) = loaders {
                manager.set_loaders(loaders);
            }
            if let Some(app_id) = app_id {
                manager.set_app_id(app_id);
            }
            manager
        }
        None => ThemeManager::new(
            app_id.unwrap_or_else(|| app.id.clone()),
            loaders.unwrap_or_else(default_loaders),
        )
        .with_duplicate_policy(app.config.duplicate_policy)
        .with_asset_logging(app.config.log_assets),
    };

    manager.refresh(app)?;
    let manager = Arc::new(manager);

    tracing::debug!(
        "Themes ready for '{}': {} themes, static assets under '{}'",
        manager.app_id(),
        manager.len(),
        static_route.prefix()
    );

    let provider: Arc<dyn ThemeProvider> = manager.clone();
    Ok(Themes::from_provider(app, provider, Some(manager), static_route))
}

impl Themes {
    fn from_provider(
        app: &Application,
        provider: Arc<dyn ThemeProvider>,
        manager: Option<Arc<ThemeManager>>,
        static_route: StaticRoute,
    ) -> Self {
        let templates = TemplateEnvironment::new(
            Box::new(DirectorySource::new(app.template_dirs.clone())),
            Box::new(ThemeTemplateSource::new(Arc::clone(&provider))),
            static_route.clone(),
        );
        Self {
            provider,
            manager,
            templates,
            static_route,
        }
    }

    /// The built-in manager, unless setup was given an external provider.
    pub fn manager(&self) -> Option<&ThemeManager> {
        self.manager.as_deref()
    }

    pub fn provider(&self) -> &dyn ThemeProvider {
        self.provider.as_ref()
    }

    /// Look up a theme by identifier.
    pub fn get_theme(&self, identifier: &str) -> Result<Arc<Theme>> {
        self.provider.get_theme(identifier)
    }

    /// All registered themes, in registry order.
    pub fn get_themes_list(&self) -> Vec<Arc<Theme>> {
        self.provider.list_themes()
    }

    pub fn templates(&self) -> &TemplateEnvironment {
        &self.templates
    }

    pub fn static_route(&self) -> &StaticRoute {
        &self.static_route
    }

    /// Render `name` for `theme`, falling back to the application template when `fallback` is set.
    pub fn render_theme_template(
        &self,
        theme: &Theme,
        name: &str,
        fallback: bool,
        renderer: &dyn TemplateRenderer,
    ) -> Result<String> {
        self.templates
            .render_theme_template(theme, name, fallback, renderer)
    }

    pub fn static_file_url(&self, theme: &Theme, path: &str) -> String {
        self.static_route.url_for(theme, path)
    }

    /// Map a percent-decoded request path under the asset prefix to the file to serve.
    pub fn resolve_static(&self, url_path: &str) -> Result<std::path::PathBuf> {
        self.static_route.resolve(self.provider.as_ref(), url_path)
    }

    /// URLs of every file in one of `theme`'s asset bundles (`"css"` or `"js"`).
    pub fn asset_urls(&self, theme: &Theme, extension: &str) -> Vec<String> {
        self.provider
            .theme_assets(theme)
            .into_iter()
            .filter(|bundle| bundle.extension == extension)
            .flat_map(|bundle| bundle.files)
            .map(|file| self.static_route.url_for(theme, &file))
            .collect()
    }
}
