//! Theme-aware template resolution with application fallback.

use crate::error::{Result, ThemeError};
use crate::static_files::StaticRoute;
use crate::theme::Theme;

use super::source::{Template, TemplateSource};

/// Renders a resolved template. Implemented by the host template engine.
///
/// The render context is passed explicitly; engines expose
/// [`ThemeRenderContext::resolve_with`] to templates as their `theme(name,
/// fallback=true)` helper.
pub trait TemplateRenderer {
    fn render(&self, template: &Template, ctx: &ThemeRenderContext<'_>) -> anyhow::Result<String>;
}

impl<F> TemplateRenderer for F
where
    F: Fn(&Template, &ThemeRenderContext<'_>) -> anyhow::Result<String>,
{
    fn render(&self, template: &Template, ctx: &ThemeRenderContext<'_>) -> anyhow::Result<String> {
        self(template, ctx)
    }
}

/// The combined template search path: theme templates, then the application's own.
pub struct TemplateEnvironment {
    themes: Box<dyn TemplateSource>,
    app: Box<dyn TemplateSource>,
    static_route: StaticRoute,
}

impl TemplateEnvironment {
    pub fn new(
        app: Box<dyn TemplateSource>,
        themes: Box<dyn TemplateSource>,
        static_route: StaticRoute,
    ) -> Self {
        Self {
            themes,
            app,
            static_route,
        }
    }

    pub fn static_route(&self) -> &StaticRoute {
        &self.static_route
    }

    fn lookup(&self, name: &str) -> Result<Option<Template>> {
        if let Some(template) = self.themes.get_template(name)? {
            return Ok(Some(template));
        }
        self.app.get_template(name)
    }

    /// Load a template by its full name from the combined search path.
    pub fn get_template(&self, name: &str) -> Result<Template> {
        self.lookup(name)?
            .ok_or_else(|| ThemeError::TemplateNotFound {
                name: name.to_string(),
            })
    }

    /// Resolve `name` for `theme`.
    ///
    /// Loads `<identifier>/<name>` from the combined search path; when that is
    /// missing and `fallback` is set, loads `name` from the application's own
    /// templates. Without fallback a missing theme template is
    /// [`ThemeError::TemplateNotFound`].
    pub fn resolve(&self, theme: &Theme, name: &str, fallback: bool) -> Result<Template> {
        let themed = format!("{}/{}", theme.identifier(), name);
        if let Some(template) = self.lookup(&themed)? {
            return Ok(template);
        }

        if !fallback {
            return Err(ThemeError::TemplateNotFound { name: themed });
        }

        tracing::debug!(
            "Theme '{}' has no '{}', falling back to the application template",
            theme.identifier(),
            name
        );
        self.app
            .get_template(name)?
            .ok_or_else(|| ThemeError::TemplateNotFound {
                name: name.to_string(),
            })
    }

    /// Resolve the first of `names` that exists.
    pub fn select(&self, theme: &Theme, names: &[&str], fallback: bool) -> Result<Template> {
        for name in names {
            match self.resolve(theme, name, fallback) {
                Ok(template) => return Ok(template),
                Err(ThemeError::TemplateNotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(ThemeError::TemplateNotFound {
            name: names.join(", "),
        })
    }

    /// Resolve `name` for `theme` and render it with a per-render context.
    pub fn render_theme_template(
        &self,
        theme: &Theme,
        name: &str,
        fallback: bool,
        renderer: &dyn TemplateRenderer,
    ) -> Result<String> {
        let template = self.resolve(theme, name, fallback)?;
        let ctx = ThemeRenderContext { env: self, theme };
        renderer
            .render(&template, &ctx)
            .map_err(|source| ThemeError::Render {
                template: template.name.clone(),
                source,
            })
    }
}

/// Context available while rendering a template for a theme.
#[derive(Clone, Copy)]
pub struct ThemeRenderContext<'a> {
    env: &'a TemplateEnvironment,
    theme: &'a Theme,
}

impl<'a> ThemeRenderContext<'a> {
    pub fn new(env: &'a TemplateEnvironment, theme: &'a Theme) -> Self {
        Self { env, theme }
    }

    /// The theme being rendered.
    pub fn theme(&self) -> &'a Theme {
        self.theme
    }

    pub fn environment(&self) -> &'a TemplateEnvironment {
        self.env
    }

    /// `theme(name)`: the theme's template, or the application's.
    pub fn resolve(&self, name: &str) -> Result<Template> {
        self.resolve_with(name, true)
    }

    /// `theme(name, fallback)`.
    pub fn resolve_with(&self, name: &str, fallback: bool) -> Result<Template> {
        self.env.resolve(self.theme, name, fallback)
    }

    /// URL of one of the current theme's static files.
    pub fn static_url(&self, path: &str) -> String {
        self.env.static_route.url_for(self.theme, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Application;
    use crate::manager::{ThemeManager, ThemeProvider};
    use crate::template::{DirectorySource, TemplateOrigin, ThemeTemplateSource};
    use crate::theme::{info_json, load_themes_from, MockThemeFs, ThemeFs, ThemeLoader};
    use std::path::Path;
    use std::sync::Arc;

    struct Fixture {
        env: TemplateEnvironment,
        manager: Arc<ThemeManager>,
    }

    fn fixture() -> Fixture {
        let fs: Arc<dyn ThemeFs> = Arc::new(
            MockThemeFs::new()
                .with_file("/app/templates/layout.html", "app layout")
                .with_file("/app/templates/index.html", "app index")
                .with_file("/app/themes/themeA/info.json", &info_json("themeA", "blog"))
                .with_file("/app/themes/themeA/templates/layout.html", "themeA layout")
                .with_file("/app/themes/themeB/info.json", &info_json("themeB", "blog")),
        );

        let loader_fs = Arc::clone(&fs);
        let loader: Box<dyn ThemeLoader> = Box::new(move |_: &Application| {
            load_themes_from(loader_fs.as_ref(), Path::new("/app/themes"))
        });
        let mut manager = ThemeManager::new("blog", vec![loader]).with_asset_logging(false);
        manager.refresh(&Application::new("blog", "/app")).unwrap();
        let manager = Arc::new(manager);

        let env = TemplateEnvironment::new(
            Box::new(DirectorySource::with_fs(["/app/templates"], Arc::clone(&fs))),
            Box::new(ThemeTemplateSource::with_fs(manager.clone(), fs)),
            StaticRoute::default(),
        );
        Fixture { env, manager }
    }

    #[test]
    fn test_theme_template_preferred() {
        let f = fixture();
        let theme = f.manager.get_theme("themeA").unwrap();

        let template = f.env.resolve(&theme, "layout.html", true).unwrap();
        assert_eq!(template.source, "themeA layout");
        assert_eq!(template.name, "themeA/layout.html");
    }

    #[test]
    fn test_fallback_to_application_template() {
        let f = fixture();
        let theme = f.manager.get_theme("themeA").unwrap();

        let template = f.env.resolve(&theme, "index.html", true).unwrap();
        assert_eq!(template.source, "app index");
        assert_eq!(template.origin, TemplateOrigin::Application);
    }

    #[test]
    fn test_no_fallback_requires_theme_template() {
        let f = fixture();
        let theme = f.manager.get_theme("themeB").unwrap();

        let err = f.env.resolve(&theme, "layout.html", false).unwrap_err();
        assert!(
            matches!(err, ThemeError::TemplateNotFound { ref name } if name == "themeB/layout.html")
        );

        let template = f.env.resolve(&theme, "layout.html", true).unwrap();
        assert_eq!(template.source, "app layout");
    }

    #[test]
    fn test_missing_everywhere() {
        let f = fixture();
        let theme = f.manager.get_theme("themeA").unwrap();
        let err = f.env.resolve(&theme, "nowhere.html", true).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_get_template_uses_combined_path() {
        let f = fixture();
        assert_eq!(
            f.env.get_template("themeA/layout.html").unwrap().source,
            "themeA layout"
        );
        assert_eq!(f.env.get_template("index.html").unwrap().source, "app index");
        assert!(f.env.get_template("themeB/layout.html").is_err());
    }

    #[test]
    fn test_select_picks_first_existing() {
        let f = fixture();
        let theme = f.manager.get_theme("themeB").unwrap();

        let template = f
            .env
            .select(&theme, &["post.html", "index.html", "layout.html"], true)
            .unwrap();
        assert_eq!(template.source, "app index");

        let err = f.env.select(&theme, &["a.html", "b.html"], false).unwrap_err();
        assert!(matches!(err, ThemeError::TemplateNotFound { ref name } if name == "a.html, b.html"));
    }

    #[test]
    fn test_render_threads_context_through_renderer() {
        let f = fixture();
        let theme = f.manager.get_theme("themeA").unwrap();

        // A toy engine: the page "extends" the layout through the theme() helper
        fn render_page(template: &Template, ctx: &ThemeRenderContext<'_>) -> anyhow::Result<String> {
            let layout = ctx.resolve("layout.html")?;
            Ok(format!(
                "{} > {} [{}]",
                layout.source,
                template.source,
                ctx.static_url("style.css")
            ))
        }

        let html = f
            .env
            .render_theme_template(&theme, "index.html", true, &render_page)
            .unwrap();
        assert_eq!(html, "themeA layout > app index [/_themes/themeA/style.css]");
    }

    #[test]
    fn test_renderer_errors_are_wrapped() {
        let f = fixture();
        let theme = f.manager.get_theme("themeB").unwrap();

        fn render_strict(_: &Template, ctx: &ThemeRenderContext<'_>) -> anyhow::Result<String> {
            let partial = ctx.resolve_with("layout.html", false)?;
            Ok(partial.source)
        }

        let err = f
            .env
            .render_theme_template(&theme, "index.html", true, &render_strict)
            .unwrap_err();
        assert!(matches!(err, ThemeError::Render { ref template, .. } if template == "index.html"));
    }
}
