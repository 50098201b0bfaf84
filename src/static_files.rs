//! URLs for theme static assets, and the reverse mapping used by the asset route.
//!
//! Assets are mounted at `<prefix>/<identifier>/<path>` (default prefix
//! `/_themes`). Each segment of the asset path is percent-encoded in the
//! URL. The host's generic static-file handler serves whatever
//! [`StaticRoute::resolve`] returns, byte for byte.

use std::path::PathBuf;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::DEFAULT_URL_PREFIX;
use crate::error::{Result, ThemeError};
use crate::manager::ThemeProvider;
use crate::path_utils::safe_relative_path;
use crate::theme::Theme;

/// Normalise a prefix to a single leading `/` and no trailing `/` (`"/"` becomes `""`).
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Characters escaped inside one URL path segment (the WHATWG path-segment set).
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn encode_asset_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// URL of `path` inside `theme`'s static directory, mounted under `prefix`.
///
/// `path` is a `/`-separated file name; every segment is percent-encoded, so
/// names containing spaces, `#` or `?` survive the trip through a browser.
pub fn static_file_url(prefix: &str, theme: &Theme, path: &str) -> String {
    format!(
        "{}/{}/{}",
        normalize_prefix(prefix),
        theme.identifier(),
        encode_asset_path(path)
    )
}

/// The mount point shared by URL generation and the asset route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticRoute {
    prefix: String,
}

impl Default for StaticRoute {
    fn default() -> Self {
        Self::new(DEFAULT_URL_PREFIX)
    }
}

impl StaticRoute {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: normalize_prefix(prefix),
        }
    }

    /// Normalised prefix, e.g. `/_themes`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn url_for(&self, theme: &Theme, path: &str) -> String {
        static_file_url(&self.prefix, theme, path)
    }

    /// Map a request path back to the file it names.
    ///
    /// `url_path` is the request path after the host has split off the query
    /// string and percent-decoded it, so `#`, `?` and spaces in it are part of
    /// the file name. Fails with [`ThemeError::InvalidAssetPath`] for paths outside
    /// the prefix or escaping the static directory, and
    /// [`ThemeError::ThemeNotFound`] for unknown themes.
    pub fn resolve(&self, provider: &dyn ThemeProvider, url_path: &str) -> Result<PathBuf> {
        let invalid = || ThemeError::InvalidAssetPath {
            path: url_path.to_string(),
        };

        let rest = url_path
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(invalid)?;
        let (identifier, file) = rest.split_once('/').ok_or_else(invalid)?;
        let relative = safe_relative_path(file).ok_or_else(invalid)?;

        let theme = provider.get_theme(identifier)?;
        Ok(theme.static_path().join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeMetadata;
    use percent_encoding::percent_decode_str;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn theme(identifier: &str) -> Theme {
        let metadata: ThemeMetadata = serde_json::from_value(serde_json::json!({
            "name": identifier,
            "identifier": identifier,
            "application": "blog",
        }))
        .unwrap();
        Theme::from_metadata(format!("/srv/themes/{}", identifier), metadata)
    }

    struct OneTheme(Arc<Theme>);

    impl ThemeProvider for OneTheme {
        fn get_theme(&self, identifier: &str) -> Result<Arc<Theme>> {
            if identifier == self.0.identifier() {
                Ok(Arc::clone(&self.0))
            } else {
                Err(ThemeError::ThemeNotFound {
                    identifier: identifier.to_string(),
                })
            }
        }

        fn list_themes(&self) -> Vec<Arc<Theme>> {
            vec![Arc::clone(&self.0)]
        }
    }

    #[test]
    fn test_default_prefix_url() {
        let route = StaticRoute::default();
        assert_eq!(route.url_for(&theme("themeA"), "style.css"), "/_themes/themeA/style.css");
        assert_eq!(
            static_file_url("/_themes", &theme("themeA"), "style.css"),
            "/_themes/themeA/style.css"
        );
    }

    #[test]
    fn test_prefix_normalisation() {
        assert_eq!(StaticRoute::new("skins/").prefix(), "/skins");
        assert_eq!(StaticRoute::new("//assets//").prefix(), "/assets");
        assert_eq!(StaticRoute::new("/").prefix(), "");
        assert_eq!(
            StaticRoute::new("/").url_for(&theme("plain"), "/img/logo.png"),
            "/plain/img/logo.png"
        );
    }

    #[test]
    fn test_resolve_maps_into_static_dir() {
        let provider = OneTheme(Arc::new(theme("themeA")));
        let route = StaticRoute::default();

        let path = route
            .resolve(&provider, "/_themes/themeA/css/site.css")
            .unwrap();
        assert_eq!(path, PathBuf::from("/srv/themes/themeA/static/css/site.css"));
    }

    #[test]
    fn test_reserved_characters_are_encoded() {
        let theme = theme("themeA");
        let route = StaticRoute::default();

        assert_eq!(route.url_for(&theme, "a#1.css"), "/_themes/themeA/a%231.css");
        assert_eq!(
            route.url_for(&theme, "fonts/my file?.woff"),
            "/_themes/themeA/fonts/my%20file%3F.woff"
        );
        assert_eq!(route.url_for(&theme, "100%.css"), "/_themes/themeA/100%25.css");
    }

    #[test]
    fn test_decoded_request_keeps_reserved_characters() {
        let provider = OneTheme(Arc::new(theme("themeA")));
        let route = StaticRoute::default();

        let url = route.url_for(&provider.0, "a#1.css");
        let decoded = percent_decode_str(&url).decode_utf8().unwrap();
        let path = route.resolve(&provider, &decoded).unwrap();
        assert_eq!(path, PathBuf::from("/srv/themes/themeA/static/a#1.css"));
    }

    #[test]
    fn test_resolve_rejects_bad_paths() {
        let provider = OneTheme(Arc::new(theme("themeA")));
        let route = StaticRoute::default();

        for url in [
            "/static/themeA/site.css",
            "/_themesX/themeA/site.css",
            "/_themes/themeA",
            "/_themes/themeA/",
            "/_themes/themeA/../info.json",
        ] {
            let err = route.resolve(&provider, url).unwrap_err();
            assert!(
                matches!(err, ThemeError::InvalidAssetPath { .. }),
                "{url} should be invalid, got {err:?}"
            );
        }

        let err = route.resolve(&provider, "/_themes/ghost/site.css").unwrap_err();
        assert!(matches!(err, ThemeError::ThemeNotFound { .. }));
    }

    proptest! {
        #[test]
        fn prop_url_round_trips_through_resolve(
            identifier in "[a-zA-Z_][a-zA-Z0-9_]{0,12}",
            segments in prop::collection::vec("[a-zA-Z0-9_# ?%-]{1,8}(\\.[a-z]{1,4})?", 1..4),
            prefix in "(/[a-z_]{1,8}){0,2}",
        ) {
            let theme = Arc::new(theme(&identifier));
            let provider = OneTheme(Arc::clone(&theme));
            let route = StaticRoute::new(&prefix);
            let asset = segments.join("/");

            let url = route.url_for(&theme, &asset);
            let expected_prefix = format!("{}/{}/", route.prefix(), identifier);
            prop_assert!(url.starts_with(&expected_prefix));
            prop_assert!(!url.contains([' ', '#', '?']));

            let decoded = percent_decode_str(&url).decode_utf8().unwrap();
            let resolved = route.resolve(&provider, &decoded).unwrap();
            prop_assert_eq!(resolved, theme.static_path().join(safe_relative_path(&asset).unwrap()));
        }
    }
}
