//! Pure theme data types (no filesystem access).

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Theme identifiers double as directory names and URL segments.
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("identifier pattern is valid"));

/// Whether `candidate` can be used as a theme identifier.
pub fn is_valid_identifier(candidate: &str) -> bool {
    IDENTIFIER.is_match(candidate)
}

/// Subdirectory of a theme holding its templates.
pub const TEMPLATES_DIR: &str = "templates";
/// Subdirectory of a theme holding its static assets.
pub const STATIC_DIR: &str = "static";
/// Optional plain-text license shipped next to the metadata file.
pub const LICENSE_FILE: &str = "license.txt";

/// On-disk formats accepted for a theme's metadata file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataFormat {
    Json,
    #[cfg(feature = "yaml")]
    Yaml,
}

impl MetadataFormat {
    /// Candidate metadata files, in lookup order.
    pub const CANDIDATES: &'static [(&'static str, MetadataFormat)] = &[
        ("info.json", MetadataFormat::Json),
        #[cfg(feature = "yaml")]
        ("info.yaml", MetadataFormat::Yaml),
        #[cfg(feature = "yaml")]
        ("info.yml", MetadataFormat::Yaml),
    ];
}

fn default_doctype() -> String {
    "html5".to_string()
}

/// Contents of a theme's metadata file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThemeMetadata {
    /// Human-readable name
    pub name: String,
    /// Unique key; must equal the theme's folder name
    pub identifier: String,
    /// Application the theme was written for
    pub application: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    /// Preview image, relative to the theme's static directory
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default = "default_doctype")]
    pub doctype: String,
    /// Every other key in the file
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl ThemeMetadata {
    /// Parse metadata in the given format and check the required fields.
    pub fn parse(content: &str, format: MetadataFormat) -> Result<Self, String> {
        let metadata: Self = match format {
            MetadataFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string())?,
            #[cfg(feature = "yaml")]
            MetadataFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string())?,
        };
        metadata.validate()?;
        Ok(metadata)
    }

    fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("name", &self.name),
            ("identifier", &self.identifier),
            ("application", &self.application),
        ] {
            if value.trim().is_empty() {
                return Err(format!("required field '{}' is empty", field));
            }
        }
        if !is_valid_identifier(&self.identifier) {
            return Err(format!("'{}' is not a valid identifier", self.identifier));
        }
        Ok(())
    }
}

/// One discovered theme: identity, metadata and filesystem layout.
///
/// Themes are produced by loaders and never change afterwards. Building one
/// by hand with [`Theme::from_metadata`] is possible, but a theme that was not
/// registered through a [`ThemeManager`](crate::ThemeManager) is unknown to
/// the template and static-asset routes, so its files are unreachable.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    path: PathBuf,
    metadata: ThemeMetadata,
    license_text: Option<String>,
}

impl Theme {
    /// Assemble a theme rooted at `path` from already-parsed metadata.
    pub fn from_metadata(path: impl Into<PathBuf>, metadata: ThemeMetadata) -> Self {
        Self {
            path: path.into(),
            metadata,
            license_text: None,
        }
    }

    pub(crate) fn with_license_text(mut self, license_text: Option<String>) -> Self {
        self.license_text = license_text;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.metadata.identifier
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Application identifier declared by the theme.
    pub fn application(&self) -> &str {
        &self.metadata.application
    }

    /// Theme root directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn templates_path(&self) -> PathBuf {
        self.path.join(TEMPLATES_DIR)
    }

    pub fn static_path(&self) -> PathBuf {
        self.path.join(STATIC_DIR)
    }

    pub fn description(&self) -> Option<&str> {
        self.metadata.description.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.metadata.author.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.metadata.version.as_deref()
    }

    pub fn license(&self) -> Option<&str> {
        self.metadata.license.as_deref()
    }

    pub fn website(&self) -> Option<&str> {
        self.metadata.website.as_deref()
    }

    pub fn preview(&self) -> Option<&str> {
        self.metadata.preview.as_deref()
    }

    pub fn doctype(&self) -> &str {
        &self.metadata.doctype
    }

    /// Contents of the theme's `license.txt`, if it ships one.
    pub fn license_text(&self) -> Option<&str> {
        self.license_text.as_deref()
    }

    /// Free-form metadata fields.
    pub fn options(&self) -> &Map<String, Value> {
        &self.metadata.options
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.metadata.options.get(key)
    }

    pub fn metadata(&self) -> &ThemeMetadata {
        &self.metadata
    }
}
