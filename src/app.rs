//! The host application as seen by theme loaders.

use std::path::{Path, PathBuf};

use crate::config::ThemeConfig;

/// Everything loaders and setup need to know about the host application.
#[derive(Debug, Clone)]
pub struct Application {
    /// Application identifier themes must declare (unless overridden).
    pub id: String,
    /// Directory containing the application's code; packaged themes live in `<root>/themes`.
    pub root_path: PathBuf,
    /// The application's own template directories, searched in order.
    pub template_dirs: Vec<PathBuf>,
    pub config: ThemeConfig,
}

impl Application {
    /// Application rooted at `root_path` with `<root>/templates` as its template directory.
    pub fn new(id: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        let root_path = root_path.into();
        Self {
            id: id.into(),
            template_dirs: vec![root_path.join("templates")],
            root_path,
            config: ThemeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ThemeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_template_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.template_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}
