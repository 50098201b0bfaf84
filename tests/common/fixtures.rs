//! On-disk application and theme trees for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary application root with `templates/` and `themes/`.
pub struct SiteFixture {
    pub dir: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("templates")).unwrap();
        fs::create_dir_all(dir.path().join("themes")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the application root, creating parents.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn app_template(&self, name: &str, content: &str) -> PathBuf {
        self.write(&format!("templates/{}", name), content)
    }

    /// Create `<base>/<identifier>/info.json` declaring `application`.
    pub fn theme_in(&self, base: &str, identifier: &str, application: &str) -> ThemeFixture {
        let root = self.root().join(base).join(identifier);
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("info.json"), info_json(identifier, application)).unwrap();
        ThemeFixture { root }
    }

    /// A packaged theme under `themes/`.
    pub fn theme(&self, identifier: &str, application: &str) -> ThemeFixture {
        self.theme_in("themes", identifier, application)
    }
}

pub struct ThemeFixture {
    pub root: PathBuf,
}

impl ThemeFixture {
    pub fn template(self, name: &str, content: &str) -> Self {
        self.file(&format!("templates/{}", name), content)
    }

    pub fn asset(self, name: &str, content: &str) -> Self {
        self.file(&format!("static/{}", name), content)
    }

    pub fn file(self, relative: &str, content: &str) -> Self {
        let path = self.root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }
}

pub fn info_json(identifier: &str, application: &str) -> String {
    serde_json::json!({
        "name": format!("Theme {}", identifier),
        "identifier": identifier,
        "application": application,
        "author": "Test Suite",
    })
    .to_string()
}
