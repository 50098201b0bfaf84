//! Per-theme asset manifest: the stylesheets and scripts each theme ships.

use std::path::Path;

use crate::theme::{Theme, ThemeFs};

/// Extensions grouped into bundles, in bundle order.
pub const BUNDLED_EXTENSIONS: &[&str] = &["css", "js"];

/// Every file with one extension under a theme's static directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBundle {
    /// `<identifier>_<extension>`, e.g. `plain_css`
    pub name: String,
    pub theme: String,
    pub extension: String,
    /// Paths relative to the static directory, `/`-separated, sorted
    pub files: Vec<String>,
}

/// Build the bundles for one theme. Extensions without files produce no bundle.
pub fn collect_bundles(fs: &dyn ThemeFs, theme: &Theme) -> Vec<AssetBundle> {
    let root = theme.static_path();
    let mut files = Vec::new();
    walk_static_dir(fs, &root, &root, &mut files);
    files.sort();

    BUNDLED_EXTENSIONS
        .iter()
        .filter_map(|ext| {
            let matching: Vec<String> = files
                .iter()
                .filter(|file| Path::new(file).extension().is_some_and(|e| e == *ext))
                .cloned()
                .collect();
            if matching.is_empty() {
                return None;
            }
            Some(AssetBundle {
                name: format!("{}_{}", theme.identifier(), ext),
                theme: theme.identifier().to_string(),
                extension: ext.to_string(),
                files: matching,
            })
        })
        .collect()
}

fn walk_static_dir(fs: &dyn ThemeFs, root: &Path, dir: &Path, files: &mut Vec<String>) {
    let entries = match fs.read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    for path in entries {
        if fs.is_dir(&path) {
            if fs.is_symlink(&path) {
                tracing::debug!("Not following symlinked directory {:?}", path);
                continue;
            }
            walk_static_dir(fs, root, &path, files);
        } else if let Ok(relative) = path.strip_prefix(root) {
            let segments: Vec<_> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            files.push(segments.join("/"));
        }
    }
}
