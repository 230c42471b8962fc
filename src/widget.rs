//! Widget HTML asset served as an MCP resource by the widget server.
//!
//! The asset is read once at startup. A missing assets directory or widget
//! file is a fatal startup error; nothing is re-read afterwards.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Resource URI (and template) under which the widget is advertised
pub const WIDGET_URI: &str = "ui://widget/next-best-step.html";

/// MIME type ChatGPT expects for widget templates
pub const WIDGET_MIME_TYPE: &str = "text/html+skybridge";

pub const WIDGET_NAME: &str = "next-best-step-widget";

/// Preferred file name inside the assets directory
pub const WIDGET_FILE: &str = "next-best-step.html";

/// Versioned builds look like `next-best-step-<version>.html`
const VERSIONED_PREFIX: &str = "next-best-step-";
const VERSIONED_SUFFIX: &str = ".html";

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("Widget assets directory not found: {0} (build the widget or set ASSETS_DIR)")]
    AssetsDirMissing(PathBuf),
    #[error("No widget HTML found in {0}: expected next-best-step.html or next-best-step-*.html")]
    WidgetNotFound(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Cached widget HTML
#[derive(Debug, Clone)]
pub struct WidgetAsset {
    html: String,
}

impl WidgetAsset {
    /// Locate and read the widget HTML from `assets_dir`
    pub fn load(assets_dir: &Path) -> Result<Self, WidgetError> {
        if !assets_dir.is_dir() {
            return Err(WidgetError::AssetsDirMissing(assets_dir.to_path_buf()));
        }

        let path = locate_widget(assets_dir)?;
        let html = std::fs::read_to_string(&path).map_err(|source| WidgetError::Io {
            path: path.clone(),
            source,
        })?;

        info!("Loaded widget asset {:?} ({} bytes)", path, html.len());
        Ok(Self { html })
    }

    pub fn from_html(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

/// Exact file name first, else the lexicographically-last versioned file
fn locate_widget(assets_dir: &Path) -> Result<PathBuf, WidgetError> {
    let exact = assets_dir.join(WIDGET_FILE);
    if exact.is_file() {
        return Ok(exact);
    }

    let entries = std::fs::read_dir(assets_dir).map_err(|source| WidgetError::Io {
        path: assets_dir.to_path_buf(),
        source,
    })?;

    let mut candidates: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(VERSIONED_PREFIX) && name.ends_with(VERSIONED_SUFFIX))
        .collect();
    candidates.sort();

    candidates
        .pop()
        .map(|name| assets_dir.join(name))
        .ok_or_else(|| WidgetError::WidgetNotFound(assets_dir.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prefers_exact_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(WIDGET_FILE), "<div>exact</div>").unwrap();
        std::fs::write(dir.path().join("next-best-step-9.9.9.html"), "<div>v9</div>").unwrap();

        let asset = WidgetAsset::load(dir.path()).unwrap();
        assert_eq!(asset.html(), "<div>exact</div>");
    }

    #[test]
    fn test_falls_back_to_last_versioned_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("next-best-step-1a2b.html"), "old").unwrap();
        std::fs::write(dir.path().join("next-best-step-3c4d.html"), "new").unwrap();
        std::fs::write(dir.path().join("other-widget-9.html"), "ignored").unwrap();

        let asset = WidgetAsset::load(dir.path()).unwrap();
        assert_eq!(asset.html(), "new");
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = WidgetAsset::load(&missing).unwrap_err();
        assert!(matches!(err, WidgetError::AssetsDirMissing(_)));
    }

    #[test]
    fn test_missing_widget_file_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "unrelated").unwrap();
        let err = WidgetAsset::load(dir.path()).unwrap_err();
        assert!(matches!(err, WidgetError::WidgetNotFound(_)));
        assert!(err.to_string().contains(WIDGET_FILE));
    }
}
