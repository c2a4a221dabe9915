//! Configuration file support for the preview server.
//!
//! Project config lives at `.mado/serve.toml`:
//!
//! ```toml
//! [serve]
//! web_dir = "assets/web"
//! required_files = ["index.html", "demo-wasm.wasm"]
//! host = "127.0.0.1"
//! port = 8000
//! ```
//!
//! Command-line flags take precedence over the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default directory served, relative to the project root.
pub const DEFAULT_WEB_DIR: &str = "assets/web";

/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8000;

/// Build artifacts expected in the web directory.
pub const DEFAULT_REQUIRED_FILES: &[&str] = &[
    "index.html",
    "demo-wasm.wasm",
    // Emscripten JS glue
    "demo-wasm.js",
    "mado-wasm.js",
];

/// Preview server configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    pub serve: ServeSettings,
}

/// Settings under `[serve]`. Unset fields fall back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeSettings {
    /// Directory to serve, relative to the project root
    pub web_dir: Option<PathBuf>,

    /// Artifact filenames checked before serving
    pub required_files: Option<Vec<String>>,

    /// Bind host
    pub host: Option<String>,

    /// Bind port
    pub port: Option<u16>,
}

impl ServeConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read serve config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse serve config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load serve config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: ServeConfig) {
        if other.serve.web_dir.is_some() {
            self.serve.web_dir = other.serve.web_dir;
        }
        if other.serve.required_files.is_some() {
            self.serve.required_files = other.serve.required_files;
        }
        if other.serve.host.is_some() {
            self.serve.host = other.serve.host;
        }
        if other.serve.port.is_some() {
            self.serve.port = other.serve.port;
        }
    }

    /// Web directory resolved against `project_root`.
    pub fn web_dir(&self, project_root: &Path) -> PathBuf {
        let dir = self
            .serve
            .web_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WEB_DIR));
        project_root.join(dir)
    }

    /// Artifact filenames expected in the web directory.
    pub fn required_files(&self) -> Vec<String> {
        self.serve.required_files.clone().unwrap_or_else(|| {
            DEFAULT_REQUIRED_FILES
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }

    pub fn host(&self) -> String {
        self.serve
            .host
            .clone()
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    pub fn port(&self) -> u16 {
        self.serve.port.unwrap_or(DEFAULT_PORT)
    }
}

/// Get the project serve config path (.mado/serve.toml).
pub fn project_serve_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".mado").join("serve.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_serve_config_default() {
        let config = ServeConfig::default();
        assert_eq!(config.port(), 8000);
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(
            config.web_dir(Path::new("/proj")),
            PathBuf::from("/proj/assets/web")
        );
        assert_eq!(config.required_files().len(), 4);
        assert!(config.required_files().contains(&"demo-wasm.wasm".to_string()));
    }

    #[test]
    fn test_serve_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("serve.toml");

        std::fs::write(
            &config_path,
            r#"
[serve]
web_dir = "build/web"
required_files = ["index.html"]
port = 9090
"#,
        )
        .unwrap();

        let config = ServeConfig::load(&config_path).unwrap();
        assert_eq!(config.port(), 9090);
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.required_files(), vec!["index.html".to_string()]);
        assert_eq!(
            config.web_dir(tmp.path()),
            tmp.path().join("build/web")
        );
    }

    #[test]
    fn test_serve_config_invalid_falls_back() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("serve.toml");
        std::fs::write(&config_path, "[serve]\nport = \"not a number\"\n").unwrap();

        assert!(ServeConfig::load(&config_path).is_err());
        let config = ServeConfig::load_or_default(&config_path);
        assert_eq!(config.port(), DEFAULT_PORT);
    }

    #[test]
    fn test_serve_config_missing_file() {
        let tmp = TempDir::new().unwrap();
        let config = ServeConfig::load_or_default(&project_serve_config_path(tmp.path()));
        assert!(config.serve.port.is_none());
    }

    #[test]
    fn test_serve_config_merge() {
        let mut base = ServeConfig::default();
        base.serve.port = Some(8080);
        base.serve.host = Some("0.0.0.0".to_string());

        let mut other = ServeConfig::default();
        other.serve.port = Some(3000);

        base.merge(other);

        assert_eq!(base.port(), 3000);
        assert_eq!(base.host(), "0.0.0.0");
    }
}
