use std::path::PathBuf;

use crate::profile::Variant;

/// Default widget assets directory, relative to the working directory
pub const DEFAULT_ASSETS_DIR: &str = "assets";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub variant: Variant,
    pub port: u16,
    pub assets_dir: PathBuf,
    pub log_json: bool,
}

impl Config {
    /// Defaults for the variant
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            port: variant.default_port(),
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            log_json: false,
        }
    }

    /// Load from `PORT`, `ASSETS_DIR` and `LOG_FORMAT`
    pub fn from_env(variant: Variant) -> Self {
        Self::from_lookup(variant, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(variant: Variant, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new(variant);
        config.port = parse_port(lookup("PORT").as_deref(), config.port);
        if let Some(dir) = lookup("ASSETS_DIR").filter(|d| !d.trim().is_empty()) {
            config.assets_dir = PathBuf::from(dir);
        }
        config.log_json = lookup("LOG_FORMAT")
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        config
    }
}

/// Parse a port, falling back to `default` when unset or not a number
pub fn parse_port(raw: Option<&str>, default: u16) -> u16 {
    raw.and_then(|r| r.trim().parse().ok()).unwrap_or(default)
}
