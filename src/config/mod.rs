//! User settings: the optional TOML file and how it combines with the
//! command line.
//!
//! Precedence is command line, then settings file, then built-in default.
pub mod toml_loader;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::plan::DEFAULT_DIR_MODE;

/// Destination used when neither the command line nor the settings file
/// names one: the parent of the working directory.
pub const DEFAULT_DEST: &str = "..";

/// Contents of the settings file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    /// Destination root.
    pub dest: Option<PathBuf>,
    /// Octal permission bits for created directories.
    pub dir_mode: Option<String>,
    /// Link leaf files instead of whole directories.
    pub deep_link: Option<bool>,
}

/// Settings after applying precedence and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Destination root.
    pub dest: PathBuf,
    /// Permission bits for created directories.
    pub dir_mode: u32,
    /// Link leaf files instead of whole directories.
    pub deep_link: bool,
}

impl Settings {
    /// Load settings from `path`; a missing file yields empty settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// contains unknown keys.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        toml_loader::load_config(path)
    }

    /// Combine with command-line values, which win when present.
    ///
    /// `deep_link` from the command line is a plain flag, so it can only turn
    /// deep linking on.
    #[must_use]
    pub fn resolve(
        &self,
        dest: Option<&Path>,
        dir_mode: Option<&str>,
        deep_link: bool,
    ) -> Resolved {
        let dest = dest
            .map(Path::to_path_buf)
            .or_else(|| self.dest.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DEST));
        let dir_mode = dir_mode
            .or(self.dir_mode.as_deref())
            .map_or(DEFAULT_DIR_MODE, parse_dir_mode);
        Resolved {
            dest,
            dir_mode,
            deep_link: deep_link || self.deep_link.unwrap_or(false),
        }
    }
}

/// Default settings file: `$XDG_CONFIG_HOME/away/config.toml`, falling back
/// to `~/.config/away/config.toml`.
#[must_use]
pub fn default_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME").map_or_else(
        |_| {
            std::env::var("HOME")
                .or_else(|_| std::env::var("USERPROFILE"))
                .map_or_else(|_| PathBuf::from("."), PathBuf::from)
                .join(".config")
        },
        PathBuf::from,
    );
    config_dir.join("away").join("config.toml")
}

/// Parse octal permission bits such as `"0755"` or `"0o700"`.
///
/// Anything unparsable or wider than `0o7777` falls back to
/// [`DEFAULT_DIR_MODE`].
#[must_use]
pub fn parse_dir_mode(mode: &str) -> u32 {
    let digits = mode.trim();
    let digits = digits
        .strip_prefix("0o")
        .or_else(|| digits.strip_prefix("0O"))
        .unwrap_or(digits);
    u32::from_str_radix(digits, 8)
        .ok()
        .filter(|&bits| bits <= 0o7777)
        .unwrap_or(DEFAULT_DIR_MODE)
}
