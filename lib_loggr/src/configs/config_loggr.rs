//! # Logger Configuration
//!
//! `LoggrOptions` describes where daily log directories live and how the console
//! mirror behaves. Options can be built in code or loaded from a JSON / JSON5
//! file. The library itself never reads environment variables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils::process::default_log_root;

/// Errors raised while loading options from disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The options file could not be read.
    #[error("Failed to read options file {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The options file is not valid JSON / JSON5 for `LoggrOptions`.
    #[error("Failed to parse options file {path}: {message}")]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
}

/// # Style Spec
///
/// Color names as written in an options file. Either a bare foreground name
/// (`"red"`) or a record with optional foreground and background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleSpec {
    /// Foreground only.
    Foreground(String),
    /// Foreground and/or background.
    Full {
        /// Foreground color name.
        #[serde(default)]
        foreground: Option<String>,
        /// Background color name.
        #[serde(default)]
        background: Option<String>,
    },
}

impl StyleSpec {
    /// Returns the `(foreground, background)` names of this spec.
    pub fn parts(&self) -> (Option<&str>, Option<&str>) {
        match self {
            StyleSpec::Foreground(fg) => (Some(fg.as_str()), None),
            StyleSpec::Full {
                foreground,
                background,
            } => (foreground.as_deref(), background.as_deref()),
        }
    }
}

/// # Loggr Options
///
/// Configuration for a `Loggr` instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggrOptions {
    /// Root under which `YYYY/MM/DD/<name>.log` directories are created.
    pub root: PathBuf,
    /// Mirror every log line to the console. Error reports are printed regardless.
    pub console: bool,
    /// Start-up recolors keyed by severity name. Unknown names are ignored.
    pub colors: BTreeMap<String, StyleSpec>,
    /// Custom severities registered during start-up.
    pub custom: Vec<String>,
}

impl Default for LoggrOptions {
    /// Defaults: `<executable dir>/logs`, console mirroring on, built-in colors, no custom severities.
    fn default() -> Self {
        Self {
            root: default_log_root(),
            console: true,
            colors: BTreeMap::new(),
            custom: Vec::new(),
        }
    }
}

impl LoggrOptions {
    /// Default options rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

impl fmt::Display for LoggrOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LoggrOptions
    Root: {},
    Console: {},
    Colors: {:?},
    Custom: {:?}
",
            self.root.display(),
            self.console,
            self.colors,
            self.custom
        )
    }
}

/// # Load Options
///
/// Reads `LoggrOptions` from a JSON or JSON5 file. Missing fields take their
/// defaults.
///
/// # Arguments
/// * `path` - The options file to read.
pub fn load_options(path: &Path) -> Result<LoggrOptions, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_options(&content).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Parses `LoggrOptions` from JSON / JSON5 text.
pub fn parse_options(content: &str) -> Result<LoggrOptions, String> {
    serde_json5::from_str::<LoggrOptions>(content).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_options_json5_with_comments() {
        let text = r#"{
            // daily directories go here
            root: "/var/log/app",
            console: false,
            colors: {
                error: "magenta",
                info: { foreground: "black", background: "green" },
            },
            custom: ["audit"],
        }"#;
        let options = parse_options(text).unwrap();
        assert_eq!(options.root, PathBuf::from("/var/log/app"));
        assert!(!options.console);
        assert_eq!(
            options.colors.get("error"),
            Some(&StyleSpec::Foreground("magenta".to_string()))
        );
        assert_eq!(
            options.colors.get("info").map(StyleSpec::parts),
            Some((Some("black"), Some("green")))
        );
        assert_eq!(options.custom, vec!["audit".to_string()]);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let options = parse_options(r#"{ "root": "logs" }"#).unwrap();
        assert_eq!(options.root, PathBuf::from("logs"));
        assert!(options.console);
        assert!(options.colors.is_empty());
        assert!(options.custom.is_empty());
    }

    #[test]
    fn test_load_options_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_options(&dir.path().join("absent.json5")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_options_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{{ root: ").unwrap();
        let err = load_options(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
