//! # Severity Registry
//!
//! The fixed set of built-in severities, their console styles and the file
//! each one writes to, plus any custom severities registered at runtime.
//!
//! Nine bindings exist at boot: the unprefixed `default` binding (which writes
//! to `event.log`) and the eight named severities. Only the eight named ones
//! can be recolored. Target file names never change once registered.

use colored::{Color, Colorize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Name of the combined sink every event is written to.
pub const EVENT_SINK: &str = "event";

/// Name of the unprefixed binding used by plain `log` calls.
pub const DEFAULT_SEVERITY: &str = "default";

/// Severities whose console style may be replaced at runtime.
pub const RECOLORABLE: [&str; 8] = [
    "alert",
    "critical",
    "debug",
    "emergency",
    "error",
    "info",
    "notice",
    "warning",
];

/// A log severity. Built-ins have fixed names; custom ones carry their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Action must be taken immediately.
    Alert,
    /// Critical conditions.
    Critical,
    /// Debug-level messages.
    Debug,
    /// The system is unusable.
    Emergency,
    /// Error conditions.
    Error,
    /// Informational messages.
    Info,
    /// Normal but significant conditions.
    Notice,
    /// Warning conditions.
    Warning,
    /// A severity registered at runtime.
    Custom(String),
}

impl Severity {
    /// Registry / file name of the severity.
    pub fn name(&self) -> &str {
        match self {
            Severity::Alert => "alert",
            Severity::Critical => "critical",
            Severity::Debug => "debug",
            Severity::Emergency => "emergency",
            Severity::Error => "error",
            Severity::Info => "info",
            Severity::Notice => "notice",
            Severity::Warning => "warning",
            Severity::Custom(name) => name,
        }
    }

    /// Maps a name back to a severity. Anything that is not built-in is custom.
    pub fn from_name(name: &str) -> Self {
        match name {
            "alert" => Severity::Alert,
            "critical" => Severity::Critical,
            "debug" => Severity::Debug,
            "emergency" => Severity::Emergency,
            "error" => Severity::Error,
            "info" => Severity::Info,
            "notice" => Severity::Notice,
            "warning" => Severity::Warning,
            other => Severity::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// # Console Style
///
/// Foreground and background applied around a severity prefix on the console.
/// Painting goes through `colored`, so it honors `NO_COLOR`, `CLICOLOR` and
/// `colored::control::set_override`. A style with neither color paints nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConsoleStyle {
    /// Text color.
    pub foreground: Option<Color>,
    /// Background color.
    pub background: Option<Color>,
}

impl ConsoleStyle {
    /// A style that emits no escape codes.
    pub const fn plain() -> Self {
        Self {
            foreground: None,
            background: None,
        }
    }

    /// A foreground-only style.
    pub const fn fg(color: Color) -> Self {
        Self {
            foreground: Some(color),
            background: None,
        }
    }

    /// Returns this style with `color` as background.
    pub const fn on(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Parses color names (`"red"`, `"bright blue"`, ...). Returns `None` when
    /// a given name is not a known color.
    pub fn parse(foreground: Option<&str>, background: Option<&str>) -> Option<Self> {
        let foreground = match foreground {
            Some(name) => Some(Color::from_str(name).ok()?),
            None => None,
        };
        let background = match background {
            Some(name) => Some(Color::from_str(name).ok()?),
            None => None,
        };
        Some(Self {
            foreground,
            background,
        })
    }

    /// True when the style emits no escape codes.
    pub fn is_plain(&self) -> bool {
        self.foreground.is_none() && self.background.is_none()
    }

    /// Wraps `text` in the style's colors, followed by a reset.
    pub fn paint(&self, text: &str) -> String {
        if self.is_plain() || text.is_empty() {
            return text.to_string();
        }
        let mut painted = text.normal();
        if let Some(foreground) = self.foreground {
            painted = painted.color(foreground);
        }
        if let Some(background) = self.background {
            painted = painted.on_color(background);
        }
        painted.to_string()
    }
}

impl From<Color> for ConsoleStyle {
    fn from(color: Color) -> Self {
        ConsoleStyle::fg(color)
    }
}

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityBinding {
    /// Registry name.
    pub name: String,
    /// Text placed before the payload, without the trailing `": "`. Empty for `default`.
    pub label: String,
    /// Console style of the prefix.
    pub style: ConsoleStyle,
    /// Base name of the dedicated sink file (`<target>.log`).
    pub target: String,
}

impl SeverityBinding {
    fn new(name: &str, label: &str, style: ConsoleStyle) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            style,
            target: name.to_string(),
        }
    }

    /// Prefix written before the payload, e.g. `"Alert: "`.
    pub fn prefix(&self) -> String {
        if self.label.is_empty() {
            String::new()
        } else {
            format!("{}: ", self.label)
        }
    }
}

/// Registry of severity bindings.
#[derive(Debug, Clone)]
pub struct SeverityRegistry {
    bindings: BTreeMap<String, SeverityBinding>,
}

impl Default for SeverityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SeverityRegistry {
    /// Creates the registry with the nine built-in bindings.
    pub fn new() -> Self {
        let builtins = [
            SeverityBinding::new("alert", "Alert", ConsoleStyle::fg(Color::BrightWhite).on(Color::Red)),
            SeverityBinding::new("critical", "Critical", ConsoleStyle::fg(Color::Red).on(Color::BrightWhite)),
            SeverityBinding::new("debug", "Debug", ConsoleStyle::fg(Color::BrightBlue)),
            SeverityBinding::new(
                "emergency",
                "Emergency",
                ConsoleStyle::fg(Color::BrightWhite).on(Color::BrightRed),
            ),
            SeverityBinding::new("error", "Error", ConsoleStyle::fg(Color::BrightRed)),
            SeverityBinding::new("info", "Info", ConsoleStyle::fg(Color::BrightGreen)),
            SeverityBinding::new("notice", "Notice", ConsoleStyle::fg(Color::BrightCyan)),
            SeverityBinding::new("warning", "Warning", ConsoleStyle::fg(Color::BrightYellow)),
            SeverityBinding {
                name: DEFAULT_SEVERITY.to_string(),
                label: String::new(),
                style: ConsoleStyle::plain(),
                target: EVENT_SINK.to_string(),
            },
        ];
        Self {
            bindings: builtins.into_iter().map(|b| (b.name.clone(), b)).collect(),
        }
    }

    /// Replaces the console style of one of the eight named built-ins.
    ///
    /// Unknown names, `default` and custom severities are ignored; the return
    /// value only reports whether anything changed.
    pub fn recolor(&mut self, name: &str, style: ConsoleStyle) -> bool {
        if !RECOLORABLE.contains(&name) {
            return false;
        }
        match self.bindings.get_mut(name) {
            Some(binding) => {
                binding.style = style;
                true
            }
            None => false,
        }
    }

    /// Adds a custom binding. Returns `false` if the name was already bound.
    pub fn register(&mut self, name: &str) -> bool {
        if self.is_sink(name) || self.bindings.contains_key(name) {
            return false;
        }
        let binding = SeverityBinding::new(name, &capitalize(name), ConsoleStyle::plain());
        self.bindings.insert(name.to_string(), binding);
        true
    }

    /// Looks up a binding by name.
    pub fn lookup(&self, name: &str) -> Option<&SeverityBinding> {
        self.bindings.get(name)
    }

    /// Binding for an optional severity; `None` resolves to `default`.
    pub fn resolve(&self, severity: Option<&Severity>) -> Option<&SeverityBinding> {
        self.lookup(severity.map_or(DEFAULT_SEVERITY, Severity::name))
    }

    /// True when `name` is the target of some binding (including `event`).
    pub fn is_sink(&self, name: &str) -> bool {
        self.bindings.values().any(|b| b.target == name)
    }

    /// Every sink file base name, sorted and deduplicated.
    pub fn sink_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.values().map(|b| b.target.clone()).collect();
        names.sort();
        names.dedup();
        names
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_bindings() {
        let registry = SeverityRegistry::new();
        assert_eq!(
            registry.sink_names(),
            vec![
                "alert", "critical", "debug", "emergency", "error", "event", "info", "notice", "warning"
            ]
        );
        assert_eq!(registry.lookup("alert").unwrap().prefix(), "Alert: ");
        assert_eq!(registry.resolve(None).unwrap().prefix(), "");
        assert_eq!(registry.resolve(None).unwrap().target, EVENT_SINK);
    }

    #[test]
    fn test_recolor_known_severity() {
        let mut registry = SeverityRegistry::new();
        let style = ConsoleStyle::fg(Color::Magenta).on(Color::Black);
        assert!(registry.recolor("error", style));
        assert_eq!(registry.lookup("error").unwrap().style, style);
        assert_eq!(registry.lookup("error").unwrap().target, "error");
    }

    #[test]
    fn test_recolor_unknown_name_is_ignored() {
        let mut registry = SeverityRegistry::new();
        let before = registry.lookup("default").unwrap().clone();
        assert!(!registry.recolor("nonsense", ConsoleStyle::fg(Color::Red)));
        assert!(!registry.recolor("default", ConsoleStyle::fg(Color::Red)));
        assert_eq!(registry.lookup("default").unwrap(), &before);
    }

    #[test]
    fn test_register_custom_once() {
        let mut registry = SeverityRegistry::new();
        assert!(registry.register("audit"));
        assert!(!registry.register("audit"));
        assert!(!registry.register("error"));
        assert!(!registry.register("event"));
        let binding = registry.lookup("audit").unwrap();
        assert_eq!(binding.prefix(), "Audit: ");
        assert!(binding.style.is_plain());
        assert_eq!(registry.sink_names().iter().filter(|n| *n == "audit").count(), 1);
    }

    #[test]
    fn test_custom_severities_cannot_be_recolored() {
        let mut registry = SeverityRegistry::new();
        registry.register("audit");
        assert!(!registry.recolor("audit", ConsoleStyle::fg(Color::Red)));
    }

    #[test]
    fn test_paint_wraps_with_codes_and_reset() {
        colored::control::set_override(true);
        let style = ConsoleStyle::fg(Color::Red).on(Color::White);
        assert_eq!(style.paint("Error: "), "\x1b[47;31mError: \x1b[0m");
        assert_eq!(ConsoleStyle::fg(Color::BrightRed).paint("Error: "), "\x1b[91mError: \x1b[0m");
        assert_eq!(ConsoleStyle::plain().paint("x"), "x");
        assert_eq!(style.paint(""), "");
    }

    #[test]
    fn test_parse_style_names() {
        let style = ConsoleStyle::parse(Some("red"), Some("white")).unwrap();
        assert_eq!(style, ConsoleStyle::fg(Color::Red).on(Color::White));
        assert!(ConsoleStyle::parse(Some("not-a-color"), None).is_none());
    }

    #[test]
    fn test_severity_names_round_trip() {
        for name in RECOLORABLE {
            assert_eq!(Severity::from_name(name).name(), name);
        }
        assert_eq!(Severity::from_name("audit"), Severity::Custom("audit".to_string()));
    }
}
