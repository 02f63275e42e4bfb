use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local};

use super::console::{Console, StdConsole};
use super::dispatch::{Dispatcher, IntoLogArgs};
use super::severity::{ConsoleStyle, Severity};
use crate::configs::LoggrOptions;
use crate::utils::clock::{Clock, SystemClock};

/// # Loggr
///
/// The public face of the logger. Each severity has its own entry point; all of
/// them accept the positional form `(destination_or_payload, payload?, format?)`
/// through [`IntoLogArgs`]:
///
/// ```no_run
/// # async fn demo(loggr: &lib_loggr::Loggr) {
/// use serde_json::json;
/// loggr.log("hello").await;                       // event.log
/// loggr.err("disk full").await;                   // event.log + error.log
/// loggr.info((json!({"a": 1}), "json")).await;    // Info: {"a":1}
/// loggr.log(("warning", "routed", "pretty")).await;
/// # }
/// ```
///
/// Every call returns `false` only for usage errors (bad format token,
/// missing payload), which are reported on the console and written nowhere.
pub struct Loggr {
    engine: Dispatcher,
}

impl Loggr {
    /// # Start
    ///
    /// Creates a logger on the system clock and the standard console, opens
    /// today's directory under `options.root`, applies configured colors and
    /// registers configured custom severities.
    ///
    /// Start-up failures are reported on the console; the logger still comes
    /// up and retries on the next call.
    pub async fn start(options: LoggrOptions) -> Self {
        Self::start_with(options, Arc::new(SystemClock::new()), Arc::new(StdConsole)).await
    }

    /// Same as [`Loggr::start`] with an explicit clock and console.
    pub async fn start_with(
        options: LoggrOptions,
        clock: Arc<dyn Clock>,
        console: Arc<dyn Console>,
    ) -> Self {
        let engine = Dispatcher::new(&options, clock, console);

        for (name, spec) in &options.colors {
            let (foreground, background) = spec.parts();
            match ConsoleStyle::parse(foreground, background) {
                Some(style) => engine.recolor(name, style),
                None => log::warn!("Ignoring unknown colors for {}: {:?}", name, spec),
            }
        }

        if engine.initialize().await {
            log::info!("Logging under {}", options.root.display());
        }

        for name in &options.custom {
            engine.register(name).await;
        }

        Self { engine }
    }

    /// Unprefixed, uncolored line to the event sink (or the named destination).
    pub async fn log(&self, args: impl IntoLogArgs) -> bool {
        self.engine.dispatch(None, args.into_log_args()).await
    }

    /// `Alert: ` line, also written to `alert.log`.
    pub async fn alert(&self, args: impl IntoLogArgs) -> bool {
        self.engine.dispatch(Some(Severity::Alert), args.into_log_args()).await
    }

    /// `Critical: ` line, also written to `critical.log`.
    pub async fn crit(&self, args: impl IntoLogArgs) -> bool {
        self.engine.dispatch(Some(Severity::Critical), args.into_log_args()).await
    }

    /// `Debug: ` line, also written to `debug.log`.
    pub async fn debug(&self, args: impl IntoLogArgs) -> bool {
        self.engine.dispatch(Some(Severity::Debug), args.into_log_args()).await
    }

    /// `Emergency: ` line, also written to `emergency.log`.
    pub async fn emerg(&self, args: impl IntoLogArgs) -> bool {
        self.engine.dispatch(Some(Severity::Emergency), args.into_log_args()).await
    }

    /// `Error: ` line, also written to `error.log`.
    pub async fn err(&self, args: impl IntoLogArgs) -> bool {
        self.engine.dispatch(Some(Severity::Error), args.into_log_args()).await
    }

    /// `Info: ` line, also written to `info.log`.
    pub async fn info(&self, args: impl IntoLogArgs) -> bool {
        self.engine.dispatch(Some(Severity::Info), args.into_log_args()).await
    }

    /// `Notice: ` line, also written to `notice.log`.
    pub async fn notice(&self, args: impl IntoLogArgs) -> bool {
        self.engine.dispatch(Some(Severity::Notice), args.into_log_args()).await
    }

    /// `Warning: ` line, also written to `warning.log`.
    pub async fn warning(&self, args: impl IntoLogArgs) -> bool {
        self.engine.dispatch(Some(Severity::Warning), args.into_log_args()).await
    }

    /// Logs under a severity given by name, built-in or custom. A custom name
    /// that was never created logs unprefixed to the event sink.
    pub async fn custom(&self, name: &str, args: impl IntoLogArgs) -> bool {
        self.engine
            .dispatch(Some(Severity::from_name(name)), args.into_log_args())
            .await
    }

    /// Registers a custom severity and opens `<name>.log` right away.
    /// Repeating the call for the same name opens nothing new.
    pub async fn create(&self, name: &str) -> bool {
        self.engine.register(name).await
    }

    /// Per-severity recoloring: `loggr.recolor().err(Color::Magenta)`.
    pub fn recolor(&self) -> Recolor<'_> {
        Recolor {
            engine: &self.engine,
        }
    }

    /// Recolors a severity given by name. Unknown names are ignored.
    pub fn recolor_by_name(&self, name: &str, style: impl Into<ConsoleStyle>) {
        self.engine.recolor(name, style.into());
    }

    /// Style currently bound to a severity.
    pub fn style_of(&self, name: &str) -> Option<ConsoleStyle> {
        self.engine.style_of(name)
    }

    /// Day directory the installed sinks live in.
    pub fn current_dir(&self) -> Option<PathBuf> {
        self.engine.sink_set().dir().map(PathBuf::from)
    }

    /// Moment at which the next call rotates.
    pub fn rotation_boundary(&self) -> Option<DateTime<Local>> {
        self.engine.rotation_state().boundary()
    }

    /// Every sink name a call may route to.
    pub fn known_sinks(&self) -> Vec<String> {
        self.engine.known_sinks()
    }

    /// Names of the sinks currently open.
    pub fn open_sinks(&self) -> Vec<String> {
        self.engine.sink_set().names()
    }
}

/// Recoloring handle returned by [`Loggr::recolor`].
pub struct Recolor<'a> {
    engine: &'a Dispatcher,
}

impl Recolor<'_> {
    fn apply(&self, name: &str, style: impl Into<ConsoleStyle>) -> &Self {
        self.engine.recolor(name, style.into());
        self
    }

    /// Recolors `alert`.
    pub fn alert(&self, style: impl Into<ConsoleStyle>) -> &Self {
        self.apply("alert", style)
    }

    /// Recolors `critical`.
    pub fn crit(&self, style: impl Into<ConsoleStyle>) -> &Self {
        self.apply("critical", style)
    }

    /// Recolors `debug`.
    pub fn debug(&self, style: impl Into<ConsoleStyle>) -> &Self {
        self.apply("debug", style)
    }

    /// Recolors `emergency`.
    pub fn emerg(&self, style: impl Into<ConsoleStyle>) -> &Self {
        self.apply("emergency", style)
    }

    /// Recolors `error`.
    pub fn err(&self, style: impl Into<ConsoleStyle>) -> &Self {
        self.apply("error", style)
    }

    /// Recolors `info`.
    pub fn info(&self, style: impl Into<ConsoleStyle>) -> &Self {
        self.apply("info", style)
    }

    /// Recolors `notice`.
    pub fn notice(&self, style: impl Into<ConsoleStyle>) -> &Self {
        self.apply("notice", style)
    }

    /// Recolors `warning`.
    pub fn warning(&self, style: impl Into<ConsoleStyle>) -> &Self {
        self.apply("warning", style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loggers::console::CapturedConsole;
    use crate::utils::clock::ManualClock;
    use chrono::TimeZone;
    use colored::Color;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    async fn started(root: &std::path::Path) -> (Loggr, Arc<CapturedConsole>) {
        colored::control::set_override(true);
        let clock = Arc::new(ManualClock::new(
            Local.with_ymd_and_hms(2024, 7, 4, 15, 30, 0).unwrap(),
        ));
        let console = Arc::new(CapturedConsole::new());
        let loggr = Loggr::start_with(LoggrOptions::with_root(root), clock, console.clone()).await;
        (loggr, console)
    }

    #[tokio::test]
    async fn test_start_opens_todays_sinks() {
        let root = tempdir().unwrap();
        let (loggr, console) = started(root.path()).await;
        let dir = loggr.current_dir().unwrap();
        assert_eq!(dir, root.path().join("2024").join("07").join("04"));
        assert_eq!(loggr.open_sinks(), loggr.known_sinks());
        assert_eq!(
            loggr.rotation_boundary(),
            Some(Local.with_ymd_and_hms(2024, 7, 5, 0, 0, 0).unwrap())
        );
        assert!(console.errors().is_empty());
    }

    #[tokio::test]
    async fn test_err_writes_event_and_error() {
        let root = tempdir().unwrap();
        let (loggr, console) = started(root.path()).await;
        assert!(loggr.err("disk full").await);

        let dir = loggr.current_dir().unwrap();
        let expected = "[07/04/2024 @ 03:30:00:000 PM] - Error: disk full\n";
        assert_eq!(fs::read_to_string(dir.join("event.log")).unwrap(), expected);
        assert_eq!(fs::read_to_string(dir.join("error.log")).unwrap(), expected);
        assert_eq!(fs::read_to_string(dir.join("info.log")).unwrap(), "");
        assert_eq!(
            console.lines(),
            vec!["[07/04/2024 @ 03:30:00:000 PM] - \x1b[91mError: \x1b[0mdisk full"]
        );
    }

    #[tokio::test]
    async fn test_recolor_handle_changes_console_only() {
        let root = tempdir().unwrap();
        let (loggr, console) = started(root.path()).await;
        loggr.recolor().info(Color::Magenta).warning(ConsoleStyle::plain());
        loggr.recolor_by_name("bogus", Color::Red);
        assert_eq!(loggr.style_of("info"), Some(ConsoleStyle::fg(Color::Magenta)));

        assert!(loggr.info("up").await);
        assert!(loggr.warning("careful").await);
        let lines = console.lines();
        assert!(lines[0].ends_with("\x1b[35mInfo: \x1b[0mup"));
        assert!(lines[1].ends_with("] - Warning: careful"));
        let dir = loggr.current_dir().unwrap();
        assert!(fs::read_to_string(dir.join("info.log")).unwrap().ends_with("] - Info: up\n"));
    }

    #[tokio::test]
    async fn test_custom_severity_logging() {
        let root = tempdir().unwrap();
        let (loggr, _console) = started(root.path()).await;
        assert!(loggr.create("audit").await);
        assert!(loggr.custom("audit", json!({"user": "ana"})).await);
        assert!(loggr.custom("never-created", "plain").await);

        let dir = loggr.current_dir().unwrap();
        let audit = fs::read_to_string(dir.join("audit.log")).unwrap();
        assert!(audit.ends_with("] - Audit: {\"user\":\"ana\"}\n"));
        let event = fs::read_to_string(dir.join("event.log")).unwrap();
        assert_eq!(event.lines().count(), 2);
        assert!(event.ends_with("] - plain\n"));
    }

    #[tokio::test]
    async fn test_console_mirror_can_be_disabled() {
        let root = tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(Local::now()));
        let console = Arc::new(CapturedConsole::new());
        let options = LoggrOptions {
            console: false,
            ..LoggrOptions::with_root(root.path())
        };
        let loggr = Loggr::start_with(options, clock, console.clone()).await;
        assert!(loggr.info("quiet").await);
        assert!(!loggr.info(("quiet", "bogus")).await);
        assert!(console.lines().is_empty());
        assert_eq!(console.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_options_apply_colors_and_custom() {
        let root = tempdir().unwrap();
        let options = crate::configs::config_loggr::parse_options(&format!(
            r#"{{ root: {:?}, colors: {{ error: "magenta", info: "no-such-color" }}, custom: ["audit"] }}"#,
            root.path().display().to_string()
        ))
        .unwrap();
        let clock = Arc::new(ManualClock::new(Local::now()));
        let loggr = Loggr::start_with(options, clock, Arc::new(CapturedConsole::new())).await;
        assert_eq!(loggr.style_of("error"), Some(ConsoleStyle::fg(Color::Magenta)));
        assert_eq!(loggr.style_of("info"), Some(ConsoleStyle::fg(Color::BrightGreen)));
        assert!(loggr.open_sinks().contains(&"audit".to_string()));
    }
}
