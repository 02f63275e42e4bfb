//! # Dispatch Engine
//!
//! Turns one log call into rendered lines and writes them everywhere they
//! belong: the console, the combined `event` sink, an explicit destination
//! sink and the severity's own sink.
//!
//! ## Per-call flow
//!
//! 1.  Read the clock and check the day boundary. If it has passed and no
//!     rotation is running, this call rotates first (see below).
//! 2.  Resolve the positional arguments: a leading string that names a known
//!     sink is a destination and the rest shift down; anything else is the
//!     payload.
//! 3.  Validate the format token and the presence of a payload. Violations are
//!     reported on the console only and the call returns `false`.
//! 4.  Render the payload (plain, compact JSON or 2-space pretty JSON), prefix
//!     it with the severity label, and emit one console line and one file line
//!     sharing a single timestamp.
//!
//! ## Rotation
//!
//! The engine is a two-state machine, `Idle` and `RotationInFlight`. The call
//! that finds the clock at or past the boundary flips the latch, builds the
//! new day's sinks, installs them with the next boundary, and then replays
//! itself exactly once with a fresh timestamp. Calls that arrive while the
//! latch is set are not queued; they write to the set that is still installed.
//! A failed rotation keeps the old set and the old boundary, so the next call
//! tries again. The latch is released by a guard, so a rotating call that is
//! dropped halfway leaves the engine `Idle` and the next call rotates.

use chrono::{DateTime, Local, TimeDelta, TimeZone};
use futures_util::future::join_all;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::console::Console;
use super::error::LoggrError;
use super::severity::{ConsoleStyle, Severity, SeverityRegistry, EVENT_SINK};
use super::sinks::{SinkDirectoryManager, SinkSet};
use crate::configs::LoggrOptions;
use crate::utils::clock::Clock;
use crate::utils::timestamp::format_timestamp;

/// How a payload is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Strings as-is, other values as compact JSON.
    #[default]
    Plain,
    /// Compact JSON.
    Json,
    /// JSON indented by two spaces.
    Pretty,
}

impl Format {
    /// Validates a format token. Omitted (or `null`) means plain; the only
    /// other accepted tokens are `"json"` and `"pretty"`.
    pub fn parse(token: Option<&Value>) -> Result<Self, LoggrError> {
        match token {
            None | Some(Value::Null) => Ok(Format::Plain),
            Some(Value::String(s)) if s == "json" => Ok(Format::Json),
            Some(Value::String(s)) if s == "pretty" => Ok(Format::Pretty),
            Some(Value::String(s)) => Err(LoggrError::InvalidFormat(s.clone())),
            Some(other) => Err(LoggrError::InvalidFormat(other.to_string())),
        }
    }

    /// Encodes `payload`. Object keys come out in sorted order, so the output
    /// is deterministic for any input.
    pub fn render(self, payload: &Value) -> Result<String, LoggrError> {
        Ok(match (self, payload) {
            (Format::Plain, Value::String(s)) => s.clone(),
            (Format::Plain, other) | (Format::Json, other) => serde_json::to_string(other)?,
            (Format::Pretty, other) => serde_json::to_string_pretty(other)?,
        })
    }
}

/// # Log Args
///
/// Up to three positional arguments: `(destination_or_payload, payload?, format?)`.
/// A missing first slot means there is nothing to log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogArgs {
    /// Destination sink name or the payload itself.
    pub first: Option<Value>,
    /// Payload when `first` was a destination, otherwise the format token.
    pub second: Option<Value>,
    /// Format token when `first` was a destination.
    pub third: Option<Value>,
}

impl LogArgs {
    /// No arguments at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills the next free slot. Arguments past the third are dropped.
    pub fn push(mut self, value: impl Into<Value>) -> Self {
        let value = Some(value.into());
        if self.first.is_none() {
            self.first = value;
        } else if self.second.is_none() {
            self.second = value;
        } else if self.third.is_none() {
            self.third = value;
        }
        self
    }
}

/// Conversion into positional log arguments.
///
/// Implemented for single values (`"text"`, `json!(..)`), tuples of up to
/// three values, `Option` (where `None` is a missing payload) and `()`.
pub trait IntoLogArgs {
    /// Performs the conversion.
    fn into_log_args(self) -> LogArgs;
}

impl IntoLogArgs for LogArgs {
    fn into_log_args(self) -> LogArgs {
        self
    }
}

impl IntoLogArgs for () {
    fn into_log_args(self) -> LogArgs {
        LogArgs::new()
    }
}

impl IntoLogArgs for Value {
    fn into_log_args(self) -> LogArgs {
        LogArgs::new().push(self)
    }
}

impl IntoLogArgs for &str {
    fn into_log_args(self) -> LogArgs {
        LogArgs::new().push(self)
    }
}

impl IntoLogArgs for String {
    fn into_log_args(self) -> LogArgs {
        LogArgs::new().push(self)
    }
}

impl<T: Into<Value>> IntoLogArgs for Option<T> {
    fn into_log_args(self) -> LogArgs {
        LogArgs {
            first: self.map(Into::into),
            ..LogArgs::default()
        }
    }
}

impl<A: Into<Value>> IntoLogArgs for (A,) {
    fn into_log_args(self) -> LogArgs {
        LogArgs::new().push(self.0)
    }
}

impl<A: Into<Value>, B: Into<Value>> IntoLogArgs for (A, B) {
    fn into_log_args(self) -> LogArgs {
        LogArgs::new().push(self.0).push(self.1)
    }
}

impl<A: Into<Value>, B: Into<Value>, C: Into<Value>> IntoLogArgs for (A, B, C) {
    fn into_log_args(self) -> LogArgs {
        LogArgs::new().push(self.0).push(self.1).push(self.2)
    }
}

/// The first positional argument after resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// It named a known sink.
    Destination(String),
    /// It is the payload.
    Payload(Value),
}

/// A validated call, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    /// Value to log.
    pub payload: Value,
    /// Encoding of the payload.
    pub format: Format,
    /// Severity tag, `None` for plain `log` calls.
    pub severity: Option<Severity>,
    /// Explicit destination sink, if the call named one.
    pub destination: Option<String>,
}

impl LogEvent {
    /// # Resolve
    ///
    /// Applies the positional rules to `args`. `is_sink` decides whether a
    /// leading string is a destination.
    pub fn resolve(
        severity: Option<Severity>,
        args: LogArgs,
        is_sink: impl Fn(&str) -> bool,
    ) -> Result<Self, LoggrError> {
        let target = match args.first {
            Some(Value::String(name)) if is_sink(&name) => Some(Target::Destination(name)),
            Some(value) => Some(Target::Payload(value)),
            None => None,
        };

        let (destination, payload, format) = match target {
            Some(Target::Destination(name)) => (Some(name), args.second, args.third),
            Some(Target::Payload(value)) => (None, Some(value), args.second),
            None => (None, None, args.second),
        };

        let format = Format::parse(format.as_ref())?;
        let payload = payload.ok_or(LoggrError::MissingPayload)?;
        Ok(Self {
            payload,
            format,
            severity,
            destination,
        })
    }
}

/// A rendered event: the console line and the file line share one timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLines {
    /// Console line, prefix wrapped in the severity style.
    pub console: String,
    /// File line, uncolored, newline terminated.
    pub file: String,
}

impl RenderedLines {
    /// Builds both lines from their parts.
    pub fn compose(timestamp: &str, prefix: &str, style: &ConsoleStyle, body: &str) -> Self {
        Self {
            console: format!("[{}] - {}{}", timestamp, style.paint(prefix), body),
            file: format!("[{}] - {}{}\n", timestamp, prefix, body),
        }
    }
}

/// Latch decision for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationStep {
    /// Write against the installed sinks.
    Proceed,
    /// This call owns the rotation and replays afterwards.
    Rotate,
}

/// # Rotation State
///
/// The day boundary and the single-slot latch. `None` as boundary means the
/// logger has never started successfully, so any call may rotate.
#[derive(Debug, Clone, Default)]
pub struct RotationState {
    boundary: Option<DateTime<Local>>,
    in_flight: bool,
}

impl RotationState {
    /// `Idle -> RotationInFlight` when `now` is at or past the boundary and no
    /// rotation is running.
    pub fn begin(&mut self, now: DateTime<Local>) -> RotationStep {
        if self.in_flight {
            return RotationStep::Proceed;
        }
        if self.boundary.is_some_and(|boundary| now < boundary) {
            return RotationStep::Proceed;
        }
        self.in_flight = true;
        RotationStep::Rotate
    }

    /// Back to `Idle`. A successful rotation passes the new boundary; a
    /// failed one passes `None` and keeps the old boundary.
    pub fn finish(&mut self, boundary: Option<DateTime<Local>>) {
        if boundary.is_some() {
            self.boundary = boundary;
        }
        self.in_flight = false;
    }

    /// Next rotation moment, if the logger ever started.
    pub fn boundary(&self) -> Option<DateTime<Local>> {
        self.boundary
    }

    /// True while a rotation is running.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

/// Releases the rotation latch when dropped. `boundary` stays `None` unless
/// the new set was installed.
struct RotationGuard<'a> {
    state: &'a Mutex<RotationState>,
    boundary: Option<DateTime<Local>>,
}

impl<'a> RotationGuard<'a> {
    fn new(state: &'a Mutex<RotationState>) -> Self {
        Self {
            state,
            boundary: None,
        }
    }
}

impl Drop for RotationGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finish(self.boundary.take());
    }
}

/// First local midnight strictly after `after`.
pub fn next_midnight(after: DateTime<Local>) -> DateTime<Local> {
    next_midnight_in(after)
}

/// First midnight strictly after `after` in its own zone. Where a DST jump
/// skips midnight, the first quarter hour of the new day that exists.
pub fn next_midnight_in<Tz: TimeZone>(after: DateTime<Tz>) -> DateTime<Tz> {
    let zone = after.timezone();
    after
        .date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|midnight| {
            (0..=24 * 4).find_map(|quarter| {
                (midnight + TimeDelta::minutes(15 * quarter))
                    .and_local_timezone(zone.clone())
                    .earliest()
            })
        })
        .unwrap_or_else(|| after + TimeDelta::days(1))
}

/// # Dispatcher
///
/// The engine state: registry, sinks and rotation latch, plus the injected
/// clock and console. Built once by the facade and shared by reference.
pub struct Dispatcher {
    clock: Arc<dyn Clock>,
    console: Arc<dyn Console>,
    mirror_console: bool,
    registry: RwLock<SeverityRegistry>,
    sinks: SinkDirectoryManager,
    rotation: Mutex<RotationState>,
}

impl Dispatcher {
    /// Creates an engine that has not opened anything yet.
    pub fn new(options: &LoggrOptions, clock: Arc<dyn Clock>, console: Arc<dyn Console>) -> Self {
        Self {
            clock,
            console,
            mirror_console: options.console,
            registry: RwLock::new(SeverityRegistry::new()),
            sinks: SinkDirectoryManager::new(options.root.clone()),
            rotation: Mutex::new(RotationState::default()),
        }
    }

    /// Opens the first day's sinks. Returns `false` if that failed; the
    /// engine then logs to the console only and retries on the next call.
    pub async fn initialize(&self) -> bool {
        let now = self.clock.now();
        let step = self.rotation().begin(now);
        match step {
            RotationStep::Rotate => self.rotate().await,
            RotationStep::Proceed => !self.sinks.current().is_empty(),
        }
    }

    /// # Dispatch
    ///
    /// Runs one call. Returns `false` only for usage errors.
    pub async fn dispatch(&self, severity: Option<Severity>, args: LogArgs) -> bool {
        let now = self.clock.now();
        let step = self.rotation().begin(now);
        match step {
            RotationStep::Proceed => self.emit(now, severity, args).await,
            RotationStep::Rotate => {
                log::debug!("Day boundary reached at {}, rotating sinks", now);
                self.rotate().await;
                // The single replay of the triggering call, stamped now.
                let replayed_at = self.clock.now();
                self.emit(replayed_at, severity, args).await
            }
        }
    }

    async fn emit(&self, now: DateTime<Local>, severity: Option<Severity>, args: LogArgs) -> bool {
        let timestamp = format_timestamp(&now);
        let event = {
            let registry = self.registry_read();
            LogEvent::resolve(severity, args, |name| registry.is_sink(name))
        };
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                self.report(&timestamp, &e);
                return false;
            }
        };
        let body = match event.format.render(&event.payload) {
            Ok(body) => body,
            Err(e) => {
                self.report(&timestamp, &e);
                return false;
            }
        };

        let (prefix, style, severity_sink) = {
            let registry = self.registry_read();
            match registry.resolve(event.severity.as_ref()) {
                Some(binding) => (binding.prefix(), binding.style, Some(binding.target.clone())),
                None => {
                    log::debug!("Unknown severity {:?}, logging unprefixed", event.severity);
                    (String::new(), ConsoleStyle::plain(), None)
                }
            }
        };
        let lines = RenderedLines::compose(&timestamp, &prefix, &style, &body);

        if self.mirror_console {
            self.console.line(&lines.console);
        }
        let targets = sink_targets(event.destination, severity_sink);
        self.write_sinks(&self.sinks.current(), &targets, &timestamp, &lines.file)
            .await;
        true
    }

    async fn write_sinks(&self, set: &SinkSet, targets: &[String], timestamp: &str, line: &str) {
        let writes = targets.iter().filter_map(|name| match set.get(name) {
            Some(sink) => Some(async move { sink.append(line).await }),
            None => {
                log::debug!("No open sink named {}, skipping", name);
                None
            }
        });
        for result in join_all(writes).await {
            if let Err(e) = result {
                log::warn!("Sink write failed: {}", e);
                self.report(timestamp, &e);
            }
        }
    }

    /// Builds and installs the sinks for the clock's current day, then
    /// releases the latch. Returns whether the new set was installed.
    ///
    /// The boundary is the midnight after the day that was opened. If the
    /// clock crossed another midnight while opening, that boundary has already
    /// passed and the next call rotates again.
    async fn rotate(&self) -> bool {
        let mut latch = RotationGuard::new(&self.rotation);
        let started = self.clock.now();
        match self.open_day(started).await {
            Ok(set) => {
                log::info!(
                    "Opened {} sinks in {}",
                    set.len(),
                    set.dir().map(|d| d.display().to_string()).unwrap_or_default()
                );
                self.sinks.install(set);
                // Severities registered while the set was opening.
                let names = self.registry_read().sink_names();
                if let Err(e) = self.sinks.fill_missing(&names).await {
                    log::warn!("Failed to open sinks registered during rotation: {}", e);
                    self.report(&format_timestamp(&started), &e);
                }
                latch.boundary = Some(next_midnight(started));
                true
            }
            Err(e) => {
                log::warn!("Rotation failed, keeping previous sinks: {}", e);
                self.report(&format_timestamp(&started), &e);
                false
            }
        }
    }

    async fn open_day(&self, started: DateTime<Local>) -> Result<SinkSet, LoggrError> {
        let dir = self.sinks.ensure_directory(started.date_naive()).await?;
        let names = self.registry_read().sink_names();
        self.sinks.open_sinks(&dir, &names).await
    }

    /// Registers a custom severity and opens its sink. Failures are reported
    /// on the console and yield `false`.
    pub async fn register(&self, name: &str) -> bool {
        match self.sinks.register_new_severity(name, &self.registry).await {
            Ok(_) => true,
            Err(e) => {
                self.report(&format_timestamp(&self.clock.now()), &e);
                false
            }
        }
    }

    /// Replaces a built-in severity's console style. Unknown names are ignored.
    pub fn recolor(&self, name: &str, style: ConsoleStyle) {
        if !self.registry_write().recolor(name, style) {
            log::debug!("Ignoring recolor of unknown severity {}", name);
        }
    }

    /// Console style currently bound to `name`.
    pub fn style_of(&self, name: &str) -> Option<ConsoleStyle> {
        self.registry_read().lookup(name).map(|b| b.style)
    }

    /// Names every call may use as a destination.
    pub fn known_sinks(&self) -> Vec<String> {
        self.registry_read().sink_names()
    }

    /// Snapshot of the installed sinks.
    pub fn sink_set(&self) -> Arc<SinkSet> {
        self.sinks.current()
    }

    /// Current rotation state.
    pub fn rotation_state(&self) -> RotationState {
        self.rotation().clone()
    }

    /// Prints `[timestamp] - Error: <message>` to the console error stream.
    fn report(&self, timestamp: &str, error: &LoggrError) {
        let style = self.style_of("error").unwrap_or_default();
        self.console
            .error(&format!("[{}] - {}{}", timestamp, style.paint("Error: "), error));
    }

    fn rotation(&self) -> MutexGuard<'_, RotationState> {
        self.rotation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_read(&self) -> RwLockReadGuard<'_, SeverityRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_write(&self) -> RwLockWriteGuard<'_, SeverityRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `event` first, then the destination and the severity sink, without duplicates.
fn sink_targets(destination: Option<String>, severity_sink: Option<String>) -> Vec<String> {
    let mut targets = vec![EVENT_SINK.to_string()];
    for name in destination.into_iter().chain(severity_sink) {
        if !targets.contains(&name) {
            targets.push(name);
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn known(name: &str) -> bool {
        SeverityRegistry::new().is_sink(name)
    }

    #[test]
    fn test_format_tokens() {
        assert_eq!(Format::parse(None).unwrap(), Format::Plain);
        assert_eq!(Format::parse(Some(&Value::Null)).unwrap(), Format::Plain);
        assert_eq!(Format::parse(Some(&json!("json"))).unwrap(), Format::Json);
        assert_eq!(Format::parse(Some(&json!("pretty"))).unwrap(), Format::Pretty);
        assert!(matches!(
            Format::parse(Some(&json!("yaml"))),
            Err(LoggrError::InvalidFormat(t)) if t == "yaml"
        ));
        assert!(Format::parse(Some(&json!(3))).is_err());
    }

    #[test]
    fn test_render_encodings() {
        let value = json!({"b": [1, true], "a": 1});
        assert_eq!(Format::Plain.render(&json!("a \"quoted\" line")).unwrap(), "a \"quoted\" line");
        assert_eq!(Format::Plain.render(&json!(42)).unwrap(), "42");
        assert_eq!(Format::Json.render(&value).unwrap(), r#"{"a":1,"b":[1,true]}"#);
        assert_eq!(Format::Json.render(&json!("s")).unwrap(), r#""s""#);
        assert_eq!(
            Format::Pretty.render(&json!({"a": 1})).unwrap(),
            "{\n  \"a\": 1\n}"
        );
    }

    #[test]
    fn test_rendered_json_parses_back() {
        let value = json!({"nested": {"list": [1, 2.5, null, "x"]}, "flag": false});
        for format in [Format::Json, Format::Pretty] {
            let text = format.render(&value).unwrap();
            let parsed: Value = serde_json::from_str(&text).unwrap();
            assert_eq!(parsed, value);
        }
    }

    #[test]
    fn test_resolve_plain_payload() {
        let event = LogEvent::resolve(None, "hello".into_log_args(), known).unwrap();
        assert_eq!(event.payload, json!("hello"));
        assert_eq!(event.destination, None);
        assert_eq!(event.format, Format::Plain);
    }

    #[test]
    fn test_resolve_payload_then_format() {
        let event =
            LogEvent::resolve(Some(Severity::Info), (json!({"a": 1}), "json").into_log_args(), known)
                .unwrap();
        assert_eq!(event.payload, json!({"a": 1}));
        assert_eq!(event.format, Format::Json);
        assert_eq!(event.severity, Some(Severity::Info));
    }

    #[test]
    fn test_resolve_destination_shifts_arguments() {
        let event = LogEvent::resolve(None, ("error", json!([1]), "pretty").into_log_args(), known)
            .unwrap();
        assert_eq!(event.destination.as_deref(), Some("error"));
        assert_eq!(event.payload, json!([1]));
        assert_eq!(event.format, Format::Pretty);
    }

    #[test]
    fn test_resolve_unknown_name_is_payload() {
        let event = LogEvent::resolve(None, ("nowhere", "pretty").into_log_args(), known).unwrap();
        assert_eq!(event.destination, None);
        assert_eq!(event.payload, json!("nowhere"));
        assert_eq!(event.format, Format::Pretty);
    }

    #[test]
    fn test_resolve_usage_errors() {
        assert!(matches!(
            LogEvent::resolve(None, ().into_log_args(), known),
            Err(LoggrError::MissingPayload)
        ));
        assert!(matches!(
            LogEvent::resolve(None, None::<Value>.into_log_args(), known),
            Err(LoggrError::MissingPayload)
        ));
        assert!(matches!(
            LogEvent::resolve(None, "error".into_log_args(), known),
            Err(LoggrError::MissingPayload)
        ));
        assert!(matches!(
            LogEvent::resolve(None, ("x", "xml").into_log_args(), known),
            Err(LoggrError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_compose_lines_share_payload_and_timestamp() {
        colored::control::set_override(true);
        let style = ConsoleStyle::fg(colored::Color::Red);
        let lines = RenderedLines::compose("TS", "Error: ", &style, "disk full");
        assert_eq!(lines.file, "[TS] - Error: disk full\n");
        assert_eq!(lines.console, "[TS] - \x1b[31mError: \x1b[0mdisk full");

        let plain = RenderedLines::compose("TS", "", &ConsoleStyle::plain(), "hello");
        assert_eq!(plain.console, "[TS] - hello");
        assert_eq!(plain.file, "[TS] - hello\n");
    }

    #[test]
    fn test_sink_targets_deduplicate() {
        assert_eq!(sink_targets(None, None), vec!["event"]);
        assert_eq!(
            sink_targets(Some("error".into()), Some("error".into())),
            vec!["event", "error"]
        );
        assert_eq!(
            sink_targets(Some("event".into()), Some("info".into())),
            vec!["event", "info"]
        );
    }

    #[test]
    fn test_rotation_latch() {
        let day = Local.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut state = RotationState::default();
        assert_eq!(state.begin(day), RotationStep::Rotate);
        assert!(state.is_in_flight());
        // A second caller during the rotation does not rotate again.
        assert_eq!(state.begin(day), RotationStep::Proceed);
        state.finish(Some(next_midnight(day)));
        assert!(!state.is_in_flight());

        let boundary = state.boundary().unwrap();
        assert_eq!(state.begin(boundary - TimeDelta::milliseconds(1)), RotationStep::Proceed);
        assert_eq!(state.begin(boundary), RotationStep::Rotate);
    }

    #[test]
    fn test_failed_rotation_keeps_boundary() {
        let day = Local.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut state = RotationState::default();
        state.begin(day);
        state.finish(Some(next_midnight(day)));
        let boundary = state.boundary();
        state.begin(boundary.unwrap());
        state.finish(None);
        assert_eq!(state.boundary(), boundary);
        assert_eq!(state.begin(boundary.unwrap()), RotationStep::Rotate);
    }

    #[test]
    fn test_dropped_rotation_guard_releases_latch() {
        let day = Local.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let state = Mutex::new(RotationState::default());
        state.lock().unwrap().begin(day);
        state.lock().unwrap().finish(Some(next_midnight(day)));
        let boundary = state.lock().unwrap().boundary();

        assert_eq!(state.lock().unwrap().begin(boundary.unwrap()), RotationStep::Rotate);
        drop(RotationGuard::new(&state));
        let after = state.lock().unwrap().clone();
        assert!(!after.is_in_flight());
        assert_eq!(after.boundary(), boundary);
    }

    #[test]
    fn test_next_midnight_skipped_by_dst() {
        use chrono_tz::America::Havana;
        // Havana jumps from 00:00 to 01:00 on 2024-03-10.
        let before = Havana.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let next = next_midnight_in(before);
        assert_eq!(
            next.naive_local(),
            chrono::NaiveDate::from_ymd_opt(2024, 3, 10).unwrap().and_hms_opt(1, 0, 0).unwrap()
        );

        let ordinary = Havana.with_ymd_and_hms(2024, 3, 8, 23, 0, 0).unwrap();
        assert_eq!(next_midnight_in(ordinary), Havana.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_next_midnight_is_strictly_after() {
        let late = Local.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let midnight = Local.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(next_midnight(late), midnight);
        assert_eq!(
            next_midnight(midnight),
            Local.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap()
        );
    }
}
