use lib_loggr::{Color, ConsoleStyle, Loggr, LoggrOptions};
use project_tests::{Harness, local, read_log, strip_ansi};
use serde_json::{Value, json};

const TS: &str = "[03/14/2024 @ 09:26:53:589 AM] - ";

async fn harness() -> Harness {
    Harness::start_at(local(2024, 3, 14, 9, 26, 53, 589)).await
}

#[tokio::test]
async fn test_log_plain_string_goes_to_event_only() {
    let h = harness().await;
    assert!(h.loggr.log("hello").await);

    assert_eq!(h.read("event"), format!("{}hello\n", TS));
    for name in ["alert", "critical", "debug", "emergency", "error", "info", "notice", "warning"] {
        assert_eq!(h.read(name), "", "{} should be empty", name);
    }
    assert_eq!(h.console.lines(), vec![format!("{}hello", TS)]);
    assert!(h.console.errors().is_empty());
}

#[tokio::test]
async fn test_err_writes_prefixed_line_to_event_and_error() {
    let h = harness().await;
    assert!(h.loggr.err("disk full").await);

    let expected = format!("{}Error: disk full\n", TS);
    assert_eq!(h.read("event"), expected);
    assert_eq!(h.read("error"), expected);
    assert_eq!(
        h.console.lines(),
        vec![format!("{}\x1b[91mError: \x1b[0mdisk full", TS)]
    );
}

#[tokio::test]
async fn test_info_json_payload() {
    let h = harness().await;
    assert!(h.loggr.info((json!({"a": 1}), "json")).await);

    let expected = format!("{}Info: {{\"a\":1}}\n", TS);
    assert_eq!(h.read("event"), expected);
    assert_eq!(h.read("info"), expected);
}

#[tokio::test]
async fn test_missing_payload_writes_nothing() {
    let h = harness().await;
    assert!(!h.loggr.log(()).await);
    assert!(!h.loggr.log(None::<Value>).await);

    let dir = h.loggr.current_dir().unwrap();
    for name in h.loggr.known_sinks() {
        assert_eq!(read_log(&dir, &name).unwrap(), "", "{} should be empty", name);
    }
    assert!(h.console.lines().is_empty());
    let errors = h.console.errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(strip_ansi(&errors[0]), format!("{}Error: Nothing to log.", TS));
}

#[tokio::test]
async fn test_invalid_format_is_a_usage_error() {
    let h = harness().await;
    assert!(!h.loggr.warning(("careful", "xml")).await);
    assert_eq!(h.read("event"), "");
    assert_eq!(h.read("warning"), "");
    assert!(strip_ansi(&h.console.errors()[0]).contains("Invalid format \"xml\""));
}

#[tokio::test]
async fn test_console_and_file_carry_identical_renderings() {
    let h = harness().await;
    let payloads = [
        json!("text with \"quotes\""),
        json!(42),
        json!(-0.5),
        json!(true),
        json!(null),
        json!([1, "two", {"three": 3}]),
        json!({"z": {"y": [true, null]}, "a": "b"}),
    ];
    let mut calls = 0;
    for payload in &payloads {
        for format in [None, Some("json"), Some("pretty")] {
            let args = (payload.clone(), format.map(Value::from).unwrap_or(Value::Null));
            assert!(h.loggr.notice(args.clone()).await);
            assert!(h.loggr.log(args).await);
            calls += 2;
        }
    }

    let file = h.read("event");
    let console: Vec<String> = h.console.lines().iter().map(|l| strip_ansi(l)).collect();
    assert_eq!(console.len(), calls);
    // Pretty payloads span several file lines, so compare the joined text.
    assert_eq!(console.join("\n") + "\n", file);
}

#[tokio::test]
async fn test_json_renderings_parse_back() {
    let h = harness().await;
    let value = json!({"list": [1, 2.5, "x"], "nested": {"ok": false}});
    assert!(h.loggr.debug((value.clone(), "json")).await);
    assert!(h.loggr.debug((value.clone(), "pretty")).await);

    let lines = h.console.lines();
    for line in &lines {
        let body = strip_ansi(line);
        let json_text = body.split_once("Debug: ").unwrap().1;
        let parsed: Value = serde_json::from_str(json_text).unwrap();
        assert_eq!(parsed, value);
    }
}

#[tokio::test]
async fn test_pretty_uses_two_space_indent() {
    let h = harness().await;
    assert!(h.loggr.log((json!({"a": [1]}), "pretty")).await);
    assert_eq!(
        h.read("event"),
        format!("{}{{\n  \"a\": [\n    1\n  ]\n}}\n", TS)
    );
}

#[tokio::test]
async fn test_destination_routes_and_shifts_arguments() {
    let h = harness().await;
    assert!(h.loggr.log(("error", json!({"k": "v"}), "json")).await);
    assert!(h.loggr.info(("warning", "both")).await);
    assert!(h.loggr.log(("nowhere", "json")).await);

    assert_eq!(h.read("error"), format!("{}{{\"k\":\"v\"}}\n", TS));
    assert_eq!(h.read("warning"), format!("{}Info: both\n", TS));
    assert_eq!(h.read("info"), format!("{}Info: both\n", TS));
    assert_eq!(
        h.read("event"),
        format!("{TS}{{\"k\":\"v\"}}\n{TS}Info: both\n{TS}\"nowhere\"\n")
    );
}

#[tokio::test]
async fn test_every_severity_prefix() {
    let h = harness().await;
    let loggr = &h.loggr;
    assert!(loggr.alert("a").await);
    assert!(loggr.crit("b").await);
    assert!(loggr.debug("c").await);
    assert!(loggr.emerg("d").await);
    assert!(loggr.err("e").await);
    assert!(loggr.info("f").await);
    assert!(loggr.notice("g").await);
    assert!(loggr.warning("h").await);

    let expected = [
        ("alert", "Alert: a"),
        ("critical", "Critical: b"),
        ("debug", "Debug: c"),
        ("emergency", "Emergency: d"),
        ("error", "Error: e"),
        ("info", "Info: f"),
        ("notice", "Notice: g"),
        ("warning", "Warning: h"),
    ];
    for (name, line) in expected {
        assert_eq!(h.read(name), format!("{}{}\n", TS, line));
    }
    assert_eq!(h.read("event").lines().count(), 8);
}

#[tokio::test]
async fn test_create_is_idempotent() {
    let h = harness().await;
    let before = h.loggr.open_sinks().len();
    assert!(h.loggr.create("custom").await);
    assert!(h.loggr.create("custom").await);
    assert_eq!(h.loggr.open_sinks().len(), before + 1);
    assert_eq!(
        h.loggr.known_sinks().iter().filter(|n| n.as_str() == "custom").count(),
        1
    );

    assert!(h.loggr.log(("custom", "routed")).await);
    assert_eq!(h.read("custom"), format!("{}routed\n", TS));
}

#[tokio::test]
async fn test_create_rejects_unusable_names() {
    let h = harness().await;
    assert!(!h.loggr.create("../etc").await);
    assert!(!h.loggr.create("").await);
    assert_eq!(h.console.errors().len(), 2);
    assert!(!h.loggr.known_sinks().contains(&"../etc".to_string()));
}

#[tokio::test]
async fn test_recolor_only_touches_console() {
    let h = harness().await;
    h.loggr.recolor().err(ConsoleStyle::fg(Color::White).on(Color::Blue));
    h.loggr.recolor_by_name("unknown", Color::Red);
    assert!(h.loggr.err("x").await);

    assert_eq!(
        h.console.lines(),
        vec![format!("{}\x1b[44;37mError: \x1b[0mx", TS)]
    );
    assert_eq!(h.read("error"), format!("{}Error: x\n", TS));
}

#[tokio::test]
async fn test_unwritable_root_degrades_to_console() {
    let dir = tempfile::tempdir().unwrap();
    let blocked = dir.path().join("root-is-a-file");
    std::fs::write(&blocked, b"").unwrap();

    let console = std::sync::Arc::new(lib_loggr::CapturedConsole::new());
    let clock = std::sync::Arc::new(lib_loggr::ManualClock::new(local(2024, 3, 14, 9, 0, 0, 0)));
    let loggr = Loggr::start_with(LoggrOptions::with_root(&blocked), clock, console.clone()).await;

    assert!(loggr.current_dir().is_none());
    assert!(loggr.log("still printed").await);
    assert!(console.lines().iter().any(|l| l.ends_with("still printed")));
    assert!(!console.errors().is_empty());
}
