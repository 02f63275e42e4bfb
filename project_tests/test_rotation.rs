use chrono::TimeDelta;
use futures_util::FutureExt;
use project_tests::{Harness, local, read_log};
use std::sync::Arc;

#[tokio::test]
async fn test_rotates_exactly_at_the_boundary() {
    let h = Harness::start_at(local(2024, 3, 14, 18, 0, 0, 0)).await;
    let midnight = local(2024, 3, 15, 0, 0, 0, 0);
    assert_eq!(h.loggr.rotation_boundary(), Some(midnight));

    h.clock.set(midnight - TimeDelta::milliseconds(1));
    assert!(h.loggr.log("late").await);
    assert_eq!(h.loggr.current_dir(), Some(h.day_dir(2024, 3, 14)));

    h.clock.set(midnight);
    assert!(h.loggr.log("early").await);
    assert_eq!(h.loggr.current_dir(), Some(h.day_dir(2024, 3, 15)));
    assert_eq!(h.loggr.rotation_boundary(), Some(local(2024, 3, 16, 0, 0, 0, 0)));

    let old = read_log(&h.day_dir(2024, 3, 14), "event").unwrap();
    let new = read_log(&h.day_dir(2024, 3, 15), "event").unwrap();
    assert_eq!(old, "[03/14/2024 @ 11:59:59:999 PM] - late\n");
    assert_eq!(new, "[03/15/2024 @ 12:00:00:000 AM] - early\n");
}

#[tokio::test]
async fn test_triggering_call_replays_once_with_fresh_timestamp() {
    let h = Harness::start_stepping(local(2024, 3, 14, 23, 59, 59, 0), TimeDelta::milliseconds(5)).await;
    h.clock.set(local(2024, 3, 15, 0, 0, 0, 0));

    // Three reads: the boundary check, the rotation start, the replay.
    assert!(h.loggr.err("after midnight").await);

    let line = "[03/15/2024 @ 12:00:00:010 AM] - Error: after midnight\n";
    assert_eq!(read_log(&h.day_dir(2024, 3, 15), "event").unwrap(), line);
    assert_eq!(read_log(&h.day_dir(2024, 3, 15), "error").unwrap(), line);
    assert_eq!(read_log(&h.day_dir(2024, 3, 14), "event").unwrap(), "");
    assert_eq!(h.console.lines().len(), 1);
}

#[tokio::test]
async fn test_failed_rotation_keeps_stale_sinks_and_retries() {
    let h = Harness::start_at(local(2024, 3, 14, 12, 0, 0, 0)).await;
    let blocked = h.day_dir(2024, 3, 15);
    std::fs::write(&blocked, b"not a directory").unwrap();

    h.clock.set(local(2024, 3, 15, 0, 0, 1, 0));
    assert!(h.loggr.log("stale").await);
    assert_eq!(h.loggr.current_dir(), Some(h.day_dir(2024, 3, 14)));
    assert_eq!(h.loggr.rotation_boundary(), Some(local(2024, 3, 15, 0, 0, 0, 0)));
    assert_eq!(h.console.errors().len(), 1);
    assert_eq!(
        read_log(&h.day_dir(2024, 3, 14), "event").unwrap(),
        "[03/15/2024 @ 12:00:01:000 AM] - stale\n"
    );

    std::fs::remove_file(&blocked).unwrap();
    assert!(h.loggr.log("fresh").await);
    assert_eq!(h.loggr.current_dir(), Some(h.day_dir(2024, 3, 15)));
    assert_eq!(
        read_log(&h.day_dir(2024, 3, 15), "event").unwrap(),
        "[03/15/2024 @ 12:00:01:000 AM] - fresh\n"
    );
}

#[tokio::test]
async fn test_custom_sink_survives_rotation() {
    let h = Harness::start_at(local(2024, 3, 14, 20, 0, 0, 0)).await;
    assert!(h.loggr.create("audit").await);
    assert!(h.loggr.custom("audit", "before").await);

    h.clock.set(local(2024, 3, 15, 8, 0, 0, 0));
    assert!(h.loggr.custom("audit", "after").await);

    assert_eq!(
        read_log(&h.day_dir(2024, 3, 14), "audit").unwrap(),
        "[03/14/2024 @ 08:00:00:000 PM] - Audit: before\n"
    );
    assert_eq!(
        read_log(&h.day_dir(2024, 3, 15), "audit").unwrap(),
        "[03/15/2024 @ 08:00:00:000 AM] - Audit: after\n"
    );
    assert!(h.loggr.open_sinks().contains(&"audit".to_string()));
}

#[tokio::test]
async fn test_skipped_days_rotate_once_to_the_current_day() {
    let h = Harness::start_at(local(2024, 3, 14, 9, 0, 0, 0)).await;
    h.clock.set(local(2024, 3, 17, 9, 0, 0, 0));
    assert!(h.loggr.log("later").await);

    assert_eq!(h.loggr.current_dir(), Some(h.day_dir(2024, 3, 17)));
    assert_eq!(h.loggr.rotation_boundary(), Some(local(2024, 3, 18, 0, 0, 0, 0)));
    assert!(!h.day_dir(2024, 3, 15).exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_at_midnight_lose_nothing() {
    const CALLS: usize = 64;
    let h = Arc::new(Harness::start_at(local(2024, 3, 14, 23, 59, 59, 999)).await);
    h.clock.set(local(2024, 3, 15, 0, 0, 0, 0));

    let tasks: Vec<_> = (0..CALLS)
        .map(|i| {
            let h = Arc::clone(&h);
            tokio::spawn(async move { h.loggr.info(format!("call {}", i)).await })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap());
    }

    assert_eq!(h.loggr.current_dir(), Some(h.day_dir(2024, 3, 15)));
    let mut seen: Vec<String> = Vec::new();
    for day in [14, 15] {
        let dir = h.day_dir(2024, 3, day);
        let mut event: Vec<String> = read_log(&dir, "event").unwrap().lines().map(str::to_string).collect();
        let mut info: Vec<String> = read_log(&dir, "info").unwrap().lines().map(str::to_string).collect();
        event.sort();
        info.sort();
        assert_eq!(event, info);
        seen.extend(event);
    }
    assert_eq!(seen.len(), CALLS);
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), CALLS);
    assert!(seen.iter().all(|l| l.starts_with("[03/15/2024 @ 12:00:00:000 AM] - Info: call ")));
}

#[tokio::test]
async fn test_rotation_finishing_after_midnight_rotates_again() {
    // Opening the first day starts at 23:59:59.995; the next read is midnight.
    let h = Harness::start_stepping(local(2024, 3, 14, 23, 59, 59, 990), TimeDelta::milliseconds(5)).await;
    assert_eq!(h.loggr.current_dir(), Some(h.day_dir(2024, 3, 14)));
    assert_eq!(h.loggr.rotation_boundary(), Some(local(2024, 3, 15, 0, 0, 0, 0)));

    assert!(h.loggr.log("first").await);
    assert_eq!(h.loggr.current_dir(), Some(h.day_dir(2024, 3, 15)));
    assert_eq!(
        read_log(&h.day_dir(2024, 3, 15), "event").unwrap(),
        "[03/15/2024 @ 12:00:00:010 AM] - first\n"
    );
}

#[tokio::test]
async fn test_dropped_rotating_call_releases_the_latch() {
    let h = Harness::start_at(local(2024, 3, 14, 12, 0, 0, 0)).await;
    h.clock.set(local(2024, 3, 15, 0, 0, 0, 0));

    // Polled once while the new day is opening, then dropped.
    let _ = h.loggr.log("dropped").now_or_never();

    h.clock.set(local(2024, 3, 17, 9, 0, 0, 0));
    assert!(h.loggr.log("two days later").await);
    assert_eq!(h.loggr.current_dir(), Some(h.day_dir(2024, 3, 17)));
    assert_eq!(h.loggr.rotation_boundary(), Some(local(2024, 3, 18, 0, 0, 0, 0)));
    assert_eq!(
        read_log(&h.day_dir(2024, 3, 17), "event").unwrap(),
        "[03/17/2024 @ 09:00:00:000 AM] - two days later\n"
    );
    assert!(!read_log(&h.day_dir(2024, 3, 14), "event").unwrap().contains("two days later"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_create_racing_rotation_keeps_its_sink() {
    for round in 0..40 {
        let h = Arc::new(Harness::start_at(local(2024, 3, 14, 23, 0, 0, 0)).await);
        h.clock.set(local(2024, 3, 15, 0, 0, 0, 0));

        let tick = {
            let h = Arc::clone(&h);
            tokio::spawn(async move { h.loggr.log("tick").await })
        };
        let create = {
            let h = Arc::clone(&h);
            tokio::spawn(async move { h.loggr.create("audit").await })
        };
        assert!(tick.await.unwrap());
        assert!(create.await.unwrap());

        assert_eq!(h.loggr.current_dir(), Some(h.day_dir(2024, 3, 15)), "round {}", round);
        assert!(
            h.loggr.open_sinks().contains(&"audit".to_string()),
            "round {}: audit registered but not open",
            round
        );
        assert!(h.loggr.custom("audit", "kept").await);
        assert_eq!(
            read_log(&h.day_dir(2024, 3, 15), "audit").unwrap(),
            "[03/15/2024 @ 12:00:00:000 AM] - Audit: kept\n",
            "round {}",
            round
        );
    }
}
