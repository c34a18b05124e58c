//! Contract tests for Unix signal handling
//!
//! These live in their own test binary: delivering a real signal is
//! process-global, so nothing else may run in the same process. The
//! scheduler registers its signal streams before the first tick, which
//! lets the test send SIGTERM as soon as the resolver has been called.
#![cfg(unix)]

mod common;

use std::net::IpAddr;
use std::process::Command;
use std::time::Duration;

use dynup_core::{Scheduler, SchedulerEvent};

use common::{MockStateStore, MockUpdateClient, ScriptedResolver, test_config};

#[tokio::test]
async fn sigterm_stops_the_loop_cleanly() {
    let resolver = ScriptedResolver::fixed(IpAddr::from([192, 0, 2, 1]));
    let client = MockUpdateClient::accepting();
    let store = MockStateStore::new();

    let (mut scheduler, mut events) = Scheduler::new(
        Box::new(resolver.clone()),
        Box::new(client),
        Box::new(store),
        &test_config(&["example.dy.fi"]),
    )
    .unwrap();

    let run = tokio::spawn(async move { scheduler.run().await });

    // The first resolver call means the signal streams are already in
    // place; after the tick the loop parks in the inter-tick sleep
    while resolver.call_count() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let sent = Command::new("kill")
        .args(["-s", "TERM", &std::process::id().to_string()])
        .status()
        .expect("failed to run kill");
    assert!(sent.success());

    // SIGTERM must interrupt the sleep and produce a clean Ok(()) exit
    let result = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("scheduler did not stop after SIGTERM")
        .expect("scheduler task panicked");
    assert!(result.is_ok());

    let mut stop_reasons = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let SchedulerEvent::Stopped { reason } = event {
            stop_reasons.push(reason);
        }
    }
    assert_eq!(stop_reasons, vec!["SIGTERM".to_string()]);
}
