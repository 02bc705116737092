//! Countdown driver behaviour on paused time

use std::time::Duration;
use riddle_party::timer::{CountdownEvent, CountdownTimer, TimerSignal};
use tokio::sync::mpsc::UnboundedReceiver;

/// Signals the timer would let a consumer observe within `window`
async fn observed(
    timer: &mut CountdownTimer,
    rx: &mut UnboundedReceiver<TimerSignal>,
    window: Duration,
) -> Vec<TimerSignal> {
    let deadline = tokio::time::Instant::now() + window;
    let mut accepted = Vec::new();
    while let Ok(Some(signal)) = tokio::time::timeout_at(deadline, rx.recv()).await {
        if timer.accept(&signal) {
            timer.finish(&signal);
            accepted.push(signal);
        }
    }
    accepted
}

#[tokio::test(start_paused = true)]
async fn test_restart_cancels_prior_run() {
    let (mut timer, mut rx) = CountdownTimer::channel();
    timer.start(5, 1);

    tokio::time::sleep(Duration::from_millis(2500)).await;
    timer.start(3, 2);

    let signals = observed(&mut timer, &mut rx, Duration::from_secs(30)).await;
    assert!(signals.iter().all(|s| s.tag == 2));
    let completions = signals.iter().filter(|s| s.is_completion()).count();
    assert_eq!(completions, 1);
    assert_eq!(
        signals.last().map(|s| s.event),
        Some(CountdownEvent::Completed)
    );
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_all_signals() {
    let (mut timer, mut rx) = CountdownTimer::channel();
    timer.start(4, 9);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    timer.cancel();
    assert!(!timer.is_running());

    let signals = observed(&mut timer, &mut rx, Duration::from_secs(30)).await;
    assert!(signals.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_completion_arrives_after_duration() {
    let (mut timer, mut rx) = CountdownTimer::channel();
    let started = tokio::time::Instant::now();
    timer.start(6, 0);

    loop {
        let signal = rx.recv().await.unwrap();
        if signal.is_completion() {
            assert!(timer.accept(&signal));
            break;
        }
    }
    assert_eq!(started.elapsed(), Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn test_handle_cancel_stops_run() {
    let (mut timer, mut rx) = CountdownTimer::channel();
    let handle = timer.start(3, 4);
    assert_eq!(handle.duration(), 3);
    handle.cancel();
    assert!(!timer.is_running());

    let signals = observed(&mut timer, &mut rx, Duration::from_secs(10)).await;
    assert!(signals.is_empty());
}
