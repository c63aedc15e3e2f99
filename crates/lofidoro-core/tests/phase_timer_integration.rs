//! Integration tests for the phase timer.
//!
//! Time is paused, so every duration below is exact.

mod common;

use std::time::Duration;

use common::RecordingDisplay;
use lofidoro_core::{Command, CommandBus, PhaseOutcome, PhaseTimer};
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

fn publish_at(bus: &CommandBus, schedule: &[(u64, Command)]) {
    let bus = bus.clone();
    let schedule = schedule.to_vec();
    tokio::spawn(async move {
        let start = Instant::now();
        for (at_ms, command) in schedule {
            tokio::time::sleep_until(start + Duration::from_millis(at_ms)).await;
            bus.publish(command);
        }
    });
}

#[tokio::test(start_paused = true)]
async fn test_phase_renders_once_per_tick_and_completes() {
    let display = RecordingDisplay::new();
    let bus = CommandBus::new();
    let timer = PhaseTimer::new(display.clone(), CancellationToken::new());

    let start = Instant::now();
    let outcome = timer.run("Work", 3, &mut bus.subscribe()).await;

    assert_eq!(outcome, PhaseOutcome::Completed);
    assert_eq!(start.elapsed(), Duration::from_secs(3));
    let elapsed: Vec<u64> = display.renders().iter().map(|r| r.elapsed).collect();
    assert_eq!(elapsed, vec![1, 2, 3]);
    assert!(display.renders().iter().all(|r| r.label == "Work" && r.total == 3));
}

#[tokio::test(start_paused = true)]
async fn test_paused_time_is_excluded() {
    let display = RecordingDisplay::new();
    let bus = CommandBus::new();
    let mut commands = bus.subscribe();
    let timer = PhaseTimer::new(display.clone(), CancellationToken::new());

    publish_at(&bus, &[(1_500, Command::TogglePause), (4_500, Command::TogglePause)]);

    let start = Instant::now();
    let outcome = timer.run("Work", 3, &mut commands).await;

    assert_eq!(outcome, PhaseOutcome::Completed);
    assert_eq!(start.elapsed(), Duration::from_secs(6));

    let renders = display.renders();
    assert_eq!(renders.len(), 6);
    assert_eq!(renders.last().unwrap().elapsed, 3);
    // Frozen while paused.
    assert_eq!(renders[1].elapsed, 1);
    assert_eq!(renders[3].elapsed, 1);
    assert!(renders.windows(2).all(|w| w[0].elapsed <= w[1].elapsed));
}

#[tokio::test(start_paused = true)]
async fn test_resume_between_ticks_ends_on_exact_effective_time() {
    let display = RecordingDisplay::new();
    let bus = CommandBus::new();
    let mut commands = bus.subscribe();
    let timer = PhaseTimer::new(display.clone(), CancellationToken::new());

    publish_at(&bus, &[(1_500, Command::TogglePause), (2_000, Command::TogglePause)]);

    let start = Instant::now();
    assert_eq!(timer.run("Work", 3, &mut commands).await, PhaseOutcome::Completed);

    // 3 s running plus 0.5 s paused.
    assert_eq!(start.elapsed(), Duration::from_millis(3_500));
    let elapsed: Vec<u64> = display.renders().iter().map(|r| r.elapsed).collect();
    assert_eq!(elapsed, vec![1, 1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_final_elapsed_equals_total_for_any_pause_pattern() {
    for (total, pauses) in [
        (5u64, vec![]),
        (5, vec![(200u64, Command::TogglePause), (9_700, Command::TogglePause)]),
        (2, vec![(100, Command::TogglePause), (300, Command::TogglePause), (1_250, Command::TogglePause), (1_900, Command::TogglePause)]),
        (4, vec![(3_999, Command::TogglePause), (60_000, Command::TogglePause)]),
    ] {
        let display = RecordingDisplay::new();
        let bus = CommandBus::new();
        let mut commands = bus.subscribe();
        let timer = PhaseTimer::new(display.clone(), CancellationToken::new());
        publish_at(&bus, &pauses);

        let start = Instant::now();
        assert_eq!(timer.run("Work", total, &mut commands).await, PhaseOutcome::Completed);
        let paused_ms: u64 = pauses.chunks(2).map(|pair| pair[1].0 - pair[0].0).sum();
        assert_eq!(start.elapsed(), Duration::from_millis(total * 1_000 + paused_ms));

        let last = display.renders().last().cloned().unwrap();
        assert_eq!(last.elapsed, total);
        assert_eq!(last.total, total);
    }
}

#[tokio::test(start_paused = true)]
async fn test_skip_and_ignore_do_not_touch_the_countdown() {
    let display = RecordingDisplay::new();
    let bus = CommandBus::new();
    let mut commands = bus.subscribe();
    let timer = PhaseTimer::new(display.clone(), CancellationToken::new());
    publish_at(&bus, &[(500, Command::Skip), (700, Command::Ignore)]);

    let start = Instant::now();
    assert_eq!(timer.run("Break", 2, &mut commands).await, PhaseOutcome::Completed);
    assert_eq!(start.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_ends_phase_promptly() {
    let display = RecordingDisplay::new();
    let bus = CommandBus::new();
    let cancel = CancellationToken::new();
    let timer = PhaseTimer::new(display.clone(), cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(2_500)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let outcome = timer.run("Work", 60, &mut bus.subscribe()).await;

    assert_eq!(outcome, PhaseOutcome::Cancelled);
    assert_eq!(start.elapsed(), Duration::from_millis(2_500));
    assert_eq!(display.renders().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_zero_length_phase_completes_without_rendering() {
    let display = RecordingDisplay::new();
    let bus = CommandBus::new();
    let timer = PhaseTimer::new(display.clone(), CancellationToken::new());

    assert_eq!(timer.run("Break", 0, &mut bus.subscribe()).await, PhaseOutcome::Completed);
    assert!(display.renders().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_display_failures_do_not_stop_the_timer() {
    let display = RecordingDisplay::broken();
    let bus = CommandBus::new();
    let timer = PhaseTimer::new(display.clone(), CancellationToken::new());

    assert_eq!(timer.run("Work", 2, &mut bus.subscribe()).await, PhaseOutcome::Completed);
    assert_eq!(display.renders().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_custom_tick_controls_render_rate() {
    let display = RecordingDisplay::new();
    let bus = CommandBus::new();
    let timer = PhaseTimer::new(display.clone(), CancellationToken::new())
        .with_tick(Duration::from_millis(250));

    assert_eq!(timer.run("Work", 1, &mut bus.subscribe()).await, PhaseOutcome::Completed);
    let elapsed: Vec<u64> = display.renders().iter().map(|r| r.elapsed).collect();
    assert_eq!(elapsed, vec![0, 0, 0, 1]);
}
