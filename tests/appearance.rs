mod common;

use anyhow::anyhow;
use common::FakeThemeSource;
use desktop_indicator::appearance::{MonitorLifecycle, ThemeMonitor, ThemeSource};
use desktop_indicator::theme::Theme;
use std::sync::{Arc, Mutex};

fn monitor_with_events(
    initial: Theme,
) -> (Arc<FakeThemeSource>, ThemeMonitor, Arc<Mutex<Vec<Theme>>>) {
    let source = Arc::new(FakeThemeSource::new(initial));
    let dyn_source: Arc<dyn ThemeSource> = source.clone();
    let monitor = ThemeMonitor::new(dyn_source);
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    monitor.on_change(Box::new(move |theme| sink.lock().unwrap().push(theme)));
    (source, monitor, events)
}

#[test]
fn reads_theme_at_construction_without_subscribing() {
    let (source, monitor, _events) = monitor_with_events(Theme::Light);
    assert_eq!(monitor.current_theme(), Theme::Light);
    assert_eq!(monitor.lifecycle(), MonitorLifecycle::Initialized);
    assert_eq!(*source.subscriptions.lock().unwrap(), 0);
    assert!(!source.notify(Ok(())));
}

#[test]
fn emits_once_per_transition() {
    let (source, monitor, events) = monitor_with_events(Theme::Dark);
    monitor.start().expect("start");
    assert_eq!(monitor.lifecycle(), MonitorLifecycle::Running);

    // Unchanged value: no event.
    assert!(source.notify(Ok(())));
    assert!(events.lock().unwrap().is_empty());

    source.set_theme(Theme::Light);
    source.notify(Ok(()));
    source.notify(Ok(()));
    source.notify(Ok(()));
    assert_eq!(*events.lock().unwrap(), vec![Theme::Light]);
    assert_eq!(monitor.current_theme(), Theme::Light);

    source.set_theme(Theme::Dark);
    source.notify(Ok(()));
    assert_eq!(*events.lock().unwrap(), vec![Theme::Light, Theme::Dark]);
}

#[test]
fn channel_error_stops_updates_for_good() {
    let (source, monitor, events) = monitor_with_events(Theme::Dark);
    monitor.start().expect("start");

    source.notify(Err(anyhow!("registry watch failed")));
    assert_eq!(monitor.lifecycle(), MonitorLifecycle::Stopped);

    source.set_theme(Theme::Light);
    source.notify(Ok(()));
    assert!(events.lock().unwrap().is_empty());
    assert_eq!(monitor.current_theme(), Theme::Dark);

    // No restart after a failure.
    monitor.start().expect("start after failure is a no-op");
    assert_eq!(*source.subscriptions.lock().unwrap(), 1);
}

#[test]
fn start_twice_subscribes_once() {
    let (source, monitor, _events) = monitor_with_events(Theme::Dark);
    monitor.start().unwrap();
    monitor.start().unwrap();
    assert_eq!(*source.subscriptions.lock().unwrap(), 1);
}

#[test]
fn stop_is_idempotent_and_unsubscribes() {
    let (source, monitor, events) = monitor_with_events(Theme::Dark);
    monitor.start().unwrap();
    monitor.stop();
    monitor.stop();
    assert_eq!(monitor.lifecycle(), MonitorLifecycle::Stopped);
    assert!(!source.notify(Ok(())));

    source.set_theme(Theme::Light);
    drop(monitor);
    assert!(events.lock().unwrap().is_empty());
    assert!(*source.unsubscriptions.lock().unwrap() >= 2);
}
