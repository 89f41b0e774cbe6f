//! Light/dark appearance tracking.
//!
//! [`ThemeMonitor`] keeps the last observed [`Theme`] and raises a change
//! event only when a notification from its [`ThemeSource`] actually flips the
//! value. A failing notification channel shuts the monitor down for good; the
//! indicator then keeps drawing with the last known palette.

#[cfg(windows)]
pub mod registry;

use crate::theme::Theme;
use anyhow::Result;
use std::sync::{Arc, Mutex, Weak};

/// Invoked by a [`ThemeSource`] whenever the underlying value may have
/// changed. An `Err` means the channel is broken and no more notifications
/// will follow.
pub type NotifyCallback = Box<dyn Fn(Result<()>) + Send + Sync>;

/// Receives the new theme after each observed transition.
pub type ThemeListener = Box<dyn FnMut(Theme) + Send>;

pub trait ThemeSource: Send + Sync {
    fn current_theme(&self) -> Result<Theme>;
    fn subscribe(&self, notify: NotifyCallback) -> Result<()>;
    /// Must be idempotent and safe to call without a prior subscription.
    fn unsubscribe(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorLifecycle {
    Initialized,
    Running,
    Stopped,
}

struct MonitorState {
    current: Theme,
    lifecycle: MonitorLifecycle,
}

pub struct ThemeMonitor {
    source: Arc<dyn ThemeSource>,
    state: Arc<Mutex<MonitorState>>,
    listener: Arc<Mutex<Option<ThemeListener>>>,
}

impl ThemeMonitor {
    /// Reads the current theme once. An unreadable value counts as dark.
    pub fn new(source: Arc<dyn ThemeSource>) -> Self {
        let current = source.current_theme().unwrap_or_else(|err| {
            tracing::warn!(?err, "failed to read system theme; assuming dark");
            Theme::Dark
        });
        tracing::debug!(%current, "theme monitor initialized");
        Self {
            source,
            state: Arc::new(Mutex::new(MonitorState {
                current,
                lifecycle: MonitorLifecycle::Initialized,
            })),
            listener: Arc::new(Mutex::new(None)),
        }
    }

    pub fn current_theme(&self) -> Theme {
        self.state
            .lock()
            .map(|s| s.current)
            .unwrap_or(Theme::Dark)
    }

    pub fn lifecycle(&self) -> MonitorLifecycle {
        self.state
            .lock()
            .map(|s| s.lifecycle)
            .unwrap_or(MonitorLifecycle::Stopped)
    }

    /// Register the single change listener, replacing any previous one.
    pub fn on_change(&self, listener: ThemeListener) {
        if let Ok(mut guard) = self.listener.lock() {
            *guard = Some(listener);
        }
    }

    /// Subscribe to change notifications. Does nothing when already running
    /// or after the monitor has been stopped.
    pub fn start(&self) -> Result<()> {
        {
            let mut state = self
                .state
                .lock()
                .map_err(|_| anyhow::anyhow!("theme monitor lock poisoned"))?;
            if state.lifecycle != MonitorLifecycle::Initialized {
                return Ok(());
            }
            state.lifecycle = MonitorLifecycle::Running;
        }

        let source = Arc::downgrade(&self.source);
        let state = Arc::clone(&self.state);
        let listener = Arc::clone(&self.listener);
        let notify: NotifyCallback = Box::new(move |result| {
            handle_notification(&source, &state, &listener, result);
        });

        if let Err(err) = self.source.subscribe(notify) {
            tracing::warn!(?err, "theme change notifications unavailable");
            if let Ok(mut state) = self.state.lock() {
                state.lifecycle = MonitorLifecycle::Stopped;
            }
            return Err(err);
        }
        tracing::info!("theme monitor started");
        Ok(())
    }

    pub fn stop(&self) {
        let was_running = match self.state.lock() {
            Ok(mut state) => {
                let running = state.lifecycle == MonitorLifecycle::Running;
                state.lifecycle = MonitorLifecycle::Stopped;
                running
            }
            Err(_) => true,
        };
        self.source.unsubscribe();
        if was_running {
            tracing::info!("theme monitor stopped");
        }
    }
}

impl Drop for ThemeMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_notification(
    source: &Weak<dyn ThemeSource>,
    state: &Mutex<MonitorState>,
    listener: &Mutex<Option<ThemeListener>>,
    result: Result<()>,
) {
    let Some(source) = source.upgrade() else {
        return;
    };

    let changed = {
        let Ok(mut state) = state.lock() else {
            return;
        };
        if state.lifecycle != MonitorLifecycle::Running {
            return;
        }
        if let Err(err) = result {
            tracing::warn!(?err, "theme notification channel failed; disabling theme updates");
            state.lifecycle = MonitorLifecycle::Stopped;
            return;
        }
        let theme = match source.current_theme() {
            Ok(theme) => theme,
            Err(err) => {
                tracing::warn!(?err, "failed to re-read system theme");
                return;
            }
        };
        if theme == state.current {
            return;
        }
        tracing::debug!(from = %state.current, to = %theme, "system theme changed");
        state.current = theme;
        theme
    };

    if let Ok(mut guard) = listener.lock() {
        if let Some(callback) = guard.as_mut() {
            callback(changed);
        }
    }
}
