//! UI-thread state of the running indicator and its event handling.
//!
//! The host only translates platform events into [`AppEvent`]s and decides
//! what to do with errors; everything that touches the controller lives here.

use crate::appearance::ThemeMonitor;
use crate::chord::{ChordWatcher, Direction};
use crate::desktop::{move_active_window, DesktopApi};
use crate::indicator::{IndicatorController, TrayBackend};
use crate::theme::Theme;
use anyhow::Result;
use std::rc::Rc;
use std::time::Instant;

/// Messages marshaled onto the UI thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    ThemeChanged(Theme),
    Navigate(Direction),
    SlotClicked(usize),
}

pub struct App<B: TrayBackend> {
    indicator: IndicatorController<B>,
    monitor: ThemeMonitor,
    chords: Option<ChordWatcher>,
    desktops: Rc<dyn DesktopApi>,
    shut_down: bool,
}

impl<B: TrayBackend> App<B> {
    pub fn new(
        indicator: IndicatorController<B>,
        monitor: ThemeMonitor,
        chords: Option<ChordWatcher>,
        desktops: Rc<dyn DesktopApi>,
    ) -> Self {
        Self {
            indicator,
            monitor,
            chords,
            desktops,
            shut_down: false,
        }
    }

    /// Show the slots and begin watching the system theme.
    pub fn start(&mut self) {
        self.indicator.display();
        if let Err(err) = self.monitor.start() {
            tracing::warn!(?err, "continuing without theme updates");
        }
    }

    /// Apply one event. An error means the desktop state can no longer be
    /// read and the indicator has to go away.
    pub fn handle(&mut self, event: AppEvent) -> Result<()> {
        if self.shut_down {
            return Ok(());
        }
        match event {
            AppEvent::ThemeChanged(theme) => {
                tracing::info!(%theme, "applying system theme");
                self.indicator.create_icons(theme)
            }
            AppEvent::SlotClicked(index) => self.indicator.click(index),
            AppEvent::Navigate(direction) => {
                if let Err(err) = move_active_window(self.desktops.as_ref(), direction) {
                    tracing::warn!(?err, ?direction, "chord navigation failed");
                }
                self.indicator.refresh()
            }
        }
    }

    /// Run the poll tick when due and return the next wake-up deadline.
    pub fn poll(&mut self, now: Instant) -> Result<Option<Instant>> {
        if self.shut_down {
            return Ok(None);
        }
        self.indicator.poll_due(now)?;
        Ok(self.indicator.next_poll_deadline())
    }

    /// Remove the keyboard hook, stop theme notifications and take every
    /// slot out of the tray. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        if let Some(mut watcher) = self.chords.take() {
            watcher.detach();
        }
        self.monitor.stop();
        self.indicator.dispose();
        self.shut_down = true;
        tracing::info!("indicator shut down");
    }

    pub fn indicator(&self) -> &IndicatorController<B> {
        &self.indicator
    }

    pub fn monitor(&self) -> &ThemeMonitor {
        &self.monitor
    }
}

impl<B: TrayBackend> Drop for App<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
