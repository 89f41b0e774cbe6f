//! Tray slots reconciled against the virtual desktop state.
//!
//! The controller lives on the UI thread. Theme changes and chord requests
//! coming from other threads have to be marshaled there by the host before
//! they reach it.

mod timer;

pub use timer::PollTimer;

use crate::desktop::DesktopApi;
use crate::icon::{icon_size, render, Bitmap, IconSize};
use crate::theme::{palette_for, Theme};
use anyhow::{Context, Result};
use std::rc::Rc;
use std::time::{Duration, Instant};

pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub trait TraySlot {
    type Icon;
    fn set_icon(&mut self, icon: &Self::Icon) -> Result<()>;
    fn set_tooltip(&mut self, text: &str) -> Result<()>;
    fn set_visible(&mut self, visible: bool) -> Result<()>;
}

pub trait TrayBackend {
    type Icon: Clone;
    type Slot: TraySlot<Icon = Self::Icon>;

    /// Native icon metric as reported by the platform, in pixels.
    fn icon_metric(&self) -> (i32, i32);
    /// Convert a rendered bitmap; `None` when the platform rejects it.
    fn convert(&self, bitmap: Bitmap) -> Option<Self::Icon>;
    fn create_slot(&mut self, index: usize, tooltip: &str) -> Result<Self::Slot>;
}

/// Default and active icon of one slot. A variant is `None` only when it has
/// never been converted successfully.
#[derive(Debug, Clone)]
pub struct IconSet<I> {
    pub default: Option<I>,
    pub active: Option<I>,
}

impl<I> Default for IconSet<I> {
    fn default() -> Self {
        Self {
            default: None,
            active: None,
        }
    }
}

pub type NavigationHandler = Box<dyn FnMut(usize) -> Result<()>>;

struct Slot<S, I> {
    handle: Option<S>,
    icons: IconSet<I>,
    tooltip: String,
}

pub fn placeholder_tooltip(index: usize) -> String {
    format!("Desktop {}", index + 1)
}

pub struct IndicatorController<B: TrayBackend> {
    backend: B,
    desktops: Rc<dyn DesktopApi>,
    slots: Vec<Slot<B::Slot, B::Icon>>,
    icon_size: IconSize,
    theme: Theme,
    timer: PollTimer,
    last_observed: Option<u32>,
    active_slot: Option<usize>,
    visible: bool,
    disposed: bool,
    on_navigate: Option<NavigationHandler>,
}

impl<B: TrayBackend> IndicatorController<B> {
    pub fn new(
        mut backend: B,
        desktops: Rc<dyn DesktopApi>,
        slot_count: usize,
        theme: Theme,
    ) -> Result<Self> {
        let (metric_w, metric_h) = backend.icon_metric();
        let icon_size = icon_size(metric_w, metric_h);

        let mut slots = Vec::with_capacity(slot_count);
        for index in 0..slot_count {
            let tooltip = placeholder_tooltip(index);
            let handle = backend
                .create_slot(index, &tooltip)
                .with_context(|| format!("creating tray icon for slot {}", index + 1))?;
            slots.push(Slot {
                handle: Some(handle),
                icons: IconSet::default(),
                tooltip,
            });
        }

        let mut controller = Self {
            backend,
            desktops,
            slots,
            icon_size,
            theme,
            timer: PollTimer::new(POLL_INTERVAL),
            last_observed: None,
            active_slot: None,
            visible: false,
            disposed: false,
            on_navigate: None,
        };
        controller.create_icons(theme)?;
        tracing::info!(
            slots = slot_count,
            width = icon_size.width,
            height = icon_size.height,
            %theme,
            "indicator created"
        );
        Ok(controller)
    }

    /// Register the single navigation listener. It runs synchronously on the
    /// UI thread and is expected to have switched desktops when it returns.
    pub fn on_navigate(&mut self, handler: NavigationHandler) {
        self.on_navigate = Some(handler);
    }

    /// Arm the poll timer and show every slot.
    pub fn display(&mut self) {
        if self.disposed {
            return;
        }
        self.timer.arm(Instant::now());
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(handle) = slot.handle.as_mut() {
                if let Err(err) = handle.set_visible(true) {
                    tracing::warn!(?err, slot = index + 1, "failed to show tray icon");
                }
            }
        }
        self.visible = true;
    }

    /// Rebuild every icon set from the palette of `theme`, then redraw.
    pub fn create_icons(&mut self, theme: Theme) -> Result<()> {
        let palette = palette_for(theme);
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let digit = index as u32 + 1;
            let default = self
                .backend
                .convert(render(digit, palette, false, self.icon_size));
            let active = self
                .backend
                .convert(render(digit, palette, true, self.icon_size));
            if default.is_none() || active.is_none() {
                tracing::warn!(slot = digit, "icon conversion failed; keeping previous icon");
            }
            let previous = std::mem::take(&mut slot.icons);
            slot.icons = IconSet {
                default: default.or(previous.default),
                active: active.or(previous.active),
            };
        }
        self.theme = theme;
        tracing::debug!(%theme, "icons rebuilt");
        self.refresh()
    }

    /// Poll timer handler. Errors mean the desktop state can no longer be
    /// trusted and are fatal for the host.
    pub fn tick(&mut self) -> Result<()> {
        self.refresh_tooltips()?;

        let current = self
            .desktops
            .current_index()
            .context("reading current desktop")?;
        if self.last_observed != Some(current) {
            tracing::debug!(from = ?self.last_observed, to = current, "desktop changed");
            self.last_observed = Some(current);
            self.redraw(current);
        }
        Ok(())
    }

    /// Slot click handler. Clicking the active slot does nothing.
    pub fn click(&mut self, index: usize) -> Result<()> {
        if index >= self.slots.len() || self.disposed {
            return Ok(());
        }
        let current = self
            .desktops
            .current_index()
            .context("reading current desktop")?;
        if index as u32 + 1 == current {
            return Ok(());
        }

        tracing::debug!(desktop = index + 1, "navigation requested");
        if let Some(handler) = self.on_navigate.as_mut() {
            handler(index)?;
        }
        self.refresh()
    }

    /// Re-read the current desktop and redraw unconditionally.
    pub fn refresh(&mut self) -> Result<()> {
        let current = self
            .desktops
            .current_index()
            .context("reading current desktop")?;
        self.last_observed = Some(current);
        self.redraw(current);
        Ok(())
    }

    /// Run [`tick`](Self::tick) when the poll timer is due at `now`.
    pub fn poll_due(&mut self, now: Instant) -> Result<bool> {
        if !self.timer.poll(now) {
            return Ok(false);
        }
        self.tick()?;
        Ok(true)
    }

    pub fn next_poll_deadline(&self) -> Option<Instant> {
        self.timer.next_deadline()
    }

    /// Hide and release every slot and stop polling. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.timer.disarm();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(mut handle) = slot.handle.take() {
                if let Err(err) = handle.set_visible(false) {
                    tracing::warn!(?err, slot = index + 1, "failed to hide tray icon");
                }
            }
        }
        self.visible = false;
        self.disposed = true;
        tracing::info!("indicator disposed");
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Slot currently showing its active icon.
    pub fn active_slot(&self) -> Option<usize> {
        self.active_slot
    }

    pub fn tooltip(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(|s| s.tooltip.as_str())
    }

    pub fn icon_set(&self, index: usize) -> Option<&IconSet<B::Icon>> {
        self.slots.get(index).map(|s| &s.icons)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn icon_size(&self) -> IconSize {
        self.icon_size
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_polling(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn refresh_tooltips(&mut self) -> Result<()> {
        let count = self.desktops.count().context("reading desktop count")? as usize;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let text = if index < count {
                let name = self
                    .desktops
                    .name_of(index as u32)
                    .with_context(|| format!("reading name of desktop {}", index + 1))?;
                if name.trim().is_empty() {
                    placeholder_tooltip(index)
                } else {
                    name
                }
            } else {
                placeholder_tooltip(index)
            };
            if text == slot.tooltip {
                continue;
            }
            if let Some(handle) = slot.handle.as_mut() {
                if let Err(err) = handle.set_tooltip(&text) {
                    tracing::warn!(?err, slot = index + 1, "failed to update tooltip");
                    continue;
                }
            }
            slot.tooltip = text;
        }
        Ok(())
    }

    /// Show the active icon on the slot matching the one based `current`
    /// desktop and the default icon everywhere else.
    fn redraw(&mut self, current: u32) {
        if self.disposed {
            return;
        }
        let mut active_slot = None;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let is_active = index as u32 + 1 == current;
            if is_active {
                active_slot = Some(index);
            }
            let icon = if is_active {
                slot.icons.active.as_ref()
            } else {
                slot.icons.default.as_ref()
            };
            let (Some(handle), Some(icon)) = (slot.handle.as_mut(), icon) else {
                continue;
            };
            if let Err(err) = handle.set_icon(icon) {
                tracing::warn!(?err, slot = index + 1, "failed to set tray icon");
            }
        }
        self.active_slot = active_slot;
    }
}

impl<B: TrayBackend> Drop for IndicatorController<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}
