//! Virtual desktop collaborator and the navigation helpers built on it.
//!
//! Desktop indices passed to [`DesktopApi`] are zero based, except for
//! [`DesktopApi::current_index`] which reports the visible desktop as a one
//! based number to match the digits drawn in the tray.

use crate::chord::Direction;
use anyhow::{Context, Result};

pub trait DesktopApi {
    fn count(&self) -> Result<u32>;
    /// One based index of the visible desktop.
    fn current_index(&self) -> Result<u32>;
    fn create(&self) -> Result<()>;
    fn make_visible(&self, index: u32) -> Result<()>;
    fn name_of(&self, index: u32) -> Result<String>;
    fn move_active_window_to(&self, index: u32) -> Result<()>;
}

/// Switch to desktop `index`, creating missing desktops first.
pub fn switch_to(api: &dyn DesktopApi, index: u32) -> Result<()> {
    let count = api.count().context("reading desktop count")?;
    for _ in count..=index {
        api.create().context("creating virtual desktop")?;
    }
    api.make_visible(index)
        .with_context(|| format!("switching to desktop {}", index + 1))?;
    tracing::debug!(desktop = index + 1, "switched desktop");
    Ok(())
}

/// Target of a chord navigation from the one based `current` desktop, or
/// `None` when already at the left edge.
pub fn adjacent_index(current: u32, direction: Direction) -> Option<u32> {
    let zero_based = current.checked_sub(1)?;
    match direction {
        Direction::Left => zero_based.checked_sub(1),
        Direction::Right => Some(zero_based + 1),
    }
}

/// Move the foreground window to the neighbouring desktop and follow it.
/// Moving right past the last desktop creates a new one.
pub fn move_active_window(api: &dyn DesktopApi, direction: Direction) -> Result<()> {
    let current = api.current_index().context("reading current desktop")?;
    let Some(target) = adjacent_index(current, direction) else {
        tracing::debug!(?direction, current, "no desktop in that direction");
        return Ok(());
    };

    let count = api.count().context("reading desktop count")?;
    for _ in count..=target {
        api.create().context("creating virtual desktop")?;
    }
    api.move_active_window_to(target)
        .with_context(|| format!("moving window to desktop {}", target + 1))?;
    switch_to(api, target)
}

#[cfg(windows)]
pub use platform::VirtualDesktops;

#[cfg(windows)]
mod platform {
    use super::DesktopApi;
    use anyhow::{anyhow, Result};
    use windows::Win32::UI::WindowsAndMessaging::GetForegroundWindow;

    /// `winvd` backed implementation talking to the shell's virtual desktop
    /// manager.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct VirtualDesktops;

    fn vd_err(err: winvd::Error) -> anyhow::Error {
        anyhow!("virtual desktop api: {err:?}")
    }

    impl DesktopApi for VirtualDesktops {
        fn count(&self) -> Result<u32> {
            winvd::get_desktop_count().map_err(vd_err)
        }

        fn current_index(&self) -> Result<u32> {
            let desktop = winvd::get_current_desktop().map_err(vd_err)?;
            Ok(desktop.get_index().map_err(vd_err)? + 1)
        }

        fn create(&self) -> Result<()> {
            winvd::create_desktop().map(|_| ()).map_err(vd_err)
        }

        fn make_visible(&self, index: u32) -> Result<()> {
            winvd::switch_desktop(index).map_err(vd_err)
        }

        fn name_of(&self, index: u32) -> Result<String> {
            winvd::get_desktop(index).get_name().map_err(vd_err)
        }

        fn move_active_window_to(&self, index: u32) -> Result<()> {
            let hwnd = unsafe { GetForegroundWindow() };
            if hwnd.0.is_null() {
                return Ok(());
            }
            winvd::move_window_to_desktop(index, &hwnd).map_err(vd_err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_index_respects_left_edge() {
        assert_eq!(adjacent_index(1, Direction::Left), None);
        assert_eq!(adjacent_index(2, Direction::Left), Some(0));
        assert_eq!(adjacent_index(1, Direction::Right), Some(1));
        assert_eq!(adjacent_index(0, Direction::Right), None);
    }
}
