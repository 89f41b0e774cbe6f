use super::{NotifyCallback, ThemeSource};
use crate::theme::Theme;
use anyhow::{anyhow, Result};
use std::sync::Mutex;
use std::thread::JoinHandle;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{CloseHandle, BOOL, ERROR_SUCCESS, HANDLE, WAIT_OBJECT_0};
use windows::Win32::System::Registry::{
    RegCloseKey, RegGetValueW, RegNotifyChangeKeyValue, RegOpenKeyExW, HKEY, HKEY_CURRENT_USER,
    KEY_NOTIFY, KEY_READ, REG_NOTIFY_CHANGE_LAST_SET, RRF_RT_REG_DWORD,
};
use windows::Win32::System::Threading::{CreateEventW, SetEvent, WaitForMultipleObjects, INFINITE};

const PERSONALIZE_KEY: PCWSTR =
    w!("Software\\Microsoft\\Windows\\CurrentVersion\\Themes\\Personalize");
const LIGHT_THEME_VALUE: PCWSTR = w!("SystemUsesLightTheme");

struct OwnedEvent(HANDLE);

unsafe impl Send for OwnedEvent {}

/// Borrowed copy of an event handle for the watcher thread.
#[derive(Clone, Copy)]
struct RawEvent(HANDLE);

unsafe impl Send for RawEvent {}

impl Drop for OwnedEvent {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

struct Watcher {
    stop: OwnedEvent,
    join: JoinHandle<()>,
}

/// Reads the personalisation key of the current user and watches it with
/// `RegNotifyChangeKeyValue` on a dedicated thread.
#[derive(Default)]
pub struct RegistryThemeSource {
    watcher: Mutex<Option<Watcher>>,
}

impl RegistryThemeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read_light_flag() -> Option<u32> {
    let mut data: u32 = 0;
    let mut size = std::mem::size_of::<u32>() as u32;
    let status = unsafe {
        RegGetValueW(
            HKEY_CURRENT_USER,
            PERSONALIZE_KEY,
            LIGHT_THEME_VALUE,
            RRF_RT_REG_DWORD,
            None,
            Some(&mut data as *mut u32 as *mut core::ffi::c_void),
            Some(&mut size),
        )
    };
    (status == ERROR_SUCCESS).then_some(data)
}

fn watch_loop(stop: RawEvent, notify: NotifyCallback) {
    let mut key = HKEY::default();
    let status = unsafe {
        RegOpenKeyExW(
            HKEY_CURRENT_USER,
            PERSONALIZE_KEY,
            0,
            KEY_NOTIFY | KEY_READ,
            &mut key,
        )
    };
    if status != ERROR_SUCCESS {
        notify(Err(anyhow!("failed to open personalize key: {status:?}")));
        return;
    }

    let changed = match unsafe { CreateEventW(None, BOOL::from(false), BOOL::from(false), None) } {
        Ok(handle) => OwnedEvent(handle),
        Err(err) => {
            notify(Err(anyhow!(err)));
            unsafe {
                let _ = RegCloseKey(key);
            }
            return;
        }
    };

    loop {
        let status = unsafe {
            RegNotifyChangeKeyValue(
                key,
                BOOL::from(false),
                REG_NOTIFY_CHANGE_LAST_SET,
                changed.0,
                BOOL::from(true),
            )
        };
        if status != ERROR_SUCCESS {
            notify(Err(anyhow!("RegNotifyChangeKeyValue failed: {status:?}")));
            break;
        }

        let handles = [changed.0, stop.0];
        let wait = unsafe { WaitForMultipleObjects(&handles, BOOL::from(false), INFINITE) };
        if wait == WAIT_OBJECT_0 {
            notify(Ok(()));
        } else if wait.0 == WAIT_OBJECT_0.0 + 1 {
            break;
        } else {
            notify(Err(anyhow!("waiting for registry change failed: {wait:?}")));
            break;
        }
    }

    unsafe {
        let _ = RegCloseKey(key);
    }
}

impl ThemeSource for RegistryThemeSource {
    fn current_theme(&self) -> Result<Theme> {
        Ok(Theme::from_light_flag(read_light_flag()))
    }

    fn subscribe(&self, notify: NotifyCallback) -> Result<()> {
        let mut guard = self
            .watcher
            .lock()
            .map_err(|_| anyhow!("registry watcher lock poisoned"))?;
        if guard.is_some() {
            return Err(anyhow!("registry watcher already running"));
        }

        let stop = OwnedEvent(unsafe {
            CreateEventW(None, BOOL::from(true), BOOL::from(false), None)
        }?);
        let stop_raw = RawEvent(stop.0);
        let join = std::thread::Builder::new()
            .name("theme-watcher".into())
            .spawn(move || watch_loop(stop_raw, notify))?;

        *guard = Some(Watcher { stop, join });
        Ok(())
    }

    fn unsubscribe(&self) {
        let watcher = match self.watcher.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(watcher) = watcher {
            unsafe {
                let _ = SetEvent(watcher.stop.0);
            }
            let _ = watcher.join.join();
        }
    }
}
