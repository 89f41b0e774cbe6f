use super::{process_key_event, KeyTransition};
use anyhow::{anyhow, Result};
use std::thread::JoinHandle;
use std::time::Duration;
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PeekMessageW, PostThreadMessageW,
    SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx, HC_ACTION, HHOOK, KBDLLHOOKSTRUCT,
    MSG, PM_NOREMOVE, WH_KEYBOARD_LL, WM_KEYDOWN, WM_KEYUP, WM_QUIT, WM_SYSKEYDOWN, WM_SYSKEYUP,
};

const HOOK_READY_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug)]
struct HookThread {
    thread_id: u32,
    join: JoinHandle<()>,
}

/// `WH_KEYBOARD_LL` hook living on its own message loop thread.
#[derive(Debug, Default)]
pub struct KeyboardHookBackend {
    hook_thread: Option<HookThread>,
}

impl KeyboardHookBackend {
    pub fn install(&mut self) -> Result<()> {
        if self.hook_thread.is_some() {
            return Ok(());
        }

        let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel::<Result<u32>>(1);

        let join = std::thread::Builder::new()
            .name("keyboard-hook".into())
            .spawn(move || {
                let mut msg = MSG::default();
                // Force creation of the thread message queue before the id
                // is handed out for `PostThreadMessageW`.
                unsafe {
                    let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
                }

                let thread_id = unsafe { GetCurrentThreadId() };
                let hmodule = match unsafe { GetModuleHandleW(None) } {
                    Ok(h) => h,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow!(err)));
                        return;
                    }
                };

                let hook = match unsafe {
                    SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), hmodule, 0)
                } {
                    Ok(h) if !h.0.is_null() => h,
                    Ok(_) => {
                        let _ = ready_tx.send(Err(anyhow!(windows::core::Error::from_win32())));
                        return;
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow!(err)));
                        return;
                    }
                };

                let _ = ready_tx.send(Ok(thread_id));

                loop {
                    let r = unsafe { GetMessageW(&mut msg, None, 0, 0) };
                    if r.0 <= 0 {
                        break;
                    }
                    unsafe {
                        let _ = TranslateMessage(&msg);
                        DispatchMessageW(&msg);
                    }
                }

                unsafe {
                    let _ = UnhookWindowsHookEx(hook);
                }
            })?;

        let thread_id = ready_rx
            .recv_timeout(HOOK_READY_TIMEOUT)
            .map_err(|_| anyhow!("keyboard hook thread did not signal readiness"))??;

        tracing::debug!(thread_id, "keyboard hook installed");
        self.hook_thread = Some(HookThread { thread_id, join });
        Ok(())
    }

    pub fn uninstall(&mut self) -> Result<()> {
        if let Some(th) = self.hook_thread.take() {
            unsafe {
                PostThreadMessageW(th.thread_id, WM_QUIT, WPARAM(0), LPARAM(0))?;
            }
            th.join
                .join()
                .map_err(|_| anyhow!("keyboard hook thread panicked"))?;
            tracing::debug!("keyboard hook removed");
        }
        Ok(())
    }

    pub fn is_installed(&self) -> bool {
        self.hook_thread.is_some()
    }
}

unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        let transition = match w_param.0 as u32 {
            WM_KEYDOWN | WM_SYSKEYDOWN => Some(KeyTransition::Down),
            WM_KEYUP | WM_SYSKEYUP => Some(KeyTransition::Up),
            _ => None,
        };
        if let Some(transition) = transition {
            let info = unsafe { &*(l_param.0 as *const KBDLLHOOKSTRUCT) };
            if process_key_event(info.vkCode, transition) {
                return LRESULT(1);
            }
        }
    }

    unsafe { CallNextHookEx(HHOOK(std::ptr::null_mut()), n_code, w_param, l_param) }
}
