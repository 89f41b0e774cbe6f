//! Global Win+Ctrl+Shift+Arrow chord detection.
//!
//! The low-level keyboard hook is a process-wide resource, so its modifier
//! state lives in one static slot owned by the single [`ChordWatcher`]. The
//! hook callback never runs user actions itself: qualifying chords are
//! pushed onto a one-slot queue served by a worker thread and the callback
//! returns straight away.

mod dispatch;
#[cfg(windows)]
mod keyboard_hook;

pub use dispatch::{ActionDispatcher, ChordAction};

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Win,
    Ctrl,
    Shift,
    Left,
    Right,
    Other,
}

const VK_SHIFT: u32 = 0x10;
const VK_CONTROL: u32 = 0x11;
const VK_LEFT: u32 = 0x25;
const VK_RIGHT: u32 = 0x27;
const VK_LWIN: u32 = 0x5B;
const VK_RWIN: u32 = 0x5C;
const VK_LSHIFT: u32 = 0xA0;
const VK_RSHIFT: u32 = 0xA1;
const VK_LCONTROL: u32 = 0xA2;
const VK_RCONTROL: u32 = 0xA3;

impl KeyCode {
    pub fn from_vk(vk_code: u32) -> Self {
        match vk_code {
            VK_LWIN | VK_RWIN => KeyCode::Win,
            VK_CONTROL | VK_LCONTROL | VK_RCONTROL => KeyCode::Ctrl,
            VK_SHIFT | VK_LSHIFT | VK_RSHIFT => KeyCode::Shift,
            VK_LEFT => KeyCode::Left,
            VK_RIGHT => KeyCode::Right,
            _ => KeyCode::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTransition {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookDecision {
    /// Chain to the next hook.
    Forward,
    /// Run the navigation action and swallow the key.
    Swallow(Direction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierState {
    pub win: bool,
    pub ctrl: bool,
    pub shift: bool,
}

impl ModifierState {
    pub fn all_pressed(&self) -> bool {
        self.win && self.ctrl && self.shift
    }

    /// Update the modifier flags for one key event and decide what the hook
    /// should do with it.
    pub fn observe(&mut self, key: KeyCode, transition: KeyTransition) -> HookDecision {
        let down = transition == KeyTransition::Down;
        match key {
            KeyCode::Win => self.win = down,
            KeyCode::Ctrl => self.ctrl = down,
            KeyCode::Shift => self.shift = down,
            KeyCode::Left if down && self.all_pressed() => {
                return HookDecision::Swallow(Direction::Left)
            }
            KeyCode::Right if down && self.all_pressed() => {
                return HookDecision::Swallow(Direction::Right)
            }
            _ => {}
        }
        HookDecision::Forward
    }
}

struct HookShared {
    modifiers: ModifierState,
    dispatcher: ActionDispatcher,
}

static HOOK_STATE: Lazy<Mutex<Option<HookShared>>> = Lazy::new(|| Mutex::new(None));
static WATCHER_TAKEN: AtomicBool = AtomicBool::new(false);

/// Feed one raw key event through the attached watcher. Returns `true` when
/// the event must be swallowed. Without an attached watcher every event is
/// forwarded.
pub fn process_key_event(vk_code: u32, transition: KeyTransition) -> bool {
    let Ok(mut guard) = HOOK_STATE.lock() else {
        return false;
    };
    let Some(shared) = guard.as_mut() else {
        return false;
    };

    match shared.modifiers.observe(KeyCode::from_vk(vk_code), transition) {
        HookDecision::Forward => false,
        HookDecision::Swallow(direction) => {
            tracing::debug!(?direction, "navigation chord");
            shared.dispatcher.dispatch(direction);
            true
        }
    }
}

/// Owner of the process-wide keyboard hook. Only one instance can exist at a
/// time; [`ChordWatcher::acquire`] fails while another one is alive.
#[derive(Debug)]
pub struct ChordWatcher {
    attached: bool,
    #[cfg(windows)]
    backend: keyboard_hook::KeyboardHookBackend,
}

impl ChordWatcher {
    pub fn acquire() -> Result<Self> {
        if WATCHER_TAKEN
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(anyhow!("chord watcher already in use"));
        }
        Ok(Self {
            attached: false,
            #[cfg(windows)]
            backend: keyboard_hook::KeyboardHookBackend::default(),
        })
    }

    /// Install the hook and register the two navigation actions.
    pub fn attach(&mut self, left: ChordAction, right: ChordAction) -> Result<()> {
        if self.attached {
            return Err(anyhow!("chord watcher already attached"));
        }

        let dispatcher = ActionDispatcher::spawn(left, right)?;
        {
            let mut guard = HOOK_STATE
                .lock()
                .map_err(|_| anyhow!("chord hook state lock poisoned"))?;
            *guard = Some(HookShared {
                modifiers: ModifierState::default(),
                dispatcher,
            });
        }

        #[cfg(windows)]
        if let Err(err) = self.backend.install() {
            clear_shared_state();
            return Err(err);
        }

        self.attached = true;
        tracing::info!("navigation chord watcher attached");
        Ok(())
    }

    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }

        #[cfg(windows)]
        if let Err(err) = self.backend.uninstall() {
            tracing::warn!(?err, "failed to uninstall keyboard hook");
        }

        clear_shared_state();
        self.attached = false;
        tracing::info!("navigation chord watcher detached");
    }

    pub fn is_attached(&self) -> bool {
        #[cfg(windows)]
        {
            self.attached && self.backend.is_installed()
        }
        #[cfg(not(windows))]
        {
            self.attached
        }
    }
}

fn clear_shared_state() {
    let shared = HOOK_STATE.lock().ok().and_then(|mut guard| guard.take());
    // Joining the worker happens outside the lock so a running action can
    // never block the hook callback.
    if let Some(mut shared) = shared {
        shared.dispatcher.shutdown();
    }
}

impl Drop for ChordWatcher {
    fn drop(&mut self) {
        self.detach();
        WATCHER_TAKEN.store(false, Ordering::SeqCst);
    }
}
