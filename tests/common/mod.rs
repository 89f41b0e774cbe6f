#![allow(dead_code)]

use anyhow::{anyhow, Result};
use desktop_indicator::appearance::{NotifyCallback, ThemeSource};
use desktop_indicator::desktop::DesktopApi;
use desktop_indicator::icon::Bitmap;
use desktop_indicator::indicator::{TrayBackend, TraySlot};
use desktop_indicator::theme::Theme;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Mutex;

/// In-memory virtual desktops. `current` is one based.
pub struct FakeDesktops {
    pub names: RefCell<Vec<String>>,
    pub current: Cell<u32>,
    pub fail_reads: Cell<bool>,
    pub created: Cell<u32>,
    pub moved_to: RefCell<Vec<u32>>,
}

impl FakeDesktops {
    pub fn new(count: u32, current: u32) -> Rc<Self> {
        Rc::new(Self {
            names: RefCell::new((1..=count).map(|i| format!("Desktop {i}")).collect()),
            current: Cell::new(current),
            fail_reads: Cell::new(false),
            created: Cell::new(0),
            moved_to: RefCell::new(Vec::new()),
        })
    }

    fn check(&self) -> Result<()> {
        if self.fail_reads.get() {
            Err(anyhow!("desktop manager unavailable"))
        } else {
            Ok(())
        }
    }
}

impl DesktopApi for FakeDesktops {
    fn count(&self) -> Result<u32> {
        self.check()?;
        Ok(self.names.borrow().len() as u32)
    }

    fn current_index(&self) -> Result<u32> {
        self.check()?;
        Ok(self.current.get())
    }

    fn create(&self) -> Result<()> {
        let mut names = self.names.borrow_mut();
        let next = names.len() + 1;
        names.push(format!("Desktop {next}"));
        self.created.set(self.created.get() + 1);
        Ok(())
    }

    fn make_visible(&self, index: u32) -> Result<()> {
        if index as usize >= self.names.borrow().len() {
            return Err(anyhow!("desktop {index} does not exist"));
        }
        self.current.set(index + 1);
        Ok(())
    }

    fn name_of(&self, index: u32) -> Result<String> {
        self.names
            .borrow()
            .get(index as usize)
            .cloned()
            .ok_or_else(|| anyhow!("desktop {index} does not exist"))
    }

    fn move_active_window_to(&self, index: u32) -> Result<()> {
        if index as usize >= self.names.borrow().len() {
            return Err(anyhow!("desktop {index} does not exist"));
        }
        self.moved_to.borrow_mut().push(index);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SlotRecord {
    pub icon: Option<Bitmap>,
    pub tooltip: String,
    pub visible: bool,
    pub icon_updates: usize,
}

pub type SlotRecords = Rc<RefCell<Vec<SlotRecord>>>;

/// Tray backend whose icons are the rendered bitmaps themselves.
pub struct FakeTray {
    pub records: SlotRecords,
    pub metric: (i32, i32),
    pub fail_conversion: Rc<Cell<bool>>,
}

impl FakeTray {
    pub fn new(metric: (i32, i32)) -> Self {
        Self {
            records: Rc::new(RefCell::new(Vec::new())),
            metric,
            fail_conversion: Rc::new(Cell::new(false)),
        }
    }
}

pub struct FakeSlot {
    index: usize,
    records: SlotRecords,
}

impl TraySlot for FakeSlot {
    type Icon = Bitmap;

    fn set_icon(&mut self, icon: &Bitmap) -> Result<()> {
        let mut records = self.records.borrow_mut();
        let record = &mut records[self.index];
        record.icon = Some(icon.clone());
        record.icon_updates += 1;
        Ok(())
    }

    fn set_tooltip(&mut self, text: &str) -> Result<()> {
        self.records.borrow_mut()[self.index].tooltip = text.to_string();
        Ok(())
    }

    fn set_visible(&mut self, visible: bool) -> Result<()> {
        self.records.borrow_mut()[self.index].visible = visible;
        Ok(())
    }
}

impl TrayBackend for FakeTray {
    type Icon = Bitmap;
    type Slot = FakeSlot;

    fn icon_metric(&self) -> (i32, i32) {
        self.metric
    }

    fn convert(&self, bitmap: Bitmap) -> Option<Bitmap> {
        if self.fail_conversion.get() {
            None
        } else {
            Some(bitmap)
        }
    }

    fn create_slot(&mut self, index: usize, tooltip: &str) -> Result<FakeSlot> {
        let mut records = self.records.borrow_mut();
        assert_eq!(records.len(), index, "slots are created in order");
        records.push(SlotRecord {
            tooltip: tooltip.to_string(),
            ..SlotRecord::default()
        });
        Ok(FakeSlot {
            index,
            records: Rc::clone(&self.records),
        })
    }
}

/// Theme source driven by the test through [`FakeThemeSource::notify`].
pub struct FakeThemeSource {
    pub theme: Mutex<Theme>,
    pub callback: Mutex<Option<NotifyCallback>>,
    pub subscriptions: Mutex<usize>,
    pub unsubscriptions: Mutex<usize>,
}

impl FakeThemeSource {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme: Mutex::new(theme),
            callback: Mutex::new(None),
            subscriptions: Mutex::new(0),
            unsubscriptions: Mutex::new(0),
        }
    }

    pub fn set_theme(&self, theme: Theme) {
        *self.theme.lock().unwrap() = theme;
    }

    /// Deliver one notification. Returns `false` when nobody is subscribed.
    pub fn notify(&self, result: Result<()>) -> bool {
        let guard = self.callback.lock().unwrap();
        match guard.as_ref() {
            Some(callback) => {
                callback(result);
                true
            }
            None => false,
        }
    }
}

impl ThemeSource for FakeThemeSource {
    fn current_theme(&self) -> Result<Theme> {
        Ok(*self.theme.lock().unwrap())
    }

    fn subscribe(&self, notify: NotifyCallback) -> Result<()> {
        *self.callback.lock().unwrap() = Some(notify);
        *self.subscriptions.lock().unwrap() += 1;
        Ok(())
    }

    fn unsubscribe(&self) {
        *self.callback.lock().unwrap() = None;
        *self.unsubscriptions.lock().unwrap() += 1;
    }
}
