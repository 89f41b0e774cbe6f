//! Windows host: tray icons, the UI event loop and the wiring between the
//! controller, the theme monitor and the chord watcher.

use crate::app::{App, AppEvent};
use crate::appearance::registry::RegistryThemeSource;
use crate::appearance::ThemeMonitor;
use crate::chord::{ChordAction, ChordWatcher, Direction};
use crate::desktop::{switch_to, DesktopApi, VirtualDesktops};
use crate::icon::Bitmap;
use crate::indicator::{IndicatorController, TrayBackend, TraySlot};
use anyhow::Result;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tray_icon::{Icon, MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent};
use windows::Win32::UI::WindowsAndMessaging::{GetSystemMetrics, SM_CXICON, SM_CYICON};
use winit::event::Event;
use winit::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy};

pub const APP_TITLE: &str = "Virtual Desktop Indicator";
const SLOT_ID_PREFIX: &str = "desktop-slot-";

pub fn slot_id(index: usize) -> String {
    format!("{SLOT_ID_PREFIX}{index}")
}

pub fn slot_index(id: &str) -> Option<usize> {
    id.strip_prefix(SLOT_ID_PREFIX)?.parse().ok()
}

pub struct TrayIconSlot(TrayIcon);

impl TraySlot for TrayIconSlot {
    type Icon = Icon;

    fn set_icon(&mut self, icon: &Icon) -> Result<()> {
        self.0.set_icon(Some(icon.clone()))?;
        Ok(())
    }

    fn set_tooltip(&mut self, text: &str) -> Result<()> {
        self.0.set_tooltip(Some(text))?;
        Ok(())
    }

    fn set_visible(&mut self, visible: bool) -> Result<()> {
        self.0.set_visible(visible)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct TrayIconBackend;

impl TrayBackend for TrayIconBackend {
    type Icon = Icon;
    type Slot = TrayIconSlot;

    fn icon_metric(&self) -> (i32, i32) {
        unsafe { (GetSystemMetrics(SM_CXICON), GetSystemMetrics(SM_CYICON)) }
    }

    fn convert(&self, bitmap: Bitmap) -> Option<Icon> {
        let (width, height) = (bitmap.width(), bitmap.height());
        match Icon::from_rgba(bitmap.into_rgba(), width, height) {
            Ok(icon) => Some(icon),
            Err(err) => {
                tracing::warn!(?err, "failed to convert bitmap to tray icon");
                None
            }
        }
    }

    fn create_slot(&mut self, index: usize, tooltip: &str) -> Result<TrayIconSlot> {
        let tray = TrayIconBuilder::new()
            .with_id(slot_id(index))
            .with_tooltip(tooltip)
            .build()?;
        tray.set_visible(false)?;
        Ok(TrayIconSlot(tray))
    }
}

/// Report a fatal desktop state error, remove the tray icons and terminate
/// the process with a non-zero exit code.
fn fatal(app: &mut App<TrayIconBackend>, err: anyhow::Error) -> ! {
    tracing::error!(?err, "unrecoverable indicator error");
    let _ = rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title(APP_TITLE)
        .set_description("An unhandled error occurred!")
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
    app.shutdown();
    std::process::exit(1);
}

fn navigation_action(proxy: &EventLoopProxy<AppEvent>, direction: Direction) -> ChordAction {
    let proxy = Mutex::new(proxy.clone());
    Box::new(move || {
        if let Ok(proxy) = proxy.lock() {
            let _ = proxy.send_event(AppEvent::Navigate(direction));
        }
    })
}

pub struct HostOptions {
    pub slot_count: usize,
    pub chord_navigation: bool,
}

pub fn run(options: HostOptions) -> Result<()> {
    let event_loop = EventLoopBuilder::<AppEvent>::with_user_event().build()?;
    let proxy = event_loop.create_proxy();

    let desktops: Rc<dyn DesktopApi> = Rc::new(VirtualDesktops);
    let monitor = ThemeMonitor::new(Arc::new(RegistryThemeSource::new()));

    let mut indicator = IndicatorController::new(
        TrayIconBackend,
        Rc::clone(&desktops),
        options.slot_count,
        monitor.current_theme(),
    )?;

    let switch_desktops = Rc::clone(&desktops);
    indicator.on_navigate(Box::new(move |index| {
        switch_to(switch_desktops.as_ref(), index as u32)
    }));

    let tray_proxy = Mutex::new(proxy.clone());
    TrayIconEvent::set_event_handler(Some(move |event: TrayIconEvent| {
        if let TrayIconEvent::Click {
            id,
            button: MouseButton::Left,
            button_state: MouseButtonState::Up,
            ..
        } = event
        {
            if let (Some(index), Ok(proxy)) = (slot_index(&id.0), tray_proxy.lock()) {
                let _ = proxy.send_event(AppEvent::SlotClicked(index));
            }
        }
    }));

    let theme_proxy = proxy.clone();
    monitor.on_change(Box::new(move |theme| {
        let _ = theme_proxy.send_event(AppEvent::ThemeChanged(theme));
    }));

    let mut chords = None;
    if options.chord_navigation {
        let mut watcher = ChordWatcher::acquire()?;
        match watcher.attach(
            navigation_action(&proxy, Direction::Left),
            navigation_action(&proxy, Direction::Right),
        ) {
            Ok(()) => chords = Some(watcher),
            Err(err) => tracing::warn!(?err, "keyboard chords unavailable"),
        }
    }

    let mut app = App::new(indicator, monitor, chords, desktops);
    app.start();

    event_loop.run(move |event, elwt| {
        let handled = match event {
            Event::UserEvent(event) => app.handle(event),
            Event::LoopExiting => {
                app.shutdown();
                Ok(())
            }
            _ => Ok(()),
        };
        if let Err(err) = handled {
            fatal(&mut app, err);
        }

        match app.poll(Instant::now()) {
            Ok(Some(deadline)) => elwt.set_control_flow(ControlFlow::WaitUntil(deadline)),
            Ok(None) => elwt.set_control_flow(ControlFlow::Wait),
            Err(err) => fatal(&mut app, err),
        }
    })?;

    Ok(())
}
