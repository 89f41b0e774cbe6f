#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use desktop_indicator::logging;
use desktop_indicator::settings::Settings;

fn main() -> anyhow::Result<()> {
    let settings_path = Settings::default_path();
    let (settings, load_err) = Settings::load_or_default(&settings_path);
    logging::init(settings.debug_logging, settings.log_file.clone());

    if let Some(err) = load_err {
        tracing::warn!(
            ?err,
            path = %settings_path.display(),
            "unreadable settings; using defaults"
        );
    } else if !settings_path.exists() {
        if let Err(err) = settings.save(&settings_path) {
            tracing::warn!(
                ?err,
                path = %settings_path.display(),
                "failed to write default settings"
            );
        }
    }

    let arg = std::env::args().nth(1);
    let slot_count = settings.resolve_desktop_count(arg.as_deref());
    tracing::info!(
        slots = slot_count,
        settings = %settings_path.display(),
        "starting virtual desktop indicator"
    );

    run(&settings, slot_count)
}

#[cfg(windows)]
fn run(settings: &Settings, slot_count: usize) -> anyhow::Result<()> {
    desktop_indicator::host::run(desktop_indicator::host::HostOptions {
        slot_count,
        chord_navigation: settings.chord_navigation,
    })
}

#[cfg(not(windows))]
fn run(_settings: &Settings, _slot_count: usize) -> anyhow::Result<()> {
    anyhow::bail!("the virtual desktop indicator only runs on Windows")
}
