use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.json";
pub const APP_DIR: &str = "VirtualDesktopIndicator";
pub const DEFAULT_DESKTOP_COUNT: usize = 4;
/// Highest slot count; larger numbers no longer fit the icon as two digits.
pub const MAX_DESKTOP_COUNT: usize = 99;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Number of indicator slots shown in the tray. Overridden by the
    /// positional command line argument.
    #[serde(default = "default_desktop_count")]
    pub desktop_count: usize,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file receiving a copy of every log line.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Install the Win+Ctrl+Shift+Arrow keyboard hook.
    #[serde(default = "default_chord_navigation")]
    pub chord_navigation: bool,
}

fn default_desktop_count() -> usize {
    DEFAULT_DESKTOP_COUNT
}

fn default_chord_navigation() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            desktop_count: default_desktop_count(),
            debug_logging: false,
            log_file: None,
            chord_navigation: default_chord_navigation(),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Like [`Settings::load`], but a broken file yields the defaults. The
    /// error is handed back so it can be reported once logging is up.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<anyhow::Error>) {
        match Self::load(path) {
            Ok(settings) => (settings, None),
            Err(err) => (Self::default(), Some(err)),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Location of the settings file in the per-user config directory, or the
    /// working directory when no config directory is known.
    pub fn default_path() -> PathBuf {
        dirs_next::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_default()
            .join(SETTINGS_FILE)
    }

    /// Slot count to use for this run. A valid positive integer argument wins,
    /// anything else falls back to the configured count. The result never
    /// exceeds [`MAX_DESKTOP_COUNT`].
    pub fn resolve_desktop_count(&self, arg: Option<&str>) -> usize {
        let requested = match arg.map(|a| a.trim().parse::<usize>()) {
            Some(Ok(n)) if n > 0 => n,
            Some(_) => {
                tracing::warn!(
                    "ignoring invalid desktop count argument {:?}; using {}",
                    arg.unwrap_or_default(),
                    self.configured_desktop_count()
                );
                self.configured_desktop_count()
            }
            None => self.configured_desktop_count(),
        };
        if requested > MAX_DESKTOP_COUNT {
            tracing::warn!(
                requested,
                max = MAX_DESKTOP_COUNT,
                "desktop count too large; clamping"
            );
            return MAX_DESKTOP_COUNT;
        }
        requested
    }

    fn configured_desktop_count(&self) -> usize {
        if self.desktop_count == 0 {
            DEFAULT_DESKTOP_COUNT
        } else {
            self.desktop_count
        }
    }
}
