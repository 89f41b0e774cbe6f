pub mod app;
pub mod appearance;
pub mod chord;
pub mod desktop;
#[cfg(windows)]
pub mod host;
pub mod icon;
pub mod indicator;
pub mod logging;
pub mod settings;
pub mod theme;
