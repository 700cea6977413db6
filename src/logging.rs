use log::{Level, SetLoggerError};

/// Default verbosity: debug for dev builds, info for release builds.
pub fn default_level() -> Level {
    if cfg!(debug_assertions) {
        Level::Debug
    } else {
        Level::Info
    }
}

#[cfg(target_arch = "wasm32")]
fn install(level: Level) -> Result<(), SetLoggerError> {
    console_log::init_with_level(level)
}

#[cfg(not(target_arch = "wasm32"))]
fn install(level: Level) -> Result<(), SetLoggerError> {
    pretty_env_logger::formatted_builder()
        .filter_level(level.to_level_filter())
        .try_init()
}

/// Installs the `log` backend: the browser console on the web, stderr
/// elsewhere. Later calls keep the first logger.
pub fn init(level: Level) {
    if install(level).is_err() {
        log::debug!("logger already installed, keeping it");
    }
}
