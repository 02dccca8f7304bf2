//! Log level selection and subscriber setup.
//!
//! Levels use the numeric scale of the `OMEGO_DEBUG_LEVEL` variable: 10
//! debug, 20 info, 30 warning, 40 error. Each `-v` lowers the level by one
//! step and each `-q` raises it.

use tracing_subscriber::filter::LevelFilter;

/// Environment variable holding the base log level
pub const DEBUG_LEVEL_VAR: &str = "OMEGO_DEBUG_LEVEL";

const DEFAULT_LEVEL: i32 = 20;
const STEP: i32 = 10;

/// Base level from the value of [`DEBUG_LEVEL_VAR`].
///
/// Unset means info; a value that is not a number means debug.
pub fn base_level(value: Option<&str>) -> i32 {
    match value {
        None => DEFAULT_LEVEL,
        Some(v) => v.trim().parse().unwrap_or(10),
    }
}

/// Level after applying `-v` and `-q` counts
pub fn effective_level(base: i32, verbose: u8, quiet: u8) -> i32 {
    base - STEP * i32::from(verbose) + STEP * i32::from(quiet)
}

/// Map a numeric level to the most verbose records it lets through
pub fn level_filter(level: i32) -> LevelFilter {
    match level {
        i32::MIN..=9 => LevelFilter::TRACE,
        10..=19 => LevelFilter::DEBUG,
        20..=29 => LevelFilter::INFO,
        30..=39 => LevelFilter::WARN,
        40..=59 => LevelFilter::ERROR,
        _ => LevelFilter::OFF,
    }
}

/// Install the stderr subscriber. Records from the `log` facade used by the
/// library crates are forwarded to it.
pub fn init(verbose: u8, quiet: u8, debug_level: Option<&str>) {
    let level = effective_level(base_level(debug_level), verbose, quiet);
    let filter = level_filter(level);

    let installed = tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if installed.is_err() {
        eprintln!("Logging already initialised");
        return;
    }
    log::debug!("Log level {} ({})", level, filter);
}

#[cfg(test)]
#[path = "logging_test.rs"]
mod tests;
