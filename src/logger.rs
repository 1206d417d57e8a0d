//! Leveled logging with colored module prefixes.
//!
//! Errors are always written. Everything else is only written when debug
//! mode is on (`general.debug` in config, or `--debug` on the CLI).
//!
//! # Example
//!
//! ```ignore
//! log!("rewrite"; "failed to process {}: {}", url, err);
//! warn!("rewrite"; "CDN base URL is empty");
//! info!("rewrite"; "Replaced {} URLs with CDN URLs", count);
//! debug!("rewrite"; "No custom URLs defined. Skipping replacement.");
//! ```

use owo_colors::OwoColorize;
use std::io::{Write, stderr};
use std::sync::atomic::{AtomicBool, Ordering};

/// Global debug flag.
static DEBUG: AtomicBool = AtomicBool::new(false);

/// Set debug mode globally.
pub fn set_debug(enabled: bool) {
    DEBUG.store(enabled, Ordering::SeqCst);
}

/// Check if debug mode is enabled.
pub fn is_debug() -> bool {
    DEBUG.load(Ordering::SeqCst)
}

/// Log severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Info,
    Debug,
}

impl Level {
    /// Only errors pass when debug mode is off.
    #[inline]
    pub fn is_enabled(self) -> bool {
        self == Level::Error || is_debug()
    }

    fn label(self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }
}

// ============================================================================
// Log Macros
// ============================================================================

/// Log an error with a colored module prefix. Always emitted.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::emit($crate::logger::Level::Error, $module, &format!($($arg)*))
    }};
}

/// Log a warning (debug mode only).
#[macro_export]
macro_rules! warn {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::Level::Warning.is_enabled() {
            $crate::logger::emit($crate::logger::Level::Warning, $module, &format!($($arg)*))
        }
    }};
}

/// Log an informational message (debug mode only).
#[macro_export]
macro_rules! info {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::Level::Info.is_enabled() {
            $crate::logger::emit($crate::logger::Level::Info, $module, &format!($($arg)*))
        }
    }};
}

/// Log a debug message (debug mode only).
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::Level::Debug.is_enabled() {
            $crate::logger::emit($crate::logger::Level::Debug, $module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Write one log line to stderr.
pub fn emit(level: Level, module: &str, message: &str) {
    if !level.is_enabled() {
        return;
    }
    let prefix = colorize_prefix(module, level);
    let mut out = stderr().lock();
    writeln!(out, "{prefix} {message}").ok();
}

/// Apply color to a module prefix based on level.
#[inline]
fn colorize_prefix(module: &str, level: Level) -> String {
    let prefix = format!("[{module}]");
    match level {
        Level::Error => format!("{} {}", prefix.bright_red().bold(), level.label().red()),
        Level::Warning => format!("{} {}", prefix.bright_yellow().bold(), level.label().yellow()),
        Level::Info => prefix.bright_blue().bold().to_string(),
        Level::Debug => prefix.bright_black().to_string(),
    }
}
