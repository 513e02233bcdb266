#![deny(missing_docs)]
//! Shared logging utilities for the jobscout workspace.
//!
//! This crate provides the `scout_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every message is
//! prefixed with the tag of the scraping session currently owned by the
//! process, if any.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

#[doc(hidden)]
pub use log as __log;

/// Live session tags in the order they were entered.
static SESSION_TAGS: RwLock<Vec<(u64, String)>> = RwLock::new(Vec::new());
static NEXT_TAG_ID: AtomicU64 = AtomicU64::new(0);

/// Keeps a session tag on log lines for as long as it is alive.
///
/// Several sessions may be live at once; the most recently entered tag that
/// is still alive is the one shown. Dropping a guard removes only its own tag.
#[derive(Debug)]
#[must_use = "the session tag is removed when the guard is dropped"]
pub struct SessionTag {
    id: u64,
}

impl SessionTag {
    /// Starts tagging log lines with `tag`.
    pub fn enter(tag: &str) -> Self {
        let id = NEXT_TAG_ID.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut tags) = SESSION_TAGS.write() {
            tags.push((id, tag.to_owned()));
        }
        Self { id }
    }
}

impl Drop for SessionTag {
    fn drop(&mut self) {
        if let Ok(mut tags) = SESSION_TAGS.write() {
            tags.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Retrieves the current session tag, if one is set.
pub fn session_tag() -> Option<String> {
    SESSION_TAGS
        .read()
        .ok()
        .and_then(|tags| tags.last().map(|(_, tag)| tag.clone()))
}

/// Formats the prefix used by the logging macros: `"[session <tag>] "` or
/// an empty string when no session is active.
#[doc(hidden)]
pub fn session_prefix() -> String {
    match session_tag() {
        Some(tag) => format!("[session {tag}] "),
        None => String::new(),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! scout_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!("{}{}", $crate::session_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! scout_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!("{}{}", $crate::session_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! scout_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!("{}{}", $crate::session_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! scout_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!("{}{}", $crate::session_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! scout_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!("{}{}", $crate::session_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
