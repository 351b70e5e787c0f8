// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logging for the PrefGen workspace
//!
//! Thin wrapper over emit so every crate logs the same way.
//!
//! Usage:
//! - Set PREFGEN_LOG=off (default) - no logs
//! - Set PREFGEN_LOG=info - generation and run progress
//! - Set PREFGEN_LOG=debug - per-batch and per-file details

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable that selects the log level
pub const LOG_ENV: &str = "PREFGEN_LOG";

static INIT: Once = Once::new();

fn min_level(name: &str) -> Option<emit::Level> {
    match name {
        "debug" => Some(emit::Level::Debug),
        "info" => Some(emit::Level::Info),
        "warn" => Some(emit::Level::Warn),
        "error" => Some(emit::Level::Error),
        _ => None,
    }
}

/// Initialize diagnostics based on the PREFGEN_LOG environment variable
///
/// Safe to call multiple times; only the first call has an effect.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let log_level = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
        if log_level == "off" {
            return;
        }

        let (level, unknown) = match min_level(&log_level) {
            Some(level) => (level, false),
            None => (emit::Level::Info, true),
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        if unknown {
            emit::warn!("Unknown {env} value {log_level}, using info", env: LOG_ENV);
        }

        // The runtime lives for the whole process
        std::mem::forget(rt);
    });
}

/// Progress of normal operation: tables generated, experiments run, summaries written
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Detailed diagnostics: batch sizes, skipped files, command lines
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Recoverable problems: missing result files, external tools that failed
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Failures that stop a command
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}
