//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `dayplan_core` linkage.
//! - Start file logging from `DAYPLAN_LOG_LEVEL` / `DAYPLAN_LOG_DIR` when set.
//! - Keep output deterministic for quick local sanity checks.

use dayplan_core::{init_logging_with, logging_status, LogConfig};

fn main() {
    match LogConfig::from_env().and_then(init_logging_with) {
        Ok(()) => {
            if let Some((level, dir)) = logging_status() {
                println!("dayplan_core logging={level} log_dir={}", dir.display());
            }
        }
        Err(err) => eprintln!("dayplan_core logging=disabled reason={err}"),
    }

    println!("dayplan_core ping={}", dayplan_core::ping());
    println!("dayplan_core version={}", dayplan_core::core_version());
}
