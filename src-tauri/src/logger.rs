//! Diagnostic log: keeps the most recent lines in memory for the
//! diagnostics view and forwards every line to `tracing`.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Local;
use lazy_static::lazy_static;
use tracing::Level;

const MAX_LOG_LINES: usize = 2000;

lazy_static! {
    static ref LOGS: Mutex<VecDeque<String>> = Mutex::new(VecDeque::with_capacity(MAX_LOG_LINES));
}

/// Install the global `tracing` subscriber. Honors `RUST_LOG`, defaults to `info`.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // A second init (tests, hot reload) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

pub fn log(level: Level, message: &str) {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let formatted_message = format!("[{}] {:<5} {}", timestamp, level, message);

    match level {
        Level::ERROR => tracing::error!("{}", message),
        Level::WARN => tracing::warn!("{}", message),
        Level::DEBUG => tracing::debug!("{}", message),
        Level::TRACE => tracing::trace!("{}", message),
        Level::INFO => tracing::info!("{}", message),
    }

    let mut logs = LOGS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if logs.len() >= MAX_LOG_LINES {
        logs.pop_front();
    }
    logs.push_back(formatted_message);
}

pub fn get_all_logs() -> String {
    let logs = LOGS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    logs.iter().cloned().collect::<Vec<String>>().join("\n")
}

#[macro_export]
macro_rules! app_log {
    ($($arg:tt)*) => {
        $crate::logger::log(::tracing::Level::INFO, &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! app_warn {
    ($($arg:tt)*) => {
        $crate::logger::log(::tracing::Level::WARN, &format!($($arg)*));
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_kept_for_diagnostics() {
        app_warn!("history write failed: {}", "disk full");
        let logs = get_all_logs();
        assert!(logs.contains("WARN"));
        assert!(logs.contains("history write failed: disk full"));
    }
}
