//! `I:`/`W:`/`E:`/`D:`-prefixed, color-coded log lines.
//!
//! Every line also goes through `tracing`, so a future structured sink (file,
//! journald) gets the same events without touching call sites here.

use console::style;

/// Informational line, printed to stdout.
pub fn log_i(message: &str) {
    println!("{} {message}", style("I:").cyan().bold());
    tracing::info!("{message}");
}

/// Warning line, printed to stderr.
pub fn log_w(message: &str) {
    eprintln!("{} {message}", style("W:").yellow().bold());
    tracing::warn!("{message}");
}

/// Error line, printed to stderr.
pub fn log_e(message: &str) {
    eprintln!("{} {message}", style("E:").red().bold());
    tracing::error!("{message}");
}

/// Debug line, printed only when `--unsafe-debug` raised the filter.
/// May contain secret material; callers are responsible for only passing
/// secrets here under that flag.
pub fn log_d(message: &str) {
    eprintln!("{} {message}", style("D:").magenta().bold());
    tracing::debug!("{message}");
}
