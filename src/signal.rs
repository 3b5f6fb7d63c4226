//! Termination signal handling and core-dump suppression.
//!
//! The signal handler itself only flips an [`AtomicBool`]; it never touches
//! the file that is mid-write. The main thread is the one that observes the
//! flag (at every chunked-I/O boundary, via [`is_terminated`]) and truncates
//! its own in-flight output before exiting. This keeps the handler
//! async-signal-safe without pulling any I/O into it.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering::SeqCst;

use anyhow::Result;
use signal_hook::consts::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};

static TERMINATED: std::sync::OnceLock<Arc<AtomicBool>> = std::sync::OnceLock::new();

fn flag() -> &'static Arc<AtomicBool> {
    TERMINATED.get_or_init(|| Arc::new(AtomicBool::new(false)))
}

/// Registers handlers for `SIGINT`/`SIGTERM`/`SIGHUP`/`SIGQUIT` that set the
/// shared termination flag. Idempotent: later calls are no-ops.
pub fn install() -> Result<()> {
    for signal in [SIGINT, SIGTERM, SIGHUP, SIGQUIT] {
        signal_hook::flag::register(signal, Arc::clone(flag()))?;
    }
    Ok(())
}

/// Whether a termination signal has been received since startup.
pub fn is_terminated() -> bool {
    flag().load(SeqCst)
}

/// Checked at every chunked-I/O boundary: fails the in-progress action so its
/// caller can truncate and remove the partial output.
pub fn check() -> Result<()> {
    if is_terminated() { Err(anyhow::anyhow!("operation terminated by signal")) } else { Ok(()) }
}

/// Disables core dumps on POSIX systems where supported. No-op elsewhere.
#[cfg(unix)]
pub fn prevent_coredump() {
    let _ = rlimit::setrlimit(rlimit::Resource::CORE, 0, 0);
}

#[cfg(not(unix))]
pub fn prevent_coredump() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_untriggered() {
        assert!(!is_terminated());
    }
}
