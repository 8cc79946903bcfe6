//! Ctrl-C handling
//!
//! The handler only records the interrupt. While a child process is running,
//! [`crate::runner::SystemRunner`] notices the flag, kills the child and reports
//! `ProcessInterrupted`, so rollback guards run before pinenv exits with status 1.
//! With no child running there is nothing to roll back and the process exits at once.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::debug;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static ACTIVE_CHILDREN: AtomicUsize = AtomicUsize::new(0);

/// Exit status after an interrupt
pub const INTERRUPTED_EXIT_CODE: i32 = 1;

/// Install the process-wide Ctrl-C handler
pub fn install_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(|| {
        INTERRUPTED.store(true, Ordering::SeqCst);
        if ACTIVE_CHILDREN.load(Ordering::SeqCst) == 0 {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        debug!("interrupt received, stopping child");
    })
}

/// Flag set by the installed handler
pub fn flag() -> &'static AtomicBool {
    &INTERRUPTED
}

/// Marks a child process as running for as long as it is held
#[derive(Debug)]
pub struct ActiveChild(());

impl ActiveChild {
    pub fn enter() -> Self {
        ACTIVE_CHILDREN.fetch_add(1, Ordering::SeqCst);
        Self(())
    }
}

impl Drop for ActiveChild {
    fn drop(&mut self) {
        ACTIVE_CHILDREN.fetch_sub(1, Ordering::SeqCst);
    }
}
