//! Debugger-presence tripwire.
//!
//! A process can only have one tracer. Asking the parent to trace us fails
//! when something else already does, which is taken as proof that a debugger
//! is attached. The tripwire then kills the process outright; there is no
//! recovery path.

use nix::errno::Errno;
use tracing::error;

/// Strategy behind [`catch_attached_debugger`].
///
/// The real strategy never returns from [`SelfTracer::terminate`]; test
/// strategies may, and the guard then reports [`GuardVerdict::Tripped`].
pub trait SelfTracer {
    /// Ask to be traced by the parent process.
    fn request_trace(&self) -> Result<(), Errno>;

    /// Stop the process after the request failed.
    fn terminate(&self);
}

/// Outcome of one guard check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardVerdict {
    /// No tracer was attached
    Clear,
    /// A tracer was detected and `terminate` returned
    Tripped,
}

/// Issue a single self-trace request and terminate if it is refused.
pub fn catch_attached_debugger<T: SelfTracer + ?Sized>(tracer: &T) -> GuardVerdict {
    match tracer.request_trace() {
        Ok(()) => GuardVerdict::Clear,
        Err(errno) => {
            error!(%errno, "A debugger is attached, bailing out");
            tracer.terminate();
            GuardVerdict::Tripped
        }
    }
}

/// `PTRACE_TRACEME` followed by `SIGKILL` to self.
///
/// A successful check leaves the parent process as this process's tracer.
#[cfg(any(target_os = "linux", target_os = "android"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfTrace;

#[cfg(any(target_os = "linux", target_os = "android"))]
impl SelfTracer for SelfTrace {
    fn request_trace(&self) -> Result<(), Errno> {
        nix::sys::ptrace::traceme()
    }

    fn terminate(&self) {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        // SIGKILL cannot be caught; exit covers a kill that was refused.
        let _ = kill(Pid::this(), Signal::SIGKILL);
        std::process::exit(0);
    }
}
