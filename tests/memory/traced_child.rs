//! Real trace requests against a forked child.
//!
//! The child asks to be traced and stops itself; its address space is a
//! copy of ours, so a buffer allocated before the fork has the same address
//! in both processes. Hosts that forbid ptrace skip these tests.

#![cfg(target_os = "linux")]

use elfinject::guard::{catch_attached_debugger, GuardVerdict, SelfTrace};
use elfinject::memory::ProcessMemory;
use nix::sys::ptrace;
use nix::sys::signal::{kill, raise, Signal};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};

fn exit_child(code: i32) -> ! {
    // Only async-signal-safe calls after fork
    unsafe { nix::libc::_exit(code) }
}

/// Fork a child that is traced by us and stopped; `None` if ptrace is
/// unavailable on this host.
fn spawn_stopped_tracee() -> Option<Pid> {
    match unsafe { fork() }.unwrap() {
        ForkResult::Child => {
            if ptrace::traceme().is_err() {
                exit_child(2);
            }
            let _ = raise(Signal::SIGSTOP);
            exit_child(0);
        }
        ForkResult::Parent { child } => match waitpid(child, None).unwrap() {
            WaitStatus::Stopped(_, Signal::SIGSTOP) => Some(child),
            other => {
                eprintln!("ptrace unavailable ({:?}); skipping test", other);
                None
            }
        },
    }
}

fn reap(child: Pid) {
    let _ = kill(child, Signal::SIGKILL);
    let _ = waitpid(child, None);
}

#[test]
fn round_trip_against_traced_child() {
    let original: Vec<u8> = (0u8..64).collect();
    let address = original.as_ptr() as u64;

    let Some(child) = spawn_stopped_tracee() else {
        return;
    };
    let mem = ProcessMemory::new();

    let before = mem.read(child, address, 64);
    let patch16 = vec![0xcc; 16];
    let wrote16 = mem.write(child, address, &patch16);
    let read16 = mem.read(child, address, 16);
    let patch13: Vec<u8> = (100u8..113).collect();
    let wrote13 = mem.write(child, address + 24, &patch13);
    let read13 = mem.read(child, address + 24, 13);
    let tail = mem.read(child, address + 37, 3);

    reap(child);

    assert_eq!(before.unwrap(), original);
    wrote16.unwrap();
    assert_eq!(read16.unwrap(), patch16);
    wrote13.unwrap();
    assert_eq!(read13.unwrap(), patch13);
    // Partial word write left the following bytes alone
    assert_eq!(tail.unwrap(), &original[37..40]);
    // Our own copy is separate from the child's
    assert_eq!(original, (0u8..64).collect::<Vec<_>>());
}

#[test]
fn guard_trips_on_second_trace_request() {
    match unsafe { fork() }.unwrap() {
        ForkResult::Child => {
            if catch_attached_debugger(&SelfTrace) != GuardVerdict::Clear {
                exit_child(2);
            }
            // Now traced by the parent, so a second request is refused
            catch_attached_debugger(&SelfTrace);
            exit_child(3);
        }
        ForkResult::Parent { child } => match waitpid(child, None).unwrap() {
            WaitStatus::Signaled(_, Signal::SIGKILL, _) => {}
            WaitStatus::Exited(_, 2) => eprintln!("ptrace unavailable; skipping test"),
            other => panic!("unexpected child status: {:?}", other),
        },
    }
}
