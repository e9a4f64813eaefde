//! crates/platform/src/process.rs
//! Raw process primitives used around `fork(2)`.

use std::io;

/// Process identifier as returned by `fork(2)`.
pub type Pid = libc::pid_t;

/// How a reaped child process terminated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChildExit {
    /// The child called `exit`/`_exit` with this status code.
    Exited(i32),
    /// The child was terminated by this signal number.
    Signaled(i32),
}

impl ChildExit {
    /// Returns true when the child exited normally with status 0.
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

/// Calls `fork(2)` directly.
///
/// Returns the child's pid in the parent, `0` in the child and `-1` on
/// failure, exactly like the C function. Callers that need the at-fork
/// callbacks should go through `atfork::AtFork::fork_instrumented` instead.
#[cfg(unix)]
#[allow(unsafe_code)]
pub fn fork() -> Pid {
    use nix::unistd::ForkResult;

    // SAFETY: the child only inherits the calling thread; callers are
    // responsible for keeping the child async-signal-safe until it execs or
    // exits.
    match unsafe { nix::unistd::fork() } {
        Ok(ForkResult::Parent { child }) => child.as_raw(),
        Ok(ForkResult::Child) => 0,
        Err(_) => -1,
    }
}

/// Terminates the calling process immediately without running destructors
/// or `atexit` handlers. Intended for forked children.
#[cfg(unix)]
#[allow(unsafe_code)]
pub fn exit_immediately(code: i32) -> ! {
    // SAFETY: `_exit(2)` is async-signal-safe and never returns.
    unsafe { libc::_exit(code) }
}

/// Blocks until the child `pid` terminates and reports how it ended.
#[cfg(unix)]
pub fn wait_for(pid: Pid) -> io::Result<ChildExit> {
    use nix::sys::wait::{WaitStatus, waitpid};
    use nix::unistd::Pid as NixPid;

    loop {
        match waitpid(NixPid::from_raw(pid), None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(ChildExit::Exited(code)),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(ChildExit::Signaled(signal as i32)),
            Ok(_) => {}
            Err(nix::errno::Errno::EINTR) => {}
            Err(errno) => return Err(io::Error::from_raw_os_error(errno as i32)),
        }
    }
}

/// Forking is unsupported here; always reports failure.
#[cfg(not(unix))]
pub fn fork() -> Pid {
    -1
}

/// Exits the process.
#[cfg(not(unix))]
pub fn exit_immediately(code: i32) -> ! {
    std::process::exit(code)
}

/// Waiting for forked children is unsupported here.
#[cfg(not(unix))]
pub fn wait_for(_pid: Pid) -> io::Result<ChildExit> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "waiting for forked children is only implemented on Unix platforms",
    ))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn child_exit_status_is_reported() {
        let pid = fork();
        assert!(pid >= 0, "fork failed");
        if pid == 0 {
            exit_immediately(7);
        }
        assert_eq!(wait_for(pid).expect("waitpid"), ChildExit::Exited(7));
    }

    #[test]
    fn child_killed_by_signal_is_reported() {
        let pid = fork();
        assert!(pid >= 0, "fork failed");
        if pid == 0 {
            std::process::abort();
        }
        assert_eq!(wait_for(pid).expect("waitpid"), ChildExit::Signaled(libc::SIGABRT));
    }

    #[test]
    fn success_only_for_zero_exit() {
        assert!(ChildExit::Exited(0).success());
        assert!(!ChildExit::Exited(1).success());
        assert!(!ChildExit::Signaled(libc::SIGABRT).success());
    }
}
