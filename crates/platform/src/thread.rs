//! crates/platform/src/thread.rs
//! OS-level thread identification.

/// Returns the kernel thread id of the calling thread.
///
/// The value is not cached: a forked child observes its own id.
#[cfg(any(target_os = "linux", target_os = "android"))]
#[allow(unsafe_code)]
pub fn os_thread_id() -> u64 {
    // SAFETY: SYS_gettid takes no arguments and cannot fail.
    let tid = unsafe { libc::syscall(libc::SYS_gettid) };
    tid as u64
}

/// Returns the kernel thread id of the calling thread.
#[cfg(any(target_os = "macos", target_os = "ios"))]
#[allow(unsafe_code)]
pub fn os_thread_id() -> u64 {
    let mut tid: u64 = 0;
    // SAFETY: a null thread handle selects the calling thread and `tid` is a
    // valid out-pointer for the duration of the call.
    unsafe {
        libc::pthread_threadid_np(0, &mut tid);
    }
    tid
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios"
)))]
/// Returns a stable per-thread identifier derived from the std thread id.
pub fn os_thread_id() -> u64 {
    use std::hash::{Hash, Hasher};

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    hasher.finish()
}
