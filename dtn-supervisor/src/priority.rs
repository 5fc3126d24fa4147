//! Background scheduling priority for the supervisor thread.

/// Nice value of a background worker.
pub const BACKGROUND_NICE: i32 = 10;

/// Lower the calling thread's scheduling priority to background.
///
/// Returns `false` (after logging) when the platform refuses or does not
/// support it; startup continues either way.
#[cfg(unix)]
pub fn lower_thread_priority() -> bool {
    // On Linux PRIO_PROCESS with who = 0 applies to the calling thread only.
    // Never raise priority: an already-nicer thread keeps its value.
    let nice = match current_nice() {
        Some(current) => current.max(BACKGROUND_NICE),
        None => BACKGROUND_NICE,
    };
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, nice) };
    if rc == 0 {
        tracing::debug!(nice, "lowered supervisor thread priority");
        true
    } else {
        let err = std::io::Error::last_os_error();
        tracing::warn!(error = %err, "could not lower supervisor thread priority");
        false
    }
}

/// Current nice value of the calling thread, `None` if it cannot be read.
///
/// `-1` is a valid nice value, so errors are told apart through `errno`.
#[cfg(unix)]
pub fn current_nice() -> Option<i32> {
    clear_errno();
    let nice = unsafe { libc::getpriority(libc::PRIO_PROCESS, 0) };
    if nice == -1 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error().unwrap_or(0) != 0 {
            tracing::debug!(error = %err, "could not read thread priority");
            return None;
        }
    }
    Some(nice)
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn clear_errno() {
    unsafe { *libc::__errno_location() = 0 };
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
fn clear_errno() {
    unsafe { *libc::__error() = 0 };
}

#[cfg(all(
    unix,
    not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd"
    ))
))]
fn clear_errno() {}

#[cfg(not(unix))]
pub fn lower_thread_priority() -> bool {
    tracing::debug!("thread priority unchanged on this platform");
    false
}
