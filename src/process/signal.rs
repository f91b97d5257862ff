//! Two-phase termination of a child and the process group it leads.

use tokio::process::Child;
use tracing::debug;

#[cfg(unix)]
fn signal_group(child: &Child, signal: nix::sys::signal::Signal) {
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    let Some(pid) = child.id() else { return };
    let Ok(raw) = i32::try_from(pid) else { return };
    if let Err(e) = killpg(Pid::from_raw(raw), signal) {
        debug!(pid, signal = ?signal, error = %e, "Failed to signal process group");
    }
}

/// Ask the child (and anything it spawned) to exit.
#[cfg(unix)]
pub fn graceful_terminate(child: &mut Child) {
    signal_group(child, nix::sys::signal::Signal::SIGTERM);
}

/// Kill the child and its group without waiting for it.
#[cfg(unix)]
pub fn force_terminate(child: &mut Child) {
    signal_group(child, nix::sys::signal::Signal::SIGKILL);
    if let Err(e) = child.start_kill() {
        debug!(error = %e, "Child already gone");
    }
}

#[cfg(not(unix))]
pub fn graceful_terminate(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        debug!(error = %e, "Child already gone");
    }
}

#[cfg(not(unix))]
pub fn force_terminate(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        debug!(error = %e, "Child already gone");
    }
}
