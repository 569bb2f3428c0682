//! Single-instance lock (§6): writes `/tmp/<wrapper>_<device-id>.pid` at
//! startup; if the file already exists and names a live process, startup
//! is refused. Liveness is the original's `common.hpp` process-check
//! helper, expressed through `nix::sys::signal::kill` with no signal
//! (the "does this pid exist" probe) instead of calling the raw syscall
//! by hand.

use std::fs;
use std::path::PathBuf;

use nix::sys::signal::kill;
use nix::unistd::Pid;

use crate::error::ConfigError;

pub struct PidLock {
    path: PathBuf,
}

impl PidLock {
    /// Returns `Ok(None)` when the caller asked to skip locking
    /// (`-p/--no-pid`); otherwise acquires the lock or fails with
    /// `config_invalid` if a live holder already owns it.
    pub fn acquire(wrapper: &str, device_id: &str, skip: bool) -> Result<Option<Self>, ConfigError> {
        if skip {
            return Ok(None);
        }

        let sanitized_device: String = device_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let path = PathBuf::from(format!("/tmp/{wrapper}_{sanitized_device}.pid"));

        if let Ok(existing) = fs::read_to_string(&path) {
            if let Ok(pid) = existing.trim().parse::<i32>() {
                if process_is_live(pid) {
                    return Err(ConfigError::Invalid {
                        path: path.display().to_string(),
                        element: "pid-lock".to_owned(),
                        reason: format!("another instance is already running (pid {pid})"),
                    });
                }
            }
        }

        fs::write(&path, std::process::id().to_string()).map_err(|e| ConfigError::Invalid {
            path: path.display().to_string(),
            element: "pid-lock".to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Some(Self { path }))
    }
}

impl Drop for PidLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn process_is_live(pid: i32) -> bool {
    kill(Pid::from_raw(pid), None).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_pid_flag_skips_locking() {
        assert!(PidLock::acquire("touchd_test", "skip", true).unwrap().is_none());
    }

    #[test]
    fn acquiring_twice_without_release_is_rejected() {
        let device = format!("lock_test_{}", std::process::id());
        let first = PidLock::acquire("touchd_test", &device, false).unwrap();
        assert!(first.is_some());
        let second = PidLock::acquire("touchd_test", &device, false);
        assert!(second.is_err());
        drop(first);
        let third = PidLock::acquire("touchd_test", &device, false);
        assert!(third.is_ok());
    }
}
