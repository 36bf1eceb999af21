//! Single instance lock using Unix socket.
//!
//! Only one daemon may own the display state and the control port. Uses a
//! Unix socket which is automatically cleaned up by the OS when the process
//! dies, avoiding stale lock files.

use crate::error::{BridgeError, Result};
use std::io;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

const SOCKET_NAME: &str = "display-wake-bridge.sock";

/// Single instance lock using a Unix socket.
///
/// The lock is held as long as this struct exists. When dropped, the socket
/// file is removed.
pub struct InstanceLock {
    _listener: UnixListener,
    path: PathBuf,
}

impl InstanceLock {
    /// Acquire the lock at the default socket path.
    pub fn acquire() -> Result<Self> {
        let runtime_dir = std::env::var_os("XDG_RUNTIME_DIR").map(PathBuf::from);
        Self::acquire_at(socket_path(runtime_dir.as_deref()))
    }

    /// Acquire the lock at `path`.
    ///
    /// Returns `Err(BridgeError::AlreadyRunning)` if another instance holds it.
    pub fn acquire_at(path: PathBuf) -> Result<Self> {
        // A socket nobody answers on was left behind by a killed process
        if path.exists() {
            match UnixStream::connect(&path) {
                Ok(_) => return Err(BridgeError::AlreadyRunning),
                Err(_) => {
                    let _ = std::fs::remove_file(&path);
                }
            }
        }

        match UnixListener::bind(&path) {
            Ok(listener) => Ok(Self {
                _listener: listener,
                path,
            }),
            // Another instance bound between our check and bind
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => Err(BridgeError::AlreadyRunning),
            Err(e) => Err(BridgeError::IoError(e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Socket path under `runtime_dir` (`$XDG_RUNTIME_DIR`), falling back to `/tmp`.
pub fn socket_path(runtime_dir: Option<&Path>) -> PathBuf {
    runtime_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(SOCKET_NAME)
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dwb-lock-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_socket_path_uses_runtime_dir() {
        assert_eq!(
            socket_path(Some(Path::new("/run/user/1000"))),
            PathBuf::from("/run/user/1000/display-wake-bridge.sock")
        );
    }

    #[test]
    fn test_socket_path_fallback_to_tmp() {
        assert_eq!(
            socket_path(None),
            PathBuf::from("/tmp/display-wake-bridge.sock")
        );
    }

    #[test]
    fn test_second_instance_is_rejected() {
        let path = socket_path(Some(&scratch_dir("second")));

        let first = InstanceLock::acquire_at(path.clone()).unwrap();
        assert!(matches!(
            InstanceLock::acquire_at(path.clone()),
            Err(BridgeError::AlreadyRunning)
        ));

        drop(first);
        assert!(!path.exists());
        let again = InstanceLock::acquire_at(path);
        assert!(again.is_ok());
    }

    #[test]
    fn test_stale_socket_is_replaced() {
        let path = socket_path(Some(&scratch_dir("stale")));
        {
            // Bound then dropped without removing the file
            let _listener = UnixListener::bind(&path).unwrap();
        }
        assert!(path.exists());

        let lock = InstanceLock::acquire_at(path.clone()).unwrap();
        assert_eq!(lock.path(), path.as_path());
    }
}
