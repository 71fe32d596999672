use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Advisory lock serializing edits to one board file.
///
/// The lock lives next to the board as `<file>.lock` and uses flock on Unix,
/// so two `mt` processes editing the same board take turns. The lock file is
/// never deleted: every contender must flock the same inode. Dropping the
/// guard closes the handle, which releases the flock.
pub struct BoardLock {
    _file: File,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another mt process may be editing the board")]
    Timeout { path: PathBuf },
}

/// Path of the lock file guarding `board_path`
pub fn lock_path(board_path: &Path) -> PathBuf {
    let mut name = board_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    board_path.with_file_name(name)
}

impl BoardLock {
    /// Acquire the lock for `board_path`, waiting up to `timeout`.
    pub fn acquire(board_path: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = lock_path(board_path);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| LockError::CreateError {
                path: path.clone(),
                source: e,
            })?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => {
                    log::debug!("event=lock_acquired path={}", path.display());
                    return Ok(BoardLock { _file: file });
                }
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => {
                    log::warn!("event=lock_timeout path={}", path.display());
                    return Err(LockError::Timeout { path });
                }
            }
        }
    }

    /// Acquire with default timeout (5 seconds)
    pub fn acquire_default(board_path: &Path) -> Result<Self, LockError> {
        Self::acquire(board_path, Duration::from_secs(5))
    }
}

/// Try to acquire an exclusive flock on the file (non-blocking)
#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    // Advisory only; other platforms always succeed
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_path_sits_next_to_board() {
        assert_eq!(
            lock_path(Path::new("/tmp/maps/board.json")),
            PathBuf::from("/tmp/maps/board.json.lock")
        );
    }

    #[test]
    fn test_acquire_and_release_lock() {
        let tmp = TempDir::new().unwrap();
        let board = tmp.path().join("board.json");

        let lock = BoardLock::acquire_default(&board);
        assert!(lock.is_ok());
        drop(lock);
        assert!(lock_path(&board).exists());

        let lock2 = BoardLock::acquire_default(&board);
        assert!(lock2.is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_lock_contention() {
        let tmp = TempDir::new().unwrap();
        let board = tmp.path().join("board.json");

        let _lock1 = BoardLock::acquire_default(&board).unwrap();
        let lock2 = BoardLock::acquire(&board, Duration::from_millis(50));
        assert!(matches!(lock2, Err(LockError::Timeout { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_waiter_keeps_lock_exclusive_after_release() {
        use std::sync::mpsc;
        use std::thread;

        let tmp = TempDir::new().unwrap();
        let board = tmp.path().join("board.json");

        let first = BoardLock::acquire_default(&board).unwrap();

        let (acquired_tx, acquired_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let waiter_board = board.clone();
        let waiter = thread::spawn(move || {
            let lock = BoardLock::acquire(&waiter_board, Duration::from_secs(2)).unwrap();
            acquired_tx.send(()).unwrap();
            release_rx.recv().unwrap();
            drop(lock);
        });

        // Give the waiter time to open the lock file and start polling
        thread::sleep(Duration::from_millis(50));
        drop(first);
        acquired_rx.recv_timeout(Duration::from_secs(2)).unwrap();

        // A newcomer must contend on the same lock file the waiter holds
        let late = BoardLock::acquire(&board, Duration::from_millis(0));
        assert!(matches!(late, Err(LockError::Timeout { .. })));

        release_tx.send(()).unwrap();
        waiter.join().unwrap();
        assert!(BoardLock::acquire(&board, Duration::from_millis(0)).is_ok());
    }
}
