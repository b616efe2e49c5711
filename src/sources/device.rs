//! Entropy device reads with a bounded, cancellable wait.
//!
//! A blocking device such as `/dev/random` may stall until the kernel
//! judges it has gathered enough environmental noise. The read runs on a
//! worker thread; the caller waits at most `timeout` and gives up early
//! when the shared [`CancelToken`] is set. An abandoned worker stops at the
//! next chunk boundary.

use super::{ByteSource, ProviderError};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Bytes requested from the device per `read` call.
const READ_CHUNK: usize = 4096;

/// How often the waiting caller re-checks the cancel token.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Shared cancellation flag for in-flight device reads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every wait sharing this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Byte source reading a character device such as `/dev/random`.
pub struct DeviceSource {
    path: PathBuf,
    timeout: Duration,
    cancel: CancelToken,
}

impl DeviceSource {
    /// Creates a source for `path` bounded by `timeout`.
    pub fn new(path: impl Into<PathBuf>, timeout: Duration, cancel: CancelToken) -> Self {
        Self {
            path: path.into(),
            timeout,
            cancel,
        }
    }

    /// Returns the device path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the wait budget per call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl ByteSource for DeviceSource {
    fn produce(&self, size: usize) -> Result<Vec<u8>, ProviderError> {
        let (tx, rx) = mpsc::channel();
        let abandoned = Arc::new(AtomicBool::new(false));

        let path = self.path.clone();
        let worker_abandoned = Arc::clone(&abandoned);
        let worker_cancel = self.cancel.clone();
        thread::Builder::new()
            .name("device-read".into())
            .spawn(move || {
                let result = read_device(&path, size, &worker_abandoned, &worker_cancel);
                // The receiver is gone if the caller already gave up
                let _ = tx.send(result);
            })?;

        let deadline = Instant::now() + self.timeout;
        loop {
            if self.cancel.is_cancelled() {
                abandoned.store(true, Ordering::SeqCst);
                return Err(ProviderError::Cancelled);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                abandoned.store(true, Ordering::SeqCst);
                tracing::warn!(
                    path = %self.path.display(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Entropy device read timed out"
                );
                return Err(ProviderError::TimedOut(self.timeout));
            }

            match rx.recv_timeout(remaining.min(POLL_INTERVAL)) {
                Ok(result) => return result,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Err(ProviderError::WorkerLost),
            }
        }
    }
}

fn read_device(
    path: &Path,
    size: usize,
    abandoned: &AtomicBool,
    cancel: &CancelToken,
) -> Result<Vec<u8>, ProviderError> {
    let mut file = File::open(path)?;
    let mut buf = vec![0u8; size];
    let mut filled = 0;

    while filled < size {
        if abandoned.load(Ordering::SeqCst) || cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let end = size.min(filled + READ_CHUNK);
        match file.read(&mut buf[filled..end]) {
            Ok(0) => {
                return Err(ProviderError::ShortRead {
                    got: filled,
                    want: size,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(path: &str, timeout: Duration) -> DeviceSource {
        DeviceSource::new(path, timeout, CancelToken::new())
    }

    #[cfg(unix)]
    #[test]
    fn test_reads_urandom_device() {
        let dev = source("/dev/urandom", Duration::from_secs(5));
        let bytes = dev.produce(10_000).unwrap();

        assert_eq!(bytes.len(), 10_000);
    }

    #[test]
    fn test_missing_device() {
        let dev = source("/nonexistent/entropy-device", Duration::from_secs(5));

        assert!(matches!(dev.produce(16), Err(ProviderError::Io(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_eof_is_short_read() {
        let dev = source("/dev/null", Duration::from_secs(5));

        assert!(matches!(
            dev.produce(16),
            Err(ProviderError::ShortRead { got: 0, want: 16 })
        ));
    }

    #[test]
    fn test_zero_budget_times_out() {
        let dev = source("/dev/urandom", Duration::ZERO);

        assert!(matches!(dev.produce(16), Err(ProviderError::TimedOut(_))));
    }

    #[test]
    fn test_cancelled_token_stops_wait() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let dev = DeviceSource::new("/dev/urandom", Duration::from_secs(5), cancel.clone());

        assert!(cancel.is_cancelled());
        assert!(matches!(dev.produce(16), Err(ProviderError::Cancelled)));
    }
}
