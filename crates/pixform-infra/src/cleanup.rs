use pixform_storage::TempFileStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Periodically removes temp files older than `max_age`
#[derive(Debug, Clone)]
pub struct CleanupService {
    store: Arc<TempFileStore>,
    interval: Duration,
    max_age: Duration,
}

impl CleanupService {
    pub fn new(store: Arc<TempFileStore>, interval: Duration, max_age: Duration) -> Self {
        Self {
            store,
            interval,
            max_age,
        }
    }

    /// Start the background sweep. The first sweep runs one `interval` after start.
    ///
    /// Cancelling `cancel` stops the loop between sweeps; a sweep already running is
    /// allowed to finish. Returns a JoinHandle for graceful shutdown.
    pub fn start(self: Arc<Self>, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                interval_secs = self.interval.as_secs(),
                max_age_secs = self.max_age.as_secs(),
                "Temp file cleanup task started"
            );

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("Temp file cleanup task stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.run_once().await;
                    }
                }
            }
        })
    }

    /// One sweep of the temp directory. Returns the number of files removed.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "temp_files"))]
    pub async fn run_once(&self) -> usize {
        match self.store.cleanup_older_than(self.max_age).await {
            Ok(removed) => {
                tracing::info!(removed, "Temp file cleanup completed");
                removed
            }
            Err(e) => {
                tracing::error!(error = %e, "Temp file cleanup failed");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use tempfile::tempdir;

    fn write_aged(path: &std::path::Path, age: Duration) {
        std::fs::write(path, b"data").unwrap();
        let file = std::fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[tokio::test]
    async fn test_run_once_removes_expired_files() {
        let dir = tempdir().unwrap();
        let store = Arc::new(TempFileStore::new(dir.path()).await.unwrap());
        let old = dir.path().join("old.png");
        let fresh = dir.path().join("fresh.png");
        write_aged(&old, Duration::from_secs(3 * 3600));
        write_aged(&fresh, Duration::from_secs(3600));

        let service = CleanupService::new(
            store,
            Duration::from_secs(3600),
            Duration::from_secs(2 * 3600),
        );

        assert_eq!(service.run_once().await, 1);
        assert!(!old.exists());
        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn test_start_sweeps_on_interval() {
        let dir = tempdir().unwrap();
        let store = Arc::new(TempFileStore::new(dir.path()).await.unwrap());
        let old = dir.path().join("old.png");
        write_aged(&old, Duration::from_secs(3600));

        let service = Arc::new(CleanupService::new(
            store,
            Duration::from_millis(20),
            Duration::from_secs(60),
        ));
        let cancel = CancellationToken::new();
        let handle = service.start(cancel.clone());

        let deadline = Instant::now() + Duration::from_secs(5);
        while old.exists() && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(!old.exists());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("cleanup task did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_stops_before_first_sweep() {
        let dir = tempdir().unwrap();
        let store = Arc::new(TempFileStore::new(dir.path()).await.unwrap());
        let old = dir.path().join("old.png");
        write_aged(&old, Duration::from_secs(3 * 3600));

        let service = Arc::new(CleanupService::new(
            store,
            Duration::from_secs(3600),
            Duration::from_secs(60),
        ));
        let cancel = CancellationToken::new();
        let handle = service.start(cancel.clone());
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("cleanup task did not stop")
            .unwrap();
        assert!(old.exists());
    }
}
