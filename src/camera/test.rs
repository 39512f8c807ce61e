use super::backend::{CameraBackend, CameraBackendConfig, CameraFrame};
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// Synthetic camera backend for tests: emits solid-color frames at the
/// configured rate, with an optional always-deny mode to exercise the
/// camera-unavailable path without a real device.
pub struct TestBackend {
    config: CameraBackendConfig,
    deny: bool,
    capturing: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl TestBackend {
    pub fn new(config: CameraBackendConfig) -> Self {
        Self {
            config,
            deny: false,
            capturing: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    /// A backend that refuses to open, as a denied/unplugged device would
    pub fn denied(config: CameraBackendConfig) -> Self {
        let mut backend = Self::new(config);
        backend.deny = true;
        backend
    }
}

impl Drop for TestBackend {
    fn drop(&mut self) {
        self.capturing.store(false, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl CameraBackend for TestBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<CameraFrame>> {
        if self.deny {
            anyhow::bail!("camera access denied");
        }
        if self.capturing.load(Ordering::SeqCst) {
            anyhow::bail!("test camera is already capturing");
        }

        let (tx, rx) = mpsc::channel(self.config.buffer_frames);
        self.capturing.store(true, Ordering::SeqCst);

        let capturing = Arc::clone(&self.capturing);
        let (width, height, fps) = (self.config.width, self.config.height, self.config.fps);

        self.task = Some(tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_millis(1000 / u64::from(fps.max(1))));
            let started = Instant::now();
            let mut sequence = 0u64;

            while capturing.load(Ordering::SeqCst) {
                interval.tick().await;

                let frame = CameraFrame {
                    pixels: vec![0u8; (width * height * 3) as usize],
                    width,
                    height,
                    timestamp_ms: started.elapsed().as_millis() as u64,
                    sequence,
                };
                sequence += 1;

                if tx.send(frame).await.is_err() {
                    break;
                }
            }
        }));

        info!("Test camera started ({}x{} @ {} fps)", width, height, fps);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "test-camera"
    }
}
