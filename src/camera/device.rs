use super::backend::{CameraBackend, CameraBackendConfig, CameraFrame};
use anyhow::{anyhow, Context, Result};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

/// Webcam capture backend built on nokhwa.
///
/// nokhwa's `Camera` is not `Send`, so the capture loop runs on a dedicated
/// thread; frames cross into async land over an mpsc channel.
pub struct DeviceBackend {
    device_index: u32,
    config: CameraBackendConfig,
    capturing: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl DeviceBackend {
    pub fn new(device_index: u32, config: CameraBackendConfig) -> Self {
        Self {
            device_index,
            config,
            capturing: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }
}

#[async_trait::async_trait]
impl CameraBackend for DeviceBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<CameraFrame>> {
        if self.capturing.load(Ordering::SeqCst) {
            anyhow::bail!("camera {} is already capturing", self.device_index);
        }

        let (frame_tx, frame_rx) = mpsc::channel(self.config.buffer_frames);
        let (ready_tx, ready_rx) = oneshot::channel();

        self.capturing.store(true, Ordering::SeqCst);
        let capturing = Arc::clone(&self.capturing);
        let device_index = self.device_index;

        let worker = std::thread::Builder::new()
            .name(format!("camera-capture-{}", device_index))
            .spawn(move || capture_loop(device_index, frame_tx, ready_tx, capturing))
            .context("Failed to spawn camera capture thread")?;
        self.worker = Some(worker);

        // The capture thread reports back once the device is open (or not).
        match ready_rx.await {
            Ok(Ok(())) => {
                info!("Camera {} opened", device_index);
                Ok(frame_rx)
            }
            Ok(Err(e)) => {
                self.capturing.store(false, Ordering::SeqCst);
                self.join_worker().await;
                Err(e)
            }
            Err(_) => {
                self.capturing.store(false, Ordering::SeqCst);
                self.join_worker().await;
                Err(anyhow!(
                    "camera capture thread exited before opening device {}",
                    device_index
                ))
            }
        }
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);
        self.join_worker().await;
        info!("Camera {} released", self.device_index);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "nokhwa-device"
    }
}

impl Drop for DeviceBackend {
    fn drop(&mut self) {
        // The capture thread watches this flag and exits on its own.
        self.capturing.store(false, Ordering::SeqCst);
    }
}

impl DeviceBackend {
    async fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            let joined = tokio::task::spawn_blocking(move || worker.join()).await;
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(_)) => error!("Camera capture thread panicked"),
                Err(e) => error!("Failed to join camera capture thread: {}", e),
            }
        }
    }
}

/// Blocking capture loop: open the device, then pull and decode frames
/// until the capturing flag drops or the receiver goes away.
fn capture_loop(
    device_index: u32,
    frames: mpsc::Sender<CameraFrame>,
    ready: oneshot::Sender<Result<()>>,
    capturing: Arc<AtomicBool>,
) {
    let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);

    let mut camera = match Camera::new(CameraIndex::Index(device_index), requested) {
        Ok(camera) => camera,
        Err(e) => {
            capturing.store(false, Ordering::SeqCst);
            let _ = ready.send(Err(anyhow!("failed to open camera {}: {}", device_index, e)));
            return;
        }
    };

    if let Err(e) = camera.open_stream() {
        capturing.store(false, Ordering::SeqCst);
        let _ = ready.send(Err(anyhow!(
            "failed to start camera {} stream: {}",
            device_index,
            e
        )));
        return;
    }

    let _ = ready.send(Ok(()));

    let started = Instant::now();
    let mut sequence = 0u64;

    while capturing.load(Ordering::SeqCst) {
        let buffer = match camera.frame() {
            Ok(buffer) => buffer,
            Err(e) => {
                warn!("Camera {} frame read failed: {}", device_index, e);
                break;
            }
        };

        let image = match buffer.decode_image::<RgbFormat>() {
            Ok(image) => image,
            Err(e) => {
                warn!("Camera {} frame decode failed: {}", device_index, e);
                continue;
            }
        };

        let frame = CameraFrame {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
            timestamp_ms: started.elapsed().as_millis() as u64,
            sequence,
        };
        sequence += 1;

        // Receiver gone means the session is tearing down.
        if frames.blocking_send(frame).is_err() {
            break;
        }
    }

    if let Err(e) = camera.stop_stream() {
        warn!("Camera {} stream stop failed: {}", device_index, e);
    }
    capturing.store(false, Ordering::SeqCst);
}
