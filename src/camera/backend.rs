use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// A single captured video frame (RGB24, interleaved)
#[derive(Debug, Clone)]
pub struct CameraFrame {
    /// Raw pixel data (3 bytes per pixel, row-major)
    pub pixels: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
    /// Frame sequence number
    pub sequence: u64,
}

/// Configuration for camera backends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraBackendConfig {
    /// Requested frame width
    pub width: u32,
    /// Requested frame height
    pub height: u32,
    /// Requested frame rate
    pub fps: u32,
    /// Frame channel capacity (affects latency under a slow consumer)
    pub buffer_frames: usize,
}

impl Default for CameraBackendConfig {
    fn default() -> Self {
        Self {
            width: 1280, // 720p is plenty for an interview feed
            height: 720,
            fps: 30,
            buffer_frames: 4,
        }
    }
}

/// Camera capture backend trait
///
/// Implementations:
/// - Device: real webcam capture via nokhwa (all desktop platforms)
/// - Test: synthetic frames for integration tests
#[async_trait::async_trait]
pub trait CameraBackend: Send + Sync {
    /// Start capturing video
    ///
    /// Returns a channel receiver that will receive captured frames.
    /// Fails if the device is unavailable or access is denied.
    async fn start(&mut self) -> Result<mpsc::Receiver<CameraFrame>>;

    /// Stop capturing and release the device
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Camera source selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CameraSource {
    /// Real capture device, by platform device index
    Device(u32),
    /// Synthetic frame generator (for tests)
    Test,
    /// Always fails to open, simulating denied camera access (for tests)
    Denied,
}

/// Camera backend factory
pub struct CameraBackendFactory;

impl CameraBackendFactory {
    /// Create a camera backend for the given source
    pub fn create(
        source: CameraSource,
        config: CameraBackendConfig,
    ) -> Result<Box<dyn CameraBackend>> {
        match source {
            CameraSource::Device(index) => {
                let backend = super::device::DeviceBackend::new(index, config);
                Ok(Box::new(backend))
            }
            CameraSource::Test => Ok(Box::new(super::test::TestBackend::new(config))),
            CameraSource::Denied => Ok(Box::new(super::test::TestBackend::denied(config))),
        }
    }
}
