pub mod backend;
pub mod device;
pub mod test;

pub use backend::{
    CameraBackend, CameraBackendConfig, CameraBackendFactory, CameraFrame, CameraSource,
};
pub use device::DeviceBackend;
pub use test::TestBackend;
