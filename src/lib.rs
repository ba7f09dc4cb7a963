//! System interface of the Samsung S3C6410 FIMG-3DSE graphics core.
//!
//! [`g3d`] talks to the kernel: the `/dev/s3c-g3d` driver, the register window mapped from
//! `/dev/mem`, and the DMA memory requests. [`fimg`] builds the runtime on top of it: a
//! reference-counted [`DeviceRegistry`], per-client [`Context`]s with their register state,
//! and the [`DmaAllocator`].

pub mod config;
pub mod error;
pub mod fimg;
pub mod g3d;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::DeviceConfig;
pub use error::{FimgError, FimgResult};
pub use fimg::context::Context;
pub use fimg::memory::{DmaAllocator, DmaBlock};
pub use fimg::registry::{DeviceLease, DeviceRegistry};
pub use g3d::device::G3dDevice;
