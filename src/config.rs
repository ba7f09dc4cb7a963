use crate::error::{FimgError, FimgResult};
use crate::g3d::ioctl::{FIMG_SFR_BASE, FIMG_SFR_SIZE, G3D_DEVICE_PATH, MEM_DEVICE_PATH};
use crate::utils::parse_u64;
use std::path::PathBuf;

pub const ENV_DEVICE_PATH: &str = "FIMG_DEVICE_PATH";
pub const ENV_MEM_PATH: &str = "FIMG_MEM_PATH";
pub const ENV_SFR_BASE: &str = "FIMG_SFR_BASE";

/// Where the 3D device lives and which physical window holds its registers.
///
/// The defaults describe the S3C6410 FIMG-3DSE. Everything is overridable so the
/// device can be pointed at file-backed stand-ins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Character device of the 3D driver (`/dev/s3c-g3d`).
    pub device_path: PathBuf,
    /// Physical memory device used to map the SFR window (`/dev/mem`).
    pub mem_path: PathBuf,
    /// Physical base address of the register bank. Must be page aligned.
    pub sfr_base: u64,
    /// Length of the register bank in bytes.
    pub sfr_size: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from(G3D_DEVICE_PATH),
            mem_path: PathBuf::from(MEM_DEVICE_PATH),
            sfr_base: FIMG_SFR_BASE,
            sfr_size: FIMG_SFR_SIZE,
        }
    }
}

impl DeviceConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn device_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.device_path = path.into();
        self
    }

    #[must_use]
    pub fn mem_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.mem_path = path.into();
        self
    }

    #[must_use]
    pub const fn sfr_base(mut self, base: u64) -> Self {
        self.sfr_base = base;
        self
    }

    /// Defaults overridden by `FIMG_DEVICE_PATH`, `FIMG_MEM_PATH` and `FIMG_SFR_BASE`.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `FIMG_SFR_BASE` is not a number.
    pub fn from_env() -> FimgResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DeviceConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the base address is not a number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> FimgResult<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DEVICE_PATH) {
            config.device_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_MEM_PATH) {
            config.mem_path = PathBuf::from(path);
        }
        if let Some(base) = lookup(ENV_SFR_BASE) {
            config.sfr_base = parse_u64(&base).ok_or_else(|| {
                FimgError::InvalidConfig(format!("{ENV_SFR_BASE}={base} is not an address"))
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_describe_the_s3c6410() {
        let config = DeviceConfig::default();
        assert_eq!(config.device_path, PathBuf::from("/dev/s3c-g3d"));
        assert_eq!(config.mem_path, PathBuf::from("/dev/mem"));
        assert_eq!(config.sfr_base, 0x7200_0000);
        assert_eq!(config.sfr_size, 0x8_0000);
    }

    #[test]
    fn lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            (ENV_DEVICE_PATH, "/tmp/g3d"),
            (ENV_SFR_BASE, "0x1000"),
        ]
        .into_iter()
        .collect();

        let config =
            DeviceConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string())).unwrap();

        assert_eq!(config.device_path, PathBuf::from("/tmp/g3d"));
        assert_eq!(config.mem_path, PathBuf::from("/dev/mem"));
        assert_eq!(config.sfr_base, 0x1000);
    }

    #[test]
    fn bad_base_address_is_rejected() {
        let err = DeviceConfig::from_lookup(|key| {
            (key == ENV_SFR_BASE).then(|| "somewhere".to_string())
        })
        .unwrap_err();

        assert!(matches!(err, FimgError::InvalidConfig(_)));
    }
}
