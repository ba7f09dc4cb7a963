use crate::utils::iowr;

// ===============================================================================================
// Hardware Layout
// ===============================================================================================

pub const G3D_DEVICE_PATH: &str = "/dev/s3c-g3d";
pub const MEM_DEVICE_PATH: &str = "/dev/mem";

/// Physical base of the FIMG-3DSE special function registers.
pub const FIMG_SFR_BASE: u64 = 0x7200_0000;
/// Length of the SFR window.
pub const FIMG_SFR_SIZE: usize = 0x8_0000;

// ===============================================================================================
// Memory Management
// ===============================================================================================

pub const G3D_IOCTL_MAGIC: u32 = b'S' as u32;

/// Argument block shared by the allocate and free requests.
///
/// On allocate, `size` goes in and all three fields come back filled by the driver.
/// On free, all three fields must be the ones the driver handed out.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct MemAllocArgs {
    pub size: i32,
    pub vir_addr: u32,
    pub phy_addr: u32,
}

pub const S3C_3D_MEM_ALLOC: u32 = iowr::<MemAllocArgs>(G3D_IOCTL_MAGIC, 310);
pub const S3C_3D_MEM_FREE: u32 = iowr::<MemAllocArgs>(G3D_IOCTL_MAGIC, 311);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_numbers_match_kernel_header() {
        assert_eq!(std::mem::size_of::<MemAllocArgs>(), 12);
        assert_eq!(S3C_3D_MEM_ALLOC, 0xC00C_5336);
        assert_eq!(S3C_3D_MEM_FREE, 0xC00C_5337);
    }

    #[test]
    fn register_window_is_page_aligned() {
        assert_eq!(FIMG_SFR_BASE % 4096, 0);
        assert_eq!(FIMG_SFR_SIZE % 4096, 0);
    }
}
