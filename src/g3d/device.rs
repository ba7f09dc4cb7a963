use crate::config::DeviceConfig;
use crate::error::{FimgError, FimgResult};
use crate::g3d::ioctl::{MemAllocArgs, S3C_3D_MEM_ALLOC, S3C_3D_MEM_FREE};
use crate::g3d::regs::{RegisterGuard, RegisterWindow};
use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::RawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Everything that exists only while the device is open.
///
/// Field order is teardown order: the mapping goes before either descriptor.
#[derive(Debug)]
struct OpenDevice {
    regs: RegisterWindow,
    g3d: File,
    mem: File,
}

/// A handle to the 3D driver (`/dev/s3c-g3d`) plus the mapped SFR window.
///
/// Open state is all-or-nothing: both descriptors and the mapping are present together
/// or not at all.
#[derive(Debug)]
pub struct G3dDevice {
    inner: Option<OpenDevice>,
    reg_lock: Mutex<()>,
}

fn open_path(path: &Path, options: &OpenOptions) -> FimgResult<File> {
    options.open(path).map_err(|source| {
        tracing::error!("Couldn't open {} ({source}).", path.display());
        FimgError::ResourceUnavailable {
            path: path.to_path_buf(),
            source,
        }
    })
}

impl G3dDevice {
    /// Opens the 3D device and maps its registers.
    ///
    /// # Errors
    /// `ResourceUnavailable` if either device node cannot be opened, `MappingFailure` if the
    /// register window cannot be mapped. Whatever was opened before the failure is closed again.
    pub fn open(config: &DeviceConfig) -> FimgResult<Self> {
        let g3d = open_path(
            &config.device_path,
            OpenOptions::new().read(true).write(true),
        )?;

        // `g3d` is closed on drop if anything below fails.
        let mem = open_path(
            &config.mem_path,
            OpenOptions::new()
                .read(true)
                .write(true)
                .custom_flags(libc::O_SYNC),
        )?;

        let regs = RegisterWindow::map(&mem, config.sfr_base, config.sfr_size).map_err(|e| {
            tracing::error!("Couldn't mmap FIMG registers ({e}).");
            FimgError::MappingFailure(e)
        })?;

        tracing::debug!(
            "fimg3D: Opened {} ({}) and {} ({}).",
            config.device_path.display(),
            g3d.as_raw_fd(),
            config.mem_path.display(),
            mem.as_raw_fd()
        );

        Ok(Self {
            inner: Some(OpenDevice { regs, g3d, mem }),
            reg_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Unmaps the registers and closes both descriptors.
    ///
    /// Closing an already closed device only logs a warning. Returns whether anything was
    /// actually closed.
    pub fn close(&mut self) -> bool {
        let Some(open) = self.inner.take() else {
            tracing::warn!("fimg3D warning: Trying to close already closed device.");
            return false;
        };

        let OpenDevice { regs, g3d, mem } = open;
        let (g3d_fd, mem_fd) = (g3d.as_raw_fd(), mem.as_raw_fd());

        drop(regs);
        drop(g3d);
        drop(mem);

        tracing::debug!("fimg3D: Closed 3D device ({g3d_fd}) and memory device ({mem_fd}).");
        true
    }

    fn open_device(&self) -> FimgResult<&OpenDevice> {
        self.inner.as_ref().ok_or(FimgError::DeviceClosed)
    }

    /// Raw descriptor of the 3D device, if open.
    #[must_use]
    pub fn raw_fd(&self) -> Option<RawFd> {
        self.inner.as_ref().map(|open| open.g3d.as_raw_fd())
    }

    /// Takes the register lock and returns the mapped window.
    ///
    /// # Errors
    /// Returns `DeviceClosed` if the device has been closed.
    pub fn registers(&self) -> FimgResult<RegisterGuard<'_>> {
        let open = self.open_device()?;
        let lock = self.reg_lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(RegisterGuard::new(&open.regs, lock))
    }

    /// Generic unsafe helper to execute an IOCTL.
    ///
    /// # Safety
    /// The caller must ensure that `arg` matches the layout expected by `cmd`.
    unsafe fn ioctl<T>(&self, cmd: u32, arg: &mut T) -> FimgResult<()> {
        let fd = self.open_device()?.g3d.as_raw_fd();
        let ret = unsafe { libc::ioctl(fd, cmd as _, arg as *mut T) };
        if ret < 0 {
            return Err(io::Error::last_os_error().into());
        }
        Ok(())
    }

    /// Asks the driver for a physically contiguous block of `args.size` bytes.
    ///
    /// On success the driver rewrites `args` with the granted size and both addresses.
    ///
    /// # Errors
    /// Returns the ioctl error, or `DeviceClosed`.
    pub fn mem_alloc(&self, args: &mut MemAllocArgs) -> FimgResult<()> {
        unsafe { self.ioctl(S3C_3D_MEM_ALLOC, args) }
    }

    /// Returns a block to the driver.
    ///
    /// # Errors
    /// Returns the ioctl error, or `DeviceClosed`.
    pub fn mem_free(&self, args: &mut MemAllocArgs) -> FimgResult<()> {
        unsafe { self.ioctl(S3C_3D_MEM_FREE, args) }
    }
}

impl Drop for G3dDevice {
    fn drop(&mut self) {
        if self.is_open() {
            self.close();
        }
    }
}
