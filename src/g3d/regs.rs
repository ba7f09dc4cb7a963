use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::ptr::{self, NonNull};
use std::sync::MutexGuard;

/// Destination of register writes.
///
/// The live hardware window implements this, and so can anything that wants to
/// observe what a restore would program (e.g. a recording `Vec`).
pub trait RegisterSink {
    fn write_reg(&mut self, offset: u32, value: u32);
}

impl RegisterSink for Vec<(u32, u32)> {
    fn write_reg(&mut self, offset: u32, value: u32) {
        self.push((offset, value));
    }
}

/// An owned `MAP_SHARED` mapping of the SFR window.
///
/// Not `Clone`: the mapping is released exactly once, when this value is dropped.
#[derive(Debug)]
pub struct RegisterWindow {
    base: NonNull<u8>,
    len: usize,
}

// SAFETY: the window is plain device memory; every access goes through volatile
// reads/writes and callers serialize writers through `RegisterGuard`.
unsafe impl Send for RegisterWindow {}
unsafe impl Sync for RegisterWindow {}

impl RegisterWindow {
    /// Maps `len` bytes of `mem` at physical offset `base`, read/write and shared.
    ///
    /// # Errors
    /// Returns the `mmap` error.
    pub fn map(mem: &File, base: u64, len: usize) -> io::Result<Self> {
        let offset = libc::off_t::try_from(base)
            .map_err(|_| io::Error::from_raw_os_error(libc::EOVERFLOW))?;

        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                mem.as_raw_fd(),
                offset,
            )
        };

        if addr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }

        let base = NonNull::new(addr.cast::<u8>())
            .ok_or_else(|| io::Error::from_raw_os_error(libc::EFAULT))?;

        Ok(Self { base, len })
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn as_ptr(&self) -> *mut u8 {
        self.base.as_ptr()
    }

    fn reg_ptr(&self, offset: u32) -> *mut u32 {
        let offset = offset as usize;
        assert!(
            offset % 4 == 0 && offset + 4 <= self.len,
            "register offset 0x{offset:x} outside 0x{:x}-byte window",
            self.len
        );
        unsafe { self.base.as_ptr().add(offset).cast::<u32>() }
    }

    /// Volatile 32-bit read.
    ///
    /// # Panics
    /// Panics if `offset` is misaligned or outside the window.
    #[must_use]
    pub fn read(&self, offset: u32) -> u32 {
        unsafe { ptr::read_volatile(self.reg_ptr(offset)) }
    }

    /// Volatile 32-bit write.
    ///
    /// # Panics
    /// Panics if `offset` is misaligned or outside the window.
    pub fn write(&self, offset: u32, value: u32) {
        unsafe { ptr::write_volatile(self.reg_ptr(offset), value) }
    }
}

impl Drop for RegisterWindow {
    fn drop(&mut self) {
        let ret = unsafe { libc::munmap(self.base.as_ptr().cast(), self.len) };
        if ret < 0 {
            tracing::error!(
                "munmap of FIMG registers failed: {}",
                io::Error::last_os_error()
            );
        }
    }
}

/// Exclusive access to the register window of an open device.
///
/// Holding the guard makes the holder the only writer among everything sharing the
/// device, which is what a context restore needs.
pub struct RegisterGuard<'a> {
    window: &'a RegisterWindow,
    _lock: MutexGuard<'a, ()>,
}

impl<'a> RegisterGuard<'a> {
    pub(crate) fn new(window: &'a RegisterWindow, lock: MutexGuard<'a, ()>) -> Self {
        Self {
            window,
            _lock: lock,
        }
    }

    #[must_use]
    pub fn read(&self, offset: u32) -> u32 {
        self.window.read(offset)
    }

    pub fn write(&self, offset: u32, value: u32) {
        self.window.write(offset, value);
    }
}

impl RegisterSink for RegisterGuard<'_> {
    fn write_reg(&mut self, offset: u32, value: u32) {
        self.window.write(offset, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom};

    const LEN: usize = 0x2000;

    fn backing_file() -> File {
        let file = tempfile::tempfile().unwrap();
        file.set_len(LEN as u64).unwrap();
        file
    }

    #[test]
    fn writes_reach_the_backing_memory() {
        let mut file = backing_file();
        {
            let window = RegisterWindow::map(&file, 0, LEN).unwrap();
            window.write(0x10, 0xdead_beef);
            assert_eq!(window.read(0x10), 0xdead_beef);
            assert_eq!(window.read(0x14), 0);
        }

        let mut bytes = [0u8; 4];
        file.seek(SeekFrom::Start(0x10)).unwrap();
        file.read_exact(&mut bytes).unwrap();
        assert_eq!(u32::from_ne_bytes(bytes), 0xdead_beef);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn access_past_the_window_panics() {
        let file = backing_file();
        let window = RegisterWindow::map(&file, 0, LEN).unwrap();
        window.write(LEN as u32, 1);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn misaligned_access_panics() {
        let file = backing_file();
        let window = RegisterWindow::map(&file, 0, LEN).unwrap();
        let _ = window.read(2);
    }

    #[test]
    fn vec_sink_records_in_order() {
        let mut sink: Vec<(u32, u32)> = Vec::new();
        sink.write_reg(8, 1);
        sink.write_reg(4, 2);
        assert_eq!(sink, vec![(8, 1), (4, 2)]);
    }
}
