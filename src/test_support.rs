//! File-backed stand-ins for the 3D driver and `/dev/mem`.

#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use crate::config::DeviceConfig;
use crate::error::FimgResult;
use crate::fimg::memory::MemoryRequests;
use crate::g3d::ioctl::{FIMG_SFR_SIZE, MemAllocArgs};
use std::collections::HashMap;
use std::ffi::CString;
use std::fs::File;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// A temporary directory holding a plain file in place of the device node and a zeroed
/// file as large as the register window in place of physical memory.
pub struct FakeHardware {
    pub dir: TempDir,
    pub config: DeviceConfig,
}

impl FakeHardware {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let device_path = dir.path().join("s3c-g3d");
        let mem_path = dir.path().join("mem");

        File::create(&device_path).unwrap();
        File::create(&mem_path)
            .unwrap()
            .set_len(FIMG_SFR_SIZE as u64)
            .unwrap();

        let config = DeviceConfig::new()
            .device_path(device_path)
            .mem_path(mem_path)
            .sfr_base(0);

        Self { dir, config }
    }

    /// A named pipe: opens fine, cannot be mapped.
    pub fn fifo(&self) -> PathBuf {
        let path = self.dir.path().join("fifo");
        if !path.exists() {
            let c_path = CString::new(path.as_os_str().as_bytes()).unwrap();
            let ret = unsafe { libc::mkfifo(c_path.as_ptr(), 0o600) };
            assert_eq!(ret, 0, "mkfifo: {}", io::Error::last_os_error());
        }
        path
    }
}

const PAGE_SIZE: u32 = 4096;

#[derive(Debug)]
struct KernelState {
    next_va: u32,
    next_pa: u32,
    used: u32,
    capacity: u32,
    blocks: HashMap<u32, (u32, i32)>,
    requests: usize,
}

/// Models the memory requests of the 3D driver: page rounding, a fixed pool, and strict
/// matching of the triple on free.
#[derive(Debug)]
pub struct FakeKernel {
    state: Mutex<KernelState>,
}

impl FakeKernel {
    pub fn new() -> Self {
        Self::with_capacity(16 << 20)
    }

    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            state: Mutex::new(KernelState {
                next_va: 0x4000_0000,
                next_pa: 0x5700_0000,
                used: 0,
                capacity,
                blocks: HashMap::new(),
                requests: 0,
            }),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.state.lock().unwrap().blocks.len()
    }

    pub fn requests(&self) -> usize {
        self.state.lock().unwrap().requests
    }
}

impl MemoryRequests for FakeKernel {
    fn mem_alloc(&self, args: &mut MemAllocArgs) -> FimgResult<()> {
        let mut state = self.state.lock().unwrap();
        state.requests += 1;

        let size = (args.size as u32).div_ceil(PAGE_SIZE) * PAGE_SIZE;
        if state.used + size > state.capacity {
            // Like the real driver: the call succeeds, the block is empty.
            *args = MemAllocArgs::default();
            return Ok(());
        }

        let (va, pa) = (state.next_va, state.next_pa);
        state.next_va += size;
        state.next_pa += size;
        state.used += size;
        state.blocks.insert(va, (pa, size as i32));

        *args = MemAllocArgs {
            size: size as i32,
            vir_addr: va,
            phy_addr: pa,
        };
        Ok(())
    }

    fn mem_free(&self, args: &mut MemAllocArgs) -> FimgResult<()> {
        let mut state = self.state.lock().unwrap();
        state.requests += 1;

        match state.blocks.get(&args.vir_addr) {
            Some(&(pa, size)) if pa == args.phy_addr && size == args.size => {
                state.blocks.remove(&args.vir_addr);
                state.used -= size as u32;
                Ok(())
            }
            _ => Err(io::Error::from_raw_os_error(libc::EINVAL).into()),
        }
    }
}
