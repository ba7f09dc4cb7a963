pub mod allocator;

use crate::error::FimgResult;
use crate::g3d::device::G3dDevice;
use crate::g3d::ioctl::MemAllocArgs;

/// A physically contiguous block handed out by the 3D driver.
///
/// The virtual/physical pair and the granted size travel together and are only given back
/// together, by passing the whole block to [`DmaAllocator::free`]. Not `Clone`, so a block
/// cannot be freed twice through the safe API.
#[must_use = "dropping a DmaBlock leaks it; return it with DmaAllocator::free"]
#[derive(Debug, PartialEq, Eq)]
pub struct DmaBlock {
    virt_addr: usize,
    phys_addr: u32,
    size: usize,
    requested: usize,
}

impl DmaBlock {
    /// Reassembles a block from the values returned by [`DmaBlock::into_raw_parts`].
    ///
    /// # Safety
    /// The triple must be exactly one that the driver returned for a live allocation, and no
    /// other `DmaBlock` may describe the same allocation.
    #[must_use]
    pub const unsafe fn from_raw_parts(virt_addr: usize, phys_addr: u32, size: usize) -> Self {
        Self {
            virt_addr,
            phys_addr,
            size,
            requested: size,
        }
    }

    /// Splits the block into `(virtual address, physical address, granted size)`.
    #[must_use = "the raw parts are the only way left to free the block"]
    pub const fn into_raw_parts(self) -> (usize, u32, usize) {
        (self.virt_addr, self.phys_addr, self.size)
    }

    /// Process-local address of the block.
    #[must_use]
    pub const fn virt_addr(&self) -> usize {
        self.virt_addr
    }

    #[must_use]
    pub fn as_ptr(&self) -> *mut u8 {
        std::ptr::with_exposed_provenance_mut(self.virt_addr)
    }

    /// Bus address to program into the hardware.
    #[must_use]
    pub const fn phys_addr(&self) -> u32 {
        self.phys_addr
    }

    /// Granted size. Use this, not the requested size, for any bookkeeping.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn requested_size(&self) -> usize {
        self.requested
    }
}

/// The two memory requests of the 3D driver.
///
/// Implemented by [`G3dDevice`]; anything else that speaks the same protocol can stand in.
pub trait MemoryRequests {
    /// Allocate request: `args.size` in, all fields out.
    fn mem_alloc(&self, args: &mut MemAllocArgs) -> FimgResult<()>;

    /// Free request: the triple from a previous allocate.
    fn mem_free(&self, args: &mut MemAllocArgs) -> FimgResult<()>;
}

impl MemoryRequests for G3dDevice {
    fn mem_alloc(&self, args: &mut MemAllocArgs) -> FimgResult<()> {
        Self::mem_alloc(self, args)
    }

    fn mem_free(&self, args: &mut MemAllocArgs) -> FimgResult<()> {
        Self::mem_free(self, args)
    }
}

// Re-export the allocator for easy access
pub use allocator::DmaAllocator;
