#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

use super::{DmaBlock, MemoryRequests};
use crate::error::{FimgError, FimgResult};
use crate::g3d::device::G3dDevice;
use crate::g3d::ioctl::MemAllocArgs;

/// Obtains DMA-capable blocks from the 3D driver.
///
/// Keeps no record of outstanding blocks: the driver decides placement and rounding, and the
/// caller owns every [`DmaBlock`] it receives. Borrowing the device ties the allocator to the
/// lifetime of an open handle.
#[derive(Debug)]
pub struct DmaAllocator<'a, D: MemoryRequests + ?Sized = G3dDevice> {
    device: &'a D,
}

impl<'a, D: MemoryRequests + ?Sized> DmaAllocator<'a, D> {
    #[must_use]
    pub const fn new(device: &'a D) -> Self {
        Self { device }
    }

    /// Allocates at least `size` bytes.
    ///
    /// # Errors
    /// `InvalidSize` for zero or oversized requests, `Io` if the driver rejects the request,
    /// `OutOfMemory` if it answers with an empty block.
    pub fn allocate(&self, size: usize) -> FimgResult<DmaBlock> {
        if size == 0 || i32::try_from(size).is_err() {
            return Err(FimgError::InvalidSize(size));
        }

        let mut args = MemAllocArgs {
            size: size as i32,
            ..Default::default()
        };

        if let Err(e) = self.device.mem_alloc(&mut args) {
            tracing::error!("3D memory allocation of {size} bytes failed: {e}");
            return Err(e);
        }

        // The driver signals exhaustion only through the returned block.
        if args.size <= 0 || args.vir_addr == 0 {
            tracing::warn!(
                "3D memory allocation of {size} bytes returned an empty block ({} bytes, 0x{:08x} @ 0x{:08x})",
                args.size,
                args.vir_addr,
                args.phy_addr
            );
            return Err(FimgError::OutOfMemory { requested: size });
        }

        tracing::debug!(
            "Allocated {} bytes of memory. (0x{:08x} @ 0x{:08x})",
            args.size,
            args.vir_addr,
            args.phy_addr
        );

        Ok(DmaBlock {
            virt_addr: args.vir_addr as usize,
            phys_addr: args.phy_addr,
            size: args.size as usize,
            requested: size,
        })
    }

    /// Returns `block` to the driver.
    ///
    /// # Errors
    /// `InvalidSize` or `InvalidAddress` if the block does not fit the driver's 32-bit request
    /// (only possible for blocks rebuilt with [`DmaBlock::from_raw_parts`]), otherwise the
    /// driver's error. The block is consumed either way.
    pub fn free(&self, block: DmaBlock) -> FimgResult<()> {
        let size = i32::try_from(block.size).map_err(|_| FimgError::InvalidSize(block.size))?;
        let vir_addr = u32::try_from(block.virt_addr)
            .map_err(|_| FimgError::InvalidAddress(block.virt_addr))?;

        let mut args = MemAllocArgs {
            size,
            vir_addr,
            phy_addr: block.phys_addr,
        };

        tracing::debug!(
            "Freed {} bytes of memory. (0x{:08x} @ 0x{:08x})",
            args.size,
            args.vir_addr,
            args.phy_addr
        );

        self.device.mem_free(&mut args).inspect_err(|e| {
            tracing::error!(
                "3D memory free of 0x{:08x} @ 0x{:08x} failed: {e}",
                args.vir_addr,
                args.phy_addr
            );
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeKernel;

    #[test]
    fn allocate_then_free_the_returned_block() {
        let kernel = FakeKernel::new();
        let allocator = DmaAllocator::new(&kernel);

        let block = allocator.allocate(4096).unwrap();
        assert!(block.size() >= 4096);
        assert_ne!(block.virt_addr(), 0);
        assert!(!block.as_ptr().is_null());
        assert_ne!(block.phys_addr(), 0);
        assert_eq!(kernel.outstanding(), 1);

        allocator.free(block).unwrap();
        assert_eq!(kernel.outstanding(), 0);
    }

    #[test]
    fn granted_size_may_exceed_request() {
        let kernel = FakeKernel::new();
        let allocator = DmaAllocator::new(&kernel);

        let block = allocator.allocate(100).unwrap();
        assert_eq!(block.requested_size(), 100);
        assert_eq!(block.size(), 4096);

        // The free request carries the granted size, which the driver insists on.
        allocator.free(block).unwrap();
    }

    #[test]
    fn blocks_do_not_overlap() {
        let kernel = FakeKernel::new();
        let allocator = DmaAllocator::new(&kernel);

        let a = allocator.allocate(8192).unwrap();
        let b = allocator.allocate(4096).unwrap();
        assert!(a.virt_addr() + a.size() <= b.virt_addr());
        assert!(a.phys_addr() as usize + a.size() <= b.phys_addr() as usize);

        allocator.free(b).unwrap();
        allocator.free(a).unwrap();
    }

    #[test]
    fn zero_and_oversized_requests_never_reach_the_driver() {
        let kernel = FakeKernel::new();
        let allocator = DmaAllocator::new(&kernel);

        assert!(matches!(allocator.allocate(0), Err(FimgError::InvalidSize(0))));
        assert!(matches!(
            allocator.allocate(usize::MAX),
            Err(FimgError::InvalidSize(_))
        ));
        assert_eq!(kernel.requests(), 0);
    }

    #[test]
    fn empty_answer_is_out_of_memory() {
        let kernel = FakeKernel::with_capacity(4096);
        let allocator = DmaAllocator::new(&kernel);

        let block = allocator.allocate(4096).unwrap();
        let err = allocator.allocate(4096).unwrap_err();
        assert!(matches!(err, FimgError::OutOfMemory { requested: 4096 }));

        allocator.free(block).unwrap();
    }

    #[test]
    fn freeing_a_mismatched_triple_is_rejected() {
        let kernel = FakeKernel::new();
        let allocator = DmaAllocator::new(&kernel);

        let block = allocator.allocate(4096).unwrap();
        let (virt, phys, size) = block.into_raw_parts();

        // Wrong physical address for this virtual address.
        let forged = unsafe { DmaBlock::from_raw_parts(virt, phys + 4096, size) };
        let err = allocator.free(forged).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EINVAL));
        assert_eq!(kernel.outstanding(), 1);

        let genuine = unsafe { DmaBlock::from_raw_parts(virt, phys, size) };
        allocator.free(genuine).unwrap();
        assert_eq!(kernel.outstanding(), 0);
    }

    #[test]
    fn double_free_is_rejected_by_the_driver() {
        let kernel = FakeKernel::new();
        let allocator = DmaAllocator::new(&kernel);

        let (virt, phys, size) = allocator.allocate(4096).unwrap().into_raw_parts();
        allocator
            .free(unsafe { DmaBlock::from_raw_parts(virt, phys, size) })
            .unwrap();

        let err = allocator
            .free(unsafe { DmaBlock::from_raw_parts(virt, phys, size) })
            .unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EINVAL));
    }

    #[test]
    fn unrepresentable_blocks_never_reach_the_driver() {
        let kernel = FakeKernel::new();
        let allocator = DmaAllocator::new(&kernel);

        let oversized = unsafe { DmaBlock::from_raw_parts(0x4000_0000, 0x5700_0000, usize::MAX) };
        assert!(matches!(
            allocator.free(oversized),
            Err(FimgError::InvalidSize(usize::MAX))
        ));
        assert_eq!(kernel.requests(), 0);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn wide_virtual_address_is_not_truncated() {
        let kernel = FakeKernel::new();
        let allocator = DmaAllocator::new(&kernel);

        let (virt, phys, size) = allocator.allocate(4096).unwrap().into_raw_parts();
        let wide = virt | (1 << 32);

        // Truncating would free the genuine block behind the caller's back.
        let block = unsafe { DmaBlock::from_raw_parts(wide, phys, size) };
        assert!(matches!(
            allocator.free(block),
            Err(FimgError::InvalidAddress(addr)) if addr == wide
        ));
        assert_eq!(kernel.outstanding(), 1);

        allocator
            .free(unsafe { DmaBlock::from_raw_parts(virt, phys, size) })
            .unwrap();
    }
}
