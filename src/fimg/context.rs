use crate::error::FimgResult;
use crate::fimg::memory::DmaAllocator;
use crate::fimg::registry::{DeviceLease, DeviceRegistry};
use crate::fimg::state::{
    FragmentState, GlobalState, HostState, PrimitiveState, RasterizerState, StateBlock,
};
use crate::g3d::device::G3dDevice;
use crate::g3d::regs::RegisterSink;
use std::sync::Arc;

// ===============================================================================================
// Context
// ===============================================================================================

/// Everything the FIMG-3DSE needs to render on behalf of one client.
///
/// The rendering code reads and writes the state blocks directly; [`Context::restore`] loads
/// them into the hardware when the GPU switches to this context. A context counts as a user of
/// the shared device for its whole lifetime.
///
/// Not meant for concurrent use: callers serialize access to a given context.
#[derive(Debug)]
pub struct Context {
    pub global: GlobalState,
    pub host: HostState,
    pub primitive: PrimitiveState,
    pub rasterizer: RasterizerState,
    pub fragment: FragmentState,
    /// Number of enabled vertex attributes, maintained by the draw code.
    pub num_attribs: u32,

    // Declared last so the state is dropped before the device may be closed.
    lease: DeviceLease,
}

impl Context {
    /// Builds a context in its initial state and registers it with `registry`.
    ///
    /// The first context of a registry opens the device.
    ///
    /// # Errors
    /// Returns the device open error; no context exists in that case.
    pub fn create(registry: &Arc<DeviceRegistry>) -> FimgResult<Self> {
        let global = GlobalState::create();
        let host = HostState::create();
        let primitive = PrimitiveState::create();
        let rasterizer = RasterizerState::create();
        let fragment = FragmentState::create();

        let lease = registry.acquire()?;

        Ok(Self {
            global,
            host,
            primitive,
            rasterizer,
            fragment,
            num_attribs: 0,
            lease,
        })
    }

    /// Loads this context's state into the hardware.
    ///
    /// Holds the device's register lock for the whole sequence, so restores of different
    /// contexts never interleave.
    ///
    /// # Errors
    /// Returns `DeviceClosed` if the device is gone, which a live context should never see.
    pub fn restore(&self) -> FimgResult<()> {
        let mut regs = self.lease.device().registers()?;
        self.restore_to(&mut regs);
        tracing::trace!("fimg3D: Restored context state.");
        Ok(())
    }

    /// Writes every state block to `regs`: global, host, primitive, rasterizer, fragment.
    pub fn restore_to(&self, regs: &mut impl RegisterSink) {
        restore_block(&self.global, regs);
        restore_block(&self.host, regs);
        restore_block(&self.primitive, regs);
        restore_block(&self.rasterizer, regs);
        restore_block(&self.fragment, regs);
    }

    /// An allocator for DMA memory on the device this context uses.
    #[must_use]
    pub fn allocator(&self) -> DmaAllocator<'_> {
        DmaAllocator::new(self.lease.device())
    }

    #[must_use]
    pub fn device(&self) -> &G3dDevice {
        self.lease.device()
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        self.lease.registry()
    }

    /// Drops the context. If it was the last one, the device is closed afterwards.
    ///
    /// DMA blocks obtained through [`Context::allocator`] are not freed. Their owner returns
    /// them, before or after this call.
    pub fn destroy(self) {
        drop(self);
    }
}

fn restore_block<B: StateBlock>(block: &B, regs: &mut impl RegisterSink) {
    tracing::trace!("fimg3D: Restoring {} state.", B::NAME);
    block.restore(regs);
}
