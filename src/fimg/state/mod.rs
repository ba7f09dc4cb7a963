//! Register-state sub-blocks of a rendering context.
//!
//! Each block is plain data owned by a [`Context`](crate::fimg::context::Context). The
//! rendering logic edits the fields between restores; `restore` projects the block onto the
//! hardware registers in a fixed order.

pub mod fragment;
pub mod global;
pub mod host;
pub mod primitive;
pub mod rasterizer;

pub use fragment::FragmentState;
pub use global::GlobalState;
pub use host::HostState;
pub use primitive::PrimitiveState;
pub use rasterizer::RasterizerState;

use crate::g3d::regs::RegisterSink;

/// A block of hardware state that can be reinstated on the GPU.
pub trait StateBlock {
    /// Short name used in logs.
    const NAME: &'static str;

    /// Builds the block in its power-on configuration.
    ///
    /// Must not depend on any other block.
    fn create() -> Self;

    /// Writes every register of the block, always in the same order.
    fn restore(&self, regs: &mut impl RegisterSink);
}
