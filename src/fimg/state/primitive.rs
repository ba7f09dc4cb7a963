use super::StateBlock;
use crate::g3d::regs::RegisterSink;

pub const FGPE_VERTEX_CONTEXT: u32 = 0x3_0000;
pub const FGPE_VIEWPORT_OX: u32 = 0x3_0004;
pub const FGPE_VIEWPORT_OY: u32 = 0x3_0008;
pub const FGPE_VIEWPORT_HALF_PX: u32 = 0x3_000c;
pub const FGPE_VIEWPORT_HALF_PY: u32 = 0x3_0010;
pub const FGPE_DEPTHRANGE_HALF_F_SUB_N: u32 = 0x3_0014;
pub const FGPE_DEPTHRANGE_HALF_F_ADD_N: u32 = 0x3_0018;

/// Primitive engine: vertex layout, viewport transform and depth range.
///
/// Floating point registers hold raw IEEE-754 bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveState {
    pub vertex_context: u32,
    pub viewport_ox: u32,
    pub viewport_oy: u32,
    pub viewport_half_px: u32,
    pub viewport_half_py: u32,
    pub depth_half_f_sub_n: u32,
    pub depth_half_f_add_n: u32,
}

impl StateBlock for PrimitiveState {
    const NAME: &'static str = "primitive";

    fn create() -> Self {
        // glDepthRangef(0, 1)
        Self {
            vertex_context: 0,
            viewport_ox: 0,
            viewport_oy: 0,
            viewport_half_px: 0,
            viewport_half_py: 0,
            depth_half_f_sub_n: 0.5f32.to_bits(),
            depth_half_f_add_n: 0.5f32.to_bits(),
        }
    }

    fn restore(&self, regs: &mut impl RegisterSink) {
        regs.write_reg(FGPE_VERTEX_CONTEXT, self.vertex_context);
        regs.write_reg(FGPE_VIEWPORT_OX, self.viewport_ox);
        regs.write_reg(FGPE_VIEWPORT_OY, self.viewport_oy);
        regs.write_reg(FGPE_VIEWPORT_HALF_PX, self.viewport_half_px);
        regs.write_reg(FGPE_VIEWPORT_HALF_PY, self.viewport_half_py);
        regs.write_reg(FGPE_DEPTHRANGE_HALF_F_SUB_N, self.depth_half_f_sub_n);
        regs.write_reg(FGPE_DEPTHRANGE_HALF_F_ADD_N, self.depth_half_f_add_n);
    }
}
