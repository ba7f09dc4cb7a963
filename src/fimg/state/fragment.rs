use super::StateBlock;
use crate::g3d::regs::RegisterSink;

pub const FGPF_SCISSOR_X: u32 = 0x7_0000;
pub const FGPF_SCISSOR_Y: u32 = 0x7_0004;
pub const FGPF_ALPHAT: u32 = 0x7_0008;
pub const FGPF_FRONTST: u32 = 0x7_000c;
pub const FGPF_BACKST: u32 = 0x7_0010;
pub const FGPF_DEPTHT: u32 = 0x7_0014;
pub const FGPF_CCLR: u32 = 0x7_0018;
pub const FGPF_BLEND: u32 = 0x7_001c;
pub const FGPF_LOGOP: u32 = 0x7_0020;
pub const FGPF_CBMSK: u32 = 0x7_0024;
pub const FGPF_DBMSK: u32 = 0x7_0028;
pub const FGPF_FBCTL: u32 = 0x7_002c;
pub const FGPF_DBADDR: u32 = 0x7_0030;
pub const FGPF_CBADDR: u32 = 0x7_0034;
pub const FGPF_FBW: u32 = 0x7_0038;

/// Per-fragment unit: tests, blending and framebuffer setup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentState {
    pub scissor_x: u32,
    pub scissor_y: u32,
    pub alpha_test: u32,
    pub front_stencil: u32,
    pub back_stencil: u32,
    pub depth_test: u32,
    pub blend_color: u32,
    pub blend: u32,
    pub logic_op: u32,
    pub color_mask: u32,
    pub depth_mask: u32,
    pub fb_ctl: u32,
    pub depth_addr: u32,
    pub color_addr: u32,
    pub fb_width: u32,
}

impl StateBlock for FragmentState {
    const NAME: &'static str = "fragment";

    fn create() -> Self {
        Self::default()
    }

    fn restore(&self, regs: &mut impl RegisterSink) {
        regs.write_reg(FGPF_SCISSOR_X, self.scissor_x);
        regs.write_reg(FGPF_SCISSOR_Y, self.scissor_y);
        regs.write_reg(FGPF_ALPHAT, self.alpha_test);
        regs.write_reg(FGPF_FRONTST, self.front_stencil);
        regs.write_reg(FGPF_BACKST, self.back_stencil);
        regs.write_reg(FGPF_DEPTHT, self.depth_test);
        regs.write_reg(FGPF_CCLR, self.blend_color);
        regs.write_reg(FGPF_BLEND, self.blend);
        regs.write_reg(FGPF_LOGOP, self.logic_op);
        regs.write_reg(FGPF_CBMSK, self.color_mask);
        regs.write_reg(FGPF_DBMSK, self.depth_mask);
        regs.write_reg(FGPF_FBCTL, self.fb_ctl);
        regs.write_reg(FGPF_DBADDR, self.depth_addr);
        regs.write_reg(FGPF_CBADDR, self.color_addr);
        regs.write_reg(FGPF_FBW, self.fb_width);
    }
}
