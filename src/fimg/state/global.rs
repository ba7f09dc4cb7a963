use super::StateBlock;
use crate::g3d::regs::RegisterSink;

pub const FGGB_INTMASK: u32 = 0x44;
pub const FGGB_PIPEMASK: u32 = 0x48;
pub const FGGB_PIPETGTSTATE: u32 = 0x4c;
pub const FGGB_INTPENDING_TARGET: u32 = 0x50;

/// Global block: interrupt and pipeline-flush configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalState {
    pub int_mask: u32,
    pub pipe_mask: u32,
    pub pipe_target_state: u32,
    pub int_target: u32,
}

impl StateBlock for GlobalState {
    const NAME: &'static str = "global";

    fn create() -> Self {
        Self::default()
    }

    fn restore(&self, regs: &mut impl RegisterSink) {
        regs.write_reg(FGGB_INTMASK, self.int_mask);
        regs.write_reg(FGGB_PIPEMASK, self.pipe_mask);
        regs.write_reg(FGGB_PIPETGTSTATE, self.pipe_target_state);
        regs.write_reg(FGGB_INTPENDING_TARGET, self.int_target);
    }
}
