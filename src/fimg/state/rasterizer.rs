use super::StateBlock;
use crate::g3d::regs::RegisterSink;

pub const FGRA_PIXSAMP: u32 = 0x3_8000;
pub const FGRA_DOFFEN: u32 = 0x3_8004;
pub const FGRA_DOFFFACTOR: u32 = 0x3_8008;
pub const FGRA_DOFFUNITS: u32 = 0x3_800c;
pub const FGRA_DOFFRIN: u32 = 0x3_8010;
pub const FGRA_BFCULL: u32 = 0x3_8014;
pub const FGRA_YCLIP: u32 = 0x3_8018;
pub const FGRA_PWIDTH: u32 = 0x3_801c;
pub const FGRA_PSIZE_MIN: u32 = 0x3_8020;
pub const FGRA_PSIZE_MAX: u32 = 0x3_8024;
pub const FGRA_COEFFSEL: u32 = 0x3_8028;
pub const FGRA_LWIDTH: u32 = 0x3_802c;
pub const FGRA_LODCTL: u32 = 0x3_c000;
pub const FGRA_XCLIP: u32 = 0x3_c004;

/// Rasterizer: sampling, depth offset, culling, clipping and point/line sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterizerState {
    pub pix_samp: u32,
    pub depth_offset_enable: u32,
    pub depth_offset_factor: u32,
    pub depth_offset_units: u32,
    pub depth_offset_r_in: u32,
    pub cull: u32,
    pub y_clip: u32,
    pub point_width: u32,
    pub point_size_min: u32,
    pub point_size_max: u32,
    pub coeff_sel: u32,
    pub line_width: u32,
    pub lod_ctl: u32,
    pub x_clip: u32,
}

impl StateBlock for RasterizerState {
    const NAME: &'static str = "rasterizer";

    fn create() -> Self {
        Self {
            pix_samp: 0,
            depth_offset_enable: 0,
            depth_offset_factor: 0,
            depth_offset_units: 0,
            depth_offset_r_in: 0,
            cull: 0,
            y_clip: 0,
            point_width: 1.0f32.to_bits(),
            point_size_min: 1.0f32.to_bits(),
            point_size_max: 2048.0f32.to_bits(),
            coeff_sel: 0,
            line_width: 1.0f32.to_bits(),
            lod_ctl: 0,
            x_clip: 0,
        }
    }

    fn restore(&self, regs: &mut impl RegisterSink) {
        regs.write_reg(FGRA_PIXSAMP, self.pix_samp);
        regs.write_reg(FGRA_DOFFEN, self.depth_offset_enable);
        regs.write_reg(FGRA_DOFFFACTOR, self.depth_offset_factor);
        regs.write_reg(FGRA_DOFFUNITS, self.depth_offset_units);
        regs.write_reg(FGRA_DOFFRIN, self.depth_offset_r_in);
        regs.write_reg(FGRA_BFCULL, self.cull);
        regs.write_reg(FGRA_YCLIP, self.y_clip);
        regs.write_reg(FGRA_PWIDTH, self.point_width);
        regs.write_reg(FGRA_PSIZE_MIN, self.point_size_min);
        regs.write_reg(FGRA_PSIZE_MAX, self.point_size_max);
        regs.write_reg(FGRA_COEFFSEL, self.coeff_sel);
        regs.write_reg(FGRA_LWIDTH, self.line_width);
        regs.write_reg(FGRA_LODCTL, self.lod_ctl);
        regs.write_reg(FGRA_XCLIP, self.x_clip);
    }
}
