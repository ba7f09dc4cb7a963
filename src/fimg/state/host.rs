use super::StateBlock;
use crate::g3d::regs::RegisterSink;

/// Number of vertex attributes the host interface can fetch.
pub const FIMG_ATTRIB_NUM: usize = 10;

pub const FGHI_CONTROL: u32 = 0x8008;
pub const FGHI_IDXOFFSET: u32 = 0x800c;
pub const FGHI_VBADDR: u32 = 0x8010;

#[must_use]
pub const fn fghi_attrib(n: usize) -> u32 {
    0x8040 + 4 * n as u32
}

#[must_use]
pub const fn fghi_attrib_vbctrl(n: usize) -> u32 {
    0x8080 + 4 * n as u32
}

#[must_use]
pub const fn fghi_attrib_vbbase(n: usize) -> u32 {
    0x80c0 + 4 * n as u32
}

/// Attribute descriptor as seen by the host interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostAttrib {
    /// Component count, type and swizzle.
    pub format: u32,
    /// Stride and element count of the vertex buffer.
    pub vb_ctrl: u32,
    /// Offset of the attribute within the vertex buffer.
    pub vb_base: u32,
}

/// Host interface: how vertices are fetched and fed to the shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostState {
    pub control: u32,
    pub index_offset: u32,
    pub vb_addr: u32,
    pub attrib: [HostAttrib; FIMG_ATTRIB_NUM],
}

impl StateBlock for HostState {
    const NAME: &'static str = "host";

    fn create() -> Self {
        // Index offset defaults to 1 so sequential draws advance by one vertex.
        Self {
            control: 0,
            index_offset: 1,
            vb_addr: 0,
            attrib: [HostAttrib::default(); FIMG_ATTRIB_NUM],
        }
    }

    fn restore(&self, regs: &mut impl RegisterSink) {
        regs.write_reg(FGHI_CONTROL, self.control);
        regs.write_reg(FGHI_IDXOFFSET, self.index_offset);
        regs.write_reg(FGHI_VBADDR, self.vb_addr);

        for (n, attrib) in self.attrib.iter().enumerate() {
            regs.write_reg(fghi_attrib(n), attrib.format);
            regs.write_reg(fghi_attrib_vbctrl(n), attrib.vb_ctrl);
            regs.write_reg(fghi_attrib_vbbase(n), attrib.vb_base);
        }
    }
}
