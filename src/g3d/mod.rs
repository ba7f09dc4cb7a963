pub mod device;
pub mod ioctl;
pub mod regs;
