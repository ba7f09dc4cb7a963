#![allow(clippy::used_underscore_items, clippy::cast_possible_truncation)]

const _IOC_NRBITS: u32 = 8;
const _IOC_TYPEBITS: u32 = 8;
const _IOC_SIZEBITS: u32 = 14;

const _IOC_NRSHIFT: u32 = 0;
const _IOC_TYPESHIFT: u32 = _IOC_NRSHIFT + _IOC_NRBITS;
const _IOC_SIZESHIFT: u32 = _IOC_TYPESHIFT + _IOC_TYPEBITS;
const _IOC_DIRSHIFT: u32 = _IOC_SIZESHIFT + _IOC_SIZEBITS;

const _IOC_WRITE: u32 = 1;
const _IOC_READ: u32 = 2;

/// Linux `_IOC`. The request number is ORed in unmasked, exactly like the C macro,
/// so numbers wider than `_IOC_NRBITS` spill into the type field.
#[must_use]
pub const fn _ioc(dir: u32, type_: u32, nr: u32, size: usize) -> u32 {
    (dir << _IOC_DIRSHIFT)
        | (type_ << _IOC_TYPESHIFT)
        | (nr << _IOC_NRSHIFT)
        | ((size as u32) << _IOC_SIZESHIFT)
}

#[must_use]
pub const fn iowr<T>(type_: u32, nr: u32) -> u32 {
    _ioc(_IOC_READ | _IOC_WRITE, type_, nr, std::mem::size_of::<T>())
}

/// Parses `0x`-prefixed hex or plain decimal. `_` separators are allowed in both.
pub fn parse_u64(text: &str) -> Option<u64> {
    let text = text.trim().replace('_', "");
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}
