/*!
Error types surfaced by the core.

Only two places can fail: loading a cartridge image and registering an input
device. Stepping the console never returns an error.
*/

use thiserror::Error;

/// Failure while parsing or instantiating a cartridge image.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("image is {len} bytes, shorter than the 16-byte iNES header")]
    HeaderTooShort { len: usize },

    #[error("missing iNES signature (expected \"NES\\x1A\")")]
    BadMagic,

    #[error("header declares zero PRG ROM banks")]
    NoProgramRom,

    #[error("{section} truncated: header declares {expected} bytes but only {actual} remain")]
    Truncated {
        section: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("mapper {0} is not supported")]
    UnsupportedMapper(u16),
}

/// Failure while registering an input device into a controller slot.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    #[error("controller slot {slot} out of range (max {max})")]
    SlotOutOfRange { slot: usize, max: usize },

    #[error("input device for slot {slot} is unavailable")]
    Unavailable { slot: usize },
}
