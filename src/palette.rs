//! System palette and RGBA expansion.
//!
//! The PPU stores 6-bit palette indices in its frame buffer; hosts turn
//! them into colors here. Emphasis bits are not applied.

use crate::ppu::FrameBuffer;

/// Bytes per pixel in RGBA8 output.
pub const BYTES_PER_PIXEL: usize = 4;

/// NTSC 2C02 master palette, RGB.
#[rustfmt::skip]
pub const SYSTEM_PALETTE: [[u8; 3]; 64] = [
    [0x75, 0x75, 0x75], [0x27, 0x1B, 0x8F], [0x00, 0x00, 0xAB], [0x47, 0x00, 0x9F], // $00
    [0x8F, 0x00, 0x77], [0xAB, 0x00, 0x13], [0xA7, 0x00, 0x00], [0x7F, 0x0B, 0x00], // $04
    [0x43, 0x2F, 0x00], [0x00, 0x47, 0x00], [0x00, 0x51, 0x00], [0x00, 0x3F, 0x17], // $08
    [0x1B, 0x3F, 0x5F], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], // $0C
    [0xBC, 0xBC, 0xBC], [0x00, 0x73, 0xEF], [0x23, 0x3B, 0xEF], [0x83, 0x00, 0xF3], // $10
    [0xBF, 0x00, 0xBF], [0xE7, 0x00, 0x5B], [0xDB, 0x2B, 0x00], [0xCB, 0x4F, 0x0F], // $14
    [0x8B, 0x73, 0x00], [0x00, 0x97, 0x00], [0x00, 0xAB, 0x00], [0x00, 0x93, 0x3B], // $18
    [0x00, 0x83, 0x8B], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], // $1C
    [0xFF, 0xFF, 0xFF], [0x3F, 0xBF, 0xFF], [0x5F, 0x97, 0xFF], [0xA7, 0x8B, 0xFD], // $20
    [0xF7, 0x7B, 0xFF], [0xFF, 0x77, 0xB7], [0xFF, 0x77, 0x63], [0xFF, 0x9B, 0x3B], // $24
    [0xF3, 0xBF, 0x3F], [0x83, 0xD3, 0x13], [0x4F, 0xDF, 0x4B], [0x58, 0xF8, 0x98], // $28
    [0x00, 0xEB, 0xDB], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], // $2C
    [0xFF, 0xFF, 0xFF], [0xAB, 0xE7, 0xFF], [0xC7, 0xD7, 0xFF], [0xD7, 0xCB, 0xFF], // $30
    [0xFF, 0xC7, 0xFF], [0xFF, 0xC7, 0xDB], [0xFF, 0xBF, 0xB3], [0xFF, 0xDB, 0xAB], // $34
    [0xFF, 0xE7, 0xA3], [0xE3, 0xFF, 0xA3], [0xAB, 0xF3, 0xBF], [0xB3, 0xFF, 0xCF], // $38
    [0x9F, 0xFF, 0xF3], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], [0x00, 0x00, 0x00], // $3C
];

/// RGB for a 6-bit palette index (upper bits ignored).
#[inline]
pub fn rgb(index: u8) -> [u8; 3] {
    SYSTEM_PALETTE[(index & 0x3F) as usize]
}

/// Expand `frame` into `out` as RGBA8, alpha fixed at 0xFF.
///
/// `out` must hold at least `width * height * 4` bytes; extra bytes are left
/// untouched.
pub fn frame_to_rgba(frame: &FrameBuffer, out: &mut [u8]) {
    debug_assert!(out.len() >= frame.as_slice().len() * BYTES_PER_PIXEL);
    for (&index, px) in frame.as_slice().iter().zip(out.chunks_exact_mut(BYTES_PER_PIXEL)) {
        let [r, g, b] = rgb(index);
        px.copy_from_slice(&[r, g, b, 0xFF]);
    }
}
