#![doc = r#"
PPU sprite output

Responsibilities
- Promote the slots fetched on the previous line to the active set (dot 1)
- Produce the sprite pixel for a screen column: first opaque slot in OAM order
- Provide the bit-reversal helper used for horizontal flip (`reverse8`)
"#]

use super::*;

/// Opaque sprite pixel chosen for one column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(in crate::ppu) struct SpritePixel {
    pub pixel: u8,
    pub palette: u8,
    pub behind_background: bool,
    pub is_sprite_zero: bool,
}

impl Ppu {
    #[inline]
    pub(in crate::ppu) fn load_sprite_slots(&mut self) {
        self.slots = self.next_slots;
        self.slot_count = self.next_count;
    }

    pub(in crate::ppu) fn sprite_pixel(&self, x: usize) -> Option<SpritePixel> {
        if !self.mask.contains(PpuMask::SHOW_SPRITES)
            || (x < 8 && !self.mask.contains(PpuMask::SHOW_SPRITES_LEFT))
        {
            return None;
        }
        self.slots[..self.slot_count as usize].iter().find_map(|slot| {
            let offset = x.checked_sub(slot.x as usize).filter(|&o| o < 8)?;
            let shift = 7 - offset;
            let lo = (slot.pattern_lo >> shift) & 1;
            let hi = (slot.pattern_hi >> shift) & 1;
            let pixel = (hi << 1) | lo;
            (pixel != 0).then_some(SpritePixel {
                pixel,
                palette: slot.attr & 0x03,
                behind_background: slot.attr & 0x20 != 0,
                is_sprite_zero: slot.is_sprite_zero,
            })
        })
    }
}

/// Reverse bit order of a byte (b7..b0 -> b0..b7).
#[inline]
pub(in crate::ppu) fn reverse8(v: u8) -> u8 {
    let mut x = v;
    x = (x & 0xF0) >> 4 | (x & 0x0F) << 4;
    x = (x & 0xCC) >> 2 | (x & 0x33) << 2;
    x = (x & 0xAA) >> 1 | (x & 0x55) << 1;
    x
}
