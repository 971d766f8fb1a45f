#![doc = r#"
PPU background fetch

Responsibilities
- The 8-dot background fetch cycle (nametable, attribute, pattern low, pattern high)
- Background shift registers: reload every 8 dots, shift once per dot
- Loopy v updates: coarse X increment, Y increment at dot 256, horizontal copy
  at dot 257, vertical copy on the pre-render line during dots 280..=304

Timing (rendering enabled, visible and pre-render lines)
- Dots 2..=257 and 321..=337 shift the registers and run the fetch cycle keyed on
  `(dot - 1) % 8`: 0 reload + nametable, 2 attribute, 4 pattern low, 6 pattern
  high, 7 coarse X increment.
- Dots 338 and 340 perform the two dummy nametable reads.
"#]

use super::*;
use crate::ppu_bus::PpuBus;

impl Ppu {
    /// Background work for the current dot. Only called while rendering.
    pub(in crate::ppu) fn background_step<B: PpuBus>(&mut self, bus: &B) {
        let dot = self.dot;

        if (2..=257).contains(&dot) || (321..=337).contains(&dot) {
            self.shift_background();
            match (dot - 1) % 8 {
                0 => {
                    self.reload_background_shifters();
                    self.bg_next_tile = bus.ppu_read(0x2000 | (self.v & 0x0FFF));
                }
                2 => self.fetch_attribute(bus),
                4 => self.bg_next_lo = bus.ppu_read(self.background_pattern_addr()),
                6 => self.bg_next_hi = bus.ppu_read(self.background_pattern_addr() + 8),
                7 => self.increment_coarse_x(),
                _ => {}
            }
        }

        match dot {
            256 => self.increment_y(),
            257 => {
                self.reload_background_shifters();
                self.copy_horizontal();
            }
            338 | 340 => self.bg_next_tile = bus.ppu_read(0x2000 | (self.v & 0x0FFF)),
            280..=304 if self.scanline == PRE_RENDER_SCANLINE => self.copy_vertical(),
            _ => {}
        }
    }

    /// (pixel, palette) for screen column `x`, honoring the mask and left clip.
    #[inline]
    pub(in crate::ppu) fn background_pixel(&self, x: usize) -> (u8, u8) {
        if !self.mask.contains(PpuMask::SHOW_BACKGROUND)
            || (x < 8 && !self.mask.contains(PpuMask::SHOW_BACKGROUND_LEFT))
        {
            return (0, 0);
        }
        let bit = 0x8000u16 >> self.fine_x;
        let p0 = (self.bg_shift_lo & bit != 0) as u8;
        let p1 = (self.bg_shift_hi & bit != 0) as u8;
        let a0 = (self.bg_attr_lo & bit != 0) as u8;
        let a1 = (self.bg_attr_hi & bit != 0) as u8;
        ((p1 << 1) | p0, (a1 << 1) | a0)
    }

    fn fetch_attribute<B: PpuBus>(&mut self, bus: &B) {
        let v = self.v;
        let addr = 0x23C0 | (v & 0x0C00) | ((v >> 4) & 0x38) | ((v >> 2) & 0x07);
        let mut attr = bus.ppu_read(addr);
        if v & 0x0040 != 0 {
            attr >>= 4;
        }
        if v & 0x0002 != 0 {
            attr >>= 2;
        }
        self.bg_next_attr = attr & 0x03;
    }

    #[inline]
    fn background_pattern_addr(&self) -> u16 {
        let table = if self.ctrl.contains(PpuCtrl::BACKGROUND_TABLE_HIGH) { 0x1000 } else { 0 };
        let fine_y = (self.v >> 12) & 0x07;
        table + (self.bg_next_tile as u16) * 16 + fine_y
    }

    #[inline]
    fn shift_background(&mut self) {
        self.bg_shift_lo <<= 1;
        self.bg_shift_hi <<= 1;
        self.bg_attr_lo <<= 1;
        self.bg_attr_hi <<= 1;
    }

    #[inline]
    fn reload_background_shifters(&mut self) {
        self.bg_shift_lo = (self.bg_shift_lo & 0xFF00) | self.bg_next_lo as u16;
        self.bg_shift_hi = (self.bg_shift_hi & 0xFF00) | self.bg_next_hi as u16;
        let lo = if self.bg_next_attr & 0x01 != 0 { 0xFF } else { 0x00 };
        let hi = if self.bg_next_attr & 0x02 != 0 { 0xFF } else { 0x00 };
        self.bg_attr_lo = (self.bg_attr_lo & 0xFF00) | lo;
        self.bg_attr_hi = (self.bg_attr_hi & 0xFF00) | hi;
    }

    fn increment_coarse_x(&mut self) {
        if self.v & 0x001F == 31 {
            self.v &= !0x001F;
            self.v ^= 0x0400;
        } else {
            self.v += 1;
        }
    }

    fn increment_y(&mut self) {
        if self.v & 0x7000 != 0x7000 {
            self.v += 0x1000;
            return;
        }
        self.v &= !0x7000;
        let mut coarse_y = (self.v & 0x03E0) >> 5;
        match coarse_y {
            29 => {
                coarse_y = 0;
                self.v ^= 0x0800;
            }
            // rows 30 and 31 hold attributes; wrap without switching tables
            31 => coarse_y = 0,
            _ => coarse_y += 1,
        }
        self.v = (self.v & !0x03E0) | (coarse_y << 5);
    }

    #[inline]
    fn copy_horizontal(&mut self) {
        self.v = (self.v & !0x041F) | (self.t & 0x041F);
    }

    #[inline]
    fn copy_vertical(&mut self) {
        self.v = (self.v & !0x7BE0) | (self.t & 0x7BE0);
    }
}
