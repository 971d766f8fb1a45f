#![doc = r#"
PPU OAM evaluation

Responsibilities
- Select the sprites that intersect the next scanline (`evaluate_sprites`, dot 257)
- Fetch their pattern bytes during dots 257..=320 (`sprite_fetch_step`)

Behavioral notes
- A sprite is in range when `scanline - Y` lies in [0, height), height 8 or 16
  per PPUCTRL bit 5. OAM Y is therefore "one less" than the displayed row.
- The first eight in-range sprites, in OAM order, are copied into secondary OAM.
- After eight, the search continues with the hardware's faulty walk: the byte
  offset inside each entry advances together with the entry index, so tile,
  attribute and X bytes get compared as if they were Y. A hit sets the overflow
  flag and ends the search.
- Evaluation only runs on visible scanlines; the pre-render line prepares no
  sprites, so scanline 0 never shows any.
- Each selected slot takes 8 dots: metadata latched on the first, pattern low
  on the sixth, pattern high on the seventh.
"#]

use super::*;
use crate::ppu_bus::PpuBus;
use crate::ppu::sprite::reverse8;

impl Ppu {
    pub(in crate::ppu) fn evaluate_sprites(&mut self) {
        let height = self.sprite_height() as i32;
        let line = self.scanline as i32;
        let in_range = |y: u8| {
            let row = line - y as i32;
            (0..height).contains(&row)
        };

        self.secondary_oam = [0xFF; 32];
        self.next_has_sprite_zero = false;
        let mut count = 0usize;
        let mut n = 0usize;

        while n < 64 && count < 8 {
            let base = n * 4;
            if in_range(self.oam[base]) {
                self.secondary_oam[count * 4..count * 4 + 4].copy_from_slice(&self.oam[base..base + 4]);
                if n == 0 {
                    self.next_has_sprite_zero = true;
                }
                count += 1;
            }
            n += 1;
        }

        // Overflow search with the diagonal byte walk.
        let mut m = 0usize;
        while n < 64 {
            if in_range(self.oam[n * 4 + m]) {
                self.status.insert(PpuStatus::SPRITE_OVERFLOW);
                break;
            }
            n += 1;
            m = (m + 1) & 3;
        }

        self.next_count = count as u8;
    }

    /// Nothing is prepared for the next line (pre-render, or rendering off).
    pub(in crate::ppu) fn clear_next_sprites(&mut self) {
        self.next_count = 0;
        self.next_has_sprite_zero = false;
    }

    pub(in crate::ppu) fn sprite_fetch_step<B: PpuBus>(&mut self, bus: &B) {
        let rel = self.dot - 257;
        let slot = (rel / 8) as usize;
        if slot >= self.next_count as usize {
            return;
        }
        let base = slot * 4;
        let y = self.secondary_oam[base];
        let tile = self.secondary_oam[base + 1];
        let attr = self.secondary_oam[base + 2];

        match rel % 8 {
            0 => {
                self.next_slots[slot] = SpriteSlot {
                    x: self.secondary_oam[base + 3],
                    attr,
                    pattern_lo: 0,
                    pattern_hi: 0,
                    is_sprite_zero: slot == 0 && self.next_has_sprite_zero,
                };
            }
            5 => {
                let lo = bus.ppu_read(self.sprite_pattern_addr(y, tile, attr));
                self.next_slots[slot].pattern_lo = if attr & 0x40 != 0 { reverse8(lo) } else { lo };
            }
            6 => {
                let hi = bus.ppu_read(self.sprite_pattern_addr(y, tile, attr) + 8);
                self.next_slots[slot].pattern_hi = if attr & 0x40 != 0 { reverse8(hi) } else { hi };
            }
            _ => {}
        }
    }

    /// Pattern-table address of the low plane row this sprite shows next line.
    fn sprite_pattern_addr(&self, y: u8, tile: u8, attr: u8) -> u16 {
        let height = self.sprite_height();
        let mut row = self.scanline.wrapping_sub(y as u16) % height;
        if attr & 0x80 != 0 {
            row = height - 1 - row;
        }
        if height == 16 {
            let table = (tile as u16 & 0x01) * 0x1000;
            let mut index = (tile & 0xFE) as u16;
            if row >= 8 {
                index += 1;
                row -= 8;
            }
            table + index * 16 + row
        } else {
            let table = if self.ctrl.contains(PpuCtrl::SPRITE_TABLE_HIGH) { 0x1000 } else { 0 };
            table + (tile as u16) * 16 + row
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(p: &mut Ppu, index: usize, y: u8, tile: u8, attr: u8, x: u8) {
        p.oam[index * 4..index * 4 + 4].copy_from_slice(&[y, tile, attr, x]);
    }

    #[test]
    fn selects_first_eight_in_oam_order() {
        let mut p = Ppu::new();
        p.oam = [0xF0; 256];
        for i in 0..10 {
            place(&mut p, i, 20, i as u8, 0, 0);
        }
        p.scanline = 22;
        p.evaluate_sprites();
        assert_eq!(p.next_count, 8);
        assert!(p.next_has_sprite_zero);
        for slot in 0..8 {
            assert_eq!(p.secondary_oam[slot * 4 + 1], slot as u8);
        }
        assert!(p.sprite_overflow(), "ninth sprite on the line sets overflow");
    }

    #[test]
    fn range_uses_sprite_height() {
        let mut p = Ppu::new();
        p.oam = [0xF0; 256];
        place(&mut p, 3, 10, 0, 0, 0);
        p.scanline = 18;
        p.evaluate_sprites();
        assert_eq!(p.next_count, 0);

        p.ctrl.insert(PpuCtrl::SPRITE_SIZE_16);
        p.evaluate_sprites();
        assert_eq!(p.next_count, 1);
        assert!(!p.next_has_sprite_zero);
    }

    #[test]
    fn overflow_walk_compares_non_y_bytes() {
        let mut p = Ppu::new();
        p.oam = [0xF0; 256];
        for i in 0..8 {
            place(&mut p, i, 50, 0, 0, 0);
        }
        // Sprite 8's Y is out of range, so the walk moves to sprite 9 byte 1
        // (its tile index), which reads as in range.
        place(&mut p, 9, 0xF0, 50, 0, 0);
        p.scanline = 50;
        p.evaluate_sprites();
        assert!(p.sprite_overflow());

        // A genuine ninth sprite whose Y sits where the walk does not look.
        let mut p = Ppu::new();
        p.oam = [0xF0; 256];
        for i in 0..8 {
            place(&mut p, i, 50, 0, 0, 0);
        }
        place(&mut p, 9, 50, 0xF0, 0xF0, 0xF0);
        p.scanline = 50;
        p.evaluate_sprites();
        assert!(!p.sprite_overflow(), "missed by the diagonal walk");
    }

    #[test]
    fn pattern_address_handles_flip_and_tall_sprites() {
        let mut p = Ppu::new();
        p.scanline = 12;
        assert_eq!(p.sprite_pattern_addr(10, 0x05, 0x00), 0x0052);
        assert_eq!(p.sprite_pattern_addr(10, 0x05, 0x80), 0x0055, "vertical flip");

        p.ctrl.insert(PpuCtrl::SPRITE_SIZE_16);
        p.scanline = 20;
        // row 10 of a tall sprite: bottom tile, row 2; odd tile picks $1000
        assert_eq!(p.sprite_pattern_addr(10, 0x03, 0x00), 0x1000 + 3 * 16 + 2);
        assert_eq!(p.sprite_pattern_addr(10, 0x03, 0x80), 0x1000 + 2 * 16 + 5);
    }
}
