#![doc = r#"
PPU registers module

Purpose
- CPU-visible PPU register semantics: `read_register` / `write_register` for the
  eight-byte window $2000..$2007 (callers pass the address or index; only the low
  three bits are decoded).

Notes
- PPUCTRL writes update t bits 10-11 (nametable select) and may raise an NMI
  edge immediately when vblank is already set.
- PPUSCROLL and PPUADDR share the write toggle `w` with the loopy t/x layout.
- PPUSTATUS read returns flags in bits 5..7 and the I/O latch in bits 0..4, then
  clears vblank and `w`.
- PPUDATA reads below $3F00 are buffered; palette reads return immediately and
  refill the buffer from the nametable underneath. Either way v advances by 1 or
  32 per PPUCTRL bit 2.
- Write-only registers read back as the I/O latch (last value written or read).
"#]

use bitflags::bitflags;

use super::Ppu;
use crate::ppu_bus::PpuBus;

bitflags! {
    /// $2000
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct PpuCtrl: u8 {
        const NAMETABLE_X = 0x01;
        const NAMETABLE_Y = 0x02;
        const VRAM_INCREMENT_32 = 0x04;
        const SPRITE_TABLE_HIGH = 0x08;
        const BACKGROUND_TABLE_HIGH = 0x10;
        const SPRITE_SIZE_16 = 0x20;
        const MASTER_SLAVE = 0x40;
        const NMI_ENABLE = 0x80;
    }
}

bitflags! {
    /// $2001
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct PpuMask: u8 {
        const GRAYSCALE = 0x01;
        const SHOW_BACKGROUND_LEFT = 0x02;
        const SHOW_SPRITES_LEFT = 0x04;
        const SHOW_BACKGROUND = 0x08;
        const SHOW_SPRITES = 0x10;
        const EMPHASIZE_RED = 0x20;
        const EMPHASIZE_GREEN = 0x40;
        const EMPHASIZE_BLUE = 0x80;
    }
}

bitflags! {
    /// $2002 (upper three bits only)
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct PpuStatus: u8 {
        const SPRITE_OVERFLOW = 0x20;
        const SPRITE_ZERO_HIT = 0x40;
        const VBLANK = 0x80;
    }
}

impl Ppu {
    /// CPU read of PPU register `reg & 7`.
    pub fn read_register<B: PpuBus>(&mut self, reg: u16, bus: &mut B) -> u8 {
        let value = match reg & 0x7 {
            2 => {
                let value = self.status.bits() | (self.io_latch & 0x1F);
                self.status.remove(PpuStatus::VBLANK);
                self.w = false;
                self.update_nmi_line();
                value
            }
            4 => {
                let idx = self.oam_addr as usize;
                let mut value = self.oam[idx];
                // attribute bytes have no storage for bits 2-4
                if idx & 3 == 2 {
                    value &= 0xE3;
                }
                self.oam_addr = self.oam_addr.wrapping_add(1);
                value
            }
            7 => self.read_data(bus),
            _ => return self.io_latch,
        };
        self.io_latch = value;
        value
    }

    /// CPU write of PPU register `reg & 7`.
    pub fn write_register<B: PpuBus>(&mut self, reg: u16, value: u8, bus: &mut B) {
        self.io_latch = value;
        match reg & 0x7 {
            0 => {
                self.ctrl = PpuCtrl::from_bits_retain(value);
                self.t = (self.t & !0x0C00) | (((value & 0x03) as u16) << 10);
                self.update_nmi_line();
            }
            1 => self.mask = PpuMask::from_bits_retain(value),
            2 => {}
            3 => self.oam_addr = value,
            4 => {
                self.oam[self.oam_addr as usize] = value;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            5 => {
                if !self.w {
                    self.t = (self.t & !0x001F) | ((value >> 3) as u16);
                    self.fine_x = value & 0x07;
                } else {
                    self.t = (self.t & !0x73E0)
                        | (((value & 0x07) as u16) << 12)
                        | (((value >> 3) as u16) << 5);
                }
                self.w = !self.w;
            }
            6 => {
                if !self.w {
                    self.t = (self.t & 0x00FF) | (((value & 0x3F) as u16) << 8);
                } else {
                    self.t = (self.t & 0x7F00) | value as u16;
                    self.v = self.t;
                }
                self.w = !self.w;
            }
            _ => {
                bus.ppu_write(self.v & 0x3FFF, value);
                self.increment_vram_addr();
            }
        }
    }

    fn read_data<B: PpuBus>(&mut self, bus: &mut B) -> u8 {
        let addr = self.v & 0x3FFF;
        let value = if addr >= 0x3F00 {
            // palette is not buffered; the buffer sees the nametable beneath
            self.read_buffer = bus.ppu_read(addr - 0x1000);
            (bus.ppu_read(addr) & 0x3F) | (self.io_latch & 0xC0)
        } else {
            let buffered = self.read_buffer;
            self.read_buffer = bus.ppu_read(addr);
            buffered
        };
        self.increment_vram_addr();
        value
    }

    #[inline]
    fn increment_vram_addr(&mut self) {
        let step = if self.ctrl.contains(PpuCtrl::VRAM_INCREMENT_32) { 32 } else { 1 };
        self.v = self.v.wrapping_add(step) & 0x7FFF;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu_bus::mock::MockPpuBus;

    fn set_addr(p: &mut Ppu, bus: &mut MockPpuBus, addr: u16) {
        p.write_register(6, (addr >> 8) as u8, bus);
        p.write_register(6, addr as u8, bus);
    }

    #[test]
    fn status_read_clears_vblank_and_write_toggle() {
        let mut bus = MockPpuBus::default();
        let mut p = Ppu::new();
        p.status.insert(PpuStatus::VBLANK);
        p.w = true;
        let s = p.read_register(2, &mut bus);
        assert_ne!(s & 0x80, 0, "PPUSTATUS read should return VBlank=1 when it was set");
        assert!(!p.vblank(), "PPUSTATUS read must clear VBlank (bit 7)");
        assert!(!p.write_toggle(), "PPUSTATUS read must clear the write toggle");
        assert_eq!(p.read_register(2, &mut bus) & 0x80, 0);
    }

    #[test]
    fn status_low_bits_come_from_io_latch() {
        let mut bus = MockPpuBus::default();
        let mut p = Ppu::new();
        p.write_register(1, 0x1B, &mut bus);
        assert_eq!(p.read_register(2, &mut bus), 0x1B);
        assert_eq!(p.read_register(0, &mut bus), 0x1B, "write-only reads the latch");
    }

    #[test]
    fn ppudata_buffered_read_and_increment() {
        let mut bus = MockPpuBus::default();
        bus.pattern[0] = 0x11;
        bus.pattern[1] = 0x22;
        let mut p = Ppu::new();
        p.write_register(0, 0x00, &mut bus);
        set_addr(&mut p, &mut bus, 0x0000);

        // first read returns the stale buffer, then each read lags by one
        assert_eq!(p.read_register(7, &mut bus), 0x00);
        assert_eq!(p.read_register(7, &mut bus), 0x11);
        assert_eq!(p.read_register(7, &mut bus), 0x22);
    }

    #[test]
    fn palette_reads_are_immediate() {
        let mut bus = MockPpuBus::default();
        bus.palette[1] = 0x2A;
        bus.nametable[0xF01] = 0x55;
        let mut p = Ppu::new();
        set_addr(&mut p, &mut bus, 0x3F01);
        assert_eq!(p.read_register(7, &mut bus) & 0x3F, 0x2A);
        assert_eq!(p.read_buffer, 0x55, "buffer filled from $2F01");
    }

    #[test]
    fn ppuctrl_increment_32_on_ppudata_write() {
        let mut bus = MockPpuBus::default();
        let mut p = Ppu::new();
        p.write_register(0, 0x04, &mut bus);
        set_addr(&mut p, &mut bus, 0x2000);
        assert_eq!(p.vram_addr(), 0x2000);

        p.write_register(7, 0xAA, &mut bus);
        assert_eq!(p.vram_addr(), 0x2020);
        p.write_register(7, 0xBB, &mut bus);
        assert_eq!(p.vram_addr(), 0x2040);
        assert_eq!(bus.nametable[0x000], 0xAA);
        assert_eq!(bus.nametable[0x020], 0xBB);
    }

    #[test]
    fn scroll_and_addr_share_loopy_latches() {
        let mut bus = MockPpuBus::default();
        let mut p = Ppu::new();
        p.write_register(0, 0x03, &mut bus);
        assert_eq!(p.temp_vram_addr() & 0x0C00, 0x0C00);

        // X scroll 0x7D: coarse 15, fine 5
        p.write_register(5, 0x7D, &mut bus);
        assert_eq!(p.fine_x(), 5);
        assert_eq!(p.temp_vram_addr() & 0x001F, 15);
        assert!(p.write_toggle());
        // Y scroll 0x5E: coarse 11, fine 6
        p.write_register(5, 0x5E, &mut bus);
        assert_eq!((p.temp_vram_addr() >> 5) & 0x1F, 11);
        assert_eq!((p.temp_vram_addr() >> 12) & 0x07, 6);
        assert!(!p.write_toggle());

        // PPUADDR copies t into v only on the second write
        p.write_register(6, 0x3D, &mut bus);
        assert_ne!(p.vram_addr(), p.temp_vram_addr());
        p.write_register(6, 0xF0, &mut bus);
        assert_eq!(p.vram_addr(), 0x3DF0);
        assert_eq!(p.temp_vram_addr(), 0x3DF0);
    }

    #[test]
    fn oam_data_increments_on_read_and_write() {
        let mut bus = MockPpuBus::default();
        let mut p = Ppu::new();
        p.write_register(3, 0x10, &mut bus);
        p.write_register(4, 0xAB, &mut bus);
        p.write_register(4, 0xCD, &mut bus);
        assert_eq!(p.oam_addr(), 0x12);
        assert_eq!(p.peek_oam(0x10), 0xAB);

        p.write_register(3, 0x10, &mut bus);
        assert_eq!(p.read_register(4, &mut bus), 0xAB);
        assert_eq!(p.oam_addr(), 0x11);
        // byte 2 of a sprite is the attribute byte
        p.poke_oam(0x12, 0xFF);
        p.write_register(3, 0x12, &mut bus);
        assert_eq!(p.read_register(4, &mut bus), 0xE3);
    }

    #[test]
    fn enabling_nmi_during_vblank_raises_edge() {
        let mut bus = MockPpuBus::default();
        let mut p = Ppu::new();
        p.status.insert(PpuStatus::VBLANK);
        p.write_register(0, 0x80, &mut bus);
        assert!(p.take_nmi_request());
        p.write_register(0, 0x80, &mut bus);
        assert!(!p.take_nmi_request(), "no new edge while the line stays high");
        p.write_register(0, 0x00, &mut bus);
        p.write_register(0, 0x80, &mut bus);
        assert!(p.take_nmi_request(), "toggling enable re-arms the edge");
    }
}
