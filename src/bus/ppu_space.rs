#![doc = r#"
PPU address-space mapping.

The console's PPU-visible memory is split across two owners:
- pattern tables ($0000-$1FFF) belong to the cartridge mapper
- nametable RAM and palette RAM belong to the console (`Vram`)

`PpuSpace` is a short-lived view that borrows both and implements `PpuBus`.
The Bus builds one whenever the PPU needs memory, which keeps the PPU itself
free to be borrowed mutably at the same time.

Nametable mirroring is whatever the mapper currently reports. Palette
entries $3F10/$3F14/$3F18/$3F1C alias $3F00/$3F04/$3F08/$3F0C.
"#]

use crate::mapper::{Mapper, Mirroring};
use crate::ppu_bus::PpuBus;

/// Palette RAM byte index (0..=31) for an address in $3F00-$3FFF.
pub fn map_palette_addr(addr: u16) -> usize {
    let mut idx = (addr as usize) & 0x1F;
    if idx >= 16 && idx & 0x03 == 0 {
        idx -= 16;
    }
    idx
}

/// Index into 4 KiB of nametable storage for an address in $2000-$3EFF.
///
/// Two-table arrangements only ever touch the first 2 KiB; four-screen
/// boards use all four tables.
pub fn map_nametable_addr(addr: u16, mirroring: Mirroring) -> usize {
    let a = addr.wrapping_sub(0x2000) & 0x0FFF;
    let table = (a / 0x0400) as usize;
    let offset = (a % 0x0400) as usize;
    let bank = match mirroring {
        Mirroring::Horizontal => table >> 1,
        Mirroring::Vertical => table & 1,
        Mirroring::FourScreen => table,
        Mirroring::SingleScreenLower => 0,
        Mirroring::SingleScreenUpper => 1,
    };
    bank * 0x0400 + offset
}

/// Console-side PPU memory.
#[derive(Clone)]
pub struct Vram {
    pub nametables: [u8; 0x1000],
    pub palette: [u8; 32],
}

impl Default for Vram {
    fn default() -> Self {
        Self {
            nametables: [0; 0x1000],
            palette: [0; 32],
        }
    }
}

/// Borrowed view over VRAM plus the mapper, as seen by the PPU.
pub struct PpuSpace<'a> {
    vram: &'a mut Vram,
    mapper: Option<&'a mut (dyn Mapper + 'static)>,
}

impl<'a> PpuSpace<'a> {
    pub fn new(vram: &'a mut Vram, mapper: Option<&'a mut (dyn Mapper + 'static)>) -> Self {
        Self { vram, mapper }
    }

    fn mirroring(&self) -> Mirroring {
        self.mapper
            .as_deref()
            .map_or(Mirroring::Horizontal, |m| m.mirroring())
    }
}

impl PpuBus for PpuSpace<'_> {
    fn ppu_read(&self, addr: u16) -> u8 {
        match addr & 0x3FFF {
            a @ 0x0000..=0x1FFF => self.mapper.as_deref().map_or(0, |m| m.ppu_read(a)),
            a @ 0x2000..=0x3EFF => self.vram.nametables[map_nametable_addr(a, self.mirroring())],
            a => self.vram.palette[map_palette_addr(a)],
        }
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        match addr & 0x3FFF {
            a @ 0x0000..=0x1FFF => {
                if let Some(m) = self.mapper.as_deref_mut() {
                    m.ppu_write(a, value);
                }
            }
            a @ 0x2000..=0x3EFF => {
                let idx = map_nametable_addr(a, self.mirroring());
                self.vram.nametables[idx] = value;
            }
            a => self.vram.palette[map_palette_addr(a)] = value & 0x3F,
        }
    }

    fn scanline_tick(&mut self) {
        if let Some(m) = self.mapper.as_deref_mut() {
            m.clock_scanline();
        }
    }
}
