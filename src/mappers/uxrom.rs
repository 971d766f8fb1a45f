/*
UxROM (Mapper 2).

- PRG: 16 KiB switchable window at $8000-$BFFF, last 16 KiB bank fixed at $C000-$FFFF.
- Bank select: any write to $8000-$FFFF (low bits, wrapped over the bank count).
- CHR: usually 8 KiB RAM.
- Mirroring: from the iNES header.
*/

use crate::mapper::{Mapper, Mirroring, banked_index, chr_or_ram};

#[derive(Debug, Clone)]
pub struct Uxrom {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    prg_bank: u8,
    mirroring: Mirroring,
}

impl Uxrom {
    pub fn new(prg_rom: Vec<u8>, chr: Vec<u8>, mirroring: Mirroring) -> Self {
        let (chr, chr_is_ram) = chr_or_ram(chr);
        Self {
            prg_rom,
            chr,
            chr_is_ram,
            prg_bank: 0,
            mirroring,
        }
    }

    fn last_bank(&self) -> usize {
        (self.prg_rom.len() / 0x4000).max(1) - 1
    }
}

impl Mapper for Uxrom {
    fn mapper_id(&self) -> u16 {
        2
    }

    fn cpu_read(&self, addr: u16) -> Option<u8> {
        let bank = match addr {
            0x8000..=0xBFFF => self.prg_bank as usize,
            0xC000..=0xFFFF => self.last_bank(),
            _ => return None,
        };
        Some(self.prg_rom[banked_index(self.prg_rom.len(), 0x4000, bank, addr as usize)])
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if addr >= 0x8000 {
            self.prg_bank = value;
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        self.chr[(addr as usize & 0x1FFF) % self.chr.len()]
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram {
            let idx = (addr as usize & 0x1FFF) % self.chr.len();
            self.chr[idx] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn reset(&mut self) {
        self.prg_bank = 0;
    }
}
