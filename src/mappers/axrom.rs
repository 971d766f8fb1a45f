/*
AxROM (Mapper 7).

- PRG: 32 KiB bank at $8000-$FFFF selected by bits 0-2 of any write there.
- Mirroring: single-screen, bit 4 of the same write selects the upper table.
- CHR: 8 KiB RAM.
*/

use crate::mapper::{Mapper, Mirroring, banked_index, chr_or_ram};

#[derive(Debug, Clone)]
pub struct Axrom {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    bank_select: u8,
}

impl Axrom {
    pub fn new(prg_rom: Vec<u8>, chr: Vec<u8>) -> Self {
        let (chr, chr_is_ram) = chr_or_ram(chr);
        Self {
            prg_rom,
            chr,
            chr_is_ram,
            bank_select: 0,
        }
    }
}

impl Mapper for Axrom {
    fn mapper_id(&self) -> u16 {
        7
    }

    fn cpu_read(&self, addr: u16) -> Option<u8> {
        if addr < 0x8000 {
            return None;
        }
        let bank = (self.bank_select & 0x07) as usize;
        Some(self.prg_rom[banked_index(self.prg_rom.len(), 0x8000, bank, addr as usize)])
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if addr >= 0x8000 {
            self.bank_select = value;
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
        if self.bank_select & 0x10 != 0 {
            Mirroring::SingleScreenUpper
        } else {
            Mirroring::SingleScreenLower
        }
    }

    fn reset(&mut self) {
        self.bank_select = 0;
    }
}
