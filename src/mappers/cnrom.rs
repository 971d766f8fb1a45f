/*
CNROM (Mapper 3).

Characteristics:
- PRG: fixed 16 KiB (mirrored) or 32 KiB at $8000-$FFFF; no PRG banking.
- CHR: 8 KiB bank selected by any write to $8000-$FFFF. Bank numbers wrap
  over the available banks.
- Mirroring: soldered, taken from the iNES header.
- No IRQ.
*/

use crate::mapper::{Mapper, Mirroring, banked_index, chr_or_ram};

#[derive(Debug, Clone)]
pub struct Cnrom {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    chr_bank: u8,
    mirroring: Mirroring,
}

impl Cnrom {
    pub fn new(prg_rom: Vec<u8>, chr: Vec<u8>, mirroring: Mirroring) -> Self {
        debug_assert!(
            prg_rom.len() == 16 * 1024 || prg_rom.len() == 32 * 1024,
            "CNROM PRG must be 16K or 32K"
        );
        let (chr, chr_is_ram) = chr_or_ram(chr);
        Self {
            prg_rom,
            chr,
            chr_is_ram,
            chr_bank: 0,
            mirroring,
        }
    }

    fn chr_bank_count(&self) -> u8 {
        (self.chr.len() / 0x2000).clamp(1, 256) as u8
    }

    #[cfg(test)]
    pub(crate) fn current_chr_bank(&self) -> u8 {
        self.chr_bank
    }
}

impl Mapper for Cnrom {
    fn mapper_id(&self) -> u16 {
        3
    }

    fn cpu_read(&self, addr: u16) -> Option<u8> {
        match addr {
            0x8000..=0xFFFF => Some(self.prg_rom[(addr - 0x8000) as usize % self.prg_rom.len()]),
            _ => None,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if addr >= 0x8000 {
            self.chr_bank = value % self.chr_bank_count();
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        self.chr[banked_index(self.chr.len(), 0x2000, self.chr_bank as usize, addr as usize)]
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram {
            let idx = banked_index(self.chr.len(), 0x2000, self.chr_bank as usize, addr as usize);
            self.chr[idx] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn reset(&mut self) {
        self.chr_bank = 0;
    }
}
