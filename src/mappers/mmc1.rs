//! MMC1 (Mapper 1).
//!
//! Implements:
//! - Serial 5-bit shift register feeding control / CHR0 / CHR1 / PRG registers
//! - PRG banking modes (32K switch, 16K with fixed first bank, 16K with fixed last bank)
//! - CHR banking (one 8K bank or two 4K banks)
//! - Software mirroring including both single-screen modes
//! - PRG RAM enable bit (bit 4 of the PRG register, active low)
//!
//! Not modelled: the ignored-consecutive-write quirk and the SUROM/SOROM
//! outer-bank wiring.

use log::debug;

use crate::mapper::{Mapper, Mirroring, banked_index, chr_or_ram};

#[derive(Debug, Clone)]
pub struct Mmc1 {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,

    // 5-bit registers
    control: u8,
    chr_bank0: u8,
    chr_bank1: u8,
    prg_bank: u8,

    // Serial latch
    shift_reg: u8,
    shift_count: u8,
}

impl Mmc1 {
    pub fn new(prg_rom: Vec<u8>, chr: Vec<u8>, prg_ram_size: usize) -> Self {
        let (chr, chr_is_ram) = chr_or_ram(chr);
        Self {
            prg_rom,
            prg_ram: vec![0; prg_ram_size],
            chr,
            chr_is_ram,
            control: 0x0C,
            chr_bank0: 0,
            chr_bank1: 0,
            prg_bank: 0,
            shift_reg: 0,
            shift_count: 0,
        }
    }

    #[inline]
    fn prg_mode(&self) -> u8 {
        (self.control >> 2) & 0x03
    }

    #[inline]
    fn chr_4k_mode(&self) -> bool {
        self.control & 0x10 != 0
    }

    #[inline]
    fn prg_ram_enabled(&self) -> bool {
        self.prg_bank & 0x10 == 0 && !self.prg_ram.is_empty()
    }

    fn prg_bank_count(&self) -> usize {
        (self.prg_rom.len() / 0x4000).max(1)
    }

    /// 16K bank numbers visible at $8000 and $C000.
    fn prg_windows(&self) -> (usize, usize) {
        let bank = (self.prg_bank & 0x0F) as usize;
        let last = self.prg_bank_count() - 1;
        match self.prg_mode() {
            0 | 1 => {
                let base = bank & !1;
                (base, base + 1)
            }
            2 => (0, bank),
            _ => (bank, last),
        }
    }

    fn chr_index(&self, addr: u16) -> usize {
        let addr = (addr & 0x1FFF) as usize;
        if self.chr_4k_mode() {
            let bank = if addr < 0x1000 { self.chr_bank0 } else { self.chr_bank1 };
            banked_index(self.chr.len(), 0x1000, bank as usize, addr)
        } else {
            banked_index(self.chr.len(), 0x2000, (self.chr_bank0 >> 1) as usize, addr)
        }
    }

    fn commit_register(&mut self, addr: u16, value: u8) {
        match addr {
            0x8000..=0x9FFF => self.control = value,
            0xA000..=0xBFFF => self.chr_bank0 = value,
            0xC000..=0xDFFF => self.chr_bank1 = value,
            _ => self.prg_bank = value,
        }
        debug!(
            "MMC1 reg ${addr:04X} <- {value:05b} (ctrl={:05b} chr0={} chr1={} prg={})",
            self.control, self.chr_bank0, self.chr_bank1, self.prg_bank
        );
    }

    fn serial_write(&mut self, addr: u16, data: u8) {
        if data & 0x80 != 0 {
            self.shift_reg = 0;
            self.shift_count = 0;
            self.control |= 0x0C;
            return;
        }
        self.shift_reg |= (data & 1) << self.shift_count;
        self.shift_count += 1;
        if self.shift_count == 5 {
            let value = self.shift_reg & 0x1F;
            self.shift_reg = 0;
            self.shift_count = 0;
            self.commit_register(addr, value);
        }
    }
}

impl Mapper for Mmc1 {
    fn mapper_id(&self) -> u16 {
        1
    }

    fn cpu_read(&self, addr: u16) -> Option<u8> {
        match addr {
            0x6000..=0x7FFF if self.prg_ram_enabled() => {
                Some(self.prg_ram[(addr as usize - 0x6000) % self.prg_ram.len()])
            }
            0x8000..=0xFFFF => {
                let (lo, hi) = self.prg_windows();
                let bank = if addr < 0xC000 { lo } else { hi };
                Some(self.prg_rom[banked_index(self.prg_rom.len(), 0x4000, bank, addr as usize)])
            }
            _ => None,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x6000..=0x7FFF if self.prg_ram_enabled() => {
                let idx = (addr as usize - 0x6000) % self.prg_ram.len();
                self.prg_ram[idx] = value;
            }
            0x8000..=0xFFFF => self.serial_write(addr, value),
            _ => {}
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        self.chr[self.chr_index(addr)]
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram {
            let idx = self.chr_index(addr);
            self.chr[idx] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        match self.control & 0x03 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        }
    }

    fn reset(&mut self) {
        self.control = 0x0C;
        self.shift_reg = 0;
        self.shift_count = 0;
        self.chr_bank0 = 0;
        self.chr_bank1 = 0;
        self.prg_bank = 0;
    }
}
