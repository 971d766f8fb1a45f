/*!
MMC3 (Mapper 4).

Registers (even/odd address pairs, decoded with A0):
- $8000 bank select: bits 0-2 target R0..R7, bit 6 PRG mode, bit 7 CHR inversion
- $8001 bank data: value for the selected register
- $A000 mirroring (0 = vertical, 1 = horizontal); ignored on four-screen boards
- $A001 PRG RAM control (bit 7 enable, bit 6 write protect)
- $C000 IRQ latch, $C001 IRQ reload
- $E000 IRQ disable + acknowledge, $E001 IRQ enable

PRG layout (8K windows):
- mode 0: $8000=R6, $A000=R7, $C000=second-last, $E000=last
- mode 1: $8000=second-last, $A000=R7, $C000=R6, $E000=last

CHR layout (1K units): R0/R1 select 2K banks (low bit ignored), R2..R5 select
1K banks. Inversion swaps the $0000 and $1000 halves.

IRQ counter: clocked once per rendered scanline by the PPU. When the counter
is zero or a reload was requested it is reloaded from the latch, otherwise it
decrements; reaching zero with IRQs enabled asserts the line until $E000 is
written.
*/

use log::debug;

use crate::mapper::{Mapper, Mirroring, banked_index, chr_or_ram};

#[derive(Debug, Clone)]
pub struct Mmc3 {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,

    bank_regs: [u8; 8],
    bank_select: u8,

    irq_latch: u8,
    irq_counter: u8,
    irq_reload: bool,
    irq_enabled: bool,
    irq_line: bool,

    four_screen: bool,
    mirroring: Mirroring,
    prg_ram_enabled: bool,
    prg_ram_write_protect: bool,
}

impl Mmc3 {
    pub fn new(prg_rom: Vec<u8>, chr: Vec<u8>, prg_ram_size: usize, header_mirroring: Mirroring) -> Self {
        let (chr, chr_is_ram) = chr_or_ram(chr);
        let mut m = Self {
            prg_rom,
            prg_ram: vec![0; prg_ram_size],
            chr,
            chr_is_ram,
            bank_regs: [0; 8],
            bank_select: 0,
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            irq_line: false,
            four_screen: header_mirroring == Mirroring::FourScreen,
            mirroring: header_mirroring,
            prg_ram_enabled: true,
            prg_ram_write_protect: false,
        };
        m.reset();
        m
    }

    fn prg_bank_count(&self) -> usize {
        (self.prg_rom.len() / 0x2000).max(1)
    }

    /// 8K bank shown in the window containing `addr`.
    fn prg_bank_for(&self, addr: u16) -> usize {
        let last = self.prg_bank_count() - 1;
        let second_last = last.saturating_sub(1);
        let r6 = self.bank_regs[6] as usize;
        let r7 = self.bank_regs[7] as usize;
        let swapped = self.bank_select & 0x40 != 0;
        match (addr >> 13) & 0x03 {
            0 if swapped => second_last,
            0 => r6,
            1 => r7,
            2 if swapped => r6,
            2 => second_last,
            _ => last,
        }
    }

    /// 1K bank shown in pattern-table slot `slot` (0..8, each 1K wide).
    fn chr_bank_for(&self, slot: usize) -> usize {
        let slot = if self.bank_select & 0x80 != 0 { slot ^ 4 } else { slot };
        match slot {
            0 => (self.bank_regs[0] & 0xFE) as usize,
            1 => (self.bank_regs[0] | 0x01) as usize,
            2 => (self.bank_regs[1] & 0xFE) as usize,
            3 => (self.bank_regs[1] | 0x01) as usize,
            n => self.bank_regs[n - 2] as usize,
        }
    }

    fn chr_index(&self, addr: u16) -> usize {
        let addr = (addr & 0x1FFF) as usize;
        banked_index(self.chr.len(), 0x400, self.chr_bank_for(addr / 0x400), addr)
    }

    fn write_register(&mut self, addr: u16, value: u8) {
        let odd = addr & 1 != 0;
        match (addr, odd) {
            (0x8000..=0x9FFF, false) => self.bank_select = value,
            (0x8000..=0x9FFF, true) => {
                let target = (self.bank_select & 0x07) as usize;
                self.bank_regs[target] = value;
                debug!("MMC3 R{target} <- {value}");
            }
            (0xA000..=0xBFFF, false) => {
                if !self.four_screen {
                    self.mirroring = if value & 1 == 0 {
                        Mirroring::Vertical
                    } else {
                        Mirroring::Horizontal
                    };
                }
            }
            (0xA000..=0xBFFF, true) => {
                self.prg_ram_enabled = value & 0x80 != 0;
                self.prg_ram_write_protect = value & 0x40 != 0;
            }
            (0xC000..=0xDFFF, false) => self.irq_latch = value,
            (0xC000..=0xDFFF, true) => {
                self.irq_counter = 0;
                self.irq_reload = true;
            }
            (_, false) => {
                self.irq_enabled = false;
                self.irq_line = false;
            }
            (_, true) => self.irq_enabled = true,
        }
    }

    #[cfg(test)]
    pub(crate) fn irq_counter(&self) -> u8 {
        self.irq_counter
    }
}

impl Mapper for Mmc3 {
    fn mapper_id(&self) -> u16 {
        4
    }

    fn cpu_read(&self, addr: u16) -> Option<u8> {
        match addr {
            0x6000..=0x7FFF if self.prg_ram_enabled && !self.prg_ram.is_empty() => {
                Some(self.prg_ram[(addr as usize - 0x6000) % self.prg_ram.len()])
            }
            0x8000..=0xFFFF => {
                let bank = self.prg_bank_for(addr);
                Some(self.prg_rom[banked_index(self.prg_rom.len(), 0x2000, bank, addr as usize)])
            }
            _ => None,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x6000..=0x7FFF => {
                if self.prg_ram_enabled && !self.prg_ram_write_protect && !self.prg_ram.is_empty() {
                    let idx = (addr as usize - 0x6000) % self.prg_ram.len();
                    self.prg_ram[idx] = value;
                }
            }
            0x8000..=0xFFFF => self.write_register(addr, value),
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
        self.mirroring
    }

    fn reset(&mut self) {
        self.bank_select = 0;
        self.bank_regs = [0, 2, 4, 5, 6, 7, 0, 1];
        self.irq_latch = 0;
        self.irq_counter = 0;
        self.irq_reload = false;
        self.irq_enabled = false;
        self.irq_line = false;
        self.prg_ram_enabled = true;
        self.prg_ram_write_protect = false;
    }

    fn irq_pending(&self) -> bool {
        self.irq_line
    }

    fn clock_scanline(&mut self) {
        if self.irq_counter == 0 || self.irq_reload {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        } else {
            self.irq_counter -= 1;
        }
        if self.irq_counter == 0 && self.irq_enabled {
            self.irq_line = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Mmc3;
    use crate::mapper::{Mapper, Mirroring};

    /// 8 PRG banks of 8K, each filled with its bank number; CHR 1K banks likewise.
    fn build_numbered(prg_8k: usize, chr_1k: usize) -> Mmc3 {
        let prg = (0..prg_8k).flat_map(|b| vec![b as u8; 0x2000]).collect();
        let chr = (0..chr_1k).flat_map(|b| vec![b as u8; 0x400]).collect();
        Mmc3::new(prg, chr, 8 * 1024, Mirroring::Vertical)
    }

    fn set_reg(m: &mut Mmc3, select: u8, value: u8) {
        m.cpu_write(0x8000, select);
        m.cpu_write(0x8001, value);
    }

    #[test]
    fn prg_mode0_layout() {
        let mut m = build_numbered(8, 32);
        set_reg(&mut m, 6, 2);
        set_reg(&mut m, 7, 3);
        assert_eq!(m.cpu_read(0x8000), Some(2));
        assert_eq!(m.cpu_read(0xA000), Some(3));
        assert_eq!(m.cpu_read(0xC000), Some(6));
        assert_eq!(m.cpu_read(0xE000), Some(7));
    }

    #[test]
    fn prg_mode1_swaps_r6_and_second_last() {
        let mut m = build_numbered(8, 32);
        set_reg(&mut m, 0x46, 1);
        set_reg(&mut m, 0x47, 2);
        assert_eq!(m.cpu_read(0x8000), Some(6));
        assert_eq!(m.cpu_read(0xA000), Some(2));
        assert_eq!(m.cpu_read(0xC000), Some(1));
        assert_eq!(m.cpu_read(0xFFFF), Some(7));
    }

    #[test]
    fn chr_2k_and_1k_banks_with_inversion() {
        let mut m = build_numbered(4, 64);
        set_reg(&mut m, 0, 5); // 2K bank, low bit ignored -> 1K banks 4,5
        set_reg(&mut m, 2, 9);
        assert_eq!(m.ppu_read(0x0000), 4);
        assert_eq!(m.ppu_read(0x0400), 5);
        assert_eq!(m.ppu_read(0x1000), 9);

        m.cpu_write(0x8000, 0x80);
        assert_eq!(m.ppu_read(0x1000), 4);
        assert_eq!(m.ppu_read(0x1400), 5);
        assert_eq!(m.ppu_read(0x0000), 9);
    }

    #[test]
    fn chr_ram_write_basic() {
        let mut m = Mmc3::new(vec![0xAA; 0x2000 * 4], Vec::new(), 0, Mirroring::Horizontal);
        m.ppu_write(0x1000, 0x5E);
        assert_eq!(m.ppu_read(0x1000), 0x5E);
    }

    #[test]
    fn mirroring_control_vertical_horizontal() {
        let mut m = build_numbered(4, 32);
        m.cpu_write(0xA000, 0x01);
        assert_eq!(m.mirroring(), Mirroring::Horizontal);
        m.cpu_write(0xA000, 0x00);
        assert_eq!(m.mirroring(), Mirroring::Vertical);
    }

    #[test]
    fn four_screen_ignores_mirroring_writes() {
        let mut m = Mmc3::new(vec![0; 0x8000], Vec::new(), 0, Mirroring::FourScreen);
        m.cpu_write(0xA000, 0x01);
        assert_eq!(m.mirroring(), Mirroring::FourScreen);
    }

    #[test]
    fn prg_ram_enable_disable_write_protect() {
        let mut m = build_numbered(4, 32);
        m.cpu_write(0x6000, 0x12);
        assert_eq!(m.cpu_read(0x6000), Some(0x12));

        m.cpu_write(0xA001, 0x00);
        assert_eq!(m.cpu_read(0x6000), None);

        m.cpu_write(0xA001, 0xC0);
        m.cpu_write(0x6000, 0x34);
        assert_eq!(m.cpu_read(0x6000), Some(0x12), "write-protected RAM keeps old value");

        m.cpu_write(0xA001, 0x80);
        m.cpu_write(0x6000, 0x56);
        assert_eq!(m.cpu_read(0x6000), Some(0x56));
    }

    #[test]
    fn irq_fires_after_latch_plus_one_scanlines() {
        let mut m = build_numbered(4, 32);
        m.cpu_write(0xC000, 3);
        m.cpu_write(0xC001, 0);
        m.cpu_write(0xE001, 0);

        m.clock_scanline(); // reload -> 3
        assert_eq!(m.irq_counter(), 3);
        m.clock_scanline();
        m.clock_scanline();
        assert!(!m.irq_pending());
        m.clock_scanline(); // 1 -> 0
        assert!(m.irq_pending());

        m.cpu_write(0xE000, 0);
        assert!(!m.irq_pending(), "$E000 acknowledges");
        m.clock_scanline(); // reload from latch, no IRQ while disabled
        assert!(!m.irq_pending());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut m = build_numbered(8, 32);
        set_reg(&mut m, 0xC6, 5);
        m.cpu_write(0xE001, 0);
        m.reset();
        assert_eq!(m.cpu_read(0x8000), Some(0));
        assert_eq!(m.cpu_read(0xA000), Some(1));
        assert!(!m.irq_pending());
    }
}
