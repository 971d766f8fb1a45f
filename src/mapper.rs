/*!
Mapper subsystem: the trait every cartridge board implements, the nametable
mirroring modes, and NROM (mapper 0).

Responsibilities:
- The Bus forwards CPU $4020..=$FFFF to `cpu_read`/`cpu_write` and PPU
  $0000..=$1FFF to `ppu_read`/`ppu_write`. No cartridge-range access bypasses
  the mapper.
- Nametable mirroring is owned by the mapper. Fixed boards report the header
  wiring; bank-switching boards report whatever their registers select.
- Boards with an interrupt counter expose it through `irq_pending`, and the
  PPU clocks them once per rendered scanline through `clock_scanline`.

Other boards live under `crate::mappers` and are selected by the cartridge
loader from the iNES mapper id.
*/

/// Nametable mirroring arrangement for the four logical nametables at
/// $2000/$2400/$2800/$2C00.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mirroring {
    /// $2000=$2400 and $2800=$2C00.
    Horizontal,
    /// $2000=$2800 and $2400=$2C00.
    Vertical,
    /// Four independent nametables (extra VRAM on the cartridge).
    FourScreen,
    /// All four map to the first physical table.
    SingleScreenLower,
    /// All four map to the second physical table.
    SingleScreenUpper,
}

/// Common interface for cartridge boards.
///
/// All methods take full (unmasked) CPU or PPU addresses.
pub trait Mapper {
    /// iNES mapper number.
    fn mapper_id(&self) -> u16;

    /// CPU read in $4020..=$FFFF. `None` means the board does not drive the
    /// data bus at this address and the Bus returns its open-bus value.
    fn cpu_read(&self, addr: u16) -> Option<u8>;

    /// CPU write in $4020..=$FFFF (PRG RAM or bank registers).
    fn cpu_write(&mut self, addr: u16, value: u8);

    /// PPU read in $0000..=$1FFF (pattern tables).
    fn ppu_read(&self, addr: u16) -> u8;

    /// PPU write in $0000..=$1FFF. Ignored unless the board carries CHR RAM.
    fn ppu_write(&mut self, addr: u16, value: u8);

    /// Current nametable mirroring.
    fn mirroring(&self) -> Mirroring;

    /// Power-on/reset of bank registers and IRQ state.
    fn reset(&mut self) {}

    /// Whether the board is asserting the CPU IRQ line.
    fn irq_pending(&self) -> bool {
        false
    }

    /// Called by the PPU once per scanline while rendering is enabled.
    fn clock_scanline(&mut self) {}
}

/// Byte index into `len` bytes of banked memory for a window of `bank_size`
/// bytes showing bank `bank`. Bank numbers wrap over the available banks.
#[inline]
pub(crate) fn banked_index(len: usize, bank_size: usize, bank: usize, offset: usize) -> usize {
    let count = (len / bank_size).max(1);
    ((bank % count) * bank_size + (offset % bank_size)) % len.max(1)
}

/// Allocates CHR RAM when the image carries no CHR ROM.
pub(crate) fn chr_or_ram(chr: Vec<u8>) -> (Vec<u8>, bool) {
    if chr.is_empty() {
        (vec![0; 8 * 1024], true)
    } else {
        (chr, false)
    }
}

/// NROM (mapper 0).
///
/// - PRG ROM: 16 KiB mirrored into both halves of $8000..=$FFFF, or 32 KiB direct.
/// - PRG RAM at $6000..=$7FFF when present.
/// - CHR: 8 KiB ROM, or RAM when the image has none.
#[derive(Clone, Debug)]
pub struct Nrom {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    mirroring: Mirroring,
}

impl Nrom {
    pub fn new(prg_rom: Vec<u8>, chr: Vec<u8>, prg_ram_size: usize, mirroring: Mirroring) -> Self {
        debug_assert!(!prg_rom.is_empty(), "NROM needs PRG ROM");
        let (chr, chr_is_ram) = chr_or_ram(chr);
        Self {
            prg_rom,
            prg_ram: vec![0; prg_ram_size],
            chr,
            chr_is_ram,
            mirroring,
        }
    }

    /// Returns true for NROM-128 (16 KiB PRG).
    pub fn is_nrom_128(&self) -> bool {
        self.prg_rom.len() == 16 * 1024
    }

    pub fn chr_is_ram(&self) -> bool {
        self.chr_is_ram
    }
}

impl Mapper for Nrom {
    #[inline]
    fn mapper_id(&self) -> u16 {
        0
    }

    fn cpu_read(&self, addr: u16) -> Option<u8> {
        match addr {
            0x6000..=0x7FFF if !self.prg_ram.is_empty() => {
                Some(self.prg_ram[(addr as usize - 0x6000) % self.prg_ram.len()])
            }
            0x8000..=0xFFFF => {
                let rel = (addr - 0x8000) as usize;
                Some(self.prg_rom[rel % self.prg_rom.len()])
            }
            _ => None,
        }
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if let 0x6000..=0x7FFF = addr {
            if !self.prg_ram.is_empty() {
                let idx = (addr as usize - 0x6000) % self.prg_ram.len();
                self.prg_ram[idx] = value;
            }
        }
    }

    fn ppu_read(&self, addr: u16) -> u8 {
        self.chr[(addr as usize) & 0x1FFF]
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram {
            self.chr[(addr as usize) & 0x1FFF] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }
}
