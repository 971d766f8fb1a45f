/*!
Cartridge loader: iNES header parsing and mapper construction.

Features:
- Parse the 16-byte iNES header and validate it against the payload length
- Skip (and keep) the optional 512-byte trainer
- Extract PRG ROM and CHR ROM; an image without CHR ROM gets 8 KiB CHR RAM
- Decode mirroring, four-screen, battery and mapper id (split across flags 6/7)
- Construct the matching `Mapper`; unknown ids are a load error

Notes:
- NES 2.0 headers are accepted, but only their iNES-compatible fields are used.
- Archaic headers with junk in bytes 12..=15 ("DiskDude!") have the upper
  mapper nibble ignored.
- PRG RAM: header byte 8 gives 8 KiB units; 0 means 8 KiB by convention.
- Extra bytes after the declared payload are tolerated and logged.
*/

use log::{info, warn};

use crate::error::LoadError;
use crate::mapper::{Mapper, Mirroring, Nrom};
use crate::mappers::{Axrom, Cnrom, Mmc1, Mmc3, Uxrom};

pub const INES_HEADER_LEN: usize = 16;
pub const TRAINER_LEN: usize = 512;
pub const PRG_BANK_LEN: usize = 16 * 1024;
pub const CHR_BANK_LEN: usize = 8 * 1024;

/// Program counter used by [`ExecMode::FixedEntry`]: the automated entry point
/// of standalone CPU test images.
pub const FIXED_ENTRY_ADDR: u16 = 0xC000;

/// How the CPU program counter is initialized after loading an image.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ExecMode {
    /// Load PC from the reset vector at $FFFC.
    #[default]
    NormalReset,
    /// Start at [`FIXED_ENTRY_ADDR`] regardless of the reset vector.
    FixedEntry,
}

impl ExecMode {
    pub fn entry_override(self) -> Option<u16> {
        match self {
            ExecMode::NormalReset => None,
            ExecMode::FixedEntry => Some(FIXED_ENTRY_ADDR),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InesVersion {
    Ines1,
    Ines2,
}

/// Decoded header fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InesHeader {
    pub prg_banks: usize,
    pub chr_banks: usize,
    pub mapper_id: u16,
    pub mirroring: Mirroring,
    pub battery: bool,
    pub has_trainer: bool,
    pub prg_ram_len: usize,
    pub version: InesVersion,
}

impl InesHeader {
    pub fn parse(data: &[u8]) -> Result<Self, LoadError> {
        if data.len() < INES_HEADER_LEN {
            return Err(LoadError::HeaderTooShort { len: data.len() });
        }
        if &data[0..4] != b"NES\x1A" {
            return Err(LoadError::BadMagic);
        }

        let flags6 = data[6];
        let mut flags7 = data[7];
        let version = if flags7 & 0x0C == 0x08 {
            InesVersion::Ines2
        } else {
            InesVersion::Ines1
        };
        if version == InesVersion::Ines1 && data[12..16].iter().any(|&b| b != 0) {
            warn!("iNES header bytes 12-15 are not zero; ignoring upper mapper nibble");
            flags7 = 0;
        }

        let mirroring = if flags6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let prg_ram_units = if version == InesVersion::Ines1 { data[8] as usize } else { 0 };

        Ok(Self {
            prg_banks: data[4] as usize,
            chr_banks: data[5] as usize,
            mapper_id: ((flags7 & 0xF0) | (flags6 >> 4)) as u16,
            mirroring,
            battery: flags6 & 0x02 != 0,
            has_trainer: flags6 & 0x04 != 0,
            prg_ram_len: prg_ram_units.max(1) * 8 * 1024,
            version,
        })
    }

    /// Total image length the header declares.
    pub fn declared_len(&self) -> usize {
        INES_HEADER_LEN
            + if self.has_trainer { TRAINER_LEN } else { 0 }
            + self.prg_banks * PRG_BANK_LEN
            + self.chr_banks * CHR_BANK_LEN
    }
}

/// A parsed cartridge: header metadata plus the board that owns its memory.
pub struct Cartridge {
    header: InesHeader,
    trainer: Option<Vec<u8>>,
    mapper: Box<dyn Mapper>,
}

impl std::fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cartridge")
            .field("header", &self.header)
            .field("has_trainer", &self.trainer.is_some())
            .field("mirroring", &self.mapper.mirroring())
            .finish()
    }
}

/// Takes `len` bytes starting at `offset`, failing with a truncation error that names `section`.
fn take_section<'a>(
    data: &'a [u8],
    offset: usize,
    len: usize,
    section: &'static str,
) -> Result<&'a [u8], LoadError> {
    let available = data.len().saturating_sub(offset);
    if available < len {
        return Err(LoadError::Truncated {
            section,
            expected: len,
            actual: available,
        });
    }
    Ok(&data[offset..offset + len])
}

/// Instantiate the board for `mapper_id`.
fn build_mapper(
    header: &InesHeader,
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
) -> Result<Box<dyn Mapper>, LoadError> {
    let mirroring = header.mirroring;
    let prg_ram = header.prg_ram_len;
    let mapper: Box<dyn Mapper> = match header.mapper_id {
        0 => Box::new(Nrom::new(prg_rom, chr, prg_ram, mirroring)),
        1 => Box::new(Mmc1::new(prg_rom, chr, prg_ram)),
        2 => Box::new(Uxrom::new(prg_rom, chr, mirroring)),
        3 => Box::new(Cnrom::new(prg_rom, chr, mirroring)),
        4 => Box::new(Mmc3::new(prg_rom, chr, prg_ram, mirroring)),
        7 => Box::new(Axrom::new(prg_rom, chr)),
        other => return Err(LoadError::UnsupportedMapper(other)),
    };
    Ok(mapper)
}

impl Cartridge {
    /// Parse an iNES image and construct its mapper.
    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, LoadError> {
        let header = InesHeader::parse(data)?;
        if header.prg_banks == 0 {
            return Err(LoadError::NoProgramRom);
        }

        let mut offset = INES_HEADER_LEN;
        let trainer = if header.has_trainer {
            let t = take_section(data, offset, TRAINER_LEN, "trainer")?.to_vec();
            offset += TRAINER_LEN;
            Some(t)
        } else {
            None
        };

        let prg_len = header.prg_banks * PRG_BANK_LEN;
        let prg_rom = take_section(data, offset, prg_len, "PRG ROM")?.to_vec();
        offset += prg_len;

        let chr_len = header.chr_banks * CHR_BANK_LEN;
        let chr = take_section(data, offset, chr_len, "CHR ROM")?.to_vec();
        offset += chr_len;

        if data.len() > offset {
            warn!(
                "iNES image has {} trailing bytes past the declared payload",
                data.len() - offset
            );
        }

        let mapper = build_mapper(&header, prg_rom, chr)?;
        info!(
            "cartridge: mapper {} PRG {}K CHR {}K ({}) mirroring {:?}{}",
            header.mapper_id,
            prg_len / 1024,
            chr_len.max(CHR_BANK_LEN) / 1024,
            if chr_len == 0 { "RAM" } else { "ROM" },
            header.mirroring,
            if header.battery { " battery" } else { "" },
        );

        Ok(Self {
            header,
            trainer,
            mapper,
        })
    }

    pub fn header(&self) -> &InesHeader {
        &self.header
    }

    pub fn mapper_id(&self) -> u16 {
        self.header.mapper_id
    }

    /// Mirroring currently selected by the board (the header value for fixed boards).
    pub fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring()
    }

    pub fn battery_backed(&self) -> bool {
        self.header.battery
    }

    pub fn trainer(&self) -> Option<&[u8]> {
        self.trainer.as_deref()
    }

    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.as_ref()
    }

    pub fn mapper_mut(&mut self) -> &mut (dyn Mapper + 'static) {
        self.mapper.as_mut()
    }
}
