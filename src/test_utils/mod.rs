//! Shared test utilities for building minimal iNES (v1) images and wiring
//! them into a Bus/CPU pair.
//!
//! Notes on iNES header fields used here:
//! - bytes[0..4] = b"NES\x1A"
//! - byte 4 = PRG ROM size in 16 KiB units
//! - byte 5 = CHR ROM size in 8 KiB units (0 => the loader allocates 8 KiB CHR RAM)
//! - byte 6 = Flags 6 (mirroring, battery, trainer, mapper low nibble)
//! - byte 7 = Flags 7 (mapper high nibble, NES 2.0 indicator)
//! - byte 8 = PRG RAM size in 8 KiB units (0 => 8 KiB by convention)
//!
//! Vectors live at PRG offset 0x3FFA..=0x3FFF for 16 KiB images and
//! 0x7FFA..=0x7FFF for 32 KiB images.

#![allow(dead_code)]

use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::cpu::Cpu;

/// Build a minimal iNES (v1) image. PRG is filled with 0xAA and CHR with 0xCC.
pub fn build_ines(
    prg_16k: usize,
    chr_8k: usize,
    flags6: u8,
    flags7: u8,
    prg_ram_8k: u8,
    trainer: Option<&[u8; 512]>,
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(
        16 + trainer.map(|_| 512).unwrap_or(0) + prg_16k * 16 * 1024 + chr_8k * 8 * 1024,
    );

    bytes.extend_from_slice(b"NES\x1A");
    bytes.push(prg_16k as u8);
    bytes.push(chr_8k as u8);
    bytes.push(flags6);
    bytes.push(flags7);
    bytes.push(prg_ram_8k);
    bytes.extend_from_slice(&[0u8; 7]);

    if let Some(t) = trainer {
        bytes.extend_from_slice(t);
    }
    bytes.extend(std::iter::repeat_n(0xAA, prg_16k * 16 * 1024));
    bytes.extend(std::iter::repeat_n(0xCC, chr_8k * 8 * 1024));
    bytes
}

/// Build an NROM-128 image with `prg` at $8000 and the given (reset, nmi, irq)
/// vectors, defaulting all three to $8000. CHR is 8 KiB RAM.
pub fn build_nrom_with_prg(prg: &[u8], vectors: Option<(u16, u16, u16)>) -> Vec<u8> {
    assert!(prg.len() <= 16 * 1024 - 6, "program must leave room for vectors");
    let mut rom = build_ines(1, 0, 0, 0, 1, None);
    let prg_area = &mut rom[16..16 + 16 * 1024];
    prg_area[..prg.len()].copy_from_slice(prg);
    let (reset, nmi, irq) = vectors.unwrap_or((0x8000, 0x8000, 0x8000));
    set_vectors_in_prg(prg_area, reset, nmi, irq);
    rom
}

/// Write NMI/RESET/IRQ vectors into a 16 KiB or 32 KiB PRG slice.
pub fn set_vectors_in_prg(prg: &mut [u8], reset: u16, nmi: u16, irq: u16) {
    let base = match prg.len() {
        16384 => 0x3FFA,
        32768 => 0x7FFA,
        other => panic!("unsupported PRG length for vectors: {other}"),
    };
    write_le_u16(prg, base, nmi);
    write_le_u16(prg, base + 2, reset);
    write_le_u16(prg, base + 4, irq);
}

#[inline]
fn write_le_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset] = (value & 0x00FF) as u8;
    buf[offset + 1] = (value >> 8) as u8;
}

/// A Bus with an NROM cartridge holding `prg` at $8000 (vectors all $8000).
pub fn bus_with_program(prg: &[u8]) -> Bus {
    let rom = build_nrom_with_prg(prg, None);
    let mut bus = Bus::new();
    bus.attach_cartridge(Cartridge::from_ines_bytes(&rom).expect("test image parses"));
    bus
}

/// A CPU reset onto `prg` at $8000, plus its Bus.
pub fn cpu_with_program(prg: &[u8]) -> (Cpu, Bus) {
    let mut bus = bus_with_program(prg);
    let mut cpu = Cpu::new();
    cpu.power_on(&mut bus, None);
    (cpu, bus)
}

/// A Bus with an NROM cartridge whose 8 KiB CHR ROM is `chr` (zero padded).
pub fn bus_with_chr(chr: &[u8], vertical: bool) -> Bus {
    let mut rom = build_ines(1, 1, u8::from(vertical), 0, 1, None);
    let chr_start = 16 + 16 * 1024;
    rom[chr_start..chr_start + 8 * 1024].fill(0);
    rom[chr_start..chr_start + chr.len()].copy_from_slice(chr);
    let mut bus = Bus::new();
    bus.attach_cartridge(Cartridge::from_ines_bytes(&rom).expect("test image parses"));
    bus
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_basic_ines() {
        let rom = build_ines(2, 1, 0x01, 0x00, 1, None);
        assert_eq!(&rom[0..4], b"NES\x1A");
        assert_eq!(rom[4], 2);
        assert_eq!(rom[5], 1);
        assert_eq!(rom[6], 0x01);
        assert_eq!(rom.len(), 16 + 2 * 16 * 1024 + 8 * 1024);
    }

    #[test]
    fn writes_vectors_for_16k_prg() {
        let mut prg = vec![0u8; 16 * 1024];
        set_vectors_in_prg(&mut prg, 0x8123, 0x8456, 0x8ABC);
        assert_eq!(&prg[0x3FFA..], &[0x56, 0x84, 0x23, 0x81, 0xBC, 0x8A]);
    }

    #[test]
    fn builds_nrom_with_prg_and_vectors() {
        let rom = build_nrom_with_prg(&[0xA9, 0x01], Some((0x8010, 0x8020, 0x8030)));
        assert_eq!(rom[16], 0xA9);
        assert_eq!(rom[16 + 0x3FFC], 0x10);
        assert_eq!(rom[16 + 0x3FFA], 0x20);
    }
}
