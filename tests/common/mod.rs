//! iNES builders shared by the integration tests.

#![allow(dead_code)]

pub const PRG_LEN: usize = 16 * 1024;
pub const CHR_LEN: usize = 8 * 1024;

/// Vectors (reset, nmi, irq).
pub type Vectors = (u16, u16, u16);

/// NROM-128 image: `prg` at $8000 (mirrored at $C000), `chr` at the start of
/// an 8 KiB CHR ROM, unused bytes zero. Horizontal mirroring.
pub fn nrom(prg: &[u8], chr: &[u8], vectors: Vectors) -> Vec<u8> {
    assert!(prg.len() <= PRG_LEN - 6);
    assert!(chr.len() <= CHR_LEN);

    let mut rom = Vec::with_capacity(16 + PRG_LEN + CHR_LEN);
    rom.extend_from_slice(b"NES\x1A");
    rom.extend_from_slice(&[1, 1, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0]);

    let mut bank = vec![0u8; PRG_LEN];
    bank[..prg.len()].copy_from_slice(prg);
    let (reset, nmi, irq) = vectors;
    bank[0x3FFA..0x3FFC].copy_from_slice(&nmi.to_le_bytes());
    bank[0x3FFC..0x3FFE].copy_from_slice(&reset.to_le_bytes());
    bank[0x3FFE..].copy_from_slice(&irq.to_le_bytes());
    rom.extend_from_slice(&bank);

    let mut pattern = vec![0u8; CHR_LEN];
    pattern[..chr.len()].copy_from_slice(chr);
    rom.extend_from_slice(&pattern);
    rom
}

/// `nrom` with every vector at $8000.
pub fn nrom_program(prg: &[u8]) -> Vec<u8> {
    nrom(prg, &[], (0x8000, 0x8000, 0x8000))
}
