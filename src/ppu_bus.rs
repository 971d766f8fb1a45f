/*!
ppu_bus: the interface the PPU uses to reach its 14-bit address space.

Decoupling the PPU from the concrete Bus keeps the renderer testable with a
plain in-memory mock and lets the Bus hand out a short-lived view over its
VRAM and the cartridge mapper while the PPU itself is borrowed mutably.

Address space (mirroring applied by the implementor):
- 0x0000-0x1FFF : pattern tables (CHR ROM/RAM via mapper)
- 0x2000-0x2FFF : nametables (mapper-selected mirroring)
- 0x3000-0x3EFF : mirrors of 0x2000-0x2EFF
- 0x3F00-0x3F1F : palette RAM, mirrored up to 0x3FFF
*/

/// Memory interface the PPU depends on.
pub trait PpuBus {
    /// Read a byte. Callers may pass any 14-bit address.
    fn ppu_read(&self, addr: u16) -> u8;

    /// Write a byte (CPU writes through $2007).
    fn ppu_write(&mut self, addr: u16, value: u8);

    /// Called once per rendered scanline (dot 260) for mapper IRQ counters.
    fn scanline_tick(&mut self) {}
}
