use std::rc::Rc;

use super::*;
use crate::apu::ApuRegisters;
use crate::controller::{ButtonFlags, ButtonState};
use crate::test_utils::{build_ines, bus_with_chr};

fn bus_with(flags6: u8, prg_16k: usize, chr_8k: usize) -> Bus {
    let rom = build_ines(prg_16k, chr_8k, flags6, 0, 1, None);
    let mut bus = Bus::new();
    bus.attach_cartridge(Cartridge::from_ines_bytes(&rom).expect("parse"));
    bus
}

/// MMC1 serial load: five LSB-first writes.
fn mmc1_serial_write(bus: &mut Bus, addr: u16, value5: u8) {
    for i in 0..5 {
        bus.write(addr, (value5 >> i) & 1);
    }
}

fn set_ppu_addr(bus: &mut Bus, addr: u16) {
    let _ = bus.read(0x2002);
    bus.write(0x2006, (addr >> 8) as u8);
    bus.write(0x2006, addr as u8);
}

fn write_vram(bus: &mut Bus, addr: u16, value: u8) {
    set_ppu_addr(bus, addr);
    bus.write(0x2007, value);
}

fn read_vram(bus: &mut Bus, addr: u16) -> u8 {
    set_ppu_addr(bus, addr);
    let _ = bus.read(0x2007);
    bus.read(0x2007)
}

#[test]
fn ram_mirroring() {
    let mut bus = Bus::new();
    bus.write(0x0001, 0xAA);
    assert_eq!(bus.read(0x0001), 0xAA);
    assert_eq!(bus.read(0x0801), 0xAA);
    assert_eq!(bus.read(0x1801), 0xAA);

    // Overwrite via a mirror address and verify all mirrors reflect it.
    bus.write(0x1801, 0x55);
    assert_eq!(bus.read(0x0001), 0x55);
    assert_eq!(bus.read(0x0801), 0x55);
}

#[test]
fn ppu_reg_mirror() {
    let mut bus = Bus::new();
    bus.write(0x2008, 0x80);
    assert!(bus.ppu().ctrl().contains(crate::ppu::PpuCtrl::NMI_ENABLE));
    // $3FFD decodes to $2005
    bus.write(0x3FFD, 0x08);
    assert!(bus.ppu().write_toggle());
}

#[test]
fn controller_strobe_and_read() {
    let mut bus = Bus::new();
    let pad = Rc::new(ButtonState::new());
    pad.set_all(ButtonFlags::B | ButtonFlags::RIGHT);
    bus.inputs_mut().register(0, pad).expect("register");

    bus.write(0x4016, 1);
    bus.write(0x4016, 0);
    let bits: Vec<u8> = (0..8).map(|_| bus.read(0x4016)).collect();
    assert_eq!(bits, [0, 1, 0, 0, 0, 0, 0, 1]);
    assert_eq!(bus.read(0x4016), 1);

    // port 2 is empty
    for _ in 0..8 {
        assert_eq!(bus.read(0x4017), 0);
    }
    assert_eq!(bus.read(0x4017), 1);
}

#[test]
fn prg_ram_basic() {
    let mut bus = bus_with(0, 1, 1);
    bus.write(0x6000, 0x42);
    bus.write(0x7FFF, 0x24);
    assert_eq!(bus.read(0x6000), 0x42);
    assert_eq!(bus.read(0x7FFF), 0x24);
    assert_eq!(bus.read(0x8000), 0xAA, "PRG ROM fill");
    assert_eq!(bus.read(0xC000), 0xAA, "NROM-128 mirror");
}

#[test]
fn open_bus_for_unmapped_reads() {
    let mut bus = Bus::new();
    bus.write(0x0010, 0x5A);
    assert_eq!(bus.read(0x0010), 0x5A);
    assert_eq!(bus.read(0x4018), 0x5A, "test-mode range");
    assert_eq!(bus.read(0x8000), 0x5A, "no cartridge");

    let mut bus = bus_with(0, 1, 1);
    bus.write(0x0000, 0x77);
    let _ = bus.read(0x0000);
    assert_eq!(bus.read(0x5000), 0x77, "NROM declines expansion space");
}

#[test]
fn peek_has_no_side_effects() {
    let mut bus = bus_with(0, 1, 1);
    bus.ppu_mut().set_position(VBLANK_TEST_LINE, 1);
    bus.tick_ppu();
    assert!(bus.ppu().vblank());

    bus.write(0x0300, 0x99);
    assert_eq!(bus.peek(0x0300), 0x99);
    assert_eq!(bus.peek(0x8000), 0xAA);
    let _ = bus.peek(0x2002);
    assert!(bus.ppu().vblank(), "peeking $2002 leaves vblank set");
    assert_eq!(bus.read(0x2002) & 0x80, 0x80);
    assert!(!bus.ppu().vblank());
}

const VBLANK_TEST_LINE: u16 = crate::ppu::VBLANK_SCANLINE;

#[test]
fn vblank_edge_latches_nmi_on_bus() {
    let mut bus = Bus::new();
    bus.write(0x2000, 0x80);
    bus.ppu_mut().set_position(VBLANK_TEST_LINE, 1);
    assert!(!bus.nmi_pending());
    bus.tick_ppu();
    assert!(bus.nmi_pending());
    assert!(bus.take_nmi());
    assert!(!bus.take_nmi());
}

#[test]
fn oam_dma_copies_page_and_stalls() {
    let mut bus = Bus::new();
    for i in 0..256u16 {
        bus.write(0x0200 + i, i as u8);
    }
    bus.write(0x2003, 0xFE);
    bus.write(0x4014, 0x02);

    // OAM should now contain 0x00 at 0xFE, 0x01 at 0xFF, 0x02 at 0x00, ...
    assert_eq!(bus.ppu().peek_oam(0xFE), 0x00);
    assert_eq!(bus.ppu().peek_oam(0xFF), 0x01);
    assert_eq!(bus.ppu().peek_oam(0x00), 0x02);
    assert_eq!(bus.ppu().peek_oam(0x01), 0x03);
    assert_eq!(bus.ppu().oam_addr(), 0xFE, "256 increments wrap back");
    assert_eq!(bus.take_dma_stall(), 513, "even cycle");
    assert_eq!(bus.take_dma_stall(), 0);

    bus.add_cpu_cycle();
    bus.write(0x4014, 0x02);
    assert_eq!(bus.dma_stall(), 514, "odd cycle adds one");
}

#[test]
fn audio_port_receives_register_traffic() {
    let mut bus = Bus::new();
    bus.write(0x4000, 0x3F);
    bus.write(0x4015, 0x0F);
    bus.write(0x4017, 0x40);
    assert_eq!(bus.read(0x4015), 0x0F);

    let previous = bus.set_audio(Box::new(ApuRegisters::new()));
    assert_eq!(bus.read(0x4015), 0);
    drop(previous);
    assert!(!bus.irq_line());
}

// ---------- PPU memory mapping ----------

#[test]
fn nametable_horizontal_mirroring() {
    let mut bus = bus_with(0, 1, 1);
    write_vram(&mut bus, 0x2000, 0x55);
    assert_eq!(read_vram(&mut bus, 0x2400), 0x55);
    assert_eq!(read_vram(&mut bus, 0x2800), 0x00);
}

#[test]
fn nametable_vertical_mirroring() {
    let mut bus = bus_with(1, 1, 1);
    write_vram(&mut bus, 0x2400, 0x66);
    assert_eq!(read_vram(&mut bus, 0x2C00), 0x66);
    assert_eq!(read_vram(&mut bus, 0x2000), 0x00);
}

#[test]
fn palette_mirroring_3f10_mirrors_3f00() {
    let mut bus = Bus::new();
    write_vram(&mut bus, 0x3F10, 0x12);
    set_ppu_addr(&mut bus, 0x3F00);
    assert_eq!(bus.read(0x2007) & 0x3F, 0x12, "palette reads are not buffered");
    assert_eq!(bus.ppu_read(0x3F20), 0x12, "palette repeats every 32 bytes");
}

#[test]
fn ppudata_buffered_read_through_chr() {
    let mut bus = bus_with_chr(&[0x11, 0x22, 0x33], false);
    set_ppu_addr(&mut bus, 0x0000);
    assert_eq!(bus.read(0x2007), 0x00);
    assert_eq!(bus.read(0x2007), 0x11);
    assert_eq!(bus.read(0x2007), 0x22);
}

#[test]
fn mmc1_software_mirroring() {
    // MMC1, 2x16K PRG, 1x8K CHR
    let mut bus = bus_with(0x10, 2, 1);

    mmc1_serial_write(&mut bus, 0x8000, 0b00010);
    write_vram(&mut bus, 0x2000, 0xA1);
    assert_eq!(read_vram(&mut bus, 0x2800), 0xA1, "vertical");

    mmc1_serial_write(&mut bus, 0x8000, 0b00011);
    assert_eq!(read_vram(&mut bus, 0x2400), 0xA1, "horizontal");

    mmc1_serial_write(&mut bus, 0x8000, 0b00000);
    assert_eq!(read_vram(&mut bus, 0x2C00), 0xA1, "single-screen lower");

    mmc1_serial_write(&mut bus, 0x8000, 0b00001);
    write_vram(&mut bus, 0x2000, 0xD4);
    assert_eq!(read_vram(&mut bus, 0x2800), 0xD4, "single-screen upper");
    mmc1_serial_write(&mut bus, 0x8000, 0b00000);
    assert_eq!(read_vram(&mut bus, 0x2000), 0xA1, "lower table untouched");
}

#[test]
fn mmc3_mirroring_switch() {
    // MMC3, 2x16K PRG, 1x8K CHR
    let mut bus = bus_with(0x40, 2, 1);

    bus.write(0xA000, 0);
    write_vram(&mut bus, 0x2000, 0x11);
    assert_eq!(read_vram(&mut bus, 0x2800), 0x11, "vertical");

    bus.write(0xA000, 1);
    write_vram(&mut bus, 0x2000, 0x22);
    assert_eq!(read_vram(&mut bus, 0x2400), 0x22, "horizontal");
    assert_eq!(read_vram(&mut bus, 0x2800), 0x00);

    bus.write(0xA000, 0);
    assert_eq!(read_vram(&mut bus, 0x2800), 0x22, "back to vertical");
}

#[test]
fn mmc3_irq_reaches_bus_line() {
    let mut bus = bus_with(0x40, 2, 1);
    bus.write(0xC000, 0); // latch 0: fire on every clock
    bus.write(0xC001, 0);
    bus.write(0xE001, 0);
    bus.write(0x2001, 0x18);
    assert!(!bus.irq_line());

    // run to the first scanline clock at dot 260
    while bus.ppu().position() != (0, 261) {
        bus.tick_ppu();
    }
    assert!(bus.irq_line());
    bus.write(0xE000, 0);
    assert!(!bus.irq_line(), "acknowledged");
}

#[test]
fn power_on_clears_devices_but_keeps_cartridge() {
    let mut bus = bus_with(0, 1, 1);
    bus.write(0x0000, 0x12);
    bus.write(0x2000, 0x80);
    write_vram(&mut bus, 0x2000, 0x34);
    bus.add_cpu_cycle();
    bus.power_on();

    assert_eq!(bus.read(0x0000), 0x00);
    assert_eq!(bus.ppu().ctrl(), crate::ppu::PpuCtrl::empty());
    assert_eq!(bus.ppu_read(0x2000), 0x00);
    assert_eq!(bus.cpu_cycles(), 0);
    assert!(bus.cartridge().is_some());
}
