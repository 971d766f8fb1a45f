/*!
Console - the one object a host drives.

Owns the CPU, the bus (and through it the PPU, RAM, cartridge, controller
ports and audio port) and the master clock. There is no global state; two
consoles in one process are fully independent.

Lifecycle
=========
- `new()`: powered off, no cartridge. Stepping runs the CPU over open bus.
- `load_rom(bytes, mode)`: parse, attach, power on. A parse failure leaves
  the console exactly as it was.
- `power_on()`: cold boot of every device; the cartridge stays inserted.
- `reset()`: the reset button. CPU SP drops by 3 and I is set; RAM, VRAM
  and PPU state survive.

Driving
=======
`step(ticks)` advances in PPU dots. `run_frame()` steps until the PPU
finishes the frame in progress. Input devices are polled when the game
strobes $4016, so hosts only update their `ButtonState` between steps.
*/

use std::rc::Rc;

use log::info;

use crate::apu::AudioPort;
use crate::bus::Bus;
use crate::cartridge::{Cartridge, ExecMode};
use crate::clock::Clock;
use crate::controller::InputDevice;
use crate::cpu::Cpu;
use crate::error::{InputError, LoadError};
use crate::ppu::{FrameBuffer, Ppu};

/// CPU address the iNES trainer is copied to.
pub const TRAINER_ADDR: u16 = 0x7000;

#[derive(Default)]
pub struct Console {
    cpu: Cpu,
    bus: Bus,
    clock: Clock,
    exec_mode: ExecMode,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `bytes` as an iNES image, insert it and power on.
    pub fn load_rom(&mut self, bytes: &[u8], exec_mode: ExecMode) -> Result<(), LoadError> {
        let cartridge = Cartridge::from_ines_bytes(bytes)?;
        info!(
            "loading cartridge: mapper {} ({:?})",
            cartridge.mapper_id(),
            exec_mode
        );
        self.bus.attach_cartridge(cartridge);
        self.exec_mode = exec_mode;
        self.power_on();
        Ok(())
    }

    /// Remove the cartridge, if any. The machine is not re-powered.
    pub fn eject(&mut self) -> Option<Cartridge> {
        self.bus.detach_cartridge()
    }

    /// Cold boot: every device to its power-on state, the mapper to its
    /// power-on banks, PC per the stored exec mode.
    pub fn power_on(&mut self) {
        self.bus.power_on();
        self.clock.reset();
        self.copy_trainer();
        self.cpu.power_on(&mut self.bus, self.exec_mode.entry_override());
        info!("power on: pc=${:04X}", self.cpu.pc());
    }

    /// Soft reset.
    pub fn reset(&mut self) {
        self.cpu.reset(&mut self.bus, self.exec_mode.entry_override());
    }

    fn copy_trainer(&mut self) {
        let Some(trainer) = self.bus.cartridge().and_then(Cartridge::trainer).map(<[u8]>::to_vec) else {
            return;
        };
        for (offset, byte) in trainer.into_iter().enumerate() {
            self.bus.write(TRAINER_ADDR + offset as u16, byte);
        }
    }

    // ---------------------------------------------------------------------
    // Time
    // ---------------------------------------------------------------------

    /// Advance by `ticks` PPU dots (3 per CPU cycle).
    pub fn step(&mut self, ticks: u64) {
        self.clock.step(&mut self.cpu, &mut self.bus, ticks);
    }

    /// Step until the PPU completes the frame in progress. Returns the ticks
    /// consumed.
    pub fn run_frame(&mut self) -> u64 {
        let start = self.clock.ticks();
        self.bus.ppu_mut().clear_frame_complete();
        while !self.bus.ppu_mut().take_frame_complete() {
            self.clock.step(&mut self.cpu, &mut self.bus, 1);
        }
        self.clock.ticks() - start
    }

    /// Ticks elapsed since power-on.
    pub fn ticks(&self) -> u64 {
        self.clock.ticks()
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        self.bus.ppu().frame_buffer()
    }

    /// Frames completed since power-on.
    pub fn frame_count(&self) -> u64 {
        self.bus.ppu().frame_count()
    }

    // ---------------------------------------------------------------------
    // Collaborators
    // ---------------------------------------------------------------------

    pub fn register_input(&mut self, slot: usize, device: Rc<dyn InputDevice>) -> Result<(), InputError> {
        self.bus.inputs_mut().register(slot, device)
    }

    pub fn unregister_input(&mut self, slot: usize) {
        self.bus.inputs_mut().unregister(slot);
    }

    pub fn unregister_all_inputs(&mut self) {
        self.bus.inputs_mut().unregister_all();
    }

    /// Replace the audio port, returning the previous one.
    pub fn attach_audio(&mut self, audio: Box<dyn AudioPort>) -> Box<dyn AudioPort> {
        self.bus.set_audio(audio)
    }

    // ---------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn ppu(&self) -> &Ppu {
        self.bus.ppu()
    }

    pub fn exec_mode(&self) -> ExecMode {
        self.exec_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::FIXED_ENTRY_ADDR;
    use crate::test_utils::{build_ines, build_nrom_with_prg};

    #[test]
    fn new_console_is_empty() {
        let console = Console::new();
        assert!(console.bus().cartridge().is_none());
        assert_eq!(console.ticks(), 0);
        assert_eq!(console.frame_count(), 0);
    }

    #[test]
    fn load_rom_powers_on_at_reset_vector() {
        let rom = build_nrom_with_prg(&[0xEA], Some((0x8123, 0x8000, 0x8000)));
        let mut console = Console::new();
        console.load_rom(&rom, ExecMode::NormalReset).expect("load");
        assert_eq!(console.cpu().pc(), 0x8123);
        assert_eq!(console.exec_mode(), ExecMode::NormalReset);
    }

    #[test]
    fn fixed_entry_overrides_vector() {
        let rom = build_nrom_with_prg(&[0xEA], None);
        let mut console = Console::new();
        console.load_rom(&rom, ExecMode::FixedEntry).expect("load");
        assert_eq!(console.cpu().pc(), FIXED_ENTRY_ADDR);

        console.step(30);
        console.reset();
        assert_eq!(console.cpu().pc(), FIXED_ENTRY_ADDR);
    }

    #[test]
    fn unsupported_mapper_leaves_console_untouched() {
        let good = build_nrom_with_prg(&[0xEA], None);
        let mut console = Console::new();
        console.load_rom(&good, ExecMode::NormalReset).expect("load");
        console.step(300);

        // mapper 5 (MMC5)
        let bad = build_ines(1, 1, 0x50, 0, 1, None);
        assert_eq!(
            console.load_rom(&bad, ExecMode::FixedEntry),
            Err(LoadError::UnsupportedMapper(5))
        );
        assert_eq!(console.ticks(), 300);
        assert_eq!(console.exec_mode(), ExecMode::NormalReset);
        assert_eq!(console.bus().cartridge().map(Cartridge::mapper_id), Some(0));
    }

    #[test]
    fn trainer_is_copied_to_prg_ram() {
        let mut trainer = [0u8; 512];
        trainer[0] = 0x11;
        trainer[511] = 0x22;
        let rom = build_ines(1, 1, 0x04, 0, 1, Some(&trainer));
        let mut console = Console::new();
        console.load_rom(&rom, ExecMode::NormalReset).expect("load");
        assert_eq!(console.bus_mut().read(0x7000), 0x11);
        assert_eq!(console.bus_mut().read(0x71FF), 0x22);
    }

    #[test]
    fn run_frame_consumes_one_frame_of_dots() {
        let rom = build_nrom_with_prg(&[0x4C, 0x00, 0x80], None);
        let mut console = Console::new();
        console.load_rom(&rom, ExecMode::NormalReset).expect("load");
        // rendering is off, so no odd-frame skip
        assert_eq!(console.run_frame(), 341 * 262);
        assert_eq!(console.frame_count(), 1);
        assert_eq!(console.run_frame(), 341 * 262);
        assert_eq!(console.frame_count(), 2);
    }

    #[test]
    fn run_frame_ignores_frame_finished_by_step() {
        let rom = build_nrom_with_prg(&[0x4C, 0x00, 0x80], None);
        let mut console = Console::new();
        console.load_rom(&rom, ExecMode::NormalReset).expect("load");
        console.step(341 * 262);
        assert_eq!(console.frame_count(), 1);
        assert_eq!(console.run_frame(), 341 * 262, "a whole frame, not zero ticks");
        assert_eq!(console.frame_count(), 2);
    }

    #[test]
    fn power_on_resets_time_and_memory() {
        // LDA #$42; STA $00; JMP $8004
        let rom = build_nrom_with_prg(&[0xA9, 0x42, 0x85, 0x00, 0x4C, 0x04, 0x80], None);
        let mut console = Console::new();
        console.load_rom(&rom, ExecMode::NormalReset).expect("load");
        console.step(100);
        assert_eq!(console.bus_mut().read(0x0000), 0x42);

        console.power_on();
        assert_eq!(console.ticks(), 0);
        assert_eq!(console.bus_mut().read(0x0000), 0x00);
        assert_eq!(console.cpu().pc(), 0x8000);
    }
}
