#![doc = r#"
famicore - an NES (2A03 + 2C02) emulator core.

The core is a library with no windowing, audio or file I/O of its own. A
host owns a [`Console`], feeds it iNES bytes, registers input devices and
calls `step` with a tick budget; one tick is one PPU dot and every third
tick is a CPU cycle.

Modules:
- apu: audio register port (sound generation lives outside the core)
- bus: CPU address decoding, open bus, OAM DMA, interrupt lines
- cartridge: iNES loader; builds the mapper once at load
- clock: master clock (3 dots per CPU cycle) and wall-clock pacing
- console: the aggregate a host drives
- controller: controller ports and pluggable input devices
- cpu: 6502 core (state + addressing + handlers + static opcode table)
- error: load and input-registration errors
- mapper / mappers: the Mapper trait, NROM, MMC1, UxROM, CNROM, MMC3, AxROM
- palette: system palette and RGBA expansion
- ppu: dot-driven 2C02 with loopy scrolling and sprite evaluation
- ppu_bus: the PPU's view of its address space
- screenshot: PNG capture (feature `screenshot`)

In tests, shared iNES builders are available under `crate::test_utils`.
"#]

// Core emulator modules
pub mod apu;
pub mod bus;
pub mod cartridge;
pub mod clock;
pub mod console;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod mapper;
pub mod mappers;
pub mod palette;
pub mod ppu;
pub mod ppu_bus;
#[cfg(feature = "screenshot")]
pub mod screenshot;

// Re-export commonly used types at the crate root for convenience.
pub use apu::{ApuRegisters, AudioPort};
pub use bus::Bus;
pub use cartridge::{Cartridge, ExecMode, FIXED_ENTRY_ADDR};
pub use clock::{Pacer, ms_to_cpu_cycles, ms_to_ticks};
pub use console::Console;
pub use controller::{Button, ButtonFlags, ButtonState, InputDevice, MAX_PLAYERS};
pub use cpu::{Cpu, CpuState};
pub use error::{InputError, LoadError};
pub use mapper::{Mapper, Mirroring};
pub use ppu::{FrameBuffer, NES_HEIGHT, NES_WIDTH, Ppu};

// Shared test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
