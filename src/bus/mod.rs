#![doc = r#"
Bus module: the console's CPU-visible memory map and the owner of every
device the CPU talks to.

Overview
- `Bus` owns 2 KiB work RAM, the PPU, console VRAM (nametables + palette), the
  optional cartridge, the controller ports and the audio port.
- The PPU reaches its own address space through `ppu_space::PpuSpace`, a
  short-lived view over VRAM and the mapper built on every access.
- The scheduler calls `tick_ppu` once per dot and `add_cpu_cycle` once per
  CPU cycle; NMI edges and the OAM DMA stall are latched here for the CPU.

Address map
- $0000-$1FFF: 2KB internal RAM, mirrored every $0800
- $2000-$3FFF: PPU registers, mirrored every 8 bytes
- $4000-$4013, $4015: audio port ($4015 read = audio status)
- $4014: OAM DMA (write)
- $4016: controller strobe (write), port 1 serial read (read)
- $4017: port 2 serial read (read), audio frame counter (write)
- $4018-$401F: open bus
- $4020-$FFFF: cartridge mapper; declined reads are open bus

Open bus
- The last value driven on the data bus is remembered; unmapped reads and
  reads of an empty cartridge slot return it.
"#]

pub mod ppu_space;

use log::debug;

use crate::apu::{ApuRegisters, AudioPort};
use crate::cartridge::Cartridge;
use crate::controller::InputPorts;
use crate::ppu::Ppu;
use ppu_space::{PpuSpace, Vram};

/// Base CPU stall of an OAM DMA transfer.
pub const OAM_DMA_CYCLES: u32 = 513;

pub struct Bus {
    ram: [u8; 0x800],
    ppu: Ppu,
    vram: Vram,
    cartridge: Option<Cartridge>,
    inputs: InputPorts,
    audio: Box<dyn AudioPort>,
    open_bus: u8,
    cpu_cycles: u64,
    dma_stall: u32,
    nmi_pending: bool,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrow the PPU-visible memory out of disjoint Bus fields.
fn ppu_space<'a>(vram: &'a mut Vram, cartridge: &'a mut Option<Cartridge>) -> PpuSpace<'a> {
    PpuSpace::new(vram, cartridge.as_mut().map(Cartridge::mapper_mut))
}

impl Bus {
    pub fn new() -> Self {
        Self {
            ram: [0; 0x800],
            ppu: Ppu::new(),
            vram: Vram::default(),
            cartridge: None,
            inputs: InputPorts::new(),
            audio: Box::new(ApuRegisters::new()),
            open_bus: 0,
            cpu_cycles: 0,
            dma_stall: 0,
            nmi_pending: false,
        }
    }

    /// Power-on state for every device. The cartridge and registered input
    /// devices stay attached; the mapper returns to its power-on banks.
    pub fn power_on(&mut self) {
        self.ram = [0; 0x800];
        self.ppu.reset();
        self.vram = Vram::default();
        self.inputs.reset();
        self.audio.reset();
        self.open_bus = 0;
        self.cpu_cycles = 0;
        self.dma_stall = 0;
        self.nmi_pending = false;
        if let Some(cart) = self.cartridge.as_mut() {
            cart.mapper_mut().reset();
        }
    }

    /// Insert a cartridge, returning the previous one.
    pub fn attach_cartridge(&mut self, cartridge: Cartridge) -> Option<Cartridge> {
        self.cartridge.replace(cartridge)
    }

    pub fn detach_cartridge(&mut self) -> Option<Cartridge> {
        self.cartridge.take()
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.cartridge.as_mut()
    }

    // ---------------------------------------------------------------------
    // CPU-visible memory
    // ---------------------------------------------------------------------

    pub fn read(&mut self, addr: u16) -> u8 {
        let value = match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => {
                let mut space = ppu_space(&mut self.vram, &mut self.cartridge);
                self.ppu.read_register(addr, &mut space)
            }
            0x4015 => self.audio.read_status(),
            0x4016 => self.inputs.read(0),
            0x4017 => self.inputs.read(1),
            0x4000..=0x401F => self.open_bus,
            _ => self.cartridge_read(addr),
        };
        self.open_bus = value;
        value
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        self.open_bus = value;
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = value,
            0x2000..=0x3FFF => {
                let mut space = ppu_space(&mut self.vram, &mut self.cartridge);
                self.ppu.write_register(addr, value, &mut space);
            }
            0x4014 => self.oam_dma(value),
            0x4016 => self.inputs.write_strobe(value),
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.audio.write_register(addr, value),
            0x4018..=0x401F => {}
            _ => {
                if let Some(cart) = self.cartridge.as_mut() {
                    cart.mapper_mut().cpu_write(addr, value);
                }
            }
        }
    }

    /// Side-effect-free read: RAM and cartridge space read normally, device
    /// registers report the open-bus value.
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x401F => self.open_bus,
            _ => self.cartridge_read(addr),
        }
    }

    /// Little-endian word at `addr` (vectors).
    pub fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    fn cartridge_read(&self, addr: u16) -> u8 {
        self.cartridge
            .as_ref()
            .and_then(|cart| cart.mapper().cpu_read(addr))
            .unwrap_or(self.open_bus)
    }

    pub fn open_bus(&self) -> u8 {
        self.open_bus
    }

    // ---------------------------------------------------------------------
    // OAM DMA
    // ---------------------------------------------------------------------

    /// Copy CPU page `page` into OAM and stall the CPU for the transfer.
    fn oam_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        let mut data = [0u8; 256];
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = self.read(base | i as u16);
        }
        self.ppu.write_oam_dma(&data);

        let stall = OAM_DMA_CYCLES + (self.cpu_cycles & 1) as u32;
        self.dma_stall += stall;
        debug!(
            "oam dma: page ${:02X}00 at cpu cycle {}, stall {} cycles",
            page, self.cpu_cycles, stall
        );
    }

    /// Pending DMA stall, without consuming it.
    pub fn dma_stall(&self) -> u32 {
        self.dma_stall
    }

    pub fn take_dma_stall(&mut self) -> u32 {
        std::mem::take(&mut self.dma_stall)
    }

    // ---------------------------------------------------------------------
    // Timing and interrupt lines
    // ---------------------------------------------------------------------

    /// Advance the PPU one dot and latch any NMI edge it produced.
    pub fn tick_ppu(&mut self) {
        let mut space = ppu_space(&mut self.vram, &mut self.cartridge);
        self.ppu.tick(&mut space);
        if self.ppu.take_nmi_request() {
            self.nmi_pending = true;
        }
    }

    /// Count one elapsed CPU cycle (DMA alignment).
    pub fn add_cpu_cycle(&mut self) {
        self.cpu_cycles += 1;
    }

    pub fn cpu_cycles(&self) -> u64 {
        self.cpu_cycles
    }

    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Consume a latched NMI edge.
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    /// Level of the shared IRQ line (mapper or audio).
    pub fn irq_line(&self) -> bool {
        let mapper_irq = self
            .cartridge
            .as_ref()
            .is_some_and(|cart| cart.mapper().irq_pending());
        mapper_irq || self.audio.irq_pending()
    }

    // ---------------------------------------------------------------------
    // Devices
    // ---------------------------------------------------------------------

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn inputs(&self) -> &InputPorts {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut InputPorts {
        &mut self.inputs
    }

    /// Replace the audio port, returning the previous one.
    pub fn set_audio(&mut self, audio: Box<dyn AudioPort>) -> Box<dyn AudioPort> {
        std::mem::replace(&mut self.audio, audio)
    }

    pub fn audio(&self) -> &dyn AudioPort {
        self.audio.as_ref()
    }

    /// Read the PPU address space directly (debuggers, tests).
    pub fn ppu_read(&mut self, addr: u16) -> u8 {
        use crate::ppu_bus::PpuBus;
        ppu_space(&mut self.vram, &mut self.cartridge).ppu_read(addr)
    }

    /// Write the PPU address space directly (debuggers, tests).
    pub fn ppu_write(&mut self, addr: u16, value: u8) {
        use crate::ppu_bus::PpuBus;
        ppu_space(&mut self.vram, &mut self.cartridge).ppu_write(addr, value);
    }
}

#[cfg(test)]
mod tests;
