/*!
Audio register port.

Sound generation is an external collaborator. The Bus forwards the audio
register range to an [`AudioPort`]:
- $4000..=$4013: channel registers (square 1/2, triangle, noise, DMC)
- $4015: status (write: channel enables; read: channel status)
- $4017 write: frame counter control

[`ApuRegisters`] is the default port. It latches writes so a host mixer can
inspect them, reports the enable mask on $4015 reads, and never raises an
IRQ. The frame sequencer and DMC are not modelled.
*/

/// Register-level interface of an audio unit attached to the CPU bus.
pub trait AudioPort {
    /// Write to $4000..=$4013, $4015 or $4017.
    fn write_register(&mut self, addr: u16, value: u8);

    /// Read of $4015.
    fn read_status(&mut self) -> u8;

    /// Whether the unit is asserting the CPU IRQ line.
    fn irq_pending(&self) -> bool {
        false
    }

    /// Power-on reset.
    fn reset(&mut self) {}
}

#[derive(Clone, Debug, Default)]
pub struct ApuRegisters {
    // $4000..=$4017 mirror; $4014/$4016 slots stay unused
    regs: [u8; 0x18],
    enabled_mask: u8,
}

impl ApuRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value written to `addr` ($4000..=$4017).
    pub fn register(&self, addr: u16) -> u8 {
        self.regs[(addr.wrapping_sub(0x4000) as usize) % self.regs.len()]
    }
}

impl AudioPort for ApuRegisters {
    fn write_register(&mut self, addr: u16, value: u8) {
        let idx = addr.wrapping_sub(0x4000) as usize;
        if let Some(slot) = self.regs.get_mut(idx) {
            *slot = value;
        }
        if addr == 0x4015 {
            self.enabled_mask = value & 0x1F;
        }
    }

    fn read_status(&mut self) -> u8 {
        self.enabled_mask
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}
