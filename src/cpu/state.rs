/*!
state.rs - 6502 architectural state (registers + flags) and the small
helpers every instruction handler shares.

`CpuState` owns A, X, Y, SP, PC, P and the halted latch. It knows nothing
about decode or timing; those live in `table.rs` and `mod.rs`.

6502 Status Register Bit Layout
===============================
Bit: 7 6 5 4 3 2 1 0
     N V 1 B D I Z C
Where:
  N = NEGATIVE
  V = OVERFLOW
  1 = UNUSED (always reads as 1)
  B = BREAK (PHP/BRK only; hardware IRQ/NMI push with B clear)
  D = DECIMAL (stored and pushed, ignored by ADC/SBC on the 2A03)
  I = IRQ_DISABLE
  Z = ZERO
  C = CARRY
*/

use crate::bus::Bus;
use crate::cpu::CpuMemory;

/// Processor status flag bit masks.
pub const CARRY: u8 = 0b0000_0001;
pub const ZERO: u8 = 0b0000_0010;
pub const IRQ_DISABLE: u8 = 0b0000_0100;
pub const DECIMAL: u8 = 0b0000_1000;
pub const BREAK: u8 = 0b0001_0000;
pub const UNUSED: u8 = 0b0010_0000;
pub const OVERFLOW: u8 = 0b0100_0000;
pub const NEGATIVE: u8 = 0b1000_0000;

/// Base of the hardware stack page.
pub const STACK_BASE: u16 = 0x0100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    /// Set by a JAM opcode; cleared only by power-on or reset.
    pub halted: bool,
}

impl Default for CpuState {
    fn default() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0x0000,
            status: IRQ_DISABLE | UNUSED,
            halted: false,
        }
    }
}

impl CpuState {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Flags
    // ---------------------------------------------------------------------

    #[inline]
    pub fn is_flag_set(&self, mask: u8) -> bool {
        (self.status & mask) != 0
    }

    #[inline]
    pub fn assign_flag(&mut self, mask: u8, on: bool) {
        if on {
            self.status |= mask;
        } else {
            self.status &= !mask;
        }
    }

    #[inline]
    pub fn update_zn(&mut self, v: u8) {
        self.assign_flag(ZERO, v == 0);
        self.assign_flag(NEGATIVE, v & 0x80 != 0);
    }

    /// P as pushed to the stack: bit 5 always set, B per the pusher.
    #[inline]
    pub fn status_for_push(&self, set_break: bool) -> u8 {
        let p = self.status | UNUSED;
        if set_break { p | BREAK } else { p & !BREAK }
    }

    /// Load P from the stack: B is not a real latch, bit 5 reads as 1.
    #[inline]
    pub fn set_status_from_stack(&mut self, v: u8) {
        self.status = (v & !BREAK) | UNUSED;
    }

    // ---------------------------------------------------------------------
    // Program counter
    // ---------------------------------------------------------------------

    /// Read the byte at PC and advance PC.
    #[inline]
    pub fn fetch_u8<M: CpuMemory>(&mut self, mem: &mut M) -> u8 {
        let b = mem.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        b
    }

    /// Read a little-endian word at PC and advance PC by 2.
    #[inline]
    pub fn fetch_u16<M: CpuMemory>(&mut self, mem: &mut M) -> u16 {
        let lo = self.fetch_u8(mem) as u16;
        let hi = self.fetch_u8(mem) as u16;
        (hi << 8) | lo
    }

    // ---------------------------------------------------------------------
    // Stack (page one, SP wraps within it)
    // ---------------------------------------------------------------------

    #[inline]
    pub fn push(&mut self, bus: &mut Bus, v: u8) {
        bus.write(STACK_BASE | self.sp as u16, v);
        self.sp = self.sp.wrapping_sub(1);
    }

    #[inline]
    pub fn pop(&mut self, bus: &mut Bus) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(STACK_BASE | self.sp as u16)
    }

    #[inline]
    pub fn push_word(&mut self, bus: &mut Bus, v: u16) {
        self.push(bus, (v >> 8) as u8);
        self.push(bus, v as u8);
    }

    #[inline]
    pub fn pop_word(&mut self, bus: &mut Bus) -> u16 {
        let lo = self.pop(bus) as u16;
        let hi = self.pop(bus) as u16;
        (hi << 8) | lo
    }
}
