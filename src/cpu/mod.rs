/*!
cpu - the 2A03's 6502 core.

Modules
=======
```text
state.rs      - registers, flags, stack helpers
addressing.rs - addressing modes and operand resolution
execute.rs    - instruction handlers (documented + undocumented)
table.rs      - the static 256-entry opcode table
```

Timing model
============
The core is atomic-on-completion. `Cpu::clock` is called once per CPU cycle
by the scheduler. When nothing is staged it decides the next unit of work
(DMA stall, interrupt entry, instruction or a halted cycle) and loads the
pending counter with that unit's cost. The effects land on the cycle the
counter reaches zero.

An instruction's cost depends on page crossings and branch outcomes, which
are known before the instruction runs. The prediction resolves the operand
against [`Peek`], a side-effect-free view of the bus, so staging never
disturbs device registers.

`step_instruction` runs one unit immediately and returns its cost. It is
the entry point for CPU-only tests and tools.

Interrupts
==========
Sampled only when new work is staged, in priority order: DMA stall, NMI
(edge latched on the bus), IRQ (level, masked by I).

Usage:
```rust,ignore
let mut cpu = Cpu::new();
cpu.power_on(&mut bus, None);
let cycles = cpu.step_instruction(&mut bus);
```
*/

pub mod addressing;
pub mod execute;
pub mod state;
pub mod table;

use log::{info, trace};

use crate::bus::Bus;
use addressing::resolve;
use table::OPCODES;

pub use addressing::{AddrMode, Operand};
pub use state::{
    BREAK, CARRY, CpuState, DECIMAL, IRQ_DISABLE, NEGATIVE, OVERFLOW, UNUSED, ZERO,
};
pub use table::{Mnemonic, Opcode};

/// Reset vector.
pub const RESET_VECTOR: u16 = 0xFFFC;
/// Cycles taken to enter an NMI or IRQ handler.
pub const INTERRUPT_CYCLES: u32 = 7;

/// Byte-level read access used by operand resolution.
pub trait CpuMemory {
    fn read(&mut self, addr: u16) -> u8;
}

impl CpuMemory for Bus {
    #[inline]
    fn read(&mut self, addr: u16) -> u8 {
        Bus::read(self, addr)
    }
}

/// Read-only view of the bus. Device registers report open bus, so reads
/// through it never change emulator state.
pub struct Peek<'a>(pub &'a Bus);

impl CpuMemory for Peek<'_> {
    #[inline]
    fn read(&mut self, addr: u16) -> u8 {
        self.0.peek(addr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Nmi,
    Irq,
}

impl Interrupt {
    pub fn vector(self) -> u16 {
        match self {
            Interrupt::Nmi => 0xFFFA,
            Interrupt::Irq => execute::IRQ_VECTOR,
        }
    }
}

/// One schedulable unit of CPU work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Work {
    /// CPU held off the bus by OAM DMA.
    DmaStall,
    Interrupt(Interrupt),
    Instruction,
    /// A JAM opcode stopped the core; each clock burns one cycle.
    Halted,
}

#[derive(Debug, Clone, Default)]
pub struct Cpu {
    state: CpuState,
    /// Cycles left before the staged work completes.
    pending: u32,
    staged: Option<(Work, u32)>,
    total_cycles: u64,
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Power-on: registers to their documented defaults and PC from the reset
    /// vector, or from `entry` when given.
    pub fn power_on(&mut self, bus: &mut Bus, entry: Option<u16>) {
        *self = Self::default();
        self.state.pc = entry.unwrap_or_else(|| bus.read_word(RESET_VECTOR));
        info!("cpu power-on: pc=${:04X}", self.state.pc);
    }

    /// Soft reset: SP drops by three, I is set, PC reloads. Other registers
    /// and memory keep their contents.
    pub fn reset(&mut self, bus: &mut Bus, entry: Option<u16>) {
        self.state.sp = self.state.sp.wrapping_sub(3);
        self.state.assign_flag(IRQ_DISABLE, true);
        self.state.halted = false;
        self.pending = 0;
        self.staged = None;
        self.state.pc = entry.unwrap_or_else(|| bus.read_word(RESET_VECTOR));
        info!("cpu reset: pc=${:04X}", self.state.pc);
    }

    // ---------------------------------------------------------------------
    // Stepping
    // ---------------------------------------------------------------------

    /// Advance one CPU cycle.
    pub fn clock(&mut self, bus: &mut Bus) {
        if self.staged.is_none() {
            let (work, cost) = self.next_work(bus);
            self.staged = Some((work, cost));
            self.pending = cost;
        }
        self.total_cycles += 1;
        self.pending = self.pending.saturating_sub(1);
        if self.pending == 0 {
            if let Some((work, predicted)) = self.staged.take() {
                let actual = self.perform(work, predicted, bus);
                debug_assert_eq!(actual, predicted, "{work:?} cost differs from its prediction");
            }
        }
    }

    /// Run one unit of work to completion and return its cost in cycles.
    /// Work already staged by `clock` is finished first.
    pub fn step_instruction(&mut self, bus: &mut Bus) -> u32 {
        let (work, predicted) = match self.staged.take() {
            Some(staged) => staged,
            None => self.next_work(bus),
        };
        self.pending = 0;
        let cycles = self.perform(work, predicted, bus);
        self.total_cycles += cycles as u64;
        cycles
    }

    /// Choose the next unit of work and its cost.
    fn next_work(&mut self, bus: &mut Bus) -> (Work, u32) {
        let stall = bus.take_dma_stall();
        if stall > 0 {
            return (Work::DmaStall, stall);
        }
        if self.state.halted {
            return (Work::Halted, 1);
        }
        if bus.take_nmi() {
            return (Work::Interrupt(Interrupt::Nmi), INTERRUPT_CYCLES);
        }
        if bus.irq_line() && !self.state.is_flag_set(IRQ_DISABLE) {
            return (Work::Interrupt(Interrupt::Irq), INTERRUPT_CYCLES);
        }
        (Work::Instruction, self.predict(bus))
    }

    /// Cost of the instruction at PC, computed on a copy of the registers.
    fn predict(&self, bus: &Bus) -> u32 {
        let mut scratch = self.state;
        let mut view = Peek(bus);
        let entry = &OPCODES[scratch.fetch_u8(&mut view) as usize];
        let operand = resolve(&mut scratch, entry.mode, &mut view);
        entry.cost(operand, scratch.status)
    }

    fn perform(&mut self, work: Work, predicted: u32, bus: &mut Bus) -> u32 {
        match work {
            Work::DmaStall => predicted,
            Work::Halted => 1,
            Work::Interrupt(kind) => self.interrupt(bus, kind),
            Work::Instruction => self.execute(bus),
        }
    }

    /// Enter an interrupt handler: push PC and P (B clear), set I, jump.
    fn interrupt(&mut self, bus: &mut Bus, kind: Interrupt) -> u32 {
        let return_pc = self.state.pc;
        self.state.push_word(bus, return_pc);
        let p = self.state.status_for_push(false);
        self.state.push(bus, p);
        self.state.assign_flag(IRQ_DISABLE, true);
        self.state.pc = bus.read_word(kind.vector());
        trace!(
            "{:?} from ${:04X} to ${:04X} at cycle {}",
            kind, return_pc, self.state.pc, self.total_cycles
        );
        INTERRUPT_CYCLES
    }

    fn execute(&mut self, bus: &mut Bus) -> u32 {
        let pc = self.state.pc;
        let code = self.state.fetch_u8(bus);
        let entry = &OPCODES[code as usize];
        let operand = resolve(&mut self.state, entry.mode, bus);
        let cycles = entry.cost(operand, self.state.status);
        trace!(
            "{:04X}  {:02X}  {:?} {:?}  A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            pc,
            code,
            entry.mnemonic,
            operand,
            self.state.a,
            self.state.x,
            self.state.y,
            self.state.status,
            self.state.sp,
            self.total_cycles
        );
        (entry.exec)(&mut self.state, bus, operand);
        cycles
    }

    // ---------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------

    pub fn state(&self) -> &CpuState {
        &self.state
    }

    /// Mutable register access for debuggers and tests.
    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    pub fn pc(&self) -> u16 {
        self.state.pc
    }

    pub fn is_halted(&self) -> bool {
        self.state.halted
    }

    /// Cycles remaining on the staged unit of work (0 at a boundary).
    pub fn pending_cycles(&self) -> u32 {
        self.pending
    }

    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }
}
