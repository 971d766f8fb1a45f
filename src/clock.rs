/*!
Master clock.

Purpose
- Own the order of operations for one tick (one PPU dot):
  * Advance the PPU one dot (the bus latches any NMI edge)
  * Every third tick, count a CPU cycle on the bus and clock the CPU
- Keep the tick phase as state, so `step(a + b)` and `step(a); step(b)`
  produce identical machines.

Wall clock
- `ms_to_cpu_cycles` / `ms_to_ticks` convert host time at the NTSC rate.
- `Pacer` turns `Instant`s into tick budgets for a frame-driven host loop.
*/

use std::time::Instant;

use crate::bus::Bus;
use crate::cpu::Cpu;

/// PPU dots per CPU cycle (NTSC).
pub const PPU_DOTS_PER_CPU_CYCLE: u8 = 3;

/// NTSC 2A03 clock rate.
pub const CPU_CLOCK_HZ: u64 = 1_789_773;

pub fn ms_to_cpu_cycles(ms: u64) -> u64 {
    ms * CPU_CLOCK_HZ / 1000
}

pub fn ms_to_ticks(ms: u64) -> u64 {
    ms_to_cpu_cycles(ms) * PPU_DOTS_PER_CPU_CYCLE as u64
}

#[derive(Debug, Clone, Default)]
pub struct Clock {
    /// Dots since the last CPU cycle (0..3).
    phase: u8,
    ticks: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to phase zero with no elapsed ticks.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance the machine by `n` ticks.
    pub fn step(&mut self, cpu: &mut Cpu, bus: &mut Bus, n: u64) {
        for _ in 0..n {
            self.tick(cpu, bus);
        }
    }

    #[inline]
    fn tick(&mut self, cpu: &mut Cpu, bus: &mut Bus) {
        bus.tick_ppu();
        self.ticks += 1;
        self.phase += 1;
        if self.phase == PPU_DOTS_PER_CPU_CYCLE {
            self.phase = 0;
            bus.add_cpu_cycle();
            cpu.clock(bus);
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn phase(&self) -> u8 {
        self.phase
    }
}

/// Converts elapsed wall time into tick budgets.
#[derive(Debug, Clone)]
pub struct Pacer {
    last: Instant,
}

impl Pacer {
    pub fn new(now: Instant) -> Self {
        Self { last: now }
    }

    /// Ticks owed since the previous call. A sub-millisecond gap still
    /// yields one millisecond of emulation.
    pub fn ticks_since_last(&mut self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        let ms = (elapsed.as_millis() as u64).max(1);
        ms_to_ticks(ms)
    }
}
