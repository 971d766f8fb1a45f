/*!
addressing.rs - 6502 addressing modes and operand resolution

Overview
========
`resolve` consumes the operand bytes of one instruction (PC must point just
past the opcode) and produces an `Operand`:
- `Implied` / `Accumulator` read nothing.
- `Immediate(v)` carries the byte itself.
- `Address { addr, crossed }` is the effective address; `crossed` reports an
  indexed page crossing (abs,X / abs,Y / (zp),Y) or, for relative mode, that
  the branch target lies on a different page than the next instruction.

Quirks reproduced
=================
- Zero-page indexing and (zp,X) / (zp),Y pointer fetches wrap within page zero.
- JMP (ind) fetches its high byte from the same page as the low byte.

Resolution is generic over `CpuMemory`, so the scheduler can run it against
a side-effect-free view of the bus to predict an instruction's cost.
*/

use crate::cpu::CpuMemory;
use crate::cpu::state::CpuState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    Imp,
    Acc,
    Imm,
    Zp0,
    Zpx,
    Zpy,
    Abs,
    Abx,
    Aby,
    Ind,
    Izx,
    Izy,
    Rel,
}

impl AddrMode {
    /// Operand bytes following the opcode.
    pub const fn operand_len(self) -> u16 {
        match self {
            AddrMode::Imp | AddrMode::Acc => 0,
            AddrMode::Imm
            | AddrMode::Zp0
            | AddrMode::Zpx
            | AddrMode::Zpy
            | AddrMode::Izx
            | AddrMode::Izy
            | AddrMode::Rel => 1,
            AddrMode::Abs | AddrMode::Abx | AddrMode::Aby | AddrMode::Ind => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Implied,
    Accumulator,
    Immediate(u8),
    Address { addr: u16, crossed: bool },
}

#[inline]
fn pages_differ(a: u16, b: u16) -> bool {
    (a & 0xFF00) != (b & 0xFF00)
}

#[inline]
fn read_word_zp<M: CpuMemory>(mem: &mut M, zp: u8) -> u16 {
    let lo = mem.read(zp as u16) as u16;
    let hi = mem.read(zp.wrapping_add(1) as u16) as u16;
    (hi << 8) | lo
}

#[inline]
fn indexed(base: u16, index: u8) -> Operand {
    let addr = base.wrapping_add(index as u16);
    Operand::Address {
        addr,
        crossed: pages_differ(base, addr),
    }
}

#[inline]
fn at(addr: u16) -> Operand {
    Operand::Address {
        addr,
        crossed: false,
    }
}

/// Consume the operand bytes for `mode` and compute the operand.
pub fn resolve<M: CpuMemory>(cpu: &mut CpuState, mode: AddrMode, mem: &mut M) -> Operand {
    match mode {
        AddrMode::Imp => Operand::Implied,
        AddrMode::Acc => Operand::Accumulator,
        AddrMode::Imm => Operand::Immediate(cpu.fetch_u8(mem)),
        AddrMode::Zp0 => at(cpu.fetch_u8(mem) as u16),
        AddrMode::Zpx => at(cpu.fetch_u8(mem).wrapping_add(cpu.x) as u16),
        AddrMode::Zpy => at(cpu.fetch_u8(mem).wrapping_add(cpu.y) as u16),
        AddrMode::Abs => at(cpu.fetch_u16(mem)),
        AddrMode::Abx => {
            let base = cpu.fetch_u16(mem);
            indexed(base, cpu.x)
        }
        AddrMode::Aby => {
            let base = cpu.fetch_u16(mem);
            indexed(base, cpu.y)
        }
        AddrMode::Ind => {
            let ptr = cpu.fetch_u16(mem);
            let lo = mem.read(ptr) as u16;
            let hi = mem.read((ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF)) as u16;
            at((hi << 8) | lo)
        }
        AddrMode::Izx => {
            let zp = cpu.fetch_u8(mem).wrapping_add(cpu.x);
            at(read_word_zp(mem, zp))
        }
        AddrMode::Izy => {
            let zp = cpu.fetch_u8(mem);
            let base = read_word_zp(mem, zp);
            indexed(base, cpu.y)
        }
        AddrMode::Rel => {
            let offset = cpu.fetch_u8(mem) as i8;
            let next = cpu.pc;
            let target = next.wrapping_add(offset as u16);
            Operand::Address {
                addr: target,
                crossed: pages_differ(next, target),
            }
        }
    }
}
