/*!
execute.rs - 6502 instruction semantics

Every opcode table entry points at one of the handlers below. A handler
receives the already-resolved operand (PC is past the whole instruction)
and applies the instruction's effects to registers and memory. Cycle costs
are not computed here; see `Opcode::cost`.

Documented instructions
=======================
Loads/stores, transfers, stack, ALU (ADC/SBC ignore the D flag as on the
2A03), shifts/rotates, INC/DEC, compares, branches, jumps, BRK/RTI/RTS and
flag set/clear.

Undocumented instructions
=========================
- Combined RMW + ALU: SLO, RLA, SRE, RRA, DCP, ISC
- LAX, SAX, LAS
- Immediate combos: ANC, ALR, ARR, AXS (SBX), ANE (XAA) and LXA. The last two
  use $EE as the analog "magic" constant.
- High-byte stores SHA, SHX, SHY, TAS: the value is ANDed with the base
  address high byte + 1, and a page crossing replaces the target high byte
  with that value.
- JAM halts the CPU with PC left on the JAM opcode.
*/

use crate::bus::Bus;
use crate::cpu::addressing::Operand;
use crate::cpu::state::{CARRY, CpuState, DECIMAL, IRQ_DISABLE, NEGATIVE, OVERFLOW, ZERO};

/// BRK/IRQ vector.
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Constant ORed into A by ANE and LXA.
const MAGIC: u8 = 0xEE;

// ---------------------------------------------------------------------------
// Operand helpers
// ---------------------------------------------------------------------------

#[inline]
fn address(op: Operand) -> u16 {
    match op {
        Operand::Address { addr, .. } => addr,
        other => {
            debug_assert!(false, "operand {other:?} has no effective address");
            0
        }
    }
}

#[inline]
fn value(cpu: &CpuState, bus: &mut Bus, op: Operand) -> u8 {
    match op {
        Operand::Immediate(v) => v,
        Operand::Accumulator => cpu.a,
        Operand::Address { addr, .. } => bus.read(addr),
        Operand::Implied => 0,
    }
}

/// Read-modify-write on A or memory; returns the new value.
#[inline]
fn modify(cpu: &mut CpuState, bus: &mut Bus, op: Operand, f: fn(&mut CpuState, u8) -> u8) -> u8 {
    match op {
        Operand::Accumulator => {
            let a = cpu.a;
            let result = f(cpu, a);
            cpu.a = result;
            result
        }
        _ => {
            let addr = address(op);
            let old = bus.read(addr);
            let result = f(cpu, old);
            bus.write(addr, result);
            result
        }
    }
}

// ---------------------------------------------------------------------------
// ALU primitives
// ---------------------------------------------------------------------------

fn add_with_carry(cpu: &mut CpuState, v: u8) {
    let carry = cpu.is_flag_set(CARRY) as u16;
    let sum = cpu.a as u16 + v as u16 + carry;
    let result = sum as u8;
    cpu.assign_flag(CARRY, sum > 0xFF);
    cpu.assign_flag(OVERFLOW, (!(cpu.a ^ v) & (cpu.a ^ result) & 0x80) != 0);
    cpu.a = result;
    cpu.update_zn(result);
}

#[inline]
fn subtract_with_borrow(cpu: &mut CpuState, v: u8) {
    add_with_carry(cpu, !v);
}

fn compare(cpu: &mut CpuState, reg: u8, v: u8) {
    cpu.assign_flag(CARRY, reg >= v);
    cpu.update_zn(reg.wrapping_sub(v));
}

fn shift_left(cpu: &mut CpuState, v: u8) -> u8 {
    cpu.assign_flag(CARRY, v & 0x80 != 0);
    let r = v << 1;
    cpu.update_zn(r);
    r
}

fn shift_right(cpu: &mut CpuState, v: u8) -> u8 {
    cpu.assign_flag(CARRY, v & 0x01 != 0);
    let r = v >> 1;
    cpu.update_zn(r);
    r
}

fn rotate_left(cpu: &mut CpuState, v: u8) -> u8 {
    let r = (v << 1) | cpu.is_flag_set(CARRY) as u8;
    cpu.assign_flag(CARRY, v & 0x80 != 0);
    cpu.update_zn(r);
    r
}

fn rotate_right(cpu: &mut CpuState, v: u8) -> u8 {
    let r = (v >> 1) | ((cpu.is_flag_set(CARRY) as u8) << 7);
    cpu.assign_flag(CARRY, v & 0x01 != 0);
    cpu.update_zn(r);
    r
}

fn increment(cpu: &mut CpuState, v: u8) -> u8 {
    let r = v.wrapping_add(1);
    cpu.update_zn(r);
    r
}

fn decrement(cpu: &mut CpuState, v: u8) -> u8 {
    let r = v.wrapping_sub(1);
    cpu.update_zn(r);
    r
}

/// Take the branch when `flag` is in the wanted state.
#[inline]
fn branch_on(cpu: &mut CpuState, op: Operand, flag: u8, set: bool) {
    if cpu.is_flag_set(flag) == set {
        cpu.pc = address(op);
    }
}

// ---------------------------------------------------------------------------
// Loads, stores, transfers
// ---------------------------------------------------------------------------

pub(crate) fn lda(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    cpu.a = value(cpu, bus, op);
    cpu.update_zn(cpu.a);
}

pub(crate) fn ldx(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    cpu.x = value(cpu, bus, op);
    cpu.update_zn(cpu.x);
}

pub(crate) fn ldy(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    cpu.y = value(cpu, bus, op);
    cpu.update_zn(cpu.y);
}

pub(crate) fn sta(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    bus.write(address(op), cpu.a);
}

pub(crate) fn stx(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    bus.write(address(op), cpu.x);
}

pub(crate) fn sty(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    bus.write(address(op), cpu.y);
}

pub(crate) fn tax(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    cpu.x = cpu.a;
    cpu.update_zn(cpu.x);
}

pub(crate) fn tay(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    cpu.y = cpu.a;
    cpu.update_zn(cpu.y);
}

pub(crate) fn txa(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    cpu.a = cpu.x;
    cpu.update_zn(cpu.a);
}

pub(crate) fn tya(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    cpu.a = cpu.y;
    cpu.update_zn(cpu.a);
}

pub(crate) fn tsx(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    cpu.x = cpu.sp;
    cpu.update_zn(cpu.x);
}

pub(crate) fn txs(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    cpu.sp = cpu.x;
}

// ---------------------------------------------------------------------------
// Stack
// ---------------------------------------------------------------------------

pub(crate) fn pha(cpu: &mut CpuState, bus: &mut Bus, _: Operand) {
    let a = cpu.a;
    cpu.push(bus, a);
}

pub(crate) fn php(cpu: &mut CpuState, bus: &mut Bus, _: Operand) {
    let p = cpu.status_for_push(true);
    cpu.push(bus, p);
}

pub(crate) fn pla(cpu: &mut CpuState, bus: &mut Bus, _: Operand) {
    cpu.a = cpu.pop(bus);
    cpu.update_zn(cpu.a);
}

pub(crate) fn plp(cpu: &mut CpuState, bus: &mut Bus, _: Operand) {
    let p = cpu.pop(bus);
    cpu.set_status_from_stack(p);
}

// ---------------------------------------------------------------------------
// ALU
// ---------------------------------------------------------------------------

pub(crate) fn adc(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = value(cpu, bus, op);
    add_with_carry(cpu, v);
}

pub(crate) fn sbc(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = value(cpu, bus, op);
    subtract_with_borrow(cpu, v);
}

pub(crate) fn and(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = value(cpu, bus, op);
    cpu.a &= v;
    cpu.update_zn(cpu.a);
}

pub(crate) fn ora(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = value(cpu, bus, op);
    cpu.a |= v;
    cpu.update_zn(cpu.a);
}

pub(crate) fn eor(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = value(cpu, bus, op);
    cpu.a ^= v;
    cpu.update_zn(cpu.a);
}

pub(crate) fn bit(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = value(cpu, bus, op);
    cpu.assign_flag(ZERO, cpu.a & v == 0);
    cpu.assign_flag(OVERFLOW, v & 0x40 != 0);
    cpu.assign_flag(NEGATIVE, v & 0x80 != 0);
}

pub(crate) fn cmp(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = value(cpu, bus, op);
    let reg = cpu.a;
    compare(cpu, reg, v);
}

pub(crate) fn cpx(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = value(cpu, bus, op);
    let reg = cpu.x;
    compare(cpu, reg, v);
}

pub(crate) fn cpy(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = value(cpu, bus, op);
    let reg = cpu.y;
    compare(cpu, reg, v);
}

// ---------------------------------------------------------------------------
// Shifts, rotates, increments
// ---------------------------------------------------------------------------

pub(crate) fn asl(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    modify(cpu, bus, op, shift_left);
}

pub(crate) fn lsr(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    modify(cpu, bus, op, shift_right);
}

pub(crate) fn rol(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    modify(cpu, bus, op, rotate_left);
}

pub(crate) fn ror(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    modify(cpu, bus, op, rotate_right);
}

pub(crate) fn inc(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    modify(cpu, bus, op, increment);
}

pub(crate) fn dec(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    modify(cpu, bus, op, decrement);
}

pub(crate) fn inx(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    let x = cpu.x;
    cpu.x = increment(cpu, x);
}

pub(crate) fn iny(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    let y = cpu.y;
    cpu.y = increment(cpu, y);
}

pub(crate) fn dex(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    let x = cpu.x;
    cpu.x = decrement(cpu, x);
}

pub(crate) fn dey(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    let y = cpu.y;
    cpu.y = decrement(cpu, y);
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

pub(crate) fn clc(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    cpu.assign_flag(CARRY, false);
}

pub(crate) fn sec(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    cpu.assign_flag(CARRY, true);
}

pub(crate) fn cli(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    cpu.assign_flag(IRQ_DISABLE, false);
}

pub(crate) fn sei(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    cpu.assign_flag(IRQ_DISABLE, true);
}

pub(crate) fn cld(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    cpu.assign_flag(DECIMAL, false);
}

pub(crate) fn sed(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    cpu.assign_flag(DECIMAL, true);
}

pub(crate) fn clv(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    cpu.assign_flag(OVERFLOW, false);
}

// ---------------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------------

pub(crate) fn bpl(cpu: &mut CpuState, _: &mut Bus, op: Operand) {
    branch_on(cpu, op, NEGATIVE, false);
}

pub(crate) fn bmi(cpu: &mut CpuState, _: &mut Bus, op: Operand) {
    branch_on(cpu, op, NEGATIVE, true);
}

pub(crate) fn bvc(cpu: &mut CpuState, _: &mut Bus, op: Operand) {
    branch_on(cpu, op, OVERFLOW, false);
}

pub(crate) fn bvs(cpu: &mut CpuState, _: &mut Bus, op: Operand) {
    branch_on(cpu, op, OVERFLOW, true);
}

pub(crate) fn bcc(cpu: &mut CpuState, _: &mut Bus, op: Operand) {
    branch_on(cpu, op, CARRY, false);
}

pub(crate) fn bcs(cpu: &mut CpuState, _: &mut Bus, op: Operand) {
    branch_on(cpu, op, CARRY, true);
}

pub(crate) fn bne(cpu: &mut CpuState, _: &mut Bus, op: Operand) {
    branch_on(cpu, op, ZERO, false);
}

pub(crate) fn beq(cpu: &mut CpuState, _: &mut Bus, op: Operand) {
    branch_on(cpu, op, ZERO, true);
}

// ---------------------------------------------------------------------------
// Jumps, subroutines, interrupts
// ---------------------------------------------------------------------------

pub(crate) fn jmp(cpu: &mut CpuState, _: &mut Bus, op: Operand) {
    cpu.pc = address(op);
}

pub(crate) fn jsr(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let ret = cpu.pc.wrapping_sub(1);
    cpu.push_word(bus, ret);
    cpu.pc = address(op);
}

pub(crate) fn rts(cpu: &mut CpuState, bus: &mut Bus, _: Operand) {
    cpu.pc = cpu.pop_word(bus).wrapping_add(1);
}

pub(crate) fn rti(cpu: &mut CpuState, bus: &mut Bus, _: Operand) {
    let p = cpu.pop(bus);
    cpu.set_status_from_stack(p);
    cpu.pc = cpu.pop_word(bus);
}

/// BRK: push PC+2 (skipping the padding byte) and P with B set.
pub(crate) fn brk(cpu: &mut CpuState, bus: &mut Bus, _: Operand) {
    let ret = cpu.pc.wrapping_add(1);
    cpu.push_word(bus, ret);
    let p = cpu.status_for_push(true);
    cpu.push(bus, p);
    cpu.assign_flag(IRQ_DISABLE, true);
    cpu.pc = bus.read_word(IRQ_VECTOR);
}

pub(crate) fn nop(_: &mut CpuState, bus: &mut Bus, op: Operand) {
    // addressed NOP variants still perform their read
    if let Operand::Address { addr, .. } = op {
        let _ = bus.read(addr);
    }
}

pub(crate) fn jam(cpu: &mut CpuState, _: &mut Bus, _: Operand) {
    cpu.pc = cpu.pc.wrapping_sub(1);
    cpu.halted = true;
}

// ---------------------------------------------------------------------------
// Undocumented
// ---------------------------------------------------------------------------

pub(crate) fn lax(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = value(cpu, bus, op);
    cpu.a = v;
    cpu.x = v;
    cpu.update_zn(v);
}

pub(crate) fn sax(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    bus.write(address(op), cpu.a & cpu.x);
}

pub(crate) fn las(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = value(cpu, bus, op) & cpu.sp;
    cpu.a = v;
    cpu.x = v;
    cpu.sp = v;
    cpu.update_zn(v);
}

pub(crate) fn slo(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = modify(cpu, bus, op, shift_left);
    cpu.a |= v;
    cpu.update_zn(cpu.a);
}

pub(crate) fn rla(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = modify(cpu, bus, op, rotate_left);
    cpu.a &= v;
    cpu.update_zn(cpu.a);
}

pub(crate) fn sre(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = modify(cpu, bus, op, shift_right);
    cpu.a ^= v;
    cpu.update_zn(cpu.a);
}

pub(crate) fn rra(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = modify(cpu, bus, op, rotate_right);
    add_with_carry(cpu, v);
}

pub(crate) fn dcp(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = modify(cpu, bus, op, |_, v| v.wrapping_sub(1));
    let a = cpu.a;
    compare(cpu, a, v);
}

pub(crate) fn isc(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = modify(cpu, bus, op, |_, v| v.wrapping_add(1));
    subtract_with_borrow(cpu, v);
}

pub(crate) fn anc(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = cpu.a & value(cpu, bus, op);
    cpu.a = v;
    cpu.update_zn(v);
    cpu.assign_flag(CARRY, v & 0x80 != 0);
}

pub(crate) fn alr(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = cpu.a & value(cpu, bus, op);
    cpu.a = shift_right(cpu, v);
}

pub(crate) fn arr(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = cpu.a & value(cpu, bus, op);
    let r = (v >> 1) | ((cpu.is_flag_set(CARRY) as u8) << 7);
    cpu.a = r;
    cpu.update_zn(r);
    cpu.assign_flag(CARRY, r & 0x40 != 0);
    cpu.assign_flag(OVERFLOW, ((r >> 6) ^ (r >> 5)) & 0x01 != 0);
}

pub(crate) fn axs(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = value(cpu, bus, op);
    let t = cpu.a & cpu.x;
    cpu.assign_flag(CARRY, t >= v);
    cpu.x = t.wrapping_sub(v);
    cpu.update_zn(cpu.x);
}

pub(crate) fn xaa(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = value(cpu, bus, op);
    cpu.a = (cpu.a | MAGIC) & cpu.x & v;
    cpu.update_zn(cpu.a);
}

pub(crate) fn lxa(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    let v = (cpu.a | MAGIC) & value(cpu, bus, op);
    cpu.a = v;
    cpu.x = v;
    cpu.update_zn(v);
}

/// Store `v & (base_high + 1)`; a page crossing redirects the write to that page.
fn store_and_high(bus: &mut Bus, op: Operand, index: u8, v: u8) {
    if let Operand::Address { addr, crossed } = op {
        let base_high = (addr.wrapping_sub(index as u16) >> 8) as u8;
        let stored = v & base_high.wrapping_add(1);
        let target = if crossed {
            ((stored as u16) << 8) | (addr & 0x00FF)
        } else {
            addr
        };
        bus.write(target, stored);
    }
}

pub(crate) fn sha(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    store_and_high(bus, op, cpu.y, cpu.a & cpu.x);
}

pub(crate) fn shx(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    store_and_high(bus, op, cpu.y, cpu.x);
}

pub(crate) fn shy(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    store_and_high(bus, op, cpu.x, cpu.y);
}

pub(crate) fn tas(cpu: &mut CpuState, bus: &mut Bus, op: Operand) {
    cpu.sp = cpu.a & cpu.x;
    store_and_high(bus, op, cpu.y, cpu.sp);
}
