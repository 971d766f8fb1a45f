/*!
table.rs - the 256-entry opcode table.

Each entry is plain data plus a handler function pointer:
- `mnemonic`     : instruction tag (tracing, branch detection)
- `mode`         : addressing mode used to resolve the operand
- `cycles`       : base cost
- `page_penalty` : +1 when an indexed access crosses a page
- `exec`         : handler in `execute.rs`

Branches cost +1 when taken and +1 more when the target is on another page.
Every slot is defined; the twelve JAM opcodes halt the CPU.
*/

use crate::bus::Bus;
use crate::cpu::addressing::{AddrMode, Operand};
use crate::cpu::execute as ex;
use crate::cpu::state::{CARRY, CpuState, NEGATIVE, OVERFLOW, ZERO};

pub type Handler = fn(&mut CpuState, &mut Bus, Operand);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    // undocumented
    Alr, Anc, Arr, Axs, Dcp, Isc, Jam, Las, Lax, Lxa, Rla, Rra, Sax, Sha,
    Shx, Shy, Slo, Sre, Tas, Xaa,
}

impl Mnemonic {
    /// For conditional branches, whether `status` takes the branch.
    pub fn branch_taken(self, status: u8) -> Option<bool> {
        let (flag, set) = match self {
            Mnemonic::Bpl => (NEGATIVE, false),
            Mnemonic::Bmi => (NEGATIVE, true),
            Mnemonic::Bvc => (OVERFLOW, false),
            Mnemonic::Bvs => (OVERFLOW, true),
            Mnemonic::Bcc => (CARRY, false),
            Mnemonic::Bcs => (CARRY, true),
            Mnemonic::Bne => (ZERO, false),
            Mnemonic::Beq => (ZERO, true),
            _ => return None,
        };
        Some((status & flag != 0) == set)
    }

    /// True for opcodes outside the documented 151.
    pub fn is_undocumented(self) -> bool {
        matches!(
            self,
            Mnemonic::Alr
                | Mnemonic::Anc
                | Mnemonic::Arr
                | Mnemonic::Axs
                | Mnemonic::Dcp
                | Mnemonic::Isc
                | Mnemonic::Jam
                | Mnemonic::Las
                | Mnemonic::Lax
                | Mnemonic::Lxa
                | Mnemonic::Rla
                | Mnemonic::Rra
                | Mnemonic::Sax
                | Mnemonic::Sha
                | Mnemonic::Shx
                | Mnemonic::Shy
                | Mnemonic::Slo
                | Mnemonic::Sre
                | Mnemonic::Tas
                | Mnemonic::Xaa
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Opcode {
    pub mnemonic: Mnemonic,
    pub mode: AddrMode,
    pub cycles: u8,
    pub page_penalty: bool,
    pub exec: Handler,
}

impl Opcode {
    /// Total cycles for this instruction given its resolved operand and the
    /// status register at execution time.
    pub fn cost(&self, operand: Operand, status: u8) -> u32 {
        let mut cycles = self.cycles as u32;
        if let Operand::Address { crossed, .. } = operand {
            match self.mnemonic.branch_taken(status) {
                Some(true) => cycles += 1 + crossed as u32,
                Some(false) => {}
                None if self.page_penalty && crossed => cycles += 1,
                None => {}
            }
        }
        cycles
    }

    /// Instruction length in bytes, opcode included.
    pub fn len(&self) -> u16 {
        1 + self.mode.operand_len()
    }
}

const fn op(mnemonic: Mnemonic, mode: AddrMode, cycles: u8, page_penalty: bool, exec: Handler) -> Opcode {
    Opcode {
        mnemonic,
        mode,
        cycles,
        page_penalty,
        exec,
    }
}

pub static OPCODES: [Opcode; 256] = build_table();

#[rustfmt::skip]
const fn build_table() -> [Opcode; 256] {
    use AddrMode::*;
    use Mnemonic::*;
    const P: bool = true;
    const N: bool = false;

    let mut t = [op(Jam, Imp, 2, N, ex::jam); 256];

    // 0x00
    t[0x00] = op(Brk, Imp, 7, N, ex::brk);
    t[0x01] = op(Ora, Izx, 6, N, ex::ora);
    t[0x03] = op(Slo, Izx, 8, N, ex::slo);
    t[0x04] = op(Nop, Zp0, 3, N, ex::nop);
    t[0x05] = op(Ora, Zp0, 3, N, ex::ora);
    t[0x06] = op(Asl, Zp0, 5, N, ex::asl);
    t[0x07] = op(Slo, Zp0, 5, N, ex::slo);
    t[0x08] = op(Php, Imp, 3, N, ex::php);
    t[0x09] = op(Ora, Imm, 2, N, ex::ora);
    t[0x0A] = op(Asl, Acc, 2, N, ex::asl);
    t[0x0B] = op(Anc, Imm, 2, N, ex::anc);
    t[0x0C] = op(Nop, Abs, 4, N, ex::nop);
    t[0x0D] = op(Ora, Abs, 4, N, ex::ora);
    t[0x0E] = op(Asl, Abs, 6, N, ex::asl);
    t[0x0F] = op(Slo, Abs, 6, N, ex::slo);
    // 0x10
    t[0x10] = op(Bpl, Rel, 2, N, ex::bpl);
    t[0x11] = op(Ora, Izy, 5, P, ex::ora);
    t[0x13] = op(Slo, Izy, 8, N, ex::slo);
    t[0x14] = op(Nop, Zpx, 4, N, ex::nop);
    t[0x15] = op(Ora, Zpx, 4, N, ex::ora);
    t[0x16] = op(Asl, Zpx, 6, N, ex::asl);
    t[0x17] = op(Slo, Zpx, 6, N, ex::slo);
    t[0x18] = op(Clc, Imp, 2, N, ex::clc);
    t[0x19] = op(Ora, Aby, 4, P, ex::ora);
    t[0x1A] = op(Nop, Imp, 2, N, ex::nop);
    t[0x1B] = op(Slo, Aby, 7, N, ex::slo);
    t[0x1C] = op(Nop, Abx, 4, P, ex::nop);
    t[0x1D] = op(Ora, Abx, 4, P, ex::ora);
    t[0x1E] = op(Asl, Abx, 7, N, ex::asl);
    t[0x1F] = op(Slo, Abx, 7, N, ex::slo);
    // 0x20
    t[0x20] = op(Jsr, Abs, 6, N, ex::jsr);
    t[0x21] = op(And, Izx, 6, N, ex::and);
    t[0x23] = op(Rla, Izx, 8, N, ex::rla);
    t[0x24] = op(Bit, Zp0, 3, N, ex::bit);
    t[0x25] = op(And, Zp0, 3, N, ex::and);
    t[0x26] = op(Rol, Zp0, 5, N, ex::rol);
    t[0x27] = op(Rla, Zp0, 5, N, ex::rla);
    t[0x28] = op(Plp, Imp, 4, N, ex::plp);
    t[0x29] = op(And, Imm, 2, N, ex::and);
    t[0x2A] = op(Rol, Acc, 2, N, ex::rol);
    t[0x2B] = op(Anc, Imm, 2, N, ex::anc);
    t[0x2C] = op(Bit, Abs, 4, N, ex::bit);
    t[0x2D] = op(And, Abs, 4, N, ex::and);
    t[0x2E] = op(Rol, Abs, 6, N, ex::rol);
    t[0x2F] = op(Rla, Abs, 6, N, ex::rla);
    // 0x30
    t[0x30] = op(Bmi, Rel, 2, N, ex::bmi);
    t[0x31] = op(And, Izy, 5, P, ex::and);
    t[0x33] = op(Rla, Izy, 8, N, ex::rla);
    t[0x34] = op(Nop, Zpx, 4, N, ex::nop);
    t[0x35] = op(And, Zpx, 4, N, ex::and);
    t[0x36] = op(Rol, Zpx, 6, N, ex::rol);
    t[0x37] = op(Rla, Zpx, 6, N, ex::rla);
    t[0x38] = op(Sec, Imp, 2, N, ex::sec);
    t[0x39] = op(And, Aby, 4, P, ex::and);
    t[0x3A] = op(Nop, Imp, 2, N, ex::nop);
    t[0x3B] = op(Rla, Aby, 7, N, ex::rla);
    t[0x3C] = op(Nop, Abx, 4, P, ex::nop);
    t[0x3D] = op(And, Abx, 4, P, ex::and);
    t[0x3E] = op(Rol, Abx, 7, N, ex::rol);
    t[0x3F] = op(Rla, Abx, 7, N, ex::rla);
    // 0x40
    t[0x40] = op(Rti, Imp, 6, N, ex::rti);
    t[0x41] = op(Eor, Izx, 6, N, ex::eor);
    t[0x43] = op(Sre, Izx, 8, N, ex::sre);
    t[0x44] = op(Nop, Zp0, 3, N, ex::nop);
    t[0x45] = op(Eor, Zp0, 3, N, ex::eor);
    t[0x46] = op(Lsr, Zp0, 5, N, ex::lsr);
    t[0x47] = op(Sre, Zp0, 5, N, ex::sre);
    t[0x48] = op(Pha, Imp, 3, N, ex::pha);
    t[0x49] = op(Eor, Imm, 2, N, ex::eor);
    t[0x4A] = op(Lsr, Acc, 2, N, ex::lsr);
    t[0x4B] = op(Alr, Imm, 2, N, ex::alr);
    t[0x4C] = op(Jmp, Abs, 3, N, ex::jmp);
    t[0x4D] = op(Eor, Abs, 4, N, ex::eor);
    t[0x4E] = op(Lsr, Abs, 6, N, ex::lsr);
    t[0x4F] = op(Sre, Abs, 6, N, ex::sre);
    // 0x50
    t[0x50] = op(Bvc, Rel, 2, N, ex::bvc);
    t[0x51] = op(Eor, Izy, 5, P, ex::eor);
    t[0x53] = op(Sre, Izy, 8, N, ex::sre);
    t[0x54] = op(Nop, Zpx, 4, N, ex::nop);
    t[0x55] = op(Eor, Zpx, 4, N, ex::eor);
    t[0x56] = op(Lsr, Zpx, 6, N, ex::lsr);
    t[0x57] = op(Sre, Zpx, 6, N, ex::sre);
    t[0x58] = op(Cli, Imp, 2, N, ex::cli);
    t[0x59] = op(Eor, Aby, 4, P, ex::eor);
    t[0x5A] = op(Nop, Imp, 2, N, ex::nop);
    t[0x5B] = op(Sre, Aby, 7, N, ex::sre);
    t[0x5C] = op(Nop, Abx, 4, P, ex::nop);
    t[0x5D] = op(Eor, Abx, 4, P, ex::eor);
    t[0x5E] = op(Lsr, Abx, 7, N, ex::lsr);
    t[0x5F] = op(Sre, Abx, 7, N, ex::sre);
    // 0x60
    t[0x60] = op(Rts, Imp, 6, N, ex::rts);
    t[0x61] = op(Adc, Izx, 6, N, ex::adc);
    t[0x63] = op(Rra, Izx, 8, N, ex::rra);
    t[0x64] = op(Nop, Zp0, 3, N, ex::nop);
    t[0x65] = op(Adc, Zp0, 3, N, ex::adc);
    t[0x66] = op(Ror, Zp0, 5, N, ex::ror);
    t[0x67] = op(Rra, Zp0, 5, N, ex::rra);
    t[0x68] = op(Pla, Imp, 4, N, ex::pla);
    t[0x69] = op(Adc, Imm, 2, N, ex::adc);
    t[0x6A] = op(Ror, Acc, 2, N, ex::ror);
    t[0x6B] = op(Arr, Imm, 2, N, ex::arr);
    t[0x6C] = op(Jmp, Ind, 5, N, ex::jmp);
    t[0x6D] = op(Adc, Abs, 4, N, ex::adc);
    t[0x6E] = op(Ror, Abs, 6, N, ex::ror);
    t[0x6F] = op(Rra, Abs, 6, N, ex::rra);
    // 0x70
    t[0x70] = op(Bvs, Rel, 2, N, ex::bvs);
    t[0x71] = op(Adc, Izy, 5, P, ex::adc);
    t[0x73] = op(Rra, Izy, 8, N, ex::rra);
    t[0x74] = op(Nop, Zpx, 4, N, ex::nop);
    t[0x75] = op(Adc, Zpx, 4, N, ex::adc);
    t[0x76] = op(Ror, Zpx, 6, N, ex::ror);
    t[0x77] = op(Rra, Zpx, 6, N, ex::rra);
    t[0x78] = op(Sei, Imp, 2, N, ex::sei);
    t[0x79] = op(Adc, Aby, 4, P, ex::adc);
    t[0x7A] = op(Nop, Imp, 2, N, ex::nop);
    t[0x7B] = op(Rra, Aby, 7, N, ex::rra);
    t[0x7C] = op(Nop, Abx, 4, P, ex::nop);
    t[0x7D] = op(Adc, Abx, 4, P, ex::adc);
    t[0x7E] = op(Ror, Abx, 7, N, ex::ror);
    t[0x7F] = op(Rra, Abx, 7, N, ex::rra);
    // 0x80
    t[0x80] = op(Nop, Imm, 2, N, ex::nop);
    t[0x81] = op(Sta, Izx, 6, N, ex::sta);
    t[0x82] = op(Nop, Imm, 2, N, ex::nop);
    t[0x83] = op(Sax, Izx, 6, N, ex::sax);
    t[0x84] = op(Sty, Zp0, 3, N, ex::sty);
    t[0x85] = op(Sta, Zp0, 3, N, ex::sta);
    t[0x86] = op(Stx, Zp0, 3, N, ex::stx);
    t[0x87] = op(Sax, Zp0, 3, N, ex::sax);
    t[0x88] = op(Dey, Imp, 2, N, ex::dey);
    t[0x89] = op(Nop, Imm, 2, N, ex::nop);
    t[0x8A] = op(Txa, Imp, 2, N, ex::txa);
    t[0x8B] = op(Xaa, Imm, 2, N, ex::xaa);
    t[0x8C] = op(Sty, Abs, 4, N, ex::sty);
    t[0x8D] = op(Sta, Abs, 4, N, ex::sta);
    t[0x8E] = op(Stx, Abs, 4, N, ex::stx);
    t[0x8F] = op(Sax, Abs, 4, N, ex::sax);
    // 0x90
    t[0x90] = op(Bcc, Rel, 2, N, ex::bcc);
    t[0x91] = op(Sta, Izy, 6, N, ex::sta);
    t[0x93] = op(Sha, Izy, 6, N, ex::sha);
    t[0x94] = op(Sty, Zpx, 4, N, ex::sty);
    t[0x95] = op(Sta, Zpx, 4, N, ex::sta);
    t[0x96] = op(Stx, Zpy, 4, N, ex::stx);
    t[0x97] = op(Sax, Zpy, 4, N, ex::sax);
    t[0x98] = op(Tya, Imp, 2, N, ex::tya);
    t[0x99] = op(Sta, Aby, 5, N, ex::sta);
    t[0x9A] = op(Txs, Imp, 2, N, ex::txs);
    t[0x9B] = op(Tas, Aby, 5, N, ex::tas);
    t[0x9C] = op(Shy, Abx, 5, N, ex::shy);
    t[0x9D] = op(Sta, Abx, 5, N, ex::sta);
    t[0x9E] = op(Shx, Aby, 5, N, ex::shx);
    t[0x9F] = op(Sha, Aby, 5, N, ex::sha);
    // 0xA0
    t[0xA0] = op(Ldy, Imm, 2, N, ex::ldy);
    t[0xA1] = op(Lda, Izx, 6, N, ex::lda);
    t[0xA2] = op(Ldx, Imm, 2, N, ex::ldx);
    t[0xA3] = op(Lax, Izx, 6, N, ex::lax);
    t[0xA4] = op(Ldy, Zp0, 3, N, ex::ldy);
    t[0xA5] = op(Lda, Zp0, 3, N, ex::lda);
    t[0xA6] = op(Ldx, Zp0, 3, N, ex::ldx);
    t[0xA7] = op(Lax, Zp0, 3, N, ex::lax);
    t[0xA8] = op(Tay, Imp, 2, N, ex::tay);
    t[0xA9] = op(Lda, Imm, 2, N, ex::lda);
    t[0xAA] = op(Tax, Imp, 2, N, ex::tax);
    t[0xAB] = op(Lxa, Imm, 2, N, ex::lxa);
    t[0xAC] = op(Ldy, Abs, 4, N, ex::ldy);
    t[0xAD] = op(Lda, Abs, 4, N, ex::lda);
    t[0xAE] = op(Ldx, Abs, 4, N, ex::ldx);
    t[0xAF] = op(Lax, Abs, 4, N, ex::lax);
    // 0xB0
    t[0xB0] = op(Bcs, Rel, 2, N, ex::bcs);
    t[0xB1] = op(Lda, Izy, 5, P, ex::lda);
    t[0xB3] = op(Lax, Izy, 5, P, ex::lax);
    t[0xB4] = op(Ldy, Zpx, 4, N, ex::ldy);
    t[0xB5] = op(Lda, Zpx, 4, N, ex::lda);
    t[0xB6] = op(Ldx, Zpy, 4, N, ex::ldx);
    t[0xB7] = op(Lax, Zpy, 4, N, ex::lax);
    t[0xB8] = op(Clv, Imp, 2, N, ex::clv);
    t[0xB9] = op(Lda, Aby, 4, P, ex::lda);
    t[0xBA] = op(Tsx, Imp, 2, N, ex::tsx);
    t[0xBB] = op(Las, Aby, 4, P, ex::las);
    t[0xBC] = op(Ldy, Abx, 4, P, ex::ldy);
    t[0xBD] = op(Lda, Abx, 4, P, ex::lda);
    t[0xBE] = op(Ldx, Aby, 4, P, ex::ldx);
    t[0xBF] = op(Lax, Aby, 4, P, ex::lax);
    // 0xC0
    t[0xC0] = op(Cpy, Imm, 2, N, ex::cpy);
    t[0xC1] = op(Cmp, Izx, 6, N, ex::cmp);
    t[0xC2] = op(Nop, Imm, 2, N, ex::nop);
    t[0xC3] = op(Dcp, Izx, 8, N, ex::dcp);
    t[0xC4] = op(Cpy, Zp0, 3, N, ex::cpy);
    t[0xC5] = op(Cmp, Zp0, 3, N, ex::cmp);
    t[0xC6] = op(Dec, Zp0, 5, N, ex::dec);
    t[0xC7] = op(Dcp, Zp0, 5, N, ex::dcp);
    t[0xC8] = op(Iny, Imp, 2, N, ex::iny);
    t[0xC9] = op(Cmp, Imm, 2, N, ex::cmp);
    t[0xCA] = op(Dex, Imp, 2, N, ex::dex);
    t[0xCB] = op(Axs, Imm, 2, N, ex::axs);
    t[0xCC] = op(Cpy, Abs, 4, N, ex::cpy);
    t[0xCD] = op(Cmp, Abs, 4, N, ex::cmp);
    t[0xCE] = op(Dec, Abs, 6, N, ex::dec);
    t[0xCF] = op(Dcp, Abs, 6, N, ex::dcp);
    // 0xD0
    t[0xD0] = op(Bne, Rel, 2, N, ex::bne);
    t[0xD1] = op(Cmp, Izy, 5, P, ex::cmp);
    t[0xD3] = op(Dcp, Izy, 8, N, ex::dcp);
    t[0xD4] = op(Nop, Zpx, 4, N, ex::nop);
    t[0xD5] = op(Cmp, Zpx, 4, N, ex::cmp);
    t[0xD6] = op(Dec, Zpx, 6, N, ex::dec);
    t[0xD7] = op(Dcp, Zpx, 6, N, ex::dcp);
    t[0xD8] = op(Cld, Imp, 2, N, ex::cld);
    t[0xD9] = op(Cmp, Aby, 4, P, ex::cmp);
    t[0xDA] = op(Nop, Imp, 2, N, ex::nop);
    t[0xDB] = op(Dcp, Aby, 7, N, ex::dcp);
    t[0xDC] = op(Nop, Abx, 4, P, ex::nop);
    t[0xDD] = op(Cmp, Abx, 4, P, ex::cmp);
    t[0xDE] = op(Dec, Abx, 7, N, ex::dec);
    t[0xDF] = op(Dcp, Abx, 7, N, ex::dcp);
    // 0xE0
    t[0xE0] = op(Cpx, Imm, 2, N, ex::cpx);
    t[0xE1] = op(Sbc, Izx, 6, N, ex::sbc);
    t[0xE2] = op(Nop, Imm, 2, N, ex::nop);
    t[0xE3] = op(Isc, Izx, 8, N, ex::isc);
    t[0xE4] = op(Cpx, Zp0, 3, N, ex::cpx);
    t[0xE5] = op(Sbc, Zp0, 3, N, ex::sbc);
    t[0xE6] = op(Inc, Zp0, 5, N, ex::inc);
    t[0xE7] = op(Isc, Zp0, 5, N, ex::isc);
    t[0xE8] = op(Inx, Imp, 2, N, ex::inx);
    t[0xE9] = op(Sbc, Imm, 2, N, ex::sbc);
    t[0xEA] = op(Nop, Imp, 2, N, ex::nop);
    t[0xEB] = op(Sbc, Imm, 2, N, ex::sbc);
    t[0xEC] = op(Cpx, Abs, 4, N, ex::cpx);
    t[0xED] = op(Sbc, Abs, 4, N, ex::sbc);
    t[0xEE] = op(Inc, Abs, 6, N, ex::inc);
    t[0xEF] = op(Isc, Abs, 6, N, ex::isc);
    // 0xF0
    t[0xF0] = op(Beq, Rel, 2, N, ex::beq);
    t[0xF1] = op(Sbc, Izy, 5, P, ex::sbc);
    t[0xF3] = op(Isc, Izy, 8, N, ex::isc);
    t[0xF4] = op(Nop, Zpx, 4, N, ex::nop);
    t[0xF5] = op(Sbc, Zpx, 4, N, ex::sbc);
    t[0xF6] = op(Inc, Zpx, 6, N, ex::inc);
    t[0xF7] = op(Isc, Zpx, 6, N, ex::isc);
    t[0xF8] = op(Sed, Imp, 2, N, ex::sed);
    t[0xF9] = op(Sbc, Aby, 4, P, ex::sbc);
    t[0xFA] = op(Nop, Imp, 2, N, ex::nop);
    t[0xFB] = op(Isc, Aby, 7, N, ex::isc);
    t[0xFC] = op(Nop, Abx, 4, P, ex::nop);
    t[0xFD] = op(Sbc, Abx, 4, P, ex::sbc);
    t[0xFE] = op(Inc, Abx, 7, N, ex::inc);
    t[0xFF] = op(Isc, Abx, 7, N, ex::isc);

    t
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAMS: [u8; 12] = [0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2];

    #[test]
    fn jam_slots_are_exactly_the_twelve_kil_opcodes() {
        for (code, entry) in OPCODES.iter().enumerate() {
            let is_jam = JAMS.contains(&(code as u8));
            assert_eq!(entry.mnemonic == Mnemonic::Jam, is_jam, "opcode {code:02X}");
        }
    }

    #[test]
    fn documented_opcode_count() {
        let documented = OPCODES.iter().filter(|e| !e.mnemonic.is_undocumented()).count();
        // 151 documented plus the 27 undocumented NOP slots and SBC $EB
        assert_eq!(documented, 151 + 27 + 1);
    }

    #[test]
    fn penalty_only_on_reads_through_indexed_modes() {
        for (code, entry) in OPCODES.iter().enumerate() {
            if entry.page_penalty {
                assert!(
                    matches!(entry.mode, AddrMode::Abx | AddrMode::Aby | AddrMode::Izy),
                    "opcode {code:02X}"
                );
            }
        }
    }

    #[test]
    fn branch_cost_rules() {
        let bne = &OPCODES[0xD0];
        let near = Operand::Address { addr: 0x8010, crossed: false };
        let far = Operand::Address { addr: 0x8110, crossed: true };
        assert_eq!(bne.cost(near, ZERO), 2, "not taken");
        assert_eq!(bne.cost(near, 0), 3, "taken");
        assert_eq!(bne.cost(far, 0), 4, "taken across a page");

        let lda_abx = &OPCODES[0xBD];
        assert_eq!(lda_abx.cost(far, 0), 5);
        let sta_abx = &OPCODES[0x9D];
        assert_eq!(sta_abx.cost(far, 0), 5, "stores never take the penalty");
    }
}
