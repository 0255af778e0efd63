//! Instruction encoders, grouped by family.
//!
//! Each submodule holds an `impl Assembler` block with one method per
//! (mnemonic, operand shape), plus that family's golden-word tests. The word
//! packers shared between families live here; every packer takes the fields
//! an encoding group leaves variable and ors them into the group's fixed
//! bits.

use crate::args::{Cond, OperandSize, ScalarSize};
use crate::imms::{Imm12, ImmLogic, MoveWideConst, SImm7Scaled, SImm9, UImm12Scaled};
use crate::regs::{Reg, VReg};

pub(crate) mod alu;
pub(crate) mod branch;
pub(crate) mod fp;
pub(crate) mod loadstore;
pub(crate) mod system;
pub(crate) mod vector;

pub(crate) fn enc_arith_rrr(bits_31_21: u32, bits_15_10: u32, rd: Reg, rn: Reg, rm: Reg) -> u32 {
    bits_31_21 << 21 | rm.enc() << 16 | bits_15_10 << 10 | rn.enc() << 5 | rd.enc()
}

pub(crate) fn enc_arith_rr_imm12(bits_31_24: u32, imm12: Imm12, rn: Reg, rd: Reg) -> u32 {
    bits_31_24 << 24 | imm12.enc_bits() | rn.enc() << 5 | rd.enc()
}

pub(crate) fn enc_arith_rr_imml(bits_31_23: u32, imml: ImmLogic, rn: Reg, rd: Reg) -> u32 {
    bits_31_23 << 23 | imml.enc_bits() | rn.enc() << 5 | rd.enc()
}

pub(crate) fn enc_arith_rrrr(top11: u32, rm: Reg, bit15: u32, ra: Reg, rn: Reg, rd: Reg) -> u32 {
    top11 << 21 | rm.enc() << 16 | bit15 << 15 | ra.enc() << 10 | rn.enc() << 5 | rd.enc()
}

/// Unconditional branch base word; the 26-bit offset is patched in by the
/// label machinery.
pub(crate) fn enc_jump26(op_31_26: u32) -> u32 {
    op_31_26 << 26
}

/// Compare-and-branch base word (`cbz`/`cbnz`); 19-bit offset patched later.
pub(crate) fn enc_cmpbr(op_31_24: u32, rt: Reg) -> u32 {
    op_31_24 << 24 | rt.enc()
}

/// Conditional branch base word; 19-bit offset patched later.
pub(crate) fn enc_cbr(cond: Cond) -> u32 {
    0b0101010_0 << 24 | cond.bits()
}

/// Test-bit-and-branch base word; 14-bit offset patched later.
pub(crate) fn enc_tbr(op_31_24: u32, bit: u8, rt: Reg) -> u32 {
    op_31_24 << 24 | u32::from(bit & 0b11111) << 19 | u32::from(bit >> 5) << 31 | rt.enc()
}

pub(crate) fn enc_move_wide(opc: u32, size: OperandSize, rd: Reg, imm: MoveWideConst) -> u32 {
    size.sf_bit() << 31
        | opc << 29
        | 0b100101 << 23
        | u32::from(imm.shift) << 21
        | u32::from(imm.bits) << 5
        | rd.enc()
}

pub(crate) fn enc_ldst_pair(op_31_22: u32, simm7: SImm7Scaled, rn: Reg, rt: u32, rt2: u32) -> u32 {
    op_31_22 << 22 | simm7.bits() << 15 | rt2 << 10 | rn.enc() << 5 | rt
}

pub(crate) fn enc_ldst_simm9(op_31_22: u32, simm9: SImm9, op_11_10: u32, rn: Reg, rt: u32) -> u32 {
    op_31_22 << 22 | simm9.bits() << 12 | op_11_10 << 10 | rn.enc() << 5 | rt
}

pub(crate) fn enc_ldst_uimm12(op_31_22: u32, uimm12: UImm12Scaled, rn: Reg, rt: u32) -> u32 {
    op_31_22 << 22 | uimm12.bits() << 10 | rn.enc() << 5 | rt
}

pub(crate) fn enc_ldst_reg(
    op_31_22: u32,
    rn: Reg,
    rm: Reg,
    s_bit: bool,
    extendop: u32,
    rt: u32,
) -> u32 {
    op_31_22 << 22
        | 1 << 21
        | rm.enc() << 16
        | extendop << 13
        | (s_bit as u32) << 12
        | 0b10 << 10
        | rn.enc() << 5
        | rt
}

/// Load-literal base word; 19-bit offset patched later.
pub(crate) fn enc_ldst_imm19(op_31_24: u32, rt: u32) -> u32 {
    op_31_24 << 24 | rt
}

/// One-source bit operations (`rbit`, `rev*`, `clz`, `cls`).
pub(crate) fn enc_bit_rr(size: u32, opcode2: u32, opcode1: u32, rn: Reg, rd: Reg) -> u32 {
    size << 31 | 0b1011010110 << 21 | opcode2 << 16 | opcode1 << 10 | rn.enc() << 5 | rd.enc()
}

pub(crate) fn enc_br(op_24_21: u32, rn: Reg) -> u32 {
    0b1101011 << 25 | op_24_21 << 21 | 0b11111 << 16 | rn.enc() << 5
}

/// `adr`/`adrp` base word; the 21-bit offset is patched in later.
pub(crate) fn enc_adr(op31: u32, rd: Reg) -> u32 {
    op31 << 31 | 0b10000 << 24 | rd.enc()
}

pub(crate) fn enc_csel(
    size: OperandSize,
    op: u32,
    op2: u32,
    rd: Reg,
    rn: Reg,
    rm: Reg,
    cond: Cond,
) -> u32 {
    size.sf_bit() << 31
        | op << 30
        | 0b0011010100 << 21
        | rm.enc() << 16
        | cond.bits() << 12
        | op2 << 10
        | rn.enc() << 5
        | rd.enc()
}

pub(crate) fn enc_ccmp(size: OperandSize, op: u32, rn: Reg, rm_or_imm: u32, imm_form: bool, nzcv: u8, cond: Cond) -> u32 {
    size.sf_bit() << 31
        | op << 30
        | 0b1_11010010 << 21
        | rm_or_imm << 16
        | cond.bits() << 12
        | (imm_form as u32) << 11
        | rn.enc() << 5
        | u32::from(nzcv & 0xf)
}

pub(crate) fn enc_bfm(opc: u32, size: OperandSize, rd: Reg, rn: Reg, immr: u8, imms: u8) -> u32 {
    let n = size.sf_bit();
    size.sf_bit() << 31
        | opc << 29
        | 0b100110 << 23
        | n << 22
        | u32::from(immr) << 16
        | u32::from(imms) << 10
        | rn.enc() << 5
        | rd.enc()
}

pub(crate) fn enc_extr(size: OperandSize, rd: Reg, rn: Reg, rm: Reg, lsb: u8) -> u32 {
    size.sf_bit() << 31
        | 0b00100111 << 23
        | size.sf_bit() << 22
        | rm.enc() << 16
        | u32::from(lsb) << 10
        | rn.enc() << 5
        | rd.enc()
}

// Scalar floating-point packers. `top22` carries everything above the rm
// field, including the ftype.

pub(crate) fn enc_fpurr(top22: u32, rd: VReg, rn: VReg) -> u32 {
    top22 << 10 | rn.enc() << 5 | rd.enc()
}

pub(crate) fn enc_fpurrr(top11: u32, bits_15_10: u32, rd: VReg, rn: VReg, rm: VReg) -> u32 {
    top11 << 21 | rm.enc() << 16 | bits_15_10 << 10 | rn.enc() << 5 | rd.enc()
}

pub(crate) fn enc_fpurrrr(top11: u32, o1: u32, rd: VReg, rn: VReg, rm: VReg, ra: VReg) -> u32 {
    top11 << 21 | rm.enc() << 16 | o1 << 15 | ra.enc() << 10 | rn.enc() << 5 | rd.enc()
}

pub(crate) fn enc_fcmp(ftype: u32, rn: VReg, rm: u32, opcode2: u32) -> u32 {
    0b00011110 << 24 | ftype << 22 | 1 << 21 | rm << 16 | 0b1000 << 10 | rn.enc() << 5 | opcode2
}

/// FP<->integer moves and conversions: sf, ftype, rmode and opcode packed by
/// the caller into `top16`.
pub(crate) fn enc_fp_int(top16: u32, rd: u32, rn: u32) -> u32 {
    top16 << 16 | rn << 5 | rd
}

// ASIMD packers.

pub(crate) fn enc_vec_rrr(q: u32, u: u32, size: u32, bits_15_10: u32, rd: VReg, rn: VReg, rm: VReg) -> u32 {
    q << 30 | u << 29 | 0b01110 << 24 | size << 22 | 1 << 21 | rm.enc() << 16 | bits_15_10 << 10
        | rn.enc() << 5
        | rd.enc()
}

pub(crate) fn enc_vec_rr_misc(q: u32, u: u32, size: u32, opcode: u32, rd: VReg, rn: VReg) -> u32 {
    q << 30 | u << 29 | 0b01110 << 24 | size << 22 | 0b10000 << 17 | opcode << 12 | 0b10 << 10
        | rn.enc() << 5
        | rd.enc()
}

pub(crate) fn enc_vec_lanes(q: u32, u: u32, size: u32, opcode: u32, rd: VReg, rn: VReg) -> u32 {
    q << 30 | u << 29 | 0b01110 << 24 | size << 22 | 0b11000 << 17 | opcode << 12 | 0b10 << 10
        | rn.enc() << 5
        | rd.enc()
}

pub(crate) fn enc_vec_perm(q: u32, size: u32, opcode: u32, rd: VReg, rn: VReg, rm: VReg) -> u32 {
    q << 30 | 0b001110 << 24 | size << 22 | rm.enc() << 16 | opcode << 12 | 0b10 << 10
        | rn.enc() << 5
        | rd.enc()
}

/// The copy group moves between vector lanes and general registers in both
/// directions, so it takes raw register fields.
pub(crate) fn enc_vec_copy(q: u32, op: u32, imm5: u32, imm4: u32, rd: u32, rn: u32) -> u32 {
    q << 30 | op << 29 | 0b01110000 << 21 | imm5 << 16 | imm4 << 11 | 1 << 10 | rn << 5 | rd
}

pub(crate) fn enc_vec_shift_imm(
    q: u32,
    u: u32,
    immh_immb: u32,
    opcode: u32,
    rd: VReg,
    rn: VReg,
) -> u32 {
    q << 30 | u << 29 | 0b011110 << 23 | immh_immb << 16 | opcode << 11 | 1 << 10 | rn.enc() << 5
        | rd.enc()
}

pub(crate) fn enc_tbl(q: u32, len: u32, op: u32, rd: VReg, rn: VReg, rm: VReg) -> u32 {
    q << 30 | 0b001110000 << 21 | rm.enc() << 16 | len << 13 | op << 12 | rn.enc() << 5 | rd.enc()
}

pub(crate) fn enc_asimd_mod_imm(q: u32, op: u32, cmode: u32, imm: u8, rd: VReg) -> u32 {
    let abc = u32::from(imm >> 5);
    let defgh = u32::from(imm & 0b11111);
    q << 30 | op << 29 | 0b0111100000 << 19 | abc << 16 | cmode << 12 | 1 << 10 | defgh << 5
        | rd.enc()
}

// Scalar SIMD three-same / two-misc forms (the `d0, d1, d2` shapes).

pub(crate) fn enc_scalar_rrr(u: u32, size: u32, bits_15_10: u32, rd: VReg, rn: VReg, rm: VReg) -> u32 {
    0b01 << 30 | u << 29 | 0b11110 << 24 | size << 22 | 1 << 21 | rm.enc() << 16 | bits_15_10 << 10
        | rn.enc() << 5
        | rd.enc()
}

pub(crate) fn enc_scalar_rr_misc(u: u32, size: u32, opcode: u32, rd: VReg, rn: VReg) -> u32 {
    0b01 << 30 | u << 29 | 0b11110 << 24 | size << 22 | 0b10000 << 17 | opcode << 12 | 0b10 << 10
        | rn.enc() << 5
        | rd.enc()
}

// Acquire/release, exclusive, and LSE packers.

pub(crate) fn enc_ldst_ord(size: ScalarSize, l: u32, o0: u32, rs: u32, rt2: u32, rn: Reg, rt: u32) -> u32 {
    size.enc_size() << 30 | 0b001000 << 24 | 1 << 23 | l << 22 | rs << 16 | o0 << 15 | rt2 << 10
        | rn.enc() << 5
        | rt
}

pub(crate) fn enc_ldst_excl(size: ScalarSize, l: u32, o0: u32, rs: u32, rn: Reg, rt: u32) -> u32 {
    size.enc_size() << 30 | 0b001000 << 24 | l << 22 | rs << 16 | o0 << 15 | 0b11111 << 10
        | rn.enc() << 5
        | rt
}

pub(crate) fn enc_lse(size: ScalarSize, a: u32, r: u32, rs: Reg, opc: u32, o3: u32, rn: Reg, rt: Reg) -> u32 {
    size.enc_size() << 30 | 0b111000 << 24 | a << 23 | r << 22 | 1 << 21 | rs.enc() << 16
        | o3 << 15
        | opc << 12
        | rn.enc() << 5
        | rt.enc()
}

pub(crate) fn enc_cas(size: ScalarSize, l: u32, o0: u32, rs: Reg, rn: Reg, rt: Reg) -> u32 {
    size.enc_size() << 30 | 0b001000 << 24 | 1 << 23 | l << 22 | 1 << 21 | rs.enc() << 16
        | o0 << 15
        | 0b11111 << 10
        | rn.enc() << 5
        | rt.enc()
}

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::{Assembler, EmitResult};

    /// Run one emission and return the single word it produced. The golden
    /// words in the family tests were cross-checked against llvm-mc.
    pub(crate) fn emit1(f: impl FnOnce(&mut Assembler) -> EmitResult<()>) -> u32 {
        let mut asm = Assembler::new(64);
        f(&mut asm).unwrap();
        let data = asm.finish().unwrap();
        assert_eq!(data.len(), 4);
        u32::from_le_bytes([data[0], data[1], data[2], data[3]])
    }
}
