//! Loads and stores: immediate/register/pair/literal addressing, exclusive
//! and ordered accesses, and the LSE atomic read-modify-write family.
//!
//! Each addressing shape has its own method (`ldr_imm`, `ldur`, `ldr_pre`,
//! ...); the [`MemOperand`] facade on [`Assembler::ldr`]/[`Assembler::str`]
//! dispatches over the shapes for callers holding a symbolic address.

use crate::args::{
    AtomicRMWOp, ExtendOp, MemOperand, MemOrder, OperandSize, PrefetchOp, ScalarSize,
};
use crate::buffer::{Label, LabelUse};
use crate::imms::{SImm7Scaled, SImm9, UImm12Scaled};
use crate::inst::{
    enc_cas, enc_ldst_excl, enc_ldst_imm19, enc_ldst_ord, enc_ldst_pair, enc_ldst_reg,
    enc_ldst_simm9, enc_ldst_uimm12, enc_lse,
};
use crate::regs::{Reg, VReg};
use crate::result::{EmitError, EmitResult};
use crate::Assembler;

/// Group bits 31..22 for the unsigned-offset forms: `size 111 V 01 opc`.
fn ldst_op_uimm(size: u32, v: u32, opc: u32) -> u32 {
    size << 8 | 0b111 << 5 | v << 4 | 0b01 << 2 | opc
}

/// Group bits 31..22 for the unscaled/pre/post/register forms:
/// `size 111 V 00 opc`.
fn ldst_op_simm(size: u32, v: u32, opc: u32) -> u32 {
    size << 8 | 0b111 << 5 | v << 4 | opc
}

fn gp_size(size: OperandSize) -> ScalarSize {
    match size {
        OperandSize::Size32 => ScalarSize::Size32,
        OperandSize::Size64 => ScalarSize::Size64,
    }
}

/// The (size, opc) pair for a plain vector load or store.
fn vec_ldst_bits(size: ScalarSize, load: bool) -> (u32, u32) {
    let l = load as u32;
    match size {
        ScalarSize::Size128 => (0b00, 0b10 | l),
        _ => (size.enc_size(), l),
    }
}

fn ldst_ext_bits(mnemonic: &'static str, ext: ExtendOp) -> EmitResult<u32> {
    match ext {
        ExtendOp::Uxtw | ExtendOp::Uxtx | ExtendOp::Sxtw | ExtendOp::Sxtx => Ok(ext.bits()),
        _ => Err(EmitError::InvalidOperand(mnemonic)),
    }
}

fn narrow_size(mnemonic: &'static str, size: ScalarSize) -> EmitResult<ScalarSize> {
    match size {
        ScalarSize::Size128 => Err(EmitError::Unallocated(mnemonic)),
        s => Ok(s),
    }
}

impl Assembler {
    fn ldst_uimm(
        &mut self,
        mnemonic: &'static str,
        op_31_22: u32,
        scale: ScalarSize,
        rn: Reg,
        rt: u32,
        offset: i64,
    ) -> EmitResult<()> {
        let uimm12 = UImm12Scaled::maybe_from_i64(offset, scale).ok_or(
            EmitError::ImmOutOfRange {
                mnemonic,
                value: offset as u64,
            },
        )?;
        self.emit(enc_ldst_uimm12(op_31_22, uimm12, rn, rt))
    }

    fn ldst_simm9(
        &mut self,
        mnemonic: &'static str,
        op_31_22: u32,
        op_11_10: u32,
        rn: Reg,
        rt: u32,
        offset: i64,
    ) -> EmitResult<()> {
        let simm9 = SImm9::maybe_from_i64(offset).ok_or(EmitError::ImmOutOfRange {
            mnemonic,
            value: offset as u64,
        })?;
        self.emit(enc_ldst_simm9(op_31_22, simm9, op_11_10, rn, rt))
    }

    // GP unsigned-offset forms.

    /// `ldr rt, [rn, #offset]` with an access-size-scaled unsigned offset.
    pub fn ldr_imm(&mut self, size: OperandSize, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = ldst_op_uimm(gp_size(size).enc_size(), 0, 0b01);
        self.ldst_uimm("ldr", op, gp_size(size), rn, rt.enc(), offset)
    }

    /// `str rt, [rn, #offset]`.
    pub fn str_imm(&mut self, size: OperandSize, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = ldst_op_uimm(gp_size(size).enc_size(), 0, 0b00);
        self.ldst_uimm("str", op, gp_size(size), rn, rt.enc(), offset)
    }

    /// `ldrb wt, [rn, #offset]`.
    pub fn ldrb_imm(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_uimm("ldrb", ldst_op_uimm(0b00, 0, 0b01), ScalarSize::Size8, rn, rt.enc(), offset)
    }

    /// `strb wt, [rn, #offset]`.
    pub fn strb_imm(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_uimm("strb", ldst_op_uimm(0b00, 0, 0b00), ScalarSize::Size8, rn, rt.enc(), offset)
    }

    /// `ldrh wt, [rn, #offset]`.
    pub fn ldrh_imm(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_uimm("ldrh", ldst_op_uimm(0b01, 0, 0b01), ScalarSize::Size16, rn, rt.enc(), offset)
    }

    /// `strh wt, [rn, #offset]`.
    pub fn strh_imm(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_uimm("strh", ldst_op_uimm(0b01, 0, 0b00), ScalarSize::Size16, rn, rt.enc(), offset)
    }

    /// `ldrsb rt, [rn, #offset]`: load a byte and sign-extend to `size`.
    pub fn ldrsb_imm(&mut self, size: OperandSize, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = ldst_op_uimm(0b00, 0, Self::sext_opc(size));
        self.ldst_uimm("ldrsb", op, ScalarSize::Size8, rn, rt.enc(), offset)
    }

    /// `ldrsh rt, [rn, #offset]`: load a halfword and sign-extend to `size`.
    pub fn ldrsh_imm(&mut self, size: OperandSize, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = ldst_op_uimm(0b01, 0, Self::sext_opc(size));
        self.ldst_uimm("ldrsh", op, ScalarSize::Size16, rn, rt.enc(), offset)
    }

    /// `ldrsw xt, [rn, #offset]`: load a word and sign-extend to 64 bits.
    pub fn ldrsw_imm(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_uimm("ldrsw", ldst_op_uimm(0b10, 0, 0b10), ScalarSize::Size32, rn, rt.enc(), offset)
    }

    /// `prfm <op>, [rn, #offset]`: prefetch hint. The hint occupies the `rt`
    /// slot of a 64-bit unsigned-offset load.
    pub fn prfm(&mut self, op: PrefetchOp, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_uimm("prfm", ldst_op_uimm(0b11, 0, 0b10), ScalarSize::Size64, rn, op.bits(), offset)
    }

    // GP unscaled forms.

    /// `ldur rt, [rn, #simm9]`: load with an unscaled signed offset.
    pub fn ldur(&mut self, size: OperandSize, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = ldst_op_simm(gp_size(size).enc_size(), 0, 0b01);
        self.ldst_simm9("ldur", op, 0b00, rn, rt.enc(), offset)
    }

    /// `stur rt, [rn, #simm9]`.
    pub fn stur(&mut self, size: OperandSize, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = ldst_op_simm(gp_size(size).enc_size(), 0, 0b00);
        self.ldst_simm9("stur", op, 0b00, rn, rt.enc(), offset)
    }

    /// `ldurb wt, [rn, #simm9]`.
    pub fn ldurb(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_simm9("ldurb", ldst_op_simm(0b00, 0, 0b01), 0b00, rn, rt.enc(), offset)
    }

    /// `sturb wt, [rn, #simm9]`.
    pub fn sturb(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_simm9("sturb", ldst_op_simm(0b00, 0, 0b00), 0b00, rn, rt.enc(), offset)
    }

    /// `ldurh wt, [rn, #simm9]`.
    pub fn ldurh(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_simm9("ldurh", ldst_op_simm(0b01, 0, 0b01), 0b00, rn, rt.enc(), offset)
    }

    /// `sturh wt, [rn, #simm9]`.
    pub fn sturh(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_simm9("sturh", ldst_op_simm(0b01, 0, 0b00), 0b00, rn, rt.enc(), offset)
    }

    /// `ldursb rt, [rn, #simm9]`.
    pub fn ldursb(&mut self, size: OperandSize, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = ldst_op_simm(0b00, 0, Self::sext_opc(size));
        self.ldst_simm9("ldursb", op, 0b00, rn, rt.enc(), offset)
    }

    /// `ldursh rt, [rn, #simm9]`.
    pub fn ldursh(&mut self, size: OperandSize, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = ldst_op_simm(0b01, 0, Self::sext_opc(size));
        self.ldst_simm9("ldursh", op, 0b00, rn, rt.enc(), offset)
    }

    /// `ldursw xt, [rn, #simm9]`.
    pub fn ldursw(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_simm9("ldursw", ldst_op_simm(0b10, 0, 0b10), 0b00, rn, rt.enc(), offset)
    }

    // GP writeback forms.

    /// `ldr rt, [rn, #simm9]!`: pre-indexed with writeback.
    pub fn ldr_pre(&mut self, size: OperandSize, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = ldst_op_simm(gp_size(size).enc_size(), 0, 0b01);
        self.ldst_simm9("ldr", op, 0b11, rn, rt.enc(), offset)
    }

    /// `ldr rt, [rn], #simm9`: post-indexed with writeback.
    pub fn ldr_post(&mut self, size: OperandSize, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = ldst_op_simm(gp_size(size).enc_size(), 0, 0b01);
        self.ldst_simm9("ldr", op, 0b01, rn, rt.enc(), offset)
    }

    /// `str rt, [rn, #simm9]!`.
    pub fn str_pre(&mut self, size: OperandSize, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = ldst_op_simm(gp_size(size).enc_size(), 0, 0b00);
        self.ldst_simm9("str", op, 0b11, rn, rt.enc(), offset)
    }

    /// `str rt, [rn], #simm9`.
    pub fn str_post(&mut self, size: OperandSize, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = ldst_op_simm(gp_size(size).enc_size(), 0, 0b00);
        self.ldst_simm9("str", op, 0b01, rn, rt.enc(), offset)
    }

    /// `ldrb wt, [rn, #simm9]!`.
    pub fn ldrb_pre(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_simm9("ldrb", ldst_op_simm(0b00, 0, 0b01), 0b11, rn, rt.enc(), offset)
    }

    /// `ldrb wt, [rn], #simm9`.
    pub fn ldrb_post(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_simm9("ldrb", ldst_op_simm(0b00, 0, 0b01), 0b01, rn, rt.enc(), offset)
    }

    /// `strb wt, [rn, #simm9]!`.
    pub fn strb_pre(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_simm9("strb", ldst_op_simm(0b00, 0, 0b00), 0b11, rn, rt.enc(), offset)
    }

    /// `strb wt, [rn], #simm9`.
    pub fn strb_post(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_simm9("strb", ldst_op_simm(0b00, 0, 0b00), 0b01, rn, rt.enc(), offset)
    }

    /// `ldrh wt, [rn, #simm9]!`.
    pub fn ldrh_pre(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_simm9("ldrh", ldst_op_simm(0b01, 0, 0b01), 0b11, rn, rt.enc(), offset)
    }

    /// `ldrh wt, [rn], #simm9`.
    pub fn ldrh_post(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_simm9("ldrh", ldst_op_simm(0b01, 0, 0b01), 0b01, rn, rt.enc(), offset)
    }

    /// `strh wt, [rn, #simm9]!`.
    pub fn strh_pre(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_simm9("strh", ldst_op_simm(0b01, 0, 0b00), 0b11, rn, rt.enc(), offset)
    }

    /// `strh wt, [rn], #simm9`.
    pub fn strh_post(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_simm9("strh", ldst_op_simm(0b01, 0, 0b00), 0b01, rn, rt.enc(), offset)
    }

    fn sext_opc(size: OperandSize) -> u32 {
        match size {
            OperandSize::Size64 => 0b10,
            OperandSize::Size32 => 0b11,
        }
    }

    /// `ldrsb rt, [rn, #simm9]!`.
    pub fn ldrsb_pre(&mut self, size: OperandSize, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = ldst_op_simm(0b00, 0, Self::sext_opc(size));
        self.ldst_simm9("ldrsb", op, 0b11, rn, rt.enc(), offset)
    }

    /// `ldrsb rt, [rn], #simm9`.
    pub fn ldrsb_post(&mut self, size: OperandSize, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = ldst_op_simm(0b00, 0, Self::sext_opc(size));
        self.ldst_simm9("ldrsb", op, 0b01, rn, rt.enc(), offset)
    }

    /// `ldrsh rt, [rn, #simm9]!`.
    pub fn ldrsh_pre(&mut self, size: OperandSize, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = ldst_op_simm(0b01, 0, Self::sext_opc(size));
        self.ldst_simm9("ldrsh", op, 0b11, rn, rt.enc(), offset)
    }

    /// `ldrsh rt, [rn], #simm9`.
    pub fn ldrsh_post(&mut self, size: OperandSize, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = ldst_op_simm(0b01, 0, Self::sext_opc(size));
        self.ldst_simm9("ldrsh", op, 0b01, rn, rt.enc(), offset)
    }

    /// `ldrsw xt, [rn, #simm9]!`.
    pub fn ldrsw_pre(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_simm9("ldrsw", ldst_op_simm(0b10, 0, 0b10), 0b11, rn, rt.enc(), offset)
    }

    /// `ldrsw xt, [rn], #simm9`.
    pub fn ldrsw_post(&mut self, rt: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.ldst_simm9("ldrsw", ldst_op_simm(0b10, 0, 0b10), 0b01, rn, rt.enc(), offset)
    }

    // GP register-offset forms.

    /// `ldr rt, [rn, rm, <ext> ...]`. Legal extends are `uxtw`, `lsl`
    /// (`uxtx`), `sxtw`, and `sxtx`; `scaled` applies a shift by the access
    /// size.
    pub fn ldr_reg(
        &mut self,
        size: OperandSize,
        rt: Reg,
        rn: Reg,
        rm: Reg,
        ext: ExtendOp,
        scaled: bool,
    ) -> EmitResult<()> {
        let op = ldst_op_simm(gp_size(size).enc_size(), 0, 0b01);
        let ext = ldst_ext_bits("ldr", ext)?;
        self.emit(enc_ldst_reg(op, rn, rm, scaled, ext, rt.enc()))
    }

    /// `str rt, [rn, rm, <ext> ...]`.
    pub fn str_reg(
        &mut self,
        size: OperandSize,
        rt: Reg,
        rn: Reg,
        rm: Reg,
        ext: ExtendOp,
        scaled: bool,
    ) -> EmitResult<()> {
        let op = ldst_op_simm(gp_size(size).enc_size(), 0, 0b00);
        let ext = ldst_ext_bits("str", ext)?;
        self.emit(enc_ldst_reg(op, rn, rm, scaled, ext, rt.enc()))
    }

    /// `ldrb wt, [rn, rm, <ext> ...]`.
    pub fn ldrb_reg(&mut self, rt: Reg, rn: Reg, rm: Reg, ext: ExtendOp) -> EmitResult<()> {
        let ext = ldst_ext_bits("ldrb", ext)?;
        self.emit(enc_ldst_reg(ldst_op_simm(0b00, 0, 0b01), rn, rm, false, ext, rt.enc()))
    }

    /// `strb wt, [rn, rm, <ext> ...]`.
    pub fn strb_reg(&mut self, rt: Reg, rn: Reg, rm: Reg, ext: ExtendOp) -> EmitResult<()> {
        let ext = ldst_ext_bits("strb", ext)?;
        self.emit(enc_ldst_reg(ldst_op_simm(0b00, 0, 0b00), rn, rm, false, ext, rt.enc()))
    }

    /// `ldrh wt, [rn, rm, <ext> ...]`.
    pub fn ldrh_reg(&mut self, rt: Reg, rn: Reg, rm: Reg, ext: ExtendOp, scaled: bool) -> EmitResult<()> {
        let ext = ldst_ext_bits("ldrh", ext)?;
        self.emit(enc_ldst_reg(ldst_op_simm(0b01, 0, 0b01), rn, rm, scaled, ext, rt.enc()))
    }

    /// `strh wt, [rn, rm, <ext> ...]`.
    pub fn strh_reg(&mut self, rt: Reg, rn: Reg, rm: Reg, ext: ExtendOp, scaled: bool) -> EmitResult<()> {
        let ext = ldst_ext_bits("strh", ext)?;
        self.emit(enc_ldst_reg(ldst_op_simm(0b01, 0, 0b00), rn, rm, scaled, ext, rt.enc()))
    }

    /// `ldrsb rt, [rn, rm, <ext> ...]`.
    pub fn ldrsb_reg(
        &mut self,
        size: OperandSize,
        rt: Reg,
        rn: Reg,
        rm: Reg,
        ext: ExtendOp,
    ) -> EmitResult<()> {
        let op = ldst_op_simm(0b00, 0, Self::sext_opc(size));
        let ext = ldst_ext_bits("ldrsb", ext)?;
        self.emit(enc_ldst_reg(op, rn, rm, false, ext, rt.enc()))
    }

    /// `ldrsh rt, [rn, rm, <ext> ...]`.
    pub fn ldrsh_reg(
        &mut self,
        size: OperandSize,
        rt: Reg,
        rn: Reg,
        rm: Reg,
        ext: ExtendOp,
        scaled: bool,
    ) -> EmitResult<()> {
        let op = ldst_op_simm(0b01, 0, Self::sext_opc(size));
        let ext = ldst_ext_bits("ldrsh", ext)?;
        self.emit(enc_ldst_reg(op, rn, rm, scaled, ext, rt.enc()))
    }

    /// `ldrsw xt, [rn, rm, <ext> ...]`.
    pub fn ldrsw_reg(
        &mut self,
        rt: Reg,
        rn: Reg,
        rm: Reg,
        ext: ExtendOp,
        scaled: bool,
    ) -> EmitResult<()> {
        let ext = ldst_ext_bits("ldrsw", ext)?;
        self.emit(enc_ldst_reg(ldst_op_simm(0b10, 0, 0b10), rn, rm, scaled, ext, rt.enc()))
    }

    // Pairs.

    fn gp_pair_op(size: OperandSize, load: bool, mode: u32) -> u32 {
        let opc = match size {
            OperandSize::Size32 => 0b00,
            OperandSize::Size64 => 0b10,
        };
        opc << 8 | 0b101 << 5 | mode << 1 | load as u32
    }

    /// `ldp rt, rt2, [rn, #offset]`.
    pub fn ldp(&mut self, size: OperandSize, rt: Reg, rt2: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.pair("ldp", Self::gp_pair_op(size, true, 0b010), gp_size(size), rt.enc(), rt2.enc(), rn, offset)
    }

    /// `stp rt, rt2, [rn, #offset]`.
    pub fn stp(&mut self, size: OperandSize, rt: Reg, rt2: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.pair("stp", Self::gp_pair_op(size, false, 0b010), gp_size(size), rt.enc(), rt2.enc(), rn, offset)
    }

    /// `ldp rt, rt2, [rn, #offset]!`.
    pub fn ldp_pre(&mut self, size: OperandSize, rt: Reg, rt2: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.pair("ldp", Self::gp_pair_op(size, true, 0b011), gp_size(size), rt.enc(), rt2.enc(), rn, offset)
    }

    /// `ldp rt, rt2, [rn], #offset`.
    pub fn ldp_post(&mut self, size: OperandSize, rt: Reg, rt2: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.pair("ldp", Self::gp_pair_op(size, true, 0b001), gp_size(size), rt.enc(), rt2.enc(), rn, offset)
    }

    /// `stp rt, rt2, [rn, #offset]!`.
    pub fn stp_pre(&mut self, size: OperandSize, rt: Reg, rt2: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.pair("stp", Self::gp_pair_op(size, false, 0b011), gp_size(size), rt.enc(), rt2.enc(), rn, offset)
    }

    /// `stp rt, rt2, [rn], #offset`.
    pub fn stp_post(&mut self, size: OperandSize, rt: Reg, rt2: Reg, rn: Reg, offset: i64) -> EmitResult<()> {
        self.pair("stp", Self::gp_pair_op(size, false, 0b001), gp_size(size), rt.enc(), rt2.enc(), rn, offset)
    }

    fn pair(
        &mut self,
        mnemonic: &'static str,
        op_31_22: u32,
        scale: ScalarSize,
        rt: u32,
        rt2: u32,
        rn: Reg,
        offset: i64,
    ) -> EmitResult<()> {
        let simm7 = SImm7Scaled::maybe_from_i64(offset, scale).ok_or(EmitError::ImmOutOfRange {
            mnemonic,
            value: offset as u64,
        })?;
        self.emit(enc_ldst_pair(op_31_22, simm7, rn, rt, rt2))
    }

    fn vec_pair_op(size: ScalarSize, load: bool) -> EmitResult<u32> {
        let opc = match size {
            ScalarSize::Size32 => 0b00,
            ScalarSize::Size64 => 0b01,
            ScalarSize::Size128 => 0b10,
            _ => return Err(EmitError::Unallocated(if load { "ldp" } else { "stp" })),
        };
        Ok(opc << 8 | 0b101 << 5 | 1 << 4 | 0b010 << 1 | load as u32)
    }

    /// `ldp <vt>, <vt2>, [rn, #offset]` for S/D/Q registers.
    pub fn ldp_vec(&mut self, size: ScalarSize, vt: VReg, vt2: VReg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = Self::vec_pair_op(size, true)?;
        self.pair("ldp", op, size, vt.enc(), vt2.enc(), rn, offset)
    }

    /// `stp <vt>, <vt2>, [rn, #offset]` for S/D/Q registers.
    pub fn stp_vec(&mut self, size: ScalarSize, vt: VReg, vt2: VReg, rn: Reg, offset: i64) -> EmitResult<()> {
        let op = Self::vec_pair_op(size, false)?;
        self.pair("stp", op, size, vt.enc(), vt2.enc(), rn, offset)
    }

    // Literals.

    /// `ldr rt, <label>`: pc-relative load, +/- 1MiB.
    pub fn ldr_literal(&mut self, size: OperandSize, rt: Reg, label: Label) -> EmitResult<()> {
        let opc = match size {
            OperandSize::Size32 => 0b00,
            OperandSize::Size64 => 0b01,
        };
        self.emit_with_label(enc_ldst_imm19(opc << 6 | 0b011000, rt.enc()), label, LabelUse::Ldr19)
    }

    /// `ldr <vt>, <label>` for S/D/Q registers.
    pub fn ldr_literal_vec(&mut self, size: ScalarSize, vt: VReg, label: Label) -> EmitResult<()> {
        let opc = match size {
            ScalarSize::Size32 => 0b00,
            ScalarSize::Size64 => 0b01,
            ScalarSize::Size128 => 0b10,
            _ => return Err(EmitError::Unallocated("ldr")),
        };
        self.emit_with_label(
            enc_ldst_imm19(opc << 6 | 0b011100, vt.enc()),
            label,
            LabelUse::Ldr19,
        )
    }

    // SIMD/FP loads and stores.

    /// `ldr <vt>, [rn, #offset]` for B/H/S/D/Q registers.
    pub fn ldr_imm_vec(&mut self, size: ScalarSize, vt: VReg, rn: Reg, offset: i64) -> EmitResult<()> {
        let (sz, opc) = vec_ldst_bits(size, true);
        self.ldst_uimm("ldr", ldst_op_uimm(sz, 1, opc), size, rn, vt.enc(), offset)
    }

    /// `str <vt>, [rn, #offset]`.
    pub fn str_imm_vec(&mut self, size: ScalarSize, vt: VReg, rn: Reg, offset: i64) -> EmitResult<()> {
        let (sz, opc) = vec_ldst_bits(size, false);
        self.ldst_uimm("str", ldst_op_uimm(sz, 1, opc), size, rn, vt.enc(), offset)
    }

    /// `ldur <vt>, [rn, #simm9]`.
    pub fn ldur_vec(&mut self, size: ScalarSize, vt: VReg, rn: Reg, offset: i64) -> EmitResult<()> {
        let (sz, opc) = vec_ldst_bits(size, true);
        self.ldst_simm9("ldur", ldst_op_simm(sz, 1, opc), 0b00, rn, vt.enc(), offset)
    }

    /// `stur <vt>, [rn, #simm9]`.
    pub fn stur_vec(&mut self, size: ScalarSize, vt: VReg, rn: Reg, offset: i64) -> EmitResult<()> {
        let (sz, opc) = vec_ldst_bits(size, false);
        self.ldst_simm9("stur", ldst_op_simm(sz, 1, opc), 0b00, rn, vt.enc(), offset)
    }

    /// `ldr <vt>, [rn, #simm9]!`.
    pub fn ldr_pre_vec(&mut self, size: ScalarSize, vt: VReg, rn: Reg, offset: i64) -> EmitResult<()> {
        let (sz, opc) = vec_ldst_bits(size, true);
        self.ldst_simm9("ldr", ldst_op_simm(sz, 1, opc), 0b11, rn, vt.enc(), offset)
    }

    /// `ldr <vt>, [rn], #simm9`.
    pub fn ldr_post_vec(&mut self, size: ScalarSize, vt: VReg, rn: Reg, offset: i64) -> EmitResult<()> {
        let (sz, opc) = vec_ldst_bits(size, true);
        self.ldst_simm9("ldr", ldst_op_simm(sz, 1, opc), 0b01, rn, vt.enc(), offset)
    }

    /// `str <vt>, [rn, #simm9]!`.
    pub fn str_pre_vec(&mut self, size: ScalarSize, vt: VReg, rn: Reg, offset: i64) -> EmitResult<()> {
        let (sz, opc) = vec_ldst_bits(size, false);
        self.ldst_simm9("str", ldst_op_simm(sz, 1, opc), 0b11, rn, vt.enc(), offset)
    }

    /// `str <vt>, [rn], #simm9`.
    pub fn str_post_vec(&mut self, size: ScalarSize, vt: VReg, rn: Reg, offset: i64) -> EmitResult<()> {
        let (sz, opc) = vec_ldst_bits(size, false);
        self.ldst_simm9("str", ldst_op_simm(sz, 1, opc), 0b01, rn, vt.enc(), offset)
    }

    /// `ldr <vt>, [rn, rm, <ext> ...]`.
    pub fn ldr_reg_vec(
        &mut self,
        size: ScalarSize,
        vt: VReg,
        rn: Reg,
        rm: Reg,
        ext: ExtendOp,
        scaled: bool,
    ) -> EmitResult<()> {
        let (sz, opc) = vec_ldst_bits(size, true);
        let ext = ldst_ext_bits("ldr", ext)?;
        self.emit(enc_ldst_reg(ldst_op_simm(sz, 1, opc), rn, rm, scaled, ext, vt.enc()))
    }

    /// `str <vt>, [rn, rm, <ext> ...]`.
    pub fn str_reg_vec(
        &mut self,
        size: ScalarSize,
        vt: VReg,
        rn: Reg,
        rm: Reg,
        ext: ExtendOp,
        scaled: bool,
    ) -> EmitResult<()> {
        let (sz, opc) = vec_ldst_bits(size, false);
        let ext = ldst_ext_bits("str", ext)?;
        self.emit(enc_ldst_reg(ldst_op_simm(sz, 1, opc), rn, rm, scaled, ext, vt.enc()))
    }

    // Addressing-mode facade.

    /// `ldr rt, <mem>`: dispatch over a [`MemOperand`].
    pub fn ldr(&mut self, size: OperandSize, rt: Reg, mem: MemOperand) -> EmitResult<()> {
        match mem {
            MemOperand::UnsignedOffset { rn, imm } => self.ldr_imm(size, rt, rn, i64::from(imm)),
            MemOperand::Unscaled { rn, simm9 } => self.ldur(size, rt, rn, i64::from(simm9)),
            MemOperand::PreIndexed { rn, simm9 } => self.ldr_pre(size, rt, rn, i64::from(simm9)),
            MemOperand::PostIndexed { rn, simm9 } => self.ldr_post(size, rt, rn, i64::from(simm9)),
            MemOperand::RegExtended { rn, rm, ext, scaled } => {
                self.ldr_reg(size, rt, rn, rm, ext, scaled)
            }
        }
    }

    /// `str rt, <mem>`: dispatch over a [`MemOperand`].
    pub fn str(&mut self, size: OperandSize, rt: Reg, mem: MemOperand) -> EmitResult<()> {
        match mem {
            MemOperand::UnsignedOffset { rn, imm } => self.str_imm(size, rt, rn, i64::from(imm)),
            MemOperand::Unscaled { rn, simm9 } => self.stur(size, rt, rn, i64::from(simm9)),
            MemOperand::PreIndexed { rn, simm9 } => self.str_pre(size, rt, rn, i64::from(simm9)),
            MemOperand::PostIndexed { rn, simm9 } => self.str_post(size, rt, rn, i64::from(simm9)),
            MemOperand::RegExtended { rn, rm, ext, scaled } => {
                self.str_reg(size, rt, rn, rm, ext, scaled)
            }
        }
    }

    // Exclusive and ordered accesses. Sizes 8/16/32/64 only.

    /// `ldxr rt, [rn]`: load exclusive.
    pub fn ldxr(&mut self, size: ScalarSize, rt: Reg, rn: Reg) -> EmitResult<()> {
        let size = narrow_size("ldxr", size)?;
        self.emit(enc_ldst_excl(size, 1, 0, 0b11111, rn, rt.enc()))
    }

    /// `ldaxr rt, [rn]`: load-acquire exclusive.
    pub fn ldaxr(&mut self, size: ScalarSize, rt: Reg, rn: Reg) -> EmitResult<()> {
        let size = narrow_size("ldaxr", size)?;
        self.emit(enc_ldst_excl(size, 1, 1, 0b11111, rn, rt.enc()))
    }

    /// `stxr ws, rt, [rn]`: store exclusive, status in `rs`.
    pub fn stxr(&mut self, size: ScalarSize, rs: Reg, rt: Reg, rn: Reg) -> EmitResult<()> {
        let size = narrow_size("stxr", size)?;
        self.emit(enc_ldst_excl(size, 0, 0, rs.enc(), rn, rt.enc()))
    }

    /// `stlxr ws, rt, [rn]`: store-release exclusive.
    pub fn stlxr(&mut self, size: ScalarSize, rs: Reg, rt: Reg, rn: Reg) -> EmitResult<()> {
        let size = narrow_size("stlxr", size)?;
        self.emit(enc_ldst_excl(size, 0, 1, rs.enc(), rn, rt.enc()))
    }

    /// `ldar rt, [rn]`: load-acquire.
    pub fn ldar(&mut self, size: ScalarSize, rt: Reg, rn: Reg) -> EmitResult<()> {
        let size = narrow_size("ldar", size)?;
        self.emit(enc_ldst_ord(size, 1, 1, 0b11111, 0b11111, rn, rt.enc()))
    }

    /// `stlr rt, [rn]`: store-release.
    pub fn stlr(&mut self, size: ScalarSize, rt: Reg, rn: Reg) -> EmitResult<()> {
        let size = narrow_size("stlr", size)?;
        self.emit(enc_ldst_ord(size, 0, 1, 0b11111, 0b11111, rn, rt.enc()))
    }

    /// `ldlar rt, [rn]`: load LORAcquire.
    pub fn ldlar(&mut self, size: ScalarSize, rt: Reg, rn: Reg) -> EmitResult<()> {
        let size = narrow_size("ldlar", size)?;
        self.emit(enc_ldst_ord(size, 1, 0, 0b11111, 0b11111, rn, rt.enc()))
    }

    /// `stllr rt, [rn]`: store LORelease.
    pub fn stllr(&mut self, size: ScalarSize, rt: Reg, rn: Reg) -> EmitResult<()> {
        let size = narrow_size("stllr", size)?;
        self.emit(enc_ldst_ord(size, 0, 0, 0b11111, 0b11111, rn, rt.enc()))
    }

    // LSE atomics.

    /// The `ldadd`/`ldclr`/.../`swp` family: atomically read-modify-write
    /// `[rn]` with operand `rs`, old value to `rt`.
    pub fn atomic_rmw(
        &mut self,
        op: AtomicRMWOp,
        order: MemOrder,
        size: ScalarSize,
        rs: Reg,
        rt: Reg,
        rn: Reg,
    ) -> EmitResult<()> {
        let size = narrow_size("atomic rmw", size)?;
        let (a, r) = order.bits();
        let (opc, o3) = match op {
            AtomicRMWOp::Add => (0b000, 0),
            AtomicRMWOp::Clr => (0b001, 0),
            AtomicRMWOp::Eor => (0b010, 0),
            AtomicRMWOp::Set => (0b011, 0),
            AtomicRMWOp::Smax => (0b100, 0),
            AtomicRMWOp::Smin => (0b101, 0),
            AtomicRMWOp::Umax => (0b110, 0),
            AtomicRMWOp::Umin => (0b111, 0),
            AtomicRMWOp::Swp => (0b000, 1),
        };
        self.emit(enc_lse(size, a, r, rs, opc, o3, rn, rt))
    }

    /// `cas rs, rt, [rn]`: compare-and-swap, expected value and result in
    /// `rs`, replacement in `rt`.
    pub fn cas(&mut self, order: MemOrder, size: ScalarSize, rs: Reg, rt: Reg, rn: Reg) -> EmitResult<()> {
        let size = narrow_size("cas", size)?;
        let (a, r) = order.bits();
        self.emit(enc_cas(size, a, r, rs, rn, rt))
    }

    /// `casp rs, r(s+1), rt, r(t+1), [rn]`: compare-and-swap a register pair.
    /// `rs` and `rt` name the even register of each pair.
    pub fn casp(&mut self, order: MemOrder, size: OperandSize, rs: Reg, rt: Reg, rn: Reg) -> EmitResult<()> {
        if rs.enc() % 2 != 0 || rt.enc() % 2 != 0 {
            return Err(EmitError::InvalidOperand("casp"));
        }
        let sf = match size {
            OperandSize::Size32 => 0,
            OperandSize::Size64 => 1,
        };
        let (a, r) = order.bits();
        self.emit(
            sf << 30
                | 0b001000 << 24
                | a << 22
                | 1 << 21
                | rs.enc() << 16
                | r << 15
                | 0b11111 << 10
                | rn.enc() << 5
                | rt.enc(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::emit1;
    use crate::args::OperandSize::{Size32, Size64};
    use crate::*;

    #[test]
    fn unsigned_offset() {
        assert_eq!(emit1(|a| a.ldr_imm(Size64, xreg(1), xreg(2), 0)), 0xf9400041); // ldr x1, [x2]
        assert_eq!(emit1(|a| a.ldr_imm(Size64, xreg(1), xreg(2), 32760)), 0xf97ffc41); // ldr x1, [x2, #32760]
        assert_eq!(emit1(|a| a.ldr_imm(Size32, xreg(1), stack_reg(), 4)), 0xb94007e1); // ldr w1, [sp, #4]
        assert_eq!(emit1(|a| a.str_imm(Size64, xreg(1), xreg(2), 8)), 0xf9000441); // str x1, [x2, #8]
        assert_eq!(emit1(|a| a.str_imm(Size32, xreg(1), xreg(2), 4)), 0xb9000441); // str w1, [x2, #4]
        assert_eq!(emit1(|a| a.ldrb_imm(xreg(1), xreg(2), 1)), 0x39400441); // ldrb w1, [x2, #1]
        assert_eq!(emit1(|a| a.strb_imm(xreg(1), xreg(2), 4095)), 0x393ffc41); // strb w1, [x2, #4095]
        assert_eq!(emit1(|a| a.ldrh_imm(xreg(1), xreg(2), 2)), 0x79400441); // ldrh w1, [x2, #2]
        assert_eq!(emit1(|a| a.strh_imm(xreg(1), xreg(2), 8190)), 0x793ffc41); // strh w1, [x2, #8190]
        assert_eq!(emit1(|a| a.ldrsb_imm(Size64, xreg(1), xreg(2), 3)), 0x39800c41); // ldrsb x1, [x2, #3]
        assert_eq!(emit1(|a| a.ldrsb_imm(Size32, xreg(1), xreg(2), 3)), 0x39c00c41); // ldrsb w1, [x2, #3]
        assert_eq!(emit1(|a| a.ldrsh_imm(Size64, xreg(1), xreg(2), 6)), 0x79800c41); // ldrsh x1, [x2, #6]
        assert_eq!(emit1(|a| a.ldrsh_imm(Size32, xreg(1), xreg(2), 6)), 0x79c00c41); // ldrsh w1, [x2, #6]
        assert_eq!(emit1(|a| a.ldrsw_imm(xreg(1), xreg(2), 4)), 0xb9800441); // ldrsw x1, [x2, #4]
    }

    #[test]
    fn prefetch() {
        assert_eq!(
            emit1(|a| a.prfm(PrefetchOp::PldL1Keep, xreg(1), 8)),
            0xf9800420 // prfm pldl1keep, [x1, #8]
        );
        assert_eq!(
            emit1(|a| a.prfm(PrefetchOp::PstL2Strm, xreg(2), 0)),
            0xf9800053 // prfm pstl2strm, [x2]
        );
    }

    #[test]
    fn unsigned_offset_rejects_bad_offsets() {
        let mut asm = Assembler::new(16);
        // Misaligned.
        assert!(asm.ldr_imm(Size64, xreg(1), xreg(2), 4).is_err());
        // Past the scaled range.
        assert!(asm.ldr_imm(Size64, xreg(1), xreg(2), 32768).is_err());
        // Negative offsets take the unscaled form instead.
        assert!(asm.str_imm(Size32, xreg(1), xreg(2), -4).is_err());
        assert_eq!(asm.cur_offset(), 0);
    }

    #[test]
    fn unscaled_offset() {
        assert_eq!(emit1(|a| a.ldur(Size64, xreg(1), xreg(2), -256)), 0xf8500041); // ldur x1, [x2, #-256]
        assert_eq!(emit1(|a| a.ldur(Size32, xreg(1), xreg(2), 255)), 0xb84ff041); // ldur w1, [x2, #255]
        assert_eq!(emit1(|a| a.stur(Size64, xreg(1), xreg(2), -1)), 0xf81ff041); // stur x1, [x2, #-1]
        assert_eq!(emit1(|a| a.sturb(xreg(1), xreg(2), 7)), 0x38007041); // sturb w1, [x2, #7]
        assert_eq!(emit1(|a| a.ldurh(xreg(1), xreg(2), -8)), 0x785f8041); // ldurh w1, [x2, #-8]
        assert_eq!(emit1(|a| a.ldursb(Size64, xreg(1), xreg(2), 2)), 0x38802041); // ldursb x1, [x2, #2]
        assert_eq!(emit1(|a| a.ldursh(Size32, xreg(1), xreg(2), 2)), 0x78c02041); // ldursh w1, [x2, #2]
        assert_eq!(emit1(|a| a.ldursw(xreg(1), xreg(2), 2)), 0xb8802041); // ldursw x1, [x2, #2]
        let mut asm = Assembler::new(16);
        assert!(asm.ldur(Size64, xreg(1), xreg(2), 256).is_err());
        assert!(asm.stur(Size64, xreg(1), xreg(2), -257).is_err());
    }

    #[test]
    fn writeback() {
        assert_eq!(emit1(|a| a.ldr_pre(Size64, xreg(1), xreg(2), 16)), 0xf8410c41); // ldr x1, [x2, #16]!
        assert_eq!(emit1(|a| a.ldr_post(Size64, xreg(1), xreg(2), 16)), 0xf8410441); // ldr x1, [x2], #16
        assert_eq!(emit1(|a| a.str_pre(Size32, xreg(1), xreg(2), -16)), 0xb81f0c41); // str w1, [x2, #-16]!
        assert_eq!(emit1(|a| a.str_post(Size64, xreg(1), xreg(2), -16)), 0xf81f0441); // str x1, [x2], #-16
        assert_eq!(emit1(|a| a.ldrb_pre(xreg(1), xreg(2), 4)), 0x38404c41); // ldrb w1, [x2, #4]!
        assert_eq!(emit1(|a| a.ldrb_post(xreg(1), xreg(2), -4)), 0x385fc441); // ldrb w1, [x2], #-4
        assert_eq!(emit1(|a| a.strb_pre(xreg(1), xreg(2), 4)), 0x38004c41); // strb w1, [x2, #4]!
        assert_eq!(emit1(|a| a.strb_post(xreg(1), xreg(2), -4)), 0x381fc441); // strb w1, [x2], #-4
        assert_eq!(emit1(|a| a.ldrh_pre(xreg(1), xreg(2), 8)), 0x78408c41); // ldrh w1, [x2, #8]!
        assert_eq!(emit1(|a| a.ldrh_post(xreg(1), xreg(2), 8)), 0x78408441); // ldrh w1, [x2], #8
        assert_eq!(emit1(|a| a.strh_pre(xreg(1), xreg(2), 8)), 0x78008c41); // strh w1, [x2, #8]!
        assert_eq!(emit1(|a| a.strh_post(xreg(1), xreg(2), 8)), 0x78008441); // strh w1, [x2], #8
        assert_eq!(emit1(|a| a.ldrsb_pre(Size32, xreg(1), xreg(2), 4)), 0x38c04c41); // ldrsb w1, [x2, #4]!
        assert_eq!(emit1(|a| a.ldrsb_post(Size64, xreg(1), xreg(2), 4)), 0x38804441); // ldrsb x1, [x2], #4
        assert_eq!(emit1(|a| a.ldrsh_pre(Size32, xreg(1), xreg(2), 4)), 0x78c04c41); // ldrsh w1, [x2, #4]!
        assert_eq!(emit1(|a| a.ldrsh_post(Size64, xreg(1), xreg(2), 4)), 0x78804441); // ldrsh x1, [x2], #4
        assert_eq!(emit1(|a| a.ldrsw_pre(xreg(1), xreg(2), 4)), 0xb8804c41); // ldrsw x1, [x2, #4]!
        assert_eq!(emit1(|a| a.ldrsw_post(xreg(1), xreg(2), 4)), 0xb8804441); // ldrsw x1, [x2], #4
    }

    #[test]
    fn register_offset() {
        assert_eq!(
            emit1(|a| a.ldr_reg(Size64, xreg(1), xreg(2), xreg(3), ExtendOp::Uxtx, false)),
            0xf8636841 // ldr x1, [x2, x3]
        );
        assert_eq!(
            emit1(|a| a.ldr_reg(Size64, xreg(1), xreg(2), xreg(3), ExtendOp::Uxtx, true)),
            0xf8637841 // ldr x1, [x2, x3, lsl #3]
        );
        assert_eq!(
            emit1(|a| a.ldr_reg(Size32, xreg(1), xreg(2), xreg(3), ExtendOp::Uxtw, true)),
            0xb8635841 // ldr w1, [x2, w3, uxtw #2]
        );
        assert_eq!(
            emit1(|a| a.str_reg(Size64, xreg(1), xreg(2), xreg(3), ExtendOp::Sxtw, false)),
            0xf823c841 // str x1, [x2, w3, sxtw]
        );
        assert_eq!(
            emit1(|a| a.ldrb_reg(xreg(1), xreg(2), xreg(3), ExtendOp::Uxtx)),
            0x38636841 // ldrb w1, [x2, x3]
        );
        assert_eq!(
            emit1(|a| a.strb_reg(xreg(1), xreg(2), xreg(3), ExtendOp::Uxtw)),
            0x38234841 // strb w1, [x2, w3, uxtw]
        );
        assert_eq!(
            emit1(|a| a.ldrh_reg(xreg(1), xreg(2), xreg(3), ExtendOp::Uxtx, true)),
            0x78637841 // ldrh w1, [x2, x3, lsl #1]
        );
        assert_eq!(
            emit1(|a| a.strh_reg(xreg(1), xreg(2), xreg(3), ExtendOp::Uxtx, false)),
            0x78236841 // strh w1, [x2, x3]
        );
        assert_eq!(
            emit1(|a| a.ldrsb_reg(Size32, xreg(1), xreg(2), xreg(3), ExtendOp::Uxtx)),
            0x38e36841 // ldrsb w1, [x2, x3]
        );
        assert_eq!(
            emit1(|a| a.ldrsb_reg(Size64, xreg(1), xreg(2), xreg(3), ExtendOp::Sxtw)),
            0x38a3c841 // ldrsb x1, [x2, w3, sxtw]
        );
        assert_eq!(
            emit1(|a| a.ldrsh_reg(Size32, xreg(1), xreg(2), xreg(3), ExtendOp::Uxtx, true)),
            0x78e37841 // ldrsh w1, [x2, x3, lsl #1]
        );
        assert_eq!(
            emit1(|a| a.ldrsh_reg(Size64, xreg(1), xreg(2), xreg(3), ExtendOp::Uxtx, false)),
            0x78a36841 // ldrsh x1, [x2, x3]
        );
        assert_eq!(
            emit1(|a| a.ldrsw_reg(xreg(1), xreg(2), xreg(3), ExtendOp::Uxtx, true)),
            0xb8a37841 // ldrsw x1, [x2, x3, lsl #2]
        );
        assert_eq!(
            emit1(|a| a.ldrsw_reg(xreg(1), xreg(2), xreg(3), ExtendOp::Uxtw, false)),
            0xb8a34841 // ldrsw x1, [x2, w3, uxtw]
        );
        // Byte-extending operators never address memory.
        let mut asm = Assembler::new(16);
        assert_eq!(
            asm.ldr_reg(Size64, xreg(1), xreg(2), xreg(3), ExtendOp::Uxtb, false),
            Err(EmitError::InvalidOperand("ldr"))
        );
    }

    #[test]
    fn pairs() {
        assert_eq!(emit1(|a| a.ldp(Size64, xreg(1), xreg(2), xreg(3), 0)), 0xa9400861); // ldp x1, x2, [x3]
        assert_eq!(emit1(|a| a.ldp(Size64, xreg(1), xreg(2), xreg(3), -512)), 0xa9600861); // ldp x1, x2, [x3, #-512]
        assert_eq!(emit1(|a| a.ldp(Size32, xreg(1), xreg(2), xreg(3), 8)), 0x29410861); // ldp w1, w2, [x3, #8]
        assert_eq!(emit1(|a| a.stp(Size64, xreg(1), xreg(2), xreg(3), 504)), 0xa91f8861); // stp x1, x2, [x3, #504]
        assert_eq!(emit1(|a| a.ldp_pre(Size64, xreg(1), xreg(2), xreg(3), 16)), 0xa9c10861); // ldp x1, x2, [x3, #16]!
        assert_eq!(emit1(|a| a.ldp_post(Size64, xreg(1), xreg(2), xreg(3), 16)), 0xa8c10861); // ldp x1, x2, [x3], #16
        assert_eq!(emit1(|a| a.stp_pre(Size64, xreg(1), xreg(2), xreg(3), -16)), 0xa9bf0861); // stp x1, x2, [x3, #-16]!
        assert_eq!(emit1(|a| a.stp_post(Size64, xreg(1), xreg(2), xreg(3), 32)), 0xa8820861); // stp x1, x2, [x3], #32
        let mut asm = Assembler::new(16);
        assert!(asm.ldp(Size64, xreg(1), xreg(2), xreg(3), 512).is_err());
        assert!(asm.stp(Size64, xreg(1), xreg(2), xreg(3), 12).is_err());
    }

    #[test]
    fn vector_loads_stores() {
        use ScalarSize::*;
        assert_eq!(emit1(|a| a.ldr_imm_vec(Size128, vreg(1), xreg(2), 32)), 0x3dc00841); // ldr q1, [x2, #32]
        assert_eq!(emit1(|a| a.ldr_imm_vec(Size64, vreg(1), xreg(2), 8)), 0xfd400441); // ldr d1, [x2, #8]
        assert_eq!(emit1(|a| a.ldr_imm_vec(Size32, vreg(1), xreg(2), 4)), 0xbd400441); // ldr s1, [x2, #4]
        assert_eq!(emit1(|a| a.ldr_imm_vec(Size16, vreg(1), xreg(2), 2)), 0x7d400441); // ldr h1, [x2, #2]
        assert_eq!(emit1(|a| a.ldr_imm_vec(Size8, vreg(1), xreg(2), 1)), 0x3d400441); // ldr b1, [x2, #1]
        assert_eq!(emit1(|a| a.str_imm_vec(Size128, vreg(1), xreg(2), 65520)), 0x3dbffc41); // str q1, [x2, #65520]
        assert_eq!(emit1(|a| a.str_imm_vec(Size64, vreg(1), xreg(2), 0)), 0xfd000041); // str d1, [x2]
        assert_eq!(emit1(|a| a.ldur_vec(Size128, vreg(1), xreg(2), -5)), 0x3cdfb041); // ldur q1, [x2, #-5]
        assert_eq!(emit1(|a| a.stur_vec(Size64, vreg(1), xreg(2), 255)), 0xfc0ff041); // stur d1, [x2, #255]
        assert_eq!(emit1(|a| a.ldr_pre_vec(Size128, vreg(1), xreg(2), 16)), 0x3cc10c41); // ldr q1, [x2, #16]!
        assert_eq!(emit1(|a| a.str_post_vec(Size64, vreg(1), xreg(2), -8)), 0xfc1f8441); // str d1, [x2], #-8
        assert_eq!(
            emit1(|a| a.ldr_reg_vec(Size128, vreg(1), xreg(2), xreg(3), ExtendOp::Uxtx, false)),
            0x3ce36841 // ldr q1, [x2, x3]
        );
        assert_eq!(
            emit1(|a| a.ldr_reg_vec(Size64, vreg(1), xreg(2), xreg(3), ExtendOp::Uxtx, true)),
            0xfc637841 // ldr d1, [x2, x3, lsl #3]
        );
        assert_eq!(
            emit1(|a| a.str_reg_vec(Size32, vreg(1), xreg(2), xreg(3), ExtendOp::Uxtw, true)),
            0xbc235841 // str s1, [x2, w3, uxtw #2]
        );
        assert_eq!(emit1(|a| a.ldp_vec(Size128, vreg(1), vreg(2), xreg(3), 32)), 0xad410861); // ldp q1, q2, [x3, #32]
        assert_eq!(emit1(|a| a.ldp_vec(Size64, vreg(1), vreg(2), xreg(3), -8)), 0x6d7f8861); // ldp d1, d2, [x3, #-8]
        assert_eq!(emit1(|a| a.stp_vec(Size32, vreg(1), vreg(2), xreg(3), 4)), 0x2d008861); // stp s1, s2, [x3, #4]
        let mut asm = Assembler::new(16);
        assert_eq!(
            asm.ldp_vec(Size16, vreg(1), vreg(2), xreg(3), 0),
            Err(EmitError::Unallocated("ldp"))
        );
    }

    #[test]
    fn literals() {
        let mut asm = Assembler::new(64);
        let pool = asm.new_label();
        asm.ldr_literal(Size64, xreg(1), pool).unwrap(); // ldr x1, #16
        asm.ldr_literal(Size32, xreg(2), pool).unwrap(); // ldr w2, #12
        asm.ldr_literal_vec(ScalarSize::Size128, vreg(3), pool).unwrap(); // ldr q3, #8
        asm.ldr_literal_vec(ScalarSize::Size64, vreg(4), pool).unwrap(); // ldr d4, #4
        asm.bind(pool).unwrap();
        let code = asm.finish().unwrap();
        let w: Vec<u32> = code
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(w, vec![0x58000081, 0x18000062, 0x9c000043, 0x5c000024]);
    }

    #[test]
    fn memoperand_facade() {
        assert_eq!(
            emit1(|a| a.ldr(Size64, xreg(1), MemOperand::UnsignedOffset { rn: xreg(2), imm: 8 })),
            0xf9400441 // ldr x1, [x2, #8]
        );
        assert_eq!(
            emit1(|a| a.ldr(Size64, xreg(1), MemOperand::Unscaled { rn: xreg(2), simm9: -256 })),
            0xf8500041 // ldur x1, [x2, #-256]
        );
        assert_eq!(
            emit1(|a| a.str(Size32, xreg(1), MemOperand::PreIndexed { rn: xreg(2), simm9: -16 })),
            0xb81f0c41 // str w1, [x2, #-16]!
        );
        assert_eq!(
            emit1(|a| a.ldr(Size64, xreg(1), MemOperand::PostIndexed { rn: xreg(2), simm9: 16 })),
            0xf8410441 // ldr x1, [x2], #16
        );
        assert_eq!(
            emit1(|a| a.str(Size64, xreg(1), MemOperand::RegExtended {
                rn: xreg(2),
                rm: xreg(3),
                ext: ExtendOp::Sxtw,
                scaled: false,
            })),
            0xf823c841 // str x1, [x2, w3, sxtw]
        );
    }

    #[test]
    fn exclusive_and_ordered() {
        use ScalarSize::*;
        assert_eq!(emit1(|a| a.ldxr(Size64, xreg(1), xreg(2))), 0xc85f7c41); // ldxr x1, [x2]
        assert_eq!(emit1(|a| a.ldxr(Size32, xreg(1), xreg(2))), 0x885f7c41); // ldxr w1, [x2]
        assert_eq!(emit1(|a| a.ldxr(Size8, xreg(1), xreg(2))), 0x085f7c41); // ldxrb w1, [x2]
        assert_eq!(emit1(|a| a.ldxr(Size16, xreg(1), xreg(2))), 0x485f7c41); // ldxrh w1, [x2]
        assert_eq!(emit1(|a| a.ldaxr(Size64, xreg(1), xreg(2))), 0xc85ffc41); // ldaxr x1, [x2]
        assert_eq!(emit1(|a| a.stxr(Size64, xreg(1), xreg(2), xreg(3))), 0xc8017c62); // stxr w1, x2, [x3]
        assert_eq!(emit1(|a| a.stlxr(Size32, xreg(1), xreg(2), xreg(3))), 0x8801fc62); // stlxr w1, w2, [x3]
        assert_eq!(emit1(|a| a.stlxr(Size8, xreg(1), xreg(2), xreg(3))), 0x0801fc62); // stlxrb w1, w2, [x3]
        assert_eq!(emit1(|a| a.ldar(Size64, xreg(1), xreg(2))), 0xc8dffc41); // ldar x1, [x2]
        assert_eq!(emit1(|a| a.ldar(Size8, xreg(1), xreg(2))), 0x08dffc41); // ldarb w1, [x2]
        assert_eq!(emit1(|a| a.stlr(Size32, xreg(1), xreg(2))), 0x889ffc41); // stlr w1, [x2]
        assert_eq!(emit1(|a| a.stlr(Size16, xreg(1), xreg(2))), 0x489ffc41); // stlrh w1, [x2]
        assert_eq!(emit1(|a| a.ldlar(Size64, xreg(1), xreg(2))), 0xc8df7c41); // ldlar x1, [x2]
        assert_eq!(emit1(|a| a.ldlar(Size8, xreg(1), xreg(2))), 0x08df7c41); // ldlarb w1, [x2]
        assert_eq!(emit1(|a| a.stllr(Size64, xreg(1), xreg(2))), 0xc89f7c41); // stllr x1, [x2]
        assert_eq!(emit1(|a| a.stllr(Size16, xreg(1), xreg(2))), 0x489f7c41); // stllrh w1, [x2]
        let mut asm = Assembler::new(16);
        assert_eq!(
            asm.ldxr(Size128, xreg(1), xreg(2)),
            Err(EmitError::Unallocated("ldxr"))
        );
    }

    #[test]
    fn lse_atomics() {
        use AtomicRMWOp::*;
        use MemOrder::*;
        use ScalarSize::*;
        let rmw = |op, order, size| {
            emit1(move |a| a.atomic_rmw(op, order, size, xreg(1), xreg(2), xreg(3)))
        };
        assert_eq!(rmw(Add, Relaxed, Size64), 0xf8210062); // ldadd x1, x2, [x3]
        assert_eq!(rmw(Add, Acquire, Size32), 0xb8a10062); // ldadda w1, w2, [x3]
        assert_eq!(rmw(Add, Release, Size64), 0xf8610062); // ldaddl x1, x2, [x3]
        assert_eq!(rmw(Add, AcqRel, Size64), 0xf8e10062); // ldaddal x1, x2, [x3]
        assert_eq!(rmw(Add, AcqRel, Size8), 0x38e10062); // ldaddalb w1, w2, [x3]
        assert_eq!(rmw(Clr, Relaxed, Size64), 0xf8211062); // ldclr x1, x2, [x3]
        assert_eq!(rmw(Eor, Relaxed, Size64), 0xf8212062); // ldeor x1, x2, [x3]
        assert_eq!(rmw(Set, Relaxed, Size64), 0xf8213062); // ldset x1, x2, [x3]
        assert_eq!(rmw(Smax, Relaxed, Size64), 0xf8214062); // ldsmax x1, x2, [x3]
        assert_eq!(rmw(Smin, Relaxed, Size32), 0xb8215062); // ldsmin w1, w2, [x3]
        assert_eq!(rmw(Umax, Relaxed, Size64), 0xf8216062); // ldumax x1, x2, [x3]
        assert_eq!(rmw(Umin, Relaxed, Size64), 0xf8217062); // ldumin x1, x2, [x3]
        assert_eq!(rmw(Swp, Relaxed, Size64), 0xf8218062); // swp x1, x2, [x3]
        assert_eq!(rmw(Swp, AcqRel, Size32), 0xb8e18062); // swpal w1, w2, [x3]
    }

    #[test]
    fn compare_and_swap() {
        use MemOrder::*;
        use ScalarSize::*;
        let cas = |order, size| emit1(move |a| a.cas(order, size, xreg(1), xreg(2), xreg(3)));
        assert_eq!(cas(Relaxed, Size64), 0xc8a17c62); // cas x1, x2, [x3]
        assert_eq!(cas(Acquire, Size64), 0xc8e17c62); // casa x1, x2, [x3]
        assert_eq!(cas(Release, Size32), 0x88a1fc62); // casl w1, w2, [x3]
        assert_eq!(cas(AcqRel, Size64), 0xc8e1fc62); // casal x1, x2, [x3]
        assert_eq!(cas(AcqRel, Size8), 0x08e1fc62); // casalb w1, w2, [x3]
        assert_eq!(cas(Acquire, Size16), 0x48e17c62); // casah w1, w2, [x3]
    }

    #[test]
    fn compare_and_swap_pair() {
        use MemOrder::*;
        assert_eq!(
            emit1(|a| a.casp(Relaxed, Size32, xreg(0), xreg(2), xreg(4))),
            0x08207c82 // casp w0, w1, w2, w3, [x4]
        );
        assert_eq!(
            emit1(|a| a.casp(Acquire, Size64, xreg(0), xreg(2), xreg(4))),
            0x48607c82 // caspa x0, x1, x2, x3, [x4]
        );
        assert_eq!(
            emit1(|a| a.casp(Release, Size32, xreg(4), xreg(6), xreg(8))),
            0x0824fd06 // caspl w4, w5, w6, w7, [x8]
        );
        assert_eq!(
            emit1(|a| a.casp(AcqRel, Size64, xreg(4), xreg(6), xreg(8))),
            0x4864fd06 // caspal x4, x5, x6, x7, [x8]
        );
        let mut asm = Assembler::new(16);
        assert_eq!(
            asm.casp(Relaxed, Size64, xreg(1), xreg(2), xreg(3)),
            Err(EmitError::InvalidOperand("casp"))
        );
    }
}
