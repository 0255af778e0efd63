//! Scalar floating-point instructions, FP<->integer conversions, and the
//! scalar forms of the SIMD integer ops.
//!
//! Scalar FP width is a [`ScalarSize`] restricted to the three float sizes
//! (H/S/D); anything else is an unallocated encoding and is rejected.

use crate::args::{Cond, OperandSize, ScalarSize};
use crate::imms::ASIMDFPImm;
use crate::inst::{
    enc_fcmp, enc_fp_int, enc_fpurr, enc_fpurrr, enc_fpurrrr, enc_scalar_rr_misc, enc_scalar_rrr,
};
use crate::regs::{Reg, VReg};
use crate::result::{EmitError, EmitResult};
use crate::Assembler;

fn ftype(mnemonic: &'static str, size: ScalarSize) -> EmitResult<u32> {
    size.ftype().ok_or(EmitError::Unallocated(mnemonic))
}

/// Bits 31..10 of the one-source scalar FP group.
fn fp_1src(ftype: u32, opcode: u32) -> u32 {
    0b00011110 << 14 | ftype << 12 | 1 << 11 | opcode << 5 | 0b10000
}

/// Bits 31..21 of the two- and three-source scalar FP groups.
fn fp_top11(group: u32, ftype: u32, low: u32) -> u32 {
    group << 3 | ftype << 1 | low
}

/// Require the 64-bit form of a scalar SIMD op that has no narrower ones.
fn d_only(mnemonic: &'static str, size: ScalarSize) -> EmitResult<()> {
    if size == ScalarSize::Size64 {
        Ok(())
    } else {
        Err(EmitError::Unallocated(mnemonic))
    }
}

fn scalar_int_size(mnemonic: &'static str, size: ScalarSize) -> EmitResult<u32> {
    match size {
        ScalarSize::Size128 => Err(EmitError::Unallocated(mnemonic)),
        s => Ok(s.enc_size()),
    }
}

/// The `sz` bit of the scalar SIMD float ops (S or D only).
fn float_sz(mnemonic: &'static str, size: ScalarSize) -> EmitResult<u32> {
    match size {
        ScalarSize::Size32 => Ok(0),
        ScalarSize::Size64 => Ok(1),
        _ => Err(EmitError::Unallocated(mnemonic)),
    }
}

impl Assembler {
    fn fpu_rr(&mut self, mnemonic: &'static str, size: ScalarSize, opcode: u32, vd: VReg, vn: VReg) -> EmitResult<()> {
        let ft = ftype(mnemonic, size)?;
        self.emit(enc_fpurr(fp_1src(ft, opcode), vd, vn))
    }

    fn fpu_rrr(
        &mut self,
        mnemonic: &'static str,
        size: ScalarSize,
        opcode: u32,
        vd: VReg,
        vn: VReg,
        vm: VReg,
    ) -> EmitResult<()> {
        let ft = ftype(mnemonic, size)?;
        self.emit(enc_fpurrr(fp_top11(0b00011110, ft, 1), opcode << 2 | 0b10, vd, vn, vm))
    }

    /// `fmov <vd>, <vn>`: scalar register move.
    pub fn fmov(&mut self, size: ScalarSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.fpu_rr("fmov", size, 0b000000, vd, vn)
    }

    /// `fabs <vd>, <vn>`.
    pub fn fabs(&mut self, size: ScalarSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.fpu_rr("fabs", size, 0b000001, vd, vn)
    }

    /// `fneg <vd>, <vn>`.
    pub fn fneg(&mut self, size: ScalarSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.fpu_rr("fneg", size, 0b000010, vd, vn)
    }

    /// `fsqrt <vd>, <vn>`.
    pub fn fsqrt(&mut self, size: ScalarSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.fpu_rr("fsqrt", size, 0b000011, vd, vn)
    }

    /// `fcvt <vd>, <vn>`: convert between scalar FP precisions.
    pub fn fcvt(&mut self, dst: ScalarSize, src: ScalarSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        if dst == src {
            return Err(EmitError::InvalidOperand("fcvt"));
        }
        let opc = match dst {
            ScalarSize::Size32 => 0b00,
            ScalarSize::Size64 => 0b01,
            ScalarSize::Size16 => 0b11,
            _ => return Err(EmitError::Unallocated("fcvt")),
        };
        let ft = ftype("fcvt", src)?;
        self.emit(enc_fpurr(fp_1src(ft, 0b000100 | opc), vd, vn))
    }

    /// `fadd <vd>, <vn>, <vm>`.
    pub fn fadd(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.fpu_rrr("fadd", size, 0b0010, vd, vn, vm)
    }

    /// `fsub <vd>, <vn>, <vm>`.
    pub fn fsub(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.fpu_rrr("fsub", size, 0b0011, vd, vn, vm)
    }

    /// `fmul <vd>, <vn>, <vm>`.
    pub fn fmul(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.fpu_rrr("fmul", size, 0b0000, vd, vn, vm)
    }

    /// `fdiv <vd>, <vn>, <vm>`.
    pub fn fdiv(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.fpu_rrr("fdiv", size, 0b0001, vd, vn, vm)
    }

    /// `fmax <vd>, <vn>, <vm>`.
    pub fn fmax(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.fpu_rrr("fmax", size, 0b0100, vd, vn, vm)
    }

    /// `fmin <vd>, <vn>, <vm>`.
    pub fn fmin(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.fpu_rrr("fmin", size, 0b0101, vd, vn, vm)
    }

    /// `fmaxnm <vd>, <vn>, <vm>`.
    pub fn fmaxnm(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.fpu_rrr("fmaxnm", size, 0b0110, vd, vn, vm)
    }

    /// `fminnm <vd>, <vn>, <vm>`.
    pub fn fminnm(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.fpu_rrr("fminnm", size, 0b0111, vd, vn, vm)
    }

    /// `fnmul <vd>, <vn>, <vm>`.
    pub fn fnmul(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.fpu_rrr("fnmul", size, 0b1000, vd, vn, vm)
    }

    fn fpu_rrrr(
        &mut self,
        mnemonic: &'static str,
        size: ScalarSize,
        o1: u32,
        o0: u32,
        vd: VReg,
        vn: VReg,
        vm: VReg,
        va: VReg,
    ) -> EmitResult<()> {
        let ft = ftype(mnemonic, size)?;
        self.emit(enc_fpurrrr(fp_top11(0b00011111, ft, o1), o0, vd, vn, vm, va))
    }

    /// `fmadd <vd>, <vn>, <vm>, <va>`: `va + vn * vm`.
    pub fn fmadd(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg, va: VReg) -> EmitResult<()> {
        self.fpu_rrrr("fmadd", size, 0, 0, vd, vn, vm, va)
    }

    /// `fmsub <vd>, <vn>, <vm>, <va>`: `va - vn * vm`.
    pub fn fmsub(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg, va: VReg) -> EmitResult<()> {
        self.fpu_rrrr("fmsub", size, 0, 1, vd, vn, vm, va)
    }

    /// `fnmadd <vd>, <vn>, <vm>, <va>`: `-va - vn * vm`.
    pub fn fnmadd(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg, va: VReg) -> EmitResult<()> {
        self.fpu_rrrr("fnmadd", size, 1, 0, vd, vn, vm, va)
    }

    /// `fnmsub <vd>, <vn>, <vm>, <va>`: `-va + vn * vm`.
    pub fn fnmsub(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg, va: VReg) -> EmitResult<()> {
        self.fpu_rrrr("fnmsub", size, 1, 1, vd, vn, vm, va)
    }

    /// `fcmp <vn>, <vm>`.
    pub fn fcmp(&mut self, size: ScalarSize, vn: VReg, vm: VReg) -> EmitResult<()> {
        let ft = ftype("fcmp", size)?;
        self.emit(enc_fcmp(ft, vn, vm.enc(), 0b00000))
    }

    /// `fcmp <vn>, #0.0`.
    pub fn fcmp_zero(&mut self, size: ScalarSize, vn: VReg) -> EmitResult<()> {
        let ft = ftype("fcmp", size)?;
        self.emit(enc_fcmp(ft, vn, 0, 0b01000))
    }

    /// `fcmpe <vn>, <vm>`: compare signaling on quiet NaNs.
    pub fn fcmpe(&mut self, size: ScalarSize, vn: VReg, vm: VReg) -> EmitResult<()> {
        let ft = ftype("fcmpe", size)?;
        self.emit(enc_fcmp(ft, vn, vm.enc(), 0b10000))
    }

    /// `fcmpe <vn>, #0.0`.
    pub fn fcmpe_zero(&mut self, size: ScalarSize, vn: VReg) -> EmitResult<()> {
        let ft = ftype("fcmpe", size)?;
        self.emit(enc_fcmp(ft, vn, 0, 0b11000))
    }

    fn fccmp_inner(
        &mut self,
        mnemonic: &'static str,
        size: ScalarSize,
        op: u32,
        vn: VReg,
        vm: VReg,
        nzcv: u8,
        cond: Cond,
    ) -> EmitResult<()> {
        if nzcv > 0xf {
            return Err(EmitError::InvalidOperand(mnemonic));
        }
        let ft = ftype(mnemonic, size)?;
        self.emit(
            0b00011110 << 24
                | ft << 22
                | 1 << 21
                | vm.enc() << 16
                | cond.bits() << 12
                | 0b01 << 10
                | vn.enc() << 5
                | op << 4
                | u32::from(nzcv),
        )
    }

    /// `fccmp <vn>, <vm>, #nzcv, <cond>`.
    pub fn fccmp(&mut self, size: ScalarSize, vn: VReg, vm: VReg, nzcv: u8, cond: Cond) -> EmitResult<()> {
        self.fccmp_inner("fccmp", size, 0, vn, vm, nzcv, cond)
    }

    /// `fccmpe <vn>, <vm>, #nzcv, <cond>`.
    pub fn fccmpe(&mut self, size: ScalarSize, vn: VReg, vm: VReg, nzcv: u8, cond: Cond) -> EmitResult<()> {
        self.fccmp_inner("fccmpe", size, 1, vn, vm, nzcv, cond)
    }

    /// `fcsel <vd>, <vn>, <vm>, <cond>`.
    pub fn fcsel(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg, cond: Cond) -> EmitResult<()> {
        let ft = ftype("fcsel", size)?;
        self.emit(
            0b00011110 << 24
                | ft << 22
                | 1 << 21
                | vm.enc() << 16
                | cond.bits() << 12
                | 0b11 << 10
                | vn.enc() << 5
                | vd.enc(),
        )
    }

    /// `fmov <vd>, #imm`: scalar FP immediate move. `bits` is the raw bit
    /// pattern of the value at width `size`; values outside the 8-bit VFP
    /// immediate range are rejected.
    pub fn fmov_imm(&mut self, size: ScalarSize, vd: VReg, bits: u64) -> EmitResult<()> {
        let imm8 = ASIMDFPImm::maybe_from_u64(bits, size).ok_or(EmitError::ImmOutOfRange {
            mnemonic: "fmov",
            value: bits,
        })?;
        let ft = ftype("fmov", size)?;
        self.emit(
            0b00011110 << 24
                | ft << 22
                | 1 << 21
                | u32::from(imm8.enc_bits()) << 13
                | 0b100 << 10
                | vd.enc(),
        )
    }

    /// `frintn <vd>, <vn>`: round to nearest, ties to even.
    pub fn frintn(&mut self, size: ScalarSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.fpu_rr("frintn", size, 0b001000, vd, vn)
    }

    /// `frintp <vd>, <vn>`: round toward plus infinity.
    pub fn frintp(&mut self, size: ScalarSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.fpu_rr("frintp", size, 0b001001, vd, vn)
    }

    /// `frintm <vd>, <vn>`: round toward minus infinity.
    pub fn frintm(&mut self, size: ScalarSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.fpu_rr("frintm", size, 0b001010, vd, vn)
    }

    /// `frintz <vd>, <vn>`: round toward zero.
    pub fn frintz(&mut self, size: ScalarSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.fpu_rr("frintz", size, 0b001011, vd, vn)
    }

    /// `frinta <vd>, <vn>`: round to nearest, ties away.
    pub fn frinta(&mut self, size: ScalarSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.fpu_rr("frinta", size, 0b001100, vd, vn)
    }

    /// `frintx <vd>, <vn>`: round exact, raising inexact.
    pub fn frintx(&mut self, size: ScalarSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.fpu_rr("frintx", size, 0b001110, vd, vn)
    }

    /// `frinti <vd>, <vn>`: round using the current FPCR mode.
    pub fn frinti(&mut self, size: ScalarSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.fpu_rr("frinti", size, 0b001111, vd, vn)
    }

    // FP <-> integer moves and conversions.

    fn gp_ftype(size: OperandSize) -> u32 {
        match size {
            OperandSize::Size32 => 0b00,
            OperandSize::Size64 => 0b01,
        }
    }

    /// `fmov rd, <vn>`: raw bits from FP to general register. 32-bit reads
    /// S, 64-bit reads D.
    pub fn fmov_to_gp(&mut self, size: OperandSize, rd: Reg, vn: VReg) -> EmitResult<()> {
        let top16 = size.sf_bit() << 15 | 0b0011110 << 8 | Self::gp_ftype(size) << 6 | 1 << 5 | 0b110;
        self.emit(enc_fp_int(top16, rd.enc(), vn.enc()))
    }

    /// `fmov <vd>, rn`: raw bits from general register to FP.
    pub fn fmov_from_gp(&mut self, size: OperandSize, vd: VReg, rn: Reg) -> EmitResult<()> {
        let top16 = size.sf_bit() << 15 | 0b0011110 << 8 | Self::gp_ftype(size) << 6 | 1 << 5 | 0b111;
        self.emit(enc_fp_int(top16, vd.enc(), rn.enc()))
    }

    /// `fmov rd, vn.d[1]`: raw bits from the upper half of a vector register.
    pub fn fmov_to_gp_top(&mut self, rd: Reg, vn: VReg) -> EmitResult<()> {
        let top16 = 1 << 15 | 0b0011110 << 8 | 0b10 << 6 | 1 << 5 | 0b01 << 3 | 0b110;
        self.emit(enc_fp_int(top16, rd.enc(), vn.enc()))
    }

    /// `fmov vd.d[1], rn`: raw bits into the upper half of a vector register.
    /// The lower half is unchanged.
    pub fn fmov_from_gp_top(&mut self, vd: VReg, rn: Reg) -> EmitResult<()> {
        let top16 = 1 << 15 | 0b0011110 << 8 | 0b10 << 6 | 1 << 5 | 0b01 << 3 | 0b111;
        self.emit(enc_fp_int(top16, vd.enc(), rn.enc()))
    }

    fn int_to_fp(
        &mut self,
        mnemonic: &'static str,
        size: OperandSize,
        fsize: ScalarSize,
        opcode: u32,
        vd: VReg,
        rn: Reg,
    ) -> EmitResult<()> {
        let ft = ftype(mnemonic, fsize)?;
        let top16 = size.sf_bit() << 15 | 0b0011110 << 8 | ft << 6 | 1 << 5 | opcode;
        self.emit(enc_fp_int(top16, vd.enc(), rn.enc()))
    }

    /// `scvtf <vd>, rn`: signed integer to FP.
    pub fn scvtf_gp(&mut self, size: OperandSize, fsize: ScalarSize, vd: VReg, rn: Reg) -> EmitResult<()> {
        self.int_to_fp("scvtf", size, fsize, 0b010, vd, rn)
    }

    /// `ucvtf <vd>, rn`: unsigned integer to FP.
    pub fn ucvtf_gp(&mut self, size: OperandSize, fsize: ScalarSize, vd: VReg, rn: Reg) -> EmitResult<()> {
        self.int_to_fp("ucvtf", size, fsize, 0b011, vd, rn)
    }

    fn fp_to_int(
        &mut self,
        mnemonic: &'static str,
        size: OperandSize,
        fsize: ScalarSize,
        rmode: u32,
        opcode: u32,
        rd: Reg,
        vn: VReg,
    ) -> EmitResult<()> {
        let ft = ftype(mnemonic, fsize)?;
        let top16 = size.sf_bit() << 15 | 0b0011110 << 8 | ft << 6 | 1 << 5 | rmode << 3 | opcode;
        self.emit(enc_fp_int(top16, rd.enc(), vn.enc()))
    }

    /// `fcvtzs rd, <vn>`: FP to signed integer, round toward zero.
    pub fn fcvtzs(&mut self, size: OperandSize, fsize: ScalarSize, rd: Reg, vn: VReg) -> EmitResult<()> {
        self.fp_to_int("fcvtzs", size, fsize, 0b11, 0b000, rd, vn)
    }

    /// `fcvtzu rd, <vn>`: FP to unsigned integer, round toward zero.
    pub fn fcvtzu(&mut self, size: OperandSize, fsize: ScalarSize, rd: Reg, vn: VReg) -> EmitResult<()> {
        self.fp_to_int("fcvtzu", size, fsize, 0b11, 0b001, rd, vn)
    }

    /// `fcvtns rd, <vn>`: round to nearest, ties to even.
    pub fn fcvtns(&mut self, size: OperandSize, fsize: ScalarSize, rd: Reg, vn: VReg) -> EmitResult<()> {
        self.fp_to_int("fcvtns", size, fsize, 0b00, 0b000, rd, vn)
    }

    /// `fcvtnu rd, <vn>`.
    pub fn fcvtnu(&mut self, size: OperandSize, fsize: ScalarSize, rd: Reg, vn: VReg) -> EmitResult<()> {
        self.fp_to_int("fcvtnu", size, fsize, 0b00, 0b001, rd, vn)
    }

    /// `fcvtas rd, <vn>`: round to nearest, ties away.
    pub fn fcvtas(&mut self, size: OperandSize, fsize: ScalarSize, rd: Reg, vn: VReg) -> EmitResult<()> {
        self.fp_to_int("fcvtas", size, fsize, 0b00, 0b100, rd, vn)
    }

    /// `fcvtau rd, <vn>`.
    pub fn fcvtau(&mut self, size: OperandSize, fsize: ScalarSize, rd: Reg, vn: VReg) -> EmitResult<()> {
        self.fp_to_int("fcvtau", size, fsize, 0b00, 0b101, rd, vn)
    }

    /// `fcvtms rd, <vn>`: round toward minus infinity.
    pub fn fcvtms(&mut self, size: OperandSize, fsize: ScalarSize, rd: Reg, vn: VReg) -> EmitResult<()> {
        self.fp_to_int("fcvtms", size, fsize, 0b10, 0b000, rd, vn)
    }

    /// `fcvtmu rd, <vn>`.
    pub fn fcvtmu(&mut self, size: OperandSize, fsize: ScalarSize, rd: Reg, vn: VReg) -> EmitResult<()> {
        self.fp_to_int("fcvtmu", size, fsize, 0b10, 0b001, rd, vn)
    }

    /// `fcvtps rd, <vn>`: round toward plus infinity.
    pub fn fcvtps(&mut self, size: OperandSize, fsize: ScalarSize, rd: Reg, vn: VReg) -> EmitResult<()> {
        self.fp_to_int("fcvtps", size, fsize, 0b01, 0b000, rd, vn)
    }

    /// `fcvtpu rd, <vn>`.
    pub fn fcvtpu(&mut self, size: OperandSize, fsize: ScalarSize, rd: Reg, vn: VReg) -> EmitResult<()> {
        self.fp_to_int("fcvtpu", size, fsize, 0b01, 0b001, rd, vn)
    }

    // Scalar forms of the SIMD integer ops.

    /// `add <vd>, <vn>, <vm>` on D registers. Only the 64-bit form exists.
    pub fn add_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        d_only("add", size)?;
        self.emit(enc_scalar_rrr(0, 0b11, 0b100001, vd, vn, vm))
    }

    /// `sub <vd>, <vn>, <vm>` on D registers.
    pub fn sub_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        d_only("sub", size)?;
        self.emit(enc_scalar_rrr(1, 0b11, 0b100001, vd, vn, vm))
    }

    /// `cmeq <vd>, <vn>, <vm>` on D registers.
    pub fn cmeq_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        d_only("cmeq", size)?;
        self.emit(enc_scalar_rrr(1, 0b11, 0b100011, vd, vn, vm))
    }

    /// `cmge <vd>, <vn>, <vm>` on D registers.
    pub fn cmge_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        d_only("cmge", size)?;
        self.emit(enc_scalar_rrr(0, 0b11, 0b001111, vd, vn, vm))
    }

    /// `cmgt <vd>, <vn>, <vm>` on D registers.
    pub fn cmgt_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        d_only("cmgt", size)?;
        self.emit(enc_scalar_rrr(0, 0b11, 0b001101, vd, vn, vm))
    }

    /// `cmhi <vd>, <vn>, <vm>` on D registers.
    pub fn cmhi_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        d_only("cmhi", size)?;
        self.emit(enc_scalar_rrr(1, 0b11, 0b001101, vd, vn, vm))
    }

    /// `cmhs <vd>, <vn>, <vm>` on D registers.
    pub fn cmhs_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        d_only("cmhs", size)?;
        self.emit(enc_scalar_rrr(1, 0b11, 0b001111, vd, vn, vm))
    }

    /// `cmtst <vd>, <vn>, <vm>` on D registers.
    pub fn cmtst_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        d_only("cmtst", size)?;
        self.emit(enc_scalar_rrr(0, 0b11, 0b100011, vd, vn, vm))
    }

    /// `sqadd <vd>, <vn>, <vm>`: saturating add, any of B/H/S/D.
    pub fn sqadd_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        let sz = scalar_int_size("sqadd", size)?;
        self.emit(enc_scalar_rrr(0, sz, 0b000011, vd, vn, vm))
    }

    /// `uqadd <vd>, <vn>, <vm>`.
    pub fn uqadd_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        let sz = scalar_int_size("uqadd", size)?;
        self.emit(enc_scalar_rrr(1, sz, 0b000011, vd, vn, vm))
    }

    /// `sqsub <vd>, <vn>, <vm>`.
    pub fn sqsub_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        let sz = scalar_int_size("sqsub", size)?;
        self.emit(enc_scalar_rrr(0, sz, 0b001011, vd, vn, vm))
    }

    /// `uqsub <vd>, <vn>, <vm>`.
    pub fn uqsub_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        let sz = scalar_int_size("uqsub", size)?;
        self.emit(enc_scalar_rrr(1, sz, 0b001011, vd, vn, vm))
    }

    /// `abs <vd>, <vn>` on D registers.
    pub fn abs_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        d_only("abs", size)?;
        self.emit(enc_scalar_rr_misc(0, 0b11, 0b01011, vd, vn))
    }

    /// `neg <vd>, <vn>` on D registers.
    pub fn neg_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        d_only("neg", size)?;
        self.emit(enc_scalar_rr_misc(1, 0b11, 0b01011, vd, vn))
    }

    /// `fabd <vd>, <vn>, <vm>`: absolute difference, S or D.
    pub fn fabd(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        let sz = float_sz("fabd", size)?;
        self.emit(enc_scalar_rrr(1, 0b10 | sz, 0b110101, vd, vn, vm))
    }

    /// `fmulx <vd>, <vn>, <vm>`, S or D.
    pub fn fmulx_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        let sz = float_sz("fmulx", size)?;
        self.emit(enc_scalar_rrr(0, sz, 0b110111, vd, vn, vm))
    }

    /// `addp <vd>, <vn>.2d`: sum the two lanes of `vn` into a D register.
    pub fn addp_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        d_only("addp", size)?;
        self.emit(
            0b01 << 30 | 0b11110 << 24 | 0b11 << 22 | 0b11000 << 17 | 0b11011 << 12 | 0b10 << 10
                | vn.enc() << 5
                | vd.enc(),
        )
    }

    fn scalar_shift(&mut self, u: u32, immh_immb: u32, opcode: u32, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.emit(
            0b01 << 30 | u << 29 | 0b111110 << 23 | immh_immb << 16 | opcode << 11 | 1 << 10
                | vn.enc() << 5
                | vd.enc(),
        )
    }

    /// `sshr <vd>, <vn>, #shift` on D registers, `shift` in 1..=64.
    pub fn sshr_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, shift: u32) -> EmitResult<()> {
        d_only("sshr", size)?;
        if shift < 1 || shift > 64 {
            return Err(EmitError::ImmOutOfRange { mnemonic: "sshr", value: u64::from(shift) });
        }
        self.scalar_shift(0, 128 - shift, 0b00000, vd, vn)
    }

    /// `ushr <vd>, <vn>, #shift` on D registers, `shift` in 1..=64.
    pub fn ushr_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, shift: u32) -> EmitResult<()> {
        d_only("ushr", size)?;
        if shift < 1 || shift > 64 {
            return Err(EmitError::ImmOutOfRange { mnemonic: "ushr", value: u64::from(shift) });
        }
        self.scalar_shift(1, 128 - shift, 0b00000, vd, vn)
    }

    /// `shl <vd>, <vn>, #shift` on D registers, `shift` in 0..=63.
    pub fn shl_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, shift: u32) -> EmitResult<()> {
        d_only("shl", size)?;
        if shift > 63 {
            return Err(EmitError::ImmOutOfRange { mnemonic: "shl", value: u64::from(shift) });
        }
        self.scalar_shift(0, 64 + shift, 0b01010, vd, vn)
    }

    /// `dup <vd>, <vn>.<t>[idx]`: extract one lane into a scalar register.
    pub fn dup_scalar(&mut self, size: ScalarSize, vd: VReg, vn: VReg, idx: u32) -> EmitResult<()> {
        let (ls, lanes) = match size {
            ScalarSize::Size8 => (0, 16),
            ScalarSize::Size16 => (1, 8),
            ScalarSize::Size32 => (2, 4),
            ScalarSize::Size64 => (3, 2),
            ScalarSize::Size128 => return Err(EmitError::Unallocated("dup")),
        };
        if idx >= lanes {
            return Err(EmitError::InvalidOperand("dup"));
        }
        let imm5 = idx << (ls + 1) | 1 << ls;
        self.emit(
            0b01 << 30 | 0b11110000 << 21 | imm5 << 16 | 1 << 10 | vn.enc() << 5 | vd.enc(),
        )
    }
}
