//! ASIMD vector instructions.
//!
//! Every method takes a [`VectorSize`] arrangement; pairings the architecture
//! does not allocate (64-bit lanes for `mul`, byte lanes for `fadd`, and so
//! on) are rejected before anything is written. Methods whose mnemonic also
//! exists as a scalar or general-purpose op carry a `_vec` suffix.

use crate::args::{OperandSize, ScalarSize, VectorSize};
use crate::imms::{ASIMDFPImm, ASIMDMovModImm};
use crate::inst::{
    enc_asimd_mod_imm, enc_tbl, enc_vec_copy, enc_vec_lanes, enc_vec_perm, enc_vec_rr_misc,
    enc_vec_rrr, enc_vec_shift_imm,
};
use crate::regs::{Reg, VReg};
use crate::result::{EmitError, EmitResult};
use crate::Assembler;

/// Reject 64-bit lanes for ops that stop at 32-bit elements.
fn no_d_lanes(mnemonic: &'static str, size: VectorSize) -> EmitResult<()> {
    if size.lane_size() == ScalarSize::Size64 {
        Err(EmitError::Unallocated(mnemonic))
    } else {
        Ok(())
    }
}

/// The `Q` bit for ops that only come in byte arrangements (`8b`/`16b`).
fn bytes_arr(mnemonic: &'static str, size: VectorSize) -> EmitResult<u32> {
    if size.lane_size() == ScalarSize::Size8 {
        Ok(size.is_128bits() as u32)
    } else {
        Err(EmitError::InvalidOperand(mnemonic))
    }
}

/// The `(Q, sz)` pair for float arrangements (`2s`/`4s`/`2d`).
fn float_arr(mnemonic: &'static str, size: VectorSize) -> EmitResult<(u32, u32)> {
    match size.lane_size() {
        ScalarSize::Size32 => Ok((size.is_128bits() as u32, 0)),
        ScalarSize::Size64 => Ok((1, 1)),
        _ => Err(EmitError::Unallocated(mnemonic)),
    }
}

/// Across-lanes arrangements: everything except `2s` and the 64-bit lanes.
fn across_arr(mnemonic: &'static str, size: VectorSize) -> EmitResult<(u32, u32)> {
    match size {
        VectorSize::Size32x2 | VectorSize::Size64x2 => Err(EmitError::Unallocated(mnemonic)),
        _ => Ok(size.enc_size()),
    }
}

/// The 64-bit half-width arrangements used by the narrowing and widening ops.
fn narrow_arr(mnemonic: &'static str, size: VectorSize) -> EmitResult<u32> {
    match size {
        VectorSize::Size8x8 | VectorSize::Size16x4 | VectorSize::Size32x2 => {
            Ok(size.enc_size().1)
        }
        _ => Err(EmitError::InvalidOperand(mnemonic)),
    }
}

/// `imm5` of the copy group: the element index shifted above a one-hot lane
/// width marker.
fn copy_imm5(mnemonic: &'static str, lane: ScalarSize, idx: u8) -> EmitResult<u32> {
    let ls = match lane {
        ScalarSize::Size128 => return Err(EmitError::Unallocated(mnemonic)),
        s => s.enc_size(),
    };
    if u32::from(idx) >= 16 >> ls {
        return Err(EmitError::InvalidOperand(mnemonic));
    }
    Ok(u32::from(idx) << (ls + 1) | 1 << ls)
}

impl Assembler {
    fn v3same(
        &mut self,
        u: u32,
        size: VectorSize,
        bits_15_10: u32,
        vd: VReg,
        vn: VReg,
        vm: VReg,
    ) -> EmitResult<()> {
        let (q, sz) = size.enc_size();
        self.emit(enc_vec_rrr(q, u, sz, bits_15_10, vd, vn, vm))
    }

    fn v3same_float(
        &mut self,
        mnemonic: &'static str,
        u: u32,
        size_hi: u32,
        size: VectorSize,
        bits_15_10: u32,
        vd: VReg,
        vn: VReg,
        vm: VReg,
    ) -> EmitResult<()> {
        let (q, sz) = float_arr(mnemonic, size)?;
        self.emit(enc_vec_rrr(q, u, size_hi << 1 | sz, bits_15_10, vd, vn, vm))
    }

    fn v3same_logic(
        &mut self,
        mnemonic: &'static str,
        u: u32,
        sz: u32,
        size: VectorSize,
        vd: VReg,
        vn: VReg,
        vm: VReg,
    ) -> EmitResult<()> {
        let q = bytes_arr(mnemonic, size)?;
        self.emit(enc_vec_rrr(q, u, sz, 0b000111, vd, vn, vm))
    }

    /// `add <vd>, <vn>, <vm>` elementwise.
    pub fn add_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same(0, size, 0b100001, vd, vn, vm)
    }

    /// `sub <vd>, <vn>, <vm>` elementwise.
    pub fn sub_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same(1, size, 0b100001, vd, vn, vm)
    }

    /// `mul <vd>, <vn>, <vm>` elementwise. No 64-bit lane form exists.
    pub fn mul_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("mul", size)?;
        self.v3same(0, size, 0b100111, vd, vn, vm)
    }

    /// `mla <vd>, <vn>, <vm>`: multiply-accumulate elementwise.
    pub fn mla(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("mla", size)?;
        self.v3same(0, size, 0b100101, vd, vn, vm)
    }

    /// `mls <vd>, <vn>, <vm>`: multiply-subtract elementwise.
    pub fn mls(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("mls", size)?;
        self.v3same(1, size, 0b100101, vd, vn, vm)
    }

    /// `pmul <vd>, <vn>, <vm>`: polynomial multiply, byte lanes only.
    pub fn pmul(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        let q = bytes_arr("pmul", size)?;
        self.emit(enc_vec_rrr(q, 1, 0b00, 0b100111, vd, vn, vm))
    }

    /// `and <vd>, <vn>, <vm>` bitwise.
    pub fn and_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_logic("and", 0, 0b00, size, vd, vn, vm)
    }

    /// `bic <vd>, <vn>, <vm>` bitwise.
    pub fn bic_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_logic("bic", 0, 0b01, size, vd, vn, vm)
    }

    /// `orr <vd>, <vn>, <vm>` bitwise.
    pub fn orr_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_logic("orr", 0, 0b10, size, vd, vn, vm)
    }

    /// `orn <vd>, <vn>, <vm>` bitwise.
    pub fn orn_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_logic("orn", 0, 0b11, size, vd, vn, vm)
    }

    /// `eor <vd>, <vn>, <vm>` bitwise.
    pub fn eor_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_logic("eor", 1, 0b00, size, vd, vn, vm)
    }

    /// `bsl <vd>, <vn>, <vm>`: bitwise select, `vd` is the mask.
    pub fn bsl(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_logic("bsl", 1, 0b01, size, vd, vn, vm)
    }

    /// `bit <vd>, <vn>, <vm>`: bitwise insert if true, `vm` is the mask.
    pub fn bit(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_logic("bit", 1, 0b10, size, vd, vn, vm)
    }

    /// `bif <vd>, <vn>, <vm>`: bitwise insert if false, `vm` is the mask.
    pub fn bif(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_logic("bif", 1, 0b11, size, vd, vn, vm)
    }

    /// `cmeq <vd>, <vn>, <vm>` elementwise.
    pub fn cmeq(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same(1, size, 0b100011, vd, vn, vm)
    }

    /// `cmgt <vd>, <vn>, <vm>` elementwise, signed.
    pub fn cmgt(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same(0, size, 0b001101, vd, vn, vm)
    }

    /// `cmge <vd>, <vn>, <vm>` elementwise, signed.
    pub fn cmge(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same(0, size, 0b001111, vd, vn, vm)
    }

    /// `cmhi <vd>, <vn>, <vm>` elementwise, unsigned.
    pub fn cmhi(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same(1, size, 0b001101, vd, vn, vm)
    }

    /// `cmhs <vd>, <vn>, <vm>` elementwise, unsigned.
    pub fn cmhs(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same(1, size, 0b001111, vd, vn, vm)
    }

    /// `cmtst <vd>, <vn>, <vm>` elementwise.
    pub fn cmtst(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same(0, size, 0b100011, vd, vn, vm)
    }

    /// `smax <vd>, <vn>, <vm>` elementwise.
    pub fn smax(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("smax", size)?;
        self.v3same(0, size, 0b011001, vd, vn, vm)
    }

    /// `smin <vd>, <vn>, <vm>` elementwise.
    pub fn smin(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("smin", size)?;
        self.v3same(0, size, 0b011011, vd, vn, vm)
    }

    /// `umax <vd>, <vn>, <vm>` elementwise.
    pub fn umax(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("umax", size)?;
        self.v3same(1, size, 0b011001, vd, vn, vm)
    }

    /// `umin <vd>, <vn>, <vm>` elementwise.
    pub fn umin(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("umin", size)?;
        self.v3same(1, size, 0b011011, vd, vn, vm)
    }

    /// `sabd <vd>, <vn>, <vm>`: signed absolute difference.
    pub fn sabd(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("sabd", size)?;
        self.v3same(0, size, 0b011101, vd, vn, vm)
    }

    /// `uabd <vd>, <vn>, <vm>`: unsigned absolute difference.
    pub fn uabd(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("uabd", size)?;
        self.v3same(1, size, 0b011101, vd, vn, vm)
    }

    /// `saba <vd>, <vn>, <vm>`: signed absolute difference and accumulate.
    pub fn saba(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("saba", size)?;
        self.v3same(0, size, 0b011111, vd, vn, vm)
    }

    /// `uaba <vd>, <vn>, <vm>`: unsigned absolute difference and accumulate.
    pub fn uaba(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("uaba", size)?;
        self.v3same(1, size, 0b011111, vd, vn, vm)
    }

    /// `sqadd <vd>, <vn>, <vm>`: signed saturating add.
    pub fn sqadd_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same(0, size, 0b000011, vd, vn, vm)
    }

    /// `uqadd <vd>, <vn>, <vm>`: unsigned saturating add.
    pub fn uqadd_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same(1, size, 0b000011, vd, vn, vm)
    }

    /// `sqsub <vd>, <vn>, <vm>`: signed saturating subtract.
    pub fn sqsub_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same(0, size, 0b001011, vd, vn, vm)
    }

    /// `uqsub <vd>, <vn>, <vm>`: unsigned saturating subtract.
    pub fn uqsub_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same(1, size, 0b001011, vd, vn, vm)
    }

    /// `shadd <vd>, <vn>, <vm>`: signed halving add.
    pub fn shadd(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("shadd", size)?;
        self.v3same(0, size, 0b000001, vd, vn, vm)
    }

    /// `uhadd <vd>, <vn>, <vm>`: unsigned halving add.
    pub fn uhadd(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("uhadd", size)?;
        self.v3same(1, size, 0b000001, vd, vn, vm)
    }

    /// `shsub <vd>, <vn>, <vm>`: signed halving subtract.
    pub fn shsub(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("shsub", size)?;
        self.v3same(0, size, 0b001001, vd, vn, vm)
    }

    /// `uhsub <vd>, <vn>, <vm>`: unsigned halving subtract.
    pub fn uhsub(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("uhsub", size)?;
        self.v3same(1, size, 0b001001, vd, vn, vm)
    }

    /// `srhadd <vd>, <vn>, <vm>`: signed rounding halving add.
    pub fn srhadd(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("srhadd", size)?;
        self.v3same(0, size, 0b000101, vd, vn, vm)
    }

    /// `urhadd <vd>, <vn>, <vm>`: unsigned rounding halving add.
    pub fn urhadd(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("urhadd", size)?;
        self.v3same(1, size, 0b000101, vd, vn, vm)
    }

    /// `addp <vd>, <vn>, <vm>`: pairwise add.
    pub fn addp(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same(0, size, 0b101111, vd, vn, vm)
    }

    /// `smaxp <vd>, <vn>, <vm>`: signed pairwise maximum.
    pub fn smaxp(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("smaxp", size)?;
        self.v3same(0, size, 0b101001, vd, vn, vm)
    }

    /// `sminp <vd>, <vn>, <vm>`: signed pairwise minimum.
    pub fn sminp(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("sminp", size)?;
        self.v3same(0, size, 0b101011, vd, vn, vm)
    }

    /// `umaxp <vd>, <vn>, <vm>`: unsigned pairwise maximum.
    pub fn umaxp(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("umaxp", size)?;
        self.v3same(1, size, 0b101001, vd, vn, vm)
    }

    /// `uminp <vd>, <vn>, <vm>`: unsigned pairwise minimum.
    pub fn uminp(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        no_d_lanes("uminp", size)?;
        self.v3same(1, size, 0b101011, vd, vn, vm)
    }

    /// `fadd <vd>, <vn>, <vm>` elementwise.
    pub fn fadd_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("fadd", 0, 0, size, 0b110101, vd, vn, vm)
    }

    /// `fsub <vd>, <vn>, <vm>` elementwise.
    pub fn fsub_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("fsub", 0, 1, size, 0b110101, vd, vn, vm)
    }

    /// `fmul <vd>, <vn>, <vm>` elementwise.
    pub fn fmul_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("fmul", 1, 0, size, 0b110111, vd, vn, vm)
    }

    /// `fdiv <vd>, <vn>, <vm>` elementwise.
    pub fn fdiv_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("fdiv", 1, 0, size, 0b111111, vd, vn, vm)
    }

    /// `fmax <vd>, <vn>, <vm>` elementwise.
    pub fn fmax_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("fmax", 0, 0, size, 0b111101, vd, vn, vm)
    }

    /// `fmin <vd>, <vn>, <vm>` elementwise.
    pub fn fmin_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("fmin", 0, 1, size, 0b111101, vd, vn, vm)
    }

    /// `fmaxnm <vd>, <vn>, <vm>` elementwise.
    pub fn fmaxnm_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("fmaxnm", 0, 0, size, 0b110001, vd, vn, vm)
    }

    /// `fminnm <vd>, <vn>, <vm>` elementwise.
    pub fn fminnm_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("fminnm", 0, 1, size, 0b110001, vd, vn, vm)
    }

    /// `fmla <vd>, <vn>, <vm>`: fused multiply-accumulate elementwise.
    pub fn fmla_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("fmla", 0, 0, size, 0b110011, vd, vn, vm)
    }

    /// `fmls <vd>, <vn>, <vm>`: fused multiply-subtract elementwise.
    pub fn fmls_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("fmls", 0, 1, size, 0b110011, vd, vn, vm)
    }

    /// `fcmeq <vd>, <vn>, <vm>` elementwise.
    pub fn fcmeq(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("fcmeq", 0, 0, size, 0b111001, vd, vn, vm)
    }

    /// `fcmgt <vd>, <vn>, <vm>` elementwise.
    pub fn fcmgt(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("fcmgt", 1, 1, size, 0b111001, vd, vn, vm)
    }

    /// `fcmge <vd>, <vn>, <vm>` elementwise.
    pub fn fcmge(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("fcmge", 1, 0, size, 0b111001, vd, vn, vm)
    }

    /// `facge <vd>, <vn>, <vm>`: absolute compare greater or equal.
    pub fn facge(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("facge", 1, 0, size, 0b111011, vd, vn, vm)
    }

    /// `facgt <vd>, <vn>, <vm>`: absolute compare greater than.
    pub fn facgt(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("facgt", 1, 1, size, 0b111011, vd, vn, vm)
    }

    /// `faddp <vd>, <vn>, <vm>`: pairwise float add.
    pub fn faddp_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("faddp", 1, 0, size, 0b110101, vd, vn, vm)
    }

    /// `fabd <vd>, <vn>, <vm>`: absolute difference elementwise.
    pub fn fabd_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("fabd", 1, 1, size, 0b110101, vd, vn, vm)
    }

    /// `fmulx <vd>, <vn>, <vm>` elementwise.
    pub fn fmulx_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("fmulx", 0, 0, size, 0b110111, vd, vn, vm)
    }

    /// `frecps <vd>, <vn>, <vm>`: reciprocal step.
    pub fn frecps(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("frecps", 0, 0, size, 0b111111, vd, vn, vm)
    }

    /// `frsqrts <vd>, <vn>, <vm>`: reciprocal square root step.
    pub fn frsqrts(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        self.v3same_float("frsqrts", 0, 1, size, 0b111111, vd, vn, vm)
    }

    // Two-register misc.

    /// `mvn <vd>, <vn>`: bitwise not.
    pub fn mvn_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let q = bytes_arr("mvn", size)?;
        self.emit(enc_vec_rr_misc(q, 1, 0b00, 0b00101, vd, vn))
    }

    /// `neg <vd>, <vn>` elementwise.
    pub fn neg_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let (q, sz) = size.enc_size();
        self.emit(enc_vec_rr_misc(q, 1, sz, 0b01011, vd, vn))
    }

    /// `abs <vd>, <vn>` elementwise.
    pub fn abs_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let (q, sz) = size.enc_size();
        self.emit(enc_vec_rr_misc(q, 0, sz, 0b01011, vd, vn))
    }

    /// `cmeq <vd>, <vn>, #0` elementwise.
    pub fn cmeq0(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let (q, sz) = size.enc_size();
        self.emit(enc_vec_rr_misc(q, 0, sz, 0b01001, vd, vn))
    }

    /// `cmgt <vd>, <vn>, #0` elementwise, signed.
    pub fn cmgt0(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let (q, sz) = size.enc_size();
        self.emit(enc_vec_rr_misc(q, 0, sz, 0b01000, vd, vn))
    }

    /// `cmge <vd>, <vn>, #0` elementwise, signed.
    pub fn cmge0(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let (q, sz) = size.enc_size();
        self.emit(enc_vec_rr_misc(q, 1, sz, 0b01000, vd, vn))
    }

    /// `cmle <vd>, <vn>, #0` elementwise, signed.
    pub fn cmle0(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let (q, sz) = size.enc_size();
        self.emit(enc_vec_rr_misc(q, 1, sz, 0b01001, vd, vn))
    }

    /// `cmlt <vd>, <vn>, #0` elementwise, signed.
    pub fn cmlt0(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let (q, sz) = size.enc_size();
        self.emit(enc_vec_rr_misc(q, 0, sz, 0b01010, vd, vn))
    }

    /// `cnt <vd>, <vn>`: population count per byte.
    pub fn cnt(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let q = bytes_arr("cnt", size)?;
        self.emit(enc_vec_rr_misc(q, 0, 0b00, 0b00101, vd, vn))
    }

    /// `rbit <vd>, <vn>`: reverse bits per byte.
    pub fn rbit_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let q = bytes_arr("rbit", size)?;
        self.emit(enc_vec_rr_misc(q, 1, 0b01, 0b00101, vd, vn))
    }

    /// `rev16 <vd>, <vn>`: byte lanes only.
    pub fn rev16_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let q = bytes_arr("rev16", size)?;
        self.emit(enc_vec_rr_misc(q, 0, 0b00, 0b00001, vd, vn))
    }

    /// `rev32 <vd>, <vn>`: byte or halfword lanes.
    pub fn rev32_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let (q, sz) = size.enc_size();
        if sz > 0b01 {
            return Err(EmitError::Unallocated("rev32"));
        }
        self.emit(enc_vec_rr_misc(q, 1, sz, 0b00000, vd, vn))
    }

    /// `rev64 <vd>, <vn>`: byte, halfword, or word lanes.
    pub fn rev64_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let (q, sz) = size.enc_size();
        if sz > 0b10 {
            return Err(EmitError::Unallocated("rev64"));
        }
        self.emit(enc_vec_rr_misc(q, 0, sz, 0b00000, vd, vn))
    }

    /// `xtn <vd>, <vn>`: narrow to the low half. `size` names the narrow
    /// destination arrangement (`8b`/`4h`/`2s`).
    pub fn xtn(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let sz = narrow_arr("xtn", size)?;
        self.emit(enc_vec_rr_misc(0, 0, sz, 0b10010, vd, vn))
    }

    /// `xtn2 <vd>, <vn>`: narrow to the high half. `size` names the full
    /// destination arrangement (`16b`/`8h`/`4s`).
    pub fn xtn2(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.narrow2("xtn2", 0, size, 0b10010, vd, vn)
    }

    fn narrow2(
        &mut self,
        mnemonic: &'static str,
        u: u32,
        size: VectorSize,
        opcode: u32,
        vd: VReg,
        vn: VReg,
    ) -> EmitResult<()> {
        match size {
            VectorSize::Size8x16 | VectorSize::Size16x8 | VectorSize::Size32x4 => {
                let (_, sz) = size.enc_size();
                self.emit(enc_vec_rr_misc(1, u, sz, opcode, vd, vn))
            }
            _ => Err(EmitError::InvalidOperand(mnemonic)),
        }
    }

    /// `sqxtn <vd>, <vn>`: signed saturating narrow to the low half. `size`
    /// names the narrow destination arrangement.
    pub fn sqxtn(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let sz = narrow_arr("sqxtn", size)?;
        self.emit(enc_vec_rr_misc(0, 0, sz, 0b10100, vd, vn))
    }

    /// `sqxtn2 <vd>, <vn>`: signed saturating narrow to the high half.
    pub fn sqxtn2(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.narrow2("sqxtn2", 0, size, 0b10100, vd, vn)
    }

    /// `uqxtn <vd>, <vn>`: unsigned saturating narrow to the low half.
    pub fn uqxtn(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let sz = narrow_arr("uqxtn", size)?;
        self.emit(enc_vec_rr_misc(0, 1, sz, 0b10100, vd, vn))
    }

    /// `uqxtn2 <vd>, <vn>`: unsigned saturating narrow to the high half.
    pub fn uqxtn2(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.narrow2("uqxtn2", 1, size, 0b10100, vd, vn)
    }

    /// `sqxtun <vd>, <vn>`: signed-to-unsigned saturating narrow to the low
    /// half.
    pub fn sqxtun(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let sz = narrow_arr("sqxtun", size)?;
        self.emit(enc_vec_rr_misc(0, 1, sz, 0b10010, vd, vn))
    }

    /// `sqxtun2 <vd>, <vn>`.
    pub fn sqxtun2(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.narrow2("sqxtun2", 1, size, 0b10010, vd, vn)
    }

    fn v2misc_float(
        &mut self,
        mnemonic: &'static str,
        u: u32,
        size_hi: u32,
        size: VectorSize,
        opcode: u32,
        vd: VReg,
        vn: VReg,
    ) -> EmitResult<()> {
        let (q, sz) = float_arr(mnemonic, size)?;
        self.emit(enc_vec_rr_misc(q, u, size_hi << 1 | sz, opcode, vd, vn))
    }

    /// `fabs <vd>, <vn>` elementwise.
    pub fn fabs_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.v2misc_float("fabs", 0, 1, size, 0b01111, vd, vn)
    }

    /// `fneg <vd>, <vn>` elementwise.
    pub fn fneg_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.v2misc_float("fneg", 1, 1, size, 0b01111, vd, vn)
    }

    /// `fsqrt <vd>, <vn>` elementwise.
    pub fn fsqrt_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.v2misc_float("fsqrt", 1, 1, size, 0b11111, vd, vn)
    }

    /// `scvtf <vd>, <vn>`: signed integer lanes to float.
    pub fn scvtf_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.v2misc_float("scvtf", 0, 0, size, 0b11101, vd, vn)
    }

    /// `ucvtf <vd>, <vn>`: unsigned integer lanes to float.
    pub fn ucvtf_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.v2misc_float("ucvtf", 1, 0, size, 0b11101, vd, vn)
    }

    /// `fcvtzs <vd>, <vn>`: float lanes to signed integer, toward zero.
    pub fn fcvtzs_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.v2misc_float("fcvtzs", 0, 1, size, 0b11011, vd, vn)
    }

    /// `fcvtzu <vd>, <vn>`: float lanes to unsigned integer, toward zero.
    pub fn fcvtzu_vec(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.v2misc_float("fcvtzu", 1, 1, size, 0b11011, vd, vn)
    }

    /// `frecpe <vd>, <vn>`: reciprocal estimate elementwise.
    pub fn frecpe(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.v2misc_float("frecpe", 0, 1, size, 0b11101, vd, vn)
    }

    /// `frsqrte <vd>, <vn>`: reciprocal square root estimate elementwise.
    pub fn frsqrte(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.v2misc_float("frsqrte", 1, 1, size, 0b11101, vd, vn)
    }

    // Across-lanes reductions. The destination is a scalar element of the
    // source lane width (or the doubled width for the long forms).

    /// `addv <vd>, <vn>`: sum across lanes.
    pub fn addv(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let (q, sz) = across_arr("addv", size)?;
        self.emit(enc_vec_lanes(q, 0, sz, 0b11011, vd, vn))
    }

    /// `saddlv <vd>, <vn>`: signed widening sum across lanes.
    pub fn saddlv(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let (q, sz) = across_arr("saddlv", size)?;
        self.emit(enc_vec_lanes(q, 0, sz, 0b00011, vd, vn))
    }

    /// `uaddlv <vd>, <vn>`: unsigned widening sum across lanes.
    pub fn uaddlv(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let (q, sz) = across_arr("uaddlv", size)?;
        self.emit(enc_vec_lanes(q, 1, sz, 0b00011, vd, vn))
    }

    /// `smaxv <vd>, <vn>`: signed maximum across lanes.
    pub fn smaxv(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let (q, sz) = across_arr("smaxv", size)?;
        self.emit(enc_vec_lanes(q, 0, sz, 0b01010, vd, vn))
    }

    /// `sminv <vd>, <vn>`: signed minimum across lanes.
    pub fn sminv(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let (q, sz) = across_arr("sminv", size)?;
        self.emit(enc_vec_lanes(q, 0, sz, 0b11010, vd, vn))
    }

    /// `umaxv <vd>, <vn>`: unsigned maximum across lanes.
    pub fn umaxv(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let (q, sz) = across_arr("umaxv", size)?;
        self.emit(enc_vec_lanes(q, 1, sz, 0b01010, vd, vn))
    }

    /// `uminv <vd>, <vn>`: unsigned minimum across lanes.
    pub fn uminv(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        let (q, sz) = across_arr("uminv", size)?;
        self.emit(enc_vec_lanes(q, 1, sz, 0b11010, vd, vn))
    }

    /// The float reductions only exist for the `4s` arrangement.
    fn float_across(
        &mut self,
        mnemonic: &'static str,
        sz: u32,
        opcode: u32,
        size: VectorSize,
        vd: VReg,
        vn: VReg,
    ) -> EmitResult<()> {
        if size != VectorSize::Size32x4 {
            return Err(EmitError::Unallocated(mnemonic));
        }
        self.emit(enc_vec_lanes(1, 1, sz, opcode, vd, vn))
    }

    /// `fmaxv sd, <vn>.4s`: float maximum across lanes.
    pub fn fmaxv(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.float_across("fmaxv", 0b00, 0b01111, size, vd, vn)
    }

    /// `fminv sd, <vn>.4s`: float minimum across lanes.
    pub fn fminv(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.float_across("fminv", 0b10, 0b01111, size, vd, vn)
    }

    /// `fmaxnmv sd, <vn>.4s`: float maxNum across lanes.
    pub fn fmaxnmv(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.float_across("fmaxnmv", 0b00, 0b01100, size, vd, vn)
    }

    /// `fminnmv sd, <vn>.4s`: float minNum across lanes.
    pub fn fminnmv(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.float_across("fminnmv", 0b10, 0b01100, size, vd, vn)
    }

    // Permutes.

    /// `zip1 <vd>, <vn>, <vm>`.
    pub fn zip1(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        let (q, sz) = size.enc_size();
        self.emit(enc_vec_perm(q, sz, 0b011, vd, vn, vm))
    }

    /// `zip2 <vd>, <vn>, <vm>`.
    pub fn zip2(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        let (q, sz) = size.enc_size();
        self.emit(enc_vec_perm(q, sz, 0b111, vd, vn, vm))
    }

    /// `uzp1 <vd>, <vn>, <vm>`.
    pub fn uzp1(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        let (q, sz) = size.enc_size();
        self.emit(enc_vec_perm(q, sz, 0b001, vd, vn, vm))
    }

    /// `uzp2 <vd>, <vn>, <vm>`.
    pub fn uzp2(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        let (q, sz) = size.enc_size();
        self.emit(enc_vec_perm(q, sz, 0b101, vd, vn, vm))
    }

    /// `trn1 <vd>, <vn>, <vm>`.
    pub fn trn1(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        let (q, sz) = size.enc_size();
        self.emit(enc_vec_perm(q, sz, 0b010, vd, vn, vm))
    }

    /// `trn2 <vd>, <vn>, <vm>`.
    pub fn trn2(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        let (q, sz) = size.enc_size();
        self.emit(enc_vec_perm(q, sz, 0b110, vd, vn, vm))
    }

    // Element copies and moves.

    /// `dup <vd>, <vn>.<t>[idx]`: broadcast one element.
    pub fn dup_elem(&mut self, size: VectorSize, vd: VReg, vn: VReg, idx: u8) -> EmitResult<()> {
        let imm5 = copy_imm5("dup", size.lane_size(), idx)?;
        let q = size.is_128bits() as u32;
        self.emit(enc_vec_copy(q, 0, imm5, 0b0000, vd.enc(), vn.enc()))
    }

    /// `dup <vd>, rn`: broadcast a general register.
    pub fn dup_gp(&mut self, size: VectorSize, vd: VReg, rn: Reg) -> EmitResult<()> {
        let imm5 = copy_imm5("dup", size.lane_size(), 0)?;
        let q = size.is_128bits() as u32;
        self.emit(enc_vec_copy(q, 0, imm5, 0b0001, vd.enc(), rn.enc()))
    }

    /// `smov rd, <vn>.<t>[idx]`: signed element extract. Byte and halfword
    /// lanes extract to either width; word lanes only to a 64-bit register.
    pub fn smov(
        &mut self,
        size: OperandSize,
        lane: ScalarSize,
        rd: Reg,
        vn: VReg,
        idx: u8,
    ) -> EmitResult<()> {
        let legal = match lane {
            ScalarSize::Size8 | ScalarSize::Size16 => true,
            ScalarSize::Size32 => size == OperandSize::Size64,
            _ => false,
        };
        if !legal {
            return Err(EmitError::Unallocated("smov"));
        }
        let imm5 = copy_imm5("smov", lane, idx)?;
        self.emit(enc_vec_copy(size.sf_bit(), 0, imm5, 0b0101, rd.enc(), vn.enc()))
    }

    /// `umov rd, <vn>.<t>[idx]`: unsigned element extract. Doubleword lanes
    /// extract to a 64-bit register, everything else to 32-bit.
    pub fn umov(&mut self, lane: ScalarSize, rd: Reg, vn: VReg, idx: u8) -> EmitResult<()> {
        let imm5 = copy_imm5("umov", lane, idx)?;
        let q = (lane == ScalarSize::Size64) as u32;
        self.emit(enc_vec_copy(q, 0, imm5, 0b0111, rd.enc(), vn.enc()))
    }

    /// `ins <vd>.<t>[idx], rn`: insert a general register into one lane.
    pub fn ins_gp(&mut self, lane: ScalarSize, vd: VReg, idx: u8, rn: Reg) -> EmitResult<()> {
        let imm5 = copy_imm5("ins", lane, idx)?;
        self.emit(enc_vec_copy(1, 0, imm5, 0b0011, vd.enc(), rn.enc()))
    }

    /// `ins <vd>.<t>[didx], <vn>.<t>[sidx]`: element to element.
    pub fn ins_elem(
        &mut self,
        lane: ScalarSize,
        vd: VReg,
        didx: u8,
        vn: VReg,
        sidx: u8,
    ) -> EmitResult<()> {
        let imm5 = copy_imm5("ins", lane, didx)?;
        let ls = lane.enc_size();
        if u32::from(sidx) >= 16 >> ls {
            return Err(EmitError::InvalidOperand("ins"));
        }
        let imm4 = u32::from(sidx) << ls;
        self.emit(enc_vec_copy(1, 1, imm5, imm4, vd.enc(), vn.enc()))
    }

    /// `ext <vd>, <vn>, <vm>, #idx`: byte extract from a register pair.
    pub fn ext(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg, idx: u8) -> EmitResult<()> {
        let q = bytes_arr("ext", size)?;
        if u32::from(idx) >= 8 << q {
            return Err(EmitError::InvalidOperand("ext"));
        }
        self.emit(
            q << 30
                | 0b101110000 << 21
                | vm.enc() << 16
                | u32::from(idx) << 11
                | vn.enc() << 5
                | vd.enc(),
        )
    }

    /// `tbl <vd>, {<vn>}, <vm>`: single-register table lookup.
    pub fn tbl(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        let q = bytes_arr("tbl", size)?;
        self.emit(enc_tbl(q, 0b00, 0, vd, vn, vm))
    }

    /// `tbx <vd>, {<vn>}, <vm>`: like [`tbl`](Self::tbl) but out-of-range
    /// indices leave the destination lane unchanged.
    pub fn tbx(&mut self, size: VectorSize, vd: VReg, vn: VReg, vm: VReg) -> EmitResult<()> {
        let q = bytes_arr("tbx", size)?;
        self.emit(enc_tbl(q, 0b00, 1, vd, vn, vm))
    }

    // Shifts by immediate. The shift amount is folded into the `immh:immb`
    // field together with the lane width.

    /// `shl <vd>, <vn>, #shift` with `shift` in `0..lane_bits`.
    pub fn shl(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shl_imm("shl", 0, 0b01010, size, vd, vn, shift)
    }

    fn shr_imm(
        &mut self,
        mnemonic: &'static str,
        u: u32,
        opcode: u32,
        size: VectorSize,
        vd: VReg,
        vn: VReg,
        shift: u8,
    ) -> EmitResult<()> {
        let bits = u32::from(size.lane_size().bits());
        if shift == 0 || u32::from(shift) > bits {
            return Err(EmitError::ImmOutOfRange {
                mnemonic,
                value: u64::from(shift),
            });
        }
        let (q, _) = size.enc_size();
        self.emit(enc_vec_shift_imm(q, u, 2 * bits - u32::from(shift), opcode, vd, vn))
    }

    fn shl_imm(
        &mut self,
        mnemonic: &'static str,
        u: u32,
        opcode: u32,
        size: VectorSize,
        vd: VReg,
        vn: VReg,
        shift: u8,
    ) -> EmitResult<()> {
        let bits = u32::from(size.lane_size().bits());
        if u32::from(shift) >= bits {
            return Err(EmitError::ImmOutOfRange {
                mnemonic,
                value: u64::from(shift),
            });
        }
        let (q, _) = size.enc_size();
        self.emit(enc_vec_shift_imm(q, u, bits + u32::from(shift), opcode, vd, vn))
    }

    /// `sshr <vd>, <vn>, #shift` with `shift` in `1..=lane_bits`.
    pub fn sshr(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shr_imm("sshr", 0, 0b00000, size, vd, vn, shift)
    }

    /// `ushr <vd>, <vn>, #shift` with `shift` in `1..=lane_bits`.
    pub fn ushr(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shr_imm("ushr", 1, 0b00000, size, vd, vn, shift)
    }

    /// `ssra <vd>, <vn>, #shift`: shift right and accumulate, signed.
    pub fn ssra(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shr_imm("ssra", 0, 0b00010, size, vd, vn, shift)
    }

    /// `usra <vd>, <vn>, #shift`: shift right and accumulate, unsigned.
    pub fn usra(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shr_imm("usra", 1, 0b00010, size, vd, vn, shift)
    }

    /// `srshr <vd>, <vn>, #shift`: rounding shift right, signed.
    pub fn srshr(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shr_imm("srshr", 0, 0b00100, size, vd, vn, shift)
    }

    /// `urshr <vd>, <vn>, #shift`: rounding shift right, unsigned.
    pub fn urshr(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shr_imm("urshr", 1, 0b00100, size, vd, vn, shift)
    }

    /// `srsra <vd>, <vn>, #shift`: rounding shift right and accumulate,
    /// signed.
    pub fn srsra(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shr_imm("srsra", 0, 0b00110, size, vd, vn, shift)
    }

    /// `ursra <vd>, <vn>, #shift`: rounding shift right and accumulate,
    /// unsigned.
    pub fn ursra(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shr_imm("ursra", 1, 0b00110, size, vd, vn, shift)
    }

    /// `sri <vd>, <vn>, #shift`: shift right and insert.
    pub fn sri(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shr_imm("sri", 1, 0b01000, size, vd, vn, shift)
    }

    /// `sli <vd>, <vn>, #shift`: shift left and insert.
    pub fn sli(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shl_imm("sli", 1, 0b01010, size, vd, vn, shift)
    }

    /// `sqshl <vd>, <vn>, #shift`: signed saturating shift left.
    pub fn sqshl_imm(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shl_imm("sqshl", 0, 0b01110, size, vd, vn, shift)
    }

    /// `uqshl <vd>, <vn>, #shift`: unsigned saturating shift left.
    pub fn uqshl_imm(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shl_imm("uqshl", 1, 0b01110, size, vd, vn, shift)
    }

    fn shll_imm(
        &mut self,
        mnemonic: &'static str,
        u: u32,
        size: VectorSize,
        vd: VReg,
        vn: VReg,
        shift: u8,
    ) -> EmitResult<()> {
        narrow_arr(mnemonic, size)?;
        let bits = u32::from(size.lane_size().bits());
        if u32::from(shift) >= bits {
            return Err(EmitError::ImmOutOfRange {
                mnemonic,
                value: u64::from(shift),
            });
        }
        self.emit(enc_vec_shift_imm(0, u, bits + u32::from(shift), 0b10100, vd, vn))
    }

    fn shll2_imm(
        &mut self,
        mnemonic: &'static str,
        u: u32,
        size: VectorSize,
        vd: VReg,
        vn: VReg,
        shift: u8,
    ) -> EmitResult<()> {
        match size {
            VectorSize::Size8x16 | VectorSize::Size16x8 | VectorSize::Size32x4 => {}
            _ => return Err(EmitError::InvalidOperand(mnemonic)),
        }
        let bits = u32::from(size.lane_size().bits());
        if u32::from(shift) >= bits {
            return Err(EmitError::ImmOutOfRange {
                mnemonic,
                value: u64::from(shift),
            });
        }
        self.emit(enc_vec_shift_imm(1, u, bits + u32::from(shift), 0b10100, vd, vn))
    }

    /// `sshll <vd>, <vn>, #shift`: signed widening shift left. `size` names
    /// the narrow source arrangement (`8b`/`4h`/`2s`).
    pub fn sshll(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shll_imm("sshll", 0, size, vd, vn, shift)
    }

    /// `sshll2 <vd>, <vn>, #shift`: signed widening shift left from the high
    /// half. `size` names the full source arrangement (`16b`/`8h`/`4s`).
    pub fn sshll2(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shll2_imm("sshll2", 0, size, vd, vn, shift)
    }

    /// `ushll <vd>, <vn>, #shift`: unsigned widening shift left.
    pub fn ushll(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shll_imm("ushll", 1, size, vd, vn, shift)
    }

    /// `ushll2 <vd>, <vn>, #shift`: unsigned widening shift left from the
    /// high half.
    pub fn ushll2(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shll2_imm("ushll2", 1, size, vd, vn, shift)
    }

    /// `sxtl <vd>, <vn>`: signed widen (`sshll #0`). `size` names the narrow
    /// source arrangement.
    pub fn sxtl(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.shll_imm("sxtl", 0, size, vd, vn, 0)
    }

    /// `sxtl2 <vd>, <vn>`: signed widen from the high half (`sshll2 #0`).
    pub fn sxtl2(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.shll2_imm("sxtl2", 0, size, vd, vn, 0)
    }

    /// `uxtl <vd>, <vn>`: unsigned widen (`ushll #0`).
    pub fn uxtl(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.shll_imm("uxtl", 1, size, vd, vn, 0)
    }

    /// `uxtl2 <vd>, <vn>`: unsigned widen from the high half (`ushll2 #0`).
    pub fn uxtl2(&mut self, size: VectorSize, vd: VReg, vn: VReg) -> EmitResult<()> {
        self.shll2_imm("uxtl2", 1, size, vd, vn, 0)
    }

    fn shrn_imm(
        &mut self,
        mnemonic: &'static str,
        u: u32,
        opcode: u32,
        size: VectorSize,
        vd: VReg,
        vn: VReg,
        shift: u8,
    ) -> EmitResult<()> {
        narrow_arr(mnemonic, size)?;
        let bits = u32::from(size.lane_size().bits());
        if shift == 0 || u32::from(shift) > bits {
            return Err(EmitError::ImmOutOfRange {
                mnemonic,
                value: u64::from(shift),
            });
        }
        self.emit(enc_vec_shift_imm(0, u, 2 * bits - u32::from(shift), opcode, vd, vn))
    }

    fn shrn2_imm(
        &mut self,
        mnemonic: &'static str,
        u: u32,
        opcode: u32,
        size: VectorSize,
        vd: VReg,
        vn: VReg,
        shift: u8,
    ) -> EmitResult<()> {
        match size {
            VectorSize::Size8x16 | VectorSize::Size16x8 | VectorSize::Size32x4 => {}
            _ => return Err(EmitError::InvalidOperand(mnemonic)),
        }
        let bits = u32::from(size.lane_size().bits());
        if shift == 0 || u32::from(shift) > bits {
            return Err(EmitError::ImmOutOfRange {
                mnemonic,
                value: u64::from(shift),
            });
        }
        self.emit(enc_vec_shift_imm(1, u, 2 * bits - u32::from(shift), opcode, vd, vn))
    }

    /// `shrn <vd>, <vn>, #shift`: narrowing shift right. `size` names the
    /// narrow destination arrangement and `shift` ranges over
    /// `1..=dest_lane_bits`.
    pub fn shrn(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shrn_imm("shrn", 0, 0b10000, size, vd, vn, shift)
    }

    /// `shrn2 <vd>, <vn>, #shift`: narrowing shift right into the high half.
    /// `size` names the full destination arrangement (`16b`/`8h`/`4s`).
    pub fn shrn2(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shrn2_imm("shrn2", 0, 0b10000, size, vd, vn, shift)
    }

    /// `rshrn <vd>, <vn>, #shift`: rounding narrowing shift right.
    pub fn rshrn(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shrn_imm("rshrn", 0, 0b10001, size, vd, vn, shift)
    }

    /// `rshrn2 <vd>, <vn>, #shift`: rounding narrowing shift right into the
    /// high half.
    pub fn rshrn2(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shrn2_imm("rshrn2", 0, 0b10001, size, vd, vn, shift)
    }

    /// `sqshrn <vd>, <vn>, #shift`: signed saturating narrowing shift right.
    pub fn sqshrn(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shrn_imm("sqshrn", 0, 0b10010, size, vd, vn, shift)
    }

    /// `sqshrn2 <vd>, <vn>, #shift`.
    pub fn sqshrn2(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shrn2_imm("sqshrn2", 0, 0b10010, size, vd, vn, shift)
    }

    /// `uqshrn <vd>, <vn>, #shift`: unsigned saturating narrowing shift
    /// right.
    pub fn uqshrn(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shrn_imm("uqshrn", 1, 0b10010, size, vd, vn, shift)
    }

    /// `uqshrn2 <vd>, <vn>, #shift`.
    pub fn uqshrn2(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shrn2_imm("uqshrn2", 1, 0b10010, size, vd, vn, shift)
    }

    /// `sqrshrn <vd>, <vn>, #shift`: signed saturating rounding narrowing
    /// shift right.
    pub fn sqrshrn(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shrn_imm("sqrshrn", 0, 0b10011, size, vd, vn, shift)
    }

    /// `sqrshrn2 <vd>, <vn>, #shift`.
    pub fn sqrshrn2(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shrn2_imm("sqrshrn2", 0, 0b10011, size, vd, vn, shift)
    }

    /// `uqrshrn <vd>, <vn>, #shift`: unsigned saturating rounding narrowing
    /// shift right.
    pub fn uqrshrn(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shrn_imm("uqrshrn", 1, 0b10011, size, vd, vn, shift)
    }

    /// `uqrshrn2 <vd>, <vn>, #shift`.
    pub fn uqrshrn2(&mut self, size: VectorSize, vd: VReg, vn: VReg, shift: u8) -> EmitResult<()> {
        self.shrn2_imm("uqrshrn2", 1, 0b10011, size, vd, vn, shift)
    }

    // Modified-immediate forms.

    /// `movi <vd>, #imm{, lsl #amount}`: replicated immediate move.
    pub fn movi(&mut self, size: VectorSize, vd: VReg, imm: u8, lsl: u32) -> EmitResult<()> {
        let lane = size.lane_size();
        let mv = ASIMDMovModImm::maybe_with_lsl(imm, lsl, lane)
            .ok_or(EmitError::InvalidOperand("movi"))?;
        let q = size.is_128bits() as u32;
        let cmode = match lane {
            ScalarSize::Size8 => 0b1110,
            ScalarSize::Size16 => 0b1000 | mv.shift() << 1,
            ScalarSize::Size32 => mv.shift() << 1,
            _ => return Err(EmitError::Unallocated("movi")),
        };
        self.emit(enc_asimd_mod_imm(q, 0, cmode, mv.imm(), vd))
    }

    /// `movi <vd>, #imm, msl #amount`: the 32-bit "shifting ones" form.
    pub fn movi_msl(&mut self, size: VectorSize, vd: VReg, imm: u8, msl: u32) -> EmitResult<()> {
        if size.lane_size() != ScalarSize::Size32 {
            return Err(EmitError::Unallocated("movi"));
        }
        let mv =
            ASIMDMovModImm::maybe_with_msl(imm, msl).ok_or(EmitError::InvalidOperand("movi"))?;
        let q = size.is_128bits() as u32;
        self.emit(enc_asimd_mod_imm(q, 0, 0b1100 | (mv.shift() - 1), mv.imm(), vd))
    }

    /// `movi <vd>.2d, #mask`: 64-bit per-byte mask form. Every byte of
    /// `value` must be `0x00` or `0xff`.
    pub fn movi_mask(&mut self, size: VectorSize, vd: VReg, value: u64) -> EmitResult<()> {
        if size != VectorSize::Size64x2 {
            return Err(EmitError::Unallocated("movi"));
        }
        let mv = ASIMDMovModImm::maybe_mask_from_u64(value).ok_or(EmitError::ImmOutOfRange {
            mnemonic: "movi",
            value,
        })?;
        self.emit(enc_asimd_mod_imm(1, 1, 0b1110, mv.imm(), vd))
    }

    /// `mvni <vd>, #imm{, lsl #amount}`: inverted immediate move, halfword
    /// and word lanes only.
    pub fn mvni(&mut self, size: VectorSize, vd: VReg, imm: u8, lsl: u32) -> EmitResult<()> {
        let lane = size.lane_size();
        let mv = ASIMDMovModImm::maybe_with_lsl(imm, lsl, lane)
            .ok_or(EmitError::InvalidOperand("mvni"))?;
        let q = size.is_128bits() as u32;
        let cmode = match lane {
            ScalarSize::Size16 => 0b1000 | mv.shift() << 1,
            ScalarSize::Size32 => mv.shift() << 1,
            _ => return Err(EmitError::Unallocated("mvni")),
        };
        self.emit(enc_asimd_mod_imm(q, 1, cmode, mv.imm(), vd))
    }

    /// `mvni <vd>, #imm, msl #amount`.
    pub fn mvni_msl(&mut self, size: VectorSize, vd: VReg, imm: u8, msl: u32) -> EmitResult<()> {
        if size.lane_size() != ScalarSize::Size32 {
            return Err(EmitError::Unallocated("mvni"));
        }
        let mv =
            ASIMDMovModImm::maybe_with_msl(imm, msl).ok_or(EmitError::InvalidOperand("mvni"))?;
        let q = size.is_128bits() as u32;
        self.emit(enc_asimd_mod_imm(q, 1, 0b1100 | (mv.shift() - 1), mv.imm(), vd))
    }

    fn logic_imm(
        &mut self,
        mnemonic: &'static str,
        op: u32,
        size: VectorSize,
        vd: VReg,
        imm: u8,
        lsl: u32,
    ) -> EmitResult<()> {
        let lane = size.lane_size();
        let mv = ASIMDMovModImm::maybe_with_lsl(imm, lsl, lane)
            .ok_or(EmitError::InvalidOperand(mnemonic))?;
        let q = size.is_128bits() as u32;
        let cmode = match lane {
            ScalarSize::Size16 => 0b1001 | mv.shift() << 1,
            ScalarSize::Size32 => mv.shift() << 1 | 1,
            _ => return Err(EmitError::Unallocated(mnemonic)),
        };
        self.emit(enc_asimd_mod_imm(q, op, cmode, mv.imm(), vd))
    }

    /// `orr <vd>, #imm{, lsl #amount}`: bitwise or with a replicated
    /// immediate, halfword and word lanes only.
    pub fn orr_vec_imm(&mut self, size: VectorSize, vd: VReg, imm: u8, lsl: u32) -> EmitResult<()> {
        self.logic_imm("orr", 0, size, vd, imm, lsl)
    }

    /// `bic <vd>, #imm{, lsl #amount}`: bit clear with a replicated
    /// immediate, halfword and word lanes only.
    pub fn bic_vec_imm(&mut self, size: VectorSize, vd: VReg, imm: u8, lsl: u32) -> EmitResult<()> {
        self.logic_imm("bic", 1, size, vd, imm, lsl)
    }

    /// `fmov <vd>, #imm`: replicated FP immediate. `bits` is the raw bit
    /// pattern of the value at the lane width.
    pub fn fmov_vec(&mut self, size: VectorSize, vd: VReg, bits: u64) -> EmitResult<()> {
        let (lane, op, q) = match size.lane_size() {
            ScalarSize::Size32 => (ScalarSize::Size32, 0, size.is_128bits() as u32),
            ScalarSize::Size64 => (ScalarSize::Size64, 1, 1),
            _ => return Err(EmitError::Unallocated("fmov")),
        };
        let imm8 = ASIMDFPImm::maybe_from_u64(bits, lane).ok_or(EmitError::ImmOutOfRange {
            mnemonic: "fmov",
            value: bits,
        })?;
        self.emit(enc_asimd_mod_imm(q, op, 0b1111, imm8.enc_bits(), vd))
    }

    // Multiplies by a single element.

    fn elem_fields(
        &self,
        mnemonic: &'static str,
        lane: ScalarSize,
        vm: VReg,
        idx: u8,
    ) -> EmitResult<(u32, u32, u32, u32)> {
        let idx = u32::from(idx);
        match lane {
            ScalarSize::Size16 => {
                if idx > 7 || vm.enc() > 15 {
                    return Err(EmitError::InvalidOperand(mnemonic));
                }
                Ok((idx >> 2 & 1, idx >> 1 & 1, idx & 1, vm.enc()))
            }
            ScalarSize::Size32 => {
                if idx > 3 {
                    return Err(EmitError::InvalidOperand(mnemonic));
                }
                Ok((idx >> 1, idx & 1, vm.enc() >> 4, vm.enc() & 0xf))
            }
            ScalarSize::Size64 => {
                if idx > 1 {
                    return Err(EmitError::InvalidOperand(mnemonic));
                }
                Ok((idx, 0, vm.enc() >> 4, vm.enc() & 0xf))
            }
            _ => Err(EmitError::Unallocated(mnemonic)),
        }
    }

    fn v_elem(
        &mut self,
        mnemonic: &'static str,
        u: u32,
        size: VectorSize,
        opcode: u32,
        vd: VReg,
        vn: VReg,
        vm: VReg,
        idx: u8,
    ) -> EmitResult<()> {
        let (h, l, m, rm) = self.elem_fields(mnemonic, size.lane_size(), vm, idx)?;
        let (q, sz) = size.enc_size();
        self.emit(
            q << 30
                | u << 29
                | 0b01111 << 24
                | sz << 22
                | l << 21
                | m << 20
                | rm << 16
                | opcode << 12
                | h << 11
                | vn.enc() << 5
                | vd.enc(),
        )
    }

    /// `fmul <vd>, <vn>, <vm>.<t>[idx]`.
    pub fn fmul_elem(
        &mut self,
        size: VectorSize,
        vd: VReg,
        vn: VReg,
        vm: VReg,
        idx: u8,
    ) -> EmitResult<()> {
        float_arr("fmul", size)?;
        self.v_elem("fmul", 0, size, 0b1001, vd, vn, vm, idx)
    }

    /// `fmla <vd>, <vn>, <vm>.<t>[idx]`.
    pub fn fmla_elem(
        &mut self,
        size: VectorSize,
        vd: VReg,
        vn: VReg,
        vm: VReg,
        idx: u8,
    ) -> EmitResult<()> {
        float_arr("fmla", size)?;
        self.v_elem("fmla", 0, size, 0b0001, vd, vn, vm, idx)
    }

    /// `fmls <vd>, <vn>, <vm>.<t>[idx]`.
    pub fn fmls_elem(
        &mut self,
        size: VectorSize,
        vd: VReg,
        vn: VReg,
        vm: VReg,
        idx: u8,
    ) -> EmitResult<()> {
        float_arr("fmls", size)?;
        self.v_elem("fmls", 0, size, 0b0101, vd, vn, vm, idx)
    }

    /// `mul <vd>, <vn>, <vm>.<t>[idx]`: halfword and word lanes only.
    pub fn mul_elem(
        &mut self,
        size: VectorSize,
        vd: VReg,
        vn: VReg,
        vm: VReg,
        idx: u8,
    ) -> EmitResult<()> {
        no_d_lanes("mul", size)?;
        self.v_elem("mul", 0, size, 0b1000, vd, vn, vm, idx)
    }

    /// `mla <vd>, <vn>, <vm>.<t>[idx]`.
    pub fn mla_elem(
        &mut self,
        size: VectorSize,
        vd: VReg,
        vn: VReg,
        vm: VReg,
        idx: u8,
    ) -> EmitResult<()> {
        no_d_lanes("mla", size)?;
        self.v_elem("mla", 1, size, 0b0000, vd, vn, vm, idx)
    }

    /// `mls <vd>, <vn>, <vm>.<t>[idx]`.
    pub fn mls_elem(
        &mut self,
        size: VectorSize,
        vd: VReg,
        vn: VReg,
        vm: VReg,
        idx: u8,
    ) -> EmitResult<()> {
        no_d_lanes("mls", size)?;
        self.v_elem("mls", 1, size, 0b0100, vd, vn, vm, idx)
    }

    /// `fmulx <vd>, <vn>, <vm>.<t>[idx]`.
    pub fn fmulx_elem(
        &mut self,
        size: VectorSize,
        vd: VReg,
        vn: VReg,
        vm: VReg,
        idx: u8,
    ) -> EmitResult<()> {
        float_arr("fmulx", size)?;
        self.v_elem("fmulx", 1, size, 0b1001, vd, vn, vm, idx)
    }
}
