//! Scalar integer data-processing instructions.

use crate::args::{Cond, ExtendOp, OperandSize, ShiftOp};
use crate::buffer::{Label, LabelUse};
use crate::imms::{Imm12, ImmLogic, MoveWideConst};
use crate::inst::{
    enc_adr, enc_arith_rr_imm12, enc_arith_rr_imml, enc_arith_rrr, enc_arith_rrrr, enc_bfm,
    enc_bit_rr, enc_ccmp, enc_csel, enc_extr, enc_move_wide,
};
use crate::regs::{zero_reg, Reg};
use crate::result::{EmitError, EmitResult};
use crate::Assembler;

/// Add/subtract and logical opcodes share a four-way (op, S) selector.
#[derive(Clone, Copy)]
enum AddSubOp {
    Add = 0b00,
    Adds = 0b01,
    Sub = 0b10,
    Subs = 0b11,
}

impl AddSubOp {
    fn mnemonic(self) -> &'static str {
        match self {
            AddSubOp::Add => "add",
            AddSubOp::Adds => "adds",
            AddSubOp::Sub => "sub",
            AddSubOp::Subs => "subs",
        }
    }
}

#[derive(Clone, Copy)]
enum LogicalOp {
    And = 0b00,
    Orr = 0b01,
    Eor = 0b10,
    Ands = 0b11,
}

impl LogicalOp {
    fn mnemonic(self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Orr => "orr",
            LogicalOp::Eor => "eor",
            LogicalOp::Ands => "ands",
        }
    }
}

impl Assembler {
    fn addsub_shifted(
        &mut self,
        op: AddSubOp,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        rm: Reg,
        shift: ShiftOp,
        amount: u8,
    ) -> EmitResult<()> {
        if shift == ShiftOp::Ror {
            return Err(EmitError::InvalidOperand(op.mnemonic()));
        }
        if amount >= size.bits() {
            return Err(EmitError::InvalidOperand(op.mnemonic()));
        }
        let top11 = size.sf_bit() << 10 | (op as u32) << 8 | 0b01011_000 | shift.bits() << 1;
        self.emit(enc_arith_rrr(top11, u32::from(amount), rd, rn, rm))
    }

    fn addsub_ext(
        &mut self,
        op: AddSubOp,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        rm: Reg,
        ext: ExtendOp,
        shift: u8,
    ) -> EmitResult<()> {
        if shift > 4 {
            return Err(EmitError::InvalidOperand(op.mnemonic()));
        }
        let top11 = size.sf_bit() << 10 | (op as u32) << 8 | 0b01011_001;
        let bits_15_10 = ext.bits() << 3 | u32::from(shift);
        self.emit(enc_arith_rrr(top11, bits_15_10, rd, rn, rm))
    }

    fn addsub_imm(
        &mut self,
        op: AddSubOp,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        imm: u64,
    ) -> EmitResult<()> {
        let imm12 = Imm12::maybe_from_u64(imm).ok_or(EmitError::ImmOutOfRange {
            mnemonic: op.mnemonic(),
            value: imm,
        })?;
        let bits = size.sf_bit() << 7 | (op as u32) << 5 | 0b10001;
        self.emit(enc_arith_rr_imm12(bits, imm12, rn, rd))
    }

    /// `add rd, rn, rm`.
    pub fn add(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.add_shifted(size, rd, rn, rm, ShiftOp::Lsl, 0)
    }

    /// `add rd, rn, rm, <shift> #amount`. `ror` is not allocated for
    /// add/subtract.
    pub fn add_shifted(
        &mut self,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        rm: Reg,
        shift: ShiftOp,
        amount: u8,
    ) -> EmitResult<()> {
        self.addsub_shifted(AddSubOp::Add, size, rd, rn, rm, shift, amount)
    }

    /// `adds rd, rn, rm, <shift> #amount`.
    pub fn adds_shifted(
        &mut self,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        rm: Reg,
        shift: ShiftOp,
        amount: u8,
    ) -> EmitResult<()> {
        self.addsub_shifted(AddSubOp::Adds, size, rd, rn, rm, shift, amount)
    }

    /// `sub rd, rn, rm`.
    pub fn sub(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.sub_shifted(size, rd, rn, rm, ShiftOp::Lsl, 0)
    }

    /// `sub rd, rn, rm, <shift> #amount`.
    pub fn sub_shifted(
        &mut self,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        rm: Reg,
        shift: ShiftOp,
        amount: u8,
    ) -> EmitResult<()> {
        self.addsub_shifted(AddSubOp::Sub, size, rd, rn, rm, shift, amount)
    }

    /// `subs rd, rn, rm, <shift> #amount`.
    pub fn subs_shifted(
        &mut self,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        rm: Reg,
        shift: ShiftOp,
        amount: u8,
    ) -> EmitResult<()> {
        self.addsub_shifted(AddSubOp::Subs, size, rd, rn, rm, shift, amount)
    }

    /// `adds rd, rn, rm`.
    pub fn adds(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.adds_shifted(size, rd, rn, rm, ShiftOp::Lsl, 0)
    }

    /// `subs rd, rn, rm`.
    pub fn subs(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.subs_shifted(size, rd, rn, rm, ShiftOp::Lsl, 0)
    }

    /// `cmp rn, rm` (`subs` with a discarded result).
    pub fn cmp(&mut self, size: OperandSize, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.subs(size, zero_reg(), rn, rm)
    }

    /// `cmn rn, rm` (`adds` with a discarded result).
    pub fn cmn(&mut self, size: OperandSize, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.adds(size, zero_reg(), rn, rm)
    }

    /// `neg rd, rm`.
    pub fn neg(&mut self, size: OperandSize, rd: Reg, rm: Reg) -> EmitResult<()> {
        self.sub(size, rd, zero_reg(), rm)
    }

    /// `negs rd, rm`.
    pub fn negs(&mut self, size: OperandSize, rd: Reg, rm: Reg) -> EmitResult<()> {
        self.subs(size, rd, zero_reg(), rm)
    }

    /// `add rd, rn, rm, <extend> #shift` with `shift` in 0..=4.
    pub fn add_ext(
        &mut self,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        rm: Reg,
        ext: ExtendOp,
        shift: u8,
    ) -> EmitResult<()> {
        self.addsub_ext(AddSubOp::Add, size, rd, rn, rm, ext, shift)
    }

    /// `adds rd, rn, rm, <extend> #shift`.
    pub fn adds_ext(
        &mut self,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        rm: Reg,
        ext: ExtendOp,
        shift: u8,
    ) -> EmitResult<()> {
        self.addsub_ext(AddSubOp::Adds, size, rd, rn, rm, ext, shift)
    }

    /// `sub rd, rn, rm, <extend> #shift`.
    pub fn sub_ext(
        &mut self,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        rm: Reg,
        ext: ExtendOp,
        shift: u8,
    ) -> EmitResult<()> {
        self.addsub_ext(AddSubOp::Sub, size, rd, rn, rm, ext, shift)
    }

    /// `subs rd, rn, rm, <extend> #shift`.
    pub fn subs_ext(
        &mut self,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        rm: Reg,
        ext: ExtendOp,
        shift: u8,
    ) -> EmitResult<()> {
        self.addsub_ext(AddSubOp::Subs, size, rd, rn, rm, ext, shift)
    }

    /// `add rd, rn, #imm`, with `imm` a 12-bit value optionally shifted left
    /// by 12. SP is a legal base and destination here.
    pub fn add_imm(&mut self, size: OperandSize, rd: Reg, rn: Reg, imm: u64) -> EmitResult<()> {
        self.addsub_imm(AddSubOp::Add, size, rd, rn, imm)
    }

    /// `adds rd, rn, #imm`.
    pub fn adds_imm(&mut self, size: OperandSize, rd: Reg, rn: Reg, imm: u64) -> EmitResult<()> {
        self.addsub_imm(AddSubOp::Adds, size, rd, rn, imm)
    }

    /// `sub rd, rn, #imm`.
    pub fn sub_imm(&mut self, size: OperandSize, rd: Reg, rn: Reg, imm: u64) -> EmitResult<()> {
        self.addsub_imm(AddSubOp::Sub, size, rd, rn, imm)
    }

    /// `subs rd, rn, #imm`.
    pub fn subs_imm(&mut self, size: OperandSize, rd: Reg, rn: Reg, imm: u64) -> EmitResult<()> {
        self.addsub_imm(AddSubOp::Subs, size, rd, rn, imm)
    }

    /// `cmp rn, #imm`.
    pub fn cmp_imm(&mut self, size: OperandSize, rn: Reg, imm: u64) -> EmitResult<()> {
        self.subs_imm(size, zero_reg(), rn, imm)
    }

    /// `cmn rn, #imm`.
    pub fn cmn_imm(&mut self, size: OperandSize, rn: Reg, imm: u64) -> EmitResult<()> {
        self.adds_imm(size, zero_reg(), rn, imm)
    }

    fn addsub_carry(
        &mut self,
        op: AddSubOp,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        rm: Reg,
    ) -> EmitResult<()> {
        let top11 = size.sf_bit() << 10 | (op as u32) << 8 | 0b11010000;
        self.emit(enc_arith_rrr(top11, 0, rd, rn, rm))
    }

    /// `adc rd, rn, rm`.
    pub fn adc(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.addsub_carry(AddSubOp::Add, size, rd, rn, rm)
    }

    /// `adcs rd, rn, rm`.
    pub fn adcs(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.addsub_carry(AddSubOp::Adds, size, rd, rn, rm)
    }

    /// `sbc rd, rn, rm`.
    pub fn sbc(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.addsub_carry(AddSubOp::Sub, size, rd, rn, rm)
    }

    /// `sbcs rd, rn, rm`.
    pub fn sbcs(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.addsub_carry(AddSubOp::Subs, size, rd, rn, rm)
    }

    fn logical_shifted(
        &mut self,
        op: LogicalOp,
        invert: bool,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        rm: Reg,
        shift: ShiftOp,
        amount: u8,
    ) -> EmitResult<()> {
        if amount >= size.bits() {
            return Err(EmitError::InvalidOperand(op.mnemonic()));
        }
        let top11 =
            size.sf_bit() << 10 | (op as u32) << 8 | 0b01010_000 | shift.bits() << 1 | invert as u32;
        self.emit(enc_arith_rrr(top11, u32::from(amount), rd, rn, rm))
    }

    fn logical_imm(
        &mut self,
        op: LogicalOp,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        imm: u64,
    ) -> EmitResult<()> {
        let imml = ImmLogic::maybe_from_u64(imm, size).ok_or(EmitError::ImmOutOfRange {
            mnemonic: op.mnemonic(),
            value: imm,
        })?;
        let bits = size.sf_bit() << 8 | (op as u32) << 6 | 0b100100;
        self.emit(enc_arith_rr_imml(bits, imml, rn, rd))
    }

    /// `and rd, rn, rm`.
    pub fn and(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.and_shifted(size, rd, rn, rm, ShiftOp::Lsl, 0)
    }

    /// `and rd, rn, rm, <shift> #amount`.
    pub fn and_shifted(
        &mut self,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        rm: Reg,
        shift: ShiftOp,
        amount: u8,
    ) -> EmitResult<()> {
        self.logical_shifted(LogicalOp::And, false, size, rd, rn, rm, shift, amount)
    }

    /// `orr rd, rn, rm`.
    pub fn orr(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.orr_shifted(size, rd, rn, rm, ShiftOp::Lsl, 0)
    }

    /// `orr rd, rn, rm, <shift> #amount`.
    pub fn orr_shifted(
        &mut self,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        rm: Reg,
        shift: ShiftOp,
        amount: u8,
    ) -> EmitResult<()> {
        self.logical_shifted(LogicalOp::Orr, false, size, rd, rn, rm, shift, amount)
    }

    /// `eor rd, rn, rm`.
    pub fn eor(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.eor_shifted(size, rd, rn, rm, ShiftOp::Lsl, 0)
    }

    /// `eor rd, rn, rm, <shift> #amount`.
    pub fn eor_shifted(
        &mut self,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        rm: Reg,
        shift: ShiftOp,
        amount: u8,
    ) -> EmitResult<()> {
        self.logical_shifted(LogicalOp::Eor, false, size, rd, rn, rm, shift, amount)
    }

    /// `ands rd, rn, rm`.
    pub fn ands(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.logical_shifted(LogicalOp::Ands, false, size, rd, rn, rm, ShiftOp::Lsl, 0)
    }

    /// `bic rd, rn, rm` (and with complement).
    pub fn bic(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.logical_shifted(LogicalOp::And, true, size, rd, rn, rm, ShiftOp::Lsl, 0)
    }

    /// `orn rd, rn, rm` (or with complement).
    pub fn orn(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.logical_shifted(LogicalOp::Orr, true, size, rd, rn, rm, ShiftOp::Lsl, 0)
    }

    /// `eon rd, rn, rm` (exclusive-or with complement).
    pub fn eon(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.logical_shifted(LogicalOp::Eor, true, size, rd, rn, rm, ShiftOp::Lsl, 0)
    }

    /// `bics rd, rn, rm`.
    pub fn bics(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.logical_shifted(LogicalOp::Ands, true, size, rd, rn, rm, ShiftOp::Lsl, 0)
    }

    /// `tst rn, rm`.
    pub fn tst(&mut self, size: OperandSize, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.ands(size, zero_reg(), rn, rm)
    }

    /// `mvn rd, rm`.
    pub fn mvn(&mut self, size: OperandSize, rd: Reg, rm: Reg) -> EmitResult<()> {
        self.orn(size, rd, zero_reg(), rm)
    }

    /// `and rd, rn, #imm` with a bitmask immediate.
    pub fn and_imm(&mut self, size: OperandSize, rd: Reg, rn: Reg, imm: u64) -> EmitResult<()> {
        self.logical_imm(LogicalOp::And, size, rd, rn, imm)
    }

    /// `orr rd, rn, #imm` with a bitmask immediate.
    pub fn orr_imm(&mut self, size: OperandSize, rd: Reg, rn: Reg, imm: u64) -> EmitResult<()> {
        self.logical_imm(LogicalOp::Orr, size, rd, rn, imm)
    }

    /// `eor rd, rn, #imm` with a bitmask immediate.
    pub fn eor_imm(&mut self, size: OperandSize, rd: Reg, rn: Reg, imm: u64) -> EmitResult<()> {
        self.logical_imm(LogicalOp::Eor, size, rd, rn, imm)
    }

    /// `ands rd, rn, #imm` with a bitmask immediate.
    pub fn ands_imm(&mut self, size: OperandSize, rd: Reg, rn: Reg, imm: u64) -> EmitResult<()> {
        self.logical_imm(LogicalOp::Ands, size, rd, rn, imm)
    }

    /// `tst rn, #imm` with a bitmask immediate.
    pub fn tst_imm(&mut self, size: OperandSize, rn: Reg, imm: u64) -> EmitResult<()> {
        self.ands_imm(size, zero_reg(), rn, imm)
    }

    fn dp_2src(&mut self, size: OperandSize, opcode: u32, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        let top11 = size.sf_bit() << 10 | 0b00_11010110;
        self.emit(enc_arith_rrr(top11, opcode, rd, rn, rm))
    }

    /// `lsl rd, rn, rm` (shift amount from a register).
    pub fn lsl(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.dp_2src(size, 0b001000, rd, rn, rm)
    }

    /// `lsr rd, rn, rm`.
    pub fn lsr(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.dp_2src(size, 0b001001, rd, rn, rm)
    }

    /// `asr rd, rn, rm`.
    pub fn asr(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.dp_2src(size, 0b001010, rd, rn, rm)
    }

    /// `ror rd, rn, rm`.
    pub fn ror(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.dp_2src(size, 0b001011, rd, rn, rm)
    }

    /// `udiv rd, rn, rm`.
    pub fn udiv(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.dp_2src(size, 0b000010, rd, rn, rm)
    }

    /// `sdiv rd, rn, rm`.
    pub fn sdiv(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.dp_2src(size, 0b000011, rd, rn, rm)
    }

    /// `madd rd, rn, rm, ra`.
    pub fn madd(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg, ra: Reg) -> EmitResult<()> {
        let top11 = size.sf_bit() << 10 | 0b00_11011_000;
        self.emit(enc_arith_rrrr(top11, rm, 0, ra, rn, rd))
    }

    /// `msub rd, rn, rm, ra`.
    pub fn msub(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg, ra: Reg) -> EmitResult<()> {
        let top11 = size.sf_bit() << 10 | 0b00_11011_000;
        self.emit(enc_arith_rrrr(top11, rm, 1, ra, rn, rd))
    }

    /// `mul rd, rn, rm`.
    pub fn mul(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.madd(size, rd, rn, rm, zero_reg())
    }

    /// `mneg rd, rn, rm`.
    pub fn mneg(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.msub(size, rd, rn, rm, zero_reg())
    }

    /// `smaddl rd, wn, wm, ra`: signed 32x32 + 64 -> 64 multiply-add.
    pub fn smaddl(&mut self, rd: Reg, rn: Reg, rm: Reg, ra: Reg) -> EmitResult<()> {
        self.emit(enc_arith_rrrr(0b10011011001, rm, 0, ra, rn, rd))
    }

    /// `smsubl rd, wn, wm, ra`.
    pub fn smsubl(&mut self, rd: Reg, rn: Reg, rm: Reg, ra: Reg) -> EmitResult<()> {
        self.emit(enc_arith_rrrr(0b10011011001, rm, 1, ra, rn, rd))
    }

    /// `umaddl rd, wn, wm, ra`: unsigned 32x32 + 64 -> 64 multiply-add.
    pub fn umaddl(&mut self, rd: Reg, rn: Reg, rm: Reg, ra: Reg) -> EmitResult<()> {
        self.emit(enc_arith_rrrr(0b10011011101, rm, 0, ra, rn, rd))
    }

    /// `umsubl rd, wn, wm, ra`.
    pub fn umsubl(&mut self, rd: Reg, rn: Reg, rm: Reg, ra: Reg) -> EmitResult<()> {
        self.emit(enc_arith_rrrr(0b10011011101, rm, 1, ra, rn, rd))
    }

    /// `smull rd, wn, wm`: signed 32x32 -> 64 multiply.
    pub fn smull(&mut self, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.smaddl(rd, rn, rm, zero_reg())
    }

    /// `umull rd, wn, wm`: unsigned 32x32 -> 64 multiply.
    pub fn umull(&mut self, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.umaddl(rd, rn, rm, zero_reg())
    }

    /// `smulh rd, rn, rm`: high half of a signed 64x64 multiply.
    pub fn smulh(&mut self, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.emit(enc_arith_rrrr(0b10011011010, rm, 0, zero_reg(), rn, rd))
    }

    /// `umulh rd, rn, rm`: high half of an unsigned 64x64 multiply.
    pub fn umulh(&mut self, rd: Reg, rn: Reg, rm: Reg) -> EmitResult<()> {
        self.emit(enc_arith_rrrr(0b10011011110, rm, 0, zero_reg(), rn, rd))
    }

    fn move_wide(
        &mut self,
        opc: u32,
        mnemonic: &'static str,
        size: OperandSize,
        rd: Reg,
        imm16: u16,
        lsl: u8,
    ) -> EmitResult<()> {
        let imm = MoveWideConst::maybe_with_shift(imm16, lsl, size).ok_or(
            EmitError::ImmOutOfRange {
                mnemonic,
                value: u64::from(lsl),
            },
        )?;
        self.emit(enc_move_wide(opc, size, rd, imm))
    }

    /// `movz rd, #imm16, lsl #lsl`.
    pub fn movz(&mut self, size: OperandSize, rd: Reg, imm16: u16, lsl: u8) -> EmitResult<()> {
        self.move_wide(0b10, "movz", size, rd, imm16, lsl)
    }

    /// `movn rd, #imm16, lsl #lsl`.
    pub fn movn(&mut self, size: OperandSize, rd: Reg, imm16: u16, lsl: u8) -> EmitResult<()> {
        self.move_wide(0b00, "movn", size, rd, imm16, lsl)
    }

    /// `movk rd, #imm16, lsl #lsl`: insert 16 bits, keep the rest.
    pub fn movk(&mut self, size: OperandSize, rd: Reg, imm16: u16, lsl: u8) -> EmitResult<()> {
        self.move_wide(0b11, "movk", size, rd, imm16, lsl)
    }

    /// `adr rd, <label>`: pc-relative address within +/- 1MiB.
    pub fn adr(&mut self, rd: Reg, label: Label) -> EmitResult<()> {
        self.emit_with_label(enc_adr(0, rd), label, LabelUse::Adr21)
    }

    /// `adrp rd, <label>`: pc-relative page address within +/- 4GiB.
    pub fn adrp(&mut self, rd: Reg, label: Label) -> EmitResult<()> {
        self.emit_with_label(enc_adr(1, rd), label, LabelUse::Adrp21)
    }

    fn bitfield(
        &mut self,
        opc: u32,
        mnemonic: &'static str,
        size: OperandSize,
        rd: Reg,
        rn: Reg,
        immr: u8,
        imms: u8,
    ) -> EmitResult<()> {
        if immr >= size.bits() || imms >= size.bits() {
            return Err(EmitError::InvalidOperand(mnemonic));
        }
        self.emit(enc_bfm(opc, size, rd, rn, immr, imms))
    }

    /// `sbfm rd, rn, #immr, #imms`.
    pub fn sbfm(&mut self, size: OperandSize, rd: Reg, rn: Reg, immr: u8, imms: u8) -> EmitResult<()> {
        self.bitfield(0b00, "sbfm", size, rd, rn, immr, imms)
    }

    /// `bfm rd, rn, #immr, #imms`.
    pub fn bfm(&mut self, size: OperandSize, rd: Reg, rn: Reg, immr: u8, imms: u8) -> EmitResult<()> {
        self.bitfield(0b01, "bfm", size, rd, rn, immr, imms)
    }

    /// `ubfm rd, rn, #immr, #imms`.
    pub fn ubfm(&mut self, size: OperandSize, rd: Reg, rn: Reg, immr: u8, imms: u8) -> EmitResult<()> {
        self.bitfield(0b10, "ubfm", size, rd, rn, immr, imms)
    }

    /// `lsl rd, rn, #shift`.
    pub fn lsl_imm(&mut self, size: OperandSize, rd: Reg, rn: Reg, shift: u8) -> EmitResult<()> {
        if shift >= size.bits() {
            return Err(EmitError::InvalidOperand("lsl"));
        }
        let bits = size.bits();
        self.ubfm(size, rd, rn, bits.wrapping_sub(shift) % bits, bits - 1 - shift)
    }

    /// `lsr rd, rn, #shift`.
    pub fn lsr_imm(&mut self, size: OperandSize, rd: Reg, rn: Reg, shift: u8) -> EmitResult<()> {
        self.ubfm(size, rd, rn, shift, size.bits() - 1)
    }

    /// `asr rd, rn, #shift`.
    pub fn asr_imm(&mut self, size: OperandSize, rd: Reg, rn: Reg, shift: u8) -> EmitResult<()> {
        self.sbfm(size, rd, rn, shift, size.bits() - 1)
    }

    fn bf_extract_args(size: OperandSize, mnemonic: &'static str, lsb: u8, width: u8) -> EmitResult<(u8, u8)> {
        if width == 0 || u32::from(lsb) + u32::from(width) > u32::from(size.bits()) {
            return Err(EmitError::InvalidOperand(mnemonic));
        }
        Ok((lsb, lsb + width - 1))
    }

    fn bf_insert_args(size: OperandSize, mnemonic: &'static str, lsb: u8, width: u8) -> EmitResult<(u8, u8)> {
        if width == 0 || u32::from(lsb) + u32::from(width) > u32::from(size.bits()) {
            return Err(EmitError::InvalidOperand(mnemonic));
        }
        let bits = size.bits();
        Ok((bits.wrapping_sub(lsb) % bits, width - 1))
    }

    /// `ubfx rd, rn, #lsb, #width`.
    pub fn ubfx(&mut self, size: OperandSize, rd: Reg, rn: Reg, lsb: u8, width: u8) -> EmitResult<()> {
        let (immr, imms) = Self::bf_extract_args(size, "ubfx", lsb, width)?;
        self.ubfm(size, rd, rn, immr, imms)
    }

    /// `ubfiz rd, rn, #lsb, #width`.
    pub fn ubfiz(&mut self, size: OperandSize, rd: Reg, rn: Reg, lsb: u8, width: u8) -> EmitResult<()> {
        let (immr, imms) = Self::bf_insert_args(size, "ubfiz", lsb, width)?;
        self.ubfm(size, rd, rn, immr, imms)
    }

    /// `sbfx rd, rn, #lsb, #width`.
    pub fn sbfx(&mut self, size: OperandSize, rd: Reg, rn: Reg, lsb: u8, width: u8) -> EmitResult<()> {
        let (immr, imms) = Self::bf_extract_args(size, "sbfx", lsb, width)?;
        self.sbfm(size, rd, rn, immr, imms)
    }

    /// `sbfiz rd, rn, #lsb, #width`.
    pub fn sbfiz(&mut self, size: OperandSize, rd: Reg, rn: Reg, lsb: u8, width: u8) -> EmitResult<()> {
        let (immr, imms) = Self::bf_insert_args(size, "sbfiz", lsb, width)?;
        self.sbfm(size, rd, rn, immr, imms)
    }

    /// `bfi rd, rn, #lsb, #width`.
    pub fn bfi(&mut self, size: OperandSize, rd: Reg, rn: Reg, lsb: u8, width: u8) -> EmitResult<()> {
        let (immr, imms) = Self::bf_insert_args(size, "bfi", lsb, width)?;
        self.bfm(size, rd, rn, immr, imms)
    }

    /// `bfxil rd, rn, #lsb, #width`.
    pub fn bfxil(&mut self, size: OperandSize, rd: Reg, rn: Reg, lsb: u8, width: u8) -> EmitResult<()> {
        let (immr, imms) = Self::bf_extract_args(size, "bfxil", lsb, width)?;
        self.bfm(size, rd, rn, immr, imms)
    }

    /// `sxtb rd, wn`.
    pub fn sxtb(&mut self, size: OperandSize, rd: Reg, rn: Reg) -> EmitResult<()> {
        self.sbfm(size, rd, rn, 0, 7)
    }

    /// `sxth rd, wn`.
    pub fn sxth(&mut self, size: OperandSize, rd: Reg, rn: Reg) -> EmitResult<()> {
        self.sbfm(size, rd, rn, 0, 15)
    }

    /// `sxtw xd, wn`.
    pub fn sxtw(&mut self, rd: Reg, rn: Reg) -> EmitResult<()> {
        self.sbfm(OperandSize::Size64, rd, rn, 0, 31)
    }

    /// `uxtb wd, wn`.
    pub fn uxtb(&mut self, rd: Reg, rn: Reg) -> EmitResult<()> {
        self.ubfm(OperandSize::Size32, rd, rn, 0, 7)
    }

    /// `uxth wd, wn`.
    pub fn uxth(&mut self, rd: Reg, rn: Reg) -> EmitResult<()> {
        self.ubfm(OperandSize::Size32, rd, rn, 0, 15)
    }

    /// `extr rd, rn, rm, #lsb`.
    pub fn extr(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg, lsb: u8) -> EmitResult<()> {
        if lsb >= size.bits() {
            return Err(EmitError::InvalidOperand("extr"));
        }
        self.emit(enc_extr(size, rd, rn, rm, lsb))
    }

    /// `ror rd, rn, #shift` (alias of `extr` with both sources equal).
    pub fn ror_imm(&mut self, size: OperandSize, rd: Reg, rn: Reg, shift: u8) -> EmitResult<()> {
        self.extr(size, rd, rn, rn, shift)
    }

    /// `csel rd, rn, rm, <cond>`.
    pub fn csel(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg, cond: Cond) -> EmitResult<()> {
        self.emit(enc_csel(size, 0, 0b00, rd, rn, rm, cond))
    }

    /// `csinc rd, rn, rm, <cond>`.
    pub fn csinc(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg, cond: Cond) -> EmitResult<()> {
        self.emit(enc_csel(size, 0, 0b01, rd, rn, rm, cond))
    }

    /// `csinv rd, rn, rm, <cond>`.
    pub fn csinv(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg, cond: Cond) -> EmitResult<()> {
        self.emit(enc_csel(size, 1, 0b00, rd, rn, rm, cond))
    }

    /// `csneg rd, rn, rm, <cond>`.
    pub fn csneg(&mut self, size: OperandSize, rd: Reg, rn: Reg, rm: Reg, cond: Cond) -> EmitResult<()> {
        self.emit(enc_csel(size, 1, 0b01, rd, rn, rm, cond))
    }

    /// `cset rd, <cond>`.
    pub fn cset(&mut self, size: OperandSize, rd: Reg, cond: Cond) -> EmitResult<()> {
        self.csinc(size, rd, zero_reg(), zero_reg(), cond.invert())
    }

    /// `csetm rd, <cond>`.
    pub fn csetm(&mut self, size: OperandSize, rd: Reg, cond: Cond) -> EmitResult<()> {
        self.csinv(size, rd, zero_reg(), zero_reg(), cond.invert())
    }

    /// `cinc rd, rn, <cond>`.
    pub fn cinc(&mut self, size: OperandSize, rd: Reg, rn: Reg, cond: Cond) -> EmitResult<()> {
        self.csinc(size, rd, rn, rn, cond.invert())
    }

    /// `cneg rd, rn, <cond>`.
    pub fn cneg(&mut self, size: OperandSize, rd: Reg, rn: Reg, cond: Cond) -> EmitResult<()> {
        self.csneg(size, rd, rn, rn, cond.invert())
    }

    /// `ccmp rn, rm, #nzcv, <cond>`.
    pub fn ccmp(&mut self, size: OperandSize, rn: Reg, rm: Reg, nzcv: u8, cond: Cond) -> EmitResult<()> {
        if nzcv > 0xf {
            return Err(EmitError::InvalidOperand("ccmp"));
        }
        self.emit(enc_ccmp(size, 1, rn, rm.enc(), false, nzcv, cond))
    }

    /// `ccmp rn, #imm5, #nzcv, <cond>`.
    pub fn ccmp_imm(&mut self, size: OperandSize, rn: Reg, imm5: u8, nzcv: u8, cond: Cond) -> EmitResult<()> {
        if nzcv > 0xf || imm5 > 0x1f {
            return Err(EmitError::InvalidOperand("ccmp"));
        }
        self.emit(enc_ccmp(size, 1, rn, u32::from(imm5), true, nzcv, cond))
    }

    /// `ccmn rn, rm, #nzcv, <cond>`.
    pub fn ccmn(&mut self, size: OperandSize, rn: Reg, rm: Reg, nzcv: u8, cond: Cond) -> EmitResult<()> {
        if nzcv > 0xf {
            return Err(EmitError::InvalidOperand("ccmn"));
        }
        self.emit(enc_ccmp(size, 0, rn, rm.enc(), false, nzcv, cond))
    }

    /// `ccmn rn, #imm5, #nzcv, <cond>`.
    pub fn ccmn_imm(&mut self, size: OperandSize, rn: Reg, imm5: u8, nzcv: u8, cond: Cond) -> EmitResult<()> {
        if nzcv > 0xf || imm5 > 0x1f {
            return Err(EmitError::InvalidOperand("ccmn"));
        }
        self.emit(enc_ccmp(size, 0, rn, u32::from(imm5), true, nzcv, cond))
    }

    /// `rbit rd, rn`.
    pub fn rbit(&mut self, size: OperandSize, rd: Reg, rn: Reg) -> EmitResult<()> {
        self.emit(enc_bit_rr(size.sf_bit(), 0, 0b000000, rn, rd))
    }

    /// `rev16 rd, rn`.
    pub fn rev16(&mut self, size: OperandSize, rd: Reg, rn: Reg) -> EmitResult<()> {
        self.emit(enc_bit_rr(size.sf_bit(), 0, 0b000001, rn, rd))
    }

    /// `rev32 xd, xn`. 64-bit only; the 32-bit byte reverse is [`rev`].
    ///
    /// [`rev`]: Assembler::rev
    pub fn rev32(&mut self, rd: Reg, rn: Reg) -> EmitResult<()> {
        self.emit(enc_bit_rr(1, 0, 0b000010, rn, rd))
    }

    /// `rev rd, rn`: byte-reverse the whole register.
    pub fn rev(&mut self, size: OperandSize, rd: Reg, rn: Reg) -> EmitResult<()> {
        let opcode = match size {
            OperandSize::Size32 => 0b000010,
            OperandSize::Size64 => 0b000011,
        };
        self.emit(enc_bit_rr(size.sf_bit(), 0, opcode, rn, rd))
    }

    /// `clz rd, rn`.
    pub fn clz(&mut self, size: OperandSize, rd: Reg, rn: Reg) -> EmitResult<()> {
        self.emit(enc_bit_rr(size.sf_bit(), 0, 0b000100, rn, rd))
    }

    /// `cls rd, rn`.
    pub fn cls(&mut self, size: OperandSize, rd: Reg, rn: Reg) -> EmitResult<()> {
        self.emit(enc_bit_rr(size.sf_bit(), 0, 0b000101, rn, rd))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::emit1;
    use crate::args::OperandSize::{Size32, Size64};
    use crate::*;

    #[test]
    fn add_sub_shifted() {
        assert_eq!(emit1(|a| a.add(Size64, xreg(1), xreg(2), xreg(3))), 0x8b030041); // add x1, x2, x3
        assert_eq!(emit1(|a| a.add(Size32, xreg(1), xreg(2), xreg(3))), 0x0b030041); // add w1, w2, w3
        assert_eq!(
            emit1(|a| a.add_shifted(Size64, xreg(1), xreg(2), xreg(3), ShiftOp::Lsl, 12)),
            0x8b033041 // add x1, x2, x3, lsl #12
        );
        assert_eq!(
            emit1(|a| a.adds_shifted(Size64, xreg(1), xreg(2), xreg(3), ShiftOp::Lsr, 4)),
            0xab431041 // adds x1, x2, x3, lsr #4
        );
        assert_eq!(emit1(|a| a.sub(Size64, xreg(1), xreg(2), xreg(3))), 0xcb030041); // sub x1, x2, x3
        assert_eq!(
            emit1(|a| a.subs_shifted(Size32, xreg(1), xreg(2), xreg(3), ShiftOp::Asr, 2)),
            0x6b830841 // subs w1, w2, w3, asr #2
        );
        assert_eq!(emit1(|a| a.cmp(Size64, xreg(1), xreg(2))), 0xeb02003f); // cmp x1, x2
        assert_eq!(emit1(|a| a.cmn(Size32, xreg(3), xreg(4))), 0x2b04007f); // cmn w3, w4
        assert_eq!(emit1(|a| a.neg(Size64, xreg(1), xreg(2))), 0xcb0203e1); // neg x1, x2
        assert_eq!(emit1(|a| a.negs(Size64, xreg(1), xreg(2))), 0xeb0203e1); // negs x1, x2
        assert_eq!(emit1(|a| a.negs(Size32, xreg(1), xreg(2))), 0x6b0203e1); // negs w1, w2
    }

    #[test]
    fn add_sub_rejects_bad_shifts() {
        let mut asm = Assembler::new(16);
        assert_eq!(
            asm.add_shifted(Size64, xreg(1), xreg(2), xreg(3), ShiftOp::Ror, 1),
            Err(EmitError::InvalidOperand("add"))
        );
        assert_eq!(
            asm.sub_shifted(Size32, xreg(1), xreg(2), xreg(3), ShiftOp::Lsl, 32),
            Err(EmitError::InvalidOperand("sub"))
        );
        assert_eq!(asm.cur_offset(), 0);
    }

    #[test]
    fn add_sub_imm() {
        assert_eq!(emit1(|a| a.add_imm(Size64, xreg(1), stack_reg(), 16)), 0x910043e1); // add x1, sp, #16
        assert_eq!(emit1(|a| a.add_imm(Size64, xreg(1), xreg(2), 4095)), 0x913ffc41); // add x1, x2, #4095
        assert_eq!(emit1(|a| a.add_imm(Size64, xreg(1), xreg(2), 0xfff000)), 0x917ffc41); // add x1, x2, #0xfff000
        assert_eq!(emit1(|a| a.sub_imm(Size64, stack_reg(), stack_reg(), 32)), 0xd10083ff); // sub sp, sp, #32
        assert_eq!(emit1(|a| a.adds_imm(Size64, xreg(1), xreg(2), 4096)), 0xb1400441); // adds x1, x2, #0x1000
        assert_eq!(emit1(|a| a.cmp_imm(Size64, xreg(1), 0)), 0xf100003f); // cmp x1, #0
        assert_eq!(
            emit1(|a| a.add_imm(Size64, xreg(1), xreg(2), 4095)),
            0x913ffc41
        );
        let mut asm = Assembler::new(16);
        assert_eq!(
            asm.add_imm(Size64, xreg(1), xreg(2), 0x1001),
            Err(EmitError::ImmOutOfRange {
                mnemonic: "add",
                value: 0x1001
            })
        );
    }

    #[test]
    fn add_sub_extended() {
        assert_eq!(
            emit1(|a| a.add_ext(Size64, xreg(1), xreg(2), xreg(3), ExtendOp::Uxtw, 2)),
            0x8b234841 // add x1, x2, w3, uxtw #2
        );
        assert_eq!(
            emit1(|a| a.sub_ext(Size64, xreg(1), xreg(2), xreg(3), ExtendOp::Sxtw, 1)),
            0xcb23c441 // sub x1, x2, w3, sxtw #1
        );
        let mut asm = Assembler::new(16);
        assert_eq!(
            asm.add_ext(Size64, xreg(1), xreg(2), xreg(3), ExtendOp::Uxtw, 5),
            Err(EmitError::InvalidOperand("add"))
        );
    }

    #[test]
    fn carry_ops() {
        assert_eq!(emit1(|a| a.adc(Size64, xreg(1), xreg(2), xreg(3))), 0x9a030041); // adc x1, x2, x3
        assert_eq!(emit1(|a| a.adcs(Size32, xreg(1), xreg(2), xreg(3))), 0x3a030041); // adcs w1, w2, w3
        assert_eq!(emit1(|a| a.sbc(Size64, xreg(1), xreg(2), xreg(3))), 0xda030041); // sbc x1, x2, x3
        assert_eq!(emit1(|a| a.sbcs(Size64, xreg(1), xreg(2), xreg(3))), 0xfa030041); // sbcs x1, x2, x3
    }

    #[test]
    fn logical_reg() {
        assert_eq!(emit1(|a| a.and(Size64, xreg(1), xreg(2), xreg(3))), 0x8a030041); // and x1, x2, x3
        assert_eq!(
            emit1(|a| a.and_shifted(Size32, xreg(1), xreg(2), xreg(3), ShiftOp::Ror, 3)),
            0x0ac30c41 // and w1, w2, w3, ror #3
        );
        assert_eq!(emit1(|a| a.orr(Size64, xreg(1), xreg(2), xreg(3))), 0xaa030041); // orr x1, x2, x3
        assert_eq!(
            emit1(|a| a.eor_shifted(Size64, xreg(1), xreg(2), xreg(3), ShiftOp::Lsl, 5)),
            0xca031441 // eor x1, x2, x3, lsl #5
        );
        assert_eq!(emit1(|a| a.bic(Size64, xreg(1), xreg(2), xreg(3))), 0x8a230041); // bic x1, x2, x3
        assert_eq!(emit1(|a| a.orn(Size64, xreg(1), xreg(2), xreg(3))), 0xaa230041); // orn x1, x2, x3
        assert_eq!(emit1(|a| a.eon(Size64, xreg(1), xreg(2), xreg(3))), 0xca230041); // eon x1, x2, x3
        assert_eq!(emit1(|a| a.ands(Size64, xreg(1), xreg(2), xreg(3))), 0xea030041); // ands x1, x2, x3
        assert_eq!(emit1(|a| a.bics(Size32, xreg(1), xreg(2), xreg(3))), 0x6a230041); // bics w1, w2, w3
        assert_eq!(emit1(|a| a.tst(Size64, xreg(1), xreg(2))), 0xea02003f); // tst x1, x2
        assert_eq!(emit1(|a| a.mvn(Size64, xreg(1), xreg(2))), 0xaa2203e1); // mvn x1, x2
    }

    #[test]
    fn logical_imm() {
        assert_eq!(
            emit1(|a| a.and_imm(Size64, xreg(1), xreg(2), 0xff00ff00ff00ff00)),
            0x92089c41 // and x1, x2, #0xff00ff00ff00ff00
        );
        assert_eq!(emit1(|a| a.orr_imm(Size32, xreg(1), xreg(2), 0xff00ff)), 0x32009c41); // orr w1, w2, #0xff00ff
        assert_eq!(emit1(|a| a.eor_imm(Size64, xreg(1), xreg(2), 0x3ffc)), 0xd27e2c41); // eor x1, x2, #0x3ffc
        assert_eq!(emit1(|a| a.ands_imm(Size64, xreg(1), xreg(2), 1)), 0xf2400041); // ands x1, x2, #1
        assert_eq!(
            emit1(|a| a.tst_imm(Size64, xreg(1), 0x5555555555555555)),
            0xf200f03f // tst x1, #0x5555555555555555
        );
        let mut asm = Assembler::new(16);
        assert_eq!(
            asm.and_imm(Size64, xreg(1), xreg(2), 0x12345678),
            Err(EmitError::ImmOutOfRange {
                mnemonic: "and",
                value: 0x12345678
            })
        );
    }

    #[test]
    fn variable_shifts_and_division() {
        assert_eq!(emit1(|a| a.lsl(Size64, xreg(1), xreg(2), xreg(3))), 0x9ac32041); // lsl x1, x2, x3
        assert_eq!(emit1(|a| a.lsr(Size32, xreg(1), xreg(2), xreg(3))), 0x1ac32441); // lsr w1, w2, w3
        assert_eq!(emit1(|a| a.asr(Size64, xreg(1), xreg(2), xreg(3))), 0x9ac32841); // asr x1, x2, x3
        assert_eq!(emit1(|a| a.ror(Size64, xreg(1), xreg(2), xreg(3))), 0x9ac32c41); // ror x1, x2, x3
        assert_eq!(emit1(|a| a.udiv(Size64, xreg(1), xreg(2), xreg(3))), 0x9ac30841); // udiv x1, x2, x3
        assert_eq!(emit1(|a| a.sdiv(Size32, xreg(1), xreg(2), xreg(3))), 0x1ac30c41); // sdiv w1, w2, w3
    }

    #[test]
    fn multiplies() {
        assert_eq!(
            emit1(|a| a.madd(Size64, xreg(1), xreg(2), xreg(3), xreg(4))),
            0x9b031041 // madd x1, x2, x3, x4
        );
        assert_eq!(
            emit1(|a| a.msub(Size64, xreg(1), xreg(2), xreg(3), xreg(4))),
            0x9b039041 // msub x1, x2, x3, x4
        );
        assert_eq!(emit1(|a| a.mul(Size64, xreg(1), xreg(2), xreg(3))), 0x9b037c41); // mul x1, x2, x3
        assert_eq!(emit1(|a| a.mneg(Size64, xreg(1), xreg(2), xreg(3))), 0x9b03fc41); // mneg x1, x2, x3
        assert_eq!(emit1(|a| a.smull(xreg(1), xreg(2), xreg(3))), 0x9b237c41); // smull x1, w2, w3
        assert_eq!(emit1(|a| a.umull(xreg(1), xreg(2), xreg(3))), 0x9ba37c41); // umull x1, w2, w3
        assert_eq!(
            emit1(|a| a.smaddl(xreg(1), xreg(2), xreg(3), xreg(4))),
            0x9b231041 // smaddl x1, w2, w3, x4
        );
        assert_eq!(
            emit1(|a| a.umaddl(xreg(1), xreg(2), xreg(3), xreg(4))),
            0x9ba31041 // umaddl x1, w2, w3, x4
        );
        assert_eq!(
            emit1(|a| a.smsubl(xreg(1), xreg(2), xreg(3), zero_reg())),
            0x9b23fc41 // smnegl x1, w2, w3
        );
        assert_eq!(emit1(|a| a.smulh(xreg(1), xreg(2), xreg(3))), 0x9b437c41); // smulh x1, x2, x3
        assert_eq!(emit1(|a| a.umulh(xreg(1), xreg(2), xreg(3))), 0x9bc37c41); // umulh x1, x2, x3
    }

    #[test]
    fn move_wide() {
        assert_eq!(emit1(|a| a.movz(Size64, xreg(1), 0xffff, 0)), 0xd29fffe1); // movz x1, #0xffff
        assert_eq!(emit1(|a| a.movz(Size64, xreg(1), 0x1234, 32)), 0xd2c24681); // movz x1, #0x1234, lsl #32
        assert_eq!(emit1(|a| a.movn(Size32, xreg(1), 17, 0)), 0x12800221); // movn w1, #17
        assert_eq!(emit1(|a| a.movk(Size64, xreg(1), 0xbeef, 48)), 0xf2f7dde1); // movk x1, #0xbeef, lsl #48
        let mut asm = Assembler::new(16);
        // lsl #32 needs a 64-bit destination; lsl #8 is never legal.
        assert!(asm.movz(Size32, xreg(1), 1, 32).is_err());
        assert!(asm.movk(Size64, xreg(1), 1, 8).is_err());
    }

    #[test]
    fn bitfields() {
        assert_eq!(emit1(|a| a.lsl_imm(Size64, xreg(1), xreg(2), 3)), 0xd37df041); // lsl x1, x2, #3
        assert_eq!(emit1(|a| a.lsr_imm(Size32, xreg(1), xreg(2), 7)), 0x53077c41); // lsr w1, w2, #7
        assert_eq!(emit1(|a| a.asr_imm(Size64, xreg(1), xreg(2), 63)), 0x937ffc41); // asr x1, x2, #63
        assert_eq!(emit1(|a| a.ubfx(Size64, xreg(1), xreg(2), 8, 16)), 0xd3485c41); // ubfx x1, x2, #8, #16
        assert_eq!(emit1(|a| a.ubfiz(Size64, xreg(1), xreg(2), 8, 16)), 0xd3783c41); // ubfiz x1, x2, #8, #16
        assert_eq!(emit1(|a| a.sbfx(Size64, xreg(1), xreg(2), 4, 8)), 0x93442c41); // sbfx x1, x2, #4, #8
        assert_eq!(emit1(|a| a.sbfiz(Size64, xreg(1), xreg(2), 4, 8)), 0x937c1c41); // sbfiz x1, x2, #4, #8
        assert_eq!(emit1(|a| a.bfi(Size64, xreg(1), xreg(2), 8, 8)), 0xb3781c41); // bfi x1, x2, #8, #8
        assert_eq!(emit1(|a| a.bfxil(Size64, xreg(1), xreg(2), 8, 8)), 0xb3483c41); // bfxil x1, x2, #8, #8
        assert_eq!(emit1(|a| a.sxtb(Size64, xreg(1), xreg(2))), 0x93401c41); // sxtb x1, w2
        assert_eq!(emit1(|a| a.sxth(Size64, xreg(1), xreg(2))), 0x93403c41); // sxth x1, w2
        assert_eq!(emit1(|a| a.sxtw(xreg(1), xreg(2))), 0x93407c41); // sxtw x1, w2
        assert_eq!(emit1(|a| a.uxtb(xreg(1), xreg(2))), 0x53001c41); // uxtb w1, w2
        assert_eq!(emit1(|a| a.uxth(xreg(1), xreg(2))), 0x53003c41); // uxth w1, w2
        let mut asm = Assembler::new(16);
        assert!(asm.ubfx(Size32, xreg(1), xreg(2), 24, 16).is_err());
        assert!(asm.sbfiz(Size64, xreg(1), xreg(2), 0, 0).is_err());
    }

    #[test]
    fn extract() {
        assert_eq!(
            emit1(|a| a.extr(Size64, xreg(1), xreg(2), xreg(3), 12)),
            0x93c33041 // extr x1, x2, x3, #12
        );
        assert_eq!(emit1(|a| a.ror_imm(Size64, xreg(1), xreg(2), 4)), 0x93c21041); // ror x1, x2, #4
        let mut asm = Assembler::new(16);
        assert_eq!(
            asm.extr(Size32, xreg(1), xreg(2), xreg(3), 32),
            Err(EmitError::InvalidOperand("extr"))
        );
    }

    #[test]
    fn conditional_select() {
        assert_eq!(
            emit1(|a| a.csel(Size64, xreg(1), xreg(2), xreg(3), Cond::Eq)),
            0x9a830041 // csel x1, x2, x3, eq
        );
        assert_eq!(
            emit1(|a| a.csinc(Size64, xreg(1), xreg(2), xreg(3), Cond::Ne)),
            0x9a831441 // csinc x1, x2, x3, ne
        );
        assert_eq!(
            emit1(|a| a.csinv(Size32, xreg(1), xreg(2), xreg(3), Cond::Ge)),
            0x5a83a041 // csinv w1, w2, w3, ge
        );
        assert_eq!(
            emit1(|a| a.csneg(Size64, xreg(1), xreg(2), xreg(3), Cond::Lt)),
            0xda83b441 // csneg x1, x2, x3, lt
        );
        assert_eq!(emit1(|a| a.cset(Size64, xreg(1), Cond::Eq)), 0x9a9f17e1); // cset x1, eq
        assert_eq!(emit1(|a| a.csetm(Size32, xreg(1), Cond::Ne)), 0x5a9f03e1); // csetm w1, ne
        assert_eq!(emit1(|a| a.cinc(Size64, xreg(1), xreg(2), Cond::Gt)), 0x9a82d441); // cinc x1, x2, gt
        assert_eq!(emit1(|a| a.cneg(Size64, xreg(1), xreg(2), Cond::Mi)), 0xda825441); // cneg x1, x2, mi
    }

    #[test]
    fn conditional_compare() {
        assert_eq!(
            emit1(|a| a.ccmp(Size64, xreg(1), xreg(2), 0, Cond::Eq)),
            0xfa420020 // ccmp x1, x2, #0, eq
        );
        assert_eq!(
            emit1(|a| a.ccmp_imm(Size64, xreg(1), 5, 4, Cond::Ne)),
            0xfa451824 // ccmp x1, #5, #4, ne
        );
        assert_eq!(
            emit1(|a| a.ccmn(Size64, xreg(1), xreg(2), 15, Cond::Hs)),
            0xba42202f // ccmn x1, x2, #15, hs
        );
        assert_eq!(
            emit1(|a| a.ccmn_imm(Size64, xreg(1), 2, 3, Cond::Lo)),
            0xba423823 // ccmn x1, #2, #3, lo
        );
        let mut asm = Assembler::new(16);
        assert!(asm.ccmp(Size64, xreg(1), xreg(2), 16, Cond::Eq).is_err());
        assert!(asm.ccmp_imm(Size64, xreg(1), 32, 0, Cond::Eq).is_err());
    }

    #[test]
    fn bit_ops() {
        assert_eq!(emit1(|a| a.rbit(Size64, xreg(1), xreg(2))), 0xdac00041); // rbit x1, x2
        assert_eq!(emit1(|a| a.rev16(Size32, xreg(1), xreg(2))), 0x5ac00441); // rev16 w1, w2
        assert_eq!(emit1(|a| a.rev32(xreg(1), xreg(2))), 0xdac00841); // rev32 x1, x2
        assert_eq!(emit1(|a| a.rev(Size64, xreg(1), xreg(2))), 0xdac00c41); // rev x1, x2
        assert_eq!(emit1(|a| a.rev(Size32, xreg(1), xreg(2))), 0x5ac00841); // rev w1, w2
        assert_eq!(emit1(|a| a.clz(Size64, xreg(1), xreg(2))), 0xdac01041); // clz x1, x2
        assert_eq!(emit1(|a| a.cls(Size32, xreg(1), xreg(2))), 0x5ac01441); // cls w1, w2
    }

    #[test]
    fn pc_relative_address() {
        let mut asm = Assembler::new(64);
        let l = asm.new_label();
        asm.adr(xreg(1), l).unwrap();
        asm.adrp(xreg(2), l).unwrap();
        asm.bind(l).unwrap();
        let code = asm.finish().unwrap();
        // adr x1, #+8; adrp x2, #0 (same page).
        assert_eq!(&code[0..4], &0x10000041u32.to_le_bytes());
        assert_eq!(&code[4..8], &0x90000002u32.to_le_bytes());
    }
}
