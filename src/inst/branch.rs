//! Branches.
//!
//! All pc-relative branches take a [`Label`]; the offset field is patched by
//! the buffer when the target is known. Register-indirect branches (`br`,
//! `blr`, `ret`) take no label and emit directly.

use crate::args::{Cond, OperandSize};
use crate::buffer::{Label, LabelUse};
use crate::inst::{enc_br, enc_cbr, enc_cmpbr, enc_jump26, enc_tbr};
use crate::regs::{link_reg, Reg};
use crate::result::{EmitError, EmitResult};
use crate::Assembler;

impl Assembler {
    /// `b <label>`: unconditional branch, +/- 128MiB.
    pub fn b(&mut self, label: Label) -> EmitResult<()> {
        self.emit_with_label(enc_jump26(0b000101), label, LabelUse::Branch26)
    }

    /// `bl <label>`: branch with link, +/- 128MiB.
    pub fn bl(&mut self, label: Label) -> EmitResult<()> {
        self.emit_with_label(enc_jump26(0b100101), label, LabelUse::Branch26)
    }

    /// `b.<cond> <label>`: conditional branch, +/- 1MiB.
    pub fn b_cond(&mut self, cond: Cond, label: Label) -> EmitResult<()> {
        self.emit_with_label(enc_cbr(cond), label, LabelUse::Branch19)
    }

    /// `cbz rt, <label>`: compare and branch if zero, +/- 1MiB.
    pub fn cbz(&mut self, size: OperandSize, rt: Reg, label: Label) -> EmitResult<()> {
        let op = size.sf_bit() << 7 | 0b0110100;
        self.emit_with_label(enc_cmpbr(op, rt), label, LabelUse::Branch19)
    }

    /// `cbnz rt, <label>`: compare and branch if nonzero, +/- 1MiB.
    pub fn cbnz(&mut self, size: OperandSize, rt: Reg, label: Label) -> EmitResult<()> {
        let op = size.sf_bit() << 7 | 0b0110101;
        self.emit_with_label(enc_cmpbr(op, rt), label, LabelUse::Branch19)
    }

    /// `tbz rt, #bit, <label>`: test bit and branch if zero, +/- 32KiB.
    /// `bit` ranges over 0..=63.
    pub fn tbz(&mut self, rt: Reg, bit: u8, label: Label) -> EmitResult<()> {
        if bit > 63 {
            return Err(EmitError::InvalidOperand("tbz"));
        }
        self.emit_with_label(enc_tbr(0b0110110, bit, rt), label, LabelUse::Branch14)
    }

    /// `tbnz rt, #bit, <label>`: test bit and branch if nonzero, +/- 32KiB.
    pub fn tbnz(&mut self, rt: Reg, bit: u8, label: Label) -> EmitResult<()> {
        if bit > 63 {
            return Err(EmitError::InvalidOperand("tbnz"));
        }
        self.emit_with_label(enc_tbr(0b0110111, bit, rt), label, LabelUse::Branch14)
    }

    /// `br rn`: branch to a register.
    pub fn br(&mut self, rn: Reg) -> EmitResult<()> {
        self.emit(enc_br(0b0000, rn))
    }

    /// `blr rn`: branch with link to a register.
    pub fn blr(&mut self, rn: Reg) -> EmitResult<()> {
        self.emit(enc_br(0b0001, rn))
    }

    /// `ret`: return via x30.
    pub fn ret(&mut self) -> EmitResult<()> {
        self.ret_reg(link_reg())
    }

    /// `ret rn`: return via an arbitrary register.
    pub fn ret_reg(&mut self, rn: Reg) -> EmitResult<()> {
        self.emit(enc_br(0b0010, rn))
    }
}

#[cfg(test)]
mod tests {
    use crate::args::OperandSize::{Size32, Size64};
    use crate::*;

    fn words(code: &[u8]) -> Vec<u32> {
        code.chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn unconditional() {
        let mut asm = Assembler::new(64);
        let top = asm.new_label();
        let fwd = asm.new_label();
        asm.bind(top).unwrap();
        asm.b(fwd).unwrap(); // b #8
        asm.b(top).unwrap(); // b #-4
        asm.bind(fwd).unwrap();
        asm.bl(fwd).unwrap(); // bl #0
        let w = words(&asm.finish().unwrap());
        assert_eq!(w, vec![0x14000002, 0x17ffffff, 0x94000000]);
    }

    #[test]
    fn conditional() {
        let mut asm = Assembler::new(64);
        let top = asm.new_label();
        let out = asm.new_label();
        asm.bind(top).unwrap();
        asm.b_cond(Cond::Ne, out).unwrap(); // b.ne #8
        asm.cbz(Size64, xreg(1), out).unwrap(); // cbz x1, #4
        asm.bind(out).unwrap();
        asm.cbnz(Size32, xreg(2), top).unwrap(); // cbnz w2, #-8
        let w = words(&asm.finish().unwrap());
        assert_eq!(w, vec![0x54000041, 0xb4000021, 0x35ffffc2]);
    }

    #[test]
    fn test_bit_branches() {
        let mut asm = Assembler::new(64);
        let out = asm.new_label();
        asm.tbz(xreg(3), 33, out).unwrap(); // tbz x3, #33, #16
        asm.tbnz(xreg(4), 5, out).unwrap(); // tbnz w4, #5, #12
        for _ in 0..2 {
            asm.nop().unwrap();
        }
        asm.bind(out).unwrap();
        let w = words(&asm.finish().unwrap());
        assert_eq!(w[0], 0xb6080083); // tbz x3, #33, #16
        assert_eq!(w[1], 0x37280064); // tbnz w4, #5, #12
        let mut a = Assembler::new(16);
        let l = a.new_label();
        assert!(a.tbz(xreg(1), 64, l).is_err());
    }

    #[test]
    fn register_indirect() {
        use super::super::test_utils::emit1;
        assert_eq!(emit1(|a| a.br(xreg(2))), 0xd61f0040); // br x2
        assert_eq!(emit1(|a| a.blr(xreg(2))), 0xd63f0040); // blr x2
        assert_eq!(emit1(|a| a.ret()), 0xd65f03c0); // ret
        assert_eq!(emit1(|a| a.ret_reg(xreg(1))), 0xd65f0020); // ret x1
    }
}
