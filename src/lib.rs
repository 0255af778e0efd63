//! Runtime AArch64 instruction emitter.
//!
//! This crate encodes AArch64 (A64) instructions directly into an in-memory
//! buffer, for use by JIT compilers and dynamic binary translators. It is an
//! *emitter*, not an assembler driver: there is no textual input, no
//! relocatable object output, and no instruction selection. A caller that has
//! already decided which instructions it wants calls one method per
//! instruction on an [`Assembler`], and the corresponding little-endian
//! 32-bit words land in the buffer in call order.
//!
//! Design points:
//!
//! * **Widths are per call.** Register handles ([`Reg`], [`VReg`]) carry no
//!   width; every method that varies by operand width takes an
//!   [`OperandSize`], [`ScalarSize`], or [`VectorSize`] tag. A translator
//!   that picks widths at runtime never converts register values.
//! * **Errors, not traps.** Every emission method returns [`EmitResult`].
//!   Out-of-range immediates, unallocated (mnemonic, width) combinations,
//!   label misuse, and buffer exhaustion are reported synchronously at the
//!   offending call, and nothing is written for a failed emission.
//! * **Labels, not addresses.** Pc-relative instructions take a [`Label`];
//!   backward references resolve immediately and forward references are
//!   patched when the label is bound. A reference that cannot reach its
//!   target is a hard error.
//!
//! ```
//! use aarch64_emit::{Assembler, OperandSize, xreg, zero_reg};
//!
//! let mut asm = Assembler::new(1024);
//! let loop_top = asm.new_label();
//! asm.bind(loop_top)?;
//! asm.sub_imm(OperandSize::Size64, xreg(0), xreg(0), 1)?;
//! asm.cbnz(OperandSize::Size64, xreg(0), loop_top)?;
//! asm.ret()?;
//! let code = asm.finish()?;
//! assert_eq!(code.len(), 12);
//! # Ok::<(), aarch64_emit::EmitError>(())
//! ```
//!
//! The caller owns everything past the byte vector: mapping memory
//! writable/executable, flushing the instruction cache, and choosing where
//! the code lives.

#![warn(missing_docs)]

pub mod args;
pub mod buffer;
pub mod imms;
pub mod regs;
pub mod result;

mod inst;

pub use crate::args::{
    AtomicRMWOp, BarrierScope, Cond, DataCacheOp, ExtendOp, InsnCacheOp, MemOperand, MemOrder,
    OperandSize, PrefetchOp, ScalarSize, ShiftOp, SystemReg, VectorSize,
};
pub use crate::buffer::{CodeBuffer, CodeOffset, Label};
pub use crate::regs::{fp_reg, link_reg, stack_reg, vreg, xreg, zero_reg, Reg, VReg};
pub use crate::result::{EmitError, EmitResult};

use crate::buffer::LabelUse;

/// The instruction emitter.
///
/// An `Assembler` owns a [`CodeBuffer`] and exposes one method per
/// (mnemonic, operand shape). Methods are grouped by instruction family in
/// the `inst` submodules; the label plumbing lives here.
pub struct Assembler {
    buffer: CodeBuffer,
}

impl Assembler {
    /// Create an assembler whose buffer holds up to `capacity` bytes.
    pub fn new(capacity: usize) -> Assembler {
        Assembler {
            buffer: CodeBuffer::with_capacity(capacity),
        }
    }

    /// The underlying code buffer.
    pub fn buffer(&self) -> &CodeBuffer {
        &self.buffer
    }

    /// The offset the next instruction will be emitted at.
    pub fn cur_offset(&self) -> CodeOffset {
        self.buffer.cur_offset()
    }

    /// Allocate a new, unbound label.
    pub fn new_label(&mut self) -> Label {
        self.buffer.new_label()
    }

    /// Bind `label` to the current offset, patching pending references.
    pub fn bind(&mut self, label: Label) -> EmitResult<()> {
        self.buffer.bind_label(label)
    }

    /// Finish emission and take the code bytes. Fails if a referenced label
    /// was never bound.
    pub fn finish(self) -> EmitResult<Vec<u8>> {
        self.buffer.finish()
    }

    pub(crate) fn emit(&mut self, word: u32) -> EmitResult<()> {
        self.buffer.put4(word)
    }

    pub(crate) fn emit_with_label(
        &mut self,
        word: u32,
        label: Label,
        kind: LabelUse,
    ) -> EmitResult<()> {
        let offset = self.buffer.cur_offset();
        self.buffer.put4(word)?;
        self.buffer.use_label_at_offset(offset, label, kind)
    }
}
