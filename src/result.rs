//! Result and error types representing the outcome of emitting an instruction.

use thiserror::Error;

/// An instruction-emission error.
///
/// When the emitter refuses to encode an instruction, it returns one of these
/// error codes. Every error is raised synchronously at the offending call;
/// nothing is ever written to the code buffer for a failed emission. A wrong
/// but plausible instruction word would be a silent miscompilation, so the
/// emitter never guesses: any combination it cannot prove legal is an error.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EmitError {
    /// The operand bank/width combination is not legal for this mnemonic.
    #[error("invalid operand combination for {0}")]
    InvalidOperand(&'static str),

    /// An immediate failed its range, alignment, or shape check.
    ///
    /// The caller must materialize the constant some other way (e.g. move it
    /// into a register first).
    #[error("immediate {value:#x} out of range for {mnemonic}")]
    ImmOutOfRange {
        /// The instruction that rejected the immediate.
        mnemonic: &'static str,
        /// The offending value, as raw bits.
        value: u64,
    },

    /// The (mnemonic, size, form) combination has no defined encoding on
    /// AArch64. Unallocated encodings must never be emitted.
    #[error("unallocated encoding for {0}")]
    Unallocated(&'static str),

    /// A label may only transition unbound -> bound once.
    #[error("label {0} is already bound")]
    LabelAlreadyBound(u32),

    /// A label fixup resolved to a distance the instruction's offset field
    /// cannot represent. The caller must restructure the code (e.g. use a
    /// longer branch idiom); the offset is never silently truncated.
    #[error("label fixup out of range: distance {0:#x}")]
    FixupOutOfRange(i64),

    /// The code buffer is at the capacity the caller supplied. The backing
    /// memory may already be mapped for execution, so the buffer never
    /// reallocates on its own.
    #[error("code buffer capacity of {0} bytes exhausted")]
    BufferFull(usize),

    /// `finish()` was called while a label still had pending fixups.
    #[error("label {0} was referenced but never bound")]
    UnboundLabel(u32),
}

/// A convenient alias for a `Result` that uses `EmitError` as the error type.
pub type EmitResult<T> = Result<T, EmitError>;
