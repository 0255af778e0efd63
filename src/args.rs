//! AArch64 instruction arguments: condition codes, width tags, shift and
//! extend operators, barrier scopes, and memory operand descriptors.
//!
//! Width tags are passed per call and never stored in a register handle, so
//! the same handle can be used at any width and an illegal (mnemonic, width)
//! pairing is rejected inside the emitter rather than encoded.

use crate::regs::Reg;

/// Condition for conditional branches and conditionally-executed ops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Cond {
    /// Equal.
    Eq = 0,
    /// Not equal.
    Ne = 1,
    /// Unsigned higher or same (carry set).
    Hs = 2,
    /// Unsigned lower (carry clear).
    Lo = 3,
    /// Minus, negative.
    Mi = 4,
    /// Plus, positive or zero.
    Pl = 5,
    /// Signed overflow.
    Vs = 6,
    /// No signed overflow.
    Vc = 7,
    /// Unsigned higher.
    Hi = 8,
    /// Unsigned lower or same.
    Ls = 9,
    /// Signed greater or equal.
    Ge = 10,
    /// Signed less than.
    Lt = 11,
    /// Signed greater than.
    Gt = 12,
    /// Signed less than or equal.
    Le = 13,
    /// Always executed.
    Al = 14,
    /// Always executed (second encoding).
    Nv = 15,
}

impl Cond {
    /// Return the inverted condition.
    pub fn invert(self) -> Cond {
        match self {
            Cond::Eq => Cond::Ne,
            Cond::Ne => Cond::Eq,
            Cond::Hs => Cond::Lo,
            Cond::Lo => Cond::Hs,
            Cond::Mi => Cond::Pl,
            Cond::Pl => Cond::Mi,
            Cond::Vs => Cond::Vc,
            Cond::Vc => Cond::Vs,
            Cond::Hi => Cond::Ls,
            Cond::Ls => Cond::Hi,
            Cond::Ge => Cond::Lt,
            Cond::Lt => Cond::Ge,
            Cond::Gt => Cond::Le,
            Cond::Le => Cond::Gt,
            Cond::Al => Cond::Nv,
            Cond::Nv => Cond::Al,
        }
    }

    /// Return the machine encoding of this condition.
    pub fn bits(self) -> u32 {
        self as u32
    }
}

/// A shift operator for a register shifted by an immediate amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ShiftOp {
    /// Logical shift left.
    Lsl = 0b00,
    /// Logical shift right.
    Lsr = 0b01,
    /// Arithmetic shift right.
    Asr = 0b10,
    /// Rotate right.
    Ror = 0b11,
}

impl ShiftOp {
    /// Get the encoding of this shift op.
    pub fn bits(self) -> u32 {
        self as u32
    }
}

/// An extend operator for a register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ExtendOp {
    /// Unsigned extend byte.
    Uxtb = 0b000,
    /// Unsigned extend halfword.
    Uxth = 0b001,
    /// Unsigned extend word.
    Uxtw = 0b010,
    /// Unsigned extend doubleword.
    Uxtx = 0b011,
    /// Signed extend byte.
    Sxtb = 0b100,
    /// Signed extend halfword.
    Sxth = 0b101,
    /// Signed extend word.
    Sxtw = 0b110,
    /// Signed extend doubleword.
    Sxtx = 0b111,
}

impl ExtendOp {
    /// Encoding of this extend op.
    pub fn bits(self) -> u32 {
        self as u32
    }
}

/// The size of an operand for a general-purpose instruction: 32 or 64 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandSize {
    /// 32-bit (W-register view).
    Size32,
    /// 64-bit (X-register view).
    Size64,
}

impl OperandSize {
    /// The number of bits in this operand size.
    pub fn bits(self) -> u8 {
        match self {
            OperandSize::Size32 => 32,
            OperandSize::Size64 => 64,
        }
    }

    /// The `sf` bit for this operand size.
    pub(crate) fn sf_bit(self) -> u32 {
        match self {
            OperandSize::Size32 => 0,
            OperandSize::Size64 => 1,
        }
    }
}

/// The size of a scalar SIMD/FP operand or a single memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarSize {
    /// 8-bit (B-register view).
    Size8,
    /// 16-bit (H-register view).
    Size16,
    /// 32-bit (S-register view).
    Size32,
    /// 64-bit (D-register view).
    Size64,
    /// 128-bit (Q-register view).
    Size128,
}

impl ScalarSize {
    /// The number of bits in this operand size.
    pub fn bits(self) -> u16 {
        match self {
            ScalarSize::Size8 => 8,
            ScalarSize::Size16 => 16,
            ScalarSize::Size32 => 32,
            ScalarSize::Size64 => 64,
            ScalarSize::Size128 => 128,
        }
    }

    /// log2 of the byte width; the `size` field of most load/store encodings.
    pub(crate) fn enc_size(self) -> u32 {
        match self {
            ScalarSize::Size8 => 0b00,
            ScalarSize::Size16 => 0b01,
            ScalarSize::Size32 => 0b10,
            ScalarSize::Size64 => 0b11,
            ScalarSize::Size128 => 0b100,
        }
    }

    /// The `ftype` field for scalar floating-point instructions. Only the
    /// three standard float sizes have one.
    pub(crate) fn ftype(self) -> Option<u32> {
        match self {
            ScalarSize::Size16 => Some(0b11),
            ScalarSize::Size32 => Some(0b00),
            ScalarSize::Size64 => Some(0b01),
            _ => None,
        }
    }

    /// Whether this is one of the three standard float sizes.
    pub fn is_float(self) -> bool {
        self.ftype().is_some()
    }
}

/// The arrangement of a vector operand: lane width times lane count.
///
/// Only arrangements the architecture allocates are representable; there is
/// deliberately no `Size64x1`, for example, because no ASIMD data-processing
/// instruction accepts it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VectorSize {
    /// 8 lanes of 8 bits, 64-bit vector.
    Size8x8,
    /// 16 lanes of 8 bits, 128-bit vector.
    Size8x16,
    /// 4 lanes of 16 bits, 64-bit vector.
    Size16x4,
    /// 8 lanes of 16 bits, 128-bit vector.
    Size16x8,
    /// 2 lanes of 32 bits, 64-bit vector.
    Size32x2,
    /// 4 lanes of 32 bits, 128-bit vector.
    Size32x4,
    /// 2 lanes of 64 bits, 128-bit vector.
    Size64x2,
}

impl VectorSize {
    /// The width of a single lane.
    pub fn lane_size(self) -> ScalarSize {
        match self {
            VectorSize::Size8x8 | VectorSize::Size8x16 => ScalarSize::Size8,
            VectorSize::Size16x4 | VectorSize::Size16x8 => ScalarSize::Size16,
            VectorSize::Size32x2 | VectorSize::Size32x4 => ScalarSize::Size32,
            VectorSize::Size64x2 => ScalarSize::Size64,
        }
    }

    /// The number of lanes.
    pub fn lane_count(self) -> u8 {
        match self {
            VectorSize::Size8x16 => 16,
            VectorSize::Size8x8 | VectorSize::Size16x8 => 8,
            VectorSize::Size16x4 | VectorSize::Size32x4 => 4,
            VectorSize::Size32x2 | VectorSize::Size64x2 => 2,
        }
    }

    /// Whether the vector occupies a full 128-bit register.
    pub fn is_128bits(self) -> bool {
        !matches!(
            self,
            VectorSize::Size8x8 | VectorSize::Size16x4 | VectorSize::Size32x2
        )
    }

    /// The `(Q, size)` field pair shared by most ASIMD encodings.
    pub(crate) fn enc_size(self) -> (u32, u32) {
        let q = self.is_128bits() as u32;
        let size = match self.lane_size() {
            ScalarSize::Size8 => 0b00,
            ScalarSize::Size16 => 0b01,
            ScalarSize::Size32 => 0b10,
            ScalarSize::Size64 => 0b11,
            ScalarSize::Size128 => unreachable!(),
        };
        (q, size)
    }
}

/// Shareability scope for `dmb`/`dsb` barriers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum BarrierScope {
    /// Outer shareable, loads only.
    Oshld = 0b0001,
    /// Outer shareable, stores only.
    Oshst = 0b0010,
    /// Outer shareable.
    Osh = 0b0011,
    /// Non-shareable, loads only.
    Nshld = 0b0101,
    /// Non-shareable, stores only.
    Nshst = 0b0110,
    /// Non-shareable.
    Nsh = 0b0111,
    /// Inner shareable, loads only.
    Ishld = 0b1001,
    /// Inner shareable, stores only.
    Ishst = 0b1010,
    /// Inner shareable.
    Ish = 0b1011,
    /// Full system, loads only.
    Ld = 0b1101,
    /// Full system, stores only.
    St = 0b1110,
    /// Full system.
    Sy = 0b1111,
}

impl BarrierScope {
    pub(crate) fn bits(self) -> u32 {
        self as u32
    }
}

/// Operation selector for the LSE atomic read-modify-write family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AtomicRMWOp {
    /// Atomic add (`ldadd`).
    Add,
    /// Atomic bit clear (`ldclr`).
    Clr,
    /// Atomic exclusive-or (`ldeor`).
    Eor,
    /// Atomic bit set (`ldset`).
    Set,
    /// Atomic signed maximum (`ldsmax`).
    Smax,
    /// Atomic signed minimum (`ldsmin`).
    Smin,
    /// Atomic unsigned maximum (`ldumax`).
    Umax,
    /// Atomic unsigned minimum (`ldumin`).
    Umin,
    /// Atomic swap (`swp`).
    Swp,
}

/// Memory-ordering variant for the LSE atomics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemOrder {
    /// No ordering (plain form).
    Relaxed,
    /// Load-acquire semantics (`a` suffix).
    Acquire,
    /// Store-release semantics (`l` suffix).
    Release,
    /// Both (`al` suffix).
    AcqRel,
}

impl MemOrder {
    /// The (A, R) bit pair of the LSE encodings.
    pub(crate) fn bits(self) -> (u32, u32) {
        match self {
            MemOrder::Relaxed => (0, 0),
            MemOrder::Acquire => (1, 0),
            MemOrder::Release => (0, 1),
            MemOrder::AcqRel => (1, 1),
        }
    }
}

const fn sysreg(op0: u32, op1: u32, crn: u32, crm: u32, op2: u32) -> u16 {
    ((op0 & 1) << 14 | op1 << 11 | crn << 7 | crm << 3 | op2) as u16
}

/// System registers accessible through `mrs`/`msr`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum SystemReg {
    /// Condition flags.
    Nzcv = sysreg(0b11, 0b011, 0b0100, 0b0010, 0b000),
    /// Floating-point control register.
    Fpcr = sysreg(0b11, 0b011, 0b0100, 0b0100, 0b000),
    /// Floating-point status register.
    Fpsr = sysreg(0b11, 0b011, 0b0100, 0b0100, 0b001),
    /// Software thread ID register.
    TpidrEl0 = sysreg(0b11, 0b011, 0b1101, 0b0000, 0b010),
    /// Read-only software thread ID register.
    TpidrroEl0 = sysreg(0b11, 0b011, 0b1101, 0b0000, 0b011),
    /// Cache type register.
    CtrEl0 = sysreg(0b11, 0b011, 0b0000, 0b0000, 0b001),
    /// Data cache zero ID register.
    DczidEl0 = sysreg(0b11, 0b011, 0b0000, 0b0000, 0b111),
    /// Virtual counter.
    CntvctEl0 = sysreg(0b11, 0b011, 0b1110, 0b0000, 0b010),
    /// Counter frequency.
    CntfrqEl0 = sysreg(0b11, 0b011, 0b1110, 0b0000, 0b000),
}

impl SystemReg {
    /// The `o0:op1:CRn:CRm:op2` field of the `mrs`/`msr` encodings.
    pub(crate) fn bits(self) -> u32 {
        self as u32
    }
}

const fn dcop(op1: u32, crm: u32, op2: u32) -> u16 {
    (op1 << 11 | crm << 3 | op2) as u16
}

/// Data cache maintenance operations for `dc`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum DataCacheOp {
    /// Invalidate by VA to point of coherency.
    Ivac = dcop(0b000, 0b0110, 0b001),
    /// Clean by VA to point of coherency.
    Cvac = dcop(0b011, 0b1010, 0b001),
    /// Clean by VA to point of unification.
    Cvau = dcop(0b011, 0b1011, 0b001),
    /// Clean and invalidate by VA to point of coherency.
    Civac = dcop(0b011, 0b1110, 0b001),
    /// Zero cache line by VA.
    Zva = dcop(0b011, 0b0100, 0b001),
}

impl DataCacheOp {
    pub(crate) fn bits(self) -> u32 {
        self as u32
    }
}

/// Instruction cache maintenance operations for `ic`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum InsnCacheOp {
    /// Invalidate all to point of unification.
    Iallu = dcop(0b000, 0b0101, 0b000),
    /// Invalidate all to point of unification, inner shareable.
    Ialluis = dcop(0b000, 0b0001, 0b000),
    /// Invalidate by VA to point of unification.
    Ivau = dcop(0b011, 0b0101, 0b001),
}

impl InsnCacheOp {
    pub(crate) fn bits(self) -> u32 {
        self as u32
    }

    /// Whether this operation takes a register argument.
    pub(crate) fn has_operand(self) -> bool {
        matches!(self, InsnCacheOp::Ivau)
    }
}

/// Prefetch hints for `prfm`: load/store direction, target cache level, and
/// keep/streaming retention policy. Encoded in the `rt` slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PrefetchOp {
    /// Prefetch for load, L1, temporal.
    PldL1Keep = 0b00_000,
    /// Prefetch for load, L1, streaming.
    PldL1Strm = 0b00_001,
    /// Prefetch for load, L2, temporal.
    PldL2Keep = 0b00_010,
    /// Prefetch for load, L2, streaming.
    PldL2Strm = 0b00_011,
    /// Prefetch for load, L3, temporal.
    PldL3Keep = 0b00_100,
    /// Prefetch for load, L3, streaming.
    PldL3Strm = 0b00_101,
    /// Prefetch for store, L1, temporal.
    PstL1Keep = 0b10_000,
    /// Prefetch for store, L1, streaming.
    PstL1Strm = 0b10_001,
    /// Prefetch for store, L2, temporal.
    PstL2Keep = 0b10_010,
    /// Prefetch for store, L2, streaming.
    PstL2Strm = 0b10_011,
    /// Prefetch for store, L3, temporal.
    PstL3Keep = 0b10_100,
    /// Prefetch for store, L3, streaming.
    PstL3Strm = 0b10_101,
}

impl PrefetchOp {
    pub(crate) fn bits(self) -> u32 {
        self as u32
    }
}

/// An addressing-mode descriptor for the load/store facade methods.
///
/// The per-shape emitters (`ldr_imm`, `ldur`, `ldr_pre`, ...) are the primary
/// interface; `MemOperand` exists so a caller holding a symbolic address can
/// dispatch once instead of matching at every use site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemOperand {
    /// `[rn, #imm]` with an unsigned, access-size-scaled offset.
    UnsignedOffset {
        /// Base register (SP allowed).
        rn: Reg,
        /// Byte offset; must be a multiple of the access size.
        imm: u32,
    },
    /// `[rn, #simm9]`, unscaled.
    Unscaled {
        /// Base register (SP allowed).
        rn: Reg,
        /// Signed 9-bit byte offset.
        simm9: i32,
    },
    /// `[rn, #simm9]!` pre-indexed writeback.
    PreIndexed {
        /// Base register (SP allowed).
        rn: Reg,
        /// Signed 9-bit byte offset.
        simm9: i32,
    },
    /// `[rn], #simm9` post-indexed writeback.
    PostIndexed {
        /// Base register (SP allowed).
        rn: Reg,
        /// Signed 9-bit byte offset.
        simm9: i32,
    },
    /// `[rn, rm, ext #amount]` register offset with extend/shift.
    RegExtended {
        /// Base register (SP allowed).
        rn: Reg,
        /// Offset register.
        rm: Reg,
        /// Extend operator applied to `rm`.
        ext: ExtendOp,
        /// Whether the offset is scaled by the access size.
        scaled: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cond_inversion_round_trips() {
        for c in [
            Cond::Eq,
            Cond::Ne,
            Cond::Hs,
            Cond::Lo,
            Cond::Mi,
            Cond::Pl,
            Cond::Vs,
            Cond::Vc,
            Cond::Hi,
            Cond::Ls,
            Cond::Ge,
            Cond::Lt,
            Cond::Gt,
            Cond::Le,
        ] {
            assert_eq!(c.invert().invert(), c);
            // Inverting a condition flips the low bit of its encoding.
            assert_eq!(c.invert().bits(), c.bits() ^ 1);
        }
    }

    #[test]
    fn vector_arrangements() {
        assert_eq!(VectorSize::Size8x16.enc_size(), (1, 0b00));
        assert_eq!(VectorSize::Size16x4.enc_size(), (0, 0b01));
        assert_eq!(VectorSize::Size32x4.enc_size(), (1, 0b10));
        assert_eq!(VectorSize::Size64x2.enc_size(), (1, 0b11));
        assert_eq!(VectorSize::Size32x2.lane_count(), 2);
        assert!(!VectorSize::Size32x2.is_128bits());
    }

    #[test]
    fn sysreg_fields() {
        // nzcv is op0=3 op1=3 CRn=4 CRm=2 op2=0.
        assert_eq!(SystemReg::Nzcv.bits(), 0b1_011_0100_0010_000);
    }
}
