//! AArch64 register handles.
//!
//! Registers are deliberately tiny value types: a bank is a distinct Rust
//! type and an index is a single byte, so handles are free to copy and
//! compare, and converting a register into its instruction field is a plain
//! shift-and-or. Operating width is *not* part of a handle; the emitter takes
//! a width tag per call (see [`crate::args`]), which lets a JIT pick sizes at
//! runtime without converting register values.

/// A general-purpose register.
///
/// Index 31 is context-dependent: it reads as the zero register in data
/// positions and as the stack pointer in base-address positions. The helpers
/// [`zero_reg`] and [`stack_reg`] both return it; which meaning applies is
/// determined by the instruction, exactly as in the architecture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Reg(u8);

impl Reg {
    /// Create a register handle from a hardware index, failing for indices
    /// outside 0..=31.
    pub const fn new(index: u8) -> Option<Reg> {
        if index < 32 {
            Some(Reg(index))
        } else {
            None
        }
    }

    /// The hardware index of this register.
    pub const fn index(self) -> u8 {
        self.0
    }

    /// The register's 5-bit instruction field, as a word-sized value.
    pub(crate) const fn enc(self) -> u32 {
        self.0 as u32
    }
}

/// A SIMD/FP register.
///
/// The same 32 registers back every view width (B/H/S/D/Q and every vector
/// arrangement); views are pure relabeling, so a single handle type suffices
/// and the per-call size tag selects the view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VReg(u8);

impl VReg {
    /// Create a vector register handle from a hardware index, failing for
    /// indices outside 0..=31.
    pub const fn new(index: u8) -> Option<VReg> {
        if index < 32 {
            Some(VReg(index))
        } else {
            None
        }
    }

    /// The hardware index of this register.
    pub const fn index(self) -> u8 {
        self.0
    }

    pub(crate) const fn enc(self) -> u32 {
        self.0 as u32
    }
}

/// Get a reference to a general-purpose register. Panics on indices above 30;
/// use [`zero_reg`] or [`stack_reg`] to name register 31 by intent.
pub const fn xreg(num: u8) -> Reg {
    assert!(num < 31);
    Reg(num)
}

/// Get a reference to the zero register (XZR/WZR).
pub const fn zero_reg() -> Reg {
    Reg(31)
}

/// Get a reference to the stack pointer. Shares an encoding with
/// [`zero_reg`]; the instruction determines which is meant.
pub const fn stack_reg() -> Reg {
    Reg(31)
}

/// Get a reference to the link register (x30).
pub const fn link_reg() -> Reg {
    Reg(30)
}

/// Get a reference to the frame pointer (x29).
pub const fn fp_reg() -> Reg {
    Reg(29)
}

/// Get a reference to a SIMD/FP register.
pub const fn vreg(num: u8) -> VReg {
    assert!(num < 32);
    VReg(num)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_construction_validates_index() {
        assert_eq!(Reg::new(0).unwrap().index(), 0);
        assert_eq!(Reg::new(31).unwrap().index(), 31);
        assert_eq!(Reg::new(32), None);
        assert_eq!(VReg::new(31).unwrap().index(), 31);
        assert_eq!(VReg::new(255), None);
    }

    #[test]
    fn zero_and_stack_share_an_encoding() {
        assert_eq!(zero_reg().index(), 31);
        assert_eq!(stack_reg().index(), 31);
    }
}
