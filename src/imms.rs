//! AArch64 immediate shapes.
//!
//! Every immediate an instruction can carry has a dedicated type here with a
//! fallible constructor: a value that cannot be represented in the field's
//! range/alignment/shape is rejected before any word is built, so an
//! out-of-range immediate can never reach the code buffer.

use crate::args::{OperandSize, ScalarSize};

/// An unsigned 12-bit immediate with an optional left shift by 12, as used by
/// `add`/`sub` (immediate).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Imm12 {
    /// The immediate bits.
    pub bits: u16,
    /// Whether the immediate is shifted left by 12.
    pub shift12: bool,
}

impl Imm12 {
    /// Compute an `Imm12` from a raw value, if representable.
    pub fn maybe_from_u64(value: u64) -> Option<Imm12> {
        if value < 0x1000 {
            Some(Imm12 {
                bits: value as u16,
                shift12: false,
            })
        } else if value < 0x100_0000 && (value & 0xfff) == 0 {
            Some(Imm12 {
                bits: (value >> 12) as u16,
                shift12: true,
            })
        } else {
            None
        }
    }

    /// The `sh:imm12` field pair, positioned at bit 10.
    pub(crate) fn enc_bits(self) -> u32 {
        ((self.shift12 as u32) << 12 | self.bits as u32) << 10
    }
}

/// A signed 9-bit immediate byte offset, as used by the unscaled and
/// pre/post-indexed load/store forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SImm9(i32);

impl SImm9 {
    /// Create a signed 9-bit immediate, if the value fits.
    pub fn maybe_from_i64(value: i64) -> Option<SImm9> {
        if (-256..=255).contains(&value) {
            Some(SImm9(value as i32))
        } else {
            None
        }
    }

    pub(crate) fn bits(self) -> u32 {
        (self.0 as u32) & 0x1ff
    }
}

/// A signed 7-bit immediate scaled by the access size, as used by the
/// load/store pair instructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SImm7Scaled(i32);

impl SImm7Scaled {
    /// Create from a byte offset; fails when the offset is misaligned or out
    /// of the scaled range for an access of `size`.
    pub fn maybe_from_i64(value: i64, size: ScalarSize) -> Option<SImm7Scaled> {
        let scale = i64::from(size.bits() / 8);
        let upper = scale * 63;
        let lower = -(scale * 64);
        if value % scale == 0 && value >= lower && value <= upper {
            Some(SImm7Scaled((value / scale) as i32))
        } else {
            None
        }
    }

    pub(crate) fn bits(self) -> u32 {
        (self.0 as u32) & 0x7f
    }
}

/// An unsigned 12-bit immediate scaled by the access size, as used by the
/// unsigned-offset load/store forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UImm12Scaled(u16);

impl UImm12Scaled {
    /// Create from a byte offset; fails when the offset is misaligned or out
    /// of the scaled range for an access of `size`.
    pub fn maybe_from_i64(value: i64, size: ScalarSize) -> Option<UImm12Scaled> {
        let scale = i64::from(size.bits() / 8);
        if value >= 0 && value <= scale * 4095 && value % scale == 0 {
            Some(UImm12Scaled((value / scale) as u16))
        } else {
            None
        }
    }

    pub(crate) fn bits(self) -> u32 {
        self.0 as u32
    }
}

/// A shift amount for the immediate-shift aliases, restricted to the operand
/// width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImmShift(u8);

impl ImmShift {
    /// Create a shift amount valid for `size`-wide operands.
    pub fn maybe_from_u64(value: u64, size: OperandSize) -> Option<ImmShift> {
        if value < u64::from(size.bits()) {
            Some(ImmShift(value as u8))
        } else {
            None
        }
    }

    pub(crate) fn value(self) -> u8 {
        self.0
    }
}

/// A 16-bit immediate with a 16-bit-granule left shift, as used by
/// `movz`/`movn`/`movk`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveWideConst {
    /// The 16 immediate bits.
    pub bits: u16,
    /// The `hw` field: shift amount divided by 16.
    pub shift: u8,
}

impl MoveWideConst {
    /// Pack an explicit (imm16, lsl-amount) pair. The lsl amount must be one
    /// of 0/16/32/48, and 32/48 are only allocated for 64-bit destinations.
    pub fn maybe_with_shift(bits: u16, lsl: u8, size: OperandSize) -> Option<MoveWideConst> {
        if lsl % 16 != 0 || lsl >= size.bits() {
            return None;
        }
        Some(MoveWideConst {
            bits,
            shift: lsl / 16,
        })
    }

    /// Find a (imm16, shift) pair that reproduces `value` exactly, if one
    /// exists.
    pub fn maybe_from_u64(value: u64) -> Option<MoveWideConst> {
        for shift in 0..4u8 {
            let chunk = (value >> (shift * 16)) & 0xffff;
            if chunk << (shift * 16) == value {
                return Some(MoveWideConst {
                    bits: chunk as u16,
                    shift,
                });
            }
        }
        None
    }
}

fn is_mask(value: u64) -> bool {
    value & value.wrapping_add(1) == 0
}

fn is_shifted_mask(value: u64) -> bool {
    value != 0 && is_mask((value - 1) | value)
}

/// A logical ("bitmask") immediate: a constant expressible as a rotated,
/// replicated run of ones, packed into the (N, immr, imms) triple used by
/// `and`/`orr`/`eor`/`tst` (immediate).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImmLogic {
    /// The represented value (for 32-bit, in the low half).
    pub value: u64,
    n: bool,
    r: u8,
    s: u8,
    size: OperandSize,
}

impl ImmLogic {
    /// Compute an `ImmLogic` from a raw value, if the value is a legal
    /// bitmask immediate for the given operand width.
    ///
    /// All-zeros and all-ones are not encodable, by architectural fiat.
    pub fn maybe_from_u64(original: u64, size: OperandSize) -> Option<ImmLogic> {
        let (value, width) = match size {
            OperandSize::Size32 => {
                if original > u64::from(u32::MAX) {
                    return None;
                }
                // Replicate into the upper half so a single 64-bit search
                // covers both widths.
                (original | (original << 32), 32u32)
            }
            OperandSize::Size64 => (original, 64u32),
        };
        if value == 0 || value == u64::MAX {
            return None;
        }

        // Find the smallest repetition size: halve while both halves agree.
        let mut esize = 64u32;
        loop {
            esize /= 2;
            let mask = (1u64 << esize) - 1;
            if (value & mask) != ((value >> esize) & mask) {
                esize *= 2;
                break;
            }
            if esize <= 2 {
                break;
            }
        }
        if esize > width {
            return None;
        }

        // Determine the rotation and the length of the run of ones within
        // one element.
        let mask = u64::MAX >> (64 - esize);
        let elem = value & mask;
        let (rotation, ones) = if is_shifted_mask(elem) {
            let tz = elem.trailing_zeros();
            (tz, (elem >> tz).trailing_ones())
        } else {
            // The run of ones wraps around the element boundary.
            let ext = elem | !mask;
            if !is_shifted_mask(!ext) {
                return None;
            }
            let clo = ext.leading_ones();
            let i = 64 - clo;
            (i, clo + ext.trailing_ones() - (64 - esize))
        };
        debug_assert!(ones >= 1 && ones < esize);

        let immr = (esize.wrapping_sub(rotation)) & (esize - 1);
        // imms is the run length minus one, prefixed with the element-size
        // marker pattern; N is the complement of its seventh bit.
        let nimms = !(esize - 1) << 1 | (ones - 1);
        let n = ((nimms >> 6) & 1) ^ 1;
        Some(ImmLogic {
            value: original,
            n: n == 1,
            r: immr as u8,
            s: (nimms & 0x3f) as u8,
            size,
        })
    }

    /// The `N:immr:imms` field triple, positioned at bit 10.
    pub(crate) fn enc_bits(self) -> u32 {
        ((self.n as u32) << 12 | u32::from(self.r) << 6 | u32::from(self.s)) << 10
    }

    /// The operand width this immediate was computed for.
    pub fn size(self) -> OperandSize {
        self.size
    }
}

/// An 8-bit floating-point immediate in the VFP `abcdefgh` format, as used by
/// `fmov` (immediate) in both scalar and vector forms.
///
/// The format covers values of the form `±(16..=31) * 2^(-7..=8)`; anything
/// else is unrepresentable and rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ASIMDFPImm(u8);

impl ASIMDFPImm {
    /// Compute the 8-bit immediate from raw float bits of width `size`, if
    /// the value is exactly representable.
    pub fn maybe_from_u64(bits: u64, size: ScalarSize) -> Option<ASIMDFPImm> {
        match size {
            ScalarSize::Size16 => {
                // sign(1) | exp(5) = ~b:b:b:c:d | frac(10) = efgh:000000
                if bits & !0xffff != 0 || bits & 0x3f != 0 {
                    return None;
                }
                let sign = (bits >> 15) & 1;
                let expb = (bits >> 14) & 1;
                let rep = (bits >> 12) & 0b11;
                let rep_ok = if expb == 0 { rep == 0b11 } else { rep == 0 };
                if !rep_ok {
                    return None;
                }
                let b = expb ^ 1;
                let cd = (bits >> 10) & 0b11;
                let efgh = (bits >> 6) & 0b1111;
                Some(ASIMDFPImm((sign << 7 | b << 6 | cd << 4 | efgh) as u8))
            }
            ScalarSize::Size32 => {
                if bits & !0xffff_ffff != 0 || bits & 0x7_ffff != 0 {
                    return None;
                }
                let sign = (bits >> 31) & 1;
                let expb = (bits >> 30) & 1;
                let rep = (bits >> 25) & 0b11111;
                let rep_ok = if expb == 0 { rep == 0b11111 } else { rep == 0 };
                if !rep_ok {
                    return None;
                }
                let b = expb ^ 1;
                let cd = (bits >> 23) & 0b11;
                let efgh = (bits >> 19) & 0b1111;
                Some(ASIMDFPImm((sign << 7 | b << 6 | cd << 4 | efgh) as u8))
            }
            ScalarSize::Size64 => {
                if bits & 0xffff_ffff_ffff != 0 {
                    return None;
                }
                let sign = (bits >> 63) & 1;
                let expb = (bits >> 62) & 1;
                let rep = (bits >> 54) & 0xff;
                let rep_ok = if expb == 0 { rep == 0xff } else { rep == 0 };
                if !rep_ok {
                    return None;
                }
                let b = expb ^ 1;
                let cd = (bits >> 52) & 0b11;
                let efgh = (bits >> 48) & 0b1111;
                Some(ASIMDFPImm((sign << 7 | b << 6 | cd << 4 | efgh) as u8))
            }
            _ => None,
        }
    }

    /// The packed `abcdefgh` byte.
    pub fn enc_bits(self) -> u8 {
        self.0
    }
}

/// A modified immediate for the ASIMD `movi`/`mvni`/`orr`/`bic` family: an
/// 8-bit payload plus the lane-width-dependent shift that selects the cmode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ASIMDMovModImm {
    imm: u8,
    shift: u8,
    shift_ones: bool,
}

impl ASIMDMovModImm {
    /// Pack an explicit (imm8, lsl-amount) pair for a lane width. Legal
    /// shifts are 0 for 8-bit lanes, 0/8 for 16-bit lanes, and 0/8/16/24 for
    /// 32-bit lanes.
    pub fn maybe_with_lsl(imm: u8, lsl: u32, size: ScalarSize) -> Option<ASIMDMovModImm> {
        let legal = match size {
            ScalarSize::Size8 => lsl == 0,
            ScalarSize::Size16 => lsl == 0 || lsl == 8,
            ScalarSize::Size32 => lsl % 8 == 0 && lsl <= 24,
            _ => false,
        };
        if legal {
            Some(ASIMDMovModImm {
                imm,
                shift: (lsl / 8) as u8,
                shift_ones: false,
            })
        } else {
            None
        }
    }

    /// Pack an (imm8, msl-amount) pair for the 32-bit "shifting ones" form.
    /// Legal amounts are 8 and 16.
    pub fn maybe_with_msl(imm: u8, msl: u32) -> Option<ASIMDMovModImm> {
        if msl == 8 || msl == 16 {
            Some(ASIMDMovModImm {
                imm,
                shift: (msl / 8) as u8,
                shift_ones: true,
            })
        } else {
            None
        }
    }

    /// Compute the 64-bit per-byte-mask form: every byte of `value` must be
    /// 0x00 or 0xff, and each becomes one immediate bit.
    pub fn maybe_mask_from_u64(value: u64) -> Option<ASIMDMovModImm> {
        let mut imm = 0u8;
        for byte in 0..8 {
            match (value >> (byte * 8)) & 0xff {
                0x00 => {}
                0xff => imm |= 1 << byte,
                _ => return None,
            }
        }
        Some(ASIMDMovModImm {
            imm,
            shift: 0,
            shift_ones: false,
        })
    }

    /// The 8-bit payload.
    pub fn imm(self) -> u8 {
        self.imm
    }

    /// The byte-granule shift amount (`lsl`/`msl` divided by 8).
    pub(crate) fn shift(self) -> u32 {
        self.shift as u32
    }

    /// Whether this is the "shifting ones" (`msl`) form.
    pub(crate) fn is_msl(self) -> bool {
        self.shift_ones
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::OperandSize::{Size32, Size64};

    #[test]
    fn imm12() {
        assert_eq!(
            Imm12::maybe_from_u64(0),
            Some(Imm12 {
                bits: 0,
                shift12: false
            })
        );
        assert_eq!(
            Imm12::maybe_from_u64(0xfff),
            Some(Imm12 {
                bits: 0xfff,
                shift12: false
            })
        );
        assert_eq!(
            Imm12::maybe_from_u64(0x1000),
            Some(Imm12 {
                bits: 1,
                shift12: true
            })
        );
        assert_eq!(
            Imm12::maybe_from_u64(0xfff000),
            Some(Imm12 {
                bits: 0xfff,
                shift12: true
            })
        );
        assert_eq!(Imm12::maybe_from_u64(0x1001), None);
        assert_eq!(Imm12::maybe_from_u64(0x1000000), None);
    }

    #[test]
    fn simm9_range() {
        assert!(SImm9::maybe_from_i64(-256).is_some());
        assert!(SImm9::maybe_from_i64(255).is_some());
        assert!(SImm9::maybe_from_i64(-257).is_none());
        assert!(SImm9::maybe_from_i64(256).is_none());
        assert_eq!(SImm9::maybe_from_i64(-1).unwrap().bits(), 0x1ff);
    }

    #[test]
    fn simm7_scaled_range() {
        use ScalarSize::*;
        assert_eq!(
            SImm7Scaled::maybe_from_i64(-512, Size64).unwrap().bits(),
            0x40
        );
        assert_eq!(
            SImm7Scaled::maybe_from_i64(504, Size64).unwrap().bits(),
            0x3f
        );
        assert!(SImm7Scaled::maybe_from_i64(505, Size64).is_none());
        assert!(SImm7Scaled::maybe_from_i64(-516, Size64).is_none());
        assert!(SImm7Scaled::maybe_from_i64(4, Size64).is_none());
        assert!(SImm7Scaled::maybe_from_i64(-256, Size32).is_some());
        assert!(SImm7Scaled::maybe_from_i64(1008, Size128).is_some());
    }

    #[test]
    fn uimm12_scaled_range() {
        use ScalarSize::*;
        assert!(UImm12Scaled::maybe_from_i64(32760, Size64).is_some());
        assert!(UImm12Scaled::maybe_from_i64(32768, Size64).is_none());
        assert!(UImm12Scaled::maybe_from_i64(-8, Size64).is_none());
        assert!(UImm12Scaled::maybe_from_i64(7, Size64).is_none());
        assert_eq!(UImm12Scaled::maybe_from_i64(4095, Size8).unwrap().bits(), 4095);
    }

    #[test]
    fn move_wide() {
        assert_eq!(
            MoveWideConst::maybe_from_u64(0xffff),
            Some(MoveWideConst {
                bits: 0xffff,
                shift: 0
            })
        );
        assert_eq!(
            MoveWideConst::maybe_from_u64(0xffff_0000_0000_0000),
            Some(MoveWideConst {
                bits: 0xffff,
                shift: 3
            })
        );
        assert_eq!(MoveWideConst::maybe_from_u64(0x1_0001), None);
        assert!(MoveWideConst::maybe_with_shift(1, 32, Size32).is_none());
        assert!(MoveWideConst::maybe_with_shift(1, 48, Size64).is_some());
        assert!(MoveWideConst::maybe_with_shift(1, 8, Size64).is_none());
    }

    #[test]
    fn logical_imm_accepts_rotated_runs() {
        // Value, width, expected N:immr:imms (as checked against an
        // independent assembler).
        let cases: &[(u64, OperandSize, u32, u32, u32)] = &[
            (0x1, Size64, 1, 0, 0),
            (0x7fff_ffff_ffff_ffff, Size64, 1, 0, 62),
            (0xff00_ff00_ff00_ff00, Size64, 0, 0b001000, 0b000111),
            (0x00ff_00ff, Size32, 0, 0b000000, 0b100111),
            (0x5555_5555_5555_5555, Size64, 0, 0, 0b111100),
            (0xff00_0000_0000_0000, Size64, 1, 0b001000, 0b000111),
            (0x3ffc, Size64, 1, 0b110010, 0b001011),
            (0xf000_000f, Size32, 0, 0b000100, 0b000111),
        ];
        for &(value, size, n, immr, imms) in cases {
            let imm = ImmLogic::maybe_from_u64(value, size)
                .unwrap_or_else(|| panic!("{value:#x} should encode"));
            assert_eq!(
                imm.enc_bits(),
                (n << 12 | immr << 6 | imms) << 10,
                "wrong fields for {value:#x}"
            );
        }
    }

    #[test]
    fn logical_imm_rejects_non_masks() {
        assert!(ImmLogic::maybe_from_u64(0, Size64).is_none());
        assert!(ImmLogic::maybe_from_u64(u64::MAX, Size64).is_none());
        assert!(ImmLogic::maybe_from_u64(0xffff_ffff, Size32).is_none());
        assert!(ImmLogic::maybe_from_u64(0x1234_5678, Size64).is_none());
        assert!(ImmLogic::maybe_from_u64(0xdead_beef, Size32).is_none());
        // Not expressible at 32 bits: upper half set.
        assert!(ImmLogic::maybe_from_u64(0x1_0000_0000, Size32).is_none());
    }

    #[test]
    fn fp_imm8() {
        use ScalarSize::*;
        // 1.0 / 2.0 / -1.9375 in each width.
        assert_eq!(
            ASIMDFPImm::maybe_from_u64(f64::to_bits(1.0), Size64)
                .unwrap()
                .enc_bits(),
            0b0_111_0000
        );
        assert_eq!(
            ASIMDFPImm::maybe_from_u64(f32::to_bits(2.0) as u64, Size32)
                .unwrap()
                .enc_bits(),
            0b0_000_0000
        );
        assert_eq!(
            ASIMDFPImm::maybe_from_u64(f32::to_bits(-1.9375) as u64, Size32)
                .unwrap()
                .enc_bits(),
            0b1_111_1111
        );
        assert_eq!(
            ASIMDFPImm::maybe_from_u64(0x3c00, Size16).unwrap().enc_bits(), // 1.0
            0b0_111_0000
        );
        assert_eq!(
            ASIMDFPImm::maybe_from_u64(0x3000, Size16).unwrap().enc_bits(), // 0.125
            0b0_100_0000
        );
        assert!(ASIMDFPImm::maybe_from_u64(0x3c20, Size16).is_none());
        // 0.0 and values needing more mantissa bits are not representable.
        assert!(ASIMDFPImm::maybe_from_u64(0, Size64).is_none());
        assert!(ASIMDFPImm::maybe_from_u64(f64::to_bits(1.1), Size64).is_none());
        assert!(ASIMDFPImm::maybe_from_u64(f32::to_bits(0.1) as u64, Size32).is_none());
        assert!(ASIMDFPImm::maybe_from_u64(f64::to_bits(512.0), Size64).is_none());
    }

    #[test]
    fn movi_modified_imm() {
        use ScalarSize::*;
        assert!(ASIMDMovModImm::maybe_with_lsl(0xff, 0, Size8).is_some());
        assert!(ASIMDMovModImm::maybe_with_lsl(0xff, 8, Size8).is_none());
        assert!(ASIMDMovModImm::maybe_with_lsl(0xff, 8, Size16).is_some());
        assert!(ASIMDMovModImm::maybe_with_lsl(0xff, 16, Size16).is_none());
        assert!(ASIMDMovModImm::maybe_with_lsl(0xff, 24, Size32).is_some());
        assert!(ASIMDMovModImm::maybe_with_lsl(0xff, 12, Size32).is_none());
        assert!(ASIMDMovModImm::maybe_with_msl(0xff, 16).is_some());
        assert!(ASIMDMovModImm::maybe_with_msl(0xff, 24).is_none());

        let mask = ASIMDMovModImm::maybe_mask_from_u64(0x00ff_00ff_0000_ff00).unwrap();
        assert_eq!(mask.imm(), 0b0101_0010);
        assert!(ASIMDMovModImm::maybe_mask_from_u64(0x0100).is_none());
    }
}
