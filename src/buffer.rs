//! In-memory machine code buffer with label resolution.
//!
//! The buffer accumulates little-endian 32-bit instruction words and resolves
//! pc-relative references through *labels*. A label is a cheap index; it is
//! created unbound, may be referenced by any number of emitted instructions,
//! and is bound to the current offset exactly once. References to
//! already-bound labels are resolved as the referencing word is emitted;
//! references to not-yet-bound labels are recorded as fixups and patched when
//! the label is bound. There are no veneers and no relaxation: a reference
//! whose resolved distance does not fit the instruction's offset field is a
//! hard error, never a silent truncation.
//!
//! The capacity supplied at construction is final. JITs commonly emit
//! directly into memory that is already mapped for execution, so the buffer
//! never grows behind the caller's back; running out of space is reported as
//! an error on the emission that would overflow.

use crate::result::{EmitError, EmitResult};
use log::trace;
use smallvec::SmallVec;

/// A byte offset from the start of the buffer.
pub type CodeOffset = u32;

/// A label refers to an offset in the emitted code, either known (bound) or
/// not yet known (unbound). Labels are local to one buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Label(u32);

impl Label {
    /// Get the label's index, for diagnostics.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// The offset of a label whose position is not yet known.
const UNKNOWN_LABEL_OFFSET: CodeOffset = 0xffff_ffff;

/// A mode of pc-relative reference: which instruction field holds the offset,
/// and at what granularity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LabelUse {
    /// 26-bit branch offset (`b`, `bl`): word-aligned, +/- 128MiB.
    Branch26,
    /// 19-bit offset at bit 5 (`b.cond`, `cbz`/`cbnz`): word-aligned,
    /// +/- 1MiB.
    Branch19,
    /// 14-bit offset at bit 5 (`tbz`/`tbnz`): word-aligned, +/- 32KiB.
    Branch14,
    /// 19-bit offset at bit 5 (`ldr` literal): word-aligned, +/- 1MiB.
    Ldr19,
    /// 21-bit byte offset split across immlo/immhi (`adr`): +/- 1MiB.
    Adr21,
    /// 21-bit page offset split across immlo/immhi (`adrp`): +/- 4GiB from
    /// the referencing page.
    Adrp21,
}

impl LabelUse {
    /// Compute the pc-relative distance this use encodes, given the offsets
    /// of the referencing instruction and of the target.
    fn delta(self, use_offset: CodeOffset, target: CodeOffset) -> i64 {
        match self {
            LabelUse::Adrp21 => {
                i64::from(target & !0xfff) - i64::from(use_offset & !0xfff)
            }
            _ => i64::from(target) - i64::from(use_offset),
        }
    }

    /// Patch the distance into an instruction word, or fail if it does not
    /// fit the field.
    fn patch_word(self, insn: u32, delta: i64) -> EmitResult<u32> {
        let (field, shift, granule_bits, pos) = match self {
            LabelUse::Branch26 => (delta >> 2, 0, 2, 26u32),
            LabelUse::Branch19 | LabelUse::Ldr19 => (delta >> 2, 5, 2, 19),
            LabelUse::Branch14 => (delta >> 2, 5, 2, 14),
            // Byte- and page-granule forms are handled below.
            LabelUse::Adr21 => (delta, 0, 0, 21),
            LabelUse::Adrp21 => (delta >> 12, 0, 0, 21),
        };
        let lo = -(1i64 << (pos - 1));
        let hi = (1i64 << (pos - 1)) - 1;
        if field < lo || field > hi || delta & ((1 << granule_bits) - 1) != 0 {
            return Err(EmitError::FixupOutOfRange(delta));
        }
        let field = (field as u32) & ((1 << pos) - 1);
        Ok(match self {
            LabelUse::Adr21 | LabelUse::Adrp21 => {
                // immlo at bits 30..29, immhi at bits 23..5.
                insn | (field & 0b11) << 29 | (field >> 2) << 5
            }
            _ => insn | field << shift,
        })
    }
}

/// A not-yet-resolvable reference from an emitted instruction to an unbound
/// label.
#[derive(Clone, Copy, Debug)]
struct Fixup {
    offset: CodeOffset,
    label: Label,
    kind: LabelUse,
}

/// A fixed-capacity buffer of emitted machine code.
pub struct CodeBuffer {
    data: Vec<u8>,
    capacity: usize,
    label_offsets: SmallVec<[CodeOffset; 16]>,
    fixups: SmallVec<[Fixup; 16]>,
}

impl CodeBuffer {
    /// Create a buffer that can hold up to `capacity` bytes of code.
    pub fn with_capacity(capacity: usize) -> CodeBuffer {
        CodeBuffer {
            data: Vec::with_capacity(capacity),
            capacity,
            label_offsets: SmallVec::new(),
            fixups: SmallVec::new(),
        }
    }

    /// The current emission offset, i.e. the offset the next instruction will
    /// be placed at.
    pub fn cur_offset(&self) -> CodeOffset {
        self.data.len() as CodeOffset
    }

    /// The bytes emitted so far.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Append one instruction word, little-endian.
    pub fn put4(&mut self, value: u32) -> EmitResult<()> {
        if self.data.len() + 4 > self.capacity {
            return Err(EmitError::BufferFull(self.capacity));
        }
        self.data.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Overwrite the instruction word at `offset`, little-endian.
    pub fn patch4(&mut self, offset: CodeOffset, value: u32) {
        let off = offset as usize;
        self.data[off..off + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn get4(&self, offset: CodeOffset) -> u32 {
        let off = offset as usize;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.data[off..off + 4]);
        u32::from_le_bytes(bytes)
    }

    /// Allocate a new, unbound label.
    pub fn new_label(&mut self) -> Label {
        let l = self.label_offsets.len() as u32;
        trace!("new label {}", l);
        self.label_offsets.push(UNKNOWN_LABEL_OFFSET);
        Label(l)
    }

    /// Whether `label` has been bound to an offset yet.
    pub fn is_bound(&self, label: Label) -> bool {
        self.label_offsets[label.0 as usize] != UNKNOWN_LABEL_OFFSET
    }

    /// The offset a label was bound at. `None` while unbound.
    pub fn label_offset(&self, label: Label) -> Option<CodeOffset> {
        match self.label_offsets[label.0 as usize] {
            UNKNOWN_LABEL_OFFSET => None,
            off => Some(off),
        }
    }

    /// Bind a label to the current offset and patch every pending reference
    /// to it, in the order the references were made.
    ///
    /// A label can be bound only once; binding resolves each pending fixup or
    /// fails with the offending distance.
    pub fn bind_label(&mut self, label: Label) -> EmitResult<()> {
        let target = self.cur_offset();
        trace!("bind label {} at offset {}", label.index(), target);
        let slot = &mut self.label_offsets[label.0 as usize];
        if *slot != UNKNOWN_LABEL_OFFSET {
            return Err(EmitError::LabelAlreadyBound(label.0));
        }
        *slot = target;

        // Every fixup for this label is consumed even if one fails to patch:
        // the label is bound now, so leaving the rest queued would make
        // finish() report it as unbound on top of the bind error.
        let mut pending = core::mem::take(&mut self.fixups);
        let mut result = Ok(());
        pending.retain(|fixup| {
            if fixup.label != label {
                return true;
            }
            if result.is_ok() {
                if let Err(e) = self.resolve(fixup.offset, fixup.kind, target) {
                    result = Err(e);
                }
            }
            false
        });
        self.fixups = pending;
        result
    }

    /// Record that the word at `offset` refers to `label` in mode `kind`.
    /// Bound labels are resolved immediately; unbound ones leave a fixup.
    pub(crate) fn use_label_at_offset(
        &mut self,
        offset: CodeOffset,
        label: Label,
        kind: LabelUse,
    ) -> EmitResult<()> {
        match self.label_offsets[label.0 as usize] {
            UNKNOWN_LABEL_OFFSET => {
                self.fixups.push(Fixup {
                    offset,
                    label,
                    kind,
                });
                Ok(())
            }
            target => self.resolve(offset, kind, target),
        }
    }

    fn resolve(&mut self, offset: CodeOffset, kind: LabelUse, target: CodeOffset) -> EmitResult<()> {
        let delta = kind.delta(offset, target);
        trace!(
            "resolve {:?} at {}: target {} delta {}",
            kind,
            offset,
            target,
            delta
        );
        let patched = kind.patch_word(self.get4(offset), delta)?;
        self.patch4(offset, patched);
        Ok(())
    }

    /// Finish emission and take the bytes. Fails if any referenced label was
    /// never bound.
    pub fn finish(self) -> EmitResult<Vec<u8>> {
        if let Some(fixup) = self.fixups.first() {
            return Err(EmitError::UnboundLabel(fixup.label.0));
        }
        Ok(self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_little_endian() {
        let mut buf = CodeBuffer::with_capacity(16);
        buf.put4(0xd503201f).unwrap(); // nop
        assert_eq!(buf.data(), &[0x1f, 0x20, 0x03, 0xd5]);
        assert_eq!(buf.cur_offset(), 4);
    }

    #[test]
    fn capacity_is_a_hard_limit() {
        let mut buf = CodeBuffer::with_capacity(8);
        buf.put4(0).unwrap();
        buf.put4(0).unwrap();
        assert_eq!(buf.put4(0), Err(EmitError::BufferFull(8)));
        // A failed emission writes nothing.
        assert_eq!(buf.cur_offset(), 8);
    }

    #[test]
    fn backward_reference_resolves_immediately() {
        let mut buf = CodeBuffer::with_capacity(64);
        let top = buf.new_label();
        buf.bind_label(top).unwrap();
        buf.put4(0xd503201f).unwrap();
        // b <top>: base word, offset field patched to -4 bytes.
        let off = buf.cur_offset();
        buf.put4(0x14000000).unwrap();
        buf.use_label_at_offset(off, top, LabelUse::Branch26).unwrap();
        assert_eq!(buf.get4(4), 0x17ffffff);
    }

    #[test]
    fn forward_reference_patched_at_bind() {
        let mut buf = CodeBuffer::with_capacity(64);
        let out = buf.new_label();
        let off = buf.cur_offset();
        buf.put4(0x54000000).unwrap(); // b.eq <out>
        buf.use_label_at_offset(off, out, LabelUse::Branch19).unwrap();
        buf.put4(0xd503201f).unwrap();
        buf.put4(0xd503201f).unwrap();
        buf.bind_label(out).unwrap();
        // Distance is +12 bytes = 3 words.
        assert_eq!(buf.get4(0), 0x54000060);
        assert!(buf.finish().is_ok());
    }

    #[test]
    fn multiple_fixups_on_one_label() {
        let mut buf = CodeBuffer::with_capacity(64);
        let out = buf.new_label();
        for _ in 0..3 {
            let off = buf.cur_offset();
            buf.put4(0x14000000).unwrap();
            buf.use_label_at_offset(off, out, LabelUse::Branch26).unwrap();
        }
        buf.bind_label(out).unwrap();
        assert_eq!(buf.get4(0), 0x14000003);
        assert_eq!(buf.get4(4), 0x14000002);
        assert_eq!(buf.get4(8), 0x14000001);
    }

    #[test]
    fn rebinding_is_an_error() {
        let mut buf = CodeBuffer::with_capacity(16);
        let l = buf.new_label();
        buf.bind_label(l).unwrap();
        assert_eq!(buf.bind_label(l), Err(EmitError::LabelAlreadyBound(0)));
    }

    #[test]
    fn unbound_label_fails_finish() {
        let mut buf = CodeBuffer::with_capacity(16);
        let l = buf.new_label();
        let off = buf.cur_offset();
        buf.put4(0x14000000).unwrap();
        buf.use_label_at_offset(off, l, LabelUse::Branch26).unwrap();
        assert_eq!(buf.finish().unwrap_err(), EmitError::UnboundLabel(0));
    }

    #[test]
    fn out_of_range_fixup_is_an_error() {
        let mut buf = CodeBuffer::with_capacity(0x10000);
        let out = buf.new_label();
        let off = buf.cur_offset();
        buf.put4(0x36000000).unwrap(); // tbz: +/- 32KiB only
        buf.use_label_at_offset(off, out, LabelUse::Branch14).unwrap();
        while buf.cur_offset() < 0x9000 {
            buf.put4(0xd503201f).unwrap();
        }
        assert_eq!(
            buf.bind_label(out),
            Err(EmitError::FixupOutOfRange(0x9000))
        );
    }

    #[test]
    fn failed_bind_consumes_the_labels_fixups() {
        let mut buf = CodeBuffer::with_capacity(0x10000);
        let out = buf.new_label();
        let off = buf.cur_offset();
        buf.put4(0x36000000).unwrap(); // tbz: +/- 32KiB only
        buf.use_label_at_offset(off, out, LabelUse::Branch14).unwrap();
        let off = buf.cur_offset();
        buf.put4(0x14000000).unwrap(); // b: would be in range
        buf.use_label_at_offset(off, out, LabelUse::Branch26).unwrap();
        while buf.cur_offset() < 0x9000 {
            buf.put4(0xd503201f).unwrap();
        }
        assert!(buf.bind_label(out).is_err());
        // The label is bound; finish() must not also claim it is unbound.
        assert!(buf.is_bound(out));
        assert!(buf.finish().is_ok());
    }

    #[test]
    fn adr_patches_byte_granular() {
        let mut buf = CodeBuffer::with_capacity(64);
        let l = buf.new_label();
        let off = buf.cur_offset();
        buf.put4(0x10000000).unwrap(); // adr x0, <l>
        buf.use_label_at_offset(off, l, LabelUse::Adr21).unwrap();
        buf.put4(0xd503201f).unwrap();
        buf.bind_label(l).unwrap();
        // +8: immlo = 0, immhi = 2.
        assert_eq!(buf.get4(0), 0x10000040);
    }

    #[test]
    fn adrp_patches_page_granular() {
        let mut buf = CodeBuffer::with_capacity(0x3000);
        let l = buf.new_label();
        let off = buf.cur_offset();
        buf.put4(0x90000000).unwrap(); // adrp x0, <l>
        buf.use_label_at_offset(off, l, LabelUse::Adrp21).unwrap();
        while buf.cur_offset() < 0x2004 {
            buf.put4(0xd503201f).unwrap();
        }
        buf.bind_label(l).unwrap();
        // Target page is two pages up: immlo = 2, immhi = 0.
        assert_eq!(buf.get4(0), 0xd0000000);
    }
}
