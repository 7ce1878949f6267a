//! Instruction-aligned storage for program code.
//!
//! Every record in a role program starts on an [`INSTR_MIN_ALIGN`] boundary
//! relative to the start of the code. For record fields to be validly
//! aligned in memory as well, the buffer itself must start on that boundary.
//! Standard `Vec<u8>` provides no alignment guarantees for `u8`.

use std::ops::Deref;

use super::constants::INSTR_MIN_ALIGN;

/// One instruction granule.
#[repr(C, align(8))]
#[derive(Clone, Copy)]
struct Granule([u8; INSTR_MIN_ALIGN]);

/// Immutable code buffer whose first byte sits on an 8-byte boundary.
///
/// Uses `Vec<Granule>` internally; Vec guarantees element alignment, so no
/// custom allocator is needed. The length is always a whole number of
/// granules because every record size is.
pub struct AlignedCode {
    granules: Vec<Granule>,
}

impl AlignedCode {
    /// Copy bytes into aligned storage, zero-padding the final granule.
    pub fn copy_from_slice(bytes: &[u8]) -> Self {
        let count = bytes.len().div_ceil(INSTR_MIN_ALIGN);
        let mut granules = vec![Granule([0; INSTR_MIN_ALIGN]); count];

        for (granule, chunk) in granules.iter_mut().zip(bytes.chunks(INSTR_MIN_ALIGN)) {
            granule.0[..chunk.len()].copy_from_slice(chunk);
        }

        Self { granules }
    }

    /// Number of bytes stored.
    pub fn len(&self) -> usize {
        self.granules.len() * INSTR_MIN_ALIGN
    }

    pub fn is_empty(&self) -> bool {
        self.granules.is_empty()
    }

    /// View as byte slice.
    pub fn as_slice(&self) -> &[u8] {
        if self.granules.is_empty() {
            return &[];
        }
        // SAFETY: Granule is repr(C) over a plain byte array, so the granule
        // vector is one contiguous, fully initialized run of `len()` bytes.
        unsafe { std::slice::from_raw_parts(self.granules.as_ptr() as *const u8, self.len()) }
    }
}

impl Deref for AlignedCode {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl Clone for AlignedCode {
    fn clone(&self) -> Self {
        Self {
            granules: self.granules.clone(),
        }
    }
}

impl std::fmt::Debug for AlignedCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedCode")
            .field("len", &self.len())
            .field(
                "aligned",
                &(self.granules.as_ptr() as usize).is_multiple_of(INSTR_MIN_ALIGN),
            )
            .finish()
    }
}
