//! Bytecode index newtypes.

use serde::Serialize;

use super::constants::INSTR_MIN_ALIGN;

/// Byte offset of an instruction record within the program code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(transparent)]
pub struct ProgramOffset(pub u32);

impl ProgramOffset {
    #[inline]
    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// Offset reached by jumping `delta` bytes forward from this one.
    #[inline]
    pub fn jump(self, delta: u32) -> Self {
        Self(self.0 + delta)
    }

    #[inline]
    pub fn is_aligned(self) -> bool {
        (self.0 as usize).is_multiple_of(INSTR_MIN_ALIGN)
    }
}

/// Opaque report identifier, resolved by the report sink.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct ReportId(pub u32);

/// Index of a sub-engine queue (leftfix, infix or suffix).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(transparent)]
pub struct QueueIndex(pub u32);

impl QueueIndex {
    #[inline]
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

/// Identifier reported by the literal pre-filter.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(transparent)]
pub struct LiteralId(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_offset_jump() {
        assert_eq!(ProgramOffset(16).jump(24), ProgramOffset(40));
        assert_eq!(ProgramOffset(0).jump(8).get(), 8);
    }

    #[test]
    fn program_offset_alignment() {
        assert!(ProgramOffset(0).is_aligned());
        assert!(ProgramOffset(48).is_aligned());
        assert!(!ProgramOffset(12).is_aligned());
    }
}
