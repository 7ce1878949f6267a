//! Lookaround table entries.
//!
//! A `CHECK_LOOKAROUND` instruction names a run of entries in the program's
//! lookaround table. Each entry pins a byte at a fixed offset from the match
//! end and requires it to belong to a reach set.

use std::fmt;
use std::ops::RangeInclusive;

/// Set of byte values (256 bits).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ByteSet([u64; 4]);

impl ByteSet {
    pub const EMPTY: Self = Self([0; 4]);
    pub const ALL: Self = Self([u64::MAX; 4]);

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut set = Self::EMPTY;
        for &b in bytes {
            set.insert(b);
        }
        set
    }

    pub fn from_range(range: RangeInclusive<u8>) -> Self {
        let mut set = Self::EMPTY;
        for b in range {
            set.insert(b);
        }
        set
    }

    #[inline]
    pub fn insert(&mut self, byte: u8) {
        self.0[(byte >> 6) as usize] |= 1u64 << (byte & 63);
    }

    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        self.0[(byte >> 6) as usize] & (1u64 << (byte & 63)) != 0
    }

    pub fn union(self, other: Self) -> Self {
        let mut words = self.0;
        for (w, o) in words.iter_mut().zip(other.0) {
            *w |= o;
        }
        Self(words)
    }

    pub fn negate(self) -> Self {
        Self(self.0.map(|w| !w))
    }

    pub fn len(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0 == [0; 4]
    }

    /// Member bytes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |&b| self.contains(b))
    }

    /// Maximal runs of consecutive member bytes.
    fn ranges(&self) -> Vec<RangeInclusive<u8>> {
        let mut ranges: Vec<RangeInclusive<u8>> = Vec::new();
        for b in self.iter() {
            match ranges.last_mut() {
                Some(last) if *last.end() as u16 + 1 == b as u16 => {
                    *last = *last.start()..=b;
                }
                _ => ranges.push(b..=b),
            }
        }
        ranges
    }
}

fn write_class_byte(f: &mut fmt::Formatter<'_>, b: u8) -> fmt::Result {
    match b {
        b'\\' | b']' | b'[' | b'-' | b'^' => write!(f, "\\{}", b as char),
        0x21..=0x7E => write!(f, "{}", b as char),
        _ => write!(f, "\\x{b:02X}"),
    }
}

/// Character-class notation: `[a-z_]`, `[^\x00]`, `.` for all bytes.
impl fmt::Display for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ALL {
            return f.write_str(".");
        }

        let (set, negated) = if self.len() > 128 {
            (self.negate(), true)
        } else {
            (*self, false)
        };

        f.write_str(if negated { "[^" } else { "[" })?;
        for range in set.ranges() {
            let (lo, hi) = (*range.start(), *range.end());
            write_class_byte(f, lo)?;
            if hi > lo {
                if hi > lo + 1 {
                    f.write_str("-")?;
                }
                write_class_byte(f, hi)?;
            }
        }
        f.write_str("]")
    }
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteSet({self})")
    }
}

/// One lookaround check: the byte at `end + offset` must be in `reach`.
///
/// `end` is the exclusive match end, so offset `-1` is the last byte of the
/// triggering literal and offset `0` is the byte right after it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LookEntry {
    pub offset: i8,
    pub reach: ByteSet,
}

impl LookEntry {
    pub fn new(offset: i8, reach: ByteSet) -> Self {
        Self { offset, reach }
    }
}
