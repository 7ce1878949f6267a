//! Validated role-program store.
//!
//! A [`Program`] holds the instruction code in aligned storage together with
//! the tables and sizing the interpreter needs. Construction validates the
//! whole program once; afterwards the interpreter decodes records without
//! bounds or opcode checks.

use super::aligned_code::AlignedCode;
use super::constants::INSTR_MIN_ALIGN;
use super::ids::{LiteralId, ProgramOffset};
use super::instructions::Instruction;
use super::lookaround::LookEntry;

/// Program validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("program has no code")]
    EmptyProgram,
    #[error("code length {len} is not a multiple of {INSTR_MIN_ALIGN}")]
    Misaligned { len: usize },
    #[error("unknown opcode {byte:#04x} at offset {offset}")]
    UnknownOpcode { offset: usize, byte: u8 },
    #[error("record at offset {offset} needs {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("zero jump at offset {offset}")]
    ZeroJump { offset: usize },
    #[error("jump at offset {offset} targets {target}, past the end of the code")]
    JumpOutOfRange { offset: usize, target: usize },
    #[error("jump at offset {offset} targets {target}, inside an instruction")]
    JumpIntoInstruction { offset: usize, target: usize },
    #[error("last instruction is not END")]
    MissingEnd,
    #[error("bounds at offset {offset} are inverted: {min} > {max}")]
    BoundsInverted { offset: usize, min: u32, max: u32 },
    #[error("lookaround at offset {offset} reads entries {index}..{index}+{count}, table has {len}")]
    LookaroundOutOfRange {
        offset: usize,
        index: u32,
        count: u32,
        len: usize,
    },
    #[error("lookaround at offset {offset} has entries out of offset order from {index}")]
    LookaroundUnsorted { offset: usize, index: u32 },
    #[error("handled key {key} at offset {offset} exceeds capacity {count}")]
    KeyOutOfRange { offset: usize, key: u32, count: u32 },
    #[error("role state {index} at offset {offset} exceeds capacity {count}")]
    StateOutOfRange { offset: usize, index: u32, count: u32 },
    #[error("queue {queue} at offset {offset} exceeds queue count {count}")]
    QueueOutOfRange { offset: usize, queue: u32, count: u32 },
    #[error("SOM slot {slot} at offset {offset} exceeds slot count {count}")]
    SomSlotOutOfRange { offset: usize, slot: u32, count: u32 },
    #[error("literal {literal} enters at {offset}, which is not an instruction start")]
    BadEntry { literal: u32, offset: usize },
}

/// Raw material for a [`Program`].
///
/// `literals[id]` lists the entry offsets run, in order, when the pre-filter
/// reports literal `id`.
#[derive(Clone, Debug, Default)]
pub struct ProgramParts {
    pub code: Vec<u8>,
    pub literals: Vec<Vec<ProgramOffset>>,
    pub lookaround: Vec<LookEntry>,
    pub handled_key_count: u32,
    pub role_state_count: u32,
    pub queue_count: u32,
    pub som_slot_count: u32,
    pub initial_groups: u64,
    /// Minimum end offset of a match found by the floating matcher.
    pub floating_min_offset: u64,
}

/// A validated, immutable role program.
#[derive(Clone, Debug)]
pub struct Program {
    code: AlignedCode,
    literals: Vec<Vec<ProgramOffset>>,
    lookaround: Vec<LookEntry>,
    handled_key_count: u32,
    role_state_count: u32,
    queue_count: u32,
    som_slot_count: u32,
    initial_groups: u64,
    floating_min_offset: u64,
    instruction_count: usize,
}

impl Program {
    /// Copy `parts` into aligned storage and validate it.
    pub fn new(parts: ProgramParts) -> Result<Self, ProgramError> {
        let code = AlignedCode::copy_from_slice(&parts.code);
        if parts.code.is_empty() {
            return Err(ProgramError::EmptyProgram);
        }
        if !parts.code.len().is_multiple_of(INSTR_MIN_ALIGN) {
            return Err(ProgramError::Misaligned {
                len: parts.code.len(),
            });
        }

        let mut program = Self {
            code,
            literals: parts.literals,
            lookaround: parts.lookaround,
            handled_key_count: parts.handled_key_count,
            role_state_count: parts.role_state_count,
            queue_count: parts.queue_count,
            som_slot_count: parts.som_slot_count,
            initial_groups: parts.initial_groups,
            floating_min_offset: parts.floating_min_offset,
            instruction_count: 0,
        };
        program.instruction_count = program.validate()?;
        Ok(program)
    }

    /// Walk the code once, checking every record, and return the record count.
    fn validate(&self) -> Result<usize, ProgramError> {
        let code = self.code.as_slice();
        let mut starts = vec![false; code.len() / INSTR_MIN_ALIGN];
        let mut jumps = Vec::new();
        let mut last = None;

        let mut offset = 0;
        while offset < code.len() {
            let instr = Instruction::decode(code, offset)?;
            starts[offset / INSTR_MIN_ALIGN] = true;
            self.check_operands(offset, &instr)?;
            if let Some(delta) = instr.jump() {
                if delta == 0 {
                    return Err(ProgramError::ZeroJump { offset });
                }
                jumps.push((offset, offset + delta as usize));
            }
            last = Some(instr);
            offset += instr.size();
        }

        if last != Some(Instruction::End) {
            return Err(ProgramError::MissingEnd);
        }

        for (offset, target) in jumps {
            if target >= code.len() {
                return Err(ProgramError::JumpOutOfRange { offset, target });
            }
            if !target.is_multiple_of(INSTR_MIN_ALIGN) || !starts[target / INSTR_MIN_ALIGN] {
                return Err(ProgramError::JumpIntoInstruction { offset, target });
            }
        }

        for (literal, entries) in self.literals.iter().enumerate() {
            for entry in entries {
                let at = entry.get();
                if at >= code.len() || !entry.is_aligned() || !starts[at / INSTR_MIN_ALIGN] {
                    return Err(ProgramError::BadEntry {
                        literal: literal as u32,
                        offset: at,
                    });
                }
            }
        }

        Ok(starts.iter().filter(|s| **s).count())
    }

    fn check_operands(&self, offset: usize, instr: &Instruction) -> Result<(), ProgramError> {
        let queue_check = |queue: u32| {
            if queue >= self.queue_count {
                return Err(ProgramError::QueueOutOfRange {
                    offset,
                    queue,
                    count: self.queue_count,
                });
            }
            Ok(())
        };

        match instr {
            Instruction::CheckBounds(i) if i.min_bound > i.max_bound => {
                Err(ProgramError::BoundsInverted {
                    offset,
                    min: i.min_bound,
                    max: i.max_bound,
                })
            }
            Instruction::CheckNotHandled(i) if i.key >= self.handled_key_count => {
                Err(ProgramError::KeyOutOfRange {
                    offset,
                    key: i.key,
                    count: self.handled_key_count,
                })
            }
            Instruction::CheckLookaround(i)
                if i.index as usize + i.count as usize > self.lookaround.len() =>
            {
                Err(ProgramError::LookaroundOutOfRange {
                    offset,
                    index: i.index,
                    count: i.count,
                    len: self.lookaround.len(),
                })
            }
            Instruction::CheckLookaround(i)
                if !self.lookaround[i.index as usize..][..i.count as usize]
                    .is_sorted_by_key(|e| e.offset) =>
            {
                Err(ProgramError::LookaroundUnsorted {
                    offset,
                    index: i.index,
                })
            }
            Instruction::CheckLeftfix(i) => queue_check(i.queue.0),
            Instruction::SomLeftfix(i) => queue_check(i.queue.0),
            Instruction::TriggerInfix(i) => queue_check(i.queue.0),
            Instruction::TriggerSuffix(i) => queue_check(i.queue.0),
            Instruction::ReportSomInt(i) if i.report.0 >= self.som_slot_count => {
                Err(ProgramError::SomSlotOutOfRange {
                    offset,
                    slot: i.report.0,
                    count: self.som_slot_count,
                })
            }
            Instruction::SetState(i) if i.index >= self.role_state_count => {
                Err(ProgramError::StateOutOfRange {
                    offset,
                    index: i.index,
                    count: self.role_state_count,
                })
            }
            _ => Ok(()),
        }
    }

    /// Decode the record at `offset`.
    ///
    /// Offsets come from the literal table or from validated jumps, so the
    /// record is known to be well formed.
    #[inline]
    pub fn decode_at(&self, offset: ProgramOffset) -> Instruction {
        debug_assert!(offset.is_aligned(), "unaligned offset {}", offset.0);
        debug_assert!(offset.get() < self.code.len(), "offset {} past code", offset.0);
        Instruction::from_bytes(&self.code[offset.get()..])
    }

    /// Entry offsets for a literal, or `None` for an id the table does not know.
    pub fn entries(&self, literal: LiteralId) -> Option<&[ProgramOffset]> {
        self.literals.get(literal.0 as usize).map(Vec::as_slice)
    }

    /// All records in code order.
    pub fn instructions(&self) -> impl Iterator<Item = (ProgramOffset, Instruction)> + '_ {
        let mut offset = 0usize;
        std::iter::from_fn(move || {
            if offset >= self.code.len() {
                return None;
            }
            let at = ProgramOffset(offset as u32);
            let instr = self.decode_at(at);
            offset += instr.size();
            Some((at, instr))
        })
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn literals(&self) -> &[Vec<ProgramOffset>] {
        &self.literals
    }

    pub fn lookaround(&self) -> &[LookEntry] {
        &self.lookaround
    }

    pub fn handled_key_count(&self) -> u32 {
        self.handled_key_count
    }

    pub fn role_state_count(&self) -> u32 {
        self.role_state_count
    }

    pub fn queue_count(&self) -> u32 {
        self.queue_count
    }

    pub fn som_slot_count(&self) -> u32 {
        self.som_slot_count
    }

    pub fn initial_groups(&self) -> u64 {
        self.initial_groups
    }

    pub fn floating_min_offset(&self) -> u64 {
        self.floating_min_offset
    }

    /// Number of instruction records in the code.
    pub fn instruction_count(&self) -> usize {
        self.instruction_count
    }
}
