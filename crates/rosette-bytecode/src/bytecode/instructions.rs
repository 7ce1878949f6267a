//! Role-program instruction definitions.
//!
//! Instructions are runtime-friendly structs with `from_bytes`/`write`
//! methods for bytecode serialization. Every record starts with its opcode
//! byte, keeps its operands at fixed little-endian offsets, and is padded
//! with zeroes to a multiple of
//! [`INSTR_MIN_ALIGN`](super::constants::INSTR_MIN_ALIGN) bytes.

use super::ids::{QueueIndex, ReportId};
use super::program::ProgramError;

#[inline]
fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[inline]
fn read_u64_le(bytes: &[u8], offset: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(word)
}

#[inline]
fn write_u32_le(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

#[inline]
fn write_u64_le(bytes: &mut [u8], offset: usize, value: u64) {
    bytes[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

/// Role-program opcodes. The discriminants are part of the binary format.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Opcode {
    AnchoredDelay = 0,
    CheckOnlyEod = 1,
    CheckBounds = 2,
    CheckNotHandled = 3,
    CheckLookaround = 4,
    CheckLeftfix = 5,
    SomAdjust = 6,
    SomLeftfix = 7,
    TriggerInfix = 8,
    TriggerSuffix = 9,
    Report = 10,
    ReportChain = 11,
    ReportEod = 12,
    ReportSomInt = 13,
    ReportSom = 14,
    ReportSomKnown = 15,
    SetState = 16,
    SetGroups = 17,
    End = 18,
}

impl Opcode {
    /// All opcodes in discriminant order.
    pub const ALL: [Opcode; 19] = [
        Self::AnchoredDelay,
        Self::CheckOnlyEod,
        Self::CheckBounds,
        Self::CheckNotHandled,
        Self::CheckLookaround,
        Self::CheckLeftfix,
        Self::SomAdjust,
        Self::SomLeftfix,
        Self::TriggerInfix,
        Self::TriggerSuffix,
        Self::Report,
        Self::ReportChain,
        Self::ReportEod,
        Self::ReportSomInt,
        Self::ReportSom,
        Self::ReportSomKnown,
        Self::SetState,
        Self::SetGroups,
        Self::End,
    ];

    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.get(v as usize).copied()
    }

    /// Record size in bytes, padding included.
    pub fn size(self) -> usize {
        match self {
            Self::AnchoredDelay => 24,
            Self::CheckOnlyEod => 8,
            Self::CheckBounds => 16,
            Self::CheckNotHandled => 16,
            Self::CheckLookaround => 16,
            Self::CheckLeftfix => 24,
            Self::SomAdjust => 8,
            Self::SomLeftfix => 16,
            Self::TriggerInfix => 16,
            Self::TriggerSuffix => 16,
            Self::Report
            | Self::ReportChain
            | Self::ReportEod
            | Self::ReportSomInt
            | Self::ReportSom
            | Self::ReportSomKnown => 8,
            Self::SetState => 8,
            Self::SetGroups => 16,
            Self::End => 8,
        }
    }

    /// Whether this is a check instruction (exactly one `fail_jump` exit).
    pub fn is_check(self) -> bool {
        matches!(
            self,
            Self::CheckOnlyEod
                | Self::CheckBounds
                | Self::CheckNotHandled
                | Self::CheckLookaround
                | Self::CheckLeftfix
        )
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::AnchoredDelay => "ANCHORED_DELAY",
            Self::CheckOnlyEod => "CHECK_ONLY_EOD",
            Self::CheckBounds => "CHECK_BOUNDS",
            Self::CheckNotHandled => "CHECK_NOT_HANDLED",
            Self::CheckLookaround => "CHECK_LOOKAROUND",
            Self::CheckLeftfix => "CHECK_LEFTFIX",
            Self::SomAdjust => "SOM_ADJUST",
            Self::SomLeftfix => "SOM_LEFTFIX",
            Self::TriggerInfix => "TRIGGER_INFIX",
            Self::TriggerSuffix => "TRIGGER_SUFFIX",
            Self::Report => "REPORT",
            Self::ReportChain => "REPORT_CHAIN",
            Self::ReportEod => "REPORT_EOD",
            Self::ReportSomInt => "REPORT_SOM_INT",
            Self::ReportSom => "REPORT_SOM",
            Self::ReportSomKnown => "REPORT_SOM_KNOWN",
            Self::SetState => "SET_STATE",
            Self::SetGroups => "SET_GROUPS",
            Self::End => "END",
        }
    }
}

/// Delay a role until the anchored matcher has been replayed.
///
/// Layout: `depth@1 u8, groups@8 u64, done_jump@16 u32`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AnchoredDelay {
    pub depth: u8,
    pub groups: u64,
    /// Jump forward this many bytes once the delay has been recorded.
    pub done_jump: u32,
}

impl AnchoredDelay {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            depth: bytes[1],
            groups: read_u64_le(bytes, 8),
            done_jump: read_u32_le(bytes, 16),
        }
    }

    pub fn write(&self, bytes: &mut [u8]) {
        bytes[1] = self.depth;
        write_u64_le(bytes, 8, self.groups);
        write_u32_le(bytes, 16, self.done_jump);
    }
}

/// Role matches only at end of data.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CheckOnlyEod {
    pub fail_jump: u32,
}

impl CheckOnlyEod {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            fail_jump: read_u32_le(bytes, 4),
        }
    }

    pub fn write(&self, bytes: &mut [u8]) {
        write_u32_le(bytes, 4, self.fail_jump);
    }
}

/// Bounds on the match end offset, measured from stream offset zero.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CheckBounds {
    pub min_bound: u32,
    /// Upper bound, or [`ROSE_BOUND_INF`](super::ROSE_BOUND_INF).
    pub max_bound: u32,
    pub fail_jump: u32,
}

impl CheckBounds {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            min_bound: read_u32_le(bytes, 4),
            max_bound: read_u32_le(bytes, 8),
            fail_jump: read_u32_le(bytes, 12),
        }
    }

    pub fn write(&self, bytes: &mut [u8]) {
        write_u32_le(bytes, 4, self.min_bound);
        write_u32_le(bytes, 8, self.max_bound);
        write_u32_le(bytes, 12, self.fail_jump);
    }
}

/// Test-and-set of a key in the handled set.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CheckNotHandled {
    pub key: u32,
    /// Taken when the key was already set.
    pub fail_jump: u32,
}

impl CheckNotHandled {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            key: read_u32_le(bytes, 4),
            fail_jump: read_u32_le(bytes, 8),
        }
    }

    pub fn write(&self, bytes: &mut [u8]) {
        write_u32_le(bytes, 4, self.key);
        write_u32_le(bytes, 8, self.fail_jump);
    }
}

/// Run `count` lookaround entries starting at `index`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CheckLookaround {
    pub index: u32,
    pub count: u32,
    pub fail_jump: u32,
}

impl CheckLookaround {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            index: read_u32_le(bytes, 4),
            count: read_u32_le(bytes, 8),
            fail_jump: read_u32_le(bytes, 12),
        }
    }

    pub fn write(&self, bytes: &mut [u8]) {
        write_u32_le(bytes, 4, self.index);
        write_u32_le(bytes, 8, self.count);
        write_u32_le(bytes, 12, self.fail_jump);
    }
}

/// Leftfix on `queue` must be in an accept state for `report`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CheckLeftfix {
    pub queue: QueueIndex,
    pub lag: u32,
    pub report: ReportId,
    pub fail_jump: u32,
}

impl CheckLeftfix {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            queue: QueueIndex(read_u32_le(bytes, 4)),
            lag: read_u32_le(bytes, 8),
            report: ReportId(read_u32_le(bytes, 12)),
            fail_jump: read_u32_le(bytes, 16),
        }
    }

    pub fn write(&self, bytes: &mut [u8]) {
        write_u32_le(bytes, 4, self.queue.0);
        write_u32_le(bytes, 8, self.lag);
        write_u32_le(bytes, 12, self.report.0);
        write_u32_le(bytes, 16, self.fail_jump);
    }
}

/// Set SOM to a fixed distance before the match end.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SomAdjust {
    pub distance: u32,
}

impl SomAdjust {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            distance: read_u32_le(bytes, 4),
        }
    }

    pub fn write(&self, bytes: &mut [u8]) {
        write_u32_le(bytes, 4, self.distance);
    }
}

/// Acquire SOM from the leftfix engine on `queue`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SomLeftfix {
    pub queue: QueueIndex,
    pub lag: u32,
}

impl SomLeftfix {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            queue: QueueIndex(read_u32_le(bytes, 4)),
            lag: read_u32_le(bytes, 8),
        }
    }

    pub fn write(&self, bytes: &mut [u8]) {
        write_u32_le(bytes, 4, self.queue.0);
        write_u32_le(bytes, 8, self.lag);
    }
}

/// Push an event onto an infix queue.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TriggerInfix {
    /// Cancel pending top events before pushing.
    pub cancel: bool,
    pub queue: QueueIndex,
    /// Queue event, one of the `MQE_*` codes.
    pub event: u32,
}

impl TriggerInfix {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            cancel: bytes[1] != 0,
            queue: QueueIndex(read_u32_le(bytes, 4)),
            event: read_u32_le(bytes, 8),
        }
    }

    pub fn write(&self, bytes: &mut [u8]) {
        bytes[1] = u8::from(self.cancel);
        write_u32_le(bytes, 4, self.queue.0);
        write_u32_le(bytes, 8, self.event);
    }
}

/// Push an event onto a suffix queue.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TriggerSuffix {
    pub queue: QueueIndex,
    pub event: u32,
}

impl TriggerSuffix {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            queue: QueueIndex(read_u32_le(bytes, 4)),
            event: read_u32_le(bytes, 8),
        }
    }

    pub fn write(&self, bytes: &mut [u8]) {
        write_u32_le(bytes, 4, self.queue.0);
        write_u32_le(bytes, 8, self.event);
    }
}

/// Operand record shared by the six report instructions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ReportOp {
    pub report: ReportId,
}

impl ReportOp {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            report: ReportId(read_u32_le(bytes, 4)),
        }
    }

    pub fn write(&self, bytes: &mut [u8]) {
        write_u32_le(bytes, 4, self.report.0);
    }
}

/// Switch a role state on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SetState {
    pub depth: u8,
    pub index: u32,
}

impl SetState {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            depth: bytes[1],
            index: read_u32_le(bytes, 4),
        }
    }

    pub fn write(&self, bytes: &mut [u8]) {
        bytes[1] = self.depth;
        write_u32_le(bytes, 4, self.index);
    }
}

/// OR literal group bits into the groups mask.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SetGroups {
    pub groups: u64,
}

impl SetGroups {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            groups: read_u64_le(bytes, 8),
        }
    }

    pub fn write(&self, bytes: &mut [u8]) {
        write_u64_le(bytes, 8, self.groups);
    }
}

/// Decoded role-program instruction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Instruction {
    AnchoredDelay(AnchoredDelay),
    CheckOnlyEod(CheckOnlyEod),
    CheckBounds(CheckBounds),
    CheckNotHandled(CheckNotHandled),
    CheckLookaround(CheckLookaround),
    CheckLeftfix(CheckLeftfix),
    SomAdjust(SomAdjust),
    SomLeftfix(SomLeftfix),
    TriggerInfix(TriggerInfix),
    TriggerSuffix(TriggerSuffix),
    Report(ReportOp),
    ReportChain(ReportOp),
    ReportEod(ReportOp),
    ReportSomInt(ReportOp),
    ReportSom(ReportOp),
    ReportSomKnown(ReportOp),
    SetState(SetState),
    SetGroups(SetGroups),
    End,
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::AnchoredDelay(_) => Opcode::AnchoredDelay,
            Self::CheckOnlyEod(_) => Opcode::CheckOnlyEod,
            Self::CheckBounds(_) => Opcode::CheckBounds,
            Self::CheckNotHandled(_) => Opcode::CheckNotHandled,
            Self::CheckLookaround(_) => Opcode::CheckLookaround,
            Self::CheckLeftfix(_) => Opcode::CheckLeftfix,
            Self::SomAdjust(_) => Opcode::SomAdjust,
            Self::SomLeftfix(_) => Opcode::SomLeftfix,
            Self::TriggerInfix(_) => Opcode::TriggerInfix,
            Self::TriggerSuffix(_) => Opcode::TriggerSuffix,
            Self::Report(_) => Opcode::Report,
            Self::ReportChain(_) => Opcode::ReportChain,
            Self::ReportEod(_) => Opcode::ReportEod,
            Self::ReportSomInt(_) => Opcode::ReportSomInt,
            Self::ReportSom(_) => Opcode::ReportSom,
            Self::ReportSomKnown(_) => Opcode::ReportSomKnown,
            Self::SetState(_) => Opcode::SetState,
            Self::SetGroups(_) => Opcode::SetGroups,
            Self::End => Opcode::End,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.opcode().size()
    }

    /// The forward jump carried by this instruction, if any.
    ///
    /// Check instructions carry their `fail_jump`; `ANCHORED_DELAY` carries
    /// its `done_jump`.
    pub fn jump(&self) -> Option<u32> {
        match self {
            Self::AnchoredDelay(i) => Some(i.done_jump),
            Self::CheckOnlyEod(i) => Some(i.fail_jump),
            Self::CheckBounds(i) => Some(i.fail_jump),
            Self::CheckNotHandled(i) => Some(i.fail_jump),
            Self::CheckLookaround(i) => Some(i.fail_jump),
            Self::CheckLeftfix(i) => Some(i.fail_jump),
            _ => None,
        }
    }

    /// Replace the jump delta. Instructions without a jump are returned as-is.
    pub fn with_jump(mut self, delta: u32) -> Self {
        match &mut self {
            Self::AnchoredDelay(i) => i.done_jump = delta,
            Self::CheckOnlyEod(i) => i.fail_jump = delta,
            Self::CheckBounds(i) => i.fail_jump = delta,
            Self::CheckNotHandled(i) => i.fail_jump = delta,
            Self::CheckLookaround(i) => i.fail_jump = delta,
            Self::CheckLeftfix(i) => i.fail_jump = delta,
            _ => {}
        }
        self
    }

    /// Decode an instruction from bytecode bytes.
    ///
    /// The slice must start at a record produced by [`write_to`](Self::write_to)
    /// and hold at least the full record. Programs are validated on
    /// construction, so the interpreter never sees anything else.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let Some(opcode) = Opcode::from_u8(bytes[0]) else {
            panic!("invalid opcode: {}", bytes[0]);
        };
        debug_assert!(
            bytes.len() >= opcode.size(),
            "{} truncated: expected {} bytes, got {}",
            opcode.mnemonic(),
            opcode.size(),
            bytes.len()
        );

        match opcode {
            Opcode::AnchoredDelay => Self::AnchoredDelay(AnchoredDelay::from_bytes(bytes)),
            Opcode::CheckOnlyEod => Self::CheckOnlyEod(CheckOnlyEod::from_bytes(bytes)),
            Opcode::CheckBounds => Self::CheckBounds(CheckBounds::from_bytes(bytes)),
            Opcode::CheckNotHandled => Self::CheckNotHandled(CheckNotHandled::from_bytes(bytes)),
            Opcode::CheckLookaround => Self::CheckLookaround(CheckLookaround::from_bytes(bytes)),
            Opcode::CheckLeftfix => Self::CheckLeftfix(CheckLeftfix::from_bytes(bytes)),
            Opcode::SomAdjust => Self::SomAdjust(SomAdjust::from_bytes(bytes)),
            Opcode::SomLeftfix => Self::SomLeftfix(SomLeftfix::from_bytes(bytes)),
            Opcode::TriggerInfix => Self::TriggerInfix(TriggerInfix::from_bytes(bytes)),
            Opcode::TriggerSuffix => Self::TriggerSuffix(TriggerSuffix::from_bytes(bytes)),
            Opcode::Report => Self::Report(ReportOp::from_bytes(bytes)),
            Opcode::ReportChain => Self::ReportChain(ReportOp::from_bytes(bytes)),
            Opcode::ReportEod => Self::ReportEod(ReportOp::from_bytes(bytes)),
            Opcode::ReportSomInt => Self::ReportSomInt(ReportOp::from_bytes(bytes)),
            Opcode::ReportSom => Self::ReportSom(ReportOp::from_bytes(bytes)),
            Opcode::ReportSomKnown => Self::ReportSomKnown(ReportOp::from_bytes(bytes)),
            Opcode::SetState => Self::SetState(SetState::from_bytes(bytes)),
            Opcode::SetGroups => Self::SetGroups(SetGroups::from_bytes(bytes)),
            Opcode::End => Self::End,
        }
    }

    /// Checked decode of the record starting at `offset` in `code`.
    pub fn decode(code: &[u8], offset: usize) -> Result<Self, ProgramError> {
        let Some(&byte) = code.get(offset) else {
            return Err(ProgramError::Truncated {
                offset,
                needed: 1,
                available: 0,
            });
        };
        let opcode = Opcode::from_u8(byte).ok_or(ProgramError::UnknownOpcode { offset, byte })?;
        let available = code.len() - offset;
        if available < opcode.size() {
            return Err(ProgramError::Truncated {
                offset,
                needed: opcode.size(),
                available,
            });
        }
        Ok(Self::from_bytes(&code[offset..]))
    }

    /// Append the padded record to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        let start = out.len();
        let opcode = self.opcode();
        out.resize(start + opcode.size(), 0);
        let bytes = &mut out[start..];
        bytes[0] = opcode as u8;

        match self {
            Self::AnchoredDelay(i) => i.write(bytes),
            Self::CheckOnlyEod(i) => i.write(bytes),
            Self::CheckBounds(i) => i.write(bytes),
            Self::CheckNotHandled(i) => i.write(bytes),
            Self::CheckLookaround(i) => i.write(bytes),
            Self::CheckLeftfix(i) => i.write(bytes),
            Self::SomAdjust(i) => i.write(bytes),
            Self::SomLeftfix(i) => i.write(bytes),
            Self::TriggerInfix(i) => i.write(bytes),
            Self::TriggerSuffix(i) => i.write(bytes),
            Self::Report(i)
            | Self::ReportChain(i)
            | Self::ReportEod(i)
            | Self::ReportSomInt(i)
            | Self::ReportSom(i)
            | Self::ReportSomKnown(i) => i.write(bytes),
            Self::SetState(i) => i.write(bytes),
            Self::SetGroups(i) => i.write(bytes),
            Self::End => {}
        }
    }

    /// Encode to a standalone padded record.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size());
        self.write_to(&mut out);
        out
    }
}
