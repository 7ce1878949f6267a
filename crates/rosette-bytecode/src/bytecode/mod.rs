//! Role-program bytecode format.
//!
//! Programs are flat, forward-only sequences of fixed-layout records.
//! See [`Opcode`] for the instruction set and [`Program`] for the store.

mod aligned_code;
mod builder;
mod constants;
mod dump;
mod format;
mod ids;
mod instructions;
mod lookaround;
mod program;

pub use aligned_code::AlignedCode;
pub use builder::{BuildError, Label, ProgramBuilder};
pub use constants::{INSTR_MIN_ALIGN, MQE_END, MQE_START, MQE_TOP, MQE_TOP_FIRST, ROSE_BOUND_INF};
pub use dump::dump;
pub use format::{
    Colors, LineBuilder, cols, format_event, format_operands, format_target, width_for_count,
};
pub use ids::{LiteralId, ProgramOffset, QueueIndex, ReportId};
pub use instructions::{
    AnchoredDelay, CheckBounds, CheckLeftfix, CheckLookaround, CheckNotHandled, CheckOnlyEod,
    Instruction, Opcode, ReportOp, SetGroups, SetState, SomAdjust, SomLeftfix, TriggerInfix,
    TriggerSuffix,
};
pub use lookaround::{ByteSet, LookEntry};
pub use program::{Program, ProgramError, ProgramParts};

#[cfg(test)]
mod aligned_code_tests;
#[cfg(test)]
mod builder_tests;
#[cfg(test)]
mod dump_tests;
#[cfg(test)]
mod instructions_tests;
