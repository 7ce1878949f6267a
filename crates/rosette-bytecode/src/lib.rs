//! Role-program bytecode for Rosette.
//!
//! This crate contains:
//! - The instruction set and its fixed-layout binary records
//! - The program store (aligned code buffer, lookaround and literal tables)
//! - A label-resolving program builder with construction-time validation
//! - A human-readable disassembler

#![allow(clippy::comparison_chain)]

pub mod bytecode;

// Re-export commonly used items at crate root
pub use bytecode::{
    AlignedCode, AnchoredDelay, BuildError, ByteSet, CheckBounds, CheckLeftfix, CheckLookaround,
    CheckNotHandled, CheckOnlyEod, Colors, INSTR_MIN_ALIGN, Instruction, Label, LineBuilder,
    LiteralId, LookEntry, MQE_END, MQE_START, MQE_TOP, MQE_TOP_FIRST, Opcode, Program,
    ProgramBuilder, ProgramError, ProgramOffset, ProgramParts, QueueIndex, ROSE_BOUND_INF,
    ReportId, ReportOp, SetGroups, SetState, SomAdjust, SomLeftfix, TriggerInfix, TriggerSuffix,
    cols, dump, format_event, format_operands, format_target, width_for_count,
};
