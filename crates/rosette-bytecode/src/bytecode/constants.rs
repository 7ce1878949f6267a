//! Bytecode format constants.

/// Minimum alignment (and size granularity) of every instruction record.
pub const INSTR_MIN_ALIGN: usize = 8;

/// Sentinel for `CHECK_BOUNDS.max_bound` meaning "no upper bound".
pub const ROSE_BOUND_INF: u32 = u32::MAX;

/// Queue event: engine start marker.
pub const MQE_START: u32 = 0;

/// Queue event: engine end marker.
pub const MQE_END: u32 = 1;

/// Queue event: generic top (activation).
pub const MQE_TOP: u32 = 2;

/// First of the numbered tops (`MQE_TOP_FIRST + n` is top `n`).
pub const MQE_TOP_FIRST: u32 = 4;
