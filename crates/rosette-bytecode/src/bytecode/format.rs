//! Shared formatting utilities for the program dump and execution trace.
//!
//! Both use the same column layout:
//! ```text
//! | 2 | offset | 1 | mnemonic (18) | 1 | operands          | 2+ | target |
//! ```

use super::constants::{MQE_END, MQE_START, MQE_TOP, MQE_TOP_FIRST, ROSE_BOUND_INF};
use super::instructions::Instruction;

/// Column widths for instruction line formatting.
pub mod cols {
    /// Leading indentation (2 spaces).
    pub const INDENT: usize = 2;
    /// Gap between columns (1 space).
    pub const GAP: usize = 1;
    /// Mnemonic column width (longest mnemonic is `CHECK_NOT_HANDLED`).
    pub const MNEMONIC: usize = 18;
    /// Total width before jump targets are right-aligned.
    pub const TOTAL_WIDTH: usize = 52;
}

/// ANSI color palette for dump and trace output.
///
/// Uses only standard 16-color ANSI codes so output reads the same on light
/// and dark terminals.
#[derive(Clone, Copy, Debug)]
pub struct Colors {
    pub blue: &'static str,
    pub green: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
}

impl Default for Colors {
    fn default() -> Self {
        Self::OFF
    }
}

impl Colors {
    pub const ON: Self = Self {
        blue: "\x1b[34m",
        green: "\x1b[32m",
        dim: "\x1b[2m",
        reset: "\x1b[0m",
    };

    pub const OFF: Self = Self {
        blue: "",
        green: "",
        dim: "",
        reset: "",
    };

    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }

    pub fn is_enabled(&self) -> bool {
        !self.blue.is_empty()
    }
}

/// Minimum width needed to display numbers up to `count - 1`.
pub fn width_for_count(count: usize) -> usize {
    if count <= 1 {
        1
    } else {
        ((count - 1) as f64).log10().floor() as usize + 1
    }
}

/// Builder for formatted instruction lines.
///
/// Lines follow `<indent><offset><gap><mnemonic><gap><operands>...<target>`.
pub struct LineBuilder {
    offset_width: usize,
}

impl LineBuilder {
    pub fn new(offset_width: usize) -> Self {
        Self { offset_width }
    }

    /// Instruction line prefix: `  <offset> <MNEMONIC padded> `.
    pub fn instruction_prefix(&self, offset: u32, mnemonic: &str) -> String {
        format!(
            "{:indent$}{:0ow$} {:mw$} ",
            "",
            offset,
            mnemonic,
            indent = cols::INDENT,
            ow = self.offset_width,
            mw = cols::MNEMONIC,
        )
    }

    /// Sub-line prefix with a blank offset area.
    pub fn subline_prefix(&self) -> String {
        let offset_area = cols::INDENT + self.offset_width + cols::GAP;
        format!("{:offset_area$}", "")
    }

    /// Pad content to the total width and append the jump target.
    ///
    /// Keeps at least 2 spaces between content and target.
    pub fn pad_target(&self, base: String, target: &str) -> String {
        if target.is_empty() {
            return base.trim_end().to_string();
        }
        let padding = cols::TOTAL_WIDTH
            .saturating_sub(display_width(&base))
            .max(2);
        format!("{base}{:padding$}{target}", "")
    }
}

/// Display width of a string, ignoring ANSI escape sequences.
fn display_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;

    for c in s.chars() {
        if in_escape {
            if c == 'm' {
                in_escape = false;
            }
        } else if c == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Symbolic name of a queue event code.
pub fn format_event(event: u32) -> String {
    match event {
        MQE_START => "START".to_string(),
        MQE_END => "END".to_string(),
        MQE_TOP => "TOP".to_string(),
        e if e >= MQE_TOP_FIRST => format!("TOP{}", e - MQE_TOP_FIRST),
        e => format!("#{e}"),
    }
}

/// Operand column for an instruction line (jump targets excluded).
pub fn format_operands(instr: &Instruction) -> String {
    match instr {
        Instruction::AnchoredDelay(i) => format!("depth={} groups={:#x}", i.depth, i.groups),
        Instruction::CheckOnlyEod(_) | Instruction::End => String::new(),
        Instruction::CheckBounds(i) if i.max_bound == ROSE_BOUND_INF => {
            format!("[{}, inf]", i.min_bound)
        }
        Instruction::CheckBounds(i) => format!("[{}, {}]", i.min_bound, i.max_bound),
        Instruction::CheckNotHandled(i) => format!("key={}", i.key),
        Instruction::CheckLookaround(i) => format!("look[{}..{}]", i.index, i.index + i.count),
        Instruction::CheckLeftfix(i) => {
            format!("q{} lag={} report={}", i.queue.0, i.lag, i.report.0)
        }
        Instruction::SomAdjust(i) => format!("distance={}", i.distance),
        Instruction::SomLeftfix(i) => format!("q{} lag={}", i.queue.0, i.lag),
        Instruction::TriggerInfix(i) => {
            let cancel = if i.cancel { " cancel" } else { "" };
            format!("q{} {}{cancel}", i.queue.0, format_event(i.event))
        }
        Instruction::TriggerSuffix(i) => format!("q{} {}", i.queue.0, format_event(i.event)),
        Instruction::ReportSomInt(i) => format!("slot={}", i.report.0),
        Instruction::Report(i)
        | Instruction::ReportChain(i)
        | Instruction::ReportEod(i)
        | Instruction::ReportSom(i)
        | Instruction::ReportSomKnown(i) => format!("report={}", i.report.0),
        Instruction::SetState(i) => format!("state={} depth={}", i.index, i.depth),
        Instruction::SetGroups(i) => format!("groups={:#x}", i.groups),
    }
}

/// Jump column: `fail -> 0040` for checks, `done -> 0040` for delays.
pub fn format_target(offset: u32, instr: &Instruction, offset_width: usize) -> String {
    let Some(delta) = instr.jump() else {
        return String::new();
    };
    let kind = if instr.opcode().is_check() { "fail" } else { "done" };
    format!("{kind} -> {:0w$}", offset + delta, w = offset_width)
}
