//! Tracing infrastructure for debugging program execution.
//!
//! The tracer is a zero-cost abstraction: with [`NoopTracer`] every hook is
//! an `#[inline(always)]` empty function and the calls compile away. Tracing
//! state lives in the tracer, never in [`ScanState`](super::ScanState).

use rosette_bytecode::{
    Colors, Instruction, LineBuilder, Program, ProgramOffset, QueueIndex, format_event,
    format_operands, format_target, width_for_count,
};

use super::queue::QueueEvent;
use super::sink::{Match, MatchPath};

/// Verbosity level for trace output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Entries, instructions and emitted reports.
    #[default]
    Default,
    /// Also check outcomes, SOM updates, triggers and deferred reports.
    Verbose,
}

/// Hooks called by the interpreter.
///
/// - `trace_enter` - when a program run starts at an entry offset
/// - `trace_instruction` - before executing an instruction
/// - `trace_check` - after a check instruction decides
/// - `trace_som` / `trace_som_slot` - after SOM bookkeeping
/// - `trace_trigger` - after an event is queued for a sub-engine
/// - `trace_report` - after a match is handed to the sink
/// - `trace_defer_eod` - when a match is queued for end of data
/// - `trace_halt` - when the sink stops the scan
pub trait Tracer {
    fn trace_enter(&mut self, entry: ProgramOffset, end: u64);

    fn trace_instruction(&mut self, offset: ProgramOffset, instr: &Instruction);

    fn trace_check(&mut self, passed: bool);

    fn trace_som(&mut self, som: u64);

    fn trace_som_slot(&mut self, slot: u32, som: u64);

    fn trace_trigger(&mut self, queue: QueueIndex, event: &QueueEvent);

    fn trace_report(&mut self, path: MatchPath, m: &Match);

    fn trace_defer_eod(&mut self, m: &Match);

    fn trace_delay(&mut self, end: u64);

    fn trace_halt(&mut self);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_enter(&mut self, _entry: ProgramOffset, _end: u64) {}

    #[inline(always)]
    fn trace_instruction(&mut self, _offset: ProgramOffset, _instr: &Instruction) {}

    #[inline(always)]
    fn trace_check(&mut self, _passed: bool) {}

    #[inline(always)]
    fn trace_som(&mut self, _som: u64) {}

    #[inline(always)]
    fn trace_som_slot(&mut self, _slot: u32, _som: u64) {}

    #[inline(always)]
    fn trace_trigger(&mut self, _queue: QueueIndex, _event: &QueueEvent) {}

    #[inline(always)]
    fn trace_report(&mut self, _path: MatchPath, _m: &Match) {}

    #[inline(always)]
    fn trace_defer_eod(&mut self, _m: &Match) {}

    #[inline(always)]
    fn trace_delay(&mut self, _end: u64) {}

    #[inline(always)]
    fn trace_halt(&mut self) {}
}

/// Tracer that collects a formatted execution trace.
pub struct PrintTracer {
    verbosity: Verbosity,
    lines: Vec<String>,
    builder: LineBuilder,
    offset_width: usize,
    colors: Colors,
}

impl PrintTracer {
    pub fn new(program: &Program, verbosity: Verbosity, colors: Colors) -> Self {
        let offset_width = width_for_count(program.code().len());
        Self {
            verbosity,
            lines: Vec::new(),
            builder: LineBuilder::new(offset_width),
            offset_width,
            colors,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All lines joined, each terminated by a newline.
    pub fn output(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    pub fn print(&self) {
        for line in &self.lines {
            println!("{}", line);
        }
    }

    fn verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    fn add_subline(&mut self, content: &str) {
        let prefix = self.builder.subline_prefix();
        self.lines.push(format!("{prefix}{content}"));
    }

    fn format_match(&self, m: &Match) -> String {
        let c = &self.colors;
        let head = format!("{}report {}{} @{}", c.green, m.report.0, c.reset, m.end);
        match m.som {
            Some(som) => format!("{head} som={som}"),
            None => head,
        }
    }
}

impl Tracer for PrintTracer {
    fn trace_enter(&mut self, entry: ProgramOffset, end: u64) {
        let c = self.colors;
        if !self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.lines.push(format!(
            "{}entry {:0w$}{} end={end}",
            c.blue,
            entry.0,
            c.reset,
            w = self.offset_width
        ));
    }

    fn trace_instruction(&mut self, offset: ProgramOffset, instr: &Instruction) {
        let c = self.colors;
        let prefix = self
            .builder
            .instruction_prefix(offset.0, instr.opcode().mnemonic());
        let base = format!("{prefix}{}", format_operands(instr));
        let target = format_target(offset.0, instr, self.offset_width);
        let target = if target.is_empty() {
            target
        } else {
            format!("{}{target}{}", c.dim, c.reset)
        };
        let line = self.builder.pad_target(base, &target);
        self.lines.push(line);
    }

    fn trace_check(&mut self, passed: bool) {
        if self.verbose() {
            self.add_subline(if passed { "pass" } else { "fail" });
        }
    }

    fn trace_som(&mut self, som: u64) {
        if self.verbose() {
            self.add_subline(&format!("som = {som}"));
        }
    }

    fn trace_som_slot(&mut self, slot: u32, som: u64) {
        if self.verbose() {
            self.add_subline(&format!("slot {slot} = {som}"));
        }
    }

    fn trace_trigger(&mut self, queue: QueueIndex, event: &QueueEvent) {
        if self.verbose() {
            let line = format!(
                "q{} <- {} @{}",
                queue.0,
                format_event(event.event),
                event.location
            );
            self.add_subline(&line);
        }
    }

    fn trace_report(&mut self, path: MatchPath, m: &Match) {
        let body = self.format_match(m);
        let line = match path {
            MatchPath::Direct => body,
            MatchPath::Chain => format!("chain {body}"),
            MatchPath::Eod => format!("eod {body}"),
        };
        self.add_subline(&line);
    }

    fn trace_defer_eod(&mut self, m: &Match) {
        if self.verbose() {
            let line = format!("defer {}", self.format_match(m));
            self.add_subline(&line);
        }
    }

    fn trace_delay(&mut self, end: u64) {
        if self.verbose() {
            self.add_subline(&format!("delay @{end}"));
        }
    }

    fn trace_halt(&mut self) {
        self.add_subline("halt");
    }
}
