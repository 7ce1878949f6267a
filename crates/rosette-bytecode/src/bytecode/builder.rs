//! Program assembly with symbolic jump targets.
//!
//! The builder appends instruction records in program order. Jumps name a
//! [`Label`] instead of a byte delta; labels are bound to whatever record is
//! emitted next and resolved to forward deltas in [`ProgramBuilder::build`].

use super::constants::ROSE_BOUND_INF;
use super::ids::{LiteralId, ProgramOffset, QueueIndex, ReportId};
use super::instructions::{
    AnchoredDelay, CheckBounds, CheckLeftfix, CheckLookaround, CheckNotHandled, CheckOnlyEod,
    Instruction, ReportOp, SetGroups, SetState, SomAdjust, SomLeftfix, TriggerInfix,
    TriggerSuffix,
};
use super::lookaround::LookEntry;
use super::program::{Program, ProgramError, ProgramParts};

/// Symbolic jump target, resolved to a byte offset at build time.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Label(u32);

impl Label {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Program assembly error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("label L{0} is never bound to an instruction")]
    UnboundLabel(u32),
    #[error("label L{label} does not lie after its jump at offset {offset}")]
    BackwardJump { label: u32, offset: usize },
    #[error("label L{0} is bound twice")]
    LabelRebound(u32),
    #[error(transparent)]
    Program(#[from] ProgramError),
}

/// Incremental role-program builder.
///
/// Scan-state capacities grow automatically to cover every key, state,
/// queue and SOM slot the emitted instructions use; the explicit setters
/// only raise them further.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    records: Vec<(Instruction, Option<Label>)>,
    /// Record index each label is bound to.
    bindings: Vec<Option<usize>>,
    rebound: Option<Label>,
    literals: Vec<Vec<Label>>,
    lookaround: Vec<LookEntry>,
    handled_key_count: u32,
    role_state_count: u32,
    queue_count: u32,
    som_slot_count: u32,
    initial_groups: u64,
    floating_min_offset: u64,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an unbound label.
    pub fn label(&mut self) -> Label {
        let label = Label(self.bindings.len() as u32);
        self.bindings.push(None);
        label
    }

    /// Bind `label` to the next emitted record.
    pub fn bind(&mut self, label: Label) -> &mut Self {
        let slot = &mut self.bindings[label.0 as usize];
        if slot.is_some() {
            self.rebound.get_or_insert(label);
        } else {
            *slot = Some(self.records.len());
        }
        self
    }

    /// Run the code at `entry` whenever `literal` is reported.
    pub fn bind_literal(&mut self, literal: LiteralId, entry: Label) -> &mut Self {
        let id = literal.0 as usize;
        if self.literals.len() <= id {
            self.literals.resize_with(id + 1, Vec::new);
        }
        self.literals[id].push(entry);
        self
    }

    /// Start a new entry point for `literal` at the next emitted record.
    pub fn literal_entry(&mut self, literal: LiteralId) -> &mut Self {
        let entry = self.label();
        self.bind(entry);
        self.bind_literal(literal, entry)
    }

    pub fn handled_keys(&mut self, count: u32) -> &mut Self {
        self.handled_key_count = self.handled_key_count.max(count);
        self
    }

    pub fn role_states(&mut self, count: u32) -> &mut Self {
        self.role_state_count = self.role_state_count.max(count);
        self
    }

    pub fn queues(&mut self, count: u32) -> &mut Self {
        self.queue_count = self.queue_count.max(count);
        self
    }

    pub fn som_slots(&mut self, count: u32) -> &mut Self {
        self.som_slot_count = self.som_slot_count.max(count);
        self
    }

    pub fn initial_groups(&mut self, groups: u64) -> &mut Self {
        self.initial_groups = groups;
        self
    }

    pub fn floating_min_offset(&mut self, offset: u64) -> &mut Self {
        self.floating_min_offset = offset;
        self
    }

    /// Append a record as-is. Any jump it carries is kept as a raw delta.
    pub fn emit(&mut self, instr: Instruction) -> &mut Self {
        self.note_operands(&instr);
        self.records.push((instr, None));
        self
    }

    /// Append a record whose jump resolves to `target`.
    pub fn emit_jump(&mut self, instr: Instruction, target: Label) -> &mut Self {
        debug_assert!(instr.jump().is_some(), "{} has no jump", instr.opcode().mnemonic());
        self.note_operands(&instr);
        self.records.push((instr, Some(target)));
        self
    }

    fn note_operands(&mut self, instr: &Instruction) {
        match instr {
            Instruction::CheckNotHandled(i) => self.handled_keys(i.key + 1),
            Instruction::CheckLeftfix(i) => self.queues(i.queue.0 + 1),
            Instruction::SomLeftfix(i) => self.queues(i.queue.0 + 1),
            Instruction::TriggerInfix(i) => self.queues(i.queue.0 + 1),
            Instruction::TriggerSuffix(i) => self.queues(i.queue.0 + 1),
            Instruction::ReportSomInt(i) => self.som_slots(i.report.0 + 1),
            Instruction::SetState(i) => self.role_states(i.index + 1),
            _ => self,
        };
    }

    pub fn anchored_delay(&mut self, depth: u8, groups: u64, done: Label) -> &mut Self {
        let instr = AnchoredDelay {
            depth,
            groups,
            done_jump: 0,
        };
        self.emit_jump(Instruction::AnchoredDelay(instr), done)
    }

    pub fn check_only_eod(&mut self, fail: Label) -> &mut Self {
        let instr = CheckOnlyEod { fail_jump: 0 };
        self.emit_jump(Instruction::CheckOnlyEod(instr), fail)
    }

    /// Bounds check; `max = None` means unbounded.
    pub fn check_bounds(&mut self, min: u32, max: Option<u32>, fail: Label) -> &mut Self {
        let instr = CheckBounds {
            min_bound: min,
            max_bound: max.unwrap_or(ROSE_BOUND_INF),
            fail_jump: 0,
        };
        self.emit_jump(Instruction::CheckBounds(instr), fail)
    }

    pub fn check_not_handled(&mut self, key: u32, fail: Label) -> &mut Self {
        let instr = CheckNotHandled { key, fail_jump: 0 };
        self.emit_jump(Instruction::CheckNotHandled(instr), fail)
    }

    /// Append `entries` to the lookaround table and check them.
    ///
    /// Entries are stored sorted by offset, so the first one past the
    /// buffer end is never followed by one that still reads a byte.
    pub fn check_lookaround(&mut self, entries: &[LookEntry], fail: Label) -> &mut Self {
        let start = self.lookaround.len();
        let instr = CheckLookaround {
            index: start as u32,
            count: entries.len() as u32,
            fail_jump: 0,
        };
        self.lookaround.extend_from_slice(entries);
        self.lookaround[start..].sort_by_key(|e| e.offset);
        self.emit_jump(Instruction::CheckLookaround(instr), fail)
    }

    pub fn check_leftfix(
        &mut self,
        queue: QueueIndex,
        lag: u32,
        report: ReportId,
        fail: Label,
    ) -> &mut Self {
        let instr = CheckLeftfix {
            queue,
            lag,
            report,
            fail_jump: 0,
        };
        self.emit_jump(Instruction::CheckLeftfix(instr), fail)
    }

    pub fn som_adjust(&mut self, distance: u32) -> &mut Self {
        self.emit(Instruction::SomAdjust(SomAdjust { distance }))
    }

    pub fn som_leftfix(&mut self, queue: QueueIndex, lag: u32) -> &mut Self {
        self.emit(Instruction::SomLeftfix(SomLeftfix { queue, lag }))
    }

    pub fn trigger_infix(&mut self, cancel: bool, queue: QueueIndex, event: u32) -> &mut Self {
        self.emit(Instruction::TriggerInfix(TriggerInfix {
            cancel,
            queue,
            event,
        }))
    }

    pub fn trigger_suffix(&mut self, queue: QueueIndex, event: u32) -> &mut Self {
        self.emit(Instruction::TriggerSuffix(TriggerSuffix { queue, event }))
    }

    pub fn report(&mut self, report: ReportId) -> &mut Self {
        self.emit(Instruction::Report(ReportOp { report }))
    }

    pub fn report_chain(&mut self, report: ReportId) -> &mut Self {
        self.emit(Instruction::ReportChain(ReportOp { report }))
    }

    pub fn report_eod(&mut self, report: ReportId) -> &mut Self {
        self.emit(Instruction::ReportEod(ReportOp { report }))
    }

    pub fn report_som_int(&mut self, slot: ReportId) -> &mut Self {
        self.emit(Instruction::ReportSomInt(ReportOp { report: slot }))
    }

    pub fn report_som(&mut self, report: ReportId) -> &mut Self {
        self.emit(Instruction::ReportSom(ReportOp { report }))
    }

    pub fn report_som_known(&mut self, report: ReportId) -> &mut Self {
        self.emit(Instruction::ReportSomKnown(ReportOp { report }))
    }

    pub fn set_state(&mut self, depth: u8, index: u32) -> &mut Self {
        self.emit(Instruction::SetState(SetState { depth, index }))
    }

    pub fn set_groups(&mut self, groups: u64) -> &mut Self {
        self.emit(Instruction::SetGroups(SetGroups { groups }))
    }

    pub fn end(&mut self) -> &mut Self {
        self.emit(Instruction::End)
    }

    /// Resolve labels, encode the records and validate the result.
    pub fn build(&self) -> Result<Program, BuildError> {
        if let Some(label) = self.rebound {
            return Err(BuildError::LabelRebound(label.0));
        }

        let mut offsets = Vec::with_capacity(self.records.len());
        let mut size = 0usize;
        for (instr, _) in &self.records {
            offsets.push(size);
            size += instr.size();
        }

        let resolve = |label: Label| -> Result<usize, BuildError> {
            self.bindings[label.0 as usize]
                .and_then(|idx| offsets.get(idx).copied())
                .ok_or(BuildError::UnboundLabel(label.0))
        };

        let mut code = Vec::with_capacity(size);
        for ((instr, target), &offset) in self.records.iter().zip(&offsets) {
            let instr = match target {
                Some(label) => {
                    let target = resolve(*label)?;
                    if target <= offset {
                        return Err(BuildError::BackwardJump {
                            label: label.0,
                            offset,
                        });
                    }
                    instr.with_jump((target - offset) as u32)
                }
                None => *instr,
            };
            instr.write_to(&mut code);
        }

        let mut literals = Vec::with_capacity(self.literals.len());
        for entries in &self.literals {
            let resolved = entries
                .iter()
                .map(|&label| resolve(label).map(|at| ProgramOffset(at as u32)))
                .collect::<Result<Vec<_>, _>>()?;
            literals.push(resolved);
        }

        let program = Program::new(ProgramParts {
            code,
            literals,
            lookaround: self.lookaround.clone(),
            handled_key_count: self.handled_key_count,
            role_state_count: self.role_state_count,
            queue_count: self.queue_count,
            som_slot_count: self.som_slot_count,
            initial_groups: self.initial_groups,
            floating_min_offset: self.floating_min_offset,
        })?;
        Ok(program)
    }
}
