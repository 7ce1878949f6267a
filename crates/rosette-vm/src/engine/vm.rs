//! Role-program interpreter.

use rosette_bytecode::{
    CheckLeftfix, CheckLookaround, Instruction, Program, ProgramOffset, QueueIndex,
    ROSE_BOUND_INF, ReportId,
};

use super::error::RuntimeError;
use super::queue::{QueueEvent, SubEngines};
use super::sink::{Flow, Match, MatchPath, ReportSink};
use super::state::ScanState;
use super::stream::{ByteAt, Stream};
use super::trace::{NoopTracer, Tracer};

/// Which literal matcher produced the current candidate.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum MatchSource {
    #[default]
    Floating,
    /// The anchored matcher, replayed over the start of the data.
    Anchored,
}

/// Everything a program run reads and writes besides the program itself.
pub struct ScanContext<'a, 'b> {
    pub state: &'a mut ScanState,
    pub stream: Stream<'b>,
    pub sink: &'a mut dyn ReportSink,
    pub engines: &'a mut dyn SubEngines,
    pub source: MatchSource,
}

/// Where control goes after an instruction.
enum Step {
    Next,
    Jump(u32),
    Stop,
}

/// Interpreter for one program. Cheap to create; holds no scan state.
#[derive(Clone, Copy, Debug)]
pub struct VM<'p> {
    program: &'p Program,
}

impl<'p> VM<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self { program }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    /// Run the program from `entry` for a match ending at `end`.
    ///
    /// This is a convenience method that uses `NoopTracer`, which gets
    /// optimized away completely.
    pub fn run(
        &self,
        entry: ProgramOffset,
        end: u64,
        ctx: &mut ScanContext<'_, '_>,
    ) -> Result<(), RuntimeError> {
        self.run_with(entry, end, ctx, &mut NoopTracer)
    }

    /// Run the program with a tracer attached.
    ///
    /// Control only moves forward, so a run touches each record at most
    /// once and always reaches `END`.
    pub fn run_with<T: Tracer>(
        &self,
        entry: ProgramOffset,
        end: u64,
        ctx: &mut ScanContext<'_, '_>,
        tracer: &mut T,
    ) -> Result<(), RuntimeError> {
        let mut pc = entry;
        let mut som: Option<u64> = None;
        let mut steps = 0usize;

        tracer.trace_enter(entry, end);
        loop {
            steps += 1;
            debug_assert!(
                steps <= self.program.instruction_count(),
                "program run from {} did not terminate",
                entry.0
            );

            let instr = self.program.decode_at(pc);
            tracer.trace_instruction(pc, &instr);

            let step = match instr {
                Instruction::AnchoredDelay(i) => {
                    if ctx.source == MatchSource::Anchored
                        && end > self.program.floating_min_offset()
                    {
                        ctx.state.raise_depth(i.depth);
                        ctx.state.add_groups(i.groups);
                        ctx.state.delay_anchored(entry, end);
                        tracer.trace_delay(end);
                        Step::Jump(i.done_jump)
                    } else {
                        Step::Next
                    }
                }
                Instruction::CheckOnlyEod(i) => {
                    check(ctx.stream.is_eod(end), i.fail_jump, tracer)
                }
                Instruction::CheckBounds(i) => {
                    let above = end >= u64::from(i.min_bound);
                    let below = i.max_bound == ROSE_BOUND_INF || end <= u64::from(i.max_bound);
                    check(above && below, i.fail_jump, tracer)
                }
                Instruction::CheckNotHandled(i) => {
                    let fresh = !ctx.state.mark_handled(i.key);
                    check(fresh, i.fail_jump, tracer)
                }
                Instruction::CheckLookaround(i) => {
                    let ok = self.lookaround_matches(&i, end, &ctx.stream);
                    check(ok, i.fail_jump, tracer)
                }
                Instruction::CheckLeftfix(i) => {
                    let ok = leftfix_accepts(&i, end, ctx);
                    check(ok, i.fail_jump, tracer)
                }
                Instruction::SomAdjust(i) => {
                    let value = end.saturating_sub(u64::from(i.distance));
                    som = Some(value);
                    tracer.trace_som(value);
                    Step::Next
                }
                Instruction::SomLeftfix(i) => {
                    let location = end.saturating_sub(u64::from(i.lag));
                    let engines = &mut *ctx.engines;
                    let value = ctx
                        .state
                        .queues_mut()
                        .engage(i.queue, |pending| engines.som(i.queue, pending, location));
                    som = Some(value);
                    tracer.trace_som(value);
                    Step::Next
                }
                Instruction::TriggerInfix(i) => {
                    if i.cancel {
                        ctx.state.queues_mut().cancel_tops(i.queue);
                    }
                    trigger(ctx.state, i.queue, i.event, end, som, tracer);
                    Step::Next
                }
                Instruction::TriggerSuffix(i) => {
                    trigger(ctx.state, i.queue, i.event, end, som, tracer);
                    Step::Next
                }
                Instruction::Report(i) => {
                    let m = make_match(i.report, end, som);
                    let flow = ctx.sink.report(m);
                    emit(MatchPath::Direct, &m, flow, tracer)?
                }
                Instruction::ReportChain(i) => {
                    let m = make_match(i.report, end, som);
                    let flow = ctx.sink.report_chain(m);
                    emit(MatchPath::Chain, &m, flow, tracer)?
                }
                Instruction::ReportEod(i) => {
                    let m = make_match(i.report, end, som);
                    tracer.trace_defer_eod(&m);
                    ctx.state.defer_eod(m);
                    Step::Next
                }
                Instruction::ReportSomInt(i) => {
                    let value = som.unwrap_or(0);
                    ctx.state.record_som(i.report.0, value);
                    tracer.trace_som_slot(i.report.0, value);
                    Step::Next
                }
                Instruction::ReportSom(i) => {
                    // Without a SOM from this run, fall back to one recorded
                    // internally for the same report.
                    let value = som.or_else(|| ctx.state.som_slot(i.report.0)).unwrap_or(0);
                    let m = make_match(i.report, end, Some(value));
                    let flow = ctx.sink.report(m);
                    emit(MatchPath::Direct, &m, flow, tracer)?
                }
                Instruction::ReportSomKnown(i) => {
                    let m = make_match(i.report, end, Some(som.unwrap_or(0)));
                    let flow = ctx.sink.report(m);
                    emit(MatchPath::Direct, &m, flow, tracer)?
                }
                Instruction::SetState(i) => {
                    ctx.state.set_role(i.index);
                    ctx.state.raise_depth(i.depth);
                    Step::Next
                }
                Instruction::SetGroups(i) => {
                    ctx.state.add_groups(i.groups);
                    Step::Next
                }
                Instruction::End => Step::Stop,
            };

            pc = match step {
                Step::Next => ProgramOffset(pc.0 + instr.size() as u32),
                Step::Jump(delta) => pc.jump(delta),
                Step::Stop => return Ok(()),
            };
        }
    }

    /// Every entry in range must hold a byte in its reach set.
    ///
    /// Entries before the retained history are skipped. Runs are sorted by
    /// offset, so the first entry past the end of the buffer ends the check
    /// successfully.
    fn lookaround_matches(&self, look: &CheckLookaround, end: u64, stream: &Stream<'_>) -> bool {
        let start = look.index as usize;
        let entries = &self.program.lookaround()[start..start + look.count as usize];
        for entry in entries {
            match stream.byte_at(end as i64 + i64::from(entry.offset)) {
                ByteAt::Unavailable => continue,
                ByteAt::Future => return true,
                ByteAt::Byte(b) if entry.reach.contains(b) => continue,
                ByteAt::Byte(_) => return false,
            }
        }
        true
    }
}

#[inline]
fn check<T: Tracer>(passed: bool, fail_jump: u32, tracer: &mut T) -> Step {
    tracer.trace_check(passed);
    if passed {
        Step::Next
    } else {
        Step::Jump(fail_jump)
    }
}

fn leftfix_accepts(i: &CheckLeftfix, end: u64, ctx: &mut ScanContext<'_, '_>) -> bool {
    let Some(location) = end.checked_sub(u64::from(i.lag)) else {
        return false;
    };
    let engines = &mut *ctx.engines;
    ctx.state.queues_mut().engage(i.queue, |pending| {
        engines.in_accept(i.queue, pending, i.report, location)
    })
}

fn trigger<T: Tracer>(
    state: &mut ScanState,
    queue: QueueIndex,
    event: u32,
    end: u64,
    som: Option<u64>,
    tracer: &mut T,
) {
    let event = QueueEvent {
        event,
        location: end,
        som,
    };
    state.queues_mut().push(queue, event);
    tracer.trace_trigger(queue, &event);
}

#[inline]
fn make_match(report: ReportId, end: u64, som: Option<u64>) -> Match {
    Match { report, end, som }
}

fn emit<T: Tracer>(
    path: MatchPath,
    m: &Match,
    flow: Flow,
    tracer: &mut T,
) -> Result<Step, RuntimeError> {
    tracer.trace_report(path, m);
    match flow {
        Flow::Continue => Ok(Step::Next),
        Flow::Halt => {
            tracer.trace_halt();
            Err(RuntimeError::Halted)
        }
    }
}
