//! Scan driver: turns pre-filter callbacks into program runs.

use rosette_bytecode::{LiteralId, Program, ProgramOffset};

use super::error::RuntimeError;
use super::queue::SubEngines;
use super::sink::{Flow, MatchPath, ReportSink};
use super::state::ScanState;
use super::stream::Stream;
use super::trace::{NoopTracer, Tracer};
use super::vm::{MatchSource, ScanContext, VM};

/// When the handled set is cleared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DedupScope {
    /// Whenever a literal match ends at a different offset than the last one.
    #[default]
    PerOffset,
    /// Only when a new scan begins.
    PerScan,
}

/// Scan driver configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScanConfig {
    pub(crate) dedup_scope: DedupScope,
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dedup_scope(mut self, scope: DedupScope) -> Self {
        self.dedup_scope = scope;
        self
    }

    pub fn get_dedup_scope(&self) -> DedupScope {
        self.dedup_scope
    }
}

/// A candidate literal match from the pre-filter.
///
/// `from` and `to` index the current buffer; `to` is inclusive.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LiteralMatch {
    pub from: usize,
    pub to: usize,
    pub id: LiteralId,
}

impl LiteralMatch {
    pub fn new(from: usize, to: usize, id: LiteralId) -> Self {
        Self { from, to, id }
    }

    /// Absolute exclusive end offset within `stream`.
    pub fn end(&self, stream: &Stream<'_>) -> u64 {
        stream.buf_offset + self.to as u64 + 1
    }
}

/// Builder for [`Scanner`].
pub struct ScannerBuilder<'p> {
    program: &'p Program,
    config: ScanConfig,
}

impl<'p> ScannerBuilder<'p> {
    pub fn dedup_scope(mut self, scope: DedupScope) -> Self {
        self.config = self.config.dedup_scope(scope);
        self
    }

    pub fn config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Scanner<'p> {
        Scanner {
            vm: VM::new(self.program),
            state: ScanState::new(self.program),
            config: self.config,
            last_end: None,
            finished: false,
            halted: false,
        }
    }
}

/// Runs role programs for one scan or stream.
pub struct Scanner<'p> {
    vm: VM<'p>,
    state: ScanState,
    config: ScanConfig,
    last_end: Option<u64>,
    finished: bool,
    halted: bool,
}

impl<'p> Scanner<'p> {
    pub fn builder(program: &'p Program) -> ScannerBuilder<'p> {
        ScannerBuilder {
            program,
            config: ScanConfig::default(),
        }
    }

    pub fn new(program: &'p Program) -> Self {
        Self::builder(program).build()
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ScanState {
        &mut self.state
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Handle a literal from the floating matcher.
    pub fn on_literal(
        &mut self,
        stream: Stream<'_>,
        m: LiteralMatch,
        sink: &mut dyn ReportSink,
        engines: &mut dyn SubEngines,
    ) -> Result<(), RuntimeError> {
        self.on_match(stream, m, MatchSource::Floating, sink, engines, &mut NoopTracer)
    }

    /// Handle a literal from the anchored matcher.
    pub fn on_anchored_literal(
        &mut self,
        stream: Stream<'_>,
        m: LiteralMatch,
        sink: &mut dyn ReportSink,
        engines: &mut dyn SubEngines,
    ) -> Result<(), RuntimeError> {
        self.on_match(stream, m, MatchSource::Anchored, sink, engines, &mut NoopTracer)
    }

    /// Run every entry for `m.id`, in table order, with a tracer attached.
    ///
    /// A floating match first replays the delayed anchored matches that end
    /// at or before it.
    pub fn on_match<T: Tracer>(
        &mut self,
        stream: Stream<'_>,
        m: LiteralMatch,
        source: MatchSource,
        sink: &mut dyn ReportSink,
        engines: &mut dyn SubEngines,
        tracer: &mut T,
    ) -> Result<(), RuntimeError> {
        if self.halted {
            return Err(RuntimeError::Halted);
        }
        if self.finished {
            return Err(RuntimeError::Finished);
        }
        debug_assert!(m.from <= m.to, "literal match {m:?} ends before it starts");

        let entries = self
            .vm
            .program()
            .entries(m.id)
            .ok_or(RuntimeError::UnknownLiteral(m.id.0))?;

        let end = m.end(&stream);
        if source == MatchSource::Floating {
            self.replay_delayed(end, stream, sink, engines, tracer)?;
        }
        self.run_entries(entries, end, source, stream, sink, engines, tracer)
    }

    /// Replay delayed anchored matches, then flush deferred end-of-data
    /// reports. Only the first call does any work.
    pub fn finish(
        &mut self,
        stream: Stream<'_>,
        sink: &mut dyn ReportSink,
        engines: &mut dyn SubEngines,
    ) -> Result<(), RuntimeError> {
        self.finish_with(stream, sink, engines, &mut NoopTracer)
    }

    pub fn finish_with<T: Tracer>(
        &mut self,
        stream: Stream<'_>,
        sink: &mut dyn ReportSink,
        engines: &mut dyn SubEngines,
        tracer: &mut T,
    ) -> Result<(), RuntimeError> {
        if self.halted {
            return Err(RuntimeError::Halted);
        }
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        self.replay_delayed(u64::MAX, stream, sink, engines, tracer)?;

        for m in self.state.take_eod() {
            let flow = sink.report_eod(m);
            tracer.trace_report(MatchPath::Eod, &m);
            if flow == Flow::Halt {
                tracer.trace_halt();
                self.halted = true;
                return Err(RuntimeError::Halted);
            }
        }
        Ok(())
    }

    /// Rerun delayed entries ending at or before `through` as floating
    /// matches, earliest end first.
    fn replay_delayed<T: Tracer>(
        &mut self,
        through: u64,
        stream: Stream<'_>,
        sink: &mut dyn ReportSink,
        engines: &mut dyn SubEngines,
        tracer: &mut T,
    ) -> Result<(), RuntimeError> {
        for delayed in self.state.take_delayed_through(through) {
            self.run_entries(
                &[delayed.entry],
                delayed.end,
                MatchSource::Floating,
                stream,
                sink,
                engines,
                tracer,
            )?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn run_entries<T: Tracer>(
        &mut self,
        entries: &[ProgramOffset],
        end: u64,
        source: MatchSource,
        stream: Stream<'_>,
        sink: &mut dyn ReportSink,
        engines: &mut dyn SubEngines,
        tracer: &mut T,
    ) -> Result<(), RuntimeError> {
        if self.config.dedup_scope == DedupScope::PerOffset && self.last_end != Some(end) {
            self.state.clear_handled();
        }
        self.last_end = Some(end);

        let mut ctx = ScanContext {
            state: &mut self.state,
            stream,
            sink,
            engines,
            source,
        };
        for &entry in entries {
            if let Err(err) = self.vm.run_with(entry, end, &mut ctx, tracer) {
                if err == RuntimeError::Halted {
                    self.halted = true;
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Return to the state of a fresh scan of the same program.
    pub fn reset(&mut self) {
        self.state.reset();
        self.last_end = None;
        self.finished = false;
        self.halted = false;
    }
}
