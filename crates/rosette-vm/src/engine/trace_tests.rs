use indoc::indoc;
use rosette_bytecode::{
    Colors, LiteralId, MQE_TOP, Program, ProgramBuilder, ProgramOffset, QueueIndex, ReportId,
};

use super::queue::NoEngines;
use super::scanner::{LiteralMatch, Scanner};
use super::sink::MatchLog;
use super::state::ScanState;
use super::stream::Stream;
use super::trace::{PrintTracer, Verbosity};
use super::vm::{MatchSource, ScanContext, VM};

static BLOCK: [u8; 32] = [b'x'; 32];

fn bounded_report() -> Program {
    let mut b = ProgramBuilder::new();
    let done = b.label();
    b.literal_entry(LiteralId(0))
        .check_bounds(2, Some(5), done)
        .check_not_handled(0, done)
        .report(ReportId(7))
        .bind(done)
        .end();
    b.build().unwrap()
}

fn som_program() -> Program {
    let mut b = ProgramBuilder::new();
    b.literal_entry(LiteralId(0))
        .som_adjust(3)
        .report_som(ReportId(1))
        .report_eod(ReportId(2))
        .trigger_suffix(QueueIndex(0), MQE_TOP)
        .end();
    b.build().unwrap()
}

fn trace_runs(
    program: &Program,
    verbosity: Verbosity,
    ends: &[u64],
    log: &mut MatchLog,
) -> String {
    let mut tracer = PrintTracer::new(program, verbosity, Colors::OFF);
    let mut state = ScanState::new(program);
    let mut ctx = ScanContext {
        state: &mut state,
        stream: Stream::block(&BLOCK),
        sink: log,
        engines: &mut NoEngines,
        source: MatchSource::Floating,
    };
    let vm = VM::new(program);
    let entry = program.entries(LiteralId(0)).unwrap()[0];
    for &end in ends {
        if vm.run_with(entry, end, &mut ctx, &mut tracer).is_err() {
            break;
        }
    }
    tracer.output()
}

#[test]
fn trace_default() {
    let program = bounded_report();
    let out = trace_runs(&program, Verbosity::Default, &[3, 3], &mut MatchLog::new());

    assert_eq!(
        out,
        indoc! {"
            entry 00 end=3
              00 CHECK_BOUNDS       [2, 5]                      fail -> 40
              16 CHECK_NOT_HANDLED  key=0                       fail -> 40
              32 REPORT             report=7
                 report 7 @3
              40 END

            entry 00 end=3
              00 CHECK_BOUNDS       [2, 5]                      fail -> 40
              16 CHECK_NOT_HANDLED  key=0                       fail -> 40
              40 END
        "}
    );
}

#[test]
fn trace_verbose_checks() {
    let program = bounded_report();
    let out = trace_runs(&program, Verbosity::Verbose, &[9], &mut MatchLog::new());

    assert_eq!(
        out,
        indoc! {"
            entry 00 end=9
              00 CHECK_BOUNDS       [2, 5]                      fail -> 40
                 fail
              40 END
        "}
    );
}

#[test]
fn trace_verbose_som_and_triggers() {
    let program = som_program();
    let out = trace_runs(&program, Verbosity::Verbose, &[10], &mut MatchLog::new());

    assert_eq!(
        out,
        indoc! {"
            entry 00 end=10
              00 SOM_ADJUST         distance=3
                 som = 7
              08 REPORT_SOM         report=1
                 report 1 @10 som=7
              16 REPORT_EOD         report=2
                 defer report 2 @10 som=7
              24 TRIGGER_SUFFIX     q0 TOP
                 q0 <- TOP @10
              40 END
        "}
    );
}

#[test]
fn trace_default_hides_bookkeeping() {
    let program = som_program();
    let out = trace_runs(&program, Verbosity::Default, &[10], &mut MatchLog::new());

    assert_eq!(
        out,
        indoc! {"
            entry 00 end=10
              00 SOM_ADJUST         distance=3
              08 REPORT_SOM         report=1
                 report 1 @10 som=7
              16 REPORT_EOD         report=2
              24 TRIGGER_SUFFIX     q0 TOP
              40 END
        "}
    );
}

#[test]
fn trace_halt() {
    let program = bounded_report();
    let mut log = MatchLog::new().halt_after(1);
    let out = trace_runs(&program, Verbosity::Default, &[4, 5], &mut log);

    assert_eq!(
        out,
        indoc! {"
            entry 00 end=4
              00 CHECK_BOUNDS       [2, 5]                      fail -> 40
              16 CHECK_NOT_HANDLED  key=0                       fail -> 40
              32 REPORT             report=7
                 report 7 @4
                 halt
        "}
    );
}

#[test]
fn trace_eod_flush() {
    let program = som_program();
    let mut scanner = Scanner::new(&program);
    let mut tracer = PrintTracer::new(&program, Verbosity::Default, Colors::OFF);
    let mut log = MatchLog::new();

    let m = LiteralMatch::new(5, 9, LiteralId(0));
    scanner
        .on_match(
            Stream::block(&BLOCK),
            m,
            MatchSource::Floating,
            &mut log,
            &mut NoEngines,
            &mut tracer,
        )
        .unwrap();
    scanner
        .finish_with(Stream::block(&BLOCK), &mut log, &mut NoEngines, &mut tracer)
        .unwrap();

    let last = tracer.lines().last().unwrap();
    assert_eq!(last, "     eod report 2 @10 som=7");
}

#[test]
fn trace_verbose_delay_and_replay() {
    let mut b = ProgramBuilder::new();
    let done = b.label();
    b.floating_min_offset(2)
        .literal_entry(LiteralId(0))
        .anchored_delay(0, 0b1, done)
        .report(ReportId(1))
        .bind(done)
        .end();
    let program = b.build().unwrap();
    let mut scanner = Scanner::new(&program);
    let mut tracer = PrintTracer::new(&program, Verbosity::Verbose, Colors::OFF);
    let mut log = MatchLog::new();

    scanner
        .on_match(
            Stream::block(&BLOCK),
            LiteralMatch::new(0, 4, LiteralId(0)),
            MatchSource::Anchored,
            &mut log,
            &mut NoEngines,
            &mut tracer,
        )
        .unwrap();
    assert_eq!(tracer.lines()[0], "entry 00 end=5");
    assert_eq!(tracer.lines()[2], "     delay @5");

    scanner
        .finish_with(Stream::block(&BLOCK), &mut log, &mut NoEngines, &mut tracer)
        .unwrap();
    let entries = tracer.lines().iter().filter(|l| l.starts_with("entry")).count();
    assert_eq!(entries, 2);
    assert_eq!(tracer.lines().last().unwrap(), "  32 END");
    assert!(tracer.lines().iter().any(|l| l == "     report 1 @5"));
}

#[test]
fn trace_colored_entry() {
    let program = bounded_report();
    let mut tracer = PrintTracer::new(&program, Verbosity::Default, Colors::ON);
    let mut state = ScanState::new(&program);
    let mut log = MatchLog::new();
    let mut ctx = ScanContext {
        state: &mut state,
        stream: Stream::block(&BLOCK),
        sink: &mut log,
        engines: &mut NoEngines,
        source: MatchSource::Floating,
    };
    VM::new(&program)
        .run_with(ProgramOffset(0), 1, &mut ctx, &mut tracer)
        .unwrap();

    assert_eq!(tracer.lines()[0], "\x1b[34mentry 00\x1b[0m end=1");
    assert_eq!(
        tracer.lines()[1],
        "  00 CHECK_BOUNDS       [2, 5]                      \x1b[2mfail -> 40\x1b[0m"
    );
}
