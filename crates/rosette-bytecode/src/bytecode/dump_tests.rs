use indoc::indoc;

use super::builder::ProgramBuilder;
use super::constants::MQE_TOP_FIRST;
use super::dump::dump;
use super::format::Colors;
use super::ids::{LiteralId, QueueIndex, ReportId};
use super::lookaround::{ByteSet, LookEntry};
use super::program::Program;

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

#[test]
fn dump_bounded_report() {
    let out = dump(&bounded_report(), Colors::OFF);
    assert_eq!(
        out,
        indoc! {"
            [state]
            handled_keys = 1
            role_states = 0
            queues = 0
            som_slots = 0
            initial_groups = 0x0
            floating_min_offset = 0

            [literals]
            L0 -> 00

            [lookaround]

            [code]
            L0:
              00 CHECK_BOUNDS       [2, 5]                      fail -> 40
              16 CHECK_NOT_HANDLED  key=0                       fail -> 40
              32 REPORT             report=7
              40 END
        "}
    );
}

#[test]
fn dump_delay_lookaround_infix() {
    let mut b = ProgramBuilder::new();
    let done = b.label();
    let newline = ByteSet::from_bytes(b"\n");
    b.literal_entry(LiteralId(0))
        .anchored_delay(0, 0b100, done)
        .check_lookaround(
            &[
                LookEntry::new(-1, ByteSet::from_range(b'a'..=b'z')),
                LookEntry::new(0, newline.negate()),
            ],
            done,
        )
        .trigger_infix(true, QueueIndex(1), MQE_TOP_FIRST)
        .bind(done)
        .end()
        .bind_literal(LiteralId(1), done);
    let program = b.build().unwrap();

    let out = dump(&program, Colors::OFF);
    let code = out.split("[code]\n").nth(1).unwrap();
    assert_eq!(
        code,
        indoc! {"
            L0:
              00 ANCHORED_DELAY     depth=0 groups=0x4          done -> 56
              24 CHECK_LOOKAROUND   look[0..2]                  fail -> 56
              40 TRIGGER_INFIX      q1 TOP0 cancel

            L1:
              56 END
        "}
    );
    assert!(out.contains("L0 -> 00\nL1 -> 56\n"));
    assert!(out.contains("#0 -1 [a-z]\n#1 +0 [^\\x0A]\n"));
    assert!(out.contains("queues = 2\n"));
}

#[test]
fn dump_with_colors() {
    let out = dump(&bounded_report(), Colors::ON);
    assert!(out.starts_with("\x1b[34m[state]\x1b[0m\n"));
    assert!(out.contains("\x1b[34m[code]\x1b[0m\n"));
    assert!(out.contains(
        "  00 CHECK_BOUNDS       [2, 5]                      \x1b[2mfail -> 40\x1b[0m\n"
    ));
}
