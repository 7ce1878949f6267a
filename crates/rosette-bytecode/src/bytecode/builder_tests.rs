use super::builder::{BuildError, ProgramBuilder};
use super::constants::{MQE_TOP, ROSE_BOUND_INF};
use super::ids::{LiteralId, ProgramOffset, QueueIndex, ReportId};
use super::instructions::{CheckBounds, Instruction, ReportOp};
use super::lookaround::{ByteSet, LookEntry};
use super::program::ProgramError;

#[test]
fn resolves_forward_labels() {
    let mut b = ProgramBuilder::new();
    let done = b.label();
    b.literal_entry(LiteralId(0))
        .check_bounds(2, Some(5), done)
        .check_not_handled(0, done)
        .report(ReportId(7))
        .bind(done)
        .end();

    let program = b.build().unwrap();
    let instrs: Vec<_> = program.instructions().collect();

    assert_eq!(instrs.len(), 4);
    assert_eq!(instrs[0].0, ProgramOffset(0));
    assert_eq!(instrs[0].1.jump(), Some(40));
    assert_eq!(instrs[1].0, ProgramOffset(16));
    assert_eq!(instrs[1].1.jump(), Some(24));
    assert_eq!(instrs[3].0, ProgramOffset(40));
    assert_eq!(instrs[3].1, Instruction::End);
    assert_eq!(program.entries(LiteralId(0)), Some(&[ProgramOffset(0)][..]));
}

#[test]
fn unbounded_check() {
    let mut b = ProgramBuilder::new();
    let fail = b.label();
    b.check_bounds(3, None, fail).bind(fail).end();

    let program = b.build().unwrap();
    assert_eq!(
        program.decode_at(ProgramOffset(0)),
        Instruction::CheckBounds(CheckBounds {
            min_bound: 3,
            max_bound: ROSE_BOUND_INF,
            fail_jump: 16,
        })
    );
}

#[test]
fn capacities_follow_operands() {
    let mut b = ProgramBuilder::new();
    let fail = b.label();
    b.handled_keys(8)
        .check_not_handled(2, fail)
        .set_state(1, 5)
        .trigger_suffix(QueueIndex(3), MQE_TOP)
        .report_som_int(ReportId(1))
        .bind(fail)
        .end();

    let program = b.build().unwrap();
    assert_eq!(program.handled_key_count(), 8);
    assert_eq!(program.role_state_count(), 6);
    assert_eq!(program.queue_count(), 4);
    assert_eq!(program.som_slot_count(), 2);
}

#[test]
fn multiple_entries_per_literal() {
    let mut b = ProgramBuilder::new();
    b.literal_entry(LiteralId(1)).report(ReportId(1)).end();
    b.literal_entry(LiteralId(1)).report(ReportId(2)).end();

    let program = b.build().unwrap();
    assert_eq!(program.entries(LiteralId(0)), Some(&[][..]));
    assert_eq!(
        program.entries(LiteralId(1)),
        Some(&[ProgramOffset(0), ProgramOffset(16)][..])
    );
}

#[test]
fn lookaround_entries_are_appended() {
    let mut b = ProgramBuilder::new();
    let fail = b.label();
    let word = ByteSet::from_range(b'a'..=b'z');
    b.check_lookaround(&[LookEntry::new(-4, word)], fail)
        .check_lookaround(
            &[
                LookEntry::new(0, word.negate()),
                LookEntry::new(1, ByteSet::ALL),
            ],
            fail,
        )
        .bind(fail)
        .end();

    let program = b.build().unwrap();
    assert_eq!(program.lookaround().len(), 3);
    assert_eq!(program.lookaround()[1].offset, 0);

    let second = program.decode_at(ProgramOffset(16));
    let Instruction::CheckLookaround(look) = second else {
        panic!("expected lookaround, got {second:?}");
    };
    assert_eq!((look.index, look.count, look.fail_jump), (1, 2, 16));
}

#[test]
fn lookaround_entries_are_sorted_within_a_check() {
    let mut b = ProgramBuilder::new();
    let fail = b.label();
    b.check_lookaround(&[LookEntry::new(3, ByteSet::ALL)], fail)
        .check_lookaround(
            &[
                LookEntry::new(0, ByteSet::EMPTY),
                LookEntry::new(-1, ByteSet::from_bytes(b"x")),
                LookEntry::new(2, ByteSet::ALL),
            ],
            fail,
        )
        .bind(fail)
        .end();

    let program = b.build().unwrap();
    let offsets: Vec<i8> = program.lookaround().iter().map(|e| e.offset).collect();
    assert_eq!(offsets, [3, -1, 0, 2]);
}

#[test]
fn unbound_label() {
    let mut b = ProgramBuilder::new();
    let fail = b.label();
    b.check_only_eod(fail).end();
    assert_eq!(b.build().unwrap_err(), BuildError::UnboundLabel(0));

    let mut b = ProgramBuilder::new();
    let dangling = b.label();
    b.end().bind(dangling).bind_literal(LiteralId(0), dangling);
    assert_eq!(b.build().unwrap_err(), BuildError::UnboundLabel(0));
}

#[test]
fn backward_jump() {
    let mut b = ProgramBuilder::new();
    let top = b.label();
    b.bind(top).report(ReportId(0)).check_only_eod(top).end();
    assert_eq!(
        b.build().unwrap_err(),
        BuildError::BackwardJump {
            label: 0,
            offset: 8
        }
    );

    let mut b = ProgramBuilder::new();
    let own = b.label();
    b.bind(own).check_only_eod(own).end();
    assert_eq!(
        b.build().unwrap_err(),
        BuildError::BackwardJump {
            label: 0,
            offset: 0
        }
    );
}

#[test]
fn label_rebound() {
    let mut b = ProgramBuilder::new();
    let l = b.label();
    b.bind(l).report(ReportId(0)).bind(l).end();
    assert_eq!(b.build().unwrap_err(), BuildError::LabelRebound(0));
}

#[test]
fn validation_errors_pass_through() {
    let mut b = ProgramBuilder::new();
    b.report(ReportId(0));
    assert_eq!(
        b.build().unwrap_err(),
        BuildError::Program(ProgramError::MissingEnd)
    );

    let mut b = ProgramBuilder::new();
    let fail = b.label();
    b.check_bounds(9, Some(1), fail).bind(fail).end();
    assert!(matches!(
        b.build().unwrap_err(),
        BuildError::Program(ProgramError::BoundsInverted { .. })
    ));
}

#[test]
fn raw_emit_keeps_delta() {
    let mut b = ProgramBuilder::new();
    b.emit(Instruction::CheckBounds(CheckBounds {
        min_bound: 0,
        max_bound: 9,
        fail_jump: 24,
    }))
    .emit(Instruction::Report(ReportOp {
        report: ReportId(1),
    }))
    .end();

    let program = b.build().unwrap();
    assert_eq!(program.decode_at(ProgramOffset(0)).jump(), Some(24));
}
