//! Tests for role-program instructions.

use super::constants::{INSTR_MIN_ALIGN, MQE_TOP_FIRST, ROSE_BOUND_INF};
use super::ids::{QueueIndex, ReportId};
use super::instructions::{
    AnchoredDelay, CheckBounds, CheckLeftfix, CheckNotHandled, Instruction, Opcode, ReportOp,
    SetGroups, SetState, TriggerInfix,
};

#[test]
fn opcode_sizes_are_aligned() {
    for opcode in Opcode::ALL {
        assert!(
            opcode.size().is_multiple_of(INSTR_MIN_ALIGN),
            "{} has unaligned size {}",
            opcode.mnemonic(),
            opcode.size()
        );
    }
}

#[test]
fn opcode_sizes() {
    assert_eq!(Opcode::AnchoredDelay.size(), 24);
    assert_eq!(Opcode::CheckOnlyEod.size(), 8);
    assert_eq!(Opcode::CheckBounds.size(), 16);
    assert_eq!(Opcode::CheckNotHandled.size(), 16);
    assert_eq!(Opcode::CheckLookaround.size(), 16);
    assert_eq!(Opcode::CheckLeftfix.size(), 24);
    assert_eq!(Opcode::SomAdjust.size(), 8);
    assert_eq!(Opcode::SomLeftfix.size(), 16);
    assert_eq!(Opcode::TriggerInfix.size(), 16);
    assert_eq!(Opcode::TriggerSuffix.size(), 16);
    assert_eq!(Opcode::Report.size(), 8);
    assert_eq!(Opcode::SetState.size(), 8);
    assert_eq!(Opcode::SetGroups.size(), 16);
    assert_eq!(Opcode::End.size(), 8);
}

#[test]
fn opcode_from_u8() {
    assert_eq!(Opcode::from_u8(0), Some(Opcode::AnchoredDelay));
    assert_eq!(Opcode::from_u8(10), Some(Opcode::Report));
    assert_eq!(Opcode::from_u8(18), Some(Opcode::End));
    assert_eq!(Opcode::from_u8(19), None);
    assert_eq!(Opcode::from_u8(0xFF), None);

    for (i, opcode) in Opcode::ALL.iter().enumerate() {
        assert_eq!(*opcode as u8 as usize, i);
    }
}

#[test]
fn opcode_classes() {
    assert!(Opcode::CheckBounds.is_check());
    assert!(Opcode::CheckLeftfix.is_check());
    assert!(!Opcode::AnchoredDelay.is_check());
    assert!(!Opcode::Report.is_check());
}

#[test]
fn check_bounds_layout() {
    let instr = Instruction::CheckBounds(CheckBounds {
        min_bound: 2,
        max_bound: ROSE_BOUND_INF,
        fail_jump: 40,
    });

    let bytes = instr.to_bytes();
    assert_eq!(
        bytes,
        [
            2, 0, 0, 0, // opcode + padding
            2, 0, 0, 0, // min_bound
            0xFF, 0xFF, 0xFF, 0xFF, // max_bound
            40, 0, 0, 0, // fail_jump
        ]
    );
    assert_eq!(Instruction::from_bytes(&bytes), instr);
}

#[test]
fn anchored_delay_layout() {
    let instr = Instruction::AnchoredDelay(AnchoredDelay {
        depth: 3,
        groups: 0x0102_0304_0506_0708,
        done_jump: 48,
    });

    let bytes = instr.to_bytes();
    assert_eq!(bytes.len(), 24);
    assert_eq!(bytes[0], Opcode::AnchoredDelay as u8);
    assert_eq!(bytes[1], 3);
    assert_eq!(&bytes[2..8], &[0; 6]);
    assert_eq!(&bytes[8..16], &[8, 7, 6, 5, 4, 3, 2, 1]);
    assert_eq!(&bytes[16..20], &[48, 0, 0, 0]);
    assert_eq!(Instruction::from_bytes(&bytes), instr);
}

#[test]
fn check_leftfix_layout() {
    let instr = Instruction::CheckLeftfix(CheckLeftfix {
        queue: QueueIndex(7),
        lag: 2,
        report: ReportId(99),
        fail_jump: 16,
    });

    let bytes = instr.to_bytes();
    assert_eq!(bytes.len(), 24);
    assert_eq!(&bytes[4..8], &[7, 0, 0, 0]);
    assert_eq!(&bytes[8..12], &[2, 0, 0, 0]);
    assert_eq!(&bytes[12..16], &[99, 0, 0, 0]);
    assert_eq!(&bytes[16..20], &[16, 0, 0, 0]);
    assert_eq!(Instruction::from_bytes(&bytes), instr);
}

#[test]
fn trigger_infix_cancel_flag() {
    let instr = Instruction::TriggerInfix(TriggerInfix {
        cancel: true,
        queue: QueueIndex(1),
        event: MQE_TOP_FIRST + 2,
    });

    let bytes = instr.to_bytes();
    assert_eq!(bytes[1], 1);
    assert_eq!(&bytes[8..12], &[6, 0, 0, 0]);
    assert_eq!(Instruction::from_bytes(&bytes), instr);
}

#[test]
fn report_variants_share_layout() {
    let op = ReportOp {
        report: ReportId(42),
    };
    let variants = [
        Instruction::Report(op),
        Instruction::ReportChain(op),
        Instruction::ReportEod(op),
        Instruction::ReportSomInt(op),
        Instruction::ReportSom(op),
        Instruction::ReportSomKnown(op),
    ];

    for instr in variants {
        let bytes = instr.to_bytes();
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes[0], instr.opcode() as u8);
        assert_eq!(&bytes[4..8], &[42, 0, 0, 0]);
        assert_eq!(Instruction::from_bytes(&bytes), instr);
    }
}

#[test]
fn set_state_and_groups() {
    let state = Instruction::SetState(SetState {
        depth: 1,
        index: 300,
    });
    let bytes = state.to_bytes();
    assert_eq!(&bytes[..8], &[16, 1, 0, 0, 0x2C, 0x01, 0, 0]);

    let groups = Instruction::SetGroups(SetGroups { groups: 0b0100 });
    let bytes = groups.to_bytes();
    assert_eq!(bytes.len(), 16);
    assert_eq!(bytes[8], 0b0100);
}

#[test]
fn end_is_single_padded_record() {
    assert_eq!(Instruction::End.to_bytes(), vec![18, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(Instruction::from_bytes(&[18, 0, 0, 0, 0, 0, 0, 0]), Instruction::End);
}

#[test]
fn jump_accessors() {
    let check = Instruction::CheckNotHandled(CheckNotHandled {
        key: 5,
        fail_jump: 0,
    });
    assert_eq!(check.jump(), Some(0));
    assert_eq!(check.with_jump(32).jump(), Some(32));

    let report = Instruction::Report(ReportOp {
        report: ReportId(1),
    });
    assert_eq!(report.jump(), None);
    assert_eq!(report.with_jump(32), report);
}
