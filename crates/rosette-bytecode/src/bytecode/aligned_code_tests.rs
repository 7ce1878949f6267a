use super::aligned_code::AlignedCode;
use super::constants::INSTR_MIN_ALIGN;

fn is_aligned(ptr: *const u8) -> bool {
    (ptr as usize).is_multiple_of(INSTR_MIN_ALIGN)
}

#[test]
fn alignment_guarantee() {
    let data: Vec<u8> = (0..96).collect();
    let code = AlignedCode::copy_from_slice(&data);
    assert!(is_aligned(code.as_ptr()));
    assert_eq!(&*code, &data[..]);
}

#[test]
fn empty_slice() {
    let code = AlignedCode::copy_from_slice(&[]);
    assert!(code.is_empty());
    assert_eq!(code.len(), 0);
    assert_eq!(code.as_slice(), &[] as &[u8]);
}

#[test]
fn partial_granule_is_zero_padded() {
    let code = AlignedCode::copy_from_slice(&[1, 2, 3]);
    assert_eq!(code.len(), 8);
    assert_eq!(&*code, &[1, 2, 3, 0, 0, 0, 0, 0]);
}

#[test]
fn clone_preserves_alignment() {
    let data: Vec<u8> = (0..40).collect();
    let code = AlignedCode::copy_from_slice(&data);
    let cloned = code.clone();

    assert!(is_aligned(cloned.as_ptr()));
    assert_eq!(&*cloned, &*code);
}
