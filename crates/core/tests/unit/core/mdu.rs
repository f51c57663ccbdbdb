//! Multiply/divide unit tests.

use proptest::prelude::*;
use rstest::rstest;
use rv32sim_core::core::mdu::{Mdu, MduOp, evaluate};

#[test]
fn result_released_after_configured_latency() {
    let mut mdu = Mdu::new(8);
    mdu.start(MduOp::Mul, 6, 7);
    assert!(mdu.busy());
    for cycle in 0..7 {
        assert_eq!(mdu.tick(), None, "still busy at cycle {cycle}");
    }
    assert_eq!(mdu.tick(), Some(42));
    assert!(!mdu.busy());
    assert_eq!(mdu.tick(), None, "idle unit produces nothing");
}

#[test]
fn single_cycle_latency_completes_immediately() {
    let mut mdu = Mdu::new(1);
    mdu.start(MduOp::Div, 10, 2);
    assert_eq!(mdu.tick(), Some(5));
}

#[rstest]
#[case(MduOp::Mul, 7, 6, 42)]
#[case(MduOp::Mul, (-3i32) as u32, 4, (-12i32) as u32)]
#[case(MduOp::Mulh, (-1i32) as u32, (-1i32) as u32, 0)]
#[case(MduOp::Mulh, 0x4000_0000, 4, 1)]
#[case(MduOp::Mulhu, 0x8000_0000, 2, 1)]
#[case(MduOp::Mulhsu, (-1i32) as u32, u32::MAX, u32::MAX)]
fn multiply_results(#[case] op: MduOp, #[case] a: u32, #[case] b: u32, #[case] expect: u32) {
    assert_eq!(evaluate(op, a, b), expect);
}

#[rstest]
#[case(MduOp::Div, (-20i32) as u32, 3, (-6i32) as u32)] // truncates toward zero
#[case(MduOp::Rem, (-20i32) as u32, 3, (-2i32) as u32)]
#[case(MduOp::Divu, u32::MAX, 2, 0x7FFF_FFFF)]
#[case(MduOp::Remu, 7, 3, 1)]
fn division_results(#[case] op: MduOp, #[case] a: u32, #[case] b: u32, #[case] expect: u32) {
    assert_eq!(evaluate(op, a, b), expect);
}

#[rstest]
#[case(MduOp::Div, 17, u32::MAX)]
#[case(MduOp::Divu, 17, u32::MAX)]
#[case(MduOp::Rem, 17, 17)]
#[case(MduOp::Remu, 17, 17)]
fn division_by_zero_has_defined_results(
    #[case] op: MduOp,
    #[case] a: u32,
    #[case] expect: u32,
) {
    assert_eq!(evaluate(op, a, 0), expect);
}

#[test]
fn signed_overflow_division() {
    // i32::MIN / -1 overflows; the result is the dividend, remainder zero.
    let min = i32::MIN as u32;
    let neg1 = (-1i32) as u32;
    assert_eq!(evaluate(MduOp::Div, min, neg1), min);
    assert_eq!(evaluate(MduOp::Rem, min, neg1), 0);
}

proptest! {
    #[test]
    fn unsigned_division_identity(a: u32, b in 1u32..) {
        let q = evaluate(MduOp::Divu, a, b);
        let r = evaluate(MduOp::Remu, a, b);
        prop_assert!(r < b);
        prop_assert_eq!(q.wrapping_mul(b).wrapping_add(r), a);
    }

    #[test]
    fn signed_division_identity(a: i32, b in prop_oneof![i32::MIN..0, 1i32..]) {
        let q = evaluate(MduOp::Div, a as u32, b as u32) as i32;
        let r = evaluate(MduOp::Rem, a as u32, b as u32) as i32;
        prop_assert_eq!(q.wrapping_mul(b).wrapping_add(r), a);
    }

    #[test]
    fn mul_matches_wide_product_low_half(a: u32, b: u32) {
        let wide = u64::from(a).wrapping_mul(u64::from(b));
        prop_assert_eq!(evaluate(MduOp::Mul, a, b), wide as u32);
        prop_assert_eq!(evaluate(MduOp::Mulhu, a, b), (wide >> 32) as u32);
    }
}
