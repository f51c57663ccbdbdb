//! Whole-program architectural tests.
//!
//! Each test loads a small instruction sequence at address 0, runs until the
//! terminating `EBREAK` retires, and checks the final architectural state.

use pretty_assertions::assert_eq;

use crate::common::encode::*;
use crate::common::harness::TestContext;

#[test]
fn arithmetic_and_logic_program() {
    let mut ctx = TestContext::new().load_program(&[
        addi(1, 0, 10),
        addi(2, 0, 5),
        add(3, 1, 2),
        sub(4, 1, 2),
        and(5, 1, 2),
        or(6, 1, 2),
        xor(7, 1, 2),
        sll(8, 1, 2),
        slt(9, 1, 2),
        sltu(10, 2, 1),
        ebreak(),
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(3), 15);
    assert_eq!(ctx.get_reg(4), 5);
    assert_eq!(ctx.get_reg(5), 0);
    assert_eq!(ctx.get_reg(6), 15);
    assert_eq!(ctx.get_reg(7), 15);
    assert_eq!(ctx.get_reg(8), 320);
    assert_eq!(ctx.get_reg(9), 0);
    assert_eq!(ctx.get_reg(10), 1);
}

#[test]
fn forwarding_chain_needs_no_stall() {
    let mut ctx = TestContext::new().load_program(&[
        addi(1, 0, 1),
        add(2, 1, 1),
        add(3, 2, 1),
        add(4, 3, 2),
        ebreak(),
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(4), 5);
    assert_eq!(ctx.cpu().stats.stalls_load_use, 0);
}

#[test]
fn store_load_round_trip_with_subword_views() {
    // Build 0x12EFCDAB in x1 and store it, then read it back at every width.
    let mut ctx = TestContext::new().load_program(&[
        lui(1, 0x12EFD),      // 0x12EFD000
        addi(1, 1, -0x255),   // 0x12EFCDAB
        sw(1, 0, 0x100),
        lw(2, 0, 0x100),
        lb(3, 0, 0x100),      // 0xAB sign-extended
        lbu(4, 0, 0x100),
        lh(5, 0, 0x100),      // 0xCDAB sign-extended
        lhu(6, 0, 0x100),
        lbu(7, 0, 0x103),     // top byte
        ebreak(),
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(2), 0x12EF_CDAB);
    assert_eq!(ctx.get_reg(3), 0xFFFF_FFAB);
    assert_eq!(ctx.get_reg(4), 0xAB);
    assert_eq!(ctx.get_reg(5), 0xFFFF_CDAB);
    assert_eq!(ctx.get_reg(6), 0xCDAB);
    assert_eq!(ctx.get_reg(7), 0x12);
}

#[test]
fn byte_store_merges_into_word() {
    let mut ctx = TestContext::new().load_program(&[
        addi(1, 0, -1),       // 0xFFFFFFFF
        sw(1, 0, 0x80),
        addi(2, 0, 0),
        sb(2, 0, 0x81),       // clear byte lane 1
        lw(3, 0, 0x80),
        ebreak(),
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(3), 0xFFFF_00FF);
}

#[test]
fn load_use_hazard_stalls_once_and_computes_correctly() {
    let mut ctx = TestContext::new().load_program(&[
        addi(1, 0, 123),
        sw(1, 0, 0x100),
        lw(2, 0, 0x100),
        add(3, 2, 2),         // consumes the load immediately
        ebreak(),
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(3), 246);
    assert!(
        ctx.cpu().stats.stalls_load_use >= 1,
        "back-to-back load consumer must stall"
    );
}

#[test]
fn icache_miss_freezes_fetch_and_decode_together() {
    // Eight increments span two instruction-cache lines, so the line-crossing
    // fetch misses with an instruction already latched behind it. The latched
    // instruction must hold in place while execute sees a bubble, entering
    // decode only once the fill completes.
    let mut program: Vec<u32> = (0..8).map(|_| addi(1, 1, 1)).collect();
    program.push(ebreak());
    let mut ctx = TestContext::new().load_program(&program);

    let mut observed = false;
    for _ in 0..200 {
        let held = ctx.cpu().if_id;
        let stalls_before = ctx.cpu().stats.stalls_fetch;
        ctx.cpu_mut().tick();
        if ctx.cpu().stats.stalls_fetch > stalls_before && held.valid {
            assert!(ctx.cpu().if_id.valid, "fetch latch holds across the stall");
            assert_eq!(ctx.cpu().if_id.pc, held.pc, "held instruction unchanged");
            assert!(!ctx.cpu().id_ex.valid, "execute receives the bubble");
            observed = true;
        }
        if ctx.cpu().break_hit {
            break;
        }
    }
    assert!(
        observed,
        "a line-crossing fetch must stall behind a latched instruction"
    );
    assert_eq!(ctx.get_reg(1), 8, "every increment retires exactly once");
}

#[test]
fn x0_is_immutable() {
    let mut ctx = TestContext::new().load_program(&[
        addi(0, 0, 5),
        lui(0, 0xFFFFF),
        sw(0, 0, 0x100),      // stores zero
        lw(0, 0, 0x100),
        add(1, 0, 0),
        ebreak(),
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(0), 0);
    assert_eq!(ctx.get_reg(1), 0);
}

#[test]
fn mdu_program_with_degenerate_cases() {
    let mut ctx = TestContext::new().load_program(&[
        addi(1, 0, -7),
        addi(2, 0, 3),
        mul(3, 1, 2),         // -21
        div(4, 1, 2),         // -2 (truncates toward zero)
        rem(5, 1, 2),         // -1
        divu(6, 1, 2),        // 0xFFFFFFF9 / 3
        div(7, 1, 0),         // divide by zero → all ones
        rem(8, 1, 0),         // remainder by zero → dividend
        mulh(9, 1, 2),        // high bits of small negative product → -1
        ebreak(),
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(3), (-21i32) as u32);
    assert_eq!(ctx.get_reg(4), (-2i32) as u32);
    assert_eq!(ctx.get_reg(5), (-1i32) as u32);
    assert_eq!(ctx.get_reg(6), 0x5555_5553);
    assert_eq!(ctx.get_reg(7), u32::MAX);
    assert_eq!(ctx.get_reg(8), (-7i32) as u32);
    assert_eq!(ctx.get_reg(9), u32::MAX);
    assert!(ctx.cpu().stats.stalls_mdu > 0, "MDU latency must stall");
}

#[test]
fn mdu_result_forwards_to_next_instruction() {
    let mut ctx = TestContext::new().load_program(&[
        addi(1, 0, 6),
        addi(2, 0, 7),
        mul(3, 1, 2),
        add(4, 3, 3),         // consumes the MDU result immediately
        ebreak(),
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(4), 84);
}

#[test]
fn lui_auipc_produce_upper_immediates() {
    let mut ctx = TestContext::new().load_program(&[
        lui(1, 0xDEADB),
        auipc(2, 0x1),        // pc = 4 → 0x1004
        ebreak(),
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(1), 0xDEAD_B000);
    assert_eq!(ctx.get_reg(2), 0x1004);
}

#[test]
fn fence_retires_as_no_op() {
    let mut ctx = TestContext::new().load_program(&[
        addi(1, 0, 9),
        fence(),
        addi(2, 1, 1),
        ebreak(),
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(2), 10);
}

#[test]
fn uart_collects_stored_bytes() {
    let mut ctx = TestContext::new().load_program(&[
        lui(1, 0x40000),      // UART base
        addi(2, 0, b'H' as i32),
        sb(2, 1, 0),
        addi(2, 0, b'i' as i32),
        sb(2, 1, 0),
        ebreak(),
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.cpu().mem.uart_output(), b"Hi");
}

#[test]
fn stats_count_cycles_and_instructions() {
    let mut ctx = TestContext::new().load_program(&[
        addi(1, 0, 1),
        addi(2, 0, 2),
        ebreak(),
    ]);
    ctx.run_to_break(10_000);

    let stats = &ctx.cpu().stats;
    assert_eq!(stats.instructions_retired, 3);
    assert!(stats.cycles >= stats.instructions_retired);
    assert!(stats.icache_misses >= 1, "cold caches must miss");
    assert!(stats.ipc() > 0.0);
}
