//! CSR, trap, and interrupt programs.
//!
//! Programs that assert exact trap counts end in `EBREAK` followed by two
//! NOPs, so no junk word can reach execute before the stop takes effect.

use pretty_assertions::assert_eq;

use rv32sim_core::config::{Config, IllegalPolicy};
use rv32sim_core::isa::csr;

use crate::common::encode::*;
use crate::common::harness::TestContext;

#[test]
fn csr_read_write_round_trip() {
    let mut ctx = TestContext::new().load_program(&[
        addi(1, 0, 0x55),
        csrrw(2, csr::MTVEC, 1),   // x2 ← old (0), mtvec ← 0x55... cleared below
        csrrs(3, csr::MTVEC, 0),   // pure read: x3 ← 0x55
        csrrw(0, csr::MTVEC, 0),   // restore
        ebreak(),
        nop(),
        nop(),
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(2), 0, "CSRRW returns the pre-write value");
    assert_eq!(ctx.get_reg(3), 0x55);
    assert_eq!(ctx.cpu().stats.traps_taken, 0);
}

#[test]
fn csr_write_is_visible_to_next_instruction() {
    // The very next instruction reads back the written value; serialization
    // (flush + refetch) makes the ordering trivial.
    let mut ctx = TestContext::new().load_program(&[
        addi(1, 0, 0x123),
        csrrw(0, csr::MEPC, 1),
        csrrs(2, csr::MEPC, 0),
        ebreak(),
        nop(),
        nop(),
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(2), 0x122, "mepc stores with bit 0 cleared");
}

#[test]
fn csrrs_with_x0_does_not_write() {
    let mut ctx = TestContext::new().load_program(&[
        addi(1, 0, 0xF0),
        csrrw(0, csr::MIE, 1),
        csrrs(2, csr::MIE, 0),     // read-only access
        csrrs(3, csr::MIE, 0),
        ebreak(),
        nop(),
        nop(),
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(2), 0xF0);
    assert_eq!(ctx.get_reg(3), 0xF0);
}

#[test]
fn ecall_traps_and_mret_resumes() {
    // Handler at byte 40 reads mcause, advances mepc past the ECALL, and
    // returns; the main path then runs to completion.
    let mut ctx = TestContext::new().load_program(&[
        addi(1, 0, 40),            //  0: handler address
        csrrw(0, csr::MTVEC, 1),   //  4
        ecall(),                   //  8
        addi(3, 0, 7),             // 12: executed after the handler returns
        ebreak(),                  // 16
        nop(),                     // 20
        nop(),                     // 24
        nop(),                     // 28
        nop(),                     // 32
        nop(),                     // 36
        csrrs(5, csr::MCAUSE, 0),  // 40: handler
        csrrs(4, csr::MEPC, 0),    // 44
        addi(4, 4, 4),             // 48
        csrrw(0, csr::MEPC, 4),    // 52
        mret(),                    // 56
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(5), 11, "mcause = environment call from M-mode");
    assert_eq!(ctx.get_reg(4), 12, "mepc held the ECALL's own PC (8) + 4");
    assert_eq!(ctx.get_reg(3), 7);
    assert_eq!(ctx.cpu().stats.traps_taken, 1);
}

#[test]
fn illegal_instruction_traps_by_default() {
    let mut ctx = TestContext::new().load_program(&[
        addi(1, 0, 32),            //  0: handler address
        csrrw(0, csr::MTVEC, 1),   //  4
        0xFFFF_FFFF,               //  8: undecodable
        ebreak(),                  // 12: reached via the handler
        nop(),                     // 16
        nop(),                     // 20
        nop(),                     // 24
        nop(),                     // 28
        csrrs(5, csr::MCAUSE, 0),  // 32: handler
        csrrs(4, csr::MEPC, 0),    // 36
        addi(4, 4, 4),             // 40
        csrrw(0, csr::MEPC, 4),    // 44
        mret(),                    // 48
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(5), 2, "mcause = illegal instruction");
    assert_eq!(ctx.get_reg(4), 12, "mepc held the illegal word's PC (8) + 4");
    assert_eq!(ctx.cpu().stats.traps_taken, 1);
}

#[test]
fn illegal_instruction_as_nop_when_configured() {
    let mut config = Config::default();
    config.pipeline.illegal_instruction = IllegalPolicy::Nop;

    let mut ctx = TestContext::with_config(config).load_program(&[
        addi(1, 0, 5),
        0xFFFF_FFFF,               // dropped silently
        addi(2, 1, 1),
        ebreak(),
        nop(),
        nop(),
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(2), 6);
    assert_eq!(ctx.cpu().stats.traps_taken, 0);
}

#[test]
fn timer_interrupt_fires_and_handler_returns() {
    // Main: arm the timer, enable interrupts, spin until the handler sets
    // x5. Handler (byte 48): set x5, disarm by pushing mtimecmp high, MRET.
    let mut ctx = TestContext::new().load_program(&[
        lui(2, 0x40004),              //  0: timer base
        addi(3, 0, 0x80),             //  4: MTIE
        csrrw(0, csr::MIE, 3),        //  8
        addi(1, 0, 48),               // 12: handler address
        csrrw(0, csr::MTVEC, 1),      // 16
        addi(4, 0, 300),              // 20
        sw(4, 2, 8),                  // 24: mtimecmp low
        sw(0, 2, 12),                 // 28: mtimecmp high → armed at 300
        csrrsi(0, csr::MSTATUS, 8),   // 32: global MIE
        beq(5, 0, 0),                 // 36: spin on x5
        ebreak(),                     // 40
        nop(),                        // 44
        addi(5, 0, 1),                // 48: handler
        addi(6, 0, -1),               // 52
        sw(6, 2, 12),                 // 56: mtimecmp high ← huge → disarm
        mret(),                       // 60
    ]);
    ctx.run_to_break(100_000);

    assert_eq!(ctx.get_reg(5), 1, "handler ran");
    assert_eq!(ctx.cpu().stats.traps_taken, 1);
    assert_eq!(
        ctx.cpu().csrs.read(csr::MCAUSE),
        (1 << 31) | 7,
        "machine timer interrupt cause"
    );
}

#[test]
fn interrupt_disabled_when_mie_clear() {
    // Timer armed and pending, but the global enable stays off: the main
    // path must run to completion untouched.
    let mut ctx = TestContext::new().load_program(&[
        lui(2, 0x40004),
        addi(4, 0, 10),
        sw(4, 2, 8),                  // mtimecmp low = 10
        sw(0, 2, 12),                 // mtimecmp high = 0 → pending soon
        addi(3, 0, 0x80),
        csrrw(0, csr::MIE, 3),        // MTIE on, but mstatus.MIE stays 0
        addi(6, 0, 21),
        ebreak(),
        nop(),
        nop(),
    ]);
    ctx.run_to_break(10_000);

    assert_eq!(ctx.get_reg(6), 21);
    assert_eq!(ctx.cpu().stats.traps_taken, 0);
}

#[test]
fn mtime_is_readable_and_monotonic() {
    let mut ctx = TestContext::new().load_program(&[
        lui(2, 0x40004),
        lw(7, 2, 0),                  // mtime low, early
        lw(8, 2, 0),                  // mtime low, later
        ebreak(),
        nop(),
        nop(),
    ]);
    ctx.run_to_break(10_000);

    assert!(ctx.get_reg(8) > ctx.get_reg(7), "mtime advances every cycle");
}
