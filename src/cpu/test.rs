//! Instruction-level tests, one file per opcode family using the
//! `register_a!`/`status!` assertion-macro style, driven by
//! `test_helpers::run_program`'s raw-byte loader.

use super::test_helpers::*;
use super::{ErrorLevel, Simulator};
use crate::error::SimError;
use crate::registers::StatusFlag;

register_a!(lda_immediate_loads_value, 0x42, I | B | U, &[0xA9, 0x42]);
register_a!(lda_immediate_zero_sets_z, 0x00, I | Z | B | U, &[0xA9, 0x00]);
register_a!(lda_immediate_negative_sets_n, 0x80, I | N | B | U, &[0xA9, 0x80]);

register_x!(ldx_immediate_loads_value, 0x10, I | B | U, &[0xA2, 0x10]);
register_y!(ldy_immediate_loads_value, 0x20, I | B | U, &[0xA0, 0x20]);

register_a!(
    and_immediate_masks_bits,
    0x0F,
    I | B | U,
    &[0xA9, 0xFF, 0x29, 0x0F]
);
register_a!(
    ora_immediate_sets_bits,
    0xFF,
    I | N | B | U,
    &[0xA9, 0x0F, 0x09, 0xF0]
);
register_a!(
    eor_immediate_flips_bits,
    0x00,
    I | Z | B | U,
    &[0xA9, 0xFF, 0x49, 0xFF]
);

register_a!(
    inx_dex_roundtrip_txa,
    0x05,
    I | B | U,
    &[0xA2, 0x05, 0x8A]
);

zero_page!(sta_zero_page_stores_a, [0x10, 0x42], &[0xA9, 0x42, 0x85, 0x10]);

#[test]
fn lda_immediate_scenario() {
    // Scenario 1: LDA #$42 at $0200, A=0 initially.
    let mut sim = Simulator::new();
    sim.add_zeroed_ram(0x0000, 0x1_0000);
    sim.add_data_ram(0x0200, &[0xA9, 0x42]);
    sim.registers.pc = 0x0200;
    sim.execute_one().unwrap();
    assert_eq!(sim.registers.a, 0x42);
    assert!(!sim.registers.is_flag_set(StatusFlag::Zero));
    assert!(!sim.registers.is_flag_set(StatusFlag::Negative));
    assert_eq!(sim.cycles, 2);
    assert_eq!(sim.registers.pc, 0x0202);
}

#[test]
fn adc_decimal_no_carry_scenario() {
    // Scenario 2: D=1, C=0, A=0x25, ADC #$37 -> A=0x62.
    let mut sim = Simulator::new();
    sim.add_zeroed_ram(0x0000, 0x1_0000);
    sim.add_data_ram(0x0200, &[0x69, 0x37]);
    sim.registers.pc = 0x0200;
    sim.registers.a = 0x25;
    sim.set_flags(D, D);
    sim.set_flags(C, 0);
    sim.execute_one().unwrap();
    assert_eq!(sim.registers.a, 0x62);
    assert!(!sim.registers.is_flag_set(StatusFlag::Carry));
    assert!(!sim.registers.is_flag_set(StatusFlag::Zero));
    assert!(!sim.registers.is_flag_set(StatusFlag::Negative));
    assert!(!sim.registers.is_flag_set(StatusFlag::Overflow));
    assert_eq!(sim.cycles, 2);
}

#[test]
fn adc_decimal_carry_scenario() {
    // Scenario 3: D=1, C=0, A=0x75, ADC #$75 -> A=0x50, C=1.
    let mut sim = Simulator::new();
    sim.add_zeroed_ram(0x0000, 0x1_0000);
    sim.add_data_ram(0x0200, &[0x69, 0x75]);
    sim.registers.pc = 0x0200;
    sim.registers.a = 0x75;
    sim.set_flags(D, D);
    sim.set_flags(C, 0);
    sim.execute_one().unwrap();
    assert_eq!(sim.registers.a, 0x50);
    assert!(sim.registers.is_flag_set(StatusFlag::Carry));
    assert!(!sim.registers.is_flag_set(StatusFlag::Negative));
    assert!(sim.registers.is_flag_set(StatusFlag::Overflow));
}

#[test]
fn bne_taken_no_page_cross() {
    let mut sim = Simulator::new();
    sim.add_zeroed_ram(0x0000, 0x1_0000);
    sim.add_data_ram(0x0300, &[0xD0, 0x04]);
    sim.registers.pc = 0x0300;
    sim.set_flags(Z, 0);
    sim.execute_one().unwrap();
    assert_eq!(sim.registers.pc, 0x0306);
    assert_eq!(sim.cycles, 3);
}

#[test]
fn bne_not_taken() {
    let mut sim = Simulator::new();
    sim.add_zeroed_ram(0x0000, 0x1_0000);
    sim.add_data_ram(0x0300, &[0xD0, 0x04]);
    sim.registers.pc = 0x0300;
    sim.set_flags(Z, Z);
    sim.execute_one().unwrap();
    assert_eq!(sim.registers.pc, 0x0302);
    assert_eq!(sim.cycles, 2);
}

#[test]
fn bne_taken_with_page_cross() {
    let mut sim = Simulator::new();
    sim.add_zeroed_ram(0x0000, 0x1_0000);
    sim.add_data_ram(0x03FE, &[0xD0, 0x04]);
    sim.registers.pc = 0x03FE;
    sim.set_flags(Z, 0);
    sim.execute_one().unwrap();
    assert_eq!(sim.registers.pc, 0x0404);
    assert_eq!(sim.cycles, 4);
}

#[test]
fn lda_zero_page_on_zeroed_ram_reads_zero() {
    let mut sim = Simulator::new();
    sim.add_zeroed_ram(0x0000, 0x1_0000);
    sim.add_data_ram(0x0200, &[0xA5, 0x00]);
    sim.registers.pc = 0x0200;
    sim.execute_one().unwrap();
    assert_eq!(sim.registers.a, 0);
}

#[test]
fn lda_zero_page_on_undef_latches_read_undef() {
    let mut sim = Simulator::new();
    sim.add_data_ram(0x0200, &[0xA5, 0x00]);
    sim.registers.pc = 0x0200;
    sim.set_error_level(ErrorLevel::Memory);
    let err = sim.run(0x0200);
    assert_eq!(err, SimError::ReadUndef(0x0000));
}

#[test]
fn jsr_then_rts_round_trips_through_the_stack() {
    let mut sim = Simulator::new();
    sim.add_zeroed_ram(0x0000, 0x1_0000);
    sim.add_data_ram(0x0200, &[0x20, 0x34, 0x12]); // JSR $1234
    sim.add_data_ram(0x1234, &[0x60]); // RTS
    sim.registers.pc = 0x0200;
    sim.registers.s = 0xFF;

    sim.execute_one().unwrap();
    assert_eq!(sim.registers.pc, 0x1234);
    assert_eq!(sim.registers.s, 0xFD);
    assert_eq!(sim.get_byte(0x01FF).unwrap(), 0x02);
    assert_eq!(sim.get_byte(0x01FE).unwrap(), 0x02);
    assert_eq!(sim.cycles, 6);

    sim.execute_one().unwrap();
    assert_eq!(sim.registers.pc, 0x0203);
    assert_eq!(sim.registers.s, 0xFF);
}

#[test]
fn rol_shifts_carry_in_and_out() {
    let mut sim = Simulator::new();
    sim.add_zeroed_ram(0x0000, 0x1_0000);
    sim.add_data_ram(0x0200, &[0x2A]); // ROL A
    sim.registers.pc = 0x0200;
    sim.registers.a = 0b1000_0001;
    sim.set_flags(C, C);
    sim.execute_one().unwrap();
    assert_eq!(sim.registers.a, 0b0000_0011);
    assert!(sim.registers.is_flag_set(StatusFlag::Carry));
}

#[test]
fn cmp_sets_carry_when_accumulator_is_greater_or_equal() {
    let mut sim = Simulator::new();
    sim.add_zeroed_ram(0x0000, 0x1_0000);
    sim.add_data_ram(0x0200, &[0xC9, 0x10]); // CMP #$10
    sim.registers.pc = 0x0200;
    sim.registers.a = 0x10;
    sim.execute_one().unwrap();
    assert!(sim.registers.is_flag_set(StatusFlag::Carry));
    assert!(sim.registers.is_flag_set(StatusFlag::Zero));
}

#[test]
fn bit_on_invalid_cell_marks_flags_unknown_instead_of_erroring() {
    let mut sim = Simulator::new();
    sim.add_ram(0x0000, 0x1_0000);
    sim.add_data_ram(0x0200, &[0x24, 0x50]); // BIT $50, left UNDEF-free but INVALID
    sim.registers.pc = 0x0200;
    let result = sim.execute_one();
    assert!(result.is_ok());
}
