//! Test-only harness for running small raw-byte programs: `run_program`
//! plus the `register_a!`/`register_x!`/`register_y!`/`status!`/
//! `zero_page!` assertion macros. Programs are raw opcode bytes loaded at
//! a fixed address rather than assembled from text.

#![macro_use]

use super::Simulator;
use crate::error::SimError;
use crate::registers::{StatusFlag, RESET_STATUS};

pub const P: u8 = RESET_STATUS;
pub const C: u8 = StatusFlag::Carry as u8;
pub const Z: u8 = StatusFlag::Zero as u8;
pub const I: u8 = StatusFlag::InterruptDisable as u8;
pub const D: u8 = StatusFlag::Decimal as u8;
pub const B: u8 = StatusFlag::Break as u8;
pub const U: u8 = StatusFlag::Unused as u8;
pub const V: u8 = StatusFlag::Overflow as u8;
pub const N: u8 = StatusFlag::Negative as u8;

pub const LOAD_ADDR: u16 = 0x0200;

/// Loads `bytes` at `LOAD_ADDR`, appends a BRK terminator, and runs to
/// completion. The whole address space is pre-declared as zeroed RAM,
/// so these programs never need to worry about memory typing.
pub fn run_program(bytes: &[u8]) -> Simulator {
    let mut sim = Simulator::new();
    sim.add_zeroed_ram(0x0000, 0x1_0000);
    let mut program = bytes.to_vec();
    program.push(0x00); // BRK
    sim.add_data_ram(LOAD_ADDR, &program);
    match sim.run(LOAD_ADDR) {
        SimError::Break(_) => {}
        other => panic!("\nprogram did not terminate in BRK: {}", other),
    }
    sim
}

pub fn assert_register_a(bytes: &[u8], value: u8, status: u8) {
    let sim = run_program(bytes);
    if sim.registers.a != value {
        panic!(
            "\nExpected register A to be {:#04x} but it was {:#04x}",
            value, sim.registers.a
        );
    }
    assert_status(&sim, status);
}

pub fn assert_register_x(bytes: &[u8], value: u8, status: u8) {
    let sim = run_program(bytes);
    if sim.registers.x != value {
        panic!(
            "\nExpected register X to be {:#04x} but it was {:#04x}",
            value, sim.registers.x
        );
    }
    assert_status(&sim, status);
}

pub fn assert_register_y(bytes: &[u8], value: u8, status: u8) {
    let sim = run_program(bytes);
    if sim.registers.y != value {
        panic!(
            "\nExpected register Y to be {:#04x} but it was {:#04x}",
            value, sim.registers.y
        );
    }
    assert_status(&sim, status);
}

pub fn assert_status(sim: &Simulator, value: u8) {
    if sim.registers.p == value {
        return;
    }
    let flags = [
        ("Carry", C),
        ("Zero", Z),
        ("InterruptDisable", I),
        ("Decimal", D),
        ("Break", B),
        ("Unused", U),
        ("Overflow", V),
        ("Negative", N),
    ];
    let mut mismatches = String::new();
    for (name, mask) in flags {
        let expected = value & mask == mask;
        let actual = sim.registers.p & mask == mask;
        if expected != actual {
            mismatches.push_str(&format!("  {}: expected {}, got {}\n", name, expected, actual));
        }
    }
    panic!(
        "\nExpected status 0b{:08b} but it was 0b{:08b}\n{}",
        value, sim.registers.p, mismatches
    );
}

pub fn assert_memory(bytes: &[u8], addr: u16, expected: u8) {
    let sim = run_program(bytes);
    let actual = sim.get_byte(addr).unwrap_or_else(|| panic!("address {:#06x} was never written", addr));
    if actual != expected {
        panic!(
            "\nExpected memory at {:#06x} to be {:#04x} but it was {:#04x}",
            addr, expected, actual
        );
    }
}

macro_rules! register_a {
    ($name:ident, $a:expr, $p:expr, $bytes:expr) => {
        #[test]
        fn $name() {
            assert_register_a($bytes, $a, $p);
        }
    };
}

macro_rules! register_x {
    ($name:ident, $x:expr, $p:expr, $bytes:expr) => {
        #[test]
        fn $name() {
            assert_register_x($bytes, $x, $p);
        }
    };
}

macro_rules! register_y {
    ($name:ident, $y:expr, $p:expr, $bytes:expr) => {
        #[test]
        fn $name() {
            assert_register_y($bytes, $y, $p);
        }
    };
}

macro_rules! status {
    ($name:ident, $p:expr, $bytes:expr) => {
        #[test]
        fn $name() {
            let sim = run_program($bytes);
            assert_status(&sim, $p);
        }
    };
}

macro_rules! zero_page {
    ($name:ident, [$addr:expr, $expected:expr], $bytes:expr) => {
        #[test]
        fn $name() {
            assert_memory($bytes, $addr, $expected);
        }
    };
}
