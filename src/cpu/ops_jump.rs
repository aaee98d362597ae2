//! Branches, jumps, and the subroutine/interrupt-return family.

use super::Simulator;
use crate::error::{SimError, SimResult};
use crate::opcodes::Mode;
use crate::registers::StatusFlag;

/// Shared branch body: always consumes the relative operand byte (real
/// hardware does too, whether or not the branch is taken), charges the
/// base+taken+page-cross cycles, and records the branch in the profiler
/// keyed by the branch opcode's own address.
fn branch(sim: &mut Simulator, taken: bool) -> SimResult<()> {
    let opcode_addr = sim.registers.pc.wrapping_sub(1);
    let (target, _) = sim.operand_address(Mode::Relative, false)?;
    let crossed = Simulator::page_crossed(opcode_addr, target);
    sim.profiler.record_branch(opcode_addr, taken);
    if taken {
        sim.cycles += 1;
        if crossed {
            sim.cycles += 1;
        }
        sim.registers.pc = target;
    }
    Ok(())
}

pub fn bpl(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let taken = !sim.registers.is_flag_set(StatusFlag::Negative);
    branch(sim, taken)
}

pub fn bmi(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let taken = sim.registers.is_flag_set(StatusFlag::Negative);
    branch(sim, taken)
}

pub fn bvc(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let taken = !sim.registers.is_flag_set(StatusFlag::Overflow);
    branch(sim, taken)
}

pub fn bvs(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let taken = sim.registers.is_flag_set(StatusFlag::Overflow);
    branch(sim, taken)
}

pub fn bcc(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let taken = !sim.registers.is_flag_set(StatusFlag::Carry);
    branch(sim, taken)
}

pub fn bcs(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let taken = sim.registers.is_flag_set(StatusFlag::Carry);
    branch(sim, taken)
}

pub fn bne(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let taken = !sim.registers.is_flag_set(StatusFlag::Zero);
    branch(sim, taken)
}

pub fn beq(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let taken = sim.registers.is_flag_set(StatusFlag::Zero);
    branch(sim, taken)
}

/// Absolute and indirect JMP share the same effective-address resolution;
/// `operand_address`'s `Indirect` arm already implements the
/// non-page-wrapping reading of the pointer.
pub fn jmp(sim: &mut Simulator, mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let (target, _) = sim.operand_address(mode, false)?;
    sim.registers.pc = target;
    Ok(())
}

pub fn jsr(sim: &mut Simulator, mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let (target, _) = sim.operand_address(mode, false)?;
    let return_addr = sim.registers.pc.wrapping_sub(1);
    sim.push_u16(return_addr)?;
    sim.registers.pc = target;
    Ok(())
}

pub fn rts(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let addr = sim.pull_u16()?;
    sim.registers.pc = addr.wrapping_add(1);
    Ok(())
}

/// Pulls P with the Break and Unused bits forced set, then PC low, then
/// PC high -- the stack order a real interrupt push leaves behind.
pub fn rti(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let p = sim.pull_u8()?;
    sim.set_flags(0xFF, p | StatusFlag::Break.mask() | StatusFlag::Unused.mask());
    let pc = sim.pull_u16()?;
    sim.registers.pc = pc;
    Ok(())
}

/// `BRK` latches the dedicated `Break` error at the opcode's own address
/// and does not touch the stack -- see the design note on why this
/// simulator treats BRK as a clean exit rather than a simulated IRQ.
pub fn brk(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let opcode_addr = sim.registers.pc.wrapping_sub(1);
    Err(sim.latch_error(SimError::Break(opcode_addr)))
}
