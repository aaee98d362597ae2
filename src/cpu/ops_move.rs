//! Loads, stores, register transfers, the stack-juggling instructions,
//! and the increment/decrement family.

use super::Simulator;
use crate::error::SimResult;
use crate::opcodes::Mode;
use crate::registers::StatusFlag;

pub fn lda(sim: &mut Simulator, mode: Mode, extra_flag: u8) -> SimResult<()> {
    let value = sim.read_operand(mode, extra_flag != 0)?;
    sim.registers.a = value;
    sim.update_zn(value);
    Ok(())
}

pub fn ldx(sim: &mut Simulator, mode: Mode, extra_flag: u8) -> SimResult<()> {
    let value = sim.read_operand(mode, extra_flag != 0)?;
    sim.registers.x = value;
    sim.update_zn(value);
    Ok(())
}

pub fn ldy(sim: &mut Simulator, mode: Mode, extra_flag: u8) -> SimResult<()> {
    let value = sim.read_operand(mode, extra_flag != 0)?;
    sim.registers.y = value;
    sim.update_zn(value);
    Ok(())
}

pub fn sta(sim: &mut Simulator, mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let value = sim.registers.a;
    sim.write_operand(mode, value)
}

pub fn stx(sim: &mut Simulator, mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let value = sim.registers.x;
    sim.write_operand(mode, value)
}

pub fn sty(sim: &mut Simulator, mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let value = sim.registers.y;
    sim.write_operand(mode, value)
}

pub fn tax(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.registers.x = sim.registers.a;
    sim.update_zn(sim.registers.x);
    Ok(())
}

pub fn txa(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.registers.a = sim.registers.x;
    sim.update_zn(sim.registers.a);
    Ok(())
}

pub fn tay(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.registers.y = sim.registers.a;
    sim.update_zn(sim.registers.y);
    Ok(())
}

pub fn tya(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.registers.a = sim.registers.y;
    sim.update_zn(sim.registers.a);
    Ok(())
}

pub fn tsx(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.registers.x = sim.registers.s;
    sim.update_zn(sim.registers.x);
    Ok(())
}

/// `TXS` copies X into S and -- unlike every other transfer -- does not
/// touch any flag.
pub fn txs(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.registers.s = sim.registers.x;
    Ok(())
}

pub fn pha(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let value = sim.registers.a;
    sim.push_u8(value)
}

pub fn pla(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let value = sim.pull_u8()?;
    sim.registers.a = value;
    sim.update_zn(value);
    Ok(())
}

/// `PHP` always pushes the status byte with the Break and Unused bits
/// set, regardless of their current value in `P`.
pub fn php(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let value = sim.registers.p | StatusFlag::Break.mask() | StatusFlag::Unused.mask();
    sim.push_u8(value)
}

pub fn plp(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let value = sim.pull_u8()?;
    sim.set_flags(0xFF, value);
    Ok(())
}

pub fn inx(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.registers.x = sim.registers.x.wrapping_add(1);
    sim.update_zn(sim.registers.x);
    Ok(())
}

pub fn iny(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.registers.y = sim.registers.y.wrapping_add(1);
    sim.update_zn(sim.registers.y);
    Ok(())
}

pub fn dex(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.registers.x = sim.registers.x.wrapping_sub(1);
    sim.update_zn(sim.registers.x);
    Ok(())
}

pub fn dey(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.registers.y = sim.registers.y.wrapping_sub(1);
    sim.update_zn(sim.registers.y);
    Ok(())
}

pub fn inc(sim: &mut Simulator, mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.modify_operand(mode, |sim, value| {
        let result = value.wrapping_add(1);
        sim.update_zn(result);
        result
    })
}

pub fn dec(sim: &mut Simulator, mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.modify_operand(mode, |sim, value| {
        let result = value.wrapping_sub(1);
        sim.update_zn(result);
        result
    })
}

pub fn nop(_sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    Ok(())
}
