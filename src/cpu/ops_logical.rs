//! The ALU: logical ops, shifts/rotates, compares, BIT, and the exact
//! binary/decimal ADC/SBC algorithms.

use super::Simulator;
use crate::error::SimResult;
use crate::memory::MemStatus;
use crate::opcodes::Mode;
use crate::registers::StatusFlag;

fn set_czvn(sim: &mut Simulator, c: bool, z: bool, n: bool, v: bool) {
    let mut val = 0u8;
    if c {
        val |= StatusFlag::Carry.mask();
    }
    if z {
        val |= StatusFlag::Zero.mask();
    }
    if v {
        val |= StatusFlag::Overflow.mask();
    }
    if n {
        val |= StatusFlag::Negative.mask();
    }
    let mask = StatusFlag::Carry.mask()
        | StatusFlag::Zero.mask()
        | StatusFlag::Overflow.mask()
        | StatusFlag::Negative.mask();
    sim.set_flags(mask, val);
}

fn adc_binary(a: u32, val: u32, carry: u32) -> (u8, bool, bool, bool, bool) {
    let tmp = a + val + carry;
    let v = (!(a ^ val) & (a ^ tmp)) & 0x80 != 0;
    let c = tmp > 0xFF;
    let n = tmp & 0x80 != 0;
    let z = (tmp & 0xFF) == 0;
    ((tmp & 0xFF) as u8, c, z, n, v)
}

fn adc_decimal(a: u32, val: u32, carry: u32) -> (u8, bool, bool, bool, bool) {
    let tmp_z = a + val + carry;
    let z = (tmp_z & 0xFF) == 0;
    let mut tmp = (a & 0xF) + (val & 0xF) + carry;
    if tmp >= 10 {
        tmp = (tmp - 10) | 16;
    }
    tmp += (a & 0xF0) + (val & 0xF0);
    let n = tmp & 0x80 != 0;
    let v = (!(a ^ val) & (val ^ tmp)) & 0x80 != 0;
    if tmp > 0x9F {
        tmp += 0x60;
    }
    let c = tmp > 0xFF;
    ((tmp & 0xFF) as u8, c, z, n, v)
}

fn sbc_binary(a: u32, val: u32, carry: u32) -> (u8, bool, bool, bool, bool) {
    let tmp = a + 0xFF - val + carry;
    let v = ((a ^ val) & (a ^ tmp)) & 0x80 != 0;
    let c = tmp > 0xFF;
    let n = tmp & 0x80 != 0;
    let z = (tmp & 0xFF) == 0;
    ((tmp & 0xFF) as u8, c, z, n, v)
}

fn sbc_decimal(a: u32, val: u32, carry: u32) -> (u8, bool, bool, bool, bool) {
    let val = val ^ 0xFF;
    let tmp_bin = a + val + carry;
    let v = ((a ^ val) & (a ^ tmp_bin)) & 0x80 != 0;
    let z = (tmp_bin & 0xFF) == 0;

    let mut tmp = (a & 0xF) + (val & 0xF) + carry;
    if tmp < 0x10 {
        tmp = tmp.wrapping_sub(6) & 0x0F;
    }
    tmp += (a & 0xF0) + (val & 0xF0);
    if tmp < 0x100 {
        tmp = tmp.wrapping_sub(0x60) & 0xFF;
    }
    let n = tmp & 0x80 != 0;
    let c = tmp > 0xFF;
    ((tmp & 0xFF) as u8, c, z, n, v)
}

pub fn adc(sim: &mut Simulator, mode: Mode, extra_flag: u8) -> SimResult<()> {
    let val = sim.read_operand(mode, extra_flag != 0)? as u32;
    let a = sim.registers.a as u32;
    let carry_in = sim.registers.is_flag_set(StatusFlag::Carry) as u32;
    let decimal = sim.registers.is_flag_set(StatusFlag::Decimal);
    let (result, c, z, n, v) = if decimal {
        adc_decimal(a, val, carry_in)
    } else {
        adc_binary(a, val, carry_in)
    };
    sim.registers.a = result;
    set_czvn(sim, c, z, n, v);
    Ok(())
}

pub fn sbc(sim: &mut Simulator, mode: Mode, extra_flag: u8) -> SimResult<()> {
    let val = sim.read_operand(mode, extra_flag != 0)? as u32;
    let a = sim.registers.a as u32;
    let carry_in = sim.registers.is_flag_set(StatusFlag::Carry) as u32;
    let decimal = sim.registers.is_flag_set(StatusFlag::Decimal);
    let (result, c, z, n, v) = if decimal {
        sbc_decimal(a, val, carry_in)
    } else {
        sbc_binary(a, val, carry_in)
    };
    sim.registers.a = result;
    set_czvn(sim, c, z, n, v);
    Ok(())
}

pub fn ora(sim: &mut Simulator, mode: Mode, extra_flag: u8) -> SimResult<()> {
    let val = sim.read_operand(mode, extra_flag != 0)?;
    sim.registers.a |= val;
    sim.update_zn(sim.registers.a);
    Ok(())
}

pub fn and(sim: &mut Simulator, mode: Mode, extra_flag: u8) -> SimResult<()> {
    let val = sim.read_operand(mode, extra_flag != 0)?;
    sim.registers.a &= val;
    sim.update_zn(sim.registers.a);
    Ok(())
}

pub fn eor(sim: &mut Simulator, mode: Mode, extra_flag: u8) -> SimResult<()> {
    let val = sim.read_operand(mode, extra_flag != 0)?;
    sim.registers.a ^= val;
    sim.update_zn(sim.registers.a);
    Ok(())
}

pub fn asl(sim: &mut Simulator, mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.modify_operand(mode, |sim, value| {
        let carry_out = value & 0x80 != 0;
        let result = value << 1;
        sim.set_flags(StatusFlag::Carry.mask(), if carry_out { StatusFlag::Carry.mask() } else { 0 });
        sim.update_zn(result);
        result
    })
}

pub fn lsr(sim: &mut Simulator, mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.modify_operand(mode, |sim, value| {
        let carry_out = value & 1 != 0;
        let result = value >> 1;
        sim.set_flags(StatusFlag::Carry.mask(), if carry_out { StatusFlag::Carry.mask() } else { 0 });
        sim.update_zn(result);
        result
    })
}

pub fn rol(sim: &mut Simulator, mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.modify_operand(mode, |sim, value| {
        let carry_in = sim.registers.is_flag_set(StatusFlag::Carry) as u16;
        let wide = ((value as u16) << 1) | carry_in;
        let carry_out = wide & 0x100 != 0;
        let result = (wide & 0xFF) as u8;
        sim.set_flags(StatusFlag::Carry.mask(), if carry_out { StatusFlag::Carry.mask() } else { 0 });
        sim.update_zn(result);
        result
    })
}

pub fn ror(sim: &mut Simulator, mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.modify_operand(mode, |sim, value| {
        let carry_in = sim.registers.is_flag_set(StatusFlag::Carry);
        let carry_out = value & 1 != 0;
        let mut result = value >> 1;
        if carry_in {
            result |= 0x80;
        }
        sim.set_flags(StatusFlag::Carry.mask(), if carry_out { StatusFlag::Carry.mask() } else { 0 });
        sim.update_zn(result);
        result
    })
}

fn compare(sim: &mut Simulator, reg: u8, val: u8) {
    let tmp: i32 = reg as i32 + 0x100 - val as i32;
    sim.update_zn((tmp & 0xFF) as u8);
    let c = tmp > 0xFF;
    sim.set_flags(StatusFlag::Carry.mask(), if c { StatusFlag::Carry.mask() } else { 0 });
}

pub fn cmp(sim: &mut Simulator, mode: Mode, extra_flag: u8) -> SimResult<()> {
    let val = sim.read_operand(mode, extra_flag != 0)?;
    compare(sim, sim.registers.a, val);
    Ok(())
}

pub fn cpx(sim: &mut Simulator, mode: Mode, extra_flag: u8) -> SimResult<()> {
    let val = sim.read_operand(mode, extra_flag != 0)?;
    compare(sim, sim.registers.x, val);
    Ok(())
}

pub fn cpy(sim: &mut Simulator, mode: Mode, extra_flag: u8) -> SimResult<()> {
    let val = sim.read_operand(mode, extra_flag != 0)?;
    compare(sim, sim.registers.y, val);
    Ok(())
}

/// `BIT` reads the target byte and sets N/V straight from its bits 7/6
/// and Z from `A AND value` -- except when the cell is `INVALID` and
/// has no callback, in which case no read error is raised and N/V/Z are
/// marked unknown instead, preserving the `BIT $xx`-as-two-byte-skip
/// idiom (see `examples/original_source/simulator/src/sim65.c`'s
/// comment on the same trick).
pub fn bit(sim: &mut Simulator, mode: Mode, _extra_flag: u8) -> SimResult<()> {
    let (addr, _) = sim.operand_address(mode, false)?;
    let status = sim.memory.status(addr);
    if status.contains(MemStatus::INVALID) && !status.contains(MemStatus::CALLBACK) {
        let mask = StatusFlag::Negative.mask() | StatusFlag::Overflow.mask() | StatusFlag::Zero.mask();
        sim.mark_flags_unknown(mask);
        return Ok(());
    }
    let value = sim.read_byte(addr)?;
    let mut val = 0u8;
    if value & 0x80 != 0 {
        val |= StatusFlag::Negative.mask();
    }
    if value & 0x40 != 0 {
        val |= StatusFlag::Overflow.mask();
    }
    if sim.registers.a & value == 0 {
        val |= StatusFlag::Zero.mask();
    }
    let mask = StatusFlag::Negative.mask() | StatusFlag::Overflow.mask() | StatusFlag::Zero.mask();
    sim.set_flags(mask, val);
    Ok(())
}

pub fn clc(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.set_flags(StatusFlag::Carry.mask(), 0);
    Ok(())
}

pub fn sec(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.set_flags(StatusFlag::Carry.mask(), StatusFlag::Carry.mask());
    Ok(())
}

pub fn cli(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.set_flags(StatusFlag::InterruptDisable.mask(), 0);
    Ok(())
}

pub fn sei(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.set_flags(StatusFlag::InterruptDisable.mask(), StatusFlag::InterruptDisable.mask());
    Ok(())
}

pub fn clv(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.set_flags(StatusFlag::Overflow.mask(), 0);
    Ok(())
}

pub fn cld(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.set_flags(StatusFlag::Decimal.mask(), 0);
    Ok(())
}

pub fn sed(sim: &mut Simulator, _mode: Mode, _extra_flag: u8) -> SimResult<()> {
    sim.set_flags(StatusFlag::Decimal.mask(), StatusFlag::Decimal.mask());
    Ok(())
}
