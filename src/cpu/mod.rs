//! The `Simulator`: register file, memory, flag-validity tracking,
//! profiler, and the fetch/decode/execute loop over the installable
//! RAM/ROM/callback address space of `memory::Memory`.

pub mod ops_jump;
pub mod ops_logical;
pub mod ops_move;
#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod test;

use std::io::BufRead;

use crate::disasm;
use crate::error::{ErrorLevel, SimError, SimResult};
use crate::labels::Labels;
use crate::memory::{AccessKind, Callback, MemStatus, Memory};
use crate::opcodes::{self, Mnemonic, Mode};
use crate::profile::{AddressProfile, Profiler};
use crate::registers::{Registers, StatusFlag};

use std::rc::Rc;

pub const STACK_PAGE: u16 = 0x0100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum DebugLevel {
    #[default]
    None,
    Messages,
    Trace,
}

/// Every flag bit, used as the mask for "mark everything unknown" after
/// reset and for BIT's INVALID-cell special case.
const ALL_FLAGS: u8 = 0xFF;

pub struct Simulator {
    pub memory: Memory,
    pub registers: Registers,
    unknown_flags: u8,
    pub cycles: u64,
    cycle_limit: Option<u64>,
    error: Option<SimError>,
    error_level: ErrorLevel,
    debug_level: DebugLevel,
    colorize_trace: bool,
    profiler: Profiler,
    labels: Labels,
}

impl Simulator {
    pub fn new() -> Simulator {
        Simulator {
            memory: Memory::new(),
            registers: Registers::new(),
            unknown_flags: ALL_FLAGS,
            cycles: 0,
            cycle_limit: None,
            error: None,
            error_level: ErrorLevel::default(),
            debug_level: DebugLevel::default(),
            colorize_trace: false,
            profiler: Profiler::new(),
            labels: Labels::new(),
        }
    }

    // -- configuration -----------------------------------------------

    pub fn set_debug_level(&mut self, level: DebugLevel) {
        self.debug_level = level;
    }

    pub fn set_error_level(&mut self, level: ErrorLevel) {
        self.error_level = level;
    }

    pub fn set_cycle_limit(&mut self, limit: Option<u64>) {
        self.cycle_limit = limit;
    }

    pub fn set_profiling(&mut self, enabled: bool) {
        self.profiler.set_enabled(enabled);
    }

    pub fn set_trace_colorize(&mut self, enabled: bool) {
        self.colorize_trace = enabled;
    }

    // -- memory installation (delegates to `Memory`) -------------------

    pub fn add_ram(&mut self, addr: u16, len: usize) {
        self.memory.define_ram(addr, len);
    }

    pub fn add_zeroed_ram(&mut self, addr: u16, len: usize) {
        self.memory.define_zeroed_ram(addr, len);
    }

    pub fn add_data_ram(&mut self, addr: u16, data: &[u8]) {
        self.memory.define_data_ram(addr, data);
    }

    pub fn add_data_rom(&mut self, addr: u16, data: &[u8]) {
        self.memory.define_data_rom(addr, data);
    }

    pub fn add_callback(&mut self, addr: u16, callback: Rc<dyn Callback>) {
        self.memory.set_callback(addr, callback);
    }

    pub fn add_callback_range(&mut self, addr: u16, len: usize, callback: Rc<dyn Callback>) {
        self.memory.set_callback_range(addr, len, callback);
    }

    pub fn get_byte(&self, addr: u16) -> Option<u8> {
        let status = self.memory.status(addr);
        if status.contains(MemStatus::UNDEF) || status.contains(MemStatus::INVALID) {
            None
        } else {
            Some(self.memory.peek(addr))
        }
    }

    pub fn get_pbyte(&self, addr: u16) -> &std::cell::Cell<u8> {
        self.memory.pbyte(addr)
    }

    // -- labels ----------------------------------------------------

    pub fn add_label(&mut self, addr: u16, name: impl Into<String>) {
        self.labels.insert(addr, name);
    }

    pub fn load_labels(&mut self, reader: impl BufRead) -> SimResult<()> {
        let parsed = Labels::parse(reader)?;
        for (addr, name) in parsed.iter() {
            self.labels.insert(*addr, name.clone());
        }
        Ok(())
    }

    pub fn label(&self, addr: u16) -> Option<&str> {
        self.labels.get(addr)
    }

    // -- diagnostics -------------------------------------------------

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn error(&self) -> Option<&SimError> {
        self.error.as_ref()
    }

    pub fn error_addr(&self) -> Option<u16> {
        self.error.as_ref().and_then(SimError::address)
    }

    pub fn profile(&self, addr: u16) -> AddressProfile {
        self.profiler.at(addr)
    }

    pub fn disassemble(&self, addr: u16) -> disasm::Disassembly {
        disasm::disassemble(&self.memory, &self.labels, addr)
    }

    pub fn print_reg(&self) -> String {
        disasm::trace_line(
            &self.memory,
            &self.labels,
            &self.registers,
            self.cycles,
            self.registers.pc,
            false,
            self.colorize_trace,
        )
    }

    // -- flags ---------------------------------------------------------

    /// `P := (P & !mask) | (val & mask)`; clears the validity bit for
    /// every flag the mask touches.
    pub fn set_flags(&mut self, mask: u8, val: u8) {
        self.registers.p = (self.registers.p & !mask) | (val & mask);
        self.unknown_flags &= !mask;
    }

    /// Reads `P & mask`, emitting a `log::warn!` diagnostic first if any
    /// masked bit is still marked unknown. The value returned is
    /// whatever `P` holds regardless -- the diagnostic is informational.
    pub fn get_flags(&mut self, mask: u8) -> u8 {
        let unknown = self.unknown_flags & mask;
        if unknown != 0 {
            log::warn!(
                "using uninitialized flags {:#04x} at PC={:#06x}",
                unknown,
                self.registers.pc
            );
        }
        self.registers.p & mask
    }

    fn mark_flags_unknown(&mut self, mask: u8) {
        self.unknown_flags |= mask;
    }

    fn update_zn(&mut self, value: u8) {
        let mut val = 0;
        if value == 0 {
            val |= StatusFlag::Zero.mask();
        }
        if value & 0x80 != 0 {
            val |= StatusFlag::Negative.mask();
        }
        self.set_flags(StatusFlag::Zero.mask() | StatusFlag::Negative.mask(), val);
    }

    // -- memory access with status/callback orchestration ---------------

    fn latch_error(&mut self, err: SimError) -> SimError {
        if self.error.is_none() {
            self.error = Some(err.clone());
        }
        err
    }

    pub fn read_byte(&mut self, address: u16) -> SimResult<u8> {
        let status = self.memory.status(address);
        if status.is_fast_read() && self.memory.is_initialized(address) {
            return Ok(self.memory.peek(address));
        }
        if status.contains(MemStatus::CALLBACK) {
            if let Some(cb) = self.memory.take_callback(address) {
                let regs = self.registers;
                let value = cb.call(self, &regs, address, AccessKind::Read);
                return match value {
                    Ok(v) => {
                        self.memory.poke(address, v);
                        Ok(v)
                    }
                    Err(e) => Err(self.latch_error(e)),
                };
            }
        }
        if status.contains(MemStatus::UNDEF) {
            return Err(self.latch_error(SimError::ReadUndef(address)));
        }
        if status.contains(MemStatus::INVALID) {
            log::debug!("read of uninitialized memory at {:#06x}", address);
            self.memory.clear_invalid(address);
            return Err(self.latch_error(SimError::ReadUninit(address)));
        }
        Ok(self.memory.peek(address))
    }

    pub fn write_byte(&mut self, address: u16, value: u8) -> SimResult<()> {
        let status = self.memory.status(address);
        if status.is_fast_write() {
            self.memory.poke(address, value);
            return Ok(());
        }
        if status.contains(MemStatus::INVALID)
            && !status.contains(MemStatus::UNDEF)
            && !status.contains(MemStatus::ROM)
        {
            self.memory.clear_invalid(address);
            if status.contains(MemStatus::CALLBACK) {
                if let Some(cb) = self.memory.take_callback(address) {
                    let regs = self.registers;
                    cb.call(self, &regs, address, AccessKind::Write(value))
                        .map_err(|e| self.latch_error(e))?;
                }
            }
            self.memory.poke(address, value);
            return Ok(());
        }
        if status.contains(MemStatus::CALLBACK) {
            let cb = self.memory.take_callback(address);
            if let Some(cb) = cb {
                let regs = self.registers;
                cb.call(self, &regs, address, AccessKind::Write(value))
                    .map_err(|e| self.latch_error(e))?;
            }
            self.memory.poke(address, value);
            return Ok(());
        }
        if status.contains(MemStatus::UNDEF) {
            return Err(self.latch_error(SimError::WriteUndef(address)));
        }
        if status.contains(MemStatus::ROM) {
            return Err(self.latch_error(SimError::WriteRom(address)));
        }
        self.memory.poke(address, value);
        Ok(())
    }

    /// Fetches a byte at `address` for execution (opcode or operand):
    /// bypasses read callbacks, only invokes the dedicated execute slot
    /// (handled separately in `execute_one`), and treats undefined or
    /// never-written cells as fatal `ExecUndef`/`ExecUninit`.
    fn fetch_byte(&mut self, address: u16) -> SimResult<u8> {
        let status = self.memory.status(address);
        if status.contains(MemStatus::UNDEF) {
            return Err(self.latch_error(SimError::ExecUndef(address)));
        }
        if status.contains(MemStatus::INVALID) {
            if status.contains(MemStatus::CALLBACK) {
                if let Some(cb) = self.memory.take_callback(address) {
                    let regs = self.registers;
                    let value = cb
                        .call(self, &regs, address, AccessKind::Exec)
                        .map_err(|e| self.latch_error(e))?;
                    self.memory.poke(address, value);
                    self.memory.clear_invalid(address);
                    return Ok(value);
                }
            }
            return Err(self.latch_error(SimError::ExecUninit(address)));
        }
        if status.contains(MemStatus::CALLBACK) && !self.memory.is_initialized(address) {
            if let Some(cb) = self.memory.take_callback(address) {
                let regs = self.registers;
                let value = cb
                    .call(self, &regs, address, AccessKind::Exec)
                    .map_err(|e| self.latch_error(e))?;
                self.memory.poke(address, value);
                return Ok(value);
            }
        }
        Ok(self.memory.peek(address))
    }

    // -- PC-relative fetch helpers --

    pub fn peek_u8(&mut self) -> SimResult<u8> {
        self.fetch_byte(self.registers.pc)
    }

    pub fn next_u8(&mut self) -> SimResult<u8> {
        let pc = self.registers.pc;
        let byte = self.fetch_byte(pc)?;
        self.registers.pc = pc.wrapping_add(1);
        Ok(byte)
    }

    pub fn next_u16(&mut self) -> SimResult<u16> {
        let lo = self.next_u8()?;
        let hi = self.next_u8()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    // -- stack -----------------------------------------------------------

    pub fn push_u8(&mut self, value: u8) -> SimResult<()> {
        let addr = STACK_PAGE | self.registers.s as u16;
        self.write_byte(addr, value)?;
        self.registers.s = self.registers.s.wrapping_sub(1);
        Ok(())
    }

    pub fn pull_u8(&mut self) -> SimResult<u8> {
        self.registers.s = self.registers.s.wrapping_add(1);
        let addr = STACK_PAGE | self.registers.s as u16;
        self.read_byte(addr)
    }

    pub fn push_u16(&mut self, value: u16) -> SimResult<()> {
        let [lo, hi] = value.to_le_bytes();
        self.push_u8(hi)?;
        self.push_u8(lo)?;
        Ok(())
    }

    pub fn pull_u16(&mut self) -> SimResult<u16> {
        let lo = self.pull_u8()?;
        let hi = self.pull_u8()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    // -- addressing-mode helper -------------------------------------------

    fn page_crossed(a: u16, b: u16) -> bool {
        (a & 0xFF00) != (b & 0xFF00)
    }

    /// Computes the effective address for every mode that has one
    /// (`Implied`/`RegisterA` return `(0, false)` and are never actually
    /// consulted by their callers). `charge_page_cross` adds the
    /// page-cross cycle immediately for indexed-read modes; branch and
    /// store/RMW callers pass `false` and account for the cycle
    /// themselves.
    fn operand_address(&mut self, mode: Mode, charge_page_cross: bool) -> SimResult<(u16, bool)> {
        Ok(match mode {
            Mode::Implied | Mode::RegisterA => (0, false),
            Mode::Immediate => {
                let addr = self.registers.pc;
                self.registers.pc = self.registers.pc.wrapping_add(1);
                (addr, false)
            }
            Mode::ZeroPage => (self.next_u8()? as u16, false),
            Mode::ZeroPageX => {
                // 6502 bug preserved: zero-page index wraps within the page.
                (self.next_u8()?.wrapping_add(self.registers.x) as u16, false)
            }
            Mode::ZeroPageY => {
                (self.next_u8()?.wrapping_add(self.registers.y) as u16, false)
            }
            Mode::Absolute => (self.next_u16()?, false),
            Mode::AbsoluteIndexedX => {
                let base = self.next_u16()?;
                let addr = base.wrapping_add(self.registers.x as u16);
                let crossed = Self::page_crossed(base, addr);
                if crossed && charge_page_cross {
                    self.cycles += 1;
                }
                (addr, crossed)
            }
            Mode::AbsoluteIndexedY => {
                let base = self.next_u16()?;
                let addr = base.wrapping_add(self.registers.y as u16);
                let crossed = Self::page_crossed(base, addr);
                if crossed && charge_page_cross {
                    self.cycles += 1;
                }
                (addr, crossed)
            }
            Mode::Indirect => {
                let ptr = self.next_u16()?;
                let lo = self.read_byte(ptr)?;
                let hi = self.read_byte(ptr.wrapping_add(1))?;
                (u16::from_le_bytes([lo, hi]), false)
            }
            Mode::IndirectX => {
                let zp = self.next_u8()?.wrapping_add(self.registers.x);
                let lo = self.read_byte(zp as u16)?;
                let hi = self.read_byte(zp.wrapping_add(1) as u16)?;
                (u16::from_le_bytes([lo, hi]), false)
            }
            Mode::IndirectY => {
                let zp = self.next_u8()?;
                let lo = self.read_byte(zp as u16)?;
                let hi = self.read_byte(zp.wrapping_add(1) as u16)?;
                let base = u16::from_le_bytes([lo, hi]);
                let addr = base.wrapping_add(self.registers.y as u16);
                let crossed = Self::page_crossed(base, addr);
                if crossed && charge_page_cross {
                    self.cycles += 1;
                }
                (addr, crossed)
            }
            Mode::Relative => {
                let offset = self.next_u8()? as i8 as i32;
                let base = self.registers.pc;
                let target = (base as i32 + offset) as u16;
                (target, Self::page_crossed(base, target))
            }
        })
    }

    /// Reads the operand value for a "read" instruction (ORA, AND, LDA,
    /// ADC, CMP, ...): register-A and immediate modes read directly,
    /// every other mode resolves an address first.
    fn read_operand(&mut self, mode: Mode, charge_page_cross: bool) -> SimResult<u8> {
        match mode {
            Mode::RegisterA => Ok(self.registers.a),
            Mode::Immediate => self.next_u8(),
            _ => {
                let (addr, _) = self.operand_address(mode, charge_page_cross)?;
                self.read_byte(addr)
            }
        }
    }

    /// Writes a value to the operand location of a "store" instruction
    /// (STA/STX/STY). Store addressing never charges a conditional
    /// page-cross cycle; the fixed cost is already in `CYCLES_TABLE`.
    fn write_operand(&mut self, mode: Mode, value: u8) -> SimResult<()> {
        let (addr, _) = self.operand_address(mode, false)?;
        self.write_byte(addr, value)
    }

    /// Applies `f` to the operand of a read-modify-write instruction
    /// (ASL/LSR/ROL/ROR/INC/DEC): accumulator mode mutates `A` directly,
    /// every other mode reads the byte, transforms it, and writes it
    /// back to the same address.
    fn modify_operand(&mut self, mode: Mode, f: impl FnOnce(&mut Simulator, u8) -> u8) -> SimResult<()> {
        if mode == Mode::RegisterA {
            let value = f(self, self.registers.a);
            self.registers.a = value;
            return Ok(());
        }
        let (addr, _) = self.operand_address(mode, false)?;
        let value = self.read_byte(addr)?;
        let result = f(self, value);
        self.write_byte(addr, result)
    }

    // -- dispatch ----------------------------------------------------

    fn dispatch(&mut self, mnemonic: Mnemonic, mode: Mode, extra_flag: u8) -> SimResult<()> {
        use ops_jump as j;
        use ops_logical as l;
        use ops_move as m;
        use Mnemonic::*;
        match mnemonic {
            Brk => j::brk(self, mode, extra_flag),
            Ora => l::ora(self, mode, extra_flag),
            Asl => l::asl(self, mode, extra_flag),
            Php => m::php(self, mode, extra_flag),
            Bpl => j::bpl(self, mode, extra_flag),
            Clc => l::clc(self, mode, extra_flag),
            Jsr => j::jsr(self, mode, extra_flag),
            And => l::and(self, mode, extra_flag),
            Bit => l::bit(self, mode, extra_flag),
            Rol => l::rol(self, mode, extra_flag),
            Plp => m::plp(self, mode, extra_flag),
            Bmi => j::bmi(self, mode, extra_flag),
            Sec => l::sec(self, mode, extra_flag),
            Rti => j::rti(self, mode, extra_flag),
            Eor => l::eor(self, mode, extra_flag),
            Lsr => l::lsr(self, mode, extra_flag),
            Pha => m::pha(self, mode, extra_flag),
            Jmp => j::jmp(self, mode, extra_flag),
            Bvc => j::bvc(self, mode, extra_flag),
            Cli => l::cli(self, mode, extra_flag),
            Rts => j::rts(self, mode, extra_flag),
            Adc => l::adc(self, mode, extra_flag),
            Ror => l::ror(self, mode, extra_flag),
            Pla => m::pla(self, mode, extra_flag),
            Bvs => j::bvs(self, mode, extra_flag),
            Sei => l::sei(self, mode, extra_flag),
            Sta => m::sta(self, mode, extra_flag),
            Sty => m::sty(self, mode, extra_flag),
            Stx => m::stx(self, mode, extra_flag),
            Dey => m::dey(self, mode, extra_flag),
            Txa => m::txa(self, mode, extra_flag),
            Bcc => j::bcc(self, mode, extra_flag),
            Tya => m::tya(self, mode, extra_flag),
            Txs => m::txs(self, mode, extra_flag),
            Ldy => m::ldy(self, mode, extra_flag),
            Lda => m::lda(self, mode, extra_flag),
            Ldx => m::ldx(self, mode, extra_flag),
            Tay => m::tay(self, mode, extra_flag),
            Tax => m::tax(self, mode, extra_flag),
            Bcs => j::bcs(self, mode, extra_flag),
            Clv => l::clv(self, mode, extra_flag),
            Tsx => m::tsx(self, mode, extra_flag),
            Cpy => l::cpy(self, mode, extra_flag),
            Cmp => l::cmp(self, mode, extra_flag),
            Dec => m::dec(self, mode, extra_flag),
            Iny => m::iny(self, mode, extra_flag),
            Dex => m::dex(self, mode, extra_flag),
            Bne => j::bne(self, mode, extra_flag),
            Cld => l::cld(self, mode, extra_flag),
            Cpx => l::cpx(self, mode, extra_flag),
            Sbc => l::sbc(self, mode, extra_flag),
            Inc => m::inc(self, mode, extra_flag),
            Inx => m::inx(self, mode, extra_flag),
            Nop => m::nop(self, mode, extra_flag),
            Beq => j::beq(self, mode, extra_flag),
            Sed => l::sed(self, mode, extra_flag),
        }
    }

    // -- run loop ----------------------------------------------------

    fn is_exit_fatal(&self, err: &SimError) -> bool {
        use SimError::*;
        match self.error_level {
            ErrorLevel::None => err.is_fatal(),
            ErrorLevel::Memory => {
                err.is_fatal() || matches!(err, ExecUninit(_) | ReadUndef(_) | WriteUndef(_))
            }
            ErrorLevel::Full => true, // every variant exits
        }
    }

    fn emit_trace(&mut self, pc: u16) {
        let line = disasm::trace_line(
            &self.memory,
            &self.labels,
            &self.registers,
            self.cycles,
            pc,
            false,
            self.colorize_trace,
        );
        log::trace!("{}", line);
        if self.debug_level == DebugLevel::Trace {
            println!("{}", line);
        }
    }

    fn execute_one(&mut self) -> SimResult<()> {
        let pc = self.registers.pc;

        if self.memory.status(pc).contains(MemStatus::CALLBACK) {
            if let Some(cb) = self.memory.take_callback(pc) {
                let regs = self.registers;
                cb.call(self, &regs, pc, AccessKind::Exec)
                    .map_err(|e| self.latch_error(e))?;
            }
        }

        if let Some(limit) = self.cycle_limit {
            if self.cycles >= limit {
                return Err(self.latch_error(SimError::CycleLimit));
            }
        }

        if self.debug_level == DebugLevel::Trace {
            self.emit_trace(pc);
        }

        let opcode = self.next_u8()?;
        let mode = opcodes::ADDRESSING_MODE_TABLE[opcode as usize];
        let base_cycles = opcodes::CYCLES_TABLE[opcode as usize];
        let extra_flag = opcodes::EXTRA_CYCLES_TABLE[opcode as usize];
        self.cycles += base_cycles as u64;
        let cycles_before = self.cycles;

        let mnemonic = match opcodes::documented_mnemonic(opcode) {
            Some(m) => m,
            None => return Err(self.latch_error(SimError::InvalidIns(opcode, pc))),
        };

        self.dispatch(mnemonic, mode, extra_flag)?;

        if self.profiler.is_enabled() {
            let delta = (self.cycles - cycles_before) as u8;
            self.profiler.record_instruction(pc, base_cycles + delta, delta);
        }
        Ok(())
    }

    /// Steps the simulator until a fatal error (per the current error
    /// level) is latched, then returns it. Non-fatal errors are logged
    /// and cleared so execution continues.
    fn run_loop(&mut self) -> SimError {
        loop {
            if let Err(err) = self.execute_one() {
                if self.is_exit_fatal(&err) {
                    return err;
                }
                log::warn!("{} (continuing)", err);
                self.error = None;
            }
        }
    }

    /// Runs from `start_pc` until a fatal error is latched, then returns it.
    pub fn run(&mut self, start_pc: u16) -> SimError {
        self.registers.pc = start_pc;
        self.error = None;
        self.run_loop()
    }

    /// `call` semantics: install a one-shot execute callback at
    /// `0x0000` that raises `CallRet`, push a synthetic return address
    /// of `0x0000`, jump to `start_pc`, and run until that callback
    /// fires (treated as success) or any other error propagates.
    pub fn call(&mut self, start_pc: u16) -> SimResult<()> {
        struct ReturnMarker;
        impl Callback for ReturnMarker {
            fn call(
                &self,
                _sim: &mut Simulator,
                _regs: &Registers,
                _address: u16,
                _kind: AccessKind,
            ) -> SimResult<u8> {
                Err(SimError::CallRet)
            }
        }

        let had_callback = self.memory.status(0x0000).contains(MemStatus::CALLBACK);
        let previous = self.memory.take_callback(0x0000);
        self.memory.set_callback(0x0000, Rc::new(ReturnMarker));

        let saved_pc = self.registers.pc;
        self.error = None;
        self.push_u16(0x0000)?;
        self.registers.pc = start_pc;

        let result = self.run_loop();

        if had_callback {
            if let Some(cb) = previous {
                self.memory.set_callback(0x0000, cb);
            }
        } else {
            self.memory.clear_callback(0x0000);
        }
        self.registers.pc = saved_pc;

        match result {
            SimError::CallRet => {
                self.error = None;
                Ok(())
            }
            other => Err(other),
        }
    }
}

impl Default for Simulator {
    fn default() -> Simulator {
        Simulator::new()
    }
}
