//! Per-address memory typing and the callback hook table.
//!
//! Ported from `sim65.c`'s `ms_undef`/`ms_rom`/`ms_invalid`/`ms_callback`
//! bit layout. The original packs four independent bits per address so a
//! byte can be simultaneously e.g. ROM and callback-backed; we keep that
//! shape as a small bitflag-style `MemStatus` rather than collapsing it
//! into an enum, since the combinations really are independent.
//!
//! This module only holds data. The read/write/fetch *orchestration*
//! (status checks, callback dispatch, error latching) lives on
//! `Simulator` in `cpu::mod`, because a callback needs `&mut Simulator`
//! -- including, transitively, this very table -- so the call can't
//! happen while `Memory` itself is borrowed. `Simulator` takes the
//! callback `Rc` out of its slot before invoking it and puts it back
//! afterwards.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::SimError;
use crate::registers::Registers;

/// Per-address status bits. Mirrors `ms_undef = 1`, `ms_rom = 2`,
/// `ms_invalid = 4`, `ms_callback = 8` from the original simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemStatus(u8);

impl MemStatus {
    pub const UNDEF: MemStatus = MemStatus(1);
    pub const ROM: MemStatus = MemStatus(2);
    pub const INVALID: MemStatus = MemStatus(4);
    pub const CALLBACK: MemStatus = MemStatus(8);

    pub fn contains(self, other: MemStatus) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: MemStatus) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: MemStatus) {
        self.0 &= !other.0;
    }

    /// The fast path for reads: no bit set other than ROM.
    pub fn is_fast_read(self) -> bool {
        self.0 & !MemStatus::ROM.0 == 0
    }

    /// The fast path for writes: plain defined RAM, nothing else.
    pub fn is_fast_write(self) -> bool {
        self.0 == 0
    }

    /// The fast path for execute fetches: no bit set other than ROM or
    /// CALLBACK (the callback check itself still runs, but status
    /// decoding skips the UNDEF/INVALID branches).
    pub fn is_fast_exec(self) -> bool {
        self.0 & !(MemStatus::ROM.0 | MemStatus::CALLBACK.0) == 0
    }
}

impl std::ops::BitOr for MemStatus {
    type Output = MemStatus;

    fn bitor(self, rhs: MemStatus) -> MemStatus {
        MemStatus(self.0 | rhs.0)
    }
}

/// What kind of access triggered a callback or a memory-state check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write(u8),
    Exec,
}

/// Host-supplied hook for one memory address.
///
/// The callback receives `&mut Simulator` directly (defined in `cpu::mod`)
/// so it can read or write any part of the machine, not just the one
/// memory cell it was installed on.
pub trait Callback {
    fn call(
        &self,
        sim: &mut crate::cpu::Simulator,
        regs: &Registers,
        address: u16,
        kind: AccessKind,
    ) -> Result<u8, SimError>;
}

impl<F> Callback for F
where
    F: Fn(&mut crate::cpu::Simulator, &Registers, u16, AccessKind) -> Result<u8, SimError>,
{
    fn call(
        &self,
        sim: &mut crate::cpu::Simulator,
        regs: &Registers,
        address: u16,
        kind: AccessKind,
    ) -> Result<u8, SimError> {
        (self)(sim, regs, address, kind)
    }
}

/// The full 64 KiB address space plus its parallel status/callback/"has
/// this byte ever been written" tables.
///
/// `data` and `status` are fixed-size arrays rather than a `Vec`: every
/// address is valid to index and there is no reallocation concern.
pub struct Memory {
    data: Box<[Cell<u8>; 0x1_0000]>,
    status: Box<[MemStatus; 0x1_0000]>,
    /// Per-address "has a value actually been stored here" bit, distinct
    /// from `status`'s UNDEF/INVALID/ROM/CALLBACK classification. Reading
    /// an address that is defined-but-never-written raises `ReadUninit`.
    initialized: Box<[bool; 0x1_0000]>,
    callbacks: Box<[Option<Rc<dyn Callback>>; 0x1_0000]>,
}

impl Memory {
    pub fn new() -> Memory {
        let initial_status = MemStatus::UNDEF | MemStatus::INVALID;
        Memory {
            data: Box::new(std::array::from_fn(|_| Cell::new(0u8))),
            status: Box::new([initial_status; 0x1_0000]),
            initialized: Box::new([false; 0x1_0000]),
            callbacks: Box::new(std::array::from_fn(|_| None)),
        }
    }

    pub fn status(&self, address: u16) -> MemStatus {
        self.status[address as usize]
    }

    pub fn is_initialized(&self, address: u16) -> bool {
        self.initialized[address as usize]
    }

    /// Raw peek/poke that bypasses status checks and callbacks entirely.
    /// Used by the disassembler/trace printer (which must show bytes
    /// without side effects) and by the CPU's checked accessors once
    /// they've already decided the access is legal.
    pub fn peek(&self, address: u16) -> u8 {
        self.data[address as usize].get()
    }

    pub fn poke(&mut self, address: u16, value: u8) {
        self.data[address as usize].set(value);
        self.initialized[address as usize] = true;
    }

    /// A stable handle into the value array for `address`, shared and
    /// interior-mutable, for host devices that shadow CPU-visible RAM
    /// (e.g. a framebuffer) without going through the callback ABI.
    pub fn pbyte(&self, address: u16) -> &Cell<u8> {
        &self.data[address as usize]
    }

    pub fn clear_invalid(&mut self, address: u16) {
        self.status[address as usize].remove(MemStatus::INVALID);
    }

    pub fn take_callback(&mut self, address: u16) -> Option<Rc<dyn Callback>> {
        self.callbacks[address as usize].clone()
    }

    pub fn define_ram(&mut self, start: u16, len: usize) {
        for offset in 0..len {
            let addr = start.wrapping_add(offset as u16) as usize;
            self.status[addr].remove(MemStatus::UNDEF);
        }
    }

    pub fn define_zeroed_ram(&mut self, start: u16, len: usize) {
        for offset in 0..len {
            let addr = start.wrapping_add(offset as u16) as usize;
            self.status[addr].remove(MemStatus::UNDEF);
            self.status[addr].remove(MemStatus::INVALID);
            self.data[addr].set(0);
            self.initialized[addr] = true;
        }
    }

    pub fn define_data_ram(&mut self, start: u16, data: &[u8]) {
        for (offset, byte) in data.iter().enumerate() {
            let addr = start.wrapping_add(offset as u16) as usize;
            self.status[addr].remove(MemStatus::UNDEF);
            self.status[addr].remove(MemStatus::INVALID);
            self.data[addr].set(*byte);
            self.initialized[addr] = true;
        }
    }

    pub fn define_data_rom(&mut self, start: u16, data: &[u8]) {
        for (offset, byte) in data.iter().enumerate() {
            let addr = start.wrapping_add(offset as u16) as usize;
            self.status[addr].remove(MemStatus::UNDEF);
            self.status[addr].remove(MemStatus::INVALID);
            self.status[addr].insert(MemStatus::ROM);
            self.data[addr].set(*byte);
            self.initialized[addr] = true;
        }
    }

    pub fn set_callback(&mut self, address: u16, callback: Rc<dyn Callback>) {
        self.status[address as usize].insert(MemStatus::CALLBACK);
        self.callbacks[address as usize] = Some(callback);
    }

    /// Removes any callback installed at `address`, clearing the
    /// CALLBACK status bit. Used to undo `Simulator::call`'s one-shot
    /// return marker when the address had no callback beforehand.
    pub fn clear_callback(&mut self, address: u16) {
        self.status[address as usize].remove(MemStatus::CALLBACK);
        self.callbacks[address as usize] = None;
    }

    pub fn set_callback_range(&mut self, start: u16, len: usize, callback: Rc<dyn Callback>) {
        for offset in 0..len {
            let addr = start.wrapping_add(offset as u16);
            self.set_callback(addr, Rc::clone(&callback));
        }
    }
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new()
    }
}
