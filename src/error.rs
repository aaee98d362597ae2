//! Error taxonomy, grounded on `sim65.h`'s `sim65_error` enum and ported to
//! `thiserror` the way `amoljassal-sis-kernel-showcase` wires its error types.

use thiserror::Error;

/// Every distinct condition the simulator can latch as "the" error for a
/// run. Matches the original C `sim65_error` values one for one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("execution of an undefined memory location at {0:#06x}")]
    ExecUndef(u16),

    #[error("execution of an uninitialized memory location at {0:#06x}")]
    ExecUninit(u16),

    #[error("read from an undefined memory location at {0:#06x}")]
    ReadUndef(u16),

    #[error("read from an uninitialized memory location at {0:#06x}")]
    ReadUninit(u16),

    #[error("write to an undefined memory location at {0:#06x}")]
    WriteUndef(u16),

    #[error("write to a ROM memory location at {0:#06x}")]
    WriteRom(u16),

    #[error("BRK instruction executed at {0:#06x}")]
    Break(u16),

    #[error("invalid/undocumented instruction {0:#04x} at {1:#06x}")]
    InvalidIns(u8, u16),

    #[error("call returned past the stack depth it started at")]
    CallRet,

    #[error("instruction cycle limit reached")]
    CycleLimit,

    #[error("user callback reported an error: {0}")]
    User(String),
}

impl SimError {
    /// Errors that abort the run regardless of `ErrorLevel` -- these are
    /// the ones `ErrorLevel::None` already exits on. `ErrorLevel::Memory`
    /// additionally exits on `ExecUninit`/`ReadUndef`/`WriteUndef`, and
    /// `ErrorLevel::Full` additionally exits on `ReadUninit`/`WriteRom`;
    /// see `cpu::Simulator::is_exit_fatal` for the full policy.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SimError::Break(_)
                | SimError::ExecUndef(_)
                | SimError::InvalidIns(_, _)
                | SimError::CallRet
                | SimError::CycleLimit
                | SimError::User(_)
        )
    }

    /// The PC or target address the error refers to, when it has one.
    pub fn address(&self) -> Option<u16> {
        match self {
            SimError::ExecUndef(a)
            | SimError::ExecUninit(a)
            | SimError::ReadUndef(a)
            | SimError::ReadUninit(a)
            | SimError::WriteUndef(a)
            | SimError::WriteRom(a)
            | SimError::Break(a) => Some(*a),
            SimError::InvalidIns(_, a) => Some(*a),
            SimError::CallRet | SimError::CycleLimit | SimError::User(_) => None,
        }
    }
}

/// How strict the simulator should be about memory-state violations.
///
/// Grounded on `sim65.h`'s `SIM65_ERR_*` constants passed to
/// `sim65_set_error_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ErrorLevel {
    /// Ignore memory-state diagnostics entirely; only fatal execution
    /// errors (bad opcode fetch, cycle limit, user error) are latched.
    None,
    /// Latch memory-state errors too, but only the first one seen.
    #[default]
    Memory,
    /// Same as `Memory`; kept distinct so callers can express "report
    /// everything" without conflating it with the default.
    Full,
}

pub type SimResult<T> = Result<T, SimError>;
