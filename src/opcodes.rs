//! The 256-entry opcode matrix: addressing mode, base cycle cost, extra
//! (page-cross/branch) cycle flag, mnemonic text, and instruction length
//! per opcode byte.
//!
//! `Mode::Implied` covers both true implied-addressing opcodes and the
//! no-operand illegal opcodes, since every opcode in that bucket really
//! does take zero operand bytes. `EXTRA_CYCLES_TABLE` is computed from
//! the actual page-cross-sensitive opcode set below.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Implied,
    RegisterA,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteIndexedX,
    AbsoluteIndexedY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

impl Mode {
    /// Number of bytes the instruction occupies, including the opcode
    /// byte itself.
    pub fn length(self) -> u8 {
        match self {
            Mode::Implied | Mode::RegisterA => 1,
            Mode::Immediate
            | Mode::ZeroPage
            | Mode::ZeroPageX
            | Mode::ZeroPageY
            | Mode::IndirectX
            | Mode::IndirectY
            | Mode::Relative => 2,
            Mode::Absolute | Mode::AbsoluteIndexedX | Mode::AbsoluteIndexedY | Mode::Indirect => 3,
        }
    }
}

/// The 56 documented 6502 mnemonics. Undocumented opcodes have no
/// `Mnemonic` variant at all -- `documented_mnemonic` returns `None` for
/// them and the dispatcher latches `InvalidIns` rather than trying to
/// name a handler function for each of the 105 illegal opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Brk, Ora, Asl, Php, Bpl, Clc, Jsr, And, Bit, Rol, Plp, Bmi, Sec, Rti, Eor, Lsr,
    Pha, Jmp, Bvc, Cli, Rts, Adc, Ror, Pla, Bvs, Sei, Sta, Sty, Stx, Dey, Txa, Bcc,
    Tya, Txs, Ldy, Lda, Ldx, Tay, Tax, Bcs, Clv, Tsx, Cpy, Cmp, Dec, Iny, Dex, Bne,
    Cld, Cpx, Sbc, Inc, Inx, Nop, Beq, Sed,
}

pub const CYCLES_TABLE: [u8; 256] = [
    7, 6, 0, 8, 3, 3, 5, 5, 3, 2, 2, 2, 4, 4, 6, 6, 2, 5, 0, 8, 4, 4, 6, 6, 2, 4, 2, 7,
    4, 4, 7, 7, 6, 6, 0, 8, 3, 3, 5, 5, 4, 2, 2, 2, 4, 4, 6, 6, 2, 5, 0, 8, 4, 4, 6, 6,
    2, 4, 2, 7, 4, 4, 7, 7, 6, 6, 0, 8, 3, 3, 5, 5, 3, 2, 2, 2, 3, 4, 6, 6, 2, 5, 0, 8,
    4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, 6, 6, 0, 8, 3, 3, 5, 5, 4, 2, 2, 2, 5, 4, 6, 6,
    2, 5, 0, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7, 2, 6, 2, 6, 3, 3, 3, 3, 2, 2, 2, 2,
    4, 4, 4, 4, 2, 6, 0, 6, 4, 4, 4, 4, 2, 5, 2, 5, 5, 5, 5, 5, 2, 6, 2, 6, 3, 3, 3, 3,
    2, 2, 2, 2, 4, 4, 4, 4, 2, 5, 0, 5, 4, 4, 4, 4, 2, 4, 2, 4, 4, 4, 4, 4, 2, 6, 2, 8,
    3, 3, 5, 5, 2, 2, 2, 2, 4, 4, 6, 6, 2, 5, 0, 8, 4, 4, 6, 6, 2, 4, 2, 7, 4, 4, 7, 7,
    2, 6, 2, 8, 3, 3, 5, 5, 2, 2, 2, 2, 4, 4, 6, 6, 2, 5, 0, 8, 4, 4, 6, 6, 2, 4, 2, 7,
    4, 4, 7, 7,
];

#[rustfmt::skip]
pub const ADDRESSING_MODE_TABLE: [Mode; 256] = [
    Mode::Implied, Mode::IndirectX, Mode::Implied, Mode::IndirectX, Mode::ZeroPage, Mode::ZeroPage, Mode::ZeroPage, Mode::ZeroPage,
    Mode::Implied, Mode::Immediate, Mode::RegisterA, Mode::Immediate, Mode::Absolute, Mode::Absolute, Mode::Absolute, Mode::Absolute,
    Mode::Relative, Mode::IndirectY, Mode::Implied, Mode::IndirectY, Mode::ZeroPageX, Mode::ZeroPageX, Mode::ZeroPageX, Mode::ZeroPageX,
    Mode::Implied, Mode::AbsoluteIndexedY, Mode::Implied, Mode::AbsoluteIndexedY, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX,
    Mode::Absolute, Mode::IndirectX, Mode::Implied, Mode::IndirectX, Mode::ZeroPage, Mode::ZeroPage, Mode::ZeroPage, Mode::ZeroPage,
    Mode::Implied, Mode::Immediate, Mode::RegisterA, Mode::Immediate, Mode::Absolute, Mode::Absolute, Mode::Absolute, Mode::Absolute,
    Mode::Relative, Mode::IndirectY, Mode::Implied, Mode::IndirectY, Mode::ZeroPageX, Mode::ZeroPageX, Mode::ZeroPageX, Mode::ZeroPageX,
    Mode::Implied, Mode::AbsoluteIndexedY, Mode::Implied, Mode::AbsoluteIndexedY, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX,
    Mode::Implied, Mode::IndirectX, Mode::Implied, Mode::IndirectX, Mode::ZeroPage, Mode::ZeroPage, Mode::ZeroPage, Mode::ZeroPage,
    Mode::Implied, Mode::Immediate, Mode::RegisterA, Mode::Immediate, Mode::Absolute, Mode::Absolute, Mode::Absolute, Mode::Absolute,
    Mode::Relative, Mode::IndirectY, Mode::Implied, Mode::IndirectY, Mode::ZeroPageX, Mode::ZeroPageX, Mode::ZeroPageX, Mode::ZeroPageX,
    Mode::Implied, Mode::AbsoluteIndexedY, Mode::Implied, Mode::AbsoluteIndexedY, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX,
    Mode::Implied, Mode::IndirectX, Mode::Implied, Mode::IndirectX, Mode::ZeroPage, Mode::ZeroPage, Mode::ZeroPage, Mode::ZeroPage,
    Mode::Implied, Mode::Immediate, Mode::RegisterA, Mode::Immediate, Mode::Indirect, Mode::Absolute, Mode::Absolute, Mode::Absolute,
    Mode::Relative, Mode::IndirectY, Mode::Implied, Mode::IndirectY, Mode::ZeroPageX, Mode::ZeroPageX, Mode::ZeroPageX, Mode::ZeroPageX,
    Mode::Implied, Mode::AbsoluteIndexedY, Mode::Implied, Mode::AbsoluteIndexedY, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX,
    Mode::Immediate, Mode::IndirectX, Mode::Immediate, Mode::IndirectX, Mode::ZeroPage, Mode::ZeroPage, Mode::ZeroPage, Mode::ZeroPage,
    Mode::Implied, Mode::Immediate, Mode::Implied, Mode::Immediate, Mode::Absolute, Mode::Absolute, Mode::Absolute, Mode::Absolute,
    Mode::Relative, Mode::IndirectY, Mode::Implied, Mode::IndirectY, Mode::ZeroPageX, Mode::ZeroPageX, Mode::ZeroPageY, Mode::ZeroPageY,
    Mode::Implied, Mode::AbsoluteIndexedY, Mode::Implied, Mode::AbsoluteIndexedY, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedY, Mode::AbsoluteIndexedY,
    Mode::Immediate, Mode::IndirectX, Mode::Immediate, Mode::IndirectX, Mode::ZeroPage, Mode::ZeroPage, Mode::ZeroPage, Mode::ZeroPage,
    Mode::Implied, Mode::Immediate, Mode::Implied, Mode::Immediate, Mode::Absolute, Mode::Absolute, Mode::Absolute, Mode::Absolute,
    Mode::Relative, Mode::IndirectY, Mode::Implied, Mode::IndirectY, Mode::ZeroPageX, Mode::ZeroPageX, Mode::ZeroPageY, Mode::ZeroPageY,
    Mode::Implied, Mode::AbsoluteIndexedY, Mode::Implied, Mode::AbsoluteIndexedY, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedY, Mode::AbsoluteIndexedY,
    Mode::Immediate, Mode::IndirectX, Mode::Immediate, Mode::IndirectX, Mode::ZeroPage, Mode::ZeroPage, Mode::ZeroPage, Mode::ZeroPage,
    Mode::Implied, Mode::Immediate, Mode::Implied, Mode::Immediate, Mode::Absolute, Mode::Absolute, Mode::Absolute, Mode::Absolute,
    Mode::Relative, Mode::IndirectY, Mode::Implied, Mode::IndirectY, Mode::ZeroPageX, Mode::ZeroPageX, Mode::ZeroPageX, Mode::ZeroPageX,
    Mode::Implied, Mode::AbsoluteIndexedY, Mode::Implied, Mode::AbsoluteIndexedY, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX,
    Mode::Immediate, Mode::IndirectX, Mode::Immediate, Mode::IndirectX, Mode::ZeroPage, Mode::ZeroPage, Mode::ZeroPage, Mode::ZeroPage,
    Mode::Implied, Mode::Immediate, Mode::Implied, Mode::Immediate, Mode::Absolute, Mode::Absolute, Mode::Absolute, Mode::Absolute,
    Mode::Relative, Mode::IndirectY, Mode::Implied, Mode::IndirectY, Mode::ZeroPageX, Mode::ZeroPageX, Mode::ZeroPageX, Mode::ZeroPageX,
    Mode::Implied, Mode::AbsoluteIndexedY, Mode::Implied, Mode::AbsoluteIndexedY, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX, Mode::AbsoluteIndexedX,
];

#[rustfmt::skip]
pub const OPCODE_STRING_TABLE: [&str; 256] = [
    "brk", "ora", "kil", "slo", "nop", "ora", "asl", "slo", "php", "ora", "asl", "anc",
    "nop", "ora", "asl", "slo", "bpl", "ora", "kil", "slo", "nop", "ora", "asl", "slo",
    "clc", "ora", "nop", "slo", "nop", "ora", "asl", "slo", "jsr", "and", "kil", "rla",
    "bit", "and", "rol", "rla", "plp", "and", "rol", "anc", "bit", "and", "rol", "rla",
    "bmi", "and", "kil", "rla", "nop", "and", "rol", "rla", "sec", "and", "nop", "rla",
    "nop", "and", "rol", "rla", "rti", "eor", "kil", "sre", "nop", "eor", "lsr", "sre",
    "pha", "eor", "lsr", "alr", "jmp", "eor", "lsr", "sre", "bvc", "eor", "kil", "sre",
    "nop", "eor", "lsr", "sre", "cli", "eor", "nop", "sre", "nop", "eor", "lsr", "sre",
    "rts", "adc", "kil", "rra", "nop", "adc", "ror", "rra", "pla", "adc", "ror", "arr",
    "jmp", "adc", "ror", "rra", "bvs", "adc", "kil", "rra", "nop", "adc", "ror", "rra",
    "sei", "adc", "nop", "rra", "nop", "adc", "ror", "rra", "nop", "sta", "nop", "sax",
    "sty", "sta", "stx", "sax", "dey", "nop", "txa", "xaa", "sty", "sta", "stx", "sax",
    "bcc", "sta", "kil", "ahx", "sty", "sta", "stx", "sax", "tya", "sta", "txs", "tas",
    "shy", "sta", "shx", "ahx", "ldy", "lda", "ldx", "lax", "ldy", "lda", "ldx", "lax",
    "tay", "lda", "tax", "lax", "ldy", "lda", "ldx", "lax", "bcs", "lda", "kil", "lax",
    "ldy", "lda", "ldx", "lax", "clv", "lda", "tsx", "las", "ldy", "lda", "ldx", "lax",
    "cpy", "cmp", "nop", "dcp", "cpy", "cmp", "dec", "dcp", "iny", "cmp", "dex", "axs",
    "cpy", "cmp", "dec", "dcp", "bne", "cmp", "kil", "dcp", "nop", "cmp", "dec", "dcp",
    "cld", "cmp", "nop", "dcp", "nop", "cmp", "dec", "dcp", "cpx", "sbc", "nop", "isc",
    "cpx", "sbc", "inc", "isc", "inx", "sbc", "nop", "sbc", "cpx", "sbc", "inc", "isc",
    "beq", "sbc", "kil", "isc", "nop", "sbc", "inc", "isc", "sed", "sbc", "nop", "isc",
    "nop", "sbc", "inc", "isc",
];

/// Opcodes whose effective-address computation can cross a page boundary
/// and, when it does, costs one extra cycle: ABS,X / ABS,Y / (zp),Y on
/// *read* instructions, and every relative branch (whose extra cycle is
/// computed from both "taken" and "page crossed" rather than this flag
/// alone -- see `cpu::ops_jump::branch`). Read-modify-write and store
/// instructions in indexed modes always pay the worst-case cost up front
/// (already baked into `CYCLES_TABLE`), so they are not listed here.
const PAGE_CROSS_SENSITIVE: &[u8] = &[
    // ABS,X reads: ORA AND EOR ADC LDY LDA CMP SBC
    0x1D, 0x3D, 0x5D, 0x7D, 0xBC, 0xBD, 0xDD, 0xFD,
    // ABS,Y reads: ORA AND EOR ADC LDX LDA CMP SBC
    0x19, 0x39, 0x59, 0x79, 0xBE, 0xB9, 0xD9, 0xF9,
    // (zp),Y reads: ORA AND EOR ADC LDA CMP SBC
    0x11, 0x31, 0x51, 0x71, 0xB1, 0xD1, 0xF1,
    // Relative branches
    0x10, 0x30, 0x50, 0x70, 0x90, 0xB0, 0xD0, 0xF0,
];

pub const EXTRA_CYCLES_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < PAGE_CROSS_SENSITIVE.len() {
        table[PAGE_CROSS_SENSITIVE[i] as usize] = 1;
        i += 1;
    }
    table
};

/// The 151 official opcode bytes, mapped to their `Mnemonic`. Every
/// other byte value is an undocumented opcode: `ADDRESSING_MODE_TABLE`
/// and `OPCODE_STRING_TABLE` still describe it (for the disassembler),
/// but there is no handler to dispatch to.
pub fn documented_mnemonic(opcode: u8) -> Option<Mnemonic> {
    use Mnemonic::*;
    Some(match opcode {
        0x00 => Brk,
        0x01 | 0x05 | 0x09 | 0x0D | 0x11 | 0x15 | 0x19 | 0x1D => Ora,
        0x06 | 0x0A | 0x0E | 0x16 | 0x1E => Asl,
        0x08 => Php,
        0x10 => Bpl,
        0x18 => Clc,
        0x20 => Jsr,
        0x21 | 0x25 | 0x29 | 0x2D | 0x31 | 0x35 | 0x39 | 0x3D => And,
        0x24 | 0x2C => Bit,
        0x26 | 0x2A | 0x2E | 0x36 | 0x3E => Rol,
        0x28 => Plp,
        0x30 => Bmi,
        0x38 => Sec,
        0x40 => Rti,
        0x41 | 0x45 | 0x49 | 0x4D | 0x51 | 0x55 | 0x59 | 0x5D => Eor,
        0x46 | 0x4A | 0x4E | 0x56 | 0x5E => Lsr,
        0x48 => Pha,
        0x4C | 0x6C => Jmp,
        0x50 => Bvc,
        0x58 => Cli,
        0x60 => Rts,
        0x61 | 0x65 | 0x69 | 0x6D | 0x71 | 0x75 | 0x79 | 0x7D => Adc,
        0x66 | 0x6A | 0x6E | 0x76 | 0x7E => Ror,
        0x68 => Pla,
        0x70 => Bvs,
        0x78 => Sei,
        0x81 | 0x85 | 0x8D | 0x91 | 0x95 | 0x99 | 0x9D => Sta,
        0x84 | 0x8C | 0x94 => Sty,
        0x86 | 0x8E | 0x96 => Stx,
        0x88 => Dey,
        0x8A => Txa,
        0x90 => Bcc,
        0x98 => Tya,
        0x9A => Txs,
        0xA0 | 0xA4 | 0xAC | 0xB4 | 0xBC => Ldy,
        0xA1 | 0xA5 | 0xA9 | 0xAD | 0xB1 | 0xB5 | 0xB9 | 0xBD => Lda,
        0xA2 | 0xA6 | 0xAE | 0xB6 | 0xBE => Ldx,
        0xA8 => Tay,
        0xAA => Tax,
        0xB0 => Bcs,
        0xB8 => Clv,
        0xBA => Tsx,
        0xC0 | 0xC4 | 0xCC => Cpy,
        0xC1 | 0xC5 | 0xC9 | 0xCD | 0xD1 | 0xD5 | 0xD9 | 0xDD => Cmp,
        0xC6 | 0xCE | 0xD6 | 0xDE => Dec,
        0xC8 => Iny,
        0xCA => Dex,
        0xD0 => Bne,
        0xD8 => Cld,
        0xE0 | 0xE4 | 0xEC => Cpx,
        0xE1 | 0xE5 | 0xE9 | 0xED | 0xF1 | 0xF5 | 0xF9 | 0xFD => Sbc,
        0xE6 | 0xEE | 0xF6 | 0xFE => Inc,
        0xE8 => Inx,
        0xEA => Nop,
        0xF0 => Beq,
        0xF8 => Sed,
        _ => return None,
    })
}

pub fn is_illegal(opcode: u8) -> bool {
    documented_mnemonic(opcode).is_none()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn documented_count_is_151() {
        let count = (0u16..=255).filter(|&op| documented_mnemonic(op as u8).is_some()).count();
        assert_eq!(count, 151);
    }

    #[test]
    fn lda_immediate_is_two_bytes_two_cycles() {
        assert_eq!(ADDRESSING_MODE_TABLE[0xA9], Mode::Immediate);
        assert_eq!(Mode::Immediate.length(), 2);
        assert_eq!(CYCLES_TABLE[0xA9], 2);
        assert_eq!(EXTRA_CYCLES_TABLE[0xA9], 0);
    }

    #[test]
    fn lda_absolute_x_is_page_cross_sensitive() {
        assert_eq!(ADDRESSING_MODE_TABLE[0xBD], Mode::AbsoluteIndexedX);
        assert_eq!(EXTRA_CYCLES_TABLE[0xBD], 1);
    }

    #[test]
    fn inc_absolute_x_is_not_page_cross_sensitive() {
        assert_eq!(ADDRESSING_MODE_TABLE[0xFE], Mode::AbsoluteIndexedX);
        assert_eq!(EXTRA_CYCLES_TABLE[0xFE], 0);
    }

    #[test]
    fn kil_and_illegal_opcodes_have_no_mnemonic() {
        assert!(is_illegal(0x02));
        assert!(is_illegal(0x1A));
        assert!(!is_illegal(0xEA));
    }
}
