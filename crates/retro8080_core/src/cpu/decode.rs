use std::fmt;

use super::{Flags, Operand, Profile, RegPair, StackPair};

/// Branch condition encoded in bits 3-5 of Jcc/Ccc/Rcc opcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Condition {
    NotZero,
    Zero,
    NoCarry,
    Carry,
    ParityOdd,
    ParityEven,
    Plus,
    Minus,
}

impl Condition {
    fn from_index(index: u8) -> Self {
        match index & 0x07 {
            0 => Condition::NotZero,
            1 => Condition::Zero,
            2 => Condition::NoCarry,
            3 => Condition::Carry,
            4 => Condition::ParityOdd,
            5 => Condition::ParityEven,
            6 => Condition::Plus,
            _ => Condition::Minus,
        }
    }

    #[inline]
    pub fn holds(self, flags: &Flags) -> bool {
        match self {
            Condition::NotZero => !flags.z,
            Condition::Zero => flags.z,
            Condition::NoCarry => !flags.cy,
            Condition::Carry => flags.cy,
            Condition::ParityOdd => !flags.p,
            Condition::ParityEven => flags.p,
            Condition::Plus => !flags.s,
            Condition::Minus => flags.s,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Condition::NotZero => "NZ",
            Condition::Zero => "Z",
            Condition::NoCarry => "NC",
            Condition::Carry => "C",
            Condition::ParityOdd => "PO",
            Condition::ParityEven => "PE",
            Condition::Plus => "P",
            Condition::Minus => "M",
        }
    }
}

/// Accumulator operation selected by bits 3-5 of the 0x80-0xBF block and of
/// the immediate group (ADI, ACI, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbb,
    Ana,
    Xra,
    Ora,
    Cmp,
}

impl AluOp {
    fn from_index(index: u8) -> Self {
        match index & 0x07 {
            0 => AluOp::Add,
            1 => AluOp::Adc,
            2 => AluOp::Sub,
            3 => AluOp::Sbb,
            4 => AluOp::Ana,
            5 => AluOp::Xra,
            6 => AluOp::Ora,
            _ => AluOp::Cmp,
        }
    }

    fn mnemonic(self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Adc => "ADC",
            AluOp::Sub => "SUB",
            AluOp::Sbb => "SBB",
            AluOp::Ana => "ANA",
            AluOp::Xra => "XRA",
            AluOp::Ora => "ORA",
            AluOp::Cmp => "CMP",
        }
    }

    fn immediate_mnemonic(self) -> &'static str {
        match self {
            AluOp::Add => "ADI",
            AluOp::Adc => "ACI",
            AluOp::Sub => "SUI",
            AluOp::Sbb => "SBI",
            AluOp::Ana => "ANI",
            AluOp::Xra => "XRI",
            AluOp::Ora => "ORI",
            AluOp::Cmp => "CPI",
        }
    }
}

/// A fully decoded 8080 instruction, operand bytes included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Instruction {
    Nop,
    Hlt,

    // Data movement
    Mov { dst: Operand, src: Operand },
    Mvi { dst: Operand, value: u8 },
    Lxi { pair: RegPair, value: u16 },
    Lda(u16),
    Sta(u16),
    Lhld(u16),
    Shld(u16),
    Ldax(RegPair),
    Stax(RegPair),
    Xchg,
    Push(StackPair),
    Pop(StackPair),

    // Arithmetic and logic
    Alu { op: AluOp, src: Operand },
    AluImm { op: AluOp, value: u8 },
    Inr(Operand),
    Dcr(Operand),
    Inx(RegPair),
    Dcx(RegPair),
    Dad(RegPair),
    Daa,
    Rlc,
    Rrc,
    Ral,
    Rar,
    Cma,
    Stc,
    Cmc,

    // Branch and control
    Jmp(u16),
    Jcc(Condition, u16),
    Call(u16),
    Ccc(Condition, u16),
    Ret,
    Rcc(Condition),
    Rst(u8),
    Pchl,

    // Stack and special
    Xthl,
    Sphl,
    In(u8),
    Out(u8),
    Ei,
    Di,
}

fn word<F: FnMut() -> u8>(next: &mut F) -> u16 {
    let lo = next() as u16;
    let hi = next() as u16;
    (hi << 8) | lo
}

/// Decode `opcode`, pulling 0, 1 or 2 operand bytes from `next`.
///
/// Returns `None` for opcodes the profile does not implement; in that case no
/// operand byte has been requested. Every one of the 256 opcode values is
/// listed below so the compiler checks the table is complete.
pub fn decode<F: FnMut() -> u8>(opcode: u8, profile: Profile, mut next: F) -> Option<Instruction> {
    use Instruction::*;

    let instr = match opcode {
        // NOP and its undocumented duplicates.
        0x00 | 0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => Nop,

        // LXI rp,word
        0x01 | 0x11 | 0x21 | 0x31 => Lxi {
            pair: RegPair::from_index(opcode >> 4),
            value: word(&mut next),
        },

        // STAX B / STAX D
        0x02 | 0x12 => Stax(RegPair::from_index(opcode >> 4)),

        // LDAX B / LDAX D
        0x0a | 0x1a => Ldax(RegPair::from_index(opcode >> 4)),

        // INX rp / DCX rp / DAD rp
        0x03 | 0x13 | 0x23 | 0x33 => Inx(RegPair::from_index(opcode >> 4)),
        0x0b | 0x1b | 0x2b | 0x3b => Dcx(RegPair::from_index(opcode >> 4)),
        0x09 | 0x19 | 0x29 | 0x39 => Dad(RegPair::from_index(opcode >> 4)),

        // INR r / DCR r / MVI r,byte (M included)
        0x04 | 0x0c | 0x14 | 0x1c | 0x24 | 0x2c | 0x34 | 0x3c => {
            Inr(Operand::from_index(opcode >> 3))
        }
        0x05 | 0x0d | 0x15 | 0x1d | 0x25 | 0x2d | 0x35 | 0x3d => {
            Dcr(Operand::from_index(opcode >> 3))
        }
        0x06 | 0x0e | 0x16 | 0x1e | 0x26 | 0x2e | 0x36 | 0x3e => Mvi {
            dst: Operand::from_index(opcode >> 3),
            value: next(),
        },

        0x07 => Rlc,
        0x0f => Rrc,
        0x17 => Ral,
        0x1f => Rar,

        0x22 => Shld(word(&mut next)),
        0x2a => Lhld(word(&mut next)),
        0x32 => Sta(word(&mut next)),
        0x3a => Lda(word(&mut next)),

        0x27 => Daa,
        0x2f => Cma,
        0x37 => Stc,
        0x3f => Cmc,

        // HLT sits in the middle of the MOV block where MOV M,M would be.
        0x76 => Hlt,
        0x40..=0x7f => Mov {
            dst: Operand::from_index(opcode >> 3),
            src: Operand::from_index(opcode),
        },

        // ADD/ADC/SUB/SBB/ANA/XRA/ORA/CMP r
        0x80..=0xbf => Alu {
            op: AluOp::from_index(opcode >> 3),
            src: Operand::from_index(opcode),
        },

        // Rcc / Jcc / Ccc
        0xc0 | 0xc8 | 0xd0 | 0xd8 | 0xe0 | 0xe8 | 0xf0 | 0xf8 => {
            Rcc(Condition::from_index(opcode >> 3))
        }
        0xc2 | 0xca | 0xd2 | 0xda | 0xe2 | 0xea | 0xf2 | 0xfa => {
            Jcc(Condition::from_index(opcode >> 3), word(&mut next))
        }
        0xc4 | 0xcc | 0xd4 | 0xdc | 0xe4 | 0xec | 0xf4 | 0xfc => {
            Ccc(Condition::from_index(opcode >> 3), word(&mut next))
        }

        // POP / PUSH rp (PSW in the SP slot)
        0xc1 | 0xd1 | 0xe1 | 0xf1 => Pop(StackPair::from_index(opcode >> 4)),
        0xc5 | 0xd5 | 0xe5 | 0xf5 => Push(StackPair::from_index(opcode >> 4)),

        // ADI/ACI/SUI/SBI/ANI/XRI/ORI/CPI byte
        0xc6 | 0xce | 0xd6 | 0xde | 0xe6 | 0xee | 0xf6 | 0xfe => AluImm {
            op: AluOp::from_index(opcode >> 3),
            value: next(),
        },

        // RST n
        0xc7 | 0xcf | 0xd7 | 0xdf | 0xe7 | 0xef | 0xf7 | 0xff => Rst((opcode >> 3) & 0x07),

        0xc3 => Jmp(word(&mut next)),
        0xc9 => Ret,
        0xcd => Call(word(&mut next)),
        0xd3 => Out(next()),
        0xdb => In(next()),
        0xe3 => Xthl,
        0xe9 => Pchl,
        0xeb => Xchg,
        0xf3 => Di,
        0xf9 => Sphl,
        0xfb => Ei,

        // Escape bytes. The chip decodes them as duplicates of JMP, RET and
        // CALL; the documented instruction set leaves them undefined.
        0xcb => match profile {
            Profile::Silicon => Jmp(word(&mut next)),
            Profile::Documented => return None,
        },
        0xd9 => match profile {
            Profile::Silicon => Ret,
            Profile::Documented => return None,
        },
        0xdd | 0xed | 0xfd => match profile {
            Profile::Silicon => Call(word(&mut next)),
            Profile::Documented => return None,
        },
    };

    Some(instr)
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Nop => f.write_str("NOP"),
            Hlt => f.write_str("HLT"),
            Mov { dst, src } => write!(f, "MOV {dst},{src}"),
            Mvi { dst, value } => write!(f, "MVI {dst},${value:02X}"),
            Lxi { pair, value } => write!(f, "LXI {pair},${value:04X}"),
            Lda(addr) => write!(f, "LDA ${addr:04X}"),
            Sta(addr) => write!(f, "STA ${addr:04X}"),
            Lhld(addr) => write!(f, "LHLD ${addr:04X}"),
            Shld(addr) => write!(f, "SHLD ${addr:04X}"),
            Ldax(pair) => write!(f, "LDAX {pair}"),
            Stax(pair) => write!(f, "STAX {pair}"),
            Xchg => f.write_str("XCHG"),
            Push(pair) => write!(f, "PUSH {pair}"),
            Pop(pair) => write!(f, "POP {pair}"),
            Alu { op, src } => write!(f, "{} {src}", op.mnemonic()),
            AluImm { op, value } => write!(f, "{} ${value:02X}", op.immediate_mnemonic()),
            Inr(op) => write!(f, "INR {op}"),
            Dcr(op) => write!(f, "DCR {op}"),
            Inx(pair) => write!(f, "INX {pair}"),
            Dcx(pair) => write!(f, "DCX {pair}"),
            Dad(pair) => write!(f, "DAD {pair}"),
            Daa => f.write_str("DAA"),
            Rlc => f.write_str("RLC"),
            Rrc => f.write_str("RRC"),
            Ral => f.write_str("RAL"),
            Rar => f.write_str("RAR"),
            Cma => f.write_str("CMA"),
            Stc => f.write_str("STC"),
            Cmc => f.write_str("CMC"),
            Jmp(addr) => write!(f, "JMP ${addr:04X}"),
            Jcc(cond, addr) => write!(f, "J{} ${addr:04X}", cond.suffix()),
            Call(addr) => write!(f, "CALL ${addr:04X}"),
            Ccc(cond, addr) => write!(f, "C{} ${addr:04X}", cond.suffix()),
            Ret => f.write_str("RET"),
            Rcc(cond) => write!(f, "R{}", cond.suffix()),
            Rst(n) => write!(f, "RST {n}"),
            Pchl => f.write_str("PCHL"),
            Xthl => f.write_str("XTHL"),
            Sphl => f.write_str("SPHL"),
            In(port) => write!(f, "IN ${port:02X}"),
            Out(port) => write!(f, "OUT ${port:02X}"),
            Ei => f.write_str("EI"),
            Di => f.write_str("DI"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Reg;

    fn decode_bytes(bytes: &[u8], profile: Profile) -> (Option<Instruction>, usize) {
        let mut rest = bytes[1..].iter().copied();
        let mut used = 0;
        let instr = decode(bytes[0], profile, || {
            used += 1;
            rest.next().unwrap_or(0)
        });
        (instr, used)
    }

    #[test]
    fn documented_profile_rejects_only_the_escape_bytes() {
        let rejected: Vec<u8> = (0..=u8::MAX)
            .filter(|&op| decode_bytes(&[op, 0, 0], Profile::Documented).0.is_none())
            .collect();
        assert_eq!(rejected, vec![0xcb, 0xd9, 0xdd, 0xed, 0xfd]);
    }

    #[test]
    fn silicon_profile_decodes_every_opcode() {
        for op in 0..=u8::MAX {
            assert!(decode_bytes(&[op, 0, 0], Profile::Silicon).0.is_some(), "{op:#04X}");
        }
    }

    #[test]
    fn rejected_opcodes_consume_no_operands() {
        assert_eq!(decode_bytes(&[0xdd, 0x34, 0x12], Profile::Documented), (None, 0));
    }

    #[test]
    fn operand_widths_follow_the_opcode() {
        assert_eq!(decode_bytes(&[0x00], Profile::Documented).1, 0);
        assert_eq!(decode_bytes(&[0x3e, 0x42], Profile::Documented).1, 1);
        assert_eq!(decode_bytes(&[0xfe, 0x42], Profile::Documented).1, 1);
        assert_eq!(decode_bytes(&[0xdb, 0x01], Profile::Documented).1, 1);
        assert_eq!(decode_bytes(&[0x21, 0x34, 0x12], Profile::Documented).1, 2);
        assert_eq!(decode_bytes(&[0xc4, 0x00, 0x10], Profile::Documented).1, 2);
        assert_eq!(decode_bytes(&[0xc0], Profile::Documented).1, 0);
    }

    #[test]
    fn immediates_are_little_endian() {
        let (instr, _) = decode_bytes(&[0x21, 0x34, 0x12], Profile::Documented);
        assert_eq!(
            instr,
            Some(Instruction::Lxi {
                pair: RegPair::HL,
                value: 0x1234
            })
        );
    }

    #[test]
    fn undocumented_nops_decode_as_nop() {
        for op in [0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38] {
            assert_eq!(
                decode_bytes(&[op], Profile::Documented).0,
                Some(Instruction::Nop)
            );
        }
    }

    #[test]
    fn hlt_is_carved_out_of_the_mov_block() {
        assert_eq!(decode_bytes(&[0x76], Profile::Documented).0, Some(Instruction::Hlt));
        assert_eq!(
            decode_bytes(&[0x77], Profile::Documented).0,
            Some(Instruction::Mov {
                dst: Operand::Memory,
                src: Operand::Register(Reg::A)
            })
        );
    }

    #[test]
    fn display_uses_intel_mnemonics() {
        let text = |bytes: &[u8]| {
            decode_bytes(bytes, Profile::Silicon)
                .0
                .map(|i| i.to_string())
                .unwrap_or_default()
        };
        assert_eq!(text(&[0x21, 0x34, 0x12]), "LXI H,$1234");
        assert_eq!(text(&[0x7e]), "MOV A,M");
        assert_eq!(text(&[0xfe, 0x0a]), "CPI $0A");
        assert_eq!(text(&[0xc2, 0x00, 0x10]), "JNZ $1000");
        assert_eq!(text(&[0xf5]), "PUSH PSW");
        assert_eq!(text(&[0xcf]), "RST 1");
        assert_eq!(text(&[0xcb, 0x00, 0x20]), "JMP $2000");
    }
}
