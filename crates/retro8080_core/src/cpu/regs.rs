use std::fmt;

/// Registers for the Intel 8080.
///
/// Seven 8-bit registers that pair up as BC, DE and HL (first letter is the
/// high byte), plus the 16-bit stack pointer and program counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
}

impl Registers {
    #[inline]
    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    #[inline]
    pub fn set_bc(&mut self, value: u16) {
        let [b, c] = value.to_be_bytes();
        self.b = b;
        self.c = c;
    }

    #[inline]
    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    #[inline]
    pub fn set_de(&mut self, value: u16) {
        let [d, e] = value.to_be_bytes();
        self.d = d;
        self.e = e;
    }

    #[inline]
    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    #[inline]
    pub fn set_hl(&mut self, value: u16) {
        let [h, l] = value.to_be_bytes();
        self.h = h;
        self.l = l;
    }

    pub fn get(&self, reg: Reg) -> u8 {
        match reg {
            Reg::B => self.b,
            Reg::C => self.c,
            Reg::D => self.d,
            Reg::E => self.e,
            Reg::H => self.h,
            Reg::L => self.l,
            Reg::A => self.a,
        }
    }

    pub fn set(&mut self, reg: Reg, value: u8) {
        match reg {
            Reg::B => self.b = value,
            Reg::C => self.c = value,
            Reg::D => self.d = value,
            Reg::E => self.e = value,
            Reg::H => self.h = value,
            Reg::L => self.l = value,
            Reg::A => self.a = value,
        }
    }

    pub fn pair(&self, pair: RegPair) -> u16 {
        match pair {
            RegPair::BC => self.bc(),
            RegPair::DE => self.de(),
            RegPair::HL => self.hl(),
            RegPair::SP => self.sp,
        }
    }

    pub fn set_pair(&mut self, pair: RegPair, value: u16) {
        match pair {
            RegPair::BC => self.set_bc(value),
            RegPair::DE => self.set_de(value),
            RegPair::HL => self.set_hl(value),
            RegPair::SP => self.sp = value,
        }
    }
}

/// 8-bit register selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg {
    B,
    C,
    D,
    E,
    H,
    L,
    A,
}

/// Source or destination of an 8-bit operation: a register, or the byte at
/// the address held in HL (`M` in Intel syntax).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    Register(Reg),
    Memory,
}

impl Operand {
    /// Decode the 3-bit register field used throughout the opcode table:
    /// 0=B, 1=C, 2=D, 3=E, 4=H, 5=L, 6=M, 7=A.
    pub(crate) fn from_index(index: u8) -> Self {
        match index & 0x07 {
            0 => Operand::Register(Reg::B),
            1 => Operand::Register(Reg::C),
            2 => Operand::Register(Reg::D),
            3 => Operand::Register(Reg::E),
            4 => Operand::Register(Reg::H),
            5 => Operand::Register(Reg::L),
            6 => Operand::Memory,
            _ => Operand::Register(Reg::A),
        }
    }
}

/// Register pair operand of LXI, INX, DCX, DAD, LDAX and STAX.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegPair {
    BC,
    DE,
    HL,
    SP,
}

impl RegPair {
    /// Decode the 2-bit pair field (bits 4-5 of the opcode).
    pub(crate) fn from_index(index: u8) -> Self {
        match index & 0x03 {
            0 => RegPair::BC,
            1 => RegPair::DE,
            2 => RegPair::HL,
            _ => RegPair::SP,
        }
    }
}

/// Register pair operand of PUSH and POP, where SP's slot is taken by PSW.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StackPair {
    BC,
    DE,
    HL,
    PSW,
}

impl StackPair {
    pub(crate) fn from_index(index: u8) -> Self {
        match index & 0x03 {
            0 => StackPair::BC,
            1 => StackPair::DE,
            2 => StackPair::HL,
            _ => StackPair::PSW,
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg::B => "B",
            Reg::C => "C",
            Reg::D => "D",
            Reg::E => "E",
            Reg::H => "H",
            Reg::L => "L",
            Reg::A => "A",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(reg) => write!(f, "{reg}"),
            Operand::Memory => f.write_str("M"),
        }
    }
}

impl fmt::Display for RegPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intel syntax names a pair by its high register.
        let name = match self {
            RegPair::BC => "B",
            RegPair::DE => "D",
            RegPair::HL => "H",
            RegPair::SP => "SP",
        };
        f.write_str(name)
    }
}

impl fmt::Display for StackPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StackPair::BC => "B",
            StackPair::DE => "D",
            StackPair::HL => "H",
            StackPair::PSW => "PSW",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::{Operand, Reg, RegPair, Registers};

    #[test]
    fn pairs_put_the_first_register_in_the_high_byte() {
        let mut regs = Registers::default();
        regs.set_pair(RegPair::HL, 0x1234);
        assert_eq!((regs.h, regs.l), (0x12, 0x34));

        regs.b = 0xAB;
        regs.c = 0xCD;
        assert_eq!(regs.pair(RegPair::BC), 0xABCD);

        regs.set_pair(RegPair::SP, 0x2400);
        assert_eq!(regs.sp, 0x2400);
    }

    #[test]
    fn register_field_decodes_m_at_index_six() {
        assert_eq!(Operand::from_index(0), Operand::Register(Reg::B));
        assert_eq!(Operand::from_index(6), Operand::Memory);
        assert_eq!(Operand::from_index(7), Operand::Register(Reg::A));
    }
}
