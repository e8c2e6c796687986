mod decode;
mod exec;
mod flags;
mod helpers;
mod regs;


use std::fmt;

pub use decode::{decode, AluOp, Condition, Instruction};
pub use flags::{
    aux_carry_add, aux_carry_sub, derive_arithmetic, parity, ArithmeticFlags, Flags, IntelPsw,
    PackedPsw,
};
pub use regs::{Operand, Reg, RegPair, Registers, StackPair};

use crate::error::DecodeError;

/// Simple bus interface for an Intel 8080-compatible CPU core.
///
/// The CPU uses this trait to access memory and IO ports without knowing
/// anything about the concrete machine behind them.
pub trait Bus8080 {
    fn mem_read(&mut self, addr: u16) -> u8;
    fn mem_write(&mut self, addr: u16, value: u8);

    fn io_read(&mut self, port: u8) -> u8;
    fn io_write(&mut self, port: u8, value: u8);
}

/// Which of the two known 8080 behaviours to reproduce where they disagree.
///
/// - `Documented` packs PUSH PSW as bit0=Z, bit1=S, bit2=P, bit3=CY, bit4=AC,
///   clears AC on ANA/ANI and treats the escape bytes 0xCB, 0xD9, 0xDD, 0xED
///   and 0xFD as unknown opcodes.
/// - `Silicon` matches the shipped chip: PSW is `S Z 0 AC 0 P 1 CY`, ANA/ANI
///   set AC from bit 3 of the OR of both operands, and the escape bytes alias
///   JMP, RET and CALL. CP/M diagnostic programs need this profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Profile {
    #[default]
    Documented,
    Silicon,
}

/// Intel 8080 CPU: register file, condition flags and interrupt state.
#[derive(Clone, Debug, Default)]
pub struct Cpu8080 {
    pub regs: Registers,
    pub flags: Flags,
    pub interrupts_enabled: bool,
    /// Set by HLT; cleared when an interrupt is accepted.
    pub halted: bool,
    pub profile: Profile,
}

/// Copy of everything the CPU owns, used for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub regs: Registers,
    pub flags: Flags,
    pub interrupts_enabled: bool,
    pub halted: bool,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.regs;
        let bit = |b: bool| u8::from(b);
        write!(
            f,
            "PC={:04X} SP={:04X} A={:02X} B={:02X} C={:02X} D={:02X} E={:02X} H={:02X} L={:02X} \
             Z={} S={} P={} CY={} AC={} IE={}",
            r.pc,
            r.sp,
            r.a,
            r.b,
            r.c,
            r.d,
            r.e,
            r.h,
            r.l,
            bit(self.flags.z),
            bit(self.flags.s),
            bit(self.flags.p),
            bit(self.flags.cy),
            bit(self.flags.ac),
            bit(self.interrupts_enabled),
        )?;
        if self.halted {
            write!(f, " HALTED")?;
        }
        Ok(())
    }
}

impl Cpu8080 {
    /// Create a new CPU instance in reset state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(profile: Profile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Reset all registers to their power-on values, keeping the profile.
    pub fn reset(&mut self) {
        *self = Self::with_profile(self.profile);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            regs: self.regs,
            flags: self.flags,
            interrupts_enabled: self.interrupts_enabled,
            halted: self.halted,
        }
    }

    /// Execute a single instruction and return the number of states consumed.
    ///
    /// A halted CPU does not fetch; it idles for 4 states per call. An opcode
    /// with no implementation rewinds PC to the opcode's address and comes
    /// back as a [`DecodeError`].
    pub fn step<B: Bus8080>(&mut self, bus: &mut B) -> Result<u32, DecodeError> {
        if self.halted {
            return Ok(4);
        }

        let pc = self.regs.pc;
        let opcode = self.fetch_byte(bus);
        let profile = self.profile;
        let Some(instr) = decode(opcode, profile, || self.fetch_byte(bus)) else {
            self.regs.pc = pc;
            return Err(DecodeError {
                opcode,
                pc,
                snapshot: self.snapshot(),
            });
        };

        log::trace!("{pc:04X}  {instr}");
        Ok(self.execute(bus, instr))
    }

    /// Handle a maskable interrupt.
    ///
    /// Behaves like `RST vector`: the current PC is pushed and execution
    /// continues at `8 * vector`. Accepting the interrupt clears the enable
    /// flag and leaves the HLT state. Returns `false` without touching
    /// anything when interrupts are disabled.
    pub fn interrupt<B: Bus8080>(&mut self, bus: &mut B, vector: u8) -> bool {
        if !self.interrupts_enabled {
            return false;
        }
        self.interrupts_enabled = false;
        self.halted = false;
        let addr = (u16::from(vector) & 0x07) << 3;
        let ret = self.regs.pc;
        self.push(bus, ret);
        self.regs.pc = addr;
        true
    }
}
