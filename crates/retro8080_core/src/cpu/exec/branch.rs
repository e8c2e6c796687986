use crate::cpu::{Bus8080, Condition, Cpu8080};

impl Cpu8080 {
    pub(super) fn exec_jmp(&mut self, addr: u16) -> u32 {
        self.regs.pc = addr;
        10
    }

    /// Conditional jump. Takes 10 states whether or not it is taken.
    pub(super) fn exec_jcc(&mut self, cond: Condition, addr: u16) -> u32 {
        if cond.holds(&self.flags) {
            self.regs.pc = addr;
        }
        10
    }

    pub(super) fn exec_call<B: Bus8080>(&mut self, bus: &mut B, addr: u16) -> u32 {
        let ret = self.regs.pc;
        self.push(bus, ret);
        self.regs.pc = addr;
        17
    }

    pub(super) fn exec_ccc<B: Bus8080>(&mut self, bus: &mut B, cond: Condition, addr: u16) -> u32 {
        if cond.holds(&self.flags) {
            self.exec_call(bus, addr)
        } else {
            11
        }
    }

    pub(super) fn exec_ret<B: Bus8080>(&mut self, bus: &mut B) -> u32 {
        self.regs.pc = self.pop(bus);
        10
    }

    pub(super) fn exec_rcc<B: Bus8080>(&mut self, bus: &mut B, cond: Condition) -> u32 {
        if cond.holds(&self.flags) {
            self.regs.pc = self.pop(bus);
            11
        } else {
            5
        }
    }

    pub(super) fn exec_rst<B: Bus8080>(&mut self, bus: &mut B, n: u8) -> u32 {
        let ret = self.regs.pc;
        self.push(bus, ret);
        self.regs.pc = (u16::from(n) & 0x07) << 3;
        11
    }

    pub(super) fn exec_pchl(&mut self) -> u32 {
        self.regs.pc = self.regs.hl();
        5
    }
}
