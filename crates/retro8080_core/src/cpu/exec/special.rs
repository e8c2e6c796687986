use crate::cpu::{Bus8080, Cpu8080};

impl Cpu8080 {
    /// Exchange HL with the word on top of the stack. SP is unchanged.
    pub(super) fn exec_xthl<B: Bus8080>(&mut self, bus: &mut B) -> u32 {
        let sp = self.regs.sp;
        let top = self.read_word(bus, sp);
        let hl = self.regs.hl();
        self.write_word(bus, sp, hl);
        self.regs.set_hl(top);
        18
    }

    pub(super) fn exec_sphl(&mut self) -> u32 {
        self.regs.sp = self.regs.hl();
        5
    }

    pub(super) fn exec_in<B: Bus8080>(&mut self, bus: &mut B, port: u8) -> u32 {
        self.regs.a = bus.io_read(port);
        10
    }

    pub(super) fn exec_out<B: Bus8080>(&mut self, bus: &mut B, port: u8) -> u32 {
        bus.io_write(port, self.regs.a);
        10
    }

    pub(super) fn exec_ei(&mut self) -> u32 {
        self.interrupts_enabled = true;
        4
    }

    pub(super) fn exec_di(&mut self) -> u32 {
        self.interrupts_enabled = false;
        4
    }

    pub(super) fn exec_hlt(&mut self) -> u32 {
        log::debug!("HLT at PC={:04X}", self.regs.pc.wrapping_sub(1));
        self.halted = true;
        7
    }
}
