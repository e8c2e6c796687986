use super::{Bus8080, Cpu8080, Operand};

impl Cpu8080 {
    #[inline]
    pub(super) fn fetch_byte<B: Bus8080>(&mut self, bus: &mut B) -> u8 {
        let value = bus.mem_read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    /// Read a register, or the byte at HL for `M`.
    #[inline]
    pub(super) fn read_operand<B: Bus8080>(&mut self, bus: &mut B, operand: Operand) -> u8 {
        match operand {
            Operand::Register(reg) => self.regs.get(reg),
            Operand::Memory => bus.mem_read(self.regs.hl()),
        }
    }

    #[inline]
    pub(super) fn write_operand<B: Bus8080>(&mut self, bus: &mut B, operand: Operand, value: u8) {
        match operand {
            Operand::Register(reg) => self.regs.set(reg, value),
            Operand::Memory => bus.mem_write(self.regs.hl(), value),
        }
    }

    #[inline]
    pub(super) fn read_word<B: Bus8080>(&mut self, bus: &mut B, addr: u16) -> u16 {
        let lo = bus.mem_read(addr) as u16;
        let hi = bus.mem_read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    #[inline]
    pub(super) fn write_word<B: Bus8080>(&mut self, bus: &mut B, addr: u16, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        bus.mem_write(addr, lo);
        bus.mem_write(addr.wrapping_add(1), hi);
    }

    /// Stack grows downward: memory[SP] = low, memory[SP+1] = high.
    #[inline]
    pub(super) fn push<B: Bus8080>(&mut self, bus: &mut B, value: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(2);
        let sp = self.regs.sp;
        self.write_word(bus, sp, value);
    }

    #[inline]
    pub(super) fn pop<B: Bus8080>(&mut self, bus: &mut B) -> u16 {
        let sp = self.regs.sp;
        let value = self.read_word(bus, sp);
        self.regs.sp = sp.wrapping_add(2);
        value
    }
}
