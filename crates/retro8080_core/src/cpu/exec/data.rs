use crate::cpu::{Bus8080, Cpu8080, Flags, Operand, RegPair, StackPair};

impl Cpu8080 {
    pub(super) fn exec_mov<B: Bus8080>(&mut self, bus: &mut B, dst: Operand, src: Operand) -> u32 {
        let value = self.read_operand(bus, src);
        self.write_operand(bus, dst, value);
        match (dst, src) {
            (Operand::Register(_), Operand::Register(_)) => 5,
            _ => 7,
        }
    }

    pub(super) fn exec_mvi<B: Bus8080>(&mut self, bus: &mut B, dst: Operand, value: u8) -> u32 {
        self.write_operand(bus, dst, value);
        match dst {
            Operand::Memory => 10,
            Operand::Register(_) => 7,
        }
    }

    pub(super) fn exec_lxi(&mut self, pair: RegPair, value: u16) -> u32 {
        self.regs.set_pair(pair, value);
        10
    }

    pub(super) fn exec_lda<B: Bus8080>(&mut self, bus: &mut B, addr: u16) -> u32 {
        self.regs.a = bus.mem_read(addr);
        13
    }

    pub(super) fn exec_sta<B: Bus8080>(&mut self, bus: &mut B, addr: u16) -> u32 {
        bus.mem_write(addr, self.regs.a);
        13
    }

    pub(super) fn exec_lhld<B: Bus8080>(&mut self, bus: &mut B, addr: u16) -> u32 {
        let value = self.read_word(bus, addr);
        self.regs.set_hl(value);
        16
    }

    pub(super) fn exec_shld<B: Bus8080>(&mut self, bus: &mut B, addr: u16) -> u32 {
        let hl = self.regs.hl();
        self.write_word(bus, addr, hl);
        16
    }

    pub(super) fn exec_ldax<B: Bus8080>(&mut self, bus: &mut B, pair: RegPair) -> u32 {
        debug_assert!(matches!(pair, RegPair::BC | RegPair::DE));
        self.regs.a = bus.mem_read(self.regs.pair(pair));
        7
    }

    pub(super) fn exec_stax<B: Bus8080>(&mut self, bus: &mut B, pair: RegPair) -> u32 {
        debug_assert!(matches!(pair, RegPair::BC | RegPair::DE));
        bus.mem_write(self.regs.pair(pair), self.regs.a);
        7
    }

    pub(super) fn exec_xchg(&mut self) -> u32 {
        std::mem::swap(&mut self.regs.h, &mut self.regs.d);
        std::mem::swap(&mut self.regs.l, &mut self.regs.e);
        4
    }

    pub(super) fn exec_push<B: Bus8080>(&mut self, bus: &mut B, pair: StackPair) -> u32 {
        let value = match pair {
            StackPair::BC => self.regs.bc(),
            StackPair::DE => self.regs.de(),
            StackPair::HL => self.regs.hl(),
            // A goes in the high byte, the packed flags in the low byte.
            StackPair::PSW => u16::from_be_bytes([self.regs.a, self.flags.to_psw(self.profile)]),
        };
        self.push(bus, value);
        11
    }

    pub(super) fn exec_pop<B: Bus8080>(&mut self, bus: &mut B, pair: StackPair) -> u32 {
        let value = self.pop(bus);
        match pair {
            StackPair::BC => self.regs.set_bc(value),
            StackPair::DE => self.regs.set_de(value),
            StackPair::HL => self.regs.set_hl(value),
            StackPair::PSW => {
                let [a, psw] = value.to_be_bytes();
                self.regs.a = a;
                self.flags = Flags::from_psw(psw, self.profile);
            }
        }
        10
    }
}
