use crate::cpu::{
    aux_carry_add, aux_carry_sub, derive_arithmetic, Bus8080, Cpu8080, Operand, RegPair,
};

impl Cpu8080 {
    /// A + value + carry, evaluated at 16-bit width. Sets all five flags and
    /// returns the low byte; the caller decides whether it lands in A.
    pub(super) fn add_with_carry(&mut self, value: u8, carry: bool) -> u8 {
        let a = self.regs.a;
        let result = a as u16 + value as u16 + u16::from(carry);
        self.flags.apply(derive_arithmetic(result));
        self.flags.ac = aux_carry_add(a, value, carry);
        result as u8
    }

    /// A - value - borrow. A borrow wraps into the high byte and reads as CY.
    pub(super) fn sub_with_borrow(&mut self, value: u8, borrow: bool) -> u8 {
        let a = self.regs.a;
        let result = (a as u16)
            .wrapping_sub(value as u16)
            .wrapping_sub(u16::from(borrow));
        self.flags.apply(derive_arithmetic(result));
        self.flags.ac = aux_carry_sub(a, value, borrow);
        result as u8
    }

    pub(super) fn exec_inr<B: Bus8080>(&mut self, bus: &mut B, operand: Operand) -> u32 {
        let value = self.read_operand(bus, operand);
        let r = value.wrapping_add(1);
        // Carry flag is not affected by INR.
        self.flags.ac = (value & 0x0f) == 0x0f;
        self.flags.set_zsp(r);
        self.write_operand(bus, operand, r);
        match operand {
            Operand::Memory => 10,
            Operand::Register(_) => 5,
        }
    }

    pub(super) fn exec_dcr<B: Bus8080>(&mut self, bus: &mut B, operand: Operand) -> u32 {
        let value = self.read_operand(bus, operand);
        let r = value.wrapping_sub(1);
        // Carry flag is not affected by DCR.
        self.flags.ac = (r & 0x0f) != 0x0f;
        self.flags.set_zsp(r);
        self.write_operand(bus, operand, r);
        match operand {
            Operand::Memory => 10,
            Operand::Register(_) => 5,
        }
    }

    pub(super) fn exec_inx(&mut self, pair: RegPair) -> u32 {
        let value = self.regs.pair(pair).wrapping_add(1);
        self.regs.set_pair(pair, value);
        5
    }

    pub(super) fn exec_dcx(&mut self, pair: RegPair) -> u32 {
        let value = self.regs.pair(pair).wrapping_sub(1);
        self.regs.set_pair(pair, value);
        5
    }

    /// HL += pair. Only CY changes.
    pub(super) fn exec_dad(&mut self, pair: RegPair) -> u32 {
        let res = self.regs.hl() as u32 + self.regs.pair(pair) as u32;
        self.flags.cy = res > 0xffff;
        self.regs.set_hl(res as u16);
        10
    }

    pub(super) fn exec_daa(&mut self) -> u32 {
        let a = self.regs.a;
        let low = a & 0x0f;
        let high = a >> 4;
        let mut adjust: u8 = 0;
        let mut carry = self.flags.cy;

        if low > 9 || self.flags.ac {
            adjust |= 0x06;
        }
        if high > 9 || self.flags.cy || (high >= 9 && low > 9) {
            adjust |= 0x60;
            carry = true;
        }

        // Even a zero adjustment refreshes Z, S, P and AC from A.
        self.regs.a = self.add_with_carry(adjust, false);
        self.flags.cy = carry;
        4
    }
}
