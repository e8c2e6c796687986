use crate::cpu::{Cpu8080, Profile};

impl Cpu8080 {
    pub(super) fn ana(&mut self, value: u8) {
        let res = self.regs.a & value;
        self.flags.cy = false;
        self.flags.ac = match self.profile {
            Profile::Documented => false,
            // The chip reports bit 3 of the OR of both operands.
            Profile::Silicon => ((self.regs.a | value) & 0x08) != 0,
        };
        self.flags.set_zsp(res);
        self.regs.a = res;
    }

    pub(super) fn xra(&mut self, value: u8) {
        let res = self.regs.a ^ value;
        self.flags.cy = false;
        self.flags.ac = false;
        self.flags.set_zsp(res);
        self.regs.a = res;
    }

    pub(super) fn ora(&mut self, value: u8) {
        let res = self.regs.a | value;
        self.flags.cy = false;
        self.flags.ac = false;
        self.flags.set_zsp(res);
        self.regs.a = res;
    }

    // Rotates touch CY only.

    pub(super) fn exec_rlc(&mut self) -> u32 {
        let a = self.regs.a;
        self.flags.cy = a & 0x80 != 0;
        self.regs.a = a.rotate_left(1);
        4
    }

    pub(super) fn exec_rrc(&mut self) -> u32 {
        let a = self.regs.a;
        self.flags.cy = a & 0x01 != 0;
        self.regs.a = a.rotate_right(1);
        4
    }

    pub(super) fn exec_ral(&mut self) -> u32 {
        let a = self.regs.a;
        self.regs.a = (a << 1) | u8::from(self.flags.cy);
        self.flags.cy = a & 0x80 != 0;
        4
    }

    pub(super) fn exec_rar(&mut self) -> u32 {
        let a = self.regs.a;
        self.regs.a = (a >> 1) | (u8::from(self.flags.cy) << 7);
        self.flags.cy = a & 0x01 != 0;
        4
    }

    pub(super) fn exec_cma(&mut self) -> u32 {
        self.regs.a = !self.regs.a;
        4
    }

    pub(super) fn exec_stc(&mut self) -> u32 {
        self.flags.cy = true;
        4
    }

    pub(super) fn exec_cmc(&mut self) -> u32 {
        self.flags.cy = !self.flags.cy;
        4
    }
}
