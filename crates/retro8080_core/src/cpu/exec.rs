mod arith;
mod branch;
mod data;
mod logic;
mod special;

use super::{AluOp, Bus8080, Cpu8080, Instruction, Operand};

impl Cpu8080 {
    /// Execute an already decoded instruction and return the number of states.
    ///
    /// Operand bytes were consumed by the decoder, so PC already points at the
    /// next instruction when we get here.
    pub(super) fn execute<B: Bus8080>(&mut self, bus: &mut B, instr: Instruction) -> u32 {
        use Instruction::*;

        match instr {
            Nop => 4,
            Hlt => self.exec_hlt(),

            Mov { dst, src } => self.exec_mov(bus, dst, src),
            Mvi { dst, value } => self.exec_mvi(bus, dst, value),
            Lxi { pair, value } => self.exec_lxi(pair, value),
            Lda(addr) => self.exec_lda(bus, addr),
            Sta(addr) => self.exec_sta(bus, addr),
            Lhld(addr) => self.exec_lhld(bus, addr),
            Shld(addr) => self.exec_shld(bus, addr),
            Ldax(pair) => self.exec_ldax(bus, pair),
            Stax(pair) => self.exec_stax(bus, pair),
            Xchg => self.exec_xchg(),
            Push(pair) => self.exec_push(bus, pair),
            Pop(pair) => self.exec_pop(bus, pair),

            Alu { op, src } => {
                let value = self.read_operand(bus, src);
                self.alu(op, value);
                match src {
                    Operand::Memory => 7,
                    Operand::Register(_) => 4,
                }
            }
            AluImm { op, value } => {
                self.alu(op, value);
                7
            }
            Inr(op) => self.exec_inr(bus, op),
            Dcr(op) => self.exec_dcr(bus, op),
            Inx(pair) => self.exec_inx(pair),
            Dcx(pair) => self.exec_dcx(pair),
            Dad(pair) => self.exec_dad(pair),
            Daa => self.exec_daa(),
            Rlc => self.exec_rlc(),
            Rrc => self.exec_rrc(),
            Ral => self.exec_ral(),
            Rar => self.exec_rar(),
            Cma => self.exec_cma(),
            Stc => self.exec_stc(),
            Cmc => self.exec_cmc(),

            Jmp(addr) => self.exec_jmp(addr),
            Jcc(cond, addr) => self.exec_jcc(cond, addr),
            Call(addr) => self.exec_call(bus, addr),
            Ccc(cond, addr) => self.exec_ccc(bus, cond, addr),
            Ret => self.exec_ret(bus),
            Rcc(cond) => self.exec_rcc(bus, cond),
            Rst(n) => self.exec_rst(bus, n),
            Pchl => self.exec_pchl(),

            Xthl => self.exec_xthl(bus),
            Sphl => self.exec_sphl(),
            In(port) => self.exec_in(bus, port),
            Out(port) => self.exec_out(bus, port),
            Ei => self.exec_ei(),
            Di => self.exec_di(),
        }
    }

    /// Apply an accumulator operation to A and `value`.
    fn alu(&mut self, op: AluOp, value: u8) {
        match op {
            AluOp::Add => self.regs.a = self.add_with_carry(value, false),
            AluOp::Adc => {
                let carry = self.flags.cy;
                self.regs.a = self.add_with_carry(value, carry);
            }
            AluOp::Sub => self.regs.a = self.sub_with_borrow(value, false),
            AluOp::Sbb => {
                let borrow = self.flags.cy;
                self.regs.a = self.sub_with_borrow(value, borrow);
            }
            AluOp::Ana => self.ana(value),
            AluOp::Xra => self.xra(value),
            AluOp::Ora => self.ora(value),
            AluOp::Cmp => {
                // Flags of A - value; A is untouched.
                self.sub_with_borrow(value, false);
            }
        }
    }
}
