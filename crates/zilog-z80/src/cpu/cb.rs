//! CB-prefixed opcodes: rotates, shifts and bit operations.

use emu_core::Bus;

use super::Z80;
use super::operands::Reg8;
use crate::alu::{self, AluResult, ShiftOp};

impl Z80 {
    pub(super) fn prefix_cb<B: Bus>(&mut self, bus: &mut B) {
        let op = self.fetch_byte(bus);
        self.m1();
        self.execute_cb(bus, op);
    }

    fn execute_cb<B: Bus>(&mut self, bus: &mut B, op: u8) {
        let n = (op >> 3) & 7;
        match op >> 6 {
            0 => self.modify_operand(bus, op, |value, flags| {
                alu::shift(ShiftOp::decode(op), value, flags)
            }),
            1 => {
                let flags = match Reg8::decode(op) {
                    Some(reg) => {
                        let value = self.reg8(reg);
                        alu::bit(n, value, value, self.f())
                    }
                    None => {
                        // X/Y leak from the internal address latch.
                        self.delay(self.timing.bit);
                        let hl = self.regs.hl.word();
                        let value = self.read_mem(bus, hl);
                        alu::bit(n, value, self.regs.sh.high(), self.f())
                    }
                };
                self.set_f(flags);
            }
            2 => self.modify_operand(bus, op, |value, flags| AluResult {
                value: value & !(1 << n),
                flags,
            }),
            _ => self.modify_operand(bus, op, |value, flags| AluResult {
                value: value | (1 << n),
                flags,
            }),
        }
    }

    /// DD CB d op / FD CB d op. The displacement comes before the opcode,
    /// and the opcode fetch does not refresh R.
    pub(super) fn prefix_indexed_cb<B: Bus>(&mut self, bus: &mut B, base: u16) {
        let offset = self.fetch_byte(bus) as i8;
        let address = base.wrapping_add_signed(i16::from(offset));
        let op = self.fetch_byte(bus);
        self.delay(self.timing.m1);

        let n = (op >> 3) & 7;
        if op >> 6 == 1 {
            self.delay(self.timing.bit_ix);
            self.regs.sh.set_word(address);
            let value = self.read_mem(bus, address);
            let flags = alu::bit(n, value, self.regs.sh.high(), self.f());
            self.set_f(flags);
            return;
        }

        let value = self.read_mem(bus, address);
        self.regs.sh.set_word(address);
        let result = match op >> 6 {
            0 => {
                let result = alu::shift(ShiftOp::decode(op), value, self.f());
                self.set_f(result.flags);
                result.value
            }
            2 => value & !(1 << n),
            _ => value | (1 << n),
        };
        self.delay(self.timing.bit);
        self.delay(self.timing.inc);
        self.write_mem(bus, address, result);

        // Undocumented: the result is also copied into the register named
        // by the low three bits, unless they select (HL).
        if let Some(reg) = Reg8::decode(op) {
            self.set_reg8(reg, result);
        }
    }
}
