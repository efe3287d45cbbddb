//! Unprefixed opcodes.

use emu_core::Bus;

use super::Z80;
use super::operands::Index;
use crate::alu::{self, AluOp, ShiftOp};

impl Z80 {
    /// Fetch the opcode at PC and run it.
    pub(super) fn execute_next<B: Bus>(&mut self, bus: &mut B) {
        let opcode = self.fetch_byte(bus);
        self.execute_instruction(bus, opcode);
    }

    /// Run an opcode that is already on the data bus: one M1 cycle, then
    /// the instruction. Interrupt acknowledge in IM 0 and IM 1 enters here.
    pub(super) fn execute_instruction<B: Bus>(&mut self, bus: &mut B, opcode: u8) {
        self.m1();
        self.execute_main(bus, opcode);
    }

    pub(super) fn execute_main<B: Bus>(&mut self, bus: &mut B, op: u8) {
        match op {
            0x00 => {}

            // LD rr,nn
            0x01 | 0x11 | 0x21 | 0x31 => {
                let value = self.fetch_word(bus);
                self.set_rp(op, None, value);
            }

            // LD (BC),A / LD (DE),A
            0x02 | 0x12 => {
                let address = self.rp(op, None);
                let a = self.a();
                self.write_mem(bus, address, a);
            }

            // LD A,(BC) / LD A,(DE)
            0x0A | 0x1A => {
                let address = self.rp(op, None);
                let value = self.read_mem(bus, address);
                self.set_a(value);
            }

            // INC rr / DEC rr
            0x03 | 0x13 | 0x23 | 0x33 => {
                let value = self.rp(op, None).wrapping_add(1);
                self.set_rp(op, None, value);
                self.delay(self.timing.inc16);
            }
            0x0B | 0x1B | 0x2B | 0x3B => {
                let value = self.rp(op, None).wrapping_sub(1);
                self.set_rp(op, None, value);
                self.delay(self.timing.inc16);
            }

            // INC r / DEC r / INC (HL) / DEC (HL)
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
                self.modify_operand(bus, op >> 3, alu::inc8);
            }
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
                self.modify_operand(bus, op >> 3, alu::dec8);
            }

            // LD r,n / LD (HL),n
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
                let value = self.fetch_byte(bus);
                self.write_operand(bus, op >> 3, value);
            }

            // RLCA / RRCA / RLA / RRA
            0x07 | 0x0F | 0x17 | 0x1F => {
                let result = alu::rotate_a(ShiftOp::decode(op), self.a(), self.f());
                self.set_a(result.value);
                self.set_f(result.flags);
            }

            // EX AF,AF'
            0x08 => std::mem::swap(&mut self.regs.af, &mut self.regs.af_alt),

            // ADD HL,rr
            0x09 | 0x19 | 0x29 | 0x39 => self.add_hl(op, None),

            // DJNZ e
            0x10 => {
                self.delay(self.timing.djnz);
                let b = self.regs.bc.high().wrapping_sub(1);
                self.regs.bc.set_high(b);
                self.jr(bus, b != 0);
            }

            // JR e / JR cc,e
            0x18 => self.jr(bus, true),
            0x20 | 0x28 | 0x30 | 0x38 => {
                let taken = self.condition(op & 0x18);
                self.jr(bus, taken);
            }

            // LD (nn),HL / LD HL,(nn)
            0x22 => {
                let hl = self.regs.hl.word();
                self.store_word(bus, hl);
            }
            0x2A => {
                let value = self.load_word(bus);
                self.regs.hl.set_word(value);
            }

            // LD (nn),A
            0x32 => {
                let address = self.fetch_word(bus);
                let a = self.a();
                self.regs.sh.set_word(u16::from(a) << 8);
                self.write_mem(bus, address, a);
            }

            // LD A,(nn)
            0x3A => {
                let address = self.fetch_word(bus);
                self.regs.sh.set_word(address.wrapping_add(1));
                let value = self.read_mem(bus, address);
                self.set_a(value);
            }

            0x27 => {
                let result = alu::daa(self.a(), self.f());
                self.set_a(result.value);
                self.set_f(result.flags);
            }
            0x2F => {
                let result = alu::cpl(self.a(), self.f());
                self.set_a(result.value);
                self.set_f(result.flags);
            }
            0x37 => self.set_f(alu::scf(self.a(), self.f())),
            0x3F => self.set_f(alu::ccf(self.a(), self.f())),

            0x76 => self.halt(),

            // LD r,r' / LD r,(HL) / LD (HL),r
            0x40..=0x75 | 0x77..=0x7F => {
                let value = self.read_operand(bus, op);
                self.write_operand(bus, op >> 3, value);
            }

            // ALU A,r / ALU A,(HL)
            0x80..=0xBF => {
                let value = self.read_operand(bus, op);
                self.alu_a(AluOp::decode(op), value);
            }

            // RET cc
            0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
                self.delay(self.timing.ret);
                if self.condition(op) {
                    self.ret(bus);
                }
            }

            // POP rr / PUSH rr
            0xC1 | 0xD1 | 0xE1 | 0xF1 => {
                let value = self.pop(bus);
                self.set_rp2(op, value);
            }
            0xC5 | 0xD5 | 0xE5 | 0xF5 => {
                let value = self.rp2(op);
                self.push(bus, value);
            }

            // JP cc,nn / JP nn
            0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
                let taken = self.condition(op);
                self.jp(bus, taken);
            }
            0xC3 => self.jp(bus, true),

            // CALL cc,nn / CALL nn
            0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
                let taken = self.condition(op);
                self.call(bus, taken);
            }
            0xCD => self.call(bus, true),

            // ALU A,n
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                let value = self.fetch_byte(bus);
                self.alu_a(AluOp::decode(op), value);
            }

            // RST p
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                self.rst(bus, u16::from(op & 0x38));
            }

            0xC9 => self.ret(bus),

            // OUT (n),A / IN A,(n)
            0xD3 => {
                let a = self.a();
                let port = u16::from(self.fetch_byte(bus)) | u16::from(a) << 8;
                self.write_port(bus, port, a);
            }
            0xDB => {
                let port = u16::from(self.fetch_byte(bus)) | u16::from(self.a()) << 8;
                let value = self.read_port(bus, port);
                self.set_a(value);
            }

            // EXX
            0xD9 => {
                let regs = &mut self.regs;
                std::mem::swap(&mut regs.bc, &mut regs.bc_alt);
                std::mem::swap(&mut regs.de, &mut regs.de_alt);
                std::mem::swap(&mut regs.hl, &mut regs.hl_alt);
            }

            // EX (SP),HL
            0xE3 => {
                let hl = self.regs.hl.word();
                let value = self.ex_sp(bus, hl);
                self.regs.hl.set_word(value);
            }

            // JP (HL)
            0xE9 => {
                let hl = self.regs.hl.word();
                self.regs.pc.set_word(hl);
            }

            // EX DE,HL
            0xEB => std::mem::swap(&mut self.regs.de, &mut self.regs.hl),

            0xF3 => {
                self.regs.iff1 = false;
                self.regs.iff2 = false;
                self.update_fast_loop();
            }
            0xFB => {
                self.regs.iff1 = true;
                self.regs.iff2 = true;
                self.regs.ei_mode = true;
                self.update_fast_loop();
            }

            // LD SP,HL
            0xF9 => {
                let hl = self.regs.hl.word();
                self.regs.sp.set_word(hl);
                self.delay(self.timing.ld_sp_hl);
            }

            0xCB => self.prefix_cb(bus),
            0xED => self.prefix_ed(bus),
            0xDD | 0xFD => self.prefix_indexed(bus, Index::from_prefix(op)),
        }
    }

    /// HALT re-executes itself until an interrupt can be taken, then falls
    /// through to the next instruction.
    fn halt(&mut self) {
        if self.interrupt_eligible() {
            self.regs.halt = false;
        } else {
            let pc = self.regs.pc.word().wrapping_sub(1);
            self.regs.pc.set_word(pc);
            self.regs.halt = true;
        }
        self.update_fast_loop();
    }
}
