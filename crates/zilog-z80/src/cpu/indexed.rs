//! DD- and FD-prefixed opcodes.
//!
//! A prefix swaps HL for IX or IY. Single-register operands H and L become
//! the index register halves, and (HL) becomes (IX+d) with the real H and L
//! as the other operand. Opcodes the prefix does not affect run as their
//! unprefixed form after the extra fetch.

use emu_core::Bus;

use super::Z80;
use super::operands::{Index, Reg8};
use crate::alu::{self, AluOp};

impl Z80 {
    /// Chains of DD/FD prefixes are consumed here; the last one wins.
    pub(super) fn prefix_indexed<B: Bus>(&mut self, bus: &mut B, mut index: Index) {
        loop {
            let op = self.fetch_byte(bus);
            self.m1();
            match op {
                0xDD | 0xFD => index = Index::from_prefix(op),
                _ => return self.execute_indexed(bus, index, op),
            }
        }
    }

    /// IX/IY plus the displacement byte at PC.
    fn indexed_address<B: Bus>(&mut self, bus: &mut B, index: Index) -> u16 {
        let base = self.hl_or(Some(index));
        let offset = self.fetch_byte(bus) as i8;
        base.wrapping_add_signed(i16::from(offset))
    }

    fn execute_indexed<B: Bus>(&mut self, bus: &mut B, index: Index, op: u8) {
        let ix = Some(index);
        match op {
            // ADD IX,rr
            0x09 | 0x19 | 0x29 | 0x39 => self.add_hl(op, ix),

            // LD IX,nn
            0x21 => {
                let value = self.fetch_word(bus);
                self.set_hl_or(ix, value);
            }

            // LD (nn),IX / LD IX,(nn)
            0x22 => {
                let value = self.hl_or(ix);
                self.store_word(bus, value);
            }
            0x2A => {
                let value = self.load_word(bus);
                self.set_hl_or(ix, value);
            }

            // INC IX / DEC IX
            0x23 => {
                let value = self.hl_or(ix).wrapping_add(1);
                self.set_hl_or(ix, value);
                self.delay(self.timing.inc16);
            }
            0x2B => {
                let value = self.hl_or(ix).wrapping_sub(1);
                self.set_hl_or(ix, value);
                self.delay(self.timing.inc16);
            }

            // INC/DEC/LD on IXH and IXL
            0x24 | 0x25 | 0x2C | 0x2D | 0x26 | 0x2E => {
                let Some(reg) = Reg8::decode_indexed(op >> 3, index) else {
                    return;
                };
                let result = match op & 7 {
                    4 => alu::inc8(self.reg8(reg), self.f()),
                    5 => alu::dec8(self.reg8(reg), self.f()),
                    _ => {
                        let value = self.fetch_byte(bus);
                        self.set_reg8(reg, value);
                        return;
                    }
                };
                self.set_reg8(reg, result.value);
                self.set_f(result.flags);
            }

            // INC (IX+d) / DEC (IX+d)
            0x34 | 0x35 => {
                let address = self.indexed_address(bus, index);
                self.delay(self.timing.add8);
                let value = self.read_mem(bus, address);
                let result = if op == 0x34 {
                    alu::inc8(value, self.f())
                } else {
                    alu::dec8(value, self.f())
                };
                self.set_f(result.flags);
                self.delay(self.timing.inc);
                self.write_mem(bus, address, result.value);
                self.regs.sh.set_word(address);
            }

            // LD (IX+d),n: the address add overlaps the operand fetch.
            0x36 => {
                let address = self.indexed_address(bus, index);
                let value = self.fetch_byte(bus);
                self.delay(self.timing.parallel);
                self.regs.sh.set_word(address);
                self.write_mem(bus, address, value);
            }

            // LD r,(IX+d)
            0x46 | 0x4E | 0x56 | 0x5E | 0x66 | 0x6E | 0x7E => {
                let address = self.indexed_address(bus, index);
                self.delay(self.timing.add8);
                self.regs.sh.set_word(address);
                let value = self.read_mem(bus, address);
                self.write_operand(bus, op >> 3, value);
            }

            // LD (IX+d),r
            0x70..=0x75 | 0x77 => {
                let address = self.indexed_address(bus, index);
                self.delay(self.timing.add8);
                self.regs.sh.set_word(address);
                let value = self.read_operand(bus, op);
                self.write_mem(bus, address, value);
            }

            // LD r,r' with H/L meaning IXH/IXL
            0x40..=0x75 | 0x77..=0x7F => {
                if let (Some(dst), Some(src)) = (
                    Reg8::decode_indexed(op >> 3, index),
                    Reg8::decode_indexed(op, index),
                ) {
                    let value = self.reg8(src);
                    self.set_reg8(dst, value);
                }
            }

            // ALU A,(IX+d)
            0x86 | 0x8E | 0x96 | 0x9E | 0xA6 | 0xAE | 0xB6 | 0xBE => {
                let address = self.indexed_address(bus, index);
                self.delay(self.timing.add8);
                let value = self.read_mem(bus, address);
                self.alu_a(AluOp::decode(op), value);
                self.regs.sh.set_word(address);
            }

            // ALU A,IXH / ALU A,IXL / ALU A,r
            0x80..=0xBF => {
                if let Some(src) = Reg8::decode_indexed(op, index) {
                    let value = self.reg8(src);
                    self.alu_a(AluOp::decode(op), value);
                }
            }

            0xCB => {
                let base = self.hl_or(ix);
                self.prefix_indexed_cb(bus, base);
            }

            // POP IX / PUSH IX
            0xE1 => {
                let value = self.pop(bus);
                self.set_hl_or(ix, value);
            }
            0xE5 => {
                let value = self.hl_or(ix);
                self.push(bus, value);
            }

            // EX (SP),IX
            0xE3 => {
                let value = self.hl_or(ix);
                let value = self.ex_sp(bus, value);
                self.set_hl_or(ix, value);
            }

            // JP (IX)
            0xE9 => {
                let value = self.hl_or(ix);
                self.regs.pc.set_word(value);
            }

            // LD SP,IX
            0xF9 => {
                let value = self.hl_or(ix);
                self.regs.sp.set_word(value);
                self.delay(self.timing.ld_sp_hl);
            }

            _ => self.execute_main(bus, op),
        }
    }
}

#[cfg(test)]
mod tests {
    use emu_core::{Cpu, SimpleBus};

    use super::*;

    fn setup(program: &[u8]) -> (Z80, SimpleBus) {
        let mut bus = SimpleBus::new();
        bus.load(0, program);
        (Z80::new(), bus)
    }

    #[test]
    fn ld_h_from_indexed_memory_keeps_real_h() {
        // LD H,(IX+1)
        let (mut cpu, mut bus) = setup(&[0xDD, 0x66, 0x01]);
        bus.poke(0x8001, 0x5A);
        cpu.regs.ix.set_word(0x8000);
        assert_eq!(cpu.step(&mut bus), 19);
        assert_eq!(cpu.regs.h(), 0x5A);
        assert_eq!(cpu.regs.ix.word(), 0x8000);
        assert_eq!(cpu.regs.sh.word(), 0x8001);
    }

    #[test]
    fn index_halves_replace_h_and_l() {
        // LD IXH,IXL
        let (mut cpu, mut bus) = setup(&[0xDD, 0x65]);
        cpu.regs.ix.set_word(0x1234);
        assert_eq!(cpu.step(&mut bus), 8);
        assert_eq!(cpu.regs.ix.word(), 0x3434);
        assert_eq!(cpu.regs.hl.word(), 0xFFFF);
    }

    #[test]
    fn inc_indexed_memory() {
        // INC (IY-2)
        let (mut cpu, mut bus) = setup(&[0xFD, 0x34, 0xFE]);
        bus.poke(0x7FFE, 0x7F);
        cpu.regs.iy.set_word(0x8000);
        assert_eq!(cpu.step(&mut bus), 23);
        assert_eq!(bus.peek(0x7FFE), 0x80);
    }

    #[test]
    fn ld_indexed_immediate() {
        let (mut cpu, mut bus) = setup(&[0xDD, 0x36, 0x05, 0x99]);
        cpu.regs.ix.set_word(0x9000);
        assert_eq!(cpu.step(&mut bus), 19);
        assert_eq!(bus.peek(0x9005), 0x99);
        assert_eq!(cpu.regs.pc.word(), 4);
    }

    #[test]
    fn prefix_chain_uses_last_prefix() {
        // DD FD 21 nn: LD IY,nn
        let (mut cpu, mut bus) = setup(&[0xDD, 0xFD, 0x21, 0x34, 0x12]);
        assert_eq!(cpu.step(&mut bus), 18);
        assert_eq!(cpu.regs.iy.word(), 0x1234);
        assert_eq!(cpu.regs.ix.word(), 0xFFFF);
        assert_eq!(cpu.regs.r, 3);
    }

    #[test]
    fn unaffected_opcode_runs_unprefixed() {
        // DD EB: EX DE,HL
        let (mut cpu, mut bus) = setup(&[0xDD, 0xEB]);
        cpu.regs.de.set_word(0x1111);
        cpu.regs.hl.set_word(0x2222);
        assert_eq!(cpu.step(&mut bus), 8);
        assert_eq!(cpu.regs.de.word(), 0x2222);
        assert_eq!(cpu.regs.hl.word(), 0x1111);
    }

    #[test]
    fn jp_ix_and_ex_sp_ix() {
        let (mut cpu, mut bus) = setup(&[0xDD, 0xE3, 0xDD, 0xE9]);
        bus.load(0x8000, &[0x00, 0x40]);
        cpu.regs.sp.set_word(0x8000);
        cpu.regs.ix.set_word(0x1234);
        assert_eq!(cpu.step(&mut bus), 23);
        assert_eq!(cpu.regs.ix.word(), 0x4000);
        assert_eq!(bus.peek_word(0x8000), 0x1234);
        assert_eq!(cpu.step(&mut bus), 8);
        assert_eq!(cpu.regs.pc.word(), 0x4000);
    }
}
