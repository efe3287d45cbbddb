//! Operand decoding and the helpers shared by every opcode table.

use emu_core::Bus;

use super::Z80;
use crate::alu::{self, AluOp, AluResult};
use crate::flags::{CF, PF, SF, ZF};

/// Index register selected by a DD or FD prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Index {
    Ix,
    Iy,
}

impl Index {
    pub(super) const fn from_prefix(prefix: u8) -> Self {
        if prefix == 0xFD { Self::Iy } else { Self::Ix }
    }
}

/// An 8-bit register operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Reg8 {
    B,
    C,
    D,
    E,
    H,
    L,
    A,
    IxH,
    IxL,
    IyH,
    IyL,
}

impl Reg8 {
    /// Decode a 3-bit register field. Code 6 is the memory operand.
    pub(super) const fn decode(code: u8) -> Option<Self> {
        match code & 7 {
            0 => Some(Self::B),
            1 => Some(Self::C),
            2 => Some(Self::D),
            3 => Some(Self::E),
            4 => Some(Self::H),
            5 => Some(Self::L),
            6 => None,
            _ => Some(Self::A),
        }
    }

    /// Decode under a DD/FD prefix: H and L name the index register halves.
    pub(super) const fn decode_indexed(code: u8, index: Index) -> Option<Self> {
        match (code & 7, index) {
            (4, Index::Ix) => Some(Self::IxH),
            (5, Index::Ix) => Some(Self::IxL),
            (4, Index::Iy) => Some(Self::IyH),
            (5, Index::Iy) => Some(Self::IyL),
            _ => Self::decode(code),
        }
    }
}

impl Z80 {
    pub(super) fn reg8(&self, reg: Reg8) -> u8 {
        let regs = &self.regs;
        match reg {
            Reg8::B => regs.bc.high(),
            Reg8::C => regs.bc.low(),
            Reg8::D => regs.de.high(),
            Reg8::E => regs.de.low(),
            Reg8::H => regs.hl.high(),
            Reg8::L => regs.hl.low(),
            Reg8::A => regs.af.high(),
            Reg8::IxH => regs.ix.high(),
            Reg8::IxL => regs.ix.low(),
            Reg8::IyH => regs.iy.high(),
            Reg8::IyL => regs.iy.low(),
        }
    }

    pub(super) fn set_reg8(&mut self, reg: Reg8, value: u8) {
        let regs = &mut self.regs;
        match reg {
            Reg8::B => regs.bc.set_high(value),
            Reg8::C => regs.bc.set_low(value),
            Reg8::D => regs.de.set_high(value),
            Reg8::E => regs.de.set_low(value),
            Reg8::H => regs.hl.set_high(value),
            Reg8::L => regs.hl.set_low(value),
            Reg8::A => regs.af.set_high(value),
            Reg8::IxH => regs.ix.set_high(value),
            Reg8::IxL => regs.ix.set_low(value),
            Reg8::IyH => regs.iy.set_high(value),
            Reg8::IyL => regs.iy.set_low(value),
        }
    }

    /// HL, or the index register under a prefix.
    pub(super) fn hl_or(&self, index: Option<Index>) -> u16 {
        match index {
            None => self.regs.hl.word(),
            Some(Index::Ix) => self.regs.ix.word(),
            Some(Index::Iy) => self.regs.iy.word(),
        }
    }

    pub(super) fn set_hl_or(&mut self, index: Option<Index>, value: u16) {
        match index {
            None => self.regs.hl.set_word(value),
            Some(Index::Ix) => self.regs.ix.set_word(value),
            Some(Index::Iy) => self.regs.iy.set_word(value),
        }
    }

    /// Register pair from bits 4-5: BC, DE, HL (or index), SP.
    pub(super) fn rp(&self, opcode: u8, index: Option<Index>) -> u16 {
        match (opcode >> 4) & 3 {
            0 => self.regs.bc.word(),
            1 => self.regs.de.word(),
            2 => self.hl_or(index),
            _ => self.regs.sp.word(),
        }
    }

    pub(super) fn set_rp(&mut self, opcode: u8, index: Option<Index>, value: u16) {
        match (opcode >> 4) & 3 {
            0 => self.regs.bc.set_word(value),
            1 => self.regs.de.set_word(value),
            2 => self.set_hl_or(index, value),
            _ => self.regs.sp.set_word(value),
        }
    }

    /// Register pair for PUSH/POP: BC, DE, HL, AF.
    pub(super) fn rp2(&self, opcode: u8) -> u16 {
        match (opcode >> 4) & 3 {
            3 => self.regs.af.word(),
            _ => self.rp(opcode, None),
        }
    }

    pub(super) fn set_rp2(&mut self, opcode: u8, value: u16) {
        match (opcode >> 4) & 3 {
            3 => self.regs.af.set_word(value),
            _ => self.set_rp(opcode, None, value),
        }
    }

    /// Condition from bits 3-5: NZ, Z, NC, C, PO, PE, P, M.
    pub(super) fn condition(&self, opcode: u8) -> bool {
        let f = self.f();
        match (opcode >> 3) & 7 {
            0 => f & ZF == 0,
            1 => f & ZF != 0,
            2 => f & CF == 0,
            3 => f & CF != 0,
            4 => f & PF == 0,
            5 => f & PF != 0,
            6 => f & SF == 0,
            _ => f & SF != 0,
        }
    }

    /// Register value for a 3-bit field, or the byte at (HL) for code 6.
    pub(super) fn read_operand<B: Bus>(&mut self, bus: &mut B, code: u8) -> u8 {
        match Reg8::decode(code) {
            Some(reg) => self.reg8(reg),
            None => {
                let hl = self.regs.hl.word();
                self.read_mem(bus, hl)
            }
        }
    }

    pub(super) fn write_operand<B: Bus>(&mut self, bus: &mut B, code: u8, value: u8) {
        match Reg8::decode(code) {
            Some(reg) => self.set_reg8(reg, value),
            None => {
                let hl = self.regs.hl.word();
                self.write_mem(bus, hl, value);
            }
        }
    }

    /// Read-modify-write of a register or (HL). The memory form charges the
    /// `inc` delay between read and write.
    pub(super) fn modify_operand<B: Bus>(
        &mut self,
        bus: &mut B,
        code: u8,
        op: impl FnOnce(u8, u8) -> AluResult,
    ) {
        match Reg8::decode(code) {
            Some(reg) => {
                let result = op(self.reg8(reg), self.f());
                self.set_reg8(reg, result.value);
                self.set_f(result.flags);
            }
            None => {
                let hl = self.regs.hl.word();
                let value = self.read_mem(bus, hl);
                let result = op(value, self.f());
                self.set_f(result.flags);
                self.delay(self.timing.inc);
                self.write_mem(bus, hl, result.value);
            }
        }
    }

    pub(super) fn alu_a(&mut self, op: AluOp, value: u8) {
        let result = alu::alu(op, self.a(), value, self.f());
        self.set_a(result.value);
        self.set_f(result.flags);
    }

    pub(super) fn push<B: Bus>(&mut self, bus: &mut B, value: u16) {
        self.delay(self.timing.push);
        self.write_stack(bus, value);
    }

    /// Stack writes of a push, without the push delay (CALL uses this).
    fn write_stack<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        let sp = self.regs.sp.word().wrapping_sub(1);
        self.write_mem(bus, sp, hi);
        let sp = sp.wrapping_sub(1);
        self.write_mem(bus, sp, lo);
        self.regs.sp.set_word(sp);
    }

    pub(super) fn pop<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let sp = self.regs.sp.word();
        let lo = self.read_mem(bus, sp);
        let hi = self.read_mem(bus, sp.wrapping_add(1));
        self.regs.sp.set_word(sp.wrapping_add(2));
        u16::from_le_bytes([lo, hi])
    }

    /// Push without charging time, as the interrupt acknowledge does.
    pub(super) fn push_untimed<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        let sp = self.regs.sp.word().wrapping_sub(1);
        bus.write(sp, hi);
        let sp = sp.wrapping_sub(1);
        bus.write(sp, lo);
        self.regs.sp.set_word(sp);
    }

    /// JR / JR cc / DJNZ after the condition is known.
    pub(super) fn jr<B: Bus>(&mut self, bus: &mut B, taken: bool) {
        if taken {
            let pc = self.regs.pc.word();
            let offset = self.read_opcode_at(bus, pc) as i8;
            let target = pc.wrapping_add(1).wrapping_add_signed(i16::from(offset));
            self.regs.pc.set_word(target);
            self.regs.sh.set_word(target);
            self.delay(self.timing.add8);
        } else {
            self.fetch_byte(bus);
        }
    }

    pub(super) fn jp<B: Bus>(&mut self, bus: &mut B, taken: bool) {
        let target = self.fetch_word(bus);
        self.regs.sh.set_word(target);
        if taken {
            self.regs.pc.set_word(target);
        }
    }

    pub(super) fn call<B: Bus>(&mut self, bus: &mut B, taken: bool) {
        let target = self.fetch_word(bus);
        self.regs.sh.set_word(target);
        if taken {
            self.delay(self.timing.call);
            let pc = self.regs.pc.word();
            self.write_stack(bus, pc);
            self.regs.pc.set_word(target);
        }
    }

    pub(super) fn ret<B: Bus>(&mut self, bus: &mut B) {
        let target = self.pop(bus);
        self.regs.pc.set_word(target);
        self.regs.sh.set_word(target);
    }

    pub(super) fn rst<B: Bus>(&mut self, bus: &mut B, vector: u16) {
        let pc = self.regs.pc.word();
        self.push(bus, pc);
        self.regs.pc.set_word(vector);
        self.regs.sh.set_word(vector);
    }

    /// EX (SP),rr: returns the word that was on the stack.
    pub(super) fn ex_sp<B: Bus>(&mut self, bus: &mut B, value: u16) -> u16 {
        let sp = self.regs.sp.word();
        let lo = self.read_mem(bus, sp);
        let hi = self.read_mem(bus, sp.wrapping_add(1));
        let [new_lo, new_hi] = value.to_le_bytes();
        self.write_mem(bus, sp.wrapping_add(1), new_hi);
        self.write_mem(bus, sp, new_lo);
        let old = u16::from_le_bytes([lo, hi]);
        self.regs.sh.set_word(old);
        self.delay(self.timing.ex_sp_hl);
        old
    }

    /// LD (nn),rr: SH ends at nn+1.
    pub(super) fn store_word<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let address = self.fetch_word(bus);
        let [lo, hi] = value.to_le_bytes();
        self.write_mem(bus, address, lo);
        let address = address.wrapping_add(1);
        self.write_mem(bus, address, hi);
        self.regs.sh.set_word(address);
    }

    /// LD rr,(nn): SH ends at nn+1.
    pub(super) fn load_word<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let address = self.fetch_word(bus);
        let lo = self.read_mem(bus, address);
        let address = address.wrapping_add(1);
        let hi = self.read_mem(bus, address);
        self.regs.sh.set_word(address);
        u16::from_le_bytes([lo, hi])
    }

    /// ADD HL,rr (or ADD IX/IY,rr).
    pub(super) fn add_hl(&mut self, opcode: u8, index: Option<Index>) {
        let lhs = self.hl_or(index);
        let rhs = self.rp(opcode, index);
        self.regs.sh.set_word(lhs.wrapping_add(1));
        let result = alu::add16(lhs, rhs, self.f());
        self.set_hl_or(index, result.value);
        self.set_f(result.flags);
        self.delay(self.timing.add16);
    }
}
