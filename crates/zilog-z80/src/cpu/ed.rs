//! ED-prefixed opcodes: extended loads, 16-bit arithmetic, port access
//! through C, interrupt control, and the block instructions.

use emu_core::Bus;

use super::Z80;
use super::operands::Reg8;
use crate::alu;
use crate::flags::{CF, HF, NF, PF, SF, TABLES, XF, YF, ZF};

/// Step direction of a block instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Increment,
    Decrement,
}

impl Direction {
    /// Bit 3 of the opcode selects decrement.
    const fn from_opcode(op: u8) -> Self {
        if op & 0x08 == 0 { Self::Increment } else { Self::Decrement }
    }

    const fn apply(self, value: u16) -> u16 {
        match self {
            Self::Increment => value.wrapping_add(1),
            Self::Decrement => value.wrapping_sub(1),
        }
    }
}

impl Z80 {
    pub(super) fn prefix_ed<B: Bus>(&mut self, bus: &mut B) {
        let op = self.fetch_byte(bus);
        self.m1();
        self.execute_ed(bus, op);
    }

    fn execute_ed<B: Bus>(&mut self, bus: &mut B, op: u8) {
        match op {
            // IN r,(C)
            0x40 | 0x48 | 0x50 | 0x58 | 0x60 | 0x68 | 0x70 | 0x78 => {
                let port = self.regs.bc.word();
                let value = self.read_port(bus, port);
                // IN (C) sets flags only.
                if let Some(reg) = Reg8::decode(op >> 3) {
                    self.set_reg8(reg, value);
                }
                self.set_f((self.f() & CF) | TABLES.zspxy[usize::from(value)]);
            }

            // OUT (C),r / OUT (C),0
            0x41 | 0x49 | 0x51 | 0x59 | 0x61 | 0x69 | 0x71 | 0x79 => {
                let value = Reg8::decode(op >> 3).map_or(0, |reg| self.reg8(reg));
                let port = self.regs.bc.word();
                self.write_port(bus, port, value);
            }

            // SBC HL,rr / ADC HL,rr
            0x42 | 0x52 | 0x62 | 0x72 | 0x4A | 0x5A | 0x6A | 0x7A => {
                let hl = self.regs.hl.word();
                let rhs = self.rp(op, None);
                self.regs.sh.set_word(hl.wrapping_add(1));
                let carry = self.f() & CF;
                let result = if op & 0x08 == 0 {
                    alu::sbc16(hl, rhs, carry)
                } else {
                    alu::adc16(hl, rhs, carry)
                };
                self.regs.hl.set_word(result.value);
                self.set_f(result.flags);
                self.delay(self.timing.add16);
            }

            // LD (nn),rr / LD rr,(nn)
            0x43 | 0x53 | 0x63 | 0x73 => {
                let value = self.rp(op, None);
                self.store_word(bus, value);
            }
            0x4B | 0x5B | 0x6B | 0x7B => {
                let value = self.load_word(bus);
                self.set_rp(op, None, value);
            }

            // NEG
            0x44 | 0x4C | 0x54 | 0x5C | 0x64 | 0x6C | 0x74 | 0x7C => {
                let result = alu::sub8(0, self.a(), 0);
                self.set_a(result.value);
                self.set_f(result.flags);
            }

            // RETN / RETI
            0x45 | 0x4D | 0x55 | 0x5D | 0x65 | 0x6D | 0x75 | 0x7D => {
                self.regs.iff1 = self.regs.iff2;
                self.ret(bus);
                self.update_fast_loop();
            }

            // IM 0 / IM 1 / IM 2
            0x46 | 0x4E | 0x66 | 0x6E => self.regs.im = 0,
            0x56 | 0x76 => self.regs.im = 1,
            0x5E | 0x7E => self.regs.im = 2,

            // LD I,A
            0x47 => {
                self.regs.i = self.a();
                self.delay(self.timing.ld);
            }

            // LD R,A
            0x4F => {
                let a = self.a();
                self.regs.r = a;
                self.regs.r2 = a;
                self.delay(self.timing.ld);
            }

            // LD A,I / LD A,R: P/V reports IFF2.
            0x57 | 0x5F => {
                let value = if op == 0x57 {
                    self.regs.i
                } else {
                    self.regs.visible_r()
                };
                self.set_a(value);
                let iff2 = if self.regs.iff2 { PF } else { 0 };
                self.set_f((self.f() & CF) | TABLES.zsxy[usize::from(value)] | iff2);
                self.delay(self.timing.ld);
            }

            // RRD / RLD
            0x67 | 0x6F => {
                let hl = self.regs.hl.word();
                let value = self.read_mem(bus, hl);
                self.regs.sh.set_word(hl.wrapping_add(1));
                let a = self.a();
                let (new_a, new_mem) = if op == 0x67 {
                    ((a & 0xF0) | (value & 0x0F), (value >> 4) | (a << 4))
                } else {
                    ((a & 0xF0) | (value >> 4), (value << 4) | (a & 0x0F))
                };
                self.delay(self.timing.rld);
                self.write_mem(bus, hl, new_mem);
                self.set_a(new_a);
                self.set_f((self.f() & CF) | TABLES.zspxy[usize::from(new_a)]);
            }

            // LDI / LDD / LDIR / LDDR
            0xA0 | 0xA8 | 0xB0 | 0xB8 => {
                self.block_load(bus, Direction::from_opcode(op));
                if op >= 0xB0 && self.regs.bc.word() != 0 {
                    self.block_repeat();
                }
            }

            // CPI / CPD / CPIR / CPDR
            0xA1 | 0xA9 | 0xB1 | 0xB9 => {
                self.block_compare(bus, Direction::from_opcode(op));
                if op >= 0xB0 && self.regs.bc.word() != 0 && self.f() & ZF == 0 {
                    self.block_repeat();
                }
            }

            // INI / IND / INIR / INDR
            0xA2 | 0xAA | 0xB2 | 0xBA => {
                self.block_in(bus, Direction::from_opcode(op));
                if op >= 0xB0 && self.regs.bc.high() != 0 {
                    self.block_repeat();
                }
            }

            // OUTI / OUTD / OTIR / OTDR
            0xA3 | 0xAB | 0xB3 | 0xBB => {
                self.block_out(bus, Direction::from_opcode(op));
                if op >= 0xB0 && self.regs.bc.high() != 0 {
                    self.block_repeat();
                }
            }

            // 0x77, 0x7F and everything outside 0x40-0x7F / 0xA0-0xBB are
            // eight-cycle no-ops.
            _ => {}
        }
    }

    /// Re-run the current block instruction by stepping PC back over it.
    fn block_repeat(&mut self) {
        self.delay(self.timing.block);
        let pc = self.regs.pc.word().wrapping_sub(2);
        self.regs.pc.set_word(pc);
    }

    fn block_load<B: Bus>(&mut self, bus: &mut B, direction: Direction) {
        let hl = self.regs.hl.word();
        let de = self.regs.de.word();
        let value = self.read_mem(bus, hl);
        self.write_mem(bus, de, value);
        self.delay(self.timing.ldi);
        self.regs.hl.set_word(direction.apply(hl));
        self.regs.de.set_word(direction.apply(de));

        let bc = self.regs.bc.word().wrapping_sub(1);
        self.regs.bc.set_word(bc);

        let n = self.a().wrapping_add(value);
        let mut f = (self.f() & (SF | ZF | CF)) | ((n << 4) & YF) | (n & XF);
        if bc != 0 {
            f |= PF;
        }
        self.set_f(f);
    }

    fn block_compare<B: Bus>(&mut self, bus: &mut B, direction: Direction) {
        let hl = self.regs.hl.word();
        let value = self.read_mem(bus, hl);
        let a = self.a();
        let mut diff = a.wrapping_sub(value);
        self.delay(self.timing.block);
        self.regs.hl.set_word(direction.apply(hl));

        let bc = self.regs.bc.word().wrapping_sub(1);
        self.regs.bc.set_word(bc);

        let mut f = (self.f() & CF)
            | ((a ^ value ^ diff) & HF)
            | (TABLES.zspxy[usize::from(diff)] & (ZF | SF))
            | NF;
        // X/Y come from A - (HL) - H.
        diff = diff.wrapping_sub((f & HF) >> 4);
        f |= ((diff << 4) & YF) | (diff & XF);
        if bc != 0 {
            f |= PF;
        }
        self.set_f(f);
    }

    fn block_in<B: Bus>(&mut self, bus: &mut B, direction: Direction) {
        self.delay(self.timing.inout);
        let b = self.regs.bc.high().wrapping_sub(1);
        self.regs.bc.set_high(b);
        let port = self.regs.bc.word();
        let value = self.read_port(bus, port);
        let hl = self.regs.hl.word();
        self.write_mem(bus, hl, value);
        self.regs.hl.set_word(direction.apply(hl));

        // Input leaves X/Y clear.
        let c = direction.apply(u16::from(self.regs.bc.low())) as u8;
        let base = TABLES.zspxy[usize::from(b)] & (ZF | SF);
        self.set_block_io_flags(base, value, c);
    }

    fn block_out<B: Bus>(&mut self, bus: &mut B, direction: Direction) {
        self.delay(self.timing.inout);
        let hl = self.regs.hl.word();
        let value = self.read_mem(bus, hl);
        self.regs.hl.set_word(direction.apply(hl));
        let port = self.regs.bc.word();
        self.write_port(bus, port, value);
        let b = self.regs.bc.high().wrapping_sub(1);
        self.regs.bc.set_high(b);

        let l = self.regs.hl.low();
        self.set_block_io_flags(TABLES.zsxy[usize::from(b)], value, l);
    }

    /// Flags of INI/IND/OUTI/OUTD. `base` carries the S/Z (and for output
    /// X/Y) bits of the new B; `addend` is C±1 for input, the new L for
    /// output.
    fn set_block_io_flags(&mut self, base: u8, value: u8, addend: u8) {
        let b = self.regs.bc.high();
        let sum = u16::from(value) + u16::from(addend);
        let mut f = base | ((value >> 6) & NF);
        if sum > 0xFF {
            f |= HF | CF;
        }
        f |= TABLES.zspxy[usize::from((sum as u8 & 7) ^ b)] & PF;
        self.set_f(f);
    }
}
