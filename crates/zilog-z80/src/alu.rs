//! ALU operations for the Z80.
//!
//! Each function takes operands (and the incoming flags where the result
//! depends on them) and returns the new value with the new flag byte. S, Z,
//! P and the undocumented X/Y bits come from the lookup tables in
//! [`crate::flags`].

use crate::flags::{CF, HF, NF, PF, SF, TABLES, XF, YF, ZF};

/// Result of an 8-bit ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

/// Result of a 16-bit ALU operation with flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult16 {
    pub value: u16,
    pub flags: u8,
}

/// Accumulator operation selected by bits 3-5 of `ALU A,r` opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

impl AluOp {
    #[must_use]
    pub const fn decode(opcode: u8) -> Self {
        match (opcode >> 3) & 7 {
            0 => Self::Add,
            1 => Self::Adc,
            2 => Self::Sub,
            3 => Self::Sbc,
            4 => Self::And,
            5 => Self::Xor,
            6 => Self::Or,
            _ => Self::Cp,
        }
    }
}

/// Rotate/shift selected by bits 3-5 of CB-prefixed opcodes 0x00-0x3F.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Sll,
    Srl,
}

impl ShiftOp {
    #[must_use]
    pub const fn decode(opcode: u8) -> Self {
        match (opcode >> 3) & 7 {
            0 => Self::Rlc,
            1 => Self::Rrc,
            2 => Self::Rl,
            3 => Self::Rr,
            4 => Self::Sla,
            5 => Self::Sra,
            6 => Self::Sll,
            _ => Self::Srl,
        }
    }
}

/// Apply an accumulator operation. CP returns `a` unchanged.
#[must_use]
pub fn alu(op: AluOp, a: u8, value: u8, flags: u8) -> AluResult {
    let carry = flags & CF;
    match op {
        AluOp::Add => add8(a, value, 0),
        AluOp::Adc => add8(a, value, carry),
        AluOp::Sub => sub8(a, value, 0),
        AluOp::Sbc => sub8(a, value, carry),
        AluOp::And => and8(a, value),
        AluOp::Xor => xor8(a, value),
        AluOp::Or => or8(a, value),
        AluOp::Cp => AluResult {
            value: a,
            flags: cp8(a, value),
        },
    }
}

/// ADD/ADC: `carry` is 0 or 1.
#[must_use]
pub fn add8(a: u8, value: u8, carry: u8) -> AluResult {
    let wide = u16::from(a) + u16::from(value) + u16::from(carry);
    let result = wide as u8;
    let flags = TABLES.zsxy[usize::from(result)]
        | ((wide >> 8) as u8 & CF)
        | ((a ^ result ^ value) & HF)
        | ((((value ^ a ^ 0x80) & (value ^ result)) >> 5) & PF);
    AluResult { value: result, flags }
}

/// SUB/SBC: `carry` is 0 or 1.
#[must_use]
pub fn sub8(a: u8, value: u8, carry: u8) -> AluResult {
    let wide = u16::from(a)
        .wrapping_sub(u16::from(value))
        .wrapping_sub(u16::from(carry));
    let result = wide as u8;
    let flags = TABLES.zsxy[usize::from(result)]
        | ((wide >> 8) as u8 & CF)
        | ((a ^ result ^ value) & HF)
        | NF
        | ((((value ^ a) & (result ^ a)) >> 5) & PF);
    AluResult { value: result, flags }
}

/// CP: flags of `a - value`, with X/Y taken from the operand.
#[must_use]
pub fn cp8(a: u8, value: u8) -> u8 {
    let wide = u16::from(a).wrapping_sub(u16::from(value));
    let result = wide as u8;
    (TABLES.zspxy[usize::from(result)] & (ZF | SF))
        | ((wide >> 8) as u8 & CF)
        | ((a ^ result ^ value) & HF)
        | NF
        | ((((value ^ a) & (result ^ a)) >> 5) & PF)
        | (value & (XF | YF))
}

#[must_use]
pub fn and8(a: u8, value: u8) -> AluResult {
    let result = a & value;
    AluResult {
        value: result,
        flags: TABLES.zspxy[usize::from(result)] | HF,
    }
}

#[must_use]
pub fn or8(a: u8, value: u8) -> AluResult {
    let result = a | value;
    AluResult {
        value: result,
        flags: TABLES.zspxy[usize::from(result)],
    }
}

#[must_use]
pub fn xor8(a: u8, value: u8) -> AluResult {
    let result = a ^ value;
    AluResult {
        value: result,
        flags: TABLES.zspxy[usize::from(result)],
    }
}

/// INC r: carry is preserved.
#[must_use]
pub fn inc8(value: u8, flags: u8) -> AluResult {
    let result = value.wrapping_add(1);
    let mut f = (flags & CF) | TABLES.zsxy[usize::from(result)];
    if result == 0x80 {
        f |= PF;
    }
    if result & 0x0F == 0 {
        f |= HF;
    }
    AluResult { value: result, flags: f }
}

/// DEC r: carry is preserved.
#[must_use]
pub fn dec8(value: u8, flags: u8) -> AluResult {
    let result = value.wrapping_sub(1);
    let mut f = (flags & CF) | TABLES.zsxy[usize::from(result)] | NF;
    if result == 0x7F {
        f |= PF;
    }
    if result & 0x0F == 0x0F {
        f |= HF;
    }
    AluResult { value: result, flags: f }
}

/// CB-prefixed rotate/shift. Only RL and RR read the incoming carry.
#[must_use]
pub fn shift(op: ShiftOp, value: u8, flags: u8) -> AluResult {
    let (result, carry) = match op {
        ShiftOp::Rlc => (value.rotate_left(1), value >> 7),
        ShiftOp::Rrc => (value.rotate_right(1), value & 1),
        ShiftOp::Rl => ((value << 1) | (flags & CF), value >> 7),
        ShiftOp::Rr => ((value >> 1) | (flags << 7), value & 1),
        ShiftOp::Sla => (value << 1, value >> 7),
        ShiftOp::Sra => ((value >> 1) | (value & 0x80), value & 1),
        ShiftOp::Sll => ((value << 1) | 1, value >> 7),
        ShiftOp::Srl => (value >> 1, value & 1),
    };
    AluResult {
        value: result,
        flags: TABLES.zspxy[usize::from(result)] | carry,
    }
}

/// RLCA, RRCA, RLA, RRA: S, Z and P/V survive; X/Y come from the new A.
#[must_use]
pub fn rotate_a(op: ShiftOp, a: u8, flags: u8) -> AluResult {
    let rotated = shift(op, a, flags);
    AluResult {
        value: rotated.value,
        flags: (flags & (SF | ZF | PF)) | (rotated.flags & CF) | (rotated.value & (XF | YF)),
    }
}

/// BIT n: `xy` is the byte whose bits 3 and 5 leak into X/Y.
#[must_use]
pub fn bit(n: u8, value: u8, xy: u8, flags: u8) -> u8 {
    (flags & CF) | (xy & (XF | YF)) | TABLES.zsph[usize::from(value & (1 << (n & 7)))]
}

/// DAA as a single table lookup.
#[must_use]
pub fn daa(a: u8, flags: u8) -> AluResult {
    let index = usize::from(a) | usize::from(flags & (CF | NF)) << 8 | usize::from(flags & HF) << 6;
    let entry = TABLES.daa[index];
    AluResult {
        value: (entry >> 8) as u8,
        flags: entry as u8,
    }
}

#[must_use]
pub fn cpl(a: u8, flags: u8) -> AluResult {
    let result = !a;
    AluResult {
        value: result,
        flags: (flags & (SF | ZF | PF | CF)) | HF | NF | (result & (XF | YF)),
    }
}

/// SCF: returns the new flag byte.
#[must_use]
pub fn scf(a: u8, flags: u8) -> u8 {
    (flags & (SF | ZF | PF)) | CF | (a & (XF | YF))
}

/// CCF: H takes the old carry, then carry is inverted.
#[must_use]
pub fn ccf(a: u8, flags: u8) -> u8 {
    ((flags & (SF | ZF | PF | CF)) | ((flags & CF) << 4) | (a & (XF | YF))) ^ CF
}

/// ADD rr,rr: S, Z and P/V survive; X/Y from the high byte of the result.
#[must_use]
pub fn add16(lhs: u16, rhs: u16, flags: u8) -> AluResult16 {
    let wide = u32::from(lhs) + u32::from(rhs);
    let result = wide as u16;
    let flags = (flags & (SF | ZF | PF))
        | (((u32::from(lhs) ^ u32::from(rhs) ^ wide) >> 8) as u8 & HF)
        | ((wide >> 16) as u8 & CF)
        | ((wide >> 8) as u8 & (XF | YF));
    AluResult16 { value: result, flags }
}

/// ADC HL,rr: `carry` is 0 or 1.
#[must_use]
pub fn adc16(lhs: u16, rhs: u16, carry: u8) -> AluResult16 {
    let wide = u32::from(lhs) + u32::from(rhs) + u32::from(carry);
    let result = wide as u16;
    let mut flags = (((u32::from(lhs) ^ u32::from(rhs) ^ wide) >> 8) as u8 & HF)
        | ((wide >> 16) as u8 & CF)
        | ((((u32::from(rhs) ^ u32::from(lhs) ^ 0x8000) & (u32::from(rhs) ^ wide)) >> 13) as u8
            & PF)
        | ((wide >> 8) as u8 & (SF | XF | YF));
    if result == 0 {
        flags |= ZF;
    }
    AluResult16 { value: result, flags }
}

/// SBC HL,rr: `carry` is 0 or 1.
#[must_use]
pub fn sbc16(lhs: u16, rhs: u16, carry: u8) -> AluResult16 {
    let wide = u32::from(lhs)
        .wrapping_sub(u32::from(rhs))
        .wrapping_sub(u32::from(carry));
    let result = wide as u16;
    let mut flags = (((u32::from(lhs) ^ u32::from(rhs) ^ wide) >> 8) as u8 & HF)
        | NF
        | ((wide >> 16) as u8 & CF)
        | ((((u32::from(rhs) ^ u32::from(lhs)) & (u32::from(lhs) ^ wide)) >> 13) as u8 & PF)
        | ((wide >> 8) as u8 & (SF | XF | YF));
    if result == 0 {
        flags |= ZF;
    }
    AluResult16 { value: result, flags }
}
