//! Z80 flag register bits and the precomputed flag tables.

/// Sign flag (bit 7) - set if result is negative.
pub const SF: u8 = 0b1000_0000;

/// Zero flag (bit 6) - set if result is zero.
pub const ZF: u8 = 0b0100_0000;

/// Undocumented flag (bit 5) - usually a copy of bit 5 of a result.
pub const YF: u8 = 0b0010_0000;

/// Half-carry flag (bit 4) - carry from bit 3 to bit 4.
pub const HF: u8 = 0b0001_0000;

/// Undocumented flag (bit 3) - usually a copy of bit 3 of a result.
pub const XF: u8 = 0b0000_1000;

/// Parity/Overflow flag (bit 2) - parity or overflow depending on instruction.
pub const PF: u8 = 0b0000_0100;

/// Add/Subtract flag (bit 1) - set if last operation was subtraction.
pub const NF: u8 = 0b0000_0010;

/// Carry flag (bit 0) - carry out of bit 7.
pub const CF: u8 = 0b0000_0001;

/// Lookup tables keyed by a result byte (or, for DAA, by A and three flags).
pub struct FlagTables {
    /// S, Z, Y, X of the index.
    pub zsxy: [u8; 256],
    /// S, Z, Y, X and even parity of the index.
    pub zspxy: [u8; 256],
    /// S, Z, even parity, and H always set. Indexed by `value & mask` for BIT.
    pub zsph: [u8; 256],
    /// `A | C << 8 | N << 9 | H << 10` to the corrected AF word.
    pub daa: [u16; 0x800],
}

/// The tables, evaluated at compile time.
pub static TABLES: FlagTables = FlagTables::build();

impl FlagTables {
    #[must_use]
    pub const fn build() -> Self {
        let mut zsxy = [0u8; 256];
        let mut zspxy = [0u8; 256];
        let mut zsph = [0u8; 256];

        let mut i = 0;
        while i < 256 {
            let value = i as u8;
            let parity = if value.count_ones() % 2 == 0 { PF } else { 0 };
            let zero = if value == 0 { ZF } else { 0 };
            let flags = parity | HF | zero | (value & (SF | YF | XF));

            zsxy[i] = flags & (ZF | SF | XF | YF);
            zspxy[i] = flags & (ZF | SF | XF | YF | PF);
            zsph[i] = flags & (ZF | SF | PF | HF);
            i += 1;
        }

        let mut daa = [0u16; 0x800];
        let mut i = 0;
        while i < 0x800 {
            let carry = i & 0x100 != 0;
            let subtract = i & 0x200 != 0;
            let half = i & 0x400 != 0;
            let a = (i & 0xFF) as u8;
            let hi = a >> 4;
            let lo = a & 0x0F;

            let diff: u8 = if carry {
                if lo <= 9 && !half { 0x60 } else { 0x66 }
            } else if lo >= 10 {
                if hi <= 8 { 0x06 } else { 0x66 }
            } else if hi >= 10 {
                if half { 0x66 } else { 0x60 }
            } else if half {
                0x06
            } else {
                0x00
            };

            let result = if subtract {
                a.wrapping_sub(diff)
            } else {
                a.wrapping_add(diff)
            };

            let mut flags = zspxy[result as usize];
            if subtract {
                flags |= NF;
            }
            if carry || (if lo <= 9 { hi >= 10 } else { hi >= 9 }) {
                flags |= CF;
            }
            if (subtract && half && lo <= 5) || (!subtract && lo >= 10) {
                flags |= HF;
            }

            daa[i] = (result as u16) << 8 | flags as u16;
            i += 1;
        }

        Self { zsxy, zspxy, zsph, daa }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_and_zero() {
        assert_eq!(TABLES.zspxy[0x00], ZF | PF);
        assert_eq!(TABLES.zspxy[0x01], 0);
        assert_eq!(TABLES.zspxy[0x03], PF);
        assert_eq!(TABLES.zspxy[0xFF], SF | YF | XF | PF);
        assert_eq!(TABLES.zsxy[0xFF], SF | YF | XF);
    }

    #[test]
    fn bit_table_sets_half_carry_and_zero_parity() {
        // BIT n on a clear bit: Z and P/V set together.
        assert_eq!(TABLES.zsph[0x00], ZF | PF | HF);
        // Bit 7 set: S, no Z.
        assert_eq!(TABLES.zsph[0x80], SF | HF);
        assert_eq!(TABLES.zsph[0x08], HF);
    }

    #[test]
    fn every_entry_is_a_flag_byte_for_its_result() {
        for i in 0..256usize {
            let value = i as u8;
            assert_eq!(TABLES.zsxy[i] & !(SF | ZF | YF | XF), 0);
            assert_eq!(TABLES.zspxy[i] & (SF | YF | XF), value & (SF | YF | XF));
            assert_eq!(TABLES.zspxy[i] & ZF != 0, value == 0);
        }
        for entry in TABLES.daa {
            let a = (entry >> 8) as u8;
            let f = entry as u8;
            assert_eq!(f & (SF | ZF | YF | XF | PF), TABLES.zspxy[usize::from(a)]);
        }
    }

    #[test]
    fn daa_after_bcd_addition() {
        let lookup = |a: u8, f: u8| {
            let index = usize::from(a) | usize::from(f & 3) << 8 | usize::from(f & HF) << 6;
            TABLES.daa[index]
        };

        // 0x15 + 0x27 = 0x3C -> 0x42
        assert_eq!(lookup(0x3C, 0) >> 8, 0x42);
        // 0x99 + 0x01 = 0x9A -> 0x00 with carry
        let entry = lookup(0x9A, 0);
        assert_eq!(entry >> 8, 0x00);
        assert_ne!(entry & u16::from(CF), 0);
        assert_ne!(entry & u16::from(ZF), 0);
        // 0x09 + 0x09 = 0x12 with H -> 0x18
        assert_eq!(lookup(0x12, HF) >> 8, 0x18);
        // 0x42 - 0x15 = 0x2D with N and H -> 0x27
        let entry = lookup(0x2D, NF | HF);
        assert_eq!(entry >> 8, 0x27);
        assert_ne!(entry & u16::from(NF), 0);
    }
}
