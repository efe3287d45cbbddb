//! Z80 register file.

/// A 16-bit register pair with byte views.
///
/// Stored as one word; the halves are derived by shift and mask, so the
/// layout does not depend on host byte order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RegisterPair(u16);

impl RegisterPair {
    #[must_use]
    pub const fn new(word: u16) -> Self {
        Self(word)
    }

    #[must_use]
    pub const fn word(self) -> u16 {
        self.0
    }

    /// High byte (A in AF, B in BC, ...).
    #[must_use]
    pub const fn high(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Low byte (F in AF, C in BC, ...).
    #[must_use]
    pub const fn low(self) -> u8 {
        self.0 as u8
    }

    pub fn set_word(&mut self, value: u16) {
        self.0 = value;
    }

    pub fn set_high(&mut self, value: u8) {
        self.0 = (self.0 & 0x00FF) | (u16::from(value) << 8);
    }

    pub fn set_low(&mut self, value: u8) {
        self.0 = (self.0 & 0xFF00) | u16::from(value);
    }
}

impl From<u16> for RegisterPair {
    fn from(word: u16) -> Self {
        Self(word)
    }
}

impl From<RegisterPair> for u16 {
    fn from(pair: RegisterPair) -> Self {
        pair.0
    }
}

/// The architectural state of a Z80.
///
/// Every field is public: hosts and debuggers may read or patch any register
/// between instructions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    // Main registers
    pub af: RegisterPair,
    pub bc: RegisterPair,
    pub de: RegisterPair,
    pub hl: RegisterPair,

    // Index and control registers
    pub ix: RegisterPair,
    pub iy: RegisterPair,
    pub sp: RegisterPair,
    pub pc: RegisterPair,

    // Shadow set, swapped in by EX AF,AF' and EXX
    pub af_alt: RegisterPair,
    pub bc_alt: RegisterPair,
    pub de_alt: RegisterPair,
    pub hl_alt: RegisterPair,

    /// Internal address latch (MEMPTR/WZ). Leaks into X/Y of BIT n,(HL).
    pub sh: RegisterPair,

    pub i: u8,
    /// Refresh counter, incremented once per M1 cycle. All eight bits count;
    /// only the low seven are architecturally visible.
    pub r: u8,
    /// Bit 7 of R as last written by LD R,A.
    pub r2: u8,

    // Interrupt state
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
    pub halt: bool,
    /// Set by EI: interrupts stay blocked for one more instruction.
    pub ei_mode: bool,
}

impl Registers {
    /// Register contents after power-on or /RESET.
    #[must_use]
    pub const fn power_on() -> Self {
        let ones = RegisterPair::new(0xFFFF);
        Self {
            af: ones,
            bc: ones,
            de: ones,
            hl: ones,
            ix: ones,
            iy: ones,
            sp: ones,
            pc: RegisterPair::new(0),
            af_alt: ones,
            bc_alt: ones,
            de_alt: ones,
            hl_alt: ones,
            sh: ones,
            i: 0,
            r: 0,
            r2: 0,
            iff1: false,
            iff2: false,
            im: 0,
            halt: false,
            ei_mode: false,
        }
    }

    #[must_use]
    pub const fn a(&self) -> u8 {
        self.af.high()
    }

    #[must_use]
    pub const fn f(&self) -> u8 {
        self.af.low()
    }

    #[must_use]
    pub const fn b(&self) -> u8 {
        self.bc.high()
    }

    #[must_use]
    pub const fn c(&self) -> u8 {
        self.bc.low()
    }

    #[must_use]
    pub const fn d(&self) -> u8 {
        self.de.high()
    }

    #[must_use]
    pub const fn e(&self) -> u8 {
        self.de.low()
    }

    #[must_use]
    pub const fn h(&self) -> u8 {
        self.hl.high()
    }

    #[must_use]
    pub const fn l(&self) -> u8 {
        self.hl.low()
    }

    pub fn set_a(&mut self, value: u8) {
        self.af.set_high(value);
    }

    pub fn set_f(&mut self, value: u8) {
        self.af.set_low(value);
    }

    /// R as LD A,R sees it: seven counting bits plus the stored bit 7.
    #[must_use]
    pub const fn visible_r(&self) -> u8 {
        (self.r & 0x7F) | (self.r2 & 0x80)
    }
}
