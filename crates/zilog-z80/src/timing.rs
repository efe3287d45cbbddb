//! Per-operation delays, in system-clock ticks.
//!
//! Every instruction's cost is the sum of the delays charged along its
//! execution path: one `mem_op` per opcode or operand fetch plus `m1` per
//! M1 cycle, one `mem` per data access, `pre_io + post_io` per port access,
//! and the internal delays named below.

/// Delay table. All values are ticks added to system time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Memory read or write.
    pub mem: u32,
    /// Opcode, displacement or immediate operand fetch.
    pub mem_op: u32,
    /// Port access, before the transfer.
    pub pre_io: u32,
    /// Port access, after the transfer.
    pub post_io: u32,
    /// Extra cost of an M1 cycle on top of its fetch.
    pub m1: u32,
    /// IM 0 / IM 1 interrupt acknowledge.
    pub im: u32,
    /// IM 2 interrupt acknowledge, including the vector read and PC push.
    pub im2: u32,
    /// NMI acknowledge, including the PC push.
    pub nmi: u32,
    /// LD (IX+d),n: address add overlapping the operand fetch.
    pub parallel: u32,
    /// Block instruction repeat, and the compare step of CPI/CPD.
    pub block: u32,
    /// Relative jump or index displacement add.
    pub add8: u32,
    /// 16-bit add.
    pub add16: u32,
    pub bit: u32,
    pub call: u32,
    pub djnz: u32,
    pub ex_sp_hl: u32,
    /// Read-modify-write of a memory operand.
    pub inc: u32,
    pub inc16: u32,
    pub inout: u32,
    /// LD A,I / LD A,R / LD I,A / LD R,A.
    pub ld: u32,
    pub ldi: u32,
    pub push: u32,
    /// Conditional return, charged whether or not it is taken.
    pub ret: u32,
    pub rld: u32,
    pub ld_sp_hl: u32,
    /// BIT n,(IX+d) address computation.
    pub bit_ix: u32,
}

impl Timing {
    /// Documented Zilog timing: an opcode fetch is four T-states.
    pub const Z80: Self = Self {
        mem: 3,
        mem_op: 3,
        pre_io: 1,
        post_io: 3,
        m1: 1,
        im: 5,
        im2: 18,
        nmi: 10,
        parallel: 2,
        block: 5,
        add8: 5,
        add16: 7,
        bit: 1,
        call: 1,
        djnz: 1,
        ex_sp_hl: 3,
        inc: 1,
        inc16: 2,
        inout: 1,
        ld: 1,
        ldi: 2,
        push: 1,
        ret: 1,
        rld: 4,
        ld_sp_hl: 2,
        bit_ix: 2,
    };

    /// MSX bus timing: every M1 cycle carries one extra wait state.
    pub const MSX: Self = Self {
        m1: 2,
        im: 2,
        im2: 19,
        nmi: 11,
        ..Self::Z80
    };

    /// Cost of fetching and decoding one opcode byte.
    #[must_use]
    pub const fn opcode_fetch(&self) -> u32 {
        self.mem_op + self.m1
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::Z80
    }
}
