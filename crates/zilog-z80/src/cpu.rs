//! Z80 CPU core with per-instruction timing.

mod cb;
mod ed;
mod execute;
mod indexed;
mod operands;
mod schedule;

use std::fmt;

use emu_core::{Bus, Cpu, Observable, Ticks, Value};
use log::{debug, trace};

use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF};
use crate::registers::Registers;
use crate::timing::Timing;

pub use schedule::Host;

/// State of the maskable interrupt input (/INT, active low).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntLine {
    #[default]
    High,
    Low,
}

/// State of the non-maskable interrupt input.
///
/// A falling edge latches `Edge`; accepting the NMI moves it to `Low`, and
/// only clearing the line re-arms the detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NmiLine {
    #[default]
    High,
    Edge,
    Low,
}

impl IntLine {
    const fn name(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

impl NmiLine {
    const fn name(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Edge => "edge",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for IntLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for NmiLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Z80 CPU.
///
/// The CPU does not own the bus. [`Z80::execute`] borrows a [`Host`] for
/// the whole run; [`Cpu::step`] borrows any [`Bus`] for one instruction.
/// All timing accumulates in a wrapping system-time counter.
pub struct Z80 {
    pub(crate) regs: Registers,
    timing: Timing,

    // === Scheduling ===
    system_time: Ticks,
    /// Host-scheduled horizon for the next timeout hook call.
    timeout: Ticks,
    /// Horizon up to which instructions run without interrupt checks.
    fast_timeout: Ticks,
    terminate: bool,

    // === Interrupt inputs ===
    /// Byte the interrupting device drives during acknowledge.
    data_bus: u8,
    /// Value `data_bus` falls back to after an IM 0 / IM 2 acknowledge.
    default_data_bus: u8,
    int_line: IntLine,
    nmi_line: NmiLine,
}

impl Z80 {
    /// Create a Z80 with documented Zilog timing, in its power-on state.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timing(Timing::Z80)
    }

    /// Create a Z80 with the given delay table.
    #[must_use]
    pub fn with_timing(timing: Timing) -> Self {
        let mut cpu = Self {
            regs: Registers::power_on(),
            timing,
            system_time: Ticks::ZERO,
            timeout: Ticks::ZERO,
            fast_timeout: Ticks::ZERO,
            terminate: false,
            data_bus: 0xFF,
            default_data_bus: 0xFF,
            int_line: IntLine::High,
            nmi_line: NmiLine::High,
        };
        cpu.update_fast_loop();
        cpu
    }

    /// Reset registers and interrupt inputs, placing system time at `time`.
    ///
    /// The scheduled timeout is kept; a pending [`Z80::stop`] is cleared.
    pub fn reset_at(&mut self, time: Ticks) {
        debug!("z80 reset at {}", time.get());
        self.regs = Registers::power_on();
        self.system_time = time;
        self.terminate = false;
        self.data_bus = 0xFF;
        self.default_data_bus = 0xFF;
        self.int_line = IntLine::High;
        self.nmi_line = NmiLine::High;
        self.update_fast_loop();
    }

    #[must_use]
    pub const fn regs(&self) -> &Registers {
        &self.regs
    }

    /// Mutable register access. Call between instructions only; changes to
    /// `halt`, `iff1` or `ei_mode` take effect at the next scheduling point.
    pub fn regs_mut(&mut self) -> &mut Registers {
        &mut self.regs
    }

    #[must_use]
    pub const fn system_time(&self) -> Ticks {
        self.system_time
    }

    #[must_use]
    pub const fn timeout(&self) -> Ticks {
        self.timeout
    }

    /// Schedule the next call of [`Host::timeout`] at absolute time `time`.
    pub fn set_timeout(&mut self, time: Ticks) {
        self.timeout = time;
        self.update_fast_loop();
    }

    /// Pull /INT low. The request stays asserted until [`Z80::clear_int`].
    pub fn set_int(&mut self) {
        self.int_line = IntLine::Low;
        self.update_fast_loop();
    }

    pub fn clear_int(&mut self) {
        self.int_line = IntLine::High;
        self.update_fast_loop();
    }

    /// Signal an NMI edge. Ignored unless the line is currently high, so
    /// repeated calls before the NMI is accepted request it only once.
    pub fn set_nmi(&mut self) {
        if self.nmi_line == NmiLine::High {
            self.nmi_line = NmiLine::Edge;
            self.update_fast_loop();
        }
    }

    /// Release the NMI line, re-arming edge detection.
    pub fn clear_nmi(&mut self) {
        self.nmi_line = NmiLine::High;
        self.update_fast_loop();
    }

    #[must_use]
    pub const fn int_line(&self) -> IntLine {
        self.int_line
    }

    #[must_use]
    pub const fn nmi_line(&self) -> NmiLine {
        self.nmi_line
    }

    /// Set the byte an interrupting device places on the data bus.
    pub fn set_data_bus(&mut self, value: u8) {
        self.data_bus = value;
    }

    /// Set the data bus byte and the value it returns to after acknowledge.
    pub fn set_data_bus_with_default(&mut self, value: u8, default: u8) {
        self.data_bus = value;
        self.default_data_bus = default;
    }

    #[must_use]
    pub const fn data_bus(&self) -> u8 {
        self.data_bus
    }

    #[must_use]
    pub const fn default_data_bus(&self) -> u8 {
        self.default_data_bus
    }

    /// Request [`Z80::execute`] to return. The current instruction completes.
    ///
    /// The request holds until the next reset: a stopped CPU returns from
    /// every later `execute` at once.
    pub fn stop(&mut self) {
        trace!("z80 stop requested at {}", self.system_time.get());
        self.terminate = true;
    }

    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.terminate
    }

    /// Pop the return address into PC without charging time.
    ///
    /// Used by test harnesses to skip trap routines after handling system
    /// calls (e.g., CP/M BDOS emulation).
    ///
    /// Only available in test builds.
    #[cfg(feature = "test-utils")]
    pub fn force_ret<B: Bus>(&mut self, bus: &mut B) {
        let sp = self.regs.sp.word();
        let lo = bus.read(sp);
        let hi = bus.read(sp.wrapping_add(1));
        self.regs.sp.set_word(sp.wrapping_add(2));
        self.regs.pc.set_word(u16::from_le_bytes([lo, hi]));
    }
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

// Bus access and time accounting.
impl Z80 {
    fn delay(&mut self, ticks: u32) {
        self.system_time += ticks;
    }

    /// M1 cycle overhead: refresh counter plus the extra fetch delay.
    fn m1(&mut self) {
        self.regs.r = self.regs.r.wrapping_add(1);
        self.delay(self.timing.m1);
    }

    fn read_mem<B: Bus>(&mut self, bus: &mut B, address: u16) -> u8 {
        self.delay(self.timing.mem);
        bus.read(address)
    }

    fn write_mem<B: Bus>(&mut self, bus: &mut B, address: u16, value: u8) {
        self.delay(self.timing.mem);
        bus.write(address, value);
    }

    /// Opcode-stream read: costs `mem_op`, leaves PC alone.
    fn read_opcode_at<B: Bus>(&mut self, bus: &mut B, address: u16) -> u8 {
        self.delay(self.timing.mem_op);
        bus.read(address)
    }

    /// Read the byte at PC and advance PC (opcode, operand or displacement).
    fn fetch_byte<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let pc = self.regs.pc.word();
        self.regs.pc.set_word(pc.wrapping_add(1));
        self.read_opcode_at(bus, pc)
    }

    fn fetch_word<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch_byte(bus);
        let hi = self.fetch_byte(bus);
        u16::from_le_bytes([lo, hi])
    }

    fn read_port<B: Bus>(&mut self, bus: &mut B, port: u16) -> u8 {
        self.regs.sh.set_word(port.wrapping_add(1));
        self.delay(self.timing.pre_io);
        let value = bus.read_io(port);
        self.delay(self.timing.post_io);
        value
    }

    fn write_port<B: Bus>(&mut self, bus: &mut B, port: u16, value: u8) {
        self.regs.sh.set_word(port.wrapping_add(1));
        self.delay(self.timing.pre_io);
        bus.write_io(port, value);
        self.delay(self.timing.post_io);
    }

    fn a(&self) -> u8 {
        self.regs.a()
    }

    fn set_a(&mut self, value: u8) {
        self.regs.set_a(value);
    }

    fn f(&self) -> u8 {
        self.regs.f()
    }

    fn set_f(&mut self, value: u8) {
        self.regs.set_f(value);
    }
}

impl Cpu for Z80 {
    type Registers = Registers;

    fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let start = self.system_time;
        self.step_once(bus);
        self.system_time.since(start)
    }

    fn pc(&self) -> u16 {
        self.regs.pc.word()
    }

    fn registers(&self) -> Self::Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.regs.halt
    }

    fn interrupt(&mut self) -> bool {
        self.set_int();
        self.regs.iff1
    }

    fn nmi(&mut self) {
        self.set_nmi();
    }

    fn reset(&mut self) {
        self.reset_at(self.system_time);
    }
}

/// All query paths supported by the Z80.
const Z80_QUERY_PATHS: &[&str] = &[
    // Main registers
    "a", "f", "b", "c", "d", "e", "h", "l",
    // Register pairs
    "af", "bc", "de", "hl",
    // Alternate pairs
    "af'", "bc'", "de'", "hl'",
    // Index registers
    "ix", "iy", "ixh", "ixl", "iyh", "iyl",
    // Other registers
    "sp", "pc", "sh", "i", "r", "r2",
    // Flags (individual)
    "flags.s", "flags.z", "flags.y", "flags.h",
    "flags.x", "flags.p", "flags.n", "flags.c",
    // Interrupt state
    "iff1", "iff2", "im", "halted", "ei_mode", "int_line", "nmi_line",
    // Scheduler state
    "system_time", "timeout", "fast_timeout", "data_bus", "default_data_bus",
];

impl Observable for Z80 {
    fn query(&self, path: &str) -> Option<Value> {
        let regs = &self.regs;
        let flag = |mask: u8| Some(Value::from(regs.f() & mask != 0));
        match path {
            // Main registers
            "a" => Some(regs.a().into()),
            "f" => Some(regs.f().into()),
            "b" => Some(regs.b().into()),
            "c" => Some(regs.c().into()),
            "d" => Some(regs.d().into()),
            "e" => Some(regs.e().into()),
            "h" => Some(regs.h().into()),
            "l" => Some(regs.l().into()),

            // Register pairs
            "af" => Some(regs.af.word().into()),
            "bc" => Some(regs.bc.word().into()),
            "de" => Some(regs.de.word().into()),
            "hl" => Some(regs.hl.word().into()),
            "af'" => Some(regs.af_alt.word().into()),
            "bc'" => Some(regs.bc_alt.word().into()),
            "de'" => Some(regs.de_alt.word().into()),
            "hl'" => Some(regs.hl_alt.word().into()),

            // Index registers
            "ix" => Some(regs.ix.word().into()),
            "iy" => Some(regs.iy.word().into()),
            "ixh" => Some(regs.ix.high().into()),
            "ixl" => Some(regs.ix.low().into()),
            "iyh" => Some(regs.iy.high().into()),
            "iyl" => Some(regs.iy.low().into()),

            // Other registers
            "sp" => Some(regs.sp.word().into()),
            "pc" => Some(regs.pc.word().into()),
            "sh" => Some(regs.sh.word().into()),
            "i" => Some(regs.i.into()),
            "r" => Some(regs.visible_r().into()),
            "r2" => Some(regs.r2.into()),

            // Individual flags
            "flags.s" => flag(SF),
            "flags.z" => flag(ZF),
            "flags.y" => flag(YF),
            "flags.h" => flag(HF),
            "flags.x" => flag(XF),
            "flags.p" => flag(PF),
            "flags.n" => flag(NF),
            "flags.c" => flag(CF),

            // Interrupt state
            "iff1" => Some(regs.iff1.into()),
            "iff2" => Some(regs.iff2.into()),
            "im" => Some(regs.im.into()),
            "halted" => Some(regs.halt.into()),
            "ei_mode" => Some(regs.ei_mode.into()),
            "int_line" => Some(Value::Name(self.int_line.name())),
            "nmi_line" => Some(Value::Name(self.nmi_line.name())),

            // Scheduler state
            "system_time" => Some(self.system_time.get().into()),
            "timeout" => Some(self.timeout.get().into()),
            "fast_timeout" => Some(self.fast_timeout.get().into()),
            "data_bus" => Some(self.data_bus.into()),
            "default_data_bus" => Some(self.default_data_bus.into()),

            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        Z80_QUERY_PATHS
    }
}
