//! Table-driven Z80 interpreter.
//!
//! Instructions execute whole: each one reads its operands through a
//! [`emu_core::Bus`] and adds its cost to a wrapping system-time counter.
//! The per-operation delays come from a [`Timing`] table, so one core
//! serves documented Zilog timing and machines that insert wait states.
//!
//! Two ways to drive the CPU:
//!
//! - [`Z80::execute`] runs until stopped, calling [`Host::timeout`] at
//!   host-scheduled points in time.
//! - [`emu_core::Cpu::step`] runs one instruction or interrupt acknowledge
//!   and returns its cost.

pub mod alu;
mod cpu;
pub mod flags;
mod registers;
mod timing;

pub use cpu::{Host, IntLine, NmiLine, Z80};
pub use flags::{CF, HF, NF, PF, SF, XF, YF, ZF};
pub use registers::{RegisterPair, Registers};
pub use timing::Timing;
