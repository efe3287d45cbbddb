//! CPU core trait.

use crate::Bus;

/// An instruction-stepped CPU core.
///
/// The CPU does not own its bus: every call that may touch memory borrows
/// one, so the same bus can be shared with other devices between steps.
/// Timing is accounted inside the CPU as elapsed ticks per step.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Make one scheduling decision: execute a single instruction (prefix
    /// bytes included) or accept one pending interrupt.
    ///
    /// Returns the ticks consumed.
    fn step<B: Bus>(&mut self, bus: &mut B) -> u32;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;

    /// Assert the maskable interrupt line. Returns true if interrupts are
    /// currently enabled, i.e. the request can be accepted.
    fn interrupt(&mut self) -> bool;

    /// Raise the non-maskable interrupt line.
    fn nmi(&mut self);

    /// Reset the CPU to its power-on state.
    fn reset(&mut self);
}
