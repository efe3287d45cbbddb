//! Core traits and types for cycle-counted emulation.
//!
//! Time is a wrapping count of system-clock ticks. Components compare it
//! against scheduled horizons, never against wall-clock time.

mod bus;
mod cpu;
mod observable;
mod ticks;

pub use bus::{Bus, SimpleBus};
pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use ticks::Ticks;
