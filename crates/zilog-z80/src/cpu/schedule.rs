//! Run loop, interrupt acceptance and host scheduling.
//!
//! Between the current time and `fast_timeout` instructions run back to
//! back with no interrupt checks. `fast_timeout` collapses to "now" whenever
//! the CPU has something to decide (an interrupt became eligible, or EI
//! just ran) and otherwise tracks the host timeout, so the common path is a
//! single comparison per instruction.

use emu_core::Bus;
use log::trace;

use super::{IntLine, NmiLine, Z80};

/// The machine around the CPU: its bus plus the timeout hook.
pub trait Host: Bus {
    /// Called by [`Z80::execute`] once system time reaches the scheduled
    /// timeout. The host does its periodic work here (raise or clear
    /// interrupt lines, reschedule with [`Z80::set_timeout`], or
    /// [`Z80::stop`]). If it neither reschedules nor stops, the hook is
    /// called again after every instruction.
    fn timeout(&mut self, cpu: &mut Z80);
}

impl Z80 {
    /// True when an interrupt would be accepted at an instruction boundary.
    pub(super) fn interrupt_eligible(&self) -> bool {
        (self.int_line == IntLine::Low && self.regs.iff1) || self.nmi_line == NmiLine::Edge
    }

    /// Recompute the fast-loop horizon after any change to the halt state,
    /// the interrupt lines, IFF1 or the timeout.
    pub(super) fn update_fast_loop(&mut self) {
        self.fast_timeout = if self.regs.halt {
            self.timeout
        } else if self.regs.ei_mode || self.interrupt_eligible() {
            self.system_time
        } else {
            self.timeout
        };
    }

    /// Run until [`Z80::stop`] is called, invoking the host's timeout hook
    /// whenever system time reaches the scheduled timeout.
    pub fn execute<H: Host>(&mut self, host: &mut H) {
        while !self.terminate {
            if self.system_time.has_reached(self.timeout) {
                host.timeout(self);
            }

            while !self.terminate && !self.system_time.has_reached(self.fast_timeout) {
                self.execute_next(host);
            }

            if self.terminate || self.regs.halt {
                continue;
            }

            // The instruction after EI always runs before an interrupt.
            if self.regs.ei_mode {
                self.regs.ei_mode = false;
                self.execute_next(host);
                self.update_fast_loop();
                continue;
            }

            if self.interrupt_eligible() {
                self.accept_interrupt(host);
            }
        }
    }

    /// One scheduling decision: the instruction after EI, an interrupt
    /// acknowledge, or the next instruction.
    pub(super) fn step_once<B: Bus>(&mut self, bus: &mut B) {
        if self.regs.ei_mode {
            self.regs.ei_mode = false;
            self.execute_next(bus);
        } else if !self.regs.halt && self.interrupt_eligible() {
            self.accept_interrupt(bus);
        } else {
            self.execute_next(bus);
        }
        self.update_fast_loop();
    }

    fn accept_interrupt<B: Bus>(&mut self, bus: &mut B) {
        if self.nmi_line == NmiLine::Edge {
            trace!("z80 nmi at pc {:#06X}", self.regs.pc.word());
            self.nmi_line = NmiLine::Low;
            let pc = self.regs.pc.word();
            self.push_untimed(bus, pc);
            self.regs.iff1 = false;
            self.regs.pc.set_word(0x0066);
            self.m1();
            self.delay(self.timing.nmi);
        } else {
            trace!("z80 int im {} at pc {:#06X}", self.regs.im, self.regs.pc.word());
            self.regs.iff1 = false;
            self.regs.iff2 = false;
            match self.regs.im {
                0 => {
                    self.delay(self.timing.im);
                    let op = self.data_bus;
                    self.data_bus = self.default_data_bus;
                    self.execute_instruction(bus, op);
                }
                1 => {
                    self.delay(self.timing.im);
                    self.execute_instruction(bus, 0xFF);
                }
                _ => {
                    let table = u16::from(self.data_bus) | u16::from(self.regs.i) << 8;
                    self.data_bus = self.default_data_bus;
                    let pc = self.regs.pc.word();
                    self.push_untimed(bus, pc);
                    let lo = bus.read(table);
                    let hi = bus.read(table.wrapping_add(1));
                    self.regs.pc.set_word(u16::from_le_bytes([lo, hi]));
                    self.m1();
                    self.delay(self.timing.im2);
                }
            }
        }
        self.update_fast_loop();
    }
}

#[cfg(test)]
mod tests {
    use emu_core::{Cpu, SimpleBus, Ticks};

    use super::*;

    #[test]
    fn fast_horizon_follows_state() {
        let mut cpu = Z80::new();
        cpu.set_timeout(Ticks::new(1000));
        assert_eq!(cpu.fast_timeout, Ticks::new(1000));

        // INT with interrupts disabled does not shorten the horizon.
        cpu.set_int();
        assert_eq!(cpu.fast_timeout, Ticks::new(1000));

        cpu.regs.iff1 = true;
        cpu.update_fast_loop();
        assert_eq!(cpu.fast_timeout, cpu.system_time);

        cpu.regs.halt = true;
        cpu.update_fast_loop();
        assert_eq!(cpu.fast_timeout, Ticks::new(1000));
    }

    #[test]
    fn nmi_keeps_iff2() {
        let mut cpu = Z80::new();
        let mut bus = SimpleBus::new();
        cpu.regs.iff1 = true;
        cpu.regs.iff2 = true;
        cpu.regs.sp.set_word(0x8000);
        cpu.regs.pc.set_word(0x1234);
        cpu.set_nmi();

        assert_eq!(cpu.step(&mut bus), 11);
        assert_eq!(cpu.regs.pc.word(), 0x0066);
        assert!(!cpu.regs.iff1);
        assert!(cpu.regs.iff2);
        assert_eq!(bus.peek_word(0x7FFE), 0x1234);
        assert_eq!(cpu.nmi_line(), NmiLine::Low);
    }

    #[test]
    fn im0_executes_data_bus_byte() {
        let mut cpu = Z80::new();
        let mut bus = SimpleBus::new();
        cpu.regs.iff1 = true;
        cpu.regs.sp.set_word(0x8000);
        cpu.regs.pc.set_word(0x0100);
        cpu.set_data_bus_with_default(0xD7, 0xFF);
        cpu.set_int();

        // RST 10h
        assert_eq!(cpu.step(&mut bus), 13);
        assert_eq!(cpu.regs.pc.word(), 0x0010);
        assert_eq!(cpu.data_bus(), 0xFF);
        assert_eq!(bus.peek_word(0x7FFE), 0x0100);
    }
}
