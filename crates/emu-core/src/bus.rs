//! Memory and I/O bus interface.

/// Memory and I/O bus interface.
///
/// The CPU reaches memory and peripherals only through this trait. Address
/// decoding, bank switching and read-only regions are the implementor's
/// business: a write to ROM may simply be dropped.
pub trait Bus {
    /// Read a byte from the 64 KB memory space.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the 64 KB memory space.
    fn write(&mut self, address: u16, value: u8);

    /// Read a byte from an I/O port.
    ///
    /// The full 16-bit port value is passed; most devices decode only the
    /// low byte.
    fn read_io(&mut self, port: u16) -> u8;

    /// Write a byte to an I/O port.
    fn write_io(&mut self, port: u16, value: u8);
}

/// Flat 64 KB RAM with a latch per input port.
///
/// Input ports return whatever was latched with [`SimpleBus::set_port`]
/// (0xFF until then). Every output is appended to a log so tests can check
/// what the CPU sent.
pub struct SimpleBus {
    ram: Box<[u8; 0x1_0000]>,
    ports: [u8; 256],
    outputs: Vec<(u16, u8)>,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: Box::new([0; 0x1_0000]),
            ports: [0xFF; 256],
            outputs: Vec::new(),
        }
    }

    /// Copy `data` into RAM starting at `address`, wrapping at 0xFFFF.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.ram[usize::from(addr)] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Read RAM without going through the CPU.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    /// Read a little-endian word without going through the CPU.
    #[must_use]
    pub fn peek_word(&self, address: u16) -> u16 {
        u16::from_le_bytes([self.peek(address), self.peek(address.wrapping_add(1))])
    }

    /// Write RAM without going through the CPU.
    pub fn poke(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address)] = value;
    }

    /// Latch the value returned by reads of `port` (low byte decoded).
    pub fn set_port(&mut self, port: u8, value: u8) {
        self.ports[usize::from(port)] = value;
    }

    /// All port writes so far, oldest first, with the full 16-bit port.
    #[must_use]
    pub fn outputs(&self) -> &[(u16, u8)] {
        &self.outputs
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address)] = value;
    }

    fn read_io(&mut self, port: u16) -> u8 {
        self.ports[usize::from(port & 0xFF)]
    }

    fn write_io(&mut self, port: u16, value: u8) {
        self.outputs.push((port, value));
    }
}
