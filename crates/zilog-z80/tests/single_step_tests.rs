//! Integration tests using Tom Harte's `SingleStepTests` for the Z80.
//!
//! Each file holds 1,000 randomised cases for one opcode: an initial CPU
//! and RAM image, the expected final image, and the bus cycles taken. The
//! interpreter runs whole instructions, so cycle counts are compared as a
//! total. The undocumented X/Y flag bits, WZ and the Q/P latches are not
//! compared; HALT files are skipped because the CPU re-executes HALT in
//! place rather than issuing NOP cycles.
//!
//! Test data lives in `test-data/z80/v1/`.

use emu_core::{Bus, Cpu};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use zilog_z80::{XF, YF, Z80};

/// Flat 64KB RAM bus with I/O port support for testing.
struct TestBus {
    ram: Box<[u8; 0x1_0000]>,
    /// Preloaded port values for IN instructions, by full 16-bit port.
    io_read_values: HashMap<u16, u8>,
}

impl TestBus {
    fn new() -> Self {
        Self {
            ram: Box::new([0; 0x1_0000]),
            io_read_values: HashMap::new(),
        }
    }

    fn load_ram(&mut self, entries: &[(u16, u8)]) {
        for &(addr, value) in entries {
            self.ram[usize::from(addr)] = value;
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        self.ram[usize::from(addr)]
    }
}

impl Bus for TestBus {
    fn read(&mut self, address: u16) -> u8 {
        self.ram[usize::from(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address)] = value;
    }

    fn read_io(&mut self, port: u16) -> u8 {
        self.io_read_values.get(&port).copied().unwrap_or(0xFF)
    }

    fn write_io(&mut self, _port: u16, _value: u8) {}
}

/// JSON test case format.
#[derive(Deserialize)]
struct TestCase {
    name: String,
    initial: CpuState,
    #[serde(rename = "final")]
    final_state: CpuState,
    cycles: Vec<serde_json::Value>,
    #[serde(default)]
    ports: Vec<(u16, u8, String)>,
}

/// JSON CPU state format. WZ, P and Q are present but not modelled.
#[derive(Deserialize)]
struct CpuState {
    pc: u16,
    sp: u16,
    a: u8,
    b: u8,
    c: u8,
    d: u8,
    e: u8,
    f: u8,
    h: u8,
    l: u8,
    i: u8,
    r: u8,
    ix: u16,
    iy: u16,
    #[serde(rename = "af_")]
    af_alt: u16,
    #[serde(rename = "bc_")]
    bc_alt: u16,
    #[serde(rename = "de_")]
    de_alt: u16,
    #[serde(rename = "hl_")]
    hl_alt: u16,
    iff1: u8,
    iff2: u8,
    im: u8,
    ei: u8,
    ram: Vec<(u16, u8)>,
}

fn word(hi: u8, lo: u8) -> u16 {
    u16::from_le_bytes([lo, hi])
}

/// Set up the CPU and bus from the initial test state.
fn setup(cpu: &mut Z80, bus: &mut TestBus, state: &CpuState, ports: &[(u16, u8, String)]) {
    bus.load_ram(&state.ram);

    bus.io_read_values.clear();
    for (port, value, dir) in ports {
        if dir == "r" {
            bus.io_read_values.insert(*port, *value);
        }
    }

    let regs = cpu.regs_mut();
    regs.af.set_word(word(state.a, state.f));
    regs.bc.set_word(word(state.b, state.c));
    regs.de.set_word(word(state.d, state.e));
    regs.hl.set_word(word(state.h, state.l));
    regs.af_alt.set_word(state.af_alt);
    regs.bc_alt.set_word(state.bc_alt);
    regs.de_alt.set_word(state.de_alt);
    regs.hl_alt.set_word(state.hl_alt);
    regs.ix.set_word(state.ix);
    regs.iy.set_word(state.iy);
    regs.sp.set_word(state.sp);
    regs.pc.set_word(state.pc);
    regs.i = state.i;
    regs.r = state.r;
    regs.r2 = state.r;
    regs.iff1 = state.iff1 != 0;
    regs.iff2 = state.iff2 != 0;
    regs.im = state.im;
    regs.ei_mode = state.ei != 0;
}

/// Compare the CPU/bus state against expected, returning a list of mismatches.
fn compare(
    cpu: &Z80,
    bus: &TestBus,
    expected: &CpuState,
    ticks: u32,
    want_ticks: usize,
) -> Vec<String> {
    let mut errors = Vec::new();
    let regs = cpu.regs();

    check_u8(&mut errors, "A", regs.a(), expected.a);
    let mask = !(XF | YF);
    check_u8(&mut errors, "F", regs.f() & mask, expected.f & mask);
    check_u8(&mut errors, "B", regs.b(), expected.b);
    check_u8(&mut errors, "C", regs.c(), expected.c);
    check_u8(&mut errors, "D", regs.d(), expected.d);
    check_u8(&mut errors, "E", regs.e(), expected.e);
    check_u8(&mut errors, "H", regs.h(), expected.h);
    check_u8(&mut errors, "L", regs.l(), expected.l);

    check_u16(&mut errors, "AF'", regs.af_alt.word(), expected.af_alt);
    check_u16(&mut errors, "BC'", regs.bc_alt.word(), expected.bc_alt);
    check_u16(&mut errors, "DE'", regs.de_alt.word(), expected.de_alt);
    check_u16(&mut errors, "HL'", regs.hl_alt.word(), expected.hl_alt);

    check_u16(&mut errors, "IX", regs.ix.word(), expected.ix);
    check_u16(&mut errors, "IY", regs.iy.word(), expected.iy);
    check_u16(&mut errors, "SP", regs.sp.word(), expected.sp);
    check_u16(&mut errors, "PC", regs.pc.word(), expected.pc);
    check_u8(&mut errors, "I", regs.i, expected.i);
    check_u8(&mut errors, "R", regs.visible_r(), expected.r);

    check_u8(&mut errors, "IFF1", u8::from(regs.iff1), expected.iff1);
    check_u8(&mut errors, "IFF2", u8::from(regs.iff2), expected.iff2);
    check_u8(&mut errors, "IM", regs.im, expected.im);
    check_u8(&mut errors, "EI", u8::from(regs.ei_mode), expected.ei);

    if ticks as usize != want_ticks {
        errors.push(format!("cycles: got {ticks}, want {want_ticks}"));
    }

    for &(addr, expected_val) in &expected.ram {
        let actual_val = bus.peek(addr);
        if actual_val != expected_val {
            errors.push(format!(
                "RAM[${addr:04X}]: got ${actual_val:02X}, want ${expected_val:02X}"
            ));
        }
    }

    errors
}

fn check_u8(errors: &mut Vec<String>, name: &str, actual: u8, expected: u8) {
    if actual != expected {
        errors.push(format!("{name}: got ${actual:02X}, want ${expected:02X}"));
    }
}

fn check_u16(errors: &mut Vec<String>, name: &str, actual: u16, expected: u16) {
    if actual != expected {
        errors.push(format!("{name}: got ${actual:04X}, want ${expected:04X}"));
    }
}

fn filenames() -> Vec<String> {
    let mut names = Vec::new();
    for opcode in 0..=0xFFu8 {
        if !matches!(opcode, 0xCB | 0xDD | 0xED | 0xFD | 0x76) {
            names.push(format!("{opcode:02x}.json"));
        }
        names.push(format!("cb {opcode:02x}.json"));
        names.push(format!("ed {opcode:02x}.json"));
        if opcode != 0x76 {
            names.push(format!("dd {opcode:02x}.json"));
            names.push(format!("fd {opcode:02x}.json"));
        }
        names.push(format!("dd cb __ {opcode:02x}.json"));
        names.push(format!("fd cb __ {opcode:02x}.json"));
    }
    names
}

/// Run all Z80 `SingleStepTests` found under `test-data/z80/v1`.
#[test]
#[ignore = "requires test-data/z80, run with --ignored"]
fn run_all() {
    let test_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("parent of crate dir")
        .parent()
        .expect("workspace root")
        .join("test-data/z80/v1");

    if !test_dir.exists() {
        eprintln!("Test data not found at {}", test_dir.display());
        eprintln!("Skipping SingleStepTests.");
        return;
    }

    let mut total_pass = 0u64;
    let mut total_fail = 0u64;
    let mut total_files = 0u32;

    for filename in filenames() {
        let path = test_dir.join(&filename);
        if !path.exists() {
            continue;
        }

        let data = fs::read_to_string(&path).unwrap_or_else(|e| {
            panic!("Failed to read {}: {e}", path.display());
        });
        let tests: Vec<TestCase> = serde_json::from_str(&data).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {e}", path.display());
        });

        let mut file_pass = 0u32;
        let mut file_fail = 0u32;
        let mut first_failures: Vec<String> = Vec::new();

        for test in &tests {
            let mut cpu = Z80::new();
            let mut bus = TestBus::new();
            setup(&mut cpu, &mut bus, &test.initial, &test.ports);

            let ticks = cpu.step(&mut bus);
            let errors = compare(&cpu, &bus, &test.final_state, ticks, test.cycles.len());

            if errors.is_empty() {
                file_pass += 1;
            } else {
                file_fail += 1;
                if first_failures.len() < 5 {
                    first_failures.push(format!("  FAIL [{}]: {}", test.name, errors.join(", ")));
                }
            }
        }

        let status = if file_fail == 0 { "PASS" } else { "FAIL" };
        println!("{filename}: {status} - {file_pass}/{} passed", file_pass + file_fail);
        for msg in &first_failures {
            println!("{msg}");
        }

        total_pass += u64::from(file_pass);
        total_fail += u64::from(file_fail);
        total_files += 1;
    }

    println!();
    println!("=== Z80 SingleStepTests Summary ===");
    println!(
        "Files: {total_files}, Total: {}, Pass: {total_pass}, Fail: {total_fail}",
        total_pass + total_fail
    );

    assert_eq!(total_fail, 0, "{total_fail} tests failed");
}
