//! Designed to run the SM83 single-step tests from
//! <https://github.com/SingleStepTests/sm83>: each case pins an initial
//! register/memory state, executes exactly one instruction, and compares
//! against the documented final state.

use clap::Parser;
use env_logger::Env;
use flate2::read::GzDecoder;
use gb_core::{Cpu, MemoryBus};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct State {
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
    ime: u8,
    ram: Vec<(u16, u8)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TestDescription {
    name: String,
    initial: State,
    #[serde(rename = "final")]
    final_state: State,
    cycles: Vec<(u16, Option<u8>, String)>,
}

struct InMemoryBus {
    memory: Box<[u8; 0x10000]>,
}

impl InMemoryBus {
    fn new() -> Self {
        Self { memory: Box::new([0; 0x10000]) }
    }
}

impl MemoryBus for InMemoryBus {
    fn read(&mut self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.memory[address as usize] = value;
    }
}

macro_rules! diff_field {
    ($actual:expr, $expected:expr, $field:ident) => {
        if $actual.$field != $expected.$field {
            log::info!(
                "  {}: actual={:02X}, expected={:02X}",
                stringify!($field),
                $actual.$field,
                $expected.$field
            );
        }
    };
}

impl State {
    fn from_cpu(cpu: &Cpu, bus: &mut InMemoryBus, final_state: &State) -> Self {
        let ram = final_state.ram.iter().map(|&(address, _)| (address, bus.read(address))).collect();

        Self {
            pc: cpu.registers.pc,
            sp: cpu.registers.sp,
            a: cpu.registers.a,
            b: cpu.registers.b,
            c: cpu.registers.c,
            d: cpu.registers.d,
            e: cpu.registers.e,
            f: cpu.registers.f,
            h: cpu.registers.h,
            l: cpu.registers.l,
            ime: u8::from(cpu.ime),
            ram,
        }
    }

    fn diff(&self, expected: &Self) {
        diff_field!(self, expected, pc);
        diff_field!(self, expected, sp);
        diff_field!(self, expected, a);
        diff_field!(self, expected, b);
        diff_field!(self, expected, c);
        diff_field!(self, expected, d);
        diff_field!(self, expected, e);
        diff_field!(self, expected, f);
        diff_field!(self, expected, h);
        diff_field!(self, expected, l);
        diff_field!(self, expected, ime);

        if self.ram != expected.ram {
            log::info!("  ram:");
            for ((address, actual), (_, expected)) in
                self.ram.iter().copied().zip(expected.ram.iter().copied())
            {
                if actual != expected {
                    log::info!("    {address:04X}: actual={actual:02X}, expected={expected:02X}");
                }
            }
        }
    }
}

fn init_test_state(state: &State, bus: &mut InMemoryBus) -> Cpu {
    let mut cpu = Cpu::new();
    cpu.registers.pc = state.pc;
    cpu.registers.sp = state.sp;
    cpu.registers.a = state.a;
    cpu.registers.b = state.b;
    cpu.registers.c = state.c;
    cpu.registers.d = state.d;
    cpu.registers.e = state.e;
    cpu.registers.f = state.f;
    cpu.registers.h = state.h;
    cpu.registers.l = state.l;
    cpu.ime = state.ime != 0;
    cpu.ime_pending = false;
    cpu.halted = false;
    cpu.halt_bug = false;

    for &(address, value) in &state.ram {
        bus.write(address, value);
    }

    cpu
}

#[derive(Debug, Parser)]
struct Args {
    /// Path to a single test file to run.
    #[arg(short = 'f', long)]
    file_path: Option<String>,

    /// Path to a directory of tests to run.
    #[arg(short = 'd', long)]
    dir_path: Option<String>,

    /// Don't log details on individual test case failures
    #[arg(short = 's', long = "no-individual-logs", default_value_t = true, action = clap::ArgAction::SetFalse)]
    individual_logs: bool,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match (args.file_path, args.dir_path) {
        (Some(file_path), None) => run_file_test(&file_path, args.individual_logs),
        (None, Some(dir_path)) => run_directory_of_tests(&dir_path, args.individual_logs),
        (Some(_), Some(_)) | (None, None) => {
            panic!("exactly one of file_path and dir_path must be set");
        }
    }
}

fn run_file_test(file_path: &str, individual_logs: bool) {
    let path = Path::new(file_path);

    let file_ext = path.extension().and_then(OsStr::to_str).unwrap();
    let file = BufReader::new(File::open(path).unwrap());
    let file: Box<dyn Read> = match file_ext {
        "json" => Box::new(file),
        "gz" => Box::new(GzDecoder::new(file)),
        _ => panic!("unsupported file extension: {file_ext}"),
    };

    let test_descriptions: Vec<TestDescription> = serde_json::from_reader(file).unwrap();
    log::info!("Loaded {} tests", test_descriptions.len());

    run_single_test(&test_descriptions, path, individual_logs);
}

fn run_directory_of_tests(dir_path: &str, individual_logs: bool) {
    let read_dir = Path::new(dir_path).read_dir().expect("Unable to read directory");
    let mut entries: Vec<_> = read_dir.filter_map(Result::ok).collect();
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();
        if !(name.ends_with(".json") || name.ends_with(".json.gz")) {
            continue;
        }

        let file = BufReader::new(File::open(entry.path()).expect("Unable to open file"));
        let file: Box<dyn Read> =
            if name.ends_with(".gz") { Box::new(GzDecoder::new(file)) } else { Box::new(file) };

        let test_descriptions: Vec<TestDescription> = match serde_json::from_reader(file) {
            Ok(descriptions) => descriptions,
            Err(err) => {
                log::error!("Unable to parse JSON at '{}': {err}", entry.path().display());
                continue;
            }
        };

        run_single_test(&test_descriptions, &entry.path(), individual_logs);
    }
}

fn run_single_test(test_descriptions: &[TestDescription], file_path: &Path, individual_logs: bool) {
    let mut failure_count = 0_u32;
    let mut cycle_mismatch_count = 0_u32;

    for test_description in test_descriptions {
        let mut bus = InMemoryBus::new();
        let mut cpu = init_test_state(&test_description.initial, &mut bus);
        let cycles = cpu.step(&mut bus);

        let state = State::from_cpu(&cpu, &mut bus, &test_description.final_state);
        if state != test_description.final_state {
            if individual_logs {
                log::info!("Failed test '{}'", test_description.name);
                state.diff(&test_description.final_state);
            }
            failure_count += 1;
        }

        let expected_cycles = test_description.cycles.len() as u32 * 4;
        if cycles != expected_cycles {
            if individual_logs {
                log::info!(
                    "Timing mismatch for test '{}'; actual={cycles}, expected={expected_cycles}",
                    test_description.name
                );
            }
            cycle_mismatch_count += 1;
        }
    }

    let num_tests = test_descriptions.len();
    let display_path = file_path.display();
    log::info!("{failure_count} failed out of {num_tests} tests in {display_path}");
    log::info!("{cycle_mismatch_count} timing mismatches out of {num_tests} tests in {display_path}");
}
