use crate::errors::MonitorError;
use crate::machine::{eval, AccessWidth, Evaluator, ExecState, Machine, StepCount};
use std::io::{self, Write};
use tracing::{debug, info, warn};

pub const MEM_BASE: u64 = 0x8000_0000;
pub const DEFAULT_MEM_SIZE: usize = 0x800_0000;

// Used as the trap instruction: execution ends with a0 as the exit code
pub const EBREAK: u32 = 0x0010_0073;

const GPR_COUNT: usize = 32;
const REG_A0: usize = 10;

const REG_NAMES: [&str; GPR_COUNT] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

const BUILTIN_IMAGE: [u32; 5] = [
    0x0000_0297, // auipc t0,0
    0x0002_8823, // sb  zero,16(t0)
    0x0102_c503, // lbu a0,16(t0)
    EBREAK,
    0xdead_beef,
];

/// Minimal stand-in for an instruction-set core.
///
/// It does not decode anything: every retired instruction just advances `pc` by 4,
/// until an `ebreak` word ends execution or `pc` leaves memory and aborts it.
/// Registers and memory are still real, so the monitor has state to inspect and watch.
pub struct ImageMachine {
    gpr: [u64; GPR_COUNT],
    pc: u64,
    memory: Vec<u8>,

    state: ExecState,
    retired: u64,
}

impl Default for ImageMachine {
    fn default() -> ImageMachine {
        ImageMachine::with_builtin_image(DEFAULT_MEM_SIZE)
    }
}

impl ImageMachine {
    pub fn new(memory_size: usize) -> ImageMachine {
        ImageMachine {
            gpr: [0; GPR_COUNT],
            pc: MEM_BASE,
            memory: vec![0; memory_size],
            state: ExecState::Stopped,
            retired: 0,
        }
    }

    pub fn with_builtin_image(memory_size: usize) -> ImageMachine {
        let image: Vec<u8> = BUILTIN_IMAGE
            .iter()
            .flat_map(|word| word.to_le_bytes().to_vec())
            .collect();

        let mut machine = ImageMachine::new(memory_size.max(image.len()));
        machine.memory[..image.len()].copy_from_slice(&image);

        machine
    }

    /// Copies a raw little-endian image to the start of memory.
    pub fn load_image(&mut self, image: &[u8]) -> Result<(), MonitorError> {
        if image.len() > self.memory.len() {
            return Err(MonitorError::AddressOutOfBounds(
                MEM_BASE + image.len() as u64 - 1,
            ));
        }
        self.memory[..image.len()].copy_from_slice(image);

        info!(size = image.len(), base = MEM_BASE, "image loaded");
        Ok(())
    }

    #[inline]
    pub fn pc(&self) -> u64 {
        self.pc
    }

    #[inline]
    pub fn retired(&self) -> u64 {
        self.retired
    }

    pub fn register(&self, name: &str) -> Option<u64> {
        if name == "pc" {
            return Some(self.pc);
        }

        self.register_index(name).map(|index| self.gpr[index])
    }

    pub fn set_register(&mut self, name: &str, value: u64) -> Option<()> {
        let index = self.register_index(name)?;
        // x0 is hardwired to zero
        if index != 0 {
            self.gpr[index] = value;
        }
        Some(())
    }

    fn register_index(&self, name: &str) -> Option<usize> {
        if name == "0" {
            return Some(0);
        }
        if let Some(position) = REG_NAMES.iter().position(|reg| *reg == name) {
            return Some(position);
        }

        name.strip_prefix('x')
            .and_then(|number| number.parse::<usize>().ok())
            .filter(|&index| index < GPR_COUNT)
    }

    fn translate(&self, address: u64, len: u64) -> Result<usize, MonitorError> {
        let offset = address
            .checked_sub(MEM_BASE)
            .filter(|offset| {
                offset
                    .checked_add(len)
                    .map_or(false, |end| end <= self.memory.len() as u64)
            })
            .ok_or(MonitorError::AddressOutOfBounds(address))?;

        Ok(offset as usize)
    }

    // Returns false when nothing could be retired
    fn exec_once(&mut self) -> bool {
        let instruction = match self.read_memory(self.pc, AccessWidth::Word) {
            Ok(word) => word as u32,
            Err(e) => {
                warn!(pc = self.pc, "{}", e);
                self.state = ExecState::Aborted { pc: self.pc };
                return false;
            }
        };

        if instruction == EBREAK {
            self.state = ExecState::Ended {
                pc: self.pc,
                code: self.gpr[REG_A0] as i64,
            };
        } else {
            self.pc = self.pc.wrapping_add(4);
        }
        self.retired += 1;

        true
    }
}

impl Evaluator for ImageMachine {
    fn evaluate(&mut self, expression: &str) -> Option<i64> {
        eval::evaluate(self, expression)
    }
}

impl Machine for ImageMachine {
    fn state(&self) -> ExecState {
        self.state
    }

    fn step_or_run(
        &mut self,
        count: StepCount,
        on_retire: &mut dyn FnMut(&mut dyn Evaluator),
    ) -> Result<ExecState, MonitorError> {
        if self.state.is_finished() {
            return Ok(self.state);
        }

        debug!(?count, pc = self.pc, "machine running");
        self.state = ExecState::Running;

        let mut remaining = count;
        loop {
            match remaining {
                StepCount::Bounded(0) => break,
                StepCount::Bounded(n) => remaining = StepCount::Bounded(n - 1),
                StepCount::Unbounded => {}
            }

            if !self.exec_once() {
                break;
            }
            on_retire(self);

            if self.state != ExecState::Running {
                break;
            }
        }

        if self.state == ExecState::Running {
            self.state = ExecState::Stopped;
        }

        debug!(state = ?self.state, pc = self.pc, retired = self.retired, "machine stopped");
        Ok(self.state)
    }

    fn read_memory(&mut self, address: u64, width: AccessWidth) -> Result<u64, MonitorError> {
        let len = width.byte_count();
        let offset = self.translate(address, len)?;

        let value = self.memory[offset..offset + len as usize]
            .iter()
            .rev()
            .fold(0u64, |acc, &byte| (acc << 8) | byte as u64);

        Ok(value)
    }

    fn display_registers(&self, out: &mut dyn Write) -> io::Result<()> {
        for (name, value) in REG_NAMES.iter().zip(self.gpr.iter()) {
            writeln!(out, "{:<8}0x{:016x}    {}", name, value, *value as i64)?;
        }
        writeln!(out, "{:<8}0x{:016x}    {}", "pc", self.pc, self.pc as i64)
    }
}
