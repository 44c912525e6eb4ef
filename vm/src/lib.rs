use std::path::Path;

use cpu::{CPUError, CPU};
use isa::Instruction;
use loader::{ImagePolicy, LoadError, Loader};
use ram::{RAMError, RAM};
use registers::Register;
use thiserror::Error;

pub mod cpu;
pub mod decoder;
pub mod isa;
pub mod loader;
pub mod prof;
pub mod ram;
pub mod registers;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VMError {
    #[error(transparent)]
    CPUError(#[from] CPUError),
    #[error("Step limit of {steps} instructions reached")]
    StepLimit { steps: u64 },
}

#[derive(Debug, Clone)]
pub struct RAMConfig {
    pub size: u32,
}

impl Default for RAMConfig {
    fn default() -> Self {
        Self {
            size: ram::DEFAULT_RAM_SIZE,
        }
    }
}

/// The program signals completion by writing `value` into `register`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HaltCondition {
    pub register: Register,
    pub value: u32,
}

impl Default for HaltCondition {
    fn default() -> Self {
        Self {
            register: registers::A0,
            value: 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VMConfig {
    pub ram: RAMConfig,
    pub image: ImagePolicy,
    pub halt: HaltCondition,
    /// `None` runs until the program halts or faults.
    pub max_steps: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub steps: u64,
}

#[derive(Debug)]
pub struct VM {
    pub cpu: CPU,
    config: VMConfig,
    steps: u64,
}

impl VM {
    pub fn new(config: VMConfig) -> Result<Self, RAMError> {
        let ram = RAM::new(config.ram.size)?;

        Ok(Self {
            cpu: CPU::new(ram),
            config,
            steps: 0,
        })
    }

    pub fn config(&self) -> &VMConfig {
        &self.config
    }

    /// Number of instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn load_image(&mut self, bytes: &[u8]) -> Result<usize, LoadError> {
        Loader::new(self.config.image).load_bytes(&mut self.cpu.ram, bytes)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<usize, LoadError> {
        Loader::new(self.config.image).load_file(&mut self.cpu.ram, path)
    }

    pub fn is_halted(&self) -> bool {
        let HaltCondition { register, value } = self.config.halt;

        self.cpu.registers.get(register) == value
    }

    /// Executes one instruction and reports whether the program has halted.
    pub fn step(&mut self) -> Result<(Instruction, State), CPUError> {
        let instruction = self.cpu.tick()?;

        self.steps += 1;

        let state = if self.is_halted() {
            State::Halted
        } else {
            State::Running
        };

        Ok((instruction, state))
    }

    /// Runs until the halt condition holds after an executed instruction.
    /// Faults stop the loop with the machine state as it was before the
    /// faulting instruction.
    pub fn run(&mut self) -> Result<Summary, VMError> {
        let _span = prof::span!("run");

        loop {
            if let Some(steps) = self.config.max_steps {
                if self.steps >= steps {
                    return Err(VMError::StepLimit { steps });
                }
            }

            let (_, state) = self.step().inspect_err(|error| {
                tracing::debug!(
                    pc = format_args!("0x{:08x}", self.cpu.registers.pc()),
                    steps = self.steps,
                    %error,
                    "fault"
                );
            })?;

            prof::frame_mark();

            if state == State::Halted {
                tracing::debug!(steps = self.steps, "halted");

                return Ok(Summary { steps: self.steps });
            }
        }
    }
}
