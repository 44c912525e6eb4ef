use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vm::{loader::ImagePolicy, ram::DEFAULT_RAM_SIZE, RAMConfig, VMConfig, VM};

#[derive(Debug, Parser)]
#[command(version, about = "Runs a flat RV32I binary until it writes 1 into a0")]
struct App {
    /// Path to a RISC-V binary file.
    pub bin: PathBuf,
    /// Memory size in bytes.
    #[arg(long, default_value_t = DEFAULT_RAM_SIZE)]
    pub memory: u32,
    /// Load only the part of the image that fits into memory.
    #[arg(long)]
    pub truncate: bool,
    /// Give up after this many instructions.
    #[arg(long)]
    pub max_steps: Option<u64>,
    /// Log every executed instruction to stderr.
    #[arg(long)]
    pub trace: bool,
}

impl App {
    fn config(&self) -> VMConfig {
        VMConfig {
            ram: RAMConfig { size: self.memory },
            image: if self.truncate {
                ImagePolicy::Truncate
            } else {
                ImagePolicy::Reject
            },
            max_steps: self.max_steps,
            ..VMConfig::default()
        }
    }
}

fn init_logging(trace: bool) {
    let filter = if trace {
        EnvFilter::new("trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(app: &App) -> anyhow::Result<()> {
    let mut vm = VM::new(app.config()).context("Invalid memory size")?;

    let loaded = vm.load_file(&app.bin)?;

    tracing::debug!(
        bin = %app.bin.display(),
        loaded,
        memory = vm.config().ram.size,
        max_steps = ?vm.config().max_steps,
        "starting"
    );

    let summary = vm.run()?;

    tracing::debug!(steps = summary.steps, "finished");

    let mut stdout = io::stdout().lock();
    vm.cpu.registers.dump(&mut stdout)?;
    stdout.flush()?;

    Ok(())
}

fn main() -> ExitCode {
    let app = App::parse();

    init_logging(app.trace);
    vm::prof::start();

    match run(&app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");

            ExitCode::FAILURE
        }
    }
}
