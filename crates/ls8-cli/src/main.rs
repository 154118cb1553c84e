//! CLI entry point for the `ls8` emulator binary.
//!
//! Loads a text program image, runs it to completion and writes console
//! output to stdout. Diagnostics go to stderr through `tracing`.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use ls8_core::{
    disassemble_program, parse_program, run, run_with, ConsoleOutput, ConsoleSink, CpuConfig,
    CpuState, RunExit, TraceSnapshot, UnknownOpcodePolicy,
};
use tracing_subscriber::EnvFilter;

/// Exit status when the step limit stops a program that never halted.
const EXIT_STEP_LIMIT: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "ls8")]
#[command(about = "Run LS-8 program images", long_about = None)]
struct Args {
    /// Program image: one byte per line in binary, `#` starts a comment
    program: PathBuf,

    /// Stop after this many instructions
    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Skip undecodable bytes instead of halting
    #[arg(long, action = ArgAction::SetTrue)]
    skip_unknown_opcodes: bool,

    /// Print a trace line to stderr before each instruction
    #[arg(long, action = ArgAction::SetTrue)]
    trace: bool,

    /// Print a listing of the program instead of running it
    #[arg(long, action = ArgAction::SetTrue)]
    disassemble: bool,

    /// Log program load, halt and other debug events
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

impl Args {
    const fn config(&self) -> CpuConfig {
        CpuConfig {
            step_limit: self.max_steps,
            unknown_opcode: if self.skip_unknown_opcodes {
                UnknownOpcodePolicy::Skip
            } else {
                UnknownOpcodePolicy::Fault
            },
        }
    }
}

/// How a CLI invocation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Listed,
    Exited(RunExit),
}

impl Status {
    fn exit_code(self) -> ExitCode {
        match self {
            Self::Listed | Self::Exited(RunExit::Halted) => ExitCode::SUCCESS,
            Self::Exited(RunExit::Fault(_)) => ExitCode::FAILURE,
            Self::Exited(RunExit::StepLimit) => ExitCode::from(EXIT_STEP_LIMIT),
        }
    }
}

/// Console sink writing program output to a byte stream.
///
/// `emit` cannot fail, so the first write error is kept and reported once
/// the run is over.
struct StreamConsole<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> StreamConsole<W> {
    const fn new(out: W) -> Self {
        Self { out, error: None }
    }

    fn finish(mut self) -> io::Result<()> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()
    }
}

impl<W: Write> ConsoleSink for StreamConsole<W> {
    fn emit(&mut self, output: ConsoleOutput) {
        if self.error.is_some() {
            return;
        }
        let result = match output {
            ConsoleOutput::Char(_) => write!(self.out, "{output}"),
            ConsoleOutput::Number(_) | ConsoleOutput::RamDump { .. } => {
                writeln!(self.out, "{output}")
            }
        };
        if let Err(err) = result {
            self.error = Some(err);
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn execute<W: Write>(args: &Args, mut out: W) -> Result<Status> {
    let source = fs::read_to_string(&args.program)
        .with_context(|| format!("failed to read program {}", args.program.display()))?;
    let image = parse_program(&source)
        .with_context(|| format!("invalid program image {}", args.program.display()))?;
    tracing::debug!(path = %args.program.display(), bytes = image.len(), "program parsed");

    if args.disassemble {
        for row in disassemble_program(&image) {
            writeln!(out, "{row}").context("failed to write listing")?;
        }
        out.flush().context("failed to write listing")?;
        return Ok(Status::Listed);
    }

    let mut state = CpuState::with_program(&image)
        .with_context(|| format!("cannot load program {}", args.program.display()))?;
    let config = args.config();
    let mut console = StreamConsole::new(out);

    let outcome = if args.trace {
        run_with(&mut state, &mut console, &config, |state| {
            eprintln!("{}", TraceSnapshot::capture(state));
        })
    } else {
        run(&mut state, &mut console, &config)
    };
    tracing::debug!(steps = outcome.steps, "run finished");

    console.finish().context("failed to write program output")?;
    Ok(Status::Exited(outcome.exit))
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match execute(&args, io::stdout().lock()) {
        Ok(status) => status.exit_code(),
        Err(err) => {
            eprintln!("ls8: {err:#}");
            ExitCode::FAILURE
        }
    }
}
