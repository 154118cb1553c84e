//! Public host-facing API for embedding the emulator core.
//!
//! A [`CpuState`] is plain owned data. It is `Send`, but nothing inside it
//! is synchronised: sharing one machine between threads needs an external
//! lock.

use std::fmt;

use crate::memory::{Memory, PROGRAM_START};
use crate::program::ProgramError;
use crate::state::{RegisterFile, RunState};
use crate::{FaultCode, Opcode};

/// Step ceiling applied by [`CpuConfig::lenient`].
pub const LENIENT_STEP_LIMIT: u64 = 99;

/// What the dispatcher does with a byte that matches no opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum UnknownOpcodePolicy {
    /// Latch [`FaultCode::IllegalOpcode`] and stop.
    #[default]
    Fault,
    /// Log a warning and advance the PC by one byte.
    Skip,
}

/// Immutable configuration for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CpuConfig {
    /// Maximum number of dispatched steps per [`run`](crate::run) call.
    /// `None` runs until `HLT` or a fault.
    pub step_limit: Option<u64>,
    /// Handling of undecodable opcode bytes.
    pub unknown_opcode: UnknownOpcodePolicy,
}

impl CpuConfig {
    /// Permissive configuration for exploratory runs: unknown opcodes are
    /// skipped and runs stop after [`LENIENT_STEP_LIMIT`] steps.
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            step_limit: Some(LENIENT_STEP_LIMIT),
            unknown_opcode: UnknownOpcodePolicy::Skip,
        }
    }
}

/// Complete machine state: memory, register file, PC and run state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CpuState {
    /// Register file, including `FL`, `IM`, `IS` and `SP`.
    pub registers: RegisterFile,
    /// Main memory; also backs the stack.
    pub memory: Memory,
    /// Address of the next instruction to fetch.
    pub pc: u8,
    /// Copy of the opcode byte most recently fetched.
    pub ir: u8,
    /// Dispatcher state.
    pub run_state: RunState,
}

impl CpuState {
    /// Power-on state with zeroed memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a machine with `image` loaded at address 0.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::ProgramTooLarge`] when the image exceeds
    /// memory.
    pub fn with_program(image: &[u8]) -> Result<Self, ProgramError> {
        let mut state = Self::new();
        state.load_program(image)?;
        Ok(state)
    }

    /// Zeroes memory, copies `image` to `0..image.len()` and resets the
    /// registers, PC and run state.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::ProgramTooLarge`] and leaves the machine
    /// untouched when the image exceeds memory.
    pub fn load_program(&mut self, image: &[u8]) -> Result<(), ProgramError> {
        self.memory.load_image(image)?;
        self.reset();
        tracing::debug!(bytes = image.len(), "program loaded");
        Ok(())
    }

    /// Restores power-on registers, `PC = 0` and `Running`. Memory is kept.
    pub fn reset(&mut self) {
        self.registers = RegisterFile::default();
        self.pc = PROGRAM_START;
        self.ir = 0;
        self.run_state = RunState::Running;
    }

    /// True once `HLT` retired or a fault latched.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.run_state.is_stopped()
    }
}

/// Console side effect produced by an output instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ConsoleOutput {
    /// `PRN`: decimal value of a register.
    Number(u8),
    /// `PRA`: character whose code point is the register value.
    Char(u8),
    /// `RAM`: debug dump of one memory cell.
    RamDump {
        /// Address that was read.
        address: u8,
        /// Value stored there.
        value: u8,
    },
}

impl fmt::Display for ConsoleOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Char(value) => write!(f, "{}", char::from(*value)),
            Self::RamDump { value, .. } => write!(f, "Value at RAM: {value}"),
        }
    }
}

/// Receiver for console side effects. Writes are fire-and-forget from the
/// core's point of view.
pub trait ConsoleSink {
    /// Records one output event in execution order.
    fn emit(&mut self, output: ConsoleOutput);
}

impl ConsoleSink for Vec<ConsoleOutput> {
    fn emit(&mut self, output: ConsoleOutput) {
        self.push(output);
    }
}

/// Status from one dispatcher step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Instruction executed and control continues.
    Retired {
        /// Executed operation.
        opcode: Opcode,
    },
    /// `HLT` executed; the machine is now halted.
    Halted,
    /// `INT` or `IRET` was recognised but has no behavior in this core.
    Unimplemented {
        /// The unsupported operation.
        opcode: Opcode,
    },
    /// Undecodable byte skipped under [`UnknownOpcodePolicy::Skip`].
    Skipped {
        /// Raw byte at the PC.
        byte: u8,
    },
    /// A fault stopped the machine.
    Fault {
        /// Latched fault.
        cause: FaultCode,
    },
    /// The machine was already halted or faulted; nothing executed.
    Stopped,
}

/// Why a [`run`](crate::run) call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunExit {
    /// `HLT` executed.
    Halted,
    /// A fault latched.
    Fault(FaultCode),
    /// [`CpuConfig::step_limit`] steps were dispatched without stopping.
    StepLimit,
}

/// Aggregated outcome of a [`run`](crate::run) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Number of steps dispatched, including the final one.
    pub steps: u64,
    /// Reason the loop ended.
    pub exit: RunExit,
}
