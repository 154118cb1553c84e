//! Core emulator crate for the LS-8 8-bit computer.
//!
//! The machine is a [`CpuState`] driven by [`step_one`] or [`run`]. Console
//! output is delivered through a [`ConsoleSink`] supplied by the host.

/// Flat 256-byte memory.
pub mod memory;
pub use memory::{Memory, MEMORY_BYTES, PROGRAM_START};

/// Text program image parser.
pub mod program;
pub use program::{parse_line, parse_program, strip_line, ProgramError, COMMENT_DELIMITER};

/// Public host-facing API contract and integration types.
pub mod api;
pub use api::{
    ConsoleOutput, ConsoleSink, CpuConfig, CpuState, RunExit, RunOutcome, StepOutcome,
    UnknownOpcodePolicy, LENIENT_STEP_LIMIT,
};

/// Architectural CPU state model primitives.
pub mod state;
pub use state::{
    Flags, Register, RegisterFile, RunState, FLAG_EQUAL, FLAG_GREATER, FLAG_LESS,
    GENERAL_REGISTER_COUNT, STACK_POINTER_RESET,
};

/// Opcode table and encoding-bit classification.
pub mod encoding;
pub use encoding::{Opcode, OperandCategory, OPCODE_TABLE};

/// Instruction fetch and decode.
pub mod decoder;
pub use decoder::{DecodedInstruction, DecodedOpcode, Decoder};

/// Fault taxonomy for execution failures.
pub mod fault;
pub use fault::{FaultClass, FaultCode};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{
    execute_instruction, run, run_with, step_one, AluError, AluOp, ExecuteOutcome, JumpCondition,
};

/// Listing-style disassembly of program bytes.
pub mod disasm;
pub use disasm::{disassemble_one, disassemble_program, DisassemblyRow};

/// Execution trace snapshots.
pub mod trace;
pub use trace::TraceSnapshot;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
