//! Fetch-decode-execute loop for the LS-8.
//!
//! Each step:
//! 1. Fetch the opcode byte at `PC` and decode it
//! 2. Dispatch by operand category to the ALU or an instruction handler
//! 3. Advance `PC` by the instruction size, unless the handler owns the PC
//!    write (`CALL`, `RET`, `JMP` and the conditional jumps)
//!
//! `HLT` leaves `PC` on the halt instruction. A fault leaves the machine
//! state exactly as it was before the faulting instruction; only the run
//! state changes.

/// Arithmetic-logic unit.
pub mod alu;
/// Stack, subroutine and jump handlers.
pub mod control;

pub use alu::{AluError, AluOp};
pub use control::JumpCondition;

use crate::decoder::{DecodedInstruction, Decoder};
use crate::encoding::{Opcode, OperandCategory};
use crate::state::{Register, RunState};
use crate::{
    ConsoleOutput, ConsoleSink, CpuConfig, CpuState, FaultCode, RunExit, RunOutcome, StepOutcome,
    UnknownOpcodePolicy,
};

/// Result of executing one decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecuteOutcome {
    /// Instruction completed; control continues.
    Retired,
    /// `HLT` executed.
    Halted,
    /// Recognised instruction with no behavior in this core.
    Unimplemented,
}

/// Executes one decoded instruction against `state`.
///
/// Handlers for redirecting instructions write `state.pc`; every other
/// handler leaves it alone and the caller advances it.
///
/// # Errors
///
/// Returns the fault raised by the instruction. No state is modified in
/// that case.
pub fn execute_instruction(
    instr: &DecodedInstruction,
    state: &mut CpuState,
    console: &mut dyn ConsoleSink,
) -> Result<ExecuteOutcome, FaultCode> {
    match instr.category {
        OperandCategory::NoOperand => execute_no_operand(instr),
        OperandCategory::OneOperand => execute_one_operand(instr, state, console),
        OperandCategory::TwoOperand => execute_two_operand(instr, state),
        OperandCategory::Alu => execute_alu(instr, state),
        OperandCategory::PcMutator => execute_pc_mutator(instr, state),
    }
}

/// Runs a single dispatcher step.
pub fn step_one(
    state: &mut CpuState,
    console: &mut dyn ConsoleSink,
    config: &CpuConfig,
) -> StepOutcome {
    if state.is_stopped() {
        return StepOutcome::Stopped;
    }

    let pc = state.pc;
    let instr = match Decoder::fetch(&state.memory, pc) {
        Ok(instr) => instr,
        Err(cause) => return decode_failure(state, cause, config),
    };

    tracing::trace!(
        pc,
        opcode = instr.opcode.mnemonic(),
        operands = ?instr.operand_bytes(),
        "fetch"
    );

    let outcome = execute_instruction(&instr, state, console);
    if outcome.is_ok() {
        state.ir = instr.opcode.encoding();
    }

    match outcome {
        Ok(ExecuteOutcome::Retired) => {
            if !instr.opcode.redirects_pc() {
                state.pc = instr.next_address();
            }
            StepOutcome::Retired {
                opcode: instr.opcode,
            }
        }
        Ok(ExecuteOutcome::Halted) => {
            state.run_state = RunState::Halted;
            tracing::debug!(pc, "halted");
            StepOutcome::Halted
        }
        Ok(ExecuteOutcome::Unimplemented) => {
            tracing::warn!(
                pc,
                opcode = instr.opcode.mnemonic(),
                "instruction is not implemented, skipping"
            );
            state.pc = instr.next_address();
            StepOutcome::Unimplemented {
                opcode: instr.opcode,
            }
        }
        Err(cause) => latch_fault(state, cause),
    }
}

/// Steps until `HLT`, a fault, or the configured step limit.
pub fn run(state: &mut CpuState, console: &mut dyn ConsoleSink, config: &CpuConfig) -> RunOutcome {
    run_with(state, console, config, |_| {})
}

/// Same as [`run`], calling `observe` with the machine state before each
/// dispatched step.
pub fn run_with<F>(
    state: &mut CpuState,
    console: &mut dyn ConsoleSink,
    config: &CpuConfig,
    mut observe: F,
) -> RunOutcome
where
    F: FnMut(&CpuState),
{
    match state.run_state {
        RunState::Halted => {
            return RunOutcome {
                steps: 0,
                exit: RunExit::Halted,
            }
        }
        RunState::Faulted(cause) => {
            return RunOutcome {
                steps: 0,
                exit: RunExit::Fault(cause),
            }
        }
        RunState::Running => {}
    }

    let mut steps = 0_u64;
    loop {
        if config.step_limit.is_some_and(|limit| steps >= limit) {
            tracing::warn!(steps, pc = state.pc, "step limit reached");
            return RunOutcome {
                steps,
                exit: RunExit::StepLimit,
            };
        }

        observe(state);
        let outcome = step_one(state, console, config);
        steps += 1;

        match outcome {
            StepOutcome::Halted => {
                return RunOutcome {
                    steps,
                    exit: RunExit::Halted,
                }
            }
            StepOutcome::Fault { cause } => {
                return RunOutcome {
                    steps,
                    exit: RunExit::Fault(cause),
                }
            }
            StepOutcome::Retired { .. }
            | StepOutcome::Unimplemented { .. }
            | StepOutcome::Skipped { .. }
            | StepOutcome::Stopped => {}
        }
    }
}

fn decode_failure(state: &mut CpuState, cause: FaultCode, config: &CpuConfig) -> StepOutcome {
    match config.unknown_opcode {
        UnknownOpcodePolicy::Fault => latch_fault(state, cause),
        UnknownOpcodePolicy::Skip => {
            let byte = state.memory.read(state.pc);
            tracing::warn!(pc = state.pc, byte, "unknown opcode, skipping one byte");
            state.ir = byte;
            state.pc = state.pc.wrapping_add(1);
            StepOutcome::Skipped { byte }
        }
    }
}

fn latch_fault(state: &mut CpuState, cause: FaultCode) -> StepOutcome {
    tracing::error!(pc = state.pc, code = cause.as_u8(), "{cause}, halting");
    state.run_state = RunState::Faulted(cause);
    StepOutcome::Fault { cause }
}

/// Resolves an operand byte used as a register index.
fn register(instr: &DecodedInstruction, index: u8) -> Result<Register, FaultCode> {
    Register::from_u8(index).ok_or(FaultCode::InvalidRegister {
        index,
        address: instr.address,
    })
}

// The category tables in `encoding` and the handlers below disagree. Covered
// by tests; reported as an illegal opcode rather than a panic.
const fn unhandled(instr: &DecodedInstruction) -> FaultCode {
    FaultCode::IllegalOpcode {
        opcode: instr.opcode.encoding(),
        address: instr.address,
    }
}

const fn execute_no_operand(instr: &DecodedInstruction) -> Result<ExecuteOutcome, FaultCode> {
    match instr.opcode {
        Opcode::Nop => Ok(ExecuteOutcome::Retired),
        Opcode::Hlt => Ok(ExecuteOutcome::Halted),
        _ => Err(unhandled(instr)),
    }
}

fn execute_one_operand(
    instr: &DecodedInstruction,
    state: &mut CpuState,
    console: &mut dyn ConsoleSink,
) -> Result<ExecuteOutcome, FaultCode> {
    let reg = register(instr, instr.operand_a())?;

    match instr.opcode {
        Opcode::Push => control::push(state, reg),
        Opcode::Pop => control::pop(state, reg),
        Opcode::Prn => console.emit(ConsoleOutput::Number(state.registers.get(reg))),
        Opcode::Pra => console.emit(ConsoleOutput::Char(state.registers.get(reg))),
        Opcode::Ram => {
            let address = state.registers.get(reg);
            let value = state.memory.read(address);
            console.emit(ConsoleOutput::RamDump { address, value });
        }
        _ => return Err(unhandled(instr)),
    }
    Ok(ExecuteOutcome::Retired)
}

fn execute_two_operand(
    instr: &DecodedInstruction,
    state: &mut CpuState,
) -> Result<ExecuteOutcome, FaultCode> {
    let reg_a = register(instr, instr.operand_a())?;

    match instr.opcode {
        Opcode::Ldi => state.registers.set(reg_a, instr.operand_b()),
        Opcode::Ld => {
            let reg_b = register(instr, instr.operand_b())?;
            let value = state.memory.read(state.registers.get(reg_b));
            state.registers.set(reg_a, value);
        }
        Opcode::St => {
            let reg_b = register(instr, instr.operand_b())?;
            let address = state.registers.get(reg_a);
            state.memory.write(address, state.registers.get(reg_b));
        }
        _ => return Err(unhandled(instr)),
    }
    Ok(ExecuteOutcome::Retired)
}

fn execute_alu(
    instr: &DecodedInstruction,
    state: &mut CpuState,
) -> Result<ExecuteOutcome, FaultCode> {
    let op = AluOp::from_opcode(instr.opcode).ok_or_else(|| unhandled(instr))?;
    let reg_a = register(instr, instr.operand_a())?;
    let reg_b = if instr.opcode.operand_count() == 2 {
        Some(register(instr, instr.operand_b())?)
    } else {
        None
    };

    alu::apply(op, &mut state.registers, reg_a, reg_b).map_err(|err| match err {
        AluError::DivisionByZero => FaultCode::DivisionByZero {
            address: instr.address,
        },
    })?;
    Ok(ExecuteOutcome::Retired)
}

fn execute_pc_mutator(
    instr: &DecodedInstruction,
    state: &mut CpuState,
) -> Result<ExecuteOutcome, FaultCode> {
    if instr.opcode.is_unimplemented() {
        return Ok(ExecuteOutcome::Unimplemented);
    }

    if instr.opcode == Opcode::Ret {
        control::ret(state);
        return Ok(ExecuteOutcome::Retired);
    }

    let reg = register(instr, instr.operand_a())?;
    let fallthrough = instr.next_address();

    if instr.opcode == Opcode::Call {
        control::call(state, reg, fallthrough);
        return Ok(ExecuteOutcome::Retired);
    }

    let condition = JumpCondition::from_opcode(instr.opcode).ok_or_else(|| unhandled(instr))?;
    control::jump(state, condition, reg, fallthrough);
    Ok(ExecuteOutcome::Retired)
}
