//! Arithmetic-logic unit.
//!
//! Results are truncated to the 8-bit register width. `CMP` leaves both
//! operands alone and writes `FL` instead.

use thiserror::Error;

use crate::encoding::Opcode;
use crate::state::{Flags, Register, RegisterFile};

/// Operations executed by the ALU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Inc,
    Dec,
    And,
    Or,
    Xor,
    Not,
    Shl,
    Shr,
    Cmp,
}

/// ALU rejected its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum AluError {
    /// `DIV` or `MOD` with a zero in `reg_b`.
    #[error("division by zero")]
    DivisionByZero,
}

impl AluOp {
    /// Maps an opcode with the ALU bit set to its ALU operation.
    #[must_use]
    pub const fn from_opcode(opcode: Opcode) -> Option<Self> {
        match opcode {
            Opcode::Add => Some(Self::Add),
            Opcode::Sub => Some(Self::Sub),
            Opcode::Mul => Some(Self::Mul),
            Opcode::Div => Some(Self::Div),
            Opcode::Mod => Some(Self::Mod),
            Opcode::Inc => Some(Self::Inc),
            Opcode::Dec => Some(Self::Dec),
            Opcode::And => Some(Self::And),
            Opcode::Or => Some(Self::Or),
            Opcode::Xor => Some(Self::Xor),
            Opcode::Not => Some(Self::Not),
            Opcode::Shl => Some(Self::Shl),
            Opcode::Shr => Some(Self::Shr),
            Opcode::Cmp => Some(Self::Cmp),
            _ => None,
        }
    }

    /// Pure result of the operation on two register values.
    ///
    /// Returns `Ok(None)` for `CMP`, which produces flags instead of a value.
    ///
    /// # Errors
    ///
    /// Returns [`AluError::DivisionByZero`] for `DIV`/`MOD` when `b == 0`.
    pub const fn compute(self, a: u8, b: u8) -> Result<Option<u8>, AluError> {
        let value = match self {
            Self::Add => a.wrapping_add(b),
            Self::Sub => a.wrapping_sub(b),
            Self::Mul => a.wrapping_mul(b),
            Self::Div => match a.checked_div(b) {
                Some(q) => q,
                None => return Err(AluError::DivisionByZero),
            },
            Self::Mod => match a.checked_rem(b) {
                Some(r) => r,
                None => return Err(AluError::DivisionByZero),
            },
            Self::Inc => a.wrapping_add(1),
            Self::Dec => a.wrapping_sub(1),
            Self::And => a & b,
            Self::Or => a | b,
            Self::Xor => a ^ b,
            Self::Not => !a,
            // Shifting by the register width or more clears the value.
            Self::Shl => match a.checked_shl(b as u32) {
                Some(v) => v,
                None => 0,
            },
            Self::Shr => match a.checked_shr(b as u32) {
                Some(v) => v,
                None => 0,
            },
            Self::Cmp => return Ok(None),
        };
        Ok(Some(value))
    }
}

/// Applies `op` to `reg_a` and `reg_b`, writing `reg_a` (or `FL` for `CMP`).
///
/// `reg_b` is `None` for the one-operand operations (`INC`, `DEC`, `NOT`).
/// On error no register is modified.
///
/// # Errors
///
/// Returns [`AluError::DivisionByZero`] for `DIV`/`MOD` with a zero divisor.
pub fn apply(
    op: AluOp,
    registers: &mut RegisterFile,
    reg_a: Register,
    reg_b: Option<Register>,
) -> Result<(), AluError> {
    let a = registers.get(reg_a);
    let b = reg_b.map_or(0, |reg| registers.get(reg));

    match op.compute(a, b)? {
        Some(value) => registers.set(reg_a, value),
        None => registers.set_flags(Flags::compare(a, b)),
    }
    Ok(())
}
