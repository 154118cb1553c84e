use thiserror::Error;

/// Fault classes used for diagnostics and policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultClass {
    /// Decoder found no opcode table entry for the fetched byte.
    Decode,
    /// ALU rejected its operands.
    Arithmetic,
    /// Instruction stream named a register outside `R0..R7`.
    Register,
}

/// Execution faults. Every fault latches the machine in
/// [`RunState::Faulted`](crate::RunState::Faulted) and stops the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FaultCode {
    /// Fetched byte matches no entry in the opcode table.
    #[error("illegal opcode {opcode:#04x} at address {address:#04x}")]
    IllegalOpcode {
        /// Raw byte that failed to decode.
        opcode: u8,
        /// Address the byte was fetched from.
        address: u8,
    },
    /// `DIV` or `MOD` with a zero divisor.
    #[error("division by zero at address {address:#04x}")]
    DivisionByZero {
        /// Address of the faulting instruction.
        address: u8,
    },
    /// Register operand outside `0..=7`.
    #[error("invalid register index {index} at address {address:#04x}")]
    InvalidRegister {
        /// Operand byte that was used as a register index.
        index: u8,
        /// Address of the faulting instruction.
        address: u8,
    },
}

impl FaultCode {
    /// Stable numeric code for the fault kind, independent of its payload.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::IllegalOpcode { .. } => 0x01,
            Self::DivisionByZero { .. } => 0x02,
            Self::InvalidRegister { .. } => 0x03,
        }
    }

    /// Address of the instruction that raised the fault.
    #[must_use]
    pub const fn address(self) -> u8 {
        match self {
            Self::IllegalOpcode { address, .. }
            | Self::DivisionByZero { address }
            | Self::InvalidRegister { address, .. } => address,
        }
    }

    /// Returns the diagnostics fault class for this fault code.
    #[must_use]
    pub const fn class(self) -> FaultClass {
        match self {
            Self::IllegalOpcode { .. } => FaultClass::Decode,
            Self::DivisionByZero { .. } => FaultClass::Arithmetic,
            Self::InvalidRegister { .. } => FaultClass::Register,
        }
    }
}
