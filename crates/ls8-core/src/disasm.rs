//! Instruction disassembly for the LS-8 ISA.
//!
//! Converts raw program bytes into human-readable listing rows. Register
//! operands render as `R<n>`; the `LDI` immediate renders in decimal.

use std::fmt;

use crate::encoding::Opcode;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// Address of the opcode byte.
    pub address: u8,
    /// Length in bytes (1 to 3).
    pub len_bytes: u8,
    /// Raw bytes covered by this row.
    pub raw: Vec<u8>,
    /// The instruction mnemonic (e.g., "LDI", "PRN"), or `.byte`.
    pub mnemonic: String,
    /// The formatted operands (e.g., "R0, 8" or "R0, R1").
    pub operands: String,
    /// Whether this row is an undecodable or truncated byte.
    pub is_illegal: bool,
}

impl fmt::Display for DisassemblyRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self
            .raw
            .iter()
            .map(|byte| format!("{byte:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{:02X}: {raw:<8}  {}", self.address, self.mnemonic)?;
        if !self.operands.is_empty() {
            write!(f, " {}", self.operands)?;
        }
        Ok(())
    }
}

/// Disassembles the instruction starting at `address`.
///
/// Returns `None` when `address` is outside `memory`. Operand bytes are not
/// wrapped: an instruction whose operands run past the end of `memory` is
/// reported as an illegal `.byte` row.
#[must_use]
pub fn disassemble_one(address: u8, memory: &[u8]) -> Option<DisassemblyRow> {
    let start = usize::from(address);
    let byte = *memory.get(start)?;

    let Some(opcode) = Opcode::from_u8(byte) else {
        return Some(illegal_row(address, byte));
    };

    let end = start + usize::from(opcode.size());
    let Some(bytes) = memory.get(start..end) else {
        return Some(illegal_row(address, byte));
    };

    Some(DisassemblyRow {
        address,
        len_bytes: opcode.size(),
        raw: bytes.to_vec(),
        mnemonic: opcode.mnemonic().to_string(),
        operands: format_operands(opcode, &bytes[1..]),
        is_illegal: false,
    })
}

/// Linear-sweep listing of a program image from address 0.
#[must_use]
pub fn disassemble_program(image: &[u8]) -> Vec<DisassemblyRow> {
    let mut rows = Vec::new();
    let mut offset = 0_usize;

    while let Ok(address) = u8::try_from(offset) {
        let Some(row) = disassemble_one(address, image) else {
            break;
        };
        offset += usize::from(row.len_bytes);
        rows.push(row);
    }

    rows
}

fn illegal_row(address: u8, byte: u8) -> DisassemblyRow {
    DisassemblyRow {
        address,
        len_bytes: 1,
        raw: vec![byte],
        mnemonic: ".byte".to_string(),
        operands: format!("0x{byte:02X}"),
        is_illegal: true,
    }
}

fn format_operands(opcode: Opcode, operands: &[u8]) -> String {
    match (opcode, operands) {
        (Opcode::Ldi, [reg, imm]) => format!("{}, {imm}", format_register(*reg)),
        (_, [a, b]) => format!("{}, {}", format_register(*a), format_register(*b)),
        (_, [a]) => format_register(*a),
        _ => String::new(),
    }
}

fn format_register(index: u8) -> String {
    format!("R{index}")
}
