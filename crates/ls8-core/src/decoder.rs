//! Instruction decoder for the LS-8.
//!
//! Decoding is a single dense-table lookup on the opcode byte; operand
//! count and category come from the encoding bits, never from a second
//! per-instruction table.

use crate::encoding::{Opcode, OperandCategory};
use crate::fault::FaultCode;
use crate::memory::Memory;

/// Symbolic operation and its operand category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DecodedOpcode {
    /// Resolved operation.
    pub opcode: Opcode,
    /// Category derived from bits 7-4.
    pub category: OperandCategory,
}

/// Instruction fetched from memory with its raw operand bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DecodedInstruction {
    /// Address of the opcode byte.
    pub address: u8,
    /// Resolved operation.
    pub opcode: Opcode,
    /// Category derived from bits 7-4.
    pub category: OperandCategory,
    /// Bytes at `address + 1` and `address + 2`. Only the first
    /// `opcode.operand_count()` are meaningful.
    pub operands: [u8; 2],
}

impl DecodedInstruction {
    /// First operand byte (`address + 1`).
    #[must_use]
    pub const fn operand_a(&self) -> u8 {
        self.operands[0]
    }

    /// Second operand byte (`address + 2`).
    #[must_use]
    pub const fn operand_b(&self) -> u8 {
        self.operands[1]
    }

    /// Meaningful operand bytes.
    #[must_use]
    pub fn operand_bytes(&self) -> &[u8] {
        &self.operands[..usize::from(self.opcode.operand_count())]
    }

    /// Address of the following instruction. Wraps at the top of memory.
    #[must_use]
    pub const fn next_address(&self) -> u8 {
        self.address.wrapping_add(self.opcode.size())
    }
}

/// Instruction decoder for the LS-8 ISA.
pub struct Decoder;

impl Decoder {
    /// Classifies a raw opcode byte.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::IllegalOpcode`] when the byte has no opcode table
    /// entry. `address` is only used to label the fault.
    pub const fn decode(byte: u8, address: u8) -> Result<DecodedOpcode, FaultCode> {
        match Opcode::from_u8(byte) {
            Some(opcode) => Ok(DecodedOpcode {
                opcode,
                category: opcode.category(),
            }),
            None => Err(FaultCode::IllegalOpcode {
                opcode: byte,
                address,
            }),
        }
    }

    /// Fetches and decodes the instruction at `pc`.
    ///
    /// Operand bytes are read with address wrap-around, so an instruction
    /// that straddles `0xFF` picks up its operands from the bottom of memory.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::IllegalOpcode`] when the byte at `pc` has no
    /// opcode table entry.
    pub fn fetch(memory: &Memory, pc: u8) -> Result<DecodedInstruction, FaultCode> {
        let decoded = Self::decode(memory.read(pc), pc)?;
        Ok(DecodedInstruction {
            address: pc,
            opcode: decoded.opcode,
            category: decoded.category,
            operands: [
                memory.read(pc.wrapping_add(1)),
                memory.read(pc.wrapping_add(2)),
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Decoder;
    use crate::encoding::{Opcode, OperandCategory};
    use crate::fault::FaultCode;
    use crate::memory::Memory;

    #[test]
    fn decode_halt_instruction() {
        let decoded = Decoder::decode(0b0000_0001, 0).expect("should decode");
        assert_eq!(decoded.opcode, Opcode::Hlt);
        assert_eq!(decoded.category, OperandCategory::NoOperand);
    }

    #[rstest]
    #[case(0b1000_0010, OperandCategory::TwoOperand)]
    #[case(0b0100_0111, OperandCategory::OneOperand)]
    #[case(0b1010_0000, OperandCategory::Alu)]
    #[case(0b0110_0101, OperandCategory::Alu)]
    #[case(0b0101_0100, OperandCategory::PcMutator)]
    #[case(0b0001_0001, OperandCategory::PcMutator)]
    fn decode_reproduces_bit_layout(#[case] byte: u8, #[case] category: OperandCategory) {
        let decoded = Decoder::decode(byte, 0).expect("assigned opcode");
        assert_eq!(decoded.category, category);
        assert_eq!(decoded.opcode.encoding(), byte);
    }

    #[test]
    fn every_unassigned_byte_is_a_decode_failure() {
        for byte in 0..=u8::MAX {
            let result = Decoder::decode(byte, 0x42);
            match Opcode::from_u8(byte) {
                Some(op) => assert_eq!(result.map(|d| d.opcode), Ok(op)),
                None => assert_eq!(
                    result,
                    Err(FaultCode::IllegalOpcode {
                        opcode: byte,
                        address: 0x42
                    })
                ),
            }
        }
    }

    #[test]
    fn fetch_reads_operand_bytes() {
        let mut memory = Memory::new();
        memory
            .load_image(&[0b1000_0010, 3, 200])
            .expect("image fits");

        let instr = Decoder::fetch(&memory, 0).expect("LDI decodes");
        assert_eq!(instr.opcode, Opcode::Ldi);
        assert_eq!(instr.operand_a(), 3);
        assert_eq!(instr.operand_b(), 200);
        assert_eq!(instr.operand_bytes(), &[3, 200]);
        assert_eq!(instr.next_address(), 3);
    }

    #[test]
    fn fetch_wraps_operands_past_top_of_memory() {
        let mut memory = Memory::new();
        memory.write(0xFF, Opcode::Prn.encoding());
        memory.write(0x00, 5);

        let instr = Decoder::fetch(&memory, 0xFF).expect("PRN decodes");
        assert_eq!(instr.operand_bytes(), &[5]);
        assert_eq!(instr.next_address(), 0x01);
    }

    #[test]
    fn fetch_labels_fault_with_pc() {
        let mut memory = Memory::new();
        memory.write(0x10, 0xFF);
        assert_eq!(
            Decoder::fetch(&memory, 0x10),
            Err(FaultCode::IllegalOpcode {
                opcode: 0xFF,
                address: 0x10
            })
        );
    }
}
