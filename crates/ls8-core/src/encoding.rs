//! LS-8 opcode table and bit-field classification.
//!
//! Every opcode byte follows the layout `AABCDDDD`:
//! - `AA` number of operand bytes (0-2)
//! - `B` set for ALU operations
//! - `C` set when the instruction writes the PC
//! - `DDDD` instruction identifier

/// Bit set in every ALU opcode.
pub const ALU_BIT: u8 = 1 << 5;
/// Bit set in every opcode that writes the PC.
pub const SETS_PC_BIT: u8 = 1 << 4;
/// Shift that moves the operand count field to the low bits.
pub const OPERAND_COUNT_SHIFT: u8 = 6;
/// Mask of the instruction identifier nibble.
pub const IDENTIFIER_MASK: u8 = 0x0F;

/// Assigned LS-8 operations; the discriminant is the encoded opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Opcode {
    Nop = 0b0000_0000,
    Hlt = 0b0000_0001,
    Ret = 0b0001_0001,
    Iret = 0b0001_0011,
    Push = 0b0100_0101,
    Pop = 0b0100_0110,
    Prn = 0b0100_0111,
    Pra = 0b0100_1000,
    Ram = 0b0100_1111,
    Call = 0b0101_0000,
    Int = 0b0101_0010,
    Jmp = 0b0101_0100,
    Jeq = 0b0101_0101,
    Jne = 0b0101_0110,
    Jgt = 0b0101_0111,
    Jlt = 0b0101_1000,
    Jle = 0b0101_1001,
    Jge = 0b0101_1010,
    Inc = 0b0110_0101,
    Dec = 0b0110_0110,
    Not = 0b0110_1001,
    Ldi = 0b1000_0010,
    Ld = 0b1000_0011,
    St = 0b1000_0100,
    Add = 0b1010_0000,
    Sub = 0b1010_0001,
    Mul = 0b1010_0010,
    Div = 0b1010_0011,
    Mod = 0b1010_0100,
    Cmp = 0b1010_0111,
    And = 0b1010_1000,
    Or = 0b1010_1010,
    Xor = 0b1010_1011,
    Shl = 0b1010_1100,
    Shr = 0b1010_1101,
}

/// Operand category derived from the opcode's high-order bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum OperandCategory {
    /// No operand bytes, not ALU, does not write the PC.
    NoOperand,
    /// One operand byte, not ALU, does not write the PC.
    OneOperand,
    /// Two operand bytes, not ALU, does not write the PC.
    TwoOperand,
    /// ALU bit set; operands are register indices.
    Alu,
    /// PC bit set; the handler may redirect control flow.
    PcMutator,
}

impl Opcode {
    /// Every assigned opcode, ordered by encoding.
    pub const ALL: [Self; 35] = [
        Self::Nop,
        Self::Hlt,
        Self::Ret,
        Self::Iret,
        Self::Push,
        Self::Pop,
        Self::Prn,
        Self::Pra,
        Self::Ram,
        Self::Call,
        Self::Int,
        Self::Jmp,
        Self::Jeq,
        Self::Jne,
        Self::Jgt,
        Self::Jlt,
        Self::Jle,
        Self::Jge,
        Self::Inc,
        Self::Dec,
        Self::Not,
        Self::Ldi,
        Self::Ld,
        Self::St,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Mod,
        Self::Cmp,
        Self::And,
        Self::Or,
        Self::Xor,
        Self::Shl,
        Self::Shr,
    ];

    /// Raw encoded byte.
    #[must_use]
    pub const fn encoding(self) -> u8 {
        self as u8
    }

    /// Constant-time lookup of a raw byte in [`OPCODE_TABLE`].
    #[must_use]
    pub const fn from_u8(byte: u8) -> Option<Self> {
        OPCODE_TABLE[byte as usize]
    }

    /// Assembly mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Nop => "NOP",
            Self::Hlt => "HLT",
            Self::Ret => "RET",
            Self::Iret => "IRET",
            Self::Push => "PUSH",
            Self::Pop => "POP",
            Self::Prn => "PRN",
            Self::Pra => "PRA",
            Self::Ram => "RAM",
            Self::Call => "CALL",
            Self::Int => "INT",
            Self::Jmp => "JMP",
            Self::Jeq => "JEQ",
            Self::Jne => "JNE",
            Self::Jgt => "JGT",
            Self::Jlt => "JLT",
            Self::Jle => "JLE",
            Self::Jge => "JGE",
            Self::Inc => "INC",
            Self::Dec => "DEC",
            Self::Not => "NOT",
            Self::Ldi => "LDI",
            Self::Ld => "LD",
            Self::St => "ST",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Mod => "MOD",
            Self::Cmp => "CMP",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Shl => "SHL",
            Self::Shr => "SHR",
        }
    }

    /// Number of operand bytes following the opcode.
    #[must_use]
    pub const fn operand_count(self) -> u8 {
        self.encoding() >> OPERAND_COUNT_SHIFT
    }

    /// Total instruction length in bytes.
    #[must_use]
    pub const fn size(self) -> u8 {
        1 + self.operand_count()
    }

    /// True when the ALU executes this operation.
    #[must_use]
    pub const fn is_alu(self) -> bool {
        self.encoding() & ALU_BIT != 0
    }

    /// True when the encoding marks the instruction as a PC writer.
    #[must_use]
    pub const fn sets_pc(self) -> bool {
        self.encoding() & SETS_PC_BIT != 0
    }

    /// Low identifier nibble.
    #[must_use]
    pub const fn identifier(self) -> u8 {
        self.encoding() & IDENTIFIER_MASK
    }

    /// Operand category from the encoding bits alone.
    ///
    /// The ALU bit takes precedence over the PC bit, which takes precedence
    /// over the operand count.
    #[must_use]
    pub const fn category(self) -> OperandCategory {
        if self.is_alu() {
            OperandCategory::Alu
        } else if self.sets_pc() {
            OperandCategory::PcMutator
        } else {
            match self.operand_count() {
                0 => OperandCategory::NoOperand,
                1 => OperandCategory::OneOperand,
                _ => OperandCategory::TwoOperand,
            }
        }
    }

    /// Instructions whose handler owns the PC write. The dispatcher skips its
    /// automatic advance after these.
    #[must_use]
    pub const fn redirects_pc(self) -> bool {
        matches!(
            self,
            Self::Call
                | Self::Ret
                | Self::Jmp
                | Self::Jeq
                | Self::Jne
                | Self::Jgt
                | Self::Jge
                | Self::Jlt
                | Self::Jle
        )
    }

    /// Architecturally defined but without behavior in this core.
    #[must_use]
    pub const fn is_unimplemented(self) -> bool {
        matches!(self, Self::Int | Self::Iret)
    }
}

const fn build_opcode_table() -> [Option<Opcode>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < Opcode::ALL.len() {
        let op = Opcode::ALL[i];
        table[op.encoding() as usize] = Some(op);
        i += 1;
    }
    table
}

/// Dense decode table indexed by the raw opcode byte. Unassigned bytes map
/// to `None`.
pub const OPCODE_TABLE: [Option<Opcode>; 256] = build_opcode_table();

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::{Opcode, OperandCategory, OPCODE_TABLE};

    #[test]
    fn table_contains_unique_encodings() {
        let encodings: HashSet<_> = Opcode::ALL.iter().map(|op| op.encoding()).collect();
        assert_eq!(encodings.len(), Opcode::ALL.len());
        assert_eq!(OPCODE_TABLE.iter().flatten().count(), Opcode::ALL.len());
    }

    #[test]
    fn every_opcode_resolves_via_dense_table() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_u8(op.encoding()), Some(op));
        }
    }

    #[test]
    fn unassigned_bytes_are_illegal() {
        for byte in [0x02_u8, 0x10, 0x44, 0xA5, 0xC0, 0xFF] {
            assert_eq!(Opcode::from_u8(byte), None, "{byte:#04x}");
        }
    }

    #[test]
    fn no_opcode_claims_three_operands() {
        for op in Opcode::ALL {
            assert!(op.operand_count() <= 2, "{}", op.mnemonic());
        }
    }

    #[rstest]
    #[case(Opcode::Hlt, OperandCategory::NoOperand, 1)]
    #[case(Opcode::Nop, OperandCategory::NoOperand, 1)]
    #[case(Opcode::Prn, OperandCategory::OneOperand, 2)]
    #[case(Opcode::Push, OperandCategory::OneOperand, 2)]
    #[case(Opcode::Ldi, OperandCategory::TwoOperand, 3)]
    #[case(Opcode::St, OperandCategory::TwoOperand, 3)]
    #[case(Opcode::Add, OperandCategory::Alu, 3)]
    #[case(Opcode::Inc, OperandCategory::Alu, 2)]
    #[case(Opcode::Not, OperandCategory::Alu, 2)]
    #[case(Opcode::Call, OperandCategory::PcMutator, 2)]
    #[case(Opcode::Jle, OperandCategory::PcMutator, 2)]
    #[case(Opcode::Ret, OperandCategory::PcMutator, 1)]
    #[case(Opcode::Iret, OperandCategory::PcMutator, 1)]
    #[case(Opcode::Int, OperandCategory::PcMutator, 2)]
    fn category_and_size_follow_bit_layout(
        #[case] op: Opcode,
        #[case] category: OperandCategory,
        #[case] size: u8,
    ) {
        assert_eq!(op.category(), category);
        assert_eq!(op.size(), size);
    }

    #[test]
    fn redirecting_set_is_exactly_call_ret_and_jumps() {
        let redirecting: Vec<_> = Opcode::ALL
            .into_iter()
            .filter(|op| op.redirects_pc())
            .map(Opcode::mnemonic)
            .collect();
        assert_eq!(
            redirecting,
            ["RET", "CALL", "JMP", "JEQ", "JNE", "JGT", "JLT", "JLE", "JGE"]
        );
        for op in Opcode::ALL.into_iter().filter(|op| op.redirects_pc()) {
            assert!(op.sets_pc());
        }
    }

    #[test]
    fn identifier_is_low_nibble() {
        assert_eq!(Opcode::Cmp.identifier(), 0b0111);
        assert_eq!(Opcode::Shr.identifier(), 0b1101);
    }
}
