use crate::state::flags::Flags;

/// Number of general-purpose registers (`R0..R7`).
pub const GENERAL_REGISTER_COUNT: usize = 8;

/// Power-on stack pointer: the top memory address.
pub const STACK_POINTER_RESET: u8 = 0xFF;

/// General-purpose register identifier.
///
/// `R4`, `R5`, `R6` and `R7` are reserved by convention as `FL`, `IM`, `IS`
/// and `SP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Register {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
}

impl Register {
    /// Flags register.
    pub const FL: Self = Self::R4;
    /// Interrupt mask.
    pub const IM: Self = Self::R5;
    /// Interrupt status.
    pub const IS: Self = Self::R6;
    /// Stack pointer.
    pub const SP: Self = Self::R7;

    /// Ordered list of all registers.
    pub const ALL: [Self; GENERAL_REGISTER_COUNT] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
    ];

    /// Returns the array index for this register (`0..=7`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decodes an operand byte used as a register index.
    ///
    /// Returns `None` for anything above 7; the caller turns that into
    /// [`FaultCode::InvalidRegister`](crate::FaultCode::InvalidRegister).
    #[must_use]
    pub const fn from_u8(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::R0),
            1 => Some(Self::R1),
            2 => Some(Self::R2),
            3 => Some(Self::R3),
            4 => Some(Self::R4),
            5 => Some(Self::R5),
            6 => Some(Self::R6),
            7 => Some(Self::R7),
            _ => None,
        }
    }
}

/// Eight byte-wide registers. Values are `u8`, so every write is already
/// reduced modulo 256; overflow policy lives in the ALU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegisterFile {
    values: [u8; GENERAL_REGISTER_COUNT],
}

impl Default for RegisterFile {
    fn default() -> Self {
        let mut values = [0; GENERAL_REGISTER_COUNT];
        values[Register::SP.index()] = STACK_POINTER_RESET;
        Self { values }
    }
}

impl RegisterFile {
    /// Reads a register.
    #[must_use]
    pub const fn get(&self, reg: Register) -> u8 {
        self.values[reg.index()]
    }

    /// Writes a register.
    pub const fn set(&mut self, reg: Register, value: u8) {
        self.values[reg.index()] = value;
    }

    /// Reads the stack pointer.
    #[must_use]
    pub const fn sp(&self) -> u8 {
        self.get(Register::SP)
    }

    /// Writes the stack pointer.
    pub const fn set_sp(&mut self, value: u8) {
        self.set(Register::SP, value);
    }

    /// Reads `FL` as a flags bitmask. Bits above the low three are dropped.
    #[must_use]
    pub const fn flags(&self) -> Flags {
        Flags::from_bits(self.get(Register::FL))
    }

    /// Writes `FL`.
    pub const fn set_flags(&mut self, flags: Flags) {
        self.set(Register::FL, flags.bits());
    }

    /// All register values in index order.
    #[must_use]
    pub const fn as_array(&self) -> [u8; GENERAL_REGISTER_COUNT] {
        self.values
    }
}
