//! Byte-addressable main memory.
//!
//! Addresses are `u8`, so every address in `0..=255` is readable and
//! writable and an out-of-range access cannot be expressed.

use crate::program::ProgramError;

/// Size in bytes of the flat address space.
pub const MEMORY_BYTES: usize = u8::MAX as usize + 1;

/// Address the program image is loaded to and the PC starts from.
pub const PROGRAM_START: u8 = 0x00;

/// 256 byte cells, zeroed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Memory {
    cells: Box<[u8]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self {
            cells: vec![0; MEMORY_BYTES].into_boxed_slice(),
        }
    }
}

impl Memory {
    /// Allocates a zeroed memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the byte at `address`.
    #[must_use]
    pub fn read(&self, address: u8) -> u8 {
        self.cells[usize::from(address)]
    }

    /// Writes `value` to `address`.
    pub fn write(&mut self, address: u8, value: u8) {
        self.cells[usize::from(address)] = value;
    }

    /// Zeroes every cell.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Zeroes memory and copies `image` to addresses `0..image.len()`.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::ProgramTooLarge`] and leaves memory untouched
    /// when the image does not fit.
    pub fn load_image(&mut self, image: &[u8]) -> Result<(), ProgramError> {
        if image.len() > MEMORY_BYTES {
            return Err(ProgramError::ProgramTooLarge { len: image.len() });
        }
        self.clear();
        self.cells[..image.len()].copy_from_slice(image);
        Ok(())
    }

    /// Whole address space in address order.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }
}
