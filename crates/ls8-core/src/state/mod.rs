//! Architectural CPU state model primitives.

/// Condition-code bitmask stored in `FL`.
pub mod flags;
/// Register identifiers and the register file.
pub mod registers;
/// Dispatcher run state.
pub mod run_state;

pub use flags::{Flags, FLAGS_ACTIVE_MASK, FLAG_EQUAL, FLAG_GREATER, FLAG_LESS};
pub use registers::{Register, RegisterFile, GENERAL_REGISTER_COUNT, STACK_POINTER_RESET};
pub use run_state::RunState;
