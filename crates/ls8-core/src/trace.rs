//! Per-step machine snapshots for execution tracing.

use std::fmt;

use crate::state::GENERAL_REGISTER_COUNT;
use crate::CpuState;

/// State captured before an instruction executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TraceSnapshot {
    /// Program counter.
    pub pc: u8,
    /// Bytes at `pc`, `pc + 1` and `pc + 2` (wrapping).
    pub bytes: [u8; 3],
    /// Register file contents, `R0` first.
    pub registers: [u8; GENERAL_REGISTER_COUNT],
}

impl TraceSnapshot {
    /// Captures the current PC window and registers.
    #[must_use]
    pub fn capture(state: &CpuState) -> Self {
        let pc = state.pc;
        Self {
            pc,
            bytes: [0, 1, 2].map(|offset| state.memory.read(pc.wrapping_add(offset))),
            registers: state.registers.as_array(),
        }
    }
}

/// `TRACE: PC | b0 b1 b2 | R0 R1 R2 R3 R4 R5 R6 R7`, upper-case hex.
impl fmt::Display for TraceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [b0, b1, b2] = self.bytes;
        write!(f, "TRACE: {:02X} | {b0:02X} {b1:02X} {b2:02X} |", self.pc)?;
        for value in self.registers {
            write!(f, " {value:02X}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TraceSnapshot;
    use crate::state::Register;
    use crate::CpuState;

    #[test]
    fn power_on_trace_line() {
        let state = CpuState::with_program(&[0x82, 0x00, 0x08]).expect("image fits");
        assert_eq!(
            TraceSnapshot::capture(&state).to_string(),
            "TRACE: 00 | 82 00 08 | 00 00 00 00 00 00 00 FF"
        );
    }

    #[test]
    fn capture_wraps_at_top_of_memory() {
        let mut state = CpuState::new();
        state.pc = 0xFE;
        state.memory.write(0xFE, 0xAA);
        state.memory.write(0xFF, 0xBB);
        state.memory.write(0x00, 0xCC);
        state.registers.set(Register::R0, 0x1F);

        let snapshot = TraceSnapshot::capture(&state);

        assert_eq!(snapshot.bytes, [0xAA, 0xBB, 0xCC]);
        assert_eq!(
            snapshot.to_string(),
            "TRACE: FE | AA BB CC | 1F 00 00 00 00 00 00 FF"
        );
    }
}
