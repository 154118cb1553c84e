use crate::FaultCode;

/// Dispatcher state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the next instruction.
    #[default]
    Running,
    /// `HLT` retired. Terminal until the next program load.
    Halted,
    /// A fault stopped execution. Terminal until the next program load.
    Faulted(FaultCode),
}

impl RunState {
    /// Returns the latched fault, if this state is faulted.
    #[must_use]
    pub const fn latched_fault(self) -> Option<FaultCode> {
        match self {
            Self::Faulted(cause) => Some(cause),
            Self::Running | Self::Halted => None,
        }
    }

    /// True for both terminal states.
    #[must_use]
    pub const fn is_stopped(self) -> bool {
        !matches!(self, Self::Running)
    }
}
