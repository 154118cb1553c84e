//! Stack and control-transfer handlers.
//!
//! The stack is descending: push pre-decrements `SP`, pop post-increments.
//! `SP` wraps at the ends of memory.

use crate::encoding::Opcode;
use crate::state::{Flags, Register};
use crate::CpuState;

/// Condition tested by the jump family against `FL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JumpCondition {
    /// `JMP`.
    Always,
    /// `JEQ`: `E`.
    Equal,
    /// `JNE`: not `E`.
    NotEqual,
    /// `JGT`: `G`.
    Greater,
    /// `JGE`: `G` or `E`.
    GreaterOrEqual,
    /// `JLT`: `L`.
    Less,
    /// `JLE`: `L` or `E`.
    LessOrEqual,
}

impl JumpCondition {
    /// Condition for a jump-family opcode.
    #[must_use]
    pub const fn from_opcode(opcode: Opcode) -> Option<Self> {
        match opcode {
            Opcode::Jmp => Some(Self::Always),
            Opcode::Jeq => Some(Self::Equal),
            Opcode::Jne => Some(Self::NotEqual),
            Opcode::Jgt => Some(Self::Greater),
            Opcode::Jge => Some(Self::GreaterOrEqual),
            Opcode::Jlt => Some(Self::Less),
            Opcode::Jle => Some(Self::LessOrEqual),
            _ => None,
        }
    }

    /// Tests the condition against `flags`.
    #[must_use]
    pub const fn is_satisfied(self, flags: Flags) -> bool {
        match self {
            Self::Always => true,
            Self::Equal => flags.equal(),
            Self::NotEqual => !flags.equal(),
            Self::Greater => flags.greater(),
            Self::GreaterOrEqual => flags.greater() || flags.equal(),
            Self::Less => flags.less(),
            Self::LessOrEqual => flags.less() || flags.equal(),
        }
    }
}

/// Pushes a raw byte: `SP -= 1; memory[SP] = value`.
pub fn push_value(state: &mut CpuState, value: u8) {
    let sp = state.registers.sp().wrapping_sub(1);
    state.registers.set_sp(sp);
    state.memory.write(sp, value);
}

/// Pops a raw byte: `value = memory[SP]; SP += 1`.
pub fn pop_value(state: &mut CpuState) -> u8 {
    let sp = state.registers.sp();
    let value = state.memory.read(sp);
    state.registers.set_sp(sp.wrapping_add(1));
    value
}

/// `PUSH reg`.
pub fn push(state: &mut CpuState, reg: Register) {
    let value = state.registers.get(reg);
    push_value(state, value);
}

/// `POP reg`.
pub fn pop(state: &mut CpuState, reg: Register) {
    let value = pop_value(state);
    state.registers.set(reg, value);
}

/// `CALL reg`: pushes `return_address`, then jumps to the address in `reg`.
pub fn call(state: &mut CpuState, reg: Register, return_address: u8) {
    // Read the target first so `CALL SP` jumps to the pre-push stack pointer.
    let target = state.registers.get(reg);
    push_value(state, return_address);
    state.pc = target;
}

/// `RET`: pops the return address into the PC.
pub fn ret(state: &mut CpuState) {
    state.pc = pop_value(state);
}

/// Shared body of `JMP` and the six conditional jumps.
///
/// Sets the PC to the address in `reg` when `condition` holds against `FL`,
/// otherwise to `fallthrough`. Returns whether the jump was taken.
pub fn jump(state: &mut CpuState, condition: JumpCondition, reg: Register, fallthrough: u8) -> bool {
    let taken = condition.is_satisfied(state.registers.flags());
    state.pc = if taken {
        state.registers.get(reg)
    } else {
        fallthrough
    };
    taken
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::{call, jump, pop, push, ret, JumpCondition};
    use crate::encoding::Opcode;
    use crate::state::{Flags, Register, FLAG_EQUAL, FLAG_GREATER, FLAG_LESS};
    use crate::CpuState;

    #[test]
    fn push_writes_below_the_stack_pointer() {
        let mut state = CpuState::new();
        state.registers.set(Register::R0, 0x42);

        push(&mut state, Register::R0);

        assert_eq!(state.registers.sp(), 0xFE);
        assert_eq!(state.memory.read(0xFE), 0x42);
    }

    #[test]
    fn pop_reads_then_increments() {
        let mut state = CpuState::new();
        state.registers.set_sp(0xF0);
        state.memory.write(0xF0, 0x99);

        pop(&mut state, Register::R5);

        assert_eq!(state.registers.get(Register::R5), 0x99);
        assert_eq!(state.registers.sp(), 0xF1);
    }

    #[test]
    fn stack_pointer_wraps_at_memory_bounds() {
        let mut state = CpuState::new();
        state.registers.set_sp(0x00);
        state.registers.set(Register::R1, 7);
        push(&mut state, Register::R1);
        assert_eq!(state.registers.sp(), 0xFF);
        assert_eq!(state.memory.read(0xFF), 7);
        pop(&mut state, Register::R2);
        assert_eq!(state.registers.sp(), 0x00);
        assert_eq!(state.registers.get(Register::R2), 7);
    }

    #[test]
    fn call_pushes_return_address_and_ret_restores_it() {
        let mut state = CpuState::new();
        state.pc = 0x10;
        state.registers.set(Register::R1, 0x40);

        call(&mut state, Register::R1, 0x12);
        assert_eq!(state.pc, 0x40);
        assert_eq!(state.registers.sp(), 0xFE);
        assert_eq!(state.memory.read(0xFE), 0x12);

        ret(&mut state);
        assert_eq!(state.pc, 0x12);
        assert_eq!(state.registers.sp(), 0xFF);
    }

    #[test]
    fn every_jump_opcode_has_a_condition() {
        for op in Opcode::ALL {
            let is_jump = matches!(
                op,
                Opcode::Jmp
                    | Opcode::Jeq
                    | Opcode::Jne
                    | Opcode::Jgt
                    | Opcode::Jge
                    | Opcode::Jlt
                    | Opcode::Jle
            );
            assert_eq!(JumpCondition::from_opcode(op).is_some(), is_jump);
        }
    }

    #[rstest]
    #[case(Opcode::Jmp, [true, true, true, true])]
    #[case(Opcode::Jeq, [false, true, false, false])]
    #[case(Opcode::Jne, [true, false, true, true])]
    #[case(Opcode::Jgt, [false, false, true, false])]
    #[case(Opcode::Jge, [false, true, true, false])]
    #[case(Opcode::Jlt, [false, false, false, true])]
    #[case(Opcode::Jle, [false, true, false, true])]
    fn jump_conditions_read_one_bit_layout(#[case] op: Opcode, #[case] expected: [bool; 4]) {
        let condition = JumpCondition::from_opcode(op).expect("jump opcode");
        let flags = [0, FLAG_EQUAL, FLAG_GREATER, FLAG_LESS].map(Flags::from_bits);
        assert_eq!(flags.map(|f| condition.is_satisfied(f)), expected);
    }

    #[test]
    fn jump_taken_sets_pc_from_register() {
        let mut state = CpuState::new();
        state.registers.set_flags(Flags::compare(5, 5));
        state.registers.set(Register::R0, 0x30);

        assert!(jump(&mut state, JumpCondition::Equal, Register::R0, 0x0A));
        assert_eq!(state.pc, 0x30);
    }

    #[test]
    fn jump_not_taken_falls_through() {
        let mut state = CpuState::new();
        state.registers.set_flags(Flags::compare(5, 6));
        state.registers.set(Register::R0, 0x30);

        assert!(!jump(&mut state, JumpCondition::Equal, Register::R0, 0x0A));
        assert_eq!(state.pc, 0x0A);
    }

    proptest! {
        #[test]
        fn push_then_pop_restores_register_and_sp(sp in any::<u8>(), value in any::<u8>(), index in 0_u8..7) {
            let reg = Register::from_u8(index).expect("index in range");
            let mut state = CpuState::new();
            state.registers.set_sp(sp);
            state.registers.set(reg, value);

            push(&mut state, reg);
            state.registers.set(reg, value.wrapping_add(1));
            pop(&mut state, reg);

            prop_assert_eq!(state.registers.get(reg), value);
            prop_assert_eq!(state.registers.sp(), sp);
        }
    }
}
