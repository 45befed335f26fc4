use core::fmt;

use serde::{Deserialize, Serialize};

/// Fields hold values that are positive offsets from their own core address.
/// They are stored and used modulo `core_size`.
pub type FieldValue = u32;

/// The opcode portion of a redcode instruction.
///
/// Supports the sixteen opcodes from the ICWS '94 draft used by classic
/// MARS implementations.  `Dat` is variant `0`: a zero-initialized core
/// cell is always a live `DAT`, so any process that fetches uninitialized
/// memory dies.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    FromPrimitive,
    ToPrimitive,
    Serialize,
    Deserialize,
)]
pub enum Opcode {
    /// Remove the current process from its warrior's task queue.
    Dat,

    /// Queue the next instruction, and then queue the A-pointer.  If the
    /// warrior's process count is already at its configured cap, only the
    /// next instruction is queued.
    Spl,

    /// Replace the B-target with the A-value and queue the next
    /// instruction.
    Mov,

    /// Decrement the B-target and B-value, then queue the A-pointer if the
    /// decremented B-value is not zero, and otherwise queue the next
    /// instruction.
    Djn,

    /// Replace the B-target with the sum of the A-value and B-value, and
    /// queue the next instruction.
    Add,

    /// Queue the A-pointer if the B-value is zero, and otherwise queue the
    /// next instruction.
    Jmz,

    /// Replace the B-target with the B-value minus the A-value, and queue
    /// the next instruction.
    Sub,

    /// Compare the A-value to the B-value.  If every part is equal, queue
    /// the instruction after next, and otherwise queue the next
    /// instruction.
    Seq,

    /// Compare the A-value to the B-value.  If any part of the A-value is
    /// not equal to the corresponding part of the B-value, queue the
    /// instruction after next, and otherwise queue the next instruction.
    Sne,

    /// Compare the A-value to the B-value.  If every part of the A-value is
    /// less than the corresponding part of the B-value, queue the
    /// instruction after next, and otherwise queue the next instruction.
    Slt,

    /// Queue the A-pointer if any part of the B-value is not zero, and
    /// otherwise queue the next instruction.
    Jmn,

    /// Queue the A-pointer.
    Jmp,

    /// Queue the next instruction and do nothing else.
    Nop,

    /// Replace the B-target with the A-value times the B-value, and queue
    /// the next instruction.
    Mul,

    /// Replace the B-target with the remainder of the B-value divided by
    /// the A-value.  A part whose divisor is zero is left unmodified; the
    /// process dies if any divisor was zero, whether or not another part
    /// was written.
    Modm,

    /// Replace the B-target with the B-value divided by the A-value.  A
    /// part whose divisor is zero is left unmodified; the process dies if
    /// any divisor was zero, whether or not another part was written.
    Div,
}

#[allow(
    clippy::use_debug,
    reason = "Debug formatter used to get the opcode mnemonic from enum value"
)]
impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Use Debug formatter to get the identifier of this variant
        write!(f, "{self:?}")
    }
}

/// The opcode modifier portion of a redcode instruction.
///
/// Supports the seven modifiers from the ICWS '94 draft.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    FromPrimitive,
    ToPrimitive,
    Serialize,
    Deserialize,
)]
pub enum Modifier {
    /// Both fields of the A-instruction feed both fields of the
    /// B-instruction, A-number to A-number and B-number to B-number.
    F,

    /// Only the A-number of the A-instruction feeds the A-number of the
    /// B-instruction.
    A,

    /// Only the B-number of the A-instruction feeds the B-number of the
    /// B-instruction.
    B,

    /// The A-number of the A-instruction feeds the B-number of the
    /// B-instruction.
    AB,

    /// The B-number of the A-instruction feeds the A-number of the
    /// B-instruction.
    BA,

    /// Both fields of the A-instruction feed both fields of the
    /// B-instruction, crossed: A-number to B-number and B-number to
    /// A-number.
    X,

    /// The entire A-instruction (opcode, modifier, modes, and both fields)
    /// feeds the entire B-instruction.
    I,
}

#[allow(
    clippy::use_debug,
    reason = "Debug formatter used to get the modifier mnemonic from enum \
              value"
)]
impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Use Debug formatter to get the identifier of this variant
        write!(f, "{self:?}")
    }
}

/// The addressing mode applied to a field of an instruction.
///
/// Supports the eight addressing modes from the ICWS '94 draft.  Variant
/// order matches the bit pattern used by the packed encoding in
/// [`crate::encoding`]; it is not arbitrary.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
    FromPrimitive,
    ToPrimitive,
    Serialize,
    Deserialize,
)]
pub enum AddrMode {
    /// Represented by `$`.  The field is a direct offset from the program
    /// counter.
    Direct,

    /// Represented by `#`.  The field is used as-is with no indirection;
    /// an immediate A/B-mode resolves its pointer to the current
    /// instruction itself.
    Immediate,

    /// Represented by `@`.  The field is a primary offset from the
    /// program counter to an instruction whose B-number is a secondary
    /// offset from that same location.
    IndirectB,

    /// Represented by `<`.  As [`Self::IndirectB`], but the intermediate
    /// instruction's B-number is decremented before it is used as the
    /// secondary offset.
    PredecB,

    /// Represented by `>`.  As [`Self::IndirectB`], but the intermediate
    /// instruction's B-number is incremented after it is used as the
    /// secondary offset.
    PostincB,

    /// Represented by `*`.  As [`Self::IndirectB`], but the secondary
    /// offset is the intermediate instruction's A-number.
    IndirectA,

    /// Represented by `{`.  As [`Self::IndirectA`], but the intermediate
    /// instruction's A-number is decremented before it is used as the
    /// secondary offset.
    PredecA,

    /// Represented by `}`.  As [`Self::IndirectA`], but the intermediate
    /// instruction's A-number is incremented after it is used as the
    /// secondary offset.
    PostincA,
}

impl fmt::Display for AddrMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Direct => write!(f, "$"),
            Self::Immediate => write!(f, "#"),
            Self::IndirectB => write!(f, "@"),
            Self::PredecB => write!(f, "<"),
            Self::PostincB => write!(f, ">"),
            Self::IndirectA => write!(f, "*"),
            Self::PredecA => write!(f, "{{"),
            Self::PostincA => write!(f, "}}"),
        }
    }
}

/// A Redcode instruction's opcode, modifier, and addressing modes, without
/// its field values.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    /// The opcode portion of a redcode instruction e.g. `DAT` or `JMP`
    pub opcode: Opcode,
    /// The modifier portion of a redcode instruction e.g. `.BA` or `.X`
    pub modifier: Modifier,
    /// The addressing mode used by the A field e.g. `>` or `$`
    pub a_addr_mode: AddrMode,
    /// The addressing mode used by the B field e.g. `>` or `$`
    pub b_addr_mode: AddrMode,
}

impl Default for Instruction {
    /// The default instruction is `DAT.F $0, $0`, the all-zero core cell.
    fn default() -> Self {
        Self {
            opcode: Opcode::Dat,
            modifier: Modifier::F,
            a_addr_mode: AddrMode::Direct,
            b_addr_mode: AddrMode::Direct,
        }
    }
}

/// A Redcode instruction (opcode, modifier, modes) along with its field
/// values.  This is the unit of storage held by each core cell.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize,
)]
pub struct CompleteInstruction {
    /// The opcode, modifier, and modes used by this instruction
    pub instr: Instruction,
    /// The A-field stored in this instruction
    pub a_field: FieldValue,
    /// The B-field stored in this instruction
    pub b_field: FieldValue,
}

impl fmt::Display for CompleteInstruction {
    /// Formats an instruction as a '94 loadfile syntax instruction.
    ///
    /// ```
    /// # use redcode::*;
    /// let a = CompleteInstruction {
    ///     instr: Instruction {
    ///         opcode: Opcode::Add,
    ///         modifier: Modifier::AB,
    ///         a_addr_mode: AddrMode::Immediate,
    ///         b_addr_mode: AddrMode::Direct,
    ///     },
    ///     a_field: 16,
    ///     b_field: 32,
    /// };
    ///
    /// assert_eq!(a.to_string(), "Add.AB #16, $32");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} {}{}, {}{}",
            self.instr.opcode,
            self.instr.modifier,
            self.instr.a_addr_mode,
            self.a_field,
            self.instr.b_addr_mode,
            self.b_field
        )
    }
}

/// Utilities for enumerating and iterating over every valid redcode
/// instruction shape.  Used by the test suites of both this crate and
/// `marzipan-core` to exhaustively exercise opcode/modifier/mode
/// combinations.
pub mod test_utils {
    use super::*;

    /// All sixteen opcodes, in their canonical discriminant order.
    pub const OPCODES: [Opcode; 16] = [
        Opcode::Dat,
        Opcode::Spl,
        Opcode::Mov,
        Opcode::Djn,
        Opcode::Add,
        Opcode::Jmz,
        Opcode::Sub,
        Opcode::Seq,
        Opcode::Sne,
        Opcode::Slt,
        Opcode::Jmn,
        Opcode::Jmp,
        Opcode::Nop,
        Opcode::Mul,
        Opcode::Modm,
        Opcode::Div,
    ];

    /// All seven modifiers, in their canonical discriminant order.
    pub const MODIFIERS: [Modifier; 7] = [
        Modifier::F,
        Modifier::A,
        Modifier::B,
        Modifier::AB,
        Modifier::BA,
        Modifier::X,
        Modifier::I,
    ];

    /// All eight addressing modes, in their canonical discriminant order.
    pub const ADDR_MODES: [AddrMode; 8] = [
        AddrMode::Direct,
        AddrMode::Immediate,
        AddrMode::IndirectB,
        AddrMode::PredecB,
        AddrMode::PostincB,
        AddrMode::IndirectA,
        AddrMode::PredecA,
        AddrMode::PostincA,
    ];

    /// Iterate over every valid redcode instruction shape: every
    /// combination of opcode, modifier, A-mode, and B-mode.
    pub fn all_instructions() -> impl Iterator<Item = Instruction> {
        itertools::iproduct!(
            OPCODES.iter(),
            MODIFIERS.iter(),
            ADDR_MODES.iter(),
            ADDR_MODES.iter()
        )
        .map(|(o, m, a, b)| Instruction {
            opcode: *o,
            modifier: *m,
            a_addr_mode: *a,
            b_addr_mode: *b,
        })
    }
}

#[cfg(test)]
mod tests {
    use coverage_helper::test;
    use itertools::Itertools;

    use super::*;
    use crate::test_utils::all_instructions;

    #[test]
    fn test_instr_default_equ() {
        let default: Instruction = Default::default();
        let manual = Instruction {
            opcode: Opcode::Dat,
            modifier: Modifier::F,
            a_addr_mode: AddrMode::Direct,
            b_addr_mode: AddrMode::Direct,
        };
        assert_eq!(default, manual);
    }

    #[test]
    fn enumerate_instructions_are_unique() {
        let instructions: Vec<Instruction> =
            test_utils::all_instructions().collect();
        let unique_instructions: Vec<Instruction> =
            test_utils::all_instructions().unique().collect();

        assert_eq!(instructions.len(), unique_instructions.len());
    }

    #[test]
    fn enumerate_instructions_right_number() {
        let expected_number = test_utils::OPCODES.len()
            * test_utils::MODIFIERS.len()
            * test_utils::ADDR_MODES.len()
            * test_utils::ADDR_MODES.len();
        assert_eq!(all_instructions().count(), expected_number);
    }

    #[test]
    fn all_instructions_have_unique_display() {
        let a_field = 123;
        let b_field = 456;
        let instructions_displayed: Vec<String> =
            test_utils::all_instructions()
                .map(|instr| CompleteInstruction {
                    instr,
                    a_field,
                    b_field,
                })
                .map(|x| x.to_string())
                .collect();

        let unique_display_reprs =
            instructions_displayed.iter().unique().count();
        assert_eq!(unique_display_reprs, instructions_displayed.len());
    }

    #[test]
    fn all_values_support_to_u8() {
        use num_traits::cast::ToPrimitive;
        // num_traits specifies that if the number of variants is within the
        // range of the specified type, then ToPrimitive should always return
        // Some.  Test that this remains true, or that more variants haven't
        // been added which break the assumptions that all types can fit
        // within a u8.

        for op in test_utils::OPCODES {
            assert!(op.to_u8().is_some());
        }
        for modifier in test_utils::MODIFIERS {
            assert!(modifier.to_u8().is_some());
        }
        for mode in test_utils::ADDR_MODES {
            assert!(mode.to_u8().is_some());
        }
    }
}
