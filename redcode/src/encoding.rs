//! The packed 16-bit instruction word used at serialization boundaries.
//!
//! Layout, least significant bit first:
//!
//! ```text
//! bit    15 14 13 12 11 10  9  8  7  6  5  4  3  2  1  0
//! field | flags | |-- opcode --| |-mod-| |b-mode| |a-mode|
//! ```
//!
//! This mirrors the classic MARS `in` field.  The flag bits are only
//! meaningful to an assembler (they mark a warrior's start instruction);
//! once a program is loaded into a running core the flags are stripped and
//! dispatch never has to mask them out.

use num_traits::cast::{FromPrimitive, ToPrimitive};

use crate::{AddrMode, Instruction, Modifier, Opcode};

const A_MODE_BITS: u16 = 3;
const B_MODE_BITS: u16 = 3;
const MODIFIER_BITS: u16 = 3;
const OPCODE_BITS: u16 = 5;
const FLAG_BITS: u16 = 2;

const A_MODE_POS: u16 = 0;
const B_MODE_POS: u16 = A_MODE_POS + A_MODE_BITS;
const MODIFIER_POS: u16 = B_MODE_POS + B_MODE_BITS;
const OPCODE_POS: u16 = MODIFIER_POS + MODIFIER_BITS;
const FLAG_POS: u16 = OPCODE_POS + OPCODE_BITS;

const A_MODE_MASK: u16 = (1 << A_MODE_BITS) - 1;
const B_MODE_MASK: u16 = (1 << B_MODE_BITS) - 1;
const MODIFIER_MASK: u16 = (1 << MODIFIER_BITS) - 1;
const OPCODE_MASK: u16 = (1 << OPCODE_BITS) - 1;
const FLAG_MASK: u16 = (1 << FLAG_BITS) - 1;

/// Mask that keeps every bit below the flag field, used to strip flags from
/// a loaded instruction word.
const NO_FLAGS_MASK: u16 = (1 << FLAG_POS) - 1;

/// Pack an [`Instruction`] into its 16-bit wire representation, with the
/// flag field cleared.
#[must_use]
pub fn pack(instr: Instruction) -> u16 {
    pack_with_flags(instr, 0)
}

/// Pack an [`Instruction`] into its 16-bit wire representation, setting the
/// flag field to `flags` (only the low two bits of `flags` are used).
#[allow(
    clippy::unwrap_used,
    reason = "redcode guarantees that every enum in this crate converts to \
              u8, see all_values_support_to_u8"
)]
#[must_use]
pub fn pack_with_flags(instr: Instruction, flags: u8) -> u16 {
    let a_mode = u16::from(instr.a_addr_mode.to_u8().unwrap());
    let b_mode = u16::from(instr.b_addr_mode.to_u8().unwrap());
    let modifier = u16::from(instr.modifier.to_u8().unwrap());
    let opcode = u16::from(instr.opcode.to_u8().unwrap());
    let flags = u16::from(flags);

    (a_mode & A_MODE_MASK)
        | ((b_mode & B_MODE_MASK) << B_MODE_POS)
        | ((modifier & MODIFIER_MASK) << MODIFIER_POS)
        | ((opcode & OPCODE_MASK) << OPCODE_POS)
        | ((flags & FLAG_MASK) << FLAG_POS)
}

/// Decode a packed 16-bit instruction word into an [`Instruction`].
///
/// Returns `None` if `word`'s opcode field does not correspond to a valid
/// [`Opcode`] discriminant.  Flag bits are ignored.
#[must_use]
pub fn unpack(word: u16) -> Option<Instruction> {
    let a_mode = (word & A_MODE_MASK) as u8;
    let b_mode = ((word >> B_MODE_POS) & B_MODE_MASK) as u8;
    let modifier = ((word >> MODIFIER_POS) & MODIFIER_MASK) as u8;
    let opcode = ((word >> OPCODE_POS) & OPCODE_MASK) as u8;

    Some(Instruction {
        opcode: Opcode::from_u8(opcode)?,
        modifier: Modifier::from_u8(modifier)?,
        a_addr_mode: AddrMode::from_u8(a_mode)?,
        b_addr_mode: AddrMode::from_u8(b_mode)?,
    })
}

/// Extract the 2-bit flag field from a packed instruction word.
#[must_use]
pub fn flags(word: u16) -> u8 {
    ((word >> FLAG_POS) & FLAG_MASK) as u8
}

/// Clear the flag field of a packed instruction word.  `load_warrior`
/// applies this to every instruction it loads, so the simulator's dispatch
/// loop never has to mask flags out itself.
#[must_use]
pub fn strip_flags(word: u16) -> u16 {
    word & NO_FLAGS_MASK
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use coverage_helper::test;
    use rand::Rng;

    use super::*;
    use crate::test_utils::all_instructions;

    #[test]
    fn verify_roundtrip_conversion() {
        for instr in all_instructions() {
            let word = pack(instr);
            assert_eq!(unpack(word), Some(instr));
        }
    }

    #[test]
    fn verify_unique_conversion_with_redcode_pairs() {
        for (a_idx, a) in all_instructions().enumerate() {
            for (b_idx, b) in all_instructions().enumerate() {
                let a_word = pack(a);
                let b_word = pack(b);

                if a_idx == b_idx {
                    assert_eq!(a_word, b_word);
                } else {
                    assert_ne!(
                        a_word, b_word,
                        "two distinct instructions shouldn't map to the \
                         same packed word"
                    );
                }
            }
        }
    }

    #[test]
    fn packed_word_conversion_is_injection() {
        const SAMPLES: u32 = 100_000;

        let mut word_by_instr: HashMap<Instruction, u16> = HashMap::new();
        let mut rng = rand::thread_rng();

        for _ in 0..SAMPLES {
            let word: u16 = rng.gen();
            if let Some(instr) = unpack(word) {
                let stripped = strip_flags(word);
                let existing = word_by_instr.insert(instr, stripped);
                assert_eq!(
                    strip_flags(existing.unwrap_or(stripped)),
                    stripped,
                    "two different flag-stripped words shouldn't decode to \
                     the same instruction"
                );
            }
        }
    }

    #[test]
    fn flags_are_stripped_without_touching_other_fields() {
        for instr in all_instructions() {
            let plain = pack(instr);
            for raw_flags in 0..=FLAG_MASK as u8 {
                let flagged = pack_with_flags(instr, raw_flags);
                assert_eq!(flags(flagged), raw_flags & FLAG_MASK as u8);
                assert_eq!(strip_flags(flagged), plain);
                assert_eq!(unpack(strip_flags(flagged)), Some(instr));
            }
        }
    }

    #[test]
    fn unpack_rejects_out_of_range_opcode() {
        // only opcodes 0..=15 are valid; the 5-bit field can hold 0..=31
        let word = (31_u16) << OPCODE_POS;
        assert_eq!(unpack(word), None);
    }
}
