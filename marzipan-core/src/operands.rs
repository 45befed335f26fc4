use redcode::{AddrMode, Instruction};

use crate::{battlefield::Battlefield, error::MarsResult, CoreAddr};

/// Loaded at the start of a cycle, not touched by later core modifications.
#[derive(Copy, Clone, Debug)]
pub struct RegisterValues {
    /// The PC and the content of the instruction it points to
    pub current: RegisterValue,
    /// The A target and A values
    pub a: RegisterValue,
    /// The B target and B values
    pub b: RegisterValue,
}

/// A core index (e.g. PC or field target) and contents.
#[derive(Copy, Clone, Debug)]
pub struct RegisterValue {
    /// Core index for the instruction that occupies this register
    pub idx: CoreAddr,
    /// Decoded instruction
    pub instr: Instruction,
    /// A field for the instruction in this register
    pub a_field: CoreAddr,
    /// B field for the instruction in this register
    pub b_field: CoreAddr,
}

/// Evaluate the A and B operands of the instruction at `pc` according to
/// their addressing modes.
///
/// The A-operand is fully resolved, including any pre-decrement or
/// post-increment side effect committed to the battlefield, before the
/// B-operand's resolution even begins. Because post-increment mutates the
/// battlefield, the values cached in the returned [`RegisterValues`] are not
/// guaranteed to match the in-core values by the time dispatch runs.
///
/// # Errors
///
/// Returns an error if `pc` or a derived address is out of range for the
/// battlefield, which would indicate core corruption.
pub fn evaluate(
    pc: CoreAddr,
    core: &mut Battlefield,
) -> MarsResult<RegisterValues> {
    // Cache a copy of the current instruction before any writes to the core
    let cur = core.read(pc)?;

    // The index into the core pointed to by the a_field of the current
    // instruction. This is used:
    //  - as the target if the mode is Direct
    //  - to locate the field that Indirect modes dereference through
    //  - to locate the field that predecrement/postincrement modes mutate
    let a_indirect_index = core.offset(pc, i64::from(cur.a_field))?;

    // Possibly predecrement one of the fields of the instruction pointed to
    // by the a_field of the current instruction
    match cur.instr.a_addr_mode {
        AddrMode::PredecA => {
            let field = core.get_mut(a_indirect_index)?;
            field.a_field = core.offset(field.a_field, -1)?;
        }
        AddrMode::PredecB => {
            let field = core.get_mut(a_indirect_index)?;
            field.b_field = core.offset(field.b_field, -1)?;
        }
        _ => {}
    }

    // Evaluate the A operand: cache the target index and the instruction it
    // points to.
    let a_target: CoreAddr = match cur.instr.a_addr_mode {
        AddrMode::Immediate => pc,
        AddrMode::Direct => core.offset(pc, i64::from(cur.a_field))?,
        AddrMode::IndirectA | AddrMode::PredecA | AddrMode::PostincA => {
            let field = core.read(a_indirect_index)?.a_field;
            core.offset(a_indirect_index, i64::from(field))?
        }
        AddrMode::IndirectB | AddrMode::PredecB | AddrMode::PostincB => {
            let field = core.read(a_indirect_index)?.b_field;
            core.offset(a_indirect_index, i64::from(field))?
        }
    };
    let a_instr = core.read(a_target)?;

    // Possibly postincrement one of the fields of the instruction pointed to
    // by the a_field of the current instruction
    match cur.instr.a_addr_mode {
        AddrMode::PostincA => {
            let field = core.get_mut(a_indirect_index)?;
            field.a_field = core.offset(field.a_field, 1)?;
        }
        AddrMode::PostincB => {
            let field = core.get_mut(a_indirect_index)?;
            field.b_field = core.offset(field.b_field, 1)?;
        }
        _ => {}
    }

    // The index into the core pointed to by the b_field of the current
    // instruction; same three uses as `a_indirect_index` above, for B.
    let b_indirect_index = core.offset(pc, i64::from(cur.b_field))?;

    // Possibly predecrement one of the fields of the instruction pointed to
    // by the b_field of the current instruction
    match cur.instr.b_addr_mode {
        AddrMode::PredecA => {
            let field = core.get_mut(b_indirect_index)?;
            field.a_field = core.offset(field.a_field, -1)?;
        }
        AddrMode::PredecB => {
            let field = core.get_mut(b_indirect_index)?;
            field.b_field = core.offset(field.b_field, -1)?;
        }
        _ => {}
    }

    // Evaluate the B operand: cache the target index and the instruction it
    // points to.
    let b_target: CoreAddr = match cur.instr.b_addr_mode {
        AddrMode::Immediate => pc,
        AddrMode::Direct => core.offset(pc, i64::from(cur.b_field))?,
        AddrMode::IndirectA | AddrMode::PredecA | AddrMode::PostincA => {
            let field = core.read(b_indirect_index)?.a_field;
            core.offset(b_indirect_index, i64::from(field))?
        }
        AddrMode::IndirectB | AddrMode::PredecB | AddrMode::PostincB => {
            let field = core.read(b_indirect_index)?.b_field;
            core.offset(b_indirect_index, i64::from(field))?
        }
    };
    let b_instr = core.read(b_target)?;

    // Possibly postincrement one of the fields of the instruction pointed to
    // by the b_field of the current instruction
    match cur.instr.b_addr_mode {
        AddrMode::PostincA => {
            let field = core.get_mut(b_indirect_index)?;
            field.a_field = core.offset(field.a_field, 1)?;
        }
        AddrMode::PostincB => {
            let field = core.get_mut(b_indirect_index)?;
            field.b_field = core.offset(field.b_field, 1)?;
        }
        _ => {}
    }

    Ok(RegisterValues {
        current: RegisterValue {
            idx: pc,
            instr: cur.instr,
            a_field: cur.a_field,
            b_field: cur.b_field,
        },
        a: RegisterValue {
            idx: a_target,
            instr: a_instr.instr,
            a_field: a_instr.a_field,
            b_field: a_instr.b_field,
        },
        b: RegisterValue {
            idx: b_target,
            instr: b_instr.instr,
            a_field: b_instr.a_field,
            b_field: b_instr.b_field,
        },
    })
}

#[cfg(test)]
mod tests {
    use coverage_helper::test;
    use redcode::{CompleteInstruction, Modifier, Opcode};

    use super::*;

    fn instr(
        opcode: Opcode,
        modifier: Modifier,
        a_mode: AddrMode,
        b_mode: AddrMode,
        a_field: CoreAddr,
        b_field: CoreAddr,
    ) -> CompleteInstruction {
        CompleteInstruction {
            instr: Instruction {
                opcode,
                modifier,
                a_addr_mode: a_mode,
                b_addr_mode: b_mode,
            },
            a_field,
            b_field,
        }
    }

    #[test]
    fn direct_mode_resolves_to_pc_plus_field() {
        let mut core = Battlefield::new(10);
        core.write(0, instr(Opcode::Nop, Modifier::F, AddrMode::Direct, AddrMode::Direct, 3, 0))
            .unwrap();
        let regs = evaluate(0, &mut core).unwrap();
        assert_eq!(regs.a.idx, 3);
    }

    #[test]
    fn immediate_mode_resolves_to_pc_itself() {
        let mut core = Battlefield::new(10);
        core.write(0, instr(Opcode::Nop, Modifier::F, AddrMode::Immediate, AddrMode::Direct, 7, 0))
            .unwrap();
        let regs = evaluate(0, &mut core).unwrap();
        assert_eq!(regs.a.idx, 0);
    }

    #[test]
    fn postincrement_cache_reflects_preincrement_value() {
        // `MOV $0, >0`: the B operand's postincrement target is its own
        // field, but dispatch must see the value captured before the
        // increment, not after.
        let mut core = Battlefield::new(10);
        core.write(
            0,
            instr(Opcode::Mov, Modifier::I, AddrMode::Direct, AddrMode::PostincB, 0, 0),
        )
        .unwrap();
        let regs = evaluate(0, &mut core).unwrap();
        assert_eq!(regs.b.b_field, 0);
        assert_eq!(core.read(0).unwrap().b_field, 1);
    }

    #[test]
    fn predecrement_happens_before_indirection() {
        let mut core = Battlefield::new(10);
        // a_field points to address 1, whose b_field (2) is predecremented
        // to 1 before being used as the further offset from address 1.
        core.write(
            0,
            instr(Opcode::Nop, Modifier::F, AddrMode::PredecB, AddrMode::Direct, 1, 0),
        )
        .unwrap();
        core.write(1, instr(Opcode::Dat, Modifier::F, AddrMode::Direct, AddrMode::Direct, 0, 2))
            .unwrap();
        let regs = evaluate(0, &mut core).unwrap();
        assert_eq!(core.read(1).unwrap().b_field, 1);
        assert_eq!(regs.a.idx, 2);
    }

    #[test]
    fn a_operand_side_effects_are_visible_to_b_operand() {
        // Both A and B point through address 1 via PostincB; A resolves
        // first and increments it from 0 to 1, so B's indirection must see
        // the incremented value.
        let mut core = Battlefield::new(10);
        core.write(
            0,
            instr(Opcode::Nop, Modifier::F, AddrMode::PostincB, AddrMode::PostincB, 1, 1),
        )
        .unwrap();
        core.write(1, instr(Opcode::Dat, Modifier::F, AddrMode::Direct, AddrMode::Direct, 0, 0))
            .unwrap();
        let regs = evaluate(0, &mut core).unwrap();
        assert_eq!(regs.a.idx, 1);
        assert_eq!(regs.b.idx, 2);
    }
}
