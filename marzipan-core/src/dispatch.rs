use redcode::{CompleteInstruction, Modifier, Opcode};

use crate::{
    battlefield::Battlefield,
    error::{MarsError, MarsResult},
    operands::RegisterValues,
    CoreAddr,
};

/// What a decoded instruction does to the scheduler, once the battlefield
/// writes (if any) described by the dispatch functions below have already
/// been applied.
///
/// This stands in for the `goto noqueue` / `goto die` control flow of the
/// original simulator: every dispatch function returns one of these instead
/// of touching a process queue directly, since the queue for a process
/// belongs to the warrior scheduling it, not to the instruction being
/// executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The process continues, with its next instruction pointer queued at
    /// the given address.
    Advance(CoreAddr),
    /// The process dies; nothing is queued for it.
    Die,
    /// SPL's combined effect: the current process always continues at
    /// `next`, and additionally forks a new process at `fork` if the
    /// warrior is still under its process cap (checked by the caller,
    /// since only the caller knows the warrior's `process_count`).
    Split {
        /// Address the originating process continues at.
        next: CoreAddr,
        /// Address a new process would start at, if under the cap.
        fork: CoreAddr,
    },
}

/// Inputs required to execute a decoded instruction: the resolved operand
/// cache and mutable access to the battlefield it may write through.
pub struct OpInputs<'a> {
    /// Decoded and evaluated cached operands and current instruction
    pub regs: &'a RegisterValues,
    /// Reference to in-core instructions.
    pub core: &'a mut Battlefield,
}

impl<'a> OpInputs<'a> {
    /// Address of the instruction immediately following the current one.
    fn next_pc(&self) -> MarsResult<CoreAddr> {
        self.core.offset(self.regs.current.idx, 1)
    }

    /// Address two instructions past the current one, used by the skip-if
    /// family (SEQ/SNE/SLT).
    fn skip_pc(&self) -> MarsResult<CoreAddr> {
        self.core.offset(self.regs.current.idx, 2)
    }
}

/// Dispatch a decoded instruction to its implementation.
///
/// # Errors
///
/// Returns an error if the battlefield is corrupt (an address produced by
/// operand resolution is out of range) or if `opcode` somehow falls outside
/// the sixteen defined variants (unreachable in practice: `redcode::Opcode`
/// has no other discriminants).
pub fn execute(inputs: OpInputs) -> MarsResult<Outcome> {
    match inputs.regs.current.instr.opcode {
        Opcode::Dat => dat_op(inputs),
        Opcode::Mov => mov_op(inputs),
        Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Modm => {
            arithmetic_op(inputs)
        }
        Opcode::Jmp => jmp_op(inputs),
        Opcode::Jmz => jmz_op(inputs),
        Opcode::Jmn => jmn_op(inputs),
        Opcode::Djn => djn_op(inputs),
        Opcode::Spl => spl_op(inputs),
        Opcode::Slt => slt_op(inputs),
        Opcode::Seq => seq_op(inputs),
        Opcode::Sne => sne_op(inputs),
        Opcode::Nop => nop_op(inputs),
    }
}

/// Implementation of [`Opcode::Dat`].
#[allow(clippy::unnecessary_wraps)]
fn dat_op(_inputs: OpInputs) -> MarsResult<Outcome> {
    Ok(Outcome::Die)
}

/// Implementation of [`Opcode::Mov`].
fn mov_op(inputs: OpInputs) -> MarsResult<Outcome> {
    let next_pc = inputs.next_pc()?;
    let a = inputs.regs.a;
    let b = inputs.regs.b;
    match inputs.regs.current.instr.modifier {
        Modifier::A => {
            inputs.core.get_mut(b.idx)?.a_field = a.a_field;
        }
        Modifier::B => {
            inputs.core.get_mut(b.idx)?.b_field = a.b_field;
        }
        Modifier::AB => {
            inputs.core.get_mut(b.idx)?.b_field = a.a_field;
        }
        Modifier::BA => {
            inputs.core.get_mut(b.idx)?.a_field = a.b_field;
        }
        Modifier::F => {
            let target = inputs.core.get_mut(b.idx)?;
            target.a_field = a.a_field;
            target.b_field = a.b_field;
        }
        Modifier::X => {
            let target = inputs.core.get_mut(b.idx)?;
            target.a_field = a.b_field;
            target.b_field = a.a_field;
        }
        Modifier::I => {
            let target = inputs.core.get_mut(b.idx)?;
            target.instr = a.instr;
            target.a_field = a.a_field;
            target.b_field = a.b_field;
        }
    }
    Ok(Outcome::Advance(next_pc))
}

/// Which arithmetic operation `Add`/`Sub`/`Mul`/`Div`/`Modm` performs on two
/// field values, modulo `core_size`.
///
/// Returns `None` only when the opcode treats `rhs` as a divisor and it is
/// zero.
fn perform_arithmetic(
    opcode: Opcode,
    lhs: CoreAddr,
    rhs: CoreAddr,
    core: &Battlefield,
) -> Option<MarsResult<CoreAddr>> {
    match opcode {
        Opcode::Add => Some(core.offset(lhs, i64::from(rhs))),
        Opcode::Sub => Some(core.offset(lhs, -i64::from(rhs))),
        Opcode::Mul => {
            let product = u64::from(lhs).checked_mul(u64::from(rhs));
            let normalized = product
                .and_then(|p| p.checked_rem(u64::from(core.len())))
                .and_then(|e| u32::try_from(e).ok());
            Some(normalized.ok_or(MarsError::Internal(
                "impossible overflow multiplying field values",
            )))
        }
        Opcode::Div => (rhs != 0).then(|| {
            lhs.checked_div(rhs)
                .ok_or(MarsError::Internal("impossible division by zero"))
        }),
        Opcode::Modm => (rhs != 0).then(|| {
            lhs.checked_rem(rhs)
                .ok_or(MarsError::Internal("impossible division by zero"))
        }),
        _ => Some(Err(MarsError::Internal(
            "perform_arithmetic called with a non-arithmetic opcode",
        ))),
    }
}

/// Implementation of [`Opcode::Add`], [`Opcode::Sub`], [`Opcode::Mul`],
/// [`Opcode::Div`], and [`Opcode::Modm`].
///
/// For DIV/MODM, a zero divisor kills the process. Under the two-field
/// modifiers (F, X, I), one field can still be written before death if only
/// the other field's divisor was zero.
fn arithmetic_op(inputs: OpInputs) -> MarsResult<Outcome> {
    let opcode = inputs.regs.current.instr.opcode;
    let a = inputs.regs.a;
    let b = inputs.regs.b;
    let next_pc = inputs.next_pc()?;

    match inputs.regs.current.instr.modifier {
        Modifier::A => {
            match perform_arithmetic(opcode, b.a_field, a.a_field, inputs.core) {
                Some(res) => {
                    inputs.core.get_mut(b.idx)?.a_field = res?;
                    Ok(Outcome::Advance(next_pc))
                }
                None => Ok(Outcome::Die),
            }
        }
        Modifier::B => {
            match perform_arithmetic(opcode, b.b_field, a.b_field, inputs.core) {
                Some(res) => {
                    inputs.core.get_mut(b.idx)?.b_field = res?;
                    Ok(Outcome::Advance(next_pc))
                }
                None => Ok(Outcome::Die),
            }
        }
        Modifier::AB => {
            match perform_arithmetic(opcode, b.b_field, a.a_field, inputs.core) {
                Some(res) => {
                    inputs.core.get_mut(b.idx)?.b_field = res?;
                    Ok(Outcome::Advance(next_pc))
                }
                None => Ok(Outcome::Die),
            }
        }
        Modifier::BA => {
            match perform_arithmetic(opcode, b.a_field, a.b_field, inputs.core) {
                Some(res) => {
                    inputs.core.get_mut(b.idx)?.a_field = res?;
                    Ok(Outcome::Advance(next_pc))
                }
                None => Ok(Outcome::Die),
            }
        }
        Modifier::F | Modifier::I => {
            let first = perform_arithmetic(opcode, b.a_field, a.a_field, inputs.core);
            let second = perform_arithmetic(opcode, b.b_field, a.b_field, inputs.core);
            two_field_write(inputs, first, second, next_pc)
        }
        Modifier::X => {
            let first = perform_arithmetic(opcode, b.b_field, a.a_field, inputs.core);
            let second = perform_arithmetic(opcode, b.a_field, a.b_field, inputs.core);
            // X writes first into B's a-field-becomes-b and vice versa, so
            // swap which field each result lands in relative to F/I.
            two_field_write_crossed(inputs, first, second, next_pc)
        }
    }
}

/// Write both fields for F/I modifiers, dying if either divisor was zero
/// but still committing whichever field succeeded.
fn two_field_write(
    inputs: OpInputs,
    first: Option<MarsResult<CoreAddr>>,
    second: Option<MarsResult<CoreAddr>>,
    next_pc: CoreAddr,
) -> MarsResult<Outcome> {
    let b_idx = inputs.regs.b.idx;
    match (first, second) {
        (Some(first), Some(second)) => {
            let target = inputs.core.get_mut(b_idx)?;
            target.a_field = first?;
            target.b_field = second?;
            Ok(Outcome::Advance(next_pc))
        }
        (Some(first), None) => {
            inputs.core.get_mut(b_idx)?.a_field = first?;
            Ok(Outcome::Die)
        }
        (None, Some(second)) => {
            inputs.core.get_mut(b_idx)?.b_field = second?;
            Ok(Outcome::Die)
        }
        (None, None) => Ok(Outcome::Die),
    }
}

/// Write both fields for the X modifier, whose results land in the
/// opposite fields from F/I (b-field first, a-field second).
fn two_field_write_crossed(
    inputs: OpInputs,
    first: Option<MarsResult<CoreAddr>>,
    second: Option<MarsResult<CoreAddr>>,
    next_pc: CoreAddr,
) -> MarsResult<Outcome> {
    let b_idx = inputs.regs.b.idx;
    match (first, second) {
        (Some(first), Some(second)) => {
            let target = inputs.core.get_mut(b_idx)?;
            target.b_field = first?;
            target.a_field = second?;
            Ok(Outcome::Advance(next_pc))
        }
        (Some(first), None) => {
            inputs.core.get_mut(b_idx)?.b_field = first?;
            Ok(Outcome::Die)
        }
        (None, Some(second)) => {
            inputs.core.get_mut(b_idx)?.a_field = second?;
            Ok(Outcome::Die)
        }
        (None, None) => Ok(Outcome::Die),
    }
}

/// Implementation of [`Opcode::Jmp`].
#[allow(clippy::unnecessary_wraps)]
fn jmp_op(inputs: OpInputs) -> MarsResult<Outcome> {
    Ok(Outcome::Advance(inputs.regs.a.idx))
}

/// Implementation of [`Opcode::Jmz`]: branch if the tested B field(s) are
/// all zero.
fn jmz_op(inputs: OpInputs) -> MarsResult<Outcome> {
    let b = inputs.regs.b;
    let is_zero = match inputs.regs.current.instr.modifier {
        Modifier::A | Modifier::BA => b.a_field == 0,
        Modifier::B | Modifier::AB => b.b_field == 0,
        Modifier::F | Modifier::X | Modifier::I => {
            b.a_field == 0 && b.b_field == 0
        }
    };
    if is_zero {
        Ok(Outcome::Advance(inputs.regs.a.idx))
    } else {
        Ok(Outcome::Advance(inputs.next_pc()?))
    }
}

/// Implementation of [`Opcode::Jmn`]: branch if the tested B field(s) are
/// not all zero. The F/X/I modifiers test "all fields zero" for JMZ against
/// "any field non-zero" for JMN, De Morgan duals of each other.
fn jmn_op(inputs: OpInputs) -> MarsResult<Outcome> {
    let b = inputs.regs.b;
    let is_non_zero = match inputs.regs.current.instr.modifier {
        Modifier::A | Modifier::BA => b.a_field != 0,
        Modifier::B | Modifier::AB => b.b_field != 0,
        Modifier::F | Modifier::X | Modifier::I => {
            b.a_field != 0 || b.b_field != 0
        }
    };
    if is_non_zero {
        Ok(Outcome::Advance(inputs.regs.a.idx))
    } else {
        Ok(Outcome::Advance(inputs.next_pc()?))
    }
}

/// Implementation of [`Opcode::Djn`]: decrement the tested B target
/// field(s) in place, then branch unless the *cached* pre-decrement
/// value(s) were exactly 1 (i.e. became zero).
///
/// The decrement reads and writes the B-target's current in-core value
/// rather than the cached register, since the B-operand's own addressing
/// mode may already have mutated that same cell (e.g. a post-increment
/// whose indirect field is the target itself); the branch condition, by
/// contrast, is defined against the cache taken at operand-resolution
/// time.
fn djn_op(inputs: OpInputs) -> MarsResult<Outcome> {
    let a = inputs.regs.a;
    let b = inputs.regs.b;
    let next_pc = inputs.next_pc()?;
    let modifier = inputs.regs.current.instr.modifier;

    let non_zero = match modifier {
        Modifier::A | Modifier::BA => {
            let cur = inputs.core.read(b.idx)?.a_field;
            let decremented = inputs.core.offset(cur, -1)?;
            inputs.core.get_mut(b.idx)?.a_field = decremented;
            b.a_field != 1
        }
        Modifier::B | Modifier::AB => {
            let cur = inputs.core.read(b.idx)?.b_field;
            let decremented = inputs.core.offset(cur, -1)?;
            inputs.core.get_mut(b.idx)?.b_field = decremented;
            b.b_field != 1
        }
        Modifier::F | Modifier::X | Modifier::I => {
            let target = inputs.core.read(b.idx)?;
            let dec_a = inputs.core.offset(target.a_field, -1)?;
            let dec_b = inputs.core.offset(target.b_field, -1)?;
            let target = inputs.core.get_mut(b.idx)?;
            target.a_field = dec_a;
            target.b_field = dec_b;
            b.a_field != 1 || b.b_field != 1
        }
    };

    if non_zero {
        Ok(Outcome::Advance(a.idx))
    } else {
        Ok(Outcome::Advance(next_pc))
    }
}

/// Implementation of [`Opcode::Spl`]: the current process always continues
/// at the next instruction; it additionally forks at the A-pointer,
/// subject to the caller enforcing the per-warrior process cap.
#[allow(clippy::unnecessary_wraps)]
fn spl_op(inputs: OpInputs) -> MarsResult<Outcome> {
    let next_pc = inputs.next_pc()?;
    Ok(Outcome::Split {
        next: next_pc,
        fork: inputs.regs.a.idx,
    })
}

/// Implementation of [`Opcode::Slt`]: skip the next instruction if the
/// tested A field(s) are strictly less than the B field(s).
fn slt_op(inputs: OpInputs) -> MarsResult<Outcome> {
    let a = inputs.regs.a;
    let b = inputs.regs.b;
    let is_less_than = match inputs.regs.current.instr.modifier {
        Modifier::A => a.a_field < b.a_field,
        Modifier::B => a.b_field < b.b_field,
        Modifier::AB => a.a_field < b.b_field,
        Modifier::BA => a.b_field < b.a_field,
        Modifier::F | Modifier::I => {
            a.a_field < b.a_field && a.b_field < b.b_field
        }
        Modifier::X => a.a_field < b.b_field && a.b_field < b.a_field,
    };
    if is_less_than {
        Ok(Outcome::Advance(inputs.skip_pc()?))
    } else {
        Ok(Outcome::Advance(inputs.next_pc()?))
    }
}

/// Implementation of [`Opcode::Seq`]: skip the next instruction if the
/// tested field(s) are equal. The I modifier additionally requires the
/// whole packed instruction word to match, bit for bit.
fn seq_op(inputs: OpInputs) -> MarsResult<Outcome> {
    let a = inputs.regs.a;
    let b = inputs.regs.b;
    let is_equal = match inputs.regs.current.instr.modifier {
        Modifier::A => a.a_field == b.a_field,
        Modifier::B => a.b_field == b.b_field,
        Modifier::AB => a.a_field == b.b_field,
        Modifier::BA => a.b_field == b.a_field,
        Modifier::F => a.a_field == b.a_field && a.b_field == b.b_field,
        Modifier::X => a.a_field == b.b_field && a.b_field == b.a_field,
        Modifier::I => {
            a.instr == b.instr
                && a.a_field == b.a_field
                && a.b_field == b.b_field
        }
    };
    if is_equal {
        Ok(Outcome::Advance(inputs.skip_pc()?))
    } else {
        Ok(Outcome::Advance(inputs.next_pc()?))
    }
}

/// Implementation of [`Opcode::Sne`]: skip the next instruction if the
/// tested field(s) differ. Mirror of [`seq_op`].
fn sne_op(inputs: OpInputs) -> MarsResult<Outcome> {
    let a = inputs.regs.a;
    let b = inputs.regs.b;
    let is_not_equal = match inputs.regs.current.instr.modifier {
        Modifier::A => a.a_field != b.a_field,
        Modifier::B => a.b_field != b.b_field,
        Modifier::AB => a.a_field != b.b_field,
        Modifier::BA => a.b_field != b.a_field,
        Modifier::F => a.a_field != b.a_field || a.b_field != b.b_field,
        Modifier::X => a.a_field != b.b_field || a.b_field != b.a_field,
        Modifier::I => {
            a.instr != b.instr
                || a.a_field != b.a_field
                || a.b_field != b.b_field
        }
    };
    if is_not_equal {
        Ok(Outcome::Advance(inputs.skip_pc()?))
    } else {
        Ok(Outcome::Advance(inputs.next_pc()?))
    }
}

/// Implementation of [`Opcode::Nop`]: advance, no other effect.
fn nop_op(inputs: OpInputs) -> MarsResult<Outcome> {
    Ok(Outcome::Advance(inputs.next_pc()?))
}

/// Convenience used by `mars.rs` to fetch the instruction currently
/// occupying an address without going through full operand resolution
/// (used only for introspection, not execution).
#[must_use]
pub fn peek(core: &Battlefield, addr: CoreAddr) -> CompleteInstruction {
    core.read(addr).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use coverage_helper::test;
    use redcode::{AddrMode, CompleteInstruction, Instruction};

    use super::*;
    use crate::operands::evaluate;

    fn write(
        core: &mut Battlefield,
        addr: CoreAddr,
        opcode: Opcode,
        modifier: Modifier,
        a_mode: AddrMode,
        b_mode: AddrMode,
        a_field: CoreAddr,
        b_field: CoreAddr,
    ) {
        core.write(
            addr,
            CompleteInstruction {
                instr: Instruction {
                    opcode,
                    modifier,
                    a_addr_mode: a_mode,
                    b_addr_mode: b_mode,
                },
                a_field,
                b_field,
            },
        )
        .unwrap();
    }

    #[test]
    fn dat_always_dies() {
        let mut core = Battlefield::new(8);
        write(&mut core, 0, Opcode::Dat, Modifier::F, AddrMode::Direct, AddrMode::Direct, 0, 0);
        let regs = evaluate(0, &mut core).unwrap();
        let outcome = execute(OpInputs { regs: &regs, core: &mut core }).unwrap();
        assert_eq!(outcome, Outcome::Die);
    }

    #[test]
    fn mov_i_copies_whole_instruction() {
        let mut core = Battlefield::new(8);
        write(&mut core, 0, Opcode::Mov, Modifier::I, AddrMode::Direct, AddrMode::Direct, 1, 2);
        write(&mut core, 1, Opcode::Spl, Modifier::F, AddrMode::Direct, AddrMode::Direct, 9, 9);
        let regs = evaluate(0, &mut core).unwrap();
        let outcome = execute(OpInputs { regs: &regs, core: &mut core }).unwrap();
        assert_eq!(outcome, Outcome::Advance(1));
        let copied = core.read(2).unwrap();
        assert_eq!(copied.instr.opcode, Opcode::Spl);
        assert_eq!(copied.a_field, 9);
    }

    #[test]
    fn div_by_zero_kills_without_partial_ambiguity_under_ab() {
        let mut core = Battlefield::new(8);
        write(&mut core, 0, Opcode::Div, Modifier::AB, AddrMode::Direct, AddrMode::Direct, 1, 2);
        write(&mut core, 1, Opcode::Dat, Modifier::F, AddrMode::Direct, AddrMode::Direct, 0, 0);
        write(&mut core, 2, Opcode::Dat, Modifier::F, AddrMode::Direct, AddrMode::Direct, 5, 5);
        let regs = evaluate(0, &mut core).unwrap();
        let outcome = execute(OpInputs { regs: &regs, core: &mut core }).unwrap();
        assert_eq!(outcome, Outcome::Die);
    }

    #[test]
    fn div_f_by_zero_in_one_field_still_writes_the_other() {
        // a-field divisor is zero (kills), b-field divisor is non-zero
        // (writes through before death).
        let mut core = Battlefield::new(8);
        write(&mut core, 0, Opcode::Div, Modifier::F, AddrMode::Direct, AddrMode::Direct, 1, 2);
        write(&mut core, 1, Opcode::Dat, Modifier::F, AddrMode::Direct, AddrMode::Direct, 0, 2);
        write(&mut core, 2, Opcode::Dat, Modifier::F, AddrMode::Direct, AddrMode::Direct, 10, 10);
        let regs = evaluate(0, &mut core).unwrap();
        let outcome = execute(OpInputs { regs: &regs, core: &mut core }).unwrap();
        assert_eq!(outcome, Outcome::Die);
        let target = core.read(2).unwrap();
        assert_eq!(target.a_field, 10, "a-field divisor was zero, left untouched");
        assert_eq!(target.b_field, 5, "b-field divisor was non-zero, written before death");
    }

    #[test]
    fn spl_reports_both_next_and_fork() {
        let mut core = Battlefield::new(8);
        write(&mut core, 0, Opcode::Spl, Modifier::F, AddrMode::Direct, AddrMode::Direct, 3, 0);
        let regs = evaluate(0, &mut core).unwrap();
        let outcome = execute(OpInputs { regs: &regs, core: &mut core }).unwrap();
        assert_eq!(outcome, Outcome::Split { next: 1, fork: 3 });
    }

    #[test]
    fn jmz_and_jmn_f_disagree_on_a_mixed_zero_nonzero_value() {
        // b-value has one zero field and one non-zero field: JMZ.F doesn't
        // jump (not all zero) but JMN.F does (some field non-zero).
        let mut core = Battlefield::new(8);
        write(&mut core, 0, Opcode::Jmz, Modifier::F, AddrMode::Direct, AddrMode::Direct, 2, 1);
        write(&mut core, 1, Opcode::Dat, Modifier::F, AddrMode::Direct, AddrMode::Direct, 0, 5);
        let regs = evaluate(0, &mut core).unwrap();
        let jmz_outcome = execute(OpInputs { regs: &regs, core: &mut core }).unwrap();
        assert_eq!(jmz_outcome, Outcome::Advance(1));

        write(&mut core, 0, Opcode::Jmn, Modifier::F, AddrMode::Direct, AddrMode::Direct, 2, 1);
        let regs = evaluate(0, &mut core).unwrap();
        let jmn_outcome = execute(OpInputs { regs: &regs, core: &mut core }).unwrap();
        assert_eq!(jmn_outcome, Outcome::Advance(2));
    }

    #[test]
    fn djn_decrements_even_when_falling_through() {
        let mut core = Battlefield::new(8);
        write(&mut core, 0, Opcode::Djn, Modifier::B, AddrMode::Direct, AddrMode::Direct, 5, 1);
        write(&mut core, 1, Opcode::Dat, Modifier::F, AddrMode::Direct, AddrMode::Direct, 0, 1);
        let regs = evaluate(0, &mut core).unwrap();
        let outcome = execute(OpInputs { regs: &regs, core: &mut core }).unwrap();
        assert_eq!(outcome, Outcome::Advance(1));
        assert_eq!(core.read(1).unwrap().b_field, 0);
    }

    #[test]
    fn djn_decrement_targets_the_in_core_value_when_b_operand_aliases_it() {
        // B-mode is PostincA through b_field 1: it targets address 1
        // itself (1 + its own a_field of 0) and then postincrements that
        // same a_field from 0 to 1 as part of resolving the B-operand.
        // DJN.A must decrement address 1's *current* a_field (1, after
        // the postincrement) down to 0, not the stale cached value (0)
        // captured before the postincrement ran.
        let mut core = Battlefield::new(8);
        write(&mut core, 0, Opcode::Djn, Modifier::A, AddrMode::Direct, AddrMode::PostincA, 5, 1);
        write(&mut core, 1, Opcode::Dat, Modifier::F, AddrMode::Direct, AddrMode::Direct, 0, 9);
        let regs = evaluate(0, &mut core).unwrap();
        assert_eq!(regs.b.a_field, 0, "cached pre-postincrement value");
        assert_eq!(core.read(1).unwrap().a_field, 1, "postincrement already committed");
        let outcome = execute(OpInputs { regs: &regs, core: &mut core }).unwrap();
        assert_eq!(core.read(1).unwrap().a_field, 0, "decrements the in-core 1, not the cached 0");
        assert_eq!(outcome, Outcome::Advance(5), "cached value was 0, so it branches");
    }

    #[test]
    fn seq_i_requires_whole_instruction_match() {
        let mut core = Battlefield::new(8);
        write(&mut core, 0, Opcode::Seq, Modifier::I, AddrMode::Direct, AddrMode::Direct, 1, 2);
        write(&mut core, 1, Opcode::Dat, Modifier::F, AddrMode::Direct, AddrMode::Direct, 4, 4);
        write(&mut core, 2, Opcode::Mov, Modifier::F, AddrMode::Direct, AddrMode::Direct, 4, 4);
        let regs = evaluate(0, &mut core).unwrap();
        let outcome = execute(OpInputs { regs: &regs, core: &mut core }).unwrap();
        // fields match but opcodes differ, so SEQ.I must not skip
        assert_eq!(outcome, Outcome::Advance(1));
    }
}
