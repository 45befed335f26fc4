use redcode::CompleteInstruction;

use crate::{
    battlefield::Battlefield,
    dispatch::{self, OpInputs, Outcome},
    error::{MarsError, MarsResult},
    operands,
    process_queue::ProcessQueue,
    warrior_ring::WarriorRing,
    CoreAddr,
};

/// Construction parameters for a [`Mars`] instance.
///
/// Validated by [`Mars::allocate`]; there is no way to build a `Mars` with
/// an invalid configuration.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Number of warriors that will compete in each battle.
    pub nwarriors: u32,
    /// Number of addressable cells in the battlefield.
    pub core_size: CoreAddr,
    /// Maximum number of live processes any single warrior may hold.
    pub processes: u32,
    /// Per-warrior cycle allowance; the battle's total budget is
    /// `nwarriors * cycles`.
    pub cycles: u32,
}

/// Result of a completed or short-circuited battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleOutcome {
    /// Number of warriors still alive when the battle ended.
    pub alive_count: u32,
    /// Warrior ids, in the order they died.
    pub death_order: Vec<u32>,
}

/// A Core War battle simulator: battlefield, shared process-queue buffer,
/// and warrior ring, sized once at construction and reused across battles.
///
/// `Mars` owns all of its state inline, so it is `Send` without any extra
/// work; running battles concurrently just means giving each thread its
/// own `Mars`.
pub struct Mars {
    /// Validated construction parameters.
    config: Config,
    /// The circular instruction memory warriors execute in.
    core: Battlefield,
    /// The shared cyclic buffer of queued instruction pointers.
    queue: ProcessQueue,
    /// The warrior scheduling ring.
    ring: WarriorRing,
    /// Id of the warrior scheduled to run next. Meaningful only as a
    /// starting point for introspection; `run_battle` re-seeds it at the
    /// start of every battle.
    current: u32,
}

impl Mars {
    /// Allocate a battlefield, process-queue buffer, and warrior table
    /// sized for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`MarsError::InvalidConfig`] if `config.core_size < 2`,
    /// `config.nwarriors == 0`, `config.processes == 0`, or if
    /// `nwarriors * processes + 1` does not fit in a `usize` on this
    /// platform.
    pub fn allocate(config: Config) -> MarsResult<Self> {
        if config.core_size < 2 {
            return Err(MarsError::InvalidConfig(
                "core_size must be at least 2",
            ));
        }
        if config.nwarriors == 0 {
            return Err(MarsError::InvalidConfig(
                "nwarriors must be at least 1",
            ));
        }
        if config.processes == 0 {
            return Err(MarsError::InvalidConfig(
                "processes must be at least 1",
            ));
        }

        let capacity = u64::from(config.nwarriors)
            .checked_mul(u64::from(config.processes))
            .and_then(|slots| slots.checked_add(1))
            .ok_or(MarsError::InvalidConfig(
                "nwarriors * processes + 1 overflows",
            ))?;
        let capacity = usize::try_from(capacity).map_err(|_err| {
            MarsError::InvalidConfig(
                "queue buffer capacity does not fit in this platform's usize",
            )
        })?;

        Ok(Self {
            core: Battlefield::new(config.core_size),
            queue: ProcessQueue::new(capacity),
            ring: WarriorRing::new(config.nwarriors),
            current: 0,
            config,
        })
    }

    /// Reset the battlefield to all `DAT.F $0, $0`.
    ///
    /// Process queues and the warrior ring are untouched; they are
    /// re-initialized by [`Mars::run_battle`], not here.
    pub fn clear_core(&mut self) {
        self.core.clear();
    }

    /// Write `code` into the battlefield starting at `position`, wrapping
    /// cyclically. Overwriting existing contents is silent; detecting
    /// overlap between warriors is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns [`MarsError::LoadOutOfBounds`] if `code.len() > core_size`.
    pub fn load_warrior(
        &mut self,
        position: CoreAddr,
        code: &[CompleteInstruction],
    ) -> MarsResult<()> {
        if u64::try_from(code.len())
            .unwrap_or(u64::MAX)
            > u64::from(self.config.core_size)
        {
            return Err(MarsError::LoadOutOfBounds);
        }
        for (offset, instr) in code.iter().enumerate() {
            let offset = i64::try_from(offset).map_err(|_err| {
                MarsError::Internal("warrior offset does not fit in i64")
            })?;
            let addr = self.core.offset(position, offset)?;
            self.core.write(addr, *instr)?;
        }
        Ok(())
    }

    /// As [`Mars::load_warrior`], but accepts instructions in their packed
    /// wire format: one `u16` `in` word (flags included) alongside the
    /// `a`/`b` field values. Flags are stripped before decoding, so a
    /// caller holding only assembler output (which sets the start-marker
    /// flag on one instruction) does not need to strip them itself.
    ///
    /// # Errors
    ///
    /// Returns [`MarsError::LoadOutOfBounds`] under the same condition as
    /// [`Mars::load_warrior`], or [`MarsError::Internal`] if a packed word
    /// does not decode to a valid instruction (an opcode/modifier/mode
    /// combination outside the sixteen/seven/eight defined variants).
    pub fn load_warrior_packed(
        &mut self,
        position: CoreAddr,
        code: &[(u16, CoreAddr, CoreAddr)],
    ) -> MarsResult<()> {
        let decoded = code
            .iter()
            .map(|&(word, a_field, b_field)| {
                let stripped = redcode::encoding::strip_flags(word);
                redcode::encoding::unpack(stripped)
                    .map(|instr| CompleteInstruction {
                        instr,
                        a_field,
                        b_field,
                    })
                    .ok_or(MarsError::Internal(
                        "packed instruction word does not decode to a \
                         valid instruction",
                    ))
            })
            .collect::<MarsResult<Vec<_>>>()?;
        self.load_warrior(position, &decoded)
    }

    /// Run a battle to completion: sole survivor, all dead, cycle budget
    /// exhausted, or an inevitable tie detected early.
    ///
    /// `start_positions[i]` is the initial instruction pointer of the
    /// warrior that runs `i`-th in turn order; warrior 0 runs first. Each
    /// call re-initializes the process-queue buffer and warrior ring from
    /// scratch (the battlefield is left exactly as the caller set it up
    /// with [`Mars::clear_core`]/[`Mars::load_warrior`]), so a `Mars` may
    /// be reused for any number of battles.
    ///
    /// # Errors
    ///
    /// Returns [`MarsError::InvalidStartPosition`] if
    /// `start_positions.len() != nwarriors` or any entry is
    /// `>= core_size`. Returns [`MarsError::Internal`] if the simulator's
    /// own invariants are violated (an effective address computed out of
    /// range); this should not occur in correct operation.
    #[allow(
        clippy::too_many_lines,
        reason = "the scheduler loop is one cohesive state machine; \
                  splitting the death/advance/split bookkeeping into \
                  separate functions would require threading most of this \
                  function's locals through each one"
    )]
    pub fn run_battle(
        &mut self,
        start_positions: &[CoreAddr],
    ) -> MarsResult<BattleOutcome> {
        let nwarriors = self.config.nwarriors;
        if start_positions.len() != nwarriors as usize {
            return Err(MarsError::InvalidStartPosition);
        }
        if start_positions
            .iter()
            .any(|&pos| pos >= self.config.core_size)
        {
            return Err(MarsError::InvalidStartPosition);
        }

        self.ring.reset(nwarriors);
        let processes = self.config.processes;
        for (id, &start) in start_positions.iter().enumerate() {
            let id = u32::try_from(id).map_err(|_err| {
                MarsError::Internal("warrior id does not fit in u32")
            })?;
            // Warriors are laid out in reverse index order: id 0 gets the
            // slice nearest the end of the shared buffer, id `nwarriors-1`
            // gets the slice nearest the start. See `SPEC_FULL.md` §4.3.
            let head = (nwarriors - 1 - id) as usize * processes as usize;
            self.queue.seed(head, start);
            let warrior = self.ring.get_mut(id);
            warrior.head = head;
            warrior.tail = head + 1;
            warrior.process_count = 1;
        }

        let mut death_order = Vec::new();
        let mut alive_count = nwarriors;
        let mut cycles_remaining = u64::from(nwarriors)
            .checked_mul(u64::from(self.config.cycles))
            .ok_or(MarsError::Internal(
                "nwarriors * cycles overflows a u64 cycle budget",
            ))?;
        self.current = 0;

        // A single-warrior battle starts with `alive_count == 1` and must
        // still run: there is no opponent to reduce it from 2 down to 1,
        // so termination on the "only one warrior left" side depends only
        // on a death actually occurring below, not on this loop guard.
        while cycles_remaining > 0 {
            let current = self.current;
            let warrior = self.ring.get_mut(current);
            let ip = self.queue.dequeue_head(&mut warrior.head);
            let regs = operands::evaluate(ip, &mut self.core)?;
            let outcome = dispatch::execute(OpInputs {
                regs: &regs,
                core: &mut self.core,
            })?;

            // Valid even for `current` once it is removed from the ring
            // below: removal only rewrites its neighbors' pointers, not
            // its own, so the successor captured here still names the
            // correct next warrior to schedule.
            let successor = self.ring.successor(current);
            let mut battle_over = false;

            match outcome {
                Outcome::Die => {
                    let warrior = self.ring.get_mut(current);
                    warrior.process_count = warrior
                        .process_count
                        .checked_sub(1)
                        .ok_or(MarsError::Internal(
                        "process_count underflow on death",
                    ))?;
                    if warrior.process_count == 0 {
                        self.ring.remove(current);
                        death_order.push(current);
                        // Rescale the remaining budget so that each
                        // surviving warrior still gets the same number of
                        // turns as before, using the old (pre-decrement)
                        // alive count as the divisor: nC+k -> (n-1)C+k.
                        cycles_remaining -=
                            cycles_remaining / u64::from(alive_count);
                        alive_count -= 1;
                        battle_over = alive_count <= 1;
                    }
                }
                Outcome::Advance(addr) => {
                    let warrior = self.ring.get_mut(current);
                    self.queue.enqueue_tail(&mut warrior.tail, addr);
                }
                Outcome::Split { next, fork } => {
                    let warrior = self.ring.get_mut(current);
                    self.queue.enqueue_tail(&mut warrior.tail, next);
                    if warrior.process_count < processes {
                        warrior.process_count += 1;
                        self.queue.enqueue_tail(&mut warrior.tail, fork);
                    }
                    // `sim.c` only ever re-evaluates the "every warrior has
                    // more insurance than cycles remain" tie check from
                    // inside its SPL case; process_count is the only piece
                    // of this predicate that a non-SPL opcode can change
                    // (and only SPL changes it, upward), so checking here
                    // instead of every cycle matches the reference trace
                    // exactly rather than just matching its final
                    // alive_count/death_order.
                    if cycles_remaining
                        < u64::from(alive_count) * u64::from(processes)
                        && self.tie_is_inevitable(alive_count, cycles_remaining)
                    {
                        battle_over = true;
                    }
                }
            }

            if battle_over {
                break;
            }
            cycles_remaining -= 1;
            self.current = successor;
        }

        Ok(BattleOutcome {
            alive_count,
            death_order,
        })
    }

    /// Whether every warrior still in the ring is guaranteed to survive
    /// the remaining cycle budget: each has more cycles of "insurance"
    /// (`process_count * alive_count`) than cycles remain.
    fn tie_is_inevitable(
        &self,
        alive_count: u32,
        cycles_remaining: u64,
    ) -> bool {
        self.ring.alive_ids_from(self.current).iter().all(|&id| {
            let warrior = self.ring.get(id);
            u64::from(warrior.process_count) * u64::from(alive_count)
                > cycles_remaining
        })
    }

    /// Current contents of a core cell.
    #[must_use]
    pub fn read(&self, addr: CoreAddr) -> CompleteInstruction {
        dispatch::peek(&self.core, addr)
    }

    /// Ids of warriors still in the ring, in scheduling order starting
    /// from the currently-scheduled warrior.
    #[must_use]
    pub fn alive_warrior_ids(&self) -> Vec<u32> {
        self.ring.alive_ids_from(self.current)
    }

    /// `process_count` of warrior `id`, or `None` if it is not alive (or
    /// `id` is not a valid warrior for this `Mars`'s configuration).
    #[must_use]
    pub fn process_count(&self, id: u32) -> Option<u32> {
        if id >= self.config.nwarriors {
            return None;
        }
        let warrior = self.ring.get(id);
        warrior.alive.then_some(warrior.process_count)
    }
}
