/// One warrior's scheduling state.
///
/// `id` is also this warrior's index into [`WarriorRing`]'s backing
/// `Vec`, matching the convention the original simulator uses for its
/// warrior table (`warTab[i].id = i`).
#[derive(Clone, Copy, Debug)]
pub struct Warrior {
    /// Index into the shared process-queue buffer of the next instruction
    /// pointer to dequeue for this warrior.
    pub head: usize,
    /// Index into the shared process-queue buffer where the next queued
    /// instruction pointer for this warrior will be written.
    pub tail: usize,
    /// Number of live processes this warrior currently has queued.
    pub process_count: u32,
    /// Id of the next warrior to run, valid only while this warrior is
    /// still linked into the ring.
    pub next: u32,
    /// Id of the previous warrior in the ring, valid only while this
    /// warrior is still linked into the ring.
    pub prev: u32,
    /// This warrior's id, equal to its index in the ring's backing `Vec`.
    pub id: u32,
    /// Whether this warrior still has at least one live process. Tracked
    /// separately from ring membership so introspection can answer
    /// "is this warrior alive" without a ring walk.
    pub alive: bool,
}

/// An index-based intrusive doubly-linked ring over live warriors.
///
/// Dead warriors stay in the backing `Vec` (their `Warrior` record is
/// retained for introspection such as their final `process_count`) but are
/// spliced out of the `next`/`prev` chain and never revisited.
pub struct WarriorRing {
    /// Every warrior this battle ever had, indexed by id. Dead entries
    /// remain but are unreachable via `next`/`prev` traversal.
    warriors: Vec<Warrior>,
}

impl WarriorRing {
    /// Build a ring linking warriors `0..n` in scheduling order: warrior 0
    /// runs first, its `next` is warrior 1, and the last warrior's `next`
    /// wraps back to warrior 0.
    pub fn new(n: u32) -> Self {
        let mut ring = Self {
            warriors: Vec::new(),
        };
        ring.reset(n);
        ring
    }

    /// Re-link `0..n` warriors in scheduling order in place, without
    /// reallocating if the backing `Vec` already has `n` entries. Used to
    /// reuse a [`WarriorRing`] as scratch storage across successive
    /// battles.
    pub fn reset(&mut self, n: u32) {
        self.warriors.clear();
        self.warriors.extend((0..n).map(|id| Warrior {
            head: 0,
            tail: 0,
            process_count: 0,
            next: (id + 1) % n,
            prev: (id + n - 1) % n,
            id,
            alive: true,
        }));
    }

    /// Read-only access to a warrior's record, dead or alive.
    #[must_use]
    #[allow(
        clippy::indexing_slicing,
        reason = "id is always a valid warrior index: the backing Vec is \
                  sized to exactly nwarriors by reset(), and every id this \
                  type is handed (by Mars, or by this type's own next/prev \
                  links) originates from that same 0..nwarriors range"
    )]
    pub fn get(&self, id: u32) -> &Warrior {
        &self.warriors[id as usize]
    }

    /// Mutable access to a warrior's record, dead or alive.
    #[allow(
        clippy::indexing_slicing,
        reason = "id is always a valid warrior index, see get()"
    )]
    pub fn get_mut(&mut self, id: u32) -> &mut Warrior {
        &mut self.warriors[id as usize]
    }

    /// The next warrior scheduled to run after `id`, following the live
    /// ring.
    #[must_use]
    #[allow(
        clippy::indexing_slicing,
        reason = "id is always a valid warrior index, see get()"
    )]
    pub fn successor(&self, id: u32) -> u32 {
        self.warriors[id as usize].next
    }

    /// Splice `id` out of the ring. `id` itself is left with stale
    /// `next`/`prev` values; callers must not traverse from a removed
    /// warrior afterward.
    #[allow(
        clippy::indexing_slicing,
        reason = "id, and the prev/next it carries, are always valid \
                  warrior indices, see get()"
    )]
    pub fn remove(&mut self, id: u32) {
        let prev = self.warriors[id as usize].prev;
        let next = self.warriors[id as usize].next;
        self.warriors[prev as usize].next = next;
        self.warriors[next as usize].prev = prev;
        self.warriors[id as usize].alive = false;
    }

    /// Ids of every warrior still linked into the ring, starting from
    /// `start` and following `next` until the ring closes.
    #[must_use]
    #[allow(
        clippy::indexing_slicing,
        reason = "start, and every next it leads to, are always valid \
                  warrior indices, see get()"
    )]
    pub fn alive_ids_from(&self, start: u32) -> Vec<u32> {
        let mut ids = vec![start];
        let mut cur = self.warriors[start as usize].next;
        while cur != start {
            ids.push(cur);
            cur = self.warriors[cur as usize].next;
        }
        ids
    }
}
