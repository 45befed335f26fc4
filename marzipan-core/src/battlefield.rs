use redcode::CompleteInstruction;

use crate::{
    error::{MarsError, MarsResult},
    CoreAddr,
};

/// Circular memory of `CompleteInstruction`s that warriors execute in and
/// mutate.
///
/// Every address is implicitly modulo `core_size`; [`Battlefield::offset`]
/// is the single place that arithmetic wraps.
pub struct Battlefield {
    /// Instructions and field values currently stored in the core
    cells: Vec<CompleteInstruction>,
}

impl Battlefield {
    /// Allocate a battlefield of `core_size` cells, all `DAT.F $0, $0`.
    pub fn new(core_size: CoreAddr) -> Self {
        Self {
            cells: vec![CompleteInstruction::default(); core_size as usize],
        }
    }

    /// Number of addressable cells.
    #[must_use]
    pub fn len(&self) -> CoreAddr {
        // core_size was validated to fit in CoreAddr at construction time
        self.cells.len() as CoreAddr
    }

    /// Reset every cell to `CompleteInstruction::default()`.
    pub fn clear(&mut self) {
        self.cells.fill(CompleteInstruction::default());
    }

    /// Read the instruction at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`MarsError::Internal`] if `addr` is outside the core.
    pub fn read(&self, addr: CoreAddr) -> MarsResult<CompleteInstruction> {
        self.cells
            .get(addr as usize)
            .copied()
            .ok_or(MarsError::Internal("core address out of range on read"))
    }

    /// Mutable access to the instruction at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`MarsError::Internal`] if `addr` is outside the core.
    pub fn get_mut(
        &mut self,
        addr: CoreAddr,
    ) -> MarsResult<&mut CompleteInstruction> {
        self.cells
            .get_mut(addr as usize)
            .ok_or(MarsError::Internal("core address out of range on write"))
    }

    /// Write `value` at `addr`, silently overwriting whatever was there.
    ///
    /// # Errors
    ///
    /// Returns [`MarsError::Internal`] if `addr` is outside the core.
    pub fn write(
        &mut self,
        addr: CoreAddr,
        value: CompleteInstruction,
    ) -> MarsResult<()> {
        *self.get_mut(addr)? = value;
        Ok(())
    }

    /// Compute `initial + delta (mod core_size)`, wrapping negative deltas
    /// into range first.
    ///
    /// # Errors
    ///
    /// Returns [`MarsError::Internal`] on an integer overflow that should be
    /// impossible given a core size that fits in a [`CoreAddr`].
    pub fn offset(
        &self,
        initial: CoreAddr,
        delta: i64,
    ) -> MarsResult<CoreAddr> {
        offset(initial, delta, self.len())
    }
}

/// Evaluate `initial + delta` with core-size modulo arithmetic.
///
/// # Errors
///
/// Returns [`MarsError::Internal`] on an integer overflow that should be
/// impossible given a core size that fits in a [`CoreAddr`].
pub fn offset(
    initial: CoreAddr,
    delta: i64,
    size: CoreAddr,
) -> MarsResult<CoreAddr> {
    let mut res = delta;
    while res < 0 {
        res = res.checked_add(i64::from(size)).ok_or(MarsError::Internal(
            "impossible integer overflow while adding core size to a \
             negative offset",
        ))?;
    }
    let sum = res.checked_add(i64::from(initial)).ok_or(
        MarsError::Internal(
            "impossible integer overflow adding normalized offset to \
             initial value",
        ),
    )?;
    let normalized = sum.checked_rem(i64::from(size)).ok_or(
        MarsError::Internal(
            "impossible division by zero when dividing by core size",
        ),
    )?;
    CoreAddr::try_from(normalized).map_or(
        Err(MarsError::Internal(
            "error converting normalized offset back into a CoreAddr",
        )),
        Ok,
    )
}
