use crate::{AtomicSlot, ExchangeStrategy, NativeExchange, SyncError};
use core::ptr::NonNull;

/// Per-channel registry of driver objects.
///
/// Each of the `N` entries is one [`AtomicSlot`]. A driver claims a
/// peripheral channel by installing itself into the empty slot, interrupt
/// handlers look the owner up with [`get`](Self::get), and only the owner
/// can take itself out again. All transitions are single compare-and-exchange
/// operations, so no lock is needed.
///
/// ```
/// use hal_sync::{InstanceTable, SyncError};
///
/// struct Channel(u8);
///
/// static CHANNELS: InstanceTable<Channel, 4> = InstanceTable::new();
/// static DMA0: Channel = Channel(0);
/// static DMA1: Channel = Channel(1);
///
/// CHANNELS.install(0, &DMA0).unwrap();
/// assert_eq!(CHANNELS.install(0, &DMA1), Err(SyncError::Occupied { index: 0 }));
/// assert_eq!(CHANNELS.get(0).map(|c| c.0), Some(0));
/// CHANNELS.remove(0, &DMA0).unwrap();
/// ```
pub struct InstanceTable<T: 'static, const N: usize, S = NativeExchange> {
    slots: [AtomicSlot<Option<NonNull<T>>, S>; N],
}

// Only shared references to `T` ever leave the table.
unsafe impl<T: Sync, const N: usize, S> Sync for InstanceTable<T, N, S> {}
unsafe impl<T: Sync, const N: usize, S> Send for InstanceTable<T, N, S> {}

impl<T: 'static, const N: usize, S> Default for InstanceTable<T, N, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static, const N: usize, S> InstanceTable<T, N, S> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [const { AtomicSlot::empty() }; N],
        }
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    fn slot(&self, index: usize) -> Result<&AtomicSlot<Option<NonNull<T>>, S>, SyncError> {
        self.slots
            .get(index)
            .ok_or(SyncError::IndexOutOfRange { index, len: N })
    }

    /// Empties slot `index` whoever holds it, e.g. when a channel is torn
    /// down after an error without a reference to its owner.
    ///
    /// # Errors
    /// [`SyncError::IndexOutOfRange`] for a bad index.
    pub fn reset(&self, index: usize) -> Result<(), SyncError> {
        self.slot(index)?.store(None);
        log::debug!("slot {index} reset");
        Ok(())
    }

    /// The instance registered at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'static T> {
        let ptr = self.slots.get(index)?.load()?;
        // SAFETY: only `&'static T` are ever stored.
        Some(unsafe { ptr.as_ref() })
    }
}

impl<T: 'static, const N: usize, S: ExchangeStrategy> InstanceTable<T, N, S> {
    /// Moves slot `index` from `expected` to `new` if it still holds
    /// `expected` (compared by address).
    ///
    /// # Errors
    /// [`SyncError::Mismatch`] if the slot holds something else,
    /// [`SyncError::IndexOutOfRange`] for a bad index.
    pub fn replace(
        &self,
        index: usize,
        expected: Option<&'static T>,
        new: Option<&'static T>,
    ) -> Result<(), SyncError> {
        self.slot(index)?
            .compare_exchange(expected.map(NonNull::from), new.map(NonNull::from))
            .map(|_| ())
            .map_err(|_| SyncError::Mismatch { index })
    }

    /// Registers `instance` in the empty slot `index`.
    ///
    /// # Errors
    /// [`SyncError::Occupied`] if another instance got there first,
    /// [`SyncError::IndexOutOfRange`] for a bad index.
    pub fn install(&self, index: usize, instance: &'static T) -> Result<(), SyncError> {
        self.replace(index, None, Some(instance))
            .map_err(|e| match e {
                SyncError::Mismatch { index } => SyncError::Occupied { index },
                e => e,
            })?;
        log::debug!("instance {instance:p} installed in slot {index}");
        Ok(())
    }

    /// Unregisters `instance` from slot `index`.
    ///
    /// # Errors
    /// [`SyncError::NotRegistered`] if the slot does not hold `instance`,
    /// [`SyncError::IndexOutOfRange`] for a bad index.
    pub fn remove(&self, index: usize, instance: &'static T) -> Result<(), SyncError> {
        self.replace(index, Some(instance), None)
            .map_err(|e| match e {
                SyncError::Mismatch { index } => SyncError::NotRegistered { index },
                e => e,
            })?;
        log::debug!("instance {instance:p} removed from slot {index}");
        Ok(())
    }
}
