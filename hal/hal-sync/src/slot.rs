use crate::{ExchangeStrategy, NativeExchange};
use core::marker::PhantomData;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

/// A value that fits a machine word and compares by identity.
pub trait Word: Copy + Eq {
    fn into_word(self) -> usize;
    fn from_word(word: usize) -> Self;
}

impl Word for usize {
    #[inline]
    fn into_word(self) -> usize {
        self
    }

    #[inline]
    fn from_word(word: usize) -> Self {
        word
    }
}

impl<T> Word for *mut T {
    #[inline]
    fn into_word(self) -> usize {
        self.expose_provenance()
    }

    #[inline]
    fn from_word(word: usize) -> Self {
        core::ptr::with_exposed_provenance_mut(word)
    }
}

impl<T> Word for *const T {
    #[inline]
    fn into_word(self) -> usize {
        self.expose_provenance()
    }

    #[inline]
    fn from_word(word: usize) -> Self {
        core::ptr::with_exposed_provenance(word)
    }
}

impl<T> Word for Option<NonNull<T>> {
    #[inline]
    fn into_word(self) -> usize {
        self.map_or(0, |p| p.as_ptr().expose_provenance())
    }

    #[inline]
    fn from_word(word: usize) -> Self {
        NonNull::new(core::ptr::with_exposed_provenance_mut(word))
    }
}

/// A [`Word`] whose all-zero representation is its empty value.
pub trait Empty: Word {}

impl Empty for usize {}
impl<T> Empty for *mut T {}
impl<T> Empty for *const T {}
impl<T> Empty for Option<NonNull<T>> {}

/// A word-sized cell updated with compare-and-exchange.
///
/// Used for lock-free single-slot transitions such as installing a driver
/// object or callback exactly once. Values are compared by identity, never
/// by what a pointer points to.
///
/// ```
/// use hal_sync::AtomicSlot;
///
/// static HANDLER: AtomicSlot<*const u32> = AtomicSlot::empty();
/// static VALUE: u32 = 5;
///
/// let ours = &raw const VALUE;
/// assert!(HANDLER.compare_exchange(core::ptr::null(), ours).is_ok());
/// // A second installer sees who won.
/// assert_eq!(HANDLER.compare_exchange(core::ptr::null(), ours), Err(ours));
/// ```
#[repr(transparent)]
pub struct AtomicSlot<T, S = NativeExchange> {
    word: AtomicUsize,
    _marker: PhantomData<fn() -> (T, S)>,
}

impl<T: Empty, S> AtomicSlot<T, S> {
    /// A slot holding the all-zero value: null, `None` or `0`.
    #[must_use]
    pub const fn empty() -> Self {
        Self::from_raw_word(0)
    }
}

impl<T, S> AtomicSlot<T, S> {
    const fn from_raw_word(word: usize) -> Self {
        Self {
            word: AtomicUsize::new(word),
            _marker: PhantomData,
        }
    }
}

impl<T: Word, S> AtomicSlot<T, S> {
    pub fn new(value: T) -> Self {
        Self::from_raw_word(value.into_word())
    }

    /// Current value, ordered after every access that preceded the store
    /// or exchange that put it there.
    #[inline]
    pub fn load(&self) -> T {
        T::from_word(self.word.load(Ordering::Acquire))
    }

    /// Unconditional store, published with everything written before it.
    #[inline]
    pub fn store(&self, value: T) {
        self.word.store(value.into_word(), Ordering::Release);
    }

    #[inline]
    pub fn get_mut(&mut self) -> T {
        T::from_word(*self.word.get_mut())
    }

    #[inline]
    pub fn into_inner(self) -> T {
        T::from_word(self.word.into_inner())
    }
}

impl<T: Word, S: ExchangeStrategy> AtomicSlot<T, S> {
    /// Stores `new` if the slot holds `current`, indivisibly.
    ///
    /// # Errors
    /// `Err(observed)` with the slot unmodified if it did not hold `current`.
    #[inline]
    pub fn compare_exchange(&self, current: T, new: T) -> Result<T, T> {
        S::compare_exchange(&self.word, current.into_word(), new.into_word())
            .map(T::from_word)
            .map_err(T::from_word)
    }
}

impl<T: Word + core::fmt::Debug, S> core::fmt::Debug for AtomicSlot<T, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("AtomicSlot").field(&self.load()).finish()
    }
}
