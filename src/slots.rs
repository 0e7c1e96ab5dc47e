use std::fmt;

/// Fixed-capacity storage that is reused across frames without being cleared.
///
/// Only the first `len()` slots hold values written since the last `reset`;
/// the tail keeps whatever an earlier frame left there and is never exposed.
pub struct Slots<T, const N: usize> {
    items: [T; N],
    len: usize,
}

impl<T: Copy, const N: usize> Clone for Slots<T, N> {
    fn clone(&self) -> Self {
        Self {
            items: self.items,
            len: self.len,
        }
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for Slots<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_slice().fmt(f)
    }
}

impl<T: Copy, const N: usize> Slots<T, N> {
    /// Empty storage with every slot pre-filled by `fill`.
    #[inline]
    pub fn new(fill: T) -> Self {
        Self {
            items: [fill; N],
            len: 0,
        }
    }
}

impl<T, const N: usize> Slots<T, N> {
    /// Appends `item`, returns it back when every slot is taken.
    #[inline]
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }

        self.items[self.len] = item;
        self.len += 1;

        Ok(())
    }

    /// Forgets the live prefix. Stored values are left in place.
    #[inline]
    pub fn reset(&mut self) {
        self.len = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        N
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &'_ T> {
        self.as_slice().iter()
    }
}
