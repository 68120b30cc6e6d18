//! Growable entity pools and the typed handles that index them.
//!
//! Producers (the asset importer) and consumers (the renderer) never hold
//! references into a pool across mutations; they hold a [`Handle`] and
//! re-resolve it at the point of use. A pool only ever grows, so a handle
//! stays valid for the lifetime of the pool it was issued by.

use std::fmt;
use std::marker::PhantomData;

/// Stable integer reference into a specific [`Pool`].
///
/// A handle is valid iff its index is below the pool's current length.
/// Dereferencing an invalid handle through [`Pool::get`] is a contract
/// violation and aborts; handles are internally generated and never come
/// from untrusted input.
pub struct Handle<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index: index as u32,
            _marker: PhantomData,
        }
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }
}

// Manual impls so `T` does not need to be Clone/Copy/etc. itself.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Handle<T> {}
impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}
impl<T> Eq for Handle<T> {}
impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.index)
    }
}
impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Append-only entity storage issuing stable [`Handle`]s.
#[derive(Clone, Debug, Default)]
pub struct Pool<T> {
    entries: Vec<T>,
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a default-constructed entity and return its handle.
    pub fn add(&mut self) -> Handle<T>
    where
        T: Default,
    {
        self.push(T::default())
    }

    /// Append `entity` and return its handle.
    pub fn push(&mut self, entity: T) -> Handle<T> {
        self.entries.push(entity);
        Handle::new(self.entries.len() - 1)
    }

    pub fn valid(&self, handle: Handle<T>) -> bool {
        handle.index() < self.entries.len()
    }

    /// Bounds-checked dereference. An out-of-range handle aborts.
    pub fn get(&self, handle: Handle<T>) -> &T {
        assert!(
            self.valid(handle),
            "invalid handle {:?} for pool of len {}",
            handle,
            self.entries.len()
        );
        &self.entries[handle.index()]
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> &mut T {
        assert!(
            self.valid(handle),
            "invalid handle {:?} for pool of len {}",
            handle,
            self.entries.len()
        );
        &mut self.entries[handle.index()]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Handles of all current entries, in creation order.
    pub fn handles(&self) -> impl Iterator<Item = Handle<T>> + use<T> {
        (0..self.entries.len()).map(Handle::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_stay_valid_as_pool_grows() {
        let mut pool: Pool<String> = Pool::new();
        let first = pool.push("first".to_string());
        let handles: Vec<_> = (0..100).map(|i| pool.push(format!("entry {i}"))).collect();

        assert!(pool.valid(first));
        assert_eq!(pool.get(first), "first");
        for (i, handle) in handles.iter().enumerate() {
            assert!(pool.valid(*handle));
            assert_eq!(pool.get(*handle), &format!("entry {i}"));
        }
    }

    #[test]
    fn add_appends_default_entities() {
        let mut pool: Pool<u32> = Pool::new();
        let a = pool.add();
        let b = pool.add();
        assert_ne!(a, b);
        assert_eq!(*pool.get(a), 0);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    #[should_panic(expected = "invalid handle")]
    fn out_of_range_handle_aborts() {
        let mut small: Pool<u32> = Pool::new();
        let mut large: Pool<u32> = Pool::new();
        large.push(1);
        large.push(2);
        small.push(1);
        let stray = large.handles().last().unwrap();
        small.get(stray);
    }
}
