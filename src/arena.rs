/*!
Slot arena backing the vertex and edge stores of a graph.

Removed slots go on a free list and are reused by later insertions;
every removal bumps the slot's generation, so a handle to the removed
record can never resolve to whatever occupies the slot next.
*/

use std::marker::PhantomData;

/// A handle type that can address an [`Arena`].
pub trait ArenaHandle: Copy {
    fn from_parts(index: u32, generation: u32) -> Self;

    fn slot(self) -> usize;

    fn generation(self) -> u32;
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug, Clone)]
pub struct Arena<H, T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
    _handle: PhantomData<H>,
}

impl<H: ArenaHandle, T> Default for Arena<H, T> {
    fn default() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            _handle: PhantomData,
        }
    }
}

impl<H: ArenaHandle, T> Arena<H, T> {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert the record built by `f`, which receives the handle the
    /// record will be stored under.
    pub fn insert_with<F>(&mut self, f: F) -> H
    where
        F: FnOnce(H) -> T,
    {
        self.len += 1;
        if let Some(ix) = self.free.pop() {
            let slot = &mut self.slots[ix as usize];
            let handle = H::from_parts(ix, slot.generation);
            slot.value = Some(f(handle));
            handle
        } else {
            let ix = self.slots.len() as u32;
            let handle = H::from_parts(ix, 0);
            self.slots.push(Slot {
                generation: 0,
                value: Some(f(handle)),
            });
            handle
        }
    }

    #[inline]
    pub fn insert(&mut self, value: T) -> H {
        self.insert_with(|_| value)
    }

    pub fn remove(&mut self, handle: H) -> Option<T> {
        let slot = self.slots.get_mut(handle.slot())?;
        if slot.generation != handle.generation() || slot.value.is_none() {
            return None;
        }
        let value = slot.value.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.slot() as u32);
        self.len -= 1;
        value
    }

    #[inline]
    pub fn get(&self, handle: H) -> Option<&T> {
        let slot = self.slots.get(handle.slot())?;
        if slot.generation == handle.generation() {
            slot.value.as_ref()
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.slot())?;
        if slot.generation == handle.generation() {
            slot.value.as_mut()
        } else {
            None
        }
    }

    #[inline]
    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    /// Iterate through the live records in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(ix, slot)| {
            let value = slot.value.as_ref()?;
            Some((H::from_parts(ix as u32, slot.generation), value))
        })
    }

    pub fn handles(&self) -> impl Iterator<Item = H> + '_ {
        self.iter().map(|(h, _)| h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::VertexId;

    #[test]
    fn insert_get_remove() {
        let mut arena: Arena<VertexId, &str> = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.remove(a), Some("a"));
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.remove(a), None);
        assert_eq!(arena.len(), 1);
        assert!(arena.contains(b));
    }

    #[test]
    fn reused_slot_rejects_stale_handle() {
        let mut arena: Arena<VertexId, u32> = Arena::new();
        let a = arena.insert(1);
        arena.remove(a);
        let c = arena.insert(2);
        assert_eq!(a.index(), c.index());
        assert_ne!(a, c);
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.get(c), Some(&2));
    }

    #[test]
    fn insert_with_sees_own_handle() {
        let mut arena: Arena<VertexId, VertexId> = Arena::new();
        let a = arena.insert_with(|h| h);
        assert_eq!(arena.get(a), Some(&a));
        let handles = arena.handles().collect::<Vec<_>>();
        assert_eq!(handles, vec![a]);
    }
}
