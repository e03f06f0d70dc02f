use super::{
    BoundedArray,
    OutOfBoundsAccess,
};
use crate::Index;
use core::{
    cmp::Ordering,
    mem,
    num::NonZeroUsize,
};

/// The position of an entry within the binary heap array.
///
/// This is distinct from the key's own index: keys may be reordered within
/// the heap array as weights change, while `HeapPosition` always refers to a
/// slot in that array.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct HeapPosition(NonZeroUsize);

impl HeapPosition {
    /// Returns the root heap position.
    fn root() -> Self {
        Self::from_index(0)
    }

    /// Returns the heap position of the left child in relation to self.
    fn left_child(self) -> Self {
        Self::from_index(self.into_index() * 2 + 1)
    }

    /// Returns the heap position of the right child in relation to self.
    fn right_child(self) -> Self {
        Self::from_index(self.into_index() * 2 + 2)
    }

    fn is_root(self) -> bool {
        self.into_index() == 0
    }

    /// Returns the heap position of the parent in relation to self.
    ///
    /// Returns `None` if self is the root.
    fn parent(self) -> Option<Self> {
        if self.is_root() {
            return None
        }
        Some(Self::from_index((self.into_index() - 1) / 2))
    }
}

impl Index for HeapPosition {
    fn from_index(index: usize) -> Self {
        Self(
            NonZeroUsize::new(index.wrapping_add(1))
                .expect("encountered invalid heap position index"),
        )
    }

    fn into_index(self) -> usize {
        self.0.get().wrapping_sub(1)
    }
}

/// A bounded binary max-heap that supports update of key weights.
///
/// Weights of keys that are not currently contained in the heap are kept
/// around so that [`BoundedHeap::push_or_update`] can restore a key with the
/// weight it held before it was popped, as is needed by VSIDS-style decision
/// heuristics that evict and later reinstate variables.
#[derive(Debug, Clone)]
pub struct BoundedHeap<K, W> {
    /// The number of elements currently contained in the heap.
    len: usize,
    /// The keys ordered according to the heap property.
    heap: BoundedArray<HeapPosition, K>,
    /// The current heap position for every key, `None` if not contained.
    positions: BoundedArray<K, Option<HeapPosition>>,
    /// The weight for every key, retained even while the key is not contained.
    weights: BoundedArray<K, W>,
}

impl<K, W> Default for BoundedHeap<K, W> {
    fn default() -> Self {
        Self {
            len: 0,
            heap: BoundedArray::default(),
            positions: BoundedArray::default(),
            weights: BoundedArray::default(),
        }
    }
}

impl<K, W> BoundedHeap<K, W>
where
    K: Index,
    W: Default,
{
    /// Resizes the capacity of the bounded heap, filling new slots with
    /// default weights and no heap position.
    pub fn resize_capacity(&mut self, new_len: usize) {
        self.heap.resize_with(new_len, || K::from_index(0));
        self.positions.resize_with(new_len, Default::default);
        self.weights.resize_with(new_len, Default::default);
    }
}

impl<K, W> BoundedHeap<K, W>
where
    K: Index,
{
    /// Returns the number of elements stored in the bounded heap.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the bounded heap is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the capacity of the bounded heap.
    pub fn capacity(&self) -> usize {
        self.weights.len()
    }

    /// Returns `true` if the element associated with the given key is contained.
    pub fn contains(&self, key: K) -> Result<bool, OutOfBoundsAccess> {
        Ok(self.positions.get(key)?.is_some())
    }

    fn left_child(&self, position: HeapPosition) -> Option<HeapPosition> {
        let child = position.left_child();
        if child.into_index() >= self.len() {
            return None
        }
        Some(child)
    }

    fn right_child(&self, position: HeapPosition) -> Option<HeapPosition> {
        let child = position.right_child();
        if child.into_index() >= self.len() {
            return None
        }
        Some(child)
    }

    fn heap_position(&self, key: K) -> Result<HeapPosition, OutOfBoundsAccess> {
        self.positions
            .get(key)?
            .as_ref()
            .copied()
            .ok_or(OutOfBoundsAccess)
    }

    /// Pushes the key to the heap, growing the heap's length and updating
    /// the positions array.
    ///
    /// # Panics
    ///
    /// If the key is already contained in the heap.
    fn push_heap_position(&mut self, key: K) -> Result<HeapPosition, OutOfBoundsAccess> {
        assert!(
            !self.contains(key)?,
            "encountered already contained key upon push"
        );
        let last_position = HeapPosition::from_index(self.len);
        self.positions.update(key, Some(last_position))?;
        self.heap.update(last_position, key)?;
        self.len += 1;
        Ok(last_position)
    }
}

impl<K, W> BoundedHeap<K, W>
where
    K: Index + Eq,
    W: Ord + Copy,
{
    /// Inserts the key into the heap if not already contained, and applies
    /// `update` to its current weight (or its default if never assigned).
    ///
    /// This is how both freshly registered keys and previously popped keys
    /// enter the heap: `update` is handed whatever weight the key last held,
    /// so popping a key does not forget its priority.
    ///
    /// # Errors
    ///
    /// If the key's index is out of bounds for the bounded heap.
    pub fn push_or_update<F>(&mut self, key: K, update: F) -> Result<(), OutOfBoundsAccess>
    where
        F: FnOnce(W) -> W,
    {
        let already_contained = self.contains(key)?;
        if !already_contained {
            self.push_heap_position(key)?;
        }
        let increased = {
            let old_weight = *self.weights.get(key)?;
            let new_weight = update(old_weight);
            let slot = self.weights.get_mut(key)?;
            let previous = mem::replace(slot, new_weight);
            !already_contained || previous <= new_weight
        };
        let position = self.heap_position(key)?;
        match increased {
            true => self.sift_up(position)?,
            false => self.sift_down(position)?,
        }
        Ok(())
    }

    /// Compares the weights of `lhs` and `rhs`, breaking ties by preferring
    /// the key with the lower index.
    ///
    /// Callers such as VSIDS-style decision heuristics rely on this to make
    /// `pop` deterministic among equally-weighted keys (e.g. freshly seeded
    /// variables), rather than depending on incidental sift order.
    fn cmp_weights(&self, lhs: K, rhs: K) -> Result<Ordering, OutOfBoundsAccess> {
        if lhs == rhs {
            return Ok(Ordering::Equal)
        }
        let lhs_weight = self.weights.get(lhs)?;
        let rhs_weight = self.weights.get(rhs)?;
        Ok(lhs_weight
            .cmp(rhs_weight)
            .then_with(|| rhs.into_index().cmp(&lhs.into_index())))
    }

    /// Restores the heap property upwards from `pivot`.
    ///
    /// Used after the weight of the pivot element has been increased or
    /// after a new key/weight pair has been inserted into the heap.
    fn sift_up(&mut self, pivot: HeapPosition) -> Result<(), OutOfBoundsAccess> {
        let pivot_key = *self.heap.get(pivot)?;
        let mut cursor = pivot;
        'percolate: while let Some(parent) = cursor.parent() {
            let parent_key = *self.heap.get(parent)?;
            match self.cmp_weights(pivot_key, parent_key)? {
                Ordering::Greater => {
                    self.heap.update(cursor, parent_key)?;
                    self.positions.update(parent_key, Some(cursor))?;
                    cursor = parent;
                }
                Ordering::Equal | Ordering::Less => break 'percolate,
            }
        }
        self.heap.update(cursor, pivot_key)?;
        self.positions.update(pivot_key, Some(cursor))?;
        Ok(())
    }

    /// Restores the heap property downwards from `pivot`.
    ///
    /// Used after the weight of the pivot element has been decreased or
    /// the root element has been popped.
    fn sift_down(&mut self, pivot: HeapPosition) -> Result<(), OutOfBoundsAccess> {
        let pivot_key = *self.heap.get(pivot)?;
        let mut cursor = pivot;
        'percolate: while let Some(left_child) = self.left_child(cursor) {
            let right_child = self.right_child(cursor);
            let max_child = match right_child {
                Some(right_child) => {
                    let left_key = *self.heap.get(left_child)?;
                    let right_key = *self.heap.get(right_child)?;
                    match self.cmp_weights(left_key, right_key)? {
                        Ordering::Less | Ordering::Equal => right_child,
                        Ordering::Greater => left_child,
                    }
                }
                None => left_child,
            };
            let max_child_key = *self.heap.get(max_child)?;
            if self.cmp_weights(pivot_key, max_child_key)? == Ordering::Less {
                self.heap.update(cursor, max_child_key)?;
                self.positions.update(max_child_key, Some(cursor))?;
                cursor = max_child;
            } else {
                break 'percolate
            }
        }
        self.heap.update(cursor, pivot_key)?;
        self.positions.update(pivot_key, Some(cursor))?;
        Ok(())
    }

    /// Returns the current maximum key and its weight without popping it.
    pub fn peek(&self) -> Option<(&K, &W)> {
        if self.is_empty() {
            return None
        }
        let key = self
            .heap
            .get(HeapPosition::root())
            .expect("encountered unexpected empty heap array");
        let weight = self
            .weights
            .get(*key)
            .expect("encountered invalid root key");
        Some((key, weight))
    }

    /// Pops the current maximum key and its weight from the bounded heap.
    ///
    /// The key's weight is retained internally so a later `push_or_update`
    /// can restore it without losing its accumulated priority.
    pub fn pop(&mut self) -> Option<(K, W)> {
        if self.is_empty() {
            return None
        }
        let key = *self
            .heap
            .get(HeapPosition::root())
            .expect("encountered unexpected empty heap array");
        self.positions
            .update(key, None)
            .expect("encountered invalid root key");
        let weight = *self.weights.get(key).expect("encountered invalid root key");
        if self.len == 1 {
            self.len = 0;
        } else {
            let new_root = *self
                .heap
                .get(HeapPosition::from_index(self.len - 1))
                .expect("unexpected missing last element in heap");
            self.heap
                .update(HeapPosition::root(), new_root)
                .expect("encountered error upon heap update of new root");
            self.positions
                .update(new_root, Some(HeapPosition::root()))
                .expect("encountered unexpected error upon positions heap update");
            self.len -= 1;
            self.sift_down(HeapPosition::root())
                .expect("encountered error upon sifting down new root in heap");
        }
        Some((key, weight))
    }

    /// Returns `true` if the heap property holds for every element.
    ///
    /// Test-only: the heap property is that every parent's weight is
    /// greater than or equal to the weight of its children.
    #[cfg(test)]
    fn satisfies_heap_property(&self) -> bool {
        for i in 1..self.len() {
            let child = HeapPosition::from_index(i);
            let parent = child.parent().expect("encountered missing parent");
            let child_key = self.heap.get(child).expect("missing child heap entry");
            let parent_key = self.heap.get(parent).expect("missing parent heap entry");
            if self
                .cmp_weights(*parent_key, *child_key)
                .expect("error comparing parent and child weights")
                == Ordering::Less
            {
                return false
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn empty_heap_is_marked_as_empty() {
        let mut heap = <BoundedHeap<usize, i32>>::default();
        assert_eq!(heap.len(), 0);
        assert_eq!(heap.capacity(), 0);
        assert!(heap.is_empty());
        heap.resize_capacity(10);
        assert_eq!(heap.len(), 0);
        assert_eq!(heap.capacity(), 10);
        assert!(heap.is_empty());
    }

    #[test]
    fn empty_heap_contains_no_elements() {
        let size = 10;
        let mut heap = <BoundedHeap<usize, i32>>::default();
        heap.resize_capacity(size);
        for i in 0..size {
            assert_eq!(heap.contains(i), Ok(false));
        }
    }

    #[test]
    fn push_and_pop_respects_weight_order() {
        let mut heap = <BoundedHeap<usize, i32>>::default();
        heap.resize_capacity(5);
        for (key, weight) in [(0, 3), (1, 1), (2, 5), (3, 4), (4, 2)] {
            heap.push_or_update(key, |_| weight).unwrap();
        }
        assert!(heap.satisfies_heap_property());
        let mut popped = Vec::new();
        while let Some((key, weight)) = heap.pop() {
            popped.push((key, weight));
        }
        assert_eq!(popped, vec![(2, 5), (3, 4), (0, 3), (4, 2), (1, 1)]);
    }

    #[test]
    fn equal_weights_break_ties_by_lowest_index() {
        let mut heap = <BoundedHeap<usize, i32>>::default();
        heap.resize_capacity(4);
        for key in [3, 1, 2, 0] {
            heap.push_or_update(key, |_| 1).unwrap();
        }
        assert!(heap.satisfies_heap_property());
        let mut popped = Vec::new();
        while let Some((key, _weight)) = heap.pop() {
            popped.push(key);
        }
        assert_eq!(popped, vec![0, 1, 2, 3]);
    }

    #[test]
    fn bump_increases_priority() {
        let mut heap = <BoundedHeap<usize, i32>>::default();
        heap.resize_capacity(3);
        heap.push_or_update(0, |_| 1).unwrap();
        heap.push_or_update(1, |_| 1).unwrap();
        heap.push_or_update(2, |_| 1).unwrap();
        heap.push_or_update(1, |old| old + 10).unwrap();
        assert_eq!(heap.pop(), Some((1, 11)));
    }

    #[test]
    fn popped_key_restores_its_former_weight() {
        let mut heap = <BoundedHeap<usize, i32>>::default();
        heap.resize_capacity(2);
        heap.push_or_update(0, |_| 7).unwrap();
        heap.push_or_update(1, |_| 1).unwrap();
        assert_eq!(heap.pop(), Some((0, 7)));
        assert_eq!(heap.contains(0), Ok(false));
        heap.push_or_update(0, core::convert::identity).unwrap();
        assert_eq!(heap.peek(), Some((&0, &7)));
    }

    #[test]
    fn out_of_bounds_key_is_rejected() {
        let mut heap = <BoundedHeap<usize, i32>>::default();
        heap.resize_capacity(1);
        assert_eq!(heap.push_or_update(5, |_| 1), Err(OutOfBoundsAccess));
    }
}
