//! Recency-ordered doubly-linked list
//!
//! Nodes live in a `Vec` arena and link to each other by slot index, so the
//! cache index holds plain [`NodeHandle`]s instead of pointers. Vacated slots
//! go on a free list and are reused by later inserts.

use std::iter::FusedIterator;

/// Opaque handle to a node in an [`OrderedNodeList`]
///
/// A handle stays valid until its node is removed. After that the slot may be
/// handed out again, so a stale handle must not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(usize);

/// Node in the doubly-linked list
struct Node<T> {
    data: T,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly-linked list with O(1) prepend, removal and move-to-front
///
/// `head` is the most-recently-used end, `tail` the least-recently-used.
pub struct OrderedNodeList<T> {
    nodes: Vec<Option<Node<T>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> Default for OrderedNodeList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedNodeList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty list with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Number of linked nodes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most-recently-used node
    pub fn head(&self) -> Option<NodeHandle> {
        self.head.map(NodeHandle)
    }

    /// Least-recently-used node
    pub fn tail(&self) -> Option<NodeHandle> {
        self.tail.map(NodeHandle)
    }

    /// Payload of a linked node
    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        self.nodes
            .get(handle.0)
            .and_then(Option::as_ref)
            .map(|node| &node.data)
    }

    /// Mutable payload of a linked node. Does not change the order.
    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut T> {
        self.nodes
            .get_mut(handle.0)
            .and_then(Option::as_mut)
            .map(|node| &mut node.data)
    }

    /// Insert `data` at the head and return its handle
    pub fn prepend(&mut self, data: T) -> NodeHandle {
        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            data,
            prev: None,
            next: None,
        });
        self.link_front(idx);
        self.len += 1;
        NodeHandle(idx)
    }

    /// Relink a node at the head
    ///
    /// No-op when the node is already the head or the handle is vacant.
    pub fn move_to_front(&mut self, handle: NodeHandle) {
        let idx = handle.0;
        if self.head == Some(idx) || !self.is_linked(idx) {
            return;
        }

        self.unlink(idx);
        self.link_front(idx);
    }

    /// Unlink a node and hand its payload back to the caller
    pub fn remove(&mut self, handle: NodeHandle) -> Option<T> {
        let idx = handle.0;
        if !self.is_linked(idx) {
            return None;
        }

        self.unlink(idx);
        let node = self.nodes[idx].take()?;
        self.free_list.push(idx);
        self.len -= 1;
        Some(node.data)
    }

    /// Overwrite a node's payload in place, returning the old one
    pub fn replace(&mut self, handle: NodeHandle, data: T) -> Option<T> {
        self.get_mut(handle).map(|slot| std::mem::replace(slot, data))
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterate payloads from head to tail
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            next: self.head,
            remaining: self.len,
        }
    }

    fn is_linked(&self, idx: usize) -> bool {
        matches!(self.nodes.get(idx), Some(Some(_)))
    }

    fn link_front(&mut self, idx: usize) {
        let old_head = self.head;

        if let Some(node) = &mut self.nodes[idx] {
            node.prev = None;
            node.next = old_head;
        }

        match old_head {
            Some(head_idx) => {
                if let Some(head) = &mut self.nodes[head_idx] {
                    head.prev = Some(idx);
                }
            }
            None => {
                self.tail = Some(idx);
            }
        }

        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match &mut self.nodes[idx] {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => {
                self.head = next;
            }
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => {
                self.tail = prev;
            }
        }
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }

    /// Walk the list both ways and panic on any broken link
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mut forward = Vec::new();
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = self.nodes[idx].as_ref().expect("linked slot is vacant");
            assert_eq!(node.prev, prev, "prev link of slot {} is stale", idx);
            assert!(forward.len() < self.len, "cycle or length mismatch");
            forward.push(idx);
            prev = Some(idx);
            cursor = node.next;
        }
        assert_eq!(self.tail, prev);
        assert_eq!(forward.len(), self.len);

        let occupied = self.nodes.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(occupied, self.len);
        assert_eq!(occupied + self.free_list.len(), self.nodes.len());
    }
}

impl<'a, T> IntoIterator for &'a OrderedNodeList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Head-to-tail iterator over an [`OrderedNodeList`]
pub struct Iter<'a, T> {
    list: &'a OrderedNodeList<T>,
    next: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.next.take()?;
        let node = self.list.nodes[idx].as_ref()?;
        self.next = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.data)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            list: self.list,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<T: Copy>(list: &OrderedNodeList<T>) -> Vec<T> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_empty_list() {
        let mut list: OrderedNodeList<u32> = OrderedNodeList::new();

        assert!(list.is_empty());
        assert_eq!(list.head(), None);
        assert_eq!(list.tail(), None);
        assert_eq!(list.iter().next(), None);
        assert_eq!(list.remove(NodeHandle(0)), None);
        list.move_to_front(NodeHandle(3));
        list.assert_consistent();
    }

    #[test]
    fn test_prepend_order() {
        let mut list = OrderedNodeList::new();

        let a = list.prepend(1);
        list.prepend(2);
        let c = list.prepend(3);

        assert_eq!(collect(&list), vec![3, 2, 1]);
        assert_eq!(list.head(), Some(c));
        assert_eq!(list.tail(), Some(a));
        assert_eq!(list.len(), 3);
        list.assert_consistent();
    }

    #[test]
    fn test_remove_sole_node() {
        let mut list = OrderedNodeList::new();

        let a = list.prepend("a");
        assert_eq!(list.remove(a), Some("a"));

        assert!(list.is_empty());
        assert_eq!(list.head(), None);
        assert_eq!(list.tail(), None);
        list.assert_consistent();
    }

    #[test]
    fn test_remove_head_promotes_next() {
        let mut list = OrderedNodeList::new();

        let a = list.prepend(1);
        let b = list.prepend(2);
        let c = list.prepend(3);

        assert_eq!(list.remove(c), Some(3));
        assert_eq!(list.head(), Some(b));
        assert_eq!(list.tail(), Some(a));
        assert_eq!(collect(&list), vec![2, 1]);
        list.assert_consistent();
    }

    #[test]
    fn test_remove_tail_promotes_prev() {
        let mut list = OrderedNodeList::new();

        let a = list.prepend(1);
        let b = list.prepend(2);
        list.prepend(3);

        assert_eq!(list.remove(a), Some(1));
        assert_eq!(list.tail(), Some(b));
        assert_eq!(collect(&list), vec![3, 2]);
        list.assert_consistent();
    }

    #[test]
    fn test_remove_middle() {
        let mut list = OrderedNodeList::new();

        list.prepend(1);
        let b = list.prepend(2);
        list.prepend(3);

        assert_eq!(list.remove(b), Some(2));
        assert_eq!(collect(&list), vec![3, 1]);

        // Detached handle is rejected
        assert_eq!(list.remove(b), None);
        list.assert_consistent();
    }

    #[test]
    fn test_move_to_front() {
        let mut list = OrderedNodeList::new();

        let a = list.prepend(1);
        let b = list.prepend(2);
        list.prepend(3);

        list.move_to_front(a);
        assert_eq!(collect(&list), vec![1, 3, 2]);
        assert_eq!(list.tail(), Some(b));
        list.assert_consistent();

        list.move_to_front(b);
        assert_eq!(collect(&list), vec![2, 1, 3]);
        list.assert_consistent();

        // Already at head
        list.move_to_front(b);
        assert_eq!(collect(&list), vec![2, 1, 3]);
        list.assert_consistent();
    }

    #[test]
    fn test_move_to_front_single() {
        let mut list = OrderedNodeList::new();

        let a = list.prepend(7);
        list.move_to_front(a);

        assert_eq!(list.head(), Some(a));
        assert_eq!(list.tail(), Some(a));
        assert_eq!(collect(&list), vec![7]);
        list.assert_consistent();
    }

    #[test]
    fn test_replace_in_place() {
        let mut list = OrderedNodeList::new();

        let a = list.prepend(1);
        list.prepend(2);

        assert_eq!(list.replace(a, 10), Some(1));
        list.move_to_front(a);
        assert_eq!(collect(&list), vec![10, 2]);
        assert_eq!(list.len(), 2);
        list.assert_consistent();
    }

    #[test]
    fn test_slot_reuse() {
        let mut list = OrderedNodeList::new();

        let a = list.prepend(1);
        list.prepend(2);
        list.remove(a);

        let c = list.prepend(3);
        assert_eq!(c, a);
        assert_eq!(collect(&list), vec![3, 2]);
        list.assert_consistent();
    }

    #[test]
    fn test_iter_restart_and_len() {
        let mut list = OrderedNodeList::new();
        for i in 0..5 {
            list.prepend(i);
        }

        let mut iter = list.iter();
        assert_eq!(iter.len(), 5);
        iter.next();
        assert_eq!(iter.len(), 4);

        // Fresh call starts from the head again
        assert_eq!(list.iter().next(), Some(&4));
        assert_eq!((&list).into_iter().count(), 5);
    }

    #[test]
    fn test_clear() {
        let mut list = OrderedNodeList::new();
        list.prepend(1);
        list.prepend(2);
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.tail(), None);
        list.assert_consistent();
    }
}
