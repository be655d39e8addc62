//! Recency List Module
//!
//! Doubly-linked list of cache entries stored in an arena of indexed slots.
//!
//! - Head = Most recently used
//! - Tail = Least recently used
//!
//! Slot indices stay stable while an entry is resident, so the owning map can
//! hold them and every operation here is O(1). Freed slots are recycled.

use super::entry::CacheEntry;

// == Recency List ==
#[derive(Debug)]
pub struct RecencyList<K> {
    slots: Vec<Option<CacheEntry<K>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<K> Default for RecencyList<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RecencyList<K> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Stores `entry` as the most recently used and returns its slot.
    pub fn push_front(&mut self, entry: CacheEntry<K>) -> usize {
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(entry);
                idx
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        };

        self.len += 1;
        self.link_front(idx);
        idx
    }

    // == Touch ==
    /// Marks the entry in `idx` as most recently used.
    pub fn touch(&mut self, idx: usize) {
        if self.head == Some(idx) || self.node(idx).is_none() {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    // == Remove ==
    /// Unlinks and returns the entry in `idx`, freeing the slot.
    pub fn remove(&mut self, idx: usize) -> Option<CacheEntry<K>> {
        self.node(idx)?;

        self.unlink(idx);
        self.len -= 1;
        self.free.push(idx);
        self.slots[idx].take()
    }

    // == Pop Back ==
    /// Removes and returns the least recently used entry.
    pub fn pop_back(&mut self) -> Option<CacheEntry<K>> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Peek Back ==
    /// Returns the least recently used entry without removing it.
    pub fn peek_back(&self) -> Option<&CacheEntry<K>> {
        self.tail.and_then(|idx| self.node(idx))
    }

    pub fn get(&self, idx: usize) -> Option<&CacheEntry<K>> {
        self.node(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut CacheEntry<K>> {
        self.node_mut(idx)
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Iter ==
    /// Walks entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn node(&self, idx: usize) -> Option<&CacheEntry<K>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut CacheEntry<K>> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = match self.node(idx) {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(n) => {
                if let Some(node) = self.node_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = None;
        }
    }

    fn link_front(&mut self, idx: usize) {
        let old_head = self.head;

        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = old_head;
        }

        match old_head {
            Some(h) => {
                if let Some(node) = self.node_mut(h) {
                    node.prev = Some(idx);
                }
            }
            None => self.tail = Some(idx),
        }

        self.head = Some(idx);
    }
}

// == Iterator ==
pub struct Iter<'a, K> {
    list: &'a RecencyList<K>,
    cursor: Option<usize>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a CacheEntry<K>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor?)?;
        self.cursor = node.next;
        Some(node)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::StoredValue;
    use serde_json::json;

    fn entry(key: &'static str) -> CacheEntry<&'static str> {
        CacheEntry::new(key, StoredValue::Plain(json!(key)))
    }

    fn keys(list: &RecencyList<&'static str>) -> Vec<&'static str> {
        list.iter().map(|e| e.key).collect()
    }

    /// Walks tail→head through `prev` links; must mirror the forward walk.
    fn keys_backward(list: &RecencyList<&'static str>) -> Vec<&'static str> {
        let mut out = Vec::new();
        let mut cursor = list.tail;
        while let Some(idx) = cursor {
            let node = list.get(idx).unwrap();
            out.push(node.key);
            cursor = node.prev;
        }
        out.reverse();
        out
    }

    #[test]
    fn test_list_new() {
        let list: RecencyList<&str> = RecencyList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.peek_back().is_none());
    }

    #[test]
    fn test_push_front_orders_newest_first() {
        let mut list = RecencyList::new();

        list.push_front(entry("key1"));
        list.push_front(entry("key2"));
        list.push_front(entry("key3"));

        assert_eq!(list.len(), 3);
        assert_eq!(keys(&list), vec!["key3", "key2", "key1"]);
        assert_eq!(list.peek_back().unwrap().key, "key1");
        assert_eq!(list.iter().next().unwrap().key, "key3");
    }

    #[test]
    fn test_touch_existing_entry() {
        let mut list = RecencyList::new();

        let key1 = list.push_front(entry("key1"));
        list.push_front(entry("key2"));
        list.push_front(entry("key3"));

        list.touch(key1);

        assert_eq!(list.len(), 3);
        assert_eq!(list.peek_back().unwrap().key, "key2");
        assert_eq!(keys(&list), keys_backward(&list));
    }

    #[test]
    fn test_pop_back() {
        let mut list = RecencyList::new();

        list.push_front(entry("key1"));
        list.push_front(entry("key2"));
        list.push_front(entry("key3"));

        assert_eq!(list.pop_back().unwrap().key, "key1");
        assert_eq!(list.len(), 2);
        assert_eq!(list.pop_back().unwrap().key, "key2");
        assert_eq!(list.pop_back().unwrap().key, "key3");
        assert!(list.pop_back().is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_middle() {
        let mut list = RecencyList::new();

        list.push_front(entry("key1"));
        let key2 = list.push_front(entry("key2"));
        list.push_front(entry("key3"));

        assert_eq!(list.remove(key2).unwrap().key, "key2");

        assert_eq!(list.len(), 2);
        assert_eq!(keys(&list), vec!["key3", "key1"]);
        assert_eq!(keys_backward(&list), vec!["key3", "key1"]);
    }

    #[test]
    fn test_remove_head_and_tail() {
        let mut list = RecencyList::new();

        let a = list.push_front(entry("a"));
        list.push_front(entry("b"));
        let c = list.push_front(entry("c"));

        list.remove(c);
        assert_eq!(list.iter().next().unwrap().key, "b");
        list.remove(a);
        assert_eq!(list.peek_back().unwrap().key, "b");
        assert_eq!(keys(&list), vec!["b"]);
    }

    #[test]
    fn test_remove_vacant_slot_is_noop() {
        let mut list = RecencyList::new();

        let a = list.push_front(entry("a"));
        list.push_front(entry("b"));
        list.remove(a);

        assert!(list.remove(a).is_none());
        assert!(list.remove(99).is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut list = RecencyList::new();

        let a = list.push_front(entry("a"));
        list.push_front(entry("b"));
        list.remove(a);

        let c = list.push_front(entry("c"));
        assert_eq!(c, a);
        assert_eq!(keys(&list), vec!["c", "b"]);
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut list = RecencyList::new();

        let a = list.push_front(entry("a"));
        let b = list.push_front(entry("b"));
        let c = list.push_front(entry("c"));

        // [c, b, a] → touch a → [a, c, b] → touch c → [c, a, b] → touch b → [b, c, a]
        list.touch(a);
        list.touch(c);
        list.touch(b);

        assert_eq!(keys(&list), vec!["b", "c", "a"]);
        assert_eq!(list.pop_back().unwrap().key, "a");
        assert_eq!(list.pop_back().unwrap().key, "c");
        assert_eq!(list.pop_back().unwrap().key, "b");
    }

    #[test]
    fn test_touch_head_is_noop() {
        let mut list = RecencyList::new();

        list.push_front(entry("a"));
        let b = list.push_front(entry("b"));
        list.touch(b);
        list.touch(b);

        assert_eq!(keys(&list), vec!["b", "a"]);
        assert_eq!(keys_backward(&list), vec!["b", "a"]);
    }

    #[test]
    fn test_single_entry_links() {
        let mut list = RecencyList::new();

        let a = list.push_front(entry("a"));
        list.touch(a);

        assert_eq!(list.iter().next().unwrap().key, "a");
        assert_eq!(list.peek_back().unwrap().key, "a");
        assert_eq!(list.pop_back().unwrap().key, "a");
        assert!(list.head.is_none());
        assert!(list.tail.is_none());
    }
}
