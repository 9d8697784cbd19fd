use std::collections::VecDeque;

/// Newest-first bounded buffer. Pushing past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert at the front; returns the evicted entry, if any.
    pub fn push_front(&mut self, item: T) -> Option<T> {
        self.items.push_front(item);
        if self.items.len() > self.capacity {
            self.items.pop_back()
        } else {
            None
        }
    }

    /// Replace the contents, keeping at most `capacity` of the given items in order.
    pub fn replace(&mut self, items: impl IntoIterator<Item = T>) {
        self.items.clear();
        self.items.extend(items.into_iter().take(self.capacity));
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn front(&self) -> Option<&T> {
        self.items.front()
    }

    /// Newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Clone> RingBuffer<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_front_evicts_oldest() {
        let mut ring = RingBuffer::new(3);
        assert_eq!(ring.push_front(1), None);
        assert_eq!(ring.push_front(2), None);
        assert_eq!(ring.push_front(3), None);
        assert_eq!(ring.push_front(4), Some(1));
        assert_eq!(ring.push_front(5), Some(2));
        assert_eq!(ring.to_vec(), vec![5, 4, 3]);
    }

    #[test]
    fn test_replace_truncates_to_capacity() {
        let mut ring = RingBuffer::new(2);
        ring.push_front("old");
        ring.replace(["a", "b", "c"]);
        assert_eq!(ring.to_vec(), vec!["a", "b"]);
        assert_eq!(ring.front(), Some(&"a"));
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut ring = RingBuffer::new(0);
        assert_eq!(ring.push_front(7), Some(7));
        assert!(ring.is_empty());
    }
}
