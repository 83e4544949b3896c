//! Bounded FIFO of pending join notifications.

use std::collections::VecDeque;

use crate::domain::JoinEvent;

/// Capacity-bounded FIFO with a drop-oldest overflow policy.
#[derive(Debug, Clone)]
pub struct JoinQueue {
    entries: VecDeque<JoinEvent>,
    capacity: usize,
}

impl JoinQueue {
    /// Create an empty queue. A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, returning the evicted oldest entry when full.
    pub fn push(&mut self, entry: JoinEvent) -> Option<JoinEvent> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    pub fn pop(&mut self) -> Option<JoinEvent> {
        self.entries.pop_front()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &JoinEvent> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Timestamp, UserId};

    fn event(n: usize) -> JoinEvent {
        JoinEvent {
            user_id: UserId::new(format!("u{n}")).unwrap(),
            username: format!("user{n}"),
            joined_at: Timestamp::new(n as i64),
        }
    }

    #[test]
    fn test_push_below_capacity_keeps_everything() {
        // テスト項目: 容量未満では何も追い出されない
        // given (前提条件):
        let mut queue = JoinQueue::with_capacity(3);

        // when (操作):
        let evicted: Vec<_> = (0..3).map(|n| queue.push(event(n))).collect();

        // then (期待する結果):
        assert!(evicted.iter().all(Option::is_none));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_push_at_capacity_drops_oldest() {
        // テスト項目: 容量超過時には最も古いエントリが追い出される
        // given (前提条件):
        let mut queue = JoinQueue::with_capacity(10);
        for n in 0..10 {
            queue.push(event(n));
        }

        // when (操作):
        let evicted = queue.push(event(10));

        // then (期待する結果):
        assert_eq!(evicted, Some(event(0)));
        assert_eq!(queue.len(), 10);
        assert!(!queue.iter().any(|e| e == &event(0)));
        assert_eq!(queue.iter().last(), Some(&event(10)));
        assert_eq!(queue.pop(), Some(event(1)));
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        // テスト項目: 容量 0 は 1 に切り上げられる
        // given (前提条件):
        let mut queue = JoinQueue::with_capacity(0);

        // when (操作):
        queue.push(event(1));
        let evicted = queue.push(event(2));

        // then (期待する結果):
        assert_eq!(queue.capacity(), 1);
        assert_eq!(evicted, Some(event(1)));
        assert_eq!(queue.pop(), Some(event(2)));
    }
}
