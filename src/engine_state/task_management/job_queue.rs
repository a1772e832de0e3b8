//! # Job Queue Module
//!
//! A thread-safe FIFO with optional capacity bound, blocking and non-blocking
//! put/get, and outstanding-work accounting.
//!
//! Every item put into the queue counts as one unit of unfinished work until a
//! consumer calls `task_done` for it. `join` blocks until that count drops to
//! zero, which lets a producer wait for all submitted work to be handled, not
//! merely dequeued.
//!
//! The item transport is a `crossbeam-channel` channel because several mesh
//! workers consume one input queue concurrently (multi-producer,
//! multi-consumer).

use std::time::Duration;

use crossbeam_channel::{
    bounded, unbounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender, TryRecvError,
    TrySendError,
};
use parking_lot::{Condvar, Mutex};

use crate::error::QueueError;

/// A FIFO job queue shared between threads behind an `Arc`.
pub struct JobQueue<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
    capacity: Option<usize>,
    unfinished: Mutex<usize>,
    all_done: Condvar,
}

impl<T: Send> JobQueue<T> {
    /// Creates a queue holding at most `capacity` items.
    ///
    /// A capacity of zero makes every put a rendezvous with a get.
    pub fn bounded(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self::from_channel(sender, receiver, Some(capacity))
    }

    /// Creates a queue without a capacity bound.
    pub fn unbounded() -> Self {
        let (sender, receiver) = unbounded();
        Self::from_channel(sender, receiver, None)
    }

    /// Creates a bounded queue if `capacity` is set, an unbounded one otherwise.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(capacity) => Self::bounded(capacity),
            None => Self::unbounded(),
        }
    }

    fn from_channel(sender: Sender<T>, receiver: Receiver<T>, capacity: Option<usize>) -> Self {
        Self {
            sender,
            receiver,
            capacity,
            unfinished: Mutex::new(0),
            all_done: Condvar::new(),
        }
    }

    /// Enqueues an item.
    ///
    /// With `blocking` set the caller is suspended while the queue is full.
    /// Otherwise a full queue fails immediately with `QueueError::Full`, handing
    /// the item back and leaving the queue unchanged.
    pub fn put(&self, item: T, blocking: bool) -> Result<(), QueueError<T>> {
        // Count the item before it becomes visible so a fast consumer can
        // never call `task_done` ahead of the increment.
        self.add_unfinished();

        let result = if blocking {
            self.sender
                .send(item)
                .map_err(|_| QueueError::Disconnected)
        } else {
            self.sender.try_send(item).map_err(|error| match error {
                TrySendError::Full(item) => QueueError::Full(item),
                TrySendError::Disconnected(_) => QueueError::Disconnected,
            })
        };

        if result.is_err() {
            self.remove_unfinished();
        }
        result
    }

    /// Enqueues an item, waiting at most `timeout` for room.
    ///
    /// If the queue is still full when the timeout expires the item is handed
    /// back in `QueueError::Full`.
    pub fn put_timeout(&self, item: T, timeout: Duration) -> Result<(), QueueError<T>> {
        self.add_unfinished();

        let result = self
            .sender
            .send_timeout(item, timeout)
            .map_err(|error| match error {
                SendTimeoutError::Timeout(item) => QueueError::Full(item),
                SendTimeoutError::Disconnected(_) => QueueError::Disconnected,
            });

        if result.is_err() {
            self.remove_unfinished();
        }
        result
    }

    /// Dequeues the oldest item, suspending the caller until one exists.
    pub fn get(&self) -> Result<T, QueueError<T>> {
        self.receiver.recv().map_err(|_| QueueError::Disconnected)
    }

    /// Dequeues the oldest item, waiting at most `timeout` for one.
    pub fn get_timeout(&self, timeout: Duration) -> Result<T, QueueError<T>> {
        self.receiver
            .recv_timeout(timeout)
            .map_err(|error| match error {
                RecvTimeoutError::Timeout => QueueError::Timeout,
                RecvTimeoutError::Disconnected => QueueError::Disconnected,
            })
    }

    /// Dequeues the oldest item if one exists.
    pub fn try_get(&self) -> Result<T, QueueError<T>> {
        self.receiver.try_recv().map_err(|error| match error {
            TryRecvError::Empty => QueueError::Empty,
            TryRecvError::Disconnected => QueueError::Disconnected,
        })
    }

    /// Marks one dequeued item as fully handled.
    pub fn task_done(&self) {
        let mut unfinished = self.unfinished.lock();
        if *unfinished == 0 {
            log::error!("task_done called more times than items were put");
            return;
        }
        *unfinished -= 1;
        if *unfinished == 0 {
            self.all_done.notify_all();
        }
    }

    /// Number of items put but not yet matched by `task_done`.
    pub fn unfinished_tasks(&self) -> usize {
        *self.unfinished.lock()
    }

    /// Blocks until every item put has been matched by `task_done`.
    pub fn join(&self) {
        let mut unfinished = self.unfinished.lock();
        while *unfinished > 0 {
            self.all_done.wait(&mut unfinished);
        }
    }

    /// Like `join`, but gives up after `timeout`.
    ///
    /// # Returns
    /// `true` if all work finished in time.
    pub fn join_timeout(&self, timeout: Duration) -> bool {
        let mut unfinished = self.unfinished.lock();
        if *unfinished == 0 {
            return true;
        }
        !self
            .all_done
            .wait_while_for(&mut unfinished, |unfinished| *unfinished > 0, timeout)
            .timed_out()
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if no items are queued.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Returns `true` if a non-blocking put would fail.
    pub fn is_full(&self) -> bool {
        self.sender.is_full()
    }

    /// The capacity bound, or `None` for an unbounded queue.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn add_unfinished(&self) {
        *self.unfinished.lock() += 1;
    }

    fn remove_unfinished(&self) {
        let mut unfinished = self.unfinished.lock();
        *unfinished -= 1;
        if *unfinished == 0 {
            self.all_done.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{mpsc, Arc};
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let queue = JobQueue::unbounded();
        for i in 0..5 {
            queue.put(i, false).unwrap();
        }
        let drained: Vec<_> = (0..5).map(|_| queue.try_get().unwrap()).collect();
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
        assert!(matches!(queue.try_get(), Err(QueueError::Empty)));
    }

    #[test]
    fn test_non_blocking_put_on_full_queue_hands_item_back() {
        let queue = JobQueue::bounded(2);
        queue.put("a", false).unwrap();
        queue.put("b", false).unwrap();
        assert!(queue.is_full());

        match queue.put("c", false) {
            Err(QueueError::Full(item)) => assert_eq!(item, "c"),
            other => panic!("expected Full, got {other:?}"),
        }

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.unfinished_tasks(), 2);
        assert_eq!(queue.try_get().unwrap(), "a");
        assert_eq!(queue.try_get().unwrap(), "b");
    }

    #[test]
    fn test_blocking_put_waits_for_room() {
        let queue = Arc::new(JobQueue::bounded(1));
        queue.put(1, true).unwrap();

        let (done_tx, done_rx) = mpsc::channel();
        let producer = {
            let queue = queue.clone();
            thread::spawn(move || {
                queue.put(2, true).unwrap();
                done_tx.send(()).unwrap();
            })
        };

        assert!(done_rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert_eq!(queue.get().unwrap(), 1);
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        producer.join().unwrap();
        assert_eq!(queue.get().unwrap(), 2);
    }

    #[test]
    fn test_put_timeout_returns_item_when_still_full() {
        let queue = JobQueue::bounded(1);
        queue.put(1, false).unwrap();
        match queue.put_timeout(2, Duration::from_millis(10)) {
            Err(QueueError::Full(item)) => assert_eq!(item, 2),
            other => panic!("expected Full, got {other:?}"),
        }
        assert_eq!(queue.unfinished_tasks(), 1);
    }

    #[test]
    fn test_get_timeout_on_empty_queue() {
        let queue: JobQueue<u8> = JobQueue::unbounded();
        assert!(matches!(
            queue.get_timeout(Duration::from_millis(5)),
            Err(QueueError::Timeout)
        ));
    }

    #[test]
    fn test_join_waits_for_task_done() {
        let queue = Arc::new(JobQueue::unbounded());
        for i in 0..3 {
            queue.put(i, false).unwrap();
        }

        assert!(!queue.join_timeout(Duration::from_millis(10)));

        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || {
                for _ in 0..3 {
                    queue.get().unwrap();
                    queue.task_done();
                }
            })
        };

        queue.join();
        consumer.join().unwrap();
        assert_eq!(queue.unfinished_tasks(), 0);
    }

    #[test]
    fn test_extra_task_done_is_ignored() {
        let queue: JobQueue<u8> = JobQueue::unbounded();
        queue.task_done();
        assert_eq!(queue.unfinished_tasks(), 0);
    }

    #[test]
    fn test_many_consumers_see_every_item_once() {
        let queue = Arc::new(JobQueue::bounded(4));
        let (seen_tx, seen_rx) = mpsc::channel();

        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let queue = queue.clone();
                let seen_tx = seen_tx.clone();
                thread::spawn(move || {
                    while let Ok(item) = queue.get_timeout(Duration::from_millis(200)) {
                        seen_tx.send(item).unwrap();
                        queue.task_done();
                    }
                })
            })
            .collect();
        drop(seen_tx);

        for i in 0..100 {
            queue.put(i, true).unwrap();
        }
        queue.join();
        for consumer in consumers {
            consumer.join().unwrap();
        }

        let mut seen: Vec<_> = seen_rx.iter().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_capacity_reporting() {
        assert_eq!(JobQueue::<u8>::with_capacity(Some(3)).capacity(), Some(3));
        assert_eq!(JobQueue::<u8>::with_capacity(None).capacity(), None);
        assert!(!JobQueue::<u8>::unbounded().is_full());
    }
}
