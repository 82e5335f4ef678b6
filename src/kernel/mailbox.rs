//! A worker's FIFO of pending work. Delivery here is synchronous: workers
//! are plain OS threads blocked on a `parking_lot::Condvar`.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

use crate::handle::Handle;
use crate::message::Message;

/// One unit of work routed to a worker's mailbox. `Deliver` carries a
/// message to an actor already resident on this shard; `Load` and `Stop`
/// drive the actor's LOAD/STOP actions.
pub enum WorkItem {
    Deliver(Message),
    Load(Handle),
    Stop(Handle),
}

struct QueueState {
    items: VecDeque<WorkItem>,
    shutting_down: bool,
}

pub struct Mailbox {
    queue: Mutex<QueueState>,
    not_empty: Condvar,
    capacity: usize,
}

impl Mailbox {
    pub fn new(capacity: usize) -> Self {
        Mailbox {
            queue: Mutex::new(QueueState { items: VecDeque::new(), shutting_down: false }),
            not_empty: Condvar::new(),
            capacity,
        }
    }

    /// Non-blocking push: fails (returning the item back) if the mailbox is
    /// currently locked by someone else, or if it is at capacity.
    pub fn push_top(&self, item: WorkItem) -> Result<(), WorkItem> {
        match self.queue.try_lock() {
            Some(mut q) => {
                if q.items.len() >= self.capacity {
                    return Err(item);
                }
                q.items.push_back(item);
                drop(q);
                self.not_empty.notify_one();
                Ok(())
            }
            None => Err(item),
        }
    }

    /// Blocking push used once the non-blocking retry budget is spent.
    pub fn push_blocking(&self, item: WorkItem) {
        let mut q = self.queue.lock();
        q.items.push_back(item);
        drop(q);
        self.not_empty.notify_one();
    }

    /// Blocks until at least one item is pending or the mailbox is shut
    /// down, then drains the whole queue in FIFO order. The shutdown flag
    /// is read and written under the same mutex as the queue, so a
    /// `shutdown()` that lands between a worker's emptiness check and its
    /// wait can never be missed: an empty-and-shutting-down queue simply
    /// never enters `wait`.
    pub fn pop_all(&self) -> Vec<WorkItem> {
        let mut q = self.queue.lock();
        while q.items.is_empty() && !q.shutting_down {
            self.not_empty.wait(&mut q);
        }
        q.items.drain(..).collect()
    }

    /// Drains without blocking; used by lead actors polling their dedicated
    /// mailbox from `actor_receive`.
    pub fn try_pop_all(&self) -> Vec<WorkItem> {
        let mut q = self.queue.lock();
        q.items.drain(..).collect()
    }

    pub fn has_msgs(&self) -> bool {
        !self.queue.lock().items.is_empty()
    }

    /// Marks the mailbox as shutting down and wakes anyone blocked in
    /// `pop_all`. Once set, `pop_all` stops waiting as soon as the queue
    /// empties, letting the owning worker's loop exit.
    pub fn shutdown(&self) {
        let mut q = self.queue.lock();
        q.shutting_down = true;
        drop(q);
        self.not_empty.notify_all();
    }
}

impl Drop for Mailbox {
    fn drop(&mut self) {
        let remaining = self.queue.lock().items.len();
        if remaining > 0 {
            log::warn!("mailbox dropped with {} undelivered item(s)", remaining);
        }
    }
}
