//! The fixed-size worker pool.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::actor::Actor;
use crate::config::MailboxConfig;
use crate::error::DeliveryError;
use crate::handle::Handle;
use crate::kernel::mailbox::WorkItem;
use crate::kernel::worker::Worker;
use crate::message::Message;
use crate::tree::Store;

pub struct Pool {
    workers: Vec<Worker>,
    cfg: MailboxConfig,
}

impl Pool {
    pub fn new(size: usize, tree: Arc<Store<Actor>>, log: slog::Logger, cfg: MailboxConfig) -> Self {
        let size = size.max(1);
        let workers = (0..size)
            .map(|i| Worker::spawn(i, tree.clone(), log.new(slog::o!("worker" => i))))
            .collect();
        Pool { workers, cfg }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// All messages addressed to `handle` route to the same worker, giving
    /// FIFO-per-recipient for free.
    pub fn shard_for(&self, handle: Handle) -> usize {
        (handle.raw().rem_euclid(self.workers.len() as i64)) as usize
    }

    fn enqueue(&self, shard: usize, item: WorkItem) -> Result<(), DeliveryError> {
        let worker = &self.workers[shard];
        let mut item = item;
        for _ in 0..self.cfg.push_retry_attempts {
            match worker.mailbox.push_top(item) {
                Ok(()) => return Ok(()),
                Err(back) => {
                    item = back;
                    thread::sleep(Duration::from_micros(self.cfg.push_retry_backoff_micros));
                }
            }
        }
        let recipient = match &item {
            WorkItem::Deliver(m) => m.recipient,
            WorkItem::Load(h) | WorkItem::Stop(h) => *h,
        };
        worker.mailbox.push_blocking(item);
        let _ = recipient; // blocking push always succeeds; kept for clarity/log symmetry
        Ok(())
    }

    pub fn enqueue_deliver(&self, msg: Message) -> Result<(), DeliveryError> {
        let shard = self.shard_for(msg.recipient);
        self.enqueue(shard, WorkItem::Deliver(msg))
    }

    pub fn enqueue_load(&self, handle: Handle, shard: usize) {
        let _ = self.enqueue(shard, WorkItem::Load(handle));
    }

    pub fn enqueue_stop(&self, handle: Handle, shard: usize) {
        let _ = self.enqueue(shard, WorkItem::Stop(handle));
    }

    pub fn shutdown(&mut self) {
        for w in self.workers.iter_mut() {
            w.shutdown();
        }
    }
}
