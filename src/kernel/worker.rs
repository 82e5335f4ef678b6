//! One delivery thread.

use std::cell::Cell;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::actor::{Actor, ActorCommand};
use crate::kernel::mailbox::{Mailbox, WorkItem};
use crate::tree::Store;

thread_local! {
    static CURRENT_WORKER: Cell<Option<usize>> = Cell::new(None);
}

/// Real thread-identity check, replacing the always-true stub the original
/// source carried: true only when called from the worker
/// thread that actually owns `actor`'s shard.
pub fn is_calling_thread(actor: &Actor) -> bool {
    match actor.shard() {
        Some(shard) => CURRENT_WORKER.with(|c| c.get() == Some(shard)),
        None => true, // lead actors have no pool thread to compare against
    }
}

pub struct Worker {
    pub index: usize,
    pub mailbox: Arc<Mailbox>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn(index: usize, tree: Arc<Store<Actor>>, log: slog::Logger) -> Self {
        let mailbox = Arc::new(Mailbox::new(4096));

        let loop_mailbox = mailbox.clone();
        let thread = thread::Builder::new()
            .name(format!("dialogue-worker-{}", index))
            .spawn(move || run(index, loop_mailbox, tree, log))
            .expect("failed to spawn dialogue worker thread");

        Worker {
            index,
            mailbox,
            thread: Some(thread),
        }
    }

    pub fn shutdown(&mut self) {
        self.mailbox.shutdown();
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.shutdown();
        }
    }
}

fn run(index: usize, mailbox: Arc<Mailbox>, tree: Arc<Store<Actor>>, log: slog::Logger) {
    CURRENT_WORKER.with(|c| c.set(Some(index)));

    loop {
        let items = mailbox.pop_all();
        if items.is_empty() {
            // pop_all only returns empty once the mailbox has been shut down.
            break;
        }
        for item in items {
            match item {
                WorkItem::Load(handle) => {
                    if let Some(borrowed) = tree.dereference(handle) {
                        borrowed.with(|actor| actor.dispatch(ActorCommand::Load, is_calling_thread(actor)));
                    }
                }
                WorkItem::Deliver(msg) => {
                    let recipient = msg.recipient;
                    if let Some(borrowed) = tree.dereference(recipient) {
                        if let Some(Err(e)) = borrowed.with(|actor| actor.dispatch(ActorCommand::Receive(msg), true)) {
                            slog::warn!(log, "delivery to actor failed"; "actor" => recipient.raw(), "error" => %e);
                        }
                    } else {
                        slog::debug!(log, "dropped message: recipient not attached"; "actor" => recipient.raw());
                    }
                }
                WorkItem::Stop(handle) => {
                    if let Some(borrowed) = tree.dereference(handle) {
                        borrowed.with(|actor| actor.dispatch(ActorCommand::Stop, true));
                    }
                }
            }
        }
    }
}
