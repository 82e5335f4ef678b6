//! The mailbox + worker pool delivery fabric.

pub mod mailbox;
pub mod pool;
pub mod worker;

pub use mailbox::{Mailbox, WorkItem};
pub use pool::Pool;
pub use worker::{is_calling_thread, Worker};
