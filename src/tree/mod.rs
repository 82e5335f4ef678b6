//! The thread-safe tree of actors.

pub mod node;
pub mod store;

pub use node::{NodeData, NodeState};
pub use store::{Borrowed, Identified, Store};
