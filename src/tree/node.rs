//! A single slot of the node store.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::handle::{Handle, INVALID};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeState {
    Unused,
    Attached,
    Benched,
}

/// The structural fields of a node, guarded by `NodeSlot::rw`.
pub struct NodeData<T> {
    pub state: NodeState,
    pub data: Option<T>,
    pub parent: Handle,
    pub prev_sibling: Handle,
    pub next_sibling: Handle,
    pub first_child: Handle,
}

impl<T> NodeData<T> {
    fn unused() -> Self {
        NodeData {
            state: NodeState::Unused,
            data: None,
            parent: INVALID,
            prev_sibling: INVALID,
            next_sibling: INVALID,
            first_child: INVALID,
        }
    }
}

/// One slot in the store's backing array. Wrapped in `Arc` so that growing
/// the array never invalidates a handle a caller is already holding a
/// cloned reference to.
pub struct NodeSlot<T> {
    pub rw: RwLock<NodeData<T>>,
    pub ref_count: AtomicUsize,
}

impl<T> NodeSlot<T> {
    pub fn new() -> Self {
        NodeSlot {
            rw: RwLock::new(NodeData::unused()),
            ref_count: AtomicUsize::new(0),
        }
    }

    pub fn bump_ref(&self) {
        self.ref_count.fetch_add(1, Ordering::AcqRel);
    }

    /// Decrements the ref count and returns its new value, so a caller can
    /// tell whether it just released the last outstanding borrow.
    pub fn drop_ref(&self) -> usize {
        self.ref_count.fetch_sub(1, Ordering::AcqRel) - 1
    }

    pub fn ref_count(&self) -> usize {
        self.ref_count.load(Ordering::Acquire)
    }
}

impl<T> Default for NodeSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
