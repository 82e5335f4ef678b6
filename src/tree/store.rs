//! The node store: a slot array of tree nodes addressed by
//! stable handles, with per-node RW locks and opportunistic slot reuse.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::StructuralError;
use crate::handle::{Handle, INVALID};
use crate::tree::node::{NodeData, NodeSlot, NodeState};

/// Implemented by the payload stored in each node so the store can stamp the
/// handle onto it once a slot is chosen.
pub trait Identified {
    fn set_handle(&mut self, handle: Handle);
}

struct StoreInner<T> {
    slots: Vec<Arc<NodeSlot<T>>>,
    root: Handle,
}

/// A borrowed reference to a node's data, held open between `dereference`
/// and `release`.
pub struct Borrowed<T> {
    slot: Arc<NodeSlot<T>>,
}

impl<T> Borrowed<T> {
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let g = self.slot.rw.read();
        g.data.as_ref().map(f)
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut g = self.slot.rw.write();
        g.data.as_mut().map(f)
    }
}

impl<T> Drop for Borrowed<T> {
    fn drop(&mut self) {
        // If this was the last outstanding borrow of a node already marked
        // UNUSED by `unlink`, the payload was kept alive for us; free it now.
        if self.slot.drop_ref() == 0 {
            let mut g = self.slot.rw.write();
            if g.state == NodeState::Unused {
                g.data = None;
            }
        }
    }
}

pub struct Store<T> {
    inner: RwLock<StoreInner<T>>,
    max_length: usize,
    scale_factor: usize,
}

impl<T: Identified> Store<T> {
    pub fn new(initial_capacity: usize, max_length: usize, scale_factor: usize) -> Self {
        let mut slots = Vec::with_capacity(initial_capacity);
        for _ in 0..initial_capacity {
            slots.push(Arc::new(NodeSlot::new()));
        }
        Store {
            inner: RwLock::new(StoreInner { slots, root: INVALID }),
            max_length,
            scale_factor: scale_factor.max(2),
        }
    }

    pub fn root(&self) -> Handle {
        self.inner.read().root
    }

    pub fn len(&self) -> usize {
        self.inner.read().slots.len()
    }

    fn get_slot(&self, handle: Handle) -> Option<Arc<NodeSlot<T>>> {
        let idx = handle.index()?;
        let g = self.inner.read();
        g.slots.get(idx).cloned()
    }

    fn is_attached(&self, handle: Handle) -> bool {
        match self.get_slot(handle) {
            Some(slot) => slot.rw.read().state == NodeState::Attached,
            None => false,
        }
    }

    /// Inserts `data` into a reclaimed or newly grown slot and links it
    /// under `parent` (or establishes it as the root when `parent` is
    /// `INVALID` and no root exists yet).
    pub fn add_reference(&self, data: T, parent: Handle) -> Result<Handle, StructuralError> {
        if parent.is_valid() {
            if !self.is_attached(parent) {
                return Err(StructuralError::ParentNotAttached(parent.raw()));
            }
        } else if self.root().is_valid() {
            return Err(StructuralError::RootAlreadyExists);
        }

        let mut data = Some(data);
        loop {
            if let Some(handle) = self.try_reclaim(&mut data) {
                self.link_under_parent(parent, handle);
                if !parent.is_valid() {
                    self.inner.write().root = handle;
                }
                return Ok(handle);
            }
            if !self.grow() {
                return Err(StructuralError::StoreExhausted);
            }
        }
    }

    fn try_reclaim(&self, data: &mut Option<T>) -> Option<Handle> {
        let len = self.len();
        for idx in 0..len {
            let slot = self.get_slot(Handle::from(idx))?;
            if slot.ref_count() != 0 {
                continue;
            }
            if let Some(mut g) = slot.rw.try_write() {
                if g.state == NodeState::Unused {
                    let mut payload = data.take().expect("try_reclaim called with no data");
                    payload.set_handle(Handle::from(idx));
                    g.state = NodeState::Attached;
                    g.data = Some(payload);
                    g.parent = INVALID;
                    g.prev_sibling = INVALID;
                    g.next_sibling = INVALID;
                    g.first_child = INVALID;
                    return Some(Handle::from(idx));
                }
            }
        }
        None
    }

    fn grow(&self) -> bool {
        let mut g = self.inner.write();
        let len = g.slots.len();
        if len >= self.max_length {
            return false;
        }
        let new_len = (len.max(1) * self.scale_factor).min(self.max_length);
        for _ in len..new_len {
            g.slots.push(Arc::new(NodeSlot::new()));
        }
        true
    }

    fn link_under_parent(&self, parent: Handle, child: Handle) {
        if !parent.is_valid() {
            return;
        }
        let parent_slot = match self.get_slot(parent) {
            Some(s) => s,
            None => return,
        };
        let mut pg = parent_slot.rw.write();
        if !pg.first_child.is_valid() {
            pg.first_child = child;
            drop(pg);
            if let Some(child_slot) = self.get_slot(child) {
                child_slot.rw.write().parent = parent;
            }
            return;
        }
        let mut cursor = pg.first_child;
        drop(pg);
        loop {
            let cursor_slot = match self.get_slot(cursor) {
                Some(s) => s,
                None => return,
            };
            let mut cg = cursor_slot.rw.write();
            if cg.next_sibling.is_valid() {
                let next = cg.next_sibling;
                drop(cg);
                cursor = next;
                continue;
            }
            cg.next_sibling = child;
            drop(cg);
            if let Some(child_slot) = self.get_slot(child) {
                let mut c = child_slot.rw.write();
                c.parent = parent;
                c.prev_sibling = cursor;
            }
            return;
        }
    }

    /// Marks `handle` and its whole subtree BENCHED (or UNUSED when
    /// `delete`) and splices `handle` out of its parent's sibling list.
    pub fn unlink(&self, handle: Handle, delete: bool) -> Result<(), StructuralError> {
        let slot = self.get_slot(handle).ok_or(StructuralError::InvalidHandle(handle.raw()))?;
        if slot.rw.read().state != NodeState::Attached {
            return Err(StructuralError::InvalidHandle(handle.raw()));
        }

        let (parent, prev, next) = {
            let mut g = slot.rw.write();
            let parent = g.parent;
            let prev = g.prev_sibling;
            let next = g.next_sibling;
            g.parent = INVALID;
            g.prev_sibling = INVALID;
            g.next_sibling = INVALID;
            (parent, prev, next)
        };

        if prev.is_valid() {
            if let Some(prev_slot) = self.get_slot(prev) {
                prev_slot.rw.write().next_sibling = next;
            }
        } else if parent.is_valid() {
            if let Some(parent_slot) = self.get_slot(parent) {
                parent_slot.rw.write().first_child = next;
            }
        }
        if next.is_valid() {
            if let Some(next_slot) = self.get_slot(next) {
                next_slot.rw.write().prev_sibling = prev;
            }
        }

        if self.root() == handle {
            self.inner.write().root = INVALID;
        }

        // The payload is freed here only if nothing is currently borrowing
        // it; an outstanding `Borrowed` keeps the slot's state UNUSED (so no
        // new borrow can start, and reclaim stays blocked) but leaves the
        // data for that borrow's own `Drop` to free once it releases.
        let target_state = if delete { NodeState::Unused } else { NodeState::Benched };
        self.write_map_subtree(handle, &|_h, slot, node| {
            node.state = target_state;
            if delete && slot.ref_count() == 0 {
                node.data = None;
            }
        });

        Ok(())
    }

    /// Recursive write-locked pre-order traversal of the subtree rooted at
    /// `handle`: child before next sibling, releasing each node's lock
    /// before recursing into the next one.
    pub fn write_map(&self, handle: Handle, f: &dyn Fn(Handle, &NodeSlot<T>, &mut NodeData<T>)) {
        self.write_map_subtree(handle, f)
    }

    fn write_map_subtree(&self, handle: Handle, f: &dyn Fn(Handle, &NodeSlot<T>, &mut NodeData<T>)) {
        let slot = match self.get_slot(handle) {
            Some(s) => s,
            None => return,
        };
        let first_child = {
            let mut g = slot.rw.write();
            f(handle, &slot, &mut g);
            g.first_child
        };
        if first_child.is_valid() {
            self.write_map_forest(first_child, f);
        }
    }

    fn write_map_forest(&self, handle: Handle, f: &dyn Fn(Handle, &NodeSlot<T>, &mut NodeData<T>)) {
        let slot = match self.get_slot(handle) {
            Some(s) => s,
            None => return,
        };
        let (first_child, next_sibling) = {
            let mut g = slot.rw.write();
            f(handle, &slot, &mut g);
            (g.first_child, g.next_sibling)
        };
        if first_child.is_valid() {
            self.write_map_forest(first_child, f);
        }
        if next_sibling.is_valid() {
            self.write_map_forest(next_sibling, f);
        }
    }

    /// Borrows a node's data, bumping its `ref_count` so a concurrent
    /// cleanup sweep cannot reclaim the slot underneath the borrow.
    pub fn dereference(&self, handle: Handle) -> Option<Borrowed<T>> {
        let slot = self.get_slot(handle)?;
        {
            let g = slot.rw.read();
            if g.state == NodeState::Unused {
                return None;
            }
        }
        slot.bump_ref();
        Some(Borrowed { slot })
    }

    /// Ordered list of `handle`'s children, youngest-last (sibling order).
    pub fn children(&self, handle: Handle) -> Vec<Handle> {
        let mut out = Vec::new();
        let first = match self.get_slot(handle) {
            Some(s) => s.rw.read().first_child,
            None => return out,
        };
        let mut cursor = first;
        while cursor.is_valid() {
            out.push(cursor);
            cursor = match self.get_slot(cursor) {
                Some(s) => s.rw.read().next_sibling,
                None => break,
            };
        }
        out
    }

    pub fn parent(&self, handle: Handle) -> Option<Handle> {
        self.get_slot(handle).map(|s| s.rw.read().parent)
    }

    /// Pre-order handle list of the subtree rooted at `handle`, including
    /// `handle` itself (used by the `yell` tone and tests).
    pub fn preorder(&self, handle: Handle) -> Vec<Handle> {
        let mut out = Vec::new();
        if self.is_attached(handle) {
            self.preorder_into(handle, &mut out);
        }
        out
    }

    fn preorder_into(&self, handle: Handle, out: &mut Vec<Handle>) {
        out.push(handle);
        for child in self.children(handle) {
            self.preorder_into(child, out);
        }
    }
}
