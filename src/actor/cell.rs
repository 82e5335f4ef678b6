//! An actor: private state, a script list, and an action state machine.

use parking_lot::{Mutex, ReentrantMutex};
use std::cell::RefCell;
use std::sync::Arc;

use crate::actor::command::{Action, ActorCommand};
use crate::engine::{EngineState, ScriptEngine};
use crate::error::{DialogueError, ScriptDispatchError};
use crate::handle::{Handle, INVALID};
use crate::kernel::mailbox::Mailbox;
use crate::script::{Script, ScriptDef};
use crate::tree::Identified;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flags {
    None,
    Lead,
    Star,
}

/// Where an actor's messages land: sharded onto a pool worker's mailbox, or
/// (for lead actors) a dedicated mailbox drained synchronously by the
/// caller via `actor_receive`.
pub enum Delivery {
    Sharded(usize),
    Lead(Arc<Mailbox>),
}

struct ActorInner {
    engine_state: Box<dyn EngineState>,
    scripts: Vec<Script>,
    action: Action,
}

pub struct Actor {
    handle: Handle,
    inner: ReentrantMutex<RefCell<ActorInner>>,
    delivery: Mutex<Delivery>,
    is_star: bool,
}

impl Identified for Actor {
    fn set_handle(&mut self, handle: Handle) {
        self.handle = handle;
    }
}

impl Actor {
    pub fn new(engine: &dyn ScriptEngine, defs: Vec<ScriptDef>, delivery: Delivery, flags: Flags) -> Self {
        let scripts = defs.into_iter().map(Script::new).collect();
        Actor {
            handle: INVALID,
            inner: ReentrantMutex::new(RefCell::new(ActorInner {
                engine_state: engine.new_state(),
                scripts,
                action: Action::Load,
            })),
            delivery: Mutex::new(delivery),
            is_star: matches!(flags, Flags::Star),
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn is_star(&self) -> bool {
        self.is_star
    }

    pub fn is_lead(&self) -> bool {
        matches!(&*self.delivery.lock(), Delivery::Lead(_))
    }

    pub fn shard(&self) -> Option<usize> {
        match &*self.delivery.lock() {
            Delivery::Sharded(n) => Some(*n),
            Delivery::Lead(_) => None,
        }
    }

    pub fn lead_mailbox(&self) -> Option<Arc<Mailbox>> {
        match &*self.delivery.lock() {
            Delivery::Lead(mbox) => Some(mbox.clone()),
            Delivery::Sharded(_) => None,
        }
    }

    /// Converts a running actor into a lead actor.
    pub fn promote_to_lead(&self, mailbox: Arc<Mailbox>) {
        *self.delivery.lock() = Delivery::Lead(mailbox);
    }

    pub(crate) fn set_shard(&self, shard: usize) {
        *self.delivery.lock() = Delivery::Sharded(shard);
    }

    pub fn action(&self) -> Action {
        let guard = self.inner.lock();
        guard.borrow().action
    }

    pub fn script_count(&self) -> usize {
        let guard = self.inner.lock();
        guard.borrow().scripts.len()
    }

    pub fn probe(&self, script_index: usize, field: &str) -> Option<crate::value::Value> {
        let guard = self.inner.lock();
        let inner = guard.borrow();
        let script = inner.scripts.get(script_index)?;
        script.probe(inner.engine_state.as_ref(), field)
    }

    /// Runs the LOAD action: loads every script still marked `should_load`.
    /// `calling_thread_ok` must be true only when invoked from this actor's
    /// owning worker.
    pub fn run_load(&self, calling_thread_ok: bool) {
        let guard = self.inner.lock();
        let mut inner = guard.borrow_mut();
        inner.action = Action::Load;
        let engine_state = inner.engine_state.as_mut();
        for script in inner.scripts.iter_mut() {
            if script.should_load() {
                if let Err(e) = script.load(engine_state, calling_thread_ok) {
                    log::warn!(
                        "script '{}' on actor {} failed to load: {}",
                        script.definition().module_name,
                        self.handle,
                        e
                    );
                }
            }
        }
        inner.action = Action::Wait;
    }

    /// Runs the RECEIVE action: dispatches one message to every loaded
    /// script in order. Dispatch errors quarantine the offending script
    /// but do not stop delivery to its siblings.
    pub fn run_receive(&self, name: &str, args: &[crate::value::Value]) -> Vec<ScriptDispatchError> {
        let guard = self.inner.lock();
        let mut inner = guard.borrow_mut();
        inner.action = Action::Receive;
        let mut errors = Vec::new();
        let inner = &mut *inner;
        let engine_state = inner.engine_state.as_mut();
        for script in inner.scripts.iter_mut() {
            if let Err(e) = script.send(engine_state, name, args) {
                errors.push(e);
            }
        }
        inner.action = Action::Wait;
        errors
    }

    pub fn run_stop(&self) {
        let guard = self.inner.lock();
        let mut inner = guard.borrow_mut();
        inner.action = Action::Stop;
        let engine_state = inner.engine_state.as_mut();
        for script in inner.scripts.iter_mut() {
            script.unload(engine_state);
        }
    }

    /// Dispatches one worker command against this actor.
    pub fn dispatch(&self, cmd: ActorCommand, calling_thread_ok: bool) -> Result<(), DialogueError> {
        match cmd {
            ActorCommand::Load => {
                self.run_load(calling_thread_ok);
                Ok(())
            }
            ActorCommand::Receive(msg) => {
                let errors = self.run_receive(&msg.name, &msg.args);
                for e in errors {
                    log::warn!("actor {}: {}", self.handle, e);
                }
                Ok(())
            }
            ActorCommand::Stop => {
                self.run_stop();
                Ok(())
            }
        }
    }
}
