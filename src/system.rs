//! The Dialogue façade: builds the tree and worker pool,
//! and exposes the public `send`/`actor_new`/audience operations.

use parking_lot::Mutex;
use slog::{o, Drain};
use std::collections::HashSet;
use std::sync::Arc;

use crate::actor::{Actor, Delivery, Flags};
use crate::audience::{self, Tone};
use crate::config::Config;
use crate::error::{DialogueError, ProtocolError, StructuralError};
use crate::handle::{Handle, INVALID};
use crate::kernel::{Mailbox, Pool};
use crate::message::Message;
use crate::script::ScriptDef;
use crate::tree::Store;
use crate::value::Value;
use crate::engine::{native::NativeEngine, ScriptEngine};

/// A nested `{ scripts, children }` definition, mirroring the wire shape of
/// `dialogue_new`'s `spec` argument.
pub struct ActorSpec {
    pub scripts: Vec<ScriptDef>,
    pub children: Vec<ActorSpec>,
    pub flags: Flags,
}

impl ActorSpec {
    pub fn new(scripts: Vec<ScriptDef>) -> Self {
        ActorSpec { scripts, children: Vec::new(), flags: Flags::None }
    }

    pub fn with_children(mut self, children: Vec<ActorSpec>) -> Self {
        self.children = children;
        self
    }

    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }
}

fn default_logger(level: slog::Level) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = slog::LevelFilter::new(drain, level).fuse();
    slog::Logger::root(drain, o!("crate" => "dialogue"))
}

/// Builder for a `Dialogue`: `.cfg()/.log()/.engine()/.create()`.
pub struct DialogueBuilder {
    cfg: Option<Config>,
    log: Option<slog::Logger>,
    engine: Option<Arc<dyn ScriptEngine>>,
}

impl Default for DialogueBuilder {
    fn default() -> Self {
        DialogueBuilder { cfg: None, log: None, engine: None }
    }
}

impl DialogueBuilder {
    pub fn cfg(mut self, cfg: Config) -> Self {
        self.cfg = Some(cfg);
        self
    }

    pub fn log(mut self, log: slog::Logger) -> Self {
        self.log = Some(log);
        self
    }

    pub fn engine(mut self, engine: Arc<dyn ScriptEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn create(self, spec: ActorSpec) -> Result<Dialogue, DialogueError> {
        let cfg = self.cfg.unwrap_or_else(crate::config::load_config);
        let log = self.log.unwrap_or_else(|| default_logger(cfg.log.level));
        let engine = self.engine.unwrap_or_else(|| Arc::new(NativeEngine::new()));
        Dialogue::build(spec, engine, cfg, log)
    }
}

pub struct Dialogue {
    tree: Arc<Store<Actor>>,
    pool: Mutex<Pool>,
    engine: Arc<dyn ScriptEngine>,
    log: slog::Logger,
    root: Handle,
    lead_actors: Mutex<HashSet<Handle>>,
    star_actors: Mutex<HashSet<Handle>>,
}

impl Dialogue {
    pub fn builder() -> DialogueBuilder {
        DialogueBuilder::default()
    }

    /// Convenience constructor using defaults: the native reference engine,
    /// a pool sized off `num_cpus`, and config from `DIALOGUE_CONF`/defaults.
    pub fn new(spec: ActorSpec) -> Result<Dialogue, DialogueError> {
        Self::builder().create(spec)
    }

    fn build(
        spec: ActorSpec,
        engine: Arc<dyn ScriptEngine>,
        cfg: Config,
        log: slog::Logger,
    ) -> Result<Dialogue, DialogueError> {
        let tree: Arc<Store<Actor>> = Arc::new(Store::new(64, 1 << 20, 2));
        let pool = Pool::new(cfg.dispatcher.pool_size, tree.clone(), log.clone(), cfg.mailbox.clone());

        let dialogue = Dialogue {
            tree,
            pool: Mutex::new(pool),
            engine,
            log,
            root: INVALID,
            lead_actors: Mutex::new(HashSet::new()),
            star_actors: Mutex::new(HashSet::new()),
        };

        let root = dialogue.build_subtree(None, spec)?;
        Ok(Dialogue { root, ..dialogue })
    }

    fn build_subtree(&self, parent: Option<Handle>, spec: ActorSpec) -> Result<Handle, DialogueError> {
        let handle = self.actor_new(parent, spec.scripts, spec.flags)?;
        for child in spec.children {
            self.build_subtree(Some(handle), child)?;
        }
        Ok(handle)
    }

    pub fn root(&self) -> Handle {
        self.root
    }

    pub fn logger(&self) -> &slog::Logger {
        &self.log
    }

    /// Creates a new actor under `parent` (or as the root, when `parent` is
    /// `None`) and triggers its LOAD action.
    pub fn actor_new(
        &self,
        parent: Option<Handle>,
        scripts: Vec<ScriptDef>,
        flags: Flags,
    ) -> Result<Handle, DialogueError> {
        let placeholder_shard = 0;
        let actor = Actor::new(self.engine.as_ref(), scripts, Delivery::Sharded(placeholder_shard), flags);
        let handle = self
            .tree
            .add_reference(actor, parent.unwrap_or_else(|| INVALID))
            .map_err(DialogueError::from)?;

        if matches!(flags, Flags::Lead) {
            let mailbox = Arc::new(Mailbox::new(4096));
            if let Some(borrowed) = self.tree.dereference(handle) {
                borrowed.with(|actor| actor.promote_to_lead(mailbox));
                borrowed.with(|actor| actor.run_load(true));
            }
            self.lead_actors.lock().insert(handle);
        } else {
            let shard = self.pool.lock().shard_for(handle);
            if let Some(borrowed) = self.tree.dereference(handle) {
                borrowed.with(|actor| actor.set_shard(shard));
            }
            self.pool.lock().enqueue_load(handle, shard);
            if matches!(flags, Flags::Star) {
                self.star_actors.lock().insert(handle);
            }
        }

        Ok(handle)
    }

    pub fn actor_children(&self, handle: Handle) -> Vec<Handle> {
        self.tree.children(handle)
    }

    pub fn actor_script_count(&self, handle: Handle) -> Result<usize, DialogueError> {
        self.tree
            .dereference(handle)
            .and_then(|b| b.with(|a| a.script_count()))
            .ok_or_else(|| DialogueError::Structural(StructuralError::InvalidHandle(handle.raw())))
    }

    pub fn actor_audience(&self, handle: Handle, tone: &str) -> Result<Vec<Handle>, DialogueError> {
        let tone = Tone::parse(tone)?;
        audience::resolve(&self.tree, handle, tone, None).map_err(DialogueError::from)
    }

    pub fn script_probe(&self, handle: Handle, script_index: usize, field: &str) -> Option<Value> {
        self.tree.dereference(handle).and_then(|b| b.with(|a| a.probe(script_index, field))).flatten()
    }

    /// Computes the audience for `(sender, tone)` and enqueues one message
    /// per recipient.
    pub fn send(
        &self,
        sender: Handle,
        tone: &str,
        name: &str,
        args: Vec<Value>,
        whisper_target: Option<Handle>,
    ) -> Result<(), DialogueError> {
        let tone = Tone::parse(tone)?;
        let recipients = audience::resolve(&self.tree, sender, tone, whisper_target)?;

        for recipient in recipients {
            let msg = Message {
                sender,
                recipient,
                tone,
                name: name.to_owned(),
                args: args.clone(),
            };

            let lead_mailbox = self.tree.dereference(recipient).and_then(|b| b.with(|a| a.lead_mailbox()).flatten());

            match lead_mailbox {
                Some(mailbox) => mailbox.push_blocking(crate::kernel::WorkItem::Deliver(msg)),
                None => {
                    self.pool.lock().enqueue_deliver(msg)?;
                }
            }
        }
        Ok(())
    }

    /// Converts a running actor into a lead actor.
    /// Messages already queued on its former shard are still delivered by
    /// the pool; only subsequent sends route to the dedicated mailbox.
    pub fn actor_lead(&self, handle: Handle) -> Result<(), DialogueError> {
        let borrowed = self
            .tree
            .dereference(handle)
            .ok_or_else(|| DialogueError::Structural(StructuralError::InvalidHandle(handle.raw())))?;
        let mailbox = Arc::new(Mailbox::new(4096));
        borrowed.with(|a| a.promote_to_lead(mailbox));
        self.lead_actors.lock().insert(handle);
        Ok(())
    }

    /// Synchronously drains a lead actor's dedicated mailbox.
    pub fn actor_receive(&self, handle: Handle) -> Result<usize, DialogueError> {
        let borrowed = self
            .tree
            .dereference(handle)
            .ok_or_else(|| DialogueError::Structural(StructuralError::InvalidHandle(handle.raw())))?;

        let mailbox = borrowed
            .with(|a| a.lead_mailbox())
            .flatten()
            .ok_or_else(|| DialogueError::Protocol(ProtocolError::NotLeadActor(handle.raw())))?;

        let items = mailbox.try_pop_all();
        let mut delivered = 0;
        for item in items {
            if let crate::kernel::WorkItem::Deliver(_) = &item {
                delivered += 1;
            }
            let cmd = match item {
                crate::kernel::WorkItem::Deliver(msg) => crate::actor::ActorCommand::Receive(msg),
                crate::kernel::WorkItem::Load(_) => crate::actor::ActorCommand::Load,
                crate::kernel::WorkItem::Stop(_) => crate::actor::ActorCommand::Stop,
            };
            borrowed.with(|a| a.dispatch(cmd, true));
        }
        Ok(delivered)
    }

    /// Pretty-prints the tree in pre-order, indented by depth. Mirrors the
    /// teacher's `ActorSystem::print_tree` debugging helper.
    pub fn print_tree(&self) {
        self.print_subtree(self.root, 0);
    }

    fn print_subtree(&self, handle: Handle, depth: usize) {
        println!("{}{}", "  ".repeat(depth), handle);
        for child in self.tree.children(handle) {
            self.print_subtree(child, depth + 1);
        }
    }

    pub fn shutdown(&self) {
        self.pool.lock().shutdown();
    }
}
