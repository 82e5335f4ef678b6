//! A hierarchical, script-driven actor runtime: a thread-safe tree of
//! isolated actors addressed by tone (think/whisper/say/command/yell).

#![deny(clippy::all)]
#![allow(clippy::new_ret_no_self)]
#![allow(clippy::large_enum_variant)]

pub mod actor;
pub mod audience;
pub mod config;
pub mod engine;
pub mod error;
pub mod handle;
pub mod kernel;
pub mod message;
pub mod script;
mod system;
pub mod tree;
mod validate;
pub mod value;

pub use crate::audience::Tone;
pub use crate::error::{DialogueError, Result};
pub use crate::handle::Handle;
pub use crate::message::Message;
pub use crate::script::ScriptDef;
pub use crate::system::{ActorSpec, Dialogue, DialogueBuilder};
pub use crate::value::Value;
pub use crate::validate::{validate_module_name, validate_tone};

pub mod actors {
    pub use crate::actor::{Action, Actor, ActorCommand, Delivery, Flags};
}
