//! Actor state and lifecycle.

pub mod cell;
pub mod command;

pub use cell::{Actor, Delivery, Flags};
pub use command::{Action, ActorCommand};
