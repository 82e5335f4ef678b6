//! The actor's action state machine.

use crate::message::Message;

/// States an actor's action cycles through. `Pending` is tracked by the
/// worker loop rather than stored here: an `alert` arriving while the actor
/// is busy just leaves more work in the mailbox for the worker to notice
/// before it parks again. There is no `Send` state: enqueueing is the
/// caller's (the façade's) concern, not something the actor itself runs.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Load,
    Receive,
    Wait,
    Stop,
}

/// What a worker asks an actor to do.
pub enum ActorCommand {
    Load,
    Receive(Message),
    Stop,
}
