//! The message envelope carried through a mailbox.

use crate::audience::Tone;
use crate::handle::Handle;
use crate::value::Value;

#[derive(Clone, Debug)]
pub struct Message {
    pub sender: Handle,
    pub recipient: Handle,
    pub tone: Tone,
    pub name: String,
    pub args: Vec<Value>,
}
