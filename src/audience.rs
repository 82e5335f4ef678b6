//! Tone-based audience resolution: maps `(sender, tone)` to an
//! ordered recipient list.

use crate::error::ProtocolError;
use crate::handle::Handle;
use crate::tree::{Identified, Store};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tone {
    Think,
    Whisper,
    Say,
    Command,
    Yell,
}

impl Tone {
    pub fn wire(self) -> &'static str {
        match self {
            Tone::Think => "think",
            Tone::Whisper => "whisper",
            Tone::Say => "say",
            Tone::Command => "command",
            Tone::Yell => "yell",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ProtocolError> {
        match s {
            "think" => Ok(Tone::Think),
            "whisper" => Ok(Tone::Whisper),
            "say" => Ok(Tone::Say),
            "command" => Ok(Tone::Command),
            "yell" => Ok(Tone::Yell),
            other => Err(ProtocolError::UnknownTone(other.to_owned())),
        }
    }
}

/// Resolves the ordered recipient list for `(sender, tone)`.
/// `whisper_target` is required, and only used, for `Tone::Whisper`.
pub fn resolve<T: Identified>(
    tree: &Store<T>,
    sender: Handle,
    tone: Tone,
    whisper_target: Option<Handle>,
) -> Result<Vec<Handle>, ProtocolError> {
    match tone {
        Tone::Think => Ok(vec![sender]),
        Tone::Whisper => {
            let target = whisper_target.ok_or(ProtocolError::MissingWhisperTarget)?;
            Ok(vec![target])
        }
        Tone::Say => {
            let mut recipients = vec![sender];
            recipients.extend(tree.children(sender));
            Ok(recipients)
        }
        Tone::Command => Ok(tree.children(sender)),
        Tone::Yell => Ok(tree.preorder(tree.root())),
    }
}
