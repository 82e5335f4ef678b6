//! Error taxonomy.

use std::fmt;

/// Invalid handle, parent not attached, store exhausted, cycle attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    InvalidHandle(i64),
    ParentNotAttached(i64),
    StoreExhausted,
    WouldCycle(i64, i64),
    RootAlreadyExists,
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralError::InvalidHandle(h) => write!(f, "handle {} does not refer to an attached node", h),
            StructuralError::ParentNotAttached(h) => write!(f, "parent handle {} is not attached", h),
            StructuralError::StoreExhausted => write!(f, "node store reached its maximum length"),
            StructuralError::WouldCycle(child, new_parent) => {
                write!(f, "attaching {} under {} would create a cycle", child, new_parent)
            }
            StructuralError::RootAlreadyExists => write!(f, "the tree already has a root"),
        }
    }
}

impl std::error::Error for StructuralError {}

/// Errors raised while a script's module is being loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptLoadError {
    NotCallingThread,
    BadModule(String),
    NoModuleNew(String),
    BadModuleNew(String),
}

impl ScriptLoadError {
    pub fn code(&self) -> &'static str {
        match self {
            ScriptLoadError::NotCallingThread => "ERR_NOT_CALLING_THREAD",
            ScriptLoadError::BadModule(_) => "ERR_BAD_MODULE",
            ScriptLoadError::NoModuleNew(_) => "ERR_NO_MODULE_NEW",
            ScriptLoadError::BadModuleNew(_) => "ERR_BAD_MODULE_NEW",
        }
    }
}

impl fmt::Display for ScriptLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptLoadError::NotCallingThread => write!(f, "{}: load must run on the owning worker", self.code()),
            ScriptLoadError::BadModule(m) => write!(f, "{}: module '{}' could not be required", self.code(), m),
            ScriptLoadError::NoModuleNew(m) => write!(f, "{}: module '{}' has no constructor", self.code(), m),
            ScriptLoadError::BadModuleNew(m) => {
                write!(f, "{}: module '{}' constructor raised an error", self.code(), m)
            }
        }
    }
}

impl std::error::Error for ScriptLoadError {}

/// Errors raised while dispatching a message to a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDispatchError {
    pub script_module: String,
    pub reason: String,
}

impl fmt::Display for ScriptDispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "script '{}' raised during dispatch: {}", self.script_module, self.reason)
    }
}

impl std::error::Error for ScriptDispatchError {}

/// A message could not be enqueued after the configured retry budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryError {
    pub recipient: i64,
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "message to {} dropped: mailbox saturated past retry budget", self.recipient)
    }
}

impl std::error::Error for DeliveryError {}

/// Bad tone, missing whisper target, unknown action name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    UnknownTone(String),
    MissingWhisperTarget,
    UnknownAction(String),
    NotLeadActor(i64),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnknownTone(t) => write!(f, "'{}' is not a registered tone", t),
            ProtocolError::MissingWhisperTarget => write!(f, "whisper requires an explicit target handle"),
            ProtocolError::UnknownAction(a) => write!(f, "'{}' is not a known action", a),
            ProtocolError::NotLeadActor(h) => write!(f, "actor {} is not a lead actor", h),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Top-level error returned by the public operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueError {
    Structural(StructuralError),
    ScriptLoad(ScriptLoadError),
    ScriptDispatch(ScriptDispatchError),
    Delivery(DeliveryError),
    Protocol(ProtocolError),
    Fatal(String),
}

impl fmt::Display for DialogueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogueError::Structural(e) => write!(f, "{}", e),
            DialogueError::ScriptLoad(e) => write!(f, "{}", e),
            DialogueError::ScriptDispatch(e) => write!(f, "{}", e),
            DialogueError::Delivery(e) => write!(f, "{}", e),
            DialogueError::Protocol(e) => write!(f, "{}", e),
            DialogueError::Fatal(msg) => write!(f, "fatal: {}", msg),
        }
    }
}

impl std::error::Error for DialogueError {}

impl From<StructuralError> for DialogueError {
    fn from(e: StructuralError) -> Self {
        DialogueError::Structural(e)
    }
}

impl From<ScriptLoadError> for DialogueError {
    fn from(e: ScriptLoadError) -> Self {
        DialogueError::ScriptLoad(e)
    }
}

impl From<ScriptDispatchError> for DialogueError {
    fn from(e: ScriptDispatchError) -> Self {
        DialogueError::ScriptDispatch(e)
    }
}

impl From<DeliveryError> for DialogueError {
    fn from(e: DeliveryError) -> Self {
        DialogueError::Delivery(e)
    }
}

impl From<ProtocolError> for DialogueError {
    fn from(e: ProtocolError) -> Self {
        DialogueError::Protocol(e)
    }
}

pub type Result<T> = std::result::Result<T, DialogueError>;
