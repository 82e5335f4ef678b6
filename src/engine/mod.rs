//! The embedded scripting runtime contract.
//!
//! The tree and the worker pool never depend on a concrete scripting
//! runtime: they only require *isolated per-actor state*, a way to *load a
//! named module* into that state, and a way to *invoke a named routine with
//! positional arguments*. Two engines satisfying this contract ship in this
//! crate: [`native`] (a dependency-free registry of Rust closures, used by
//! the test suite) and, behind the `lua` feature, [`lua`].

pub mod native;
#[cfg(feature = "lua")]
pub mod lua;

use crate::error::{ScriptDispatchError, ScriptLoadError};
use crate::value::Value;

/// Opaque index of a loaded script object inside one [`EngineState`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScriptHandle(pub usize);

/// One actor's private scripting state. Never touched from any thread other
/// than the actor's owning worker.
pub trait EngineState: Send {
    /// Evaluates `require(module_name)`, locates its constructor, and calls
    /// it with `args`. Returns the handle of the resulting object.
    fn load(&mut self, module_name: &str, args: &[Value]) -> Result<ScriptHandle, ScriptLoadError>;

    /// Whether the loaded object has a routine named `name`. A script with
    /// no matching routine is skipped silently by the caller, not an error.
    fn has_method(&self, object: ScriptHandle, name: &str) -> bool;

    /// Invokes `name(self, args...)` on the loaded object.
    fn invoke(&mut self, object: ScriptHandle, name: &str, args: &[Value]) -> Result<(), ScriptDispatchError>;

    /// Reads a field off the loaded object without invoking it.
    fn probe(&self, object: ScriptHandle, field: &str) -> Option<Value>;

    /// Releases the object; a later `load` with the same definition may
    /// recreate it.
    fn unload(&mut self, object: ScriptHandle);
}

/// Factory for per-actor [`EngineState`]s.
pub trait ScriptEngine: Send + Sync {
    fn new_state(&self) -> Box<dyn EngineState>;
}
