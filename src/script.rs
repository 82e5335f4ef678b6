//! A script: one behavior module bound into an actor's private state.

use crate::engine::{EngineState, ScriptHandle};
use crate::error::{ScriptDispatchError, ScriptLoadError};
use crate::value::Value;

#[derive(Clone, Debug)]
pub struct ScriptDef {
    pub module_name: String,
    pub args: Vec<Value>,
}

impl ScriptDef {
    pub fn new(module_name: impl Into<String>, args: Vec<Value>) -> Self {
        ScriptDef { module_name: module_name.into(), args }
    }
}

pub struct Script {
    definition: ScriptDef,
    object: Option<ScriptHandle>,
    loaded: bool,
    should_load: bool,
    error: Option<ScriptLoadError>,
}

impl Script {
    pub fn new(definition: ScriptDef) -> Self {
        Script {
            definition,
            object: None,
            loaded: false,
            should_load: true,
            error: None,
        }
    }

    pub fn definition(&self) -> &ScriptDef {
        &self.definition
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn last_error(&self) -> Option<&ScriptLoadError> {
        self.error.as_ref()
    }

    /// Evaluates `require(module_name)`, locates its constructor, and calls
    /// it with the script's captured arguments. Must only be invoked from
    /// the owning actor's worker; `calling_thread_ok` carries that check
    /// down from the actor.
    pub fn load(&mut self, state: &mut dyn EngineState, calling_thread_ok: bool) -> Result<(), ScriptLoadError> {
        if !calling_thread_ok {
            let e = ScriptLoadError::NotCallingThread;
            self.error = Some(e.clone());
            self.loaded = false;
            self.should_load = false;
            return Err(e);
        }
        match state.load(&self.definition.module_name, &self.definition.args) {
            Ok(handle) => {
                self.object = Some(handle);
                self.loaded = true;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.object = None;
                self.loaded = false;
                self.should_load = false;
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Dispatches `name(self, args...)` if the loaded object has a matching
    /// routine. Returns `Ok(false)` when the routine is absent — a skip,
    /// not an error.
    pub fn send(
        &mut self,
        state: &mut dyn EngineState,
        name: &str,
        args: &[Value],
    ) -> Result<bool, ScriptDispatchError> {
        let object = match self.object {
            Some(o) if self.loaded => o,
            _ => return Ok(false),
        };
        if !state.has_method(object, name) {
            return Ok(false);
        }
        match state.invoke(object, name, args) {
            Ok(()) => Ok(true),
            Err(e) => {
                self.loaded = false;
                self.object = None;
                Err(e)
            }
        }
    }

    pub fn probe(&self, state: &dyn EngineState, field: &str) -> Option<Value> {
        let object = self.object.filter(|_| self.loaded)?;
        state.probe(object, field)
    }

    pub fn unload(&mut self, state: &mut dyn EngineState) {
        if let Some(object) = self.object.take() {
            state.unload(object);
        }
        self.loaded = false;
    }

    pub fn mark_should_reload(&mut self) {
        self.should_load = true;
    }

    pub fn should_load(&self) -> bool {
        self.should_load
    }
}
