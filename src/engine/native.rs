//! Dependency-free reference engine: modules are Rust closures registered
//! by name in a process-wide registry. Gives the test suite a deterministic,
//! fast stand-in for a real scripting runtime.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::{EngineState, ScriptEngine, ScriptHandle};
use crate::error::{ScriptDispatchError, ScriptLoadError};
use crate::value::Value;

/// A constructed script instance: dispatches routine calls by name.
pub trait NativeObject: Send {
    fn call(&mut self, routine: &str, args: &[Value]) -> Result<(), String>;
    fn has_method(&self, routine: &str) -> bool;
    fn probe(&self, field: &str) -> Option<Value>;
}

pub type NativeConstructor = Arc<dyn Fn(&[Value]) -> Result<Box<dyn NativeObject>, String> + Send + Sync>;

#[derive(Clone, Default)]
pub struct NativeEngine {
    registry: Arc<RwLock<HashMap<String, NativeConstructor>>>,
}

impl NativeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_module(&self, name: impl Into<String>, ctor: NativeConstructor) {
        self.registry.write().insert(name.into(), ctor);
    }
}

impl ScriptEngine for NativeEngine {
    fn new_state(&self) -> Box<dyn EngineState> {
        Box::new(NativeState {
            registry: self.registry.clone(),
            objects: Vec::new(),
        })
    }
}

struct NativeState {
    registry: Arc<RwLock<HashMap<String, NativeConstructor>>>,
    objects: Vec<Option<Box<dyn NativeObject>>>,
}

impl EngineState for NativeState {
    fn load(&mut self, module_name: &str, args: &[Value]) -> Result<ScriptHandle, ScriptLoadError> {
        let ctor = self
            .registry
            .read()
            .get(module_name)
            .cloned()
            .ok_or_else(|| ScriptLoadError::BadModule(module_name.to_owned()))?;
        let object = ctor(args).map_err(|_| ScriptLoadError::BadModuleNew(module_name.to_owned()))?;
        self.objects.push(Some(object));
        Ok(ScriptHandle(self.objects.len() - 1))
    }

    fn has_method(&self, object: ScriptHandle, name: &str) -> bool {
        self.objects
            .get(object.0)
            .and_then(|o| o.as_ref())
            .map(|o| o.has_method(name))
            .unwrap_or(false)
    }

    fn invoke(&mut self, object: ScriptHandle, name: &str, args: &[Value]) -> Result<(), ScriptDispatchError> {
        let module = self
            .objects
            .get_mut(object.0)
            .and_then(|o| o.as_mut())
            .ok_or_else(|| ScriptDispatchError {
                script_module: "<unloaded>".into(),
                reason: "script is not loaded".into(),
            })?;
        module.call(name, args).map_err(|reason| ScriptDispatchError {
            script_module: name.to_owned(),
            reason,
        })
    }

    fn probe(&self, object: ScriptHandle, field: &str) -> Option<Value> {
        self.objects.get(object.0).and_then(|o| o.as_ref()).and_then(|o| o.probe(field))
    }

    fn unload(&mut self, object: ScriptHandle) {
        if let Some(slot) = self.objects.get_mut(object.0) {
            *slot = None;
        }
    }
}
