//! Lua-backed engine, the production engine implied by the
//! `"Dialogue vX with Lua vY"` banner: each actor's private state is one
//! `mlua::Lua` instance, modules are `require()`d, and message dispatch
//! calls a same-named function on the constructed table.

use mlua::{Lua, Table, Value as LuaValue, Variadic};

use crate::engine::{EngineState, ScriptEngine, ScriptHandle};
use crate::error::{ScriptDispatchError, ScriptLoadError};
use crate::value::Value;

#[derive(Default)]
pub struct LuaEngine;

impl LuaEngine {
    pub fn new() -> Self {
        LuaEngine
    }
}

impl ScriptEngine for LuaEngine {
    fn new_state(&self) -> Box<dyn EngineState> {
        Box::new(LuaState {
            lua: Lua::new(),
            objects: Vec::new(),
        })
    }
}

struct LuaState {
    lua: Lua,
    objects: Vec<Option<mlua::RegistryKey>>,
}

impl LuaState {
    fn object_table(&self, handle: ScriptHandle) -> Option<Table<'_>> {
        let key = self.objects.get(handle.0)?.as_ref()?;
        self.lua.registry_value::<Table>(key).ok()
    }
}

impl EngineState for LuaState {
    fn load(&mut self, module_name: &str, args: &[Value]) -> Result<ScriptHandle, ScriptLoadError> {
        let module: Table = self
            .lua
            .load(&format!("return require('{}')", module_name))
            .eval()
            .map_err(|_| ScriptLoadError::BadModule(module_name.to_owned()))?;

        let ctor: mlua::Function = module
            .get("new")
            .map_err(|_| ScriptLoadError::NoModuleNew(module_name.to_owned()))?;

        let lua_args: Variadic<LuaValue> = args.iter().map(|v| value_to_lua(&self.lua, v)).collect();
        let object: Table = ctor
            .call(lua_args)
            .map_err(|_| ScriptLoadError::BadModuleNew(module_name.to_owned()))?;

        let key = self
            .lua
            .create_registry_value(object)
            .map_err(|_| ScriptLoadError::BadModuleNew(module_name.to_owned()))?;
        self.objects.push(Some(key));
        Ok(ScriptHandle(self.objects.len() - 1))
    }

    fn has_method(&self, object: ScriptHandle, name: &str) -> bool {
        self.object_table(object)
            .and_then(|t| t.get::<_, mlua::Function>(name).ok())
            .is_some()
    }

    fn invoke(&mut self, object: ScriptHandle, name: &str, args: &[Value]) -> Result<(), ScriptDispatchError> {
        let table = self.object_table(object).ok_or_else(|| ScriptDispatchError {
            script_module: name.to_owned(),
            reason: "script is not loaded".into(),
        })?;
        let f: mlua::Function = table.get(name).map_err(|e| ScriptDispatchError {
            script_module: name.to_owned(),
            reason: e.to_string(),
        })?;
        let lua_args: Variadic<LuaValue> = args.iter().map(|v| value_to_lua(&self.lua, v)).collect();
        f.call::<_, ()>((table, lua_args)).map_err(|e| ScriptDispatchError {
            script_module: name.to_owned(),
            reason: e.to_string(),
        })
    }

    fn probe(&self, object: ScriptHandle, field: &str) -> Option<Value> {
        let table = self.object_table(object)?;
        let v: LuaValue = table.get(field).ok()?;
        lua_to_value(&v)
    }

    fn unload(&mut self, object: ScriptHandle) {
        if let Some(slot) = self.objects.get_mut(object.0) {
            if let Some(key) = slot.take() {
                let _ = self.lua.remove_registry_value(key);
            }
        }
    }
}

fn value_to_lua<'lua>(lua: &'lua Lua, v: &Value) -> LuaValue<'lua> {
    match v {
        Value::Nil => LuaValue::Nil,
        Value::Bool(b) => LuaValue::Boolean(*b),
        Value::Int(i) => LuaValue::Integer(*i),
        Value::Float(x) => LuaValue::Number(*x),
        Value::Str(s) => lua.create_string(s).map(LuaValue::String).unwrap_or(LuaValue::Nil),
        Value::List(items) => {
            let t = lua.create_table().unwrap();
            for (i, item) in items.iter().enumerate() {
                let _ = t.set(i + 1, value_to_lua(lua, item));
            }
            LuaValue::Table(t)
        }
        Value::Map(map) => {
            let t = lua.create_table().unwrap();
            for (k, val) in map.iter() {
                let _ = t.set(k.as_str(), value_to_lua(lua, val));
            }
            LuaValue::Table(t)
        }
    }
}

fn lua_to_value(v: &LuaValue) -> Option<Value> {
    Some(match v {
        LuaValue::Nil => Value::Nil,
        LuaValue::Boolean(b) => Value::Bool(*b),
        LuaValue::Integer(i) => Value::Int(*i),
        LuaValue::Number(x) => Value::Float(*x),
        LuaValue::String(s) => Value::Str(s.to_str().ok()?.to_owned()),
        LuaValue::Table(t) => {
            let len = t.raw_len();
            if len > 0 {
                let mut items = Vec::with_capacity(len as usize);
                for i in 1..=len {
                    let item: LuaValue = t.get(i).ok()?;
                    items.push(lua_to_value(&item)?);
                }
                Value::List(items)
            } else {
                let mut map = std::collections::BTreeMap::new();
                for pair in t.clone().pairs::<String, LuaValue>() {
                    let (k, v) = pair.ok()?;
                    map.insert(k, lua_to_value(&v)?);
                }
                Value::Map(map)
            }
        }
        _ => return None,
    })
}
