//! Interactive console for poking at a `Dialogue` tree.

use std::io::{self, Write};
use std::sync::Arc;

use dialogue::engine::native::{NativeEngine, NativeObject};
use dialogue::{ActorSpec, Dialogue, ScriptDef, Value};

struct Echo;

impl NativeObject for Echo {
    fn call(&mut self, routine: &str, args: &[Value]) -> Result<(), String> {
        println!("echo: {}({:?})", routine, args);
        Ok(())
    }

    fn has_method(&self, _routine: &str) -> bool {
        true
    }

    fn probe(&self, _field: &str) -> Option<Value> {
        None
    }
}

fn lua_banner() -> &'static str {
    if cfg!(feature = "lua") {
        "5.4"
    } else {
        "disabled"
    }
}

fn main() {
    let engine = NativeEngine::new();
    engine.register_module("echo", Arc::new(|_args| Ok(Box::new(Echo) as Box<dyn NativeObject>)));

    let spec = ActorSpec::new(vec![ScriptDef::new("echo", vec![])]);
    let dialogue = Dialogue::builder()
        .engine(Arc::new(engine))
        .create(spec)
        .expect("failed to build dialogue tree");

    println!("Dialogue {} with Lua {}", env!("CARGO_PKG_VERSION"), lua_banner());

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.read_line(&mut line).unwrap_or(0) == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" {
            break;
        }

        let mut parts = line.split_whitespace();
        let tone = match parts.next() {
            Some(t) => t,
            None => continue,
        };
        let name = match parts.next() {
            Some(n) => n,
            None => {
                println!("usage: <tone> <name> [args...]");
                continue;
            }
        };
        let args: Vec<Value> = parts.map(|a| Value::Str(a.to_owned())).collect();

        if let Err(e) = dialogue.send(dialogue.root(), tone, name, args, None) {
            println!("error: {}", e);
        }
    }

    dialogue.shutdown();
}
