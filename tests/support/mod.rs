//! Small mpsc-based test probes for asserting on delivery order and counts.

#![allow(dead_code)]

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

use dialogue::engine::native::{NativeEngine, NativeObject};
use dialogue::Value;

pub struct ChannelProbe<T> {
    tx: Sender<T>,
}

impl<T: Clone + Send + 'static> ChannelProbe<T> {
    pub fn new() -> (Self, Receiver<T>) {
        let (tx, rx) = channel();
        (ChannelProbe { tx }, rx)
    }

    pub fn event(&self, value: T) {
        self.tx.send(value).expect("probe receiver dropped");
    }
}

/// A script that counts `inc` calls and reports the running total over a
/// probe channel, used to assert delivery counts under concurrent senders.
pub struct Counter {
    probe: ChannelProbe<i64>,
    count: i64,
}

impl NativeObject for Counter {
    fn call(&mut self, routine: &str, _args: &[Value]) -> Result<(), String> {
        if routine == "inc" {
            self.count += 1;
            self.probe.event(self.count);
        }
        Ok(())
    }

    fn has_method(&self, routine: &str) -> bool {
        routine == "inc"
    }

    fn probe(&self, field: &str) -> Option<Value> {
        match field {
            "count" => Some(Value::Int(self.count)),
            _ => None,
        }
    }
}

pub fn register_counter(engine: &NativeEngine) -> Receiver<i64> {
    let (probe, rx) = ChannelProbe::new();
    let probe = Arc::new(Mutex::new(Some(probe)));
    engine.register_module(
        "counter",
        Arc::new(move |_args| {
            let probe = probe.lock().unwrap().take().expect("counter module loaded more than once");
            Ok(Box::new(Counter { probe, count: 0 }) as Box<dyn NativeObject>)
        }),
    );
    rx
}

/// A script that records every call it receives, for audience-routing
/// assertions.
pub struct Recorder {
    probe: ChannelProbe<String>,
}

impl NativeObject for Recorder {
    fn call(&mut self, routine: &str, _args: &[Value]) -> Result<(), String> {
        self.probe.event(routine.to_owned());
        Ok(())
    }

    fn has_method(&self, _routine: &str) -> bool {
        true
    }

    fn probe(&self, _field: &str) -> Option<Value> {
        None
    }
}

pub fn register_recorder(engine: &NativeEngine) -> Receiver<String> {
    let (probe, rx) = ChannelProbe::new();
    let probe = Arc::new(Mutex::new(Some(probe)));
    engine.register_module(
        "recorder",
        Arc::new(move |_args| {
            let probe = probe.lock().unwrap().take().expect("recorder module loaded more than once");
            Ok(Box::new(Recorder { probe }) as Box<dyn NativeObject>)
        }),
    );
    rx
}

/// A script whose constructor always fails, for isolation-under-failure
/// assertions.
pub fn register_broken(engine: &NativeEngine) {
    engine.register_module("broken", Arc::new(|_args| Err("constructor always fails".to_owned())));
}
