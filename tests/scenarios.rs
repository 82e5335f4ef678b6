//! End-to-end delivery scenarios.

mod support;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use dialogue::actors::Flags;
use dialogue::engine::native::NativeEngine;
use dialogue::{ActorSpec, Dialogue, ScriptDef};

#[test]
fn concurrent_senders_are_all_delivered() {
    let engine = NativeEngine::new();
    let rx = support::register_counter(&engine);

    let spec = ActorSpec::new(vec![ScriptDef::new("counter", vec![])]);
    let dialogue = Arc::new(Dialogue::builder().engine(Arc::new(engine)).create(spec).unwrap());

    let mut handles = Vec::new();
    for _ in 0..2 {
        let dialogue = dialogue.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..1000 {
                dialogue.send(dialogue.root(), "think", "inc", vec![], None).unwrap();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let mut last = 0;
    while let Ok(v) = rx.recv_timeout(Duration::from_secs(5)) {
        last = v;
    }
    assert_eq!(last, 2000, "every send from both threads must be delivered exactly once, in order");
}

#[test]
fn a_failing_script_constructor_does_not_poison_its_siblings() {
    let engine = NativeEngine::new();
    support::register_broken(&engine);
    let rx = support::register_recorder(&engine);

    let spec = ActorSpec::new(vec![
        ScriptDef::new("broken", vec![]),
        ScriptDef::new("recorder", vec![]),
    ]);
    let dialogue = Dialogue::builder().engine(Arc::new(engine)).create(spec).unwrap();

    // Give the worker pool a moment to run the LOAD action before sending.
    thread::sleep(Duration::from_millis(100));

    dialogue.send(dialogue.root(), "think", "ping", vec![], None).unwrap();

    let call = rx.recv_timeout(Duration::from_secs(2)).expect("the recorder script must still run");
    assert_eq!(call, "ping");
}

#[test]
fn lead_actor_drains_its_mailbox_synchronously_on_receive() {
    let engine = NativeEngine::new();
    let rx = support::register_counter(&engine);

    let spec = ActorSpec::new(vec![ScriptDef::new("counter", vec![])]).with_flags(Flags::Lead);
    let dialogue = Arc::new(Dialogue::builder().engine(Arc::new(engine)).create(spec).unwrap());

    let mut handles = Vec::new();
    for _ in 0..10 {
        let dialogue = dialogue.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..10 {
                dialogue.send(dialogue.root(), "think", "inc", vec![], None).unwrap();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    // Nothing is dispatched until the lead actor's owner calls actor_receive.
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());

    let delivered = dialogue.actor_receive(dialogue.root()).unwrap();
    assert_eq!(delivered, 100);

    let mut last = 0;
    while let Ok(v) = rx.recv_timeout(Duration::from_millis(200)) {
        last = v;
    }
    assert_eq!(last, 100);

    // A second drain sees nothing new.
    assert_eq!(dialogue.actor_receive(dialogue.root()).unwrap(), 0);
}
