//! Tone-based audience resolution.

mod support;

use std::sync::Arc;
use std::time::Duration;

use dialogue::engine::native::NativeEngine;
use dialogue::{ActorSpec, Dialogue, ScriptDef};

fn drain(rx: &std::sync::mpsc::Receiver<String>, n: usize) -> Vec<String> {
    let mut out = Vec::new();
    for _ in 0..n {
        out.push(rx.recv_timeout(Duration::from_secs(2)).expect("expected a recorded call"));
    }
    out
}

#[test]
fn yell_reaches_every_actor_exactly_once() {
    let engine = NativeEngine::new();
    let rx = support::register_recorder(&engine);

    let spec = ActorSpec::new(vec![ScriptDef::new("recorder", vec![])]).with_children(vec![
        ActorSpec::new(vec![ScriptDef::new("recorder", vec![])]),
        ActorSpec::new(vec![ScriptDef::new("recorder", vec![])]),
    ]);
    let dialogue = Dialogue::builder().engine(Arc::new(engine)).create(spec).unwrap();

    dialogue.send(dialogue.root(), "yell", "ping", vec![], None).unwrap();

    let mut calls = drain(&rx, 3);
    calls.sort();
    assert_eq!(calls, vec!["ping".to_owned(), "ping".to_owned(), "ping".to_owned()]);
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err(), "no fourth delivery expected");
}

#[test]
fn whisper_only_reaches_its_target() {
    let engine = NativeEngine::new();
    let rx = support::register_recorder(&engine);

    let spec = ActorSpec::new(vec![ScriptDef::new("recorder", vec![])]).with_children(vec![
        ActorSpec::new(vec![ScriptDef::new("recorder", vec![])]),
        ActorSpec::new(vec![ScriptDef::new("recorder", vec![])]),
    ]);
    let dialogue = Dialogue::builder().engine(Arc::new(engine)).create(spec).unwrap();

    let c = dialogue.actor_children(dialogue.root())[1];
    dialogue.send(dialogue.root(), "whisper", "draw", vec![], Some(c)).unwrap();

    assert_eq!(drain(&rx, 1), vec!["draw".to_owned()]);
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn whisper_without_target_is_a_protocol_error() {
    let engine = NativeEngine::new();
    support::register_recorder(&engine);
    let spec = ActorSpec::new(vec![ScriptDef::new("recorder", vec![])]);
    let dialogue = Dialogue::builder().engine(Arc::new(engine)).create(spec).unwrap();

    let err = dialogue.send(dialogue.root(), "whisper", "draw", vec![], None).unwrap_err();
    assert!(matches!(err, dialogue::DialogueError::Protocol(_)));
}

#[test]
fn command_audience_equals_children() {
    let engine = NativeEngine::new();
    support::register_recorder(&engine);
    let spec = ActorSpec::new(vec![ScriptDef::new("recorder", vec![])]).with_children(vec![
        ActorSpec::new(vec![ScriptDef::new("recorder", vec![])]),
        ActorSpec::new(vec![ScriptDef::new("recorder", vec![])]),
    ]);
    let dialogue = Dialogue::builder().engine(Arc::new(engine)).create(spec).unwrap();

    let audience = dialogue.actor_audience(dialogue.root(), "command").unwrap();
    assert_eq!(audience, dialogue.actor_children(dialogue.root()));

    let think = dialogue.actor_audience(dialogue.root(), "think").unwrap();
    assert_eq!(think, vec![dialogue.root()]);
}
