use std::sync::Arc;

use async_trait::async_trait;
use qa_exec::engine::{CompositeEventSink, NoOpEventSink};
use qa_exec::{Engine, EngineConfig, Event, EventSink, Status, StepErrorKind};
use serde_json::{json, Map};

struct RecordingSink {
    events: Arc<tokio::sync::Mutex<Vec<Event>>>,
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit(&self, event: Event) {
        self.events.lock().await.push(event);
    }
}

fn recording_engine() -> (Engine, Arc<tokio::sync::Mutex<Vec<Event>>>) {
    let events = Arc::new(tokio::sync::Mutex::new(Vec::new()));
    let mut engine = Engine::standard(EngineConfig::default()).unwrap();
    engine.subscribe(Box::new(RecordingSink {
        events: Arc::clone(&events),
    }));
    (engine, events)
}

#[tokio::test]
async fn events_follow_execution_order() {
    let (engine, events) = recording_engine();
    let text = "\
Feature: bus
Scenario: ok
  I pass
Scenario: ko
  I fail
  I pass
";

    engine.run(text, Map::new()).await.unwrap();

    let names: Vec<_> = events.lock().await.iter().map(Event::name).collect();
    assert_eq!(
        names,
        vec![
            "feature",
            "scenario",
            "step",
            "pass",
            "scenario",
            "step",
            "step:failed",
            "scenario:failed",
            "feature:failed",
            "finished",
        ]
    );
}

#[tokio::test]
async fn events_carry_engine_id_and_details() {
    let (engine, events) = recording_engine();
    engine
        .run("Feature: f\nScenario: s\n  I fail with nope\n", Map::new())
        .await
        .unwrap();

    let events = events.lock().await;
    assert!(events.iter().all(|e| e.engine_id() == engine.id()));

    let failed = events
        .iter()
        .find_map(|e| match e {
            Event::StepFailed { kind, message, .. } => Some((*kind, message.clone())),
            _ => None,
        })
        .unwrap();
    assert_eq!(failed, (StepErrorKind::Execution, "Deliberate Fail: nope".to_string()));

    match events.last().unwrap() {
        Event::Finished { total, fails, passed, .. } => {
            assert_eq!((*total, *fails, *passed), (1, 1, false));
        }
        other => panic!("unexpected last event: {}", other.name()),
    }
}

#[tokio::test]
async fn read_emits_a_single_finished_event() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.feature"), "Feature: a\nScenario: s\n  I pass\n").unwrap();
    std::fs::write(dir.path().join("b.feature"), "Feature: b\nScenario: s\n  I pass\n").unwrap();

    let (engine, events) = recording_engine();
    engine.read(dir.path(), Map::new()).await.unwrap();

    let events = events.lock().await;
    let count = |name: &str| events.iter().filter(|e| e.name() == name).count();
    assert_eq!(count("feature"), 2);
    assert_eq!(count("pass"), 2);
    assert_eq!(count("finished"), 1);
}

#[tokio::test]
async fn engines_do_not_share_subscribers() {
    let (engine, events) = recording_engine();
    let other = Engine::standard(EngineConfig::default()).unwrap();

    other
        .run("Feature: f\nScenario: s\n  I pass\n", Map::new())
        .await
        .unwrap();
    assert!(events.lock().await.is_empty());

    engine
        .run("Feature: f\nScenario: s\n  I pass\n", Map::new())
        .await
        .unwrap();
    assert!(!events.lock().await.is_empty());
}

#[tokio::test]
async fn composite_sink_fans_out() {
    let first = Arc::new(tokio::sync::Mutex::new(Vec::new()));
    let second = Arc::new(tokio::sync::Mutex::new(Vec::new()));

    let mut composite = CompositeEventSink::new();
    composite.add(Box::new(RecordingSink { events: Arc::clone(&first) }));
    composite.add(Box::new(NoOpEventSink));
    composite.add(Box::new(RecordingSink { events: Arc::clone(&second) }));
    assert_eq!(composite.len(), 3);

    let event = Event::FeatureStarted {
        engine_id: uuid_like(),
        feature: "f".to_string(),
    };
    composite.emit(event).await;

    assert_eq!(first.lock().await.len(), 1);
    assert_eq!(second.lock().await.len(), 1);
}

#[test]
fn event_json_uses_wire_names() {
    let event = Event::StepFailed {
        engine_id: uuid_like(),
        scenario: "s".to_string(),
        step: "I fail".to_string(),
        kind: StepErrorKind::NoMatch,
        message: "no phrase".to_string(),
        scope: json!({ "name": "alice" }),
    };

    let json = event.to_json();
    assert_eq!(json["type"], "step:failed");
    assert_eq!(json["kind"], "no_match");
    assert_eq!(json["step"], "I fail");
    assert_eq!(json["scope"]["name"], "alice");
    assert!(json["engine_id"].is_string());
}

#[tokio::test]
async fn scenario_and_step_events_carry_scope_snapshots() {
    let (engine, events) = recording_engine();
    engine
        .run(
            "Feature: f\nScenario: s\n  I set token to abc\n  I fail with boom\n",
            Map::new(),
        )
        .await
        .unwrap();

    let events = events.lock().await;
    let steps: Vec<_> = events
        .iter()
        .filter(|e| e.name() == "step")
        .map(|e| e.scope().unwrap().clone())
        .collect();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].get("token"), None);
    assert_eq!(steps[1]["token"], "abc");

    let started = events.iter().find(|e| e.name() == "scenario").unwrap();
    assert_eq!(started.scope().unwrap()["vars"], json!({}));

    match events.iter().find(|e| e.name() == "step:failed").unwrap() {
        Event::StepFailed { scope, .. } => assert_eq!(scope["token"], "abc"),
        other => panic!("unexpected event: {}", other.name()),
    }
    assert!(events
        .iter()
        .find(|e| e.name() == "finished")
        .unwrap()
        .scope()
        .is_none());
}

#[tokio::test]
async fn scenario_outcomes_carry_their_result() {
    let (engine, events) = recording_engine();
    engine
        .run(
            "Feature: f\nScenario: ok\n  I pass\nScenario: ko\n  I fail\n",
            Map::new(),
        )
        .await
        .unwrap();

    let events = events.lock().await;
    match events.iter().find(|e| e.name() == "pass").unwrap() {
        Event::ScenarioPassed { result, scope, .. } => {
            assert_eq!(result.title, "ok");
            assert_eq!(result.status, Status::Success);
            assert_eq!(result.steps.total, 1);
            assert!(scope.is_object());
        }
        other => panic!("unexpected event: {}", other.name()),
    }
    match events.iter().find(|e| e.name() == "scenario:failed").unwrap() {
        Event::ScenarioFailed { result, message, .. } => {
            assert_eq!(result.title, "ko");
            assert_eq!(result.status, Status::Failed("Deliberate Fail".to_string()));
            assert_eq!(result.failed_step.as_deref(), Some("I fail"));
            assert_eq!(message, "Deliberate Fail");
        }
        other => panic!("unexpected event: {}", other.name()),
    }
}

#[tokio::test]
async fn finished_event_carries_the_result_set() {
    let (engine, events) = recording_engine();
    let returned = engine
        .run("Feature: f\nScenario: s\n  I pass\n", Map::new())
        .await
        .unwrap();

    let events = events.lock().await;
    match events.last().unwrap() {
        Event::Finished { results, passed, .. } => {
            assert!(*passed);
            assert_eq!(results.total(), returned.total());
            assert_eq!(results.features.len(), 1);
            assert_eq!(results.features[0].scenarios[0].title, "s");
            assert!(results.finished_at.is_some());
        }
        other => panic!("unexpected last event: {}", other.name()),
    }

    let json = events.last().unwrap().to_json();
    assert_eq!(json["results"]["status"]["state"], "success");
    assert_eq!(json["results"]["features"][0]["title"], "f");
}

fn uuid_like() -> uuid::Uuid {
    Engine::new(EngineConfig::default()).id()
}
