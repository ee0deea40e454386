use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use super::error::StepErrorKind;
use super::results::{ResultSet, ScenarioResult};

#[derive(Debug, Clone)]
pub enum Event {
    FeatureStarted {
        engine_id: Uuid,
        feature: String,
    },
    ScenarioStarted {
        engine_id: Uuid,
        feature: String,
        scenario: String,
        scope: Value,
    },
    StepStarted {
        engine_id: Uuid,
        scenario: String,
        step: String,
        scope: Value,
    },
    StepFailed {
        engine_id: Uuid,
        scenario: String,
        step: String,
        kind: StepErrorKind,
        message: String,
        scope: Value,
    },
    ScenarioPassed {
        engine_id: Uuid,
        feature: String,
        scenario: String,
        scope: Value,
        result: ScenarioResult,
    },
    ScenarioFailed {
        engine_id: Uuid,
        feature: String,
        scenario: String,
        message: String,
        scope: Value,
        result: ScenarioResult,
    },
    FeatureFailed {
        engine_id: Uuid,
        feature: String,
        fails: usize,
    },
    Finished {
        engine_id: Uuid,
        total: usize,
        fails: usize,
        passed: bool,
        results: ResultSet,
    },
}

impl Event {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Event::FeatureStarted { .. } => "feature",
            Event::ScenarioStarted { .. } => "scenario",
            Event::StepStarted { .. } => "step",
            Event::StepFailed { .. } => "step:failed",
            Event::ScenarioPassed { .. } => "pass",
            Event::ScenarioFailed { .. } => "scenario:failed",
            Event::FeatureFailed { .. } => "feature:failed",
            Event::Finished { .. } => "finished",
        }
    }

    pub fn engine_id(&self) -> Uuid {
        match self {
            Event::FeatureStarted { engine_id, .. }
            | Event::ScenarioStarted { engine_id, .. }
            | Event::StepStarted { engine_id, .. }
            | Event::StepFailed { engine_id, .. }
            | Event::ScenarioPassed { engine_id, .. }
            | Event::ScenarioFailed { engine_id, .. }
            | Event::FeatureFailed { engine_id, .. }
            | Event::Finished { engine_id, .. } => *engine_id,
        }
    }

    /// Scope snapshot carried by scenario and step events.
    pub fn scope(&self) -> Option<&Value> {
        match self {
            Event::ScenarioStarted { scope, .. }
            | Event::StepStarted { scope, .. }
            | Event::StepFailed { scope, .. }
            | Event::ScenarioPassed { scope, .. }
            | Event::ScenarioFailed { scope, .. } => Some(scope),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut value = match self {
            Event::FeatureStarted { feature, .. } => json!({ "feature": feature }),
            Event::ScenarioStarted { feature, scenario, scope, .. } => {
                json!({ "feature": feature, "scenario": scenario, "scope": scope })
            }
            Event::StepStarted { scenario, step, scope, .. } => {
                json!({ "scenario": scenario, "step": step, "scope": scope })
            }
            Event::StepFailed { scenario, step, kind, message, scope, .. } => json!({
                "scenario": scenario,
                "step": step,
                "kind": kind.as_str(),
                "message": message,
                "scope": scope,
            }),
            Event::ScenarioPassed { feature, scenario, scope, result, .. } => json!({
                "feature": feature,
                "scenario": scenario,
                "scope": scope,
                "result": result,
            }),
            Event::ScenarioFailed { feature, scenario, message, scope, result, .. } => json!({
                "feature": feature,
                "scenario": scenario,
                "message": message,
                "scope": scope,
                "result": result,
            }),
            Event::FeatureFailed { feature, fails, .. } => {
                json!({ "feature": feature, "fails": fails })
            }
            Event::Finished { total, fails, passed, results, .. } => json!({
                "total": total,
                "fails": fails,
                "passed": passed,
                "results": results,
            }),
        };
        if let Some(obj) = value.as_object_mut() {
            obj.insert("type".to_string(), json!(self.name()));
            obj.insert("engine_id".to_string(), json!(self.engine_id().to_string()));
        }
        value
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// Writes one JSON object per event to stdout.
pub struct StdoutEventSink;

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn emit(&self, event: Event) {
        println!("{}", serde_json::to_string(&event.to_json()).unwrap_or_default());
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}
