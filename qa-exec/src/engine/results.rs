use chrono::{DateTime, Utc};
use qa_core::{Feature, Scenario};
use serde::Serialize;
use serde_json::Value;

use super::error::{StepError, StepErrorKind};

/// Outcome of a node in the result tree.
///
/// Moves from `Pending` to `Success` or to the first failure message. A failed
/// node stays failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    Success,
    Failed(String),
}

impl Status {
    pub fn is_pending(&self) -> bool {
        matches!(self, Status::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Status::Failed(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Status::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Pending => "pending",
            Status::Success => "success",
            Status::Failed(msg) => msg,
        }
    }

    pub fn succeed(&mut self) {
        if self.is_pending() {
            *self = Status::Success;
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        if !self.is_failed() {
            *self = Status::Failed(message.into());
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub total: usize,
    pub fails: usize,
}

impl Tally {
    pub fn record(&mut self, passed: bool) {
        self.total += 1;
        if !passed {
            self.fails += 1;
        }
    }

    pub fn passes(&self) -> usize {
        self.total - self.fails
    }

    pub fn passed(&self) -> bool {
        self.fails == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub feature: String,
    pub title: String,
    pub status: Status,
    pub steps: Tally,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<StepErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Value>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl ScenarioResult {
    pub fn new(feature: &Feature, scenario: &Scenario) -> Self {
        Self {
            feature: feature.title.clone(),
            title: scenario.title.clone(),
            status: Status::Pending,
            steps: Tally::default(),
            failed_step: None,
            error_kind: None,
            scope: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn step_passed(&mut self) {
        self.steps.record(true);
    }

    pub fn step_failed(&mut self, step: &str, err: StepError) {
        self.steps.record(false);
        if self.status.is_failed() {
            return;
        }
        self.failed_step = Some(step.to_string());
        self.error_kind = Some(err.kind);
        self.scope = err.scope;
        self.status.fail(err.message);
    }

    pub fn success(&mut self) {
        self.status.succeed();
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn passed(&self) -> bool {
        self.status.is_success()
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureResult {
    pub title: String,
    pub status: Status,
    pub tally: Tally,
    pub scenarios: Vec<ScenarioResult>,
}

impl FeatureResult {
    pub fn new(feature: &Feature) -> Self {
        Self {
            title: feature.title.clone(),
            status: Status::Pending,
            tally: Tally::default(),
            scenarios: Vec::new(),
        }
    }

    pub fn push(&mut self, result: ScenarioResult) {
        self.tally.record(result.passed());
        if let Some(msg) = result.status.message() {
            self.status.fail(format!("{}: {}", result.title, msg));
        }
        self.scenarios.push(result);
    }

    pub fn finish(&mut self) {
        self.status.succeed();
    }

    pub fn passed(&self) -> bool {
        self.scenarios.iter().all(ScenarioResult::passed)
    }
}

/// Root of the result tree for one `run` or `read`.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSet {
    pub status: Status,
    pub tally: Tally,
    pub features: Vec<FeatureResult>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for ResultSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultSet {
    pub fn new() -> Self {
        Self {
            status: Status::Pending,
            tally: Tally::default(),
            features: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn push(&mut self, feature: FeatureResult) {
        for scenario in &feature.scenarios {
            self.tally.record(scenario.passed());
        }
        if let Some(msg) = feature.status.message() {
            self.status.fail(format!("{}: {}", feature.title, msg));
        }
        self.features.push(feature);
    }

    pub fn finish(&mut self) {
        self.status.succeed();
        self.finished_at = Some(Utc::now());
    }

    pub fn total(&self) -> usize {
        self.tally.total
    }

    pub fn fails(&self) -> usize {
        self.tally.fails
    }

    /// True iff every scenario in the tree succeeded.
    pub fn passed(&self) -> bool {
        self.scenarios().all(ScenarioResult::passed)
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.features.iter().flat_map(|f| f.scenarios.iter())
    }
}
