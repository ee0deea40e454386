mod config;
mod error;
pub mod events;
mod results;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::FutureExt;
use qa_core::{parse_feature_str, Feature, FeatureFormat, FeatureParser, Scenario, Step};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dialect::Dialect;
use crate::handler::StepHandler;
use crate::phrase::{DialectDocs, PatternError, PatternKind, PhraseLibrary};
use crate::scope::Scope;

pub use config::{EngineConfig, DEFAULT_ENV_PREFIX};
pub use error::{EngineError, StepError, StepErrorKind};
pub use events::{CompositeEventSink, Event, EventSink, NoOpEventSink, StdoutEventSink};
pub use results::{FeatureResult, ResultSet, ScenarioResult, Status, Tally};

const FEATURE_EXTENSIONS: &[&str] = &["feature", "json", "yaml", "yml"];

/// Runs features against a phrase library, one step at a time.
pub struct Engine {
    id: Uuid,
    config: EngineConfig,
    library: PhraseLibrary,
    dialects: Vec<Arc<dyn Dialect>>,
    parser: Arc<dyn FeatureParser>,
    events: CompositeEventSink,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            library: PhraseLibrary::new(),
            dialects: Vec::new(),
            parser: Arc::new(FeatureFormat::Auto),
            events: CompositeEventSink::new(),
        }
    }

    /// An engine with every built-in dialect installed.
    pub fn standard(config: EngineConfig) -> Result<Self, EngineError> {
        let mut engine = Self::new(config);
        for dialect in crate::dialect::standard() {
            engine.add_dialect(dialect)?;
        }
        Ok(engine)
    }

    pub fn with_parser(mut self, parser: impl FeatureParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn library(&self) -> &PhraseLibrary {
        &self.library
    }

    pub fn dialects(&self) -> impl Iterator<Item = &dyn Dialect> {
        self.dialects.iter().map(|d| d.as_ref())
    }

    /// Installs the dialect's phrases now and keeps it for seeding future scopes.
    pub fn add_dialect(&mut self, dialect: Arc<dyn Dialect>) -> Result<(), PatternError> {
        dialect.install(&mut self.library)?;
        debug!(dialect = dialect.name(), phrases = self.library.len(), "dialect installed");
        self.dialects.push(dialect);
        Ok(())
    }

    /// Registers a single undocumented phrase.
    pub fn define<P, H>(&mut self, patterns: P, handler: H) -> Result<&DialectDocs, PatternError>
    where
        P: IntoIterator,
        P::Item: Into<PatternKind>,
        H: StepHandler + 'static,
    {
        self.library.register(patterns, handler, None)
    }

    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) {
        self.events.add(sink);
    }

    /// Builds a scope: caller options first, then configured properties, then
    /// dialect defaults. Each layer only fills gaps.
    pub fn scope(&self, options: Map<String, Value>) -> Scope {
        let mut scope = Scope::from_map(options);
        scope.fill_defaults(&self.config.properties);
        for dialect in &self.dialects {
            dialect.scope(&mut scope);
        }
        scope
    }

    pub async fn run(&self, text: &str, options: Map<String, Value>) -> Result<ResultSet, EngineError> {
        let feature = self.parser.parse(text)?;
        let mut scope = self.scope(options);
        Ok(self.execute(&mut scope, &feature, None).await)
    }

    pub async fn execute(
        &self,
        scope: &mut Scope,
        feature: &Feature,
        results: Option<ResultSet>,
    ) -> ResultSet {
        let mut results = results.unwrap_or_default();
        self.execute_into(scope, feature, &mut results).await;
        self.emit_finished(&mut results).await;
        results
    }

    /// Runs every feature file under `folder`, in path order, against one shared scope.
    pub async fn read(
        &self,
        folder: impl AsRef<Path>,
        options: Map<String, Value>,
    ) -> Result<ResultSet, EngineError> {
        let folder = folder.as_ref();
        let mut features = Vec::new();
        for path in feature_files(folder).await? {
            let text = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| EngineError::Io {
                    path: path.clone(),
                    source,
                })?;
            let parsed = parse_feature_str(&text, FeatureFormat::from_path(&path))
                .map_err(|source| EngineError::ParseFile {
                    path: path.clone(),
                    source,
                })?;
            debug!(path = %path.display(), format = ?parsed.format, "loaded feature");
            features.push(parsed.feature);
        }
        info!(folder = %folder.display(), features = features.len(), "reading features");

        let mut scope = self.scope(options);
        let mut results = ResultSet::new();
        for feature in &features {
            self.execute_into(&mut scope, feature, &mut results).await;
        }
        self.emit_finished(&mut results).await;
        Ok(results)
    }

    pub async fn feature(&self, scope: &mut Scope, feature: &Feature) -> FeatureResult {
        info!(feature = %feature.title, scenarios = feature.scenarios.len(), "running feature");
        let mut result = FeatureResult::new(feature);

        for scenario in &feature.scenarios {
            self.emit(|| Event::ScenarioStarted {
                engine_id: self.id,
                feature: feature.title.clone(),
                scenario: scenario.title.clone(),
                scope: scope.snapshot(),
            })
            .await;
            let outcome = self.scenario(scope, feature, scenario).await;
            result.push(outcome);
        }

        if result.tally.fails > 0 {
            warn!(feature = %feature.title, fails = result.tally.fails, "feature failed");
            self.emit(|| Event::FeatureFailed {
                engine_id: self.id,
                feature: feature.title.clone(),
                fails: result.tally.fails,
            })
            .await;
        }
        result.finish();
        result
    }

    pub async fn scenario(
        &self,
        scope: &mut Scope,
        feature: &Feature,
        scenario: &Scenario,
    ) -> ScenarioResult {
        let mut result = ScenarioResult::new(feature, scenario);

        for step in &scenario.steps {
            self.emit(|| Event::StepStarted {
                engine_id: self.id,
                scenario: scenario.title.clone(),
                step: step.text().to_string(),
                scope: scope.snapshot(),
            })
            .await;

            match self.step(scope, step).await {
                Ok(()) => result.step_passed(),
                Err(err) => {
                    warn!(
                        scenario = %scenario.title,
                        step = step.headline(),
                        kind = err.kind.as_str(),
                        error = %err.message,
                        "step failed"
                    );
                    self.emit(|| Event::StepFailed {
                        engine_id: self.id,
                        scenario: scenario.title.clone(),
                        step: step.text().to_string(),
                        kind: err.kind,
                        message: err.message.clone(),
                        scope: scope.snapshot(),
                    })
                    .await;
                    result.step_failed(step.text(), err);
                    break;
                }
            }
        }

        result.success();
        result.finish();

        match result.status.message() {
            None => {
                info!(scenario = %scenario.title, steps = result.steps.total, "scenario passed");
                self.emit(|| Event::ScenarioPassed {
                    engine_id: self.id,
                    feature: feature.title.clone(),
                    scenario: scenario.title.clone(),
                    scope: scope.snapshot(),
                    result: result.clone(),
                })
                .await;
            }
            Some(message) => {
                info!(scenario = %scenario.title, error = message, "scenario failed");
                self.emit(|| Event::ScenarioFailed {
                    engine_id: self.id,
                    feature: feature.title.clone(),
                    scenario: scenario.title.clone(),
                    message: message.to_string(),
                    scope: scope.snapshot(),
                    result: result.clone(),
                })
                .await;
            }
        }
        result
    }

    /// Resolves and runs one step. A panicking handler fails the step.
    pub async fn step(&self, scope: &mut Scope, step: &Step) -> Result<(), StepError> {
        let resolved = self.library.resolve(step.text())?;
        debug!(step = step.headline(), pattern = resolved.pattern, "dispatching step");

        let call = resolved.handler.call(scope, resolved.args);
        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => Err(StepError::failed(format!(
                "step handler panicked: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }

    async fn execute_into(&self, scope: &mut Scope, feature: &Feature, results: &mut ResultSet) {
        self.emit(|| Event::FeatureStarted {
            engine_id: self.id,
            feature: feature.title.clone(),
        })
        .await;
        let outcome = self.feature(scope, feature).await;
        results.push(outcome);
    }

    async fn emit_finished(&self, results: &mut ResultSet) {
        results.finish();
        info!(total = results.total(), fails = results.fails(), "run finished");
        self.emit(|| Event::Finished {
            engine_id: self.id,
            total: results.total(),
            fails: results.fails(),
            passed: results.passed(),
            results: results.clone(),
        })
        .await;
    }

    /// Builds the event only when a sink is subscribed.
    async fn emit(&self, event: impl FnOnce() -> Event) {
        if !self.events.is_empty() {
            self.events.emit(event()).await;
        }
    }
}

/// Feature files below `folder`, sorted by path. Hidden entries are skipped.
pub async fn feature_files(folder: &Path) -> Result<Vec<PathBuf>, EngineError> {
    tokio::fs::metadata(folder)
        .await
        .map_err(|source| EngineError::Io {
            path: folder.to_path_buf(),
            source,
        })?;

    let pattern = format!(
        "{}/**/*",
        glob::Pattern::escape(&folder.to_string_lossy())
    );
    let options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..glob::MatchOptions::new()
    };

    let mut files = Vec::new();
    for entry in glob::glob_with(&pattern, options)? {
        let path = entry?;
        if path.is_file() && is_feature_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_feature_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| FEATURE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
