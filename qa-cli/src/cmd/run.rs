use std::path::Path;
use std::time::Duration;

use qa_core::{parse_feature_str, Feature, FeatureFormat};
use qa_exec::engine::StdoutEventSink;
use qa_exec::{Engine, EngineError, ResultSet, Status};
use tracing::{debug, warn};

use super::config::{build_engine_config, scope_options};
use super::progress::ProgressEventSink;
use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{ConfigArgs, EventsMode, OutputArgs, RunArgs};

pub async fn run_cmd(path: &Path, config: &ConfigArgs, run: &RunArgs, output: OutputArgs) -> i32 {
    let Some(options) = scope_options(config, &output) else {
        return exit_codes::RUNTIME_ERROR;
    };
    let engine_config = match build_engine_config(config) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let mut engine = match Engine::standard(engine_config) {
        Ok(engine) => engine,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("failed to build engine: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };

    // A single file is parsed up front so a broken feature never starts a run.
    let feature = if path.is_dir() {
        None
    } else {
        match load_feature(path).await {
            Ok(feature) => Some(feature),
            Err((code, message)) => {
                print_error(output.format, output.quiet, &message);
                return code;
            }
        }
    };

    debug!(
        path = %path.display(),
        engine_id = %engine.id(),
        phrases = engine.library().len(),
        "starting run"
    );

    match run.events {
        EventsMode::Stdout => engine.subscribe(Box::new(StdoutEventSink)),
        EventsMode::Progress => {
            let total = feature.as_ref().map(|f| f.scenarios.len());
            engine.subscribe(Box::new(ProgressEventSink::new(total)));
        }
        EventsMode::None => {}
    }

    let execution = async {
        match &feature {
            Some(feature) => {
                let mut scope = engine.scope(options);
                Ok(engine.execute(&mut scope, feature, None).await)
            }
            None => engine.read(path, options).await,
        }
    };

    let outcome = match run.timeout {
        Some(ms) => match tokio::time::timeout(Duration::from_millis(ms), execution).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(timeout_ms = ms, "run timed out");
                print_error(output.format, output.quiet, &format!("run timed out after {ms}ms"));
                return exit_codes::RUNTIME_ERROR;
            }
        },
        None => execution.await,
    };

    let results = match outcome {
        Ok(results) => results,
        Err(e @ EngineError::ParseFile { .. }) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::VALIDATION_FAILED;
        }
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };

    if output.format == OutputFormat::Text && !output.quiet {
        print_summary(&results);
    } else {
        print_result(output.format, output.quiet, &results);
    }

    if results.passed() {
        exit_codes::SUCCESS
    } else {
        exit_codes::RUN_FAILED
    }
}

async fn load_feature(path: &Path) -> Result<Feature, (i32, String)> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        (
            exit_codes::RUNTIME_ERROR,
            format!("failed to read {}: {e}", path.display()),
        )
    })?;
    parse_feature_str(&content, FeatureFormat::from_path(path))
        .map(|parsed| parsed.feature)
        .map_err(|e| {
            (
                exit_codes::VALIDATION_FAILED,
                format!("failed to parse {}: {e}", path.display()),
            )
        })
}

fn mark(status: &Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Failed(_) => "✗",
        Status::Pending => "·",
    }
}

fn print_summary(results: &ResultSet) {
    for feature in &results.features {
        println!("{} {}", mark(&feature.status), feature.title);
        for scenario in &feature.scenarios {
            println!("  {} {}", mark(&scenario.status), scenario.title);
            if let Some(message) = scenario.status.message() {
                let step = scenario
                    .failed_step
                    .as_deref()
                    .and_then(|s| s.lines().next())
                    .unwrap_or("");
                println!("      {step}");
                println!("      {message}");
            }
        }
    }
    let total = results.total();
    let fails = results.fails();
    println!("{total} scenarios ({} passed, {fails} failed)", total - fails);
}
