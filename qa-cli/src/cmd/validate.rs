use std::path::{Path, PathBuf};

use qa_core::{parse_feature_str, FeatureFormat};
use qa_exec::engine::feature_files;
use qa_exec::{Engine, EngineConfig};
use serde::Serialize;
use tracing::debug;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::OutputArgs;

#[derive(Serialize)]
struct ValidateResult {
    valid: bool,
    files: usize,
    scenarios: usize,
    steps: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// Parses every feature and resolves every step against the built-in phrases.
pub async fn validate_cmd(path: &Path, output: OutputArgs) -> i32 {
    let engine = match Engine::standard(EngineConfig::new()) {
        Ok(engine) => engine,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("failed to build engine: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let files: Vec<PathBuf> = if path.is_dir() {
        match feature_files(path).await {
            Ok(files) => files,
            Err(e) => {
                print_error(output.format, output.quiet, &e.to_string());
                return exit_codes::RUNTIME_ERROR;
            }
        }
    } else {
        vec![path.to_path_buf()]
    };

    let mut result = ValidateResult {
        valid: true,
        files: files.len(),
        scenarios: 0,
        steps: 0,
        errors: Vec::new(),
    };

    for file in &files {
        let content = match tokio::fs::read_to_string(file).await {
            Ok(c) => c,
            Err(e) => {
                print_error(
                    output.format,
                    output.quiet,
                    &format!("failed to read {}: {e}", file.display()),
                );
                return exit_codes::RUNTIME_ERROR;
            }
        };
        let feature = match parse_feature_str(&content, FeatureFormat::from_path(file)) {
            Ok(parsed) => {
                debug!(path = %file.display(), format = ?parsed.format, "parsed feature");
                parsed.feature
            }
            Err(e) => {
                result.errors.push(format!("{}: {e}", file.display()));
                continue;
            }
        };

        for scenario in &feature.scenarios {
            result.scenarios += 1;
            for step in &scenario.steps {
                result.steps += 1;
                if let Err(e) = engine.library().resolve(step.text()) {
                    let headline = e.step.lines().next().unwrap_or("");
                    result.errors.push(format!(
                        "{}: {}: no phrase matches step: {headline}",
                        file.display(),
                        scenario.title
                    ));
                }
            }
        }
    }
    result.valid = result.errors.is_empty();

    if output.format == OutputFormat::Text && !output.quiet {
        if result.valid {
            println!(
                "ok: {} files, {} scenarios, {} steps",
                result.files, result.scenarios, result.steps
            );
        } else {
            eprintln!("error: validation failed");
            for e in &result.errors {
                eprintln!("- {e}");
            }
        }
    } else {
        print_result(output.format, output.quiet, &result);
    }

    if result.valid {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_FAILED
    }
}
