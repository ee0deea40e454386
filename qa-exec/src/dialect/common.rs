use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use super::Dialect;
use crate::engine::StepError;
use crate::handler::{arity, step_fn, StepHandler};
use crate::phrase::{DialectDocs, PatternError, PhraseLibrary};
use crate::scope::Scope;

/// Actor identity, deliberate outcomes, waiting and logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommonDialect;

impl Dialect for CommonDialect {
    fn name(&self) -> &str {
        "common"
    }

    fn install(&self, library: &mut PhraseLibrary) -> Result<(), PatternError> {
        library.register(
            ["I am an $actor", "I am a $actor", "I am $actor"],
            step_fn(|scope, args| {
                let [actor] = arity::<1>(args)?;
                scope.set("name", actor.as_str())?;
                Ok(())
            }),
            Some(DialectDocs::new("common.actor", "Name the actor performing the scenario")),
        )?;

        library.register(
            ["I fail"],
            step_fn(|_, _| Err(StepError::failed("Deliberate Fail"))),
            Some(DialectDocs::new("common.fail", "Fail the scenario on purpose")),
        )?;

        library.register(
            ["I fail with $msg"],
            step_fn(|scope, args| {
                let [msg] = arity::<1>(args)?;
                Err(StepError::failed(format!("Deliberate Fail: {msg}")).with_scope(scope))
            }),
            Some(DialectDocs::new("common.fail", "Fail the scenario on purpose")),
        )?;

        library.register(
            ["I pass", "I do nothing", "I succeed"],
            step_fn(|_, _| Ok(())),
            Some(DialectDocs::new("common.pass", "A step that always succeeds")),
        )?;

        library.register(
            [
                "I wait for $time $units",
                "I wait for $time",
                "I wait $time $units",
                "I wait $time",
            ],
            WaitStep,
            Some(DialectDocs::new("common.wait", "Pause the scenario")),
        )?;

        library.register(
            ["log $msg"],
            step_fn(|scope, args| {
                let [msg] = arity::<1>(args)?;
                info!(target: "qa::log", "{}", scope.render(msg)?);
                Ok(())
            }),
            None,
        )?;

        library.register(
            ["debug $msg"],
            step_fn(|scope, args| {
                let [msg] = arity::<1>(args)?;
                debug!(target: "qa::log", "{}", scope.render(msg)?);
                Ok(())
            }),
            None,
        )?;
        Ok(())
    }
}

struct WaitStep;

#[async_trait]
impl StepHandler for WaitStep {
    async fn call(&self, _scope: &mut Scope, args: Vec<String>) -> Result<(), StepError> {
        let time = args.first().map(String::as_str).unwrap_or_default();
        let units = args.get(1).map(String::as_str).unwrap_or("seconds");
        let delay = wait_duration(time, units)?;
        debug!(?delay, "waiting");
        tokio::time::sleep(delay).await;
        Ok(())
    }
}

fn wait_duration(time: &str, units: &str) -> Result<Duration, StepError> {
    let amount: f64 = time
        .trim()
        .parse()
        .map_err(|_| StepError::failed(format!("invalid wait time: {time}")))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(StepError::failed(format!("invalid wait time: {time}")));
    }

    let seconds = match units.trim().to_ascii_lowercase().as_str() {
        "ms" | "milli" | "millis" | "millisecond" | "milliseconds" => amount / 1000.0,
        "m" | "min" | "mins" | "minute" | "minutes" => amount * 60.0,
        _ => amount,
    };
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| StepError::failed(format!("invalid wait time: {time}")))
}
