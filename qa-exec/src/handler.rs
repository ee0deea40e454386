use async_trait::async_trait;

use crate::engine::StepError;
use crate::scope::Scope;

/// Executable body of a phrase. Receives the arguments captured from the step text.
#[async_trait]
pub trait StepHandler: Send + Sync {
    async fn call(&self, scope: &mut Scope, args: Vec<String>) -> Result<(), StepError>;
}

/// Adapter that turns a synchronous closure into a [`StepHandler`].
pub struct FnStep<F>(F);

pub fn step_fn<F>(f: F) -> FnStep<F>
where
    F: Fn(&mut Scope, &[String]) -> Result<(), StepError> + Send + Sync + 'static,
{
    FnStep(f)
}

#[async_trait]
impl<F> StepHandler for FnStep<F>
where
    F: Fn(&mut Scope, &[String]) -> Result<(), StepError> + Send + Sync + 'static,
{
    async fn call(&self, scope: &mut Scope, args: Vec<String>) -> Result<(), StepError> {
        (self.0)(scope, &args)
    }
}

/// Borrows exactly `N` captured arguments.
pub fn arity<const N: usize>(args: &[String]) -> Result<&[String; N], StepError> {
    <&[String; N]>::try_from(args).map_err(|_| {
        StepError::failed(format!(
            "expected {N} step argument(s), got {}",
            args.len()
        ))
    })
}
