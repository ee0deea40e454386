#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("a phrase needs at least one pattern")]
    Empty,
    #[error("invalid pattern '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no phrase matches step: {step}")]
pub struct StepMatchError {
    pub step: String,
}
