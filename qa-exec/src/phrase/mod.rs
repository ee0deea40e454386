mod docs;
mod error;
mod library;
mod pattern;

pub use docs::DialectDocs;
pub use error::{PatternError, StepMatchError};
pub use library::{PhraseDefinition, PhraseLibrary, Resolved};
pub use pattern::{CompiledPattern, PatternKind};
