use std::collections::HashMap;
use std::sync::Arc;

use crate::handler::StepHandler;

use super::{CompiledPattern, DialectDocs, PatternError, PatternKind, StepMatchError};

pub struct PhraseDefinition {
    pub patterns: Vec<CompiledPattern>,
    pub handler: Arc<dyn StepHandler>,
    pub tag: String,
}

impl std::fmt::Debug for PhraseDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhraseDefinition")
            .field("patterns", &self.patterns.iter().map(|p| p.source()).collect::<Vec<_>>())
            .field("tag", &self.tag)
            .finish()
    }
}

/// A matched step: the handler to run and the arguments captured for it.
pub struct Resolved<'a> {
    pub handler: Arc<dyn StepHandler>,
    pub args: Vec<String>,
    pub pattern: &'a str,
    pub tag: &'a str,
}

/// Ordered catalog of phrases. The first registered pattern that matches a step wins.
#[derive(Debug, Default)]
pub struct PhraseLibrary {
    definitions: Vec<PhraseDefinition>,
    docs: Vec<DialectDocs>,
    doc_index: HashMap<String, usize>,
}

impl PhraseLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P, H>(
        &mut self,
        patterns: P,
        handler: H,
        doc: Option<DialectDocs>,
    ) -> Result<&DialectDocs, PatternError>
    where
        P: IntoIterator,
        P::Item: Into<PatternKind>,
        H: StepHandler + 'static,
    {
        self.register_shared(patterns, Arc::new(handler), doc)
    }

    pub fn register_shared<P>(
        &mut self,
        patterns: P,
        handler: Arc<dyn StepHandler>,
        doc: Option<DialectDocs>,
    ) -> Result<&DialectDocs, PatternError>
    where
        P: IntoIterator,
        P::Item: Into<PatternKind>,
    {
        let compiled = patterns
            .into_iter()
            .map(|p| CompiledPattern::compile(p.into()))
            .collect::<Result<Vec<_>, _>>()?;
        let first = compiled.first().ok_or(PatternError::Empty)?;

        let doc = doc.unwrap_or_else(|| DialectDocs::synthesize(first.source()));
        let sources: Vec<String> = compiled.iter().map(|p| p.source().to_string()).collect();

        let idx = match self.doc_index.get(&doc.tag) {
            Some(&idx) => idx,
            None => {
                self.docs.push(doc.clone());
                self.doc_index.insert(doc.tag.clone(), self.docs.len() - 1);
                self.docs.len() - 1
            }
        };
        self.docs[idx].absorb(sources);

        self.definitions.push(PhraseDefinition {
            patterns: compiled,
            handler,
            tag: doc.tag,
        });
        Ok(&self.docs[idx])
    }

    pub fn resolve(&self, text: &str) -> Result<Resolved<'_>, StepMatchError> {
        let text = text.trim();
        for def in &self.definitions {
            for pattern in &def.patterns {
                if let Some(args) = pattern.captures(text) {
                    return Ok(Resolved {
                        handler: Arc::clone(&def.handler),
                        args,
                        pattern: pattern.source(),
                        tag: &def.tag,
                    });
                }
            }
        }
        Err(StepMatchError {
            step: text.to_string(),
        })
    }

    pub fn docs(&self) -> &[DialectDocs] {
        &self.docs
    }

    pub fn doc(&self, tag: &str) -> Option<&DialectDocs> {
        self.doc_index.get(tag).map(|&idx| &self.docs[idx])
    }

    pub fn definitions(&self) -> &[PhraseDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
