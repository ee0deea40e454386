use std::sync::LazyLock;

use regex::Regex;

use super::PatternError;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("valid regex"));

const KEYWORD_PREFIX: &str = r"(?:(?i:given|when|then|and|but)[ \t]+)?";
const INLINE_CAPTURE: &str = "(.+?)";
const BLOCK_CAPTURE: &str = r"([\s\S]*)";

/// Source form of a phrase pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternKind {
    /// Literal text with `$name` placeholders, e.g. `I set $varname to $value`.
    Template(String),
    /// A regular expression used verbatim; its capture groups become the arguments.
    Regex(String),
}

impl PatternKind {
    pub fn source(&self) -> &str {
        match self {
            PatternKind::Template(s) | PatternKind::Regex(s) => s,
        }
    }
}

impl From<&str> for PatternKind {
    fn from(value: &str) -> Self {
        PatternKind::Template(value.to_string())
    }
}

impl From<String> for PatternKind {
    fn from(value: String) -> Self {
        PatternKind::Template(value)
    }
}

#[derive(Debug, Clone)]
pub struct CompiledPattern {
    kind: PatternKind,
    regex: Regex,
    placeholders: Vec<String>,
}

impl CompiledPattern {
    pub fn compile(kind: PatternKind) -> Result<Self, PatternError> {
        let (expr, placeholders) = match &kind {
            PatternKind::Template(t) => template_to_regex(t),
            PatternKind::Regex(r) => (r.clone(), Vec::new()),
        };
        let regex = Regex::new(&expr).map_err(|source| PatternError::Regex {
            pattern: kind.source().to_string(),
            source,
        })?;

        let placeholders = match kind {
            PatternKind::Template(_) => placeholders,
            PatternKind::Regex(_) => regex
                .capture_names()
                .enumerate()
                .skip(1)
                .map(|(i, name)| name.map_or_else(|| format!("${i}"), str::to_string))
                .collect(),
        };
        Ok(Self {
            kind,
            regex,
            placeholders,
        })
    }

    pub fn kind(&self) -> &PatternKind {
        &self.kind
    }

    pub fn source(&self) -> &str {
        self.kind.source()
    }

    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Captured arguments, in placeholder order, when `text` matches.
    pub fn captures(&self, text: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(text)?;
        Some(
            (1..caps.len())
                .map(|i| caps.get(i).map_or_else(String::new, |m| m.as_str().to_string()))
                .collect(),
        )
    }
}

fn template_to_regex(template: &str) -> (String, Vec<String>) {
    let mut expr = String::from("^");
    expr.push_str(KEYWORD_PREFIX);
    let mut names = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        let literal = &template[last..whole.start()];
        push_literal(&mut expr, literal);

        let after_break = literal.ends_with('\n');
        expr.push_str(if after_break { BLOCK_CAPTURE } else { INLINE_CAPTURE });
        names.push(caps[1].to_string());
        last = whole.end();
    }
    push_literal(&mut expr, &template[last..]);
    expr.push_str(r"[ \t]*$");
    (expr, names)
}

fn push_literal(expr: &mut String, literal: &str) {
    let mut word = String::new();
    let mut in_space = false;

    for c in literal.chars() {
        match c {
            ' ' | '\t' => {
                flush_word(expr, &mut word);
                if !in_space {
                    expr.push_str(r"[ \t]+");
                    in_space = true;
                }
            }
            '\n' => {
                flush_word(expr, &mut word);
                expr.push_str(r"\r?\n");
                in_space = false;
            }
            _ => {
                word.push(c);
                in_space = false;
            }
        }
    }
    flush_word(expr, &mut word);
}

fn flush_word(expr: &mut String, word: &mut String) {
    if !word.is_empty() {
        expr.push_str(&regex::escape(word));
        word.clear();
    }
}
