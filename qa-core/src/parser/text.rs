use crate::error::ParseError;
use crate::parser::FeatureParser;
use crate::types::{Feature, Scenario, Step};

/// Line-oriented `Feature:` / `Scenario:` reader.
///
/// Every non-keyword line inside a scenario is one step. A step may carry a
/// block: either lines fenced by `---` (three or more dashes) or `"""`, or
/// lines indented deeper than the step itself. The block is appended to the
/// step text after a line break, verbatim apart from its common indentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFeatureParser;

impl FeatureParser for TextFeatureParser {
    fn parse(&self, input: &str) -> Result<Feature, ParseError> {
        parse_feature_text(input)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fence {
    Dashes,
    Quotes,
}

struct PendingStep {
    text: String,
    indent: usize,
    block: Vec<String>,
    block_indent: Option<usize>,
    fence: Option<(Fence, usize)>,
    closed: bool,
}

impl PendingStep {
    fn new(text: &str, indent: usize) -> Self {
        Self {
            text: text.to_string(),
            indent,
            block: Vec::new(),
            block_indent: None,
            fence: None,
            closed: false,
        }
    }

    fn into_step(self) -> Step {
        if self.block.is_empty() {
            return Step::new(self.text);
        }
        Step::new(format!("{}\n{}", self.text, self.block.join("\n")))
    }
}

#[derive(Default)]
struct Builder {
    feature: Option<Feature>,
    description: Vec<String>,
    scenario: Option<Scenario>,
    step: Option<PendingStep>,
    fence_line: usize,
}

impl Builder {
    fn flush_step(&mut self) {
        if let (Some(step), Some(scenario)) = (self.step.take(), self.scenario.as_mut()) {
            scenario.steps.push(step.into_step());
        }
    }

    fn flush_scenario(&mut self) {
        self.flush_step();
        if let (Some(scenario), Some(feature)) = (self.scenario.take(), self.feature.as_mut()) {
            feature.scenarios.push(scenario);
        }
    }

    /// Returns true when the line was consumed as part of the pending step's block.
    fn absorb_block_line(&mut self, raw: &str, line_no: usize) -> bool {
        let Some(step) = self.step.as_mut() else {
            return false;
        };
        let trimmed = raw.trim();

        if let Some((fence, indent)) = step.fence {
            if fence_of(trimmed) == Some(fence) {
                step.fence = None;
                step.closed = true;
            } else {
                step.block.push(strip_indent(raw, indent));
            }
            return true;
        }

        if step.closed {
            return false;
        }

        if trimmed.is_empty() {
            if !step.block.is_empty() {
                step.closed = true;
            }
            return false;
        }

        if step.block.is_empty() {
            if let Some(fence) = fence_of(trimmed) {
                step.fence = Some((fence, indent_of(raw)));
                self.fence_line = line_no;
                return true;
            }
        }

        let indent = indent_of(raw);
        if indent > step.indent {
            let block_indent = *step.block_indent.get_or_insert(indent);
            step.block.push(strip_indent(raw, block_indent));
            return true;
        }
        false
    }
}

pub fn parse_feature_text(input: &str) -> Result<Feature, ParseError> {
    let mut b = Builder::default();

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        if b.absorb_block_line(raw, line_no) {
            continue;
        }

        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('@') {
            continue;
        }

        if let Some(title) = keyword_title(trimmed, "feature") {
            if b.feature.is_some() {
                return Err(ParseError::text(line_no, "only one 'Feature:' per input"));
            }
            b.feature = Some(Feature::new(title));
            continue;
        }

        if let Some(title) = keyword_title(trimmed, "scenario") {
            if b.feature.is_none() {
                return Err(ParseError::text(line_no, "'Scenario:' before 'Feature:'"));
            }
            b.flush_scenario();
            b.scenario = Some(Scenario::new(title, Vec::<Step>::new()));
            continue;
        }

        if b.feature.is_none() {
            return Err(ParseError::text(line_no, "expected a 'Feature:' header"));
        }

        if b.scenario.is_none() {
            b.description.push(trimmed.to_string());
            continue;
        }

        b.flush_step();
        b.step = Some(PendingStep::new(trimmed, indent_of(raw)));
    }

    if b.step.as_ref().is_some_and(|s| s.fence.is_some()) {
        return Err(ParseError::text(b.fence_line, "unterminated block"));
    }

    b.flush_scenario();
    let mut feature = b.feature.ok_or(ParseError::Empty)?;
    if !b.description.is_empty() {
        feature.description = Some(b.description.join("\n"));
    }
    Ok(feature)
}

fn keyword_title(line: &str, keyword: &str) -> Option<String> {
    let (head, rest) = line.split_once(':')?;
    if head.trim().eq_ignore_ascii_case(keyword) {
        Some(rest.trim().to_string())
    } else {
        None
    }
}

fn fence_of(trimmed: &str) -> Option<Fence> {
    if trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-') {
        return Some(Fence::Dashes);
    }
    if trimmed == "\"\"\"" {
        return Some(Fence::Quotes);
    }
    None
}

fn indent_of(raw: &str) -> usize {
    raw.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

fn strip_indent(raw: &str, indent: usize) -> String {
    let mut width = 0;
    for (pos, c) in raw.char_indices() {
        if width >= indent || !c.is_whitespace() {
            return raw[pos..].to_string();
        }
        width += if c == '\t' { 4 } else { 1 };
    }
    String::new()
}
