use qa_core::vars::digest;
use qa_exec::phrase::CompiledPattern;
use qa_exec::{step_fn, DialectDocs, PatternError, PatternKind, PhraseLibrary};

fn noop() -> impl qa_exec::StepHandler {
    step_fn(|_, _| Ok(()))
}

#[test]
fn template_placeholders_capture_in_order() {
    let pattern = CompiledPattern::compile("I set $varname to $value".into()).unwrap();

    assert_eq!(pattern.placeholders(), ["varname", "value"]);
    assert_eq!(
        pattern.captures("I set greeting to hello world"),
        Some(vec!["greeting".to_string(), "hello world".to_string()])
    );
    assert_eq!(pattern.captures("I set greeting"), None);
}

#[test]
fn templates_accept_gherkin_keywords_and_loose_spacing() {
    let pattern = CompiledPattern::compile("I pass".into()).unwrap();

    assert!(pattern.captures("I pass").is_some());
    assert!(pattern.captures("Given I pass").is_some());
    assert!(pattern.captures("and   I\tpass").is_some());
    assert!(pattern.captures("I pass quickly").is_none());
    assert!(pattern.captures("Maybe I pass").is_none());
}

#[test]
fn literal_text_is_escaped() {
    let pattern = CompiledPattern::compile("cost is $amount (USD)".into()).unwrap();
    assert_eq!(
        pattern.captures("cost is 4.50 (USD)"),
        Some(vec!["4.50".to_string()])
    );
    assert!(pattern.captures("cost is 4.50 xUSDx").is_none());
}

#[test]
fn block_placeholder_captures_everything_after_the_line_break() {
    let pattern = CompiledPattern::compile("I set $varname to JSON:\n$JSON".into()).unwrap();
    let step = "I set body to JSON:\n{\n  \"a\": 1\n}";

    assert_eq!(
        pattern.captures(step),
        Some(vec!["body".to_string(), "{\n  \"a\": 1\n}".to_string()])
    );
    // an inline placeholder never crosses a line break
    let inline = CompiledPattern::compile("I set $varname to $value".into()).unwrap();
    assert!(inline.captures(step).is_none());
}

#[test]
fn regex_patterns_are_used_verbatim() {
    let pattern =
        CompiledPattern::compile(PatternKind::Regex(r"^count (?P<n>\d+) (\w+)$".to_string())).unwrap();

    assert_eq!(pattern.placeholders(), ["n", "$2"]);
    assert_eq!(
        pattern.captures("count 3 apples"),
        Some(vec!["3".to_string(), "apples".to_string()])
    );
    assert!(pattern.captures("count three apples").is_none());
}

#[test]
fn invalid_regex_is_rejected() {
    let err = CompiledPattern::compile(PatternKind::Regex("(unclosed".to_string())).unwrap_err();
    assert!(matches!(err, PatternError::Regex { .. }));
}

#[test]
fn first_registered_match_wins() {
    let mut library = PhraseLibrary::new();
    library
        .register(["I wait for $time $units"], noop(), Some(DialectDocs::new("wait.for", "")))
        .unwrap();
    library
        .register(["I wait $time $units"], noop(), Some(DialectDocs::new("wait", "")))
        .unwrap();

    let resolved = library.resolve("I wait for 5 seconds").unwrap();
    assert_eq!(resolved.tag, "wait.for");
    assert_eq!(resolved.args, vec!["5", "seconds"]);

    let resolved = library.resolve("I wait 5 seconds").unwrap();
    assert_eq!(resolved.tag, "wait");
    assert_eq!(resolved.pattern, "I wait $time $units");
}

#[test]
fn resolution_is_deterministic() {
    let mut library = PhraseLibrary::new();
    library.register(["$a should be $b"], noop(), None).unwrap();
    library.register(["x should be $b"], noop(), None).unwrap();

    for _ in 0..10 {
        let resolved = library.resolve("x should be 1").unwrap();
        assert_eq!(resolved.pattern, "$a should be $b");
        assert_eq!(resolved.args, vec!["x", "1"]);
    }
}

#[test]
fn unmatched_step_reports_its_text() {
    let library = PhraseLibrary::new();
    let err = library.resolve("  I do something odd ").err().unwrap();
    assert_eq!(err.step, "I do something odd");
}

#[test]
fn missing_doc_is_synthesized_from_first_pattern() {
    let mut library = PhraseLibrary::new();
    let doc = library
        .register(["I clear variables", "I reset variables"], noop(), None)
        .unwrap()
        .clone();

    assert_eq!(doc.tag, digest("I clear variables"));
    assert_eq!(doc.description, "Clear variables");
    assert_eq!(doc.phrases, vec!["I clear variables", "I reset variables"]);
}

#[test]
fn docs_accumulate_by_tag() {
    let mut library = PhraseLibrary::new();
    library
        .register(["I pass"], noop(), Some(DialectDocs::new("outcome", "Outcomes")))
        .unwrap();
    library
        .register(["I fail"], noop(), Some(DialectDocs::new("outcome", "ignored")))
        .unwrap();

    assert_eq!(library.docs().len(), 1);
    assert_eq!(library.len(), 2);
    let doc = library.doc("outcome").unwrap();
    assert_eq!(doc.description, "Outcomes");
    assert_eq!(doc.phrases, vec!["I pass", "I fail"]);
}

#[test]
fn empty_pattern_list_is_rejected() {
    let mut library = PhraseLibrary::new();
    let err = library
        .register(Vec::<String>::new(), noop(), None)
        .unwrap_err();
    assert!(matches!(err, PatternError::Empty));
    assert!(library.is_empty());
}
