use qa_core::{parse_feature_str, FeatureFormat, ParseError, Step};

fn login_feature() -> &'static str {
    r#"
# comment lines are ignored
@smoke
Feature: Login
  Users can sign in with valid credentials.

  Scenario: happy path
    Given I set user to alice
    Then user should be alice

  Scenario: payload
    Given I set body to JSON:
    ---
    { "name": "alice",
      "roles": ["admin"] }
    ---
    Then $.name in body should contain alice
"#
}

#[test]
fn parse_text_feature() {
    let parsed = parse_feature_str(login_feature(), FeatureFormat::Text).unwrap();
    let feature = parsed.feature;

    assert_eq!(feature.title, "Login");
    assert_eq!(
        feature.description.as_deref(),
        Some("Users can sign in with valid credentials.")
    );
    assert_eq!(feature.scenarios.len(), 2);
    assert_eq!(feature.scenarios[0].title, "happy path");
    assert_eq!(
        feature.scenarios[0].steps,
        vec![
            Step::from("Given I set user to alice"),
            Step::from("Then user should be alice"),
        ]
    );
    assert_eq!(feature.step_count(), 4);
}

#[test]
fn fenced_block_is_appended_to_step() {
    let feature = parse_feature_str(login_feature(), FeatureFormat::Text)
        .unwrap()
        .feature;
    let step = &feature.scenarios[1].steps[0];

    assert_eq!(step.headline(), "Given I set body to JSON:");
    assert_eq!(
        step.text(),
        "Given I set body to JSON:\n{ \"name\": \"alice\",\n  \"roles\": [\"admin\"] }"
    );
    assert_eq!(
        feature.scenarios[1].steps[1].text(),
        "Then $.name in body should contain alice"
    );
}

#[test]
fn indented_block_is_appended_to_step() {
    let text = "Feature: f\nScenario: s\n  I execute\n      1 + 1\n      == 2\n  I pass\n";
    let feature = parse_feature_str(text, FeatureFormat::Text).unwrap().feature;

    let steps = &feature.scenarios[0].steps;
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].text(), "I execute\n1 + 1\n== 2");
    assert_eq!(steps[1].text(), "I pass");
}

#[test]
fn auto_detects_text() {
    let parsed = parse_feature_str(login_feature(), FeatureFormat::Auto).unwrap();
    assert_eq!(parsed.format, FeatureFormat::Text);
}

#[test]
fn auto_detects_json() {
    let json = r#"{ "title": "API", "scenarios": [ { "title": "s1", "steps": ["I pass"] } ] }"#;
    let parsed = parse_feature_str(json, FeatureFormat::Auto).unwrap();
    assert_eq!(parsed.format, FeatureFormat::Json);
    assert_eq!(parsed.feature.scenarios[0].steps[0].text(), "I pass");
}

#[test]
fn auto_detects_yaml() {
    let yaml = r#"
title: API
scenarios:
  - title: s1
    steps:
      - I pass
      - |
        I set body to text:
        hello
"#;
    let parsed = parse_feature_str(yaml, FeatureFormat::Auto).unwrap();
    assert_eq!(parsed.format, FeatureFormat::Yaml);
    assert_eq!(parsed.feature.scenarios[0].steps.len(), 2);
    assert!(parsed.feature.scenarios[0].steps[1]
        .text()
        .starts_with("I set body to text:\nhello"));
}

#[test]
fn format_from_path_uses_extension() {
    use std::path::Path;
    assert_eq!(FeatureFormat::from_path(Path::new("a/login.feature")), FeatureFormat::Text);
    assert_eq!(FeatureFormat::from_path(Path::new("a/login.JSON")), FeatureFormat::Json);
    assert_eq!(FeatureFormat::from_path(Path::new("a/login.yml")), FeatureFormat::Yaml);
    assert_eq!(FeatureFormat::from_path(Path::new("a/login.txt")), FeatureFormat::Auto);
}

#[test]
fn empty_input_is_rejected() {
    let err = parse_feature_str("   \n", FeatureFormat::Auto).unwrap_err();
    assert!(matches!(err, ParseError::Empty));
}

#[test]
fn scenario_before_feature_is_rejected() {
    let err = parse_feature_str("Scenario: s\n  I pass\n", FeatureFormat::Text).unwrap_err();
    match err {
        ParseError::Text { line, .. } => assert_eq!(line, 1),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unterminated_block_is_rejected() {
    let text = "Feature: f\nScenario: s\n  I set x to text:\n  ---\n  dangling\n";
    let err = parse_feature_str(text, FeatureFormat::Text).unwrap_err();
    match err {
        ParseError::Text { line, message } => {
            assert_eq!(line, 4);
            assert!(message.contains("unterminated"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_json_reports_json_error() {
    let err = parse_feature_str("{ \"title\": ", FeatureFormat::Json).unwrap_err();
    assert!(matches!(err, ParseError::Json(_)));
}
