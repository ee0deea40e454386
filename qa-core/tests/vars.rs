use qa_core::vars;
use qa_core::VarsError;
use serde_json::{json, Value};

#[test]
fn set_then_get_nested_path() {
    let mut scope = json!({});
    vars::set(&mut scope, "a.b.c", json!(5)).unwrap();

    assert_eq!(vars::get(&scope, "a.b.c"), Some(&json!(5)));
    assert_eq!(scope, json!({ "a": { "b": { "c": 5 } } }));
}

#[test]
fn brackets_and_dots_are_equivalent() {
    let scope = json!({ "a": { "b": [ { "c": "x" }, { "c": "y" } ] } });

    assert_eq!(vars::get(&scope, "a.b[1].c"), Some(&json!("y")));
    assert_eq!(vars::get(&scope, "a.b.1.c"), Some(&json!("y")));
    assert_eq!(vars::get(&scope, "a['b'][0].c"), Some(&json!("x")));
    assert_eq!(vars::split_path(".a.b[0]"), vec!["a", "b", "0"]);
}

#[test]
fn missing_paths_return_none() {
    let scope = json!({ "a": { "b": 1 }, "list": [1, 2] });

    assert_eq!(vars::get(&scope, "x.y.z"), None);
    assert_eq!(vars::get(&scope, "a.b.c"), None);
    assert_eq!(vars::get(&scope, "list.9"), None);
    assert_eq!(vars::get(&scope, "list.first"), None);
    assert_eq!(vars::get(&scope, ""), None);
}

#[test]
fn null_values_are_present() {
    let scope = json!({ "a": null });
    assert_eq!(vars::get(&scope, "a"), Some(&Value::Null));
}

#[test]
fn set_refuses_to_descend_through_scalars() {
    let mut scope = json!({ "a": "text" });
    let err = vars::set(&mut scope, "a.b", json!(1)).unwrap_err();
    assert!(matches!(err, VarsError::NotAContainer { .. }));
    assert_eq!(scope, json!({ "a": "text" }));
}

#[test]
fn set_appends_to_arrays() {
    let mut scope = json!({ "list": [1] });
    vars::set(&mut scope, "list[1]", json!(2)).unwrap();
    vars::set(&mut scope, "list.0", json!(0)).unwrap();
    assert_eq!(scope, json!({ "list": [0, 2] }));

    let err = vars::set(&mut scope, "list.5", json!(9)).unwrap_err();
    assert!(matches!(err, VarsError::IndexOutOfRange { .. }));
}

#[test]
fn remove_returns_previous_value() {
    let mut scope = json!({ "a": { "b": 1, "c": 2 } });
    assert_eq!(vars::remove(&mut scope, "a.b"), Some(json!(1)));
    assert_eq!(vars::remove(&mut scope, "a.b"), None);
    assert_eq!(scope, json!({ "a": { "c": 2 } }));
}

#[test]
fn find_validates_scope_and_name() {
    assert!(matches!(
        vars::find(&json!([1, 2]), "a"),
        Err(VarsError::InvalidScope)
    ));
    assert!(matches!(
        vars::find(&json!({}), "  "),
        Err(VarsError::EmptyPath)
    ));
    assert_eq!(vars::find(&json!({ "a": 1 }), " a ").unwrap(), Some(&json!(1)));
}

#[test]
fn find_named_falls_back_to_json_path() {
    let scope = json!({ "user": { "name": "alice", "tags": ["a", "b"] } });

    assert_eq!(vars::find_named(&scope, "user.name").unwrap(), Some(json!("alice")));
    assert_eq!(vars::find_named(&scope, "$.user.tags[1]").unwrap(), Some(json!("b")));
    assert_eq!(vars::find_named(&scope, "nobody").unwrap(), None);
}

#[test]
fn find_named_queries_unrooted_json_paths() {
    let scope = json!({ "items": [ { "id": 1 }, { "id": 2 } ] });

    assert_eq!(vars::find_named(&scope, "items[*].id").unwrap(), Some(json!(1)));
    assert_eq!(vars::find_named(&scope, "..id").unwrap(), Some(json!(1)));
    assert_eq!(vars::find_named(&scope, "[items][1]").unwrap(), Some(json!({ "id": 2 })));
}

#[test]
fn find_named_treats_invalid_json_path_as_missing() {
    let scope = json!({ "a": 1 });

    assert_eq!(vars::find_named(&scope, "$x y").unwrap(), None);
    assert_eq!(vars::find_named(&scope, "$[").unwrap(), None);
    assert_eq!(vars::find_named(&scope, "no such name").unwrap(), None);
}

#[test]
fn json_path_queries_parse_string_bodies() {
    let body = json!(r#"{ "items": [ { "id": 1 }, { "id": 2 } ] }"#);

    assert_eq!(vars::find_in_path(&body, "$.items[0].id").unwrap(), Some(json!(1)));
    assert_eq!(
        vars::find_all_in_path(&body, "$.items[*].id").unwrap(),
        vec![json!(1), json!(2)]
    );
    assert_eq!(vars::find_in_path(&body, "$.missing").unwrap(), None);
}

#[test]
fn json_path_errors_are_reported() {
    let err = vars::find_in_path(&json!({}), "$[").unwrap_err();
    assert!(matches!(err, VarsError::JsonPath { .. }));

    let err = vars::find_in_path(&json!("not json"), "$.a").unwrap_err();
    assert!(matches!(err, VarsError::Json(_)));
}

#[test]
fn env_binds_only_prefixed_variables() {
    let mut config = json!({ "keep": true });
    let env = vec![
        ("QA_API_HOST", "localhost"),
        ("QA_API_PORT", "8080"),
        ("HOME", "/root"),
        ("QA_", "ignored"),
    ];

    let bound = vars::env("QA_", env, &mut config).unwrap();

    assert_eq!(bound, 2);
    assert_eq!(
        config,
        json!({ "keep": true, "api": { "host": "localhost", "port": "8080" } })
    );
}

#[test]
fn sanitize_replaces_runs_of_symbols() {
    assert_eq!(vars::sanitize("Hello, World! 42", "_"), "Hello_World_42");
    assert_eq!(vars::sanitize("a--b", "$1"), "a$1b");
}

#[test]
fn digest_is_stable_sha256_hex() {
    assert_eq!(
        vars::digest("abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn capitalize_first_letter() {
    assert_eq!(vars::capitalize("set a value"), "Set a value");
    assert_eq!(vars::capitalize(""), "");
}

#[test]
fn render_interpolates_named_values() {
    let scope = json!({ "name": "alice", "n": 3, "user": { "roles": ["admin"] } });

    assert_eq!(
        vars::render("hi {{ name }} x{{n}} {{ $.user.roles[0] }}{{ missing }}", &scope).unwrap(),
        "hi alice x3 admin"
    );
    assert_eq!(vars::render("keep {{}} as is", &scope).unwrap(), "keep {{}} as is");
    assert!(matches!(
        vars::render("broken {{ name", &scope),
        Err(VarsError::UnclosedExpression)
    ));
}

#[test]
fn loose_equality_compares_text_forms() {
    assert!(vars::loosely_equals(&json!("42"), "42"));
    assert!(vars::loosely_equals(&json!(42), "42"));
    assert!(vars::loosely_equals(&json!(5.0), "5"));
    assert!(vars::loosely_equals(&json!(true), "true"));
    assert!(!vars::loosely_equals(&json!("true"), "yes"));
}
