use archetyper::descriptor::RequiredProperty;
use archetyper::error::Error;
use archetyper::properties::{parse_define, resolve, PropertyBag};
use archetyper::renderer::PlaceholderRenderer;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_parse_json_properties() {
    let bag = PropertyBag::parse(
        r#"{"groupId": "com.example", "port": 8080, "debug": true, "unset": null}"#,
    )
    .unwrap();
    assert_eq!(bag.get("groupId"), Some("com.example"));
    assert_eq!(bag.get("port"), Some("8080"));
    assert_eq!(bag.get("debug"), Some("true"));
    assert!(!bag.contains("unset"));
    assert_eq!(bag.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["groupId", "port", "debug"]);
}

#[test]
fn test_parse_yaml_properties() {
    let yaml = r#"
groupId: com.example
artifactId: demo
version: "1.0"
"#;
    let bag = PropertyBag::parse(yaml).unwrap();
    assert_eq!(bag.get("artifactId"), Some("demo"));
    assert_eq!(bag.get("version"), Some("1.0"));
    assert_eq!(bag.len(), 3);
}

#[test]
fn test_nested_values_are_rejected() {
    let result = PropertyBag::parse(r#"{"nested": {"a": 1}}"#);
    assert!(matches!(result, Err(Error::ConfigError(_))));
    assert!(PropertyBag::parse("- just\n- a list\n").is_err());
}

#[test]
fn test_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("archetype.yml");
    fs::write(&path, "groupId: org.acme\n").unwrap();
    let bag = PropertyBag::from_file(&path).unwrap();
    assert_eq!(bag.get("groupId"), Some("org.acme"));

    assert!(PropertyBag::from_file(temp_dir.path().join("missing.yml")).is_err());
}

#[test]
fn test_merge_later_values_win() {
    let mut bag: PropertyBag = [("groupId", "a"), ("artifactId", "x")].into_iter().collect();
    bag.merge([("groupId", "b")].into_iter().collect());
    assert_eq!(bag.get("groupId"), Some("b"));
    assert_eq!(bag.get("artifactId"), Some("x"));
}

#[test]
fn test_parse_define() {
    assert_eq!(
        parse_define("groupId=com.example").unwrap(),
        ("groupId".to_string(), "com.example".to_string())
    );
    assert_eq!(parse_define("empty=").unwrap(), ("empty".to_string(), String::new()));
    assert!(parse_define("novalue").is_err());
    assert!(parse_define("=value").is_err());
}

#[test]
fn test_resolve_renders_defaults() {
    let explicit: PropertyBag =
        [("groupId", "org.acme"), ("artifactId", "tool")].into_iter().collect();
    let required = vec![
        RequiredProperty::new("groupId"),
        RequiredProperty::new("artifactId"),
        RequiredProperty::new("version").with_default("1.0-SNAPSHOT"),
        RequiredProperty::new("package").with_default("${groupId}.${artifactId}"),
    ];
    let resolved = resolve(&explicit, &required, &PlaceholderRenderer::new()).unwrap();
    assert_eq!(resolved.get("version"), Some("1.0-SNAPSHOT"));
    assert_eq!(resolved.get("package"), Some("org.acme.tool"));
    assert_eq!(resolved.get("packageInPathFormat"), Some("org/acme/tool"));
}

#[test]
fn test_resolve_explicit_values_win() {
    let explicit: PropertyBag = [("version", "2.0")].into_iter().collect();
    let required = vec![RequiredProperty::new("version").with_default("1.0-SNAPSHOT")];
    let resolved = resolve(&explicit, &required, &PlaceholderRenderer::new()).unwrap();
    assert_eq!(resolved.get("version"), Some("2.0"));
}

#[test]
fn test_resolve_package_falls_back_to_group_id() {
    let explicit: PropertyBag = [("groupId", "com.example")].into_iter().collect();
    let resolved = resolve(&explicit, &[], &PlaceholderRenderer::new()).unwrap();
    assert_eq!(resolved.get("package"), Some("com.example"));
    assert_eq!(resolved.get("packageInPathFormat"), Some("com/example"));
}

#[test]
fn test_resolve_missing_property() {
    let required = vec![RequiredProperty::new("groupId")];
    match resolve(&PropertyBag::new(), &required, &PlaceholderRenderer::new()) {
        Err(Error::MissingPropertyError { key }) => assert_eq!(key, "groupId"),
        other => panic!("Expected MissingPropertyError, got {other:?}"),
    }
}

#[test]
fn test_resolve_validation() {
    let required = vec![RequiredProperty::new("artifactId").with_validation("[a-z][a-z0-9-]*")];
    let ok: PropertyBag = [("artifactId", "my-app")].into_iter().collect();
    assert!(resolve(&ok, &required, &PlaceholderRenderer::new()).is_ok());

    let bad: PropertyBag = [("artifactId", "my-app!")].into_iter().collect();
    match resolve(&bad, &required, &PlaceholderRenderer::new()) {
        Err(Error::ValidationError { key, value, .. }) => {
            assert_eq!(key, "artifactId");
            assert_eq!(value, "my-app!");
        }
        other => panic!("Expected ValidationError, got {other:?}"),
    }
}
