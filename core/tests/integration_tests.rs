use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use form_extract_core::{
    ErrorKind, Extractor, FieldValue, FormValues, RuleBook, RuleSet, SchemaError,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn signup_rules() -> RuleSet {
    RuleSet::from_json_str(
        r#"{
            "ref": 1,
            "csrf_token": false,
            "name": "must",
            "email": {"type": "string", "must": true, "min": 3, "max": 254},
            "age": {"type": "int", "min": 18, "max": 130},
            "height": {"type": "float", "min": 1, "max": 3},
            "newsletter": {"type": "bool"},
            "interests": {"type": "strings", "max_amt": 3, "max": 20},
            "lucky": {"type": "ints", "min_amt": 1, "max_amt": 2},
            "nickname": {"max": 8}
        }"#,
    )
    .unwrap()
}

fn form(pairs: &[(&str, &str)]) -> FormValues {
    pairs.iter().copied().collect()
}

// ---------------------------------------------------------------------------
// Full submissions
// ---------------------------------------------------------------------------

#[test]
fn test_complete_submission() {
    let extractor = Extractor::new(signup_rules());
    let out = extractor
        .extract(&form(&[
            ("ref", "newsletter-footer"),
            ("csrf_token", "abc123"),
            ("name", "Grace"),
            ("email", "grace@example.com"),
            ("age", "85"),
            ("height", "1.6"),
            ("newsletter", "True"),
            ("interests", "compilers"),
            ("interests", "navy"),
            ("lucky", "7"),
            ("nickname", "amazing"),
            ("unexpected", "dropped"),
        ]))
        .unwrap();

    assert_eq!(out["ref"].as_str(), Some("newsletter-footer"));
    assert!(!out.contains_key("csrf_token"));
    assert_eq!(out["name"].as_str(), Some("Grace"));
    assert_eq!(out["email"].as_str(), Some("grace@example.com"));
    assert_eq!(out["age"].as_int(), Some(85));
    assert_eq!(out["height"].as_float(), Some(1.6));
    assert_eq!(out["newsletter"].as_bool(), Some(true));
    assert_eq!(
        out["interests"].as_strings(),
        Some(["compilers".to_string(), "navy".to_string()].as_slice())
    );
    assert_eq!(out["lucky"].as_ints(), Some([7_i64].as_slice()));
    assert_eq!(out["nickname"].as_str(), Some("amazing"));
    assert!(!out.contains_key("unexpected"));
    assert_eq!(out.len(), 9);
}

#[test]
fn test_minimal_submission_omits_optional_fields() {
    let extractor = Extractor::new(signup_rules());
    let out = extractor
        .extract_query("name=Ada&email=ada%40example.com")
        .unwrap();
    assert_eq!(out.keys().collect::<Vec<_>>(), vec!["email", "name"]);
}

#[test]
fn test_output_serializes_as_plain_json() {
    let extractor = Extractor::new(signup_rules());
    let out = extractor
        .extract_query("name=Ada&email=ada%40example.com&age=36&lucky=3&lucky=9")
        .unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "age": 36,
            "email": "ada@example.com",
            "lucky": [3, 9],
            "name": "Ada"
        })
    );
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

#[test]
fn test_each_rejection_category() {
    let extractor = Extractor::new(signup_rules());
    let base = "name=Ada&email=ada%40example.com";
    let cases = [
        ("email=ada%40example.com", ErrorKind::MandatoryFieldMissing, "name"),
        ("name=Ada&email=a", ErrorKind::ScalarFailed, "email"),
        ("age=17", ErrorKind::ScalarFailed, "age"),
        ("age=20&age=21", ErrorKind::MultipleValues, "age"),
        ("height=3.2", ErrorKind::ScalarFailed, "height"),
        ("newsletter=yes", ErrorKind::ScalarFailed, "newsletter"),
        ("interests=a&interests=b&interests=c&interests=d", ErrorKind::CollectionFailed, "interests"),
        ("lucky=1&lucky=2&lucky=3", ErrorKind::CollectionFailed, "lucky"),
        ("lucky=one", ErrorKind::CollectionFailed, "lucky"),
        ("nickname=a&nickname=b", ErrorKind::MultipleValues, "nickname"),
    ];

    for (extra, kind, field) in cases {
        let query = if extra.starts_with("name=") || extra.starts_with("email=") {
            extra.to_string()
        } else {
            format!("{base}&{extra}")
        };
        let err = extractor.extract_query(&query).unwrap_err();
        assert_eq!(err.kind(), kind, "{query}");
        assert_eq!(err.field(), field, "{query}");
    }
}

#[test]
fn test_optional_untyped_overflow_is_dropped_not_rejected() {
    let extractor = Extractor::new(signup_rules());
    let out = extractor
        .extract_query("name=Ada&email=ada%40example.com&nickname=much-too-long")
        .unwrap();
    assert!(!out.contains_key("nickname"));
}

#[test]
fn test_unknown_type_is_reported() {
    let rules = RuleSet::from_json_str(r#"{"zip": {"type": "postcode"}}"#).unwrap();
    let err = Extractor::new(rules).extract_query("zip=12345").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownType);
}

// ---------------------------------------------------------------------------
// Schema defects
// ---------------------------------------------------------------------------

#[test]
fn test_schema_defects_surface_at_load_time() {
    let malformed = [
        r#"{"a": true}"#,
        r#"{"a": "optional"}"#,
        r#"{"a": [1, 2]}"#,
        r#"{"a": null}"#,
        r#"{"a": {"type": ["int"]}}"#,
    ];
    for raw in malformed {
        assert!(
            matches!(RuleSet::from_json_str(raw), Err(SchemaError::MalformedRule { .. })),
            "{raw}"
        );
    }

    assert!(matches!(
        RuleSet::from_json_str(r#"{"a": {"type": "int", "max": "10"}}"#),
        Err(SchemaError::InvalidBound { .. })
    ));
    assert!(matches!(
        RuleSet::from_json_str("[]"),
        Err(SchemaError::NotAnObject)
    ));
    assert!(matches!(
        RuleSet::from_json_str("{"),
        Err(SchemaError::Json(_))
    ));
}

// ---------------------------------------------------------------------------
// Inputs and sharing
// ---------------------------------------------------------------------------

#[test]
fn test_plain_hash_map_input() {
    let mut input: HashMap<String, Vec<String>> = HashMap::new();
    input.insert("name".into(), vec!["Ada".into()]);
    input.insert("email".into(), vec!["ada@example.com".into()]);
    input.insert("lucky".into(), vec!["4".into(), "2".into()]);

    let out = form_extract_core::extract(&signup_rules(), &input).unwrap();
    assert_eq!(out["lucky"], FieldValue::Ints(vec![4, 2]));
}

#[test]
fn test_concurrent_extraction_shares_rules() {
    let extractor = Arc::new(Extractor::new(signup_rules()));
    let handles: Vec<_> = (18..26)
        .map(|age| {
            let extractor = Arc::clone(&extractor);
            thread::spawn(move || {
                let query = format!("name=n{age}&email=e{age}%40x.io&age={age}");
                extractor.extract_query(&query).unwrap()["age"].as_int()
            })
        })
        .collect();

    let ages: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(ages, (18..26).map(Some).collect::<Vec<_>>());
}

#[test]
fn test_rule_book_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forms.yaml");
    std::fs::write(
        &path,
        r#"
version: "1.0"
forms:
  search:
    q: {type: string, max: 50}
    page: {type: int, min: 1}
    tag: {type: strings, max_amt: 2}
"#,
    )
    .unwrap();

    let book = RuleBook::load(&path).unwrap();
    let extractor = book.extractor("search").unwrap();
    let out = extractor.extract_query("q=rust&page=2&tag=a&tag=b").unwrap();
    assert_eq!(out["page"], FieldValue::Int(2));
    assert_eq!(
        extractor.extract_query("page=0").unwrap_err().kind(),
        ErrorKind::ScalarFailed
    );
}
