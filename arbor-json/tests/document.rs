use arbor_core::alloc::StrategyKind;
use arbor_json::{parse, Error, ParseOptions, PipelineMode, Reader};

const SAMPLE: &str = r#"{"a":1,"b":[1,2,3],"c":{"d":true,"e":null}}"#;

fn nested(depth: usize) -> String {
    let mut src = "[".repeat(depth);
    src.push_str("\"leaf\"");
    src.push_str(&"]".repeat(depth));
    src
}

#[test]
fn sample_document_accessors() {
    let root = parse(SAMPLE).unwrap();
    assert_eq!(root.get("a").unwrap().as_int().unwrap(), 1);
    assert_eq!(root.get("b").unwrap().len(), 3);
    assert_eq!(root.get("b").unwrap().at(2).unwrap().as_int().unwrap(), 3);
    assert!(root.get("c").unwrap().get("d").unwrap().as_bool().unwrap());
    assert!(root.get("c").unwrap().get("e").unwrap().is_null());

    let cursor = root.cursor();
    assert_eq!(cursor.key("b").unwrap().index(0).unwrap().as_int().unwrap(), 1);
    assert!(cursor.key("c").unwrap().key("e").unwrap().is_null());
}

#[test]
fn container_errors() {
    let root = parse(SAMPLE).unwrap();
    assert!(matches!(root.get("zz"), Err(Error::InvalidKey { key }) if key == "zz"));
    assert!(matches!(
        root.get("b").unwrap().at(3),
        Err(Error::IndexOutOfRange { index: 3, len: 3 })
    ));
    assert!(matches!(root.at(0), Err(Error::TypeMismatch { .. })));
    assert!(matches!(
        root.get("a").unwrap().as_str(),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn empty_containers_have_size_zero() {
    assert_eq!(parse("{}").unwrap().as_object().unwrap().len(), 0);
    assert_eq!(parse("[]").unwrap().as_array().unwrap().len(), 0);
}

#[test]
fn missing_value_is_located_at_the_brace() {
    match parse(r#"{"a":}"#) {
        Err(Error::Parse(err)) => {
            assert_eq!(err.line, 1);
            assert_eq!(err.column, 6);
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn unterminated_string_is_a_parse_error() {
    assert!(matches!(parse("\"abc"), Err(Error::Parse(_))));
    assert!(matches!(parse(r#"{"abc"#), Err(Error::Parse(_))));
}

#[test]
fn errors_report_lines() {
    let Err(Error::Parse(err)) = parse("{\n  \"a\": 1,\n  \"b\": tru\n}") else {
        panic!("expected a parse error");
    };
    assert_eq!((err.line, err.column), (3, 8));
}

#[test]
fn copy_shares_nothing_with_the_original() {
    let root = parse(SAMPLE).unwrap();
    let mut copy = root.copy();
    assert_eq!(copy, root);

    copy.get_mut("c").unwrap().as_object_mut().unwrap().remove("d");
    copy.get_mut("b").unwrap().clear();
    assert_ne!(copy, root);
    assert_eq!(root.get("b").unwrap().len(), 3);
    assert!(root.get("c").unwrap().get("d").unwrap().as_bool().unwrap());
}

#[test]
fn thousand_level_nesting() {
    let options = ParseOptions {
        strategy: StrategyKind::FreeList,
        ..ParseOptions::default()
    };
    let reader = Reader::new(options).unwrap();
    let src = nested(1000);

    let root = reader.parse(&src).unwrap();
    let again = reader.parse(&src).unwrap();
    assert_eq!(root, again);

    let mut node = &root;
    for _ in 0..1000 {
        assert_eq!(node.len(), 1);
        node = node.at(0).unwrap();
    }
    assert_eq!(node.as_str().unwrap(), "leaf");
    assert_eq!(root.serialize(), src);

    drop(root);
    drop(again);
    assert_eq!(reader.pools().stats().live(), 0);
}

#[test]
fn deep_documents_under_a_raised_limit() {
    const DEPTH: usize = 100_000;
    let options = ParseOptions {
        mode: PipelineMode::Channel { capacity: 256 },
        max_depth: DEPTH + 1,
        strategy: StrategyKind::FreeList,
        ..ParseOptions::default()
    };
    let reader = Reader::new(options).unwrap();
    let src = nested(DEPTH);

    let root = reader.parse(&src).unwrap();
    let copy = root.copy();
    assert_eq!(copy, root);
    assert_eq!(copy.serialize(), src);
    assert_eq!(reader.pools().stats().live(), 2 * (DEPTH + 1));

    drop((root, copy));
    assert_eq!(reader.pools().stats().live(), 0);
}

#[test]
fn nesting_past_the_limit_is_rejected() {
    let err = parse(&nested(2000)).unwrap_err();
    assert!(matches!(err, Error::Parse(ref e) if e.message.contains("nesting")), "{err}");
}

#[test]
fn escapes_survive_a_round_trip() {
    let root = parse(r#"["tab\tquote\"slash\/snow☃", {"k\n": "😀"}]"#).unwrap();
    assert_eq!(root.at(0).unwrap().as_str().unwrap(), "tab\tquote\"slash/snow\u{2603}");
    assert_eq!(root.at(1).unwrap().get("k\n").unwrap().as_str().unwrap(), "\u{1F600}");
    assert_eq!(parse(&root.serialize()).unwrap(), root);
}

#[test]
fn pretty_output_parses_back() {
    let root = parse(SAMPLE).unwrap();
    let pretty = root.pretty_serialize("    ");
    assert!(pretty.contains("\n    \"a\": 1"));
    assert_eq!(parse(&pretty).unwrap(), root);
}

#[test]
fn building_a_tree_by_hand() {
    let reader = Reader::new(ParseOptions::default()).unwrap();
    let pools = reader.pools();

    let mut root = pools.object();
    let object = root.as_object_mut().unwrap();
    object.insert_value(pools, "a", 1);
    let mut list = pools.array();
    for i in 1..=3 {
        list.as_array_mut().unwrap().push_value(pools, i);
    }
    object.insert("b", list);
    let mut inner = pools.object();
    inner.as_object_mut().unwrap().insert_value(pools, "d", true);
    inner.as_object_mut().unwrap().insert("e", pools.null());
    object.insert("c", inner);

    assert_eq!(root, reader.parse(SAMPLE).unwrap());
    assert_eq!(root.serialize(), SAMPLE);
}
