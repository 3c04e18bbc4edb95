use super::{flatten_blocks, ContentBlock, RawBlock, MAX_FLATTEN_DEPTH};
use serde_json::{json, Value};

#[test]
fn test_plain_blocks_parse_by_tag() {
    let raw = vec![
        json!({"type": "text", "title": "About", "content": "hello"}),
        json!({"type": "list", "title": "Rules", "items": ["a", "b"]}),
    ];
    let blocks = flatten_blocks(&raw);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].kind(), "text");
    assert_eq!(blocks[1].kind(), "list");
    assert_eq!(blocks[1].title(), "Rules");
}

#[test]
fn test_wrapper_object_contributes_only_children() {
    let raw = vec![json!({
        "title": "legacy wrapper",
        "content_blocks": [
            {"type": "text", "title": "inner", "content": "x"}
        ]
    })];
    let blocks = flatten_blocks(&raw);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].title(), "inner");
}

#[test]
fn test_nested_arrays_splice_in_order() {
    let raw = vec![
        json!({"type": "text", "title": "first", "content": ""}),
        json!([
            {"type": "text", "title": "second", "content": ""},
            [{"type": "text", "title": "third", "content": ""}]
        ]),
        json!({"type": "text", "title": "fourth", "content": ""}),
    ];
    let titles: Vec<String> = flatten_blocks(&raw).iter().map(RawBlock::title).collect();
    assert_eq!(titles, vec!["first", "second", "third", "fourth"]);
}

#[test]
fn test_unknown_kind_is_preserved_opaquely() {
    let raw = vec![json!({"type": "video", "title": "Open day", "url": "v.mp4"})];
    let blocks = flatten_blocks(&raw);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].kind(), "unknown");
    assert_eq!(blocks[0].title(), "Open day");
    match &blocks[0] {
        RawBlock::Unknown(value) => {
            assert_eq!(value.get("url"), Some(&json!("v.mp4")));
        }
        RawBlock::Known(_) => panic!("video must stay unknown"),
    }
}

#[test]
fn test_non_array_nesting_key_is_stripped_before_parse() {
    let raw = vec![json!({"type": "text", "title": "t", "content": "c", "content_blocks": 5})];
    let blocks = flatten_blocks(&raw);
    assert_eq!(
        blocks,
        vec![RawBlock::Known(ContentBlock::Text {
            title: "t".to_string(),
            content: "c".to_string(),
        })]
    );
}

#[test]
fn test_scalars_are_dropped() {
    let raw = vec![json!("junk"), json!(null), json!(7)];
    assert!(flatten_blocks(&raw).is_empty());
}

#[test]
fn test_flatten_stops_at_depth_cap() {
    let mut value = json!({"type": "text", "title": "deep", "content": ""});
    for _ in 0..MAX_FLATTEN_DEPTH {
        value = json!({"content_blocks": [value]});
    }
    let blocks = flatten_blocks(&[value]);
    assert!(blocks.is_empty());

    let mut reachable: Value = json!({"type": "text", "title": "deep", "content": ""});
    for _ in 0..MAX_FLATTEN_DEPTH - 1 {
        reachable = json!({"content_blocks": [reachable]});
    }
    let blocks = flatten_blocks(&[reachable]);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].title(), "deep");
}
