use indoc::indoc;
use xml_multimap::{CollectionKind, MapKind, Multimap, MultimapParser, ValueGroup, from_str};

const UNSORTED: &str = indoc! {r#"
    <map>
        <entry key="pear" value="3"/>
        <entry key="apple" value="1"/>
        <entry key="fig" value="2"/>
        <entry key="apple" value="1"/>
        <entry key="apple" value="0"/>
    </map>
"#};

fn with_root(attributes: &str) -> String {
    UNSORTED.replacen("<map>", &format!("<map {attributes}>"), 1)
}

fn keys(map: &Multimap<String, String>) -> Vec<&str> {
    map.keys().map(String::as_str).collect()
}

#[test]
fn defaults_are_hash_map_of_lists() {
    let map = from_str(UNSORTED);
    assert_eq!(map.kind(), MapKind::Hash);
    let apple = map.get("apple").unwrap();
    assert_eq!(apple.kind(), CollectionKind::List);
    assert_eq!(apple.to_vec(), ["1", "1", "0"]);
}

#[test]
fn declared_kinds_are_used() {
    let map = from_str(&with_root(r#"type="TREEMAP" collection="ORDERED_SET""#));
    assert_eq!(map.kind(), MapKind::Tree);
    assert_eq!(keys(&map), ["apple", "fig", "pear"]);
    assert_eq!(map.get("apple").unwrap().to_vec(), ["1", "0"]);
}

#[test]
fn linked_hash_map_keeps_first_insertion_order() {
    let map = from_str(&with_root(r#"type="LINKED_HASHMAP""#));
    assert_eq!(keys(&map), ["pear", "apple", "fig"]);
}

#[test]
fn declared_values_are_case_insensitive() {
    let map = from_str(&with_root(r#"TYPE="linked_hashmap" Collection="set""#));
    assert_eq!(map.kind(), MapKind::LinkedHash);
    assert_eq!(map.collection_kind(), Some(CollectionKind::Set));
}

#[test]
fn set_groups_drop_duplicates() {
    let map = from_str(&with_root(r#"collection="SET""#));
    let apple = map.get("apple").unwrap();
    assert_eq!(apple.len(), 2);
    assert!(apple.contains(&"1".to_string()));
    assert!(apple.contains(&"0".to_string()));
}

#[test]
fn overrides_beat_declared_kinds_on_each_axis() {
    let xml = with_root(r#"type="TREEMAP" collection="SET""#);

    let map = MultimapParser::new()
        .with_collection_kind(CollectionKind::List)
        .parse(&xml);
    assert_eq!(map.kind(), MapKind::Tree);
    assert_eq!(map.get("apple").unwrap().to_vec(), ["1", "1", "0"]);

    let map = MultimapParser::new()
        .with_map_kind(MapKind::Hash)
        .with_collection_kind(CollectionKind::OrderedSet)
        .parse(&xml);
    assert_eq!(map.kind(), MapKind::Hash);
    assert_eq!(map.collection_kind(), Some(CollectionKind::OrderedSet));
}

#[test]
fn override_applies_when_document_declares_nothing() {
    let map = MultimapParser::new()
        .with_map_kind(MapKind::Tree)
        .parse(UNSORTED);
    assert_eq!(keys(&map), ["apple", "fig", "pear"]);
}

#[test]
fn every_kind_combination_holds_the_same_content() {
    for map_kind in MapKind::ALL {
        for collection_kind in CollectionKind::ALL {
            let map = MultimapParser::new()
                .with_map_kind(map_kind)
                .with_collection_kind(collection_kind)
                .parse(UNSORTED);
            assert_eq!(map.kind(), map_kind);
            assert_eq!(map.len(), 3, "{map_kind}/{collection_kind}");
            for (_, group) in &map {
                assert_eq!(group.kind(), collection_kind);
                assert!(!group.is_empty());
            }
            let expected_apples = if collection_kind == CollectionKind::List { 3 } else { 2 };
            assert_eq!(map.get("apple").unwrap().len(), expected_apples);
        }
    }
}

#[test]
fn equality_respects_ordering_semantics() {
    let forward = r#"<map><entry key="a" value="1"/><entry key="b" value="2"/></map>"#;
    let backward = r#"<map><entry key="b" value="2"/><entry key="a" value="1"/></map>"#;

    for kind in [MapKind::Hash, MapKind::Tree] {
        let parser = MultimapParser::new().with_map_kind(kind);
        assert_eq!(parser.parse(forward), parser.parse(backward), "{kind}");
    }

    let linked = MultimapParser::new().with_map_kind(MapKind::LinkedHash);
    assert_ne!(linked.parse(forward), linked.parse(backward));

    let tree = MultimapParser::new().with_map_kind(MapKind::Tree);
    assert_ne!(tree.parse(forward), linked.parse(forward));
}

#[test]
fn groups_compare_by_their_own_semantics() {
    let mut set_a = ValueGroup::new(CollectionKind::Set);
    let mut set_b = ValueGroup::new(CollectionKind::Set);
    let mut ordered_a = ValueGroup::new(CollectionKind::OrderedSet);
    let mut ordered_b = ValueGroup::new(CollectionKind::OrderedSet);
    for v in [1, 2] {
        set_a.push(v);
        ordered_a.push(v);
    }
    for v in [2, 1] {
        set_b.push(v);
        ordered_b.push(v);
    }
    assert_eq!(set_a, set_b);
    assert_ne!(ordered_a, ordered_b);
    assert!(!set_a.push(1));
}
