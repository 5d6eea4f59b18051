use std::thread;

use xml_multimap::{MapKind, MultimapParser, integer_conversion};

fn document(seed: usize) -> String {
    let mut xml = String::from("<map type=\"TREEMAP\">");
    for idx in 0..200 {
        let key = (idx * 7 + seed) % 50;
        xml.push_str(&format!("<entry key=\"{key}\" value=\"{idx}\"/>"));
    }
    xml.push_str("</map>");
    xml
}

#[test]
fn one_parser_serves_many_threads() {
    let parser = MultimapParser::new()
        .with_key_conversion(integer_conversion())
        .with_value_conversion(integer_conversion());
    let documents: Vec<String> = (0..8).map(document).collect();

    let sequential: Vec<_> = documents.iter().map(|xml| parser.parse(xml)).collect();

    let shared = &parser;
    let parallel: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = documents
            .iter()
            .map(|xml| scope.spawn(move || shared.parse(xml)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(sequential, parallel);
    for map in &parallel {
        assert_eq!(map.kind(), MapKind::Tree);
        assert_eq!(map.len(), 50);
        assert_eq!(map.values_len(), 200);
    }
}

#[test]
fn independent_configurations_run_side_by_side() {
    let xml = document(3);
    let strict = MultimapParser::new();
    let lenient = MultimapParser::new()
        .continue_on_error(true)
        .with_map_kind(MapKind::LinkedHash);

    let (a, b) = thread::scope(|scope| {
        let a = scope.spawn(|| strict.parse(&xml));
        let b = scope.spawn(|| lenient.parse(&xml));
        (a.join().unwrap(), b.join().unwrap())
    });
    assert_eq!(a.kind(), MapKind::Tree);
    assert_eq!(b.kind(), MapKind::LinkedHash);
    assert_eq!(a.values_len(), b.values_len());
}
