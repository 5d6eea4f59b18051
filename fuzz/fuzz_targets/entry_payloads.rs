#![no_main]

use libfuzzer_sys::fuzz_target;
use xml_multimap::{CollectionKind, MapKind, MultimapParser, integer_conversion};

// Fuzz bytes spliced into each entry form, so the walker sees mostly well-formed documents.
fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }
    let s = String::from_utf8_lossy(data);
    let kind = MapKind::ALL[data.first().map_or(0, |b| *b as usize) % 3];
    let collection = CollectionKind::ALL[data.last().map_or(0, |b| *b as usize) % 3];

    let documents = [
        format!("<map><entry key=\"{s}\" value=\"{s}\"/></map>"),
        format!("<map><entry key=\"k\">{s}</entry></map>"),
        format!("<map><entry><key>{s}</key><value>{s}</value></entry></map>"),
        format!("<map type=\"{s}\" collection=\"{s}\"><entry key=\"1\" value=\"2\"/></map>"),
    ];

    let strings = MultimapParser::new()
        .with_map_kind(kind)
        .with_collection_kind(collection)
        .continue_on_error(true);
    let integers = strings.clone().with_key_conversion(integer_conversion());

    for xml in &documents {
        let map = strings.parse(xml);
        assert_eq!(map.kind(), kind);
        let _ = integers.parse_with_report(xml);
    }
});
